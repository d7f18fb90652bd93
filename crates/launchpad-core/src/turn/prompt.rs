//! System prompt builder.
//!
//! The prompt tells the model how to converse (a few clarifying questions,
//! one at a time) and how to hand off a finished app: a trailing fenced
//! DEPLOY_CONFIG block whose `code` fits the configured template.

use launchpad_types::deploy::ProjectTemplate;
use launchpad_types::directive::{FENCE_CLOSE, FENCE_OPEN};

const PERSONA: &str = "You are Launchpad, an upbeat assistant that turns a short conversation \
into a working web page and puts it online.

How to run the conversation:
1. Work out what the user wants to build.
2. Ask two or three clarifying questions (name, colors, sections, main call to action), \
one question per reply, each reply at most three sentences.
3. Once you know enough, generate the app.

Until you have enough detail, reply conversationally and do not include a deploy block.";

/// Build the system prompt for a project template.
pub fn build_system_prompt(template: ProjectTemplate) -> String {
    let (example_code, rules) = match template {
        ProjectTemplate::NextJs => (
            r#"{
    "page.tsx": "'use client';\n\nexport default function Page() { ... }"
  }"#,
            "The code must be a single Next.js page component:\n\
             - start with 'use client';\n\
             - export default a function component with TypeScript types\n\
             - style with Tailwind CSS classes only, responsive with md: and lg: prefixes\n\
             - no imports beyond React; no external packages or images\n\
             - include hover states, transitions and comfortable spacing",
        ),
        ProjectTemplate::Static => (
            r#""<!doctype html><html>...</html>""#,
            "The code must be one self-contained HTML document:\n\
             - inline all CSS in a <style> element and any script in a <script> element\n\
             - responsive layout using modern CSS (flexbox, grid, media queries)\n\
             - no external stylesheets, fonts, scripts or images",
        ),
    };

    format!(
        "{PERSONA}\n\n\
         When you are ready to build, end your reply with exactly one block in this format:\n\n\
         {FENCE_OPEN}\n\
         {{\n  \"shouldDeploy\": true,\n  \"projectName\": \"short-descriptive-name\",\n  \"code\": {example_code}\n}}\n\
         {FENCE_CLOSE}\n\n\
         The block must be valid JSON: escape quotes and newlines inside strings.\n\n\
         {rules}"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_names_the_fence() {
        for template in [ProjectTemplate::NextJs, ProjectTemplate::Static] {
            let prompt = build_system_prompt(template);
            assert!(prompt.contains("```DEPLOY_CONFIG"));
            assert!(prompt.contains("\"shouldDeploy\": true"));
        }
    }

    #[test]
    fn test_prompt_follows_template() {
        assert!(build_system_prompt(ProjectTemplate::NextJs).contains("page.tsx"));
        let static_prompt = build_system_prompt(ProjectTemplate::Static);
        assert!(static_prompt.contains("HTML document"));
        assert!(!static_prompt.contains("page.tsx"));
    }
}

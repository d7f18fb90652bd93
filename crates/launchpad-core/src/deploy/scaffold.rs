//! Template scaffolds and file-set generation.
//!
//! A file set is built in a fixed order: scaffold files first, then the
//! directive's code at the template's slots (replacing scaffold entries with
//! the same path), then defaults for any scaffold slot the code left out.
//! The same directive and template always produce the same file set.

use serde_json::json;

use launchpad_types::deploy::{DeployError, ProjectFileSet, ProjectTemplate};
use launchpad_types::directive::{DeployDirective, DirectiveCode};

const NEXT_PAGE: &str = "src/app/page.tsx";
const NEXT_LAYOUT: &str = "src/app/layout.tsx";
const NEXT_GLOBALS: &str = "src/app/globals.css";
const STATIC_INDEX: &str = "index.html";

/// The path a `Markup` directive is written to, and that every file set must contain.
pub fn primary_slot(template: ProjectTemplate) -> &'static str {
    match template {
        ProjectTemplate::NextJs => NEXT_PAGE,
        ProjectTemplate::Static => STATIC_INDEX,
    }
}

/// Map a directive file key onto its place in the template.
///
/// Well-known short names land on scaffold slots; anything else is used as a
/// relative path after validation.
pub fn resolve_slot(template: ProjectTemplate, key: &str) -> Result<String, DeployError> {
    let key = key.trim();
    let slot = match (template, key) {
        (ProjectTemplate::NextJs, "page.tsx" | "page.jsx" | "app/page.tsx") => NEXT_PAGE,
        (ProjectTemplate::NextJs, "layout.tsx" | "app/layout.tsx") => NEXT_LAYOUT,
        (ProjectTemplate::NextJs, "globals.css" | "app/globals.css") => NEXT_GLOBALS,
        (ProjectTemplate::Static, "index.htm") => STATIC_INDEX,
        _ => {
            validate_relative_path(key)?;
            return Ok(key.to_string());
        }
    };
    Ok(slot.to_string())
}

/// Reject paths that could escape the project root.
fn validate_relative_path(path: &str) -> Result<(), DeployError> {
    let invalid = |reason: &str| DeployError::InvalidDirective(format!("file path '{path}' {reason}"));

    if path.is_empty() {
        return Err(invalid("is empty"));
    }
    if path.starts_with('/') || path.contains(':') {
        return Err(invalid("is absolute"));
    }
    if path.contains('\\') {
        return Err(invalid("uses backslashes"));
    }
    for component in path.split('/') {
        match component {
            "" | "." => return Err(invalid("has an empty component")),
            ".." => return Err(invalid("leaves the project root")),
            _ => {}
        }
    }
    Ok(())
}

/// Build the complete file set for a directive.
pub fn build_file_set(
    template: ProjectTemplate,
    directive: &DeployDirective,
) -> Result<ProjectFileSet, DeployError> {
    let name = directive.project_name();
    let mut files = ProjectFileSet::new();

    if template == ProjectTemplate::NextJs {
        files.insert("package.json", next_package_json(name));
        files.insert("next.config.ts", NEXT_CONFIG);
        files.insert("tsconfig.json", next_tsconfig());
        files.insert("postcss.config.mjs", POSTCSS_CONFIG);
        files.insert(NEXT_LAYOUT, next_layout(name));
    }

    match directive.code() {
        DirectiveCode::Markup(source) => {
            let content = match template {
                ProjectTemplate::NextJs => source.clone(),
                ProjectTemplate::Static => static_document(name, source),
            };
            files.insert(primary_slot(template), content);
        }
        DirectiveCode::Files(entries) => {
            for (key, content) in entries {
                files.insert(resolve_slot(template, key)?, content.as_str());
            }
        }
    }

    if template == ProjectTemplate::NextJs {
        files.insert_default(NEXT_GLOBALS, || NEXT_GLOBALS_CSS.to_string());
    }

    let primary = primary_slot(template);
    if !files.contains(primary) {
        return Err(DeployError::InvalidDirective(format!(
            "code does not provide {primary}"
        )));
    }

    tracing::debug!(
        template = %template,
        files = files.len(),
        "built project file set"
    );
    Ok(files)
}

// ---------------------------------------------------------------------------
// Next.js scaffold
// ---------------------------------------------------------------------------

fn next_package_json(name: &str) -> String {
    let manifest = json!({
        "name": name,
        "version": "0.1.0",
        "private": true,
        "scripts": {
            "dev": "next dev",
            "build": "next build",
            "start": "next start"
        },
        "dependencies": {
            "next": "^15.0.0",
            "react": "^19.0.0",
            "react-dom": "^19.0.0"
        },
        "devDependencies": {
            "@tailwindcss/postcss": "^4",
            "@types/node": "^20",
            "@types/react": "^19",
            "@types/react-dom": "^19",
            "tailwindcss": "^4",
            "typescript": "^5"
        }
    });
    format!("{manifest:#}\n")
}

fn next_tsconfig() -> String {
    let config = json!({
        "compilerOptions": {
            "target": "ES2017",
            "lib": ["dom", "dom.iterable", "esnext"],
            "allowJs": true,
            "skipLibCheck": true,
            "strict": true,
            "noEmit": true,
            "esModuleInterop": true,
            "module": "esnext",
            "moduleResolution": "bundler",
            "resolveJsonModule": true,
            "isolatedModules": true,
            "jsx": "preserve",
            "incremental": true,
            "plugins": [{ "name": "next" }],
            "paths": { "@/*": ["./src/*"] }
        },
        "include": ["next-env.d.ts", "**/*.ts", "**/*.tsx", ".next/types/**/*.ts"],
        "exclude": ["node_modules"]
    });
    format!("{config:#}\n")
}

fn next_layout(name: &str) -> String {
    let title = serde_json::Value::from(name);
    format!(
        r#"import type {{ Metadata }} from "next";
import "./globals.css";

export const metadata: Metadata = {{
  title: {title},
  description: "Launched with Launchpad",
}};

export default function RootLayout({{
  children,
}}: Readonly<{{
  children: React.ReactNode;
}}>) {{
  return (
    <html lang="en">
      <body className="antialiased">{{children}}</body>
    </html>
  );
}}
"#
    )
}

const NEXT_CONFIG: &str = r#"import type { NextConfig } from "next";

const nextConfig: NextConfig = {};

export default nextConfig;
"#;

const POSTCSS_CONFIG: &str = r#"const config = {
  plugins: {
    "@tailwindcss/postcss": {},
  },
};

export default config;
"#;

const NEXT_GLOBALS_CSS: &str = r#"@import "tailwindcss";

:root {
  --background: #09090b;
  --foreground: #fafafa;
}

body {
  color: var(--foreground);
  background: var(--background);
}
"#;

// ---------------------------------------------------------------------------
// Static scaffold
// ---------------------------------------------------------------------------

/// Wrap a markup fragment in a minimal document unless it already is one.
fn static_document(name: &str, source: &str) -> String {
    let lower = source.to_ascii_lowercase();
    if lower.contains("<html") || lower.contains("<!doctype") {
        return source.to_string();
    }
    format!(
        "<!doctype html>\n<html lang=\"en\">\n<head>\n  <meta charset=\"utf-8\">\n  \
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n  \
         <title>{}</title>\n</head>\n<body>\n{source}\n</body>\n</html>\n",
        escape_html(name)
    )
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

//! Strict parsing of a completed directive block.
//!
//! The finalizer is the only producer of [`DeployDirective`]. A block that is
//! missing, unterminated, malformed or invalid degrades to a plain
//! conversational reply; it is never an error for the caller.

use serde::Deserialize;

use launchpad_types::directive::{
    DeployDirective, DirectiveCode, DirectiveError, FALLBACK_MESSAGE, FENCE_CLOSE, FENCE_OPEN,
    TurnReply,
};

/// Wire shape of the JSON body between the fences.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DirectiveBody {
    should_deploy: bool,
    #[serde(default)]
    project_name: Option<String>,
    code: DirectiveCode,
}

/// Byte offsets of a located block within the full text.
struct BlockSpan {
    start: usize,
    body_start: usize,
    body_end: usize,
    end: usize,
}

fn locate_block(text: &str) -> Option<BlockSpan> {
    let start = text.find(FENCE_OPEN)?;
    let body_start = start + FENCE_OPEN.len();
    let body_end = body_start + text[body_start..].find(FENCE_CLOSE)?;
    Some(BlockSpan {
        start,
        body_start,
        body_end,
        end: body_end + FENCE_CLOSE.len(),
    })
}

/// Parse and validate a directive body.
pub fn parse_directive(body: &str) -> Result<DeployDirective, DirectiveError> {
    let parsed: DirectiveBody =
        serde_json::from_str(body.trim()).map_err(|e| DirectiveError::Syntax(e.to_string()))?;
    DeployDirective::validated(
        parsed.should_deploy,
        parsed.project_name.as_deref(),
        parsed.code,
    )
}

/// Turn the full text of a generation turn into its finalized reply.
pub fn finalize(text: &str) -> TurnReply {
    let Some(span) = locate_block(text) else {
        if text.contains(FENCE_OPEN) {
            tracing::warn!("directive block was never closed, treating reply as conversational");
        }
        return TurnReply::conversational(text);
    };

    let directive = match parse_directive(&text[span.body_start..span.body_end]) {
        Ok(directive) => directive,
        Err(e) => {
            tracing::warn!(error = %e, "discarding malformed directive");
            return TurnReply::conversational(text);
        }
    };

    let mut visible = String::with_capacity(text.len() - (span.end - span.start));
    visible.push_str(&text[..span.start]);
    visible.push_str(&text[span.end..]);
    let visible = visible.trim();

    tracing::debug!(
        project = directive.project_name(),
        should_deploy = directive.should_deploy(),
        "directive finalized"
    );

    TurnReply {
        message: if visible.is_empty() {
            FALLBACK_MESSAGE.to_string()
        } else {
            visible.to_string()
        },
        directive: Some(directive),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fenced(body: &str) -> String {
        format!("{FENCE_OPEN}\n{body}\n{FENCE_CLOSE}")
    }

    #[test]
    fn test_reply_with_markup_directive() {
        let text = format!(
            "Sure! {}",
            fenced(r#"{"shouldDeploy": true, "projectName": "x", "code": "<h1>Hi</h1>"}"#)
        );
        let reply = finalize(&text);
        assert_eq!(reply.message, "Sure!");
        assert!(reply.should_deploy());
        let directive = reply.deployable().unwrap();
        assert_eq!(directive.project_name(), "x");
        assert_eq!(
            directive.code(),
            &DirectiveCode::Markup("<h1>Hi</h1>".to_string())
        );
    }

    #[test]
    fn test_reply_without_fence_is_unchanged() {
        let text = "What colors do you like?  ";
        let reply = finalize(text);
        assert_eq!(reply.message, text);
        assert!(!reply.should_deploy());
        assert!(reply.directive.is_none());
    }

    #[test]
    fn test_directive_only_uses_fallback_message() {
        let text = fenced(r#"{"shouldDeploy": true, "code": "<p>x</p>"}"#);
        let reply = finalize(&text);
        assert_eq!(reply.message, FALLBACK_MESSAGE);
        assert_eq!(reply.directive.unwrap().project_name(), "my-app");
    }

    #[test]
    fn test_text_after_block_is_kept() {
        let text = format!(
            "Here goes.\n{}\nEnjoy!",
            fenced(r#"{"shouldDeploy": true, "code": "<p>x</p>"}"#)
        );
        assert_eq!(finalize(&text).message, "Here goes.\n\nEnjoy!");
    }

    #[test]
    fn test_malformed_json_degrades() {
        let text = format!("Oops {}", fenced(r#"{"shouldDeploy": true, "code": "<p>"#));
        let reply = finalize(&text);
        assert_eq!(reply.message, text);
        assert!(reply.directive.is_none());
    }

    #[test]
    fn test_missing_should_deploy_degrades() {
        let text = fenced(r#"{"code": "<p>x</p>"}"#);
        assert!(finalize(&text).directive.is_none());
    }

    #[test]
    fn test_empty_code_degrades() {
        let text = fenced(r#"{"shouldDeploy": true, "code": ""}"#);
        assert!(finalize(&text).directive.is_none());
        let text = fenced(r#"{"shouldDeploy": true, "code": {}}"#);
        assert!(finalize(&text).directive.is_none());
    }

    #[test]
    fn test_unterminated_fence_degrades() {
        let text = "Sure! ```DEPLOY_CONFIG\n{\"shouldDeploy\": true, \"code\": \"<h1>Hi</h1>\"}";
        let reply = finalize(text);
        assert_eq!(reply.message, text);
        assert!(!reply.should_deploy());
    }

    #[test]
    fn test_should_deploy_false_still_strips_block() {
        let text = format!(
            "Draft: {}",
            fenced(r#"{"shouldDeploy": false, "code": "<p>x</p>"}"#)
        );
        let reply = finalize(&text);
        assert_eq!(reply.message, "Draft:");
        assert!(reply.directive.is_some());
        assert!(reply.deployable().is_none());
    }

    #[test]
    fn test_file_map_directive() {
        let text = fenced(
            r#"{"shouldDeploy": true, "projectName": "Bean There", "code": {"page.tsx": "export default function Page() { return <main/> }", "globals.css": "body{}"}}"#,
        );
        let directive = finalize(&text).directive.unwrap();
        assert_eq!(directive.project_name(), "bean-there");
        match directive.code() {
            DirectiveCode::Files(files) => {
                assert_eq!(files.len(), 2);
                assert!(files.contains_key("page.tsx"));
            }
            other => panic!("expected files, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_directive_reports_syntax() {
        let err = parse_directive("not json").unwrap_err();
        assert!(matches!(err, DirectiveError::Syntax(_)));
    }
}

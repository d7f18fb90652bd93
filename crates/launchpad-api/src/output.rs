//! Serializable views shared by `--json` output and the HTTP API.

use serde::Serialize;
use uuid::Uuid;

use launchpad_core::turn::TurnReport;
use launchpad_types::deploy::{DeployReport, DeploymentStatus};
use launchpad_types::directive::TurnReply;
use launchpad_types::llm::Usage;

/// `{ turnId, message, shouldDeploy, projectName?, code?, deployment?, followUp?, status, ... }`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnOutput<'a> {
    pub turn_id: Uuid,
    #[serde(flatten)]
    pub reply: &'a TurnReply,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deployment: Option<&'a DeployReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub follow_up: Option<&'a str>,
    pub status: &'a DeploymentStatus,
    pub cancelled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<&'a Usage>,
}

impl<'a> From<&'a TurnReport> for TurnOutput<'a> {
    fn from(report: &'a TurnReport) -> Self {
        Self {
            turn_id: report.turn_id,
            reply: &report.reply,
            deployment: report.deployment.as_ref(),
            follow_up: report.follow_up.as_deref(),
            status: &report.status,
            cancelled: report.cancelled,
            usage: report.usage.as_ref(),
        }
    }
}

#[cfg(test)]
mod tests {
    use launchpad_types::directive::{DeployDirective, DirectiveCode};

    use super::*;

    #[test]
    fn turn_output_flattens_reply_and_nests_status() {
        let directive =
            DeployDirective::validated(true, Some("bean"), DirectiveCode::Markup("<h1>Hi</h1>".into()))
                .unwrap();
        let report = TurnReport {
            turn_id: Uuid::now_v7(),
            reply: TurnReply {
                message: "Sure!".into(),
                directive: Some(directive),
            },
            deployment: Some(DeployReport::failed("quota exceeded")),
            follow_up: None,
            status: DeploymentStatus::error("quota exceeded"),
            cancelled: false,
            usage: None,
        };

        let json = serde_json::to_value(TurnOutput::from(&report)).unwrap();
        assert_eq!(json["message"], "Sure!");
        assert_eq!(json["shouldDeploy"], true);
        assert_eq!(json["projectName"], "bean");
        assert_eq!(json["code"], "<h1>Hi</h1>");
        assert_eq!(json["deployment"]["error"], "quota exceeded");
        assert_eq!(json["status"]["status"], "error");
        assert!(json.get("followUp").is_none());
        assert!(json.get("usage").is_none());
    }
}

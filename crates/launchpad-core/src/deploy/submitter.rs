//! Deployment submission.

use std::sync::Arc;

use tracing::Instrument;

use launchpad_types::config::DeploySettings;
use launchpad_types::deploy::{
    DeployError, DeploymentRecord, DeploymentRequest, ProjectTemplate, TemplateSettings,
};
use launchpad_types::directive::DeployDirective;

use super::hosting::HostingProvider;
use super::scaffold::build_file_set;

/// Converts a validated directive into a file set and submits one build.
pub struct DeploymentSubmitter<H> {
    hosting: Arc<H>,
    template: ProjectTemplate,
    target: String,
}

impl<H: HostingProvider> DeploymentSubmitter<H> {
    pub fn new(hosting: Arc<H>, template: ProjectTemplate, target: impl Into<String>) -> Self {
        Self {
            hosting,
            template,
            target: target.into(),
        }
    }

    pub fn from_settings(hosting: Arc<H>, settings: &DeploySettings) -> Self {
        Self::new(hosting, settings.template, settings.target.clone())
    }

    /// Build the request a directive would be submitted as.
    pub fn prepare(&self, directive: &DeployDirective) -> Result<DeploymentRequest, DeployError> {
        Ok(DeploymentRequest {
            name: directive.project_name().to_string(),
            target: self.target.clone(),
            files: build_file_set(self.template, directive)?,
            settings: TemplateSettings::for_template(self.template),
        })
    }

    /// Submit one build. No retries: a rejection is returned as-is.
    pub async fn submit(&self, directive: &DeployDirective) -> Result<DeploymentRecord, DeployError> {
        let request = self.prepare(directive)?;

        let span = tracing::info_span!(
            "deploy.submit",
            deploy.provider = self.hosting.name(),
            deploy.project = %request.name,
            deploy.template = %self.template,
            deploy.files = request.files.len(),
        );

        async {
            let record = self.hosting.create_deployment(&request).await;
            match &record {
                Ok(record) => tracing::info!(id = %record.id, url = %record.url, "deployment submitted"),
                Err(e) => tracing::warn!(error = %e, "deployment submission failed"),
            }
            record
        }
        .instrument(span)
        .await
    }
}

#[cfg(test)]
mod tests {
    use launchpad_types::deploy::ReadyState;
    use launchpad_types::directive::DirectiveCode;

    use super::super::poller::testing::FakeHosting;
    use super::*;

    fn directive() -> DeployDirective {
        DeployDirective::validated(true, Some("Bean There"), DirectiveCode::Markup("<p/>".into()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_submit_sends_complete_request() {
        let hosting = Arc::new(FakeHosting::new(vec![]));
        let submitter = DeploymentSubmitter::new(hosting.clone(), ProjectTemplate::NextJs, "production");

        let record = submitter.submit(&directive()).await.unwrap();
        assert_eq!(record.ready_state, ReadyState::Queued);
        assert_eq!(record.id, "dpl_1");

        let requests = hosting.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        let request = &requests[0];
        assert_eq!(request.name, "bean-there");
        assert_eq!(request.target, "production");
        assert_eq!(request.settings.framework.as_deref(), Some("nextjs"));
        assert_eq!(request.files.get("src/app/page.tsx"), Some("<p/>"));
    }

    #[tokio::test]
    async fn test_provider_rejection_is_returned() {
        let hosting = Arc::new(FakeHosting::failing_submit(DeployError::Provider {
            status: 500,
            message: "quota exceeded".into(),
        }));
        let submitter = DeploymentSubmitter::new(hosting, ProjectTemplate::NextJs, "production");
        let err = submitter.submit(&directive()).await.unwrap_err();
        assert_eq!(err.to_string(), "quota exceeded");
    }

    #[tokio::test]
    async fn test_invalid_file_set_never_reaches_provider() {
        let hosting = Arc::new(FakeHosting::new(vec![]));
        let submitter = DeploymentSubmitter::new(hosting.clone(), ProjectTemplate::Static, "preview");
        let mut files = std::collections::BTreeMap::new();
        files.insert("../escape.html".to_string(), "x".to_string());
        let directive = DeployDirective::validated(true, None, DirectiveCode::Files(files)).unwrap();

        let err = submitter.submit(&directive).await.unwrap_err();
        assert!(matches!(err, DeployError::InvalidDirective(_)));
        assert!(hosting.requests.lock().unwrap().is_empty());
    }
}

//! Deployment orchestration: scaffold, submit, poll.

pub mod hosting;
pub mod pipeline;
pub mod poller;
pub mod scaffold;
pub mod submitter;

pub use hosting::HostingProvider;
pub use pipeline::DeploymentPipeline;
pub use poller::{Clock, DeploymentPoller, RetryPolicy, TokioClock};
pub use submitter::DeploymentSubmitter;

//! Deployment status polling.
//!
//! Polling is a fixed-delay, bounded loop: every attempt first waits
//! `policy.delay`, then performs exactly one status read. The loop ends on
//! READY (success), ERROR or CANCELED (failure), an exhausted attempt budget,
//! or a fired cancellation token. Waits go through a [`Clock`] so tests can
//! run the loop without real time passing.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use launchpad_types::config::DeploySettings;
use launchpad_types::deploy::{DeployError, DeploymentRecord, PollOutcome, ReadyState};

use super::hosting::HostingProvider;

/// Source of waits for the poll loop.
pub trait Clock: Send + Sync {
    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> + Send;
}

/// Real time, backed by `tokio::time::sleep`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioClock;

impl Clock for TokioClock {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Time box for one poll loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn fixed(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            delay,
        }
    }

    pub fn from_settings(settings: &DeploySettings) -> Self {
        Self::fixed(settings.max_poll_attempts, settings.poll_interval())
    }

    /// Upper bound on total waiting time for one loop.
    pub fn ceiling(&self) -> Duration {
        self.delay * self.max_attempts
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_settings(&DeploySettings::default())
    }
}

/// Drives a submitted deployment to a terminal outcome.
pub struct DeploymentPoller<H, C = TokioClock> {
    hosting: Arc<H>,
    policy: RetryPolicy,
    clock: C,
}

impl<H: HostingProvider, C: Clock> DeploymentPoller<H, C> {
    pub fn new(hosting: Arc<H>, policy: RetryPolicy, clock: C) -> Self {
        Self {
            hosting,
            policy,
            clock,
        }
    }

    /// Poll until a terminal state, the attempt budget, or cancellation.
    ///
    /// A status read the provider rejects uses up the attempt and keeps the
    /// last known state. Any other failed read ends the loop with that error.
    pub async fn poll(
        &self,
        mut record: DeploymentRecord,
        cancel: &CancellationToken,
    ) -> Result<PollOutcome, DeployError> {
        let span = tracing::info_span!(
            "deploy.poll",
            deploy.provider = self.hosting.name(),
            deploy.id = %record.id,
            deploy.max_attempts = self.policy.max_attempts,
            deploy.attempts = tracing::field::Empty,
        );

        async move {
            for attempt in 1..=self.policy.max_attempts {
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => {
                        tracing::info!(attempt, "polling cancelled");
                        return Ok(PollOutcome::Cancelled(record));
                    }
                    _ = self.clock.sleep(self.policy.delay) => {}
                }

                tracing::Span::current().record("deploy.attempts", attempt);
                let state = match self.hosting.ready_state(&record.id).await {
                    Ok(state) => state,
                    Err(DeployError::Provider { status, message }) => {
                        tracing::warn!(
                            attempt,
                            status,
                            %message,
                            last = %record.ready_state,
                            "status read rejected, still polling"
                        );
                        continue;
                    }
                    Err(e) => return Err(e),
                };
                if state != record.ready_state {
                    tracing::info!(attempt, from = %record.ready_state, to = %state, "deployment state changed");
                } else {
                    tracing::debug!(attempt, state = %state, "deployment still in progress");
                }
                record.ready_state = state;

                match &record.ready_state {
                    ReadyState::Ready => return Ok(PollOutcome::Ready(record)),
                    ReadyState::Error | ReadyState::Canceled => {
                        tracing::warn!(state = %record.ready_state, "deployment ended without going live");
                        return Ok(PollOutcome::Failed(record));
                    }
                    ReadyState::Other(raw) => {
                        tracing::debug!(state = %raw, "unrecognized deployment state, continuing");
                    }
                    _ => {}
                }
            }

            tracing::warn!(
                attempts = self.policy.max_attempts,
                "polling budget exhausted before the deployment went live"
            );
            Ok(PollOutcome::Exhausted(record))
        }
        .instrument(span)
        .await
    }
}


#[cfg(test)]
mod tests {
    use super::testing::{FakeClock, FakeHosting};
    use super::*;

    fn poller(hosting: FakeHosting, clock: FakeClock) -> DeploymentPoller<FakeHosting, FakeClock> {
        DeploymentPoller::new(
            Arc::new(hosting),
            RetryPolicy::fixed(30, Duration::from_secs(2)),
            clock,
        )
    }

    fn queued() -> DeploymentRecord {
        DeploymentRecord::queued("dpl_1", "https://bean.vercel.app")
    }

    #[tokio::test]
    async fn test_poll_ready_after_building() {
        let clock = FakeClock::default();
        let poller = poller(
            FakeHosting::new(vec![ReadyState::Building, ReadyState::Building, ReadyState::Ready]),
            clock.clone(),
        );
        let outcome = poller.poll(queued(), &CancellationToken::new()).await.unwrap();
        match outcome {
            PollOutcome::Ready(record) => assert_eq!(record.ready_state, ReadyState::Ready),
            other => panic!("expected ready, got {other:?}"),
        }
        assert_eq!(clock.total_slept(), Duration::from_secs(6));
    }

    #[tokio::test]
    async fn test_poll_error_is_failure() {
        let poller = poller(
            FakeHosting::new(vec![ReadyState::Building, ReadyState::Error]),
            FakeClock::default(),
        );
        let outcome = poller.poll(queued(), &CancellationToken::new()).await.unwrap();
        assert!(matches!(outcome, PollOutcome::Failed(_)));
    }

    #[tokio::test]
    async fn test_poll_canceled_state_is_failure() {
        let poller = poller(
            FakeHosting::new(vec![ReadyState::Canceled]),
            FakeClock::default(),
        );
        let outcome = poller.poll(queued(), &CancellationToken::new()).await.unwrap();
        assert!(matches!(outcome, PollOutcome::Failed(_)));
    }

    #[tokio::test]
    async fn test_poll_exhausts_within_ceiling() {
        let clock = FakeClock::default();
        let hosting = FakeHosting::new(vec![ReadyState::Building]);
        let poller = poller(hosting, clock.clone());
        let outcome = poller.poll(queued(), &CancellationToken::new()).await.unwrap();

        assert!(matches!(outcome, PollOutcome::Exhausted(_)));
        assert_eq!(outcome.record().ready_state, ReadyState::Building);
        assert_eq!(poller.hosting.reads(), 30);
        assert_eq!(clock.total_slept(), poller.policy.ceiling());
    }

    #[tokio::test]
    async fn test_unknown_states_keep_polling() {
        let poller = poller(
            FakeHosting::new(vec![
                ReadyState::Initializing,
                ReadyState::Other("ANALYZING".into()),
                ReadyState::Ready,
            ]),
            FakeClock::default(),
        );
        let outcome = poller.poll(queued(), &CancellationToken::new()).await.unwrap();
        assert!(matches!(outcome, PollOutcome::Ready(_)));
        assert_eq!(poller.hosting.reads(), 3);
    }

    #[tokio::test]
    async fn test_cancelled_token_stops_before_reading() {
        let hosting = FakeHosting::new(vec![ReadyState::Ready]);
        let poller = poller(hosting, FakeClock::default());
        let cancel = CancellationToken::new();
        cancel.cancel();

        let outcome = poller.poll(queued(), &cancel).await.unwrap();
        assert!(matches!(outcome, PollOutcome::Cancelled(_)));
        assert_eq!(poller.hosting.reads(), 0);
    }

    #[tokio::test]
    async fn test_read_error_ends_poll() {
        let hosting = FakeHosting::new(vec![ReadyState::Building])
            .with_read_error(DeployError::Transport("connection reset".into()));
        let poller = poller(hosting, FakeClock::default());
        let err = poller.poll(queued(), &CancellationToken::new()).await.unwrap_err();
        assert!(matches!(err, DeployError::Transport(_)));
    }

    #[tokio::test]
    async fn test_rejected_status_read_counts_as_an_attempt() {
        let hosting = FakeHosting::new(vec![ReadyState::Building])
            .with_read_error(DeployError::Provider {
                status: 502,
                message: "Bad Gateway".into(),
            })
            .then_state(ReadyState::Ready);
        let clock = FakeClock::default();
        let poller = poller(hosting, clock.clone());

        let outcome = poller.poll(queued(), &CancellationToken::new()).await.unwrap();
        assert!(matches!(outcome, PollOutcome::Ready(_)));
        assert_eq!(poller.hosting.reads(), 3);
        assert_eq!(clock.total_slept(), Duration::from_secs(6));
    }

    #[tokio::test]
    async fn test_rejected_reads_exhaust_with_last_known_state() {
        let mut hosting = FakeHosting::new(vec![ReadyState::Building]);
        for _ in 0..29 {
            hosting = hosting.with_read_error(DeployError::Provider {
                status: 503,
                message: "Service Unavailable".into(),
            });
        }
        let poller = poller(hosting, FakeClock::default());

        let outcome = poller.poll(queued(), &CancellationToken::new()).await.unwrap();
        assert!(matches!(outcome, PollOutcome::Exhausted(_)));
        assert_eq!(outcome.record().ready_state, ReadyState::Building);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_during_a_pending_wait_returns_promptly() {
        let hosting = Arc::new(FakeHosting::new(vec![ReadyState::Building]));
        let poller = DeploymentPoller::new(
            hosting.clone(),
            RetryPolicy::fixed(30, Duration::from_secs(2)),
            TokioClock,
        );
        let cancel = CancellationToken::new();
        tokio::spawn({
            let cancel = cancel.clone();
            async move {
                tokio::time::sleep(Duration::from_millis(500)).await;
                cancel.cancel();
            }
        });

        let started = tokio::time::Instant::now();
        let outcome = poller.poll(queued(), &cancel).await.unwrap();
        assert!(matches!(outcome, PollOutcome::Cancelled(_)));
        assert!(started.elapsed() < Duration::from_secs(2));
        assert_eq!(hosting.reads(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_tokio_clock_waits_the_full_delay() {
        let hosting = Arc::new(FakeHosting::new(vec![ReadyState::Ready]));
        let poller = DeploymentPoller::new(
            hosting,
            RetryPolicy::fixed(3, Duration::from_secs(2)),
            TokioClock,
        );
        let started = tokio::time::Instant::now();
        let outcome = poller.poll(queued(), &CancellationToken::new()).await.unwrap();
        assert!(matches!(outcome, PollOutcome::Ready(_)));
        assert_eq!(started.elapsed(), Duration::from_secs(2));
    }

    #[test]
    fn test_policy_from_settings() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, 30);
        assert_eq!(policy.delay, Duration::from_secs(2));
        assert_eq!(policy.ceiling(), Duration::from_secs(60));
    }
}

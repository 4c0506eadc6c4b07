use std::{sync::Arc, time::Duration};

use futures::future::join_all;
use thiserror::Error;
use tokio::{task::JoinError, time::sleep};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::{
    condition::Condition,
    constants::{DEFAULT_POLL_INTERVAL, DEFAULT_TIMEOUT},
    resource::{ClientError, ResourceClient},
};

/// Why a single condition stopped being polled without being met.
#[derive(Debug, Error)]
pub enum WaitError {
    #[error("condition was not met after {timeout:?}")]
    Timeout { timeout: Duration },
    #[error("interrupted before the condition was met")]
    Interrupted,
    #[error("{source}")]
    Query {
        #[source]
        source: ClientError,
    },
    #[error("polling task failed: {source}")]
    Aborted {
        #[source]
        source: JoinError,
    },
}

/// Final state of one condition.
#[derive(Debug)]
pub struct WaitOutcome {
    pub description: String,
    pub result: Result<(), WaitError>,
}

impl WaitOutcome {
    #[must_use]
    pub const fn is_satisfied(&self) -> bool {
        self.result.is_ok()
    }
}

/// Outcomes of a run, in the order the conditions were given.
#[derive(Debug, Default)]
pub struct WaitReport {
    pub outcomes: Vec<WaitOutcome>,
}

impl WaitReport {
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.outcomes.iter().all(WaitOutcome::is_satisfied)
    }

    pub fn failures(&self) -> impl Iterator<Item = &WaitOutcome> {
        self.outcomes.iter().filter(|outcome| !outcome.is_satisfied())
    }
}

/// Polls a set of conditions concurrently under one shared deadline.
#[derive(Clone, Copy, Debug)]
pub struct Waiter {
    timeout: Duration,
    interval: Duration,
}

impl Default for Waiter {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT, DEFAULT_POLL_INTERVAL)
    }
}

impl Waiter {
    /// `interval` is fixed for the whole run; there is no backoff.
    #[must_use]
    pub const fn new(timeout: Duration, interval: Duration) -> Self {
        Self { timeout, interval }
    }

    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    #[must_use]
    pub const fn interval(&self) -> Duration {
        self.interval
    }

    /// Runs one polling task per condition until each is met, fails, or the
    /// deadline passes. Cancelling `shutdown` stops every task.
    pub async fn run(
        &self,
        client: Arc<dyn ResourceClient>,
        conditions: Vec<Box<dyn Condition>>,
        shutdown: &CancellationToken,
    ) -> WaitReport {
        let deadline = shutdown.child_token();
        let timer = tokio::spawn({
            let deadline = deadline.clone();
            let timeout = self.timeout;
            async move {
                sleep(timeout).await;
                deadline.cancel();
            }
        });

        let tasks = conditions.into_iter().map(|condition| {
            let description = condition.describe();
            let poller = Poller {
                client: Arc::clone(&client),
                description: description.clone(),
                interval: self.interval,
                timeout: self.timeout,
                deadline: deadline.clone(),
                shutdown: shutdown.clone(),
            };
            let handle = tokio::spawn(async move { poller.poll(condition.as_ref()).await });

            async move {
                let result = handle
                    .await
                    .unwrap_or_else(|source| Err(WaitError::Aborted { source }));
                WaitOutcome {
                    description,
                    result,
                }
            }
        });

        let outcomes = join_all(tasks).await;
        timer.abort();

        WaitReport { outcomes }
    }
}

struct Poller {
    client: Arc<dyn ResourceClient>,
    description: String,
    interval: Duration,
    timeout: Duration,
    deadline: CancellationToken,
    shutdown: CancellationToken,
}

impl Poller {
    async fn poll(&self, condition: &dyn Condition) -> Result<(), WaitError> {
        let result = self.poll_until_done(condition).await;
        match &result {
            Ok(()) => info!(condition = %self.description, "condition is met"),
            Err(err) => error!(condition = %self.description, error = %err, "condition failed"),
        }
        result
    }

    async fn poll_until_done(&self, condition: &dyn Condition) -> Result<(), WaitError> {
        loop {
            let checked = tokio::select! {
                biased;
                () = self.deadline.cancelled() => return Err(self.expired()),
                checked = condition.check(self.client.as_ref()) => checked,
            };

            match checked {
                Ok(true) => return Ok(()),
                Ok(false) => debug!(condition = %self.description, "condition not met yet"),
                Err(source) => return Err(WaitError::Query { source }),
            }

            tokio::select! {
                biased;
                () = self.deadline.cancelled() => return Err(self.expired()),
                () = sleep(self.interval) => {}
            }
        }
    }

    fn expired(&self) -> WaitError {
        if self.shutdown.is_cancelled() {
            WaitError::Interrupted
        } else {
            WaitError::Timeout {
                timeout: self.timeout,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use tokio::time::Instant;

    use super::*;
    use crate::resource::{Instance, ResourceType};

    /// Condition with a fixed answer that counts how often it was checked.
    #[derive(Debug)]
    struct Fixed {
        answer: Option<bool>,
        checks: Arc<AtomicUsize>,
    }

    impl Fixed {
        fn boxed(answer: Option<bool>) -> (Box<dyn Condition>, Arc<AtomicUsize>) {
            let checks = Arc::new(AtomicUsize::new(0));
            let condition: Box<dyn Condition> = Box::new(Self {
                answer,
                checks: Arc::clone(&checks),
            });
            (condition, checks)
        }
    }

    #[async_trait::async_trait]
    impl Condition for Fixed {
        fn describe(&self) -> String {
            format!("fixed {:?}", self.answer)
        }

        async fn check(&self, _client: &dyn ResourceClient) -> Result<bool, ClientError> {
            self.checks.fetch_add(1, Ordering::SeqCst);
            self.answer.ok_or_else(|| ClientError::Query {
                resource: "fixed".to_owned(),
                source: anyhow::anyhow!("forbidden"),
            })
        }
    }

    /// Condition whose check never completes.
    #[derive(Debug)]
    struct Stuck;

    #[async_trait::async_trait]
    impl Condition for Stuck {
        fn describe(&self) -> String {
            "stuck".to_owned()
        }

        async fn check(&self, _client: &dyn ResourceClient) -> Result<bool, ClientError> {
            std::future::pending().await
        }
    }

    #[derive(Debug)]
    struct Panicking;

    #[async_trait::async_trait]
    impl Condition for Panicking {
        fn describe(&self) -> String {
            "panicking".to_owned()
        }

        async fn check(&self, _client: &dyn ResourceClient) -> Result<bool, ClientError> {
            panic!("status decoder blew up")
        }
    }

    struct NoClient;

    #[async_trait::async_trait]
    impl ResourceClient for NoClient {
        async fn get(
            &self,
            resource: &ResourceType,
            _namespace: Option<&str>,
            _name: &str,
        ) -> Result<Instance, ClientError> {
            Err(ClientError::NotFound {
                resource: resource.plural.clone(),
            })
        }

        async fn list(
            &self,
            _resource: &ResourceType,
            _namespace: Option<&str>,
            _limit: Option<u32>,
        ) -> Result<Vec<Instance>, ClientError> {
            Ok(Vec::new())
        }
    }

    fn client() -> Arc<dyn ResourceClient> {
        Arc::new(NoClient)
    }

    #[tokio::test(start_paused = true)]
    async fn satisfied_condition_does_not_delay_timeout() {
        let timeout = Duration::from_millis(4500);
        let waiter = Waiter::new(timeout, Duration::from_secs(1));
        let (met, met_checks) = Fixed::boxed(Some(true));
        let (unmet, unmet_checks) = Fixed::boxed(Some(false));

        let started = Instant::now();
        let report = waiter
            .run(client(), vec![met, unmet], &CancellationToken::new())
            .await;

        assert!(!report.is_success());
        assert!(report.outcomes[0].is_satisfied());
        assert!(matches!(
            report.outcomes[1].result,
            Err(WaitError::Timeout { timeout: reported }) if reported == timeout
        ));
        assert_eq!(report.failures().count(), 1);

        let elapsed = started.elapsed();
        assert!(elapsed >= timeout && elapsed < Duration::from_secs(5));
        assert_eq!(met_checks.load(Ordering::SeqCst), 1);
        // Checked at 0s, 1s, 2s, 3s and 4s.
        assert_eq!(unmet_checks.load(Ordering::SeqCst), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn query_errors_are_not_retried() {
        let waiter = Waiter::new(Duration::from_secs(60), Duration::from_secs(1));
        let (failing, checks) = Fixed::boxed(None);

        let started = Instant::now();
        let report = waiter
            .run(client(), vec![failing], &CancellationToken::new())
            .await;

        assert!(matches!(report.outcomes[0].result, Err(WaitError::Query { .. })));
        assert_eq!(checks.load(Ordering::SeqCst), 1);
        assert!(started.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_interrupts_sleeping_loops() {
        let waiter = Waiter::new(Duration::from_secs(3600), Duration::from_secs(600));
        let (unmet, checks) = Fixed::boxed(Some(false));
        let shutdown = CancellationToken::new();

        tokio::spawn({
            let shutdown = shutdown.clone();
            async move {
                sleep(Duration::from_millis(10)).await;
                shutdown.cancel();
            }
        });

        let started = Instant::now();
        let report = waiter.run(client(), vec![unmet], &shutdown).await;

        assert!(matches!(report.outcomes[0].result, Err(WaitError::Interrupted)));
        assert!(started.elapsed() < waiter.interval());
        assert_eq!(checks.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn empty_run_is_successful() {
        let report = Waiter::default()
            .run(client(), Vec::new(), &CancellationToken::new())
            .await;
        assert!(report.is_success());
        assert_eq!(report.failures().count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn check_in_flight_is_abandoned_at_deadline() {
        let timeout = Duration::from_secs(5);
        let waiter = Waiter::new(timeout, Duration::from_secs(1));
        let stuck: Box<dyn Condition> = Box::new(Stuck);

        let started = Instant::now();
        let report = waiter
            .run(client(), vec![stuck], &CancellationToken::new())
            .await;

        assert!(matches!(
            report.outcomes[0].result,
            Err(WaitError::Timeout { timeout: reported }) if reported == timeout
        ));
        let elapsed = started.elapsed();
        assert!(elapsed >= timeout && elapsed < timeout + waiter.interval());
    }

    #[tokio::test(start_paused = true)]
    async fn panicking_check_is_reported_as_aborted() {
        let waiter = Waiter::new(Duration::from_secs(60), Duration::from_secs(1));
        let (met, _) = Fixed::boxed(Some(true));
        let panicking: Box<dyn Condition> = Box::new(Panicking);

        let report = waiter
            .run(client(), vec![panicking, met], &CancellationToken::new())
            .await;

        assert_eq!(report.outcomes[0].description, "panicking");
        assert!(matches!(report.outcomes[0].result, Err(WaitError::Aborted { .. })));
        assert!(report.outcomes[1].is_satisfied());
        assert_eq!(report.failures().count(), 1);
    }
}

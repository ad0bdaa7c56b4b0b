//! Async poll driver.

use std::time::Duration;

use async_trait::async_trait;

use crate::task::{StatusResponse, TaskId};

use super::{CancelSignal, PollConfig, PollMachine, PollOutcome, PollState, Sleeper, TokioSleeper};

/// Queries the current status of a remote task.
///
/// Implemented by the HTTP transport (`reelgen-client`) and by test fakes.
/// The credential is the bearer token to present with the request.
///
/// Errors are transport-level failures (network, undecodable body). They are
/// returned unchanged from [`TaskPoller::poll`] and never retried. Remote
/// rejections are not errors: they arrive as a [`StatusResponse`] with a
/// non-zero `code`.
#[async_trait]
pub trait StatusCheck: Send + Sync {
    type Error: Send;

    async fn check(&self, task_id: &TaskId, credential: &str)
        -> Result<StatusResponse, Self::Error>;
}

#[async_trait]
impl<T: StatusCheck + ?Sized> StatusCheck for &T {
    type Error = T::Error;

    async fn check(
        &self,
        task_id: &TaskId,
        credential: &str,
    ) -> Result<StatusResponse, Self::Error> {
        (**self).check(task_id, credential).await
    }
}

/// Drives a [`PollMachine`] against a [`StatusCheck`].
///
/// One `poll` call is one logical sequence of attempts. Polls of distinct
/// tasks may run concurrently on the same poller; they share no state.
/// Overlapping polls of the *same* task are not deduplicated.
#[derive(Debug, Clone)]
pub struct TaskPoller<C, S = TokioSleeper> {
    check: C,
    sleeper: S,
    config: PollConfig,
    cancel: Option<CancelSignal>,
}

impl<C: StatusCheck> TaskPoller<C, TokioSleeper> {
    /// Create a poller that waits on the tokio timer.
    pub fn new(check: C, config: PollConfig) -> Self {
        Self {
            check,
            sleeper: TokioSleeper,
            config,
            cancel: None,
        }
    }
}

impl<C: StatusCheck, S: Sleeper> TaskPoller<C, S> {
    /// Replace the sleeper, e.g. with a virtual clock in tests.
    pub fn with_sleeper<T: Sleeper>(self, sleeper: T) -> TaskPoller<C, T> {
        TaskPoller {
            check: self.check,
            sleeper,
            config: self.config,
            cancel: self.cancel,
        }
    }

    /// Stop polling when `signal` fires.
    ///
    /// The signal is checked before every attempt and raced against every
    /// status check and every wait. A status check abandoned mid-flight does
    /// not count as an attempt.
    pub fn with_cancel(mut self, signal: CancelSignal) -> Self {
        self.cancel = Some(signal);
        self
    }

    pub fn config(&self) -> &PollConfig {
        &self.config
    }

    pub fn status_check(&self) -> &C {
        &self.check
    }

    /// Poll `task_id` until it resolves.
    ///
    /// Never returns [`PollOutcome::Continue`].
    ///
    /// # Errors
    ///
    /// Returns the [`StatusCheck`] error of the first failed status query.
    pub async fn poll(&self, task_id: &TaskId, credential: &str) -> Result<PollOutcome, C::Error> {
        let mut machine = PollMachine::new(self.config.max_attempts);

        loop {
            if self.cancel_requested() {
                return Ok(machine.cancel());
            }

            let Some(response) = self.check_status(task_id, credential).await? else {
                return Ok(machine.cancel());
            };
            if let PollState::Resolved(outcome) = machine.observe(&response) {
                return Ok(outcome.clone());
            }

            if !self.wait(self.config.interval).await {
                return Ok(machine.cancel());
            }
        }
    }

    fn cancel_requested(&self) -> bool {
        self.cancel.as_ref().is_some_and(CancelSignal::is_cancelled)
    }

    /// Run one status check. Returns `None` if cancelled while in flight.
    async fn check_status(
        &self,
        task_id: &TaskId,
        credential: &str,
    ) -> Result<Option<StatusResponse>, C::Error> {
        match &self.cancel {
            Some(signal) => tokio::select! {
                response = self.check.check(task_id, credential) => response.map(Some),
                () = signal.cancelled() => Ok(None),
            },
            None => self.check.check(task_id, credential).await.map(Some),
        }
    }

    /// Sleep for `interval`. Returns false if cancelled while waiting.
    async fn wait(&self, interval: Duration) -> bool {
        match &self.cancel {
            Some(signal) => tokio::select! {
                () = self.sleeper.sleep(interval) => true,
                () = signal.cancelled() => false,
            },
            None => {
                self.sleeper.sleep(interval).await;
                true
            }
        }
    }
}

/// Poll `task_id` with the tokio timer and no cancellation.
///
/// Convenience wrapper around [`TaskPoller`].
///
/// # Errors
///
/// See [`TaskPoller::poll`].
pub async fn poll_task<C: StatusCheck>(
    task_id: &TaskId,
    credential: &str,
    check: &C,
    max_attempts: u32,
    interval: Duration,
) -> Result<PollOutcome, C::Error> {
    TaskPoller::new(check, PollConfig::new(max_attempts, interval))
        .poll(task_id, credential)
        .await
}

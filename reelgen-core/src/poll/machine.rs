//! Poll state machine and response classification.

use crate::task::{StatusResponse, TaskResult, TaskStatus};

/// Message used when a task fails without saying why.
const GENERIC_TASK_FAILURE: &str = "task failed";

/// Why a task ended without a result.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TaskFailure {
    /// The service rejected the status request (`code != 0`).
    ///
    /// Rejections are permanent: retrying the same request is pointless.
    #[error("{message} (code {code})")]
    Rejected { code: i64, message: String },

    /// The task itself reported `failed`.
    #[error("{message}")]
    TaskFailed { message: String },
}

impl TaskFailure {
    /// The remote message, or the fallback used when none was given.
    pub fn message(&self) -> &str {
        match self {
            Self::Rejected { message, .. } | Self::TaskFailed { message } => message,
        }
    }

    /// The rejection code, for rejected requests.
    pub fn code(&self) -> Option<i64> {
        match self {
            Self::Rejected { code, .. } => Some(*code),
            Self::TaskFailed { .. } => None,
        }
    }
}

/// Result of interpreting one status response, or of a whole poll.
#[derive(Debug, Clone, PartialEq)]
pub enum PollOutcome {
    /// The task is still in progress. Never returned by a finished poll.
    Continue,
    /// The task finished with a result payload.
    Succeeded(TaskResult),
    /// The request was rejected or the task failed.
    Failed(TaskFailure),
    /// The attempt budget ran out while the task was still in progress.
    TimedOut { attempts: u32 },
    /// The caller cancelled the poll.
    Cancelled { attempts: u32 },
}

impl PollOutcome {
    /// Returns true for every outcome except [`PollOutcome::Continue`].
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Continue)
    }

    /// Returns true if the task succeeded.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded(_))
    }
}

/// Classify a single status response.
///
/// - `code != 0` → [`PollOutcome::Failed`] with [`TaskFailure::Rejected`],
///   whatever the task status says
/// - `succeed`/`succeeded` → [`PollOutcome::Succeeded`]
/// - `failed` → [`PollOutcome::Failed`] with [`TaskFailure::TaskFailed`]
/// - anything else, including a missing status → [`PollOutcome::Continue`]
pub fn classify(response: &StatusResponse) -> PollOutcome {
    if response.is_rejection() {
        let message = non_empty(response.message.as_deref())
            .map(str::to_string)
            .unwrap_or_else(|| format!("request rejected with code {}", response.code));
        return PollOutcome::Failed(TaskFailure::Rejected {
            code: response.code,
            message,
        });
    }

    let Some(data) = response.data.as_ref() else {
        return PollOutcome::Continue;
    };

    match data.task_status {
        Some(TaskStatus::Succeeded) => {
            PollOutcome::Succeeded(data.task_result.clone().unwrap_or_default())
        }
        Some(TaskStatus::Failed) => PollOutcome::Failed(TaskFailure::TaskFailed {
            message: non_empty(data.task_status_msg.as_deref())
                .unwrap_or(GENERIC_TASK_FAILURE)
                .to_string(),
        }),
        _ => PollOutcome::Continue,
    }
}

fn non_empty(message: Option<&str>) -> Option<&str> {
    message.filter(|m| !m.is_empty())
}

/// State of a poll.
#[derive(Debug, Clone, PartialEq)]
pub enum PollState {
    /// Waiting to make `attempt` (1-based).
    Pending { attempt: u32 },
    /// Finished. The outcome is never [`PollOutcome::Continue`].
    Resolved(PollOutcome),
}

impl PollState {
    pub fn is_resolved(&self) -> bool {
        matches!(self, Self::Resolved(_))
    }
}

/// Pure poll state machine.
///
/// Feed it one status response per attempt with [`observe`](Self::observe).
/// It performs no IO and never waits; [`TaskPoller`](super::TaskPoller)
/// drives it against a real [`StatusCheck`](super::StatusCheck).
#[derive(Debug, Clone, PartialEq)]
pub struct PollMachine {
    max_attempts: u32,
    state: PollState,
}

impl PollMachine {
    /// Create a machine allowing up to `max_attempts` status checks.
    ///
    /// A budget of zero is raised to one: the first attempt always happens.
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            state: PollState::Pending { attempt: 1 },
        }
    }

    pub fn state(&self) -> &PollState {
        &self.state
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// The final outcome, once resolved.
    pub fn outcome(&self) -> Option<&PollOutcome> {
        match &self.state {
            PollState::Resolved(outcome) => Some(outcome),
            PollState::Pending { .. } => None,
        }
    }

    /// Apply the response to the pending attempt.
    ///
    /// A resolved machine ignores further responses.
    pub fn observe(&mut self, response: &StatusResponse) -> &PollState {
        let PollState::Pending { attempt } = self.state else {
            return &self.state;
        };

        self.state = match classify(response) {
            PollOutcome::Continue if attempt < self.max_attempts => PollState::Pending {
                attempt: attempt + 1,
            },
            PollOutcome::Continue => PollState::Resolved(PollOutcome::TimedOut { attempts: attempt }),
            terminal => PollState::Resolved(terminal),
        };
        &self.state
    }

    /// Resolve a pending poll as cancelled.
    ///
    /// Returns the final outcome; an already resolved machine keeps its outcome.
    pub fn cancel(&mut self) -> PollOutcome {
        match &self.state {
            PollState::Resolved(outcome) => outcome.clone(),
            PollState::Pending { attempt } => {
                let outcome = PollOutcome::Cancelled {
                    attempts: attempt - 1,
                };
                self.state = PollState::Resolved(outcome.clone());
                outcome
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::TaskData;
    use serde_json::json;

    fn with_status(status: &str) -> StatusResponse {
        StatusResponse {
            code: 0,
            message: None,
            request_id: None,
            data: Some(TaskData {
                task_status: Some(TaskStatus::parse(status)),
                ..TaskData::default()
            }),
        }
    }

    fn rejected(code: i64, message: Option<&str>) -> StatusResponse {
        StatusResponse {
            code,
            message: message.map(str::to_string),
            request_id: None,
            data: None,
        }
    }

    #[test]
    fn classify_succeeded_carries_result() {
        let mut response = with_status("succeed");
        response.data.as_mut().unwrap().task_result =
            Some(TaskResult(json!({"videos": [{"id": "v", "url": "u"}]})));

        match classify(&response) {
            PollOutcome::Succeeded(result) => {
                assert_eq!(result.as_json()["videos"][0]["id"], "v");
            }
            other => panic!("expected success, got {other:?}"),
        }
    }

    #[test]
    fn classify_succeeded_without_result_is_null_payload() {
        assert_eq!(
            classify(&with_status("succeeded")),
            PollOutcome::Succeeded(TaskResult::default())
        );
    }

    #[test]
    fn classify_failed_uses_status_message() {
        let mut response = with_status("failed");
        response.data.as_mut().unwrap().task_status_msg = Some("bad input".into());

        assert_eq!(
            classify(&response),
            PollOutcome::Failed(TaskFailure::TaskFailed {
                message: "bad input".into()
            })
        );
    }

    #[test]
    fn classify_failed_without_message_uses_fallback() {
        let outcome = classify(&with_status("failed"));
        assert_eq!(
            outcome,
            PollOutcome::Failed(TaskFailure::TaskFailed {
                message: GENERIC_TASK_FAILURE.into()
            })
        );
    }

    #[test]
    fn classify_rejection_overrides_status() {
        let mut response = with_status("succeed");
        response.code = 1102;
        response.message = Some("account balance insufficient".into());

        let outcome = classify(&response);
        let PollOutcome::Failed(failure) = &outcome else {
            panic!("expected failure, got {outcome:?}");
        };
        assert_eq!(failure.code(), Some(1102));
        assert_eq!(failure.message(), "account balance insufficient");
    }

    #[test]
    fn classify_rejection_without_message_uses_code() {
        let PollOutcome::Failed(failure) = classify(&rejected(5, None)) else {
            panic!("expected failure");
        };
        assert_eq!(failure.message(), "request rejected with code 5");
    }

    #[test]
    fn classify_in_progress_statuses_continue() {
        for status in ["submitted", "processing", "something_new", ""] {
            assert_eq!(classify(&with_status(status)), PollOutcome::Continue, "{status}");
        }
        assert_eq!(classify(&rejected(0, None)), PollOutcome::Continue);
    }

    #[test]
    fn machine_starts_pending_at_attempt_one() {
        let machine = PollMachine::new(3);
        assert_eq!(machine.state(), &PollState::Pending { attempt: 1 });
        assert!(machine.outcome().is_none());
    }

    #[test]
    fn machine_advances_then_times_out() {
        let mut machine = PollMachine::new(3);
        let processing = with_status("processing");

        assert_eq!(machine.observe(&processing), &PollState::Pending { attempt: 2 });
        assert_eq!(machine.observe(&processing), &PollState::Pending { attempt: 3 });
        assert_eq!(
            machine.observe(&processing),
            &PollState::Resolved(PollOutcome::TimedOut { attempts: 3 })
        );
    }

    #[test]
    fn machine_resolves_on_terminal_response() {
        let mut machine = PollMachine::new(120);
        machine.observe(&with_status("processing"));
        let state = machine.observe(&rejected(7, Some("quota exceeded")));

        assert_eq!(
            state,
            &PollState::Resolved(PollOutcome::Failed(TaskFailure::Rejected {
                code: 7,
                message: "quota exceeded".into()
            }))
        );
    }

    #[test]
    fn machine_ignores_responses_after_resolution() {
        let mut machine = PollMachine::new(5);
        machine.observe(&with_status("failed"));
        let resolved = machine.state().clone();

        machine.observe(&with_status("succeed"));
        assert_eq!(machine.state(), &resolved);
    }

    #[test]
    fn machine_zero_budget_still_makes_one_attempt() {
        let mut machine = PollMachine::new(0);
        assert_eq!(machine.max_attempts(), 1);
        assert_eq!(
            machine.observe(&with_status("processing")),
            &PollState::Resolved(PollOutcome::TimedOut { attempts: 1 })
        );
    }

    #[test]
    fn machine_cancel_counts_completed_attempts() {
        let mut machine = PollMachine::new(10);
        assert_eq!(machine.cancel(), PollOutcome::Cancelled { attempts: 0 });

        let mut machine = PollMachine::new(10);
        machine.observe(&with_status("processing"));
        machine.observe(&with_status("processing"));
        assert_eq!(machine.cancel(), PollOutcome::Cancelled { attempts: 2 });
        assert_eq!(machine.outcome(), Some(&PollOutcome::Cancelled { attempts: 2 }));
    }

    #[test]
    fn machine_cancel_after_resolution_keeps_outcome() {
        let mut machine = PollMachine::new(10);
        machine.observe(&with_status("succeed"));

        assert!(machine.cancel().is_success());
    }

    #[test]
    fn outcome_terminality() {
        assert!(!PollOutcome::Continue.is_terminal());
        assert!(PollOutcome::TimedOut { attempts: 1 }.is_terminal());
        assert!(PollOutcome::Cancelled { attempts: 0 }.is_terminal());
        assert!(!PollOutcome::TimedOut { attempts: 1 }.is_success());
    }
}

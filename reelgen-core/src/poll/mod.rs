//! Bounded polling of a remote task.
//!
//! The poll is modelled as an explicit state machine:
//!
//! ```text
//! Pending{attempt: 1} --continue--> Pending{attempt: 2} --> ... --> TimedOut
//!        |                                  |
//!        +--> Succeeded | Failed            +--> Succeeded | Failed | Cancelled
//! ```
//!
//! - [`PollMachine`] - pure transitions, one [`StatusResponse`](crate::task::StatusResponse) at a time
//! - [`TaskPoller`] - async driver: queries a [`StatusCheck`], waits on a [`Sleeper`]
//!   between attempts, and honours an optional [`CancelSignal`]
//!
//! Only the "still working" case consumes the attempt budget. A rejected
//! request (`code != 0`) and an explicit `failed` status end the poll
//! immediately. Transport errors from the [`StatusCheck`] are returned
//! unchanged and are never retried.

mod cancel;
mod config;
mod machine;
mod poller;
mod sleep;

pub use cancel::{CancelHandle, CancelSignal};
pub use config::PollConfig;
pub use machine::{classify, PollMachine, PollOutcome, PollState, TaskFailure};
pub use poller::{poll_task, StatusCheck, TaskPoller};
pub use sleep::{Sleeper, TokioSleeper};

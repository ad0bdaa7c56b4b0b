//! # reelgen core
//!
//! Domain types and the polling state machine used to wait for a remote
//! video-generation task to finish.
//!
//! ## Design Principles
//!
//! This crate is intentionally **IO-free**:
//! - No network calls: status queries go through the [`poll::StatusCheck`] trait
//! - No real clock: waits go through the [`poll::Sleeper`] trait
//! - No environment or configuration files
//! - No logging: every outcome is returned to the caller as a value
//!
//! The HTTP transport lives in `reelgen-client`.
//!
//! ## Modules
//!
//! - [`task`] - Task ids, statuses and status-response payloads
//! - [`poll`] - Bounded polling: state machine, driver, sleep and cancellation

pub mod poll;
pub mod task;

// Re-export commonly used types at crate root for convenience.
pub use poll::{
    classify, poll_task, CancelHandle, CancelSignal, PollConfig, PollMachine, PollOutcome,
    PollState, Sleeper, StatusCheck, TaskFailure, TaskPoller, TokioSleeper,
};
pub use task::{StatusResponse, TaskData, TaskId, TaskResult, TaskStatus, VideoAsset};

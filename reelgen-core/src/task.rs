//! Remote task types as reported by the video API's status endpoint.
//!
//! Tasks are owned by the remote service. This crate only observes them, so
//! every type here is a read-only view of a JSON status response.

use std::fmt;

use serde::{Deserialize, Serialize};

// ============================================================================
// Identity
// ============================================================================

/// Opaque identifier the remote service assigns to a task.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(pub String);

impl TaskId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TaskId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

// ============================================================================
// Status
// ============================================================================

/// Lifecycle status of a remote task.
///
/// The wire value is a free-form string. Unrecognized values are kept in
/// [`TaskStatus::Other`] and treated as still in progress.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TaskStatus {
    /// Accepted but not started (`submitted`).
    Submitted,
    /// Being worked on (`processing`).
    Processing,
    /// Finished with a result (`succeed` or `succeeded`).
    Succeeded,
    /// Finished without a result (`failed`).
    Failed,
    /// Any other value; non-terminal.
    Other(String),
}

impl TaskStatus {
    /// Parse a wire status string.
    pub fn parse(status: &str) -> Self {
        match status {
            "submitted" => Self::Submitted,
            "processing" => Self::Processing,
            "succeed" | "succeeded" => Self::Succeeded,
            "failed" => Self::Failed,
            other => Self::Other(other.to_string()),
        }
    }

    /// The wire representation.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Submitted => "submitted",
            Self::Processing => "processing",
            Self::Succeeded => "succeed",
            Self::Failed => "failed",
            Self::Other(other) => other,
        }
    }

    /// Returns true if the task can no longer change status.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed)
    }
}

impl From<String> for TaskStatus {
    fn from(status: String) -> Self {
        Self::parse(&status)
    }
}

impl From<TaskStatus> for String {
    fn from(status: TaskStatus) -> Self {
        match status {
            TaskStatus::Other(other) => other,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Status Response
// ============================================================================

/// Body of a task status query.
///
/// ```json
/// {"code":0,"message":"SUCCEED","data":{"task_id":"..","task_status":"processing"}}
/// ```
///
/// A non-zero `code` is a rejection of the request itself; `data` is then
/// usually absent and must not be consulted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusResponse {
    /// Zero on success; anything else is a rejection.
    pub code: i64,

    /// Human-readable message accompanying `code`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Server-side request identifier, useful when reporting problems.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,

    /// Task snapshot.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<TaskData>,
}

impl StatusResponse {
    /// Returns true if the service rejected the request (`code != 0`).
    pub fn is_rejection(&self) -> bool {
        self.code != 0
    }

    /// The reported task status, if the response carries one.
    pub fn task_status(&self) -> Option<&TaskStatus> {
        self.data.as_ref()?.task_status.as_ref()
    }
}

/// Task snapshot inside a [`StatusResponse`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_id: Option<TaskId>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_status: Option<TaskStatus>,

    /// Explanation for the current status, typically set on failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_status_msg: Option<String>,

    /// Result payload, present once the task has succeeded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_result: Option<TaskResult>,
}

// ============================================================================
// Result Payload
// ============================================================================

/// Result payload of a succeeded task.
///
/// Kept as raw JSON since its shape depends on the kind of task; typed views
/// such as [`TaskResult::videos`] are layered on top.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskResult(pub serde_json::Value);

impl TaskResult {
    /// The raw JSON payload.
    pub fn as_json(&self) -> &serde_json::Value {
        &self.0
    }

    /// Generated videos listed under `videos`.
    ///
    /// Returns an empty list when the payload has no `videos` array.
    ///
    /// # Errors
    ///
    /// Returns an error if `videos` is present but its entries lack an `id`
    /// or `url`.
    pub fn videos(&self) -> Result<Vec<VideoAsset>, serde_json::Error> {
        match self.0.get("videos") {
            Some(videos) => Vec::<VideoAsset>::deserialize(videos),
            None => Ok(Vec::new()),
        }
    }
}

/// A generated video referenced by a task result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoAsset {
    pub id: String,
    pub url: String,
    /// Clip length in seconds; the service sends it as a string or a number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<serde_json::Value>,
}

impl VideoAsset {
    /// Clip length in seconds, if reported.
    pub fn duration_seconds(&self) -> Option<f64> {
        match self.duration.as_ref()? {
            serde_json::Value::Number(n) => n.as_f64(),
            serde_json::Value::String(s) => s.parse().ok(),
            _ => None,
        }
    }
}

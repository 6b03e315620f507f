//! Job outcomes and the failure taxonomy.
//!
//! A job finishes in exactly one of two ways: a value of the caller's output
//! type, or a [`Failure`] describing what went wrong. Only the outcome ever
//! crosses the child/parent process boundary, so everything in this module
//! that travels over the wire is serializable — and deliberately carries no
//! backtrace, which cannot survive marshaling.

use std::any::Any;

use serde::{Deserialize, Serialize};

/// Result of a single job as stored in its result slot.
pub type JobResult<T> = Result<T, Failure>;

/// Error type for failures raised by a job function itself.
///
/// This is the only failure detail that survives the trip out of the child
/// process: a short machine-readable kind plus a human-readable message.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct JobError {
    /// Error kind/code for programmatic handling
    pub kind: String,

    /// Error message
    pub message: String,
}

impl JobError {
    /// Create a new error with an explicit kind.
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            message: message.into(),
        }
    }

    /// Create a generic error from a message alone.
    pub fn message(message: impl Into<String>) -> Self {
        Self::new("error", message)
    }

    /// Capture a panic payload as an error.
    pub(crate) fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let message = if let Some(text) = payload.downcast_ref::<&str>() {
            (*text).to_string()
        } else if let Some(text) = payload.downcast_ref::<String>() {
            text.clone()
        } else {
            "job panicked".to_string()
        };
        Self::new("panic", message)
    }
}

impl std::fmt::Display for JobError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for JobError {}

impl From<anyhow::Error> for JobError {
    fn from(err: anyhow::Error) -> Self {
        Self::message(format!("{err:#}"))
    }
}

impl From<std::io::Error> for JobError {
    fn from(err: std::io::Error) -> Self {
        Self::new("io", err.to_string())
    }
}

/// Why a job produced no usable value.
///
/// Stored in the job's result slot; a failure here never stops the worker
/// that recorded it, and never disturbs sibling jobs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, thiserror::Error)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Failure {
    /// The job function failed inside the child (error return or panic).
    #[error("{error}")]
    Job {
        /// Error details as marshaled out of the child
        error: JobError,
    },

    /// The child exited without writing any outcome bytes.
    #[error("child did not output anything")]
    EmptyOutput,

    /// The child terminated with a nonzero status.
    ///
    /// `status` is the exit code when the child exited, or the negated
    /// signal number when it was killed.
    #[error("child exited with status {status}")]
    ChildExit {
        /// Collapsed wait status
        status: i32,
    },

    /// The OS refused to fork a child for this job.
    #[error("failed to spawn child process: {message}")]
    Spawn {
        /// Errno description from the failed fork
        message: String,
    },

    /// The child's outcome bytes could not be read or decoded.
    #[error("failed to decode child outcome: {message}")]
    Decode {
        /// Underlying read or parse error
        message: String,
    },
}

impl From<JobError> for Failure {
    fn from(error: JobError) -> Self {
        Self::Job { error }
    }
}

/// Wire form of a finished job, serialized by the child into the outcome
/// channel and decoded by the parent.
///
/// Kept separate from [`JobResult`] so that pool-level failures (empty
/// output, bad exit status) can never be confused with something a child
/// actually reported.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub(crate) enum Outcome<T> {
    /// The job function returned a value
    Success { value: T },

    /// The job function failed; details survive, the backtrace does not
    Failure { error: JobError },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_error_display() {
        let error = JobError::new("parse", "invalid digit");
        assert_eq!(error.to_string(), "parse: invalid digit");
    }

    #[test]
    fn test_job_error_from_message() {
        let error = JobError::message("boom");
        assert_eq!(error.kind, "error");
        assert_eq!(error.message, "boom");
    }

    #[test]
    fn test_job_error_from_anyhow() {
        let error: JobError = anyhow::anyhow!("lookup failed").into();
        assert_eq!(error.kind, "error");
        assert!(error.message.contains("lookup failed"));
    }

    #[test]
    fn test_job_error_from_panic_str() {
        let payload: Box<dyn Any + Send> = Box::new("index out of range");
        let error = JobError::from_panic(payload);
        assert_eq!(error.kind, "panic");
        assert_eq!(error.message, "index out of range");
    }

    #[test]
    fn test_job_error_from_panic_string() {
        let payload: Box<dyn Any + Send> = Box::new(String::from("bad state"));
        let error = JobError::from_panic(payload);
        assert_eq!(error.message, "bad state");
    }

    #[test]
    fn test_job_error_from_opaque_panic() {
        let payload: Box<dyn Any + Send> = Box::new(42_u32);
        let error = JobError::from_panic(payload);
        assert_eq!(error.message, "job panicked");
    }

    #[test]
    fn test_failure_display() {
        assert_eq!(
            Failure::EmptyOutput.to_string(),
            "child did not output anything"
        );
        assert_eq!(
            Failure::ChildExit { status: 3 }.to_string(),
            "child exited with status 3"
        );
        assert_eq!(
            Failure::from(JobError::new("panic", "overflow")).to_string(),
            "panic: overflow"
        );
    }

    #[test]
    fn test_failure_serialization_round_trip() {
        let failure = Failure::Job {
            error: JobError::new("panic", "divide by zero"),
        };

        let json = serde_json::to_string(&failure).unwrap();
        let parsed: Failure = serde_json::from_str(&json).unwrap();

        assert_eq!(failure, parsed);
    }

    #[test]
    fn test_outcome_round_trip_success() {
        let outcome = Outcome::Success { value: vec![1, 2, 3] };

        let json = serde_json::to_string(&outcome).unwrap();
        let parsed: Outcome<Vec<i32>> = serde_json::from_str(&json).unwrap();

        match parsed {
            Outcome::Success { value } => assert_eq!(value, vec![1, 2, 3]),
            Outcome::Failure { .. } => panic!("expected success"),
        }
    }

    #[test]
    fn test_outcome_round_trip_failure() {
        let outcome: Outcome<String> = Outcome::Failure {
            error: JobError::message("nope"),
        };

        let json = serde_json::to_string(&outcome).unwrap();
        let parsed: Outcome<String> = serde_json::from_str(&json).unwrap();

        match parsed {
            Outcome::Failure { error } => assert_eq!(error.message, "nope"),
            Outcome::Success { .. } => panic!("expected failure"),
        }
    }
}

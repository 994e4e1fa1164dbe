//! Core job data types.

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use rand::{distributions::Alphanumeric, Rng};
use serde::{Deserialize, Serialize};

/// Length of a generated job id.
pub const JOB_ID_LEN: usize = 10;

static PLAYER_NAME_RE: Lazy<regex_lite::Regex> =
    Lazy::new(|| regex_lite::Regex::new(r"^[A-Za-z0-9_]{1,16}$").unwrap());

/// Current status of a job.
///
/// State machine flow:
/// ```text
/// Waiting -> Generating -> Ready
///                 |
///                 v
///               Failed
/// ```
///
/// `Ready` and `Failed` are terminal; the worker never revisits a job.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    /// Job created, waiting in the queue.
    Waiting,
    /// The worker is resolving skins and assembling the pack.
    Generating,
    /// The pack archive is available for download.
    Ready,
    /// Generation failed; the job will not be retried.
    Failed,
}

impl JobStatus {
    /// Returns true if this is a terminal status (no further transitions).
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Ready | JobStatus::Failed)
    }

    /// Returns true if the job still occupies the submitter's active slot.
    pub fn is_active(&self) -> bool {
        matches!(self, JobStatus::Waiting | JobStatus::Generating)
    }

    /// Returns the status as a string (for filtering and storage).
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Waiting => "waiting",
            JobStatus::Generating => "generating",
            JobStatus::Ready => "ready",
            JobStatus::Failed => "failed",
        }
    }

    /// Parse a status from its storage representation.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "waiting" => Some(JobStatus::Waiting),
            "generating" => Some(JobStatus::Generating),
            "ready" => Some(JobStatus::Ready),
            "failed" => Some(JobStatus::Failed),
            _ => None,
        }
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A job representing one pack generation request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Job {
    /// Opaque generated token (10 alphanumeric characters).
    pub id: String,

    /// Submitter identity, typically the caller's network origin.
    /// Jobs without a submitter are not covered by the submission guard.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submitter: Option<String>,

    /// Player names requested for this pack, in submission order.
    pub names: Vec<String>,

    /// Current status.
    pub status: JobStatus,

    /// When the job was created (queue position).
    pub created_at: DateTime<Utc>,

    /// Last status change.
    pub updated_at: DateTime<Utc>,
}

/// Generate a new job id: 10 uniformly random alphanumeric characters.
///
/// Collisions are treated as negligible and not checked.
pub fn generate_job_id() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(JOB_ID_LEN)
        .map(char::from)
        .collect()
}

/// Returns true if `name` is a plausible Minecraft username
/// (1-16 characters, letters, digits and underscores).
pub fn is_valid_player_name(name: &str) -> bool {
    PLAYER_NAME_RE.is_match(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_terminal() {
        assert!(!JobStatus::Waiting.is_terminal());
        assert!(!JobStatus::Generating.is_terminal());
        assert!(JobStatus::Ready.is_terminal());
        assert!(JobStatus::Failed.is_terminal());
    }

    #[test]
    fn test_status_active() {
        assert!(JobStatus::Waiting.is_active());
        assert!(JobStatus::Generating.is_active());
        assert!(!JobStatus::Ready.is_active());
        assert!(!JobStatus::Failed.is_active());
    }

    #[test]
    fn test_status_roundtrip() {
        for status in [
            JobStatus::Waiting,
            JobStatus::Generating,
            JobStatus::Ready,
            JobStatus::Failed,
        ] {
            assert_eq!(JobStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(JobStatus::parse("bogus"), None);
    }

    #[test]
    fn test_status_serialization() {
        let json = serde_json::to_string(&JobStatus::Generating).unwrap();
        assert_eq!(json, r#""generating""#);

        let parsed: JobStatus = serde_json::from_str(r#""ready""#).unwrap();
        assert_eq!(parsed, JobStatus::Ready);
    }

    #[test]
    fn test_generate_job_id_shape() {
        let id = generate_job_id();
        assert_eq!(id.len(), JOB_ID_LEN);
        assert!(id.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_generate_job_id_unique_enough() {
        let a = generate_job_id();
        let b = generate_job_id();
        assert_ne!(a, b);
    }

    #[test]
    fn test_player_name_validation() {
        assert!(is_valid_player_name("Notch"));
        assert!(is_valid_player_name("jeb_"));
        assert!(is_valid_player_name("a"));
        assert!(is_valid_player_name("Sixteen_chars_ok"));

        assert!(!is_valid_player_name(""));
        assert!(!is_valid_player_name("seventeen_chars_x"));
        assert!(!is_valid_player_name("bad name"));
        assert!(!is_valid_player_name("héllo"));
    }
}

//! Job storage trait and query types.

use thiserror::Error;

use super::types::{Job, JobStatus};

/// Error type for ledger operations.
#[derive(Debug, Error)]
pub enum JobError {
    /// Job not found.
    #[error("Job not found: {0}")]
    NotFound(String),

    /// The submitter already has a job in the queue or in flight.
    #[error("Submitter {0} already has an active job")]
    ActiveJobExists(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),
}

/// Request to create a new job.
#[derive(Debug, Clone)]
pub struct CreateJobRequest {
    /// Submitter identity (network origin). None disables the guard.
    pub submitter: Option<String>,
    /// Player names to pack, in submission order.
    pub names: Vec<String>,
}

/// Filter for querying jobs.
#[derive(Debug, Clone, Default)]
pub struct JobFilter {
    /// Filter by status.
    pub status: Option<JobStatus>,
    /// Filter by submitter identity.
    pub submitter: Option<String>,
    /// Maximum number of results.
    pub limit: i64,
    /// Offset for pagination.
    pub offset: i64,
}

impl JobFilter {
    /// Create a new filter with defaults.
    pub fn new() -> Self {
        Self {
            status: None,
            submitter: None,
            limit: 100,
            offset: 0,
        }
    }

    /// Filter by status.
    pub fn with_status(mut self, status: JobStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Filter by submitter identity.
    pub fn with_submitter(mut self, submitter: impl Into<String>) -> Self {
        self.submitter = Some(submitter.into());
        self
    }

    /// Set limit.
    pub fn with_limit(mut self, limit: i64) -> Self {
        self.limit = limit;
        self
    }

    /// Set offset.
    pub fn with_offset(mut self, offset: i64) -> Self {
        self.offset = offset;
        self
    }
}

/// Trait for job ledger backends.
///
/// All results are ordered oldest-first by creation time, which is what both
/// the FIFO worker and the retention manager need.
pub trait JobStore: Send + Sync {
    /// Create a new job with status `Waiting`.
    fn create(&self, request: CreateJobRequest) -> Result<Job, JobError>;

    /// Get a job by id.
    fn get(&self, id: &str) -> Result<Option<Job>, JobError>;

    /// List jobs matching the filter, oldest first.
    fn list(&self, filter: &JobFilter) -> Result<Vec<Job>, JobError>;

    /// Count jobs matching the filter.
    fn count(&self, filter: &JobFilter) -> Result<i64, JobError>;

    /// Update a job's status.
    fn update_status(&self, id: &str, status: JobStatus) -> Result<Job, JobError>;

    /// Permanently delete a job. Returns the deleted job if found.
    fn delete(&self, id: &str) -> Result<Job, JobError>;

    /// The single oldest job matching the filter, if any.
    fn oldest(&self, filter: &JobFilter) -> Result<Option<Job>, JobError> {
        Ok(self.list(&filter.clone().with_limit(1))?.into_iter().next())
    }
}

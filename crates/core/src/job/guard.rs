//! Per-submitter submission guard.

use std::sync::Arc;

use super::store::{JobError, JobFilter, JobStore};
use super::types::JobStatus;

/// Rejects a new submission while the same submitter already has a job
/// waiting or generating. Submissions without a known submitter are never
/// guarded.
pub struct SubmissionGuard {
    store: Arc<dyn JobStore>,
}

impl SubmissionGuard {
    pub fn new(store: Arc<dyn JobStore>) -> Self {
        Self { store }
    }

    /// Returns an `ActiveJobExists` error if the submitter currently has an
    /// active (waiting or generating) job.
    pub fn check(&self, submitter: Option<&str>) -> Result<(), JobError> {
        let Some(submitter) = submitter else {
            return Ok(());
        };

        for status in [JobStatus::Waiting, JobStatus::Generating] {
            let filter = JobFilter::new()
                .with_submitter(submitter)
                .with_status(status);
            if self.store.count(&filter)? > 0 {
                return Err(JobError::ActiveJobExists(submitter.to_string()));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job::sqlite_store::SqliteJobStore;
    use crate::job::store::CreateJobRequest;

    fn setup() -> (Arc<SqliteJobStore>, SubmissionGuard) {
        let store = Arc::new(SqliteJobStore::in_memory().unwrap());
        let guard = SubmissionGuard::new(store.clone());
        (store, guard)
    }

    fn submit(store: &SqliteJobStore, submitter: Option<&str>) -> String {
        store
            .create(CreateJobRequest {
                submitter: submitter.map(|s| s.to_string()),
                names: vec!["Notch".to_string()],
            })
            .unwrap()
            .id
    }

    #[test]
    fn test_no_active_job_passes() {
        let (_, guard) = setup();
        assert!(guard.check(Some("192.0.2.1")).is_ok());
    }

    #[test]
    fn test_waiting_job_blocks() {
        let (store, guard) = setup();
        submit(&store, Some("192.0.2.1"));

        let result = guard.check(Some("192.0.2.1"));
        assert!(matches!(result, Err(JobError::ActiveJobExists(_))));
    }

    #[test]
    fn test_generating_job_blocks() {
        let (store, guard) = setup();
        let id = submit(&store, Some("192.0.2.1"));
        store.update_status(&id, JobStatus::Generating).unwrap();

        let result = guard.check(Some("192.0.2.1"));
        assert!(matches!(result, Err(JobError::ActiveJobExists(_))));
    }

    #[test]
    fn test_terminal_job_does_not_block() {
        let (store, guard) = setup();
        let id = submit(&store, Some("192.0.2.1"));
        store.update_status(&id, JobStatus::Ready).unwrap();

        assert!(guard.check(Some("192.0.2.1")).is_ok());

        let id = submit(&store, Some("192.0.2.1"));
        store.update_status(&id, JobStatus::Failed).unwrap();

        assert!(guard.check(Some("192.0.2.1")).is_ok());
    }

    #[test]
    fn test_other_submitter_not_blocked() {
        let (store, guard) = setup();
        submit(&store, Some("192.0.2.1"));

        assert!(guard.check(Some("192.0.2.2")).is_ok());
    }

    #[test]
    fn test_unknown_submitter_never_blocked() {
        let (store, guard) = setup();
        submit(&store, None);
        submit(&store, None);

        assert!(guard.check(None).is_ok());
    }
}

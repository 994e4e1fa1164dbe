pub mod guard;
pub mod sqlite_store;
pub mod store;
pub mod types;

pub use guard::SubmissionGuard;
pub use sqlite_store::SqliteJobStore;
pub use store::{CreateJobRequest, JobError, JobFilter, JobStore};
pub use types::{generate_job_id, is_valid_player_name, Job, JobStatus, JOB_ID_LEN};

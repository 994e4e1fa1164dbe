//! SQLite-backed job ledger implementation.

use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};

use super::store::{CreateJobRequest, JobError, JobFilter, JobStore};
use super::types::{generate_job_id, Job, JobStatus};

const JOB_COLUMNS: &str = "id, submitter, names, status, created_at, updated_at";

/// SQLite-backed job ledger.
///
/// The connection is wrapped in a `Mutex`, so every row operation is atomic
/// with respect to concurrent readers (submission path vs worker path).
pub struct SqliteJobStore {
    conn: Mutex<Connection>,
}

impl SqliteJobStore {
    /// Create a new SQLite job store, creating the database file and tables if needed.
    pub fn new(path: &Path) -> Result<Self, JobError> {
        let conn = Connection::open(path).map_err(|e| JobError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory SQLite job store (useful for testing).
    pub fn in_memory() -> Result<Self, JobError> {
        let conn = Connection::open_in_memory().map_err(|e| JobError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn initialize_schema(conn: &Connection) -> Result<(), JobError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS jobs (
                id TEXT PRIMARY KEY,
                submitter TEXT,
                names TEXT NOT NULL,
                status TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_jobs_submitter ON jobs(submitter);
            CREATE INDEX IF NOT EXISTS idx_jobs_status ON jobs(status);
            CREATE INDEX IF NOT EXISTS idx_jobs_created_at ON jobs(created_at);
            "#,
        )
        .map_err(|e| JobError::Database(e.to_string()))?;

        Ok(())
    }

    fn build_where_clause(filter: &JobFilter) -> (String, Vec<Box<dyn rusqlite::ToSql>>) {
        let mut conditions = Vec::new();
        let mut params: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(status) = filter.status {
            conditions.push("status = ?");
            params.push(Box::new(status.as_str().to_string()));
        }

        if let Some(ref submitter) = filter.submitter {
            conditions.push("submitter = ?");
            params.push(Box::new(submitter.clone()));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        (where_clause, params)
    }

    fn row_to_job(row: &rusqlite::Row) -> rusqlite::Result<Job> {
        let id: String = row.get(0)?;
        let submitter: Option<String> = row.get(1)?;
        let names_json: String = row.get(2)?;
        let status_str: String = row.get(3)?;
        let created_at_str: String = row.get(4)?;
        let updated_at_str: String = row.get(5)?;

        // Parse timestamps - use now if parsing fails (shouldn't happen with valid data)
        let created_at = DateTime::parse_from_rfc3339(&created_at_str)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now());

        let updated_at = DateTime::parse_from_rfc3339(&updated_at_str)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now());

        let names: Vec<String> = serde_json::from_str(&names_json).unwrap_or_default();
        let status = JobStatus::parse(&status_str).unwrap_or(JobStatus::Failed);

        Ok(Job {
            id,
            submitter,
            names,
            status,
            created_at,
            updated_at,
        })
    }
}

impl JobStore for SqliteJobStore {
    fn create(&self, request: CreateJobRequest) -> Result<Job, JobError> {
        let conn = self.conn.lock().unwrap();

        let id = generate_job_id();
        let now = Utc::now();
        let status = JobStatus::Waiting;

        let names_json =
            serde_json::to_string(&request.names).map_err(|e| JobError::Database(e.to_string()))?;

        conn.execute(
            "INSERT INTO jobs (id, submitter, names, status, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?)",
            params![
                id,
                request.submitter,
                names_json,
                status.as_str(),
                now.to_rfc3339(),
                now.to_rfc3339(),
            ],
        )
        .map_err(|e| JobError::Database(e.to_string()))?;

        Ok(Job {
            id,
            submitter: request.submitter,
            names: request.names,
            status,
            created_at: now,
            updated_at: now,
        })
    }

    fn get(&self, id: &str) -> Result<Option<Job>, JobError> {
        let conn = self.conn.lock().unwrap();

        let result = conn.query_row(
            &format!("SELECT {JOB_COLUMNS} FROM jobs WHERE id = ?"),
            params![id],
            Self::row_to_job,
        );

        match result {
            Ok(job) => Ok(Some(job)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(JobError::Database(e.to_string())),
        }
    }

    fn list(&self, filter: &JobFilter) -> Result<Vec<Job>, JobError> {
        let conn = self.conn.lock().unwrap();

        let (where_clause, params) = Self::build_where_clause(filter);

        // rowid keeps FIFO stable when two jobs land in the same timestamp tick
        let sql = format!(
            "SELECT {JOB_COLUMNS} FROM jobs {} ORDER BY created_at ASC, rowid ASC LIMIT ? OFFSET ?",
            where_clause
        );

        let mut stmt = conn
            .prepare(&sql)
            .map_err(|e| JobError::Database(e.to_string()))?;

        let mut all_params: Vec<Box<dyn rusqlite::ToSql>> = params;
        all_params.push(Box::new(filter.limit));
        all_params.push(Box::new(filter.offset));

        let param_refs: Vec<&dyn rusqlite::ToSql> = all_params.iter().map(|p| p.as_ref()).collect();

        let rows = stmt
            .query_map(param_refs.as_slice(), Self::row_to_job)
            .map_err(|e| JobError::Database(e.to_string()))?;

        let mut jobs = Vec::new();
        for row_result in rows {
            let job = row_result.map_err(|e| JobError::Database(e.to_string()))?;
            jobs.push(job);
        }

        Ok(jobs)
    }

    fn count(&self, filter: &JobFilter) -> Result<i64, JobError> {
        let conn = self.conn.lock().unwrap();

        let (where_clause, params) = Self::build_where_clause(filter);

        let sql = format!("SELECT COUNT(*) FROM jobs {}", where_clause);

        let param_refs: Vec<&dyn rusqlite::ToSql> = params.iter().map(|p| p.as_ref()).collect();

        let count: i64 = conn
            .query_row(&sql, param_refs.as_slice(), |row| row.get(0))
            .map_err(|e| JobError::Database(e.to_string()))?;

        Ok(count)
    }

    fn update_status(&self, id: &str, status: JobStatus) -> Result<Job, JobError> {
        let conn = self.conn.lock().unwrap();

        let current = conn.query_row(
            &format!("SELECT {JOB_COLUMNS} FROM jobs WHERE id = ?"),
            params![id],
            Self::row_to_job,
        );

        let current_job = match current {
            Ok(job) => job,
            Err(rusqlite::Error::QueryReturnedNoRows) => {
                return Err(JobError::NotFound(id.to_string()));
            }
            Err(e) => return Err(JobError::Database(e.to_string())),
        };

        let now = Utc::now();

        conn.execute(
            "UPDATE jobs SET status = ?, updated_at = ? WHERE id = ?",
            params![status.as_str(), now.to_rfc3339(), id],
        )
        .map_err(|e| JobError::Database(e.to_string()))?;

        Ok(Job {
            status,
            updated_at: now,
            ..current_job
        })
    }

    fn delete(&self, id: &str) -> Result<Job, JobError> {
        let conn = self.conn.lock().unwrap();

        let job = conn.query_row(
            &format!("SELECT {JOB_COLUMNS} FROM jobs WHERE id = ?"),
            params![id],
            Self::row_to_job,
        );

        let job = match job {
            Ok(j) => j,
            Err(rusqlite::Error::QueryReturnedNoRows) => {
                return Err(JobError::NotFound(id.to_string()));
            }
            Err(e) => return Err(JobError::Database(e.to_string())),
        };

        conn.execute("DELETE FROM jobs WHERE id = ?", params![id])
            .map_err(|e| JobError::Database(e.to_string()))?;

        Ok(job)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_store() -> SqliteJobStore {
        SqliteJobStore::in_memory().unwrap()
    }

    fn create_test_request() -> CreateJobRequest {
        CreateJobRequest {
            submitter: Some("203.0.113.7".to_string()),
            names: vec!["Notch".to_string(), "jeb_".to_string()],
        }
    }

    #[test]
    fn test_create_job() {
        let store = create_test_store();
        let request = create_test_request();

        let job = store.create(request.clone()).unwrap();

        assert_eq!(job.id.len(), 10);
        assert_eq!(job.submitter, request.submitter);
        assert_eq!(job.names, request.names);
        assert_eq!(job.status, JobStatus::Waiting);
    }

    #[test]
    fn test_get_job() {
        let store = create_test_store();

        let created = store.create(create_test_request()).unwrap();
        let fetched = store.get(&created.id).unwrap();

        assert!(fetched.is_some());
        let fetched = fetched.unwrap();
        assert_eq!(fetched.id, created.id);
        assert_eq!(fetched.names, created.names);
    }

    #[test]
    fn test_get_nonexistent_job() {
        let store = create_test_store();
        let result = store.get("zzzzzzzzzz").unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_create_without_submitter() {
        let store = create_test_store();
        let job = store
            .create(CreateJobRequest {
                submitter: None,
                names: vec!["Notch".to_string()],
            })
            .unwrap();

        let fetched = store.get(&job.id).unwrap().unwrap();
        assert!(fetched.submitter.is_none());
    }

    #[test]
    fn test_list_jobs_oldest_first() {
        let store = create_test_store();

        let mut ids = Vec::new();
        for i in 0..3 {
            let job = store
                .create(CreateJobRequest {
                    submitter: Some(format!("10.0.0.{}", i)),
                    names: vec!["Notch".to_string()],
                })
                .unwrap();
            ids.push(job.id);
        }

        let jobs = store.list(&JobFilter::new()).unwrap();
        assert_eq!(jobs.len(), 3);
        let listed: Vec<String> = jobs.into_iter().map(|j| j.id).collect();
        assert_eq!(listed, ids);
    }

    #[test]
    fn test_list_with_status_filter() {
        let store = create_test_store();

        store.create(create_test_request()).unwrap();
        let job2 = store.create(create_test_request()).unwrap();
        store.update_status(&job2.id, JobStatus::Ready).unwrap();

        let waiting = store
            .list(&JobFilter::new().with_status(JobStatus::Waiting))
            .unwrap();
        assert_eq!(waiting.len(), 1);

        let ready = store
            .list(&JobFilter::new().with_status(JobStatus::Ready))
            .unwrap();
        assert_eq!(ready.len(), 1);
        assert_eq!(ready[0].id, job2.id);
    }

    #[test]
    fn test_list_with_submitter_filter() {
        let store = create_test_store();

        store
            .create(CreateJobRequest {
                submitter: Some("198.51.100.1".to_string()),
                names: vec!["Notch".to_string()],
            })
            .unwrap();
        store
            .create(CreateJobRequest {
                submitter: Some("198.51.100.2".to_string()),
                names: vec!["jeb_".to_string()],
            })
            .unwrap();

        let filter = JobFilter::new().with_submitter("198.51.100.1");
        let jobs = store.list(&filter).unwrap();
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].submitter.as_deref(), Some("198.51.100.1"));
    }

    #[test]
    fn test_count_jobs() {
        let store = create_test_store();

        for _ in 0..3 {
            store.create(create_test_request()).unwrap();
        }

        let count = store.count(&JobFilter::new()).unwrap();
        assert_eq!(count, 3);
    }

    #[test]
    fn test_count_with_filter() {
        let store = create_test_store();

        store.create(create_test_request()).unwrap();
        let job2 = store.create(create_test_request()).unwrap();
        store.update_status(&job2.id, JobStatus::Failed).unwrap();

        let count = store
            .count(&JobFilter::new().with_status(JobStatus::Waiting))
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_update_status() {
        let store = create_test_store();
        let job = store.create(create_test_request()).unwrap();

        let updated = store.update_status(&job.id, JobStatus::Generating).unwrap();
        assert_eq!(updated.status, JobStatus::Generating);

        // Verify persistence
        let fetched = store.get(&job.id).unwrap().unwrap();
        assert_eq!(fetched.status, JobStatus::Generating);
        assert!(fetched.updated_at >= job.updated_at);
    }

    #[test]
    fn test_update_status_nonexistent() {
        let store = create_test_store();
        let result = store.update_status("zzzzzzzzzz", JobStatus::Ready);
        assert!(matches!(result, Err(JobError::NotFound(_))));
    }

    #[test]
    fn test_delete_job() {
        let store = create_test_store();
        let job = store.create(create_test_request()).unwrap();

        let deleted = store.delete(&job.id).unwrap();
        assert_eq!(deleted.id, job.id);

        assert!(store.get(&job.id).unwrap().is_none());
    }

    #[test]
    fn test_delete_nonexistent() {
        let store = create_test_store();
        let result = store.delete("zzzzzzzzzz");
        assert!(matches!(result, Err(JobError::NotFound(_))));
    }

    #[test]
    fn test_oldest_waiting() {
        let store = create_test_store();

        let first = store.create(create_test_request()).unwrap();
        store.create(create_test_request()).unwrap();

        let oldest = store
            .oldest(&JobFilter::new().with_status(JobStatus::Waiting))
            .unwrap();
        assert_eq!(oldest.unwrap().id, first.id);
    }

    #[test]
    fn test_file_based_store() {
        let temp_dir = tempfile::tempdir().unwrap();
        let db_path = temp_dir.path().join("jobs.db");

        let store = SqliteJobStore::new(&db_path).unwrap();
        let job = store.create(create_test_request()).unwrap();

        assert!(db_path.exists());

        let fetched = store.get(&job.id).unwrap();
        assert!(fetched.is_some());
    }
}

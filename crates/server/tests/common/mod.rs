//! Common test utilities for E2E testing with a mock upstream.
//!
//! Provides a test fixture that builds an in-process server backed by a
//! mock Mojang API, with an optional real generation worker running
//! against a temporary database and artifacts directory.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use skinforge_core::{
    testing::MockMojangApi, Config, DatabaseConfig, JobStatus, JobStore, PackAssembler,
    PackWorker, RetentionPolicy, SkinResolver, SqliteJobStore, StorageConfig, WorkerConfig,
};

/// Poll interval used by the test worker, much shorter than production.
const TEST_POLL_INTERVAL_MS: u64 = 20;

/// Test fixture for E2E testing with a mock Mojang upstream.
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    /// Mock Mojang API - configure profiles and failures
    pub mojang: Arc<MockMojangApi>,
    /// Job store, for direct inspection
    pub store: Arc<dyn JobStore>,
    /// Temporary directory for the database and artifacts
    pub temp_dir: TempDir,
    worker: Option<Arc<PackWorker>>,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

/// Configuration for test fixture.
#[derive(Debug, Clone)]
pub struct TestConfig {
    /// Run a real generation worker against the mock upstream
    pub enable_worker: bool,
    /// Retention cap for the worker
    pub max_jobs: usize,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            enable_worker: false,
            max_jobs: 40,
        }
    }
}

impl TestConfig {
    /// Create config with the generation worker enabled.
    pub fn with_worker() -> Self {
        Self {
            enable_worker: true,
            ..Default::default()
        }
    }
}

impl TestFixture {
    /// Create a new test fixture without a worker (API surface only).
    pub async fn new() -> Self {
        Self::with_config(TestConfig::default()).await
    }

    /// Create a test fixture with custom configuration.
    pub async fn with_config(test_config: TestConfig) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("test.db");
        let artifacts_path = temp_dir.path().join("artifacts");

        let config = Config {
            database: DatabaseConfig {
                path: db_path.clone(),
            },
            storage: StorageConfig {
                artifacts_path: artifacts_path.clone(),
            },
            ..Default::default()
        };

        let store: Arc<dyn JobStore> = Arc::new(
            SqliteJobStore::new(&db_path).expect("Failed to create job store"),
        );

        let mojang = Arc::new(MockMojangApi::new());
        let assembler = Arc::new(PackAssembler::new(
            artifacts_path,
            config.pack.item.clone(),
        ));

        let worker = if test_config.enable_worker {
            let resolver = Arc::new(SkinResolver::new(
                Arc::clone(&mojang) as Arc<dyn skinforge_core::resolver::MojangApi>,
                Duration::from_millis(0),
            ));
            let worker = Arc::new(PackWorker::new(
                WorkerConfig {
                    poll_interval_ms: TEST_POLL_INTERVAL_MS,
                },
                Arc::clone(&store),
                resolver,
                Arc::clone(&assembler),
                RetentionPolicy {
                    max_jobs: test_config.max_jobs,
                },
            ));
            worker.start().await;
            Some(worker)
        } else {
            None
        };

        let state = Arc::new(skinforge_server::state::AppState::new(
            config,
            Arc::clone(&store),
            assembler,
            worker.clone(),
        ));

        let router = skinforge_server::api::create_router(state);

        Self {
            router,
            mojang,
            store,
            temp_dir,
            worker,
        }
    }

    /// Stop the worker if one is running.
    pub async fn stop_worker(&self) {
        if let Some(ref worker) = self.worker {
            worker.stop().await;
        }
    }

    /// Poll the store until the job reaches the expected status.
    ///
    /// Panics if the job lands on a different terminal status or the
    /// timeout elapses.
    pub async fn wait_for_status(&self, job_id: &str, expected: JobStatus) {
        let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
        loop {
            let job = self
                .store
                .get(job_id)
                .expect("store error while polling")
                .expect("job disappeared while polling");
            if job.status == expected {
                return;
            }
            if job.status.is_terminal() {
                panic!(
                    "job {} reached {:?} while waiting for {:?}",
                    job_id, job.status, expected
                );
            }
            if tokio::time::Instant::now() > deadline {
                panic!(
                    "timed out waiting for job {} to reach {:?} (currently {:?})",
                    job_id, expected, job.status
                );
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    }

    /// Send a GET request to the test server.
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request("GET", path, None, &[]).await
    }

    /// Send a POST request with JSON body.
    pub async fn post(&self, path: &str, body: Value) -> TestResponse {
        self.request("POST", path, Some(body), &[]).await
    }

    /// Send a POST request with JSON body and extra headers.
    pub async fn post_with_headers(
        &self,
        path: &str,
        body: Value,
        headers: &[(&str, &str)],
    ) -> TestResponse {
        self.request("POST", path, Some(body), headers).await
    }

    /// Send a GET request and return the raw response body.
    pub async fn get_bytes(&self, path: &str) -> (StatusCode, Vec<u8>) {
        let request = Request::builder()
            .method("GET")
            .uri(path)
            .body(Body::empty())
            .unwrap();

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes()
            .to_vec();

        (status, body)
    }

    /// Send a request to the test server.
    async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        headers: &[(&str, &str)],
    ) -> TestResponse {
        let mut request_builder = Request::builder().method(method).uri(path);

        for (name, value) in headers {
            request_builder = request_builder.header(*name, *value);
        }

        let body = if let Some(json_body) = body {
            request_builder = request_builder.header("Content-Type", "application/json");
            Body::from(serde_json::to_vec(&json_body).unwrap())
        } else {
            Body::empty()
        };

        let request = request_builder.body(body).unwrap();

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        let body: Value = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
        };

        TestResponse { status, body }
    }
}

/// Helper to assert a response has expected status.
#[macro_export]
macro_rules! assert_status {
    ($response:expr, $status:expr) => {
        assert_eq!(
            $response.status, $status,
            "Expected status {:?}, got {:?}. Body: {}",
            $status,
            $response.status,
            serde_json::to_string_pretty(&$response.body).unwrap_or_default()
        );
    };
}

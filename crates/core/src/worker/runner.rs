//! Pack generation worker.
//!
//! Drains the job queue one job at a time, in submission order. Pacing of
//! upstream calls lives in the resolver, so a single sequential worker is
//! what keeps the service inside Mojang's rate limits.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

use crate::assembler::PackAssembler;
use crate::job::{Job, JobFilter, JobStatus, JobStore};
use crate::metrics;
use crate::resolver::SkinResolver;

use super::config::WorkerConfig;
use super::retention::RetentionPolicy;
use super::types::{WorkerError, WorkerStatus};

/// The pack worker - drives jobs from waiting to a terminal state.
pub struct PackWorker {
    config: WorkerConfig,
    store: Arc<dyn JobStore>,
    resolver: Arc<SkinResolver>,
    assembler: Arc<PackAssembler>,
    retention: RetentionPolicy,

    // Runtime state
    running: Arc<AtomicBool>,
    shutdown_tx: broadcast::Sender<()>,
}

impl PackWorker {
    pub fn new(
        config: WorkerConfig,
        store: Arc<dyn JobStore>,
        resolver: Arc<SkinResolver>,
        assembler: Arc<PackAssembler>,
        retention: RetentionPolicy,
    ) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);

        Self {
            config,
            store,
            resolver,
            assembler,
            retention,
            running: Arc::new(AtomicBool::new(false)),
            shutdown_tx,
        }
    }

    /// Start the worker (spawns the background poll loop).
    pub async fn start(&self) {
        if self.running.swap(true, Ordering::SeqCst) {
            warn!("Worker already running");
            return;
        }

        info!("Starting pack worker");

        // Jobs caught mid-generation by a shutdown have no recoverable
        // progress, fail them rather than re-run half-finished work.
        self.fail_interrupted_jobs();

        self.spawn_poll_loop();

        info!("Pack worker started");
    }

    /// Stop the worker gracefully.
    pub async fn stop(&self) {
        if !self.running.swap(false, Ordering::SeqCst) {
            warn!("Worker not running");
            return;
        }

        info!("Stopping pack worker");

        let _ = self.shutdown_tx.send(());

        // Give the loop a moment to notice
        tokio::time::sleep(Duration::from_millis(100)).await;

        info!("Pack worker stopped");
    }

    /// Get current worker status.
    pub fn status(&self) -> WorkerStatus {
        let waiting_count = self
            .store
            .count(&JobFilter::new().with_status(JobStatus::Waiting))
            .unwrap_or(0) as usize;

        let generating_count = self
            .store
            .count(&JobFilter::new().with_status(JobStatus::Generating))
            .unwrap_or(0) as usize;

        WorkerStatus {
            running: self.running.load(Ordering::Relaxed),
            waiting_count,
            generating_count,
        }
    }

    /// Fail jobs that were generating when the previous process stopped.
    fn fail_interrupted_jobs(&self) {
        let filter = JobFilter::new()
            .with_status(JobStatus::Generating)
            .with_limit(100);

        match self.store.list(&filter) {
            Ok(jobs) => {
                for job in jobs {
                    warn!("failing job {} interrupted mid-generation", job.id);
                    if let Err(e) = self.store.update_status(&job.id, JobStatus::Failed) {
                        error!("Failed to mark interrupted job {}: {}", job.id, e);
                    }
                }
            }
            Err(e) => {
                error!("Failed to scan for interrupted jobs: {}", e);
            }
        }
    }

    /// Spawn the poll loop task.
    fn spawn_poll_loop(&self) {
        let running = Arc::clone(&self.running);
        let store = Arc::clone(&self.store);
        let resolver = Arc::clone(&self.resolver);
        let assembler = Arc::clone(&self.assembler);
        let retention = self.retention.clone();
        let config = self.config.clone();
        let mut shutdown_rx = self.shutdown_tx.subscribe();

        tokio::spawn(async move {
            info!("Worker loop started");
            loop {
                tokio::select! {
                    _ = shutdown_rx.recv() => {
                        info!("Worker loop received shutdown signal");
                        break;
                    }
                    _ = tokio::time::sleep(Duration::from_millis(config.poll_interval_ms)) => {
                        if !running.load(Ordering::Relaxed) {
                            break;
                        }
                        if let Err(e) = Self::process_one_waiting(
                            &store,
                            &resolver,
                            &assembler,
                            &retention,
                        ).await {
                            warn!("Worker error: {}", e);
                        }
                    }
                }
            }
            info!("Worker loop stopped");
        });
    }

    /// Process one waiting job, oldest first.
    async fn process_one_waiting(
        store: &Arc<dyn JobStore>,
        resolver: &Arc<SkinResolver>,
        assembler: &Arc<PackAssembler>,
        retention: &RetentionPolicy,
    ) -> Result<(), WorkerError> {
        let filter = JobFilter::new().with_status(JobStatus::Waiting);
        let Some(job) = store.oldest(&filter)? else {
            return Ok(()); // Nothing to do
        };

        debug!("Processing waiting job: {}", job.id);

        store.update_status(&job.id, JobStatus::Generating)?;

        let started = Instant::now();
        let result = Self::generate(resolver, assembler, &job).await;
        let elapsed = started.elapsed().as_secs_f64();

        match result {
            Ok(skin_count) => {
                store.update_status(&job.id, JobStatus::Ready)?;
                metrics::JOBS_PROCESSED.with_label_values(&["ready"]).inc();
                metrics::GENERATION_DURATION
                    .with_label_values(&["ready"])
                    .observe(elapsed);

                info!(
                    "Job {} ready: {} skins in {:.1}s",
                    job.id, skin_count, elapsed
                );
            }
            Err(e) => {
                store.update_status(&job.id, JobStatus::Failed)?;
                metrics::JOBS_PROCESSED.with_label_values(&["failed"]).inc();
                metrics::GENERATION_DURATION
                    .with_label_values(&["failed"])
                    .observe(elapsed);

                warn!("Job {} failed: {}", job.id, e);
            }
        }

        // The cap is checked after every completion, success or not
        if let Err(e) = retention.enforce(store, assembler) {
            warn!("Retention enforcement failed: {}", e);
        }

        Ok(())
    }

    /// Resolve skins and assemble the pack for one job.
    async fn generate(
        resolver: &Arc<SkinResolver>,
        assembler: &Arc<PackAssembler>,
        job: &Job,
    ) -> Result<usize, WorkerError> {
        let skins = resolver.resolve(&job.names).await?;

        metrics::SKINS_RESOLVED.observe(skins.len() as f64);

        assembler.assemble(&job.id, &skins)?;

        Ok(skins.len())
    }
}

use std::sync::Arc;

use skinforge_core::{
    Config, JobStore, PackAssembler, PackWorker, SubmissionGuard, WorkerStatus,
};

/// Shared application state
pub struct AppState {
    config: Config,
    store: Arc<dyn JobStore>,
    guard: SubmissionGuard,
    assembler: Arc<PackAssembler>,
    worker: Option<Arc<PackWorker>>,
}

impl AppState {
    pub fn new(
        config: Config,
        store: Arc<dyn JobStore>,
        assembler: Arc<PackAssembler>,
        worker: Option<Arc<PackWorker>>,
    ) -> Self {
        let guard = SubmissionGuard::new(Arc::clone(&store));

        Self {
            config,
            store,
            guard,
            assembler,
            worker,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn store(&self) -> &Arc<dyn JobStore> {
        &self.store
    }

    pub fn guard(&self) -> &SubmissionGuard {
        &self.guard
    }

    pub fn assembler(&self) -> &Arc<PackAssembler> {
        &self.assembler
    }

    pub fn worker_status(&self) -> Option<WorkerStatus> {
        self.worker.as_ref().map(|w| w.status())
    }
}

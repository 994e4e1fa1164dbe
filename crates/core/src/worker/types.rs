//! Worker types.

use serde::Serialize;
use thiserror::Error;

use crate::assembler::AssemblerError;
use crate::job::JobError;
use crate::resolver::ResolverError;

#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("Job store error: {0}")]
    Job(#[from] JobError),

    #[error("Skin resolution failed: {0}")]
    Resolver(#[from] ResolverError),

    #[error("Pack assembly failed: {0}")]
    Assembler(#[from] AssemblerError),
}

/// Snapshot of the worker for status endpoints.
#[derive(Debug, Clone, Default, Serialize)]
pub struct WorkerStatus {
    pub running: bool,
    pub waiting_count: usize,
    pub generating_count: usize,
}

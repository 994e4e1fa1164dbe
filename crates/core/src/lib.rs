//! Core library for the skin pack generation service.
//!
//! - `job`: durable job ledger (SQLite) and submission guard
//! - `resolver`: Mojang API client and skin resolution pipeline
//! - `assembler`: resource pack layout and archive packaging
//! - `worker`: sequential generation worker and retention
//! - `config`: TOML + environment configuration
//! - `testing`: mock upstream for tests

pub mod assembler;
pub mod config;
pub mod job;
pub mod metrics;
pub mod resolver;
pub mod testing;
pub mod worker;

pub use assembler::{AssemblerError, PackAssembler, ARCHIVE_NAME};
pub use config::{
    Config, ConfigError, DatabaseConfig, PackConfig, ServerConfig, StorageConfig,
};
pub use job::{
    is_valid_player_name, CreateJobRequest, Job, JobError, JobFilter, JobStatus, JobStore,
    SqliteJobStore, SubmissionGuard,
};
pub use resolver::{MojangClient, MojangConfig, ResolverError, SkinResolver};
pub use worker::{PackWorker, RetentionPolicy, WorkerConfig, WorkerError, WorkerStatus};

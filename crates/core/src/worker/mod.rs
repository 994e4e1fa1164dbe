pub mod config;
pub mod retention;
pub mod runner;
pub mod types;

pub use config::WorkerConfig;
pub use retention::RetentionPolicy;
pub use runner::PackWorker;
pub use types::{WorkerError, WorkerStatus};

//! Job retention.
//!
//! Keeps the ledger bounded by evicting at most one job per enforcement
//! pass, so the cap is only ever exceeded transiently between completions.
//! Only terminal jobs are eviction candidates: a waiting or generating job
//! is never deleted out from under a submitter.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::assembler::PackAssembler;
use crate::job::{Job, JobFilter, JobStatus, JobStore};
use crate::metrics;

use super::types::WorkerError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetentionPolicy {
    /// Maximum number of jobs kept in the ledger.
    #[serde(default = "default_max_jobs")]
    pub max_jobs: usize,
}

fn default_max_jobs() -> usize {
    40
}

impl Default for RetentionPolicy {
    fn default() -> Self {
        Self {
            max_jobs: default_max_jobs(),
        }
    }
}

impl RetentionPolicy {
    /// Evict the oldest terminal job if the ledger exceeds the cap.
    /// Returns the evicted job id, if any.
    pub fn enforce(
        &self,
        store: &Arc<dyn JobStore>,
        assembler: &PackAssembler,
    ) -> Result<Option<String>, WorkerError> {
        let total = store.count(&JobFilter::new())?;
        if total <= self.max_jobs as i64 {
            return Ok(None);
        }

        let Some(victim) = self.oldest_terminal(store)? else {
            return Ok(None);
        };

        store.delete(&victim.id)?;
        assembler.remove_artifact(&victim.id)?;
        metrics::JOBS_EVICTED.inc();

        info!(
            "evicted job {} ({}) to stay under retention cap of {}",
            victim.id,
            victim.status.as_str(),
            self.max_jobs
        );

        Ok(Some(victim.id))
    }

    fn oldest_terminal(&self, store: &Arc<dyn JobStore>) -> Result<Option<Job>, WorkerError> {
        let ready = store.oldest(&JobFilter::new().with_status(JobStatus::Ready))?;
        let failed = store.oldest(&JobFilter::new().with_status(JobStatus::Failed))?;

        Ok(match (ready, failed) {
            (Some(r), Some(f)) => {
                if r.created_at <= f.created_at {
                    Some(r)
                } else {
                    Some(f)
                }
            }
            (Some(r), None) => Some(r),
            (None, Some(f)) => Some(f),
            (None, None) => None,
        })
    }
}

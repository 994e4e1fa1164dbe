//! Skin resolution pipeline.
//!
//! Turns a batch of player names into downloaded, classified skin textures
//! by walking the Mojang APIs: bulk name lookup, per-profile skin fetch,
//! then texture download. Lookup and profile calls are paced; texture
//! downloads hit a CDN and are not.

pub mod mojang;
pub mod pacer;
pub mod types;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, warn};

use crate::metrics;
use mojang::LOOKUP_CHUNK_SIZE;
use pacer::RequestPacer;
use types::{PlayerIdentity, ResolvedSkin, SkinVariant};

pub use mojang::{MojangApi, MojangClient, MojangConfig};

/// Errors from skin resolution.
#[derive(Debug, Error)]
pub enum ResolverError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Upstream API error (status {status}): {message}")]
    ApiError { status: u16, message: String },

    #[error("Failed to parse upstream response: {0}")]
    ParseError(String),

    #[error("Profile not found: {0}")]
    ProfileNotFound(String),

    #[error("None of the requested names resolved to a profile")]
    NoProfilesFound,

    #[error("Invalid texture data: {0}")]
    InvalidTexture(String),
}

/// Resolves player names into skins via a [`MojangApi`] implementation.
pub struct SkinResolver {
    api: Arc<dyn MojangApi>,
    pacer: RequestPacer,
}

impl SkinResolver {
    pub fn new(api: Arc<dyn MojangApi>, pacing: Duration) -> Self {
        Self {
            api,
            pacer: RequestPacer::new(pacing),
        }
    }

    /// Resolve a batch of names into skins, in request order.
    ///
    /// Names unknown to Mojang are dropped. Any upstream failure aborts the
    /// whole batch; a batch where no name resolves is a failure too.
    pub async fn resolve(&self, names: &[String]) -> Result<Vec<ResolvedSkin>, ResolverError> {
        let identities = self.lookup_all(names).await?;

        if identities.is_empty() {
            return Err(ResolverError::NoProfilesFound);
        }

        let mut skins = Vec::with_capacity(identities.len());
        for (requested_name, identity) in identities {
            self.pacer.pace().await;
            let descriptor = Self::timed("profile", self.api.fetch_skin(&identity.uuid)).await?;
            self.pacer.completed().await;

            let texture = Self::timed("texture", self.api.download_texture(&descriptor.url)).await?;
            let variant = classify_texture(&texture, descriptor.slim)?;

            debug!(
                "resolved skin: name={} uuid={} variant={}",
                requested_name,
                identity.uuid,
                variant.as_str()
            );

            skins.push(ResolvedSkin {
                name: requested_name,
                variant,
                texture,
            });
        }

        Ok(skins)
    }

    /// Run the bulk lookup in chunks and re-associate results with the
    /// requested names. Mojang returns canonical casing, so matching is
    /// case-insensitive and the requested form is kept.
    async fn lookup_all(
        &self,
        names: &[String],
    ) -> Result<Vec<(String, PlayerIdentity)>, ResolverError> {
        let mut by_lower: HashMap<String, PlayerIdentity> = HashMap::new();

        for chunk in names.chunks(LOOKUP_CHUNK_SIZE) {
            self.pacer.pace().await;
            let identities = Self::timed("lookup", self.api.lookup_profiles(chunk)).await?;
            self.pacer.completed().await;

            for identity in identities {
                by_lower.insert(identity.name.to_lowercase(), identity);
            }
        }

        let mut resolved = Vec::new();
        for name in names {
            match by_lower.remove(&name.to_lowercase()) {
                Some(identity) => resolved.push((name.clone(), identity)),
                None => {
                    warn!("dropping unknown player name: {}", name);
                    metrics::NAMES_DROPPED.inc();
                }
            }
        }

        Ok(resolved)
    }

    /// Run one upstream call with duration and outcome metrics.
    async fn timed<T>(
        operation: &str,
        fut: impl std::future::Future<Output = Result<T, ResolverError>>,
    ) -> Result<T, ResolverError> {
        let timer = metrics::UPSTREAM_DURATION
            .with_label_values(&[operation])
            .start_timer();
        let result = fut.await;
        timer.observe_duration();

        let status = if result.is_ok() { "success" } else { "error" };
        metrics::UPSTREAM_REQUESTS
            .with_label_values(&[operation, status])
            .inc();

        result
    }
}

/// Determine the model variant from the downloaded texture.
fn classify_texture(texture: &[u8], slim: bool) -> Result<SkinVariant, ResolverError> {
    let img = image::load_from_memory(texture)
        .map_err(|e| ResolverError::InvalidTexture(e.to_string()))?;

    Ok(SkinVariant::classify(img.height(), slim))
}

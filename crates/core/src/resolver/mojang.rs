//! Mojang API client.
//!
//! Talks to two upstream services:
//! - api.mojang.com for bulk name-to-UUID lookup (max 10 names per call)
//! - sessionserver.mojang.com for profile lookup with texture data
//!
//! Texture descriptors arrive base64-encoded inside the profile's
//! `textures` property and are decoded here.

use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::types::{PlayerIdentity, SkinDescriptor};
use super::ResolverError;

/// Maximum names per bulk lookup call, imposed by Mojang.
pub const LOOKUP_CHUNK_SIZE: usize = 10;

/// Mojang API client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MojangConfig {
    /// Base URL for the name lookup API.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    /// Base URL for the session/profile API.
    #[serde(default = "default_session_base_url")]
    pub session_base_url: String,
    /// Delay between upstream calls in milliseconds, measured from the
    /// completion of the previous call.
    #[serde(default = "default_pacing_ms")]
    pub pacing_ms: u64,
    /// HTTP request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_api_base_url() -> String {
    "https://api.mojang.com".to_string()
}

fn default_session_base_url() -> String {
    "https://sessionserver.mojang.com".to_string()
}

fn default_pacing_ms() -> u64 {
    1050
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for MojangConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            session_base_url: default_session_base_url(),
            pacing_ms: default_pacing_ms(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Upstream operations needed to resolve a batch of player names into skins.
#[async_trait]
pub trait MojangApi: Send + Sync {
    /// Resolve up to [`LOOKUP_CHUNK_SIZE`] names into profiles. Names Mojang
    /// does not know are simply absent from the result.
    async fn lookup_profiles(&self, names: &[String]) -> Result<Vec<PlayerIdentity>, ResolverError>;

    /// Fetch the skin descriptor for a profile.
    async fn fetch_skin(&self, uuid: &str) -> Result<SkinDescriptor, ResolverError>;

    /// Download raw texture bytes.
    async fn download_texture(&self, url: &str) -> Result<Vec<u8>, ResolverError>;
}

/// Mojang API client backed by reqwest.
pub struct MojangClient {
    client: Client,
    api_base_url: String,
    session_base_url: String,
}

impl MojangClient {
    pub fn new(config: &MojangConfig) -> Result<Self, ResolverError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            api_base_url: config.api_base_url.clone(),
            session_base_url: config.session_base_url.clone(),
        })
    }
}

#[async_trait]
impl MojangApi for MojangClient {
    async fn lookup_profiles(&self, names: &[String]) -> Result<Vec<PlayerIdentity>, ResolverError> {
        let url = format!("{}/profiles/minecraft", self.api_base_url);

        debug!("Mojang bulk lookup: {} names", names.len());

        let response = self.client.post(&url).json(names).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ResolverError::ApiError {
                status: status.as_u16(),
                message: body,
            });
        }

        let profiles: Vec<MjProfile> = response.json().await.map_err(|e| {
            ResolverError::ParseError(format!("Failed to parse lookup response: {}", e))
        })?;

        Ok(profiles
            .into_iter()
            .map(|p| PlayerIdentity {
                uuid: p.id,
                name: p.name,
            })
            .collect())
    }

    async fn fetch_skin(&self, uuid: &str) -> Result<SkinDescriptor, ResolverError> {
        let url = format!(
            "{}/session/minecraft/profile/{}",
            self.session_base_url, uuid
        );

        debug!("Mojang profile fetch: uuid={}", uuid);

        let response = self.client.get(&url).send().await?;

        let status = response.status();
        if status == 404 {
            return Err(ResolverError::ProfileNotFound(uuid.to_string()));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ResolverError::ApiError {
                status: status.as_u16(),
                message: body,
            });
        }

        let profile: MjSessionProfile = response.json().await.map_err(|e| {
            ResolverError::ParseError(format!("Failed to parse profile response: {}", e))
        })?;

        let property = profile
            .properties
            .iter()
            .find(|p| p.name == "textures")
            .ok_or_else(|| {
                ResolverError::ParseError(format!("Profile {} has no textures property", uuid))
            })?;

        decode_texture_property(&property.value)
    }

    async fn download_texture(&self, url: &str) -> Result<Vec<u8>, ResolverError> {
        debug!("Texture download: url={}", url);

        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ResolverError::ApiError {
                status: status.as_u16(),
                message: format!("Texture download failed for {}", url),
            });
        }

        let bytes = response.bytes().await?;
        Ok(bytes.to_vec())
    }
}

/// Decode the base64-encoded textures property into a skin descriptor.
fn decode_texture_property(value: &str) -> Result<SkinDescriptor, ResolverError> {
    let decoded = BASE64
        .decode(value)
        .map_err(|e| ResolverError::ParseError(format!("Invalid textures base64: {}", e)))?;

    let payload: MjTexturePayload = serde_json::from_slice(&decoded)
        .map_err(|e| ResolverError::ParseError(format!("Invalid textures payload: {}", e)))?;

    let skin = payload
        .textures
        .skin
        .ok_or_else(|| ResolverError::ParseError("Profile has no skin texture".to_string()))?;

    // The metadata object is only present on slim-model skins, its
    // contents do not matter.
    let slim = skin.metadata.is_some();

    Ok(SkinDescriptor {
        url: skin.url,
        slim,
    })
}

// ============================================================================
// Mojang API Response Types (private)
// ============================================================================

#[derive(Debug, Deserialize)]
struct MjProfile {
    id: String,
    name: String,
}

#[derive(Debug, Deserialize)]
struct MjSessionProfile {
    #[serde(default)]
    properties: Vec<MjProperty>,
}

#[derive(Debug, Deserialize)]
struct MjProperty {
    name: String,
    value: String,
}

#[derive(Debug, Deserialize)]
struct MjTexturePayload {
    textures: MjTextures,
}

#[derive(Debug, Deserialize)]
struct MjTextures {
    #[serde(rename = "SKIN", default)]
    skin: Option<MjSkin>,
}

#[derive(Debug, Deserialize)]
struct MjSkin {
    url: String,
    #[serde(default)]
    metadata: Option<serde_json::Value>,
}

//! Mock Mojang API for testing.

use std::collections::HashMap;
use std::io::Cursor;
use std::sync::RwLock;

use async_trait::async_trait;
use image::{ImageFormat, RgbaImage};

use crate::resolver::mojang::MojangApi;
use crate::resolver::types::{PlayerIdentity, SkinDescriptor};
use crate::resolver::ResolverError;

/// A call recorded by [`MockMojangApi`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockCall {
    Lookup(Vec<String>),
    FetchSkin(String),
    DownloadTexture(String),
}

#[derive(Debug, Clone)]
struct MockProfile {
    uuid: String,
    name: String,
    texture: Vec<u8>,
    slim: bool,
}

/// Mock implementation of [`MojangApi`] with configurable profiles and
/// failure injection. Records every call for assertion.
pub struct MockMojangApi {
    profiles: RwLock<HashMap<String, MockProfile>>,
    calls: RwLock<Vec<MockCall>>,
    fail_lookup: RwLock<bool>,
    fail_skin_fetch: RwLock<Option<String>>,
    fail_texture_download: RwLock<bool>,
}

impl MockMojangApi {
    pub fn new() -> Self {
        Self {
            profiles: RwLock::new(HashMap::new()),
            calls: RwLock::new(Vec::new()),
            fail_lookup: RwLock::new(false),
            fail_skin_fetch: RwLock::new(None),
            fail_texture_download: RwLock::new(false),
        }
    }

    /// Register a profile. `name` is the canonical casing Mojang would return.
    pub fn add_profile(&self, name: &str, uuid: &str, texture: Vec<u8>, slim: bool) {
        self.profiles.write().unwrap().insert(
            name.to_lowercase(),
            MockProfile {
                uuid: uuid.to_string(),
                name: name.to_string(),
                texture,
                slim,
            },
        );
    }

    /// Make every bulk lookup fail with an API error.
    pub fn set_fail_lookup(&self, fail: bool) {
        *self.fail_lookup.write().unwrap() = fail;
    }

    /// Make the skin fetch for a specific UUID fail.
    pub fn set_fail_skin_fetch(&self, uuid: &str) {
        *self.fail_skin_fetch.write().unwrap() = Some(uuid.to_string());
    }

    /// Make every texture download fail.
    pub fn set_fail_texture_download(&self, fail: bool) {
        *self.fail_texture_download.write().unwrap() = fail;
    }

    /// All calls made against this mock, in order.
    pub fn recorded_calls(&self) -> Vec<MockCall> {
        self.calls.read().unwrap().clone()
    }

    fn record(&self, call: MockCall) {
        self.calls.write().unwrap().push(call);
    }
}

impl Default for MockMojangApi {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MojangApi for MockMojangApi {
    async fn lookup_profiles(&self, names: &[String]) -> Result<Vec<PlayerIdentity>, ResolverError> {
        self.record(MockCall::Lookup(names.to_vec()));

        if *self.fail_lookup.read().unwrap() {
            return Err(ResolverError::ApiError {
                status: 500,
                message: "mock lookup failure".to_string(),
            });
        }

        let profiles = self.profiles.read().unwrap();
        Ok(names
            .iter()
            .filter_map(|n| profiles.get(&n.to_lowercase()))
            .map(|p| PlayerIdentity {
                uuid: p.uuid.clone(),
                name: p.name.clone(),
            })
            .collect())
    }

    async fn fetch_skin(&self, uuid: &str) -> Result<SkinDescriptor, ResolverError> {
        self.record(MockCall::FetchSkin(uuid.to_string()));

        if self.fail_skin_fetch.read().unwrap().as_deref() == Some(uuid) {
            return Err(ResolverError::ProfileNotFound(uuid.to_string()));
        }

        let profiles = self.profiles.read().unwrap();
        let profile = profiles
            .values()
            .find(|p| p.uuid == uuid)
            .ok_or_else(|| ResolverError::ProfileNotFound(uuid.to_string()))?;

        Ok(SkinDescriptor {
            url: format!("mock://texture/{}", uuid),
            slim: profile.slim,
        })
    }

    async fn download_texture(&self, url: &str) -> Result<Vec<u8>, ResolverError> {
        self.record(MockCall::DownloadTexture(url.to_string()));

        if *self.fail_texture_download.read().unwrap() {
            return Err(ResolverError::ApiError {
                status: 502,
                message: "mock texture failure".to_string(),
            });
        }

        let uuid = url.strip_prefix("mock://texture/").unwrap_or(url);

        let profiles = self.profiles.read().unwrap();
        let profile = profiles
            .values()
            .find(|p| p.uuid == uuid)
            .ok_or_else(|| ResolverError::ProfileNotFound(uuid.to_string()))?;

        Ok(profile.texture.clone())
    }
}

/// Build a valid PNG of the given dimensions for use as a mock skin texture.
pub fn png_texture(width: u32, height: u32) -> Vec<u8> {
    let img = RgbaImage::from_pixel(width, height, image::Rgba([120, 80, 40, 255]));
    let mut bytes = Vec::new();
    img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .unwrap();
    bytes
}

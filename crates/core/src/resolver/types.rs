//! Types shared across the skin resolution pipeline.

use serde::{Deserialize, Serialize};

/// Skin model variant, derived from the texture itself.
///
/// Legacy 64x32 textures take precedence over the model flag carried in the
/// profile metadata: an old-format texture is always `Old`, regardless of
/// what the profile claims.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkinVariant {
    /// Classic 4px-arm model on a 64x64 texture.
    Normal,
    /// Slim 3px-arm model on a 64x64 texture.
    Slim,
    /// Legacy 64x32 texture layout.
    Old,
}

impl SkinVariant {
    /// Classify a skin from its texture height and the profile's slim flag.
    pub fn classify(texture_height: u32, slim: bool) -> Self {
        if texture_height == 32 {
            SkinVariant::Old
        } else if slim {
            SkinVariant::Slim
        } else {
            SkinVariant::Normal
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SkinVariant::Normal => "normal",
            SkinVariant::Slim => "slim",
            SkinVariant::Old => "old",
        }
    }
}

/// A profile resolved through the bulk name lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerIdentity {
    pub uuid: String,
    pub name: String,
}

/// Skin location and model flag decoded from a session profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkinDescriptor {
    pub url: String,
    pub slim: bool,
}

/// A fully resolved skin ready for pack assembly.
#[derive(Debug, Clone)]
pub struct ResolvedSkin {
    /// Player name as it was requested, not Mojang's canonical casing.
    pub name: String,
    pub variant: SkinVariant,
    pub texture: Vec<u8>,
}

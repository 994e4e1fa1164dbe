use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::PathBuf;

use crate::resolver::MojangConfig;
use crate::worker::{RetentionPolicy, WorkerConfig};

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub pack: PackConfig,
    #[serde(default)]
    pub mojang: MojangConfig,
    #[serde(default)]
    pub worker: WorkerConfig,
    #[serde(default)]
    pub retention: RetentionPolicy,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    "0.0.0.0".parse().unwrap()
}

fn default_port() -> u16 {
    8080
}

/// Database configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("skinforge.db")
}

/// Artifact storage configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    /// Directory pack archives are written under, one subdirectory per job.
    #[serde(default = "default_artifacts_path")]
    pub artifacts_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            artifacts_path: default_artifacts_path(),
        }
    }
}

fn default_artifacts_path() -> PathBuf {
    PathBuf::from("artifacts")
}

/// Generated pack configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PackConfig {
    /// Vanilla item whose model the pack overrides.
    #[serde(default = "default_item")]
    pub item: String,
}

impl Default for PackConfig {
    fn default() -> Self {
        Self {
            item: default_item(),
        }
    }
}

fn default_item() -> String {
    "carved_pumpkin".to_string()
}

//! Engine-wide defaults, shared by every synthesis call.
//!
//! Settings are loaded once by the embedding tool and passed into synthesis;
//! the engine never reads them from global state.

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format as _, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

use crate::error::SettingsError;
use crate::validation::{MAX_PORT, MIN_PORT, PORT_BOUNDS, QUALITY_BOUNDS, THRESHOLD_BOUNDS};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineSettings {
    /// Build output directory
    #[serde(default = "default_out_dir")]
    pub out_dir: String,

    /// Compression threshold used when an intent does not set one (bytes)
    #[serde(default = "default_compression_threshold")]
    pub compression_threshold_bytes: u64,

    /// Dev server host
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_application_port")]
    pub application_port: u16,

    #[serde(default = "default_server_port")]
    pub server_port: u16,

    #[serde(default)]
    pub image_quality: ImageQualityDefaults,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            out_dir: default_out_dir(),
            compression_threshold_bytes: default_compression_threshold(),
            host: default_host(),
            application_port: default_application_port(),
            server_port: default_server_port(),
            image_quality: ImageQualityDefaults::default(),
        }
    }
}

/// Fallback quality per image codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageQualityDefaults {
    pub avif: u8,
    pub jpeg: u8,
    pub png: u8,
    pub webp: u8,
}

impl Default for ImageQualityDefaults {
    fn default() -> Self {
        Self {
            avif: 60,
            jpeg: 80,
            png: 80,
            webp: 80,
        }
    }
}

impl EngineSettings {
    /// Layered settings: defaults, then `config_path` (TOML) if it exists,
    /// then `KILN_*` environment variables (`KILN_IMAGE_QUALITY__AVIF=50`).
    pub fn figment(config_path: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        figment.merge(Env::prefixed("KILN_").split("__"))
    }

    /// Load settings from `config_path` (if any) and the environment.
    pub fn load(config_path: Option<&Path>) -> Result<Self, SettingsError> {
        let settings: Self = Self::figment(config_path).extract()?;
        settings.check()?;
        tracing::debug!(
            out_dir = %settings.out_dir,
            compression_threshold = settings.compression_threshold_bytes,
            "engine settings loaded"
        );
        Ok(settings)
    }

    /// Reject values the same field would be rejected for in an intent.
    pub fn check(&self) -> Result<(), SettingsError> {
        let out_of_range = |key: &'static str, value: u64, bounds: &'static str| {
            SettingsError::OutOfRange {
                key,
                value: value.to_string(),
                bounds,
            }
        };

        if self.compression_threshold_bytes == 0 {
            return Err(out_of_range(
                "compression_threshold_bytes",
                0,
                THRESHOLD_BOUNDS,
            ));
        }

        for (key, port) in [
            ("application_port", self.application_port),
            ("server_port", self.server_port),
        ] {
            if !(MIN_PORT..=MAX_PORT).contains(&u64::from(port)) {
                return Err(out_of_range(key, u64::from(port), PORT_BOUNDS));
            }
        }

        let quality = self.image_quality;
        for (key, value) in [
            ("image_quality.avif", quality.avif),
            ("image_quality.jpeg", quality.jpeg),
            ("image_quality.png", quality.png),
            ("image_quality.webp", quality.webp),
        ] {
            if !(1..=100).contains(&value) {
                return Err(out_of_range(key, u64::from(value), QUALITY_BOUNDS));
            }
        }
        Ok(())
    }
}

fn default_out_dir() -> String {
    "dist".to_string()
}

fn default_compression_threshold() -> u64 {
    10_240
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_application_port() -> u16 {
    5173
}

fn default_server_port() -> u16 {
    3000
}

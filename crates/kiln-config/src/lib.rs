//! # kiln-config
//!
//! Build-intent schema for kiln: the typed [`BuildIntent`] variants, the
//! validator that produces them from untyped JSON, the error taxonomy, and
//! the layered [`EngineSettings`].

pub mod error;
pub mod intent;
pub mod settings;
pub mod validation;

pub use error::{Result, SettingsError, ValidationError};
pub use intent::{
    ApplicationIntent, BuildIntent, BuilderTuning, Entry, ImageQuality, LibraryIntent, Mode,
    PwaOptions, ServerIntent,
};
pub use settings::{EngineSettings, ImageQualityDefaults};
pub use validation::validate;

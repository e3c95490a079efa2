//! # kiln-synth
//!
//! Turns a declarative build intent into a complete bundler configuration.
//!
//! ```text
//! raw JSON ──validate──▶ BuildIntent ──dispatch──▶ ResolvedConfiguration
//!                             ▲
//!              EnvironmentFacts (NODE_ENV, package version, browsers)
//! ```
//!
//! Synthesis is a pure function of the raw intent, one [`EnvironmentFacts`]
//! snapshot and the [`EngineSettings`]. Nothing is cached between calls.
//!
//! ```
//! use kiln_synth::{Synthesizer, environment::FixedEnvironment};
//! use serde_json::json;
//!
//! let synth = Synthesizer::with_environment(FixedEnvironment::production());
//! let config = synth.synthesize(&json!({ "mode": "application", "name": "Shop" }))?;
//! assert!(config.build.minify);
//! assert!(config.plugin("compression-gzip").is_some());
//! # Ok::<(), kiln_config::ValidationError>(())
//! ```
//!
//! ## Logging
//!
//! kiln emits `tracing` events. Enable the `logging` feature for
//! [`logging::init_logging`] if the host has no subscriber of its own.

pub mod chunks;
pub mod environment;
#[cfg(feature = "logging")]
pub mod logging;
pub mod modes;
pub mod output;
pub mod plugins;
pub mod synthesize;

pub use chunks::{CHUNK_RULES, ChunkGroup, ChunkRule, ChunkRuleSet, assign_chunk, is_vendor_module};
pub use environment::{
    BrowserBaseline, EnvironmentFacts, EnvironmentSource, FixedEnvironment, ProcessEnvironment,
    resolve_environment,
};
pub use modes::{ApplicationBuilder, DispatchTable, LibraryBuilder, ModeBuilder, ServerBuilder};
pub use output::ResolvedConfiguration;
pub use plugins::{Consumer, PluginDescriptor, PluginPipeline, compose_plugins};
pub use synthesize::{Synthesizer, synthesize};

pub use kiln_config::{BuildIntent, EngineSettings, Mode, ValidationError, validate};

//! Synthesis entry point.

use kiln_config::{EngineSettings, ValidationError, validate};
use serde_json::Value;

use crate::environment::{EnvironmentSource, ProcessEnvironment};
use crate::modes::DispatchTable;
use crate::output::ResolvedConfiguration;

/// Validate, resolve the environment, dispatch.
///
/// The environment source is consulted only after validation succeeds, so a
/// rejected intent never observes the process.
#[derive(Debug, Clone)]
pub struct Synthesizer<E = ProcessEnvironment> {
    env: E,
    settings: EngineSettings,
    table: DispatchTable,
}

impl Synthesizer {
    /// Process environment and default settings.
    pub fn new() -> Self {
        Self::with_environment(ProcessEnvironment::new())
    }
}

impl Default for Synthesizer {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: EnvironmentSource> Synthesizer<E> {
    pub fn with_environment(env: E) -> Self {
        Self {
            env,
            settings: EngineSettings::default(),
            table: DispatchTable::default(),
        }
    }

    pub fn with_settings(mut self, settings: EngineSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_table(mut self, table: DispatchTable) -> Self {
        self.table = table;
        self
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn synthesize(&self, raw: &Value) -> Result<ResolvedConfiguration, ValidationError> {
        let intent = validate(raw).inspect_err(|error| {
            tracing::debug!(%error, "intent rejected");
        })?;
        let env = self.env.resolve();
        tracing::debug!(
            production = env.is_production,
            version = %env.package_version,
            "environment resolved"
        );
        Ok(self.table.dispatch(&intent, &env, &self.settings))
    }

    /// Parse JSON text, then synthesize. Unparseable text is a type
    /// mismatch at the document root.
    pub fn synthesize_str(&self, raw: &str) -> Result<ResolvedConfiguration, ValidationError> {
        let value: Value = serde_json::from_str(raw).map_err(|error| {
            tracing::debug!(%error, "intent is not valid JSON");
            ValidationError::mismatch("$", "a JSON document")
        })?;
        self.synthesize(&value)
    }
}

/// Synthesize against the process environment and default settings.
///
/// ```
/// use serde_json::json;
///
/// let config = kiln_synth::synthesize(&json!({ "mode": "server", "name": "api", "entry": "src/main.ts" }))?;
/// assert_eq!(config.plugin_names(), vec!["path-alias", "node-externals"]);
/// # Ok::<(), kiln_config::ValidationError>(())
/// ```
pub fn synthesize(raw: &Value) -> Result<ResolvedConfiguration, ValidationError> {
    Synthesizer::new().synthesize(raw)
}

//! Mode dispatch.
//!
//! Each build mode has one [`ModeBuilder`]: a plugin composer plus a config
//! builder over that mode's typed intent. [`DispatchTable`] holds one builder
//! per mode and routes with an exhaustive match, so a new mode does not
//! compile until it has a table entry.

mod application;
mod library;
mod server;

pub use application::ApplicationBuilder;
pub use library::LibraryBuilder;
pub use server::ServerBuilder;

use indexmap::IndexMap;
use kiln_config::{BuildIntent, EngineSettings, Mode};
use serde_json::Value;

use crate::environment::EnvironmentFacts;
use crate::output::{EnvironmentSettings, ResolvedConfiguration};
use crate::plugins::{Consumer, PluginDescriptor, PluginPipeline};

/// Plugin composer and config builder for one mode.
pub trait ModeBuilder {
    type Intent;

    const MODE: Mode;

    fn compose_plugins(
        &self,
        intent: &Self::Intent,
        env: &EnvironmentFacts,
        settings: &EngineSettings,
    ) -> PluginPipeline;

    fn build_config(
        &self,
        intent: &Self::Intent,
        env: &EnvironmentFacts,
        settings: &EngineSettings,
        plugins: PluginPipeline,
    ) -> ResolvedConfiguration;

    fn synthesize(
        &self,
        intent: &Self::Intent,
        env: &EnvironmentFacts,
        settings: &EngineSettings,
    ) -> ResolvedConfiguration {
        let plugins = self.compose_plugins(intent, env, settings);
        tracing::debug!(mode = %Self::MODE, plugins = ?plugins.names(), "plugins composed");
        self.build_config(intent, env, settings, plugins)
    }
}

/// One builder per mode.
#[derive(Debug, Clone, Default)]
pub struct DispatchTable {
    pub application: ApplicationBuilder,
    pub library: LibraryBuilder,
    pub server: ServerBuilder,
}

impl DispatchTable {
    pub fn dispatch(
        &self,
        intent: &BuildIntent,
        env: &EnvironmentFacts,
        settings: &EngineSettings,
    ) -> ResolvedConfiguration {
        tracing::debug!(mode = %intent.mode(), name = intent.name(), "dispatching intent");
        match intent {
            BuildIntent::Application(app) => self.application.synthesize(app, env, settings),
            BuildIntent::Library(lib) => self.library.synthesize(lib, env, settings),
            BuildIntent::Server(server) => self.server.synthesize(server, env, settings),
        }
    }
}

/// `__APP_NAME__`, `__APP_VERSION__` and `__BUILD_TIMESTAMP__` as JSON literals.
pub(crate) fn define(name: &str, env: &EnvironmentFacts) -> IndexMap<String, String> {
    let literal = |value: &str| Value::String(value.to_string()).to_string();
    IndexMap::from([
        ("__APP_NAME__".to_string(), literal(name)),
        ("__APP_VERSION__".to_string(), literal(&env.package_version)),
        ("__BUILD_TIMESTAMP__".to_string(), literal(&env.timestamp_iso())),
    ])
}

/// An output environment with the names of the plugins that run for it.
pub(crate) fn environment(
    consumer: Consumer,
    out_dir: String,
    plugins: &[PluginDescriptor],
) -> EnvironmentSettings {
    EnvironmentSettings {
        consumer,
        out_dir,
        plugins: plugins
            .iter()
            .filter(|plugin| plugin.applies_to(consumer))
            .map(|plugin| plugin.name)
            .collect(),
    }
}

pub(crate) fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| (*value).to_string()).collect()
}

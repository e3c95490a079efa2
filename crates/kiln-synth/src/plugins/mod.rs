//! Plugin pipeline composition.
//!
//! The engine never runs plugins. It decides which ones the bundler should
//! load, in what order, for which consumer, and with which settings. Order
//! is part of the contract: later plugins observe the transforms of earlier
//! ones, so stages are appended one by one with their inclusion predicate
//! stated at the call site.

pub mod application;
pub mod library;
pub mod server;

use kiln_config::{BuildIntent, EngineSettings};
use serde::Serialize;
use serde_json::Value;

use crate::environment::EnvironmentFacts;

/// Who consumes an output environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Consumer {
    /// Code shipped to browsers
    Client,
    /// Code executed by a server runtime (SSR, server bundles)
    Server,
}

/// Bundler phase a plugin is active in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Apply {
    #[default]
    Always,
    /// Production build only, never the dev server
    Build,
    /// Dev server only
    Serve,
}

/// A plugin the bundler should load.
///
/// `settings` is opaque to the engine beyond what it populates itself.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginDescriptor {
    pub name: &'static str,

    /// Restricts the plugin to one consumer. `None` means every consumer.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub environment: Option<Consumer>,

    pub apply: Apply,

    pub settings: Value,
}

impl PluginDescriptor {
    pub fn new(name: &'static str, settings: Value) -> Self {
        Self {
            name,
            environment: None,
            apply: Apply::Always,
            settings,
        }
    }

    /// Never run against server output.
    pub fn client_only(mut self) -> Self {
        self.environment = Some(Consumer::Client);
        self
    }

    pub fn build_only(mut self) -> Self {
        self.apply = Apply::Build;
        self
    }

    pub fn is_client_only(&self) -> bool {
        self.environment == Some(Consumer::Client)
    }

    pub fn applies_to(&self, consumer: Consumer) -> bool {
        self.environment.is_none_or(|only| only == consumer)
    }
}

/// Ordered plugin list under construction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PluginPipeline {
    plugins: Vec<PluginDescriptor>,
}

impl PluginPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a stage that is always present.
    pub fn stage(&mut self, plugin: PluginDescriptor) -> &mut Self {
        tracing::trace!(plugin = plugin.name, "plugin stage added");
        self.plugins.push(plugin);
        self
    }

    /// Append a stage only when `include` holds.
    pub fn stage_if(
        &mut self,
        include: bool,
        name: &'static str,
        plugin: impl FnOnce() -> PluginDescriptor,
    ) -> &mut Self {
        if include {
            self.stage(plugin())
        } else {
            tracing::trace!(plugin = name, "plugin stage skipped");
            self
        }
    }

    /// Append a stage built from an optional input; absent input omits it.
    pub fn stage_with<T>(
        &mut self,
        input: Option<T>,
        name: &'static str,
        plugin: impl FnOnce(T) -> PluginDescriptor,
    ) -> &mut Self {
        match input {
            Some(value) => self.stage(plugin(value)),
            None => {
                tracing::trace!(plugin = name, "plugin stage skipped");
                self
            }
        }
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.plugins.iter().map(|plugin| plugin.name).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PluginDescriptor> {
        self.plugins.iter()
    }

    pub fn into_plugins(self) -> Vec<PluginDescriptor> {
        self.plugins
    }
}

/// Compose the plugin list for any validated intent.
pub fn compose_plugins(
    intent: &BuildIntent,
    env: &EnvironmentFacts,
    settings: &EngineSettings,
) -> PluginPipeline {
    match intent {
        BuildIntent::Application(app) => application::compose(app, env, settings),
        BuildIntent::Library(lib) => library::compose(lib, env),
        BuildIntent::Server(server) => server::compose(server, env),
    }
}

//! Resolved bundler configuration.
//!
//! This is what the external bundler loads. It is built fresh for every
//! synthesis call and handed over by value; the engine keeps no reference.

use indexmap::IndexMap;
use kiln_config::{Entry, Mode};
use serde::Serialize;
use serde_json::Value;

use crate::chunks::ChunkGroup;
use crate::plugins::{Consumer, PluginDescriptor};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedConfiguration {
    pub mode: Mode,
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub root: Option<String>,

    /// Public base path
    pub base: String,

    /// Static files copied verbatim (applications only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_dir: Option<String>,

    /// Extra globs treated as assets (applications only)
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub assets_include: Vec<String>,

    /// Compile-time constants; values are JSON literals
    pub define: IndexMap<String, String>,

    pub resolve: ResolveSettings,

    pub plugins: Vec<PluginDescriptor>,

    pub build: BuildSettings,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub server: Option<DevServerSettings>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub worker: Option<WorkerSettings>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub builder: Option<BuilderSettings>,

    /// Output environments by name (`client`, `ssr`)
    pub environments: IndexMap<String, EnvironmentSettings>,
}

impl ResolvedConfiguration {
    /// Plugins that run for `consumer`, in pipeline order.
    pub fn plugins_for(&self, consumer: Consumer) -> Vec<&PluginDescriptor> {
        self.plugins
            .iter()
            .filter(|plugin| plugin.applies_to(consumer))
            .collect()
    }

    pub fn plugin(&self, name: &str) -> Option<&PluginDescriptor> {
        self.plugins.iter().find(|plugin| plugin.name == name)
    }

    pub fn plugin_names(&self) -> Vec<&'static str> {
        self.plugins.iter().map(|plugin| plugin.name).collect()
    }

    /// Whether any environment is consumed by `consumer`.
    pub fn targets(&self, consumer: Consumer) -> bool {
        self.environments
            .values()
            .any(|environment| environment.consumer == consumer)
    }

    /// Convert to JSON for handoff to a config loader.
    pub fn to_value(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolveSettings {
    pub alias: IndexMap<String, String>,

    /// Export conditions, most specific first
    pub conditions: Vec<String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub dedupe: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildSettings {
    pub out_dir: String,
    pub target: Vec<String>,
    pub minify: bool,
    pub sourcemap: bool,
    pub css_code_split: bool,
    pub empty_out_dir: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub input: Option<Entry>,

    pub output: OutputNaming,

    /// Vendor chunk groups, highest priority first (applications only)
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub chunk_groups: Vec<ChunkGroup>,

    pub external: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub lib: Option<LibrarySettings>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub ssr: Option<ServerBundleSettings>,
}

/// File-naming templates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputNaming {
    pub entry_file_names: String,
    pub chunk_file_names: String,
    pub asset_file_names: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ModuleFormat {
    Es,
    Cjs,
}

/// Library linkage.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LibrarySettings {
    pub entry: Entry,
    pub name: String,
    pub formats: Vec<ModuleFormat>,
    pub file_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub css_entry: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub css_file_name: Option<String>,
    pub declarations: bool,
}

/// Server bundle linkage.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerBundleSettings {
    pub entry: Entry,
    pub format: ModuleFormat,
    pub platform: &'static str,
    pub no_external: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DevServerSettings {
    pub host: String,
    pub port: u16,
    pub strict_port: bool,
    pub open: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkerSettings {
    pub format: ModuleFormat,
    pub output: OutputNaming,
}

/// Multi-environment build coordination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuilderSettings {
    pub shared_config_build: bool,
    pub shared_plugins: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentSettings {
    pub consumer: Consumer,
    pub out_dir: String,
    /// Plugins active for this environment, in pipeline order
    pub plugins: Vec<&'static str>,
}

//! Browser application builder.

use indexmap::IndexMap;
use kiln_config::{ApplicationIntent, EngineSettings, Entry, Mode};

use super::{ModeBuilder, define, environment, strings};
use crate::chunks::ChunkRuleSet;
use crate::environment::EnvironmentFacts;
use crate::output::{
    BuildSettings, BuilderSettings, DevServerSettings, ModuleFormat, OutputNaming,
    ResolveSettings, ResolvedConfiguration, WorkerSettings,
};
use crate::plugins::{self, Consumer, PluginPipeline};

const BROWSER_CONDITIONS: &[&str] = &["browser", "import", "module", "default"];

/// Builds application configs. Owns the vendor chunk rules it exports.
#[derive(Debug, Clone)]
pub struct ApplicationBuilder {
    chunks: ChunkRuleSet,
}

impl ApplicationBuilder {
    pub fn new(chunks: ChunkRuleSet) -> Self {
        Self { chunks }
    }

    pub fn chunks(&self) -> &ChunkRuleSet {
        &self.chunks
    }
}

impl Default for ApplicationBuilder {
    fn default() -> Self {
        Self::new(ChunkRuleSet::defaults())
    }
}

impl ModeBuilder for ApplicationBuilder {
    type Intent = ApplicationIntent;

    const MODE: Mode = Mode::Application;

    fn compose_plugins(
        &self,
        intent: &ApplicationIntent,
        env: &EnvironmentFacts,
        settings: &EngineSettings,
    ) -> PluginPipeline {
        plugins::application::compose(intent, env, settings)
    }

    fn build_config(
        &self,
        intent: &ApplicationIntent,
        env: &EnvironmentFacts,
        settings: &EngineSettings,
        plugins: PluginPipeline,
    ) -> ResolvedConfiguration {
        let plugins = plugins.into_plugins();
        let out_dir = settings.out_dir.clone();

        let environments = IndexMap::from([
            (
                "client".to_string(),
                environment(Consumer::Client, format!("{out_dir}/client"), &plugins),
            ),
            (
                "ssr".to_string(),
                environment(Consumer::Server, format!("{out_dir}/server"), &plugins),
            ),
        ]);

        ResolvedConfiguration {
            mode: Mode::Application,
            name: intent.name.clone(),
            root: intent.root_override.clone(),
            base: "/".to_string(),
            public_dir: Some("public".to_string()),
            assets_include: asset_globs(&intent.asset_extensions),
            define: define(&intent.name, env),
            resolve: ResolveSettings {
                alias: plugins::application::aliases(intent.root_override.as_deref()),
                conditions: strings(BROWSER_CONDITIONS),
                dedupe: strings(&["react", "react-dom"]),
            },
            plugins,
            build: BuildSettings {
                out_dir,
                target: env.browser_baseline.targets(),
                minify: env.is_production,
                sourcemap: !env.is_production,
                css_code_split: true,
                empty_out_dir: true,
                input: intent.entry_override.clone().map(Entry::Single),
                output: OutputNaming {
                    entry_file_names: "assets/js/[name]-[hash].js".to_string(),
                    chunk_file_names: "assets/js/[name]-[hash].js".to_string(),
                    asset_file_names: "assets/[ext]/[name]-[hash][extname]".to_string(),
                },
                chunk_groups: self.chunks.groups(),
                external: Vec::new(),
                lib: None,
                ssr: None,
            },
            server: Some(DevServerSettings {
                host: settings.host.clone(),
                port: intent.port.unwrap_or(settings.application_port),
                strict_port: intent.port.is_some(),
                open: false,
            }),
            worker: Some(WorkerSettings {
                format: ModuleFormat::Es,
                output: OutputNaming {
                    entry_file_names: "assets/workers/[name]-[hash].js".to_string(),
                    chunk_file_names: "assets/workers/[name]-[hash].js".to_string(),
                    asset_file_names: "assets/workers/[name]-[hash][extname]".to_string(),
                },
            }),
            builder: intent.builder_tuning.map(|tuning| BuilderSettings {
                shared_config_build: tuning.shared_config_build.unwrap_or(false),
                shared_plugins: tuning.shared_plugins.unwrap_or(false),
            }),
            environments,
        }
    }
}

/// `["glb", ".wasm"]` → `["**/*.glb", "**/*.wasm"]`
fn asset_globs(extensions: &[String]) -> Vec<String> {
    extensions
        .iter()
        .map(|ext| format!("**/*.{}", ext.trim_start_matches('.')))
        .collect()
}

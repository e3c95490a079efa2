//! Reusable package builder.

use indexmap::IndexMap;
use kiln_config::{EngineSettings, LibraryIntent, Mode};

use super::{ModeBuilder, define, environment, strings};
use crate::environment::EnvironmentFacts;
use crate::output::{
    BuildSettings, LibrarySettings, ModuleFormat, OutputNaming, ResolveSettings,
    ResolvedConfiguration,
};
use crate::plugins::{self, Consumer, PluginPipeline};

const LIBRARY_TARGET: &str = "es2022";

/// Left to the consuming application when React is enabled.
const REACT_PEERS: &[&str] = &["react", "react-dom", "react/jsx-runtime"];

#[derive(Debug, Clone, Copy, Default)]
pub struct LibraryBuilder;

impl ModeBuilder for LibraryBuilder {
    type Intent = LibraryIntent;

    const MODE: Mode = Mode::Library;

    fn compose_plugins(
        &self,
        intent: &LibraryIntent,
        env: &EnvironmentFacts,
        _settings: &EngineSettings,
    ) -> PluginPipeline {
        plugins::library::compose(intent, env)
    }

    fn build_config(
        &self,
        intent: &LibraryIntent,
        env: &EnvironmentFacts,
        settings: &EngineSettings,
        plugins: PluginPipeline,
    ) -> ResolvedConfiguration {
        let plugins = plugins.into_plugins();
        let out_dir = settings.out_dir.clone();
        let environments = IndexMap::from([(
            "client".to_string(),
            environment(Consumer::Client, out_dir.clone(), &plugins),
        )]);

        ResolvedConfiguration {
            mode: Mode::Library,
            name: intent.name.clone(),
            root: None,
            base: "./".to_string(),
            public_dir: None,
            assets_include: Vec::new(),
            define: define(&intent.name, env),
            resolve: ResolveSettings {
                alias: plugins::application::aliases(None),
                conditions: strings(&["import", "module", "default"]),
                dedupe: Vec::new(),
            },
            plugins,
            build: BuildSettings {
                out_dir,
                target: vec![LIBRARY_TARGET.to_string()],
                minify: false,
                sourcemap: true,
                css_code_split: false,
                empty_out_dir: true,
                input: None,
                output: OutputNaming {
                    entry_file_names: "[name].js".to_string(),
                    chunk_file_names: "chunks/[name]-[hash].js".to_string(),
                    asset_file_names: "assets/[name][extname]".to_string(),
                },
                chunk_groups: Vec::new(),
                external: externals(intent),
                lib: Some(LibrarySettings {
                    entry: intent.entry.clone(),
                    name: intent.name.clone(),
                    formats: vec![ModuleFormat::Es, ModuleFormat::Cjs],
                    file_name: "[name].[format].js".to_string(),
                    css_entry: intent.css_entry.clone(),
                    css_file_name: intent.css_entry.as_ref().map(|_| "style.css".to_string()),
                    declarations: intent.emit_declarations,
                }),
                ssr: None,
            },
            server: None,
            worker: None,
            builder: None,
            environments,
        }
    }
}

/// Intent externals, then React peers not already listed.
fn externals(intent: &LibraryIntent) -> Vec<String> {
    let mut external = intent.external.clone();
    if intent.enable_react {
        for peer in REACT_PEERS {
            if !external.iter().any(|listed| listed == peer) {
                external.push((*peer).to_string());
            }
        }
    }
    external
}

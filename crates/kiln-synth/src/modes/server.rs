//! Node server bundle builder.

use indexmap::IndexMap;
use kiln_config::{EngineSettings, Mode, ServerIntent};

use super::{ModeBuilder, define, environment, strings};
use crate::environment::EnvironmentFacts;
use crate::output::{
    BuildSettings, DevServerSettings, ModuleFormat, OutputNaming, ResolveSettings,
    ResolvedConfiguration, ServerBundleSettings,
};
use crate::plugins::{self, Consumer, PluginPipeline};

const NODE_TARGET: &str = "node18";

#[derive(Debug, Clone, Copy, Default)]
pub struct ServerBuilder;

impl ModeBuilder for ServerBuilder {
    type Intent = ServerIntent;

    const MODE: Mode = Mode::Server;

    fn compose_plugins(
        &self,
        intent: &ServerIntent,
        env: &EnvironmentFacts,
        _settings: &EngineSettings,
    ) -> PluginPipeline {
        plugins::server::compose(intent, env)
    }

    fn build_config(
        &self,
        intent: &ServerIntent,
        env: &EnvironmentFacts,
        settings: &EngineSettings,
        plugins: PluginPipeline,
    ) -> ResolvedConfiguration {
        let plugins = plugins.into_plugins();
        let out_dir = settings.out_dir.clone();
        let environments = IndexMap::from([(
            "ssr".to_string(),
            environment(Consumer::Server, out_dir.clone(), &plugins),
        )]);

        ResolvedConfiguration {
            mode: Mode::Server,
            name: intent.name.clone(),
            root: None,
            base: "/".to_string(),
            public_dir: None,
            assets_include: Vec::new(),
            define: define(&intent.name, env),
            resolve: ResolveSettings {
                alias: plugins::application::aliases(None),
                conditions: strings(&["node", "import", "module", "default"]),
                dedupe: Vec::new(),
            },
            plugins,
            build: BuildSettings {
                out_dir,
                target: vec![NODE_TARGET.to_string()],
                minify: false,
                sourcemap: true,
                css_code_split: false,
                empty_out_dir: true,
                input: None,
                output: OutputNaming {
                    entry_file_names: "[name].js".to_string(),
                    chunk_file_names: "chunks/[name]-[hash].js".to_string(),
                    asset_file_names: "assets/[name]-[hash][extname]".to_string(),
                },
                chunk_groups: Vec::new(),
                external: intent.external.clone(),
                lib: None,
                ssr: Some(ServerBundleSettings {
                    entry: intent.entry.clone(),
                    format: ModuleFormat::Es,
                    platform: "node",
                    no_external: Vec::new(),
                }),
            },
            server: Some(DevServerSettings {
                host: settings.host.clone(),
                port: intent.port.unwrap_or(settings.server_port),
                strict_port: true,
                open: false,
            }),
            worker: None,
            builder: None,
            environments,
        }
    }
}

//! Library plugin pipeline.

use kiln_config::LibraryIntent;
use serde_json::json;

use super::{PluginDescriptor, PluginPipeline, application::path_alias};
use crate::environment::EnvironmentFacts;

/// path-alias, then react (when `enableReact`), then dts (when
/// `emitDeclarations`).
pub fn compose(intent: &LibraryIntent, env: &EnvironmentFacts) -> PluginPipeline {
    let mut pipeline = PluginPipeline::new();
    pipeline
        .stage(path_alias(None))
        .stage_if(intent.enable_react, "react", || {
            PluginDescriptor::new(
                "react",
                json!({
                    "jsxRuntime": "automatic",
                    "fastRefresh": false
                }),
            )
        })
        .stage_if(intent.emit_declarations, "dts", || dts(env));
    pipeline
}

fn dts(env: &EnvironmentFacts) -> PluginDescriptor {
    PluginDescriptor::new(
        "dts",
        json!({
            "entryRoot": "src",
            "insertTypesEntry": true,
            "rollupTypes": env.is_production
        }),
    )
    .build_only()
}

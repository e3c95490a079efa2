//! Server plugin pipeline.

use kiln_config::ServerIntent;
use serde_json::json;

use super::{PluginDescriptor, PluginPipeline, application::path_alias};
use crate::environment::EnvironmentFacts;

/// path-alias, then node-externals. Nothing client-only ever lands here.
pub fn compose(intent: &ServerIntent, env: &EnvironmentFacts) -> PluginPipeline {
    let mut pipeline = PluginPipeline::new();
    pipeline.stage(path_alias(None)).stage(PluginDescriptor::new(
        "node-externals",
        json!({
            "external": intent.external,
            "builtins": true,
            "devDependencies": !env.is_production
        }),
    ));
    pipeline
}

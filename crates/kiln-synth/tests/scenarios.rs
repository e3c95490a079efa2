//! End-to-end synthesis scenarios.

use std::cell::Cell;

use kiln_synth::chunks::{CHUNK_RULES, assign_chunk};
use kiln_synth::environment::{EnvironmentFacts, EnvironmentSource, FixedEnvironment};
use kiln_synth::{Consumer, Mode, Synthesizer, ValidationError};
use serde_json::json;

/// Counts how often the engine asks for environment facts.
struct CountingEnvironment {
    inner: FixedEnvironment,
    calls: Cell<usize>,
}

impl CountingEnvironment {
    fn new() -> Self {
        Self {
            inner: FixedEnvironment::development(),
            calls: Cell::new(0),
        }
    }
}

impl EnvironmentSource for &CountingEnvironment {
    fn resolve(&self) -> EnvironmentFacts {
        self.calls.set(self.calls.get() + 1);
        self.inner.resolve()
    }
}

#[test]
fn development_application() {
    let synth = Synthesizer::with_environment(FixedEnvironment::development());
    let config = synth
        .synthesize(&json!({ "mode": "application", "name": "Shop" }))
        .unwrap();

    let names = config.plugin_names();
    for present in ["path-alias", "react", "tailwindcss"] {
        assert!(names.contains(&present), "{present} missing from {names:?}");
    }
    for absent in ["compression-brotli", "compression-gzip", "inspect", "pwa"] {
        assert!(!names.contains(&absent), "{absent} present in {names:?}");
    }

    assert!(!config.build.minify);
    assert!(config.build.sourcemap);
    assert_eq!(
        config.build.target,
        vec!["chrome107", "edge107", "firefox104", "safari16"]
    );
    assert_eq!(config.define["__APP_NAME__"], "\"Shop\"");
    assert_eq!(config.build.chunk_groups.len(), CHUNK_RULES.len());
    assert_eq!(config.build.chunk_groups[0].name, "vendor-react");
}

#[test]
fn production_application_with_pwa() {
    let synth = Synthesizer::with_environment(FixedEnvironment::production());
    let config = synth
        .synthesize(&json!({
            "mode": "application",
            "name": "Shop",
            "pwa": { "name": "Shop" }
        }))
        .unwrap();

    let names = config.plugin_names();
    let compression: Vec<_> = names
        .iter()
        .filter(|name| name.starts_with("compression-"))
        .collect();
    assert_eq!(compression, vec![&"compression-brotli", &"compression-gzip"]);
    assert_eq!(names.iter().filter(|name| **name == "inspect").count(), 1);

    let pwa = config.plugin("pwa").unwrap();
    assert_eq!(pwa.settings["manifest"]["name"], "Shop");
    assert!(config.build.minify);
    assert!(!config.build.sourcemap);
}

#[test]
fn invalid_intent_never_resolves_environment() {
    let env = CountingEnvironment::new();
    let synth = Synthesizer::with_environment(&env);

    let err = synth
        .synthesize(&json!({ "mode": "application", "entry": "x" }))
        .unwrap_err();
    assert_eq!(err, ValidationError::missing("name"));
    assert_eq!(env.calls.get(), 0);

    synth
        .synthesize(&json!({ "mode": "application", "name": "Shop" }))
        .unwrap();
    assert_eq!(env.calls.get(), 1);
}

#[test]
fn unknown_mode_is_rejected() {
    let synth = Synthesizer::with_environment(FixedEnvironment::development());
    let err = synth
        .synthesize(&json!({ "mode": "desktop", "name": "Shop" }))
        .unwrap_err();
    assert_eq!(
        err,
        ValidationError::UnknownMode {
            found: Some("desktop".into())
        }
    );
}

#[test]
fn chunk_assignment() {
    assert_eq!(
        assign_chunk("/node_modules/react-dom/index.js", &CHUNK_RULES),
        Some("vendor-react")
    );
    assert_eq!(assign_chunk("/src/app.ts", &CHUNK_RULES), None);
    assert_eq!(
        assign_chunk("/repo/node_modules/left-pad/index.js", &CHUNK_RULES),
        Some("vendor")
    );
}

#[test]
fn minimal_library() {
    let synth = Synthesizer::with_environment(FixedEnvironment::development());
    let config = synth
        .synthesize(&json!({ "mode": "library", "name": "Utils", "entry": "src/index.ts" }))
        .unwrap();

    assert_eq!(config.mode, Mode::Library);
    assert!(config.build.external.is_empty());
    assert!(config.build.lib.as_ref().unwrap().declarations);
    assert!(config.plugin("react").is_none());
    assert!(config.plugin("dts").is_some());
}

#[test]
fn server_bundle_excludes_client_plugins() {
    let synth = Synthesizer::with_environment(FixedEnvironment::production());
    let config = synth
        .synthesize(&json!({
            "mode": "server",
            "name": "api",
            "entry": "src/server.ts",
            "external": ["pg"],
            "port": 8080
        }))
        .unwrap();

    assert!(config.plugins.iter().all(|plugin| !plugin.is_client_only()));
    assert!(!config.targets(Consumer::Client));
    assert_eq!(config.build.external, vec!["pg"]);
    assert_eq!(config.environments["ssr"].plugins, vec!["path-alias", "node-externals"]);
}

#[test]
fn output_parts_belong_to_their_mode() {
    let synth = Synthesizer::with_environment(FixedEnvironment::production());
    let intents = [
        json!({
            "mode": "application",
            "name": "Shop",
            "assetExtensions": ["glb"],
            "builderTuning": { "sharedPlugins": true }
        }),
        json!({ "mode": "library", "name": "Utils", "entry": "src/index.ts", "enableReact": true }),
        json!({ "mode": "server", "name": "api", "entry": "src/server.ts" }),
    ];

    for raw in intents {
        let config = synth.synthesize(&raw).unwrap();
        let application = config.mode == Mode::Application;

        assert_eq!(config.worker.is_some(), application, "worker in {raw}");
        assert_eq!(config.builder.is_some(), application, "builder in {raw}");
        assert_eq!(config.public_dir.is_some(), application, "publicDir in {raw}");
        assert_eq!(!config.assets_include.is_empty(), application, "assetsInclude in {raw}");
        assert_eq!(!config.build.chunk_groups.is_empty(), application, "chunkGroups in {raw}");
        assert_eq!(config.build.lib.is_some(), config.mode == Mode::Library, "lib in {raw}");
        assert_eq!(config.build.ssr.is_some(), config.mode == Mode::Server, "ssr in {raw}");

        let value = config.to_value().unwrap();
        for key in ["worker", "builder", "publicDir", "assetsInclude"] {
            assert_eq!(value.get(key).is_some(), application, "{key} in {raw}");
        }
        assert_eq!(value["build"].get("chunkGroups").is_some(), application);
        assert_eq!(value["build"].get("lib").is_some(), config.mode == Mode::Library);
        assert_eq!(value["build"].get("ssr").is_some(), config.mode == Mode::Server);
    }
}

#[test]
fn fields_of_one_mode_are_rejected_in_another() {
    let synth = Synthesizer::with_environment(FixedEnvironment::development());

    let err = synth
        .synthesize(&json!({
            "mode": "library",
            "name": "Utils",
            "entry": "src/index.ts",
            "pwa": { "name": "Utils" }
        }))
        .unwrap_err();
    assert_eq!(err, ValidationError::unexpected("pwa"));

    let err = synth
        .synthesize(&json!({ "mode": "server", "name": "api", "entry": "a.ts", "emitDeclarations": true }))
        .unwrap_err();
    assert_eq!(err, ValidationError::unexpected("emitDeclarations"));

    let err = synth
        .synthesize(&json!({ "mode": "application", "name": "Shop", "external": ["pg"] }))
        .unwrap_err();
    assert_eq!(err, ValidationError::unexpected("external"));
}

#[test]
fn json_handoff_uses_camel_case() {
    let synth = Synthesizer::with_environment(FixedEnvironment::development());
    let value = synth
        .synthesize_str(r#"{ "mode": "application", "name": "Shop", "port": 4000 }"#)
        .unwrap()
        .to_value()
        .unwrap();

    assert_eq!(value["mode"], "application");
    assert_eq!(value["server"]["port"], 4000);
    assert_eq!(value["server"]["strictPort"], true);
    assert_eq!(value["build"]["outDir"], "dist");
    assert_eq!(value["environments"]["ssr"]["consumer"], "server");
}

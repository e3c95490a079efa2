//! Property tests over the synthesis pipeline.

use kiln_synth::chunks::{CHUNK_RULES, assign_chunk, is_vendor_module};
use kiln_synth::environment::FixedEnvironment;
use kiln_synth::{Consumer, Mode, Synthesizer};
use proptest::prelude::*;
use serde_json::{Map, Value, json};

/// Arbitrary JSON, shallow enough to stay fast.
fn json_strategy() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::from),
        any::<f64>().prop_map(Value::from),
        ".{0,12}".prop_map(Value::String),
    ];
    leaf.prop_recursive(3, 32, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(Value::Array),
            prop::collection::btree_map("[a-zA-Z]{1,8}", inner, 0..6)
                .prop_map(|map| Value::Object(map.into_iter().collect())),
        ]
    })
}

const FIELDS: &[&str] = &[
    "name",
    "entry",
    "port",
    "external",
    "pwa",
    "cspPolicy",
    "imageQuality",
    "assetExtensions",
    "compressionThresholdBytes",
    "emitDeclarations",
    "enableReact",
    "cssEntry",
    "builderTuning",
];

/// Objects that look like intents: a plausible mode plus known field names
/// carrying arbitrary values.
fn intent_like_strategy() -> impl Strategy<Value = Value> {
    let mode = prop_oneof![
        Just(json!("application")),
        Just(json!("library")),
        Just(json!("server")),
        Just(json!("Application")),
        json_strategy(),
    ];
    (
        mode,
        prop::collection::vec((prop::sample::select(FIELDS), json_strategy()), 0..8),
    )
        .prop_map(|(mode, fields)| {
            let mut map = Map::new();
            map.insert("mode".to_string(), mode);
            for (key, value) in fields {
                map.insert(key.to_string(), value);
            }
            Value::Object(map)
        })
}

/// Valid application intents with a random subset of optional features.
fn application_strategy() -> impl Strategy<Value = Value> {
    (
        "[A-Za-z][A-Za-z ]{0,10}",
        prop::option::of(1024u16..=65535),
        any::<bool>(),
        prop::collection::vec("[a-z]{2,4}", 0..3),
        prop::option::of(1u64..100_000),
    )
        .prop_map(|(name, port, pwa, extensions, threshold)| {
            let mut intent = json!({ "mode": "application", "name": name });
            if let Some(port) = port {
                intent["port"] = json!(port);
            }
            if pwa {
                intent["pwa"] = json!({ "name": name });
            }
            if !extensions.is_empty() {
                intent["assetExtensions"] = json!(extensions);
            }
            if let Some(threshold) = threshold {
                intent["compressionThresholdBytes"] = json!(threshold);
            }
            intent
        })
}

fn module_id_strategy() -> impl Strategy<Value = String> {
    let package = prop::sample::select(vec![
        "react",
        "react-dom",
        "scheduler",
        "react-router-dom",
        "@tanstack/react-query",
        "@radix-ui/react-dialog",
        "lucide-react",
        "lodash",
        "zod",
        "left-pad",
    ]);
    let prefix = prop::sample::select(vec!["/repo/", "", r"C:\repo\"]);
    (any::<bool>(), prefix, package, "[a-z]{1,8}").prop_map(|(vendor, prefix, package, file)| {
        if vendor {
            format!("{prefix}node_modules/{package}/{file}.js")
        } else {
            format!("{prefix}src/{file}.ts")
        }
    })
}

fn production() -> impl Strategy<Value = FixedEnvironment> {
    any::<bool>().prop_map(|prod| {
        if prod {
            FixedEnvironment::production()
        } else {
            FixedEnvironment::development()
        }
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// Any JSON value yields a result, never a panic.
    #[test]
    fn prop_synthesis_is_total(raw in json_strategy()) {
        let synth = Synthesizer::with_environment(FixedEnvironment::development());
        let _ = synth.synthesize(&raw);
    }

    #[test]
    fn prop_intent_like_input_is_total(raw in intent_like_strategy(), env in production()) {
        let synth = Synthesizer::with_environment(env);
        if let Ok(config) = synth.synthesize(&raw) {
            prop_assert_eq!(Some(config.mode.as_str()), raw["mode"].as_str());

            let application = config.mode == Mode::Application;
            prop_assert_eq!(config.worker.is_some(), application);
            prop_assert_eq!(config.public_dir.is_some(), application);
            prop_assert_eq!(!config.build.chunk_groups.is_empty(), application);
            prop_assert!(application || config.builder.is_none());
            prop_assert!(application || config.assets_include.is_empty());
            prop_assert_eq!(config.build.lib.is_some(), config.mode == Mode::Library);
            prop_assert_eq!(config.build.ssr.is_some(), config.mode == Mode::Server);
        }
    }

    #[test]
    fn prop_synthesis_is_deterministic(raw in application_strategy(), env in production()) {
        let synth = Synthesizer::with_environment(env);
        let first = synth.synthesize(&raw).unwrap();
        let second = synth.synthesize(&raw).unwrap();
        prop_assert_eq!(first, second);
    }

    /// The highest-priority matching rule wins whatever order rules arrive in.
    #[test]
    fn prop_chunk_priority_ignores_rule_order(
        module_id in module_id_strategy(),
        shuffled in Just(CHUNK_RULES.clone()).prop_shuffle(),
    ) {
        let expected = CHUNK_RULES
            .iter()
            .filter(|rule| rule.matches(&module_id))
            .max_by_key(|rule| rule.priority)
            .map(|rule| rule.name.as_str());
        prop_assert_eq!(assign_chunk(&module_id, &shuffled), expected);
        prop_assert_eq!(assign_chunk(&module_id, &CHUNK_RULES), expected);
        prop_assert_eq!(expected.is_some(), is_vendor_module(&module_id));
    }

    #[test]
    fn prop_server_consumers_never_see_client_plugins(
        raw in application_strategy(),
        env in production(),
    ) {
        let synth = Synthesizer::with_environment(env);
        let config = synth.synthesize(&raw).unwrap();

        prop_assert!(config
            .plugins_for(Consumer::Server)
            .iter()
            .all(|plugin| !plugin.is_client_only()));

        let ssr = &config.environments["ssr"];
        for name in &ssr.plugins {
            let plugin = config.plugin(name).unwrap();
            prop_assert!(!plugin.is_client_only(), "{} leaked into ssr", name);
        }
    }
}

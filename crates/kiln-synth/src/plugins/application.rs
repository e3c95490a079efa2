//! Application plugin pipeline.

use indexmap::IndexMap;
use kiln_config::{ApplicationIntent, EngineSettings, ImageQuality, PwaOptions};
use serde_json::{Value, json};

use super::{PluginDescriptor, PluginPipeline};
use crate::environment::EnvironmentFacts;

/// Content-Security-Policy applied before intent overrides.
pub const DEFAULT_CSP: [(&str, &[&str]); 7] = [
    ("default-src", &["'self'"]),
    ("script-src", &["'self'"]),
    ("style-src", &["'self'", "'unsafe-inline'"]),
    ("img-src", &["'self'", "data:", "blob:"]),
    ("font-src", &["'self'", "data:"]),
    ("connect-src", &["'self'"]),
    ("object-src", &["'none'"]),
];

const CDN_URL_PATTERN: &str = r"^https://(cdn|static|fonts)\.[^/]+/.*";
const API_URL_PATTERN: &str = r"^https?://[^/]+/api/.*";
const RUNTIME_CACHE_MAX_ENTRIES: u32 = 60;
const CDN_CACHE_MAX_AGE_SECS: u64 = 30 * 24 * 60 * 60;
const API_CACHE_MAX_AGE_SECS: u64 = 5 * 60;
const API_NETWORK_TIMEOUT_SECS: u64 = 10;

const PWA_BACKGROUND_COLOR: &str = "#ffffff";
const PWA_THEME_COLOR: &str = "#ffffff";

/// Build the application pipeline.
///
/// Stages, in order:
///  1. path-alias (always)
///  2. react (always)
///  3. tailwindcss (always)
///  4. pwa (when the intent has `pwa`)
///  5. svgr (always)
///  6. image-optimizer (always, client only)
///  7. webfont-download (always, client only)
///  8. visualizer (always, client only, build only)
///  9. compression-brotli, compression-gzip (production, client only)
/// 10. csp (always, client only)
/// 11. inspect (production; it races with hot-reload rebuilds in dev)
pub fn compose(
    intent: &ApplicationIntent,
    env: &EnvironmentFacts,
    settings: &EngineSettings,
) -> PluginPipeline {
    let threshold = intent
        .compression_threshold_bytes
        .unwrap_or(settings.compression_threshold_bytes);

    let mut pipeline = PluginPipeline::new();
    pipeline
        .stage(path_alias(intent.root_override.as_deref()))
        .stage(react(env))
        .stage(tailwind())
        .stage_with(intent.pwa.as_ref(), "pwa", pwa)
        .stage(svgr())
        .stage(image_optimizer(intent.image_quality, settings))
        .stage(webfonts(&intent.webfont_urls))
        .stage(visualizer())
        .stage_if(env.is_production, "compression-brotli", || {
            compression("compression-brotli", "brotliCompress", ".br", threshold)
        })
        .stage_if(env.is_production, "compression-gzip", || {
            compression("compression-gzip", "gzip", ".gz", threshold)
        })
        .stage(csp(&intent.csp_policy))
        .stage_if(env.is_production, "inspect", inspect);
    pipeline
}

/// `@` → the project's `src` directory.
pub fn aliases(root: Option<&str>) -> IndexMap<String, String> {
    let src = match root {
        Some(root) => format!("{}/src", root.trim_end_matches('/')),
        None => "src".to_string(),
    };
    IndexMap::from([("@".to_string(), src)])
}

pub(crate) fn path_alias(root: Option<&str>) -> PluginDescriptor {
    PluginDescriptor::new("path-alias", json!({ "aliases": aliases(root) }))
}

fn react(env: &EnvironmentFacts) -> PluginDescriptor {
    PluginDescriptor::new(
        "react",
        json!({
            "jsxRuntime": "automatic",
            "fastRefresh": !env.is_production
        }),
    )
}

fn tailwind() -> PluginDescriptor {
    PluginDescriptor::new("tailwindcss", json!({}))
}

/// Manifest fields from the intent over fixed defaults, plus runtime caching.
fn pwa(options: &PwaOptions) -> PluginDescriptor {
    let short_name = options.short_name.as_deref().unwrap_or(&options.name);
    let theme_color = options.theme_color.as_deref().unwrap_or(PWA_THEME_COLOR);

    PluginDescriptor::new(
        "pwa",
        json!({
            "registerType": "autoUpdate",
            "manifest": {
                "name": options.name,
                "short_name": short_name,
                "description": options.description.as_deref().unwrap_or(""),
                "theme_color": theme_color,
                "background_color": PWA_BACKGROUND_COLOR,
                "display": "standalone",
                "start_url": "/",
                "icons": pwa_icons()
            },
            "workbox": {
                "runtimeCaching": [
                    {
                        "urlPattern": CDN_URL_PATTERN,
                        "handler": "CacheFirst",
                        "options": {
                            "cacheName": "cdn-cache",
                            "expiration": {
                                "maxEntries": RUNTIME_CACHE_MAX_ENTRIES,
                                "maxAgeSeconds": CDN_CACHE_MAX_AGE_SECS
                            }
                        }
                    },
                    {
                        "urlPattern": API_URL_PATTERN,
                        "handler": "NetworkFirst",
                        "options": {
                            "cacheName": "api-cache",
                            "networkTimeoutSeconds": API_NETWORK_TIMEOUT_SECS,
                            "expiration": {
                                "maxEntries": RUNTIME_CACHE_MAX_ENTRIES,
                                "maxAgeSeconds": API_CACHE_MAX_AGE_SECS
                            }
                        }
                    }
                ]
            }
        }),
    )
}

fn pwa_icons() -> Value {
    json!([
        { "src": "pwa-192x192.png", "sizes": "192x192", "type": "image/png" },
        { "src": "pwa-512x512.png", "sizes": "512x512", "type": "image/png" },
        {
            "src": "pwa-512x512.png",
            "sizes": "512x512",
            "type": "image/png",
            "purpose": "maskable"
        }
    ])
}

fn svgr() -> PluginDescriptor {
    PluginDescriptor::new(
        "svgr",
        json!({ "include": "**/*.svg?react", "exportType": "default" }),
    )
}

fn image_optimizer(quality: Option<ImageQuality>, settings: &EngineSettings) -> PluginDescriptor {
    let quality = quality.unwrap_or_default();
    let defaults = settings.image_quality;

    PluginDescriptor::new(
        "image-optimizer",
        json!({
            "avif": { "quality": quality.avif.unwrap_or(defaults.avif) },
            "jpeg": { "quality": quality.jpeg.unwrap_or(defaults.jpeg) },
            "png": { "quality": quality.png.unwrap_or(defaults.png) },
            "webp": { "quality": quality.webp.unwrap_or(defaults.webp) }
        }),
    )
    .client_only()
}

fn webfonts(urls: &[String]) -> PluginDescriptor {
    PluginDescriptor::new("webfont-download", json!({ "urls": urls, "injectAsStyleTag": true }))
        .client_only()
}

fn visualizer() -> PluginDescriptor {
    PluginDescriptor::new(
        "visualizer",
        json!({
            "filename": "stats.html",
            "template": "treemap",
            "gzipSize": true,
            "brotliSize": true
        }),
    )
    .client_only()
    .build_only()
}

fn compression(
    name: &'static str,
    algorithm: &str,
    extension: &str,
    threshold: u64,
) -> PluginDescriptor {
    PluginDescriptor::new(
        name,
        json!({
            "algorithm": algorithm,
            "ext": extension,
            "threshold": threshold,
            "deleteOriginFile": false
        }),
    )
    .client_only()
    .build_only()
}

/// Default policy with intent directives layered on top. An intent
/// directive replaces the default one of the same name; new directives are
/// appended after the defaults.
pub fn csp_policy(overrides: &IndexMap<String, Vec<String>>) -> IndexMap<String, Vec<String>> {
    let mut policy: IndexMap<String, Vec<String>> = DEFAULT_CSP
        .iter()
        .map(|(directive, sources)| {
            (
                (*directive).to_string(),
                sources.iter().map(|s| (*s).to_string()).collect(),
            )
        })
        .collect();

    for (directive, sources) in overrides {
        policy.insert(directive.clone(), sources.clone());
    }
    policy
}

fn csp(overrides: &IndexMap<String, Vec<String>>) -> PluginDescriptor {
    PluginDescriptor::new(
        "csp",
        json!({
            "policy": csp_policy(overrides),
            "hashing": {
                "enabled": true,
                "algorithm": "sha256",
                "directives": ["script-src", "style-src"]
            }
        }),
    )
    .client_only()
}

fn inspect() -> PluginDescriptor {
    PluginDescriptor::new("inspect", json!({ "build": true, "outputDir": ".vite-inspect" }))
        .build_only()
}

//! Typed build intents.
//!
//! A [`BuildIntent`] is what survives [`validate`](crate::validate): one
//! variant per build mode, each carrying only the fields its mode accepts.

mod fields;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

pub(crate) use fields::ObjectReader;

/// Build mode discriminant (the raw `mode` field).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Browser application with a dev server and client/SSR environments
    Application,
    /// Reusable package published for other builds to consume
    Library,
    /// Server bundle executed by Node.js
    Server,
}

impl Mode {
    pub const ALL: [Mode; 3] = [Mode::Application, Mode::Library, Mode::Server];

    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Application => "application",
            Mode::Library => "library",
            Mode::Server => "server",
        }
    }

    /// Parse the literal used in raw intents. Matching is exact.
    pub fn from_literal(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|mode| mode.as_str() == value)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validated, mode-discriminated build request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum BuildIntent {
    Application(ApplicationIntent),
    Library(LibraryIntent),
    Server(ServerIntent),
}

impl BuildIntent {
    pub fn mode(&self) -> Mode {
        match self {
            BuildIntent::Application(_) => Mode::Application,
            BuildIntent::Library(_) => Mode::Library,
            BuildIntent::Server(_) => Mode::Server,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            BuildIntent::Application(intent) => &intent.name,
            BuildIntent::Library(intent) => &intent.name,
            BuildIntent::Server(intent) => &intent.name,
        }
    }
}

/// Entry point(s) for library and server builds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Entry {
    /// A single module path
    Single(String),
    /// Named entries (`{"index": "src/index.ts", "cli": "src/cli.ts"}`), in declaration order
    Named(IndexMap<String, String>),
}

impl Entry {
    /// Entry paths in declaration order.
    pub fn paths(&self) -> Vec<&str> {
        match self {
            Entry::Single(path) => vec![path.as_str()],
            Entry::Named(map) => map.values().map(String::as_str).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationIntent {
    pub name: String,

    /// Dev server port (1024-65535)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,

    /// Replaces the default `index.html` entry
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry_override: Option<String>,

    /// Extra file extensions treated as static assets (without the dot)
    pub asset_extensions: Vec<String>,

    /// Minimum asset size, in bytes, before compression kicks in
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compression_threshold_bytes: Option<u64>,

    /// Content-Security-Policy directives layered over the default policy
    pub csp_policy: IndexMap<String, Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_quality: Option<ImageQuality>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub pwa: Option<PwaOptions>,

    pub webfont_urls: Vec<String>,

    /// Project root, when it is not the current directory
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root_override: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub builder_tuning: Option<BuilderTuning>,
}

/// Per-codec image quality (1-100). Unset codecs use the engine defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ImageQuality {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avif: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jpeg: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub png: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub webp: Option<u8>,
}

/// Progressive web app manifest fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PwaOptions {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub short_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme_color: Option<String>,
}

/// Multi-environment builder sharing switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuilderTuning {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shared_config_build: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shared_plugins: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LibraryIntent {
    pub name: String,
    pub entry: Entry,

    /// Packages left as runtime imports
    pub external: Vec<String>,

    /// Emit `.d.ts` files (default: true)
    pub emit_declarations: bool,

    /// Compile JSX with the React plugin (default: false)
    pub enable_react: bool,

    /// Stylesheet bundled next to the library output
    #[serde(skip_serializing_if = "Option::is_none")]
    pub css_entry: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerIntent {
    pub name: String,
    pub entry: Entry,

    pub external: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
}

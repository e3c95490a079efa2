//! Environment facts gathered outside the build intent.
//!
//! This module defines:
//! - `EnvironmentFacts`: immutable per-call snapshot
//! - `BrowserBaseline`: minimum browser versions the output must support
//! - `EnvironmentSource`: where a snapshot comes from (process or fixed)
//! - `BrowserSupport`: the browser-support query behind the baseline

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use std::env;
use std::num::NonZeroU32;

/// Variable whose value `production` selects a production build.
pub const PRODUCTION_FLAG_VAR: &str = "NODE_ENV";
/// Variable carrying the package version (set by npm/pnpm/yarn scripts).
pub const PACKAGE_VERSION_VAR: &str = "npm_package_version";
/// Browserslist-style query for the supported browser baseline.
pub const BROWSER_QUERY_VAR: &str = "BROWSERSLIST";

pub const DEFAULT_PACKAGE_VERSION: &str = "0.0.0";

/// Immutable snapshot of the facts a synthesis call depends on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvironmentFacts {
    pub is_production: bool,
    pub build_timestamp: DateTime<Utc>,
    pub package_version: String,
    pub browser_baseline: BrowserBaseline,
}

impl EnvironmentFacts {
    /// ISO-8601 timestamp, second precision.
    pub fn timestamp_iso(&self) -> String {
        self.build_timestamp
            .to_rfc3339_opts(SecondsFormat::Secs, true)
    }
}

/// Minimum major versions per browser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BrowserBaseline {
    pub chrome: NonZeroU32,
    pub edge: NonZeroU32,
    pub firefox: NonZeroU32,
    pub safari: NonZeroU32,
}

const fn major(version: u32) -> NonZeroU32 {
    match NonZeroU32::new(version) {
        Some(v) => v,
        None => panic!("browser version must be positive"),
    }
}

impl BrowserBaseline {
    /// Used whenever the browser-support query is unavailable.
    pub const FALLBACK: BrowserBaseline = BrowserBaseline {
        chrome: major(107),
        edge: major(107),
        firefox: major(104),
        safari: major(16),
    };

    /// Parse a browserslist-style list of `name version` pairs, e.g.
    /// `"chrome 110, edge 110, firefox 115, safari 16.4"`.
    ///
    /// Only the major version is kept. All four browsers must be present;
    /// if a browser appears twice the lowest version wins.
    pub fn parse_query(query: &str) -> Option<Self> {
        let mut chrome = None;
        let mut edge = None;
        let mut firefox = None;
        let mut safari = None;

        for part in query.split([',', '\n']) {
            let mut words = part.split_whitespace();
            let (Some(browser), Some(version), None) = (words.next(), words.next(), words.next())
            else {
                continue;
            };
            let Some(version) = parse_major(version) else {
                continue;
            };
            let slot = match browser.to_ascii_lowercase().as_str() {
                "chrome" => &mut chrome,
                "edge" => &mut edge,
                "firefox" => &mut firefox,
                "safari" | "ios_saf" => &mut safari,
                _ => continue,
            };
            *slot = Some(slot.map_or(version, |current: NonZeroU32| current.min(version)));
        }

        Some(Self {
            chrome: chrome?,
            edge: edge?,
            firefox: firefox?,
            safari: safari?,
        })
    }

    /// Build targets in the `<browser><major>` form bundlers accept.
    pub fn targets(&self) -> Vec<String> {
        vec![
            format!("chrome{}", self.chrome),
            format!("edge{}", self.edge),
            format!("firefox{}", self.firefox),
            format!("safari{}", self.safari),
        ]
    }
}

impl Default for BrowserBaseline {
    fn default() -> Self {
        Self::FALLBACK
    }
}

fn parse_major(version: &str) -> Option<NonZeroU32> {
    let major = version.split(['.', '-']).next()?;
    major.parse::<u32>().ok().and_then(NonZeroU32::new)
}

/// Browser-support query. `None` means "unavailable", never an error.
pub trait BrowserSupport {
    fn baseline(&self) -> Option<BrowserBaseline>;
}

/// Reads the query from the `BROWSERSLIST` variable.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvBrowserSupport;

impl BrowserSupport for EnvBrowserSupport {
    fn baseline(&self) -> Option<BrowserBaseline> {
        let query = env::var(BROWSER_QUERY_VAR).ok()?;
        let parsed = BrowserBaseline::parse_query(&query);
        if parsed.is_none() {
            tracing::warn!(query = %query, "incomplete browser query, using fallback baseline");
        }
        parsed
    }
}

/// A browser-support table known ahead of time.
#[derive(Debug, Clone, Copy)]
pub struct StaticBrowserSupport(pub BrowserBaseline);

impl BrowserSupport for StaticBrowserSupport {
    fn baseline(&self) -> Option<BrowserBaseline> {
        Some(self.0)
    }
}

/// Where a synthesis call gets its [`EnvironmentFacts`].
pub trait EnvironmentSource {
    fn resolve(&self) -> EnvironmentFacts;
}

/// Facts read from the running process.
#[derive(Debug, Clone)]
pub struct ProcessEnvironment<B = EnvBrowserSupport> {
    browsers: B,
}

impl ProcessEnvironment {
    pub fn new() -> Self {
        Self {
            browsers: EnvBrowserSupport,
        }
    }
}

impl Default for ProcessEnvironment {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: BrowserSupport> ProcessEnvironment<B> {
    /// Use a different browser-support query.
    pub fn with_browser_support(browsers: B) -> Self {
        Self { browsers }
    }
}

impl<B: BrowserSupport> EnvironmentSource for ProcessEnvironment<B> {
    fn resolve(&self) -> EnvironmentFacts {
        let is_production = env::var(PRODUCTION_FLAG_VAR)
            .map(|value| value == "production")
            .unwrap_or(false);

        let package_version = env::var(PACKAGE_VERSION_VAR)
            .ok()
            .filter(|version| !version.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_PACKAGE_VERSION.to_string());

        let browser_baseline = self
            .browsers
            .baseline()
            .unwrap_or(BrowserBaseline::FALLBACK);

        EnvironmentFacts {
            is_production,
            build_timestamp: Utc::now(),
            package_version,
            browser_baseline,
        }
    }
}

/// A frozen snapshot, handed out unchanged on every call.
#[derive(Debug, Clone)]
pub struct FixedEnvironment(pub EnvironmentFacts);

impl FixedEnvironment {
    /// Development facts with the fallback baseline and a fixed timestamp.
    pub fn development() -> Self {
        Self(EnvironmentFacts {
            is_production: false,
            build_timestamp: DateTime::<Utc>::UNIX_EPOCH,
            package_version: DEFAULT_PACKAGE_VERSION.to_string(),
            browser_baseline: BrowserBaseline::FALLBACK,
        })
    }

    pub fn production() -> Self {
        let mut env = Self::development();
        env.0.is_production = true;
        env
    }
}

impl EnvironmentSource for FixedEnvironment {
    fn resolve(&self) -> EnvironmentFacts {
        self.0.clone()
    }
}

/// Resolve facts from the process environment.
pub fn resolve_environment() -> EnvironmentFacts {
    ProcessEnvironment::new().resolve()
}

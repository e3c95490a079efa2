//! Vendor chunk assignment.
//!
//! Third-party modules are grouped into named vendor chunks by matching their
//! id against a fixed, priority-ordered rule table. First-party modules never
//! get a vendor chunk.

use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

/// Path segment that marks a third-party dependency.
pub const VENDOR_SEGMENT: &str = "node_modules";

#[derive(Debug, Clone)]
pub struct ChunkRule {
    pub name: String,
    pub pattern: Regex,
    pub priority: u32,
}

impl ChunkRule {
    pub fn new(name: impl Into<String>, pattern: Regex, priority: u32) -> Self {
        Self {
            name: name.into(),
            pattern,
            priority,
        }
    }

    pub fn matches(&self, module_id: &str) -> bool {
        self.pattern.is_match(module_id)
    }
}

/// Serializable view of a rule (`advancedChunks.groups` style).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChunkGroup {
    pub name: String,
    pub test: String,
    pub priority: u32,
}

impl From<&ChunkRule> for ChunkGroup {
    fn from(rule: &ChunkRule) -> Self {
        Self {
            name: rule.name.clone(),
            test: rule.pattern.as_str().to_string(),
            priority: rule.priority,
        }
    }
}

const DEFAULT_RULES: &[(&str, &str, u32)] = &[
    (
        "vendor-react",
        r"(?:^|[\\/])node_modules[\\/](react|react-dom|scheduler)[\\/]",
        50,
    ),
    (
        "vendor-router",
        r"(?:^|[\\/])node_modules[\\/](react-router|react-router-dom|@remix-run[\\/][^\\/]+)[\\/]",
        40,
    ),
    ("vendor-query", r"(?:^|[\\/])node_modules[\\/]@tanstack[\\/]", 30),
    (
        "vendor-ui",
        r"(?:^|[\\/])node_modules[\\/](@radix-ui[\\/][^\\/]+|@headlessui[\\/][^\\/]+|lucide-react)[\\/]",
        20,
    ),
    (
        "vendor-utils",
        r"(?:^|[\\/])node_modules[\\/](lodash|lodash-es|date-fns|clsx|zod)[\\/]",
        10,
    ),
    ("vendor", r"(?:^|[\\/])node_modules[\\/]", 0),
];

/// The engine's fixed rule table, highest priority first.
pub static CHUNK_RULES: LazyLock<Vec<ChunkRule>> = LazyLock::new(|| {
    DEFAULT_RULES
        .iter()
        .map(|(name, pattern, priority)| {
            let pattern = Regex::new(pattern).expect("built-in chunk pattern is valid");
            ChunkRule::new(*name, pattern, *priority)
        })
        .collect()
});

/// True when some path segment of `module_id` is `node_modules`.
pub fn is_vendor_module(module_id: &str) -> bool {
    module_id
        .split(['/', '\\'])
        .any(|segment| segment == VENDOR_SEGMENT)
}

/// Name of the vendor chunk `module_id` belongs to.
///
/// Rules are tried highest priority first. Equal priorities keep their
/// input order; the shipped table has none.
///
/// # Example
///
/// ```
/// use kiln_synth::chunks::{assign_chunk, CHUNK_RULES};
///
/// assert_eq!(
///     assign_chunk("/node_modules/react-dom/index.js", &CHUNK_RULES),
///     Some("vendor-react")
/// );
/// assert_eq!(assign_chunk("/src/app.ts", &CHUNK_RULES), None);
/// ```
pub fn assign_chunk<'r>(module_id: &str, rules: &'r [ChunkRule]) -> Option<&'r str> {
    if !is_vendor_module(module_id) {
        return None;
    }

    let mut ordered: Vec<&ChunkRule> = rules.iter().collect();
    ordered.sort_by(|a, b| b.priority.cmp(&a.priority));
    ordered
        .into_iter()
        .find(|rule| rule.matches(module_id))
        .map(|rule| rule.name.as_str())
}

/// Rules sorted once, for callers classifying many modules.
#[derive(Debug, Clone)]
pub struct ChunkRuleSet {
    rules: Vec<ChunkRule>,
}

impl ChunkRuleSet {
    pub fn new(mut rules: Vec<ChunkRule>) -> Self {
        rules.sort_by(|a, b| b.priority.cmp(&a.priority));
        let set = Self { rules };
        for (first, second) in set.ties() {
            tracing::warn!(
                first = %first,
                second = %second,
                "chunk rules share a priority; falling back to declaration order"
            );
        }
        set
    }

    /// The built-in table.
    pub fn defaults() -> Self {
        Self::new(CHUNK_RULES.clone())
    }

    pub fn assign(&self, module_id: &str) -> Option<&str> {
        if !is_vendor_module(module_id) {
            return None;
        }
        self.rules
            .iter()
            .find(|rule| rule.matches(module_id))
            .map(|rule| rule.name.as_str())
    }

    /// Adjacent rule names that share a priority.
    pub fn ties(&self) -> Vec<(&str, &str)> {
        self.rules
            .windows(2)
            .filter(|pair| pair[0].priority == pair[1].priority)
            .map(|pair| (pair[0].name.as_str(), pair[1].name.as_str()))
            .collect()
    }

    pub fn rules(&self) -> &[ChunkRule] {
        &self.rules
    }

    pub fn groups(&self) -> Vec<ChunkGroup> {
        self.rules.iter().map(ChunkGroup::from).collect()
    }
}

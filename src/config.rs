//! Scan configuration.

use serde::{Deserialize, Serialize};

/// Options that apply to every level of a scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScanOptions {
    /// The symbol that ends a line, for position tracking.
    pub line_terminator: char,

    /// If set, a symbol that no rule recognizes is an error,
    /// instead of being silently skipped.
    pub strict: bool,

    /// Maximum number of scan levels (the top level counts as one).
    pub max_depth: usize,
}

impl Default for ScanOptions {
    fn default() -> Self {
        ScanOptions {
            line_terminator: '\n',
            strict: false,
            max_depth: 32,
        }
    }
}

impl ScanOptions {
    /// Apply overrides from the environment:
    /// - `LEXISH_STRICT` (`1`/`true`/`0`/`false`)
    /// - `LEXISH_MAX_DEPTH`
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(strict) = std::env::var("LEXISH_STRICT")
            .ok()
            .and_then(|v| parse_flag(&v))
        {
            self.strict = strict;
        }
        if let Some(depth) = std::env::var("LEXISH_MAX_DEPTH")
            .ok()
            .and_then(|v| v.parse().ok())
        {
            self.max_depth = depth;
        }
        self
    }

    /// The options as an `[options]` table body, as a description would give them.
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string(self)
    }
}

fn parse_flag(v: &str) -> Option<bool> {
    match v.trim() {
        "1" => Some(true),
        "0" => Some(false),
        other => other.parse().ok(),
    }
}

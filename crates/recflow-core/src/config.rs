//! Engine configuration that hosts and the CLI can serialize/deserialize.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Block kinds a job may use. `None` means every registered kind.
    pub allowed_blocks: Option<Vec<String>>,

    /// Prepared statements kept per SQL expression (one per record shape).
    pub sql_statement_cache: usize,

    /// Default log filter used by binaries when `RUST_LOG` is unset.
    pub log_level: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            allowed_blocks: None,
            sql_statement_cache: 16,
            log_level: "info".to_string(),
        }
    }
}

impl EngineConfig {
    /// Create a config from environment variables, falling back to defaults.
    ///
    /// Environment variables:
    /// - `RECFLOW_ALLOWED_BLOCKS`: comma-separated block kinds
    /// - `RECFLOW_SQL_STATEMENT_CACHE`: statement cache size per SQL expression
    /// - `RECFLOW_LOG_LEVEL`: default log filter
    pub fn from_env() -> Self {
        let mut cfg = Self::default();

        if let Ok(s) = std::env::var("RECFLOW_ALLOWED_BLOCKS") {
            cfg.allowed_blocks = parse_block_list(&s);
        }

        if let Ok(s) = std::env::var("RECFLOW_SQL_STATEMENT_CACHE") {
            if let Ok(v) = s.parse::<usize>() {
                cfg.sql_statement_cache = v;
            }
        }

        if let Ok(s) = std::env::var("RECFLOW_LOG_LEVEL") {
            cfg.log_level = s;
        }

        cfg
    }

    pub fn allow_list(&self) -> Option<&[String]> {
        self.allowed_blocks.as_deref()
    }
}

/// Parse `"a, b,,c"` into `["a", "b", "c"]`; blank input means no list.
pub fn parse_block_list(s: &str) -> Option<Vec<String>> {
    let kinds: Vec<String> = s
        .split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_string)
        .collect();
    if kinds.is_empty() {
        None
    } else {
        Some(kinds)
    }
}

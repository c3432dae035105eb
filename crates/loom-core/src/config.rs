//! Pipeline configuration (spec §6 "Configuration"). Defaults mirror what a repo
//! gets with no config at all: the project's default ignore set and one worker per
//! hardware thread.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Directories and file globs excluded from extraction unless overridden.
pub const DEFAULT_IGNORE_PATTERNS: &[&str] = &[
    "**/node_modules/**",
    "**/dist/**",
    "**/build/**",
    "**/.git/**",
    "**/coverage/**",
    "**/__tests__/**",
    "**/__mocks__/**",
    "**/.next/**",
    "**/.turbo/**",
    "**/__pycache__/**",
    "**/.venv/**",
    "**/venv/**",
    "**/*.pyc",
    "**/*.test.*",
    "**/*.spec.*",
];

/// File extensions the plugin registry recognises (spec §6 "Supported extensions").
pub const SUPPORTED_EXTENSIONS: &[&str] = &[
    ".ts", ".tsx", ".js", ".jsx", ".mts", ".cts", ".mjs", ".cjs", ".py", ".pyw", ".pyi", ".cs",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub project_root: PathBuf,
    #[serde(default = "default_ignore")]
    pub ignore: Vec<String>,
    #[serde(default)]
    pub extension_filter: Option<Vec<String>>,
    #[serde(default)]
    pub worker_count: Option<usize>,
    #[serde(default)]
    pub store_timeout_ms: Option<u64>,
}

fn default_ignore() -> Vec<String> {
    DEFAULT_IGNORE_PATTERNS.iter().map(|s| s.to_string()).collect()
}

impl PipelineConfig {
    pub fn new(project_root: PathBuf) -> Self {
        PipelineConfig {
            project_root,
            ignore: default_ignore(),
            extension_filter: None,
            worker_count: None,
            store_timeout_ms: None,
        }
    }

    /// Resolved worker-pool size: explicit config wins, otherwise hardware thread
    /// count (spec §5 "Scheduling model"), floored at 1.
    pub fn effective_worker_count(&self) -> usize {
        self.worker_count.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        })
    }

    pub fn effective_store_timeout_ms(&self) -> u64 {
        self.store_timeout_ms.unwrap_or(30_000)
    }

    /// Builds a matcher for `self.ignore`, falling back to the compiled-in defaults
    /// when the config supplies an empty list (an empty ignore list is a valid
    /// choice, but an *absent* `ignore` key in JSON already defaults via serde).
    pub fn ignore_matcher(&self) -> anyhow::Result<globset::GlobSet> {
        let mut builder = globset::GlobSetBuilder::new();
        for pattern in &self.ignore {
            builder.add(globset::Glob::new(pattern)?);
        }
        Ok(builder.build()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_ignore_matches_node_modules() {
        let cfg = PipelineConfig::new(PathBuf::from("/repo"));
        let matcher = cfg.ignore_matcher().unwrap();
        assert!(matcher.is_match("/repo/node_modules/x/index.js"));
        assert!(matcher.is_match("/repo/src/foo.test.ts"));
        assert!(!matcher.is_match("/repo/src/foo.ts"));
    }

    #[test]
    fn worker_count_defaults_to_hardware_threads() {
        let cfg = PipelineConfig::new(PathBuf::from("/repo"));
        assert!(cfg.effective_worker_count() >= 1);
    }

    #[test]
    fn json_roundtrip_with_missing_optional_fields() {
        let json = serde_json::json!({ "project_root": "/repo" });
        let cfg: PipelineConfig = serde_json::from_value(json).unwrap();
        assert_eq!(cfg.ignore, default_ignore());
        assert!(cfg.extension_filter.is_none());
    }
}

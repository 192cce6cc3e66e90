//! Configuration schema definitions.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use trellis_framework::{DEFAULT_TEMPLATE_SUFFIX, TaxQueryMerge};

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrellisConfig {
    /// Site settings: theme location, URL root and time zone.
    #[serde(default)]
    pub site: SiteConfig,

    /// Query rewriting settings.
    #[serde(default)]
    pub query: QueryConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

// =============================================================================
// Site
// =============================================================================

/// Site configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Directory of the active theme. Templates live under `template/`.
    #[serde(default = "default_theme_root")]
    pub theme_root: PathBuf,

    /// Template file suffix, without the dot.
    #[serde(default = "default_template_suffix")]
    pub template_suffix: String,

    /// Site UTC offset in hours, e.g. `8` or `-3.5`.
    #[serde(default)]
    pub gmt_offset: f64,

    /// Prefix of every rewrite rule, e.g. `blog/`. Empty for the site root.
    #[serde(default)]
    pub rewrite_root: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            theme_root: default_theme_root(),
            template_suffix: default_template_suffix(),
            gmt_offset: 0.0,
            rewrite_root: String::new(),
        }
    }
}

fn default_theme_root() -> PathBuf {
    PathBuf::from(".")
}

fn default_template_suffix() -> String {
    DEFAULT_TEMPLATE_SUFFIX.to_string()
}

// =============================================================================
// Query
// =============================================================================

/// Query rewriting configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueryConfig {
    /// How generated taxonomy clauses combine with an existing `tax_query`.
    #[serde(default)]
    pub tax_query_merge: TaxQueryMerge,
}

// =============================================================================
// Logging
// =============================================================================

/// Log verbosity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Returns the level as a filter directive string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }

    /// Converts to a `tracing` level.
    pub fn to_tracing_level(&self) -> tracing::Level {
        match self {
            Self::Trace => tracing::Level::TRACE,
            Self::Debug => tracing::Level::DEBUG,
            Self::Info => tracing::Level::INFO,
            Self::Warn => tracing::Level::WARN,
            Self::Error => tracing::Level::ERROR,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Log line format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Full,
    Pretty,
    /// Requires the `json-log` feature.
    Json,
}

/// Log destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogOutput {
    #[default]
    Stdout,
    Stderr,
    File,
}

/// Which span lifecycle events are logged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpanEventConfig {
    #[serde(default)]
    pub new: bool,
    #[serde(default)]
    pub enter: bool,
    #[serde(default)]
    pub exit: bool,
    #[serde(default)]
    pub close: bool,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default)]
    pub level: LogLevel,

    #[serde(default)]
    pub format: LogFormat,

    #[serde(default)]
    pub output: LogOutput,

    /// Log file, used when `output = "file"`.
    #[serde(default)]
    pub file_path: Option<PathBuf>,

    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,

    #[serde(default = "default_max_files")]
    pub max_files: u32,

    #[serde(default)]
    pub thread_ids: bool,

    /// Include file and line of each event.
    #[serde(default)]
    pub file_location: bool,

    #[serde(default)]
    pub span_events: SpanEventConfig,

    /// Per-target levels, e.g. `trellis_framework = "debug"`.
    #[serde(default)]
    pub filters: BTreeMap<String, LogLevel>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::default(),
            format: LogFormat::default(),
            output: LogOutput::default(),
            file_path: None,
            max_file_size: default_max_file_size(),
            max_files: default_max_files(),
            thread_ids: false,
            file_location: false,
            span_events: SpanEventConfig::default(),
            filters: BTreeMap::new(),
        }
    }
}

fn default_max_file_size() -> u64 {
    10 * 1024 * 1024
}

fn default_max_files() -> u32 {
    5
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = TrellisConfig::default();

        assert_eq!(config.site.theme_root, PathBuf::from("."));
        assert_eq!(config.site.template_suffix, "php");
        assert_eq!(config.site.gmt_offset, 0.0);
        assert_eq!(config.query.tax_query_merge, TaxQueryMerge::Replace);
        assert_eq!(config.logging.level, LogLevel::Info);
    }

    #[test]
    fn test_deserialize_partial_json() {
        let config: TrellisConfig = serde_json::from_str(
            r#"{"site": {"gmt_offset": 8}, "query": {"tax_query_merge": "append"}}"#,
        )
        .unwrap();

        assert_eq!(config.site.gmt_offset, 8.0);
        assert_eq!(config.site.template_suffix, "php");
        assert_eq!(config.query.tax_query_merge, TaxQueryMerge::Append);
    }
}

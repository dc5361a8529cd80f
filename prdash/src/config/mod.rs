//! Configuration for the `prdash` client.
//!
//! Supports layered configuration with the following priority (highest first):
//! 1. CLI arguments
//! 2. Environment variables (via clap `env` attribute)
//! 3. TOML config file (`~/.config/prdash/config.toml`)
//! 4. Compiled defaults
//!
//! Missing config file is not an error (defaults are used). An explicit
//! `--config` path that doesn't exist is an error.

use std::path::PathBuf;
use std::time::Duration;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("failed to read config file {path}: {source}")]
    ReadFile {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Failed to parse the TOML configuration.
    #[error("failed to parse config file: {0}")]
    ParseToml(#[from] toml::de::Error),
}

/// What one section shows: a titled, filtered pull request search.
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
pub struct SectionConfig {
    /// Tab title.
    pub title: String,
    /// Search filters, e.g. `is:open review-requested:@me`.
    pub filters: String,
    /// Page size for this section. Falls back to `defaults.prs_limit`.
    #[serde(default)]
    pub limit: Option<usize>,
}

impl SectionConfig {
    /// Builds a section config without a limit override.
    pub fn new(title: impl Into<String>, filters: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            filters: filters.into(),
            limit: None,
        }
    }
}

// ---------------------------------------------------------------------------
// TOML file structs (all fields Option for partial overrides)
// ---------------------------------------------------------------------------

/// Top-level TOML config file structure.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct ConfigFile {
    defaults: DefaultsFileConfig,
    ui: UiFileConfig,
    prs_sections: Vec<SectionConfig>,
}

/// `[defaults]` section of the config file.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct DefaultsFileConfig {
    prs_limit: Option<usize>,
    refetch_interval_minutes: Option<u64>,
    fixture: Option<PathBuf>,
}

/// `[ui]` section of the config file.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct UiFileConfig {
    poll_timeout_ms: Option<u64>,
    channel_capacity: Option<usize>,
}

// ---------------------------------------------------------------------------
// Resolved configuration (concrete types, all fields populated)
// ---------------------------------------------------------------------------

/// Fully resolved dashboard configuration.
#[derive(Debug, Clone)]
pub struct DashConfig {
    /// Sections in tab order.
    pub sections: Vec<SectionConfig>,
    /// Page size for sections without their own limit.
    pub prs_limit: usize,
    /// Interval between automatic full refreshes. `None` disables them.
    pub refetch_interval: Option<Duration>,
    /// JSON file the fixture backend loads pull requests from.
    pub fixture: Option<PathBuf>,
    /// Poll timeout for the TUI event loop.
    pub poll_timeout: Duration,
    /// Capacity of the inbound event channel.
    pub channel_capacity: usize,
}

impl Default for DashConfig {
    fn default() -> Self {
        Self {
            sections: default_sections(),
            prs_limit: 20,
            refetch_interval: Some(Duration::from_secs(30 * 60)),
            fixture: None,
            poll_timeout: Duration::from_millis(50),
            channel_capacity: 256,
        }
    }
}

/// Sections shown when the config file defines none.
#[must_use]
pub fn default_sections() -> Vec<SectionConfig> {
    vec![
        SectionConfig::new("My Pull Requests", "is:open author:@me"),
        SectionConfig::new("Needs My Review", "is:open review-requested:@me"),
        SectionConfig::new("Involved", "is:open involves:@me -author:@me"),
    ]
}

impl DashConfig {
    /// Load configuration by merging CLI args, env vars, and a TOML file.
    ///
    /// If `--config` is given and the file does not exist, returns an
    /// error. Otherwise the default path is tried and silently ignored if
    /// missing.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the config file cannot be read or parsed.
    pub fn load(cli: &CliArgs) -> Result<Self, ConfigError> {
        let file = load_config_file(cli.config.as_deref())?;
        Ok(Self::resolve(cli, file))
    }

    /// Resolve from CLI args alone, as if no config file existed.
    ///
    /// Used when the config file is unreadable so that `--fixture` and
    /// `PRDASH_FIXTURE` still apply.
    #[must_use]
    pub fn from_cli(cli: &CliArgs) -> Self {
        Self::resolve(cli, ConfigFile::default())
    }

    /// Resolve a `DashConfig` from CLI args and a parsed config file.
    ///
    /// Priority: CLI > file > default. A refetch interval of `0` minutes
    /// disables automatic refreshes.
    fn resolve(cli: &CliArgs, file: ConfigFile) -> Self {
        let defaults = Self::default();

        let sections = if file.prs_sections.is_empty() {
            defaults.sections
        } else {
            file.prs_sections
        };
        let refetch_interval = match file.defaults.refetch_interval_minutes {
            Some(0) => None,
            Some(m) => Some(Duration::from_secs(m * 60)),
            None => defaults.refetch_interval,
        };

        Self {
            sections,
            prs_limit: file.defaults.prs_limit.unwrap_or(defaults.prs_limit),
            refetch_interval,
            fixture: cli.fixture.clone().or(file.defaults.fixture),
            poll_timeout: file
                .ui
                .poll_timeout_ms
                .map_or(defaults.poll_timeout, Duration::from_millis),
            channel_capacity: file
                .ui
                .channel_capacity
                .unwrap_or(defaults.channel_capacity),
        }
    }
}

/// CLI arguments parsed by clap.
#[derive(clap::Parser, Debug, Default)]
#[command(version, about = "Terminal dashboard for pull request sections")]
pub struct CliArgs {
    /// Path to config file (default: `~/.config/prdash/config.toml`).
    #[arg(short, long, env = "PRDASH_CONFIG")]
    pub config: Option<PathBuf>,

    /// JSON file with pull requests to serve instead of a remote.
    #[arg(long, env = "PRDASH_FIXTURE")]
    pub fixture: Option<PathBuf>,

    /// Log level filter (trace, debug, info, warn, error).
    #[arg(long, default_value = "info", env = "PRDASH_LOG")]
    pub log_level: String,

    /// Path to log file (default: `$TMPDIR/prdash.log`).
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

/// Load and parse a TOML config file.
///
/// If `explicit_path` is `Some`, the file must exist (error if not).
/// If `explicit_path` is `None`, the default path is tried and missing file
/// is treated as empty config.
fn load_config_file(explicit_path: Option<&std::path::Path>) -> Result<ConfigFile, ConfigError> {
    let path = if let Some(p) = explicit_path {
        let contents = std::fs::read_to_string(p).map_err(|e| ConfigError::ReadFile {
            path: p.to_path_buf(),
            source: e,
        })?;
        return Ok(toml::from_str(&contents)?);
    } else {
        let Some(config_dir) = dirs::config_dir() else {
            return Ok(ConfigFile::default());
        };
        config_dir.join("prdash").join("config.toml")
    };

    match std::fs::read_to_string(&path) {
        Ok(contents) => Ok(toml::from_str(&contents)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(ConfigFile::default()),
        Err(e) => Err(ConfigError::ReadFile { path, source: e }),
    }
}

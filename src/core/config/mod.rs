//! core::config
//!
//! Configuration schema and loading.
//!
//! # Overview
//!
//! revdiff has two configuration scopes:
//! - **Global**: User-level settings
//! - **Repo**: Repository-level overrides
//!
//! # Precedence
//!
//! Configuration values are resolved in this order (later overrides earlier):
//! 1. Default values
//! 2. Global config file
//! 3. Repo config file
//! 4. CLI flags (not handled here)
//!
//! # Global Config Locations
//!
//! Searched in order, first existing file wins:
//! 1. `$REVDIFF_CONFIG` if set
//! 2. `$XDG_CONFIG_HOME/revdiff/config.toml`
//! 3. `~/.revdiff/config.toml`
//!
//! # Repo Config Locations
//!
//! Searched in order:
//! 1. `.git/revdiff/config.toml` (private to this clone)
//! 2. `.revdiff.toml` at the working-copy root (shared with collaborators)
//!
//! When both exist the first wins and a warning is reported. The shared
//! file travels with clones, so `engine.program` and `engine.args` are
//! ignored there (with a warning); only the private file, the global file
//! or command-line flags choose what runs.
//!
//! # Example
//!
//! ```no_run
//! use revdiff::core::config::Config;
//!
//! let result = Config::load(None).unwrap();
//! let config = result.config;
//!
//! println!("engine: {}", config.engine_program());
//! println!("timeout: {:?}", config.engine_timeout());
//! ```

pub mod schema;

pub use schema::{EngineConfig, GlobalConfig, RepoConfig};

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::diff::{ExitPolicy, DEFAULT_TIMEOUT, LATEXDIFF_PROGRAM};
use crate::git::RepoInfo;

/// Environment variable naming an explicit global config file.
pub const CONFIG_ENV: &str = "REVDIFF_CONFIG";

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("invalid config value: {0}")]
    InvalidValue(String),
}

/// Warnings generated during config loading.
#[derive(Debug, Clone)]
pub struct ConfigWarning {
    /// The warning message.
    pub message: String,
    /// The path that triggered the warning.
    pub path: PathBuf,
}

/// Result of loading configuration.
#[derive(Debug)]
pub struct ConfigLoadResult {
    /// The loaded configuration.
    pub config: Config,
    /// Any warnings generated during loading.
    pub warnings: Vec<ConfigWarning>,
}

/// Merged configuration from all sources.
///
/// Accessor methods apply precedence rules: repo config overrides global
/// config, which overrides built-in defaults.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Global configuration
    pub global: GlobalConfig,
    /// Repository configuration (if in a repo and a file exists)
    pub repo: Option<RepoConfig>,
}

impl Config {
    /// Load configuration from default locations.
    ///
    /// If `repo` is provided, also loads repo-specific config.
    ///
    /// # Errors
    ///
    /// Returns an error if config files exist but cannot be parsed or hold
    /// invalid values. Missing config files are not an error.
    pub fn load(repo: Option<&RepoInfo>) -> Result<ConfigLoadResult, ConfigError> {
        Self::load_from(&Self::global_candidates(), repo)
    }

    /// Load configuration with an explicit list of global config candidates.
    pub fn load_from(
        global_candidates: &[PathBuf],
        repo: Option<&RepoInfo>,
    ) -> Result<ConfigLoadResult, ConfigError> {
        let mut warnings = Vec::new();

        let (global, global_path) = match global_candidates.iter().find(|p| p.is_file()) {
            Some(path) => (read_config::<GlobalConfig>(path)?, Some(path.clone())),
            None => (GlobalConfig::default(), None),
        };

        let (repo_config, repo_path) = match repo {
            Some(info) => Self::load_repo(info, &mut warnings)?,
            None => (None, None),
        };

        global.validate()?;
        if let Some(ref r) = repo_config {
            r.validate()?;
        }

        if let Some(path) = &global_path {
            tracing::debug!(path = %path.display(), "loaded global config");
        }
        if let Some(path) = &repo_path {
            tracing::debug!(path = %path.display(), "loaded repo config");
        }

        Ok(ConfigLoadResult {
            config: Config {
                global,
                repo: repo_config,
            },
            warnings,
        })
    }

    /// Global config locations, most specific first.
    fn global_candidates() -> Vec<PathBuf> {
        let mut candidates = Vec::new();

        if let Some(path) = std::env::var_os(CONFIG_ENV) {
            candidates.push(PathBuf::from(path));
        }
        if let Some(xdg_home) = std::env::var_os("XDG_CONFIG_HOME") {
            candidates.push(PathBuf::from(xdg_home).join("revdiff/config.toml"));
        }
        if let Some(home) = dirs::home_dir() {
            candidates.push(home.join(".revdiff/config.toml"));
        }

        candidates
    }

    /// Load repository configuration from standard locations.
    fn load_repo(
        info: &RepoInfo,
        warnings: &mut Vec<ConfigWarning>,
    ) -> Result<(Option<RepoConfig>, Option<PathBuf>), ConfigError> {
        let private = Self::repo_config_path(&info.git_dir);
        let shared = Self::shared_config_path(&info.work_dir);

        match (private.is_file(), shared.is_file()) {
            (true, shadowed) => {
                if shadowed {
                    warnings.push(ConfigWarning {
                        message: format!(
                            "ignoring '{}' because '{}' takes precedence",
                            shared.display(),
                            private.display()
                        ),
                        path: shared,
                    });
                }
                let config = read_config(&private)?;
                Ok((Some(config), Some(private)))
            }
            (false, true) => {
                let mut config: RepoConfig = read_config(&shared)?;
                for key in config.strip_commands() {
                    warnings.push(ConfigWarning {
                        message: format!(
                            "ignoring {} in '{}'; set it in '{}' or the global config",
                            key,
                            shared.display(),
                            private.display()
                        ),
                        path: shared.clone(),
                    });
                }
                Ok((Some(config), Some(shared)))
            }
            (false, false) => Ok((None, None)),
        }
    }

    /// Private repo config path: `<git_dir>/revdiff/config.toml`.
    pub fn repo_config_path(git_dir: &Path) -> PathBuf {
        git_dir.join("revdiff/config.toml")
    }

    /// Shared repo config path: `<work_dir>/.revdiff.toml`.
    pub fn shared_config_path(work_dir: &Path) -> PathBuf {
        work_dir.join(".revdiff.toml")
    }

    // =========================================================================
    // Accessor methods with precedence
    // =========================================================================

    /// Engine settings after applying repo over global.
    pub fn engine(&self) -> EngineConfig {
        let global = self.global.engine.clone().unwrap_or_default();
        match self.repo.as_ref().and_then(|r| r.engine.as_ref()) {
            Some(repo) => global.overlay(repo),
            None => global,
        }
    }

    /// Differencing program.
    ///
    /// Defaults to `latexdiff`.
    pub fn engine_program(&self) -> String {
        self.engine()
            .program
            .unwrap_or_else(|| LATEXDIFF_PROGRAM.to_string())
    }

    /// Extra engine arguments.
    ///
    /// Defaults to none.
    pub fn engine_args(&self) -> Vec<String> {
        self.engine().args.unwrap_or_default()
    }

    /// Exit-code policy.
    ///
    /// Each list independently defaults to latexdiff's codes.
    pub fn exit_policy(&self) -> ExitPolicy {
        let engine = self.engine();
        let defaults = ExitPolicy::latexdiff();
        ExitPolicy::new(
            engine
                .success_codes
                .unwrap_or_else(|| defaults.success_codes().to_vec()),
            engine
                .difference_codes
                .unwrap_or_else(|| defaults.difference_codes().to_vec()),
        )
    }

    /// Bound on one engine run.
    ///
    /// Defaults to [`DEFAULT_TIMEOUT`].
    pub fn engine_timeout(&self) -> Duration {
        self.engine()
            .timeout_secs
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_TIMEOUT)
    }

    /// Directory under which workspaces are created.
    ///
    /// `None` means the system temp dir.
    pub fn temp_dir(&self) -> Option<&Path> {
        self.global.temp_dir.as_deref()
    }
}

/// Read and parse a config file.
fn read_config<T: DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.to_path_buf(),
        source: e,
    })?;

    toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

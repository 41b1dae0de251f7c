//! core::config::schema
//!
//! Configuration schema types.
//!
//! # Global Config
//!
//! Located at (in order of precedence):
//! 1. `$REVDIFF_CONFIG` if set
//! 2. `$XDG_CONFIG_HOME/revdiff/config.toml`
//! 3. `~/.revdiff/config.toml`
//!
//! # Repo Config
//!
//! Located at `.git/revdiff/config.toml` (private) or `.revdiff.toml` at
//! the working-copy root (committed alongside the documents). A committed
//! file cannot choose the engine program or its arguments; see
//! [`RepoConfig::strip_commands`].
//!
//! # Validation
//!
//! Config values are validated after parsing so a bad file is reported
//! once, at load time, with its path.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::ConfigError;

/// Global configuration (user scope).
///
/// # Example
///
/// ```toml
/// temp_dir = "/var/tmp"
///
/// [engine]
/// program = "latexdiff"
/// args = ["--type=CFONT"]
/// timeout_secs = 120
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct GlobalConfig {
    /// Directory under which run workspaces are created
    pub temp_dir: Option<PathBuf>,

    /// Differencing engine defaults
    pub engine: Option<EngineConfig>,
}

impl GlobalConfig {
    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(dir) = &self.temp_dir {
            if dir.as_os_str().is_empty() {
                return Err(ConfigError::InvalidValue(
                    "temp_dir cannot be empty".to_string(),
                ));
            }
        }

        if let Some(engine) = &self.engine {
            engine.validate()?;
        }

        Ok(())
    }
}

/// Repository configuration.
///
/// # Example
///
/// ```toml
/// [engine]
/// args = ["--math-markup=whole", "--flatten"]
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct RepoConfig {
    /// Differencing engine overrides for this repository
    pub engine: Option<EngineConfig>,
}

impl RepoConfig {
    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(engine) = &self.engine {
            engine.validate()?;
        }
        Ok(())
    }

    /// Drop every key that decides what gets executed.
    ///
    /// Returns the dotted names of the keys that were set. Applied to the
    /// committed `.revdiff.toml`, whose contents come from whoever last
    /// pushed to the repository.
    pub fn strip_commands(&mut self) -> Vec<&'static str> {
        let mut stripped = Vec::new();
        if let Some(engine) = &mut self.engine {
            if engine.program.take().is_some() {
                stripped.push("engine.program");
            }
            if engine.args.take().is_some() {
                stripped.push("engine.args");
            }
        }
        stripped
    }
}

/// Differencing engine settings.
///
/// Every field is optional; unset fields fall through to the next scope.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Program name or path
    pub program: Option<String>,

    /// Extra arguments placed before the two input files
    pub args: Option<Vec<String>>,

    /// Exit codes meaning success
    pub success_codes: Option<Vec<i32>>,

    /// Exit codes meaning "succeeded, differences present"
    pub difference_codes: Option<Vec<i32>>,

    /// Bound on one engine run, in seconds
    pub timeout_secs: Option<u64>,
}

impl EngineConfig {
    /// Validate the engine settings.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(program) = &self.program {
            if program.trim().is_empty() {
                return Err(ConfigError::InvalidValue(
                    "engine.program cannot be empty".to_string(),
                ));
            }
        }

        if let Some(codes) = &self.success_codes {
            if codes.is_empty() {
                return Err(ConfigError::InvalidValue(
                    "engine.success_codes cannot be empty".to_string(),
                ));
            }
        }

        if self.timeout_secs == Some(0) {
            return Err(ConfigError::InvalidValue(
                "engine.timeout_secs must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }

    /// Field-by-field overlay: values set in `over` win.
    pub fn overlay(&self, over: &EngineConfig) -> EngineConfig {
        EngineConfig {
            program: over.program.clone().or_else(|| self.program.clone()),
            args: over.args.clone().or_else(|| self.args.clone()),
            success_codes: over
                .success_codes
                .clone()
                .or_else(|| self.success_codes.clone()),
            difference_codes: over
                .difference_codes
                .clone()
                .or_else(|| self.difference_codes.clone()),
            timeout_secs: over.timeout_secs.or(self.timeout_secs),
        }
    }
}

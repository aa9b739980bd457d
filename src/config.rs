//! Configuration management for assgn-sanitizer
//!
//! Optional settings live in ~/.assgn-sanitizer/config.toml, or in a file passed with --config.

use crate::markers::MarkerTable;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Commented template printed by `--print-config` when no config file is in use
pub const DEFAULT_CONFIG: &str = r##"# assgn-sanitizer configuration file

[markers]
# Extra extension -> line comment token entries. Built-in entries cover
# .py .c .cpp .h .hpp .java .fs .yml .yaml and can be overridden here.
#".rs" = "//"
#".sh" = "#"

[logging]
# Append log output to this file instead of stderr (optional)
#file = "/tmp/assgn-sanitizer.log"
"##;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Extension → comment token additions and overrides
    #[serde(default)]
    pub markers: BTreeMap<String, String>,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log file path; stderr when unset
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl Config {
    /// Build the immutable marker table the processor works from
    pub fn marker_table(&self) -> MarkerTable {
        MarkerTable::with_overrides(self.markers.iter().map(|(e, m)| (e.clone(), m.clone())))
    }
}

/// Default configuration file path
pub fn config_file_path() -> Result<PathBuf> {
    let home_dir = dirs::home_dir()
        .ok_or_else(|| anyhow::anyhow!("Cannot determine home directory"))?;

    Ok(home_dir.join(".assgn-sanitizer").join("config.toml"))
}

/// Parse and validate configuration text
pub fn parse_config(config_str: &str) -> Result<Config> {
    let config: Config = toml::from_str(config_str).context("Failed to parse configuration")?;
    validate_config(&config)?;
    Ok(config)
}

/// Config file a run reads from: the explicit path if given, otherwise the
/// default location when it exists.
pub fn active_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => config_file_path().ok().filter(|path| path.exists()),
    }
}

/// Load configuration.
///
/// An explicit path must exist. Without one, the default location is used if
/// present and built-in defaults otherwise.
pub fn load_config(explicit: Option<&Path>) -> Result<Config> {
    let Some(config_path) = active_config_path(explicit) else {
        return Ok(Config::default());
    };

    let config_str = fs::read_to_string(&config_path)
        .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;

    parse_config(&config_str)
        .with_context(|| format!("Invalid config file: {}", config_path.display()))
}

/// Validate configuration values
pub fn validate_config(config: &Config) -> Result<()> {
    for (ext, marker) in &config.markers {
        let valid_ext = ext.len() > 1
            && ext.starts_with('.')
            && !ext[1..].contains(['.', '/', '\\'])
            && !ext.contains(char::is_whitespace);
        if !valid_ext {
            anyhow::bail!("Invalid extension: {:?} (must look like \".py\")", ext);
        }

        if marker.is_empty() || marker.contains(char::is_whitespace) {
            anyhow::bail!("Invalid comment marker for {}: {:?} (must be non-empty, no whitespace)", ext, marker);
        }
    }

    Ok(())
}

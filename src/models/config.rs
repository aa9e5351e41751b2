// IP Info Bar - Application Configuration
// Copyright (C) 2026 Christos A. Daggas
// SPDX-License-Identifier: MIT

//! Application configuration model.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::path::PathBuf;
use std::time::Duration;

use super::DATA_DIR_NAME;

/// Label verbosity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    /// Address family prefixes only ("IPv4: ...", "VPN: ...").
    #[default]
    Simple,
    /// Interface names and MAC addresses.
    Detailed,
}

impl ViewMode {
    pub fn from_detailed(detailed: bool) -> Self {
        if detailed {
            Self::Detailed
        } else {
            Self::Simple
        }
    }

    pub fn is_detailed(&self) -> bool {
        matches!(self, Self::Detailed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Simple => "simple",
            Self::Detailed => "detailed",
        }
    }
}

/// How to run the external data provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Executable name (resolved from PATH) or absolute path.
    #[serde(default = "default_provider_program")]
    pub program: String,

    /// Script passed as the single argument to the program.
    ///
    /// Omitted means the default script; `""` means no argument.
    #[serde(
        default = "default_provider_script",
        serialize_with = "serialize_script",
        deserialize_with = "deserialize_script"
    )]
    pub script: Option<PathBuf>,

    /// Maximum time to wait for the provider's output line.
    #[serde(default = "default_provider_timeout")]
    pub timeout_secs: u64,
}

impl ProviderConfig {
    /// Create a provider config for an explicit program and script.
    pub fn new(program: impl Into<String>, script: Option<PathBuf>) -> Self {
        Self {
            program: program.into(),
            script,
            timeout_secs: default_provider_timeout(),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            program: default_provider_program(),
            script: default_provider_script(),
            timeout_secs: default_provider_timeout(),
        }
    }
}

fn default_provider_program() -> String {
    "python3".to_string()
}

fn default_provider_script() -> Option<PathBuf> {
    dirs::data_dir().map(|dir| dir.join(DATA_DIR_NAME).join("backend").join("utils.py"))
}

fn serialize_script<S: Serializer>(script: &Option<PathBuf>, serializer: S) -> Result<S::Ok, S::Error> {
    match script {
        Some(path) => path.serialize(serializer),
        None => serializer.serialize_str(""),
    }
}

fn deserialize_script<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<PathBuf>, D::Error> {
    let path = PathBuf::deserialize(deserializer)?;
    Ok((!path.as_os_str().is_empty()).then_some(path))
}

fn default_provider_timeout() -> u64 {
    10
}

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Show interface names and MAC addresses.
    #[serde(default)]
    pub detailed_view: bool,

    /// Refresh interval in seconds.
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval_secs: u64,

    /// How long provider results are reused, in milliseconds.
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl_ms: u64,

    /// Expose the widget on the session bus.
    #[serde(default = "default_true")]
    pub dbus_enabled: bool,

    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Data provider invocation.
    #[serde(default)]
    pub provider: ProviderConfig,
}

fn default_refresh_interval() -> u64 {
    15
}

fn default_cache_ttl() -> u64 {
    20_000
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            detailed_view: false,
            refresh_interval_secs: default_refresh_interval(),
            cache_ttl_ms: default_cache_ttl(),
            dbus_enabled: true,
            log_level: default_log_level(),
            provider: ProviderConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn view_mode(&self) -> ViewMode {
        ViewMode::from_detailed(self.detailed_view)
    }

    /// Refresh interval, never shorter than one second.
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs.max(1))
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_millis(self.cache_ttl_ms)
    }

    /// Load configuration from TOML file.
    pub fn load_from_file(path: &std::path::Path) -> Result<Self, super::Error> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| super::Error::ConfigReadFailed(format!("{}: {}", path.display(), e)))?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to TOML file with restrictive permissions (0600).
    pub fn save_to_file(&self, path: &std::path::Path) -> Result<(), super::Error> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)
            .map_err(|e| super::Error::ConfigWriteFailed(format!("{}: {}", path.display(), e)))?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let _ = std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600));
        }
        Ok(())
    }
}

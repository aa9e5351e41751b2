// IP Info Bar - Error Types
// Copyright (C) 2026 Christos A. Daggas
// SPDX-License-Identifier: MIT

//! Shared error types for the IP Info Bar application.

use std::time::Duration;
use thiserror::Error;

/// Result type alias for IP Info Bar operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Failure of a single data provider invocation.
///
/// Every variant is recoverable: the refresh cycle renders the error
/// sentinel and tries again on the next tick.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("Data provider not found in PATH: {0}")]
    ProviderNotFound(String),

    #[error("Failed to spawn data provider: {0}")]
    SpawnFailed(String),

    #[error("Data provider produced no output")]
    NoOutput,

    #[error("Data provider timed out after {0:?}")]
    Timeout(Duration),

    #[error("Malformed data provider output: {0}")]
    MalformedOutput(String),

    #[error("Data provider reported an error: {0}")]
    ProviderReportedError(String),
}

impl FetchError {
    /// Check if the provider ran and answered, as opposed to never starting.
    pub fn is_provider_response(&self) -> bool {
        matches!(
            self,
            Self::MalformedOutput(_) | Self::ProviderReportedError(_)
        )
    }
}

/// Main error type for IP Info Bar operations.
#[derive(Debug, Error)]
pub enum Error {
    // ========================================
    // Storage Errors
    // ========================================
    #[error("Failed to read configuration: {0}")]
    ConfigReadFailed(String),

    #[error("Failed to write configuration: {0}")]
    ConfigWriteFailed(String),

    #[error("Failed to parse configuration: {0}")]
    ConfigParseFailed(String),

    // ========================================
    // D-Bus Errors
    // ========================================
    #[error("D-Bus error: {0}")]
    Dbus(String),

    #[error("No running instance found on the session bus")]
    InstanceNotRunning,

    // ========================================
    // Provider Errors
    // ========================================
    #[error(transparent)]
    Fetch(#[from] FetchError),

    // ========================================
    // System Errors
    // ========================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

// Convert from zbus errors
impl From<zbus::Error> for Error {
    fn from(err: zbus::Error) -> Self {
        Error::Dbus(err.to_string())
    }
}

// Convert from toml parse errors
impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::ConfigParseFailed(err.to_string())
    }
}

// Convert from toml serialize errors
impl From<toml::ser::Error> for Error {
    fn from(err: toml::ser::Error) -> Self {
        Error::ConfigWriteFailed(err.to_string())
    }
}

// Convert from JSON errors
impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Other(format!("JSON error: {}", err))
    }
}

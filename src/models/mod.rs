// IP Info Bar - Shared Models
// Copyright (C) 2026 Christos A. Daggas
// SPDX-License-Identifier: MIT

//! # IP Info Bar Models
//!
//! Shared types used across the widget:
//!
//! - **Facts**: Network facts reported by the data provider
//! - **Config**: Application settings and view mode
//! - **Error**: Provider failures and application errors

pub mod config;
pub mod error;
pub mod facts;

// Re-export main types for convenience
pub use config::{AppConfig, ProviderConfig, ViewMode};
pub use error::{Error, FetchError, Result};
pub use facts::{InterfaceAddress, NetworkFacts, TunnelAddress};

/// D-Bus service name for the running widget.
pub const DBUS_SERVICE_NAME: &str = "org.ipinfobar.Widget";

/// D-Bus object path for the widget interface.
pub const DBUS_OBJECT_PATH: &str = "/org/ipinfobar/Widget";

/// D-Bus interface name for the widget.
pub const DBUS_INTERFACE_NAME: &str = "org.ipinfobar.Widget1";

/// Configuration directory name (under XDG_CONFIG_HOME).
pub const CONFIG_DIR_NAME: &str = "ip-info-bar";

/// Data directory name (under XDG_DATA_HOME).
pub const DATA_DIR_NAME: &str = "ip-info-bar";

/// Text shown before the first refresh completes.
pub const LOADING_TEXT: &str = "Loading...";

/// Text shown when the provider succeeded but reported nothing displayable.
pub const NO_CONNECTION_TEXT: &str = "No connection";

/// Text shown when the last refresh failed.
pub const ERROR_TEXT: &str = "Error";

// IP Info Bar - Settings Storage
// Copyright (C) 2026 Christos A. Daggas
// SPDX-License-Identifier: MIT

//! Settings storage for the widget.
//!
//! The view mode is read at every label build, so edits to the settings
//! file take effect on the next refresh. The file is re-parsed only when
//! its modification time changes.
//!
//! This module uses RwLock for thread-safe access. Lock poisoning is handled
//! gracefully by recovering the inner value, as poison indicates a panic
//! in another thread but the data itself may still be valid.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use std::time::SystemTime;
use tracing::{debug, error, info, warn};

use crate::models::{AppConfig, Error, ViewMode, CONFIG_DIR_NAME};

/// Live application settings backed by a TOML file.
#[derive(Debug)]
pub struct SettingsStore {
    /// Settings file path (`None` for an in-memory store).
    settings_file: Option<PathBuf>,
    /// Current settings.
    settings: RwLock<AppConfig>,
    /// Modification time of the file when it was last read.
    loaded_mtime: RwLock<Option<SystemTime>>,
    /// View mode forced from the command line, never persisted.
    view_override: RwLock<Option<ViewMode>>,
}

impl SettingsStore {
    /// Default settings file location.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(CONFIG_DIR_NAME)
            .join("settings.toml")
    }

    /// Open the store at the default location.
    pub fn new() -> Self {
        Self::with_file(Self::default_path())
    }

    /// Open the store backed by a specific settings file.
    pub fn with_file(settings_file: PathBuf) -> Self {
        if let Some(config_dir) = settings_file.parent() {
            if let Err(e) = fs::create_dir_all(config_dir) {
                error!("Failed to create config directory: {}", e);
            }
            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                let _ = fs::set_permissions(config_dir, fs::Permissions::from_mode(0o700));
            }
        }

        let store = Self {
            settings_file: Some(settings_file),
            settings: RwLock::new(AppConfig::default()),
            loaded_mtime: RwLock::new(None),
            view_override: RwLock::new(None),
        };
        store.reload_if_changed();
        store
    }

    /// Store that never touches the filesystem.
    pub fn in_memory(config: AppConfig) -> Self {
        Self {
            settings_file: None,
            settings: RwLock::new(config),
            loaded_mtime: RwLock::new(None),
            view_override: RwLock::new(None),
        }
    }

    // ========================================================================
    // RwLock Helper Methods (handle poisoning gracefully)
    // ========================================================================

    /// Read from RwLock, recovering from poison if needed.
    fn read_lock<T, F, R>(lock: &RwLock<T>, context: &str, reader: F) -> R
    where
        F: FnOnce(&T) -> R,
    {
        match lock.read() {
            Ok(guard) => reader(&*guard),
            Err(poisoned) => {
                warn!("RwLock poisoned reading {}, recovering", context);
                reader(&*poisoned.into_inner())
            }
        }
    }

    /// Write to RwLock, recovering from poison if needed.
    fn write_lock<T, F, R>(lock: &RwLock<T>, context: &str, writer: F) -> R
    where
        F: FnOnce(&mut T) -> R,
    {
        match lock.write() {
            Ok(mut guard) => writer(&mut *guard),
            Err(poisoned) => {
                warn!("RwLock poisoned writing {}, recovering", context);
                writer(&mut *poisoned.into_inner())
            }
        }
    }

    // ========================================================================
    // Settings
    // ========================================================================

    /// Path of the backing file, if any.
    pub fn settings_file(&self) -> Option<&Path> {
        self.settings_file.as_deref()
    }

    /// Get a snapshot of the current settings.
    pub fn settings(&self) -> AppConfig {
        Self::read_lock(&self.settings, "settings", |s| s.clone())
    }

    /// Current view mode, picking up external edits to the settings file.
    pub fn view_mode(&self) -> ViewMode {
        if let Some(mode) = Self::read_lock(&self.view_override, "view_override", |o| *o) {
            return mode;
        }
        self.reload_if_changed();
        Self::read_lock(&self.settings, "settings", |s| s.view_mode())
    }

    /// Force a view mode for this process without saving it.
    pub fn override_view_mode(&self, mode: ViewMode) {
        Self::write_lock(&self.view_override, "view_override", |o| *o = Some(mode));
    }

    /// Switch between simple and detailed view and persist the choice.
    pub fn set_detailed_view(&self, detailed: bool) -> Result<(), Error> {
        Self::write_lock(&self.view_override, "view_override", |o| *o = None);
        self.reload_if_changed();
        let config = Self::write_lock(&self.settings, "settings", |s| {
            s.detailed_view = detailed;
            s.clone()
        });
        info!("View mode set to {}", config.view_mode().as_str());
        self.save(&config)
    }

    fn save(&self, config: &AppConfig) -> Result<(), Error> {
        let Some(path) = &self.settings_file else {
            return Ok(());
        };
        config.save_to_file(path)?;
        let mtime = Self::modified(path);
        Self::write_lock(&self.loaded_mtime, "loaded_mtime", |m| *m = mtime);
        Ok(())
    }

    /// Re-read the settings file if it changed since the last read.
    fn reload_if_changed(&self) {
        let Some(path) = &self.settings_file else {
            return;
        };

        let Some(mtime) = Self::modified(path) else {
            return;
        };
        let loaded = Self::read_lock(&self.loaded_mtime, "loaded_mtime", |m| *m);
        if loaded == Some(mtime) {
            return;
        }

        match AppConfig::load_from_file(path) {
            Ok(config) => {
                Self::write_lock(&self.settings, "settings", |s| *s = config);
                debug!("Loaded settings from {:?}", path);
            }
            Err(e) => {
                error!("Failed to load settings: {}", e);
            }
        }
        // Record the mtime even on failure so a broken file is reported once.
        Self::write_lock(&self.loaded_mtime, "loaded_mtime", |m| *m = Some(mtime));
    }

    fn modified(path: &Path) -> Option<SystemTime> {
        fs::metadata(path).and_then(|m| m.modified()).ok()
    }
}

impl Default for SettingsStore {
    fn default() -> Self {
        Self::new()
    }
}

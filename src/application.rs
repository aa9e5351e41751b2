// IP Info Bar - Application
// Copyright (C) 2026 Christos A. Daggas
// SPDX-License-Identifier: MIT

//! Application root object and lifecycle wiring.

use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc::{self, UnboundedSender};
use tracing::{debug, info, warn};

use crate::models::{Result, LOADING_TEXT};
use crate::render::{ChannelSink, RenderSink, StdoutSink};
use crate::scheduler::{Phase, RefreshScheduler};
use crate::services::{FactsCache, Provider, ScriptProvider};
use crate::storage::SettingsStore;
use crate::tray::{self, TrayCommand, TrayHandle};
use crate::{APP_NAME, VERSION};

/// Run-time switches from the command line.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    /// Skip the D-Bus service even if enabled in the settings.
    pub no_dbus: bool,
    /// Read commands from stdin.
    pub interactive: bool,
}

/// The widget process.
pub struct Application {
    settings: Arc<SettingsStore>,
    options: RunOptions,
}

impl Application {
    pub fn new(settings: Arc<SettingsStore>, options: RunOptions) -> Self {
        Self { settings, options }
    }

    fn build_scheduler(&self, sink: Arc<dyn RenderSink>) -> RefreshScheduler {
        let config = self.settings.settings();
        let provider: Arc<dyn Provider> = Arc::new(ScriptProvider::new(config.provider.clone()));
        let cache = FactsCache::new(provider, config.cache_ttl());
        RefreshScheduler::new(cache, Arc::clone(&self.settings), sink, config.refresh_interval())
    }

    /// Refresh once and return the label to print and whether it succeeded.
    pub async fn run_once(self) -> (String, bool) {
        let silent: Vec<Arc<dyn RenderSink>> = Vec::new();
        let mut scheduler = self.build_scheduler(Arc::new(silent));
        let widget = scheduler.handle();

        widget.refresh_now().await;
        let result = (widget.current_text(), widget.phase() != Phase::Failed);

        scheduler.deactivate().await;
        result
    }

    /// Run until Ctrl-C or a quit command.
    pub async fn run(self) -> Result<()> {
        info!("{} {} starting up", APP_NAME, VERSION);
        match self.settings.settings_file() {
            Some(path) => info!("Using settings file {:?}", path),
            None => info!("Using in-memory settings"),
        }

        let (command_tx, mut command_rx) = mpsc::unbounded_channel();
        let (channel_sink, mut label_rx) = ChannelSink::new(LOADING_TEXT);
        let sinks: Vec<Arc<dyn RenderSink>> =
            vec![Arc::new(StdoutSink::new()), Arc::new(channel_sink)];

        let mut scheduler = self.build_scheduler(Arc::new(sinks));
        let widget = scheduler.handle();
        let mut refresh_rx = widget.subscribe_refreshes();

        let tray = self.start_tray(&scheduler, command_tx.clone()).await;

        if self.options.interactive {
            spawn_stdin_reader(command_tx.clone());
        }

        scheduler.activate();

        let ctrl_c = tokio::signal::ctrl_c();
        tokio::pin!(ctrl_c);

        loop {
            tokio::select! {
                res = &mut ctrl_c => {
                    if let Err(e) = res {
                        warn!("Failed to listen for Ctrl-C: {}", e);
                    }
                    info!("Interrupted, shutting down");
                    break;
                }
                command = command_rx.recv() => match command {
                    Some(TrayCommand::Advance) => {
                        widget.advance();
                    }
                    Some(TrayCommand::Refresh) => widget.request_refresh(),
                    Some(TrayCommand::Quit) | None => {
                        info!("Quit requested");
                        break;
                    }
                },
                changed = refresh_rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    refresh_rx.borrow_and_update();
                    if let Some(tray) = &tray {
                        if let Err(e) = tray.notify_refreshed().await {
                            debug!("Failed to emit refresh: {}", e);
                        }
                    }
                }
                changed = label_rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let label = label_rx.borrow_and_update().clone();
                    debug!("Label changed: {}", label);
                    if let Some(tray) = &tray {
                        if let Err(e) = tray.notify_label_changed().await {
                            debug!("Failed to emit label change: {}", e);
                        }
                    }
                }
            }
        }

        scheduler.deactivate().await;
        Ok(())
    }

    async fn start_tray(
        &self,
        scheduler: &RefreshScheduler,
        command_tx: UnboundedSender<TrayCommand>,
    ) -> Option<TrayHandle> {
        if self.options.no_dbus || !self.settings.settings().dbus_enabled {
            debug!("D-Bus service disabled");
            return None;
        }

        match tray::start_tray(scheduler.handle(), Arc::clone(&self.settings), command_tx).await {
            Ok(handle) => Some(handle),
            Err(e) => {
                warn!("Failed to start D-Bus service, continuing without it: {}", e);
                None
            }
        }
    }
}

/// Map a line typed on stdin to a command.
fn parse_command(line: &str) -> Option<TrayCommand> {
    match line.trim() {
        "" | "n" | "next" => Some(TrayCommand::Advance),
        "r" | "refresh" => Some(TrayCommand::Refresh),
        "q" | "quit" => Some(TrayCommand::Quit),
        _ => None,
    }
}

fn spawn_stdin_reader(command_tx: UnboundedSender<TrayCommand>) {
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => match parse_command(&line) {
                    Some(command) => {
                        if command_tx.send(command).is_err() {
                            break;
                        }
                    }
                    None => eprintln!("Unknown command: {} (Enter = next, r = refresh, q = quit)", line.trim()),
                },
                Ok(None) => {
                    debug!("stdin closed");
                    break;
                }
                Err(e) => {
                    warn!("Failed to read stdin: {}", e);
                    break;
                }
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_command() {
        assert_eq!(parse_command(""), Some(TrayCommand::Advance));
        assert_eq!(parse_command("  \n"), Some(TrayCommand::Advance));
        assert_eq!(parse_command("r"), Some(TrayCommand::Refresh));
        assert_eq!(parse_command("q"), Some(TrayCommand::Quit));
        assert_eq!(parse_command("help"), None);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_run_once_with_missing_program_fails() {
        use crate::models::{AppConfig, ProviderConfig};

        let config = AppConfig {
            provider: ProviderConfig::new("ip-info-bar-no-such-program", None),
            ..Default::default()
        };
        let app = Application::new(
            Arc::new(SettingsStore::in_memory(config)),
            RunOptions::default(),
        );

        assert_eq!(app.run_once().await, ("Error".to_string(), false));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_run_once_with_script() {
        use crate::models::{AppConfig, ProviderConfig};

        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("provider.sh");
        std::fs::write(
            &script,
            "echo '{\"lan_ip4\":{\"interface\":\"eth0\",\"address\":\"192.168.1.5\"},\"has_remote_ssh\":true}'\n",
        )
        .unwrap();

        let config = AppConfig {
            provider: ProviderConfig::new("sh", Some(script)),
            ..Default::default()
        };
        let app = Application::new(
            Arc::new(SettingsStore::in_memory(config)),
            RunOptions::default(),
        );

        assert_eq!(app.run_once().await, ("IPv4: 192.168.1.5".to_string(), true));
    }
}

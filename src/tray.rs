// IP Info Bar - D-Bus Control Surface
// Copyright (C) 2026 Christos A. Daggas
// SPDX-License-Identifier: MIT

//! Session bus interface for the running widget.
//!
//! Panels and scripts can read the current label, cycle to the next one,
//! force a refresh or switch the view mode. A second invocation of the
//! binary with `--advance` uses the same interface.

use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info};
use zbus::object_server::InterfaceRef;
use zbus::{interface, Connection, SignalContext};

use crate::models::{
    Error, Result, DBUS_INTERFACE_NAME, DBUS_OBJECT_PATH, DBUS_SERVICE_NAME,
};
use crate::scheduler::WidgetHandle;
use crate::storage::SettingsStore;

/// Commands sent from control surfaces to the main loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrayCommand {
    /// Show the next label
    Advance,
    /// Refresh now
    Refresh,
    /// Deactivate and exit
    Quit,
}

/// D-Bus object exported at [`DBUS_OBJECT_PATH`].
pub struct WidgetInterface {
    widget: WidgetHandle,
    settings: Arc<SettingsStore>,
    command_tx: UnboundedSender<TrayCommand>,
}

impl WidgetInterface {
    pub fn new(
        widget: WidgetHandle,
        settings: Arc<SettingsStore>,
        command_tx: UnboundedSender<TrayCommand>,
    ) -> Self {
        Self {
            widget,
            settings,
            command_tx,
        }
    }
}

#[interface(name = "org.ipinfobar.Widget1")]
impl WidgetInterface {
    /// Show the next label and return it.
    async fn advance(&self) -> String {
        self.widget.advance()
    }

    /// Refresh the network facts now (the cache still applies).
    async fn refresh(&self) {
        self.widget.request_refresh();
    }

    /// Switch view mode, persist it and rebuild the labels.
    async fn set_detailed_view(
        &self,
        detailed: bool,
        #[zbus(signal_context)] ctxt: SignalContext<'_>,
    ) -> zbus::fdo::Result<()> {
        self.settings
            .set_detailed_view(detailed)
            .map_err(|e| zbus::fdo::Error::Failed(e.to_string()))?;
        self.widget.request_refresh();
        if let Err(e) = self.detailed_view_changed(&ctxt).await {
            debug!("Failed to emit DetailedView change: {}", e);
        }
        Ok(())
    }

    /// Stop the widget and exit.
    async fn quit(&self) {
        if self.command_tx.send(TrayCommand::Quit).is_err() {
            debug!("Quit requested but the main loop is already gone");
        }
    }

    #[zbus(property)]
    async fn label(&self) -> String {
        self.widget.current_text()
    }

    #[zbus(property)]
    async fn labels(&self) -> Vec<String> {
        self.widget.labels()
    }

    #[zbus(property)]
    async fn detailed_view(&self) -> bool {
        self.settings.view_mode().is_detailed()
    }

    /// RFC 3339 time of the last successful refresh, empty if none yet.
    #[zbus(property)]
    async fn last_updated(&self) -> String {
        self.widget
            .last_success()
            .map(|t| t.to_rfc3339())
            .unwrap_or_default()
    }
}

/// Handle for the exported D-Bus service.
pub struct TrayHandle {
    connection: Connection,
}

impl TrayHandle {
    async fn interface(&self) -> Result<InterfaceRef<WidgetInterface>> {
        Ok(self
            .connection
            .object_server()
            .interface::<_, WidgetInterface>(DBUS_OBJECT_PATH)
            .await?)
    }

    /// Emit PropertiesChanged for `Label`.
    pub async fn notify_label_changed(&self) -> Result<()> {
        let iface_ref = self.interface().await?;
        let iface = iface_ref.get().await;
        iface.label_changed(iface_ref.signal_context()).await?;
        Ok(())
    }

    /// Emit PropertiesChanged for `Label`, `Labels` and `LastUpdated` after a refresh.
    pub async fn notify_refreshed(&self) -> Result<()> {
        let iface_ref = self.interface().await?;
        let iface = iface_ref.get().await;
        iface.label_changed(iface_ref.signal_context()).await?;
        iface.labels_changed(iface_ref.signal_context()).await?;
        iface.last_updated_changed(iface_ref.signal_context()).await?;
        Ok(())
    }
}

/// Export the widget on the session bus and claim the well-known name.
pub async fn start_tray(
    widget: WidgetHandle,
    settings: Arc<SettingsStore>,
    command_tx: UnboundedSender<TrayCommand>,
) -> Result<TrayHandle> {
    let connection = Connection::session().await?;

    connection
        .object_server()
        .at(DBUS_OBJECT_PATH, WidgetInterface::new(widget, settings, command_tx))
        .await?;

    connection.request_name(DBUS_SERVICE_NAME).await?;

    info!("D-Bus service {} started", DBUS_SERVICE_NAME);
    Ok(TrayHandle { connection })
}

/// Ask an already-running widget to show its next label.
///
/// Returns the label it now shows.
pub async fn advance_running_instance() -> Result<String> {
    let connection = Connection::session().await?;

    let reply = connection
        .call_method(
            Some(DBUS_SERVICE_NAME),
            DBUS_OBJECT_PATH,
            Some(DBUS_INTERFACE_NAME),
            "Advance",
            &(),
        )
        .await;

    match reply {
        Ok(message) => Ok(message.body().deserialize::<String>()?),
        Err(zbus::Error::MethodError(name, _, _))
            if name.as_str() == "org.freedesktop.DBus.Error.ServiceUnknown" =>
        {
            Err(Error::InstanceNotRunning)
        }
        Err(e) => Err(e.into()),
    }
}

// IP Info Bar - Render Sinks
// Copyright (C) 2026 Christos A. Daggas
// SPDX-License-Identifier: MIT

//! Where the current label ends up.
//!
//! Rendering is fire-and-forget: a sink never reports failure back to the
//! refresh cycle.

use std::io::Write;
use std::sync::{Arc, Mutex};
use tokio::sync::watch;
use tracing::debug;

/// A text surface the widget writes its current label into.
pub trait RenderSink: Send + Sync {
    fn render(&self, text: &str);
}

/// Fan out to several sinks in order.
impl RenderSink for Vec<Arc<dyn RenderSink>> {
    fn render(&self, text: &str) {
        for sink in self {
            sink.render(text);
        }
    }
}

/// Prints each new label on its own line, for bars that read a command's stdout.
#[derive(Debug, Default)]
pub struct StdoutSink {
    last: Mutex<Option<String>>,
}

impl StdoutSink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RenderSink for StdoutSink {
    fn render(&self, text: &str) {
        let mut last = match self.last.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if last.as_deref() == Some(text) {
            return;
        }

        let mut stdout = std::io::stdout().lock();
        // Line-buffered consumers need the flush.
        if writeln!(stdout, "{}", text).and_then(|_| stdout.flush()).is_err() {
            debug!("stdout closed, dropping label");
        }
        *last = Some(text.to_string());
    }
}

/// Publishes the latest label on a watch channel.
#[derive(Debug)]
pub struct ChannelSink {
    tx: watch::Sender<String>,
}

impl ChannelSink {
    /// Create a sink and a receiver holding `initial`.
    pub fn new(initial: &str) -> (Self, watch::Receiver<String>) {
        let (tx, rx) = watch::channel(initial.to_string());
        (Self { tx }, rx)
    }
}

impl RenderSink for ChannelSink {
    fn render(&self, text: &str) {
        self.tx.send_if_modified(|current| {
            if current == text {
                false
            } else {
                *current = text.to_string();
                true
            }
        });
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Sink that remembers every render call.
    #[derive(Debug, Default)]
    pub(crate) struct RecordingSink {
        rendered: Mutex<Vec<String>>,
    }

    impl RecordingSink {
        pub(crate) fn rendered(&self) -> Vec<String> {
            self.rendered.lock().unwrap().clone()
        }

        pub(crate) fn last(&self) -> Option<String> {
            self.rendered.lock().unwrap().last().cloned()
        }
    }

    impl RenderSink for RecordingSink {
        fn render(&self, text: &str) {
            self.rendered.lock().unwrap().push(text.to_string());
        }
    }

    #[test]
    fn test_channel_sink_publishes_changes() {
        let (sink, mut rx) = ChannelSink::new("Loading...");
        assert_eq!(*rx.borrow_and_update(), "Loading...");

        sink.render("IPv4: 192.168.1.5");
        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), "IPv4: 192.168.1.5");

        sink.render("IPv4: 192.168.1.5");
        assert!(!rx.has_changed().unwrap());
    }

    #[test]
    fn test_fan_out() {
        let a = Arc::new(RecordingSink::default());
        let b = Arc::new(RecordingSink::default());
        let sinks: Vec<Arc<dyn RenderSink>> = vec![a.clone(), b.clone()];

        sinks.render("WAN: 203.0.113.7");

        assert_eq!(a.rendered(), vec!["WAN: 203.0.113.7"]);
        assert_eq!(b.last().as_deref(), Some("WAN: 203.0.113.7"));
    }
}

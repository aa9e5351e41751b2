// IP Info Bar - Refresh Scheduler
// Copyright (C) 2026 Christos A. Daggas
// SPDX-License-Identifier: MIT

//! Periodic refresh of the widget label.
//!
//! One task per widget performs every refresh, whether it comes from the
//! interval timer or from an explicit request. User-driven cycling goes
//! through a plain mutex and never waits on the provider.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, TryLockError};
use std::time::Duration;
use chrono::{DateTime, Local};
use tokio::sync::{watch, Notify};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::cycle::CycleSelector;
use crate::labels::LabelBuilder;
use crate::models::{ERROR_TEXT, LOADING_TEXT, NO_CONNECTION_TEXT};
use crate::render::RenderSink;
use crate::services::FactsCache;
use crate::storage::SettingsStore;

/// Default refresh interval.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(15);

/// Outcome of the most recent refresh.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Phase {
    /// No refresh has completed yet.
    #[default]
    Loading,
    /// The provider answered; labels may still be empty.
    Ready,
    /// The last refresh failed.
    Failed,
}

/// What the presentation layer shows.
#[derive(Debug, Default)]
struct WidgetState {
    phase: Phase,
    cycle: CycleSelector,
    last_success: Option<DateTime<Local>>,
    /// Bumped on every change that needs a render.
    revision: u64,
}

impl WidgetState {
    fn text(&self) -> String {
        match self.phase {
            Phase::Loading => LOADING_TEXT.to_string(),
            Phase::Failed => ERROR_TEXT.to_string(),
            Phase::Ready => self
                .cycle
                .current()
                .unwrap_or(NO_CONNECTION_TEXT)
                .to_string(),
        }
    }
}

struct Shared {
    cache: FactsCache,
    settings: Arc<SettingsStore>,
    sink: Arc<dyn RenderSink>,
    state: Mutex<WidgetState>,
    /// Held while the sink is written; stores the last rendered revision.
    render_gate: Mutex<u64>,
    alive: AtomicBool,
    refresh_requested: Notify,
    /// Counts completed refresh cycles.
    refreshed: watch::Sender<u64>,
}

impl Shared {
    fn state(&self) -> MutexGuard<'_, WidgetState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                warn!("Widget state lock poisoned, recovering");
                poisoned.into_inner()
            }
        }
    }

    /// Wait for any render in progress and return the gate.
    fn lock_render_gate(&self) -> MutexGuard<'_, u64> {
        match self.render_gate.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Write the latest state to the sink.
    ///
    /// Never waits for another render: if one is in progress, its owner
    /// picks up the newer revision when it finishes.
    fn publish(&self) {
        loop {
            let mut rendered = match self.render_gate.try_lock() {
                Ok(guard) => guard,
                Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner(),
                Err(TryLockError::WouldBlock) => return,
            };

            let (text, revision) = {
                let state = self.state();
                (state.text(), state.revision)
            };
            if !self.alive.load(Ordering::SeqCst) || *rendered == revision {
                return;
            }

            self.sink.render(&text);
            *rendered = revision;
            drop(rendered);

            if self.state().revision == revision {
                return;
            }
        }
    }

    /// Fetch (or reuse) facts, rebuild labels and render.
    async fn refresh(&self) {
        if !self.alive.load(Ordering::SeqCst) {
            return;
        }

        let result = self.cache.get(Instant::now()).await;
        let built = result.map(|facts| {
            let mode = self.settings.view_mode();
            (LabelBuilder::build(&facts, mode), mode)
        });

        {
            let mut state = self.state();
            // Checked under the lock so teardown cannot interleave with the update.
            if !self.alive.load(Ordering::SeqCst) {
                debug!("Widget deactivated during refresh, discarding result");
                return;
            }

            match built {
                Ok((labels, mode)) => {
                    let count = labels.len();
                    state.cycle.replace(labels);
                    debug!("Built {} label(s) in {} view", count, mode.as_str());
                    state.phase = Phase::Ready;
                    state.last_success = Some(Local::now());
                }
                Err(e) if e.is_provider_response() => {
                    warn!("Data provider reported a problem: {}", e);
                    state.cycle.clear();
                    state.phase = Phase::Failed;
                }
                Err(e) => {
                    warn!("Failed to run data provider: {}", e);
                    state.cycle.clear();
                    state.phase = Phase::Failed;
                }
            }
            state.revision += 1;
        }

        self.refreshed.send_modify(|count| *count += 1);
        self.publish();
    }
}

/// Cloneable handle used by presentation surfaces.
#[derive(Clone)]
pub struct WidgetHandle {
    shared: Arc<Shared>,
}

impl WidgetHandle {
    /// Step to the next label and re-render. Never waits on the provider
    /// or on a render started elsewhere.
    pub fn advance(&self) -> String {
        let text = {
            let mut state = self.shared.state();
            if state.cycle.is_empty() {
                return state.text();
            }
            state.cycle.advance();
            state.revision += 1;
            state.text()
        };
        self.shared.publish();
        text
    }

    /// The label currently shown.
    pub fn current_text(&self) -> String {
        self.shared.state().text()
    }

    /// All labels available for cycling.
    pub fn labels(&self) -> Vec<String> {
        self.shared.state().cycle.labels().to_vec()
    }

    pub fn phase(&self) -> Phase {
        self.shared.state().phase
    }

    /// Wall-clock time of the last successful refresh.
    pub fn last_success(&self) -> Option<DateTime<Local>> {
        self.shared.state().last_success
    }

    /// Receiver that changes after every completed refresh, successful or not.
    pub fn subscribe_refreshes(&self) -> watch::Receiver<u64> {
        self.shared.refreshed.subscribe()
    }

    /// Ask the refresh task to run a cycle now.
    pub fn request_refresh(&self) {
        self.shared.refresh_requested.notify_one();
    }

    /// Run one refresh cycle on the caller's task.
    pub async fn refresh_now(&self) {
        self.shared.refresh().await;
    }
}

/// Owner of a widget instance and its refresh task.
pub struct RefreshScheduler {
    shared: Arc<Shared>,
    interval: Duration,
    task: Option<JoinHandle<()>>,
}

impl RefreshScheduler {
    pub fn new(
        cache: FactsCache,
        settings: Arc<SettingsStore>,
        sink: Arc<dyn RenderSink>,
        interval: Duration,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                cache,
                settings,
                sink,
                state: Mutex::new(WidgetState::default()),
                render_gate: Mutex::new(0),
                alive: AtomicBool::new(true),
                refresh_requested: Notify::new(),
                refreshed: watch::channel(0).0,
            }),
            interval,
            task: None,
        }
    }

    pub fn handle(&self) -> WidgetHandle {
        WidgetHandle {
            shared: Arc::clone(&self.shared),
        }
    }

    pub fn is_active(&self) -> bool {
        self.task.is_some()
    }

    /// Render the loading label, refresh now, then every interval.
    pub fn activate(&mut self) {
        if self.is_active() {
            return;
        }

        info!(
            "Starting refresh scheduler (interval: {}s, cache TTL: {}ms)",
            self.interval.as_secs(),
            self.shared.cache.ttl().as_millis()
        );

        self.shared.alive.store(true, Ordering::SeqCst);
        self.shared.state().revision += 1;
        self.shared.publish();

        let shared = Arc::clone(&self.shared);
        let interval = self.interval;
        self.task = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {}
                    _ = shared.refresh_requested.notified() => {
                        debug!("Refresh requested");
                    }
                }
                shared.refresh().await;
            }
        }));
    }

    /// Stop refreshing and reset all widget state.
    ///
    /// An in-flight provider call is dropped, which kills its child.
    pub async fn deactivate(&mut self) {
        self.shared.alive.store(false, Ordering::SeqCst);

        if let Some(task) = self.task.take() {
            task.abort();
            match task.await {
                Ok(()) => {}
                Err(e) if e.is_cancelled() => {}
                Err(e) => warn!("Refresh task ended abnormally: {}", e),
            }
            info!("Refresh scheduler stopped");
        }

        {
            // Let a render that started before teardown finish first.
            let _gate = self.shared.lock_render_gate();
            let mut state = self.shared.state();
            let revision = state.revision;
            *state = WidgetState {
                revision: revision + 1,
                ..Default::default()
            };
        }
        self.shared.cache.clear().await;
    }
}

impl Drop for RefreshScheduler {
    fn drop(&mut self) {
        self.shared.alive.store(false, Ordering::SeqCst);
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

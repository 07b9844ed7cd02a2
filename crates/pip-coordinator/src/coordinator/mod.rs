//! The coordinator: single global owner of PiP state.
//!
//! Cheap to clone; clones share state. The state lock is never held
//! across an `.await`, so a hung tab can stall at most the task talking
//! to it.

mod handoff;
mod scan;
mod toggle;


use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use pip_common::{Badge, BadgeKind, Event, EventBus, TabId};
use pip_config::schema::{BadgeConfig, CoordinatorConfig};
use pip_config::PipConfig;
use pip_protocol::AgentReport;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use crate::host::{HostEvent, HostRuntime, ReportOrigin};
use crate::machine::{OwnershipMachine, PipState, Transition};
use crate::store::SessionStore;

pub use toggle::ToggleOutcome;

struct Inner {
    host: Arc<dyn HostRuntime>,
    store: Box<dyn SessionStore>,
    config: CoordinatorConfig,
    badge: BadgeConfig,
    toggle_command: String,
    state: Mutex<State>,
    events: EventBus,
}

#[derive(Default)]
struct State {
    machine: OwnershipMachine,
    /// Bumped on every badge change so a stale clear timer does nothing.
    badge_epoch: u64,
    /// Bumped on every ownership transition.
    revision: u64,
    /// Most recent tab to gain ownership, with the revision it happened at.
    last_entry: Option<(TabId, u64)>,
    /// Most recent tab to lose ownership, with the revision it happened at.
    last_release: Option<(TabId, u64)>,
}

impl State {
    fn record(&mut self, transition: &Transition) {
        self.revision += 1;
        if let Some(tab) = transition.to.owner() {
            self.last_entry = Some((tab, self.revision));
        }
        if let Some(tab) = transition.from.owner() {
            self.last_release = Some((tab, self.revision));
        }
    }

    /// Whether reports applied after revision `since` contradict `tab`
    /// owning PiP: another tab entered, or `tab` itself exited.
    fn superseded(&self, tab: TabId, since: u64) -> bool {
        if self.machine.owner() == Some(tab) {
            return false;
        }
        let foreign_entry = matches!(self.last_entry, Some((t, rev)) if t != tab && rev > since);
        let own_release = matches!(self.last_release, Some((t, rev)) if t == tab && rev > since);
        foreign_entry || own_release
    }
}

#[derive(Clone)]
pub struct Coordinator {
    inner: Arc<Inner>,
}

impl Coordinator {
    pub fn new(host: Arc<dyn HostRuntime>, store: Box<dyn SessionStore>, config: &PipConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                host,
                store,
                config: config.coordinator.clone(),
                badge: config.badge.clone(),
                toggle_command: config.commands.toggle.clone(),
                state: Mutex::new(State::default()),
                events: EventBus::default(),
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.inner.events.subscribe()
    }

    pub fn pip_state(&self) -> PipState {
        self.state().machine.state()
    }

    pub fn owner(&self) -> Option<TabId> {
        self.state().machine.owner()
    }

    pub fn hint(&self) -> Option<TabId> {
        self.state().machine.hint()
    }

    // =========================================================================
    // Event entry points
    // =========================================================================

    /// Handle one host event to completion.
    pub async fn handle(&self, event: HostEvent) {
        match event {
            HostEvent::ActionClicked { tab } => {
                self.toggle(tab).await;
            }
            HostEvent::Command(name) => {
                if name == self.inner.toggle_command {
                    self.toggle(None).await;
                } else {
                    tracing::debug!(command = %name, "Ignoring unknown command");
                }
            }
            HostEvent::TabActivated { tab, window } => {
                tracing::debug!(%tab, %window, "Tab activated");
                self.on_foreground_changed(tab).await;
            }
            HostEvent::WindowFocusChanged(Some(window)) => {
                match self.inner.host.active_tab_in(window).await {
                    Some(tab) => {
                        self.on_foreground_changed(tab).await;
                    }
                    None => tracing::debug!(%window, "Focused window has no active tab"),
                }
            }
            HostEvent::WindowFocusChanged(None) => {}
            other => self.apply_event(other),
        }
    }

    /// Apply state-only events inline and run everything else on its own
    /// task, so a newer toggle never waits behind an older one.
    pub fn dispatch(&self, event: HostEvent) -> Option<JoinHandle<()>> {
        match event {
            HostEvent::TabClosed(_) | HostEvent::TabNavigated(_) | HostEvent::Report { .. } => {
                self.apply_event(event);
                None
            }
            event => {
                let this = self.clone();
                Some(tokio::spawn(async move { this.handle(event).await }))
            }
        }
    }

    fn apply_event(&self, event: HostEvent) {
        match event {
            HostEvent::TabClosed(tab) => {
                tracing::debug!(%tab, "Tab closed");
                self.update(|m| m.tab_closed(tab));
            }
            HostEvent::TabNavigated(tab) => {
                tracing::debug!(%tab, "Tab navigated");
                self.update(|m| m.tab_navigated(tab));
            }
            HostEvent::Report { origin, report } => self.on_report(origin, report),
            other => tracing::warn!(event = ?other, "Event needs async handling"),
        }
    }

    fn on_report(&self, origin: ReportOrigin, report: AgentReport) {
        let tab = origin.tab;
        tracing::debug!(%tab, frame = origin.frame.0, kind = report.kind(), "Agent report");
        match report {
            AgentReport::PipEntered => self.update(|m| m.entered(tab)),
            AgentReport::PipExited => self.update(|m| m.exited(tab)),
            AgentReport::VideoPlaying => self.update(|m| {
                m.video_playing(tab, origin.tab_active);
                None
            }),
            AgentReport::VideoPaused => self.update(|m| {
                m.video_paused(tab, origin.tab_active);
                None
            }),
        }
    }

    // =========================================================================
    // State changes
    // =========================================================================

    /// Run `f` against the machine under the lock, then persist and
    /// publish whatever changed.
    fn update<F>(&self, f: F)
    where
        F: FnOnce(&mut OwnershipMachine) -> Option<Transition>,
    {
        self.update_state(|state| f(&mut state.machine));
    }

    fn update_state<F>(&self, f: F)
    where
        F: FnOnce(&mut State) -> Option<Transition>,
    {
        let (transition, hint) = {
            let mut state = self.state();
            let before = state.machine.hint();
            let transition = f(&mut state);
            if let Some(ref transition) = transition {
                state.record(transition);
            }
            let after = state.machine.hint();
            (transition, (before != after).then_some(after))
        };

        if let Some(hint) = hint {
            tracing::debug!(?hint, "Last active tab hint changed");
            self.inner.events.publish(Event::HintChanged(hint));
        }
        if let Some(transition) = transition {
            self.commit(transition);
        }
    }

    fn commit(&self, transition: Transition) {
        let previous = transition.from.owner();
        let current = transition.to.owner();
        tracing::info!(?previous, ?current, "PiP owner changed");

        if self.inner.config.persist_owner {
            let result = match current {
                Some(tab) => self.inner.store.save(tab),
                None => self.inner.store.clear(),
            };
            if let Err(e) = result {
                tracing::warn!(error = %e, "Failed to persist PiP owner");
            }
        }

        self.inner
            .events
            .publish(Event::OwnerChanged { previous, current });
    }

    /// Ownership revision, to hand to [`Self::claim`] after an await.
    fn revision(&self) -> u64 {
        self.state().revision
    }

    /// Make `tab` the owner on the strength of a response that was awaited
    /// since `since`. Reports that arrived meanwhile take precedence.
    /// Returns `false` if they did.
    fn claim(&self, tab: TabId, since: u64) -> bool {
        let mut claimed = false;
        self.update_state(|state| {
            if state.superseded(tab, since) {
                return None;
            }
            claimed = true;
            state.machine.entered(tab)
        });
        if !claimed {
            tracing::debug!(%tab, "Ownership changed while waiting, keeping reported state");
        }
        claimed
    }

    // =========================================================================
    // Restart recovery
    // =========================================================================

    /// Load the persisted owner and keep it only if the tab confirms it
    /// still has PiP. Returns the recovered owner.
    pub async fn restore(&self) -> Option<TabId> {
        if !self.inner.config.persist_owner {
            return None;
        }

        let persisted = match self.inner.store.load() {
            Ok(owner) => owner?,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load persisted PiP owner");
                return None;
            }
        };

        let since = self.revision();
        match self.query_pip_state(persisted).await {
            Ok(true) if self.claim(persisted, since) => {
                tracing::info!(tab = %persisted, "Recovered PiP owner");
                Some(persisted)
            }
            Ok(true) => None,
            result => {
                tracing::info!(tab = %persisted, ?result, "Persisted PiP owner is stale");
                // A report may have named a real owner while we waited.
                if self.owner().is_none() {
                    if let Err(e) = self.inner.store.clear() {
                        tracing::warn!(error = %e, "Failed to clear persisted PiP owner");
                    }
                }
                None
            }
        }
    }

    // =========================================================================
    // Badge
    // =========================================================================

    fn show_badge(&self, kind: BadgeKind) {
        let text = match kind {
            BadgeKind::GestureNeeded => &self.inner.badge.gesture_text,
            BadgeKind::NoVideo => &self.inner.badge.no_video_text,
        };
        let ttl = Duration::from_millis(u64::from(self.inner.badge.ttl_ms));
        let badge = Badge::new(kind, text.clone(), self.inner.badge.color.clone(), ttl);

        let epoch = {
            let mut state = self.state();
            state.badge_epoch += 1;
            state.badge_epoch
        };
        self.inner.host.set_badge(Some(&badge));
        self.inner.events.publish(Event::BadgeShown(kind));

        if ttl.is_zero() {
            return;
        }
        let this = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(ttl).await;
            if this.state().badge_epoch == epoch {
                this.inner.host.set_badge(None);
                this.inner.events.publish(Event::BadgeCleared);
            }
        });
    }

    fn clear_badge(&self) {
        self.state().badge_epoch += 1;
        self.inner.host.set_badge(None);
    }

    pub fn shutdown(&self) {
        self.inner.events.publish(Event::Shutdown);
    }
}

//! In-process browser host.
//!
//! Owns the simulated windows and tabs, runs one agent per scriptable tab
//! behind a JSON message port, and turns user actions into
//! [`HostEvent`]s for the coordinator.

mod port;

#[cfg(test)]
mod tests;

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use async_trait::async_trait;
use pip_agent::sim::SimDocument;
use pip_agent::{ElementId, MediaElement};
use pip_common::{
    new_correlation_id, Badge, ChannelError, FrameId, MediaError, TabId, TabInfo, WindowId,
};
use pip_config::PipConfig;
use pip_coordinator::{HostEvent, HostRuntime, ReportOrigin};
use pip_protocol::{AgentRequest, AgentResponse, Envelope, Message};
use tokio::sync::mpsc;

use crate::scenario::{Scenario, TabScenario};

use self::port::AgentPort;

#[derive(Debug, thiserror::Error)]
pub enum HostError {
    #[error("no such tab: {0}")]
    UnknownTab(TabId),

    #[error("no tabs in {0}")]
    UnknownWindow(WindowId),

    #[error("{0} has no video")]
    NoVideo(TabId),

    #[error(transparent)]
    Media(#[from] MediaError),
}

struct TabSlot {
    info: TabInfo,
    document: SimDocument,
    /// `None` for pages agents cannot be injected into.
    port: Option<AgentPort>,
}

#[derive(Default)]
struct Browser {
    tabs: BTreeMap<TabId, TabSlot>,
    focused_window: Option<WindowId>,
    badge: Option<Badge>,
}

impl Browser {
    fn active_tab_in(&self, window: WindowId) -> Option<TabId> {
        self.tabs
            .values()
            .find(|slot| slot.info.window == window && slot.info.active)
            .map(|slot| slot.info.id)
    }
}

/// Snapshot of one tab for display.
#[derive(Debug, Clone)]
pub struct TabSummary {
    pub info: TabInfo,
    pub videos: usize,
    pub pip: Option<ElementId>,
    pub playing: bool,
}

pub struct LocalHost {
    scenario: Scenario,
    config: PipConfig,
    browser: Arc<Mutex<Browser>>,
    events: mpsc::UnboundedSender<HostEvent>,
}

impl LocalHost {
    /// Open every tab in `scenario`. Must be called inside a Tokio runtime.
    pub fn new(scenario: Scenario, config: PipConfig) -> (Arc<Self>, mpsc::UnboundedReceiver<HostEvent>) {
        let (events, rx) = mpsc::unbounded_channel();
        let host = Arc::new(Self {
            browser: Arc::new(Mutex::new(Browser {
                focused_window: scenario.focused_window(),
                ..Browser::default()
            })),
            scenario,
            config,
            events,
        });

        for tab in &host.scenario.tabs {
            let slot = host.open(tab);
            host.browser().tabs.insert(slot.info.id, slot);
        }
        tracing::info!(tabs = host.scenario.tabs.len(), "Browser ready");
        (host, rx)
    }

    fn browser(&self) -> MutexGuard<'_, Browser> {
        self.browser.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn open(&self, tab: &TabScenario) -> TabSlot {
        let info = TabInfo {
            id: tab.tab_id(),
            window: tab.window_id(),
            active: tab.active,
            url: tab.url.clone(),
        };
        let document = tab.build_document(self.scenario.viewport());
        let port = info
            .is_scriptable()
            .then(|| self.connect(info.id, document.clone()));
        TabSlot {
            info,
            document,
            port,
        }
    }

    fn connect(&self, tab: TabId, document: SimDocument) -> AgentPort {
        let browser = Arc::downgrade(&self.browser);
        let events = self.events.clone();
        AgentPort::connect(tab, document, &self.config, move |raw| {
            forward_report(&browser, &events, tab, &raw)
        })
    }

    fn emit(&self, event: HostEvent) {
        if self.events.send(event).is_err() {
            tracing::debug!("Host event dropped, nobody is listening");
        }
    }

    fn document(&self, tab: TabId) -> Result<SimDocument, HostError> {
        self.browser()
            .tabs
            .get(&tab)
            .map(|slot| slot.document.clone())
            .ok_or(HostError::UnknownTab(tab))
    }

    // =========================================================================
    // Browser chrome
    // =========================================================================

    /// Toolbar button. Without a tab, the click lands in the focused window.
    pub fn click(&self, tab: Option<TabId>) {
        let tab = tab.or_else(|| self.focused());
        self.emit(HostEvent::ActionClicked { tab });
    }

    pub fn shortcut(&self) {
        self.emit(HostEvent::Command(self.config.commands.toggle.clone()));
    }

    pub fn close_tab(&self, tab: TabId) -> Result<(), HostError> {
        let (slot, successor) = {
            let mut browser = self.browser();
            let slot = browser.tabs.remove(&tab).ok_or(HostError::UnknownTab(tab))?;
            // The next tab in the window takes over as foreground.
            let successor = if slot.info.active {
                browser
                    .tabs
                    .values_mut()
                    .find(|s| s.info.window == slot.info.window)
                    .map(|next| {
                        next.info.active = true;
                        (next.info.id, next.info.window)
                    })
            } else {
                None
            };
            (slot, successor)
        };
        drop(slot);
        self.emit(HostEvent::TabClosed(tab));
        if let Some((tab, window)) = successor {
            self.emit(HostEvent::TabActivated { tab, window });
        }
        Ok(())
    }

    /// Reload the page: fresh document, fresh agent.
    pub fn navigate(&self, tab: TabId) -> Result<(), HostError> {
        let scenario = self.scenario.tab(tab).ok_or(HostError::UnknownTab(tab))?;
        if !self.browser().tabs.contains_key(&tab) {
            return Err(HostError::UnknownTab(tab));
        }
        // Announced before the old page unloads.
        self.emit(HostEvent::TabNavigated(tab));

        let mut fresh = self.open(scenario);
        let old = {
            let mut browser = self.browser();
            let slot = browser.tabs.get_mut(&tab).ok_or(HostError::UnknownTab(tab))?;
            fresh.info = slot.info.clone();
            std::mem::replace(slot, fresh)
        };
        drop(old);
        Ok(())
    }

    /// Bring `tab` to the front of its window and focus that window.
    pub fn activate_tab(&self, tab: TabId) -> Result<(), HostError> {
        let window = {
            let mut browser = self.browser();
            let window = browser
                .tabs
                .get(&tab)
                .map(|slot| slot.info.window)
                .ok_or(HostError::UnknownTab(tab))?;
            for slot in browser.tabs.values_mut() {
                if slot.info.window == window {
                    slot.info.active = slot.info.id == tab;
                }
            }
            browser.focused_window = Some(window);
            window
        };
        self.emit(HostEvent::TabActivated { tab, window });
        Ok(())
    }

    pub fn focus_window(&self, window: Option<WindowId>) -> Result<(), HostError> {
        {
            let mut browser = self.browser();
            if let Some(window) = window {
                if browser.active_tab_in(window).is_none() {
                    return Err(HostError::UnknownWindow(window));
                }
            }
            browser.focused_window = window;
        }
        self.emit(HostEvent::WindowFocusChanged(window));
        Ok(())
    }

    // =========================================================================
    // Page interaction
    // =========================================================================

    /// Close the PiP window with its own close button.
    pub fn native_exit(&self, tab: TabId) -> Result<bool, HostError> {
        Ok(self.document(tab)?.close_pip_window())
    }

    /// Click play on the page's largest video. Counts as a user gesture.
    pub async fn play(&self, tab: TabId) -> Result<(), HostError> {
        let document = self.document(tab)?;
        document.grant_user_activation();
        let video = document
            .videos()
            .into_iter()
            .max_by(|a, b| a.bounding_rect().area().total_cmp(&b.bounding_rect().area()))
            .ok_or(HostError::NoVideo(tab))?;
        video.play().await?;
        Ok(())
    }

    /// Pause everything playing on the page. Returns how many stopped.
    pub fn pause(&self, tab: TabId) -> Result<usize, HostError> {
        let document = self.document(tab)?;
        document.grant_user_activation();
        let mut stopped = 0;
        for video in document.videos() {
            if !video.paused() {
                video.pause();
                stopped += 1;
            }
        }
        Ok(stopped)
    }

    /// A click somewhere in the page.
    pub fn gesture(&self, tab: TabId) -> Result<(), HostError> {
        self.document(tab)?.grant_user_activation();
        Ok(())
    }

    // =========================================================================
    // Inspection
    // =========================================================================

    pub fn focused(&self) -> Option<TabId> {
        let browser = self.browser();
        browser
            .focused_window
            .and_then(|window| browser.active_tab_in(window))
    }

    pub fn focused_window(&self) -> Option<WindowId> {
        self.browser().focused_window
    }

    pub fn badge(&self) -> Option<Badge> {
        self.browser().badge.clone()
    }

    pub fn summaries(&self) -> Vec<TabSummary> {
        self.browser()
            .tabs
            .values()
            .map(|slot| {
                let videos = slot.document.videos();
                TabSummary {
                    info: slot.info.clone(),
                    videos: videos.len(),
                    pip: slot.document.pip_element_id(),
                    playing: videos.iter().any(|v| v.is_playing()),
                }
            })
            .collect()
    }
}

/// Decode a report posted by an agent and hand it to the coordinator.
fn forward_report(
    browser: &Weak<Mutex<Browser>>,
    events: &mpsc::UnboundedSender<HostEvent>,
    tab: TabId,
    raw: &str,
) {
    let Some(envelope) = Envelope::from_json(raw) else {
        tracing::warn!(%tab, "Malformed report envelope");
        return;
    };
    let report = match envelope.decode() {
        Ok(Message::Report(report)) => report,
        Ok(other) => {
            tracing::debug!(%tab, ?other, "Ignoring unsolicited non-report message");
            return;
        }
        Err(e) => {
            tracing::warn!(%tab, error = %e, "Rejected report envelope");
            return;
        }
    };

    let Some(browser) = browser.upgrade() else {
        return;
    };
    let tab_active = browser
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .tabs
        .get(&tab)
        .is_some_and(|slot| slot.info.active);

    let origin = ReportOrigin {
        tab,
        frame: FrameId::TOP,
        tab_active,
    };
    // Closed only during shutdown.
    let _ = events.send(HostEvent::Report { origin, report });
}

#[async_trait]
impl HostRuntime for LocalHost {
    async fn send(&self, tab: TabId, request: AgentRequest) -> Result<AgentResponse, ChannelError> {
        let id = new_correlation_id();
        let raw = Envelope::request(id.clone(), request).to_json();

        let reply = {
            let browser = self.browser();
            let port = browser
                .tabs
                .get(&tab)
                .and_then(|slot| slot.port.as_ref())
                .ok_or(ChannelError::Unreachable(tab))?;
            port.post(raw).ok_or(ChannelError::Closed(tab))?
        };
        tracing::trace!(%tab, %id, kind = request.kind(), "Request posted");

        let raw = reply.await.map_err(|_| ChannelError::Closed(tab))?;
        let unexpected = |kind: &str| ChannelError::UnexpectedResponse {
            tab,
            kind: kind.to_string(),
        };

        let envelope = Envelope::from_json(&raw).ok_or_else(|| unexpected("malformed"))?;
        match envelope.decode() {
            Ok(Message::Response {
                id: answered,
                response,
            }) if answered == id => Ok(response),
            Ok(Message::Response { id: answered, .. }) => {
                Err(unexpected(&format!("response to {answered}")))
            }
            Ok(_) => Err(unexpected("non-response")),
            Err(e) => {
                tracing::debug!(%tab, error = %e, "Undecodable response");
                Err(unexpected("undecodable"))
            }
        }
    }

    async fn tabs(&self) -> Vec<TabInfo> {
        self.browser()
            .tabs
            .values()
            .filter(|slot| slot.port.is_some())
            .map(|slot| slot.info.clone())
            .collect()
    }

    async fn focused_tab(&self) -> Option<TabId> {
        self.focused()
    }

    async fn active_tab_in(&self, window: WindowId) -> Option<TabId> {
        self.browser().active_tab_in(window)
    }

    fn set_badge(&self, badge: Option<&Badge>) {
        match badge {
            Some(badge) => tracing::info!(text = %badge.text, color = %badge.color, "Badge shown"),
            None => tracing::debug!("Badge cleared"),
        }
        self.browser().badge = badge.cloned();
    }
}

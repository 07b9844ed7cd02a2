//! Host runtime seam: everything the coordinator needs from the browser.

use async_trait::async_trait;
use pip_common::{Badge, ChannelError, FrameId, TabId, TabInfo, WindowId};
use pip_protocol::{AgentReport, AgentRequest, AgentResponse};

#[async_trait]
pub trait HostRuntime: Send + Sync {
    /// Deliver a request to the agent in `tab` and wait for its answer.
    ///
    /// The returned future may never resolve. Callers that need a bound
    /// apply one themselves.
    async fn send(&self, tab: TabId, request: AgentRequest) -> Result<AgentResponse, ChannelError>;

    /// Open tabs that can host an agent.
    async fn tabs(&self) -> Vec<TabInfo>;

    /// Active tab of the focused window.
    async fn focused_tab(&self) -> Option<TabId>;

    async fn active_tab_in(&self, window: WindowId) -> Option<TabId>;

    /// Show a badge, or clear it with `None`.
    fn set_badge(&self, badge: Option<&Badge>);
}

/// Where an unsolicited agent report came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportOrigin {
    pub tab: TabId,
    pub frame: FrameId,
    /// The sending tab was the foreground tab of its window.
    pub tab_active: bool,
}

/// Inbound host notifications.
#[derive(Debug, Clone, PartialEq)]
pub enum HostEvent {
    /// Toolbar button. `tab` is the tab it was clicked in, if known.
    ActionClicked { tab: Option<TabId> },
    /// Keyboard command by name.
    Command(String),
    TabClosed(TabId),
    /// Top-level navigation started.
    TabNavigated(TabId),
    TabActivated { tab: TabId, window: WindowId },
    /// `None` means focus left every browser window.
    WindowFocusChanged(Option<WindowId>),
    Report {
        origin: ReportOrigin,
        report: AgentReport,
    },
}

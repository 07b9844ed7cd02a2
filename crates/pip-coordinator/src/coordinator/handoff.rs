//! Auto-PiP when the user switches away from a playing tab.

use pip_common::{BadgeKind, TabId};
use pip_protocol::AgentRequest;

use super::{Coordinator, ToggleOutcome};

impl Coordinator {
    /// The foreground tab is now `tab`. If the last playing tab was some
    /// other tab, move its video into PiP, provided the page has seen a
    /// user gesture (otherwise the browser would refuse).
    pub(super) async fn on_foreground_changed(&self, tab: TabId) -> Option<ToggleOutcome> {
        if !self.inner.config.auto_pip_on_switch {
            return None;
        }
        let source = self.hint().filter(|&hinted| hinted != tab)?;

        match self.query(source, AgentRequest::QueryUserActivation).await {
            Ok(true) => {
                tracing::debug!(%source, foreground = %tab, "Handing off to PiP");
                let outcome = self.activate_in(source).await;
                if outcome == ToggleOutcome::Activated(source) {
                    self.update(|m| {
                        m.forget_hint(source);
                        None
                    });
                }
                Some(outcome)
            }
            result => {
                tracing::debug!(%source, ?result, "No user activation for auto-PiP");
                self.show_badge(BadgeKind::GestureNeeded);
                None
            }
        }
    }
}

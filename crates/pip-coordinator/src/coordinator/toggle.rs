//! Toggle, activation and deactivation.

use pip_common::{BadgeKind, ChannelError, Event, TabId};
use pip_protocol::{ActivationFailure, AgentRequest, AgentResponse};

use super::Coordinator;

/// What a toggle (or a tab-switch handoff) ended up doing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// An owner existed and was asked to close PiP.
    Deactivated(TabId),
    Activated(TabId),
    /// Activation was requested but did not succeed.
    Failed { tab: TabId, reason: String },
    /// No tab to activate in.
    NoTarget,
}

impl Coordinator {
    /// Close PiP if anyone owns it, otherwise open it in the best target.
    pub async fn toggle(&self, invoking: Option<TabId>) -> ToggleOutcome {
        if let Some(owner) = self.resolve_owner().await {
            self.deactivate(owner);
            // Only the owner we resolved: a newer report may have replaced it.
            self.update(|m| {
                m.clear_hint();
                m.exited(owner)
            });
            self.clear_badge();
            return ToggleOutcome::Deactivated(owner);
        }

        match self.resolve_target(invoking).await {
            Some(target) => self.activate_in(target).await,
            None => {
                tracing::warn!(?invoking, "No tab to activate PiP in");
                ToggleOutcome::NoTarget
            }
        }
    }

    /// Invoking tab if it is open and scriptable, else the hint if still
    /// open, else the focused tab.
    pub async fn resolve_target(&self, invoking: Option<TabId>) -> Option<TabId> {
        let tabs = self.inner.host.tabs().await;
        let is_open = |tab: TabId| tabs.iter().any(|t| t.id == tab);

        if let Some(tab) = invoking.filter(|&t| is_open(t)) {
            return Some(tab);
        }
        if let Some(tab) = self.hint().filter(|&t| is_open(t)) {
            return Some(tab);
        }
        self.inner.host.focused_tab().await.filter(|&t| is_open(t))
    }

    /// Ask `target` to enter PiP. Any other owner is asked to leave first,
    /// without waiting for it.
    pub(super) async fn activate_in(&self, target: TabId) -> ToggleOutcome {
        if let Some(other) = self.owner().filter(|&o| o != target) {
            tracing::debug!(%other, %target, "Closing previous PiP session");
            self.deactivate(other);
        }

        tracing::debug!(tab = %target, "Requesting PiP activation");
        let since = self.revision();
        let failure = match self.inner.host.send(target, AgentRequest::ActivatePip).await {
            Ok(AgentResponse::Ack { ok: true, .. }) => {
                self.claim(target, since);
                self.clear_badge();
                return ToggleOutcome::Activated(target);
            }
            Ok(AgentResponse::Ack { ok: false, error }) => error.unwrap_or(ActivationFailure::Rejected),
            Ok(other) => {
                let e = ChannelError::UnexpectedResponse {
                    tab: target,
                    kind: other.kind().to_string(),
                };
                tracing::warn!(error = %e, "Bad activation response");
                ActivationFailure::Rejected
            }
            Err(e) => {
                tracing::warn!(tab = %target, error = %e, "Activation request failed");
                ActivationFailure::Rejected
            }
        };

        tracing::info!(tab = %target, ?failure, "PiP activation failed");
        let reason = format!("{failure:?}");
        self.inner.events.publish(Event::ActivationFailed {
            tab: target,
            reason: reason.clone(),
        });
        self.show_badge(match failure {
            ActivationFailure::NoVideo => BadgeKind::NoVideo,
            ActivationFailure::NotAllowed | ActivationFailure::Rejected => BadgeKind::GestureNeeded,
        });
        ToggleOutcome::Failed { tab: target, reason }
    }

    /// Fire-and-forget deactivation. The outcome is only logged.
    pub(super) fn deactivate(&self, tab: TabId) {
        let host = self.inner.host.clone();
        tokio::spawn(async move {
            match host.send(tab, AgentRequest::DeactivatePip).await {
                Ok(AgentResponse::Ack { ok, .. }) => {
                    tracing::debug!(%tab, stopped = ok, "Deactivation acknowledged")
                }
                Ok(other) => tracing::debug!(%tab, kind = other.kind(), "Odd deactivation response"),
                Err(e) => tracing::debug!(%tab, error = %e, "Deactivation not delivered"),
            }
        });
    }
}

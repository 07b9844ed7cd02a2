//! State queries, owner verification and the concurrent owner scan.

use std::time::Duration;

use futures_util::stream::{FuturesUnordered, StreamExt};
use pip_common::{ChannelError, TabId};
use pip_protocol::{AgentRequest, AgentResponse};

use super::Coordinator;

impl Coordinator {
    fn query_timeout(&self) -> Duration {
        Duration::from_millis(u64::from(self.inner.config.query_timeout_ms))
    }

    /// Send a state query and wait a bounded time for `{ active }`.
    pub(super) async fn query(&self, tab: TabId, request: AgentRequest) -> Result<bool, ChannelError> {
        let response = tokio::time::timeout(self.query_timeout(), self.inner.host.send(tab, request))
            .await
            .map_err(|_| ChannelError::TimedOut(tab))??;

        match response {
            AgentResponse::State { active } => Ok(active),
            other => Err(ChannelError::UnexpectedResponse {
                tab,
                kind: other.kind().to_string(),
            }),
        }
    }

    pub(super) async fn query_pip_state(&self, tab: TabId) -> Result<bool, ChannelError> {
        self.query(tab, AgentRequest::QueryPipState).await
    }

    /// Ask every open tab whether it has PiP, concurrently. The first tab
    /// to answer `active: true` wins. Tabs that fail to answer count as
    /// "not owner".
    pub async fn scan_for_owner(&self) -> Option<TabId> {
        let tabs = self.inner.host.tabs().await;
        tracing::debug!(tabs = tabs.len(), "Scanning tabs for PiP owner");

        let mut pending: FuturesUnordered<_> = tabs
            .into_iter()
            .map(|info| async move { (info.id, self.query_pip_state(info.id).await) })
            .collect();

        while let Some((tab, result)) = pending.next().await {
            match result {
                Ok(true) => {
                    tracing::debug!(%tab, "Scan found PiP owner");
                    return Some(tab);
                }
                Ok(false) => {}
                Err(e) => tracing::debug!(%tab, error = %e, "Tab did not answer scan"),
            }
        }
        None
    }

    /// Find the real owner right now.
    ///
    /// A cached owner is trusted as-is unless `verify_owner` is set, in
    /// which case it must confirm; otherwise all tabs are scanned. With no
    /// cached owner the scan runs only when `scan_when_idle` is set.
    /// Stale cached ownership is dropped along the way, unless reports
    /// received during the queries already changed it.
    pub async fn resolve_owner(&self) -> Option<TabId> {
        let since = self.revision();
        let cached = self.owner();

        match cached {
            Some(tab) if !self.inner.config.verify_owner => return Some(tab),
            Some(tab) => match self.query_pip_state(tab).await {
                Ok(true) => return Some(tab),
                result => tracing::debug!(%tab, ?result, "Cached PiP owner did not confirm"),
            },
            None if !self.inner.config.scan_when_idle => return None,
            None => {}
        }

        let found = self.scan_for_owner().await;
        match (cached, found) {
            (_, Some(tab)) => {
                if cached != Some(tab) && self.claim(tab, since) {
                    tracing::info!(%tab, "Recovered PiP owner by scan");
                }
            }
            (Some(stale), None) => {
                tracing::info!(tab = %stale, "Dropping stale PiP owner");
                self.update(|m| m.exited(stale));
            }
            (None, None) => {}
        }
        found
    }
}

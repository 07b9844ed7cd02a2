//! Message port between the host and one page's agent.
//!
//! Everything crossing the port is a JSON envelope string, the same shape
//! a browser extension would post between its background and content
//! scripts.

use std::sync::Arc;

use pip_agent::sim::SimDocument;
use pip_agent::TabAgent;
use pip_common::TabId;
use pip_config::PipConfig;
use pip_protocol::Envelope;
use tokio::sync::{mpsc, oneshot};
use tokio::task::{JoinHandle, JoinSet};

struct PortRequest {
    raw: String,
    reply: oneshot::Sender<String>,
}

/// Host end of a connected agent. Dropping it tears the agent down.
pub(super) struct AgentPort {
    requests: mpsc::UnboundedSender<PortRequest>,
    tasks: Vec<JoinHandle<()>>,
}

impl AgentPort {
    /// Start an agent on `document`. Its reports are handed to `on_report`
    /// as raw envelopes.
    pub(super) fn connect<F>(tab: TabId, document: SimDocument, config: &PipConfig, on_report: F) -> Self
    where
        F: Fn(String) + Send + 'static,
    {
        let agent = Arc::new(TabAgent::new(Arc::new(document), config));
        let (requests, mut inbox) = mpsc::unbounded_channel::<PortRequest>();

        // Requests are answered concurrently; a slow activation does not
        // hold up queries behind it.
        let serve = tokio::spawn({
            let agent = Arc::clone(&agent);
            async move {
                let mut in_flight = JoinSet::new();
                loop {
                    tokio::select! {
                        request = inbox.recv() => match request {
                            Some(request) => {
                                in_flight.spawn(answer(Arc::clone(&agent), tab, request));
                            }
                            None => break,
                        },
                        Some(_) = in_flight.join_next(), if !in_flight.is_empty() => {}
                    }
                }
                while in_flight.join_next().await.is_some() {}
            }
        });

        let (reports_tx, mut reports_rx) = mpsc::unbounded_channel();
        let reporter = agent.spawn_reporter(reports_tx);
        let forward = tokio::spawn(async move {
            while let Some(report) = reports_rx.recv().await {
                on_report(Envelope::report(report).to_json());
            }
        });

        tracing::debug!(%tab, "Agent connected");
        Self {
            requests,
            tasks: vec![serve, reporter, forward],
        }
    }

    /// Post a raw envelope. `None` if the agent is gone.
    pub(super) fn post(&self, raw: String) -> Option<oneshot::Receiver<String>> {
        let (reply, rx) = oneshot::channel();
        self.requests.send(PortRequest { raw, reply }).ok()?;
        Some(rx)
    }
}

impl Drop for AgentPort {
    fn drop(&mut self) {
        for task in &self.tasks {
            task.abort();
        }
    }
}

async fn answer(agent: Arc<TabAgent>, tab: TabId, request: PortRequest) {
    let Some(envelope) = Envelope::from_json(&request.raw) else {
        tracing::warn!(%tab, "Agent received malformed envelope");
        return;
    };
    if let Some(response) = agent.handle_envelope(envelope).await {
        // The requester may have stopped waiting.
        let _ = request.reply.send(response.to_json());
    }
}

//! The per-page agent: answers coordinator requests and reports changes.

use std::sync::Arc;

use pip_config::schema::{ActivationConfig, SelectionConfig};
use pip_config::PipConfig;
use pip_protocol::{ActivationFailure, AgentReport, AgentRequest, AgentResponse, Envelope, Message};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::activation;
use crate::dom::{Document, MediaEvent};
use crate::selection;

pub struct TabAgent {
    document: Arc<dyn Document>,
    selection: SelectionConfig,
    activation: ActivationConfig,
}

impl TabAgent {
    pub fn new(document: Arc<dyn Document>, config: &PipConfig) -> Self {
        Self {
            document,
            selection: config.selection.clone(),
            activation: config.activation.clone(),
        }
    }

    pub fn document(&self) -> &Arc<dyn Document> {
        &self.document
    }

    /// Answer one request. Never fails; problems become `ok: false`.
    pub async fn handle(&self, request: AgentRequest) -> AgentResponse {
        match request {
            AgentRequest::ActivatePip => match self.select_and_activate().await {
                Ok(()) => AgentResponse::ok(),
                Err(failure) => AgentResponse::failed(failure),
            },
            AgentRequest::DeactivatePip => AgentResponse::Ack {
                ok: self.deactivate().await,
                error: None,
            },
            AgentRequest::QueryPipState => AgentResponse::State {
                active: self.pip_active(),
            },
            AgentRequest::QueryUserActivation => AgentResponse::State {
                active: self.document.has_user_activation(),
            },
        }
    }

    /// Decode an incoming envelope and, for requests, build the response
    /// envelope. Anything else is logged and dropped.
    pub async fn handle_envelope(&self, envelope: Envelope) -> Option<Envelope> {
        match envelope.decode() {
            Ok(Message::Request { id, request }) => {
                let response = self.handle(request).await;
                tracing::trace!(%id, kind = request.kind(), ?response, "Agent answered");
                Some(Envelope::response(id, &response))
            }
            Ok(other) => {
                tracing::debug!(?other, "Agent ignored non-request envelope");
                None
            }
            Err(e) => {
                tracing::warn!(error = %e, "Agent rejected envelope");
                None
            }
        }
    }

    pub async fn select_and_activate(&self) -> Result<(), ActivationFailure> {
        let candidates = selection::select_candidates(self.document.as_ref(), &self.selection);
        activation::activate(self.document.as_ref(), &candidates, &self.activation)
            .await
            .map(|_| ())
    }

    /// Close PiP and pause its element, or pause everything that plays.
    /// Returns whether anything was stopped.
    pub async fn deactivate(&self) -> bool {
        if let Some(element) = self.document.pip_element() {
            if let Err(e) = self.document.exit_pip().await {
                tracing::debug!(error = %e, "exit_pip failed during deactivation");
            }
            element.pause();
            return true;
        }

        let mut stopped = false;
        for element in self.document.media_elements(self.selection.include_frames) {
            if !element.paused() && !element.ended() {
                element.pause();
                stopped = true;
            }
        }
        stopped
    }

    pub fn pip_active(&self) -> bool {
        self.document.pip_element().is_some()
    }

    /// Forward document media events as [`AgentReport`]s until `reports`
    /// is closed.
    pub fn spawn_reporter(&self, reports: mpsc::UnboundedSender<AgentReport>) -> JoinHandle<()> {
        let (tx, mut rx) = mpsc::unbounded_channel();
        self.document.subscribe(tx);
        let document = Arc::clone(&self.document);
        let include_frames = self.selection.include_frames;

        tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                let report = match event {
                    MediaEvent::EnteredPip(_) => AgentReport::PipEntered,
                    MediaEvent::LeftPip(_) => {
                        // A replacement request emits LeftPip then EnteredPip.
                        if document.pip_element().is_some() {
                            continue;
                        }
                        AgentReport::PipExited
                    }
                    MediaEvent::Playing(_) => AgentReport::VideoPlaying,
                    MediaEvent::Paused(_) => {
                        let still_playing = document
                            .media_elements(include_frames)
                            .iter()
                            .any(|el| !el.paused() && !el.ended());
                        if still_playing {
                            continue;
                        }
                        AgentReport::VideoPaused
                    }
                };
                if reports.send(report).is_err() {
                    break;
                }
            }
            tracing::debug!("Agent reporter stopped");
        })
    }
}

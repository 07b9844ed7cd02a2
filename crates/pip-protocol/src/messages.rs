//! Logical request/response pairs and agent-initiated reports.

use pip_common::MediaError;
use serde::{Deserialize, Serialize};

/// Coordinator → agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AgentRequest {
    /// Pick the best video and put it into PiP. Answered with `Ack`.
    ActivatePip,
    /// Close PiP (or pause playback). Answered with `Ack`.
    DeactivatePip,
    /// Is a PiP window open in this document? Answered with `State`.
    QueryPipState,
    /// Has the page seen a user gesture? Answered with `State`.
    QueryUserActivation,
}

impl AgentRequest {
    pub fn kind(&self) -> &'static str {
        match self {
            AgentRequest::ActivatePip => "activate-pip",
            AgentRequest::DeactivatePip => "deactivate-pip",
            AgentRequest::QueryPipState => "query-pip-state",
            AgentRequest::QueryUserActivation => "query-user-activation",
        }
    }

    pub fn from_kind(kind: &str) -> Option<Self> {
        match kind {
            "activate-pip" => Some(AgentRequest::ActivatePip),
            "deactivate-pip" => Some(AgentRequest::DeactivatePip),
            "query-pip-state" => Some(AgentRequest::QueryPipState),
            "query-user-activation" => Some(AgentRequest::QueryUserActivation),
            _ => None,
        }
    }

    /// Queries are side-effect free and answered straight from DOM state.
    pub fn is_query(&self) -> bool {
        matches!(
            self,
            AgentRequest::QueryPipState | AgentRequest::QueryUserActivation
        )
    }
}

/// Why `activate-pip` did not end in PiP.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActivationFailure {
    /// No media element the page allows in PiP.
    NoVideo,
    /// The browser wants a user gesture first.
    NotAllowed,
    /// Every candidate was refused for some other reason.
    Rejected,
}

impl From<&MediaError> for ActivationFailure {
    fn from(err: &MediaError) -> Self {
        if err.is_gesture_required() {
            ActivationFailure::NotAllowed
        } else {
            ActivationFailure::Rejected
        }
    }
}

/// Agent → coordinator, in reply to a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AgentResponse {
    Ack {
        ok: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error: Option<ActivationFailure>,
    },
    State {
        active: bool,
    },
}

impl AgentResponse {
    pub fn ok() -> Self {
        AgentResponse::Ack {
            ok: true,
            error: None,
        }
    }

    pub fn failed(error: ActivationFailure) -> Self {
        AgentResponse::Ack {
            ok: false,
            error: Some(error),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            AgentResponse::Ack { .. } => "ack",
            AgentResponse::State { .. } => "state",
        }
    }
}

/// Agent → coordinator, unsolicited. No response is expected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AgentReport {
    PipEntered,
    PipExited,
    VideoPlaying,
    VideoPaused,
}

impl AgentReport {
    pub fn kind(&self) -> &'static str {
        match self {
            AgentReport::PipEntered => "pip-entered",
            AgentReport::PipExited => "pip-exited",
            AgentReport::VideoPlaying => "video-playing",
            AgentReport::VideoPaused => "video-paused",
        }
    }

    pub fn from_kind(kind: &str) -> Option<Self> {
        match kind {
            "pip-entered" => Some(AgentReport::PipEntered),
            "pip-exited" => Some(AgentReport::PipExited),
            "video-playing" => Some(AgentReport::VideoPlaying),
            "video-paused" => Some(AgentReport::VideoPaused),
            _ => None,
        }
    }
}

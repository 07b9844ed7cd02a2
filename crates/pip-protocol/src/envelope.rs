//! JSON envelope carried over the host's messaging channel.
//!
//! Every message on the wire is `{ "kind": ..., "id": ..., "payload": ... }`.
//! Requests carry a correlation `id`; the response to a request reuses it
//! with kind `"response"`. Reports never carry an id.

use serde::{Deserialize, Serialize};

use crate::messages::{AgentReport, AgentRequest, AgentResponse};

/// Kind used for every response envelope.
pub const RESPONSE_KIND: &str = "response";

/// Envelope kinds accepted from either side of the channel.
pub const ALLOWED_KINDS: &[&str] = &[
    "activate-pip",
    "deactivate-pip",
    "query-pip-state",
    "query-user-activation",
    RESPONSE_KIND,
    "pip-entered",
    "pip-exited",
    "video-playing",
    "video-paused",
];

/// Check if an envelope kind is in the allowlist.
pub fn is_kind_allowed(kind: &str) -> bool {
    ALLOWED_KINDS.contains(&kind)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub payload: serde_json::Value,
}

/// Decoded envelope contents.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    Request { id: String, request: AgentRequest },
    Response { id: String, response: AgentResponse },
    Report(AgentReport),
}

#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("malformed envelope: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("envelope kind not allowed: {0}")]
    KindNotAllowed(String),

    #[error("{0} envelope is missing its correlation id")]
    MissingId(String),
}

impl Envelope {
    /// Parse an envelope from raw JSON. Returns `None` on malformed input.
    pub fn from_json(raw: &str) -> Option<Self> {
        serde_json::from_str(raw).ok()
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }

    pub fn request(id: impl Into<String>, request: AgentRequest) -> Self {
        Self {
            kind: request.kind().to_string(),
            id: Some(id.into()),
            payload: serde_json::Value::Null,
        }
    }

    pub fn response(id: impl Into<String>, response: &AgentResponse) -> Self {
        Self {
            kind: RESPONSE_KIND.to_string(),
            id: Some(id.into()),
            payload: serde_json::to_value(response).unwrap_or(serde_json::Value::Null),
        }
    }

    pub fn report(report: AgentReport) -> Self {
        Self {
            kind: report.kind().to_string(),
            id: None,
            payload: serde_json::Value::Null,
        }
    }

    /// Turn the envelope into a typed message, enforcing the allowlist.
    pub fn decode(self) -> Result<Message, DecodeError> {
        if !is_kind_allowed(&self.kind) {
            tracing::warn!(kind = %self.kind, "Rejected envelope with unknown kind");
            return Err(DecodeError::KindNotAllowed(self.kind));
        }

        if self.kind == RESPONSE_KIND {
            let id = self.id.ok_or_else(|| DecodeError::MissingId(self.kind.clone()))?;
            let response = serde_json::from_value(self.payload)?;
            return Ok(Message::Response { id, response });
        }

        if let Some(request) = AgentRequest::from_kind(&self.kind) {
            let id = self.id.ok_or(DecodeError::MissingId(self.kind))?;
            return Ok(Message::Request { id, request });
        }

        match AgentReport::from_kind(&self.kind) {
            Some(report) => Ok(Message::Report(report)),
            None => Err(DecodeError::KindNotAllowed(self.kind)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages::ActivationFailure;

    #[test]
    fn every_request_and_report_kind_is_allowed() {
        for req in [
            AgentRequest::ActivatePip,
            AgentRequest::DeactivatePip,
            AgentRequest::QueryPipState,
            AgentRequest::QueryUserActivation,
        ] {
            assert!(is_kind_allowed(req.kind()), "{}", req.kind());
        }
        for report in [
            AgentReport::PipEntered,
            AgentReport::PipExited,
            AgentReport::VideoPlaying,
            AgentReport::VideoPaused,
        ] {
            assert!(is_kind_allowed(report.kind()), "{}", report.kind());
        }
        assert!(is_kind_allowed(RESPONSE_KIND));
    }

    #[test]
    fn unknown_kind_is_rejected() {
        assert!(!is_kind_allowed("eval-script"));
        let env = Envelope::from_json(r#"{"kind":"eval-script","payload":"alert(1)"}"#).unwrap();
        assert!(matches!(env.decode(), Err(DecodeError::KindNotAllowed(k)) if k == "eval-script"));
    }

    #[test]
    fn request_envelope_decodes() {
        let raw = Envelope::request("abc123", AgentRequest::QueryPipState).to_json();
        let env = Envelope::from_json(&raw).unwrap();
        assert_eq!(env.kind, "query-pip-state");
        assert_eq!(
            env.decode().unwrap(),
            Message::Request {
                id: "abc123".into(),
                request: AgentRequest::QueryPipState
            }
        );
    }

    #[test]
    fn response_envelope_carries_payload() {
        let resp = AgentResponse::failed(ActivationFailure::NotAllowed);
        let raw = Envelope::response("id-1", &resp).to_json();
        assert!(raw.contains("\"NotAllowed\""));

        let msg = Envelope::from_json(&raw).unwrap().decode().unwrap();
        assert_eq!(
            msg,
            Message::Response {
                id: "id-1".into(),
                response: resp
            }
        );
    }

    #[test]
    fn report_envelope_has_no_id() {
        let env = Envelope::report(AgentReport::PipEntered);
        assert!(!env.to_json().contains("\"id\""));
        assert_eq!(env.decode().unwrap(), Message::Report(AgentReport::PipEntered));
    }

    #[test]
    fn request_without_id_is_rejected() {
        let env = Envelope::from_json(r#"{"kind":"activate-pip"}"#).unwrap();
        assert!(matches!(env.decode(), Err(DecodeError::MissingId(_))));
    }

    #[test]
    fn response_with_bad_payload_is_malformed() {
        let env = Envelope::from_json(r#"{"kind":"response","id":"x","payload":{"foo":1}}"#).unwrap();
        assert!(matches!(env.decode(), Err(DecodeError::Malformed(_))));
    }

    #[test]
    fn from_json_rejects_garbage() {
        assert!(Envelope::from_json("not json").is_none());
        assert!(Envelope::from_json(r#"{"payload":1}"#).is_none());
    }
}

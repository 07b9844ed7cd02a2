//! Message contract between the coordinator and tab agents.
//!
//! Provides:
//! - Typed requests, responses, and unsolicited reports
//! - A JSON envelope (`kind`, correlation `id`, `payload`) for crossing
//!   the host's messaging boundary
//! - An allowlist of accepted envelope kinds

pub mod envelope;
pub mod messages;

pub use envelope::{is_kind_allowed, DecodeError, Envelope, Message};
pub use messages::{ActivationFailure, AgentReport, AgentRequest, AgentResponse};

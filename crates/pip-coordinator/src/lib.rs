//! PiP ownership coordinator for pipkeeper.
//!
//! Keeps a single, globally consistent notion of which tab owns
//! Picture-in-Picture across toggles, tab switches, navigations and
//! closures, talking to tab agents over an unreliable channel.
//!
//! Provides:
//! - [`OwnershipMachine`]: pure `Idle`/`Owned(tab)` state machine
//! - [`HostRuntime`]: the browser-side seam (messaging, tab queries, badge)
//! - [`SessionStore`]: persisted owner for restart recovery
//! - [`Coordinator`]: event handling, verification, scan and handoff

pub mod coordinator;
pub mod host;
pub mod machine;
pub mod store;

pub use coordinator::{Coordinator, ToggleOutcome};
pub use host::{HostEvent, HostRuntime, ReportOrigin};
pub use machine::{OwnershipMachine, PipState, Transition};
pub use store::{JsonFileStore, MemoryStore, SessionStore};

//! Tab Agent for pipkeeper.
//!
//! One agent runs per loaded page. It provides:
//! - Video-candidate selection (visibility, playing state, size)
//! - PiP activation with a muted-autoplay recovery attempt
//! - Deactivation (close PiP / pause playback)
//! - Unsolicited PiP and playback reports for the coordinator
//!
//! The DOM is reached only through the [`Document`] and [`MediaElement`]
//! traits. [`sim`] provides an in-memory implementation.

pub mod activation;
pub mod agent;
pub mod dom;
pub mod selection;
pub mod sim;

pub use agent::TabAgent;
pub use dom::{Document, ElementId, MediaElement, MediaEvent, PlaybackSignal, ReadyState};
pub use selection::VideoCandidate;

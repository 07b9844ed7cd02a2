//! In-memory DOM for headless hosts and tests.
//!
//! Models the browser behaviour the agent has to cope with: autoplay
//! blocked without a gesture unless muted, PiP refused for paused or opted
//! out videos, stalled playback, and one PiP window per document.

mod document;
mod video;

pub use document::{SimDocument, SimPolicy};
pub use video::{SimVideo, VideoSetup};

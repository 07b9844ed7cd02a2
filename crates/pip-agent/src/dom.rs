//! DOM boundary: the parts of a page the agent needs.

use std::sync::Arc;

use async_trait::async_trait;
use pip_common::{FrameId, MediaError, Rect};
use tokio::sync::{broadcast, mpsc};

/// Stable identity of a media element within one document.
pub type ElementId = u64;

/// `HTMLMediaElement.readyState`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum ReadyState {
    #[default]
    HaveNothing,
    HaveMetadata,
    HaveCurrentData,
    HaveFutureData,
    HaveEnoughData,
}

/// Per-element signals the activation path waits on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlaybackSignal {
    /// The `playing` event fired.
    Playing,
    /// `currentTime` moved to this value.
    TimeUpdate(f64),
    /// A video frame was presented.
    FrameRendered,
}

/// Document-level media events, for present and future elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaEvent {
    EnteredPip(ElementId),
    LeftPip(ElementId),
    Playing(ElementId),
    Paused(ElementId),
}

#[async_trait]
pub trait MediaElement: Send + Sync {
    fn id(&self) -> ElementId;
    fn frame(&self) -> FrameId;

    /// Bounding client rect in top-level viewport coordinates.
    fn bounding_rect(&self) -> Rect;
    /// `disablePictureInPicture`.
    fn pip_disabled(&self) -> bool;

    fn paused(&self) -> bool;
    fn ended(&self) -> bool;
    fn ready_state(&self) -> ReadyState;
    fn current_time(&self) -> f64;

    fn muted(&self) -> bool;
    fn set_muted(&self, muted: bool);
    /// `playsInline`.
    fn set_plays_inline(&self, inline: bool);

    async fn play(&self) -> Result<(), MediaError>;
    fn pause(&self);

    async fn request_pip(&self) -> Result<(), MediaError>;

    /// Subscribe before calling [`play`](Self::play) or early signals are missed.
    fn playback_signals(&self) -> broadcast::Receiver<PlaybackSignal>;

    /// Not paused, not ended, and has a current frame.
    fn is_playing(&self) -> bool {
        !self.paused() && !self.ended() && self.ready_state() >= ReadyState::HaveCurrentData
    }
}

#[async_trait]
pub trait Document: Send + Sync {
    /// Media elements in tree order. Nested frames are included only
    /// when `include_frames` is set.
    fn media_elements(&self, include_frames: bool) -> Vec<Arc<dyn MediaElement>>;

    fn viewport(&self) -> Rect;

    /// `document.pictureInPictureElement`.
    fn pip_element(&self) -> Option<Arc<dyn MediaElement>>;

    async fn exit_pip(&self) -> Result<(), MediaError>;

    /// `navigator.userActivation`: active now or at some point before.
    fn has_user_activation(&self) -> bool;

    /// Register for [`MediaEvent`]s. Dropped receivers are pruned.
    fn subscribe(&self, events: mpsc::UnboundedSender<MediaEvent>);
}

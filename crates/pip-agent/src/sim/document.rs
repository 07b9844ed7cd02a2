use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use pip_common::{MediaError, Rect};
use tokio::sync::mpsc;

use super::video::{SimVideo, VideoSetup};
use crate::dom::{Document, ElementId, MediaElement, MediaEvent};

/// Browser policies the simulated document enforces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimPolicy {
    /// Unmuted `play()` needs a prior user gesture.
    pub autoplay_requires_gesture: bool,
    /// `requestPictureInPicture()` needs a prior user gesture.
    pub pip_requires_gesture: bool,
}

impl Default for SimPolicy {
    fn default() -> Self {
        Self {
            autoplay_requires_gesture: true,
            pip_requires_gesture: false,
        }
    }
}

#[derive(Default)]
struct DocState {
    videos: Vec<Arc<SimVideo>>,
    pip: Option<ElementId>,
    user_activation: bool,
    subscribers: Vec<mpsc::UnboundedSender<MediaEvent>>,
    next_id: ElementId,
}

pub(super) struct DocumentShared {
    state: Mutex<DocState>,
    viewport: Rect,
    policy: SimPolicy,
}

impl DocumentShared {
    fn state(&self) -> MutexGuard<'_, DocState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(super) fn emit(&self, event: MediaEvent) {
        self.state()
            .subscribers
            .retain(|tx| tx.send(event).is_ok());
    }

    pub(super) fn user_activated(&self) -> bool {
        self.state().user_activation
    }

    pub(super) fn autoplay_requires_gesture(&self) -> bool {
        self.policy.autoplay_requires_gesture
    }

    pub(super) fn pip_requires_gesture(&self) -> bool {
        self.policy.pip_requires_gesture
    }

    /// A new PiP request replaces the current PiP element.
    pub(super) fn enter_pip(&self, id: ElementId) {
        let previous = self.state().pip.replace(id);
        if previous == Some(id) {
            return;
        }
        if let Some(prev) = previous {
            self.emit(MediaEvent::LeftPip(prev));
        }
        self.emit(MediaEvent::EnteredPip(id));
    }

    fn leave_pip(&self) -> Option<ElementId> {
        let left = self.state().pip.take();
        if let Some(id) = left {
            self.emit(MediaEvent::LeftPip(id));
        }
        left
    }
}

/// In-memory page: a viewport, some videos, a PiP slot and a gesture flag.
#[derive(Clone)]
pub struct SimDocument {
    shared: Arc<DocumentShared>,
}

impl SimDocument {
    pub fn new(viewport: Rect, policy: SimPolicy) -> Self {
        Self {
            shared: Arc::new(DocumentShared {
                state: Mutex::new(DocState::default()),
                viewport,
                policy,
            }),
        }
    }

    pub fn add_video(&self, setup: VideoSetup) -> Arc<SimVideo> {
        let mut st = self.shared.state();
        st.next_id += 1;
        let video = Arc::new(SimVideo::new(
            st.next_id,
            setup,
            Arc::downgrade(&self.shared),
        ));
        st.videos.push(Arc::clone(&video));
        video
    }

    pub fn video(&self, id: ElementId) -> Option<Arc<SimVideo>> {
        self.shared
            .state()
            .videos
            .iter()
            .find(|v| v.id() == id)
            .cloned()
    }

    pub fn videos(&self) -> Vec<Arc<SimVideo>> {
        self.shared.state().videos.clone()
    }

    /// Simulate a click or key press inside the page.
    pub fn grant_user_activation(&self) {
        self.shared.state().user_activation = true;
    }

    pub fn pip_element_id(&self) -> Option<ElementId> {
        self.shared.state().pip
    }

    /// The user closed the PiP window with its own controls.
    pub fn close_pip_window(&self) -> bool {
        self.shared.leave_pip().is_some()
    }
}

impl Default for SimDocument {
    fn default() -> Self {
        Self::new(Rect::new(0.0, 0.0, 1280.0, 720.0), SimPolicy::default())
    }
}

#[async_trait]
impl Document for SimDocument {
    fn media_elements(&self, include_frames: bool) -> Vec<Arc<dyn MediaElement>> {
        self.shared
            .state()
            .videos
            .iter()
            .filter(|v| include_frames || v.frame().is_top())
            .map(|v| Arc::clone(v) as Arc<dyn MediaElement>)
            .collect()
    }

    fn viewport(&self) -> Rect {
        self.shared.viewport
    }

    fn pip_element(&self) -> Option<Arc<dyn MediaElement>> {
        let id = self.pip_element_id()?;
        self.video(id).map(|v| v as Arc<dyn MediaElement>)
    }

    async fn exit_pip(&self) -> Result<(), MediaError> {
        match self.shared.leave_pip() {
            Some(_) => Ok(()),
            None => Err(MediaError::InvalidState(
                "no picture-in-picture element".into(),
            )),
        }
    }

    fn has_user_activation(&self) -> bool {
        self.shared.user_activated()
    }

    fn subscribe(&self, events: mpsc::UnboundedSender<MediaEvent>) {
        self.shared.state().subscribers.push(events);
    }
}

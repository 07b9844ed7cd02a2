use std::sync::{Mutex, MutexGuard, PoisonError, Weak};

use async_trait::async_trait;
use pip_common::{FrameId, MediaError, Rect};
use tokio::sync::broadcast;

use super::document::DocumentShared;
use crate::dom::{ElementId, MediaElement, MediaEvent, PlaybackSignal, ReadyState};

/// Seconds of media time one simulated `play()` advances the clock by.
const PLAY_TICK_SECS: f64 = 0.25;

/// Initial state and quirks of a simulated `<video>`.
#[derive(Debug, Clone)]
pub struct VideoSetup {
    pub rect: Rect,
    pub frame: FrameId,
    pub pip_disabled: bool,
    pub paused: bool,
    pub ended: bool,
    pub ready_state: ReadyState,
    pub muted: bool,
    /// `play()` resolves but playback never actually starts.
    pub stalls: bool,
    /// `requestPictureInPicture()` is refused unless actually playing.
    pub requires_playing_for_pip: bool,
}

impl VideoSetup {
    /// A paused video with metadata loaded.
    pub fn new(rect: Rect) -> Self {
        Self {
            rect,
            frame: FrameId::TOP,
            pip_disabled: false,
            paused: true,
            ended: false,
            ready_state: ReadyState::HaveMetadata,
            muted: false,
            stalls: false,
            requires_playing_for_pip: false,
        }
    }

    pub fn playing(mut self) -> Self {
        self.paused = false;
        self.ready_state = ReadyState::HaveEnoughData;
        self
    }

    pub fn muted(mut self) -> Self {
        self.muted = true;
        self
    }

    pub fn in_frame(mut self, frame: FrameId) -> Self {
        self.frame = frame;
        self
    }

    pub fn pip_disabled(mut self) -> Self {
        self.pip_disabled = true;
        self
    }

    pub fn stalls(mut self) -> Self {
        self.stalls = true;
        self
    }

    pub fn requires_playing_for_pip(mut self) -> Self {
        self.requires_playing_for_pip = true;
        self
    }
}

#[derive(Debug)]
struct VideoState {
    setup: VideoSetup,
    plays_inline: bool,
    current_time: f64,
}

pub struct SimVideo {
    id: ElementId,
    state: Mutex<VideoState>,
    signals: broadcast::Sender<PlaybackSignal>,
    document: Weak<DocumentShared>,
}

impl SimVideo {
    pub(super) fn new(id: ElementId, setup: VideoSetup, document: Weak<DocumentShared>) -> Self {
        let (signals, _) = broadcast::channel(16);
        Self {
            id,
            state: Mutex::new(VideoState {
                setup,
                plays_inline: false,
                current_time: 0.0,
            }),
            signals,
            document,
        }
    }

    fn state(&self) -> MutexGuard<'_, VideoState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn plays_inline(&self) -> bool {
        self.state().plays_inline
    }

    /// Playback ran to the end.
    pub fn finish(&self) {
        let was_playing = {
            let mut st = self.state();
            let was_playing = !st.setup.paused;
            st.setup.paused = true;
            st.setup.ended = true;
            was_playing
        };
        if was_playing {
            self.emit(MediaEvent::Paused(self.id));
        }
    }

    fn emit(&self, event: MediaEvent) {
        if let Some(doc) = self.document.upgrade() {
            doc.emit(event);
        }
    }
}

#[async_trait]
impl MediaElement for SimVideo {
    fn id(&self) -> ElementId {
        self.id
    }

    fn frame(&self) -> FrameId {
        self.state().setup.frame
    }

    fn bounding_rect(&self) -> Rect {
        self.state().setup.rect
    }

    fn pip_disabled(&self) -> bool {
        self.state().setup.pip_disabled
    }

    fn paused(&self) -> bool {
        self.state().setup.paused
    }

    fn ended(&self) -> bool {
        self.state().setup.ended
    }

    fn ready_state(&self) -> ReadyState {
        self.state().setup.ready_state
    }

    fn current_time(&self) -> f64 {
        self.state().current_time
    }

    fn muted(&self) -> bool {
        self.state().setup.muted
    }

    fn set_muted(&self, muted: bool) {
        self.state().setup.muted = muted;
    }

    fn set_plays_inline(&self, inline: bool) {
        self.state().plays_inline = inline;
    }

    async fn play(&self) -> Result<(), MediaError> {
        let doc = self
            .document
            .upgrade()
            .ok_or_else(|| MediaError::Aborted("document was unloaded".into()))?;
        let gesture_ok = !doc.autoplay_requires_gesture() || doc.user_activated();

        let started_at = {
            let mut st = self.state();
            if !st.setup.muted && !gesture_ok {
                return Err(MediaError::NotAllowed(
                    "play() failed because the user didn't interact with the document first".into(),
                ));
            }
            if !st.setup.paused {
                return Ok(());
            }
            st.setup.paused = false;
            st.setup.ended = false;
            if st.setup.stalls {
                return Ok(());
            }
            st.setup.ready_state = st.setup.ready_state.max(ReadyState::HaveEnoughData);
            st.current_time += PLAY_TICK_SECS;
            st.current_time
        };

        let _ = self.signals.send(PlaybackSignal::Playing);
        let _ = self.signals.send(PlaybackSignal::TimeUpdate(started_at));
        let _ = self.signals.send(PlaybackSignal::FrameRendered);
        doc.emit(MediaEvent::Playing(self.id));
        Ok(())
    }

    fn pause(&self) {
        let was_playing = {
            let mut st = self.state();
            let was_playing = !st.setup.paused;
            st.setup.paused = true;
            was_playing
        };
        if was_playing {
            self.emit(MediaEvent::Paused(self.id));
        }
    }

    async fn request_pip(&self) -> Result<(), MediaError> {
        let doc = self
            .document
            .upgrade()
            .ok_or_else(|| MediaError::Aborted("document was unloaded".into()))?;

        {
            let st = self.state();
            if st.setup.pip_disabled {
                return Err(MediaError::InvalidState(
                    "disablePictureInPicture attribute is present".into(),
                ));
            }
            if st.setup.ready_state < ReadyState::HaveMetadata {
                return Err(MediaError::InvalidState("metadata not loaded".into()));
            }
            let playing = !st.setup.paused && st.setup.ready_state >= ReadyState::HaveCurrentData;
            if st.setup.requires_playing_for_pip && !playing {
                return Err(MediaError::NotAllowed(
                    "must be handling a user gesture if video is paused".into(),
                ));
            }
        }
        if doc.pip_requires_gesture() && !doc.user_activated() {
            return Err(MediaError::NotAllowed(
                "must be handling a user gesture to request picture in picture".into(),
            ));
        }

        doc.enter_pip(self.id);
        Ok(())
    }

    fn playback_signals(&self) -> broadcast::Receiver<PlaybackSignal> {
        self.signals.subscribe()
    }
}

//! PiP activation over a ranked candidate list.
//!
//! Each candidate gets a direct PiP request. When that is refused the
//! recovery path marks the element inline-playable, mutes it, starts
//! playback, waits (bounded) for it to actually be playing and retries the
//! request once. First success wins.

use std::time::Duration;

use pip_common::MediaError;
use pip_config::schema::ActivationConfig;
use pip_protocol::ActivationFailure;
use tokio::sync::broadcast::{self, error::RecvError};

use crate::dom::{Document, ElementId, MediaElement, PlaybackSignal, ReadyState};
use crate::selection::VideoCandidate;

/// Put the best workable candidate into PiP. Returns the element now in PiP.
pub async fn activate(
    document: &dyn Document,
    candidates: &[VideoCandidate],
    config: &ActivationConfig,
) -> Result<ElementId, ActivationFailure> {
    let Some(best) = candidates.first() else {
        return Err(ActivationFailure::NoVideo);
    };

    if let Some(current) = document.pip_element() {
        if current.id() == best.element.id() {
            tracing::debug!(element = current.id(), "Best candidate already in PiP");
            return Ok(current.id());
        }
        if let Err(e) = document.exit_pip().await {
            tracing::debug!(error = %e, "Failed to exit existing PiP");
        }
    }

    let mut last_error: Option<MediaError> = None;
    for candidate in candidates {
        let element = candidate.element.as_ref();
        match try_candidate(element, config).await {
            Ok(()) => {
                tracing::info!(
                    element = element.id(),
                    visible = candidate.is_visible,
                    playing = candidate.is_playing,
                    "Entered PiP"
                );
                return Ok(element.id());
            }
            Err(e) => {
                tracing::debug!(element = element.id(), error = %e, "Candidate refused PiP");
                last_error = Some(e);
            }
        }
    }

    Err(last_error
        .as_ref()
        .map(ActivationFailure::from)
        .unwrap_or(ActivationFailure::NoVideo))
}

async fn try_candidate(element: &dyn MediaElement, config: &ActivationConfig) -> Result<(), MediaError> {
    match element.request_pip().await {
        Ok(()) => Ok(()),
        Err(e) if !config.muted_autoplay_recovery => Err(e),
        Err(e) => {
            tracing::debug!(element = element.id(), error = %e, "Direct PiP refused, trying muted playback");
            recover(element, Duration::from_millis(u64::from(config.play_wait_ms))).await
        }
    }
}

/// Muted-autoplay recovery. On failure the muted flag is restored and an
/// element that was paused before is paused again. Playback position is
/// left where it is.
async fn recover(element: &dyn MediaElement, play_wait: Duration) -> Result<(), MediaError> {
    let was_muted = element.muted();
    let was_paused = element.paused();

    element.set_plays_inline(true);
    element.set_muted(true);

    let mut signals = element.playback_signals();
    let start_time = element.current_time();

    let result = match element.play().await {
        Ok(()) => {
            if !wait_for_playing(element, &mut signals, start_time, play_wait).await {
                tracing::debug!(element = element.id(), "Playback did not start in time");
            }
            element.request_pip().await
        }
        Err(e) => Err(e),
    };

    if result.is_err() {
        element.set_muted(was_muted);
        if was_paused && !element.paused() {
            element.pause();
        }
    }
    result
}

/// Wait until the element is demonstrably playing. Timing out is not an
/// error; the caller retries PiP either way.
async fn wait_for_playing(
    element: &dyn MediaElement,
    signals: &mut broadcast::Receiver<PlaybackSignal>,
    start_time: f64,
    limit: Duration,
) -> bool {
    let wait = async {
        loop {
            match signals.recv().await {
                Ok(PlaybackSignal::Playing) => return true,
                Ok(PlaybackSignal::TimeUpdate(t)) if t > start_time => return true,
                Ok(PlaybackSignal::FrameRendered)
                    if element.ready_state() >= ReadyState::HaveCurrentData =>
                {
                    return true
                }
                Ok(_) | Err(RecvError::Lagged(_)) => continue,
                Err(RecvError::Closed) => return false,
            }
        }
    };

    tokio::time::timeout(limit, wait).await.unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::MediaEvent;
    use crate::selection::select_candidates;
    use crate::sim::{SimDocument, SimPolicy, VideoSetup};
    use pip_common::Rect;
    use pip_config::schema::SelectionConfig;

    fn visible() -> Rect {
        Rect::new(0.0, 0.0, 640.0, 360.0)
    }

    async fn run(doc: &SimDocument, config: &ActivationConfig) -> Result<ElementId, ActivationFailure> {
        let candidates = select_candidates(doc, &SelectionConfig::default());
        activate(doc, &candidates, config).await
    }

    #[tokio::test]
    async fn empty_list_is_no_video() {
        let doc = SimDocument::default();
        assert_eq!(
            run(&doc, &ActivationConfig::default()).await,
            Err(ActivationFailure::NoVideo)
        );
    }

    #[tokio::test]
    async fn direct_request_succeeds() {
        let doc = SimDocument::default();
        let video = doc.add_video(VideoSetup::new(visible()).playing());

        assert_eq!(run(&doc, &ActivationConfig::default()).await, Ok(video.id()));
        assert_eq!(doc.pip_element_id(), Some(video.id()));
        assert!(!video.muted());
    }

    #[tokio::test]
    async fn recovery_mutes_plays_and_retries() {
        let doc = SimDocument::default();
        let video = doc.add_video(VideoSetup::new(visible()).requires_playing_for_pip());

        assert_eq!(run(&doc, &ActivationConfig::default()).await, Ok(video.id()));
        assert!(video.muted());
        assert!(video.plays_inline());
        assert!(!video.paused());
    }

    #[tokio::test]
    async fn recovery_disabled_fails_fast() {
        let doc = SimDocument::default();
        doc.add_video(VideoSetup::new(visible()).requires_playing_for_pip());

        let config = ActivationConfig {
            muted_autoplay_recovery: false,
            ..ActivationConfig::default()
        };
        assert_eq!(run(&doc, &config).await, Err(ActivationFailure::NotAllowed));
    }

    #[tokio::test(start_paused = true)]
    async fn stalled_playback_times_out_and_restores() {
        let doc = SimDocument::default();
        let video = doc.add_video(VideoSetup::new(visible()).requires_playing_for_pip().stalls());

        let result = run(&doc, &ActivationConfig::default()).await;
        assert_eq!(result, Err(ActivationFailure::NotAllowed));
        assert!(!video.muted());
        assert!(video.paused());
        assert!(doc.pip_element_id().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn failed_candidate_falls_through_to_next() {
        let doc = SimDocument::default();
        let big = Rect::new(0.0, 0.0, 1200.0, 700.0);
        let stuck = doc.add_video(VideoSetup::new(big).requires_playing_for_pip().stalls());
        let fine = doc.add_video(VideoSetup::new(visible()));

        let config = ActivationConfig {
            play_wait_ms: 100,
            ..ActivationConfig::default()
        };
        assert_eq!(run(&doc, &config).await, Ok(fine.id()));
        assert!(stuck.paused());
        assert!(!stuck.muted());
    }

    #[tokio::test]
    async fn gesture_policy_yields_not_allowed() {
        let doc = SimDocument::new(
            Rect::new(0.0, 0.0, 1280.0, 720.0),
            SimPolicy {
                autoplay_requires_gesture: true,
                pip_requires_gesture: true,
            },
        );
        let video = doc.add_video(VideoSetup::new(visible()).muted());

        assert_eq!(
            run(&doc, &ActivationConfig::default()).await,
            Err(ActivationFailure::NotAllowed)
        );
        // Recovery started muted playback; the element was paused before.
        assert!(video.paused());
        assert!(video.muted());

        doc.grant_user_activation();
        assert_eq!(run(&doc, &ActivationConfig::default()).await, Ok(video.id()));
    }

    #[tokio::test]
    async fn already_in_pip_is_success_without_new_request() {
        let doc = SimDocument::default();
        let video = doc.add_video(VideoSetup::new(visible()).playing());
        video.request_pip().await.unwrap();

        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        doc.subscribe(tx);

        assert_eq!(run(&doc, &ActivationConfig::default()).await, Ok(video.id()));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn other_pip_element_is_exited_first() {
        let doc = SimDocument::default();
        let small = doc.add_video(VideoSetup::new(Rect::new(0.0, 0.0, 10.0, 10.0)));
        let best = doc.add_video(VideoSetup::new(visible()).playing());
        small.request_pip().await.unwrap();

        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        doc.subscribe(tx);

        assert_eq!(run(&doc, &ActivationConfig::default()).await, Ok(best.id()));
        assert_eq!(rx.recv().await, Some(MediaEvent::LeftPip(small.id())));
        assert_eq!(rx.recv().await, Some(MediaEvent::EnteredPip(best.id())));
    }
}

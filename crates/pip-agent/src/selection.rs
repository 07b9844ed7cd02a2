//! Video-candidate selection.
//!
//! Every media element that is not opted out of PiP becomes a
//! [`VideoCandidate`]. Candidates are ranked so that visibility dominates
//! playing state and playing state dominates rendered area:
//!
//! visible+playing > visible > playing > neither, area breaking ties.
//!
//! The area term is squashed into `[0, 1)` so with the validated weights
//! (`playing_weight >= 1`, `visible_weight >= playing_weight + 1`) no area
//! can lift a candidate out of its class.

use std::fmt;
use std::sync::Arc;

use pip_config::schema::SelectionConfig;

use crate::dom::{Document, MediaElement};

#[derive(Clone)]
pub struct VideoCandidate {
    pub element: Arc<dyn MediaElement>,
    pub area_px: f64,
    /// Positive area intersecting the viewport.
    pub is_visible: bool,
    /// Not opted out of PiP.
    pub is_playable: bool,
    pub is_playing: bool,
    pub score: f64,
}

impl fmt::Debug for VideoCandidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VideoCandidate")
            .field("element", &self.element.id())
            .field("area_px", &self.area_px)
            .field("is_visible", &self.is_visible)
            .field("is_playing", &self.is_playing)
            .field("score", &self.score)
            .finish()
    }
}

/// Ranking score for one candidate.
pub fn score(is_visible: bool, is_playing: bool, area_px: f64, config: &SelectionConfig) -> f64 {
    let area = area_px.max(0.0);
    let area_term = area / (area + config.area_scale_px);

    let mut score = area_term;
    if is_visible {
        score += config.visible_weight;
    }
    if is_playing {
        score += config.playing_weight;
    }
    score
}

/// Build scored candidates for every PiP-eligible element, in tree order.
pub fn collect_candidates(document: &dyn Document, config: &SelectionConfig) -> Vec<VideoCandidate> {
    let viewport = document.viewport();

    document
        .media_elements(config.include_frames)
        .into_iter()
        .filter(|el| !el.pip_disabled())
        .map(|element| {
            let rect = element.bounding_rect();
            let area_px = rect.area();
            let is_visible = area_px > 0.0 && rect.intersects(&viewport);
            let is_playing = element.is_playing();
            VideoCandidate {
                score: score(is_visible, is_playing, area_px, config),
                element,
                area_px,
                is_visible,
                is_playable: true,
                is_playing,
            }
        })
        .collect()
}

/// Restrict to visible candidates when there are any, then order by
/// descending score. Equal scores keep tree order.
pub fn rank(candidates: Vec<VideoCandidate>) -> Vec<VideoCandidate> {
    let any_visible = candidates.iter().any(|c| c.is_visible);
    let mut pool: Vec<VideoCandidate> = if any_visible {
        candidates.into_iter().filter(|c| c.is_visible).collect()
    } else {
        candidates
    };

    pool.sort_by(|a, b| b.score.total_cmp(&a.score));
    pool
}

/// Ordered list of elements to try for PiP. Empty means no eligible video.
pub fn select_candidates(document: &dyn Document, config: &SelectionConfig) -> Vec<VideoCandidate> {
    let ranked = rank(collect_candidates(document, config));
    tracing::debug!(
        candidates = ranked.len(),
        best = ?ranked.first(),
        "Ranked video candidates"
    );
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{SimDocument, SimPolicy, VideoSetup};
    use pip_common::{FrameId, Rect};

    fn config() -> SelectionConfig {
        SelectionConfig::default()
    }

    /// Square of the given area, placed inside or outside a 1280x720 viewport.
    fn square(area: f64, visible: bool) -> Rect {
        let side = area.sqrt();
        let x = if visible { 0.0 } else { 5000.0 };
        Rect::new(x, 0.0, side, side)
    }

    #[test]
    fn class_ordering_beats_area() {
        let cfg = config();
        let vis_play = score(true, true, 100.0, &cfg);
        let vis = score(true, false, 500.0, &cfg);
        let play = score(false, true, 50.0, &cfg);
        assert!(vis_play > vis);
        assert!(vis > play);
    }

    #[test]
    fn huge_area_never_crosses_a_class() {
        let cfg = config();
        let neither_huge = score(false, false, 1.0e12, &cfg);
        let playing_tiny = score(false, true, 1.0, &cfg);
        let visible_huge = score(true, false, 1.0e12, &cfg);
        let both_tiny = score(true, true, 1.0, &cfg);

        assert!(playing_tiny > neither_huge);
        assert!(both_tiny > visible_huge);
        assert!(visible_huge > score(false, true, 1.0e12, &cfg));
    }

    #[test]
    fn ordering_holds_at_minimum_valid_weights() {
        let cfg = SelectionConfig {
            visible_weight: 2.0,
            playing_weight: 1.0,
            ..config()
        };
        assert!(score(true, false, 0.0, &cfg) > score(false, true, 1.0e12, &cfg));
        assert!(score(false, true, 0.0, &cfg) > score(false, false, 1.0e12, &cfg));
    }

    #[test]
    fn area_breaks_ties_within_class() {
        let cfg = config();
        assert!(score(true, true, 400.0, &cfg) > score(true, true, 300.0, &cfg));
        assert!(score(false, false, 10.0, &cfg) > score(false, false, 0.0, &cfg));
    }

    #[test]
    fn ranking_of_mixed_page() {
        let doc = SimDocument::default();
        let vis_play = doc.add_video(VideoSetup::new(square(100.0, true)).playing());
        let vis = doc.add_video(VideoSetup::new(square(500.0, true)));
        let _play = doc.add_video(VideoSetup::new(square(50.0, false)).playing());

        let ranked = select_candidates(&doc, &config());
        let ids: Vec<_> = ranked.iter().map(|c| c.element.id()).collect();

        // Only visible candidates are in the pool.
        assert_eq!(ids, vec![vis_play.id(), vis.id()]);
        assert!(ranked[0].score > ranked[1].score);
    }

    #[test]
    fn no_visible_candidates_falls_back_to_all() {
        let doc = SimDocument::default();
        let small = doc.add_video(VideoSetup::new(square(50.0, false)));
        let playing = doc.add_video(VideoSetup::new(square(20.0, false)).playing());
        let big = doc.add_video(VideoSetup::new(square(900.0, false)));

        let ranked = select_candidates(&doc, &config());
        let ids: Vec<_> = ranked.iter().map(|c| c.element.id()).collect();
        assert_eq!(ids, vec![playing.id(), big.id(), small.id()]);
        assert!(ranked.iter().all(|c| !c.is_visible));
    }

    #[test]
    fn zero_area_is_not_visible() {
        let doc = SimDocument::default();
        doc.add_video(VideoSetup::new(Rect::new(10.0, 10.0, 0.0, 0.0)).playing());

        let candidates = collect_candidates(&doc, &config());
        assert_eq!(candidates.len(), 1);
        assert!(!candidates[0].is_visible);
        assert_eq!(candidates[0].area_px, 0.0);
    }

    #[test]
    fn opted_out_elements_are_skipped() {
        let doc = SimDocument::default();
        doc.add_video(VideoSetup::new(square(10_000.0, true)).playing().pip_disabled());
        let ok = doc.add_video(VideoSetup::new(square(100.0, true)));

        let ranked = select_candidates(&doc, &config());
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].element.id(), ok.id());
        assert!(ranked[0].is_playable);
    }

    #[test]
    fn frames_follow_config() {
        let doc = SimDocument::new(Rect::new(0.0, 0.0, 800.0, 600.0), SimPolicy::default());
        doc.add_video(VideoSetup::new(square(100.0, true)).in_frame(FrameId(3)));

        assert_eq!(select_candidates(&doc, &config()).len(), 1);

        let top_only = SelectionConfig {
            include_frames: false,
            ..config()
        };
        assert!(select_candidates(&doc, &top_only).is_empty());
    }

    #[test]
    fn ended_and_unready_videos_are_not_playing() {
        let doc = SimDocument::default();
        let mut ended = VideoSetup::new(square(100.0, true)).playing();
        ended.ended = true;
        doc.add_video(ended);

        let candidates = collect_candidates(&doc, &config());
        assert!(!candidates[0].is_playing);
    }

    #[test]
    fn empty_document_has_no_candidates() {
        let doc = SimDocument::default();
        assert!(select_candidates(&doc, &config()).is_empty());
    }
}

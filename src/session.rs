//! Interaction modes and everything the user has annotated so far.
//!
//! The source material kept three independent booleans (`freehandMode`,
//! `regionSelectMode`, `isPasting`) next to a pile of globals; here the mode
//! is one enumeration and the whole interaction state is one struct, so
//! invalid flag combinations cannot be represented and every transition is a
//! method that can be exercised without a window or a camera.

use std::rc::Rc;

use crate::gesture::{DetectionFrame, Keypoint};
use crate::types::FrameBuffer;

/// Current interaction mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    Idle,
    Freehand,
    RegionSelect,
}

/// One continuous freehand stroke; points in panel coordinates, append-only.
pub type SketchPath = Vec<Keypoint>;

/// Axis-aligned selection rectangle in background-panel coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Region {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Region {
    /// Bounding box of the two fingertips. Which finger is which does not
    /// matter; swapping the arguments yields the same rectangle.
    pub fn from_fingertips(a: Keypoint, b: Keypoint) -> Self {
        Region {
            x: a.x.min(b.x),
            y: a.y.min(b.y),
            w: (b.x - a.x).abs(),
            h: (b.y - a.y).abs(),
        }
    }
}

/// A pasted copy of a captured snippet. The pixel buffer is shared with the
/// session's current snippet and with every other placement of the same
/// capture, so all of them show identical pixels.
pub struct Placement {
    pub snippet: Rc<FrameBuffer>,
    pub x: f32,
    pub y: f32,
}

/// Top-left corner a paste lands at: the min corner of the two fingertips.
pub fn paste_corner(thumb: Keypoint, index: Keypoint) -> Keypoint {
    Keypoint { x: thumb.x.min(index.x), y: thumb.y.min(index.y) }
}

/// The aggregate interaction state. Initialized empty at startup, mutated by
/// key events and the per-tick sampling below, cleared by `reset`, never
/// persisted.
pub struct Session {
    pub mode: Mode,
    pub paths: Vec<SketchPath>,
    pub placements: Vec<Placement>,
    pub region: Option<Region>,
    pub snippet: Option<Rc<FrameBuffer>>,
    /// Most recent detector result; overwritten whenever the tracker
    /// finishes a frame, kept as-is otherwise.
    pub detection: Option<DetectionFrame>,
    /// Flipped once, when the detector has signalled readiness.
    pub model_ready: bool,
}

impl Session {
    pub fn new() -> Self {
        Session {
            mode: Mode::Idle,
            paths: Vec::new(),
            placements: Vec::new(),
            region: None,
            snippet: None,
            detection: None,
            model_ready: false,
        }
    }

    /// `f`: into freehand from anywhere (starting a fresh stroke), or back
    /// to idle when already sketching.
    pub fn toggle_freehand(&mut self) {
        if self.mode == Mode::Freehand {
            self.mode = Mode::Idle;
        } else {
            self.paths.push(SketchPath::new());
            self.mode = Mode::Freehand;
        }
    }

    /// `s`: into region selection from anywhere, or back to idle.
    pub fn toggle_region_select(&mut self) {
        if self.mode == Mode::RegionSelect {
            self.mode = Mode::Idle;
        } else {
            self.mode = Mode::RegionSelect;
        }
    }

    /// `c`: snip the background at the rectangle spanned by thumb and index.
    /// Requires region-select mode and both fingertips; otherwise a silent
    /// no-op. Repeated captures overwrite the previous snippet and region.
    pub fn capture(
        &mut self,
        background: &FrameBuffer,
        thumb: Option<Keypoint>,
        index: Option<Keypoint>,
    ) {
        if self.mode != Mode::RegionSelect {
            return;
        }
        let (Some(thumb), Some(index)) = (thumb, index) else {
            log::debug!("capture skipped: no hand detected");
            return;
        };

        let region = Region::from_fingertips(thumb, index);
        let snippet = background.crop(
            region.x.round() as i32,
            region.y.round() as i32,
            region.w.round() as usize,
            region.h.round() as usize,
        );
        log::debug!(
            "captured {}x{} snippet at ({:.0}, {:.0})",
            snippet.width, snippet.height, region.x, region.y
        );
        self.region = Some(region);
        self.snippet = Some(Rc::new(snippet));
    }

    /// `v`: stamp the current snippet at the fingertips' min corner. Requires
    /// region-select mode, a previously captured snippet, and both
    /// fingertips; otherwise a silent no-op. The snippet survives, so it can
    /// be pasted again.
    pub fn paste(&mut self, thumb: Option<Keypoint>, index: Option<Keypoint>) {
        if self.mode != Mode::RegionSelect {
            return;
        }
        let Some(snippet) = &self.snippet else {
            log::debug!("paste skipped: nothing captured yet");
            return;
        };
        let (Some(thumb), Some(index)) = (thumb, index) else {
            log::debug!("paste skipped: no hand detected");
            return;
        };

        let corner = paste_corner(thumb, index);
        self.placements.push(Placement {
            snippet: Rc::clone(snippet),
            x: corner.x,
            y: corner.y,
        });
    }

    /// `e`: wipe all annotations. The mode stays whatever it was, and
    /// wiping an already-empty session is harmless.
    pub fn reset(&mut self) {
        self.paths.clear();
        self.placements.clear();
        self.region = None;
        self.snippet = None;
    }

    /// Per-tick freehand sampling: while sketching with a detected hand,
    /// the index fingertip is appended to the active stroke. Runs before the
    /// render pass so that rendering stays a pure read.
    pub fn sample(&mut self, index_tip: Option<Keypoint>) {
        if self.mode != Mode::Freehand {
            return;
        }
        if let (Some(p), Some(path)) = (index_tip, self.paths.last_mut()) {
            path.push(p);
        }
    }

    /// Where the armed snippet would land if pasted right now. This is the
    /// paste preview: derived per frame from mode + snippet + fingertips
    /// rather than stored as a flag of its own.
    pub fn pending_paste(&self, thumb: Option<Keypoint>, index: Option<Keypoint>) -> Option<Keypoint> {
        if self.mode != Mode::RegionSelect || self.snippet.is_none() {
            return None;
        }
        Some(paste_corner(thumb?, index?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kp(x: f32, y: f32) -> Keypoint {
        Keypoint { x, y }
    }

    fn background() -> FrameBuffer {
        FrameBuffer::filled(320, 240, 0x00AABBCC)
    }

    #[test]
    fn region_from_thumb_and_index() {
        let r = Region::from_fingertips(kp(100.0, 100.0), kp(150.0, 180.0));
        assert_eq!(r, Region { x: 100.0, y: 100.0, w: 50.0, h: 80.0 });
    }

    #[test]
    fn region_is_order_independent() {
        let a = kp(150.0, 100.0);
        let b = kp(100.0, 180.0);
        assert_eq!(Region::from_fingertips(a, b), Region::from_fingertips(b, a));
    }

    #[test]
    fn freehand_toggle_starts_independent_strokes() {
        let mut s = Session::new();
        s.toggle_freehand();
        s.sample(Some(kp(1.0, 1.0)));
        s.sample(Some(kp(2.0, 2.0)));
        s.toggle_freehand();
        assert_eq!(s.mode, Mode::Idle);

        s.toggle_freehand();
        s.sample(Some(kp(9.0, 9.0)));
        assert_eq!(s.paths.len(), 2);
        assert_eq!(s.paths[0].len(), 2);
        assert_eq!(s.paths[1], vec![kp(9.0, 9.0)]);
    }

    #[test]
    fn sample_ignores_missing_hand_and_other_modes() {
        let mut s = Session::new();
        s.sample(Some(kp(1.0, 1.0))); // idle: nothing to append to
        assert!(s.paths.is_empty());

        s.toggle_freehand();
        s.sample(None); // hand lost: stroke simply pauses
        assert_eq!(s.paths[0].len(), 0);
    }

    #[test]
    fn entering_region_select_leaves_freehand() {
        let mut s = Session::new();
        s.toggle_freehand();
        s.toggle_region_select();
        assert_eq!(s.mode, Mode::RegionSelect);
        s.sample(Some(kp(1.0, 1.0)));
        assert_eq!(s.paths[0].len(), 0);

        s.toggle_region_select();
        assert_eq!(s.mode, Mode::Idle);
    }

    #[test]
    fn capture_requires_mode_and_hand() {
        let bg = background();
        let mut s = Session::new();

        // Not in region-select: ignored.
        s.capture(&bg, Some(kp(0.0, 0.0)), Some(kp(10.0, 10.0)));
        assert!(s.snippet.is_none());

        // In region-select but no hand: snippet stays as it was.
        s.toggle_region_select();
        s.capture(&bg, None, None);
        assert!(s.snippet.is_none());

        s.capture(&bg, Some(kp(100.0, 100.0)), Some(kp(150.0, 180.0)));
        let first = Rc::clone(s.snippet.as_ref().unwrap());
        assert_eq!((first.width, first.height), (50, 80));
        assert_eq!(s.region, Some(Region { x: 100.0, y: 100.0, w: 50.0, h: 80.0 }));

        // Hand lost afterwards: previous snippet is retained.
        s.capture(&bg, None, Some(kp(0.0, 0.0)));
        assert!(Rc::ptr_eq(s.snippet.as_ref().unwrap(), &first));

        // A second capture overwrites.
        s.capture(&bg, Some(kp(0.0, 0.0)), Some(kp(10.0, 20.0)));
        let second = s.snippet.as_ref().unwrap();
        assert_eq!((second.width, second.height), (10, 20));
    }

    #[test]
    fn paste_appends_one_placement_and_shares_the_snippet() {
        let bg = background();
        let mut s = Session::new();
        s.toggle_region_select();

        // Nothing captured yet: ignored.
        s.paste(Some(kp(40.0, 40.0)), Some(kp(60.0, 70.0)));
        assert!(s.placements.is_empty());

        s.capture(&bg, Some(kp(0.0, 0.0)), Some(kp(20.0, 20.0)));
        s.paste(Some(kp(40.0, 40.0)), Some(kp(60.0, 70.0)));
        assert_eq!(s.placements.len(), 1);
        assert_eq!((s.placements[0].x, s.placements[0].y), (40.0, 40.0));

        // Pasting again appends; the first placement is untouched and both
        // share one pixel buffer with the armed snippet.
        s.paste(Some(kp(5.0, 90.0)), Some(kp(1.0, 80.0)));
        assert_eq!(s.placements.len(), 2);
        assert_eq!((s.placements[0].x, s.placements[0].y), (40.0, 40.0));
        assert_eq!((s.placements[1].x, s.placements[1].y), (1.0, 80.0));
        assert!(Rc::ptr_eq(&s.placements[0].snippet, &s.placements[1].snippet));
        assert!(Rc::ptr_eq(&s.placements[0].snippet, s.snippet.as_ref().unwrap()));

        // No hand: list length unchanged.
        s.paste(None, None);
        assert_eq!(s.placements.len(), 2);
    }

    #[test]
    fn reset_clears_annotations_but_not_the_mode() {
        let bg = background();
        let mut s = Session::new();
        s.toggle_freehand();
        s.sample(Some(kp(1.0, 1.0)));
        s.toggle_region_select();
        s.capture(&bg, Some(kp(0.0, 0.0)), Some(kp(10.0, 10.0)));
        s.paste(Some(kp(0.0, 0.0)), Some(kp(10.0, 10.0)));

        s.reset();
        assert!(s.paths.is_empty());
        assert!(s.placements.is_empty());
        assert!(s.region.is_none());
        assert!(s.snippet.is_none());
        assert_eq!(s.mode, Mode::RegionSelect);

        // Idempotent on an already-empty session.
        s.reset();
        assert!(s.paths.is_empty() && s.placements.is_empty());
    }

    #[test]
    fn pending_paste_is_derived_state() {
        let bg = background();
        let mut s = Session::new();
        assert!(s.pending_paste(Some(kp(1.0, 1.0)), Some(kp(2.0, 2.0))).is_none());

        s.toggle_region_select();
        assert!(s.pending_paste(Some(kp(1.0, 1.0)), Some(kp(2.0, 2.0))).is_none());

        s.capture(&bg, Some(kp(0.0, 0.0)), Some(kp(10.0, 10.0)));
        assert_eq!(
            s.pending_paste(Some(kp(4.0, 9.0)), Some(kp(6.0, 3.0))),
            Some(kp(4.0, 3.0))
        );
        assert!(s.pending_paste(None, Some(kp(2.0, 2.0))).is_none());

        // Leaving region-select disarms the preview without touching the
        // snippet itself.
        s.toggle_region_select();
        assert!(s.pending_paste(Some(kp(1.0, 1.0)), Some(kp(2.0, 2.0))).is_none());
        assert!(s.snippet.is_some());
    }
}

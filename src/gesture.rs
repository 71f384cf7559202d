//! Fingertip sampling: turns raw detector output into panel-space keypoints.
//!
//! The detector reports landmarks in video-pixel space; everything drawn on
//! the canvas lives in panel space (one half of the window). The bridge is a
//! plain linear rescale, exact at the corners and happy to extrapolate when a
//! landmark wanders outside the video frame.

/// MediaPipe hand landmark indices (the detector emits all 21 per hand).
/// See: https://google.github.io/mediapipe/solutions/hands.html
#[allow(dead_code)]
pub mod landmarks {
    pub const WRIST: usize = 0;
    pub const THUMB_TIP: usize = 4;
    pub const INDEX_FINGER_TIP: usize = 8;
    pub const MIDDLE_FINGER_TIP: usize = 12;
    pub const RING_FINGER_TIP: usize = 16;
    pub const PINKY_TIP: usize = 20;
}

/// A single hand landmark in video-pixel coordinates. `z` is the model's
/// relative depth; carried through but unused by the gesture logic.
#[derive(Clone, Copy, Debug, Default)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

/// One detected hand: all 21 landmarks plus the model's confidence.
#[derive(Clone, Debug)]
pub struct HandDetection {
    pub landmarks: [Landmark; 21],
    pub confidence: f32,
    pub handedness: String,
}

/// Everything the detector reported for one analyzed video frame, together
/// with the video dimensions its landmarks are expressed in.
#[derive(Clone, Debug)]
pub struct DetectionFrame {
    pub hands: Vec<HandDetection>,
    pub video_width: f32,
    pub video_height: f32,
}

/// A 2D point in panel coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Keypoint {
    pub x: f32,
    pub y: f32,
}

impl Keypoint {
    pub fn distance(self, other: Keypoint) -> f32 {
        let (dx, dy) = (other.x - self.x, other.y - self.y);
        (dx * dx + dy * dy).sqrt()
    }
}

/// Standard linear map of `v` from `[in0, in1]` to `[out0, out1]`.
/// Exact at both endpoints, monotonic in between, extrapolates beyond.
pub fn map_range(v: f32, in0: f32, in1: f32, out0: f32, out1: f32) -> f32 {
    out0 + (v - in0) * (out1 - out0) / (in1 - in0)
}

/// Position of one landmark of the *first* detected hand, rescaled from
/// video space to a `panel_w` x `panel_h` panel.
///
/// `None` means "no signal this frame" (no detection yet, no hands, or the
/// landmark index is out of range); callers skip their gesture-dependent
/// logic rather than treating that as an error.
///
/// Known limitation, inherited from the source material: "first hand" is
/// whatever the detector listed first. If it reorders hands between frames,
/// gesture continuity is not guaranteed.
pub fn fingertip(
    frame: Option<&DetectionFrame>,
    landmark: usize,
    panel_w: f32,
    panel_h: f32,
) -> Option<Keypoint> {
    let frame = frame?;
    let hand = frame.hands.first()?;
    let lm = hand.landmarks.get(landmark)?;
    Some(Keypoint {
        x: map_range(lm.x, 0.0, frame.video_width, 0.0, panel_w),
        y: map_range(lm.y, 0.0, frame.video_height, 0.0, panel_h),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn frame_with_tip(x: f32, y: f32) -> DetectionFrame {
        let mut landmarks = [Landmark::default(); 21];
        landmarks[landmarks::INDEX_FINGER_TIP] = Landmark { x, y, z: 0.0 };
        DetectionFrame {
            hands: vec![HandDetection {
                landmarks,
                confidence: 0.9,
                handedness: "Right".into(),
            }],
            video_width: 640.0,
            video_height: 480.0,
        }
    }

    #[test]
    fn map_range_exact_at_endpoints() {
        assert_relative_eq!(map_range(0.0, 0.0, 640.0, 0.0, 320.0), 0.0);
        assert_relative_eq!(map_range(640.0, 0.0, 640.0, 0.0, 320.0), 320.0);
        assert_relative_eq!(map_range(0.0, 0.0, 480.0, 0.0, 437.0), 0.0);
        assert_relative_eq!(map_range(480.0, 0.0, 480.0, 0.0, 437.0), 437.0);
    }

    #[test]
    fn map_range_monotonic_and_in_range() {
        let mut prev = f32::MIN;
        for i in 0..=64 {
            let v = i as f32 * 10.0;
            let m = map_range(v, 0.0, 640.0, 0.0, 320.0);
            assert!(m >= prev);
            assert!((0.0..=320.0).contains(&m));
            prev = m;
        }
    }

    #[test]
    fn map_range_extrapolates_without_clamping() {
        assert_relative_eq!(map_range(-640.0, 0.0, 640.0, 0.0, 320.0), -320.0);
        assert_relative_eq!(map_range(1280.0, 0.0, 640.0, 0.0, 320.0), 640.0);
    }

    #[test]
    fn fingertip_rescales_into_panel_space() {
        let frame = frame_with_tip(320.0, 240.0);
        let kp = fingertip(Some(&frame), landmarks::INDEX_FINGER_TIP, 320.0, 240.0).unwrap();
        assert_relative_eq!(kp.x, 160.0);
        assert_relative_eq!(kp.y, 120.0);
    }

    #[test]
    fn fingertip_absent_without_detections() {
        assert!(fingertip(None, landmarks::INDEX_FINGER_TIP, 320.0, 240.0).is_none());

        let empty = DetectionFrame { hands: Vec::new(), video_width: 640.0, video_height: 480.0 };
        assert!(fingertip(Some(&empty), landmarks::INDEX_FINGER_TIP, 320.0, 240.0).is_none());

        let frame = frame_with_tip(10.0, 10.0);
        assert!(fingertip(Some(&frame), 21, 320.0, 240.0).is_none());
    }

    #[test]
    fn fingertip_consults_only_the_first_hand() {
        let mut frame = frame_with_tip(100.0, 100.0);
        let mut second = frame.hands[0].clone();
        second.landmarks[landmarks::INDEX_FINGER_TIP] = Landmark { x: 600.0, y: 400.0, z: 0.0 };
        frame.hands.push(second);

        let kp = fingertip(Some(&frame), landmarks::INDEX_FINGER_TIP, 640.0, 480.0).unwrap();
        assert_relative_eq!(kp.x, 100.0);
        assert_relative_eq!(kp.y, 100.0);
    }
}

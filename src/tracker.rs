//! Hand-landmark model boundary.
//!
//! The landmarker itself is MediaPipe's pretrained hand model, run out of
//! process behind a tiny protocol: we stream raw RGB frames to a Python
//! helper on stdin and read one JSON line of detections per frame from its
//! stdout. The subprocess prints `READY` once the model is loaded; until
//! then the UI shows its loading panel.
//!
//! # Model setup
//!
//! ```text
//! python3 -m venv .venv
//! .venv/bin/pip install mediapipe numpy
//! ```
//!
//! `hand_detect.py` lives next to the executable and loads
//! `models/hand_landmarker.task` (see the MediaPipe hand landmarker
//! distribution).
//!
//! # Threading
//!
//! Detection runs on one worker thread. The render loop offers frames over a
//! capacity-1 channel with `try_send`: while the worker is busy, new frames
//! are dropped, never queued. Results overwrite a single "latest" slot that
//! the loop drains once per tick; stale detections are replaced, not merged.

use crate::error::Error;
use crate::gesture::{DetectionFrame, HandDetection, Landmark};
use crossbeam_channel::{Receiver, Sender, TrySendError, bounded};
use serde::Deserialize;
use std::io::{self, BufRead, BufReader, Write};
use std::path::Path;
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;

const SCRIPT_PATH: &str = "hand_detect.py";
const VENV_PYTHON: &str = ".venv/bin/python";
const CHANNELS: u32 = 3;

/// Hands below this score are not worth gesturing with.
const MIN_CONFIDENCE: f32 = 0.5;

/// One camera frame handed to the detector thread: tightly packed RGB24.
pub struct TrackerFrame {
    pub width: u32,
    pub height: u32,
    pub rgb: Vec<u8>,
}

/* ---------- JSON side of the subprocess protocol ---------- */

#[derive(Deserialize, Debug)]
struct LandmarkJson {
    x: f32,
    y: f32,
    #[serde(default)]
    z: f32,
}

#[derive(Deserialize, Debug)]
struct HandJson {
    handedness: String,
    score: f32,
    landmarks: Vec<LandmarkJson>,
}

#[derive(Deserialize, Debug)]
struct DetectionJson {
    hands: Vec<HandJson>,
    #[serde(default)]
    error: Option<String>,
}

/// Parse one stdout line from the detector. The model reports normalized
/// coordinates; they are scaled to video pixels here, at the boundary, so
/// the rest of the program only ever sees pixel space. Returns `None` for
/// lines that cannot be used (malformed JSON, detector-side error); the
/// previous detection then simply stays current.
fn parse_detection(
    line: &str,
    video_width: f32,
    video_height: f32,
    min_score: f32,
) -> Option<DetectionFrame> {
    let parsed: DetectionJson = match serde_json::from_str(line) {
        Ok(p) => p,
        Err(e) => {
            log::warn!("unparseable detector line: {e}");
            return None;
        }
    };
    if let Some(error) = parsed.error {
        log::warn!("detector error: {error}");
        return None;
    }

    let mut hands = Vec::new();
    for hand in parsed.hands {
        if hand.score < min_score {
            continue;
        }
        if hand.landmarks.len() != 21 {
            log::warn!("expected 21 landmarks, got {}", hand.landmarks.len());
            continue;
        }

        let mut landmarks = [Landmark::default(); 21];
        for (i, lm) in hand.landmarks.iter().enumerate() {
            landmarks[i] = Landmark {
                x: lm.x * video_width,
                y: lm.y * video_height,
                z: lm.z,
            };
        }
        let detection = HandDetection {
            landmarks,
            confidence: hand.score,
            handedness: hand.handedness,
        };
        let tip = detection.landmarks[8];
        log::debug!(
            "hand detected: {} (score={:.2}), index_tip=({:.0},{:.0},z={:.2})",
            detection.handedness, detection.confidence, tip.x, tip.y, tip.z
        );
        hands.push(detection);
    }

    Some(DetectionFrame { hands, video_width, video_height })
}

/* ---------- The subprocess itself ---------- */

struct Detector {
    process: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
}

impl Detector {
    /// Launch the Python helper and wait for its `READY` handshake. This is
    /// the slow part (model load); it runs on the worker thread so the UI
    /// can keep painting the loading panel meanwhile.
    fn launch() -> io::Result<Self> {
        let mut process = Command::new(VENV_PYTHON)
            .arg(SCRIPT_PATH)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()?;

        let stdin = process
            .stdin
            .take()
            .ok_or_else(|| io::Error::other("detector stdin unavailable"))?;
        let stdout = process
            .stdout
            .take()
            .ok_or_else(|| io::Error::other("detector stdout unavailable"))?;
        let mut stdout = BufReader::new(stdout);

        let mut ready_line = String::new();
        stdout.read_line(&mut ready_line)?;
        if ready_line.trim() != "READY" {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("detector did not signal ready, got: {ready_line:?}"),
            ));
        }

        Ok(Self { process, stdin, stdout })
    }

    /// Ship one frame, block for the answer line, parse it.
    /// `Ok(None)` means the line was unusable; keep the previous detection.
    fn detect(&mut self, frame: &TrackerFrame) -> io::Result<Option<DetectionFrame>> {
        let expected = (frame.width * frame.height * CHANNELS) as usize;
        if frame.rgb.len() != expected {
            log::warn!("frame byte count {} does not match {}x{}", frame.rgb.len(), frame.width, frame.height);
            return Ok(None);
        }

        // Header (width, height, channels as u32 LE), then the raw pixels.
        self.stdin.write_all(&frame.width.to_le_bytes())?;
        self.stdin.write_all(&frame.height.to_le_bytes())?;
        self.stdin.write_all(&CHANNELS.to_le_bytes())?;
        self.stdin.write_all(&frame.rgb)?;
        self.stdin.flush()?;

        let mut line = String::new();
        if self.stdout.read_line(&mut line)? == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "detector closed its stdout",
            ));
        }

        Ok(parse_detection(
            &line,
            frame.width as f32,
            frame.height as f32,
            MIN_CONFIDENCE,
        ))
    }
}

impl Drop for Detector {
    fn drop(&mut self) {
        // Kill the Python subprocess when the detector is dropped
        let _ = self.process.kill();
    }
}

/* ---------- Public handle used by the render loop ---------- */

pub struct HandTracker {
    frames: Option<Sender<TrackerFrame>>,
    latest: Arc<Mutex<Option<DetectionFrame>>>,
    ready: Arc<AtomicBool>,
    worker: Option<thread::JoinHandle<()>>,
}

impl HandTracker {
    /// Verify the Python side is in place and start the worker thread. The
    /// model handshake itself happens on the worker; `is_ready` flips once
    /// it completes.
    pub fn spawn() -> Result<Self, Error> {
        if !Path::new(SCRIPT_PATH).exists() {
            return Err(Error::TrackerInit(format!(
                "{SCRIPT_PATH} not found in the working directory"
            )));
        }
        if !Path::new(VENV_PYTHON).exists() {
            return Err(Error::TrackerInit(
                "Python environment missing. Run: python3 -m venv .venv && \
                 .venv/bin/pip install mediapipe numpy"
                    .into(),
            ));
        }

        let (tx, rx) = bounded::<TrackerFrame>(1);
        let latest = Arc::new(Mutex::new(None));
        let ready = Arc::new(AtomicBool::new(false));

        let worker = {
            let latest = Arc::clone(&latest);
            let ready = Arc::clone(&ready);
            thread::Builder::new()
                .name("hand-tracker".into())
                .spawn(move || worker_loop(rx, latest, ready))
                .map_err(|e| Error::TrackerInit(format!("spawn worker: {e}")))?
        };

        Ok(Self { frames: Some(tx), latest, ready, worker: Some(worker) })
    }

    /// Non-blocking frame hand-off. While the worker is still chewing on the
    /// previous frame this drops the new one, which keeps the render loop at
    /// camera rate no matter how slow detection is.
    pub fn offer(&self, frame: TrackerFrame) {
        let Some(tx) = &self.frames else { return };
        match tx.try_send(frame) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => log::trace!("detector busy; frame dropped"),
            Err(TrySendError::Disconnected(_)) => log::debug!("detector worker is gone"),
        }
    }

    /// Drain the latest detection, if a new one arrived since the last poll.
    /// Called once per render tick; callers keep their previous frame when
    /// this returns `None`.
    pub fn poll(&self) -> Option<DetectionFrame> {
        self.latest
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take()
    }

    /// True once the model has loaded and signalled readiness.
    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }
}

impl Drop for HandTracker {
    fn drop(&mut self) {
        // Closing the channel lets the worker fall out of `recv`.
        self.frames.take();
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

fn worker_loop(
    frames: Receiver<TrackerFrame>,
    latest: Arc<Mutex<Option<DetectionFrame>>>,
    ready: Arc<AtomicBool>,
) {
    log::info!("starting MediaPipe hand detector subprocess...");
    let mut detector = match Detector::launch() {
        Ok(d) => d,
        Err(e) => {
            // The UI keeps showing the loading panel; degraded, not fatal.
            log::error!("hand detector failed to start: {e}");
            return;
        }
    };
    ready.store(true, Ordering::Release);
    log::info!("MediaPipe hand detector ready");

    while let Ok(frame) = frames.recv() {
        match detector.detect(&frame) {
            Ok(Some(result)) => {
                let mut slot = latest.lock().unwrap_or_else(|p| p.into_inner());
                *slot = Some(result);
            }
            Ok(None) => {} // unusable line; previous detection stays current
            Err(e) => {
                log::error!("hand detector stopped: {e}");
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn hand_json(score: f32, count: usize) -> String {
        let landmarks: Vec<String> = (0..count)
            .map(|i| format!(r#"{{"x":{:.3},"y":{:.3},"z":0.01}}"#, 0.01 * i as f32, 0.02 * i as f32))
            .collect();
        format!(
            r#"{{"hands":[{{"handedness":"Right","score":{score},"landmarks":[{}]}}]}}"#,
            landmarks.join(",")
        )
    }

    #[test]
    fn parses_and_scales_to_video_pixels() {
        let line = hand_json(0.9, 21);
        let frame = parse_detection(&line, 640.0, 480.0, 0.5).unwrap();
        assert_eq!(frame.hands.len(), 1);
        let tip = frame.hands[0].landmarks[8];
        assert_relative_eq!(tip.x, 0.08 * 640.0, epsilon = 1e-3);
        assert_relative_eq!(tip.y, 0.16 * 480.0, epsilon = 1e-3);
        assert_relative_eq!(frame.video_width, 640.0);
    }

    #[test]
    fn filters_low_confidence_hands() {
        let frame = parse_detection(&hand_json(0.3, 21), 640.0, 480.0, 0.5).unwrap();
        assert!(frame.hands.is_empty());
    }

    #[test]
    fn skips_hands_with_wrong_landmark_count() {
        let frame = parse_detection(&hand_json(0.9, 20), 640.0, 480.0, 0.5).unwrap();
        assert!(frame.hands.is_empty());
    }

    #[test]
    fn no_hands_is_a_valid_frame() {
        let frame = parse_detection(r#"{"hands":[]}"#, 640.0, 480.0, 0.5).unwrap();
        assert!(frame.hands.is_empty());
    }

    #[test]
    fn rejects_garbage_and_detector_errors() {
        assert!(parse_detection("not json at all", 640.0, 480.0, 0.5).is_none());
        assert!(parse_detection(r#"{"hands":[],"error":"camera fell over"}"#, 640.0, 480.0, 0.5).is_none());
    }
}

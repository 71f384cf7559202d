// What you SEE now:
// • Left panel: a still image you annotate. Right panel: your live camera,
//   or a loading panel while the hand model warms up.
// • f toggles freehand sketching: your index fingertip is the pen.
// • s toggles region selection: thumb and index fingertip span a rectangle.
// • c copies the selected rectangle off the still image, v pastes it where
//   your hand is, e wipes all annotations. ESC quits.

mod camera;
mod draw;
mod error;
mod gesture;
mod render;
mod session;
mod tracker;
mod types;

use camera::CameraCapture;
use draw::Drawer;
use error::Error;
use gesture::landmarks;
use session::{Mode, Session};
use std::time::{Duration, Instant};
use tracker::{HandTracker, TrackerFrame};
use types::FrameBuffer;

// Window layout: two side-by-side panels of this size.
const PANEL_W: usize = 640;
const PANEL_H: usize = 480;
const BACKGROUND_PATH: &str = "media/background.jpg";

fn main() -> Result<(), Error> {
    env_logger::init();

    /* --- Camera + detector + window setup ---
       Visual: window opens with the still image on the left and, until the
       model has loaded, the dark loading panel on the right. */
    let mut cam = CameraCapture::new(0, 640, 480)?;
    let (video_w, video_h) = cam.resolution();
    let tracker = HandTracker::spawn()?;
    let background = load_background(BACKGROUND_PATH, PANEL_W, PANEL_H);
    let mut drawer = Drawer::new("Gesture Canvas", PANEL_W * 2, PANEL_H)?;

    /* --- Reusable screen buffer ---
       Visual: this is the image you actually see each frame. */
    let mut screen = FrameBuffer::filled(PANEL_W * 2, PANEL_H, 0x00FFFFFF);

    /* --- Interaction state ---
       Mode, strokes, captured snippet, placements; one struct, mutated by
       the key handling below and read by the render pass. */
    let mut session = Session::new();

    /* --- HUD / FPS --- */
    let mut last_fps_time = Instant::now();
    let mut frames_this_second: u32 = 0;
    let mut hud_fps_text = String::from("FPS: 0.0");

    /* ------------------------------ Main loop ------------------------------ */
    while drawer.is_open() && !drawer.esc_pressed() {
        /* 1) Grab a fresh camera frame. One decode feeds both the right
              panel and the detector. The blocking grab paces the loop. */
        let frame = cam.next_frame()?;

        /* 2) Offer the frame to the detector (dropped when the worker is
              busy, never queued), then drain whatever detection finished
              since the last tick. No new result keeps the previous one. */
        tracker.offer(TrackerFrame { width: video_w, height: video_h, rgb: frame.rgb });
        session.model_ready = tracker.is_ready();
        if let Some(detection) = tracker.poll() {
            session.detection = Some(detection);
        }

        /* 3) Fingertips for this tick, in panel coordinates. None simply
              skips every gesture-dependent step below. */
        let thumb = gesture::fingertip(
            session.detection.as_ref(),
            landmarks::THUMB_TIP,
            PANEL_W as f32,
            PANEL_H as f32,
        );
        let index = gesture::fingertip(
            session.detection.as_ref(),
            landmarks::INDEX_FINGER_TIP,
            PANEL_W as f32,
            PANEL_H as f32,
        );

        /* 4) Key events mutate the session before anything is painted. */
        if drawer.f_pressed_once() { session.toggle_freehand(); }
        if drawer.s_pressed_once() { session.toggle_region_select(); }
        if drawer.c_pressed_once() { session.capture(&background, thumb, index); }
        if drawer.v_pressed_once() { session.paste(thumb, index); }
        if drawer.e_pressed_once() { session.reset(); }

        /* 5) Freehand sampling (appends to the active stroke), then the
              render pass, which only reads. */
        session.sample(index);
        let hud = format!(
            "{} | F SKETCH  S SELECT  C COPY  V PASTE  E RESET | {}",
            mode_tag(session.mode),
            hud_fps_text
        );
        render::render_frame(&mut screen, &session, &background, Some(&frame.display), &hud);

        /* 6) Present to the window (this is when the on-screen image updates). */
        drawer.present(&screen)?;

        /* 7) FPS counter (console at debug level + HUD once per second) */
        frames_this_second += 1;
        let now = Instant::now();
        if now.duration_since(last_fps_time) >= Duration::from_secs(1) {
            let secs = now.duration_since(last_fps_time).as_secs_f32();
            let fps = frames_this_second as f32 / secs;
            log::debug!("FPS: {fps:.1}");
            hud_fps_text = format!("FPS: {fps:.1}");
            frames_this_second = 0;
            last_fps_time = now;
        }
    }

    Ok(())
}

fn mode_tag(mode: Mode) -> &'static str {
    match mode {
        Mode::Idle => "IDLE",
        Mode::Freehand => "FREEHAND",
        Mode::RegionSelect => "SELECT",
    }
}

/// Load the still image and scale it once to panel size, so that panel
/// coordinates and snippet-crop coordinates coincide from then on. A missing
/// file logs a warning and yields a placeholder gradient; the demo should
/// come up even before anyone has dropped an image into media/.
fn load_background(path: &str, width: usize, height: usize) -> FrameBuffer {
    let img = match image::open(path) {
        Ok(img) => img.to_rgb8(),
        Err(e) => {
            log::warn!("no background image at {path} ({e}); using a placeholder");
            return placeholder_background(width, height);
        }
    };
    let scaled = image::imageops::resize(
        &img,
        width as u32,
        height as u32,
        image::imageops::FilterType::Triangle,
    );
    let pixels = scaled
        .pixels()
        .map(|p| (p[0] as u32) << 16 | (p[1] as u32) << 8 | p[2] as u32)
        .collect();
    FrameBuffer { width, height, pixels }
}

/// Diagonal two-tone gradient; enough visual structure that snipping and
/// pasting regions of it is obvious on screen.
fn placeholder_background(width: usize, height: usize) -> FrameBuffer {
    let mut fb = FrameBuffer::filled(width, height, 0);
    for y in 0..height {
        for x in 0..width {
            let r = (x * 255 / width.max(1)) as u32;
            let b = (y * 255 / height.max(1)) as u32;
            fb.pixels[y * width + x] = (r << 16) | (96 << 8) | b;
        }
    }
    fb
}

// The per-frame paint pass. Reads the session, never writes it; freehand
// sampling has already happened by the time this runs (Session::sample).
//
// Paint order is fixed: still background, live/loading panel, sketch
// strokes, paste preview, placements (oldest first, so later pastes land on
// top), selection overlay, fingertip markers, HUD.

use crate::draw::{
    blit, blit_ghost, blit_scaled, draw_dashed_line, draw_disc, draw_polyline, draw_rect_outline,
    draw_text_5x7, fill_rect,
};
use crate::gesture::{self, Keypoint, landmarks, map_range};
use crate::session::{Mode, Session};
use crate::types::FrameBuffer;

// Overlay palette, as the source material colors things.
const SKETCH_COLOR: u32 = 0x00FF00FF;       // magenta strokes
const THUMB_COLOR: u32 = 0x0000FF00;        // green thumb marker
const GUIDE_COLOR: u32 = 0x00808080;        // grey dashed line + box
const VIDEO_MARKER_COLOR: u32 = 0x00FF0000; // red fingertip on the feed
const IMAGE_MARKER_COLOR: u32 = 0x0000FF00; // green fingertip on the still
const LABEL_COLOR: u32 = 0x00000000;        // distance readout
const HUD_COLOR: u32 = 0x00FFFFFF;
const LOADING_BACKDROP: u32 = 0x00202020;
const MARKER_RADIUS: i32 = 5;

pub fn render_frame(
    screen: &mut FrameBuffer,
    session: &Session,
    background: &FrameBuffer,
    video: Option<&FrameBuffer>,
    hud: &str,
) {
    let panel_w = screen.width / 2;
    let panel_h = screen.height;
    let (pw, ph) = (panel_w as f32, panel_h as f32);

    let thumb = gesture::fingertip(session.detection.as_ref(), landmarks::THUMB_TIP, pw, ph);
    let index = gesture::fingertip(session.detection.as_ref(), landmarks::INDEX_FINGER_TIP, pw, ph);

    // 1) Wipe, then the still image fills the left panel.
    screen.pixels.fill(0x00FFFFFF);
    blit(screen, background, 0, 0);

    // 2) Right panel: the live feed, or the loading panel while the
    //    detector is still warming up.
    if session.model_ready {
        if let Some(video) = video {
            blit_scaled(screen, video, panel_w as i32, 0, panel_w, panel_h);
        }
    } else {
        draw_loading_panel(screen, panel_w, panel_h);
    }

    // 3) Every freehand stroke so far, including the one being drawn.
    for path in &session.paths {
        draw_polyline(screen, path, SKETCH_COLOR);
    }

    // 4) Ghost of the armed snippet at the spot a paste would land.
    if let Some(corner) = session.pending_paste(thumb, index) {
        if let Some(snippet) = &session.snippet {
            blit_ghost(screen, snippet, corner.x.round() as i32, corner.y.round() as i32);
        }
    }

    // 5) Committed pastes, in the order they were made.
    for placement in &session.placements {
        blit(screen, &placement.snippet, placement.x.round() as i32, placement.y.round() as i32);
    }

    // 6) Selection overlay while choosing a region with a visible hand.
    if session.mode == Mode::RegionSelect {
        draw_selection_overlay(screen, panel_w, thumb, index);
    }

    // 7) Fingertip markers for every detected hand, on both panels.
    if let Some(detection) = &session.detection {
        for hand in &detection.hands {
            let tip = hand.landmarks[landmarks::INDEX_FINGER_TIP];
            let x = map_range(tip.x, 0.0, detection.video_width, 0.0, pw).round() as i32;
            let y = map_range(tip.y, 0.0, detection.video_height, 0.0, ph).round() as i32;
            draw_disc(screen, x + panel_w as i32, y, MARKER_RADIUS, VIDEO_MARKER_COLOR);
            draw_disc(screen, x, y, MARKER_RADIUS, IMAGE_MARKER_COLOR);
        }
    }

    // 8) HUD last, over everything.
    draw_text_5x7(screen, 8, 8, hud, HUD_COLOR);
}

/// Thumb marker, dashed thumb-to-index guide with its pixel length, and the
/// would-be capture rectangle on the still panel.
fn draw_selection_overlay(
    screen: &mut FrameBuffer,
    panel_w: usize,
    thumb: Option<Keypoint>,
    index: Option<Keypoint>,
) {
    let offset = panel_w as f32;

    if let Some(thumb) = thumb {
        draw_disc(
            screen,
            (thumb.x + offset).round() as i32,
            thumb.y.round() as i32,
            MARKER_RADIUS,
            THUMB_COLOR,
        );
    }

    let (Some(thumb), Some(index)) = (thumb, index) else { return };

    // Guide line + length readout live on the video panel, where the hand is.
    let video_thumb = Keypoint { x: thumb.x + offset, y: thumb.y };
    let video_index = Keypoint { x: index.x + offset, y: index.y };
    draw_dashed_line(screen, video_thumb, video_index, GUIDE_COLOR);

    let label = format!("{:.2} PX", thumb.distance(index));
    draw_text_5x7(
        screen,
        (video_thumb.x + 15.0).round() as i32,
        video_thumb.y.round() as i32,
        &label,
        LABEL_COLOR,
    );

    // The rectangle the capture key would snip, shown on the still panel.
    let region = crate::session::Region::from_fingertips(thumb, index);
    draw_rect_outline(
        screen,
        region.x.round() as i32,
        region.y.round() as i32,
        region.w.round() as i32,
        region.h.round() as i32,
        GUIDE_COLOR,
    );
}

fn draw_loading_panel(screen: &mut FrameBuffer, panel_w: usize, panel_h: usize) {
    fill_rect(screen, panel_w as i32, 0, panel_w as i32, panel_h as i32, LOADING_BACKDROP);
    let text = "LOADING MODEL";
    let text_w = text.len() as i32 * 6;
    draw_text_5x7(
        screen,
        panel_w as i32 + (panel_w as i32 - text_w) / 2,
        panel_h as i32 / 2 - 3,
        text,
        HUD_COLOR,
    );
}

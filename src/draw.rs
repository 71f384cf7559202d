// Window + software drawing utilities.
// Everything on screen is drawn here:
// 1) A window that shows the two panels (still image | live camera).
// 2) Primitives for the annotation overlays: polylines, discs, rectangle
//    outlines, dashed guide lines, and snippet blits.
// 3) A tiny 5x7 bitmap font for the HUD and the distance readout.

use crate::error::Error;
use crate::gesture::Keypoint;
use crate::types::FrameBuffer;
use minifb::{Key, KeyRepeat, Window, WindowOptions};

pub struct Drawer {
    window: Window, // the on-screen window you see
}

impl Drawer {
    /// Create a window sized to both panels side by side.
    /// Visual: a new empty window appears with your chosen title.
    pub fn new(title: &str, width: usize, height: usize) -> Result<Self, Error> {
        let window = Window::new(title, width, height, WindowOptions::default())
            .map_err(|e| Error::WindowInit(e.to_string()))?;
        Ok(Self { window })
    }

    /// Push the pixels for this frame to the screen.
    /// Visual: the window immediately displays the new image.
    pub fn present(&mut self, framebuffer: &FrameBuffer) -> Result<(), Error> {
        self.window
            .update_with_buffer(&framebuffer.pixels, framebuffer.width, framebuffer.height)
            .map_err(|e| Error::WindowUpdate(e.to_string()))?;
        Ok(())
    }

    /// Returns false when the user closes the window (so we can stop the loop).
    pub fn is_open(&self) -> bool {
        self.window.is_open()
    }

    /// True while ESC is held down (we'll exit when this is pressed).
    pub fn esc_pressed(&self) -> bool {
        self.window.is_key_down(Key::Escape)
    }

    // Mode keys fire once per press, not per frame held.

    /// `f` toggles freehand sketching with the index fingertip.
    pub fn f_pressed_once(&self) -> bool {
        self.window.is_key_pressed(Key::F, KeyRepeat::No)
    }

    /// `s` toggles region selection (thumb + index span a rectangle).
    pub fn s_pressed_once(&self) -> bool {
        self.window.is_key_pressed(Key::S, KeyRepeat::No)
    }

    /// `c` captures the selected region from the still image.
    pub fn c_pressed_once(&self) -> bool {
        self.window.is_key_pressed(Key::C, KeyRepeat::No)
    }

    /// `v` pastes the captured snippet at the current fingertips.
    pub fn v_pressed_once(&self) -> bool {
        self.window.is_key_pressed(Key::V, KeyRepeat::No)
    }

    /// `e` wipes every annotation off the canvas.
    pub fn e_pressed_once(&self) -> bool {
        self.window.is_key_pressed(Key::E, KeyRepeat::No)
    }
}

/* ---------- Software drawing: pixels, lines, shapes, blits ---------- */

/// Put a pixel on the framebuffer if (x,y) is inside bounds.
/// Visual: the exact pixel at (x,y) changes color.
#[inline]
fn put_pixel(fb: &mut FrameBuffer, x: i32, y: i32, color: u32) {
    if x < 0 || y < 0 {
        return;
    }
    let (x, y) = (x as usize, y as usize);
    if x >= fb.width || y >= fb.height {
        return;
    }
    let idx = y * fb.width + x;
    fb.pixels[idx] = color;
}

/// Draw a thin line between (x0,y0) and (x1,y1) using Bresenham.
/// Visual: a straight 1-pixel line appears on top of the panels.
pub fn draw_line(fb: &mut FrameBuffer, x0: i32, y0: i32, x1: i32, y1: i32, color: u32) {
    let (mut x0, mut y0, x1, y1) = (x0, y0, x1, y1);
    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;
    loop {
        put_pixel(fb, x0, y0, color);
        if x0 == x1 && y0 == y1 { break; }
        let e2 = 2 * err;
        if e2 >= dy { err += dy; x0 += sx; }
        if e2 <= dx { err += dx; y0 += sy; }
    }
}

/// Stroke an ordered list of keypoints as one open polyline.
/// Visual: one continuous freehand stroke; a single point draws as a dot.
pub fn draw_polyline(fb: &mut FrameBuffer, points: &[Keypoint], color: u32) {
    match points {
        [] => {}
        [only] => put_pixel(fb, only.x.round() as i32, only.y.round() as i32, color),
        _ => {
            for pair in points.windows(2) {
                draw_line(
                    fb,
                    pair[0].x.round() as i32,
                    pair[0].y.round() as i32,
                    pair[1].x.round() as i32,
                    pair[1].y.round() as i32,
                    color,
                );
            }
        }
    }
}

/// Filled disc centered at (cx,cy).
/// Visual: the round fingertip/thumb markers.
pub fn draw_disc(fb: &mut FrameBuffer, cx: i32, cy: i32, radius: i32, color: u32) {
    let r2 = radius * radius;
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            if dx * dx + dy * dy <= r2 {
                put_pixel(fb, cx + dx, cy + dy, color);
            }
        }
    }
}

/// Solid rectangle, clipped to the buffer.
/// Visual: the dark backdrop of the loading panel.
pub fn fill_rect(fb: &mut FrameBuffer, x: i32, y: i32, w: i32, h: i32, color: u32) {
    for dy in 0..h.max(0) {
        for dx in 0..w.max(0) {
            put_pixel(fb, x + dx, y + dy, color);
        }
    }
}

/// 1-pixel rectangle outline.
/// Visual: the selection bounding box on the still panel.
pub fn draw_rect_outline(fb: &mut FrameBuffer, x: i32, y: i32, w: i32, h: i32, color: u32) {
    if w <= 0 || h <= 0 {
        return;
    }
    draw_line(fb, x, y, x + w - 1, y, color);
    draw_line(fb, x, y + h - 1, x + w - 1, y + h - 1, color);
    draw_line(fb, x, y, x, y + h - 1, color);
    draw_line(fb, x + w - 1, y, x + w - 1, y + h - 1, color);
}

/// Split the segment `a -> b` into `n` equal sub-intervals and return one
/// stroke covering the first half of each. Exactly `n` strokes come back,
/// each of length `|ab| / (2n)`, leaving the second half of every
/// sub-interval blank.
pub fn dash_segments(a: Keypoint, b: Keypoint, n: usize) -> Vec<(Keypoint, Keypoint)> {
    let lerp = |t: f32| Keypoint {
        x: a.x + (b.x - a.x) * t,
        y: a.y + (b.y - a.y) * t,
    };
    (0..n)
        .map(|i| {
            let t0 = i as f32 / n as f32;
            let t1 = (i as f32 + 0.5) / n as f32;
            (lerp(t0), lerp(t1))
        })
        .collect()
}

pub const DASH_COUNT: usize = 10;

/// Dotted guide line between two keypoints.
/// Visual: the grey thumb-to-index line while selecting a region.
pub fn draw_dashed_line(fb: &mut FrameBuffer, a: Keypoint, b: Keypoint, color: u32) {
    for (s, e) in dash_segments(a, b, DASH_COUNT) {
        draw_line(
            fb,
            s.x.round() as i32,
            s.y.round() as i32,
            e.x.round() as i32,
            e.y.round() as i32,
            color,
        );
    }
}

/// Copy `src` onto `fb` with its top-left corner at (x,y), clipped to the
/// destination bounds. Visual: a pasted snippet appears at that spot.
pub fn blit(fb: &mut FrameBuffer, src: &FrameBuffer, x: i32, y: i32) {
    for sy in 0..src.height {
        for sx in 0..src.width {
            put_pixel(fb, x + sx as i32, y + sy as i32, src.pixels[sy * src.width + sx]);
        }
    }
}

/// Like `blit`, but each pixel is a 50/50 mix with what is already there.
/// Visual: the ghosted paste preview that follows your hand.
pub fn blit_ghost(fb: &mut FrameBuffer, src: &FrameBuffer, x: i32, y: i32) {
    for sy in 0..src.height {
        for sx in 0..src.width {
            let (dx, dy) = (x + sx as i32, y + sy as i32);
            if dx < 0 || dy < 0 || dx as usize >= fb.width || dy as usize >= fb.height {
                continue;
            }
            let idx = dy as usize * fb.width + dx as usize;
            let s = src.pixels[sy * src.width + sx];
            let d = fb.pixels[idx];
            // Per-channel average; halving each side cannot carry across
            // the 8-bit channel boundaries.
            fb.pixels[idx] = ((s >> 1) & 0x007F7F7F) + ((d >> 1) & 0x007F7F7F);
        }
    }
}

/// Nearest-neighbor scaled copy of `src` into the `dw` x `dh` rectangle at
/// (x,y). Visual: the camera frame filling the right panel regardless of
/// the resolution the device actually negotiated.
pub fn blit_scaled(fb: &mut FrameBuffer, src: &FrameBuffer, x: i32, y: i32, dw: usize, dh: usize) {
    if src.width == 0 || src.height == 0 || dw == 0 || dh == 0 {
        return;
    }
    for dy in 0..dh {
        let sy = dy * src.height / dh;
        for dx in 0..dw {
            let sx = dx * src.width / dw;
            put_pixel(fb, x + dx as i32, y + dy as i32, src.pixels[sy * src.width + sx]);
        }
    }
}

/* ---------- 5x7 bitmap font (HUD, mode tags, distance readout) ---------- */

/// Return a 5x7 glyph bitmap for the characters the HUD needs.
/// Each u8 is a row; the low 5 bits are the pixels (bit 4 = leftmost).
fn glyph5x7(ch: char) -> Option<[u8; 7]> {
    // Helper macro to define a glyph quickly
    macro_rules! g { ($a:expr,$b:expr,$c:expr,$d:expr,$e:expr,$f:expr,$g:expr) => {
        Some([$a,$b,$c,$d,$e,$f,$g])
    }; }

    match ch {
        // Digits 0..9
        '0' => g!(0b01110,0b10001,0b10011,0b10101,0b11001,0b10001,0b01110),
        '1' => g!(0b00100,0b01100,0b00100,0b00100,0b00100,0b00100,0b01110),
        '2' => g!(0b01110,0b10001,0b00001,0b00010,0b00100,0b01000,0b11111),
        '3' => g!(0b11110,0b00001,0b00001,0b01110,0b00001,0b00001,0b11110),
        '4' => g!(0b00010,0b00110,0b01010,0b10010,0b11111,0b00010,0b00010),
        '5' => g!(0b11111,0b10000,0b11110,0b00001,0b00001,0b10001,0b01110),
        '6' => g!(0b00110,0b01000,0b10000,0b11110,0b10001,0b10001,0b01110),
        '7' => g!(0b11111,0b00001,0b00010,0b00100,0b01000,0b01000,0b01000),
        '8' => g!(0b01110,0b10001,0b10001,0b01110,0b10001,0b10001,0b01110),
        '9' => g!(0b01110,0b10001,0b10001,0b01111,0b00001,0b00010,0b01100),

        // Uppercase A-Z
        'A' => g!(0b01110,0b10001,0b10001,0b11111,0b10001,0b10001,0b10001),
        'B' => g!(0b11110,0b10001,0b10001,0b11110,0b10001,0b10001,0b11110),
        'C' => g!(0b01110,0b10001,0b10000,0b10000,0b10000,0b10001,0b01110),
        'D' => g!(0b11100,0b10010,0b10001,0b10001,0b10001,0b10010,0b11100),
        'E' => g!(0b11111,0b10000,0b10000,0b11110,0b10000,0b10000,0b11111),
        'F' => g!(0b11111,0b10000,0b10000,0b11110,0b10000,0b10000,0b10000),
        'G' => g!(0b01110,0b10001,0b10000,0b10111,0b10001,0b10001,0b01111),
        'H' => g!(0b10001,0b10001,0b10001,0b11111,0b10001,0b10001,0b10001),
        'I' => g!(0b01110,0b00100,0b00100,0b00100,0b00100,0b00100,0b01110),
        'J' => g!(0b00111,0b00010,0b00010,0b00010,0b00010,0b10010,0b01100),
        'K' => g!(0b10001,0b10010,0b10100,0b11000,0b10100,0b10010,0b10001),
        'L' => g!(0b10000,0b10000,0b10000,0b10000,0b10000,0b10000,0b11111),
        'M' => g!(0b10001,0b11011,0b10101,0b10101,0b10001,0b10001,0b10001),
        'N' => g!(0b10001,0b11001,0b10101,0b10011,0b10001,0b10001,0b10001),
        'O' => g!(0b01110,0b10001,0b10001,0b10001,0b10001,0b10001,0b01110),
        'P' => g!(0b11110,0b10001,0b10001,0b11110,0b10000,0b10000,0b10000),
        'Q' => g!(0b01110,0b10001,0b10001,0b10001,0b10101,0b10010,0b01101),
        'R' => g!(0b11110,0b10001,0b10001,0b11110,0b10100,0b10010,0b10001),
        'S' => g!(0b01111,0b10000,0b10000,0b01110,0b00001,0b00001,0b11110),
        'T' => g!(0b11111,0b00100,0b00100,0b00100,0b00100,0b00100,0b00100),
        'U' => g!(0b10001,0b10001,0b10001,0b10001,0b10001,0b10001,0b01110),
        'V' => g!(0b10001,0b10001,0b10001,0b10001,0b10001,0b01010,0b00100),
        'W' => g!(0b10001,0b10001,0b10001,0b10101,0b10101,0b10101,0b01010),
        'X' => g!(0b10001,0b10001,0b01010,0b00100,0b01010,0b10001,0b10001),
        'Y' => g!(0b10001,0b10001,0b01010,0b00100,0b00100,0b00100,0b00100),
        'Z' => g!(0b11111,0b00001,0b00010,0b00100,0b01000,0b10000,0b11111),

        // Punctuation: space, vertical bar, colon, dot
        ' ' => g!(0b00000,0b00000,0b00000,0b00000,0b00000,0b00000,0b00000),
        '|' => g!(0b00100,0b00100,0b00100,0b00100,0b00100,0b00100,0b00100),
        ':' => g!(0b00000,0b00100,0b00000,0b00000,0b00100,0b00000,0b00000),
        '.' => g!(0b00000,0b00000,0b00000,0b00000,0b00000,0b00100,0b00000),

        _ => None,
    }
}

/// Draw a single 5x7 character at (x,y).
/// Visual: a tiny glyph appears with a 1-pixel black shadow for contrast.
fn draw_char_5x7(fb: &mut FrameBuffer, x: i32, y: i32, ch: char, color: u32) {
    if let Some(rows) = glyph5x7(ch) {
        // Shadow pass: offset by (1,1) in black to improve readability
        for (ry, rowbits) in rows.iter().enumerate() {
            for rx in 0..5 {
                if (rowbits & (1 << (4 - rx))) != 0 {
                    put_pixel(fb, x + rx as i32 + 1, y + ry as i32 + 1, 0x00000000);
                }
            }
        }

        // Foreground pass: actual glyph in chosen color
        for (ry, rowbits) in rows.iter().enumerate() {
            for rx in 0..5 {
                if (rowbits & (1 << (4 - rx))) != 0 {
                    put_pixel(fb, x + rx as i32, y + ry as i32, color);
                }
            }
        }
    }
}

/// Draw a text string using 5x7 glyphs.
/// Visual: a compact text line; each glyph is 5x7 with 1-pixel spacing.
pub fn draw_text_5x7(fb: &mut FrameBuffer, mut x: i32, y: i32, text: &str, color: u32) {
    for ch in text.chars() {
        draw_char_5x7(fb, x, y, ch, color);
        x += 6; // 5 pixels glyph width + 1 pixel spacing
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn kp(x: f32, y: f32) -> Keypoint {
        Keypoint { x, y }
    }

    #[test]
    fn dash_segments_count_and_length() {
        let a = kp(0.0, 0.0);
        let b = kp(100.0, 0.0);
        let dashes = dash_segments(a, b, 10);
        assert_eq!(dashes.len(), 10);
        for (s, e) in &dashes {
            assert_relative_eq!(s.distance(*e), 100.0 / 20.0, epsilon = 1e-4);
        }
    }

    #[test]
    fn dash_segments_cover_disjoint_halves() {
        let a = kp(10.0, 20.0);
        let b = kp(10.0, 120.0);
        let dashes = dash_segments(a, b, 10);
        // Each stroke ends strictly before the next begins (half of every
        // sub-interval stays blank).
        for pair in dashes.windows(2) {
            let (_, end) = pair[0];
            let (start, _) = pair[1];
            assert!(end.y < start.y);
        }
        // First stroke starts at `a`; last ends half a sub-interval short of `b`.
        assert_relative_eq!(dashes[0].0.y, 20.0);
        assert_relative_eq!(dashes[9].1.y, 120.0 - 5.0, epsilon = 1e-4);
    }

    #[test]
    fn dash_segments_arbitrary_n() {
        let dashes = dash_segments(kp(0.0, 0.0), kp(30.0, 40.0), 4);
        assert_eq!(dashes.len(), 4);
        for (s, e) in &dashes {
            assert_relative_eq!(s.distance(*e), 50.0 / 8.0, epsilon = 1e-4);
        }
    }

    #[test]
    fn drawing_clips_to_the_buffer() {
        let mut fb = FrameBuffer::filled(8, 8, 0);
        draw_line(&mut fb, -5, -5, 20, 20, 0x00FFFFFF);
        draw_disc(&mut fb, 7, 7, 3, 0x00FF0000);
        draw_rect_outline(&mut fb, -2, -2, 20, 20, 0x0000FF00);
        let src = FrameBuffer::filled(4, 4, 0x00123456);
        blit(&mut fb, &src, 6, 6);
        blit_ghost(&mut fb, &src, -2, -2);
        blit_scaled(&mut fb, &src, 5, 5, 6, 6);
        // Reaching here without a panic is the point; spot-check one pixel.
        assert_eq!(fb.pixels.len(), 64);
    }

    #[test]
    fn ghost_blit_averages_channels() {
        let mut fb = FrameBuffer::filled(2, 1, 0x00000000);
        let src = FrameBuffer::filled(2, 1, 0x00FFFFFF);
        blit_ghost(&mut fb, &src, 0, 0);
        assert_eq!(fb.pixels[0], 0x007F7F7F);
    }

    #[test]
    fn scaled_blit_fills_the_target_rect() {
        let mut fb = FrameBuffer::filled(10, 10, 0);
        let src = FrameBuffer::filled(2, 2, 0x00ABCDEF);
        blit_scaled(&mut fb, &src, 2, 2, 5, 5);
        for dy in 2..7 {
            for dx in 2..7 {
                assert_eq!(fb.pixels[dy * 10 + dx], 0x00ABCDEF);
            }
        }
        assert_eq!(fb.pixels[0], 0);
    }
}

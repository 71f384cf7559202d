// Opens the default camera and converts frames for the two consumers:
// the window wants packed 0x00RRGGBB pixels, the hand detector wants the
// raw RGB24 bytes. One grab produces both so they always agree on content.

use crate::error::Error;
use crate::types::FrameBuffer;

// Bring in nokhwa types for camera control.
use nokhwa::{
    Camera,
    pixel_format::RgbFormat,
    utils::{
        CameraFormat, CameraIndex, FrameFormat, RequestedFormat, RequestedFormatType, Resolution,
    },
};

/// One grabbed camera frame, decoded once.
pub struct CapturedFrame {
    /// 0x00RRGGBB pixels, ready for the window.
    pub display: FrameBuffer,
    /// Tightly packed RGB24, ready for the detector protocol.
    pub rgb: Vec<u8>,
}

// A small wrapper around nokhwa::Camera so our main loop stays clean.
pub struct CameraCapture {
    cam: Camera,
    width: u32,
    height: u32,
}

impl CameraCapture {
    /// Try to open a camera at a target resolution (falls back if not exact).
    /// On success, nothing is shown on screen yet — we just hold an open stream.
    pub fn new(index: u32, width: u32, height: u32) -> Result<Self, Error> {
        // 1) Choose the device (0 = default webcam)
        let idx = CameraIndex::Index(index);

        let fmt = CameraFormat::new(
            Resolution::new(width, height),
            FrameFormat::YUYV, // uncompressed; cheap to convert to RGB
            30,                // target FPS
        );

        // 2) Ask for RGB frames, prioritizing the format closest to our request.
        let req = RequestedFormat::new::<RgbFormat>(RequestedFormatType::Closest(fmt));

        // 3) Create the camera (this might fail if no device exists).
        let mut cam = Camera::new(idx, req)
            .map_err(|e| Error::CameraInit(format!("Create camera: {e}")))?;

        // 4) Start streaming frames from the camera.
        cam.open_stream()
            .map_err(|e| Error::CameraInit(format!("Open stream: {e}")))?;

        // 5) The actual stream might choose a slightly different resolution.
        let actual = cam.resolution();
        log::info!("camera streaming at {}x{}", actual.width(), actual.height());

        Ok(Self {
            cam,
            width: actual.width(),
            height: actual.height(),
        })
    }

    /// Grab one frame from the camera and decode it once.
    /// The packed copy goes straight to the right panel; the raw bytes are
    /// what `HandTracker::offer` ships to the detector.
    pub fn next_frame(&mut self) -> Result<CapturedFrame, Error> {
        // 1) Pull a frame from the camera (this blocks until a new frame is
        //    ready — it is what paces the whole render loop).
        let frame = self
            .cam
            .frame()
            .map_err(|e| Error::CameraFrame(format!("Fetch frame: {e}")))?;

        // 2) Decode to an ImageBuffer<Rgb<u8>, Vec<u8>> (handles various raw formats safely).
        let rgb_img = frame
            .decode_image::<RgbFormat>()
            .map_err(|e| Error::CameraFrame(format!("Decode RGB: {e}")))?;

        let (w, h) = rgb_img.dimensions();
        let rgb = rgb_img.into_raw();

        // 3) Pack the same bytes as u32 pixels for the window (0x00RRGGBB).
        let mut pixels = Vec::with_capacity((w as usize) * (h as usize));
        for px in rgb.chunks_exact(3) {
            let (r, g, b) = (px[0] as u32, px[1] as u32, px[2] as u32);
            pixels.push((r << 16) | (g << 8) | b);
        }

        Ok(CapturedFrame {
            display: FrameBuffer {
                width: w as usize,
                height: h as usize,
                pixels,
            },
            rgb,
        })
    }

    /// Report the actual resolution the camera is delivering.
    pub fn resolution(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

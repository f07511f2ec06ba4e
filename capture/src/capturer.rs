//! Snapshot of the live frame into an encoded still.

use crate::angle::Angle;
use crate::backend::{CameraBackend, Frame, LiveStream};
use crate::error::{CaptureError, Result};
use crate::photo::{CapturedImage, JPEG_MIME};
use crate::stream::StreamHandle;
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ExtendedColorType, RgbaImage};

pub struct FrameCapturer {
    quality: u8,
}

impl FrameCapturer {
    pub fn new(quality: u8) -> Self {
        Self {
            quality: quality.clamp(1, 100),
        }
    }

    pub fn quality(&self) -> u8 {
        self.quality
    }

    /// Read the current frame of `handle` at its native size and encode it
    /// as JPEG. Touches neither the session nor the sequencer.
    pub fn capture<B: CameraBackend>(&self, handle: &StreamHandle<B>, angle: Angle) -> Result<CapturedImage> {
        let stream = handle.stream().ok_or(CaptureError::StreamClosed)?;

        let (width, height) = stream.dimensions();
        if width == 0 || height == 0 {
            return Err(CaptureError::NotReady);
        }

        let frame = stream.read_frame()?;
        let (width, height) = (frame.width, frame.height);
        let bytes = self.encode(frame)?;
        log::info!(
            "Captured {} frame {}x{} ({} bytes)",
            angle,
            width,
            height,
            bytes.len()
        );

        Ok(CapturedImage::new(angle, width, height, JPEG_MIME, bytes))
    }

    fn encode(&self, frame: Frame) -> Result<Vec<u8>> {
        let expected = Frame::expected_len(frame.width, frame.height);
        if frame.width == 0 || frame.height == 0 {
            return Err(CaptureError::NotReady);
        }
        if frame.rgba.len() != expected {
            return Err(CaptureError::FrameSize {
                expected,
                actual: frame.rgba.len(),
            });
        }

        let (width, height) = (frame.width, frame.height);
        let rgba = RgbaImage::from_raw(width, height, frame.rgba).ok_or(CaptureError::FrameSize {
            expected,
            actual: 0,
        })?;
        let rgb = DynamicImage::ImageRgba8(rgba).to_rgb8();

        let mut bytes = Vec::new();
        {
            let mut encoder = JpegEncoder::new_with_quality(&mut bytes, self.quality);
            encoder.encode(rgb.as_raw(), width, height, ExtendedColorType::Rgb8)?;
        }
        Ok(bytes)
    }
}

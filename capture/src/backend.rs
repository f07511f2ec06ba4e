//! Platform camera abstraction.
//!
//! The browser client implements these over `getUserMedia` and a canvas;
//! tests implement them with a scripted fake.

use crate::config::StreamConstraints;
use crate::error::{AccessError, CaptureError};
use async_trait::async_trait;

/// One uncompressed RGBA frame read from a live stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    /// Row-major RGBA8, `width * height * 4` bytes
    pub rgba: Vec<u8>,
}

impl Frame {
    pub fn expected_len(width: u32, height: u32) -> usize {
        width as usize * height as usize * 4
    }
}

/// A live camera feed.
pub trait LiveStream {
    /// Native dimensions reported by the surface. `(0, 0)` until the first
    /// frame has arrived.
    fn dimensions(&self) -> (u32, u32);

    /// Copy out the frame currently shown.
    fn read_frame(&self) -> Result<Frame, CaptureError>;
}

/// Acquires and releases camera streams.
///
/// Acquisition is the only suspension point of the flow and may never
/// resolve. The capture flow is single-threaded, hence `?Send`.
#[async_trait(?Send)]
pub trait CameraBackend {
    type Stream: LiveStream;

    async fn acquire(&self, constraints: &StreamConstraints) -> Result<Self::Stream, AccessError>;

    /// Called once `stream` has become the screen's live stream. Streams
    /// discarded as stale are never activated, so this is where the preview
    /// surface gets attached.
    fn activate(&self, _stream: &Self::Stream) {}

    /// Stop every track of the stream and free the hardware.
    fn release(&self, stream: Self::Stream);
}

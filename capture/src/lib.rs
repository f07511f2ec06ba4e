//! # glowish-capture
//!
//! Guided multi-angle selfie capture for the skin-analysis flow.
//!
//! This crate holds the platform-independent core of the capture screen. The
//! browser client plugs in its camera and storage through [`CameraBackend`]
//! and [`PhotoStore`]; everything else lives here.
//!
//! ## Components
//!
//! - [`PermissionGate`]: one-time camera authorization with a short-lived probe stream
//! - [`DeviceStreamManager`]: acquires and releases the one live stream of a screen
//! - [`FrameCapturer`]: snapshots the live frame into a JPEG still
//! - [`AngleSequencer`]: front, right profile, left profile, close-up
//! - [`CaptureSession`]: accepted images, exported once the sequence completes
//! - [`CaptureScreen`]: ties the above together for one screen activation
//!
//! ## Example
//!
//! ```no_run
//! # async fn run<B: glowish_capture::CameraBackend>(camera: std::rc::Rc<B>) -> glowish_capture::Result<()> {
//! use glowish_capture::{CaptureConfig, CaptureScreen, MemoryStore, Step};
//!
//! let mut screen = CaptureScreen::new(camera, MemoryStore::new(), CaptureConfig::default());
//! screen.open().await?;
//!
//! screen.capture()?;
//! if let Step::Completed(photos) = screen.accept()? {
//!     println!("captured {} photos", photos.captured_count());
//! }
//! # Ok(())
//! # }
//! ```

pub mod angle;
pub mod backend;
pub mod cancel;
pub mod capturer;
pub mod config;
pub mod error;
pub mod handoff;
pub mod permission;
pub mod photo;
pub mod screen;
pub mod sequencer;
pub mod session;
pub mod stream;

pub use angle::{Angle, GuideOverlay, ANGLE_COUNT, CAPTURE_GUIDELINES};
pub use backend::{CameraBackend, Frame, LiveStream};
pub use cancel::CancellationToken;
pub use capturer::FrameCapturer;
pub use config::{CameraFacing, CaptureConfig, Routes, StreamConstraints};
pub use error::{AccessError, CaptureError, ConfigError, HandoffError, Result};
pub use handoff::{MemoryStore, PhotoStore};
pub use permission::{probe_access, AccessOutcome, PermissionGate, PermissionState};
pub use photo::{CapturedImage, PhotoSet};
pub use screen::{preview_mode, CaptureScreen, Controls, PreviewMode, Progress, ScreenStatus};
pub use sequencer::{AngleSequencer, Step};
pub use session::CaptureSession;
pub use stream::{Acquisition, AcquisitionOutcome, DeviceStreamManager, StreamHandle, StreamState};

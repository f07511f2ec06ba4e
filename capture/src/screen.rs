//! Capture screen controller.
//!
//! Owns everything one activation of the capture screen needs: the stream
//! manager, the sequencer (and through it the session), the pending image and
//! the handoff store. The view only calls the operations below and renders the
//! derived state (`status`, `preview_mode`, `controls`, `progress`).

use crate::angle::{Angle, ANGLE_COUNT};
use crate::backend::{CameraBackend, LiveStream};
use crate::cancel::CancellationToken;
use crate::capturer::FrameCapturer;
use crate::config::CaptureConfig;
use crate::error::{AccessError, CaptureError, Result};
use crate::handoff::{self, PhotoStore};
use crate::photo::{CapturedImage, PhotoSet};
use crate::sequencer::{AngleSequencer, Step};
use crate::stream::{Acquisition, AcquisitionOutcome, DeviceStreamManager, StreamState};
use std::rc::Rc;

/// What the preview surface shows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewMode {
    /// Live feed attached to the preview
    Live,
    /// Feed hidden, pending still shown. The stream keeps running.
    Review,
}

/// Preview mode as a pure function of the pending image.
pub fn preview_mode(pending: Option<&CapturedImage>) -> PreviewMode {
    match pending {
        Some(_) => PreviewMode::Review,
        None => PreviewMode::Live,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScreenStatus {
    /// Waiting for the platform to hand over the stream
    Acquiring,
    Ready,
    Reviewing,
    Error(AccessError),
    /// Every angle is handled but the photos could not be stored for review
    HandoffFailed,
    Completed,
    Closed,
}

/// Which controls are enabled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Controls {
    pub capture: bool,
    pub accept: bool,
    pub retake: bool,
    pub skip: bool,
    pub previous: bool,
    pub retry: bool,
    pub retry_handoff: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    /// 1-based position of the current angle
    pub position: usize,
    pub total: usize,
    pub captured: usize,
}

pub struct CaptureScreen<B: CameraBackend, S: PhotoStore> {
    config: CaptureConfig,
    token: CancellationToken,
    streams: DeviceStreamManager<B>,
    capturer: FrameCapturer,
    sequencer: AngleSequencer,
    pending: Option<CapturedImage>,
    /// Exported set whose handoff write failed
    unsaved: Option<PhotoSet>,
    store: S,
    unmounted: bool,
}

impl<B: CameraBackend, S: PhotoStore> CaptureScreen<B, S> {
    pub fn new(backend: Rc<B>, store: S, config: CaptureConfig) -> Self {
        let token = CancellationToken::new();
        let streams = DeviceStreamManager::new(backend, config.camera.clone(), token.clone());
        let capturer = FrameCapturer::new(config.jpeg_quality);

        Self {
            config,
            token,
            streams,
            capturer,
            sequencer: AngleSequencer::new(),
            pending: None,
            unsaved: None,
            store,
            unmounted: false,
        }
    }

    pub fn config(&self) -> &CaptureConfig {
        &self.config
    }

    /// Start the one stream acquisition of this activation. Any handoff
    /// left over from an earlier session is cleared first.
    pub fn mount(&mut self) -> Result<Acquisition<B>> {
        let acquisition = self.streams.begin_open()?;
        if let Err(e) = handoff::clear(&self.store, &self.config.storage_key_prefix) {
            log::warn!("Could not clear previous handoff: {}", e);
        }
        Ok(acquisition)
    }

    /// Apply the acquisition result. Stale results are dropped; failures
    /// become the screen's error status and are also returned.
    pub fn finish_mount(&mut self, outcome: AcquisitionOutcome<B::Stream>) -> std::result::Result<(), AccessError> {
        self.streams.finish_open(outcome)
    }

    /// Mount and wait for the stream in one go.
    pub async fn open(&mut self) -> Result<()> {
        let acquisition = self.mount()?;
        let outcome = acquisition.run().await;
        self.finish_mount(outcome)?;
        Ok(())
    }

    /// User-initiated retry after a recoverable acquisition error.
    pub fn retry(&mut self) -> Result<Acquisition<B>> {
        match self.streams.state() {
            StreamState::Failed(e) if !e.is_recoverable() => Err(CaptureError::Access(e.clone())),
            _ => self.streams.begin_open(),
        }
    }

    /// Snapshot the live frame for the current angle; it becomes pending.
    pub fn capture(&mut self) -> Result<&CapturedImage> {
        let angle = self
            .sequencer
            .current_angle()
            .ok_or(CaptureError::SequenceComplete)?;
        if self.pending.is_some() {
            return Err(CaptureError::PendingReview);
        }
        if self.unmounted {
            return Err(CaptureError::StreamClosed);
        }

        let handle = self.streams.handle().ok_or(CaptureError::NotReady)?;
        let image = self.capturer.capture(handle, angle)?;
        let pending = self.pending.insert(image);
        Ok(&*pending)
    }

    /// Commit the pending image. On the last angle this releases the stream,
    /// persists the export and returns [`Step::Completed`].
    ///
    /// If the handoff cannot be written, the partial write is removed, the
    /// set is kept for [`CaptureScreen::retry_handoff`] and the status becomes
    /// [`ScreenStatus::HandoffFailed`].
    pub fn accept(&mut self) -> Result<Step> {
        if self.sequencer.is_complete() {
            return Err(CaptureError::SequenceComplete);
        }
        let image = self.pending.take().ok_or(CaptureError::NoPendingImage)?;

        match self.sequencer.accept(image)? {
            Step::Completed(set) => {
                self.streams.close();
                self.hand_off(set)
            }
            step => Ok(step),
        }
    }

    /// Write the kept set again after a failed handoff.
    pub fn retry_handoff(&mut self) -> Result<Step> {
        let set = self.unsaved.take().ok_or(CaptureError::NothingToHandOff)?;
        self.hand_off(set)
    }

    /// Photos whose handoff failed, for a fallback path.
    pub fn unsaved_photos(&self) -> Option<&PhotoSet> {
        self.unsaved.as_ref()
    }

    fn hand_off(&mut self, set: PhotoSet) -> Result<Step> {
        let prefix = &self.config.storage_key_prefix;
        match handoff::persist(&self.store, prefix, &set) {
            Ok(()) => Ok(Step::Completed(set)),
            Err(e) => {
                log::error!("Handoff of {} photos failed: {}", set.captured_count(), e);
                if let Err(clear_err) = handoff::clear(&self.store, prefix) {
                    log::warn!("Could not roll back partial handoff: {}", clear_err);
                }
                self.unsaved = Some(set);
                Err(CaptureError::Handoff(e))
            }
        }
    }

    /// Discard the pending image; the live preview resumes.
    pub fn retake(&mut self) -> bool {
        let discarded = self.pending.take().is_some();
        if discarded {
            log::debug!("Pending capture discarded");
        }
        discarded
    }

    pub fn skip(&mut self) -> Result<Step> {
        if self.pending.is_some() {
            return Err(CaptureError::PendingReview);
        }
        self.sequencer.skip()
    }

    pub fn previous(&mut self) -> Result<Step> {
        if self.pending.is_some() {
            return Err(CaptureError::PendingReview);
        }
        self.sequencer.previous()
    }

    /// Leave the screen. The stream is released before returning the route
    /// to navigate to.
    pub fn back(&mut self) -> &str {
        self.unmount();
        &self.config.routes.intro
    }

    /// Release the stream and invalidate outstanding continuations.
    /// Idempotent.
    pub fn unmount(&mut self) {
        if !self.unmounted {
            log::info!("Capture screen unmounted");
            self.unmounted = true;
        }
        self.token.cancel();
        self.streams.close();
        self.pending = None;
    }

    pub fn status(&self) -> ScreenStatus {
        if self.unsaved.is_some() {
            return ScreenStatus::HandoffFailed;
        }
        if self.sequencer.is_complete() {
            return ScreenStatus::Completed;
        }
        if self.unmounted {
            return ScreenStatus::Closed;
        }
        match self.streams.state() {
            StreamState::Idle | StreamState::Acquiring => ScreenStatus::Acquiring,
            StreamState::Failed(e) => ScreenStatus::Error(e.clone()),
            StreamState::Closed => ScreenStatus::Closed,
            StreamState::Live if self.pending.is_some() => ScreenStatus::Reviewing,
            StreamState::Live => ScreenStatus::Ready,
        }
    }

    pub fn preview_mode(&self) -> PreviewMode {
        preview_mode(self.pending.as_ref())
    }

    /// True once the live surface reports nonzero dimensions.
    pub fn frame_ready(&self) -> bool {
        self.streams
            .handle()
            .and_then(|handle| handle.stream())
            .map(|stream| {
                let (width, height) = stream.dimensions();
                width > 0 && height > 0
            })
            .unwrap_or(false)
    }

    pub fn controls(&self) -> Controls {
        match self.status() {
            ScreenStatus::Ready => Controls {
                capture: self.frame_ready(),
                skip: !self.sequencer.is_last(),
                previous: !self.sequencer.is_first(),
                ..Controls::default()
            },
            ScreenStatus::Reviewing => Controls {
                accept: true,
                retake: true,
                ..Controls::default()
            },
            ScreenStatus::Error(e) => Controls {
                retry: e.is_recoverable(),
                ..Controls::default()
            },
            ScreenStatus::HandoffFailed => Controls {
                retry_handoff: true,
                ..Controls::default()
            },
            ScreenStatus::Acquiring | ScreenStatus::Completed | ScreenStatus::Closed => Controls::default(),
        }
    }

    pub fn current_angle(&self) -> Option<Angle> {
        self.sequencer.current_angle()
    }

    pub fn pending(&self) -> Option<&CapturedImage> {
        self.pending.as_ref()
    }

    /// Whether an image has already been accepted for `angle` this session.
    pub fn has_capture(&self, angle: Angle) -> bool {
        self.sequencer.session().has(angle)
    }

    pub fn progress(&self) -> Progress {
        Progress {
            position: self.sequencer.index() + 1,
            total: ANGLE_COUNT,
            captured: self.sequencer.session().captured_count(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

impl<B: CameraBackend, S: PhotoStore> Drop for CaptureScreen<B, S> {
    fn drop(&mut self) {
        self.unmount();
    }
}

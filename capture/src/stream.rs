//! Device stream manager: the single owner of a screen's camera stream.

use crate::backend::CameraBackend;
use crate::cancel::CancellationToken;
use crate::config::StreamConstraints;
use crate::error::{AccessError, CaptureError};
use std::rc::Rc;

/// An open camera stream. Released on [`StreamHandle::close`] or on drop,
/// whichever comes first.
pub struct StreamHandle<B: CameraBackend> {
    backend: Rc<B>,
    stream: Option<B::Stream>,
}

impl<B: CameraBackend> StreamHandle<B> {
    pub(crate) fn new(backend: Rc<B>, stream: B::Stream) -> Self {
        Self {
            backend,
            stream: Some(stream),
        }
    }

    pub fn is_open(&self) -> bool {
        self.stream.is_some()
    }

    pub fn stream(&self) -> Option<&B::Stream> {
        self.stream.as_ref()
    }

    /// Release the hardware. Closing twice is a no-op.
    pub fn close(&mut self) {
        if let Some(stream) = self.stream.take() {
            log::info!("Releasing camera stream");
            self.backend.release(stream);
        }
    }
}

impl<B: CameraBackend> Drop for StreamHandle<B> {
    fn drop(&mut self) {
        self.close();
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamState {
    Idle,
    Acquiring,
    Live,
    Failed(AccessError),
    Closed,
}

/// Result of an [`Acquisition`] once the platform has answered
pub enum AcquisitionOutcome<S> {
    Ready(S),
    Failed(AccessError),
    /// The owning screen went away while waiting; any stream that arrived
    /// has already been released.
    Stale,
}

/// An outstanding stream request, detached from the manager so the screen
/// stays usable (and unmountable) while the platform prompt is open.
pub struct Acquisition<B: CameraBackend> {
    backend: Rc<B>,
    constraints: StreamConstraints,
    token: CancellationToken,
}

impl<B: CameraBackend> Acquisition<B> {
    pub async fn run(self) -> AcquisitionOutcome<B::Stream> {
        let result = self.backend.acquire(&self.constraints).await;

        if self.token.is_cancelled() {
            if let Ok(stream) = result {
                log::info!("Camera stream arrived after unmount, releasing it");
                self.backend.release(stream);
            }
            return AcquisitionOutcome::Stale;
        }

        match result {
            Ok(stream) => AcquisitionOutcome::Ready(stream),
            Err(e) => AcquisitionOutcome::Failed(e),
        }
    }
}

/// Opens at most one stream per screen activation and releases it on every
/// exit path.
pub struct DeviceStreamManager<B: CameraBackend> {
    backend: Rc<B>,
    constraints: StreamConstraints,
    token: CancellationToken,
    handle: Option<StreamHandle<B>>,
    state: StreamState,
}

impl<B: CameraBackend> DeviceStreamManager<B> {
    pub fn new(backend: Rc<B>, constraints: StreamConstraints, token: CancellationToken) -> Self {
        Self {
            backend,
            constraints,
            token,
            handle: None,
            state: StreamState::Idle,
        }
    }

    pub fn state(&self) -> &StreamState {
        &self.state
    }

    pub fn handle(&self) -> Option<&StreamHandle<B>> {
        self.handle.as_ref()
    }

    pub fn is_live(&self) -> bool {
        self.state == StreamState::Live
    }

    /// Start acquiring the stream. Allowed from `Idle` and, for a
    /// user-initiated retry, from `Failed`.
    pub fn begin_open(&mut self) -> Result<Acquisition<B>, CaptureError> {
        if self.token.is_cancelled() {
            return Err(CaptureError::StreamClosed);
        }
        match self.state {
            StreamState::Idle | StreamState::Failed(_) => {}
            StreamState::Acquiring | StreamState::Live => return Err(CaptureError::AlreadyOpen),
            StreamState::Closed => return Err(CaptureError::StreamClosed),
        }

        log::info!(
            "Requesting camera stream ({} facing, ideal {}x{})",
            self.constraints.facing.as_str(),
            self.constraints.ideal_width,
            self.constraints.ideal_height
        );
        self.state = StreamState::Acquiring;

        Ok(Acquisition {
            backend: self.backend.clone(),
            constraints: self.constraints.clone(),
            token: self.token.clone(),
        })
    }

    /// Apply the outcome of [`DeviceStreamManager::begin_open`]. Results
    /// arriving after close or cancellation are discarded.
    pub fn finish_open(&mut self, outcome: AcquisitionOutcome<B::Stream>) -> Result<(), AccessError> {
        let current = !self.token.is_cancelled() && self.state == StreamState::Acquiring;

        match outcome {
            AcquisitionOutcome::Ready(stream) if current => {
                log::info!("Camera stream ready");
                self.backend.activate(&stream);
                self.handle = Some(StreamHandle::new(self.backend.clone(), stream));
                self.state = StreamState::Live;
                Ok(())
            }
            AcquisitionOutcome::Ready(stream) => {
                log::info!("Discarding camera stream for a closed screen");
                self.backend.release(stream);
                Ok(())
            }
            AcquisitionOutcome::Failed(e) if current => {
                log::warn!("Camera acquisition failed: {}", e);
                self.state = StreamState::Failed(e.clone());
                Err(e)
            }
            AcquisitionOutcome::Failed(_) | AcquisitionOutcome::Stale => Ok(()),
        }
    }

    pub async fn open(&mut self) -> Result<(), CaptureError> {
        let acquisition = self.begin_open()?;
        let outcome = acquisition.run().await;
        self.finish_open(outcome)?;
        Ok(())
    }

    /// Release the stream if one is open. Idempotent; the manager cannot be
    /// reopened afterwards.
    pub fn close(&mut self) {
        if let Some(mut handle) = self.handle.take() {
            handle.close();
        }
        if self.state != StreamState::Closed {
            log::debug!("Stream manager closed");
            self.state = StreamState::Closed;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{Frame, LiveStream};
    use async_trait::async_trait;
    use std::cell::{Cell, RefCell};

    struct TestStream;

    impl LiveStream for TestStream {
        fn dimensions(&self) -> (u32, u32) {
            (2, 2)
        }

        fn read_frame(&self) -> Result<Frame, CaptureError> {
            Ok(Frame {
                width: 2,
                height: 2,
                rgba: vec![0; 16],
            })
        }
    }

    #[derive(Default)]
    struct TestBackend {
        fail_with: RefCell<Option<AccessError>>,
        open: Cell<i32>,
        acquired: Cell<u32>,
        activated: Cell<u32>,
    }

    #[async_trait(?Send)]
    impl CameraBackend for TestBackend {
        type Stream = TestStream;

        async fn acquire(&self, _constraints: &StreamConstraints) -> Result<TestStream, AccessError> {
            if let Some(e) = self.fail_with.borrow_mut().take() {
                return Err(e);
            }
            self.open.set(self.open.get() + 1);
            self.acquired.set(self.acquired.get() + 1);
            Ok(TestStream)
        }

        fn activate(&self, _stream: &TestStream) {
            self.activated.set(self.activated.get() + 1);
        }

        fn release(&self, _stream: TestStream) {
            self.open.set(self.open.get() - 1);
        }
    }

    fn manager(backend: &Rc<TestBackend>) -> (DeviceStreamManager<TestBackend>, CancellationToken) {
        let token = CancellationToken::new();
        let manager = DeviceStreamManager::new(backend.clone(), StreamConstraints::default(), token.clone());
        (manager, token)
    }

    #[tokio::test]
    async fn test_open_once() {
        let backend = Rc::new(TestBackend::default());
        let (mut manager, _token) = manager(&backend);

        manager.open().await.unwrap();
        assert!(manager.is_live());
        assert!(matches!(manager.open().await, Err(CaptureError::AlreadyOpen)));
        assert_eq!(backend.acquired.get(), 1);
        assert_eq!(backend.open.get(), 1);
        assert_eq!(backend.activated.get(), 1);
    }

    #[tokio::test]
    async fn test_close_is_idempotent() {
        let backend = Rc::new(TestBackend::default());
        let (mut manager, _token) = manager(&backend);

        manager.open().await.unwrap();
        manager.close();
        manager.close();
        assert_eq!(backend.open.get(), 0);
        assert_eq!(manager.state(), &StreamState::Closed);
        assert!(matches!(manager.open().await, Err(CaptureError::StreamClosed)));
    }

    #[tokio::test]
    async fn test_handle_close_twice() {
        let backend = Rc::new(TestBackend::default());
        let stream = backend.acquire(&StreamConstraints::default()).await.unwrap();
        let mut handle = StreamHandle::new(backend.clone(), stream);

        handle.close();
        assert!(!handle.is_open());
        handle.close();
        drop(handle);
        assert_eq!(backend.open.get(), 0);
    }

    #[tokio::test]
    async fn test_drop_releases_stream() {
        let backend = Rc::new(TestBackend::default());
        {
            let (mut manager, _token) = manager(&backend);
            manager.open().await.unwrap();
            assert_eq!(backend.open.get(), 1);
        }
        assert_eq!(backend.open.get(), 0);
    }

    #[tokio::test]
    async fn test_failure_then_retry() {
        let backend = Rc::new(TestBackend::default());
        *backend.fail_with.borrow_mut() = Some(AccessError::AcquisitionFailed("busy".into()));
        let (mut manager, _token) = manager(&backend);

        let err = manager.open().await.unwrap_err();
        assert!(matches!(err, CaptureError::Access(AccessError::AcquisitionFailed(_))));
        assert!(matches!(manager.state(), StreamState::Failed(_)));

        manager.open().await.unwrap();
        assert!(manager.is_live());
    }

    #[tokio::test]
    async fn test_cancelled_acquisition_releases_stream() {
        let backend = Rc::new(TestBackend::default());
        let (mut manager, token) = manager(&backend);

        let acquisition = manager.begin_open().unwrap();
        token.cancel();
        let outcome = acquisition.run().await;
        assert!(matches!(outcome, AcquisitionOutcome::Stale));
        assert!(manager.finish_open(outcome).is_ok());

        assert_eq!(backend.open.get(), 0);
        assert_eq!(backend.activated.get(), 0);
        assert!(manager.handle().is_none());
        assert_eq!(manager.state(), &StreamState::Acquiring);
    }

    #[tokio::test]
    async fn test_close_during_acquisition_discards_result() {
        let backend = Rc::new(TestBackend::default());
        let (mut manager, _token) = manager(&backend);

        let acquisition = manager.begin_open().unwrap();
        manager.close();
        let outcome = acquisition.run().await;
        manager.finish_open(outcome).unwrap();

        assert_eq!(backend.open.get(), 0);
        assert_eq!(backend.activated.get(), 0);
        assert_eq!(manager.state(), &StreamState::Closed);
    }
}

//! Permission gate: one-time camera authorization before the capture screen.

use crate::backend::CameraBackend;
use crate::config::StreamConstraints;
use crate::error::AccessError;
use std::rc::Rc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessOutcome {
    Granted,
    Denied(AccessError),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PermissionState {
    #[default]
    Idle,
    Requesting,
    Granted,
    Denied(AccessError),
}

/// Open a probe stream to trigger the platform prompt and release it at once.
/// The probe never outlives this call.
pub async fn probe_access<B: CameraBackend>(backend: &B, constraints: &StreamConstraints) -> AccessOutcome {
    log::info!("Requesting camera permission");
    match backend.acquire(constraints).await {
        Ok(stream) => {
            backend.release(stream);
            log::info!("Camera permission granted");
            AccessOutcome::Granted
        }
        Err(e) => {
            log::warn!("Camera permission request failed: {}", e);
            AccessOutcome::Denied(e)
        }
    }
}

pub struct PermissionGate<B: CameraBackend> {
    backend: Rc<B>,
    constraints: StreamConstraints,
    state: PermissionState,
}

impl<B: CameraBackend> PermissionGate<B> {
    pub fn new(backend: Rc<B>, constraints: StreamConstraints) -> Self {
        Self {
            backend,
            constraints,
            state: PermissionState::Idle,
        }
    }

    pub fn state(&self) -> &PermissionState {
        &self.state
    }

    pub fn is_requesting(&self) -> bool {
        self.state == PermissionState::Requesting
    }

    /// Message for the error card, if the last request was denied.
    pub fn error_message(&self) -> Option<&'static str> {
        match &self.state {
            PermissionState::Denied(e) => Some(e.user_message()),
            _ => None,
        }
    }

    /// Returns the probe to await, or `None` if a request is already
    /// outstanding.
    pub fn begin_request(&mut self) -> Option<(Rc<B>, StreamConstraints)> {
        if self.is_requesting() {
            return None;
        }
        self.state = PermissionState::Requesting;
        Some((self.backend.clone(), self.constraints.clone()))
    }

    pub fn finish_request(&mut self, outcome: AccessOutcome) -> AccessOutcome {
        self.state = match &outcome {
            AccessOutcome::Granted => PermissionState::Granted,
            AccessOutcome::Denied(e) => PermissionState::Denied(e.clone()),
        };
        outcome
    }

    pub async fn request_access(&mut self) -> AccessOutcome {
        match self.begin_request() {
            Some((backend, constraints)) => {
                let outcome = probe_access(backend.as_ref(), &constraints).await;
                self.finish_request(outcome)
            }
            None => AccessOutcome::Denied(AccessError::AcquisitionFailed(
                "a permission request is already in progress".to_string(),
            )),
        }
    }

    /// Clear a denial so the user can ask again, without reloading.
    pub fn try_again(&mut self) {
        if matches!(self.state, PermissionState::Denied(_)) {
            self.state = PermissionState::Idle;
        }
    }
}

//! Error types for the capture flow.

use thiserror::Error;

/// Why the camera could not be opened.
///
/// These are the only failures the user ever sees; they are produced where the
/// stream is acquired and rendered as messages, never propagated further.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AccessError {
    /// The user or the browser refused camera access
    #[error("camera permission denied")]
    PermissionDenied,

    /// No camera hardware is available
    #[error("no camera device found")]
    NoDevice,

    /// Any other acquisition error (device busy, driver fault, ...)
    #[error("camera acquisition failed: {0}")]
    AcquisitionFailed(String),
}

impl AccessError {
    /// Map a browser `DOMException` name to an access error.
    pub fn from_dom_error(name: &str, message: &str) -> Self {
        match name {
            "NotAllowedError" | "PermissionDeniedError" | "SecurityError" => {
                AccessError::PermissionDenied
            }
            "NotFoundError" | "DevicesNotFoundError" => AccessError::NoDevice,
            _ if message.is_empty() => AccessError::AcquisitionFailed(name.to_string()),
            _ => AccessError::AcquisitionFailed(format!("{}: {}", name, message)),
        }
    }

    /// Text shown to the user on the permission screen.
    pub fn user_message(&self) -> &'static str {
        match self {
            AccessError::PermissionDenied => {
                "Camera access was denied. Please enable camera permissions in your browser settings."
            }
            AccessError::NoDevice => "No camera found on your device.",
            AccessError::AcquisitionFailed(_) => "Unable to access camera. Please try again.",
        }
    }

    /// Whether retrying within this flow can help. A missing camera only
    /// leaves the manual-upload fallback.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, AccessError::NoDevice)
    }
}

/// Errors from reading the review handoff back out of storage
#[derive(Error, Debug)]
pub enum HandoffError {
    /// The backing key/value store rejected the operation
    #[error("storage error: {0}")]
    Storage(String),

    /// A non-empty value that is not a decodable image data URL
    #[error("stored photo under '{key}' is not a valid image data URL")]
    Corrupt { key: String },
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

/// Errors raised by the capture screen and its components
#[derive(Error, Debug)]
pub enum CaptureError {
    /// The stream has not produced a frame with nonzero dimensions yet
    #[error("camera stream is not ready")]
    NotReady,

    /// The stream handle was already closed
    #[error("camera stream is closed")]
    StreamClosed,

    /// The stream is already open or being acquired for this screen
    #[error("camera stream is already open")]
    AlreadyOpen,

    /// The frame buffer does not match the reported dimensions
    #[error("frame buffer is {actual} bytes, expected {expected}")]
    FrameSize { expected: usize, actual: usize },

    /// The platform could not hand out the current frame
    #[error("frame read failed: {0}")]
    FrameRead(String),

    /// JPEG encoding failed
    #[error("image encoding failed: {0}")]
    Encode(#[from] image::ImageError),

    /// Every angle has been handled; the screen must navigate away
    #[error("capture sequence is already complete")]
    SequenceComplete,

    /// Accept was requested with nothing under review
    #[error("no captured image is pending review")]
    NoPendingImage,

    /// A handoff retry was requested but no photo set is waiting for one
    #[error("no photo set is waiting to be handed off")]
    NothingToHandOff,

    /// Capture was requested while an earlier image is still under review
    #[error("a captured image is already pending review")]
    PendingReview,

    #[error(transparent)]
    Access(#[from] AccessError),

    #[error(transparent)]
    Handoff(#[from] HandoffError),
}

/// Result type for capture operations
pub type Result<T> = std::result::Result<T, CaptureError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dom_error_mapping() {
        assert_eq!(
            AccessError::from_dom_error("NotAllowedError", "Permission denied"),
            AccessError::PermissionDenied
        );
        assert_eq!(
            AccessError::from_dom_error("NotFoundError", "Requested device not found"),
            AccessError::NoDevice
        );
        assert_eq!(
            AccessError::from_dom_error("NotReadableError", "Device in use"),
            AccessError::AcquisitionFailed("NotReadableError: Device in use".to_string())
        );
        assert_eq!(
            AccessError::from_dom_error("AbortError", ""),
            AccessError::AcquisitionFailed("AbortError".to_string())
        );
    }

    #[test]
    fn test_recoverability() {
        assert!(AccessError::PermissionDenied.is_recoverable());
        assert!(AccessError::AcquisitionFailed("busy".into()).is_recoverable());
        assert!(!AccessError::NoDevice.is_recoverable());
    }

    #[test]
    fn test_user_messages() {
        assert_eq!(
            AccessError::NoDevice.user_message(),
            "No camera found on your device."
        );
        assert!(AccessError::PermissionDenied
            .user_message()
            .contains("browser settings"));
    }
}

//! Configuration for the capture flow.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum CameraFacing {
    #[serde(rename = "environment")]
    Environment, // Back camera
    #[default]
    #[serde(rename = "user")]
    User, // Front camera
}

impl CameraFacing {
    /// Value of the `facingMode` media constraint
    pub fn as_str(&self) -> &'static str {
        match self {
            CameraFacing::Environment => "environment",
            CameraFacing::User => "user",
        }
    }
}

/// Constraints passed to the platform when a stream is opened.
///
/// Width and height are ideals; the platform picks the closest mode it has.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamConstraints {
    #[serde(default)]
    pub facing: CameraFacing,

    #[serde(default = "default_ideal_width")]
    pub ideal_width: u32,

    #[serde(default = "default_ideal_height")]
    pub ideal_height: u32,
}

fn default_ideal_width() -> u32 {
    1280
}

fn default_ideal_height() -> u32 {
    720
}

impl Default for StreamConstraints {
    fn default() -> Self {
        Self {
            facing: CameraFacing::User,
            ideal_width: default_ideal_width(),
            ideal_height: default_ideal_height(),
        }
    }
}

/// Where the view navigates to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Routes {
    /// Guidelines page shown before the permission request
    #[serde(default = "default_intro_route")]
    pub intro: String,

    /// Camera permission request
    #[serde(default = "default_permission_route")]
    pub permission: String,

    #[serde(default = "default_capture_route")]
    pub capture: String,

    /// Downstream review stage that reads the handoff keys
    #[serde(default = "default_review_route")]
    pub review: String,

    /// Fallback offered when the camera cannot be used
    #[serde(default = "default_manual_upload_route")]
    pub manual_upload: String,
}

fn default_intro_route() -> String {
    "/photo-capture".to_string()
}

fn default_permission_route() -> String {
    "/camera-permission".to_string()
}

fn default_capture_route() -> String {
    "/camera".to_string()
}

fn default_review_route() -> String {
    "/review".to_string()
}

fn default_manual_upload_route() -> String {
    "/upload".to_string()
}

impl Default for Routes {
    fn default() -> Self {
        Self {
            intro: default_intro_route(),
            permission: default_permission_route(),
            capture: default_capture_route(),
            review: default_review_route(),
            manual_upload: default_manual_upload_route(),
        }
    }
}

/// Configuration for the capture flow
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptureConfig {
    #[serde(default)]
    pub camera: StreamConstraints,

    /// JPEG quality for captured stills (1-100)
    #[serde(default = "default_jpeg_quality")]
    pub jpeg_quality: u8,

    /// Prefix of the handoff storage keys (`photo_front`, ...)
    #[serde(default = "default_storage_key_prefix")]
    pub storage_key_prefix: String,

    /// Pause between a granted permission and showing the capture screen
    #[serde(default = "default_grant_redirect_delay")]
    pub grant_redirect_delay_ms: u32,

    #[serde(default)]
    pub routes: Routes,
}

fn default_jpeg_quality() -> u8 {
    80
}

fn default_storage_key_prefix() -> String {
    "photo_".to_string()
}

fn default_grant_redirect_delay() -> u32 {
    1000
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            camera: StreamConstraints::default(),
            jpeg_quality: default_jpeg_quality(),
            storage_key_prefix: default_storage_key_prefix(),
            grant_redirect_delay_ms: default_grant_redirect_delay(),
            routes: Routes::default(),
        }
    }
}

impl CaptureConfig {
    /// Parse and validate a JSON configuration. Missing fields take defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: CaptureConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.jpeg_quality == 0 || self.jpeg_quality > 100 {
            return Err(ConfigError::InvalidParameter(format!(
                "jpeg_quality must be within 1..=100, got {}",
                self.jpeg_quality
            )));
        }
        if self.camera.ideal_width == 0 || self.camera.ideal_height == 0 {
            return Err(ConfigError::InvalidParameter(
                "camera resolution must be nonzero".to_string(),
            ));
        }
        if self.storage_key_prefix.is_empty() {
            return Err(ConfigError::InvalidParameter(
                "storage_key_prefix must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = CaptureConfig::default();
        assert_eq!(config.camera.facing, CameraFacing::User);
        assert_eq!(config.camera.ideal_width, 1280);
        assert_eq!(config.camera.ideal_height, 720);
        assert_eq!(config.jpeg_quality, 80);
        assert_eq!(config.storage_key_prefix, "photo_");
        assert_eq!(config.grant_redirect_delay_ms, 1000);
        assert_eq!(config.routes.manual_upload, "/upload");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_takes_defaults() {
        let config = CaptureConfig::from_json(r#"{"jpeg_quality": 92, "routes": {"review": "/results"}}"#)
            .unwrap();
        assert_eq!(config.jpeg_quality, 92);
        assert_eq!(config.routes.review, "/results");
        assert_eq!(config.routes.capture, "/camera");
        assert_eq!(config.camera, StreamConstraints::default());
    }

    #[test]
    fn test_invalid_quality_rejected() {
        assert!(matches!(
            CaptureConfig::from_json(r#"{"jpeg_quality": 0}"#),
            Err(ConfigError::InvalidParameter(_))
        ));
        assert!(matches!(
            CaptureConfig::from_json(r#"{"jpeg_quality": "high"}"#),
            Err(ConfigError::Json(_))
        ));
    }

    #[test]
    fn test_facing_serialization() {
        let json = serde_json::to_string(&StreamConstraints::default()).unwrap();
        assert!(json.contains("\"facing\":\"user\""));
    }
}

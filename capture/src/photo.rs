//! Captured stills and the exported photo set.

use crate::angle::{Angle, ANGLE_COUNT};
use crate::error::HandoffError;
use base64::{engine::general_purpose::STANDARD, Engine as _};

pub const JPEG_MIME: &str = "image/jpeg";

/// An encoded still captured for one angle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedImage {
    pub angle: Angle,
    pub width: u32,
    pub height: u32,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl CapturedImage {
    pub fn new(angle: Angle, width: u32, height: u32, mime_type: &str, bytes: Vec<u8>) -> Self {
        Self {
            angle,
            width,
            height,
            mime_type: mime_type.to_string(),
            bytes,
        }
    }

    /// `data:<mime>;base64,<payload>`, usable as an `<img>` source.
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, STANDARD.encode(&self.bytes))
    }

    /// Parse a data URL written by [`CapturedImage::to_data_url`].
    ///
    /// Dimensions are not carried by the URL and come back as zero.
    pub fn from_data_url(angle: Angle, key: &str, url: &str) -> Result<Self, HandoffError> {
        let corrupt = || HandoffError::Corrupt {
            key: key.to_string(),
        };
        let rest = url.strip_prefix("data:").ok_or_else(corrupt)?;
        let (mime_type, payload) = rest.split_once(";base64,").ok_or_else(corrupt)?;
        if !mime_type.starts_with("image/") {
            return Err(corrupt());
        }
        let bytes = STANDARD.decode(payload).map_err(|_| corrupt())?;
        if bytes.is_empty() {
            return Err(corrupt());
        }
        Ok(Self::new(angle, 0, 0, mime_type, bytes))
    }
}

/// Final result of a capture session: one slot per angle, absent when the
/// angle was skipped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PhotoSet {
    pub front: Option<CapturedImage>,
    pub right: Option<CapturedImage>,
    pub left: Option<CapturedImage>,
    pub closeup: Option<CapturedImage>,
}

impl PhotoSet {
    pub fn get(&self, angle: Angle) -> Option<&CapturedImage> {
        match angle {
            Angle::Front => self.front.as_ref(),
            Angle::Right => self.right.as_ref(),
            Angle::Left => self.left.as_ref(),
            Angle::Closeup => self.closeup.as_ref(),
        }
    }

    pub fn slot_mut(&mut self, angle: Angle) -> &mut Option<CapturedImage> {
        match angle {
            Angle::Front => &mut self.front,
            Angle::Right => &mut self.right,
            Angle::Left => &mut self.left,
            Angle::Closeup => &mut self.closeup,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Angle, Option<&CapturedImage>)> + '_ {
        Angle::ALL.into_iter().map(move |angle| (angle, self.get(angle)))
    }

    pub fn captured_count(&self) -> usize {
        self.iter().filter(|(_, image)| image.is_some()).count()
    }

    pub fn is_full(&self) -> bool {
        self.captured_count() == ANGLE_COUNT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(angle: Angle) -> CapturedImage {
        CapturedImage::new(angle, 4, 2, JPEG_MIME, vec![0xFF, 0xD8, 0xFF, 0xE0, 1, 2, 3])
    }

    #[test]
    fn test_data_url_format() {
        let url = sample(Angle::Front).to_data_url();
        assert!(url.starts_with("data:image/jpeg;base64,"));

        let parsed = CapturedImage::from_data_url(Angle::Front, "photo_front", &url).unwrap();
        assert_eq!(parsed.bytes, sample(Angle::Front).bytes);
        assert_eq!(parsed.mime_type, JPEG_MIME);
    }

    #[test]
    fn test_rejects_non_image_urls() {
        for bad in ["hello", "data:text/plain;base64,aGk=", "data:image/jpeg;base64,", "data:image/jpeg,raw"] {
            assert!(
                CapturedImage::from_data_url(Angle::Left, "photo_left", bad).is_err(),
                "accepted {:?}",
                bad
            );
        }
    }

    #[test]
    fn test_bad_base64_reports_key() {
        match CapturedImage::from_data_url(Angle::Right, "photo_right", "data:image/jpeg;base64,@@not-base64@@") {
            Err(HandoffError::Corrupt { key }) => assert_eq!(key, "photo_right"),
            other => panic!("expected corrupt error, got {:?}", other),
        }
    }

    #[test]
    fn test_photo_set_counts() {
        let mut set = PhotoSet::default();
        assert_eq!(set.captured_count(), 0);

        *set.slot_mut(Angle::Right) = Some(sample(Angle::Right));
        *set.slot_mut(Angle::Closeup) = Some(sample(Angle::Closeup));

        assert_eq!(set.captured_count(), 2);
        assert!(!set.is_full());
        assert!(set.get(Angle::Front).is_none());
        assert_eq!(set.get(Angle::Right).map(|i| i.angle), Some(Angle::Right));
    }
}

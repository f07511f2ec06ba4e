use crate::angle::Angle;
use crate::photo::{CapturedImage, PhotoSet};

/// Accepted images of one capture screen activation, one slot per angle.
///
/// Only the angle sequencer writes here; the view reads.
#[derive(Debug, Default)]
pub struct CaptureSession {
    slots: PhotoSet,
}

impl CaptureSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `image` for `angle`, replacing any earlier accept for it.
    pub fn record(&mut self, angle: Angle, mut image: CapturedImage) {
        image.angle = angle;
        let slot = self.slots.slot_mut(angle);
        if slot.is_some() {
            log::debug!("Replacing accepted {} photo", angle);
        }
        *slot = Some(image);
    }

    pub fn get(&self, angle: Angle) -> Option<&CapturedImage> {
        self.slots.get(angle)
    }

    pub fn has(&self, angle: Angle) -> bool {
        self.get(angle).is_some()
    }

    pub fn captured_count(&self) -> usize {
        self.slots.captured_count()
    }

    pub fn is_full(&self) -> bool {
        self.slots.is_full()
    }

    /// Hand the photos over by value. Consumes the session.
    pub fn export(self) -> PhotoSet {
        log::info!(
            "Exporting capture session with {} of 4 photos",
            self.slots.captured_count()
        );
        self.slots
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::photo::JPEG_MIME;

    fn image(tag: u8) -> CapturedImage {
        CapturedImage::new(Angle::Front, 1, 1, JPEG_MIME, vec![tag])
    }

    #[test]
    fn test_starts_empty() {
        let session = CaptureSession::new();
        assert_eq!(session.captured_count(), 0);
        assert_eq!(session.export(), PhotoSet::default());
    }

    #[test]
    fn test_last_write_wins() {
        let mut session = CaptureSession::new();
        session.record(Angle::Left, image(1));
        session.record(Angle::Left, image(2));

        assert_eq!(session.captured_count(), 1);
        let left = session.get(Angle::Left).unwrap();
        assert_eq!(left.bytes, vec![2]);
        assert_eq!(left.angle, Angle::Left);
    }

    #[test]
    fn test_full_session() {
        let mut session = CaptureSession::new();
        for (i, angle) in Angle::ALL.into_iter().enumerate() {
            assert!(!session.is_full());
            session.record(angle, image(i as u8));
        }
        assert!(session.is_full());
        assert!(session.export().is_full());
    }
}

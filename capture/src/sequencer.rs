//! Angle sequencer: walks the user through the four angles.
//!
//! ```text
//! accept(img) @ index<3: session[angle]=img; index+=1
//! accept(img) @ index=3: session[angle]=img; -> complete; export
//! skip()      @ index<3: index+=1      (no-op at 3)
//! previous()  @ index>0: index-=1      (no-op at 0)
//! ```
//!
//! Once complete every transition is refused.

use crate::angle::{Angle, ANGLE_COUNT};
use crate::error::{CaptureError, Result};
use crate::photo::{CapturedImage, PhotoSet};
use crate::session::CaptureSession;

const LAST_INDEX: usize = ANGLE_COUNT - 1;

/// Effect of a sequencer transition
#[derive(Debug, PartialEq, Eq)]
pub enum Step {
    /// The cursor now points at this angle
    Moved(Angle),
    /// Clamped at either end of the sequence
    Unchanged,
    /// The last angle was accepted; the session has been exported
    Completed(PhotoSet),
}

#[derive(Debug, Default)]
pub struct AngleSequencer {
    index: usize,
    complete: bool,
    session: CaptureSession,
}

impl AngleSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    /// `None` once the sequence is complete.
    pub fn current_angle(&self) -> Option<Angle> {
        if self.complete {
            None
        } else {
            Angle::from_index(self.index)
        }
    }

    pub fn session(&self) -> &CaptureSession {
        &self.session
    }

    pub fn is_first(&self) -> bool {
        self.index == 0
    }

    pub fn is_last(&self) -> bool {
        self.index == LAST_INDEX
    }

    fn ensure_open(&self) -> Result<()> {
        if self.complete {
            Err(CaptureError::SequenceComplete)
        } else {
            Ok(())
        }
    }

    /// Commit `image` for the current angle and move on. On the last angle
    /// this completes the sequence and exports the session, exactly once.
    pub fn accept(&mut self, image: CapturedImage) -> Result<Step> {
        self.ensure_open()?;

        let angle = Angle::ALL[self.index];
        self.session.record(angle, image);

        if self.index == LAST_INDEX {
            self.complete = true;
            log::info!("All angles handled, capture sequence complete");
            let session = std::mem::take(&mut self.session);
            return Ok(Step::Completed(session.export()));
        }

        self.index += 1;
        log::debug!("Accepted {}, moving to {}", angle, Angle::ALL[self.index]);
        Ok(Step::Moved(Angle::ALL[self.index]))
    }

    /// Move forward without recording anything.
    pub fn skip(&mut self) -> Result<Step> {
        self.ensure_open()?;

        if self.index == LAST_INDEX {
            return Ok(Step::Unchanged);
        }
        self.index += 1;
        log::debug!("Skipped to {}", Angle::ALL[self.index]);
        Ok(Step::Moved(Angle::ALL[self.index]))
    }

    /// Move back one angle. Photos already accepted stay in the session.
    pub fn previous(&mut self) -> Result<Step> {
        self.ensure_open()?;

        if self.index == 0 {
            return Ok(Step::Unchanged);
        }
        self.index -= 1;
        log::debug!("Back to {}", Angle::ALL[self.index]);
        Ok(Step::Moved(Angle::ALL[self.index]))
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
    fn test_clamped_at_both_ends() {
        let mut seq = AngleSequencer::new();
        assert_eq!(seq.previous().unwrap(), Step::Unchanged);
        assert_eq!(seq.index(), 0);

        for _ in 0..3 {
            seq.skip().unwrap();
        }
        assert!(seq.is_last());
        assert_eq!(seq.skip().unwrap(), Step::Unchanged);
        assert_eq!(seq.current_angle(), Some(Angle::Closeup));
    }

    #[test]
    fn test_previous_keeps_accepted_photo() {
        let mut seq = AngleSequencer::new();
        assert_eq!(seq.accept(image(1)).unwrap(), Step::Moved(Angle::Right));
        assert_eq!(seq.previous().unwrap(), Step::Moved(Angle::Front));
        assert!(seq.session().has(Angle::Front));
    }

    #[test]
    fn test_refuses_after_complete() {
        let mut seq = AngleSequencer::new();
        seq.skip().unwrap();
        seq.skip().unwrap();
        seq.skip().unwrap();
        let step = seq.accept(image(4)).unwrap();

        match step {
            Step::Completed(set) => {
                assert_eq!(set.captured_count(), 1);
                assert!(set.closeup.is_some());
            }
            other => panic!("expected completion, got {:?}", other),
        }
        assert!(seq.is_complete());
        assert_eq!(seq.current_angle(), None);
        assert!(matches!(seq.accept(image(5)), Err(CaptureError::SequenceComplete)));
        assert!(matches!(seq.skip(), Err(CaptureError::SequenceComplete)));
        assert!(matches!(seq.previous(), Err(CaptureError::SequenceComplete)));
        assert_eq!(seq.index(), LAST_INDEX);
    }

    #[derive(Clone, Copy, Debug)]
    enum Op {
        Accept,
        Skip,
        Previous,
    }

    fn all_sequences(len: usize) -> Vec<Vec<Op>> {
        let mut out = vec![Vec::new()];
        for _ in 0..len {
            out = out
                .into_iter()
                .flat_map(|prefix| {
                    [Op::Accept, Op::Skip, Op::Previous].into_iter().map(move |op| {
                        let mut next = prefix.clone();
                        next.push(op);
                        next
                    })
                })
                .collect();
        }
        out
    }

    // Every sequence of up to 7 operations: the cursor stays in range,
    // completion happens iff accept fires at the last index, and the export
    // holds exactly the angles that were accepted.
    #[test]
    fn test_exhaustive_transitions() {
        for len in 0..=7 {
            for ops in all_sequences(len) {
                let mut seq = AngleSequencer::new();
                let mut accepted = [None; ANGLE_COUNT];

                for (n, op) in ops.iter().enumerate() {
                    let before = seq.index();
                    let was_complete = seq.is_complete();
                    let result = match op {
                        Op::Accept => seq.accept(image(n as u8)),
                        Op::Skip => seq.skip(),
                        Op::Previous => seq.previous(),
                    };

                    if was_complete {
                        assert!(matches!(result, Err(CaptureError::SequenceComplete)));
                        continue;
                    }

                    let step = result.unwrap();
                    assert!(seq.index() <= LAST_INDEX, "{:?}", ops);

                    if let Op::Accept = op {
                        accepted[before] = Some(n as u8);
                    }
                    let completes = matches!(op, Op::Accept) && before == LAST_INDEX;
                    assert_eq!(seq.is_complete(), completes, "{:?}", ops);

                    if let Step::Completed(set) = step {
                        for angle in Angle::ALL {
                            let exported = set.get(angle).map(|img| img.bytes[0]);
                            assert_eq!(exported, accepted[angle.index()], "{:?}", ops);
                        }
                    }
                }
            }
        }
    }
}

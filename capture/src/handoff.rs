//! Handoff of the finished photo set to the review stage.
//!
//! Each angle is written under `<prefix><angle>` (`photo_front`, ...) as an
//! image data URL. Skipped angles are written as an empty string, which the
//! review side reads back as "not captured".

use crate::angle::Angle;
use crate::error::HandoffError;
use crate::photo::{CapturedImage, PhotoSet};
use std::collections::HashMap;

/// Process-local key/value storage
pub trait PhotoStore {
    fn set_item(&self, key: &str, value: &str) -> Result<(), HandoffError>;
    fn get_item(&self, key: &str) -> Result<Option<String>, HandoffError>;
    fn remove_item(&self, key: &str) -> Result<(), HandoffError>;
}

impl<T: PhotoStore + ?Sized> PhotoStore for std::rc::Rc<T> {
    fn set_item(&self, key: &str, value: &str) -> Result<(), HandoffError> {
        (**self).set_item(key, value)
    }

    fn get_item(&self, key: &str) -> Result<Option<String>, HandoffError> {
        (**self).get_item(key)
    }

    fn remove_item(&self, key: &str) -> Result<(), HandoffError> {
        (**self).remove_item(key)
    }
}

/// In-memory handoff for hosts without browser storage
#[derive(Debug, Default)]
pub struct MemoryStore {
    items: std::cell::RefCell<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.borrow().is_empty()
    }
}

impl PhotoStore for MemoryStore {
    fn set_item(&self, key: &str, value: &str) -> Result<(), HandoffError> {
        self.items.borrow_mut().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn get_item(&self, key: &str) -> Result<Option<String>, HandoffError> {
        Ok(self.items.borrow().get(key).cloned())
    }

    fn remove_item(&self, key: &str) -> Result<(), HandoffError> {
        self.items.borrow_mut().remove(key);
        Ok(())
    }
}

/// Write all four keys for `set`.
pub fn persist<S: PhotoStore + ?Sized>(store: &S, prefix: &str, set: &PhotoSet) -> Result<(), HandoffError> {
    for (angle, image) in set.iter() {
        let value = image.map(CapturedImage::to_data_url).unwrap_or_default();
        store.set_item(&angle.storage_key(prefix), &value)?;
    }
    log::info!(
        "Handed off {} photos under '{}*'",
        set.captured_count(),
        prefix
    );
    Ok(())
}

/// Read the handoff back. Missing and empty keys are absent; anything else
/// must decode.
pub fn load<S: PhotoStore + ?Sized>(store: &S, prefix: &str) -> Result<PhotoSet, HandoffError> {
    let mut set = PhotoSet::default();
    for angle in Angle::ALL {
        let key = angle.storage_key(prefix);
        match store.get_item(&key)? {
            Some(value) if !value.is_empty() => {
                *set.slot_mut(angle) = Some(CapturedImage::from_data_url(angle, &key, &value)?);
            }
            _ => {}
        }
    }
    Ok(set)
}

/// Remove every handoff key so a new session starts clean.
pub fn clear<S: PhotoStore + ?Sized>(store: &S, prefix: &str) -> Result<(), HandoffError> {
    for angle in Angle::ALL {
        store.remove_item(&angle.storage_key(prefix))?;
    }
    Ok(())
}

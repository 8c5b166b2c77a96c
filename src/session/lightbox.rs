//! Modal browsing over one image sequence of the content document.
//!
//! The controller never holds image data. It keeps the path of the sequence it
//! browses plus the focused index, and reads the live document on every call,
//! so edits made through it show up on the page as soon as it closes.

use std::time::{Duration, Instant};

use serde_json::Value;
use thiserror::Error;

use super::{
    confirm::{Confirm, REMOVE_IMAGE_PROMPT},
    edit::{EditError, EditSession},
};
use crate::{
    domain::{
        FieldPath, ImageEntry, MAX_IMAGES_PER_SERIES, MIN_IMAGES_PER_SERIES, SCALE_STEP,
        clamp_scale,
    },
    io::{persistence::SaveOutcome, storage::Storage},
    store,
};

pub const WHEEL_COOLDOWN: Duration = Duration::from_millis(300);

#[derive(Debug, Error)]
pub enum GalleryError {
    #[error("no image series is open")]
    NotOpen,
    #[error("{path} is not an image series")]
    NotASequence { path: FieldPath },
    #[error("Maximum {max} images per series")]
    SeriesFull { max: usize },
    #[error("A series must keep at least {min} image")]
    LastImage { min: usize },
    #[error("image {index} does not exist (series has {len})")]
    IndexOutOfRange { index: usize, len: usize },
    #[error(transparent)]
    Edit(#[from] EditError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LightboxSession {
    array_path: FieldPath,
    index: usize,
}

impl LightboxSession {
    pub fn array_path(&self) -> &FieldPath {
        &self.array_path
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn image_path(&self) -> FieldPath {
        self.array_path.child(self.index)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RemoveOutcome {
    Removed { remaining: usize, save: SaveOutcome },
    Declined,
}

/// Closed, or open on one sequence with a focused index.
#[derive(Debug, Clone, Default)]
pub struct Lightbox {
    session: Option<LightboxSession>,
}

impl Lightbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_open(&self) -> bool {
        self.session.is_some()
    }

    pub fn session(&self) -> Option<&LightboxSession> {
        self.session.as_ref()
    }

    pub fn current_index(&self) -> Option<usize> {
        self.session.as_ref().map(|session| session.index)
    }

    /// Opens on the sequence at `array_path`, focused on `start` (clamped).
    pub fn open(
        &mut self,
        doc: &Value,
        array_path: FieldPath,
        start: usize,
    ) -> Result<(), GalleryError> {
        let len = store::len_at(doc, &array_path).ok_or_else(|| GalleryError::NotASequence {
            path: array_path.clone(),
        })?;
        let index = clamp_index(start, len);
        tracing::debug!(path = %array_path, index, len, "lightbox opened");
        self.session = Some(LightboxSession { array_path, index });
        Ok(())
    }

    pub fn close(&mut self) {
        if let Some(session) = self.session.take() {
            tracing::debug!(path = %session.array_path, "lightbox closed");
        }
    }

    pub fn len(&self, doc: &Value) -> usize {
        self.session
            .as_ref()
            .and_then(|session| store::len_at(doc, &session.array_path))
            .unwrap_or(0)
    }

    pub fn is_empty(&self, doc: &Value) -> bool {
        self.len(doc) == 0
    }

    /// The focused image node, if any.
    pub fn current<'a>(&self, doc: &'a Value) -> Option<&'a Value> {
        let session = self.session.as_ref()?;
        store::get(doc, &session.array_path)?
            .as_array()?
            .get(session.index)
    }

    pub fn current_entry(&self, doc: &Value) -> Option<ImageEntry> {
        self.current(doc).and_then(ImageEntry::from_value)
    }

    pub fn next(&mut self, doc: &Value) {
        self.step(doc, 1);
    }

    pub fn prev(&mut self, doc: &Value) {
        self.step(doc, -1);
    }

    fn step(&mut self, doc: &Value, delta: isize) {
        let len = self.len(doc);
        let Some(session) = self.session.as_mut() else {
            return;
        };
        if len == 0 {
            return;
        }
        let current = clamp_index(session.index, len) as isize;
        session.index = (current + delta).rem_euclid(len as isize) as usize;
    }

    /// Re-clamps the focus after the sequence changed underneath.
    pub fn sync(&mut self, doc: &Value) {
        let len = self.len(doc);
        if let Some(session) = self.session.as_mut() {
            session.index = clamp_index(session.index, len);
        }
    }

    /// Appends a placeholder image and focuses it.
    pub fn add<S: Storage>(&mut self, edit: &mut EditSession<S>) -> Result<SaveOutcome, GalleryError> {
        let session = self.session.as_ref().ok_or(GalleryError::NotOpen)?;
        let len = self.len(edit.document());
        if len >= MAX_IMAGES_PER_SERIES {
            return Err(GalleryError::SeriesFull {
                max: MAX_IMAGES_PER_SERIES,
            });
        }
        let array_path = session.array_path.clone();
        let save = edit.append(&array_path, ImageEntry::placeholder().to_value())?;
        if let Some(session) = self.session.as_mut() {
            session.index = len;
        }
        Ok(save)
    }

    /// Deletes image `index` after confirmation.
    ///
    /// Removing an image before the focus keeps the same image focused;
    /// removing the focused one moves focus to its successor, or the new last
    /// image when it was last.
    pub fn remove<S: Storage>(
        &mut self,
        edit: &mut EditSession<S>,
        index: usize,
        confirm: &mut impl Confirm,
    ) -> Result<RemoveOutcome, GalleryError> {
        let session = self.session.as_ref().ok_or(GalleryError::NotOpen)?;
        let len = self.len(edit.document());
        if len <= MIN_IMAGES_PER_SERIES {
            return Err(GalleryError::LastImage {
                min: MIN_IMAGES_PER_SERIES,
            });
        }
        if index >= len {
            return Err(GalleryError::IndexOutOfRange { index, len });
        }
        if !confirm.confirm(REMOVE_IMAGE_PROMPT) {
            return Ok(RemoveOutcome::Declined);
        }
        let array_path = session.array_path.clone();
        let save = edit.remove(&array_path, index)?;
        let remaining = len - 1;
        if let Some(session) = self.session.as_mut() {
            if index < session.index {
                session.index -= 1;
            }
            session.index = clamp_index(session.index, remaining);
        }
        Ok(RemoveOutcome::Removed { remaining, save })
    }

    /// Steps the focused image's zoom by `steps` increments, within range.
    pub fn zoom<S: Storage>(
        &self,
        edit: &mut EditSession<S>,
        steps: i32,
    ) -> Result<f64, GalleryError> {
        let session = self.session.as_ref().ok_or(GalleryError::NotOpen)?;
        let entry = self
            .current_entry(edit.document())
            .ok_or_else(|| GalleryError::NotASequence {
                path: session.array_path.clone(),
            })?;
        let scale = clamp_scale(entry.effective_scale() + f64::from(steps) * SCALE_STEP);
        let scale_path = session.image_path().child("scale");
        edit.update(&scale_path, Value::from(scale))?;
        Ok(scale)
    }
}

fn clamp_index(index: usize, len: usize) -> usize {
    index.min(len.saturating_sub(1))
}

/// Admits one wheel step per cooldown window so that a single physical
/// scroll gesture advances one frame.
#[derive(Debug, Clone)]
pub struct WheelGate {
    cooldown: Duration,
    last_admitted: Option<Instant>,
}

impl Default for WheelGate {
    fn default() -> Self {
        Self::new(WHEEL_COOLDOWN)
    }
}

impl WheelGate {
    pub fn new(cooldown: Duration) -> Self {
        Self {
            cooldown,
            last_admitted: None,
        }
    }

    pub fn admit(&mut self, now: Instant) -> bool {
        if let Some(last) = self.last_admitted
            && now.saturating_duration_since(last) < self.cooldown
        {
            return false;
        }
        self.last_admitted = Some(now);
        true
    }

    pub fn reset(&mut self) {
        self.last_admitted = None;
    }
}

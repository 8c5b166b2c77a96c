use std::path::Path;
use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;

use super::confirm::{Confirm, RESET_PROMPT};
use crate::{
    domain::{
        FieldPath, ImageEntry, PathSegment, SchemaViolation, default_document, validate_document,
    },
    io::{
        image_file::{UploadError, encode_image_file},
        persistence::{LoadOrigin, Persistence, SaveOutcome},
        storage::Storage,
    },
    store::{self, PathError},
};

#[derive(Debug, Error)]
pub enum EditError {
    #[error(transparent)]
    Path(#[from] PathError),
    #[error("edit rejected: {0}")]
    Schema(#[from] SchemaViolation),
    #[error(transparent)]
    Upload(#[from] UploadError),
    #[error("{path} does not hold an image")]
    NotAnImage { path: FieldPath },
}

/// Owner of the content document for one editing session.
///
/// Every write goes through the tree store, is checked against the content
/// schema, replaces the current snapshot and is saved immediately. Readers that
/// took a [`snapshot`](Self::snapshot) earlier keep seeing the old document.
#[derive(Debug)]
pub struct EditSession<S> {
    document: Arc<Value>,
    editing: bool,
    persistence: Persistence<S>,
    origin: LoadOrigin,
    last_save: Option<SaveOutcome>,
}

impl<S: Storage> EditSession<S> {
    pub fn open(storage: S) -> Self {
        let mut persistence = Persistence::new(storage);
        let loaded = persistence.load();
        Self {
            document: Arc::new(loaded.document),
            editing: false,
            persistence,
            origin: loaded.origin,
            last_save: None,
        }
    }

    pub fn document(&self) -> &Value {
        &self.document
    }

    pub fn snapshot(&self) -> Arc<Value> {
        Arc::clone(&self.document)
    }

    pub fn get(&self, path: &FieldPath) -> Option<&Value> {
        store::get(&self.document, path)
    }

    pub fn load_origin(&self) -> &LoadOrigin {
        &self.origin
    }

    pub fn last_save(&self) -> Option<&SaveOutcome> {
        self.last_save.as_ref()
    }

    pub fn persistence(&self) -> &Persistence<S> {
        &self.persistence
    }

    pub fn into_storage(self) -> S {
        self.persistence.into_storage()
    }

    pub fn is_editing(&self) -> bool {
        self.editing
    }

    /// Flips edit mode. Content is neither changed nor saved.
    pub fn toggle(&mut self) -> bool {
        self.editing = !self.editing;
        tracing::debug!(editing = self.editing, "edit mode toggled");
        self.editing
    }

    pub fn set_editing(&mut self, editing: bool) {
        self.editing = editing;
    }

    pub fn update(&mut self, path: &FieldPath, value: Value) -> Result<SaveOutcome, EditError> {
        let next = store::set(&self.document, path, value)?;
        self.commit(next, path, "update")
    }

    pub fn append(&mut self, array_path: &FieldPath, value: Value) -> Result<SaveOutcome, EditError> {
        let next = store::insert_at(&self.document, array_path, value)?;
        self.commit(next, array_path, "append")
    }

    pub fn remove(&mut self, array_path: &FieldPath, index: usize) -> Result<SaveOutcome, EditError> {
        let next = store::remove_at(&self.document, array_path, index)?;
        self.commit(next, array_path, "remove")
    }

    fn commit(&mut self, next: Value, path: &FieldPath, op: &str) -> Result<SaveOutcome, EditError> {
        validate_document(&next)?;
        self.document = Arc::new(next);
        tracing::debug!(%path, op, "content committed");
        Ok(self.persist())
    }

    fn persist(&mut self) -> SaveOutcome {
        let outcome = self.persistence.save(&self.document);
        self.last_save = Some(outcome.clone());
        outcome
    }

    /// Restores the built-in document after confirmation and leaves edit mode.
    ///
    /// Returns `None` when the prompt is declined; nothing changes then.
    pub fn reset_to_default(&mut self, confirm: &mut impl Confirm) -> Option<SaveOutcome> {
        if !confirm.confirm(RESET_PROMPT) {
            return None;
        }
        self.document = Arc::new(default_document());
        self.editing = false;
        tracing::debug!("content reset to default");
        Some(self.persist())
    }

    /// Replaces an image with the contents of `file`, encoded inline.
    ///
    /// `image_path` must address an image entry or that entry's `url` leaf;
    /// any other node is [`EditError::NotAnImage`]. The file is
    /// checked before it is read; a rejected file leaves the document as is.
    pub async fn replace_image(
        &mut self,
        image_path: &FieldPath,
        file: impl AsRef<Path>,
    ) -> Result<SaveOutcome, EditError> {
        let url_path = self.image_url_path(image_path)?;
        let image = encode_image_file(file).await?;
        self.update(&url_path, Value::String(image.data_url))
    }

    fn image_url_path(&self, image_path: &FieldPath) -> Result<FieldPath, EditError> {
        if self.holds_image(image_path) {
            return Ok(image_path.child("url"));
        }
        let url_leaf = matches!(image_path.last(), Some(PathSegment::Key(key)) if key == "url");
        if url_leaf && let Some(entry) = image_path.parent().filter(|p| self.holds_image(p)) {
            return Ok(entry.child("url"));
        }
        Err(EditError::NotAnImage {
            path: image_path.clone(),
        })
    }

    fn holds_image(&self, path: &FieldPath) -> bool {
        self.get(path).and_then(ImageEntry::from_value)
            .is_some()
    }
}

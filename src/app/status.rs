use crate::{
    io::SaveOutcome,
    session::{REMOVE_IMAGE_PROMPT, RemoveOutcome},
};

pub const READY_STATUS: &str = "Ready. Press e to edit, Esc to close.";

#[derive(Debug, Clone)]
pub struct StatusLine {
    message: String,
    warning: bool,
}

impl Default for StatusLine {
    fn default() -> Self {
        Self {
            message: READY_STATUS.to_string(),
            warning: false,
        }
    }
}

impl StatusLine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_raw(&mut self, msg: impl Into<String>) {
        self.message = msg.into();
        self.warning = false;
    }

    pub fn warn(&mut self, msg: impl Into<String>) {
        self.message = msg.into();
        self.warning = true;
    }

    pub fn ready(&mut self) {
        self.set_raw(READY_STATUS);
    }

    pub fn edit_mode(&mut self, editing: bool) {
        if editing {
            self.set_raw("Editing. a add • d delete • +/- zoom");
        } else {
            self.ready();
        }
    }

    pub fn edit_mode_required(&mut self) {
        self.warn("Press e to enter edit mode first");
    }

    pub fn awaiting_removal(&mut self) {
        self.set_raw(format!("{REMOVE_IMAGE_PROMPT} (y/n)"));
    }

    pub fn image_added(&mut self, save: &SaveOutcome) {
        self.saved("Image added", save);
    }

    pub fn removal(&mut self, outcome: &RemoveOutcome) {
        match outcome {
            RemoveOutcome::Removed { remaining, save } => {
                self.saved(&format!("Image deleted, {remaining} left"), save);
            }
            RemoveOutcome::Declined => self.set_raw("Kept image"),
        }
    }

    pub fn zoomed(&mut self, scale: f64, save: Option<&SaveOutcome>) {
        let label = format!("Zoom {:.0}%", scale * 100.0);
        match save {
            Some(save) => self.saved(&label, save),
            None => self.set_raw(label),
        }
    }

    /// Quota failures surface as warnings; the edit itself stays in memory.
    fn saved(&mut self, label: &str, save: &SaveOutcome) {
        match save.warning() {
            Some(warning) => self.warn(format!("{label}. {warning}")),
            None => self.set_raw(label),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn is_warning(&self) -> bool {
        self.warning
    }
}

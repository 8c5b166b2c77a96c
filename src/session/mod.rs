mod confirm;
mod edit;
mod lightbox;

pub use confirm::{Confirm, FixedAnswer, REMOVE_IMAGE_PROMPT, RESET_PROMPT};
pub use edit::{EditError, EditSession};
pub use lightbox::{
    GalleryError, Lightbox, LightboxSession, RemoveOutcome, WHEEL_COOLDOWN, WheelGate,
};

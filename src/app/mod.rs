mod browser;
pub(crate) mod input;
pub(crate) mod keymap;
mod options;
mod runtime;
mod status;
mod terminal;

pub use browser::GalleryBrowser;
pub use input::LightboxAction;
pub use keymap::{Keymap, KeymapContext};
pub use options::BrowserOptions;

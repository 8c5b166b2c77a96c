#![deny(rust_2018_idioms)]

//! Path-addressed editing of portfolio content with persistent storage and a
//! terminal lightbox for browsing and curating image series.

mod app;
pub mod domain;
pub mod io;
mod presentation;
pub mod session;
pub mod store;

pub use app::{BrowserOptions, GalleryBrowser, Keymap, KeymapContext, LightboxAction};
pub use domain::{FieldPath, ImageEntry, PathSegment, PortfolioContent, default_document};
pub use io::{FileStorage, MemoryStorage, SaveOutcome, Storage};
pub use session::{Confirm, EditError, EditSession, FixedAnswer, GalleryError, Lightbox};
pub use store::PathError;

pub mod prelude {
    pub use super::{
        BrowserOptions, Confirm, EditSession, FieldPath, FileStorage, GalleryBrowser, Lightbox,
        MemoryStorage, Storage, field_path,
    };
}

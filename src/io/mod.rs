mod format;
pub mod image_file;
mod output;
pub mod persistence;
pub mod storage;

pub use format::DocumentFormat;
pub use image_file::{InlineImage, MAX_UPLOAD_BYTES, UploadError, encode_image_file};
pub use output::{ExportOptions, ExportTarget, export_document, render_document};
pub use persistence::{LoadOrigin, Loaded, Persistence, SaveOutcome, storage_key};
pub use storage::{FileStorage, MemoryStorage, Storage, StorageError};

use std::path::{Path, PathBuf};

use base64::{Engine as _, engine::general_purpose::STANDARD};
use thiserror::Error;

use crate::domain::image::human_size;

/// Largest file accepted for inline embedding; a file of exactly this size is
/// accepted.
pub const MAX_UPLOAD_BYTES: u64 = 2 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("{} is {}; images must be under {}", .path.display(), size_label(.size), size_label(.limit))]
    TooLarge { path: PathBuf, size: u64, limit: u64 },
    #[error("{} is not a supported image type", .path.display())]
    UnsupportedType { path: PathBuf },
    #[error("could not read {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

fn size_label(bytes: &u64) -> String {
    human_size(*bytes)
}

/// A file encoded into a self-contained `data:` URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineImage {
    pub mime: &'static str,
    pub byte_len: usize,
    pub data_url: String,
}

pub fn mime_for_path(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    let mime = match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "avif" => "image/avif",
        _ => return None,
    };
    Some(mime)
}

pub fn encode_bytes(mime: &'static str, bytes: &[u8]) -> InlineImage {
    InlineImage {
        mime,
        byte_len: bytes.len(),
        data_url: format!("data:{mime};base64,{}", STANDARD.encode(bytes)),
    }
}

/// Reads `path` and encodes it for storage in an image entry's `url`.
///
/// Type and size are checked before any bytes are read, so a rejected file
/// costs one `stat`.
pub async fn encode_image_file(path: impl AsRef<Path>) -> Result<InlineImage, UploadError> {
    let path = path.as_ref();
    let mime = mime_for_path(path).ok_or_else(|| UploadError::UnsupportedType {
        path: path.to_path_buf(),
    })?;
    let read_err = |source| UploadError::Read {
        path: path.to_path_buf(),
        source,
    };
    let size = tokio::fs::metadata(path).await.map_err(read_err)?.len();
    if size > MAX_UPLOAD_BYTES {
        return Err(UploadError::TooLarge {
            path: path.to_path_buf(),
            size,
            limit: MAX_UPLOAD_BYTES,
        });
    }
    let bytes = tokio::fs::read(path).await.map_err(read_err)?;
    tracing::debug!(path = %path.display(), bytes = bytes.len(), mime, "encoded image file");
    Ok(encode_bytes(mime, &bytes))
}

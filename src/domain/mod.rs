pub mod content;
pub mod image;
mod path;

pub use content::{
    MAX_IMAGES_PER_SERIES, MIN_IMAGES_PER_SERIES, PortfolioContent, SchemaViolation,
    content_schema, default_document, validate_document,
};
pub use image::{ImageEntry, ImageSource, MAX_SCALE, MIN_SCALE, SCALE_STEP, clamp_scale};
pub use path::{FieldPath, PathParseError, PathSegment};

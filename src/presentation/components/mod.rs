mod confirm;
mod footer;
mod header;
mod image;
mod layout;

pub use confirm::render_confirm;
pub use footer::render_footer;
pub use header::render_header;
pub use image::render_image_card;

mod components;
mod view;

pub use view::{ImageCard, LightboxView, draw};

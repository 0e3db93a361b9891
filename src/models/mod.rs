pub mod image_item;
pub mod placement;

pub use image_item::*;
pub use placement::*;

//! Traits the host page implements so controllers can read geometry and
//! write styles without knowing anything about the DOM.

use crate::models::ImageItem;
use crate::slideshow::ActiveSink;

/// How a deferred image should be revealed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayMode {
    /// Cover the wrapper, cropping as needed.
    Fill,
    /// Natural size, no cropping.
    Natural,
}

/// The host's image loader.
pub trait ImageDisplay {
    /// Reveal a previously deferred image.
    fn load(&self, correlation_id: &str, mode: DisplayMode);
}

/// Inline styles for one laid-out grid item.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ItemStyle {
    pub left_px: f32,
    pub top_px: f32,
    pub width_px: f32,
    /// Bottom padding on the image wrapper, as a percentage of its width.
    pub padding_bottom_percent: f32,
}

/// A container of images that can be positioned absolutely.
pub trait LayoutSurface {
    fn container_width(&self) -> f32;

    /// Snapshot of the images currently in the container, in document order.
    fn items(&self) -> Vec<ImageItem>;

    fn place_item(&mut self, index: usize, style: &ItemStyle);

    fn clear_item(&mut self, index: usize);

    /// `None` removes the explicit height.
    fn set_container_height(&mut self, height_px: Option<f32>);
}

/// A gallery grid whose items start hidden and are revealed after layout.
pub trait GallerySurface: LayoutSurface {
    /// Indices of items still hidden, in reveal order.
    fn hidden_items(&self) -> Vec<usize>;

    fn reveal_item(&mut self, index: usize);

    /// Shows or hides the caption overlay of one item.
    fn set_caption_visible(&mut self, index: usize, visible: bool);
}

/// The index page: image containers plus their navigation links.
pub trait IndexSurface: ActiveSink {
    /// Hide the collection description.
    fn set_hide_desc(&mut self, hidden: bool);

    fn set_animation_paused(&mut self, paused: bool);

    fn set_nav_hovered(&mut self, hovered: bool);

    /// Pins the index to the viewport height.
    fn set_height(&mut self, height_px: f32);

    fn set_has_touch(&mut self, has_touch: bool);
}

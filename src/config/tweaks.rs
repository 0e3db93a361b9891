//! Names of the site tweaks the controllers read, and typed readers for them.

use super::ConfigStore;
use crate::error::{Error, Result};

pub const GALLERY_STYLE: &str = "tweak-gallery-style";
pub const GALLERY_GUTTER: &str = "tweak-gallery-gutter";
pub const FULL_WIDTH_FIRST_LANDSCAPE: &str = "tweak-full-width-first-landscape";
pub const SHOW_GALLERY_IMAGE_CAPTIONS: &str = "tweak-show-gallery-image-captions";
pub const SITE_OUTER_PADDING: &str = "tweak-site-outer-padding";
pub const GALLERY_TITLE_OVERLAY: &str = "tweak-gallery-title-overlay";

pub const INDEX_SLIDESHOW_ON: &str = "tweak-index-slideshow-on";
pub const INDEX_SLIDESHOW_TOUCH_ON: &str = "tweak-index-slideshow-touch-on";
pub const INDEX_SLIDESHOW_DELAY: &str = "tweak-index-slideshow-delay";
/// Despite the name, this decides whether the title card is part of the index.
pub const INDEX_INACTIVE_ON_LOAD: &str = "tweak-index-inactive-on-load";
pub const HIDE_INDEX_DESC_ON_HOVER: &str = "tweak-hide-index-desc-on-hover";

pub const DISPLAY_SOCIAL_ICONS: &str = "tweak-display-social-icons";
pub const CART_LINK_DISPLAY: &str = "tweak-cart-link-display";
pub const USER_ACCOUNT_LINK_POSITION: &str = "tweak-user-account-link-position";
pub const HEADER_ELEMENT_SPACING: &str = "tweak-header-element-spacing";

/// Gallery tweaks that change the layout itself. The others in
/// [`GALLERY_WATCHED`] only affect captions.
pub const GALLERY_RENDER_TWEAKS: &[&str] = &[
    GALLERY_STYLE,
    GALLERY_GUTTER,
    SITE_OUTER_PADDING,
    FULL_WIDTH_FIRST_LANDSCAPE,
];

pub const GALLERY_WATCHED: &[&str] = &[
    GALLERY_GUTTER,
    GALLERY_STYLE,
    FULL_WIDTH_FIRST_LANDSCAPE,
    SHOW_GALLERY_IMAGE_CAPTIONS,
    SITE_OUTER_PADDING,
    GALLERY_TITLE_OVERLAY,
];

pub const INDEX_GALLERY_WATCHED: &[&str] = &[
    SITE_OUTER_PADDING,
    INDEX_SLIDESHOW_ON,
    INDEX_SLIDESHOW_DELAY,
    INDEX_INACTIVE_ON_LOAD,
];

pub const INDEX_NAVIGATION_WATCHED: &[&str] = &[
    INDEX_INACTIVE_ON_LOAD,
    INDEX_SLIDESHOW_ON,
    HIDE_INDEX_DESC_ON_HOVER,
];

pub const HEADER_WATCHED: &[&str] = &[
    "tweak-site-title-font",
    "tweak-site-tagline-font",
    "tweak-nav-font",
    "tweak-logo-height",
    "tweak-header-outer-padding",
    HEADER_ELEMENT_SPACING,
    DISPLAY_SOCIAL_ICONS,
    "tweak-social-icons-on-right",
    "tweak-nav-link-spacing",
    "tweak-nav-style",
    "tweak-menu-icon-size",
    "tweak-template-social-icon-size",
    CART_LINK_DISPLAY,
];

/// Missing values read as an empty string.
pub fn read_string(store: &dyn ConfigStore, key: &str) -> String {
    store.get(key).unwrap_or_default()
}

/// Enumerated values are compared lowercase.
pub fn read_lower(store: &dyn ConfigStore, key: &str) -> String {
    read_string(store, key).trim().to_lowercase()
}

/// Only the exact string `"true"` is true.
pub fn read_bool(store: &dyn ConfigStore, key: &str) -> bool {
    read_string(store, key) == "true"
}

/// Reads a numeric tweak. Unit suffixes such as `"2.5vw"` are ignored.
pub fn read_number(store: &dyn ConfigStore, key: &str) -> Result<f32> {
    let raw = read_string(store, key);
    let numeric: String = raw
        .trim()
        .chars()
        .take_while(|c| c.is_ascii_digit() || matches!(c, '.' | '-' | '+'))
        .collect();
    numeric
        .parse::<f32>()
        .ok()
        .filter(|n| n.is_finite())
        .ok_or_else(|| Error::InvalidTweak {
            key: key.to_string(),
            value: raw,
        })
}

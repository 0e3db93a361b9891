//! Justified row layout for image galleries, plus the slideshow and page
//! controllers that drive it from live site configuration.

pub mod config;
pub mod controllers;
pub mod error;
pub mod image_loader;
pub mod layout;
pub mod models;
pub mod schedule;
pub mod slideshow;
pub mod surface;
pub mod ui_state;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use error::{Error, Result};

use thiserror::Error;

/// Errors raised by the layout engine, the slideshow state machine and the
/// controllers that wire them to a host page.
///
/// All of these are caller contract violations: they are deterministic for a
/// given input and are never retried.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error("column count must be at least 1, got {0}")]
    InvalidColumns(usize),

    #[error("gutter must be a finite, non-negative pixel value, got {0}")]
    InvalidGutter(f32),

    #[error("container width must be a finite value greater than zero, got {0}")]
    InvalidContainerWidth(f32),

    #[error("row breaks cover {covered} of {items} items")]
    BreaksMismatch { items: usize, covered: usize },

    #[error("cannot {op} a slideshow that is {state}")]
    InvalidTransition {
        op: &'static str,
        state: &'static str,
    },

    #[error("required element is missing: {0}")]
    MissingElement(&'static str),

    #[error("tweak {key} has an unusable value {value:?}")]
    InvalidTweak { key: String, value: String },
}

pub type Result<T> = std::result::Result<T, Error>;

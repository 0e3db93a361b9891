//! Timed slide rotation and the single-active marking it drives.

pub mod active_set;
pub mod rotator;

pub use active_set::{find_link_for, Activation, ActiveSetCoordinator, ActiveSink};
pub use rotator::{RotatorState, SlideChange, SlideChangedCallback, SlideRotator};

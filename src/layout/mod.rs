pub mod autorows;
pub mod layout_cache;
pub mod rows;

pub use autorows::Autorows;
pub use layout_cache::{CachedLayoutComputer, LayoutCache};
pub use rows::{compute_breaks, compute_layout, place_rows, LayoutConfig, RowBreak};

use super::ImageItem;

/// Where one image lands inside its row.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedItem {
    /// Position of the item in the input sequence.
    pub index: usize,
    pub item: ImageItem,
    pub width_px: f32,
    pub left_px: f32,
    /// Rendered height (width applied to the item's own aspect ratio).
    pub height_px: f32,
}

impl PlacedItem {
    pub fn right_px(&self) -> f32 {
        self.left_px + self.width_px
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RowPlacement {
    pub row_index: u32,
    pub top_px: f32,
    pub row_height_px: f32,
    /// Items left-to-right.
    pub items: Vec<PlacedItem>,
}

impl RowPlacement {
    pub fn new(row_index: u32, top_px: f32, row_height_px: f32, items: Vec<PlacedItem>) -> Self {
        Self {
            row_index,
            top_px,
            row_height_px,
            items,
        }
    }

    pub fn bottom_px(&self) -> f32 {
        self.top_px + self.row_height_px
    }

    /// A row holding a single image stretched across the container.
    pub fn is_full_width(&self) -> bool {
        self.items.len() == 1
    }
}

/// Output of one layout pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayoutResult {
    pub placements: Vec<RowPlacement>,
    pub total_height_px: f32,
}

impl LayoutResult {
    pub fn is_empty(&self) -> bool {
        self.placements.is_empty()
    }

    pub fn item_count(&self) -> usize {
        self.placements.iter().map(|row| row.items.len()).sum()
    }

    /// All placed items in input order.
    pub fn items(&self) -> impl Iterator<Item = &PlacedItem> {
        self.placements.iter().flat_map(|row| row.items.iter())
    }
}

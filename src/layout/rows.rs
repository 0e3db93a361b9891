use crate::error::{Error, Result};
use crate::models::{ImageItem, LayoutResult, PlacedItem, RowPlacement};

/// Reference height every image in a row is scaled to before widths are
/// compared. Any constant works as long as it is used consistently.
const NORMALIZED_HEIGHT: f32 = 600.0;

/// Immutable configuration for one layout pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutConfig {
    columns: usize,
    gutter_px: f32,
    full_width_landscape_lead_in: bool,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            columns: 4,
            gutter_px: 5.0,
            full_width_landscape_lead_in: false,
        }
    }
}

impl LayoutConfig {
    /// Validates the configuration; a zero column count or a negative gutter
    /// is rejected up front instead of producing a degenerate layout.
    pub fn new(columns: usize, gutter_px: f32, full_width_landscape_lead_in: bool) -> Result<Self> {
        if columns == 0 {
            return Err(Error::InvalidColumns(columns));
        }
        if !gutter_px.is_finite() || gutter_px < 0.0 {
            return Err(Error::InvalidGutter(gutter_px));
        }
        Ok(Self {
            columns,
            gutter_px,
            full_width_landscape_lead_in,
        })
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn gutter_px(&self) -> f32 {
        self.gutter_px
    }

    pub fn full_width_landscape_lead_in(&self) -> bool {
        self.full_width_landscape_lead_in
    }

    /// Same configuration with a new gutter, as needed when the viewport
    /// changes and a vw-based gutter resolves to a different pixel value.
    pub fn with_gutter(self, gutter_px: f32) -> Result<Self> {
        Self::new(self.columns, gutter_px, self.full_width_landscape_lead_in)
    }
}

/// Row boundaries for a list of items. Breaks only depend on the items and on
/// the column/landscape settings, never on the container width or gutter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowBreak {
    /// Start index in the items array (inclusive)
    pub start_index: usize,
    /// End index in the items array (exclusive)
    pub end_index: usize,
    /// The single item spans the whole container
    pub full_width: bool,
}

impl RowBreak {
    pub fn len(&self) -> usize {
        self.end_index - self.start_index
    }

    pub fn is_empty(&self) -> bool {
        self.start_index == self.end_index
    }
}

/// Computes a complete layout.
///
/// # Algorithm
/// 1. Walk the items with a cursor, taking `columns` items as a candidate row.
/// 2. When the lead-in flag is set and the first candidate is landscape, or
///    only one item is left, that item becomes a full-width row on its own.
/// 3. Otherwise every candidate is scaled to a shared height and gets a width
///    proportional to its scaled width, so the row spans the container.
/// 4. Rows stack top to bottom separated by one gutter.
///
/// This is a pure function of its inputs.
pub fn compute_layout(
    items: &[ImageItem],
    container_width_px: f32,
    config: &LayoutConfig,
) -> Result<LayoutResult> {
    let breaks = compute_breaks(items, config);
    place_rows(items, &breaks, container_width_px, config)
}

/// Partitions `items` into rows.
pub fn compute_breaks(items: &[ImageItem], config: &LayoutConfig) -> Vec<RowBreak> {
    let mut breaks = Vec::with_capacity(items.len() / config.columns + 1);
    let mut start = 0usize;

    while start < items.len() {
        let remaining = items.len() - start;
        let lead = &items[start];

        // Only the first candidate of a row is checked for the landscape rule.
        if remaining == 1 || (config.full_width_landscape_lead_in && lead.is_landscape()) {
            breaks.push(RowBreak {
                start_index: start,
                end_index: start + 1,
                full_width: true,
            });
            start += 1;
        } else {
            let end = start.saturating_add(config.columns).min(items.len());
            breaks.push(RowBreak {
                start_index: start,
                end_index: end,
                full_width: false,
            });
            start = end;
        }
    }

    breaks
}

/// Turns row breaks into pixel placements for a given container width.
///
/// The breaks must cover `items` exactly, in order, as
/// [`compute_breaks`] produces them for the same list.
pub fn place_rows(
    items: &[ImageItem],
    breaks: &[RowBreak],
    container_width_px: f32,
    config: &LayoutConfig,
) -> Result<LayoutResult> {
    if !container_width_px.is_finite() || container_width_px <= 0.0 {
        return Err(Error::InvalidContainerWidth(container_width_px));
    }
    check_breaks(items.len(), breaks)?;

    let gutter = config.gutter_px;
    let mut placements = Vec::with_capacity(breaks.len());
    let mut top = 0.0f32;

    for (row_index, brk) in breaks.iter().enumerate() {
        let row_items = &items[brk.start_index..brk.end_index];
        let placed = if brk.full_width {
            full_width_row(brk.start_index, &row_items[0], container_width_px)
        } else {
            justified_row(brk.start_index, row_items, container_width_px, gutter, config.columns)
        };
        let row_height = placed.iter().fold(0.0f32, |acc, p| acc.max(p.height_px));

        placements.push(RowPlacement::new(row_index as u32, top, row_height, placed));
        top += row_height + gutter;
    }

    let total_height_px = if placements.is_empty() { 0.0 } else { top - gutter };

    Ok(LayoutResult {
        placements,
        total_height_px,
    })
}

fn check_breaks(item_count: usize, breaks: &[RowBreak]) -> Result<()> {
    let mismatch = |covered| Error::BreaksMismatch {
        items: item_count,
        covered,
    };
    let mut covered = 0usize;
    for brk in breaks {
        let contiguous = brk.start_index == covered && brk.end_index > covered;
        if !contiguous || brk.end_index > item_count {
            return Err(mismatch(covered));
        }
        covered = brk.end_index;
    }
    if covered != item_count {
        return Err(mismatch(covered));
    }
    Ok(())
}

fn full_width_row(index: usize, item: &ImageItem, container_width_px: f32) -> Vec<PlacedItem> {
    vec![PlacedItem {
        index,
        item: item.clone(),
        width_px: container_width_px,
        left_px: 0.0,
        height_px: container_width_px * item.ratio_percent() / 100.0,
    }]
}

/// Width of each item relative to the whole row once all heights match.
fn row_width_ratios(items: &[ImageItem]) -> Vec<f32> {
    let scaled: Vec<f32> = items
        .iter()
        .map(|item| {
            let (w, h) = item.effective_dimensions();
            w * (NORMALIZED_HEIGHT / h)
        })
        .collect();
    let total: f32 = scaled.iter().sum();
    scaled.into_iter().map(|w| w / total).collect()
}

fn justified_row(
    start_index: usize,
    items: &[ImageItem],
    container_width_px: f32,
    gutter: f32,
    columns: usize,
) -> Vec<PlacedItem> {
    // Always a full row's worth of gutters, so a short tail row ends short.
    let gutters = gutter * columns.saturating_sub(1) as f32;
    let available = (container_width_px - gutters).max(0.0);
    let ratios = row_width_ratios(items);

    let mut left = 0.0f32;
    items
        .iter()
        .zip(ratios)
        .enumerate()
        .map(|(offset, (item, ratio))| {
            let width = ratio * available;
            let placed = PlacedItem {
                index: start_index + offset,
                item: item.clone(),
                width_px: width,
                left_px: left,
                height_px: width / item.aspect_ratio(),
            };
            // Flooring keeps the last item's right edge inside the container.
            left += (width + gutter).floor();
            placed
        })
        .collect()
}

/// Sum of row heights plus the gaps between them.
pub fn total_height(rows: &[RowPlacement], row_gap: f32) -> f32 {
    if rows.is_empty() {
        return 0.0;
    }

    let heights_sum: f32 = rows.iter().map(|r| r.row_height_px).sum();
    let gaps_sum = (rows.len().saturating_sub(1)) as f32 * row_gap;
    heights_sum + gaps_sum
}

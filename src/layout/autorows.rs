use tracing::debug;

use super::layout_cache::CachedLayoutComputer;
use super::rows::LayoutConfig;
use crate::error::Result;
use crate::models::LayoutResult;
use crate::surface::{DisplayMode, ImageDisplay, ItemStyle, LayoutSurface};

/// Row layout bound to a surface.
///
/// Computes placements for whatever the surface currently holds, writes them
/// out, and remembers what it wrote so [`Autorows::reset`] can undo exactly
/// that.
pub struct Autorows {
    config: LayoutConfig,
    auto_load_images: bool,
    computer: CachedLayoutComputer,
    applied: Option<LayoutResult>,
}

impl Autorows {
    pub fn new(config: LayoutConfig) -> Self {
        Self {
            config,
            auto_load_images: false,
            computer: CachedLayoutComputer::new(),
            applied: None,
        }
    }

    /// Load every image through the host loader once a pass has been applied.
    pub fn with_auto_load(mut self, auto_load_images: bool) -> Self {
        self.auto_load_images = auto_load_images;
        self
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Takes effect on the next [`Autorows::layout`] call.
    pub fn set_config(&mut self, config: LayoutConfig) {
        self.config = config;
    }

    pub fn applied(&self) -> Option<&LayoutResult> {
        self.applied.as_ref()
    }

    /// Runs one layout pass.
    ///
    /// The previous placements are cleared and the new ones fully written
    /// before any image is asked to load, so loading never sees stale
    /// geometry.
    pub fn layout<S>(
        &mut self,
        surface: &mut S,
        display: &dyn ImageDisplay,
    ) -> Result<&LayoutResult>
    where
        S: LayoutSurface + ?Sized,
    {
        let items = surface.items();
        let result = self
            .computer
            .compute(&items, surface.container_width(), &self.config)?;

        self.reset(surface);

        for row in &result.placements {
            for placed in &row.items {
                surface.place_item(
                    placed.index,
                    &ItemStyle {
                        left_px: placed.left_px,
                        top_px: row.top_px,
                        width_px: placed.width_px,
                        padding_bottom_percent: placed.item.ratio_percent(),
                    },
                );
            }
        }
        surface.set_container_height(Some(result.total_height_px));

        debug!(
            rows = result.placements.len(),
            items = result.item_count(),
            total_height = result.total_height_px,
            "Applied row layout"
        );

        if self.auto_load_images {
            for placed in result.items() {
                display.load(&placed.item.correlation_id, DisplayMode::Natural);
            }
        }

        Ok(&*self.applied.insert(result))
    }

    /// Removes every style written by the last pass.
    pub fn reset<S>(&mut self, surface: &mut S)
    where
        S: LayoutSurface + ?Sized,
    {
        if let Some(previous) = self.applied.take() {
            for placed in previous.items() {
                surface.clear_item(placed.index);
            }
            surface.set_container_height(None);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::test_helpers::{Op, RecordingDisplay, RecordingSurface};

    fn surface() -> RecordingSurface {
        RecordingSurface::with_dimensions(
            1000.0,
            &[(800.0, 600.0), (600.0, 800.0), (1000.0, 500.0)],
        )
    }

    #[test]
    fn test_layout_writes_styles_then_loads() {
        let mut surface = surface();
        let display = RecordingDisplay::default();
        let config = LayoutConfig::new(2, 10.0, false).unwrap();
        let mut rows = Autorows::new(config).with_auto_load(true);

        let total = rows.layout(&mut surface, &display).unwrap().total_height_px;

        assert_eq!(surface.styles.len(), 3);
        assert_eq!(surface.container_height, Some(total));
        // Last item is alone on its row.
        let tail = surface.styles[&2];
        assert_eq!(tail.width_px, 1000.0);
        assert_eq!(tail.padding_bottom_percent, 50.0);

        assert_eq!(display.loaded(), vec!["0", "1", "2"]);
        assert!(display.modes().iter().all(|m| *m == DisplayMode::Natural));
    }

    #[test]
    fn test_relayout_clears_before_placing() {
        let mut surface = surface();
        let display = RecordingDisplay::default();
        let mut rows = Autorows::new(LayoutConfig::new(2, 10.0, false).unwrap());

        rows.layout(&mut surface, &display).unwrap();
        surface.ops.clear();
        rows.layout(&mut surface, &display).unwrap();

        let first_place = surface.ops.iter().position(|op| matches!(op, Op::Place(_))).unwrap();
        let last_clear = surface.ops.iter().rposition(|op| matches!(op, Op::Clear(_))).unwrap();
        assert!(last_clear < first_place);
        assert!(display.loaded().is_empty());
    }

    #[test]
    fn test_reset_is_inverse_of_apply() {
        let mut surface = surface();
        let display = RecordingDisplay::default();
        let mut rows = Autorows::new(LayoutConfig::new(2, 10.0, true).unwrap());

        rows.layout(&mut surface, &display).unwrap();
        rows.reset(&mut surface);

        assert!(surface.styles.is_empty());
        assert_eq!(surface.container_height, None);
        assert!(rows.applied().is_none());
    }

    #[test]
    fn test_failed_pass_keeps_previous_layout() {
        let mut surface = surface();
        let display = RecordingDisplay::default();
        let mut rows = Autorows::new(LayoutConfig::default());
        rows.layout(&mut surface, &display).unwrap();

        surface.width = 0.0;
        let err = rows.layout(&mut surface, &display).unwrap_err();
        assert_eq!(err, Error::InvalidContainerWidth(0.0));
        assert_eq!(surface.styles.len(), 3);
    }
}

/// Ratio percentage of a square image (height / width * 100).
pub const SQUARE_RATIO_PERCENT: f32 = 100.0;

/// One image taking part in a row layout.
///
/// Dimensions only need to share a unit; the layout engine cares about the
/// aspect ratio. A zero, negative or non-finite dimension makes the item
/// behave as a square.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageItem {
    /// Identifier linking the image to its navigation link. Unique within one
    /// layout, not globally.
    pub correlation_id: String,
    pub intrinsic_width: f32,
    pub intrinsic_height: f32,
}

impl ImageItem {
    pub fn new(
        correlation_id: impl Into<String>,
        intrinsic_width: f32,
        intrinsic_height: f32,
    ) -> Self {
        Self {
            correlation_id: correlation_id.into(),
            intrinsic_width,
            intrinsic_height,
        }
    }

    /// Create a square item, used when the host has no dimensions yet.
    pub fn square(correlation_id: impl Into<String>) -> Self {
        Self::new(correlation_id, 1.0, 1.0)
    }

    /// Parse the host's `"<width>x<height>"` dimension attribute.
    ///
    /// Placeholder images get their dimensions late and report an empty
    /// string, so anything unparseable falls back to a square.
    pub fn from_dimensions_attr(correlation_id: impl Into<String>, attr: &str) -> Self {
        let mut parts = attr.trim().splitn(2, 'x');
        let width = parts.next().and_then(|w| w.trim().parse::<f32>().ok());
        let height = parts.next().and_then(|h| h.trim().parse::<f32>().ok());
        match (width, height) {
            (Some(w), Some(h)) => Self::new(correlation_id, w, h),
            _ => Self::square(correlation_id),
        }
    }

    fn has_valid_dimensions(&self) -> bool {
        self.intrinsic_width.is_finite()
            && self.intrinsic_height.is_finite()
            && self.intrinsic_width > 0.0
            && self.intrinsic_height > 0.0
    }

    /// Width and height used for layout math, substituting a square when the
    /// source data is unusable.
    pub fn effective_dimensions(&self) -> (f32, f32) {
        if self.has_valid_dimensions() {
            (self.intrinsic_width, self.intrinsic_height)
        } else {
            (1.0, 1.0)
        }
    }

    /// Width divided by height.
    pub fn aspect_ratio(&self) -> f32 {
        let (w, h) = self.effective_dimensions();
        w / h
    }

    /// Height as a percentage of width: 100 is square, below 100 is
    /// landscape, above 100 is portrait.
    pub fn ratio_percent(&self) -> f32 {
        if !self.has_valid_dimensions() {
            return SQUARE_RATIO_PERCENT;
        }
        100.0 * self.intrinsic_height / self.intrinsic_width
    }

    pub fn is_landscape(&self) -> bool {
        self.ratio_percent() < SQUARE_RATIO_PERCENT
    }
}

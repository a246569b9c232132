use serde::{Deserialize, Serialize};

/// Slack applied to both scroll edges to absorb fractional layout rounding.
pub const EDGE_TOLERANCE_PX: f64 = 1.0;

/// Last-resort advance distance: one 320px card plus a 24px gap.
pub const FALLBACK_ADVANCE_PX: f64 = 344.0;

/// Horizontal scroll geometry of a strip, read fresh from the host.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScrollMetrics {
    /// Current horizontal scroll offset.
    pub offset: f64,
    /// Total scrollable content width.
    pub scroll_width: f64,
    /// Visible (client) width of the strip.
    pub client_width: f64,
}

impl ScrollMetrics {
    #[must_use]
    pub fn new(offset: f64, scroll_width: f64, client_width: f64) -> Self {
        Self {
            offset,
            scroll_width,
            client_width,
        }
    }

    /// Largest reachable offset; zero when content fits.
    #[must_use]
    pub fn max_offset(self) -> f64 {
        let max = self.scroll_width - self.client_width;
        if max.is_finite() && max > 0.0 { max } else { 0.0 }
    }

    #[must_use]
    pub fn can_scroll_backward(self) -> bool {
        self.offset > EDGE_TOLERANCE_PX
    }

    #[must_use]
    pub fn can_scroll_forward(self) -> bool {
        self.offset + self.client_width < self.scroll_width - EDGE_TOLERANCE_PX
    }

    /// True once the strip sits within tolerance of its maximum offset.
    #[must_use]
    pub fn is_at_end(self) -> bool {
        self.offset >= self.max_offset() - EDGE_TOLERANCE_PX
    }

    /// Offset clamped into `[0, max_offset]`, the way a scroll surface does.
    #[must_use]
    pub fn clamp_offset(self, offset: f64) -> f64 {
        if !offset.is_finite() {
            return self.offset;
        }
        offset.clamp(0.0, self.max_offset())
    }
}

/// Resolves the distance covered by one "card" step.
///
/// Uses `card_width + gap` when the card is measurable, otherwise
/// `client_width * fallback_ratio`, otherwise [`FALLBACK_ADVANCE_PX`].
/// The returned value is always finite and positive.
#[must_use]
pub fn card_advance_distance(
    card_width: Option<f64>,
    gap: Option<f64>,
    client_width: f64,
    fallback_ratio: f64,
) -> f64 {
    let gap = gap.filter(|g| g.is_finite() && *g >= 0.0).unwrap_or(0.0);
    if let Some(width) = card_width.filter(|w| w.is_finite() && *w > 0.0) {
        return width + gap;
    }

    let relative = client_width * fallback_ratio;
    if relative.is_finite() && relative > 0.0 {
        relative
    } else {
        FALLBACK_ADVANCE_PX
    }
}

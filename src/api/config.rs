use serde::{Deserialize, Serialize};

use crate::error::{CarouselError, CarouselResult};
use crate::interaction::ArrowPolicy;

/// Markup selectors used to discover carousels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CarouselSelectors {
    /// Containers scanned by `attach_all`.
    pub section: String,
    /// Scrollable strip inside a container.
    pub strip: String,
    /// Cards inside the strip.
    pub card: String,
}

impl Default for CarouselSelectors {
    fn default() -> Self {
        Self {
            section: ".related-posts".to_owned(),
            strip: ".blog-cards-container".to_owned(),
            card: ".blog-card".to_owned(),
        }
    }
}

/// Class names applied to injected elements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CarouselClasses {
    pub wrapper: String,
    pub control: String,
    pub previous: String,
    pub next: String,
    /// Toggled on controls that are currently shown.
    pub control_visible: String,
}

impl Default for CarouselClasses {
    fn default() -> Self {
        Self {
            wrapper: "blog-cards-wrapper".to_owned(),
            control: "scroll-arrow".to_owned(),
            previous: "scroll-left".to_owned(),
            next: "scroll-right".to_owned(),
            control_visible: "is-visible".to_owned(),
        }
    }
}

/// Glyphs and accessible labels of the injected controls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlLabels {
    pub previous_glyph: String,
    pub previous_aria_label: String,
    pub next_glyph: String,
    pub next_aria_label: String,
}

impl Default for ControlLabels {
    fn default() -> Self {
        Self {
            previous_glyph: "\u{2039}".to_owned(),
            previous_aria_label: "Scroll left".to_owned(),
            next_glyph: "\u{203a}".to_owned(),
            next_aria_label: "Scroll right".to_owned(),
        }
    }
}

/// Per-instance timing overrides accepted by `attach_carousel_with`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AttachOptions {
    pub auto_advance_ms: u32,
    pub resume_delay_ms: u32,
    /// `None` disables visibility observation; the carousel counts as always
    /// visible.
    pub visibility_threshold: Option<f64>,
}

impl AttachOptions {
    pub fn validate(self) -> CarouselResult<Self> {
        if self.auto_advance_ms == 0 {
            return Err(CarouselError::InvalidConfig(
                "auto advance period must be > 0 ms".to_owned(),
            ));
        }
        if let Some(threshold) = self.visibility_threshold {
            if !threshold.is_finite() || !(0.0..=1.0).contains(&threshold) {
                return Err(CarouselError::InvalidConfig(format!(
                    "visibility threshold must be within [0, 1], got {threshold}"
                )));
            }
        }
        Ok(self)
    }
}

/// Controller configuration.
///
/// Serializable so pages can ship carousel setup as JSON next to their
/// markup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarouselConfig {
    #[serde(default = "default_auto_advance")]
    pub auto_advance: bool,
    #[serde(default = "default_auto_advance_ms")]
    pub auto_advance_ms: u32,
    #[serde(default = "default_resume_delay_ms")]
    pub resume_delay_ms: u32,
    #[serde(default = "default_resize_debounce_ms")]
    pub resize_debounce_ms: u32,
    /// Window after a programmatic scroll during which scroll events are
    /// attributed to the controller.
    #[serde(default = "default_scroll_settle_ms")]
    pub scroll_settle_ms: u32,
    #[serde(default = "default_visibility_threshold")]
    pub visibility_threshold: Option<f64>,
    #[serde(default)]
    pub arrow_policy: ArrowPolicy,
    /// Share of the visible strip width scrolled per step when no card can
    /// be measured. A policy default, not a derived constant.
    #[serde(default = "default_fallback_advance_ratio")]
    pub fallback_advance_ratio: f64,
    #[serde(default)]
    pub selectors: CarouselSelectors,
    #[serde(default)]
    pub classes: CarouselClasses,
    #[serde(default)]
    pub labels: ControlLabels,
}

impl Default for CarouselConfig {
    fn default() -> Self {
        Self {
            auto_advance: default_auto_advance(),
            auto_advance_ms: default_auto_advance_ms(),
            resume_delay_ms: default_resume_delay_ms(),
            resize_debounce_ms: default_resize_debounce_ms(),
            scroll_settle_ms: default_scroll_settle_ms(),
            visibility_threshold: default_visibility_threshold(),
            arrow_policy: ArrowPolicy::default(),
            fallback_advance_ratio: default_fallback_advance_ratio(),
            selectors: CarouselSelectors::default(),
            classes: CarouselClasses::default(),
            labels: ControlLabels::default(),
        }
    }
}

impl CarouselConfig {
    #[must_use]
    pub fn with_auto_advance(mut self, enabled: bool) -> Self {
        self.auto_advance = enabled;
        self
    }

    #[must_use]
    pub fn with_auto_advance_ms(mut self, period_ms: u32) -> Self {
        self.auto_advance_ms = period_ms;
        self
    }

    #[must_use]
    pub fn with_resume_delay_ms(mut self, delay_ms: u32) -> Self {
        self.resume_delay_ms = delay_ms;
        self
    }

    #[must_use]
    pub fn with_resize_debounce_ms(mut self, delay_ms: u32) -> Self {
        self.resize_debounce_ms = delay_ms;
        self
    }

    #[must_use]
    pub fn with_scroll_settle_ms(mut self, delay_ms: u32) -> Self {
        self.scroll_settle_ms = delay_ms;
        self
    }

    #[must_use]
    pub fn with_visibility_threshold(mut self, threshold: Option<f64>) -> Self {
        self.visibility_threshold = threshold;
        self
    }

    #[must_use]
    pub fn with_arrow_policy(mut self, policy: ArrowPolicy) -> Self {
        self.arrow_policy = policy;
        self
    }

    #[must_use]
    pub fn with_fallback_advance_ratio(mut self, ratio: f64) -> Self {
        self.fallback_advance_ratio = ratio;
        self
    }

    #[must_use]
    pub fn with_selectors(mut self, selectors: CarouselSelectors) -> Self {
        self.selectors = selectors;
        self
    }

    /// Timing applied to instances attached without explicit options.
    #[must_use]
    pub fn attach_options(&self) -> AttachOptions {
        AttachOptions {
            auto_advance_ms: self.auto_advance_ms,
            resume_delay_ms: self.resume_delay_ms,
            visibility_threshold: self.visibility_threshold,
        }
    }

    pub fn validate(&self) -> CarouselResult<()> {
        self.attach_options().validate()?;
        if !self.fallback_advance_ratio.is_finite()
            || self.fallback_advance_ratio <= 0.0
            || self.fallback_advance_ratio > 1.0
        {
            return Err(CarouselError::InvalidConfig(format!(
                "fallback advance ratio must be within (0, 1], got {}",
                self.fallback_advance_ratio
            )));
        }

        let required = [
            ("selectors.section", &self.selectors.section),
            ("selectors.strip", &self.selectors.strip),
            ("selectors.card", &self.selectors.card),
            ("classes.wrapper", &self.classes.wrapper),
            ("classes.control", &self.classes.control),
            ("classes.previous", &self.classes.previous),
            ("classes.next", &self.classes.next),
            ("classes.control_visible", &self.classes.control_visible),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(CarouselError::InvalidConfig(format!(
                    "{name} must not be empty"
                )));
            }
        }
        for (name, value) in [
            ("classes.wrapper", &self.classes.wrapper),
            ("classes.previous", &self.classes.previous),
            ("classes.next", &self.classes.next),
            ("classes.control_visible", &self.classes.control_visible),
        ] {
            if value.split_whitespace().count() != 1 {
                return Err(CarouselError::InvalidConfig(format!(
                    "{name} must be a single class name"
                )));
            }
        }
        Ok(())
    }

    pub fn from_json_str(input: &str) -> CarouselResult<Self> {
        let config: Self = serde_json::from_str(input).map_err(|e| {
            CarouselError::InvalidData(format!("failed to parse carousel config json: {e}"))
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json_pretty(&self) -> CarouselResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| {
            CarouselError::InvalidData(format!("failed to serialize carousel config: {e}"))
        })
    }
}

fn default_auto_advance() -> bool {
    true
}

fn default_auto_advance_ms() -> u32 {
    4_000
}

fn default_resume_delay_ms() -> u32 {
    4_000
}

fn default_resize_debounce_ms() -> u32 {
    250
}

fn default_scroll_settle_ms() -> u32 {
    1_000
}

fn default_visibility_threshold() -> Option<f64> {
    Some(0.1)
}

fn default_fallback_advance_ratio() -> f64 {
    0.8
}

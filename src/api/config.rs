use serde::{Deserialize, Serialize};

use crate::core::Margin;
use crate::core::coordinate::validate_size;
use crate::error::{ChartError, ChartResult};
use crate::render::Color;

/// Chart construction parameters.
///
/// Values are immutable once a chart holds them; [`ChartConfig::merged`]
/// produces the replacement used by `Chart::update`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChartConfig {
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub margin: Margin,
    #[serde(default = "default_background")]
    pub background: Color,
    #[serde(default = "default_device_pixel_ratio")]
    pub device_pixel_ratio: f64,
    /// Clear non-background layers before every render pass.
    #[serde(default)]
    pub clear_layers_each_frame: bool,
}

impl ChartConfig {
    #[must_use]
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            margin: Margin::default(),
            background: default_background(),
            device_pixel_ratio: default_device_pixel_ratio(),
            clear_layers_each_frame: false,
        }
    }

    #[must_use]
    pub fn with_margin(mut self, margin: Margin) -> Self {
        self.margin = margin;
        self
    }

    #[must_use]
    pub fn with_background(mut self, background: Color) -> Self {
        self.background = background;
        self
    }

    #[must_use]
    pub fn with_device_pixel_ratio(mut self, device_pixel_ratio: f64) -> Self {
        self.device_pixel_ratio = device_pixel_ratio;
        self
    }

    #[must_use]
    pub fn with_clear_layers_each_frame(mut self, enabled: bool) -> Self {
        self.clear_layers_each_frame = enabled;
        self
    }

    pub fn validate(&self) -> ChartResult<()> {
        validate_size(self.width, self.height)?;
        self.margin.validate()?;
        self.background.validate()?;
        if !self.device_pixel_ratio.is_finite() || self.device_pixel_ratio <= 0.0 {
            return Err(ChartError::config(format!(
                "device pixel ratio must be finite and > 0, got {}",
                self.device_pixel_ratio
            )));
        }
        Ok(())
    }

    /// Returns a new validated config with every `Some` field of `update`
    /// applied.
    pub fn merged(&self, update: &ChartConfigUpdate) -> ChartResult<Self> {
        let merged = Self {
            width: update.width.unwrap_or(self.width),
            height: update.height.unwrap_or(self.height),
            margin: update.margin.unwrap_or(self.margin),
            background: update.background.unwrap_or(self.background),
            device_pixel_ratio: update.device_pixel_ratio.unwrap_or(self.device_pixel_ratio),
            clear_layers_each_frame: update
                .clear_layers_each_frame
                .unwrap_or(self.clear_layers_each_frame),
        };
        merged.validate()?;
        Ok(merged)
    }

    pub fn from_json(input: &str) -> ChartResult<Self> {
        let config: Self = serde_json::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json_pretty(&self) -> ChartResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Partial change set for [`ChartConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ChartConfigUpdate {
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub margin: Option<Margin>,
    pub background: Option<Color>,
    pub device_pixel_ratio: Option<f64>,
    pub clear_layers_each_frame: Option<bool>,
}

impl ChartConfigUpdate {
    #[must_use]
    pub fn size(width: f64, height: f64) -> Self {
        Self {
            width: Some(width),
            height: Some(height),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_margin(mut self, margin: Margin) -> Self {
        self.margin = Some(margin);
        self
    }

    #[must_use]
    pub fn with_background(mut self, background: Color) -> Self {
        self.background = Some(background);
        self
    }

    #[must_use]
    pub fn with_device_pixel_ratio(mut self, device_pixel_ratio: f64) -> Self {
        self.device_pixel_ratio = Some(device_pixel_ratio);
        self
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

fn default_background() -> Color {
    Color::WHITE
}

fn default_device_pixel_ratio() -> f64 {
    1.0
}

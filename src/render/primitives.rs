use serde::{Deserialize, Serialize};

use crate::core::{Point, Rect};
use crate::error::{ChartError, ChartResult};

/// RGBA color in normalized 0..=1 channel values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub red: f64,
    pub green: f64,
    pub blue: f64,
    #[serde(default = "opaque")]
    pub alpha: f64,
}

fn opaque() -> f64 {
    1.0
}

impl Color {
    pub const WHITE: Self = Self::rgb(1.0, 1.0, 1.0);
    pub const BLACK: Self = Self::rgb(0.0, 0.0, 0.0);
    pub const TRANSPARENT: Self = Self::rgba(0.0, 0.0, 0.0, 0.0);

    #[must_use]
    pub const fn rgba(red: f64, green: f64, blue: f64, alpha: f64) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    #[must_use]
    pub const fn rgb(red: f64, green: f64, blue: f64) -> Self {
        Self::rgba(red, green, blue, 1.0)
    }

    /// Parses `#rgb`, `#rrggbb` or `#rrggbbaa`.
    pub fn from_hex(hex: &str) -> ChartResult<Self> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        let channel = |range: std::ops::Range<usize>, scale: f64| -> ChartResult<f64> {
            digits
                .get(range)
                .and_then(|part| u8::from_str_radix(part, 16).ok())
                .map(|value| f64::from(value) / scale)
                .ok_or_else(|| ChartError::config(format!("invalid hex color `{hex}`")))
        };
        match digits.len() {
            3 => Ok(Self::rgb(
                channel(0..1, 15.0)?,
                channel(1..2, 15.0)?,
                channel(2..3, 15.0)?,
            )),
            6 => Ok(Self::rgb(
                channel(0..2, 255.0)?,
                channel(2..4, 255.0)?,
                channel(4..6, 255.0)?,
            )),
            8 => Ok(Self::rgba(
                channel(0..2, 255.0)?,
                channel(2..4, 255.0)?,
                channel(4..6, 255.0)?,
                channel(6..8, 255.0)?,
            )),
            _ => Err(ChartError::config(format!("invalid hex color `{hex}`"))),
        }
    }

    pub fn validate(self) -> ChartResult<()> {
        for (channel, value) in [
            ("red", self.red),
            ("green", self.green),
            ("blue", self.blue),
            ("alpha", self.alpha),
        ] {
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                return Err(ChartError::config(format!(
                    "color channel `{channel}` must be finite and in [0, 1]"
                )));
            }
        }
        Ok(())
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

/// Draw command for one line segment in logical pixel space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinePrimitive {
    pub from: Point,
    pub to: Point,
    pub stroke_width: f64,
    pub color: Color,
}

impl LinePrimitive {
    #[must_use]
    pub const fn new(from: Point, to: Point, stroke_width: f64, color: Color) -> Self {
        Self {
            from,
            to,
            stroke_width,
            color,
        }
    }

    pub fn validate(self) -> ChartResult<()> {
        if !self.from.x.is_finite()
            || !self.from.y.is_finite()
            || !self.to.x.is_finite()
            || !self.to.y.is_finite()
        {
            return Err(ChartError::config("line coordinates must be finite"));
        }
        if !self.stroke_width.is_finite() || self.stroke_width <= 0.0 {
            return Err(ChartError::config("line stroke width must be finite and > 0"));
        }
        self.color.validate()
    }
}

/// Horizontal text alignment relative to the anchor point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextHAlign {
    #[default]
    Left,
    Center,
    Right,
}

/// Draw command for one label in logical pixel space.
#[derive(Debug, Clone, PartialEq)]
pub struct TextPrimitive {
    pub text: String,
    pub at: Point,
    pub font_size_px: f64,
    pub color: Color,
    pub h_align: TextHAlign,
}

impl TextPrimitive {
    #[must_use]
    pub fn new(
        text: impl Into<String>,
        at: Point,
        font_size_px: f64,
        color: Color,
        h_align: TextHAlign,
    ) -> Self {
        Self {
            text: text.into(),
            at,
            font_size_px,
            color,
            h_align,
        }
    }

    pub fn validate(&self) -> ChartResult<()> {
        if !self.at.x.is_finite() || !self.at.y.is_finite() {
            return Err(ChartError::config("text coordinates must be finite"));
        }
        if !self.font_size_px.is_finite() || self.font_size_px <= 0.0 {
            return Err(ChartError::config("font size must be finite and > 0"));
        }
        self.color.validate()
    }
}

/// Filled and/or stroked rectangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RectPrimitive {
    pub rect: Rect,
    pub fill: Option<Color>,
    pub stroke: Option<(Color, f64)>,
}

impl RectPrimitive {
    #[must_use]
    pub const fn filled(rect: Rect, color: Color) -> Self {
        Self {
            rect,
            fill: Some(color),
            stroke: None,
        }
    }

    #[must_use]
    pub const fn stroked(rect: Rect, color: Color, width: f64) -> Self {
        Self {
            rect,
            fill: None,
            stroke: Some((color, width)),
        }
    }

    pub fn validate(self) -> ChartResult<()> {
        if !self.rect.is_finite() {
            return Err(ChartError::config("rect geometry must be finite"));
        }
        if let Some(fill) = self.fill {
            fill.validate()?;
        }
        if let Some((color, width)) = self.stroke {
            if !width.is_finite() || width <= 0.0 {
                return Err(ChartError::config("rect stroke width must be finite and > 0"));
            }
            color.validate()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::Color;

    #[test]
    fn parses_hex_colors() {
        assert_eq!(Color::from_hex("#fff").expect("short"), Color::WHITE);
        assert_eq!(
            Color::from_hex("#ff000080").expect("long"),
            Color::rgba(1.0, 0.0, 0.0, 128.0 / 255.0)
        );
        assert!(Color::from_hex("#12345").is_err());
    }

    #[test]
    fn rejects_out_of_range_channels() {
        assert!(Color::rgb(1.2, 0.0, 0.0).validate().is_err());
    }
}

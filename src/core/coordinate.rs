use serde::{Deserialize, Serialize};

use crate::core::types::{Point, Rect};
use crate::error::{ChartError, ChartResult};

/// Insets of the plot rectangle inside the full surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Margin {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Default for Margin {
    fn default() -> Self {
        Self {
            top: 20.0,
            right: 20.0,
            bottom: 40.0,
            left: 50.0,
        }
    }
}

impl Margin {
    #[must_use]
    pub const fn new(top: f64, right: f64, bottom: f64, left: f64) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }

    #[must_use]
    pub const fn uniform(inset: f64) -> Self {
        Self::new(inset, inset, inset, inset)
    }

    pub fn validate(self) -> ChartResult<Self> {
        for (side, value) in [
            ("top", self.top),
            ("right", self.right),
            ("bottom", self.bottom),
            ("left", self.left),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ChartError::config(format!(
                    "margin `{side}` must be finite and >= 0"
                )));
            }
        }
        Ok(self)
    }
}

/// Translates between the full drawing surface and the plot rectangle inset
/// by the margin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateSystem {
    width: f64,
    height: f64,
    margin: Margin,
}

impl CoordinateSystem {
    pub fn new(width: f64, height: f64, margin: Margin) -> ChartResult<Self> {
        validate_size(width, height)?;
        Ok(Self {
            width,
            height,
            margin: margin.validate()?,
        })
    }

    #[must_use]
    pub fn width(&self) -> f64 {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> f64 {
        self.height
    }

    #[must_use]
    pub fn margin(&self) -> Margin {
        self.margin
    }

    #[must_use]
    pub fn inner_width(&self) -> f64 {
        (self.width - self.margin.left - self.margin.right).max(0.0)
    }

    #[must_use]
    pub fn inner_height(&self) -> f64 {
        (self.height - self.margin.top - self.margin.bottom).max(0.0)
    }

    #[must_use]
    pub fn plot_bounds(&self) -> Rect {
        Rect::new(
            self.margin.left,
            self.margin.top,
            self.inner_width(),
            self.inner_height(),
        )
    }

    /// Plot-local point to surface point.
    #[must_use]
    pub fn data_to_screen(&self, point: Point) -> Point {
        point.offset(self.margin.left, self.margin.top)
    }

    /// Surface point to plot-local point.
    #[must_use]
    pub fn screen_to_data(&self, point: Point) -> Point {
        point.offset(-self.margin.left, -self.margin.top)
    }

    #[must_use]
    pub fn is_in_plot_area(&self, point: Point) -> bool {
        self.plot_bounds().contains(point)
    }

    #[must_use]
    pub fn clamp_to_plot_area(&self, point: Point) -> Point {
        self.plot_bounds().clamp(point)
    }

    /// Takes effect on the next read; nothing is repainted.
    pub fn resize(&mut self, width: f64, height: f64) -> ChartResult<()> {
        validate_size(width, height)?;
        self.width = width;
        self.height = height;
        Ok(())
    }

    pub fn set_margin(&mut self, margin: Margin) -> ChartResult<()> {
        self.margin = margin.validate()?;
        Ok(())
    }
}

pub(crate) fn validate_size(width: f64, height: f64) -> ChartResult<()> {
    if !width.is_finite() || !height.is_finite() || width < 0.0 || height < 0.0 {
        return Err(ChartError::config(format!(
            "invalid surface size: width={width}, height={height}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{CoordinateSystem, Margin};
    use crate::core::types::{Point, Rect};

    #[test]
    fn inner_size_is_clamped_to_zero() {
        let coords = CoordinateSystem::new(40.0, 30.0, Margin::default()).expect("coords");
        assert_eq!(coords.inner_width(), 0.0);
        assert_eq!(coords.inner_height(), 0.0);
    }

    #[test]
    fn plot_bounds_use_margin_origin() {
        let coords = CoordinateSystem::new(800.0, 600.0, Margin::default()).expect("coords");
        assert_eq!(coords.plot_bounds(), Rect::new(50.0, 20.0, 730.0, 540.0));
    }

    #[test]
    fn clamp_projects_outside_points_onto_edges() {
        let coords = CoordinateSystem::new(200.0, 100.0, Margin::uniform(10.0)).expect("coords");
        assert_eq!(coords.clamp_to_plot_area(Point::new(-5.0, 50.0)), Point::new(10.0, 50.0));
        assert_eq!(coords.clamp_to_plot_area(Point::new(500.0, 500.0)), Point::new(190.0, 90.0));
        assert!(coords.is_in_plot_area(Point::new(190.0, 90.0)));
    }

    #[test]
    fn negative_margin_is_rejected() {
        assert!(CoordinateSystem::new(10.0, 10.0, Margin::new(-1.0, 0.0, 0.0, 0.0)).is_err());
    }

    #[test]
    fn resize_takes_effect_on_next_read() {
        let mut coords = CoordinateSystem::new(100.0, 100.0, Margin::uniform(0.0)).expect("coords");
        coords.resize(300.0, 50.0).expect("resize");
        assert_eq!(coords.inner_width(), 300.0);
        assert_eq!(coords.inner_height(), 50.0);
    }
}

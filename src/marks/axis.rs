use serde::{Deserialize, Serialize};

use crate::api::{FrameContext, Renderable};
use crate::core::{Point, Scale};
use crate::error::ChartResult;
use crate::marks::guide_positions;
use crate::render::{Color, DrawingContext, LayerKind, LinePrimitive, TextHAlign, TextPrimitive};

/// Plot edge the axis is drawn along.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AxisPosition {
    Top,
    Right,
    Bottom,
    Left,
}

impl AxisPosition {
    #[must_use]
    pub const fn is_horizontal(self) -> bool {
        matches!(self, Self::Top | Self::Bottom)
    }
}

/// Axis line, outward tick marks and formatted tick labels.
#[derive(Debug, Clone)]
pub struct AxisMark {
    scale: Scale,
    position: AxisPosition,
    tick_count: usize,
    tick_size: f64,
    label_padding: f64,
    font_size_px: f64,
    color: Color,
    visible: bool,
    layer: LayerKind,
}

impl AxisMark {
    #[must_use]
    pub fn new(scale: Scale, position: AxisPosition) -> Self {
        Self {
            scale,
            position,
            tick_count: 10,
            tick_size: 6.0,
            label_padding: 3.0,
            font_size_px: 11.0,
            color: Color::BLACK,
            visible: true,
            layer: LayerKind::Overlay,
        }
    }

    #[must_use]
    pub fn bottom(scale: Scale) -> Self {
        Self::new(scale, AxisPosition::Bottom)
    }

    #[must_use]
    pub fn left(scale: Scale) -> Self {
        Self::new(scale, AxisPosition::Left)
    }

    #[must_use]
    pub fn with_tick_count(mut self, tick_count: usize) -> Self {
        self.tick_count = tick_count;
        self
    }

    #[must_use]
    pub fn with_tick_size(mut self, tick_size: f64) -> Self {
        self.tick_size = tick_size;
        self
    }

    #[must_use]
    pub fn with_font_size(mut self, font_size_px: f64) -> Self {
        self.font_size_px = font_size_px;
        self
    }

    #[must_use]
    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    #[must_use]
    pub fn with_layer(mut self, layer: LayerKind) -> Self {
        self.layer = layer;
        self
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    pub fn set_scale(&mut self, scale: Scale) {
        self.scale = scale;
    }

    /// Plot-local endpoints of the axis line.
    fn baseline(&self, width: f64, height: f64) -> (Point, Point) {
        match self.position {
            AxisPosition::Top => (Point::ZERO, Point::new(width, 0.0)),
            AxisPosition::Bottom => (Point::new(0.0, height), Point::new(width, height)),
            AxisPosition::Left => (Point::ZERO, Point::new(0.0, height)),
            AxisPosition::Right => (Point::new(width, 0.0), Point::new(width, height)),
        }
    }

    /// Plot-local tick start, tick end and label anchor for a guide at
    /// `position`.
    fn tick_geometry(&self, position: f64, width: f64, height: f64) -> (Point, Point, Point, TextHAlign) {
        let reach = self.tick_size + self.label_padding;
        match self.position {
            AxisPosition::Top => (
                Point::new(position, 0.0),
                Point::new(position, -self.tick_size),
                Point::new(position, -reach),
                TextHAlign::Center,
            ),
            AxisPosition::Bottom => (
                Point::new(position, height),
                Point::new(position, height + self.tick_size),
                Point::new(position, height + reach),
                TextHAlign::Center,
            ),
            AxisPosition::Left => (
                Point::new(0.0, position),
                Point::new(-self.tick_size, position),
                Point::new(-reach, position),
                TextHAlign::Right,
            ),
            AxisPosition::Right => (
                Point::new(width, position),
                Point::new(width + self.tick_size, position),
                Point::new(width + reach, position),
                TextHAlign::Left,
            ),
        }
    }
}

impl Renderable for AxisMark {
    fn name(&self) -> &str {
        "axis"
    }

    fn layer(&self) -> LayerKind {
        self.layer
    }

    fn is_visible(&self) -> bool {
        self.visible
    }

    fn render(&mut self, ctx: &mut dyn DrawingContext, frame: &mut FrameContext<'_>) -> ChartResult<()> {
        let coords = frame.coords;
        let (width, height) = (coords.inner_width(), coords.inner_height());

        let (start, end) = self.baseline(width, height);
        ctx.stroke_line(&LinePrimitive::new(
            coords.data_to_screen(start),
            coords.data_to_screen(end),
            1.0,
            self.color,
        ))?;

        let format = self.scale.tick_format(self.tick_count);
        for (value, position) in guide_positions(&self.scale, self.tick_count)? {
            let (tick_start, tick_end, anchor, h_align) = self.tick_geometry(position, width, height);
            ctx.stroke_line(&LinePrimitive::new(
                coords.data_to_screen(tick_start),
                coords.data_to_screen(tick_end),
                1.0,
                self.color,
            ))?;
            ctx.fill_text(&TextPrimitive::new(
                format.format(&value),
                coords.data_to_screen(anchor),
                self.font_size_px,
                self.color,
                h_align,
            ))?;
        }
        Ok(())
    }
}

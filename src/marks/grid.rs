use serde::{Deserialize, Serialize};

use crate::api::{FrameContext, Renderable};
use crate::core::{Point, Scale};
use crate::error::ChartResult;
use crate::marks::guide_positions;
use crate::render::{Color, DrawingContext, LayerKind, LinePrimitive};

/// Direction of the guide lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    /// Lines across the plot at y positions; pair with a y scale.
    Horizontal,
    /// Lines down the plot at x positions; pair with an x scale.
    Vertical,
}

/// Grid lines at a scale's ticks, spanning the whole plot area.
#[derive(Debug, Clone)]
pub struct GridMark {
    scale: Scale,
    orientation: Orientation,
    tick_count: usize,
    color: Color,
    stroke_width: f64,
    visible: bool,
    layer: LayerKind,
}

impl GridMark {
    #[must_use]
    pub fn new(scale: Scale, orientation: Orientation) -> Self {
        Self {
            scale,
            orientation,
            tick_count: 10,
            color: Color::rgba(0.0, 0.0, 0.0, 0.1),
            stroke_width: 1.0,
            visible: true,
            layer: LayerKind::Grid,
        }
    }

    #[must_use]
    pub fn with_tick_count(mut self, tick_count: usize) -> Self {
        self.tick_count = tick_count;
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
}

impl Renderable for GridMark {
    fn name(&self) -> &str {
        "grid"
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
        for (_, position) in guide_positions(&self.scale, self.tick_count)? {
            let (from, to) = match self.orientation {
                Orientation::Horizontal => (Point::new(0.0, position), Point::new(width, position)),
                Orientation::Vertical => (Point::new(position, 0.0), Point::new(position, height)),
            };
            ctx.stroke_line(&LinePrimitive::new(
                coords.data_to_screen(from),
                coords.data_to_screen(to),
                self.stroke_width,
                self.color,
            ))?;
        }
        Ok(())
    }
}

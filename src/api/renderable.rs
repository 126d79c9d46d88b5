use std::fmt;

use crate::core::{CoordinateSystem, FramePools, Point};
use crate::error::ChartResult;
use crate::interaction::MarkHit;
use crate::render::{DrawingContext, LayerKind};

/// Stable identifier of a renderable registered on a chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MarkId(u64);

impl MarkId {
    pub(crate) const fn new(raw: u64) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for MarkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "mark#{}", self.0)
    }
}

/// Per-pass state handed to every renderable.
pub struct FrameContext<'a> {
    pub coords: &'a CoordinateSystem,
    pub pools: &'a mut FramePools,
}

/// Anything the chart can draw onto one of its layers.
///
/// `render` receives the layer's context already scaled for the device pixel
/// ratio. Nothing may be assumed about prior content beyond the chart's
/// clearing policy for that layer.
pub trait Renderable {
    /// Label used in hit results and logs.
    fn name(&self) -> &str {
        "mark"
    }

    fn layer(&self) -> LayerKind {
        LayerKind::Data
    }

    fn is_visible(&self) -> bool {
        true
    }

    fn render(&mut self, ctx: &mut dyn DrawingContext, frame: &mut FrameContext<'_>) -> ChartResult<()>;

    /// Tests `point` (surface coordinates) against geometry from the last
    /// render.
    fn hit_test(&self, _point: Point) -> Option<MarkHit> {
        None
    }
}

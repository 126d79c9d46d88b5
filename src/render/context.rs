use crate::core::{Point, Rect};
use crate::error::ChartResult;
use crate::render::{Color, LayerKind, LinePrimitive, RectPrimitive, TextPrimitive};

/// Immediate-mode drawing target backing one layer.
///
/// All drawing coordinates are logical pixels; the pipeline keeps the context
/// scaled by the device pixel ratio.
pub trait DrawingContext {
    /// Physical backing size in device pixels.
    fn backing_size(&self) -> (u32, u32);

    /// Current scale transform `(sx, sy)`.
    fn scale_factor(&self) -> (f64, f64);

    /// Reallocates the backing store. Implementations drop any prior content
    /// and reset the transform to identity.
    fn resize_backing(&mut self, width_px: u32, height_px: u32) -> ChartResult<()>;

    /// Replaces the current transform with a pure scale.
    fn set_scale(&mut self, sx: f64, sy: f64);

    fn clear_rect(&mut self, rect: Rect) -> ChartResult<()>;

    fn fill_rect(&mut self, rect: Rect, color: Color) -> ChartResult<()>;

    fn stroke_rect(&mut self, rect: Rect, color: Color, width: f64) -> ChartResult<()>;

    fn stroke_line(&mut self, line: &LinePrimitive) -> ChartResult<()>;

    fn stroke_polyline(&mut self, points: &[Point], width: f64, color: Color) -> ChartResult<()>;

    fn fill_text(&mut self, text: &TextPrimitive) -> ChartResult<()>;

    fn draw_rect(&mut self, rect: &RectPrimitive) -> ChartResult<()> {
        rect.validate()?;
        if let Some(fill) = rect.fill {
            self.fill_rect(rect.rect, fill)?;
        }
        if let Some((color, width)) = rect.stroke {
            self.stroke_rect(rect.rect, color, width)?;
        }
        Ok(())
    }
}

/// Allocates and releases the drawing contexts behind pipeline layers.
pub trait SurfaceFactory: 'static {
    type Context: DrawingContext + 'static;

    /// Fails with [`crate::error::ChartError::ResourceUnavailable`] when no
    /// backing store can be acquired.
    fn create_context(
        &mut self,
        layer: LayerKind,
        width_px: u32,
        height_px: u32,
    ) -> ChartResult<Self::Context>;

    /// Called once per layer when the pipeline is torn down.
    fn detach(&mut self, layer: LayerKind, context: Self::Context);
}

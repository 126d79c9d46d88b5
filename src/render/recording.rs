use crate::core::{Point, Rect};
use crate::error::{ChartError, ChartResult};
use crate::render::{
    Color, DrawingContext, LayerKind, LinePrimitive, RectPrimitive, SurfaceFactory, TextPrimitive,
};

/// One call captured by [`RecordingContext`].
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear(Rect),
    Rect(RectPrimitive),
    Line(LinePrimitive),
    Polyline {
        points: Vec<Point>,
        width: f64,
        color: Color,
    },
    Text(TextPrimitive),
}

/// Headless drawing context that validates and records every draw call.
///
/// Used by tests and server-side rendering where only the draw list matters.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordingContext {
    width_px: u32,
    height_px: u32,
    scale: (f64, f64),
    max_pixels: Option<u64>,
    commands: Vec<DrawCommand>,
}

impl RecordingContext {
    #[must_use]
    pub fn new(width_px: u32, height_px: u32) -> Self {
        Self {
            width_px,
            height_px,
            scale: (1.0, 1.0),
            max_pixels: None,
            commands: Vec::new(),
        }
    }

    #[must_use]
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn take_commands(&mut self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.commands)
    }

    /// Draw calls recorded since the last clear of the command list,
    /// excluding `clear_rect`.
    #[must_use]
    pub fn draw_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|command| !matches!(command, DrawCommand::Clear(_)))
            .count()
    }

    #[must_use]
    pub fn texts(&self) -> Vec<&str> {
        self.commands
            .iter()
            .filter_map(|command| match command {
                DrawCommand::Text(text) => Some(text.text.as_str()),
                _ => None,
            })
            .collect()
    }

    fn check_budget(&self, width_px: u32, height_px: u32) -> ChartResult<()> {
        let pixels = u64::from(width_px) * u64::from(height_px);
        match self.max_pixels {
            Some(limit) if pixels > limit => Err(ChartError::ResourceUnavailable(format!(
                "backing store of {width_px}x{height_px} exceeds {limit} pixels"
            ))),
            _ => Ok(()),
        }
    }
}

impl DrawingContext for RecordingContext {
    fn backing_size(&self) -> (u32, u32) {
        (self.width_px, self.height_px)
    }

    fn scale_factor(&self) -> (f64, f64) {
        self.scale
    }

    fn resize_backing(&mut self, width_px: u32, height_px: u32) -> ChartResult<()> {
        self.check_budget(width_px, height_px)?;
        self.width_px = width_px;
        self.height_px = height_px;
        self.scale = (1.0, 1.0);
        self.commands.clear();
        Ok(())
    }

    fn set_scale(&mut self, sx: f64, sy: f64) {
        self.scale = (sx, sy);
    }

    fn clear_rect(&mut self, rect: Rect) -> ChartResult<()> {
        if !rect.is_finite() {
            return Err(ChartError::config("clear rect must be finite"));
        }
        self.commands.push(DrawCommand::Clear(rect));
        Ok(())
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) -> ChartResult<()> {
        let primitive = RectPrimitive::filled(rect, color);
        primitive.validate()?;
        self.commands.push(DrawCommand::Rect(primitive));
        Ok(())
    }

    fn stroke_rect(&mut self, rect: Rect, color: Color, width: f64) -> ChartResult<()> {
        let primitive = RectPrimitive::stroked(rect, color, width);
        primitive.validate()?;
        self.commands.push(DrawCommand::Rect(primitive));
        Ok(())
    }

    fn stroke_line(&mut self, line: &LinePrimitive) -> ChartResult<()> {
        line.validate()?;
        self.commands.push(DrawCommand::Line(*line));
        Ok(())
    }

    fn stroke_polyline(&mut self, points: &[Point], width: f64, color: Color) -> ChartResult<()> {
        if points.iter().any(|point| !point.x.is_finite() || !point.y.is_finite()) {
            return Err(ChartError::config("polyline coordinates must be finite"));
        }
        if !width.is_finite() || width <= 0.0 {
            return Err(ChartError::config("polyline stroke width must be finite and > 0"));
        }
        color.validate()?;
        self.commands.push(DrawCommand::Polyline {
            points: points.to_vec(),
            width,
            color,
        });
        Ok(())
    }

    fn fill_text(&mut self, text: &TextPrimitive) -> ChartResult<()> {
        text.validate()?;
        self.commands.push(DrawCommand::Text(text.clone()));
        Ok(())
    }
}

/// Factory for [`RecordingContext`] layers.
///
/// An optional pixel budget makes allocation failures reproducible.
#[derive(Debug, Default)]
pub struct RecordingSurfaceFactory {
    max_pixels: Option<u64>,
    layer_max_pixels: Option<(LayerKind, u64)>,
    created: Vec<LayerKind>,
    detached: Vec<LayerKind>,
}

impl RecordingSurfaceFactory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Refuses backing stores larger than `max_pixels` device pixels.
    #[must_use]
    pub fn with_pixel_budget(max_pixels: u64) -> Self {
        Self {
            max_pixels: Some(max_pixels),
            ..Self::default()
        }
    }

    /// Budget applied to `layer` only; other layers use the shared budget.
    #[must_use]
    pub fn with_layer_pixel_budget(mut self, layer: LayerKind, max_pixels: u64) -> Self {
        self.layer_max_pixels = Some((layer, max_pixels));
        self
    }

    #[must_use]
    pub fn created_layers(&self) -> &[LayerKind] {
        &self.created
    }

    #[must_use]
    pub fn detached_layers(&self) -> &[LayerKind] {
        &self.detached
    }
}

impl SurfaceFactory for RecordingSurfaceFactory {
    type Context = RecordingContext;

    fn create_context(
        &mut self,
        layer: LayerKind,
        width_px: u32,
        height_px: u32,
    ) -> ChartResult<Self::Context> {
        let mut context = RecordingContext::new(0, 0);
        context.max_pixels = match self.layer_max_pixels {
            Some((limited, max_pixels)) if limited == layer => Some(max_pixels),
            _ => self.max_pixels,
        };
        context.resize_backing(width_px, height_px)?;
        self.created.push(layer);
        Ok(context)
    }

    fn detach(&mut self, layer: LayerKind, _context: Self::Context) {
        self.detached.push(layer);
    }
}

use std::fmt;

use cairo::{Context, Format, ImageSurface, Operator};
use pango::FontDescription;

use crate::core::{Point, Rect};
use crate::error::{ChartError, ChartResult};
use crate::render::{
    Color, DrawingContext, LayerKind, LinePrimitive, SurfaceFactory, SurfacePipeline, TextHAlign,
    TextPrimitive,
};

/// Cairo image surface plus the context drawing into it.
///
/// Text goes through Pango + PangoCairo.
pub struct CairoDrawingContext {
    surface: ImageSurface,
    context: Context,
    scale: (f64, f64),
}

impl CairoDrawingContext {
    pub fn new(width_px: u32, height_px: u32) -> ChartResult<Self> {
        let (surface, context) = allocate(width_px, height_px)?;
        Ok(Self {
            surface,
            context,
            scale: (1.0, 1.0),
        })
    }

    #[must_use]
    pub fn surface(&self) -> &ImageSurface {
        &self.surface
    }

    #[must_use]
    pub fn cairo_context(&self) -> &Context {
        &self.context
    }
}

impl fmt::Debug for CairoDrawingContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CairoDrawingContext")
            .field("width_px", &self.surface.width())
            .field("height_px", &self.surface.height())
            .field("scale", &self.scale)
            .finish()
    }
}

impl DrawingContext for CairoDrawingContext {
    fn backing_size(&self) -> (u32, u32) {
        (
            u32::try_from(self.surface.width()).unwrap_or(0),
            u32::try_from(self.surface.height()).unwrap_or(0),
        )
    }

    fn scale_factor(&self) -> (f64, f64) {
        self.scale
    }

    fn resize_backing(&mut self, width_px: u32, height_px: u32) -> ChartResult<()> {
        let (surface, context) = allocate(width_px, height_px)?;
        self.surface = surface;
        self.context = context;
        self.scale = (1.0, 1.0);
        Ok(())
    }

    fn set_scale(&mut self, sx: f64, sy: f64) {
        self.context.identity_matrix();
        self.context.scale(sx, sy);
        self.scale = (sx, sy);
    }

    fn clear_rect(&mut self, rect: Rect) -> ChartResult<()> {
        let context = &self.context;
        context.save().map_err(|err| map_backend_error("failed to save state", err))?;
        context.set_operator(Operator::Clear);
        context.rectangle(rect.x, rect.y, rect.width, rect.height);
        let filled = context.fill();
        context
            .restore()
            .map_err(|err| map_backend_error("failed to restore state", err))?;
        filled.map_err(|err| map_backend_error("failed to clear rectangle", err))
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) -> ChartResult<()> {
        color.validate()?;
        apply_color(&self.context, color);
        self.context.rectangle(rect.x, rect.y, rect.width, rect.height);
        self.context
            .fill()
            .map_err(|err| map_backend_error("failed to fill rectangle", err))
    }

    fn stroke_rect(&mut self, rect: Rect, color: Color, width: f64) -> ChartResult<()> {
        color.validate()?;
        apply_color(&self.context, color);
        self.context.set_line_width(width);
        self.context.rectangle(rect.x, rect.y, rect.width, rect.height);
        self.context
            .stroke()
            .map_err(|err| map_backend_error("failed to stroke rectangle", err))
    }

    fn stroke_line(&mut self, line: &LinePrimitive) -> ChartResult<()> {
        line.validate()?;
        apply_color(&self.context, line.color);
        self.context.set_line_width(line.stroke_width);
        self.context.move_to(line.from.x, line.from.y);
        self.context.line_to(line.to.x, line.to.y);
        self.context
            .stroke()
            .map_err(|err| map_backend_error("failed to stroke line", err))
    }

    fn stroke_polyline(&mut self, points: &[Point], width: f64, color: Color) -> ChartResult<()> {
        let Some((first, rest)) = points.split_first() else {
            return Ok(());
        };
        color.validate()?;
        apply_color(&self.context, color);
        self.context.set_line_width(width);
        self.context.move_to(first.x, first.y);
        for point in rest {
            self.context.line_to(point.x, point.y);
        }
        self.context
            .stroke()
            .map_err(|err| map_backend_error("failed to stroke polyline", err))
    }

    fn fill_text(&mut self, text: &TextPrimitive) -> ChartResult<()> {
        text.validate()?;
        let layout = pangocairo::functions::create_layout(&self.context);
        let font_description = FontDescription::from_string(&format!("Sans {}", text.font_size_px));
        layout.set_font_description(Some(&font_description));
        layout.set_text(&text.text);

        let (text_width, _text_height) = layout.pixel_size();
        let x = match text.h_align {
            TextHAlign::Left => text.at.x,
            TextHAlign::Center => text.at.x - f64::from(text_width) / 2.0,
            TextHAlign::Right => text.at.x - f64::from(text_width),
        };

        apply_color(&self.context, text.color);
        self.context.move_to(x, text.at.y);
        pangocairo::functions::show_layout(&self.context, &layout);
        Ok(())
    }
}

/// Allocates one ARGB32 image surface per layer.
#[derive(Debug, Default)]
pub struct CairoSurfaceFactory;

impl SurfaceFactory for CairoSurfaceFactory {
    type Context = CairoDrawingContext;

    fn create_context(
        &mut self,
        _layer: LayerKind,
        width_px: u32,
        height_px: u32,
    ) -> ChartResult<Self::Context> {
        CairoDrawingContext::new(width_px, height_px)
    }

    fn detach(&mut self, _layer: LayerKind, context: Self::Context) {
        context.surface.finish();
    }
}

/// Paints every layer in order onto `target`, whose user space is in logical
/// pixels.
pub fn composite_layers(
    target: &Context,
    pipeline: &SurfacePipeline<CairoSurfaceFactory>,
) -> ChartResult<()> {
    let ratio = pipeline.device_pixel_ratio();
    for layer in LayerKind::ALL {
        let surface = pipeline.context(layer).surface();
        surface.flush();
        target
            .save()
            .map_err(|err| map_backend_error("failed to save state", err))?;
        target.scale(1.0 / ratio, 1.0 / ratio);
        let painted = target
            .set_source_surface(surface, 0.0, 0.0)
            .and_then(|()| target.paint());
        target
            .restore()
            .map_err(|err| map_backend_error("failed to restore state", err))?;
        painted.map_err(|err| map_backend_error("failed to composite layer", err))?;
    }
    Ok(())
}

fn allocate(width_px: u32, height_px: u32) -> ChartResult<(ImageSurface, Context)> {
    let width = i32::try_from(width_px)
        .map_err(|_| ChartError::ResourceUnavailable(format!("surface width {width_px} too large")))?;
    let height = i32::try_from(height_px).map_err(|_| {
        ChartError::ResourceUnavailable(format!("surface height {height_px} too large"))
    })?;
    let surface = ImageSurface::create(Format::ARgb32, width, height)
        .map_err(|err| map_backend_error("failed to create cairo surface", err))?;
    let context = Context::new(&surface)
        .map_err(|err| map_backend_error("failed to create cairo context", err))?;
    Ok((surface, context))
}

fn apply_color(context: &Context, color: Color) {
    context.set_source_rgba(color.red, color.green, color.blue, color.alpha);
}

fn map_backend_error(prefix: &str, err: cairo::Error) -> ChartError {
    ChartError::ResourceUnavailable(format!("{prefix}: {err}"))
}

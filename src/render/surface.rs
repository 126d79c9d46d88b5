use crate::core::Rect;
use crate::error::{ChartError, ChartResult};
use crate::render::{DrawingContext, LayerKind, SurfaceFactory};

/// One layer's drawing context plus its logical and physical geometry.
#[derive(Debug)]
pub struct Surface<C> {
    layer: LayerKind,
    width: f64,
    height: f64,
    device_pixel_ratio: f64,
    width_px: u32,
    height_px: u32,
    dirty: bool,
    context: C,
}

impl<C: DrawingContext> Surface<C> {
    pub(crate) fn create<F>(
        factory: &mut F,
        layer: LayerKind,
        width: f64,
        height: f64,
        device_pixel_ratio: f64,
    ) -> ChartResult<Self>
    where
        F: SurfaceFactory<Context = C>,
    {
        let width_px = physical_length(width, device_pixel_ratio);
        let height_px = physical_length(height, device_pixel_ratio);
        let mut context = factory.create_context(layer, width_px, height_px)?;
        context.set_scale(device_pixel_ratio, device_pixel_ratio);
        Ok(Self {
            layer,
            width,
            height,
            device_pixel_ratio,
            width_px,
            height_px,
            dirty: true,
            context,
        })
    }

    #[must_use]
    pub fn layer(&self) -> LayerKind {
        self.layer
    }

    /// Size in logical pixels.
    #[must_use]
    pub fn logical_size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    /// Size of the backing store in device pixels.
    #[must_use]
    pub fn physical_size(&self) -> (u32, u32) {
        (self.width_px, self.height_px)
    }

    #[must_use]
    pub fn device_pixel_ratio(&self) -> f64 {
        self.device_pixel_ratio
    }

    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    #[must_use]
    pub fn context(&self) -> &C {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut C {
        &mut self.context
    }

    /// Clears `rect`, or the whole logical area when `None`.
    pub fn clear(&mut self, rect: Option<Rect>) -> ChartResult<()> {
        let rect = rect.unwrap_or_else(|| Rect::new(0.0, 0.0, self.width, self.height));
        self.context.clear_rect(rect)?;
        self.dirty = true;
        Ok(())
    }

    /// Reallocating the backing store drops its transform, so the scale is
    /// applied again after every resize.
    pub(crate) fn resize(&mut self, width: f64, height: f64, device_pixel_ratio: f64) -> ChartResult<()> {
        let width_px = physical_length(width, device_pixel_ratio);
        let height_px = physical_length(height, device_pixel_ratio);
        self.context.resize_backing(width_px, height_px)?;
        self.context.set_scale(device_pixel_ratio, device_pixel_ratio);
        self.width = width;
        self.height = height;
        self.device_pixel_ratio = device_pixel_ratio;
        self.width_px = width_px;
        self.height_px = height_px;
        self.dirty = true;
        Ok(())
    }

    pub(crate) fn take_dirty(&mut self) -> bool {
        std::mem::replace(&mut self.dirty, false)
    }

    pub(crate) fn into_context(self) -> C {
        self.context
    }
}

#[must_use]
pub(crate) fn physical_length(logical: f64, device_pixel_ratio: f64) -> u32 {
    let scaled = (logical * device_pixel_ratio).round();
    if scaled >= f64::from(u32::MAX) {
        u32::MAX
    } else {
        scaled as u32
    }
}

pub(crate) fn validate_device_pixel_ratio(device_pixel_ratio: f64) -> ChartResult<()> {
    if !device_pixel_ratio.is_finite() || device_pixel_ratio <= 0.0 {
        return Err(ChartError::config(format!(
            "device pixel ratio must be finite and > 0, got {device_pixel_ratio}"
        )));
    }
    Ok(())
}

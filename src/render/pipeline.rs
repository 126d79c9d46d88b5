use std::fmt;

use smallvec::SmallVec;
use tracing::{debug, trace, warn};

use crate::core::Rect;
use crate::core::coordinate::validate_size;
use crate::error::ChartResult;
use crate::render::scheduler::{FrameHandle, FrameScheduler};
use crate::render::surface::{Surface, validate_device_pixel_ratio};
use crate::render::{LayerKind, SurfaceFactory};

/// Fixed stack of five layer surfaces sharing one logical size and device
/// pixel ratio, plus a depth-1 frame queue.
///
/// `destroy` consumes the pipeline, so no call can follow it.
pub struct SurfacePipeline<F: SurfaceFactory> {
    factory: F,
    surfaces: Vec<Surface<F::Context>>,
    width: f64,
    height: f64,
    device_pixel_ratio: f64,
    frames: FrameScheduler<SurfacePipeline<F>>,
}

impl<F: SurfaceFactory> SurfacePipeline<F> {
    pub fn new(mut factory: F, width: f64, height: f64, device_pixel_ratio: f64) -> ChartResult<Self> {
        validate_size(width, height)?;
        validate_device_pixel_ratio(device_pixel_ratio)?;

        let mut surfaces = Vec::with_capacity(LayerKind::COUNT);
        for layer in LayerKind::ALL {
            match Surface::create(&mut factory, layer, width, height, device_pixel_ratio) {
                Ok(surface) => surfaces.push(surface),
                Err(err) => {
                    for surface in surfaces {
                        let layer = surface.layer();
                        factory.detach(layer, surface.into_context());
                    }
                    return Err(err);
                }
            }
        }

        debug!(width, height, device_pixel_ratio, "surface pipeline created");
        Ok(Self {
            factory,
            surfaces,
            width,
            height,
            device_pixel_ratio,
            frames: FrameScheduler::new(),
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
    pub fn device_pixel_ratio(&self) -> f64 {
        self.device_pixel_ratio
    }

    #[must_use]
    pub fn factory(&self) -> &F {
        &self.factory
    }

    #[must_use]
    pub fn surface(&self, layer: LayerKind) -> &Surface<F::Context> {
        &self.surfaces[layer.index()]
    }

    pub fn surface_mut(&mut self, layer: LayerKind) -> &mut Surface<F::Context> {
        &mut self.surfaces[layer.index()]
    }

    #[must_use]
    pub fn context(&self, layer: LayerKind) -> &F::Context {
        self.surface(layer).context()
    }

    pub fn context_mut(&mut self, layer: LayerKind) -> &mut F::Context {
        self.surface_mut(layer).context_mut()
    }

    /// Resizes every layer and re-applies the device pixel ratio scale.
    pub fn resize(&mut self, width: f64, height: f64) -> ChartResult<()> {
        validate_size(width, height)?;
        self.apply_geometry(width, height, self.device_pixel_ratio)
    }

    pub fn set_device_pixel_ratio(&mut self, device_pixel_ratio: f64) -> ChartResult<()> {
        validate_device_pixel_ratio(device_pixel_ratio)?;
        self.apply_geometry(self.width, self.height, device_pixel_ratio)
    }

    /// Changes size and device pixel ratio together.
    pub fn set_geometry(&mut self, width: f64, height: f64, device_pixel_ratio: f64) -> ChartResult<()> {
        validate_size(width, height)?;
        validate_device_pixel_ratio(device_pixel_ratio)?;
        self.apply_geometry(width, height, device_pixel_ratio)
    }

    /// Resizes every surface. When one fails, the surfaces already resized
    /// are restored to the current geometry before the error is returned.
    fn apply_geometry(&mut self, width: f64, height: f64, device_pixel_ratio: f64) -> ChartResult<()> {
        for index in 0..self.surfaces.len() {
            if let Err(err) = self.surfaces[index].resize(width, height, device_pixel_ratio) {
                let (old_width, old_height, old_ratio) = (self.width, self.height, self.device_pixel_ratio);
                for surface in &mut self.surfaces[..index] {
                    if let Err(restore) = surface.resize(old_width, old_height, old_ratio) {
                        warn!(layer = %surface.layer(), %restore, "layer geometry not restored");
                    }
                }
                return Err(err);
            }
        }
        self.width = width;
        self.height = height;
        self.device_pixel_ratio = device_pixel_ratio;
        debug!(width, height, device_pixel_ratio, "surface pipeline resized");
        Ok(())
    }

    /// Clears `rect` (or the whole layer) and marks the layer dirty.
    pub fn clear(&mut self, layer: LayerKind, rect: Option<Rect>) -> ChartResult<()> {
        self.surface_mut(layer).clear(rect)
    }

    #[must_use]
    pub fn is_dirty(&self, layer: LayerKind) -> bool {
        self.surface(layer).is_dirty()
    }

    pub fn mark_dirty(&mut self, layer: LayerKind) {
        self.surface_mut(layer).mark_dirty();
    }

    /// Dirty layers in paint order. Their flags are reset.
    pub fn take_dirty_layers(&mut self) -> SmallVec<[LayerKind; 5]> {
        self.surfaces
            .iter_mut()
            .filter_map(|surface| surface.take_dirty().then_some(surface.layer()))
            .collect()
    }

    /// Queues `callback` for the next animation frame, replacing any pending
    /// callback.
    pub fn schedule_render<C>(&mut self, callback: C) -> FrameHandle
    where
        C: FnOnce(&mut Self) -> ChartResult<()> + 'static,
    {
        self.frames.schedule(callback)
    }

    pub fn cancel_scheduled_render(&mut self) -> bool {
        self.frames.cancel()
    }

    #[must_use]
    pub fn has_scheduled_render(&self) -> bool {
        self.frames.is_pending()
    }

    /// Host frame tick. Runs the pending callback, if any.
    pub fn run_animation_frame(&mut self) -> ChartResult<bool> {
        let Some(callback) = self.frames.take_pending() else {
            return Ok(false);
        };
        trace!("running scheduled surface render");
        callback(self)?;
        Ok(true)
    }

    /// Cancels the pending frame and hands every context back to the factory.
    pub fn destroy(mut self) -> F {
        self.frames.cancel();
        for surface in self.surfaces.drain(..) {
            let layer = surface.layer();
            self.factory.detach(layer, surface.into_context());
        }
        debug!("surface pipeline destroyed");
        self.factory
    }
}

impl<F: SurfaceFactory> fmt::Debug for SurfacePipeline<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SurfacePipeline")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("device_pixel_ratio", &self.device_pixel_ratio)
            .field("frames", &self.frames)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::SurfacePipeline;
    use crate::error::ChartError;
    use crate::render::{DrawingContext, LayerKind, RecordingSurfaceFactory};

    #[test]
    fn every_layer_is_scaled_at_creation() {
        let pipeline =
            SurfacePipeline::new(RecordingSurfaceFactory::new(), 300.0, 200.0, 2.0).expect("pipeline");
        for layer in LayerKind::ALL {
            assert_eq!(pipeline.context(layer).backing_size(), (600, 400));
            assert_eq!(pipeline.context(layer).scale_factor(), (2.0, 2.0));
        }
    }

    #[test]
    fn invalid_ratio_is_a_configuration_error() {
        let err = SurfacePipeline::new(RecordingSurfaceFactory::new(), 10.0, 10.0, 0.0)
            .expect_err("zero ratio");
        assert!(matches!(err, ChartError::Configuration(_)));
    }

    #[test]
    fn allocation_failure_is_resource_unavailable() {
        let err = SurfacePipeline::new(RecordingSurfaceFactory::with_pixel_budget(0), 10.0, 10.0, 1.0)
            .expect_err("budget");
        assert!(matches!(err, ChartError::ResourceUnavailable(_)));
    }

    #[test]
    fn dirty_layers_are_reported_once_in_paint_order() {
        let mut pipeline =
            SurfacePipeline::new(RecordingSurfaceFactory::new(), 10.0, 10.0, 1.0).expect("pipeline");
        pipeline.take_dirty_layers();

        pipeline.clear(LayerKind::Overlay, None).expect("clear");
        pipeline.mark_dirty(LayerKind::Grid);
        assert_eq!(
            pipeline.take_dirty_layers().as_slice(),
            &[LayerKind::Grid, LayerKind::Overlay]
        );
        assert!(pipeline.take_dirty_layers().is_empty());
    }

    #[test]
    fn destroy_detaches_all_layers() {
        let pipeline =
            SurfacePipeline::new(RecordingSurfaceFactory::new(), 10.0, 10.0, 1.0).expect("pipeline");
        let factory = pipeline.destroy();
        assert_eq!(factory.detached_layers(), &LayerKind::ALL);
    }
}

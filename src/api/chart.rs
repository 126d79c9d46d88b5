use std::fmt;

use smallvec::SmallVec;
use tracing::{debug, trace};

use crate::api::{ChartConfig, ChartConfigUpdate, FrameContext, MarkId, Renderable};
use crate::core::{CoordinateSystem, FramePools, Point, Rect};
use crate::error::ChartResult;
use crate::interaction::MarkHit;
use crate::render::{DrawingContext, FrameHandle, FrameScheduler, LayerKind, SurfaceFactory, SurfacePipeline};

type Bucket = Vec<(MarkId, Box<dyn Renderable>)>;

/// Composes the coordinate system, the layered surfaces and the registered
/// renderables.
///
/// Every `render` redraws every visible renderable on every layer. Dirty flags
/// on the surfaces only tell hosts which layers need compositing.
///
/// The chart owns the only frame queue for its surfaces. The pipeline is
/// only lent out immutably, so every scheduling path goes through
/// `schedule_render` or `schedule_with`.
pub struct Chart<F: SurfaceFactory> {
    config: ChartConfig,
    coords: CoordinateSystem,
    pipeline: SurfacePipeline<F>,
    buckets: [Bucket; LayerKind::COUNT],
    pools: FramePools,
    frames: FrameScheduler<Chart<F>>,
    next_mark: u64,
    render_count: u64,
}

impl<F: SurfaceFactory> Chart<F> {
    pub fn new(factory: F, config: ChartConfig) -> ChartResult<Self> {
        config.validate()?;
        let coords = CoordinateSystem::new(config.width, config.height, config.margin)?;
        let pipeline =
            SurfacePipeline::new(factory, config.width, config.height, config.device_pixel_ratio)?;
        debug!(width = config.width, height = config.height, "chart created");
        Ok(Self {
            config,
            coords,
            pipeline,
            buckets: Default::default(),
            pools: FramePools::default(),
            frames: FrameScheduler::new(),
            next_mark: 1,
            render_count: 0,
        })
    }

    #[must_use]
    pub fn config(&self) -> &ChartConfig {
        &self.config
    }

    #[must_use]
    pub fn coords(&self) -> &CoordinateSystem {
        &self.coords
    }

    #[must_use]
    pub fn pipeline(&self) -> &SurfacePipeline<F> {
        &self.pipeline
    }

    /// Drawing context of `layer`, for hosts that paint outside `render`.
    pub fn context_mut(&mut self, layer: LayerKind) -> &mut F::Context {
        self.pipeline.context_mut(layer)
    }

    /// Clears `rect` (or the whole layer) and marks the layer dirty.
    pub fn clear_layer(&mut self, layer: LayerKind, rect: Option<Rect>) -> ChartResult<()> {
        self.pipeline.clear(layer, rect)
    }

    /// Layers to composite since the last call, in paint order.
    pub fn take_dirty_layers(&mut self) -> SmallVec<[LayerKind; 5]> {
        self.pipeline.take_dirty_layers()
    }

    #[must_use]
    pub fn pools(&self) -> &FramePools {
        &self.pools
    }

    /// Number of completed `render` passes.
    #[must_use]
    pub fn render_count(&self) -> u64 {
        self.render_count
    }

    /// Appends `renderable` to the bucket of its layer.
    pub fn add<R: Renderable + 'static>(&mut self, renderable: R) -> MarkId {
        self.add_boxed(Box::new(renderable))
    }

    pub fn add_boxed(&mut self, renderable: Box<dyn Renderable>) -> MarkId {
        let id = MarkId::new(self.next_mark);
        self.next_mark += 1;
        let layer = renderable.layer();
        debug!(%id, %layer, name = renderable.name(), "mark added");
        self.buckets[layer.index()].push((id, renderable));
        id
    }

    pub fn remove(&mut self, id: MarkId) -> Option<Box<dyn Renderable>> {
        for bucket in &mut self.buckets {
            if let Some(position) = bucket.iter().position(|(mark, _)| *mark == id) {
                debug!(%id, "mark removed");
                return Some(bucket.remove(position).1);
            }
        }
        None
    }

    #[must_use]
    pub fn mark(&self, id: MarkId) -> Option<&dyn Renderable> {
        self.buckets
            .iter()
            .flatten()
            .find(|(mark, _)| *mark == id)
            .map(|(_, renderable)| renderable.as_ref())
    }

    pub fn mark_mut(&mut self, id: MarkId) -> Option<&mut (dyn Renderable + 'static)> {
        self.buckets
            .iter_mut()
            .flatten()
            .find(|(mark, _)| *mark == id)
            .map(|(_, renderable)| renderable.as_mut())
    }

    /// Mark ids on `layer` in draw order.
    #[must_use]
    pub fn marks_in(&self, layer: LayerKind) -> Vec<MarkId> {
        self.buckets[layer.index()].iter().map(|(id, _)| *id).collect()
    }

    #[must_use]
    pub fn mark_count(&self) -> usize {
        self.buckets.iter().map(Vec::len).sum()
    }

    /// Draws every visible renderable, layer by layer in paint order.
    ///
    /// The background layer is cleared and filled every pass. Other layers are
    /// only cleared when `clear_layers_each_frame` is set. The first
    /// renderable error aborts the pass.
    pub fn render(&mut self) -> ChartResult<()> {
        let full = Rect::new(0.0, 0.0, self.config.width, self.config.height);
        let mut drawn = 0_usize;
        for layer in LayerKind::ALL {
            if layer == LayerKind::Background {
                self.pipeline.clear(layer, None)?;
                self.pipeline
                    .context_mut(layer)
                    .fill_rect(full, self.config.background)?;
            } else if self.config.clear_layers_each_frame {
                self.pipeline.clear(layer, None)?;
            }

            let mut frame = FrameContext {
                coords: &self.coords,
                pools: &mut self.pools,
            };
            let ctx = self.pipeline.surface_mut(layer).context_mut();
            let mut layer_drawn = 0_usize;
            for (_, renderable) in &mut self.buckets[layer.index()] {
                if !renderable.is_visible() {
                    continue;
                }
                renderable.render(&mut *ctx, &mut frame)?;
                layer_drawn += 1;
            }
            if layer_drawn > 0 {
                self.pipeline.mark_dirty(layer);
            }
            drawn += layer_drawn;
        }
        self.render_count += 1;
        trace!(pass = self.render_count, drawn, "chart render pass");
        Ok(())
    }

    /// Replaces the config with `update` merged in, re-applies geometry to the
    /// surfaces and coordinates, then renders.
    pub fn update(&mut self, update: ChartConfigUpdate) -> ChartResult<()> {
        let next = self.config.merged(&update)?;
        let mut coords = self.coords;
        coords.resize(next.width, next.height)?;
        coords.set_margin(next.margin)?;
        if next.width != self.pipeline.width()
            || next.height != self.pipeline.height()
            || next.device_pixel_ratio != self.pipeline.device_pixel_ratio()
        {
            self.pipeline
                .set_geometry(next.width, next.height, next.device_pixel_ratio)?;
        }
        self.coords = coords;
        self.config = next;
        debug!(width = next.width, height = next.height, "chart updated");
        self.render()
    }

    /// Queues a full render for the next animation frame.
    pub fn schedule_render(&mut self) -> FrameHandle {
        self.frames.schedule(Self::render)
    }

    /// Queues `callback` for the next animation frame, replacing any pending
    /// chart frame.
    pub fn schedule_with<C>(&mut self, callback: C) -> FrameHandle
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

    /// Host frame tick: runs the pending frame, if any.
    pub fn run_animation_frame(&mut self) -> ChartResult<bool> {
        match self.frames.take_pending() {
            Some(callback) => {
                callback(self)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// First hit among visible renderables, searching from the top layer
    /// down and from the last added renderable back.
    #[must_use]
    pub fn hit_test(&self, point: Point) -> Option<MarkHit> {
        LayerKind::ALL.iter().rev().find_map(|layer| {
            self.buckets[layer.index()]
                .iter()
                .rev()
                .filter(|(_, renderable)| renderable.is_visible())
                .find_map(|(_, renderable)| renderable.hit_test(point))
        })
    }

    /// Cancels pending frames, drops every renderable and returns the
    /// factory after all surfaces are detached.
    pub fn destroy(mut self) -> F {
        self.frames.cancel();
        for bucket in &mut self.buckets {
            bucket.clear();
        }
        self.pools.clear();
        debug!("chart destroyed");
        self.pipeline.destroy()
    }
}

impl<F: SurfaceFactory> fmt::Debug for Chart<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Chart")
            .field("config", &self.config)
            .field("marks", &self.mark_count())
            .field("render_count", &self.render_count)
            .field("pipeline", &self.pipeline)
            .finish_non_exhaustive()
    }
}

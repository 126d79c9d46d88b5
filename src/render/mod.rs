mod context;
mod layer;
mod pipeline;
mod primitives;
mod recording;
pub mod scheduler;
mod surface;

pub use context::{DrawingContext, SurfaceFactory};
pub use layer::LayerKind;
pub use pipeline::SurfacePipeline;
pub use primitives::{Color, LinePrimitive, RectPrimitive, TextHAlign, TextPrimitive};
pub use recording::{DrawCommand, RecordingContext, RecordingSurfaceFactory};
pub use scheduler::{FrameCallback, FrameHandle, FrameScheduler};
pub use surface::Surface;

#[cfg(feature = "cairo-backend")]
mod cairo_backend;
#[cfg(feature = "cairo-backend")]
pub use cairo_backend::{CairoDrawingContext, CairoSurfaceFactory, composite_layers};

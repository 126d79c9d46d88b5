pub mod band;
pub mod continuous;
pub mod coordinate;
pub mod domain;
pub mod ordinal;
pub mod pool;
pub mod primitives;
pub mod scale;
pub mod ticks;
pub mod types;

pub use band::{BandScale, PointScale};
pub use continuous::{ContinuousScale, Transform};
pub use coordinate::{CoordinateSystem, Margin};
pub use domain::{DomainValue, compute_domain};
pub use ordinal::{OrdinalOutput, OrdinalScale};
pub use pool::{FramePools, ObjectPool, PoolStats, Poolable};
pub use scale::{Scale, ScaleConfig, ScaleKind, create_scale};
pub use ticks::{TickFormat, TickIter, TimeInterval};
pub use types::{Point, Rect};

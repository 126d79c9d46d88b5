mod chart;
mod config;
mod renderable;

pub use chart::Chart;
pub use config::{ChartConfig, ChartConfigUpdate};
pub use renderable::{FrameContext, MarkId, Renderable};

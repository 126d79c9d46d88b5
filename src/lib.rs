//! chart-surface: scales, coordinates and a layered drawing pipeline for
//! charts.
//!
//! The crate maps data to pixels through declarative scales, lays out a plot
//! area inside margins, and paints registered renderables onto five stacked
//! surfaces scaled for the device pixel ratio. Input normalization and
//! hit-testing close the loop for interactive hosts.

pub mod api;
pub mod core;
pub mod error;
pub mod interaction;
pub mod marks;
pub mod render;
pub mod telemetry;

pub use api::{Chart, ChartConfig, ChartConfigUpdate, Renderable};
pub use error::{ChartError, ChartResult};

//! Reference marks built on the public scale, coordinate and drawing
//! contracts.
//!
//! Marks work in plot-local coordinates (origin at the plot area's top-left)
//! and translate through the frame's coordinate system when drawing.

mod axis;
mod bar;
mod grid;
mod line;

pub use axis::{AxisMark, AxisPosition};
pub use bar::{BarDatum, BarMark};
pub use grid::{GridMark, Orientation};
pub use line::{LineDatum, LineMark};

use crate::core::{DomainValue, Scale};
use crate::error::ChartResult;

/// Plot-local position of `value`, centered within its band for band scales.
pub(crate) fn center_of(scale: &Scale, value: &DomainValue) -> ChartResult<f64> {
    let start = scale.apply(value)?;
    Ok(start + scale.bandwidth().unwrap_or(0.0) / 2.0)
}

/// Guide positions for grids and axes: ticks for continuous scales, every key
/// for categorical ones.
pub(crate) fn guide_positions(scale: &Scale, count: usize) -> ChartResult<Vec<(DomainValue, f64)>> {
    if let Some(keys) = scale.categories() {
        if matches!(scale, Scale::Ordinal(_)) {
            return Ok(Vec::new());
        }
        return keys
            .iter()
            .map(|key| Ok((key.clone(), center_of(scale, key)?)))
            .collect();
    }
    scale
        .ticks(count)
        .map(|tick| {
            let position = scale.apply(&tick)?;
            Ok((tick, position))
        })
        .collect()
}

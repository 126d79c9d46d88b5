use serde::{Deserialize, Serialize};

use crate::api::{FrameContext, Renderable};
use crate::core::{CoordinateSystem, DomainValue, Point, Rect, Scale};
use crate::error::{ChartError, ChartResult};
use crate::interaction::MarkHit;
use crate::render::{Color, DrawingContext, LayerKind, RectPrimitive};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarDatum {
    pub key: DomainValue,
    pub value: f64,
}

impl BarDatum {
    #[must_use]
    pub fn new(key: impl Into<DomainValue>, value: f64) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }
}

/// Vertical bars: a band scale places categories along x and a continuous
/// scale maps values along y.
///
/// Bars grow from the start of the y range (the plot bottom for the usual
/// `[inner_height, 0]` range).
#[derive(Debug, Clone)]
pub struct BarMark {
    name: String,
    data: Vec<BarDatum>,
    x: Scale,
    y: Scale,
    fill: Color,
    outline: Option<(Color, f64)>,
    visible: bool,
    layer: LayerKind,
    bars: Vec<Rect>,
}

impl BarMark {
    pub fn new(data: Vec<BarDatum>, x: Scale, y: Scale) -> ChartResult<Self> {
        check_scales(&x, &y)?;
        Ok(Self {
            name: "bars".to_owned(),
            data,
            x,
            y,
            fill: Color::from_hex("#4e79a7")?,
            outline: None,
            visible: true,
            layer: LayerKind::Data,
            bars: Vec::new(),
        })
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    #[must_use]
    pub fn with_fill(mut self, fill: Color) -> Self {
        self.fill = fill;
        self
    }

    #[must_use]
    pub fn with_outline(mut self, color: Color, width: f64) -> Self {
        self.outline = Some((color, width));
        self
    }

    #[must_use]
    pub fn with_layer(mut self, layer: LayerKind) -> Self {
        self.layer = layer;
        self
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    #[must_use]
    pub fn data(&self) -> &[BarDatum] {
        &self.data
    }

    /// Replaces the data; cached geometry is dropped until the next render.
    pub fn set_data(&mut self, data: Vec<BarDatum>) {
        self.data = data;
        self.bars.clear();
    }

    pub fn set_scales(&mut self, x: Scale, y: Scale) -> ChartResult<()> {
        check_scales(&x, &y)?;
        self.x = x;
        self.y = y;
        self.bars.clear();
        Ok(())
    }

    /// Bar rectangles from the last render, in surface coordinates.
    #[must_use]
    pub fn bars(&self) -> &[Rect] {
        &self.bars
    }
}

impl BarMark {
    fn draw_bars(
        &self,
        ctx: &mut dyn DrawingContext,
        coords: &CoordinateSystem,
        bars: &mut Vec<Rect>,
    ) -> ChartResult<()> {
        let bandwidth = self.x.bandwidth().unwrap_or(0.0);
        let baseline = self.y.range().map_or(0.0, |(start, _)| start);
        for datum in &self.data {
            let left = self.x.apply(&datum.key)?;
            let top = self.y.apply_number(datum.value)?;
            let local = Rect::from_corners(
                Point::new(left, top),
                Point::new(left + bandwidth, baseline),
            );
            let origin = coords.data_to_screen(Point::new(local.x, local.y));
            let rect = Rect::new(origin.x, origin.y, local.width, local.height);
            ctx.draw_rect(&RectPrimitive {
                rect,
                fill: Some(self.fill),
                stroke: self.outline,
            })?;
            bars.push(rect);
        }
        Ok(())
    }
}

fn check_scales(x: &Scale, y: &Scale) -> ChartResult<()> {
    if x.as_band().is_none() {
        return Err(ChartError::config(format!(
            "bar x scale must be a band scale, got {}",
            x.kind()
        )));
    }
    if y.as_continuous().is_none() {
        return Err(ChartError::config(format!(
            "bar y scale must be continuous, got {}",
            y.kind()
        )));
    }
    Ok(())
}

impl Renderable for BarMark {
    fn name(&self) -> &str {
        &self.name
    }

    fn layer(&self) -> LayerKind {
        self.layer
    }

    fn is_visible(&self) -> bool {
        self.visible
    }

    fn render(&mut self, ctx: &mut dyn DrawingContext, frame: &mut FrameContext<'_>) -> ChartResult<()> {
        let mut bars = frame.pools.rects.acquire();
        if let Err(err) = self.draw_bars(ctx, frame.coords, &mut bars) {
            frame.pools.rects.release(bars);
            return Err(err);
        }

        let previous = std::mem::replace(&mut self.bars, bars);
        frame.pools.rects.release(previous);
        Ok(())
    }

    fn hit_test(&self, point: Point) -> Option<MarkHit> {
        self.bars
            .iter()
            .zip(&self.data)
            .enumerate()
            .find(|(_, (rect, _))| rect.contains(point))
            .map(|(index, (rect, datum))| {
                MarkHit::new(self.name.clone(), index, *rect).with_key(datum.key.clone())
            })
    }
}

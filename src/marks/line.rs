use serde::{Deserialize, Serialize};

use crate::api::{FrameContext, Renderable};
use crate::core::{CoordinateSystem, DomainValue, Point, Rect, Scale};
use crate::error::ChartResult;
use crate::interaction::MarkHit;
use crate::marks::center_of;
use crate::render::{Color, DrawingContext, LayerKind};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineDatum {
    pub x: DomainValue,
    pub y: f64,
}

impl LineDatum {
    #[must_use]
    pub fn new(x: impl Into<DomainValue>, y: f64) -> Self {
        Self { x: x.into(), y }
    }
}

/// Polyline through `(x, y)` data.
///
/// Categorical x scales place vertices at band centers.
#[derive(Debug, Clone)]
pub struct LineMark {
    name: String,
    data: Vec<LineDatum>,
    x: Scale,
    y: Scale,
    color: Color,
    stroke_width: f64,
    hit_radius: f64,
    visible: bool,
    layer: LayerKind,
    path: Vec<Point>,
}

impl LineMark {
    pub fn new(data: Vec<LineDatum>, x: Scale, y: Scale) -> ChartResult<Self> {
        Ok(Self {
            name: "line".to_owned(),
            data,
            x,
            y,
            color: Color::from_hex("#e15759")?,
            stroke_width: 2.0,
            hit_radius: 6.0,
            visible: true,
            layer: LayerKind::Data,
            path: Vec::new(),
        })
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    #[must_use]
    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    #[must_use]
    pub fn with_stroke_width(mut self, stroke_width: f64) -> Self {
        self.stroke_width = stroke_width;
        self
    }

    /// Maximum distance from a vertex that still counts as a hit.
    #[must_use]
    pub fn with_hit_radius(mut self, hit_radius: f64) -> Self {
        self.hit_radius = hit_radius;
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

    pub fn set_data(&mut self, data: Vec<LineDatum>) {
        self.data = data;
        self.path.clear();
    }

    pub fn set_scales(&mut self, x: Scale, y: Scale) {
        self.x = x;
        self.y = y;
        self.path.clear();
    }

    /// Vertices from the last render, in surface coordinates.
    #[must_use]
    pub fn path(&self) -> &[Point] {
        &self.path
    }

    fn trace(&self, coords: &CoordinateSystem, path: &mut Vec<Point>) -> ChartResult<()> {
        for datum in &self.data {
            let local = Point::new(center_of(&self.x, &datum.x)?, self.y.apply_number(datum.y)?);
            path.push(coords.data_to_screen(local));
        }
        Ok(())
    }
}

impl Renderable for LineMark {
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
        let mut path = frame.pools.points.acquire();
        let drawn = self.trace(frame.coords, &mut path).and_then(|()| {
            if path.len() > 1 {
                ctx.stroke_polyline(&path, self.stroke_width, self.color)
            } else {
                Ok(())
            }
        });
        if let Err(err) = drawn {
            frame.pools.points.release(path);
            return Err(err);
        }

        let previous = std::mem::replace(&mut self.path, path);
        frame.pools.points.release(previous);
        Ok(())
    }

    fn hit_test(&self, point: Point) -> Option<MarkHit> {
        let (index, vertex) = self
            .path
            .iter()
            .enumerate()
            .map(|(index, vertex)| (index, *vertex, vertex.distance_to(point)))
            .filter(|(_, _, distance)| *distance <= self.hit_radius)
            .min_by(|a, b| a.2.total_cmp(&b.2))
            .map(|(index, vertex, _)| (index, vertex))?;
        let bounds = Rect::new(vertex.x, vertex.y, 0.0, 0.0);
        let hit = MarkHit::new(self.name.clone(), index, bounds);
        Some(match self.data.get(index) {
            Some(datum) => hit.with_key(datum.x.clone()),
            None => hit,
        })
    }
}

use std::cell::RefCell;
use std::rc::Rc;

use chart_surface::api::{Chart, ChartConfig, ChartConfigUpdate, FrameContext, Renderable};
use chart_surface::core::{DomainValue, Margin, Point, Rect, Scale, ScaleConfig, ScaleKind, create_scale};
use chart_surface::error::{ChartError, ChartResult};
use chart_surface::marks::{
    AxisMark, BarDatum, BarMark, GridMark, LineDatum, LineMark, Orientation,
};
use chart_surface::render::{
    Color, DrawCommand, DrawingContext, LayerKind, RecordingSurfaceFactory,
};

type Journal = Rc<RefCell<Vec<&'static str>>>;

/// Renderable that logs its name whenever it draws.
struct Journaled {
    name: &'static str,
    layer: LayerKind,
    visible: bool,
    journal: Journal,
}

impl Journaled {
    fn new(name: &'static str, layer: LayerKind, journal: &Journal) -> Self {
        Self {
            name,
            layer,
            visible: true,
            journal: Rc::clone(journal),
        }
    }

    fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }
}

impl Renderable for Journaled {
    fn name(&self) -> &str {
        self.name
    }

    fn layer(&self) -> LayerKind {
        self.layer
    }

    fn is_visible(&self) -> bool {
        self.visible
    }

    fn render(&mut self, ctx: &mut dyn DrawingContext, _frame: &mut FrameContext<'_>) -> ChartResult<()> {
        self.journal.borrow_mut().push(self.name);
        ctx.fill_rect(Rect::new(0.0, 0.0, 1.0, 1.0), Color::BLACK)
    }
}

struct Failing;

impl Renderable for Failing {
    fn render(&mut self, _ctx: &mut dyn DrawingContext, _frame: &mut FrameContext<'_>) -> ChartResult<()> {
        Err(ChartError::Handler("cannot draw".to_owned()))
    }
}

fn chart() -> Chart<RecordingSurfaceFactory> {
    // 400x300 plot area after a 10px margin on every side.
    let config = ChartConfig::new(420.0, 320.0).with_margin(Margin::uniform(10.0));
    Chart::new(RecordingSurfaceFactory::new(), config).expect("chart")
}

fn categories() -> Scale {
    create_scale(
        &ScaleConfig::new(ScaleKind::Band)
            .with_domain(["a", "b", "c", "d"])
            .with_range(0.0, 400.0)
            .with_padding(0.0),
    )
    .expect("band")
}

fn values() -> Scale {
    create_scale(
        &ScaleConfig::new(ScaleKind::Linear)
            .with_domain([0.0, 100.0])
            .with_range(300.0, 0.0),
    )
    .expect("linear")
}

fn bars() -> BarMark {
    BarMark::new(
        vec![
            BarDatum::new("a", 20.0),
            BarDatum::new("b", 50.0),
            BarDatum::new("c", 80.0),
            BarDatum::new("d", 10.0),
        ],
        categories(),
        values(),
    )
    .expect("bars")
}

#[test]
fn render_walks_layers_in_paint_order_and_skips_hidden_marks() {
    let mut chart = chart();
    let journal = Journal::default();
    chart.add(Journaled::new("overlay", LayerKind::Overlay, &journal));
    chart.add(Journaled::new("data-1", LayerKind::Data, &journal));
    chart.add(Journaled::new("hidden", LayerKind::Data, &journal).hidden());
    chart.add(Journaled::new("grid", LayerKind::Grid, &journal));
    chart.add(Journaled::new("data-2", LayerKind::Data, &journal));

    chart.render().expect("render");
    assert_eq!(*journal.borrow(), vec!["grid", "data-1", "data-2", "overlay"]);
    assert_eq!(chart.render_count(), 1);
}

#[test]
fn only_layers_that_drew_are_dirty() {
    let mut chart = chart();
    let journal = Journal::default();
    chart.add(Journaled::new("data", LayerKind::Data, &journal));
    chart.take_dirty_layers();

    chart.render().expect("render");
    assert_eq!(
        chart.take_dirty_layers().as_slice(),
        &[LayerKind::Background, LayerKind::Data]
    );
}

#[test]
fn layers_accumulate_unless_clearing_is_enabled() {
    let journal = Journal::default();

    let mut keeping = chart();
    keeping.add(Journaled::new("data", LayerKind::Data, &journal));
    keeping.render().expect("first");
    keeping.render().expect("second");
    assert_eq!(keeping.pipeline().context(LayerKind::Data).draw_count(), 2);

    let config = ChartConfig::new(420.0, 320.0).with_clear_layers_each_frame(true);
    let mut clearing = Chart::new(RecordingSurfaceFactory::new(), config).expect("chart");
    clearing.add(Journaled::new("data", LayerKind::Data, &journal));
    clearing.render().expect("first");
    clearing.render().expect("second");
    let commands = clearing.pipeline().context(LayerKind::Data).commands();
    assert_eq!(commands.iter().filter(|c| matches!(c, DrawCommand::Clear(_))).count(), 2);
}

#[test]
fn renderable_error_aborts_the_pass() {
    let mut chart = chart();
    let journal = Journal::default();
    chart.add(Failing);
    chart.add(Journaled::new("overlay", LayerKind::Overlay, &journal));

    let err = chart.render().expect_err("failing mark");
    assert!(matches!(err, ChartError::Handler(_)));
    assert!(journal.borrow().is_empty());
    assert_eq!(chart.render_count(), 0);
}

#[test]
fn update_resizes_surfaces_and_plot_area() {
    let mut chart = chart();
    chart
        .update(ChartConfigUpdate::size(220.0, 120.0).with_device_pixel_ratio(2.0))
        .expect("update");

    assert_eq!(chart.config().width, 220.0);
    assert_eq!(chart.coords().inner_width(), 200.0);
    assert_eq!(chart.coords().inner_height(), 100.0);
    for layer in LayerKind::ALL {
        assert_eq!(chart.pipeline().context(layer).backing_size(), (440, 240));
        assert_eq!(chart.pipeline().context(layer).scale_factor(), (2.0, 2.0));
    }
    assert_eq!(chart.render_count(), 1);
}

#[test]
fn invalid_update_keeps_previous_config() {
    let mut chart = chart();
    let err = chart
        .update(ChartConfigUpdate::size(f64::NAN, 10.0))
        .expect_err("nan width");
    assert!(matches!(err, ChartError::Configuration(_)));
    assert_eq!(chart.config().width, 420.0);
    assert_eq!(chart.render_count(), 0);
}

#[test]
fn scheduled_renders_coalesce_into_one_pass() {
    let mut chart = chart();
    chart.schedule_render();
    chart.schedule_render();
    chart.schedule_render();
    assert!(chart.has_scheduled_render());

    assert!(chart.run_animation_frame().expect("frame"));
    assert!(!chart.run_animation_frame().expect("idle"));
    assert_eq!(chart.render_count(), 1);
}

#[test]
fn custom_frame_callback_replaces_pending_render() {
    let mut chart = chart();
    let journal = Journal::default();
    chart.schedule_render();
    let sink = Rc::clone(&journal);
    chart.schedule_with(move |_| {
        sink.borrow_mut().push("custom");
        Ok(())
    });

    chart.run_animation_frame().expect("frame");
    assert_eq!(*journal.borrow(), vec!["custom"]);
    assert_eq!(chart.render_count(), 0);
}

#[test]
fn every_scheduling_path_shares_one_frame_queue() {
    let mut chart = chart();
    let journal = Journal::default();

    let first = Rc::clone(&journal);
    chart.schedule_with(move |_| {
        first.borrow_mut().push("first");
        Ok(())
    });
    chart.schedule_render();
    let last = Rc::clone(&journal);
    chart.schedule_with(move |_| {
        last.borrow_mut().push("last");
        Ok(())
    });

    assert!(chart.run_animation_frame().expect("frame"));
    assert!(!chart.run_animation_frame().expect("idle"));
    assert_eq!(*journal.borrow(), vec!["last"]);
    assert_eq!(chart.render_count(), 0);
    assert!(!chart.pipeline().has_scheduled_render());
}

#[test]
fn rescheduling_from_a_frame_waits_for_the_next_tick() {
    let mut chart = chart();
    chart.schedule_with(|chart| {
        chart.schedule_render();
        Ok(())
    });

    chart.run_animation_frame().expect("first frame");
    assert_eq!(chart.render_count(), 0);
    assert!(chart.has_scheduled_render());
    chart.run_animation_frame().expect("second frame");
    assert_eq!(chart.render_count(), 1);
}

#[test]
fn update_that_cannot_allocate_keeps_old_geometry() {
    let factory = RecordingSurfaceFactory::new().with_layer_pixel_budget(LayerKind::Overlay, 420 * 320);
    let config = ChartConfig::new(420.0, 320.0).with_margin(Margin::uniform(10.0));
    let mut chart = Chart::new(factory, config).expect("chart");

    let err = chart
        .update(ChartConfigUpdate::size(420.0, 320.0).with_device_pixel_ratio(2.0))
        .expect_err("overlay over budget");
    assert!(matches!(err, ChartError::ResourceUnavailable(_)));
    assert_eq!(chart.config().device_pixel_ratio, 1.0);
    assert_eq!(chart.pipeline().device_pixel_ratio(), 1.0);
    for layer in LayerKind::ALL {
        assert_eq!(chart.pipeline().context(layer).backing_size(), (420, 320));
        assert_eq!(chart.pipeline().context(layer).scale_factor(), (1.0, 1.0));
    }
    assert_eq!(chart.render_count(), 0);
}

#[test]
fn hit_test_finds_rendered_bar() {
    let mut chart = chart();
    chart.add(bars());
    assert_eq!(chart.hit_test(Point::new(160.0, 250.0)), None);

    chart.render().expect("render");
    let hit = chart.hit_test(Point::new(160.0, 250.0)).expect("bar b");
    assert_eq!(hit.mark, "bars");
    assert_eq!(hit.index, 1);
    assert_eq!(hit.key, Some(DomainValue::from("b")));
    assert_eq!(hit.bounds, Rect::new(110.0, 160.0, 100.0, 150.0));

    assert_eq!(chart.hit_test(Point::new(160.0, 100.0)), None);
}

#[test]
fn later_and_visible_marks_win_hit_tests() {
    let mut chart = chart();
    chart.add(bars());
    chart.add(
        LineMark::new(vec![LineDatum::new("c", 80.0)], categories(), values())
            .expect("line")
            .with_name("trend"),
    );
    chart.render().expect("render");

    // Vertex of "c" sits at (260, 70), on top of bar "c".
    let hit = chart.hit_test(Point::new(262.0, 72.0)).expect("hit");
    assert_eq!(hit.mark, "trend");
    assert_eq!(hit.key, Some(DomainValue::from("c")));

    let mut hidden = LineMark::new(vec![LineDatum::new("c", 80.0)], categories(), values())
        .expect("line");
    hidden.set_visible(false);
    let mut chart = self::chart();
    chart.add(bars());
    chart.add(hidden);
    chart.render().expect("render");
    assert_eq!(chart.hit_test(Point::new(262.0, 72.0)).expect("bar").mark, "bars");
}

#[test]
fn guides_draw_on_their_layers_without_hits() {
    let mut chart = chart();
    chart.add(GridMark::new(values(), Orientation::Horizontal).with_tick_count(5));
    chart.add(AxisMark::bottom(categories()));
    chart.render().expect("render");

    let grid = chart.pipeline().context(LayerKind::Grid);
    assert_eq!(grid.draw_count(), 6);
    let axis = chart.pipeline().context(LayerKind::Overlay);
    assert_eq!(axis.texts(), vec!["a", "b", "c", "d"]);
    assert_eq!(chart.hit_test(Point::new(15.0, 15.0)), None);
}

#[test]
fn destroy_detaches_every_layer() {
    let mut chart = chart();
    chart.add(bars());
    chart.schedule_render();

    let factory = chart.destroy();
    assert_eq!(factory.detached_layers(), &LayerKind::ALL);
}

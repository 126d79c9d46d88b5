use std::cell::RefCell;
use std::rc::Rc;

use chart_surface::core::Rect;
use chart_surface::error::ChartError;
use chart_surface::render::{
    DrawCommand, DrawingContext, LayerKind, RecordingSurfaceFactory, SurfacePipeline,
};

fn pipeline(width: f64, height: f64, ratio: f64) -> SurfacePipeline<RecordingSurfaceFactory> {
    SurfacePipeline::new(RecordingSurfaceFactory::new(), width, height, ratio).expect("pipeline")
}

#[test]
fn resize_keeps_backing_in_device_pixels() {
    let mut pipeline = pipeline(800.0, 600.0, 2.0);
    pipeline.resize(400.0, 300.0).expect("resize");

    for layer in LayerKind::ALL {
        let surface = pipeline.surface(layer);
        assert_eq!(surface.context().backing_size(), (800, 600));
        assert_eq!(surface.context().scale_factor(), (2.0, 2.0));
        assert_eq!(surface.logical_size(), (400.0, 300.0));
        assert_eq!(surface.physical_size(), (800, 600));
    }
    assert_eq!(pipeline.width(), 400.0);
    assert_eq!(pipeline.height(), 300.0);
}

#[test]
fn changing_ratio_rescales_every_layer() {
    let mut pipeline = pipeline(100.0, 50.0, 1.0);
    pipeline.set_device_pixel_ratio(1.5).expect("ratio");
    for layer in LayerKind::ALL {
        assert_eq!(pipeline.context(layer).backing_size(), (150, 75));
        assert_eq!(pipeline.context(layer).scale_factor(), (1.5, 1.5));
    }
}

#[test]
fn invalid_resize_leaves_geometry_untouched() {
    let mut pipeline = pipeline(100.0, 50.0, 1.0);
    let err = pipeline.resize(-1.0, 50.0).expect_err("negative width");
    assert!(matches!(err, ChartError::Configuration(_)));
    assert_eq!(pipeline.width(), 100.0);
    assert_eq!(pipeline.context(LayerKind::Data).backing_size(), (100, 50));
}

#[test]
fn clearing_a_region_targets_only_that_layer() {
    let mut pipeline = pipeline(100.0, 50.0, 1.0);
    let region = Rect::new(10.0, 10.0, 20.0, 20.0);
    pipeline.clear(LayerKind::Grid, Some(region)).expect("clear");

    assert_eq!(
        pipeline.context(LayerKind::Grid).commands(),
        &[DrawCommand::Clear(region)]
    );
    assert!(pipeline.context(LayerKind::Data).commands().is_empty());
}

#[test]
fn rapid_schedules_collapse_to_the_latest_callback() {
    let mut pipeline = pipeline(100.0, 50.0, 1.0);
    let ran = Rc::new(RefCell::new(Vec::new()));

    for label in ["first", "second", "third"] {
        let sink = Rc::clone(&ran);
        pipeline.schedule_render(move |_| {
            sink.borrow_mut().push(label);
            Ok(())
        });
    }
    assert!(pipeline.has_scheduled_render());

    assert!(pipeline.run_animation_frame().expect("frame"));
    assert!(!pipeline.run_animation_frame().expect("idle frame"));
    assert_eq!(*ran.borrow(), vec!["third"]);
}

#[test]
fn scheduled_callback_receives_the_pipeline() {
    let mut pipeline = pipeline(100.0, 50.0, 1.0);
    pipeline.schedule_render(|pipeline| pipeline.clear(LayerKind::Overlay, None));
    pipeline.take_dirty_layers();

    pipeline.run_animation_frame().expect("frame");
    assert_eq!(pipeline.take_dirty_layers().as_slice(), &[LayerKind::Overlay]);
}

#[test]
fn cancelled_render_never_runs() {
    let mut pipeline = pipeline(100.0, 50.0, 1.0);
    let ran = Rc::new(RefCell::new(false));
    let sink = Rc::clone(&ran);
    pipeline.schedule_render(move |_| {
        *sink.borrow_mut() = true;
        Ok(())
    });

    assert!(pipeline.cancel_scheduled_render());
    assert!(!pipeline.cancel_scheduled_render());
    assert!(!pipeline.run_animation_frame().expect("frame"));
    assert!(!*ran.borrow());
}

#[test]
fn callback_errors_surface_from_the_frame() {
    let mut pipeline = pipeline(100.0, 50.0, 1.0);
    pipeline.schedule_render(|_| Err(ChartError::Handler("boom".to_owned())));
    let err = pipeline.run_animation_frame().expect_err("callback error");
    assert!(matches!(err, ChartError::Handler(_)));
    assert!(!pipeline.has_scheduled_render());
}

#[test]
fn destroy_cancels_pending_work_and_detaches_layers() {
    let mut pipeline = pipeline(100.0, 50.0, 1.0);
    let ran = Rc::new(RefCell::new(false));
    let sink = Rc::clone(&ran);
    pipeline.schedule_render(move |_| {
        *sink.borrow_mut() = true;
        Ok(())
    });

    let factory = pipeline.destroy();
    assert_eq!(factory.created_layers(), &LayerKind::ALL);
    assert_eq!(factory.detached_layers(), &LayerKind::ALL);
    assert!(!*ran.borrow());
}

#[test]
fn failed_resize_restores_layers_already_resized() {
    let factory = RecordingSurfaceFactory::new().with_layer_pixel_budget(LayerKind::Overlay, 100 * 50);
    let mut pipeline = SurfacePipeline::new(factory, 100.0, 50.0, 1.0).expect("pipeline");

    let err = pipeline.resize(200.0, 100.0).expect_err("overlay over budget");
    assert!(matches!(err, ChartError::ResourceUnavailable(_)));
    assert_eq!((pipeline.width(), pipeline.height()), (100.0, 50.0));
    for layer in LayerKind::ALL {
        assert_eq!(pipeline.context(layer).backing_size(), (100, 50));
        assert_eq!(pipeline.context(layer).scale_factor(), (1.0, 1.0));
    }
}

#[test]
fn geometry_changes_size_and_ratio_together() {
    let mut pipeline = pipeline(100.0, 50.0, 1.0);
    pipeline.set_geometry(60.0, 30.0, 2.0).expect("geometry");
    assert_eq!(pipeline.device_pixel_ratio(), 2.0);
    for layer in LayerKind::ALL {
        assert_eq!(pipeline.context(layer).backing_size(), (120, 60));
    }

    assert!(pipeline.set_geometry(60.0, 30.0, 0.0).is_err());
    assert_eq!(pipeline.device_pixel_ratio(), 2.0);
}

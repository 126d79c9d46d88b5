use approx::assert_relative_eq;
use chart_surface::core::{
    DomainValue, Scale, ScaleConfig, ScaleKind, TickFormat, compute_domain, create_scale,
};
use chart_surface::error::ChartError;
use chrono::{TimeZone, Utc};

fn linear(domain: [f64; 2], range: (f64, f64)) -> Scale {
    create_scale(
        &ScaleConfig::new(ScaleKind::Linear)
            .with_domain(domain)
            .with_range(range.0, range.1),
    )
    .expect("valid linear scale")
}

#[test]
fn linear_quarter_of_domain_maps_to_quarter_of_range() {
    let scale = linear([0.0, 100.0], (0.0, 500.0));
    let px = scale.apply(&DomainValue::number(25.0)).expect("apply");
    assert_relative_eq!(px, 125.0);
}

#[test]
fn band_scale_without_padding_assigns_equal_slots() {
    let scale = create_scale(
        &ScaleConfig::new(ScaleKind::Band)
            .with_domain(["a", "b", "c", "d"])
            .with_range(0.0, 400.0)
            .with_padding(0.0),
    )
    .expect("valid band scale");

    assert_eq!(scale.bandwidth(), Some(100.0));
    assert_eq!(scale.apply(&DomainValue::from("c")).expect("c"), 200.0);
    assert_eq!(scale.invert(250.0), Some(DomainValue::from("c")));
}

#[test]
fn log_domain_crossing_zero_is_a_domain_error() {
    let err = create_scale(&ScaleConfig::new(ScaleKind::Log).with_domain([-1.0, 10.0]))
        .expect_err("crossing zero");
    assert!(matches!(err, ChartError::Domain(_)));
}

#[test]
fn log_value_of_wrong_sign_is_a_domain_error() {
    let scale = create_scale(
        &ScaleConfig::new(ScaleKind::Log)
            .with_domain([1.0, 1000.0])
            .with_range(0.0, 300.0),
    )
    .expect("valid log scale");
    assert_relative_eq!(scale.apply_number(100.0).expect("100"), 200.0, epsilon = 1e-9);
    assert!(matches!(scale.apply_number(-5.0), Err(ChartError::Domain(_))));
}

#[test]
fn unknown_variant_tag_is_a_configuration_error() {
    let err = ScaleConfig::from_json(r#"{ "kind": "radial" }"#).expect_err("unknown kind");
    assert!(matches!(err, ChartError::Configuration(_)));
    assert!(matches!("radial".parse::<ScaleKind>(), Err(ChartError::Configuration(_))));
}

#[test]
fn json_config_round_trips_into_a_working_scale() {
    let config = ScaleConfig::from_json(
        r#"{ "kind": "linear", "domain": [0, 10], "range": [100, 0], "clamp": true }"#,
    )
    .expect("config");
    let scale = create_scale(&config).expect("scale");
    assert_relative_eq!(scale.apply_number(20.0).expect("clamped"), 0.0);
    assert_relative_eq!(scale.apply_number(5.0).expect("middle"), 50.0);
}

#[test]
fn degenerate_domain_maps_to_midpoint_and_single_tick() {
    let scale = linear([3.0, 3.0], (0.0, 80.0));
    assert_relative_eq!(scale.apply_number(3.0).expect("apply"), 40.0);
    assert_relative_eq!(scale.apply_number(-100.0).expect("apply"), 40.0);
    assert_eq!(scale.ticks(10).count(), 1);
}

#[test]
fn zero_tick_request_is_empty_not_an_error() {
    let scale = linear([0.0, 1.0], (0.0, 1.0));
    assert_eq!(scale.ticks(0).count(), 0);
}

#[test]
fn ticks_are_finite_restartable_and_clone_independently() {
    let scale = linear([0.0, 100.0], (0.0, 500.0));
    let mut ticks = scale.ticks(10);
    assert_eq!(ticks.len(), 11);

    let first_pass: Vec<DomainValue> = ticks.by_ref().collect();
    assert_eq!(ticks.next(), None);
    ticks.restart();
    let second_pass: Vec<DomainValue> = ticks.clone().collect();
    assert_eq!(first_pass, second_pass);
    assert_eq!(first_pass.first(), Some(&DomainValue::number(0.0)));
    assert_eq!(first_pass.last(), Some(&DomainValue::number(100.0)));
}

#[test]
fn categorical_scales_have_no_ticks() {
    let scale = create_scale(&ScaleConfig::new(ScaleKind::Point).with_domain(["x", "y"]))
        .expect("point");
    assert_eq!(scale.ticks(5).count(), 0);
    assert_eq!(scale.tick_format(5), TickFormat::Plain);
}

#[test]
fn time_scale_maps_datetimes() {
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).single().expect("start");
    let end = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).single().expect("end");
    let noon = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).single().expect("noon");

    let scale = create_scale(
        &ScaleConfig::new(ScaleKind::Time)
            .with_domain([start, end])
            .with_range(0.0, 240.0),
    )
    .expect("time scale");
    assert_relative_eq!(scale.apply(&DomainValue::from(noon)).expect("noon"), 120.0);
    assert_eq!(scale.invert(120.0), Some(DomainValue::from(noon)));
}

#[test]
fn number_domain_for_time_scale_is_rejected() {
    let err = create_scale(&ScaleConfig::new(ScaleKind::Time).with_domain([0.0, 1.0]))
        .expect_err("numbers for time");
    assert!(matches!(err, ChartError::Configuration(_)));
}

#[test]
fn compute_domain_rejects_mixed_numbers_and_times() {
    let data = vec![
        DomainValue::number(1.0),
        DomainValue::from(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).single().expect("time")),
    ];
    let err = compute_domain(&data, DomainValue::clone, ScaleKind::Linear).expect_err("mixed");
    assert!(matches!(err, ChartError::Configuration(_)));
}

#[test]
fn compute_domain_of_empty_dataset() {
    let data: Vec<f64> = Vec::new();
    let err = compute_domain(&data, |v| DomainValue::number(*v), ScaleKind::Linear)
        .expect_err("empty");
    assert!(matches!(err, ChartError::EmptyDomain));

    let keys = compute_domain(&data, |v| DomainValue::number(*v), ScaleKind::Band)
        .expect("empty categorical domain");
    assert!(keys.is_empty());
}

#[test]
fn compute_domain_keeps_first_seen_order_for_categories() {
    let data = ["pear", "apple", "pear", "fig", "apple"];
    let keys = compute_domain(&data, |v| DomainValue::from(*v), ScaleKind::Ordinal)
        .expect("categories");
    assert_eq!(keys, ["pear", "apple", "fig"].map(DomainValue::from).to_vec());
}

#[test]
fn with_domain_rebuilds_band_geometry() {
    let scale = create_scale(
        &ScaleConfig::new(ScaleKind::Band)
            .with_domain(["a", "b"])
            .with_range(0.0, 100.0),
    )
    .expect("band");
    let wider = scale
        .with_domain(["a", "b", "c", "d"].map(DomainValue::from).to_vec())
        .expect("new domain");
    assert_eq!(scale.bandwidth(), Some(50.0));
    assert_eq!(wider.bandwidth(), Some(25.0));
}

#[test]
fn log_ticks_stay_bounded_for_huge_bases() {
    let scale = create_scale(
        &ScaleConfig::new(ScaleKind::Log)
            .with_base(1e9)
            .with_domain([9e8, 2e9])
            .with_range(0.0, 100.0),
    )
    .expect("log scale");
    let ticks: Vec<DomainValue> = scale.ticks(10).collect();
    assert!(!ticks.is_empty());
    assert!(ticks.len() <= 10);
}

use chart_surface::core::{
    CoordinateSystem, DomainValue, Margin, Point, ScaleConfig, ScaleKind, create_scale,
};
use proptest::prelude::*;

fn keys(n: usize) -> Vec<DomainValue> {
    (0..n).map(|i| DomainValue::text(format!("k{i}"))).collect()
}

proptest! {
    #[test]
    fn linear_endpoints_and_monotonicity(
        a in -1_000_000.0f64..1_000_000.0,
        span in 0.001f64..1_000_000.0,
        descending in any::<bool>(),
        f1 in 0.0f64..1.0,
        f2 in 0.0f64..1.0,
    ) {
        let b = if descending { a - span } else { a + span };
        let scale = create_scale(
            &ScaleConfig::new(ScaleKind::Linear).with_domain([a, b]).with_range(0.0, 100.0),
        ).expect("valid scale");

        prop_assert!(scale.apply_number(a).expect("a").abs() <= 1e-7);
        prop_assert!((scale.apply_number(b).expect("b") - 100.0).abs() <= 1e-7);

        let (lo, hi) = (f1.min(f2), f1.max(f2));
        let x1 = a + lo * (b - a);
        let x2 = a + hi * (b - a);
        let p1 = scale.apply_number(x1).expect("x1");
        let p2 = scale.apply_number(x2).expect("x2");
        prop_assert!(p1 <= p2 + 1e-9);
    }

    #[test]
    fn log_and_sqrt_endpoints_on_positive_domains(
        a in 0.001f64..1_000.0,
        factor in 1.5f64..10_000.0,
        kind in prop::sample::select(vec![ScaleKind::Log, ScaleKind::Sqrt, ScaleKind::Pow]),
    ) {
        let b = a * factor;
        let mut config = ScaleConfig::new(kind).with_domain([a, b]).with_range(0.0, 100.0);
        if kind == ScaleKind::Pow {
            config = config.with_exponent(2.0);
        }
        let scale = create_scale(&config).expect("valid scale");
        prop_assert!(scale.apply_number(a).expect("a").abs() <= 1e-7);
        prop_assert!((scale.apply_number(b).expect("b") - 100.0).abs() <= 1e-7);
        let mid = scale.apply_number((a + b) / 2.0).expect("mid");
        prop_assert!((-1e-9..=100.0 + 1e-9).contains(&mid));
    }

    #[test]
    fn band_slots_fit_and_never_overlap(
        n in 1usize..40,
        width in 1.0f64..4_000.0,
        padding in 0.0f64..=1.0,
        reversed in any::<bool>(),
    ) {
        let (start, end) = if reversed { (width, 0.0) } else { (0.0, width) };
        let scale = create_scale(
            &ScaleConfig::new(ScaleKind::Band)
                .with_domain(keys(n))
                .with_range(start, end)
                .with_padding(padding),
        ).expect("valid band");
        let bandwidth = scale.bandwidth().expect("band has bandwidth");

        prop_assert!(bandwidth * n as f64 <= width + 1e-9);

        let mut starts: Vec<f64> = keys(n)
            .iter()
            .map(|key| scale.apply(key).expect("known key"))
            .collect();
        starts.sort_by(f64::total_cmp);
        for pair in starts.windows(2) {
            prop_assert!(pair[0] + bandwidth <= pair[1] + 1e-9);
        }
        prop_assert!(starts[0] >= -1e-9);
        prop_assert!(starts[n - 1] + bandwidth <= width + 1e-9);
    }

    #[test]
    fn screen_data_translation_is_an_exact_inverse(
        x in -64_000_000i64..64_000_000,
        y in -64_000_000i64..64_000_000,
        left in 0u32..400,
        top in 0u32..400,
    ) {
        let margin = Margin::new(f64::from(top), 20.0, 40.0, f64::from(left));
        let coords = CoordinateSystem::new(800.0, 600.0, margin).expect("coords");
        let point = Point::new(x as f64 / 64.0, y as f64 / 64.0);

        prop_assert_eq!(coords.data_to_screen(coords.screen_to_data(point)), point);
        prop_assert_eq!(coords.screen_to_data(coords.data_to_screen(point)), point);
    }

    #[test]
    fn clamp_to_plot_area_is_idempotent(
        x in -10_000.0f64..10_000.0,
        y in -10_000.0f64..10_000.0,
        width in 0.0f64..2_000.0,
        height in 0.0f64..2_000.0,
        inset in 0.0f64..300.0,
    ) {
        let coords = CoordinateSystem::new(width, height, Margin::uniform(inset)).expect("coords");
        let once = coords.clamp_to_plot_area(Point::new(x, y));
        prop_assert_eq!(coords.clamp_to_plot_area(once), once);
        prop_assert!(coords.is_in_plot_area(once));
    }
}

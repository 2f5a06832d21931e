mod common;

use common::{BlackoutEphemeris, STAR_MU, evaluator, inner_outer, inner_outer_spec, radius_for_period};
use transfer_window_planner::config::load_bodies;
use transfer_window_planner::impulsive::transfers::hohmann;
use transfer_window_planner::transfer::porkchop::palette::bucket_index;
use transfer_window_planner::transfer::{
    GridError, GridRequest, GridSize, KeplerianEphemeris, Palette, TransferEvaluator,
    TransferSpec, WindowBounds, catalog, compute_grid, compute_grid_with_progress,
    estimate_default_window,
};

#[test]
fn hohmann_scenario_minimum_lands_on_hohmann_cell() {
    let (inner, outer) = inner_outer();
    let estimate = estimate_default_window(&inner, &outer).expect("window");
    let request = GridRequest::new(estimate.bounds, GridSize::new(201, 75));
    let grid = compute_grid(
        &evaluator(KeplerianEphemeris),
        &inner_outer_spec(),
        &request,
        &Palette::porkchop(),
    )
    .expect("grid");

    // Outer must lead by π - ω₂·t_H at departure; it starts level with the inner planet.
    let t_h = estimate.hohmann_time_of_flight;
    let lead = std::f64::consts::PI - std::f64::consts::TAU / 200.0 * t_h;
    let hohmann_departure = 200.0 * (1.0 - lead / std::f64::consts::TAU);

    let (x, y) = grid.best_cell();
    let (departure, travel) = grid.cell_times(x, y);
    assert!(
        (departure - hohmann_departure).abs() <= grid.x_resolution(),
        "best departure {departure} vs hohmann {hohmann_departure}"
    );
    assert!(
        (travel - t_h).abs() <= grid.y_resolution(),
        "best travel {travel} vs hohmann {t_h}"
    );

    let a1 = radius_for_period(100.0, STAR_MU);
    let a2 = radius_for_period(200.0, STAR_MU);
    let ideal = hohmann(a1, a2, STAR_MU).expect("hohmann").dv_total_m_s;
    let best = grid.delta_v(x, y).expect("best cell is valid");
    assert_eq!(best, grid.statistics().min);
    assert!(
        ((best - ideal) / ideal).abs() < 0.02,
        "grid minimum {best} vs hohmann {ideal}"
    );
}

#[test]
fn cost_rises_away_from_hohmann_travel_time() {
    let (inner, outer) = inner_outer();
    let estimate = estimate_default_window(&inner, &outer).expect("window");
    let request = GridRequest::new(estimate.bounds, GridSize::new(201, 75));
    let grid = compute_grid(
        &evaluator(KeplerianEphemeris),
        &inner_outer_spec(),
        &request,
        &Palette::porkchop(),
    )
    .expect("grid");

    let (x, y) = grid.best_cell();
    let best = grid.delta_v(x, y).expect("best");
    let shortest = grid.delta_v(x, grid.height() - 1).expect("shortest travel");
    let longest = grid.delta_v(x, 0).expect("longest travel");
    assert!(shortest > best && longest > best);
}

#[test]
fn grid_statistics_bound_palette_indices() {
    let spec = inner_outer_spec();
    // Travel offset by one keeps every sample off the aligned (radial) geometry.
    let bounds = WindowBounds::new(0.0, 200.0, 21.0, 121.0).expect("bounds");
    let request = GridRequest::new(bounds, GridSize::new(41, 21));
    let palette = Palette::from_stops(&[[0, 0, 0], [255, 255, 255]], 10).expect("palette");
    let grid = compute_grid(&evaluator(KeplerianEphemeris), &spec, &request, &palette).expect("grid");

    let stats = grid.statistics();
    assert_eq!(stats.valid_count, 41 * 21);
    assert_eq!(stats.invalid_count, 0);
    assert!(stats.log_min <= stats.min.ln());
    assert!(stats.log_max <= stats.max.ln() + 1e-12);
    assert!(stats.log_max >= stats.log_min);
    assert!(stats.stddev_log() >= 0.0);
    assert_eq!(grid.palette_size(), palette.len());

    let mut seen_zero = false;
    for y in 0..grid.height() {
        for x in 0..grid.width() {
            let index = grid.color_index(x, y).expect("valid cell");
            assert!(index < palette.len());
            seen_zero |= index == 0;
        }
    }
    assert!(seen_zero, "cheapest cell maps to the first bucket");
    let (bx, by) = grid.best_cell();
    assert_eq!(grid.color_index(bx, by), Some(0));
}

#[test]
fn grid_axes_follow_departure_and_inverted_travel() {
    let spec = inner_outer_spec();
    let bounds = WindowBounds::new(10.0, 30.0, 40.0, 80.0).expect("bounds");
    let request = GridRequest::new(bounds, GridSize::new(5, 3));
    let grid = compute_grid(&evaluator(KeplerianEphemeris), &spec, &request, &Palette::porkchop())
        .expect("grid");

    assert_eq!(grid.x_resolution(), 5.0);
    assert_eq!(grid.y_resolution(), 20.0);
    assert_eq!(grid.cell_times(0, 0), (10.0, 80.0));
    assert_eq!(grid.cell_times(4, 2), (30.0, 40.0));
    assert_eq!(grid.cell_times(2, 1), (20.0, 60.0));
    assert_eq!(grid.cell_nearest(21.0, 58.0), (2, 1));
    assert_eq!(grid.cell_nearest(-100.0, 500.0), (0, 0));
    assert_eq!(grid.cell_nearest(1e9, -1e9), (4, 2));
    assert_eq!(grid.delta_v(5, 0), None);
    assert_eq!(grid.color_index(0, 3), None);
}

#[test]
fn single_cell_grid_samples_window_corner() {
    let spec = inner_outer_spec();
    let bounds = WindowBounds::new(10.0, 30.0, 40.0, 80.0).expect("bounds");
    let request = GridRequest::new(bounds, GridSize::new(1, 1));
    let grid = compute_grid(&evaluator(KeplerianEphemeris), &spec, &request, &Palette::porkchop())
        .expect("grid");
    assert_eq!(grid.cell_times(0, 0), (10.0, 80.0));
    assert_eq!(grid.best_cell(), (0, 0));
    assert_eq!(grid.color_index(0, 0), Some(0));
}

#[test]
fn compute_grid_is_deterministic() {
    let spec = inner_outer_spec();
    let bounds = WindowBounds::new(0.0, 200.0, 30.0, 110.0).expect("bounds");
    let request = GridRequest::new(bounds, GridSize::new(21, 11));
    let eval = evaluator(KeplerianEphemeris);
    let first = compute_grid(&eval, &spec, &request, &Palette::porkchop()).expect("first");
    let second = compute_grid(&eval, &spec, &request, &Palette::porkchop()).expect("second");
    assert_eq!(first, second);
    let bits = |grid: &transfer_window_planner::transfer::PorkchopGrid| {
        grid.delta_v_values()
            .iter()
            .map(|v| v.map(f64::to_bits))
            .collect::<Vec<_>>()
    };
    assert_eq!(bits(&first), bits(&second));
}

#[test]
fn unsolvable_cells_are_marked_invalid_without_touching_neighbours() {
    let spec = inner_outer_spec();
    // Arrival at UT 5 lands the destination on the origin: no conic joins the two.
    let ephemeris = BlackoutEphemeris {
        origin: "Inner",
        start: 4.5,
        end: 5.5,
    };
    let eval = evaluator(ephemeris);
    let bounds = WindowBounds::new(0.0, 10.0, 1.0, 3.0).expect("bounds");
    let request = GridRequest::new(bounds, GridSize::new(11, 3));
    let grid = compute_grid(&eval, &spec, &request, &Palette::porkchop()).expect("grid");

    let invalid = [(2, 0), (3, 1), (4, 2)];
    assert_eq!(grid.invalid_cells(), invalid.len());
    assert_eq!(grid.statistics().valid_count, 33 - invalid.len());
    for y in 0..grid.height() {
        for x in 0..grid.width() {
            if invalid.contains(&(x, y)) {
                assert_eq!(grid.delta_v(x, y), None, "cell ({x}, {y})");
                assert_eq!(grid.color_index(x, y), None, "cell ({x}, {y})");
            } else {
                let (departure, travel) = grid.cell_times(x, y);
                let direct = eval
                    .total_delta_v(&spec.request(departure, travel))
                    .expect("direct evaluation");
                assert_eq!(grid.delta_v(x, y), Some(direct), "cell ({x}, {y})");
                assert!(grid.color_index(x, y).is_some());
            }
        }
    }
}

#[test]
fn window_without_any_transfer_is_reported() {
    let spec = inner_outer_spec();
    let ephemeris = BlackoutEphemeris {
        origin: "Inner",
        start: f64::NEG_INFINITY,
        end: f64::INFINITY,
    };
    let bounds = WindowBounds::new(0.0, 10.0, 1.0, 3.0).expect("bounds");
    let request = GridRequest::new(bounds, GridSize::new(4, 4));
    let result = compute_grid(&evaluator(ephemeris), &spec, &request, &Palette::porkchop());
    assert_eq!(result, Err(GridError::NoSolutionInWindow));
    assert_eq!(
        GridError::NoSolutionInWindow.to_string(),
        "no transfer found in the selected window"
    );
}

#[test]
fn invalid_grid_requests_fail_before_computing() {
    let spec = inner_outer_spec();
    let eval = evaluator(KeplerianEphemeris);
    let bounds = WindowBounds::new(0.0, 10.0, 1.0, 3.0).expect("bounds");
    let mut rows = 0;

    for size in [GridSize::new(0, 4), GridSize::new(4, 0)] {
        let result = compute_grid_with_progress(
            &eval,
            &spec,
            &GridRequest::new(bounds, size),
            &Palette::porkchop(),
            |done| rows = done,
        );
        assert!(matches!(result, Err(GridError::InvalidRequest(_))));
    }
    assert_eq!(rows, 0, "no rows evaluated for rejected requests");

    let zero_travel = WindowBounds {
        departure_min: 0.0,
        departure_max: 10.0,
        travel_min: 0.0,
        travel_max: 3.0,
    };
    assert!(matches!(
        compute_grid(&eval, &spec, &GridRequest::new(zero_travel, GridSize::new(3, 3)), &Palette::porkchop()),
        Err(GridError::InvalidRequest(_))
    ));

    let (inner, _) = inner_outer();
    let same = TransferSpec::new(inner.clone(), inner);
    assert!(matches!(
        compute_grid(&eval, &same, &GridRequest::new(bounds, GridSize::new(3, 3)), &Palette::porkchop()),
        Err(GridError::InvalidRequest(_))
    ));
}

#[test]
fn oversized_grids_are_rejected_before_allocation() {
    let spec = inner_outer_spec();
    let eval = evaluator(KeplerianEphemeris);
    let bounds = WindowBounds::new(0.0, 10.0, 1.0, 3.0).expect("bounds");

    for size in [GridSize::new(usize::MAX, 2), GridSize::new(2, usize::MAX / 2 + 1)] {
        let request = GridRequest::new(bounds, size);
        assert!(matches!(request.validate(), Err(GridError::InvalidRequest(_))));
        assert!(matches!(
            compute_grid(&eval, &spec, &request, &Palette::porkchop()),
            Err(GridError::InvalidRequest(_))
        ));
    }

    let dense = GridSize::from_points_per_day(&bounds, f64::MAX, 1.0, 1.0);
    assert_eq!(dense.width, usize::MAX);
    assert!(matches!(
        GridRequest::new(bounds, dense).validate(),
        Err(GridError::InvalidRequest(_))
    ));
}

#[test]
fn progress_reports_every_row() {
    let spec = inner_outer_spec();
    let bounds = WindowBounds::new(0.0, 100.0, 30.0, 90.0).expect("bounds");
    let request = GridRequest::new(bounds, GridSize::new(6, 7));
    let mut rows = Vec::new();
    compute_grid_with_progress(
        &evaluator(KeplerianEphemeris),
        &spec,
        &request,
        &Palette::porkchop(),
        |done| rows.push(done),
    )
    .expect("grid");
    assert_eq!(rows, (1..=7).collect::<Vec<_>>());
}

#[test]
fn porkchop_palette_ramp() {
    let palette = Palette::porkchop();
    assert_eq!(palette.len(), 4 * 64 + 1);
    assert_eq!(palette.color(0), Some([0, 0, 255]));
    assert_eq!(palette.color(palette.len() - 1), Some([255, 0, 0]));
    assert_eq!(palette.color(64), Some([0, 255, 255]));
    assert_eq!(palette.color(palette.len()), None);
    assert!(Palette::from_stops(&[[0, 0, 0]], 8).is_err());
    assert!(Palette::from_stops(&[[0, 0, 0], [1, 1, 1]], 0).is_err());

    assert_eq!(bucket_index(0.0, 10), 0);
    assert_eq!(bucket_index(0.55, 10), 5);
    assert_eq!(bucket_index(1.0, 10), 9);
    assert_eq!(bucket_index(7.0, 10), 9);
    assert_eq!(bucket_index(-1.0, 10), 0);
    assert_eq!(bucket_index(f64::NAN, 10), 0);
}

#[test]
fn kerbin_to_duna_costs_are_plausible() {
    let configs = load_bodies(concat!(env!("CARGO_MANIFEST_DIR"), "/configs/kerbol_system.yaml"))
        .expect("catalog");
    let system = catalog::from_configs(&configs).expect("system");
    let kerbin = system.body("Kerbin").expect("Kerbin").clone();
    let duna = system.body("duna").expect("Duna").clone();

    let eval = TransferEvaluator::for_origin(KeplerianEphemeris, &system, &kerbin).expect("evaluator");
    let estimate = estimate_default_window(&kerbin, &duna).expect("window");
    let request = GridRequest::new(estimate.bounds, GridSize::new(80, 40));
    let spec = TransferSpec::new(kerbin, duna);
    let grid = compute_grid(&eval, &spec, &request, &Palette::porkchop()).expect("grid");

    let best = grid.statistics().min;
    assert!((1_300.0..2_600.0).contains(&best), "Kerbin -> Duna best total {best} m/s");
    assert_eq!(grid.invalid_cells(), 0);
}

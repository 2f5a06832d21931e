use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use clap::Parser;
use transfer_window_planner::common::time::{days_to_seconds, seconds_to_days};
use transfer_window_planner::common::units::{km_to_m, m_to_km, rad_to_deg};
use transfer_window_planner::common::vector::norm;
use transfer_window_planner::config::{PlannerConfig, load_bodies, load_planner_config};
use transfer_window_planner::export::{self, porkchop::write_grid, solution::write_solution_json};
use transfer_window_planner::transfer::{
    GridError, GridRequest, KeplerianEphemeris, PorkchopJob, PorkchopWorker, TransferEvaluator,
    TransferSolution, TransferSpec, WindowBounds, WorkerError, catalog, estimate_default_window,
    planner, refine, select_best,
};

/// Compute a porkchop grid of total delta-v between two bodies orbiting the same parent.
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Porkchop CSV generator (Lambert transfers, patched-conic burns)"
)]
struct Cli {
    /// Departure body name (case-insensitive)
    #[arg(long)]
    from: String,

    /// Destination body name (case-insensitive)
    #[arg(long)]
    to: String,

    /// Body catalog (YAML list, TOML record, or directory of TOML records)
    #[arg(long, default_value = "configs/kerbol_system.yaml")]
    bodies: PathBuf,

    /// Planner settings (TOML); built-in defaults when omitted
    #[arg(long)]
    planner: Option<PathBuf>,

    /// Earliest departure in days (defaults to the estimated window)
    #[arg(long)]
    depart_start: Option<f64>,

    /// Latest departure in days
    #[arg(long)]
    depart_end: Option<f64>,

    /// Shortest travel time in days
    #[arg(long)]
    travel_min: Option<f64>,

    /// Longest travel time in days
    #[arg(long)]
    travel_max: Option<f64>,

    /// Grid columns (departure axis), overriding the planner settings
    #[arg(long)]
    width: Option<usize>,

    /// Grid rows (travel-time axis), overriding the planner settings
    #[arg(long)]
    height: Option<usize>,

    /// Parking altitude at origin in km (defaults to catalog)
    #[arg(long)]
    origin_altitude: Option<f64>,

    /// Parking altitude at destination in km (defaults to catalog)
    #[arg(long)]
    dest_altitude: Option<f64>,

    /// Fly by the destination instead of capturing into orbit
    #[arg(long, default_value_t = false)]
    flyby: bool,

    /// Refine the cheapest cell with a local search before reporting it
    #[arg(long, default_value_t = false)]
    refine: bool,

    /// Output CSV file (use '-' for stdout)
    #[arg(long, default_value = "artifacts/porkchop.csv")]
    output: PathBuf,

    /// Output JSON file for the selected transfer
    #[arg(long, default_value = "artifacts/transfer.json")]
    solution: PathBuf,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let settings = match &cli.planner {
        Some(path) => load_planner_config(path)?,
        None => PlannerConfig::default(),
    };
    let spd = settings.seconds_per_day;

    let system = catalog::from_configs(&load_bodies(&cli.bodies)?)?;
    let origin = system.body(&cli.from)?.clone();
    let destination = system.body(&cli.to)?.clone();
    let evaluator = TransferEvaluator::for_origin(KeplerianEphemeris, &system, &origin)?;

    let estimate = estimate_default_window(&origin, &destination)?;
    let default = estimate.bounds;
    let day = |value: Option<f64>, fallback: f64| value.map_or(fallback, |d| days_to_seconds(d, spd));
    let bounds = WindowBounds::new(
        day(cli.depart_start, default.departure_min),
        day(cli.depart_end, default.departure_max),
        day(cli.travel_min, default.travel_min),
        day(cli.travel_max, default.travel_max),
    )?;
    log::info!(
        "window: departure {:.1}..{:.1} d, travel {:.1}..{:.1} d (synodic {:.1} d, hohmann {:.1} d)",
        seconds_to_days(bounds.departure_min, spd),
        seconds_to_days(bounds.departure_max, spd),
        seconds_to_days(bounds.travel_min, spd),
        seconds_to_days(bounds.travel_max, spd),
        seconds_to_days(estimate.synodic_period, spd),
        seconds_to_days(estimate.hohmann_time_of_flight, spd),
    );

    let mut size = planner::grid_size(&settings, &bounds);
    size.width = cli.width.unwrap_or(size.width);
    size.height = cli.height.unwrap_or(size.height);

    let origin_altitude = cli
        .origin_altitude
        .map_or(origin.default_parking_altitude_m, km_to_m);
    let dest_altitude = if cli.flyby {
        None
    } else {
        Some(
            cli.dest_altitude
                .map_or(destination.default_parking_altitude_m, km_to_m),
        )
    };
    let spec = TransferSpec::new(origin, destination).with_parking_altitudes(origin_altitude, dest_altitude);

    let mut worker = PorkchopWorker::new();
    worker.start(PorkchopJob {
        evaluator: evaluator.clone(),
        spec: spec.clone(),
        request: GridRequest::new(bounds, size),
        palette: planner::palette(&settings)?,
    })?;

    let mut reported = 0;
    let grid = loop {
        match worker.poll() {
            Ok(Some(grid)) => break grid,
            Ok(None) => {
                let percent = (worker.progress() * 100.0) as usize;
                if percent >= reported + 10 {
                    reported = percent - percent % 10;
                    log::info!("porkchop {reported}% complete");
                }
                thread::sleep(Duration::from_millis(20));
            }
            Err(WorkerError::Grid(GridError::NoSolutionInWindow)) => {
                return Err(anyhow::anyhow!("no transfer found in the selected window"));
            }
            Err(err) => return Err(err.into()),
        }
    };

    let mut writer = export::writer_for_path(&cli.output)?;
    write_grid(&mut writer, &grid, &spec.origin.name, &spec.destination.name)?;

    let solution = if cli.refine {
        let (x, y) = grid.best_cell();
        refine(&evaluator, &spec, &grid, x, y, settings.refine_passes)?
    } else {
        select_best(&evaluator, &spec, &grid)?
    };

    let mut json = export::writer_for_path(&cli.solution)?;
    write_solution_json(&mut json, &solution)?;

    if grid.invalid_cells() > 0 {
        println!(
            "{} of {} cells have no transfer",
            grid.invalid_cells(),
            grid.width() * grid.height()
        );
    }
    print_solution(&solution, spd);
    Ok(())
}

fn print_solution(solution: &TransferSolution, spd: f64) {
    println!("Transfer {} -> {}", solution.origin, solution.destination);
    println!(
        "  depart UT {:.0} s (day {:.2}), travel {:.2} days, arrive UT {:.0} s",
        solution.departure_ut,
        seconds_to_days(solution.departure_ut, spd),
        seconds_to_days(solution.travel_time_s, spd),
        solution.arrival_ut
    );
    println!(
        "  phase angle {:.2} deg, transfer angle {:.2} deg{}",
        rad_to_deg(solution.phase_angle),
        rad_to_deg(solution.transfer_angle),
        if solution.long_way { " (long way)" } else { "" }
    );
    println!(
        "  ejection {:.2} m/s: prograde {:.2}, normal {:.2}, angle {:.2} deg, inclination {:.2} deg",
        solution.ejection_delta_v,
        solution.ejection_dv_prograde,
        solution.ejection_dv_normal,
        rad_to_deg(solution.ejection_angle),
        rad_to_deg(solution.ejection_inclination)
    );
    println!(
        "  insertion {:.2} m/s, inclination {:.2} deg",
        solution.insertion_delta_v,
        rad_to_deg(solution.insertion_inclination)
    );
    println!(
        "  total {:.2} m/s (ejection excess {:.3} km/s)",
        solution.total_delta_v,
        m_to_km(norm(&solution.ejection_excess))
    );
}

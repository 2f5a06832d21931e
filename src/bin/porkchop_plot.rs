use clap::Parser;
use csv::ReaderBuilder;
use plotters::prelude::*;
use std::fs;
use std::path::PathBuf;
use transfer_window_planner::config::{PlannerConfig, load_planner_config};
use transfer_window_planner::transfer::{Palette, planner};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Render a porkchop heatmap from the porkchop CSV"
)]
struct Cli {
    #[arg(long)]
    input: String,
    #[arg(long, default_value = "artifacts/porkchop.png")]
    output: PathBuf,
    /// Planner settings used to compute the grid (palette and day length)
    #[arg(long)]
    planner: Option<PathBuf>,
    #[arg(long, default_value_t = 1200)]
    width: u32,
    #[arg(long, default_value_t = 900)]
    height: u32,
}

#[derive(Debug, Clone)]
struct Cell {
    x: usize,
    y: usize,
    departure_ut: f64,
    travel_time_s: f64,
    delta_v: Option<f64>,
    color_index: Option<usize>,
}

const INVALID_COLOR: RGBColor = RGBColor(160, 160, 160);

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let settings = match &cli.planner {
        Some(path) => load_planner_config(path)?,
        None => PlannerConfig::default(),
    };
    let palette = planner::palette(&settings)?;
    let spd = settings.seconds_per_day;

    let (cells, names) = read_cells(&cli.input)?;
    let width = cells.iter().map(|c| c.x + 1).max().unwrap_or(0);
    let height = cells.iter().map(|c| c.y + 1).max().unwrap_or(0);
    if width == 0 || height == 0 {
        return Err(anyhow::anyhow!("No porkchop cells in the provided CSV"));
    }

    let best = cells
        .iter()
        .filter_map(|c| c.delta_v.map(|dv| (c, dv)))
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .ok_or_else(|| anyhow::anyhow!("no transfer found in the selected window"))?;

    // Axis coordinates in days, indexed by column / row.
    let mut dep_coords = vec![f64::NAN; width];
    let mut travel_coords = vec![f64::NAN; height];
    for cell in &cells {
        dep_coords[cell.x] = cell.departure_ut / spd;
        travel_coords[cell.y] = cell.travel_time_s / spd;
    }
    if dep_coords.iter().chain(&travel_coords).any(|v| !v.is_finite()) {
        return Err(anyhow::anyhow!("CSV does not cover a complete grid"));
    }
    let (dep_min, dep_max) = span(&dep_coords);
    let (travel_min, travel_max) = span(&travel_coords);

    if let Some(parent) = cli.output.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let output_str = cli
        .output
        .to_str()
        .ok_or_else(|| anyhow::anyhow!("Output path contains invalid UTF-8"))?;
    let root = BitMapBackend::new(output_str, (cli.width, cli.height)).into_drawing_area();
    root.fill(&WHITE)?;

    let font_family = select_font_family();
    let caption_font = FontDesc::new(font_family, 24.0, FontStyle::Bold);
    let label_font = FontDesc::new(font_family, 18.0, FontStyle::Normal);

    let legend_width = 140i32;
    let (plot_area, legend_area) =
        root.split_horizontally((cli.width as i32 - legend_width).max(200));

    {
        let (dep_lo, dep_hi) = padded(dep_min, dep_max);
        let (travel_lo, travel_hi) = padded(travel_min, travel_max);
        let mut chart = ChartBuilder::on(&plot_area)
            .margin(20)
            .caption(format!("{} -> {} porkchop", names.0, names.1), caption_font)
            .x_label_area_size(60)
            .y_label_area_size(90)
            .build_cartesian_2d(dep_lo..dep_hi, travel_lo..travel_hi)?;

        chart
            .configure_mesh()
            .x_desc("Departure (days)")
            .y_desc("Travel time (days)")
            .label_style(label_font.clone())
            .x_labels(6)
            .y_labels(6)
            .x_label_formatter(&|d| format!("{d:.0}"))
            .y_label_formatter(&|d| format!("{d:.0}"))
            .draw()?;

        for cell in &cells {
            let (x0, x1) = cell_bounds(&dep_coords, cell.x);
            let (y0, y1) = cell_bounds(&travel_coords, cell.y);
            let color = cell
                .color_index
                .and_then(|idx| palette_color(&palette, idx))
                .unwrap_or(INVALID_COLOR);
            chart.draw_series(std::iter::once(Rectangle::new(
                [(x0, y0), (x1, y1)],
                color.filled(),
            )))?;
        }

        let (best_cell, best_dv) = best;
        let x = dep_coords[best_cell.x];
        let y = travel_coords[best_cell.y];
        let marker_color = RGBColor(20, 20, 20);
        let cross_half_width = (dep_hi - dep_lo) * 0.02;
        let cross_half_height = (travel_hi - travel_lo) * 0.02;
        chart.draw_series(std::iter::once(PathElement::new(
            vec![(x - cross_half_width, y), (x + cross_half_width, y)],
            ShapeStyle::from(&marker_color).stroke_width(3),
        )))?;
        chart.draw_series(std::iter::once(PathElement::new(
            vec![(x, y - cross_half_height), (x, y + cross_half_height)],
            ShapeStyle::from(&marker_color).stroke_width(3),
        )))?;
        let text = format!("Δv = {best_dv:.1} m/s");
        let text_pos = (
            x + 0.02 * (dep_hi - dep_lo),
            y + 0.02 * (travel_hi - travel_lo),
        );
        chart.draw_series(std::iter::once(Text::new(
            text,
            text_pos,
            label_font.clone().color(&marker_color),
        )))?;
    }

    {
        let mut chart = ChartBuilder::on(&legend_area)
            .margin_left(20)
            .margin_right(20)
            .margin_top(30)
            .margin_bottom(30)
            .x_label_area_size(0)
            .y_label_area_size(70)
            .build_cartesian_2d(0.0..1.0, 0.0..1.0)?;

        let steps = palette.len();
        for (i, rgb) in palette.colors().iter().enumerate() {
            let v0 = i as f64 / steps as f64;
            let v1 = (i + 1) as f64 / steps as f64;
            chart.draw_series(std::iter::once(Rectangle::new(
                [(0.0, v0), (1.0, v1)],
                RGBColor(rgb[0], rgb[1], rgb[2]).filled(),
            )))?;
        }

        chart
            .configure_mesh()
            .disable_x_mesh()
            .disable_y_mesh()
            .x_labels(0)
            .y_labels(3)
            .y_desc("Δv (log scale)")
            .y_label_style(label_font.clone())
            .axis_desc_style(label_font.clone())
            .y_label_formatter(&|v| {
                if *v <= 0.0 {
                    "min".to_string()
                } else if *v >= 1.0 {
                    "max".to_string()
                } else {
                    String::new()
                }
            })
            .draw()?;
    }

    root.present()?;
    Ok(())
}

fn select_font_family() -> FontFamily<'static> {
    if cfg!(target_os = "macos") {
        FontFamily::Name("Helvetica")
    } else if cfg!(target_os = "windows") {
        FontFamily::Name("Arial")
    } else {
        FontFamily::Name("DejaVu Sans")
    }
}

fn read_cells(path: &str) -> anyhow::Result<(Vec<Cell>, (String, String))> {
    let mut rdr = ReaderBuilder::new().has_headers(true).from_path(path)?;
    let headers = rdr.headers()?.clone();
    let column = |name: &str| {
        headers
            .iter()
            .position(|h| h.eq_ignore_ascii_case(name))
            .ok_or_else(|| anyhow::anyhow!("CSV missing '{}' column", name))
    };
    let x_idx = column("x")?;
    let y_idx = column("y")?;
    let departure_idx = column("departure_ut")?;
    let travel_idx = column("travel_time_s")?;
    let dv_idx = column("delta_v_m_s")?;
    let color_idx = column("color_index")?;
    let valid_idx = column("valid")?;
    let origin_idx = column("origin")?;
    let destination_idx = column("destination")?;

    let mut cells = Vec::new();
    let mut names = (String::new(), String::new());
    for rec in rdr.records() {
        let r = rec?;
        let field = |idx: usize| r.get(idx).unwrap_or("");
        let x: usize = field(x_idx).parse()?;
        let y: usize = field(y_idx).parse()?;
        let valid = field(valid_idx).eq_ignore_ascii_case("true");
        let delta_v = field(dv_idx).parse::<f64>().ok().filter(|v| valid && v.is_finite());
        let color_index = field(color_idx).parse::<usize>().ok().filter(|_| valid);
        if names.0.is_empty() {
            names = (field(origin_idx).to_string(), field(destination_idx).to_string());
        }
        cells.push(Cell {
            x,
            y,
            departure_ut: field(departure_idx).parse()?,
            travel_time_s: field(travel_idx).parse()?,
            delta_v,
            color_index,
        });
    }
    Ok((cells, names))
}

fn palette_color(palette: &Palette, index: usize) -> Option<RGBColor> {
    palette
        .color(index.min(palette.len().saturating_sub(1)))
        .map(|rgb| RGBColor(rgb[0], rgb[1], rgb[2]))
}

fn span(coords: &[f64]) -> (f64, f64) {
    coords
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)))
}

fn padded(lo: f64, hi: f64) -> (f64, f64) {
    if hi > lo { (lo, hi) } else { (lo - 0.5, hi + 0.5) }
}

/// Edges of cell `idx` along an axis whose centres may run in either direction.
fn cell_bounds(coords: &[f64], idx: usize) -> (f64, f64) {
    let center = coords[idx];
    let prev = idx.checked_sub(1).and_then(|i| coords.get(i)).copied();
    let next = coords.get(idx + 1).copied();

    let left = match (prev, next) {
        (Some(prev), _) => 0.5 * (prev + center),
        (None, Some(next)) => center - 0.5 * (next - center),
        (None, None) => center - 0.5,
    };

    let right = match (prev, next) {
        (_, Some(next)) => 0.5 * (center + next),
        (Some(prev), None) => center + 0.5 * (center - prev),
        (None, None) => center + 0.5,
    };

    (left, right)
}

//! Export helpers for porkchop grids (CSV) and selected transfers (JSON).

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Create a writer for the target path, handling stdout (`-`) by convention.
pub fn writer_for_path(path: &Path) -> io::Result<Box<dyn Write>> {
    if path == Path::new("-") {
        return Ok(Box::new(BufWriter::new(io::stdout())));
    }
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let file = File::create(path)?;
    Ok(Box::new(BufWriter::new(file)))
}

pub mod porkchop {
    use std::borrow::Cow;
    use std::io::{self, Write};

    use twp_transfer::PorkchopGrid;

    pub const HEADER: &str = "x,y,departure_ut,travel_time_s,arrival_ut,delta_v_m_s,color_index,valid,origin,destination";

    /// Write the standard porkchop CSV header.
    pub fn write_header(writer: &mut dyn Write) -> io::Result<()> {
        writeln!(writer, "{}", HEADER)
    }

    /// CSV row for one grid cell.
    #[derive(Debug, Clone)]
    pub struct Record<'a> {
        pub x: usize,
        pub y: usize,
        pub departure_ut: f64,
        pub travel_time_s: f64,
        pub delta_v_m_s: Option<f64>,
        pub color_index: Option<usize>,
        pub origin: &'a str,
        pub destination: &'a str,
    }

    impl Record<'_> {
        /// Serialize the record to CSV, matching the standard header ordering.
        /// Invalid cells leave the cost and colour columns empty.
        pub fn write_to(&self, writer: &mut dyn Write) -> io::Result<()> {
            let delta_v = self
                .delta_v_m_s
                .map(|dv| format!("{dv:.6}"))
                .unwrap_or_default();
            let color = self.color_index.map(|c| c.to_string()).unwrap_or_default();
            writeln!(
                writer,
                "{},{},{:.3},{:.3},{:.3},{},{},{},{},{}",
                self.x,
                self.y,
                self.departure_ut,
                self.travel_time_s,
                self.departure_ut + self.travel_time_s,
                delta_v,
                color,
                self.delta_v_m_s.is_some(),
                csv_field(self.origin),
                csv_field(self.destination),
            )
        }
    }

    /// Quote a text field when it contains a separator, quote or line break.
    fn csv_field(value: &str) -> Cow<'_, str> {
        if value.contains([',', '"', '\n', '\r']) {
            Cow::Owned(format!("\"{}\"", value.replace('"', "\"\"")))
        } else {
            Cow::Borrowed(value)
        }
    }

    /// Write every cell of `grid`, row by row, with a header.
    pub fn write_grid(
        writer: &mut dyn Write,
        grid: &PorkchopGrid,
        origin: &str,
        destination: &str,
    ) -> io::Result<()> {
        write_header(writer)?;
        for y in 0..grid.height() {
            for x in 0..grid.width() {
                let (departure_ut, travel_time_s) = grid.cell_times(x, y);
                Record {
                    x,
                    y,
                    departure_ut,
                    travel_time_s,
                    delta_v_m_s: grid.delta_v(x, y),
                    color_index: grid.color_index(x, y),
                    origin,
                    destination,
                }
                .write_to(writer)?;
            }
        }
        writer.flush()
    }
}

pub mod solution {
    use std::io::{self, Write};

    use serde::Serialize;
    use serde_json::to_writer_pretty;
    use twp_transfer::TransferSolution;

    /// Maneuver handoff record: times in UT seconds, vectors in m/s, angles in radians.
    #[derive(Debug, Clone, Serialize)]
    pub struct TransferRecord {
        pub origin: String,
        pub destination: String,
        pub departure_ut: f64,
        pub arrival_ut: f64,
        pub travel_time_s: f64,
        pub long_way: bool,
        pub transfer_angle_rad: f64,
        pub phase_angle_rad: f64,
        pub total_delta_v_m_s: f64,
        pub ejection: EjectionRecord,
        pub insertion: InsertionRecord,
    }

    #[derive(Debug, Clone, Serialize)]
    pub struct EjectionRecord {
        pub delta_v_m_s: f64,
        pub excess_velocity_m_s: [f64; 3],
        pub burn_m_s: [f64; 3],
        pub prograde_m_s: f64,
        pub normal_m_s: f64,
        pub angle_rad: f64,
        pub inclination_rad: f64,
        pub heading_rad: f64,
    }

    #[derive(Debug, Clone, Serialize)]
    pub struct InsertionRecord {
        pub delta_v_m_s: f64,
        pub excess_velocity_m_s: [f64; 3],
        pub burn_m_s: [f64; 3],
        pub inclination_rad: f64,
    }

    impl From<&TransferSolution> for TransferRecord {
        fn from(solution: &TransferSolution) -> Self {
            Self {
                origin: solution.origin.clone(),
                destination: solution.destination.clone(),
                departure_ut: solution.departure_ut,
                arrival_ut: solution.arrival_ut,
                travel_time_s: solution.travel_time_s,
                long_way: solution.long_way,
                transfer_angle_rad: solution.transfer_angle,
                phase_angle_rad: solution.phase_angle,
                total_delta_v_m_s: solution.total_delta_v,
                ejection: EjectionRecord {
                    delta_v_m_s: solution.ejection_delta_v,
                    excess_velocity_m_s: solution.ejection_excess,
                    burn_m_s: solution.ejection_burn,
                    prograde_m_s: solution.ejection_dv_prograde,
                    normal_m_s: solution.ejection_dv_normal,
                    angle_rad: solution.ejection_angle,
                    inclination_rad: solution.ejection_inclination,
                    heading_rad: solution.ejection_heading,
                },
                insertion: InsertionRecord {
                    delta_v_m_s: solution.insertion_delta_v,
                    excess_velocity_m_s: solution.insertion_excess,
                    burn_m_s: solution.insertion_burn,
                    inclination_rad: solution.insertion_inclination,
                },
            }
        }
    }

    /// Write `solution` as pretty-printed JSON.
    pub fn write_solution_json(writer: &mut dyn Write, solution: &TransferSolution) -> io::Result<()> {
        to_writer_pretty(&mut *writer, &TransferRecord::from(solution))?;
        writeln!(writer)?;
        writer.flush()
    }
}

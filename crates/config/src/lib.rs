//! Configuration models and loaders for the Transfer Window Planner.

use std::fs::File;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// Body record parsed from a system catalog.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct BodyConfig {
    pub name: String,
    #[serde(default)]
    pub parent: Option<String>,
    pub mu_m3_s2: f64,
    pub radius_m: f64,
    #[serde(default)]
    pub default_parking_altitude_m: f64,
    #[serde(default)]
    pub orbit: Option<OrbitConfig>,
}

/// Keplerian elements as written in catalog files (angles in degrees).
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct OrbitConfig {
    pub semi_major_axis_m: f64,
    #[serde(default)]
    pub eccentricity: f64,
    #[serde(default)]
    pub inclination_deg: f64,
    #[serde(default)]
    pub longitude_of_ascending_node_deg: f64,
    #[serde(default)]
    pub argument_of_periapsis_deg: f64,
    #[serde(default)]
    pub mean_anomaly_at_epoch_rad: f64,
    #[serde(default)]
    pub epoch_ut: f64,
}

/// Planner settings: plot resolution, calendar, search refinement, and palette.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct PlannerConfig {
    pub plot_width: usize,
    pub plot_height: usize,
    pub seconds_per_day: f64,
    /// When set, grid dimensions follow the window length instead of `plot_width`/`plot_height`.
    pub points_per_day: Option<f64>,
    pub refine_passes: usize,
    pub palette_steps: usize,
    pub palette_stops: Option<Vec<[u8; 3]>>,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            plot_width: 292,
            plot_height: 292,
            seconds_per_day: 21_600.0,
            points_per_day: None,
            refine_passes: 3,
            palette_steps: 64,
            palette_stops: None,
        }
    }
}

impl PlannerConfig {
    /// Check the settings for values the planner cannot use.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.plot_width == 0 || self.plot_height == 0 {
            return Err(ConfigError::Invalid(format!(
                "plot dimensions must be positive, got {}x{}",
                self.plot_width, self.plot_height
            )));
        }
        if !(self.seconds_per_day.is_finite() && self.seconds_per_day > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "seconds_per_day must be positive, got {}",
                self.seconds_per_day
            )));
        }
        if let Some(ppd) = self.points_per_day {
            if !(ppd.is_finite() && ppd > 0.0) {
                return Err(ConfigError::Invalid(format!(
                    "points_per_day must be positive, got {ppd}"
                )));
            }
        }
        if self.palette_steps == 0 {
            return Err(ConfigError::Invalid(
                "palette_steps must be at least 1".to_string(),
            ));
        }
        if let Some(stops) = &self.palette_stops {
            if stops.len() < 2 {
                return Err(ConfigError::Invalid(format!(
                    "palette needs at least two stops, got {}",
                    stops.len()
                )));
            }
        }
        Ok(())
    }
}

/// Errors that can occur while loading configuration files.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse YAML: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("failed to parse TOML: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Load body records from a YAML list, a single TOML record, or a directory of TOML records.
pub fn load_bodies<P: AsRef<Path>>(path: P) -> Result<Vec<BodyConfig>, ConfigError> {
    let bodies: Vec<BodyConfig> = load_records(path)?;
    if bodies.is_empty() {
        return Err(ConfigError::Invalid("body catalog is empty".to_string()));
    }
    Ok(bodies)
}

/// Load planner settings from a TOML file. Missing fields take their defaults.
pub fn load_planner_config<P: AsRef<Path>>(path: P) -> Result<PlannerConfig, ConfigError> {
    let contents = std::fs::read_to_string(path)?;
    let config: PlannerConfig = toml::from_str(&contents)?;
    config.validate()?;
    Ok(config)
}

fn load_records<T, P>(path: P) -> Result<Vec<T>, ConfigError>
where
    T: for<'de> Deserialize<'de>,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    if path.is_dir() {
        read_dir_records(path)
    } else if path.extension().map(|ext| ext == "toml").unwrap_or(false) {
        let contents = std::fs::read_to_string(path)?;
        let record: T = toml::from_str(&contents)?;
        Ok(vec![record])
    } else {
        let reader = File::open(path)?;
        Ok(serde_yaml::from_reader(reader)?)
    }
}

fn read_dir_records<T>(dir: &Path) -> Result<Vec<T>, ConfigError>
where
    T: for<'de> Deserialize<'de>,
{
    let mut records = Vec::new();
    let mut entries: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.extension().map(|ext| ext == "toml").unwrap_or(false))
        .collect();
    entries.sort();
    for path in entries {
        let contents = std::fs::read_to_string(&path)?;
        let record: T = toml::from_str(&contents)?;
        records.push(record);
    }
    Ok(records)
}

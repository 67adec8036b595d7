//! Routing parameters and site file resolution.

use std::env;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Weight applied to the exposure term of the edge cost.
pub const DEFAULT_EXPOSURE_WEIGHT: f64 = 120.0;
/// Edges at or below this length are exempt from the door constraint.
pub const DEFAULT_SHORT_EDGE_THRESHOLD: f64 = 2.2;
/// A long edge is allowed when its midpoint is this close to a door.
pub const DEFAULT_DOOR_THRESHOLD: f64 = 0.9;
/// Arc-length spacing of risk samples along a route.
pub const DEFAULT_RISK_STEP: f64 = 1.0;
pub const DEFAULT_RISK_ALPHA: f64 = 1.0;
pub const DEFAULT_RISK_BETA: f64 = 25.0;
/// Relative risk difference treated as a tie between candidates.
pub const DEFAULT_NEAR_TIE_BAND: f64 = 0.10;
/// A shelter route passing closer than this to the threat wins a tie.
pub const DEFAULT_CLOSE_ENCOUNTER: f64 = 5.0;
/// Upper bound on node expansions per search.
pub const DEFAULT_MAX_EXPANSIONS: usize = 1_000_000;

/// Environment variable naming the site data directory.
pub const DATA_DIR_ENV: &str = "SHELTERROUTE_DATA_DIR";
pub const SITE_ENV: &str = "SHELTERROUTE_SITE";
pub const DESTINATIONS_ENV: &str = "SHELTERROUTE_DESTINATIONS";
pub const DOORS_ENV: &str = "SHELTERROUTE_DOORS";

const SITE_FILENAME: &str = "site_navgraph.json";
const DESTINATIONS_FILENAME: &str = "destinations.json";
const DOORS_FILENAME: &str = "doors_auto.json";

/// Tunable routing constants.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutingConfig {
    pub exposure_weight: f64,
    pub short_edge_threshold: f64,
    pub door_threshold: f64,
    pub risk_step: f64,
    pub risk_alpha: f64,
    pub risk_beta: f64,
    pub near_tie_band: f64,
    pub close_encounter: f64,
    pub max_expansions: Option<usize>,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            exposure_weight: DEFAULT_EXPOSURE_WEIGHT,
            short_edge_threshold: DEFAULT_SHORT_EDGE_THRESHOLD,
            door_threshold: DEFAULT_DOOR_THRESHOLD,
            risk_step: DEFAULT_RISK_STEP,
            risk_alpha: DEFAULT_RISK_ALPHA,
            risk_beta: DEFAULT_RISK_BETA,
            near_tie_band: DEFAULT_NEAR_TIE_BAND,
            close_encounter: DEFAULT_CLOSE_ENCOUNTER,
            max_expansions: Some(DEFAULT_MAX_EXPANSIONS),
        }
    }
}

impl RoutingConfig {
    /// Check that every constant is usable.
    pub fn validate(&self) -> Result<()> {
        let non_negative = [
            ("exposure_weight", self.exposure_weight),
            ("short_edge_threshold", self.short_edge_threshold),
            ("door_threshold", self.door_threshold),
            ("risk_alpha", self.risk_alpha),
            ("risk_beta", self.risk_beta),
            ("near_tie_band", self.near_tie_band),
            ("close_encounter", self.close_encounter),
        ];
        for (field, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                return Err(Error::validation(
                    field,
                    format!("expected a finite non-negative value, got {}", value),
                ));
            }
        }
        if !(self.risk_step.is_finite() && self.risk_step > 0.0) {
            return Err(Error::validation("risk_step", "must be positive"));
        }
        Ok(())
    }
}

/// Locations of the three site files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SitePaths {
    pub site: PathBuf,
    pub destinations: PathBuf,
    pub doors: PathBuf,
}

impl SitePaths {
    /// Default file names inside `dir`.
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            site: dir.join(SITE_FILENAME),
            destinations: dir.join(DESTINATIONS_FILENAME),
            doors: dir.join(DOORS_FILENAME),
        }
    }

    /// Resolve paths from an explicit directory, then `SHELTERROUTE_DATA_DIR`,
    /// then the platform data directory. Per-file environment variables
    /// override the result.
    pub fn resolve(data_dir: Option<&Path>) -> Result<Self> {
        let dir = match data_dir {
            Some(dir) => dir.to_path_buf(),
            None => match env::var_os(DATA_DIR_ENV) {
                Some(dir) => PathBuf::from(dir),
                None => default_data_dir()?,
            },
        };

        let mut paths = Self::in_dir(&dir);
        if let Some(site) = env::var_os(SITE_ENV) {
            paths.site = PathBuf::from(site);
        }
        if let Some(destinations) = env::var_os(DESTINATIONS_ENV) {
            paths.destinations = PathBuf::from(destinations);
        }
        if let Some(doors) = env::var_os(DOORS_ENV) {
            paths.doors = PathBuf::from(doors);
        }
        Ok(paths)
    }
}

/// Resolve the default site directory using platform-specific project directories.
pub fn default_data_dir() -> Result<PathBuf> {
    let dirs = ProjectDirs::from("org", "shelterroute", "shelterroute")
        .ok_or(Error::ProjectDirsUnavailable)?;
    Ok(dirs.data_dir().to_path_buf())
}

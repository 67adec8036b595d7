// Handlers for the CLI subcommands.
//
// Each module handles one group of subcommands; main.rs only parses arguments
// and dispatches here.

pub mod destinations;
pub mod route;
pub mod site;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};

use shelterroute_cli::output::OutputFormat;
use shelterroute_lib::{Error as RouteError, RoutingConfig, RoutingService, SitePaths};

/// Options shared by every subcommand.
#[derive(Debug, Clone)]
pub struct GlobalOptions {
    pub data_dir: Option<PathBuf>,
    pub config: Option<PathBuf>,
    pub format: OutputFormat,
}

impl GlobalOptions {
    /// Resolve the site files and load the routing service.
    pub fn load_service(&self) -> Result<RoutingService> {
        let paths = SitePaths::resolve(self.data_dir.as_deref())
            .context("failed to resolve the site data directory")?;
        let config = match &self.config {
            Some(path) => load_config(path)?,
            None => RoutingConfig::default(),
        };
        RoutingService::load(&paths, config)
            .with_context(|| format!("failed to load site from {}", paths.site.display()))
    }
}

fn load_config(path: &Path) -> Result<RoutingConfig> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read routing config {}", path.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("failed to parse routing config {}", path.display()))
}

/// Turn a library error into a CLI error, with a hint for negative routing
/// results.
pub fn describe_route_error(err: RouteError) -> anyhow::Error {
    if err.is_no_route() {
        anyhow!(
            "{}\nTry another start position, or check the destination and door files in the data directory.",
            err
        )
    } else {
        anyhow::Error::new(err)
    }
}

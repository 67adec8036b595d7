//! Destination store handlers: `destinations list` and `destinations save`.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use shelterroute_cli::output::{emit, format_counts_text, format_destinations_text};
use shelterroute_lib::DestinationSet;

use super::GlobalOptions;

pub fn handle_list(options: &GlobalOptions) -> Result<()> {
    let service = options.load_service()?;
    let set = service.destinations();
    emit(options.format, set.as_ref(), format_destinations_text)
}

/// Validate the new store, persist it and report the resulting counts.
pub fn handle_save(options: &GlobalOptions, file: &Path) -> Result<()> {
    let contents = fs::read_to_string(file)
        .with_context(|| format!("failed to read destinations from {}", file.display()))?;
    let set: DestinationSet = serde_json::from_str(&contents)
        .with_context(|| format!("failed to parse destinations from {}", file.display()))?;

    let service = options.load_service()?;
    let counts = service
        .save_destinations(set)
        .context("destinations were not saved")?;
    emit(options.format, &counts, format_counts_text)
}

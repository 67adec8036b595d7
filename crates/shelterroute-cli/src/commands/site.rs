//! Site inspection handlers: `health`, `meta` and `doors`.

use anyhow::Result;

use shelterroute_cli::output::{emit, format_doors_text, format_health_text, format_meta_text};

use super::GlobalOptions;

pub fn handle_health(options: &GlobalOptions) -> Result<()> {
    let service = options.load_service()?;
    emit(options.format, &service.health(), format_health_text)
}

pub fn handle_meta(options: &GlobalOptions) -> Result<()> {
    let service = options.load_service()?;
    emit(options.format, &service.site_meta(), format_meta_text)
}

/// Re-reads the door file before listing, like the routing commands do.
pub fn handle_doors(options: &GlobalOptions) -> Result<()> {
    let service = options.load_service()?;
    emit(options.format, &service.list_doors(), format_doors_text)
}

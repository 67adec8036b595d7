//! Route subcommand handlers: `shortest`, `safe`, `portal` and `auto`.

use anyhow::Result;
use clap::ValueEnum;

use shelterroute_cli::output::{
    emit, format_auto_text, format_portal_text, format_safe_text, format_shortest_text,
};
use shelterroute_lib::service::{
    AutoRouteRequest, PortalRouteRequest, SafeRouteRequest, ShortestPathRequest,
};
use shelterroute_lib::{DestinationKind, Point, RouteMode};

use super::{describe_route_error, GlobalOptions};

/// Destination kind accepted by `--prefer`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PreferArg {
    Exit,
    Shelter,
}

impl From<PreferArg> for DestinationKind {
    fn from(value: PreferArg) -> Self {
        match value {
            PreferArg::Exit => DestinationKind::Exit,
            PreferArg::Shelter => DestinationKind::Shelter,
        }
    }
}

/// Routing mode accepted by `--mode`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    Evac,
    Shelter,
}

impl From<ModeArg> for RouteMode {
    fn from(value: ModeArg) -> Self {
        match value {
            ModeArg::Evac => RouteMode::Evac,
            ModeArg::Shelter => RouteMode::Shelter,
        }
    }
}

/// Arguments for the portal command.
#[derive(Debug, Clone, Copy)]
pub struct PortalArgs {
    pub threat: Point,
    pub start: Option<Point>,
    pub mode: Option<ModeArg>,
    pub lshort: Option<f64>,
    pub door_thresh: Option<f64>,
}

impl PortalArgs {
    fn to_request(self) -> PortalRouteRequest {
        PortalRouteRequest {
            threat: self.threat,
            start: self.start,
            mode: self.mode.map(RouteMode::from),
            short_edge_threshold: self.lshort,
            door_threshold: self.door_thresh,
        }
    }
}

pub fn handle_shortest(options: &GlobalOptions, from: Point, to: Point) -> Result<()> {
    let service = options.load_service()?;
    let response = service
        .shortest_path(&ShortestPathRequest {
            start: from,
            goal: to,
        })
        .map_err(describe_route_error)?;
    emit(options.format, &response, format_shortest_text)
}

pub fn handle_safe(
    options: &GlobalOptions,
    start: Point,
    threat: Point,
    prefer: Option<PreferArg>,
) -> Result<()> {
    let service = options.load_service()?;
    let response = service
        .safe_route(&SafeRouteRequest {
            start,
            threat,
            prefer: prefer.map(DestinationKind::from),
        })
        .map_err(describe_route_error)?;
    emit(options.format, &response, format_safe_text)
}

pub fn handle_portal(options: &GlobalOptions, args: PortalArgs) -> Result<()> {
    let service = options.load_service()?;
    let response = service
        .portal_route(&args.to_request())
        .map_err(describe_route_error)?;
    emit(options.format, &response, format_portal_text)
}

pub fn handle_auto(options: &GlobalOptions, start: Point, threat: Point) -> Result<()> {
    let service = options.load_service()?;
    let response = service
        .auto_route(&AutoRouteRequest { start, threat })
        .map_err(describe_route_error)?;
    emit(options.format, &response, format_auto_text)
}

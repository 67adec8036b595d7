//! Output formatting for route and site responses.
//!
//! Every response can be printed as human readable text or as the JSON the
//! library serializes. Text formatters return a `String` so they can be tested
//! without capturing stdout.

use std::fmt::Write as _;

use anyhow::Result;
use clap::ValueEnum;
use serde::Serialize;

use shelterroute_lib::destinations::DestinationCounts;
use shelterroute_lib::service::{
    AutoRouteResponse, CandidateSummary, DoorListing, HealthReport, PortalRouteResponse,
    SafeRouteResponse, ShortestPathResponse, SiteMeta,
};
use shelterroute_lib::DestinationSet;

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human readable summary.
    #[default]
    Text,
    /// Pretty-printed JSON, the same shape the library serializes.
    Json,
}

/// Print `value` in the requested format, using `text` for the text form.
pub fn emit<T: Serialize>(
    format: OutputFormat,
    value: &T,
    text: impl FnOnce(&T) -> String,
) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
        OutputFormat::Text => print!("{}", text(value)),
    }
    Ok(())
}

fn push_route(out: &mut String, route: &[[f64; 2]]) {
    let _ = writeln!(out, "Route ({} points):", route.len());
    for [x, y] in route {
        let _ = writeln!(out, " - ({:.2}, {:.2})", x, y);
    }
}

pub fn format_health_text(report: &HealthReport) -> String {
    format!(
        "{}: {} engine, {} nodes, {} edges ({})\n",
        if report.ok { "ok" } else { "degraded" },
        report.engine,
        report.nodes,
        report.edges,
        report.units
    )
}

pub fn format_meta_text(meta: &SiteMeta) -> String {
    format!(
        "Site: {} nodes, {} edges\nBounds: ({:.2}, {:.2}) to ({:.2}, {:.2}) {}\n",
        meta.nodes,
        meta.edges,
        meta.bbox_xy.min[0],
        meta.bbox_xy.min[1],
        meta.bbox_xy.max[0],
        meta.bbox_xy.max[1],
        meta.units
    )
}

pub fn format_shortest_text(response: &ShortestPathResponse) -> String {
    let mut out = format!("Length: {:.2} m\n", response.length_m);
    push_route(&mut out, &response.route);
    out
}

pub fn format_safe_text(response: &SafeRouteResponse) -> String {
    let mut out = format!(
        "Decision: {} ({} {})\nLength: {:.2} m\n",
        response.decision,
        response.target_kind,
        response.target_id,
        response.length_m
    );
    push_route(&mut out, &response.route);
    out
}

pub fn format_portal_text(response: &PortalRouteResponse) -> String {
    let mut out = format!(
        "Decision: {}\nDoors considered: {}\nLength: {:.2} m\n",
        response.decision,
        response.doors_considered,
        response.length_m
    );
    push_route(&mut out, &response.route);
    out
}

pub fn format_auto_text(response: &AutoRouteResponse) -> String {
    let mut out = format!(
        "Mode: {}\nRisk: {:.3}\nLength: {:.2} m\n",
        response.mode_selected,
        response.risk,
        response.length_m
    );
    let _ = writeln!(out, "Compared:");
    let _ = writeln!(out, "  EVAC    {}", candidate_label(response.compared.evac));
    let _ = writeln!(out, "  SHELTER {}", candidate_label(response.compared.shelter));
    push_route(&mut out, &response.route);
    out
}

pub fn format_doors_text(listing: &DoorListing) -> String {
    let mut out = format!("Doors ({}):\n", listing.count);
    for door in &listing.doors {
        let _ = writeln!(out, " - ({:.2}, {:.2})", door.pos[0], door.pos[1]);
    }
    out
}

pub fn format_destinations_text(set: &DestinationSet) -> String {
    let mut out = String::new();
    for (title, records) in [("Exits", &set.exits), ("Shelters", &set.shelters)] {
        let _ = writeln!(out, "{} ({}):", title, records.len());
        for record in records {
            let _ = writeln!(out, " - {} ({:.2}, {:.2})", record.id, record.x, record.y);
        }
    }
    out
}

pub fn format_counts_text(counts: &DestinationCounts) -> String {
    format!("Saved {} exits and {} shelters\n", counts.exits, counts.shelters)
}

fn candidate_label(candidate: Option<CandidateSummary>) -> String {
    match candidate {
        Some(c) => format!("risk {:.3}, length {:.2} m", c.risk, c.length_m),
        None => "unavailable".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shelterroute_lib::decision::{Decision, RouteMode};
    use shelterroute_lib::service::ComparedCandidates;
    use shelterroute_lib::{Destination, DestinationKind};

    #[test]
    fn safe_route_text_names_target() {
        let response = SafeRouteResponse {
            decision: Decision::Evacuate,
            target_kind: DestinationKind::Exit,
            target_id: "E1".to_string(),
            route: vec![[0.0, 0.0], [2.0, 0.0]],
            length_m: 2.0,
            units: "meters",
        };
        let text = format_safe_text(&response);
        assert!(text.starts_with("Decision: EVACUATE (exit E1)\n"));
        assert!(text.contains("Length: 2.00 m"));
        assert!(text.contains(" - (2.00, 0.00)"));
    }

    #[test]
    fn auto_text_reports_missing_candidate() {
        let response = AutoRouteResponse {
            mode_selected: RouteMode::Shelter,
            route: vec![[1.0, 1.0]],
            length_m: 0.0,
            risk: 12.5,
            compared: ComparedCandidates {
                evac: None,
                shelter: Some(CandidateSummary {
                    risk: 12.5,
                    length_m: 0.0,
                }),
            },
        };
        let text = format_auto_text(&response);
        assert!(text.starts_with("Mode: SHELTER\n"));
        assert!(text.contains("EVAC    unavailable"));
        assert!(text.contains("SHELTER risk 12.500"));
    }

    #[test]
    fn destinations_text_lists_both_kinds() {
        let set = DestinationSet {
            exits: vec![Destination::new("E1", 20.0, 0.0)],
            shelters: Vec::new(),
        };
        let text = format_destinations_text(&set);
        assert_eq!(text, "Exits (1):\n - E1 (20.00, 0.00)\nShelters (0):\n");
    }
}

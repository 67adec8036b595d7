//! Evacuate-or-shelter decision logic.
//!
//! Two stateless strategies sit on top of the router:
//!
//! - [`choose_with_fallback`] tries the preferred destination kind and falls
//!   back to the other kind when the first has no destinations or no path.
//! - [`compare_and_choose`] solves door-constrained routes to both kinds,
//!   scores them and picks one with [`select_mode`].

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::RoutingConfig;
use crate::destinations::{DestinationKind, DestinationSet};
use crate::doors::DoorSnapshot;
use crate::error::{Error, Result};
use crate::geometry::Point;
use crate::graph::{NavGraph, NodeId, NodeIndex};
use crate::path::{find_route_risk_aware, path_ids, PathConstraints, PortalConstraint, RiskQuery};
use crate::risk::{polyline, risk_score, RiskAssessment, RiskParams, Visibility};

/// Label reported to the person being routed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Decision {
    Evacuate,
    Shelter,
}

impl Decision {
    pub fn as_str(self) -> &'static str {
        match self {
            Decision::Evacuate => "EVACUATE",
            Decision::Shelter => "SHELTER",
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<DestinationKind> for Decision {
    fn from(kind: DestinationKind) -> Self {
        match kind {
            DestinationKind::Exit => Decision::Evacuate,
            DestinationKind::Shelter => Decision::Shelter,
        }
    }
}

/// Routing mode used by door-constrained and compare-and-choose routing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RouteMode {
    Evac,
    Shelter,
}

impl RouteMode {
    pub fn target_kind(self) -> DestinationKind {
        match self {
            RouteMode::Evac => DestinationKind::Exit,
            RouteMode::Shelter => DestinationKind::Shelter,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RouteMode::Evac => "EVAC",
            RouteMode::Shelter => "SHELTER",
        }
    }
}

impl fmt::Display for RouteMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<DestinationKind> for RouteMode {
    fn from(kind: DestinationKind) -> Self {
        match kind {
            DestinationKind::Exit => RouteMode::Evac,
            DestinationKind::Shelter => RouteMode::Shelter,
        }
    }
}

/// Read-only inputs shared by every decision in one request.
#[derive(Debug, Clone, Copy)]
pub struct DecisionContext<'a> {
    pub graph: &'a NavGraph,
    pub destinations: &'a DestinationSet,
    pub config: &'a RoutingConfig,
}

/// Destination ids snapped to their nearest graph nodes.
#[derive(Debug, Clone)]
pub struct GoalSet {
    pub kind: DestinationKind,
    targets: Vec<(String, NodeIndex)>,
    nodes: Vec<NodeIndex>,
}

impl GoalSet {
    /// Snap every destination of `kind` onto the graph.
    pub fn snap(graph: &NavGraph, destinations: &DestinationSet, kind: DestinationKind) -> Self {
        let targets: Vec<(String, NodeIndex)> = destinations
            .of_kind(kind)
            .iter()
            .filter_map(|record| {
                graph
                    .nearest_node(record.position())
                    .map(|node| (record.id.clone(), node))
            })
            .collect();
        let mut nodes: Vec<NodeIndex> = targets.iter().map(|(_, node)| *node).collect();
        nodes.sort_unstable();
        nodes.dedup();
        Self {
            kind,
            targets,
            nodes,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> &[NodeIndex] {
        &self.nodes
    }

    /// Id of the first destination snapped onto `node`.
    pub fn target_id(&self, graph: &NavGraph, node: NodeIndex) -> String {
        self.targets
            .iter()
            .find(|(_, target)| *target == node)
            .map(|(id, _)| id.clone())
            .unwrap_or_else(|| format!("{}-node-{}", self.kind, graph.node(node).id))
    }
}

/// Outcome of preference-with-fallback routing.
#[derive(Debug, Clone, PartialEq)]
pub struct FallbackChoice {
    pub decision: Decision,
    pub target_kind: DestinationKind,
    pub target_id: String,
    pub path: Vec<NodeIndex>,
}

/// Route to the preferred kind, falling back to the other kind when the
/// preferred one has no destinations or no reachable destination.
pub fn choose_with_fallback(
    ctx: &DecisionContext<'_>,
    start: NodeIndex,
    threat: Point,
    preferred: DestinationKind,
) -> Result<FallbackChoice> {
    let constraints = PathConstraints {
        portal: None,
        max_expansions: ctx.config.max_expansions,
    };

    for kind in [preferred, preferred.other()] {
        let goals = GoalSet::snap(ctx.graph, ctx.destinations, kind);
        if goals.is_empty() {
            debug!(%kind, "no destinations of this kind");
            continue;
        }

        let query = RiskQuery {
            start,
            goals: goals.nodes(),
            threat,
            exposure_weight: ctx.config.exposure_weight,
        };
        let Some(path) = find_route_risk_aware(ctx.graph, &query, &constraints) else {
            debug!(%kind, "no risk-aware path to this kind");
            continue;
        };

        let hit = *path.last().unwrap_or(&start);
        return Ok(FallbackChoice {
            decision: kind.into(),
            target_kind: kind,
            target_id: goals.target_id(ctx.graph, hit),
            path,
        });
    }

    Err(Error::NoSafeRoute)
}

/// Build the door portal filter, warning when the door set is empty.
pub fn portal_constraint(
    doors: Arc<DoorSnapshot>,
    short_edge_threshold: f64,
    door_threshold: f64,
) -> PortalConstraint {
    if doors.is_empty() {
        warn!("door registry is empty; door-constrained routing only permits short edges");
    }
    PortalConstraint {
        short_edge_threshold,
        door_threshold,
        doors,
    }
}

/// A scored, door-constrained route to one destination kind.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteCandidate {
    pub kind: DestinationKind,
    pub nodes: Vec<NodeId>,
    pub polyline: Vec<Point>,
    pub assessment: RiskAssessment,
}

/// Solve and score a door-constrained route to `kind`. `None` when the kind
/// has no destinations or no path satisfies the constraint.
pub fn solve_candidate(
    ctx: &DecisionContext<'_>,
    start: NodeIndex,
    threat: Point,
    kind: DestinationKind,
    constraints: &PathConstraints,
    visibility: &dyn Visibility,
) -> Option<RouteCandidate> {
    let goals = GoalSet::snap(ctx.graph, ctx.destinations, kind);
    if goals.is_empty() {
        return None;
    }

    let query = RiskQuery {
        start,
        goals: goals.nodes(),
        threat,
        exposure_weight: ctx.config.exposure_weight,
    };
    let path = find_route_risk_aware(ctx.graph, &query, constraints)?;
    let points = polyline(ctx.graph, &path);
    let assessment = risk_score(&points, threat, &RiskParams::from(ctx.config), visibility);

    Some(RouteCandidate {
        kind,
        nodes: path_ids(ctx.graph, &path),
        polyline: points,
        assessment,
    })
}

/// Pick between evacuation and shelter assessments.
///
/// A missing candidate counts as infinite risk. When the two risks are within
/// `near_tie_band` of the lower one, shelter wins if its route passes within
/// `close_encounter` meters of the threat; otherwise the lower risk wins, with
/// exact ties going to evacuation.
pub fn select_mode(
    evac: Option<&RiskAssessment>,
    shelter: Option<&RiskAssessment>,
    near_tie_band: f64,
    close_encounter: f64,
) -> Option<RouteMode> {
    match (evac, shelter) {
        (None, None) => None,
        (Some(_), None) => Some(RouteMode::Evac),
        (None, Some(_)) => Some(RouteMode::Shelter),
        (Some(evac), Some(shelter)) => {
            let lower = evac.risk.min(shelter.risk);
            let near_tie = (evac.risk - shelter.risk).abs() <= near_tie_band * lower;
            let close_call = near_tie && shelter.min_visible_distance() < close_encounter;
            if close_call || shelter.risk < evac.risk {
                Some(RouteMode::Shelter)
            } else {
                Some(RouteMode::Evac)
            }
        }
    }
}

/// Both candidates plus the selected mode.
#[derive(Debug, Clone, PartialEq)]
pub struct AutoChoice {
    pub mode: RouteMode,
    pub evac: Option<RouteCandidate>,
    pub shelter: Option<RouteCandidate>,
}

impl AutoChoice {
    pub fn selected(&self) -> Option<&RouteCandidate> {
        match self.mode {
            RouteMode::Evac => self.evac.as_ref(),
            RouteMode::Shelter => self.shelter.as_ref(),
        }
    }
}

/// Solve door-constrained routes to exits and shelters and choose one.
pub fn compare_and_choose(
    ctx: &DecisionContext<'_>,
    start: NodeIndex,
    threat: Point,
    doors: Arc<DoorSnapshot>,
    visibility: &dyn Visibility,
) -> Result<AutoChoice> {
    let constraints = PathConstraints {
        portal: Some(portal_constraint(
            doors,
            ctx.config.short_edge_threshold,
            ctx.config.door_threshold,
        )),
        max_expansions: ctx.config.max_expansions,
    };

    let evac = solve_candidate(
        ctx,
        start,
        threat,
        DestinationKind::Exit,
        &constraints,
        visibility,
    );
    let shelter = solve_candidate(
        ctx,
        start,
        threat,
        DestinationKind::Shelter,
        &constraints,
        visibility,
    );

    let mode = select_mode(
        evac.as_ref().map(|c| &c.assessment),
        shelter.as_ref().map(|c| &c.assessment),
        ctx.config.near_tie_band,
        ctx.config.close_encounter,
    )
    .ok_or(Error::NoRouteAvailable)?;

    debug!(
        ?mode,
        evac_risk = evac.as_ref().map(|c| c.assessment.risk),
        shelter_risk = shelter.as_ref().map(|c| c.assessment.risk),
        "compared evacuation and shelter candidates"
    );

    Ok(AutoChoice {
        mode,
        evac,
        shelter,
    })
}

//! Request/response facade over the routing core.
//!
//! [`RoutingService`] bundles the immutable site graph with the two
//! reloadable registries (doors and destinations) and the routing constants.
//! It is cheaply cloneable and safe to share between threads: the graph is
//! never mutated, and each request takes its own registry snapshots up front.
//!
//! Every operation validates its request before touching any state and
//! reports negative routing outcomes as typed errors (see
//! [`Error::is_no_route`]).

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::{RoutingConfig, SitePaths};
use crate::decision::{
    choose_with_fallback, compare_and_choose, portal_constraint, Decision, DecisionContext,
    GoalSet, RouteCandidate, RouteMode,
};
use crate::destinations::{
    DestinationCounts, DestinationKind, DestinationRegistry, DestinationSet,
};
use crate::doors::{Door, DoorRegistry};
use crate::error::{Error, Result};
use crate::geometry::Point;
use crate::graph::{NavGraph, NodeIndex};
use crate::path::{
    find_route_risk_aware, find_route_shortest, path_length, PathConstraints, RiskQuery,
};
use crate::risk::{polyline, AlwaysVisible, Visibility};
use crate::site::{load_site, BoundingBox, Site};

/// Unit label attached to every response.
pub const UNITS: &str = "meters";

/// Plain shortest path between two positions.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct ShortestPathRequest {
    pub start: Point,
    pub goal: Point,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShortestPathResponse {
    pub route: Vec<[f64; 2]>,
    pub length_m: f64,
    pub units: &'static str,
}

/// Preference-with-fallback routing request.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct SafeRouteRequest {
    pub start: Point,
    pub threat: Point,
    #[serde(default)]
    pub prefer: Option<DestinationKind>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SafeRouteResponse {
    pub decision: Decision,
    pub target_kind: DestinationKind,
    pub target_id: String,
    pub route: Vec<[f64; 2]>,
    pub length_m: f64,
    pub units: &'static str,
}

/// Door-constrained routing request. Without a start, the route begins at
/// the node nearest the threat.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct PortalRouteRequest {
    pub threat: Point,
    #[serde(default)]
    pub start: Option<Point>,
    #[serde(default)]
    pub mode: Option<RouteMode>,
    #[serde(default, alias = "lshort")]
    pub short_edge_threshold: Option<f64>,
    #[serde(default, alias = "door_thresh")]
    pub door_threshold: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortalRouteResponse {
    pub decision: Decision,
    pub route: Vec<[f64; 2]>,
    pub length_m: f64,
    pub units: &'static str,
    pub doors_considered: usize,
}

/// Compare-and-choose routing request.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct AutoRouteRequest {
    pub start: Point,
    pub threat: Point,
}

/// Risk and length of one compared candidate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CandidateSummary {
    pub risk: f64,
    pub length_m: f64,
}

impl From<&RouteCandidate> for CandidateSummary {
    fn from(candidate: &RouteCandidate) -> Self {
        Self {
            risk: candidate.assessment.risk,
            length_m: candidate.assessment.length,
        }
    }
}

/// Both candidates, reported even when unused.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ComparedCandidates {
    #[serde(rename = "EVAC")]
    pub evac: Option<CandidateSummary>,
    #[serde(rename = "SHELTER")]
    pub shelter: Option<CandidateSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AutoRouteResponse {
    pub mode_selected: RouteMode,
    pub route: Vec<[f64; 2]>,
    pub length_m: f64,
    pub risk: f64,
    pub compared: ComparedCandidates,
}

/// Diagnostic door listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DoorListing {
    pub count: usize,
    pub doors: Vec<Door>,
}

/// A door near a query point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NearbyDoor {
    pub pos: [f64; 2],
    pub distance_m: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HealthReport {
    pub ok: bool,
    pub engine: &'static str,
    pub nodes: usize,
    pub edges: usize,
    pub units: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SiteMeta {
    pub units: &'static str,
    pub bbox_xy: BoundingBox,
    pub nodes: usize,
    pub edges: usize,
}

/// Shared routing state for all transports.
#[derive(Clone)]
pub struct RoutingService {
    inner: Arc<ServiceInner>,
    visibility: Arc<dyn Visibility>,
}

struct ServiceInner {
    site: Site,
    doors: DoorRegistry,
    destinations: DestinationRegistry,
    config: RoutingConfig,
}

impl RoutingService {
    /// Load the site map, destinations and doors from disk.
    ///
    /// A missing or malformed site map is fatal. Missing destination or door
    /// files start the corresponding registry empty.
    pub fn load(paths: &SitePaths, config: RoutingConfig) -> Result<Self> {
        config.validate()?;
        info!(path = %paths.site.display(), "loading site map");
        let site = load_site(&paths.site)?;
        let destinations = DestinationRegistry::load(&paths.destinations)?;
        let doors = DoorRegistry::load(&paths.doors);
        Ok(Self::from_components(site, destinations, doors, config))
    }

    /// Create the service from pre-loaded components.
    pub fn from_components(
        site: Site,
        destinations: DestinationRegistry,
        doors: DoorRegistry,
        config: RoutingConfig,
    ) -> Self {
        Self {
            inner: Arc::new(ServiceInner {
                site,
                doors,
                destinations,
                config,
            }),
            visibility: Arc::new(AlwaysVisible),
        }
    }

    /// Replace the line-of-sight predicate used when scoring routes.
    pub fn with_visibility(mut self, visibility: impl Visibility + 'static) -> Self {
        self.visibility = Arc::new(visibility);
        self
    }

    pub fn graph(&self) -> &NavGraph {
        &self.inner.site.graph
    }

    pub fn config(&self) -> &RoutingConfig {
        &self.inner.config
    }

    pub fn doors(&self) -> &DoorRegistry {
        &self.inner.doors
    }

    pub fn health(&self) -> HealthReport {
        HealthReport {
            ok: true,
            engine: "risk-aware",
            nodes: self.graph().node_count(),
            edges: self.graph().edge_count(),
            units: UNITS,
        }
    }

    pub fn site_meta(&self) -> SiteMeta {
        SiteMeta {
            units: UNITS,
            bbox_xy: self.inner.site.bbox,
            nodes: self.graph().node_count(),
            edges: self.graph().edge_count(),
        }
    }

    /// Current destination snapshot.
    pub fn destinations(&self) -> Arc<DestinationSet> {
        self.inner.destinations.snapshot()
    }

    /// Validate, persist and swap in a new destination set.
    pub fn save_destinations(&self, set: DestinationSet) -> Result<DestinationCounts> {
        self.inner.destinations.save(set)
    }

    /// Plain geometric shortest path; no risk term.
    pub fn shortest_path(&self, request: &ShortestPathRequest) -> Result<ShortestPathResponse> {
        validate_point("start", request.start)?;
        validate_point("goal", request.goal)?;

        let graph = self.graph();
        let start = self.snap(request.start)?;
        let goal = self.snap(request.goal)?;
        let constraints = PathConstraints {
            portal: None,
            max_expansions: self.config().max_expansions,
        };

        let path =
            find_route_shortest(graph, start, goal, &constraints).ok_or(Error::NoPath {
                start: graph.node(start).id,
                goal: graph.node(goal).id,
            })?;

        Ok(ShortestPathResponse {
            route: route_coords(graph, &path),
            length_m: path_length(graph, &path),
            units: UNITS,
        })
    }

    /// Preference-with-fallback routing to exits or shelters.
    pub fn safe_route(&self, request: &SafeRouteRequest) -> Result<SafeRouteResponse> {
        validate_point("start", request.start)?;
        validate_point("threat", request.threat)?;

        let destinations = self.destinations();
        let ctx = self.context(&destinations);
        let start = self.snap(request.start)?;
        let preferred = request.prefer.unwrap_or(DestinationKind::Exit);

        let choice = choose_with_fallback(&ctx, start, request.threat, preferred)?;
        debug!(
            decision = ?choice.decision,
            target = %choice.target_id,
            "safe route selected"
        );

        Ok(SafeRouteResponse {
            decision: choice.decision,
            target_kind: choice.target_kind,
            target_id: choice.target_id,
            route: route_coords(self.graph(), &choice.path),
            length_m: path_length(self.graph(), &choice.path),
            units: UNITS,
        })
    }

    /// Door-constrained risk-aware route. The requested kind falls back to the
    /// other kind only when it has no destinations.
    pub fn portal_route(&self, request: &PortalRouteRequest) -> Result<PortalRouteResponse> {
        validate_point("threat", request.threat)?;
        if let Some(start) = request.start {
            validate_point("start", start)?;
        }
        let short_edge_threshold = validate_threshold(
            "short_edge_threshold",
            request.short_edge_threshold,
            self.config().short_edge_threshold,
        )?;
        let door_threshold = validate_threshold(
            "door_threshold",
            request.door_threshold,
            self.config().door_threshold,
        )?;

        let destinations = self.destinations();
        let mut kind = request.mode.unwrap_or(RouteMode::Evac).target_kind();
        if destinations.of_kind(kind).is_empty() {
            kind = kind.other();
        }
        if destinations.of_kind(kind).is_empty() {
            return Err(Error::NoDestinations);
        }

        let graph = self.graph();
        let goals = GoalSet::snap(graph, &destinations, kind);
        let start = self.snap(request.start.unwrap_or(request.threat))?;

        self.inner.doors.reload();
        let doors = self.inner.doors.snapshot();
        let doors_considered = doors.len();
        let constraints = PathConstraints {
            portal: Some(portal_constraint(doors, short_edge_threshold, door_threshold)),
            max_expansions: self.config().max_expansions,
        };

        let query = RiskQuery {
            start,
            goals: goals.nodes(),
            threat: request.threat,
            exposure_weight: self.config().exposure_weight,
        };
        let path =
            find_route_risk_aware(graph, &query, &constraints).ok_or(Error::NoPortalRoute)?;

        Ok(PortalRouteResponse {
            decision: kind.into(),
            route: route_coords(graph, &path),
            length_m: path_length(graph, &path),
            units: UNITS,
            doors_considered,
        })
    }

    /// Compare door-constrained evacuation and shelter routes and pick one.
    pub fn auto_route(&self, request: &AutoRouteRequest) -> Result<AutoRouteResponse> {
        validate_point("start", request.start)?;
        validate_point("threat", request.threat)?;

        let destinations = self.destinations();
        if destinations.is_empty() {
            return Err(Error::NoRouteAvailable);
        }
        let ctx = self.context(&destinations);
        let start = self.snap(request.start)?;

        self.inner.doors.reload();
        let choice = compare_and_choose(
            &ctx,
            start,
            request.threat,
            self.inner.doors.snapshot(),
            self.visibility.as_ref(),
        )?;
        let selected = choice.selected().ok_or(Error::NoRouteAvailable)?;

        Ok(AutoRouteResponse {
            mode_selected: choice.mode,
            route: selected.polyline.iter().map(|&p| p.into()).collect(),
            length_m: selected.assessment.length,
            risk: selected.assessment.risk,
            compared: ComparedCandidates {
                evac: choice.evac.as_ref().map(CandidateSummary::from),
                shelter: choice.shelter.as_ref().map(CandidateSummary::from),
            },
        })
    }

    /// Reload the door registry and list its contents.
    pub fn list_doors(&self) -> DoorListing {
        let count = self.inner.doors.reload();
        let snapshot = self.inner.doors.snapshot();
        debug!(count, "door registry reloaded for listing");
        DoorListing {
            count: snapshot.len(),
            doors: snapshot.doors().to_vec(),
        }
    }

    /// Doors within `radius` meters of `point`, nearest first.
    pub fn nearby_doors(&self, point: Point, radius: f64) -> Result<Vec<NearbyDoor>> {
        validate_point("point", point)?;
        let radius = validate_threshold("radius", Some(radius), radius)?;
        let snapshot = self.inner.doors.snapshot();
        let nearby = snapshot
            .doors_within(point, radius)
            .into_iter()
            .map(|(door, distance)| NearbyDoor {
                pos: door.pos,
                distance_m: distance,
            })
            .collect();
        Ok(nearby)
    }

    fn context<'a>(&'a self, destinations: &'a DestinationSet) -> DecisionContext<'a> {
        DecisionContext {
            graph: self.graph(),
            destinations,
            config: self.config(),
        }
    }

    fn snap(&self, point: Point) -> Result<NodeIndex> {
        self.graph().nearest_node(point).ok_or(Error::EmptySite)
    }
}

impl std::fmt::Debug for RoutingService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoutingService")
            .field("nodes", &self.graph().node_count())
            .field("edges", &self.graph().edge_count())
            .field("doors", &self.inner.doors.snapshot().len())
            .finish()
    }
}

fn route_coords(graph: &NavGraph, path: &[NodeIndex]) -> Vec<[f64; 2]> {
    polyline(graph, path).into_iter().map(Into::into).collect()
}

fn validate_point(field: &'static str, point: Point) -> Result<()> {
    if point.is_finite() {
        Ok(())
    } else {
        Err(Error::validation(field, "coordinates must be finite"))
    }
}

fn validate_threshold(field: &'static str, value: Option<f64>, default: f64) -> Result<f64> {
    let value = value.unwrap_or(default);
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(Error::validation(
            field,
            format!("expected a positive distance in meters, got {}", value),
        ))
    }
}

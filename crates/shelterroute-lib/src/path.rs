//! Risk-aware A* search over the navigation graph.
//!
//! Edge cost is `length + W * exposure(midpoint, threat)` where
//! `exposure(p, t) = 2 / (1 + |p - t|)`. The exposure term is bounded in
//! `(0, 2]` and never negative, so the straight-line distance to the nearest
//! goal stays an admissible, consistent heuristic.
//!
//! The open queue is ordered by `f = g + h`; equal `f` values pop the lower
//! authored node id first, which makes results reproducible regardless of
//! the order nodes were loaded in.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::doors::DoorSnapshot;
use crate::geometry::Point;
use crate::graph::{Edge, NavGraph, NodeId, NodeIndex};

/// Exposure of a point to the threat, in `(0, 2]`.
pub fn exposure(point: Point, threat: Point) -> f64 {
    2.0 / (1.0 + point.distance_to(&threat))
}

/// Risk-weighted cost of traversing `edge` from `from`.
pub fn edge_cost(
    graph: &NavGraph,
    from: NodeIndex,
    edge: &Edge,
    threat: Point,
    exposure_weight: f64,
) -> f64 {
    if exposure_weight == 0.0 {
        return edge.length;
    }
    let midpoint = graph.position(from).midpoint(&graph.position(edge.target));
    edge.length + exposure_weight * exposure(midpoint, threat)
}

/// Hard edge filter forcing long traversals through mapped doorways.
///
/// An edge is forbidden when it is longer than `short_edge_threshold` and its
/// midpoint is farther than `door_threshold` from every door in the snapshot.
#[derive(Debug, Clone)]
pub struct PortalConstraint {
    pub short_edge_threshold: f64,
    pub door_threshold: f64,
    pub doors: Arc<DoorSnapshot>,
}

impl PortalConstraint {
    pub fn allows(&self, graph: &NavGraph, from: NodeIndex, edge: &Edge) -> bool {
        if edge.length <= self.short_edge_threshold {
            return true;
        }
        let midpoint = graph.position(from).midpoint(&graph.position(edge.target));
        self.doors.is_near_door(midpoint, self.door_threshold)
    }
}

/// Constraints applied during pathfinding.
#[derive(Debug, Clone, Default)]
pub struct PathConstraints {
    /// Door portal filter; `None` leaves every edge usable.
    pub portal: Option<PortalConstraint>,
    /// Stop and report no path after this many node expansions.
    pub max_expansions: Option<usize>,
}

impl PathConstraints {
    fn allows(&self, graph: &NavGraph, from: NodeIndex, edge: &Edge) -> bool {
        self.portal
            .as_ref()
            .is_none_or(|portal| portal.allows(graph, from, edge))
    }
}

/// A single risk-aware search.
#[derive(Debug, Clone, Copy)]
pub struct RiskQuery<'a> {
    pub start: NodeIndex,
    pub goals: &'a [NodeIndex],
    pub threat: Point,
    pub exposure_weight: f64,
}

/// Run risk-aware A* from `query.start` to whichever goal is reached first.
///
/// Returns the node sequence from the start to the hit goal, or `None` when the
/// queue empties (or the expansion budget runs out) without reaching a goal.
pub fn find_route_risk_aware(
    graph: &NavGraph,
    query: &RiskQuery<'_>,
    constraints: &PathConstraints,
) -> Option<Vec<NodeIndex>> {
    let node_count = graph.node_count();
    if query.start >= node_count {
        return None;
    }

    let mut is_goal = vec![false; node_count];
    let mut goal_positions = Vec::with_capacity(query.goals.len());
    for &goal in query.goals {
        if goal < node_count && !is_goal[goal] {
            is_goal[goal] = true;
            goal_positions.push(graph.position(goal));
        }
    }
    if goal_positions.is_empty() {
        return None;
    }

    let heuristic = |node: NodeIndex| -> f64 {
        let position = graph.position(node);
        goal_positions
            .iter()
            .map(|goal| position.distance_to(goal))
            .fold(f64::INFINITY, f64::min)
    };

    let mut g_score = vec![f64::INFINITY; node_count];
    let mut parents: Vec<Option<NodeIndex>> = vec![None; node_count];
    let mut queue = BinaryHeap::new();
    let mut expanded = 0usize;

    g_score[query.start] = 0.0;
    queue.push(AStarEntry::new(
        query.start,
        graph.node(query.start).id,
        0.0,
        heuristic(query.start),
    ));

    while let Some(entry) = queue.pop() {
        if entry.cost.0 > g_score[entry.node] {
            continue;
        }

        if is_goal[entry.node] {
            debug!(expanded, goal = entry.id, "risk-aware search reached goal");
            return Some(reconstruct_path(&parents, query.start, entry.node));
        }

        expanded += 1;
        if let Some(limit) = constraints.max_expansions {
            if expanded > limit {
                warn!(limit, "search expansion budget exhausted, reporting no path");
                return None;
            }
        }

        let current_score = g_score[entry.node];
        for edge in graph.neighbours(entry.node) {
            if !constraints.allows(graph, entry.node, edge) {
                continue;
            }

            let tentative_g = current_score
                + edge_cost(graph, entry.node, edge, query.threat, query.exposure_weight);
            if tentative_g < g_score[edge.target] {
                g_score[edge.target] = tentative_g;
                parents[edge.target] = Some(entry.node);
                queue.push(AStarEntry::new(
                    edge.target,
                    graph.node(edge.target).id,
                    tentative_g,
                    heuristic(edge.target),
                ));
            }
        }
    }

    debug!(expanded, "risk-aware search exhausted the queue");
    None
}

/// Plain geometric shortest path between two nodes (no exposure term).
pub fn find_route_shortest(
    graph: &NavGraph,
    start: NodeIndex,
    goal: NodeIndex,
    constraints: &PathConstraints,
) -> Option<Vec<NodeIndex>> {
    let goals = [goal];
    let query = RiskQuery {
        start,
        goals: &goals,
        threat: Point::default(),
        exposure_weight: 0.0,
    };
    find_route_risk_aware(graph, &query, constraints)
}

/// Sum of authored edge lengths along a node path.
pub fn path_length(graph: &NavGraph, path: &[NodeIndex]) -> f64 {
    path.windows(2)
        .map(|pair| graph.edge_length(pair[0], pair[1]).unwrap_or(0.0))
        .sum()
}

/// Authored ids for a path of arena indices.
pub fn path_ids(graph: &NavGraph, path: &[NodeIndex]) -> Vec<NodeId> {
    path.iter().map(|&index| graph.node(index).id).collect()
}

fn reconstruct_path(
    parents: &[Option<NodeIndex>],
    start: NodeIndex,
    goal: NodeIndex,
) -> Vec<NodeIndex> {
    let mut path = Vec::new();
    let mut current = Some(goal);
    while let Some(node) = current {
        path.push(node);
        if node == start {
            break;
        }
        current = parents[node];
    }
    path.reverse();
    path
}

#[derive(Copy, Clone, Debug, Default)]
struct FloatOrd(f64);

impl PartialEq for FloatOrd {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for FloatOrd {}

impl PartialOrd for FloatOrd {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FloatOrd {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
struct AStarEntry {
    node: NodeIndex,
    id: NodeId,
    cost: FloatOrd,
    estimate: FloatOrd,
}

impl AStarEntry {
    fn new(node: NodeIndex, id: NodeId, cost: f64, heuristic: f64) -> Self {
        Self {
            node,
            id,
            cost: FloatOrd(cost),
            estimate: FloatOrd(cost + heuristic),
        }
    }
}

impl Ord for AStarEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering so BinaryHeap becomes a min-heap by estimate, then id.
        other
            .estimate
            .cmp(&self.estimate)
            .then_with(|| other.id.cmp(&self.id))
    }
}

impl PartialOrd for AStarEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::geometry::Point;
use crate::spatial::PointIndex;

/// Identifier of a node as authored in the site map.
pub type NodeId = i64;

/// Dense arena position of a node inside a [`NavGraph`].
pub type NodeIndex = usize;

/// Navigation node with its position in meters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub x: f64,
    pub y: f64,
}

impl Node {
    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// Undirected edge as authored in the site map. The length is stored
/// explicitly so authored overrides survive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EdgeSpec {
    pub from: NodeId,
    pub to: NodeId,
    pub length: f64,
}

/// Edge within the routing graph, stored once per direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    pub target: NodeIndex,
    pub length: f64,
}

/// Immutable navigation graph: node arena, adjacency lists and a static
/// nearest-node index.
///
/// Built once and only read afterwards, so it can be shared between threads
/// behind an `Arc` with no locking.
#[derive(Debug)]
pub struct NavGraph {
    nodes: Vec<Node>,
    id_to_index: HashMap<NodeId, NodeIndex>,
    adjacency: Vec<Vec<Edge>>,
    edge_count: usize,
    locator: PointIndex,
}

impl NavGraph {
    /// Build the graph from a node set and an edge list.
    ///
    /// Fails when a node id is duplicated, an edge references an unknown node,
    /// an edge is a self-loop, or an edge length is not strictly positive.
    /// Repeated edges between the same pair keep the shorter length.
    pub fn build(nodes: Vec<Node>, edges: &[EdgeSpec]) -> Result<Self> {
        let mut id_to_index = HashMap::with_capacity(nodes.len());
        for (index, node) in nodes.iter().enumerate() {
            if id_to_index.insert(node.id, index).is_some() {
                return Err(Error::DuplicateNode { node: node.id });
            }
        }

        let mut adjacency: Vec<Vec<Edge>> = vec![Vec::new(); nodes.len()];
        let mut edge_count = 0;
        for spec in edges {
            let from = *id_to_index
                .get(&spec.from)
                .ok_or(Error::UnknownNode { node: spec.from })?;
            let to = *id_to_index
                .get(&spec.to)
                .ok_or(Error::UnknownNode { node: spec.to })?;
            if from == to {
                return Err(Error::SelfLoop { node: spec.from });
            }
            if !(spec.length.is_finite() && spec.length > 0.0) {
                return Err(Error::InvalidEdgeLength {
                    from: spec.from,
                    to: spec.to,
                    length: spec.length,
                });
            }

            if let Some(existing) = adjacency[from].iter_mut().find(|edge| edge.target == to) {
                if spec.length < existing.length {
                    existing.length = spec.length;
                    if let Some(reverse) =
                        adjacency[to].iter_mut().find(|edge| edge.target == from)
                    {
                        reverse.length = spec.length;
                    }
                }
                continue;
            }

            adjacency[from].push(Edge {
                target: to,
                length: spec.length,
            });
            adjacency[to].push(Edge {
                target: from,
                length: spec.length,
            });
            edge_count += 1;
        }

        let locator = PointIndex::build(nodes.iter().map(Node::position));

        Ok(Self {
            nodes,
            id_to_index,
            adjacency,
            edge_count,
            locator,
        })
    }

    /// Number of nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of undirected edges.
    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Node stored at an arena index.
    pub fn node(&self, index: NodeIndex) -> &Node {
        &self.nodes[index]
    }

    pub fn index_of(&self, id: NodeId) -> Option<NodeIndex> {
        self.id_to_index.get(&id).copied()
    }

    pub fn position(&self, index: NodeIndex) -> Point {
        self.nodes[index].position()
    }

    /// Return the outgoing edges for an arena index.
    pub fn neighbours(&self, index: NodeIndex) -> &[Edge] {
        self.adjacency
            .get(index)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Neighbours of a node by its authored id, as `(neighbour id, edge)` pairs.
    pub fn neighbours_of(&self, id: NodeId) -> impl Iterator<Item = (NodeId, &Edge)> + '_ {
        self.index_of(id)
            .map(|index| self.neighbours(index))
            .unwrap_or(&[])
            .iter()
            .map(move |edge| (self.nodes[edge.target].id, edge))
    }

    /// Authored length of the edge between two adjacent nodes.
    pub fn edge_length(&self, from: NodeIndex, to: NodeIndex) -> Option<f64> {
        self.neighbours(from)
            .iter()
            .find(|edge| edge.target == to)
            .map(|edge| edge.length)
    }

    /// Arena index of the node closest to `point`, or `None` for an empty graph.
    pub fn nearest_node(&self, point: Point) -> Option<NodeIndex> {
        self.locator.nearest(point).map(|(index, _)| index)
    }
}

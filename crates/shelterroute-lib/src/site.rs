//! Static site map loading.
//!
//! The site map is read once at startup:
//!
//! ```text
//! { "nodes": [{ "id": 1, "x": 0.0, "y": 0.0 }, ...],
//!   "edges": [{ "from": 1, "to": 2, "length": 3.5 }, ...],
//!   "bbox_xy": { "min": [x, y], "max": [x, y] } }   // optional
//! ```
//!
//! Any failure here is a configuration error and the process should not start.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::graph::{EdgeSpec, NavGraph, Node};

/// Axis-aligned bounding box of the site in meters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min: [f64; 2],
    pub max: [f64; 2],
}

impl BoundingBox {
    fn of_nodes(nodes: &[Node]) -> Option<Self> {
        let first = nodes.first()?;
        let mut bbox = Self {
            min: [first.x, first.y],
            max: [first.x, first.y],
        };
        for node in &nodes[1..] {
            bbox.min[0] = bbox.min[0].min(node.x);
            bbox.min[1] = bbox.min[1].min(node.y);
            bbox.max[0] = bbox.max[0].max(node.x);
            bbox.max[1] = bbox.max[1].max(node.y);
        }
        Some(bbox)
    }
}

/// Raw site map file contents.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SiteDescription {
    pub nodes: Vec<Node>,
    pub edges: Vec<EdgeSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bbox_xy: Option<BoundingBox>,
}

/// Loaded site: the immutable graph plus descriptive metadata.
#[derive(Debug)]
pub struct Site {
    pub graph: NavGraph,
    pub bbox: BoundingBox,
}

impl Site {
    /// Build a site from an in-memory description.
    ///
    /// Self-loop edges are dropped with a warning; every other structural
    /// problem is rejected by [`NavGraph::build`].
    pub fn from_description(description: SiteDescription) -> Result<Self> {
        if description.nodes.is_empty() {
            return Err(Error::EmptySite);
        }

        let (edges, loops): (Vec<EdgeSpec>, Vec<EdgeSpec>) = description
            .edges
            .into_iter()
            .partition(|edge| edge.from != edge.to);
        if !loops.is_empty() {
            warn!(count = loops.len(), "skipping self-loop edges in site map");
        }

        let bbox = match description.bbox_xy {
            Some(bbox) => bbox,
            None => BoundingBox::of_nodes(&description.nodes).ok_or(Error::EmptySite)?,
        };
        let graph = NavGraph::build(description.nodes, &edges)?;

        Ok(Self { graph, bbox })
    }
}

/// Load the site map at `path` and build its navigation graph.
pub fn load_site(path: &Path) -> Result<Site> {
    if !path.exists() {
        return Err(Error::SiteNotFound {
            path: path.to_path_buf(),
        });
    }

    let contents = fs::read_to_string(path)?;
    let description: SiteDescription =
        serde_json::from_str(&contents).map_err(|e| Error::SiteParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

    let site = Site::from_description(description)?;
    info!(
        path = %path.display(),
        nodes = site.graph.node_count(),
        edges = site.graph.edge_count(),
        "loaded navigation graph"
    );
    Ok(site)
}

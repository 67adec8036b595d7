use std::path::PathBuf;

use thiserror::Error;

use crate::graph::NodeId;

/// Convenient result alias for the shelterroute library.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level library error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Static site map could not be located at the resolved path.
    #[error("site map not found at {path}")]
    SiteNotFound { path: PathBuf },

    /// Static site map exists but could not be decoded.
    #[error("failed to parse site map at {path}: {message}")]
    SiteParse { path: PathBuf, message: String },

    /// Site map contained no nodes, so no nearest-node query can succeed.
    #[error("site map contains no nodes")]
    EmptySite,

    /// An edge referenced a node id that is not part of the node set.
    #[error("edge references unknown node {node}")]
    UnknownNode { node: NodeId },

    /// The same node id appeared more than once.
    #[error("duplicate node id {node}")]
    DuplicateNode { node: NodeId },

    /// An edge connected a node to itself.
    #[error("self-loop edge on node {node}")]
    SelfLoop { node: NodeId },

    /// Edge lengths must be finite and strictly positive.
    #[error("edge {from}-{to} has invalid length {length}")]
    InvalidEdgeLength { from: NodeId, to: NodeId, length: f64 },

    /// No suitable project directories could be resolved for this platform.
    #[error("failed to resolve project directories for site data")]
    ProjectDirsUnavailable,

    /// Malformed or incomplete request payload.
    #[error("invalid {field}: {message}")]
    Validation { field: &'static str, message: String },

    /// Plain shortest path found no connection between the snapped nodes.
    #[error("no path found between node {start} and node {goal}")]
    NoPath { start: NodeId, goal: NodeId },

    /// Neither exits nor shelters could be reached (or none are defined).
    #[error("no safe route to exits or shelters")]
    NoSafeRoute,

    /// Door-constrained search exhausted the graph without reaching a goal.
    #[error("no path found under door portal constraints")]
    NoPortalRoute,

    /// Neither destination kind has any entries.
    #[error("no destinations available")]
    NoDestinations,

    /// Both compare-and-choose candidates were absent or unreachable.
    #[error("no route available to exits or shelters")]
    NoRouteAvailable,

    /// Persisting the destination set failed.
    #[error("failed to write destinations to {path}: {message}")]
    DestinationsWrite { path: PathBuf, message: String },

    /// Wrapper for IO errors.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Wrapper for JSON errors.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Whether this error is a normal negative routing result rather than a
    /// configuration or validation failure.
    pub fn is_no_route(&self) -> bool {
        matches!(
            self,
            Error::NoPath { .. }
                | Error::NoSafeRoute
                | Error::NoPortalRoute
                | Error::NoDestinations
                | Error::NoRouteAvailable
        )
    }

    /// Whether this error was caused by a malformed request.
    pub fn is_validation(&self) -> bool {
        matches!(self, Error::Validation { .. })
    }

    pub(crate) fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Error::Validation {
            field,
            message: message.into(),
        }
    }
}

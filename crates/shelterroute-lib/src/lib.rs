//! Shelterroute library entry points.
//!
//! This crate loads a static site navigation graph, keeps the reloadable door
//! and destination registries, and runs risk-aware pathfinding plus the
//! evacuate-or-shelter decision logic. Transports (the CLI today) should only
//! depend on the items exported here, in particular [`RoutingService`].
//!

#![deny(warnings)]

pub mod config;
pub mod decision;
pub mod destinations;
pub mod doors;
pub mod error;
pub mod geometry;
pub mod graph;
pub mod path;
pub mod risk;
pub mod service;
pub mod site;
pub mod spatial;

pub use config::{default_data_dir, RoutingConfig, SitePaths};
pub use decision::{
    choose_with_fallback, compare_and_choose, select_mode, AutoChoice, Decision, FallbackChoice,
    RouteCandidate, RouteMode,
};
pub use destinations::{Destination, DestinationKind, DestinationRegistry, DestinationSet};
pub use doors::{Door, DoorRegistry, DoorSnapshot};
pub use error::{Error, Result};
pub use geometry::Point;
pub use graph::{EdgeSpec, NavGraph, Node, NodeId, NodeIndex};
pub use path::{find_route_risk_aware, find_route_shortest, PathConstraints, PortalConstraint};
pub use risk::{risk_score, AlwaysVisible, RiskAssessment, RiskParams, Visibility};
pub use service::{
    AutoRouteRequest, PortalRouteRequest, RoutingService, SafeRouteRequest, ShortestPathRequest,
};
pub use site::{load_site, Site, SiteDescription};

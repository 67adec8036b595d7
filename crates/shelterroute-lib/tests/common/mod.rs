//! Common test utilities and fixture helpers.
//!
//! The fixture site under `docs/fixtures` is a 20 m corridor along y = 0
//! (nodes 1..=11, 2 m apart) with exit `E1` at its east end, a shelter room
//! `S1` at (10, 6) reached from node 6 through a door at (10, 3), and an
//! undoored detour via node 30 at (0, 6).

use std::fs;
use std::path::PathBuf;

use shelterroute_lib::{EdgeSpec, NavGraph, Node, RoutingConfig, RoutingService, SitePaths};
use tempfile::TempDir;

/// Path to the fixtures directory shared by the workspace.
#[allow(dead_code)]
pub fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../docs/fixtures")
}

/// Service loaded straight from the read-only fixtures.
#[allow(dead_code)]
pub fn fixture_service() -> RoutingService {
    let paths = SitePaths::in_dir(&fixtures_dir());
    RoutingService::load(&paths, RoutingConfig::default()).expect("fixture site loads")
}

/// Writable copy of the fixture data directory.
#[allow(dead_code)]
pub struct TempSite {
    /// Temp directory (dropped on struct drop)
    _temp_dir: TempDir,
    pub paths: SitePaths,
}

#[allow(dead_code)]
impl TempSite {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("create temp dir");
        let paths = SitePaths::in_dir(temp_dir.path());
        let fixtures = SitePaths::in_dir(&fixtures_dir());

        fs::copy(&fixtures.site, &paths.site).expect("copy site map");
        fs::copy(&fixtures.destinations, &paths.destinations).expect("copy destinations");
        fs::copy(&fixtures.doors, &paths.doors).expect("copy doors");

        Self {
            _temp_dir: temp_dir,
            paths,
        }
    }

    pub fn service(&self) -> RoutingService {
        RoutingService::load(&self.paths, RoutingConfig::default()).expect("temp site loads")
    }

    pub fn write_doors(&self, json: &str) {
        fs::write(&self.paths.doors, json).expect("write door file");
    }

    pub fn write_destinations(&self, json: &str) {
        fs::write(&self.paths.destinations, json).expect("write destination file");
    }
}

/// 10 m square: 1 (0,0) - 2 (10,0) - 3 (10,10) - 4 (0,10) - 1.
#[allow(dead_code)]
pub fn square_graph() -> NavGraph {
    NavGraph::build(
        vec![
            node(1, 0.0, 0.0),
            node(2, 10.0, 0.0),
            node(3, 10.0, 10.0),
            node(4, 0.0, 10.0),
        ],
        &[edge(1, 2, 10.0), edge(2, 3, 10.0), edge(3, 4, 10.0), edge(4, 1, 10.0)],
    )
    .expect("valid square graph")
}

#[allow(dead_code)]
pub fn node(id: i64, x: f64, y: f64) -> Node {
    Node { id, x, y }
}

#[allow(dead_code)]
pub fn edge(from: i64, to: i64, length: f64) -> EdgeSpec {
    EdgeSpec { from, to, length }
}

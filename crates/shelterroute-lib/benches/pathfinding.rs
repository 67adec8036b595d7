use criterion::{criterion_group, criterion_main, Criterion};
use once_cell::sync::Lazy;
use shelterroute_lib::path::RiskQuery;
use shelterroute_lib::service::{AutoRouteRequest, SafeRouteRequest};
use shelterroute_lib::{
    find_route_risk_aware, find_route_shortest, EdgeSpec, NavGraph, Node, PathConstraints, Point,
    RoutingConfig, RoutingService, SitePaths,
};
use std::hint::black_box;
use std::path::PathBuf;

const GRID: i64 = 60;
const SPACING: f64 = 2.0;

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../docs/fixtures")
}

/// Square lattice of `GRID * GRID` nodes with 2 m edges.
static LATTICE: Lazy<NavGraph> = Lazy::new(|| {
    let mut nodes = Vec::new();
    let mut edges = Vec::new();
    for row in 0..GRID {
        for col in 0..GRID {
            let id = row * GRID + col;
            nodes.push(Node {
                id,
                x: col as f64 * SPACING,
                y: row as f64 * SPACING,
            });
            if col + 1 < GRID {
                edges.push(EdgeSpec {
                    from: id,
                    to: id + 1,
                    length: SPACING,
                });
            }
            if row + 1 < GRID {
                edges.push(EdgeSpec {
                    from: id,
                    to: id + GRID,
                    length: SPACING,
                });
            }
        }
    }
    NavGraph::build(nodes, &edges).expect("lattice builds")
});

static SERVICE: Lazy<RoutingService> = Lazy::new(|| {
    RoutingService::load(&SitePaths::in_dir(&fixtures_dir()), RoutingConfig::default())
        .expect("fixture site loads")
});

fn benchmark_pathfinding(c: &mut Criterion) {
    let graph = &*LATTICE;
    let start = graph.index_of(0).expect("corner node");
    let goal = graph.index_of(GRID * GRID - 1).expect("corner node");
    let far = (GRID - 1) as f64 * SPACING;

    c.bench_function("shortest_lattice_corner_to_corner", |b| {
        b.iter(|| {
            let path = find_route_shortest(graph, start, goal, &PathConstraints::default())
                .expect("route exists");
            black_box(path.len())
        });
    });

    c.bench_function("risk_aware_lattice_threat_on_diagonal", |b| {
        let goals = [goal];
        let query = RiskQuery {
            start,
            goals: &goals,
            threat: Point::new(far / 2.0, far / 2.0),
            exposure_weight: 120.0,
        };
        b.iter(|| {
            let path = find_route_risk_aware(graph, &query, &PathConstraints::default())
                .expect("route exists");
            black_box(path.len())
        });
    });

    c.bench_function("safe_route_fixture", |b| {
        let service = &*SERVICE;
        let request = SafeRouteRequest {
            start: Point::new(0.0, 0.0),
            threat: Point::new(10.0, 3.0),
            prefer: None,
        };
        b.iter(|| {
            let response = service.safe_route(&request).expect("route exists");
            black_box(response.length_m)
        });
    });

    c.bench_function("auto_route_fixture", |b| {
        let service = &*SERVICE;
        let request = AutoRouteRequest {
            start: Point::new(0.0, 0.0),
            threat: Point::new(20.0, 0.0),
        };
        b.iter(|| {
            let response = service.auto_route(&request).expect("route exists");
            black_box(response.risk)
        });
    });
}

criterion_group!(benches, benchmark_pathfinding);
criterion_main!(benches);

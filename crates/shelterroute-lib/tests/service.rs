mod common;

use shelterroute_lib::decision::RouteMode;
use shelterroute_lib::service::{
    AutoRouteRequest, PortalRouteRequest, SafeRouteRequest, ShortestPathRequest,
};
use shelterroute_lib::{
    Decision, Destination, DestinationKind, DestinationSet, Error, Point, RoutingConfig,
    RoutingService, SitePaths,
};

use common::{fixture_service, TempSite};

fn portal_request(threat: Point) -> PortalRouteRequest {
    PortalRouteRequest {
        threat,
        start: None,
        mode: None,
        short_edge_threshold: None,
        door_threshold: None,
    }
}

#[test]
fn health_and_meta_describe_fixture_site() {
    let service = fixture_service();

    let health = service.health();
    assert!(health.ok);
    assert_eq!(health.engine, "risk-aware");
    assert_eq!(health.nodes, 13);
    assert_eq!(health.edges, 13);
    assert_eq!(health.units, "meters");

    let meta = service.site_meta();
    assert_eq!(meta.bbox_xy.min, [0.0, 0.0]);
    assert_eq!(meta.bbox_xy.max, [20.0, 6.0]);
}

#[test]
fn shortest_path_follows_corridor() {
    let service = fixture_service();
    let response = service
        .shortest_path(&ShortestPathRequest {
            start: Point::new(0.2, -0.1),
            goal: Point::new(19.7, 0.3),
        })
        .expect("corridor is connected");

    assert_eq!(response.route.len(), 11);
    assert_eq!(response.route.first(), Some(&[0.0, 0.0]));
    assert_eq!(response.route.last(), Some(&[20.0, 0.0]));
    assert!((response.length_m - 20.0).abs() < 1e-9);
    assert_eq!(response.units, "meters");
}

#[test]
fn safe_route_prefers_exit_by_default() {
    let service = fixture_service();
    let response = service
        .safe_route(&SafeRouteRequest {
            start: Point::new(0.0, 0.0),
            threat: Point::new(10.0, 3.0),
            prefer: None,
        })
        .expect("exit reachable");

    assert_eq!(response.decision, Decision::Evacuate);
    assert_eq!(response.target_kind, DestinationKind::Exit);
    assert_eq!(response.target_id, "E1");
    assert!((response.length_m - 20.0).abs() < 1e-9);
}

#[test]
fn safe_route_to_shelter_avoids_threatened_doorway() {
    let service = fixture_service();
    let response = service
        .safe_route(&SafeRouteRequest {
            start: Point::new(0.0, 0.0),
            threat: Point::new(10.0, 3.0),
            prefer: Some(DestinationKind::Shelter),
        })
        .expect("shelter reachable");

    assert_eq!(response.decision, Decision::Shelter);
    assert_eq!(response.target_id, "S1");
    assert_eq!(response.route, vec![[0.0, 0.0], [0.0, 6.0], [10.0, 6.0]]);
    assert!((response.length_m - 16.0).abs() < 1e-9);
}

#[test]
fn portal_route_to_shelter_goes_through_door() {
    let service = fixture_service();
    let response = service
        .portal_route(&PortalRouteRequest {
            start: Some(Point::new(0.0, 0.0)),
            mode: Some(RouteMode::Shelter),
            ..portal_request(Point::new(10.0, 3.0))
        })
        .expect("door route exists");

    assert_eq!(response.decision, Decision::Shelter);
    assert_eq!(response.doors_considered, 1);
    assert_eq!(response.route.len(), 7);
    assert_eq!(response.route.last(), Some(&[10.0, 6.0]));
    assert!((response.length_m - 16.0).abs() < 1e-9);
}

#[test]
fn portal_route_starts_at_threat_when_start_missing() {
    let service = fixture_service();
    let response = service
        .portal_route(&portal_request(Point::new(4.0, 1.0)))
        .expect("exit reachable from threat");

    assert_eq!(response.decision, Decision::Evacuate);
    assert_eq!(response.route.first(), Some(&[4.0, 0.0]));
    assert!((response.length_m - 16.0).abs() < 1e-9);
}

#[test]
fn portal_route_rejects_bad_thresholds() {
    let service = fixture_service();
    let err = service
        .portal_route(&PortalRouteRequest {
            short_edge_threshold: Some(-1.0),
            ..portal_request(Point::new(4.0, 1.0))
        })
        .unwrap_err();
    assert!(err.is_validation());

    let err = service
        .portal_route(&portal_request(Point::new(f64::NAN, 1.0)))
        .unwrap_err();
    assert!(matches!(err, Error::Validation { field: "threat", .. }));
}

#[test]
fn auto_route_shelters_when_threat_guards_exit() {
    let service = fixture_service();
    let response = service
        .auto_route(&AutoRouteRequest {
            start: Point::new(0.0, 0.0),
            threat: Point::new(20.0, 0.0),
        })
        .expect("both candidates reachable");

    assert_eq!(response.mode_selected, RouteMode::Shelter);
    let evac = response.compared.evac.expect("evac compared");
    let shelter = response.compared.shelter.expect("shelter compared");
    assert!(shelter.risk < evac.risk);
    assert_eq!(response.risk, shelter.risk);
    assert!((response.length_m - 16.0).abs() < 1e-9);
    assert!((evac.length_m - 20.0).abs() < 1e-9);
}

#[test]
fn auto_route_without_destinations_fails() {
    let site = TempSite::new();
    site.write_destinations(r#"{"exits":[],"shelters":[]}"#);
    let service = site.service();

    let err = service
        .auto_route(&AutoRouteRequest {
            start: Point::new(0.0, 0.0),
            threat: Point::new(20.0, 0.0),
        })
        .unwrap_err();
    assert!(matches!(err, Error::NoRouteAvailable));

    let err = service
        .portal_route(&portal_request(Point::new(4.0, 1.0)))
        .unwrap_err();
    assert!(matches!(err, Error::NoDestinations));
}

#[test]
fn portal_mode_falls_back_when_kind_is_empty() {
    let site = TempSite::new();
    site.write_destinations(r#"{"exits":[{"id":"E1","x":20.0,"y":0.0}]}"#);
    let service = site.service();

    let response = service
        .portal_route(&PortalRouteRequest {
            mode: Some(RouteMode::Shelter),
            ..portal_request(Point::new(4.0, 1.0))
        })
        .expect("exit reachable");
    assert_eq!(response.decision, Decision::Evacuate);
}

#[test]
fn saved_destinations_persist_and_swap() {
    let site = TempSite::new();
    let service = site.service();
    let before = service.destinations();

    let counts = service
        .save_destinations(DestinationSet {
            exits: vec![
                Destination::new("E1", 20.0, 0.0),
                Destination::new("E2", 0.0, 0.0),
            ],
            shelters: Vec::new(),
        })
        .expect("save succeeds");
    assert_eq!((counts.exits, counts.shelters), (2, 0));

    assert_eq!(before.exits.len(), 1);
    assert_eq!(service.destinations().exits.len(), 2);

    let reloaded = RoutingService::load(&site.paths, RoutingConfig::default())
        .expect("site reloads");
    assert_eq!(reloaded.destinations().exits[1].id, "E2");
    assert!(reloaded.destinations().shelters.is_empty());
}

#[test]
fn invalid_destinations_are_rejected_without_swapping() {
    let site = TempSite::new();
    let service = site.service();

    let err = service
        .save_destinations(DestinationSet {
            exits: vec![Destination::new("", 1.0, 1.0)],
            shelters: Vec::new(),
        })
        .unwrap_err();
    assert!(err.is_validation());
    assert_eq!(service.destinations().exits[0].id, "E1");
}

#[test]
fn missing_site_map_is_fatal() {
    let temp = tempfile::tempdir().expect("temp dir");
    let err = RoutingService::load(&SitePaths::in_dir(temp.path()), RoutingConfig::default())
        .unwrap_err();
    assert!(matches!(err, Error::SiteNotFound { .. }));
}

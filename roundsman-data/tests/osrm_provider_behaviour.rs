//! Behavioural tests for [`OsrmProvider`] against a loopback OSRM stub.

use std::cell::RefCell;

use geo::Coord;
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use roundsman_core::{TravelMatrix, TravelMatrixError, TravelMatrixProvider};
use roundsman_data::routing::OsrmProvider;
use roundsman_data::routing::test_support::{OsrmStub, StubResponse};

#[derive(Default)]
struct ProviderWorld {
    stub: RefCell<Option<OsrmStub>>,
    result: RefCell<Option<Result<TravelMatrix, TravelMatrixError>>>,
}

impl ProviderWorld {
    #[expect(
        clippy::expect_used,
        reason = "behaviour tests use expect for readable failures"
    )]
    fn serve(&self, response: StubResponse) {
        let stub = OsrmStub::start(response).expect("stub should bind");
        self.stub.replace(Some(stub));
    }

    #[expect(
        clippy::expect_used,
        reason = "behaviour tests use expect for readable failures"
    )]
    fn stub(&self) -> OsrmStub {
        self.stub.borrow().clone().expect("stub must be started")
    }

    #[expect(
        clippy::expect_used,
        reason = "behaviour tests use expect for readable failures"
    )]
    fn request(&self, count: u32) {
        let provider = OsrmProvider::new(self.stub().base_url()).expect("provider should build");
        let locations: Vec<Coord<f64>> = (0..count)
            .map(|idx| Coord {
                x: 24.94 + f64::from(idx) * 0.01,
                y: 60.17,
            })
            .collect();
        self.result
            .replace(Some(provider.get_travel_matrix(&locations)));
    }

    #[expect(
        clippy::expect_used,
        reason = "behaviour tests use expect for readable failures"
    )]
    fn matrix(&self) -> TravelMatrix {
        self.result
            .borrow()
            .clone()
            .expect("result should be recorded")
            .expect("request should succeed")
    }

    #[expect(
        clippy::expect_used,
        reason = "behaviour tests use expect for readable failures"
    )]
    fn error(&self) -> TravelMatrixError {
        self.result
            .borrow()
            .clone()
            .expect("result should be recorded")
            .expect_err("request should fail")
    }
}

#[fixture]
fn world() -> ProviderWorld {
    ProviderWorld::default()
}

// --- Given steps ---

#[given("a routing service returning a two by two table")]
fn service_ok(world: &ProviderWorld) {
    world.serve(StubResponse::table(
        &[vec![Some(0.0), Some(95.0)], vec![Some(90.0), Some(0.0)]],
        &[vec![Some(0.0), Some(1200.0)], vec![Some(1150.0), Some(0.0)]],
    ));
}

#[given("a routing service returning null for unreachable pairs")]
fn service_with_nulls(world: &ProviderWorld) {
    world.serve(StubResponse::table(
        &[vec![Some(0.0), None], vec![Some(90.0), Some(0.0)]],
        &[vec![Some(0.0), None], vec![Some(1150.0), Some(0.0)]],
    ));
}

#[given("a routing service returning an error response")]
fn service_error(world: &ProviderWorld) {
    world.serve(StubResponse::service_error("NoTable", "No table found"));
}

#[given("a routing service answering with HTTP 503")]
fn service_unavailable(world: &ProviderWorld) {
    world.serve(StubResponse::http_status(503));
}

#[given("a routing service returning a malformed body")]
fn service_malformed(world: &ProviderWorld) {
    world.serve(StubResponse::raw("not json"));
}

// --- When steps ---

#[when("I request a travel matrix for two locations")]
fn request_two(world: &ProviderWorld) {
    world.request(2);
}

#[when("I request a travel matrix for three locations")]
fn request_three(world: &ProviderWorld) {
    world.request(3);
}

#[when("I request a travel matrix for no locations")]
fn request_none(world: &ProviderWorld) {
    world.request(0);
}

// --- Then steps ---

#[then("the matrix has 2 rows")]
fn matrix_rows(world: &ProviderWorld) {
    assert_eq!(world.matrix().len(), 2);
}

#[then("the distance from the first to the second location is 1.2 km")]
fn matrix_distance(world: &ProviderWorld) {
    assert_eq!(world.matrix().distance_km(0, 1), Some(1.2));
}

#[then("the request asked for duration and distance annotations")]
fn request_annotations(world: &ProviderWorld) {
    let requests = world.stub().requests();
    assert_eq!(requests.len(), 1);
    assert!(requests.iter().all(|line| {
        line.starts_with("GET /table/v1/driving/")
            && line.contains("annotations=duration,distance")
    }));
}

#[then("the pair from the first to the second location is unreachable")]
fn unreachable_pair(world: &ProviderWorld) {
    let matrix = world.matrix();
    assert_eq!(matrix.duration_secs(0, 1), Some(f64::INFINITY));
    assert_eq!(matrix.duration_secs(1, 0), Some(90.0));
}

#[then("the error is a service error with code NoTable")]
fn is_service_error(world: &ProviderWorld) {
    assert!(matches!(
        world.error(),
        TravelMatrixError::ServiceError { code, .. } if code == "NoTable"
    ));
}

#[then("the error is an HTTP error with status 503")]
fn is_http_error(world: &ProviderWorld) {
    assert!(matches!(
        world.error(),
        TravelMatrixError::HttpError { status: 503, .. }
    ));
}

#[then("the error is a parse error")]
fn is_parse_error(world: &ProviderWorld) {
    assert!(matches!(world.error(), TravelMatrixError::ParseError { .. }));
}

#[then("the error is a dimension mismatch")]
fn is_dimension_mismatch(world: &ProviderWorld) {
    assert!(matches!(
        world.error(),
        TravelMatrixError::DimensionMismatch { .. }
    ));
}

#[then("the error is empty input")]
fn is_empty_input(world: &ProviderWorld) {
    assert_eq!(world.error(), TravelMatrixError::EmptyInput);
}

#[then("no request reached the service")]
fn no_requests(world: &ProviderWorld) {
    assert!(world.stub().requests().is_empty());
}

#[scenario(path = "tests/features/osrm_provider.feature", index = 0)]
fn durations_and_distances(world: ProviderWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/osrm_provider.feature", index = 1)]
fn unreachable_pairs(world: ProviderWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/osrm_provider.feature", index = 2)]
fn service_errors(world: ProviderWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/osrm_provider.feature", index = 3)]
fn http_failures(world: ProviderWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/osrm_provider.feature", index = 4)]
fn malformed_bodies(world: ProviderWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/osrm_provider.feature", index = 5)]
fn mismatched_tables(world: ProviderWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/osrm_provider.feature", index = 6)]
fn empty_input(world: ProviderWorld) {
    let _ = world;
}

//! Shared fixtures for the Payweave integration suites.

use payweave_curve::LiquidityCurve;
use payweave_routing::{EngineConfig, Route, RouteInfo, RoutingEngine};
use tracing_subscriber::EnvFilter;

/// Install the log subscriber once per test binary; later calls are no-ops.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_test_writer()
        .try_init();
}

/// Helper: a ledger pair served by the connector's own accounts on both
/// sides, quoting `rate_info` in its announcement payload.
pub fn pair_route(
    source: &str,
    destination: &str,
    points: &[[f64; 2]],
    source_account: &str,
    destination_account: &str,
    rate_info: f64,
) -> Route {
    Route::new(
        LiquidityCurve::from_pairs(points.iter().copied()),
        vec![source.to_string(), destination.to_string()],
        RouteInfo {
            min_message_window: 1,
            source_account: Some(source_account.to_string()),
            destination_account: Some(destination_account.to_string()),
            additional_info: Some(serde_json::json!({ "rate_info": rate_info })),
            ..RouteInfo::default()
        },
    )
    .expect("pair routes have two hops")
}

/// Helper: a route announced by a peer connector.
pub fn remote_route(
    source: &str,
    destination: &str,
    points: &[[f64; 2]],
    source_account: &str,
    min_message_window: u32,
) -> Route {
    Route::new(
        LiquidityCurve::from_pairs(points.iter().copied()),
        vec![source.to_string(), destination.to_string()],
        RouteInfo {
            min_message_window,
            source_account: Some(source_account.to_string()),
            ..RouteInfo::default()
        },
    )
    .expect("announced routes have two hops")
}

/// Helper: a locally served link named only by its source account. Seeding
/// it through the engine is what marks it local.
pub fn local_route(
    source: &str,
    destination: &str,
    points: &[[f64; 2]],
    source_account: &str,
) -> Route {
    remote_route(source, destination, points, source_account, 1)
}

/// The usual starting point: ledgerA and ledgerB bridged by mark's
/// accounts, 2:1 one way and 1:2 the other.
pub fn linked_pair_engine() -> RoutingEngine {
    init_tracing();
    RoutingEngine::with_local_routes(
        vec![
            pair_route(
                "ledgerA.",
                "ledgerB.",
                &[[0.0, 0.0], [200.0, 100.0]],
                "ledgerA.mark",
                "ledgerB.mark",
                0.5,
            ),
            pair_route(
                "ledgerB.",
                "ledgerA.",
                &[[0.0, 0.0], [100.0, 200.0]],
                "ledgerB.mark",
                "ledgerA.mark",
                2.0,
            ),
        ],
        EngineConfig::default(),
    )
    .expect("seed local pairs")
}

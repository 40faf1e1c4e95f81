//! Integration test: route propagation across linked ledgers.
//!
//! Announced routes are composed onto the connector's local pairs using
//! the curve algebra from payweave-curve, hop by hop, until every source
//! ledger knows its reachable destinations.

use payweave_curve::LiquidityCurve;
use payweave_integration_tests::{linked_pair_engine, local_route, remote_route};
use payweave_routing::{Route, RouteInfo};

// =========================================================================
// Chains of local routes
// =========================================================================

#[test]
fn test_chain_of_local_routes_composes_hop_by_hop() {
    let mut engine = linked_pair_engine();
    engine
        .add_local_routes(vec![
            local_route(
                "ledgerB.",
                "ledgerC.",
                &[[0.0, 0.0], [100.0, 200.0]],
                "ledgerB.mark",
            ),
            local_route(
                "ledgerC.",
                "ledgerD.",
                &[[0.0, 0.0], [100.0, 200.0]],
                "ledgerB.mark",
            ),
            local_route(
                "ledgerD.",
                "ledgerE.",
                &[[0.0, 0.0], [100.0, 200.0]],
                "ledgerD.mary",
            ),
        ])
        .expect("add local routes");

    // A -> B -> C
    let a_to_c = engine
        .find_best_hop_for_source_amount("ledgerA.alice", "ledgerC.carol", 20.0)
        .expect("route to ledgerC");
    assert_eq!(a_to_c.destination_ledger, "ledgerB.");
    assert_eq!(
        a_to_c.destination_credit_account,
        Some("ledgerB.mark".to_string())
    );
    assert_eq!(a_to_c.final_amount, 20.0);
    assert_eq!(a_to_c.min_message_window, 2);

    // A -> B -> C -> D -> E. There is no shortcut from A straight to D or
    // E; the composition walks every intermediate pair.
    let a_to_e = engine
        .find_best_hop_for_source_amount("ledgerA.alice", "ledgerE.emma", 20.0)
        .expect("route to ledgerE");
    assert_eq!(a_to_e.destination_ledger, "ledgerB.");
    assert_eq!(
        a_to_e.destination_credit_account,
        Some("ledgerB.mark".to_string())
    );
    assert_eq!(a_to_e.final_amount, 80.0);
    assert_eq!(a_to_e.min_message_window, 4);

    // C -> D -> E
    let c_to_e = engine
        .find_best_hop_for_source_amount("ledgerC.carol", "ledgerE.emma", 20.0)
        .expect("route from ledgerC");
    assert_eq!(c_to_e.destination_ledger, "ledgerD.");
    assert_eq!(
        c_to_e.destination_credit_account,
        Some("ledgerD.mary".to_string())
    );
    assert_eq!(c_to_e.final_amount, 80.0);
    assert_eq!(c_to_e.min_message_window, 2);
}

#[test]
fn test_no_route_ever_leads_back_to_its_source_ledger() {
    let mut engine = linked_pair_engine();
    engine
        .add_local_routes(vec![
            local_route(
                "ledgerB.",
                "ledgerC.",
                &[[0.0, 0.0], [100.0, 200.0]],
                "ledgerB.mark",
            ),
            local_route(
                "ledgerC.",
                "ledgerD.",
                &[[0.0, 0.0], [100.0, 200.0]],
                "ledgerB.mark",
            ),
        ])
        .expect("add local routes");

    // A -> B -> A would loop; it is never registered.
    assert!(engine
        .find_best_hop_for_source_amount("ledgerA.alice", "ledgerA.anna", 10.0)
        .is_none());
}

// =========================================================================
// Remote announcements
// =========================================================================

#[test]
fn test_announcements_extend_only_local_pairs() {
    let mut engine = linked_pair_engine();

    let added = engine
        .add_route(remote_route(
            "ledgerB.",
            "ledgerC.",
            &[[0.0, 0.0], [50.0, 60.0]],
            "ledgerB.mary",
            1,
        ))
        .expect("add route");
    assert!(added);

    // A -> C exists now, but it is not a pair, so C -> B must not chain
    // onto it.
    let added = engine
        .add_route(remote_route(
            "ledgerC.",
            "ledgerB.",
            &[[0.0, 0.0], [200.0, 100.0]],
            "ledgerC.mary",
            1,
        ))
        .expect("add route");
    assert!(!added);

    let hop = engine
        .find_best_hop_for_source_amount("ledgerA.alice", "ledgerB.bob", 100.0)
        .expect("direct pair");
    assert_eq!(hop.best_hop, "ledgerB.mark");
    assert_eq!(hop.final_amount, 50.0);
}

#[test]
fn test_remote_route_cannot_displace_a_local_pair() {
    let mut engine = linked_pair_engine();

    // An absurdly good quote for a link we already serve ourselves.
    let added = engine
        .add_route(remote_route(
            "ledgerA.",
            "ledgerB.",
            &[[0.0, 0.0], [200.0, 9999.0]],
            "ledgerA.mary",
            1,
        ))
        .expect("add route");
    assert!(!added);

    let hop = engine
        .find_best_hop_for_source_amount("ledgerA.alice", "ledgerB.bob", 200.0)
        .expect("direct pair");
    assert_eq!(hop.best_hop, "ledgerB.mark");
    assert_eq!(hop.final_amount, 100.0);
}

#[test]
fn test_composed_local_path_cannot_displace_a_direct_pair() {
    let mut engine = linked_pair_engine();
    engine
        .add_local_routes(vec![
            local_route(
                "ledgerA.",
                "ledgerC.",
                &[[0.0, 0.0], [100.0, 999.0]],
                "ledgerA.mark",
            ),
            local_route(
                "ledgerC.",
                "ledgerB.",
                &[[0.0, 0.0], [100.0, 999.0]],
                "ledgerC.mark",
            ),
        ])
        .expect("add local routes");

    // A -> C -> B quotes far more, but the direct A -> B pair still wins.
    let hop = engine
        .find_best_hop_for_source_amount("ledgerA.alice", "ledgerB.bob", 100.0)
        .expect("direct pair");
    assert_eq!(hop.best_hop, "ledgerB.mark");
    assert_eq!(hop.final_amount, 50.0);

    let hop = engine
        .find_best_hop_for_source_amount("ledgerA.alice", "ledgerB.bob", 200.0)
        .expect("direct pair");
    assert_eq!(hop.best_hop, "ledgerB.mark");
    assert_eq!(hop.final_amount, 100.0);
}

#[test]
fn test_custom_target_prefix_registers_under_that_prefix() {
    let mut engine = linked_pair_engine();

    let route = Route::new(
        LiquidityCurve::from_pairs([[0.0, 0.0], [50.0, 60.0]]),
        vec!["ledgerB.".to_string(), "ledgerC.".to_string()],
        RouteInfo {
            min_message_window: 1,
            source_account: Some("ledgerC.mary".to_string()),
            target_prefix: Some("prefix.".to_string()),
            ..RouteInfo::default()
        },
    )
    .expect("valid route");
    assert!(engine.add_route(route).expect("add route"));

    // Addresses under the custom prefix reach the route's real ledger.
    let hop = engine
        .find_best_hop_for_source_amount("ledgerA.alice", "prefix.bob", 50.0)
        .expect("route under prefix");
    assert_eq!(hop.best_hop, "ledgerC.mary");
    assert_eq!(hop.final_ledger, "ledgerC.");

    // The destination ledger itself was never registered.
    assert!(engine
        .find_best_hop_for_source_amount("ledgerA.alice", "ledgerC.bob", 50.0)
        .is_none());
}

// =========================================================================
// Choosing among connectors
// =========================================================================

#[test]
fn test_single_remote_path_prices_through_both_curves() {
    let mut engine = linked_pair_engine();
    engine
        .add_route(remote_route(
            "ledgerB.",
            "ledgerC.",
            &[[0.0, 0.0], [200.0, 100.0]],
            "ledgerB.mary",
            1,
        ))
        .expect("add route");

    // 100 on ledgerA becomes 50 on ledgerB, then 25 on ledgerC.
    let hop = engine
        .find_best_hop_for_source_amount("ledgerA.alice", "ledgerC.carol", 100.0)
        .expect("route to ledgerC");
    assert_eq!(hop.best_hop, "ledgerB.mary");
    assert_eq!(hop.final_amount, 25.0);
}

#[test]
fn test_better_connector_wins_at_each_amount() {
    let mut engine = linked_pair_engine();
    engine
        .add_route(remote_route(
            "ledgerB.",
            "ledgerC.",
            &[[0.0, 0.0], [50.0, 60.0]],
            "ledgerB.mary",
            1,
        ))
        .expect("add route");
    engine
        .add_route(remote_route(
            "ledgerB.",
            "ledgerC.",
            &[[0.0, 0.0], [100.0, 100.0]],
            "ledgerB.martin",
            1,
        ))
        .expect("add route");

    // mary's curve saturates at 60, martin's keeps climbing.
    let hop = engine
        .find_best_hop_for_source_amount("ledgerA.alice", "ledgerC.carol", 100.0)
        .expect("route to ledgerC");
    assert_eq!(hop.best_hop, "ledgerB.mary");
    assert_eq!(hop.final_amount, 60.0);

    let hop = engine
        .find_best_hop_for_source_amount("ledgerA.alice", "ledgerC.carol", 150.0)
        .expect("route to ledgerC");
    assert_eq!(hop.best_hop, "ledgerB.martin");
    assert_eq!(hop.final_amount, 75.0);

    let hop = engine
        .find_best_hop_for_source_amount("ledgerA.alice", "ledgerC.carol", 200.0)
        .expect("route to ledgerC");
    assert_eq!(hop.best_hop, "ledgerB.martin");
    assert_eq!(hop.final_amount, 100.0);
}

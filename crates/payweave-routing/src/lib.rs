//! Payweave Routing — liquidity-aware route tables for linked ledgers.
//!
//! This crate provides:
//! - [`RoutingEngine`] — composes received routes onto local ledger pairs and answers best-hop queries.
//! - [`RoutingTable`] — per-source-ledger registry of routes, keyed by destination prefix and next hop.
//! - [`Route`] — a hop list with a liquidity curve, joinable end to end and foldable across connectors.
//! - [`PrefixMap`] — longest-prefix address resolution over ledger prefixes.

pub mod engine;
pub mod error;
pub mod prefix_map;
pub mod route;
pub mod table;

// Re-exports for convenience.
pub use engine::{EngineConfig, Hop, RoutingEngine, PAIR};
pub use error::RoutingError;
pub use prefix_map::PrefixMap;
pub use route::{Route, RouteInfo, RouteWire};
pub use table::{RemoveOutcome, RoutingTable, TableHop};

use std::time::Duration;

use chrono::{DateTime, Utc};
use payweave_curve::{LiquidityCurve, Point};
use serde::Serialize;

use crate::error::RoutingError;

/// Optional metadata supplied when constructing a [`Route`].
#[derive(Debug, Clone, Default)]
pub struct RouteInfo {
    /// Additive processing window in seconds quoted for this path.
    pub min_message_window: u32,
    /// When the route stops being trustworthy; `None` means it never does.
    pub expires_at: Option<DateTime<Utc>>,
    /// Whether this path is served entirely by the local connector.
    pub is_local: bool,
    /// Announcing connector's account on the source ledger.
    pub source_account: Option<String>,
    /// Receiving account on the destination ledger, when known.
    pub destination_account: Option<String>,
    /// Opaque announcement payload carried alongside the route.
    pub additional_info: Option<serde_json::Value>,
    /// Destination-table key; defaults to the destination ledger.
    pub target_prefix: Option<String>,
}

/// A unidirectional payment path from a source ledger to a destination
/// ledger, priced by a liquidity curve.
///
/// The hop list names every ledger along the path in order and always has
/// at least two entries, so the source, next and destination ledgers are
/// plain lookups.
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    curve: LiquidityCurve,
    hops: Vec<String>,
    target_prefix: String,
    min_message_window: u32,
    expires_at: Option<DateTime<Utc>>,
    is_local: bool,
    source_account: Option<String>,
    destination_account: Option<String>,
    additional_info: Option<serde_json::Value>,
}

/// Produce-only wire summary of a route, the shape a broadcaster announces.
#[derive(Debug, Clone, Serialize)]
pub struct RouteWire {
    pub source_ledger: String,
    pub destination_ledger: String,
    pub points: Vec<Point>,
    pub min_message_window: u32,
    pub source_account: Option<String>,
}

impl Route {
    /// Create a route over `hops`, which must name at least the source and
    /// destination ledgers.
    pub fn new(
        curve: LiquidityCurve,
        hops: Vec<String>,
        info: RouteInfo,
    ) -> Result<Self, RoutingError> {
        if hops.len() < 2 {
            return Err(RoutingError::TooFewHops { hops: hops.len() });
        }
        let target_prefix = info
            .target_prefix
            .unwrap_or_else(|| hops[hops.len() - 1].clone());
        Ok(Self {
            curve,
            hops,
            target_prefix,
            min_message_window: info.min_message_window,
            expires_at: info.expires_at,
            is_local: info.is_local,
            source_account: info.source_account,
            destination_account: info.destination_account,
            additional_info: info.additional_info,
        })
    }

    /// The route's liquidity curve.
    pub fn curve(&self) -> &LiquidityCurve {
        &self.curve
    }

    /// Every ledger along the path, source first.
    pub fn hops(&self) -> &[String] {
        &self.hops
    }

    /// Ledger the path starts on.
    pub fn source_ledger(&self) -> &str {
        &self.hops[0]
    }

    /// Ledger reached after the first hop.
    pub fn next_ledger(&self) -> &str {
        &self.hops[1]
    }

    /// Ledger the path ends on.
    pub fn destination_ledger(&self) -> &str {
        &self.hops[self.hops.len() - 1]
    }

    /// Destination-table key this route is registered under.
    pub fn target_prefix(&self) -> &str {
        &self.target_prefix
    }

    /// Additive processing window in seconds.
    pub fn min_message_window(&self) -> u32 {
        self.min_message_window
    }

    /// Expiry instant, when the route carries one.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    /// Whether this path is served entirely by the local connector.
    pub fn is_local(&self) -> bool {
        self.is_local
    }

    /// Announcing connector's account on the source ledger.
    pub fn source_account(&self) -> Option<&str> {
        self.source_account.as_deref()
    }

    /// Receiving account on the destination ledger, when known.
    pub fn destination_account(&self) -> Option<&str> {
        self.destination_account.as_deref()
    }

    /// Opaque announcement payload carried alongside the route.
    pub fn additional_info(&self) -> Option<&serde_json::Value> {
        self.additional_info.as_ref()
    }

    pub(crate) fn mark_local(&mut self) {
        self.is_local = true;
    }

    /// Compose this route with `tail`, which must start where this route
    /// ends.
    ///
    /// Returns `Ok(None)` when the composition would double back over a
    /// ledger both paths already cross: such a route never beats the direct
    /// one and is silently discarded. Joining non-adjacent routes is a
    /// caller error.
    ///
    /// The composed route keeps this route's source account, takes its
    /// destination key from `tail`, adds the processing windows, and
    /// expires at `now + expiry`.
    pub fn join(
        &self,
        tail: &Route,
        expiry: Duration,
        now: DateTime<Utc>,
    ) -> Result<Option<Route>, RoutingError> {
        if self.destination_ledger() != tail.source_ledger() {
            return Err(RoutingError::NotAdjacent {
                ledger: tail.source_ledger().to_string(),
            });
        }
        let shared = self
            .hops
            .iter()
            .filter(|hop| tail.hops.contains(hop))
            .count();
        if shared > 1 {
            return Ok(None);
        }
        let mut hops = self.hops.clone();
        hops.extend(tail.hops.iter().skip(1).cloned());
        Ok(Some(Route {
            curve: self.curve.join(&tail.curve),
            hops,
            target_prefix: tail.target_prefix.clone(),
            min_message_window: self.min_message_window + tail.min_message_window,
            expires_at: Some(now + expiry),
            is_local: self.is_local && tail.is_local,
            source_account: self.source_account.clone(),
            destination_account: None,
            additional_info: None,
        }))
    }

    /// Merge an alternative route between the same two ledgers, taking the
    /// better rate at every amount.
    ///
    /// The merged route is an aggregate: it collapses to the two endpoint
    /// hops, quotes the larger window, and speaks for no particular
    /// connector account.
    pub fn combine(&self, other: &Route) -> Route {
        Route {
            curve: self.curve.combine(&other.curve),
            hops: vec![
                self.source_ledger().to_string(),
                self.destination_ledger().to_string(),
            ],
            target_prefix: self.destination_ledger().to_string(),
            min_message_window: self.min_message_window.max(other.min_message_window),
            expires_at: None,
            is_local: false,
            source_account: None,
            destination_account: None,
            additional_info: None,
        }
    }

    /// Publishable form of the route: curve capped at `max_points` points,
    /// path collapsed to its endpoints, accounts and expiry stripped.
    pub fn simplify(&self, max_points: usize) -> Route {
        Route {
            curve: self.curve.simplify(max_points),
            hops: vec![
                self.source_ledger().to_string(),
                self.destination_ledger().to_string(),
            ],
            target_prefix: self.target_prefix.clone(),
            min_message_window: self.min_message_window,
            expires_at: None,
            is_local: self.is_local,
            source_account: None,
            destination_account: None,
            additional_info: self.additional_info.clone(),
        }
    }

    /// The same route with every delivered amount shifted by `dy`.
    pub fn shift_y(&self, dy: f64) -> Route {
        let mut route = self.clone();
        route.curve = self.curve.shift_y(dy);
        route
    }

    /// Returns true if the route carries an expiry that has passed.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| at < now)
    }

    /// Push an existing expiry further out. Routes without an expiry are
    /// left untouched; a hold-down never makes a permanent route mortal.
    pub fn bump_expiration(&mut self, hold_down: Duration) {
        if let Some(at) = self.expires_at {
            self.expires_at = Some(at + hold_down);
        }
    }

    /// Wire summary of this route.
    pub fn to_wire(&self) -> RouteWire {
        RouteWire {
            source_ledger: self.source_ledger().to_string(),
            destination_ledger: self.destination_ledger().to_string(),
            points: self.curve.points().to_vec(),
            min_message_window: self.min_message_window,
            source_account: self.source_account.clone(),
        }
    }
}

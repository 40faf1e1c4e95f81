use std::collections::{BTreeSet, HashMap, VecDeque};
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::error::RoutingError;
use crate::prefix_map::PrefixMap;
use crate::route::{Route, RouteWire};
use crate::table::{RemoveOutcome, RoutingTable, TableHop};

/// Reserved next-hop key for a ledger pair served directly by the local
/// connector. Never a real account; queries rewrite it before answering.
pub const PAIR: &str = "PAIR";

/// Tunables for a [`RoutingEngine`].
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Lifetime stamped on composed routes. Local pairs never expire.
    pub route_expiry: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            route_expiry: Duration::from_secs(45),
        }
    }
}

/// Fully resolved answer to an address-level best-hop query.
#[derive(Debug, Clone, PartialEq)]
pub struct Hop {
    /// True when the next ledger is already the destination ledger.
    pub is_final: bool,
    /// Whether the winning route is served entirely by the local connector.
    pub is_local: bool,
    /// Account to forward the payment to.
    pub best_hop: String,
    /// The route that won the query.
    pub best_route: Route,
    /// Ledger the winning route starts on.
    pub source_ledger: String,
    /// Amount entering the winning route on its source ledger.
    pub source_amount: f64,
    /// Ledger reached after the first hop.
    pub destination_ledger: String,
    /// Amount delivered onto that ledger by the local pair.
    pub destination_amount: f64,
    /// Account to credit on the next ledger; `None` on a final hop, where
    /// the payment goes straight to the destination.
    pub destination_credit_account: Option<String>,
    /// Ledger the winning route ultimately reaches.
    pub final_ledger: String,
    /// Amount arriving on that final ledger.
    pub final_amount: f64,
    /// Processing window quoted by the winning route, in seconds.
    pub min_message_window: u32,
    /// Announcement payload of the winning route; only meaningful when the
    /// hop is final, since it describes that single route.
    pub additional_info: Option<serde_json::Value>,
}

/// Maintains every known route and answers best-hop queries.
///
/// One [`RoutingTable`] per source ledger, indexed by prefix. Seeded local
/// pair routes sit under the [`PAIR`] key; routes learned from other
/// connectors are composed onto the local pairs and registered under the
/// announcing connector's account. All state is owned here: callers hand
/// routes over by value and get copies back.
pub struct RoutingEngine {
    sources: PrefixMap<RoutingTable>,
    /// Our own account on each directly connected ledger.
    local_accounts: HashMap<String, String>,
    config: EngineConfig,
}

impl RoutingEngine {
    /// Create an empty engine.
    pub fn new(config: EngineConfig) -> Self {
        Self {
            sources: PrefixMap::new(),
            local_accounts: HashMap::new(),
            config,
        }
    }

    /// Create an engine seeded with the connector's local pair routes.
    pub fn with_local_routes(
        local_routes: Vec<Route>,
        config: EngineConfig,
    ) -> Result<Self, RoutingError> {
        let mut engine = Self::new(config);
        engine.add_local_routes(local_routes)?;
        Ok(engine)
    }

    /// Seed the engine with local pair routes, then propagate them.
    ///
    /// Every route is marked local and stored under the [`PAIR`] key of its
    /// source ledger's table, without an expiry: the connector's own links
    /// do not age out. The accounts named on the route teach the engine
    /// where it can be paid on each ledger.
    pub fn add_local_routes(&mut self, local_routes: Vec<Route>) -> Result<(), RoutingError> {
        let mut seeded = Vec::with_capacity(local_routes.len());
        for mut route in local_routes {
            route.mark_local();
            let source_ledger = route.source_ledger().to_string();
            let destination_ledger = route.destination_ledger().to_string();
            if let Some(account) = route.source_account() {
                self.local_accounts
                    .insert(source_ledger.clone(), account.to_string());
            }
            if let Some(account) = route.destination_account() {
                self.local_accounts
                    .insert(destination_ledger.clone(), account.to_string());
            }
            tracing::debug!(
                source = %source_ledger,
                destination = %destination_ledger,
                "seeded local pair"
            );
            self.sources
                .get_or_insert_with(&source_ledger, RoutingTable::new)
                .add_route(&destination_ledger, PAIR, route.clone());
            seeded.push(route);
        }
        for route in seeded {
            self.add_route(route)?;
        }
        Ok(())
    }

    /// Register a received route and compose it onto every local pair that
    /// can reach it, repeating for each route learned along the way.
    ///
    /// Returns whether any table gained a new entry. Re-announcements of a
    /// known `(source, destination, connector)` entry refresh it in place
    /// and report `false`.
    pub fn add_route(&mut self, route: Route) -> Result<bool, RoutingError> {
        let now = Utc::now();
        let source_prefixes = self.sources.keys().to_vec();
        let mut queue = VecDeque::from([route]);
        let mut changed = false;
        // A route is queued only when its table slot was empty before, and
        // there are finitely many (source, destination, connector) slots,
        // so the queue drains.
        while let Some(route) = queue.pop_front() {
            for source in &source_prefixes {
                if let Some(learned) = self.add_route_from_source(source, &route, now)? {
                    changed = true;
                    queue.push_back(learned);
                }
            }
        }
        Ok(changed)
    }

    /// Compose `route` onto `source`'s local pair and register the result.
    ///
    /// Returns the composed route when it filled a previously empty slot,
    /// `None` on a refresh or when nothing could be registered: no local
    /// pair onto the route's source ledger, a doubleback, an unkeyable
    /// route with no source account, or a local route whose destination the
    /// source already reaches directly.
    fn add_route_from_source(
        &mut self,
        source: &str,
        route: &Route,
        now: DateTime<Utc>,
    ) -> Result<Option<Route>, RoutingError> {
        let Some(connector) = route.source_account() else {
            return Ok(None);
        };
        let expiry = self.config.route_expiry;
        let Some(table) = self.sources.get_mut(source) else {
            return Ok(None);
        };
        let destination = route.target_prefix();
        // A direct local pair always beats a composed local path.
        if route.is_local() && table.route(destination, PAIR).is_some() {
            return Ok(None);
        }
        let joined = match table.route(route.source_ledger(), PAIR) {
            Some(pair) => pair.join(route, expiry, now)?,
            None => return Ok(None),
        };
        let Some(joined) = joined else {
            return Ok(None);
        };
        let newly_added = table.route(destination, connector).is_none();
        table.add_route(destination, connector, joined.clone());
        if newly_added {
            tracing::debug!(
                source = %source,
                destination = %destination,
                connector = %connector,
                "learned composed route"
            );
            Ok(Some(joined))
        } else {
            Ok(None)
        }
    }

    /// Remove the exact `(source, destination, next_hop)` entry, if any.
    ///
    /// Routes composed from the removed entry are left in place; they stop
    /// being refreshed and age out through their expiry instead.
    pub fn remove_route(&mut self, source: &str, destination: &str, next_hop: &str) -> bool {
        match self.sources.get_mut(source) {
            Some(table) => table.remove_route(destination, next_hop) != RemoveOutcome::NotFound,
            None => false,
        }
    }

    /// Sweep every table, dropping entries whose expiry has passed.
    /// Returns the number of entries removed.
    pub fn remove_expired_routes(&mut self, now: DateTime<Utc>) -> usize {
        let expired: Vec<(String, String, String)> = self
            .sources
            .iter()
            .flat_map(|(source, table)| {
                table
                    .entries()
                    .filter(|(_, _, route)| route.is_expired(now))
                    .map(move |(destination, next_hop, _)| {
                        (
                            source.to_string(),
                            destination.to_string(),
                            next_hop.to_string(),
                        )
                    })
            })
            .collect();
        let removed = expired.len();
        for (source, destination, next_hop) in expired {
            self.remove_route(&source, &destination, &next_hop);
        }
        if removed > 0 {
            tracing::debug!(removed, "swept expired routes");
        }
        removed
    }

    /// Drop every entry whose source or destination key is `ledger`.
    /// Returns the number of entries removed.
    pub fn remove_ledger(&mut self, ledger: &str) -> usize {
        let doomed: Vec<(String, String, String)> = self
            .sources
            .iter()
            .flat_map(|(source, table)| {
                table
                    .entries()
                    .filter(move |(destination, _, _)| source == ledger || *destination == ledger)
                    .map(move |(destination, next_hop, _)| {
                        (
                            source.to_string(),
                            destination.to_string(),
                            next_hop.to_string(),
                        )
                    })
            })
            .collect();
        let removed = doomed.len();
        for (source, destination, next_hop) in doomed {
            self.remove_route(&source, &destination, &next_hop);
        }
        if removed > 0 {
            tracing::debug!(ledger = %ledger, removed, "removed ledger routes");
        }
        removed
    }

    /// Drop every route announced by `account`, across all tables.
    ///
    /// Returns each destination that lost at least one entry, deduplicated
    /// and sorted, so callers know exactly which destinations to re-request
    /// routes for.
    pub fn invalidate_connector(&mut self, account: &str) -> Vec<String> {
        let doomed: Vec<(String, String)> = self
            .sources
            .iter()
            .flat_map(|(source, table)| {
                table
                    .entries()
                    .filter(move |(_, next_hop, _)| *next_hop == account)
                    .map(move |(destination, _, _)| (source.to_string(), destination.to_string()))
            })
            .collect();
        let mut affected = BTreeSet::new();
        for (source, destination) in doomed {
            if self.remove_route(&source, &destination, account) {
                affected.insert(destination);
            }
        }
        if !affected.is_empty() {
            tracing::debug!(
                connector = %account,
                destinations = affected.len(),
                "invalidated connector"
            );
        }
        affected.into_iter().collect()
    }

    /// Drop `account`'s routes toward `ledger` only. Returns `[ledger]`
    /// when something was removed, empty otherwise.
    pub fn invalidate_connector_routes_to(&mut self, account: &str, ledger: &str) -> Vec<String> {
        let holders: Vec<String> = self
            .sources
            .iter()
            .filter(|(_, table)| table.route(ledger, account).is_some())
            .map(|(source, _)| source.to_string())
            .collect();
        let mut any_removed = false;
        for source in holders {
            any_removed |= self.remove_route(&source, ledger, account);
        }
        if any_removed {
            tracing::debug!(connector = %account, ledger = %ledger, "invalidated connector routes");
            vec![ledger.to_string()]
        } else {
            Vec::new()
        }
    }

    /// Push back the expiry of every route announced by `account` by
    /// `hold_down`. Entries without an expiry, the local pairs, stay
    /// immortal.
    pub fn bump_connector(&mut self, account: &str, hold_down: Duration) {
        let mut bumped = 0usize;
        for (_, table) in self.sources.iter_mut() {
            for (_, next_hop, route) in table.entries_mut() {
                if next_hop == account {
                    route.bump_expiration(hold_down);
                    bumped += 1;
                }
            }
        }
        if bumped > 0 {
            tracing::debug!(connector = %account, bumped, "bumped connector hold-down");
        }
    }

    /// Total number of `(source, destination, next hop)` entries.
    pub fn count_routes(&self) -> usize {
        self.sources.iter().map(|(_, table)| table.len()).sum()
    }

    /// Best next hop for sending `source_amount` from `source_address`
    /// toward `destination_address`.
    pub fn find_best_hop_for_source_amount(
        &self,
        source_address: &str,
        destination_address: &str,
        source_amount: f64,
    ) -> Option<Hop> {
        let amount = source_amount.abs();
        let table = self.sources.resolve(source_address)?;
        let table_hop = table.find_best_hop_for_source_amount(destination_address, amount)?;
        let value = table_hop.amount;
        self.enrich(table_hop, amount, value)
    }

    /// Cheapest next hop able to deliver `destination_amount` at
    /// `destination_address` for a payment from `source_address`.
    pub fn find_best_hop_for_destination_amount(
        &self,
        source_address: &str,
        destination_address: &str,
        destination_amount: f64,
    ) -> Option<Hop> {
        let amount = destination_amount.abs();
        let table = self.sources.resolve(source_address)?;
        let table_hop = table.find_best_hop_for_destination_amount(destination_address, amount)?;
        let cost = table_hop.amount;
        self.enrich(table_hop, cost, amount)
    }

    /// Wire summaries of everything the engine knows: per destination, the
    /// per-connector routes folded into one curve and capped at
    /// `max_points`. This is what a broadcaster would announce to peers.
    pub fn route_summaries(&self, max_points: usize) -> Vec<RouteWire> {
        let mut summaries = Vec::new();
        for (_, table) in self.sources.iter() {
            for (_, hops) in table.by_destination() {
                let mut routes = hops.values();
                let Some(first) = routes.next() else {
                    continue;
                };
                let combined = routes.fold(first.clone(), |combined, route| combined.combine(route));
                summaries.push(combined.simplify(max_points).to_wire());
            }
        }
        summaries
    }

    /// Turn a raw table hop into a full answer.
    ///
    /// `input_amount` enters the winning route, `final_amount` leaves it.
    /// The [`PAIR`] key is rewritten to our account on the route's
    /// destination ledger. Answers that cannot be completed, because the
    /// local pair or local account backing them is gone, resolve to `None`.
    fn enrich(&self, table_hop: TableHop, input_amount: f64, final_amount: f64) -> Option<Hop> {
        let TableHop {
            next_hop,
            route: best_route,
            ..
        } = table_hop;
        let next_ledger = best_route.next_ledger().to_string();
        let final_ledger = best_route.destination_ledger().to_string();
        let is_final = next_ledger == final_ledger;
        let best_hop = if next_hop == PAIR {
            self.local_accounts
                .get(best_route.destination_ledger())?
                .clone()
        } else {
            next_hop
        };
        let pair = self.local_pair_route(best_route.source_ledger(), &next_ledger)?;
        let destination_amount = pair.curve().amount_at(input_amount);
        let additional_info = if is_final {
            best_route.additional_info().cloned()
        } else {
            None
        };
        Some(Hop {
            is_final,
            is_local: best_route.is_local(),
            destination_credit_account: (!is_final).then(|| best_hop.clone()),
            best_hop,
            source_ledger: best_route.source_ledger().to_string(),
            source_amount: input_amount,
            destination_ledger: next_ledger,
            destination_amount,
            final_ledger,
            final_amount,
            min_message_window: best_route.min_message_window(),
            additional_info,
            best_route,
        })
    }

    fn local_pair_route(&self, source: &str, destination: &str) -> Option<&Route> {
        self.sources
            .get(source)
            .and_then(|table| table.route(destination, PAIR))
    }
}

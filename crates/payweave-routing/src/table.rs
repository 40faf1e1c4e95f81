use std::collections::BTreeMap;

use crate::prefix_map::PrefixMap;
use crate::route::Route;

/// Routes known from one source ledger, grouped by destination prefix and
/// keyed by next-hop account within each destination.
///
/// The per-destination maps are ordered, so queries scan candidates in a
/// stable order and ties go to the first candidate.
#[derive(Debug, Clone, Default)]
pub struct RoutingTable {
    destinations: PrefixMap<BTreeMap<String, Route>>,
}

/// Outcome of removing one entry from a [`RoutingTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveOutcome {
    /// No entry existed for that destination and next hop.
    NotFound,
    /// The entry went away; other next hops still serve the destination.
    RouteRemoved,
    /// The entry was the destination's last one, so the destination itself
    /// left the table.
    DestinationRemoved,
}

/// A candidate next hop picked by a table query.
#[derive(Debug, Clone, PartialEq)]
pub struct TableHop {
    /// Next-hop account key of the winning entry.
    pub next_hop: String,
    /// Amount delivered for a source-amount query; amount required for a
    /// destination-amount query.
    pub amount: f64,
    /// Copy of the winning route.
    pub route: Route,
}

impl RoutingTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self {
            destinations: PrefixMap::new(),
        }
    }

    /// Register `route` for `destination` via `next_hop`, replacing any
    /// previous entry for that pair.
    pub fn add_route(&mut self, destination: &str, next_hop: &str, route: Route) {
        self.destinations
            .get_or_insert_with(destination, BTreeMap::new)
            .insert(next_hop.to_string(), route);
    }

    /// Remove the entry for `destination` via `next_hop`, dropping the
    /// destination entirely when its last next hop goes away.
    pub fn remove_route(&mut self, destination: &str, next_hop: &str) -> RemoveOutcome {
        let Some(hops) = self.destinations.get_mut(destination) else {
            return RemoveOutcome::NotFound;
        };
        if hops.remove(next_hop).is_none() {
            return RemoveOutcome::NotFound;
        }
        if hops.is_empty() {
            self.destinations.remove(destination);
            return RemoveOutcome::DestinationRemoved;
        }
        RemoveOutcome::RouteRemoved
    }

    /// The route registered for exactly `destination` via `next_hop`.
    pub fn route(&self, destination: &str, next_hop: &str) -> Option<&Route> {
        self.destinations
            .get(destination)
            .and_then(|hops| hops.get(next_hop))
    }

    /// Next-hop map registered for exactly `destination`.
    pub fn routes_to(&self, destination: &str) -> Option<&BTreeMap<String, Route>> {
        self.destinations.get(destination)
    }

    /// Iterate `(destination, next-hop map)` in prefix-priority order.
    pub fn by_destination(&self) -> impl Iterator<Item = (&str, &BTreeMap<String, Route>)> {
        self.destinations.iter()
    }

    /// Iterate every `(destination, next_hop, route)` entry.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str, &Route)> {
        self.destinations.iter().flat_map(|(destination, hops)| {
            hops.iter()
                .map(move |(next_hop, route)| (destination, next_hop.as_str(), route))
        })
    }

    /// Iterate every entry with mutable access to the routes.
    pub fn entries_mut(&mut self) -> impl Iterator<Item = (&str, &str, &mut Route)> {
        self.destinations.iter_mut().flat_map(|(destination, hops)| {
            hops.iter_mut()
                .map(move |(next_hop, route)| (destination, next_hop.as_str(), route))
        })
    }

    /// Total number of `(destination, next hop)` entries.
    pub fn len(&self) -> usize {
        self.destinations.iter().map(|(_, hops)| hops.len()).sum()
    }

    /// Returns true if the table holds no routes.
    pub fn is_empty(&self) -> bool {
        self.destinations.is_empty()
    }

    /// The next hop delivering the most at `destination` when
    /// `source_amount` is sent.
    pub fn find_best_hop_for_source_amount(
        &self,
        destination: &str,
        source_amount: f64,
    ) -> Option<TableHop> {
        let hops = self.destinations.resolve(destination)?;
        let mut best: Option<(&String, f64, &Route)> = None;
        for (next_hop, route) in hops {
            let value = route.curve().amount_at(source_amount);
            match best {
                Some((_, best_value, _)) if value <= best_value => {}
                _ => best = Some((next_hop, value, route)),
            }
        }
        best.map(|(next_hop, amount, route)| TableHop {
            next_hop: next_hop.clone(),
            amount,
            route: route.clone(),
        })
    }

    /// The next hop requiring the least to deliver `destination_amount` at
    /// `destination`. Hops whose curve can never deliver the amount are
    /// skipped; if none can, there is no answer.
    pub fn find_best_hop_for_destination_amount(
        &self,
        destination: &str,
        destination_amount: f64,
    ) -> Option<TableHop> {
        let hops = self.destinations.resolve(destination)?;
        let mut best: Option<(&String, f64, &Route)> = None;
        for (next_hop, route) in hops {
            let cost = route.curve().amount_reverse(destination_amount);
            if cost.is_infinite() {
                continue;
            }
            match best {
                Some((_, best_cost, _)) if cost >= best_cost => {}
                _ => best = Some((next_hop, cost, route)),
            }
        }
        best.map(|(next_hop, amount, route)| TableHop {
            next_hop: next_hop.clone(),
            amount,
            route: route.clone(),
        })
    }
}

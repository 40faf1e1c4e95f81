/// Errors that can occur within the routing layer.
///
/// Only broken caller contracts surface as errors; a missing route, an
/// unmatched prefix or an unreachable amount is an absent value, not an
/// error.
#[derive(Debug, thiserror::Error)]
pub enum RoutingError {
    #[error("{ledger} is not adjacent")]
    NotAdjacent { ledger: String },

    #[error("a route needs a source and a destination ledger, got {hops} hop(s)")]
    TooFewHops { hops: usize },
}

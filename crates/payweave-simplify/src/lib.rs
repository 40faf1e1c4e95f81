//! Polyline simplification with a hard cap on the number of output points.
//!
//! Implements Visvalingam-Whyatt elimination: interior points are ranked by
//! the area of the triangle they form with their two neighbours, and the
//! least significant point is removed until the polyline fits the cap. The
//! first and last points are always kept, and every surviving point is one
//! of the input points.

/// Effective area of the interior point `b` between its neighbours `a` and `c`.
fn triangle_area(a: [f64; 2], b: [f64; 2], c: [f64; 2]) -> f64 {
    ((a[0] * (b[1] - c[1]) + b[0] * (c[1] - a[1]) + c[0] * (a[1] - b[1])) / 2.0).abs()
}

/// Reduce `points` to at most `max_points` points.
///
/// Polylines that already fit are returned unchanged. A cap below 2 is
/// treated as 2, since the endpoints are never eliminated. When several
/// interior points tie for the smallest area, the leftmost one goes first,
/// so the result is deterministic.
pub fn simplify(points: &[[f64; 2]], max_points: usize) -> Vec<[f64; 2]> {
    let mut remaining = points.to_vec();
    if remaining.len() <= 2 {
        return remaining;
    }
    let target = max_points.max(2);
    while remaining.len() > target {
        let mut least: Option<(usize, f64)> = None;
        for i in 1..remaining.len() - 1 {
            let area = triangle_area(remaining[i - 1], remaining[i], remaining[i + 1]);
            match least {
                Some((_, smallest)) if area >= smallest => {}
                _ => least = Some((i, area)),
            }
        }
        match least {
            Some((i, _)) => {
                remaining.remove(i);
            }
            None => break,
        }
    }
    remaining
}

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::segment::each_overlapping_segment;

/// A single curve point: `x` is the amount sent, `y` the amount delivered.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    /// Create a point.
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl From<[f64; 2]> for Point {
    fn from(pair: [f64; 2]) -> Self {
        Self {
            x: pair[0],
            y: pair[1],
        }
    }
}

impl From<Point> for [f64; 2] {
    fn from(point: Point) -> Self {
        [point.x, point.y]
    }
}

/// A piecewise-linear exchange-rate curve mapping source amount to
/// destination amount.
///
/// Points are ascending in `x` with at most one point per `x`, and `y`
/// never decreases along the curve. Constructors trust their input; the
/// algebra below preserves both properties.
///
/// Serializes as a bare array of `[x, y]` pairs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LiquidityCurve {
    points: Vec<Point>,
}

impl LiquidityCurve {
    /// Create a curve from points already ordered by `x`.
    pub fn new(points: Vec<Point>) -> Self {
        Self { points }
    }

    /// Create a curve from `[x, y]` pairs already ordered by `x`.
    pub fn from_pairs(pairs: impl IntoIterator<Item = [f64; 2]>) -> Self {
        Self {
            points: pairs.into_iter().map(Point::from).collect(),
        }
    }

    /// The curve's points.
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Returns true if the curve has no points.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Amount delivered when `x` is sent.
    ///
    /// Below the curve's x-range the answer is 0; beyond it the curve
    /// saturates at the final y. An `x` that equals a stored point's x
    /// returns that point's y with no interpolation error.
    pub fn amount_at(&self, x: f64) -> f64 {
        let (first, last) = match (self.points.first(), self.points.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return 0.0,
        };
        if x < first.x {
            return 0.0;
        }
        if x >= last.x {
            return last.y;
        }
        // first.x <= x < last.x, so both neighbours exist
        let i = self.points.partition_point(|p| p.x < x);
        let b = self.points[i];
        if b.x == x {
            return b.y;
        }
        let a = self.points[i - 1];
        (b.y - a.y) / (b.x - a.x) * (x - a.x) + a.y
    }

    /// Smallest amount that must be sent for at least `y` to be delivered.
    ///
    /// Amounts at or below the curve's first y cost the first x. Amounts the
    /// curve can never deliver cost infinity, as does any amount on an empty
    /// curve.
    pub fn amount_reverse(&self, y: f64) -> f64 {
        let (first, last) = match (self.points.first(), self.points.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return f64::INFINITY,
        };
        if first.y >= y {
            return first.x;
        }
        if last.y < y {
            return f64::INFINITY;
        }
        // first.y < y <= last.y, so the bracketing segment rises
        let i = self.points.partition_point(|p| p.y < y);
        let b = self.points[i];
        if b.y == y {
            return b.x;
        }
        let a = self.points[i - 1];
        (b.x - a.x) / (b.y - a.y) * (y - a.y) + a.x
    }

    /// Pointwise maximum of two curves: the rate an aggregator can quote
    /// when it may pick either curve per amount.
    ///
    /// Each curve's points are lifted to the maximum of the two curves, and
    /// every crossing between segments contributes the exact intersection
    /// point. Commutative; combining with an empty curve is a no-op.
    pub fn combine(&self, other: &LiquidityCurve) -> LiquidityCurve {
        if self.points.is_empty() {
            return other.clone();
        }
        if other.points.is_empty() {
            return self.clone();
        }
        let mut points = self.map_to_max(&other.points);
        points.extend(other.map_to_max(&self.points));
        points.extend(self.crossovers(other));
        sort_dedupe(&mut points);
        LiquidityCurve { points }
    }

    /// Sequential composition: what `other` delivers when fed what `self`
    /// delivers.
    ///
    /// The result is defined on `self`'s x-range and saturates at `other`'s
    /// final y once `self` delivers more than `other` can absorb.
    pub fn join(&self, other: &LiquidityCurve) -> LiquidityCurve {
        let mut points = Vec::with_capacity(self.points.len() + other.points.len());
        for p in &self.points {
            points.push(Point::new(p.x, other.amount_at(p.y)));
        }
        for p in &other.points {
            let x = self.amount_reverse(p.x);
            if x.is_finite() {
                points.push(Point::new(x, p.y));
            }
        }
        sort_dedupe(&mut points);
        LiquidityCurve { points }
    }

    /// Translate every point's y by `dy`.
    pub fn shift_y(&self, dy: f64) -> LiquidityCurve {
        LiquidityCurve {
            points: self
                .points
                .iter()
                .map(|p| Point::new(p.x, p.y + dy))
                .collect(),
        }
    }

    /// Reduce the curve to at most `max_points` points, keeping the most
    /// significant ones.
    pub fn simplify(&self, max_points: usize) -> LiquidityCurve {
        let pairs: Vec<[f64; 2]> = self.points.iter().copied().map(<[f64; 2]>::from).collect();
        LiquidityCurve {
            points: payweave_simplify::simplify(&pairs, max_points)
                .into_iter()
                .map(Point::from)
                .collect(),
        }
    }

    /// Lift `points` onto this curve where it runs higher.
    fn map_to_max(&self, points: &[Point]) -> Vec<Point> {
        points
            .iter()
            .map(|p| Point::new(p.x, p.y.max(self.amount_at(p.x))))
            .collect()
    }

    /// Every point where a segment of `self` crosses a segment of `other`.
    ///
    /// The curve that ends first is extended by a synthetic flat tail at its
    /// final y so trailing segments of the longer curve can still cross it;
    /// the synthetic endpoint itself is never part of the result.
    fn crossovers(&self, other: &LiquidityCurve) -> Vec<Point> {
        let (end_a, end_b) = match (self.points.last(), other.points.last()) {
            (Some(a), Some(b)) => (*a, *b),
            _ => return Vec::new(),
        };
        let mut points_a = self.points.clone();
        let mut points_b = other.points.clone();
        if end_a.x < end_b.x {
            points_a.push(Point::new(end_b.x, end_a.y));
        } else if end_b.x < end_a.x {
            points_b.push(Point::new(end_a.x, end_b.y));
        }
        let mut crossings = Vec::new();
        each_overlapping_segment(&points_a, &points_b, |seg_a, seg_b| {
            if let Some(p) = seg_a.intersect(&seg_b) {
                crossings.push(p);
            }
        });
        crossings
    }
}

/// Order by x (ties by y) and drop exact duplicate points.
fn sort_dedupe(points: &mut Vec<Point>) {
    points.sort_by(|a, b| {
        a.x.partial_cmp(&b.x)
            .unwrap_or(Ordering::Equal)
            .then(a.y.partial_cmp(&b.y).unwrap_or(Ordering::Equal))
    });
    points.dedup();
}

use crate::curve::Point;

/// A curve segment in slope/intercept form, carrying the x-range it covers.
///
/// Zero-width segments degenerate to `m = 0, b = 0`; their x-range is a
/// single value, so intersection tests against them only ever accept that
/// exact x.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Segment {
    pub m: f64,
    pub b: f64,
    pub x0: f64,
    pub x1: f64,
}

impl Segment {
    /// Build the segment spanning `a` to `b` (`a.x <= b.x`).
    pub fn between(a: Point, b: Point) -> Self {
        let dx = b.x - a.x;
        if dx == 0.0 {
            return Self {
                m: 0.0,
                b: 0.0,
                x0: a.x,
                x1: b.x,
            };
        }
        Self {
            m: (b.y - a.y) / dx,
            b: (b.x * a.y - a.x * b.y) / dx,
            x0: a.x,
            x1: b.x,
        }
    }

    fn contains_x(&self, x: f64) -> bool {
        self.x0 <= x && x <= self.x1
    }

    /// Intersection point with `other`, if it falls within both x-ranges.
    /// Parallel segments yield nothing, overlapping or not.
    pub fn intersect(&self, other: &Segment) -> Option<Point> {
        if self.m == other.m {
            return None;
        }
        let x = (other.b - self.b) / (self.m - other.m);
        let y = self.m * x + self.b;
        if self.contains_x(x) && other.contains_x(x) {
            Some(Point::new(x, y))
        } else {
            None
        }
    }
}

/// Visit every pair of segments from `points_a` and `points_b` whose
/// x-ranges overlap. Both point lists must be ascending in x; the cursor
/// skips b-segments that end before the current a-segment starts, so the
/// scan stays linear in the total number of segments.
pub(crate) fn each_overlapping_segment<F>(points_a: &[Point], points_b: &[Point], mut visit: F)
where
    F: FnMut(Segment, Segment),
{
    let mut cursor = 1;
    for index_a in 1..points_a.len() {
        let seg_a = Segment::between(points_a[index_a - 1], points_a[index_a]);
        for index_b in cursor..points_b.len() {
            let seg_b = Segment::between(points_b[index_b - 1], points_b[index_b]);
            if seg_b.x1 < seg_a.x0 {
                cursor += 1;
                continue;
            }
            if seg_a.x1 < seg_b.x0 {
                break;
            }
            visit(seg_a, seg_b);
        }
    }
}

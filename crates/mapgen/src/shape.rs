//! 2D paths and shapes (outer contour plus holes) in the XY plane.

use glam::Vec2;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Segment {
    Line(Vec2),
    Quadratic { control: Vec2, end: Vec2 },
    Cubic { c1: Vec2, c2: Vec2, end: Vec2 },
}

/// A single contour built from move/line/curve commands.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Path {
    start: Option<Vec2>,
    segments: Vec<Segment>,
}

impl Path {
    pub fn new() -> Self {
        Self::default()
    }

    /// Straight-edged contour through `points`.
    pub fn from_points(points: &[Vec2]) -> Self {
        let mut path = Self::new();
        if let Some((first, rest)) = points.split_first() {
            path.move_to(*first);
            for p in rest {
                path.line_to(*p);
            }
        }
        path
    }

    pub fn move_to(&mut self, p: Vec2) {
        self.start = Some(p);
        self.segments.clear();
    }

    pub fn line_to(&mut self, p: Vec2) {
        self.begin_if_empty(p);
        self.segments.push(Segment::Line(p));
    }

    pub fn quadratic_curve_to(&mut self, control: Vec2, end: Vec2) {
        self.begin_if_empty(control);
        self.segments.push(Segment::Quadratic { control, end });
    }

    pub fn bezier_curve_to(&mut self, c1: Vec2, c2: Vec2, end: Vec2) {
        self.begin_if_empty(c1);
        self.segments.push(Segment::Cubic { c1, c2, end });
    }

    fn begin_if_empty(&mut self, p: Vec2) {
        if self.start.is_none() {
            self.start = Some(p);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.start.is_none()
    }

    /// Sample the contour. Curves are split into `divisions` steps; lines keep
    /// their end points only. A trailing point equal to the start is dropped.
    pub fn points(&self, divisions: usize) -> Vec<Vec2> {
        let Some(start) = self.start else {
            return Vec::new();
        };
        let divisions = divisions.max(1);
        let mut out = vec![start];
        let mut cursor = start;
        for segment in &self.segments {
            match *segment {
                Segment::Line(end) => {
                    out.push(end);
                    cursor = end;
                }
                Segment::Quadratic { control, end } => {
                    for i in 1..=divisions {
                        let t = i as f32 / divisions as f32;
                        out.push(quadratic(cursor, control, end, t));
                    }
                    cursor = end;
                }
                Segment::Cubic { c1, c2, end } => {
                    for i in 1..=divisions {
                        let t = i as f32 / divisions as f32;
                        out.push(cubic(cursor, c1, c2, end, t));
                    }
                    cursor = end;
                }
            }
        }
        out.dedup_by(|a, b| a.distance_squared(*b) < 1e-12);
        if out.len() > 1 && out[0].distance_squared(out[out.len() - 1]) < 1e-12 {
            out.pop();
        }
        out
    }
}

fn quadratic(p0: Vec2, p1: Vec2, p2: Vec2, t: f32) -> Vec2 {
    let k = 1.0 - t;
    p0 * (k * k) + p1 * (2.0 * k * t) + p2 * (t * t)
}

fn cubic(p0: Vec2, p1: Vec2, p2: Vec2, p3: Vec2, t: f32) -> Vec2 {
    let k = 1.0 - t;
    p0 * (k * k * k) + p1 * (3.0 * k * k * t) + p2 * (3.0 * k * t * t) + p3 * (t * t * t)
}

/// Signed area of a closed polygon; positive when counter-clockwise.
pub fn signed_area(points: &[Vec2]) -> f32 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    let mut sum = 0.0;
    for i in 0..n {
        let a = points[i];
        let b = points[(i + 1) % n];
        sum += a.perp_dot(b);
    }
    sum * 0.5
}

/// Even-odd point-in-polygon test.
pub fn contains_point(polygon: &[Vec2], p: Vec2) -> bool {
    let n = polygon.len();
    let mut inside = false;
    let mut j = n.wrapping_sub(1);
    for i in 0..n {
        let a = polygon[i];
        let b = polygon[j];
        if (a.y > p.y) != (b.y > p.y) && p.x < (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// An outer contour with zero or more holes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Shape {
    pub outer: Path,
    pub holes: Vec<Path>,
}

impl Shape {
    pub fn new(outer: Path) -> Self {
        Self {
            outer,
            holes: Vec::new(),
        }
    }

    /// Closed straight-edged shape through a projected ring.
    pub fn from_ring(points: &[Vec2]) -> Self {
        Self::new(Path::from_points(points))
    }

    pub fn with_hole(mut self, hole: Path) -> Self {
        self.holes.push(hole);
        self
    }

    /// Sampled outer contour and holes.
    pub fn extract_points(&self, divisions: usize) -> (Vec<Vec2>, Vec<Vec<Vec2>>) {
        (
            self.outer.points(divisions),
            self.holes.iter().map(|h| h.points(divisions)).collect(),
        )
    }
}

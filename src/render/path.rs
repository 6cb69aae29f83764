//! Organic edge geometry.
//!
//! An edge between nodes `a < b` is drawn as a polyline whose interior
//! points are pushed along the edge normal by a deterministic wobble:
//!
//! ```text
//! s      = 3a + 7b + i
//! offset = (sin(0.5 s) · 0.6 + sin(1.2 s) · 0.4) · length · amplitude
//! ```
//!
//! The same path is reused to place pulses, so a pulse rides exactly on the
//! process it travels along, whichever direction it goes.

use super::surface::Point;

/// Wobble profile for a seed, in `[-1, 1]`.
#[inline]
pub fn wobble(seed: f64) -> f64 {
    (seed * 0.5).sin() * 0.6 + (seed * 1.2).sin() * 0.4
}

/// Polyline of `segments + 1` points from node `a` to node `b`.
#[derive(Clone, Debug, PartialEq)]
pub struct OrganicPath {
    points: Vec<Point>,
    length: f64,
}

impl OrganicPath {
    /// Build the path for the canonical pair `(a, b)`, `a < b`.
    pub fn between(
        a: usize,
        b: usize,
        from: Point,
        to: Point,
        segments: usize,
        amplitude: f64,
    ) -> Self {
        let segments = segments.max(1);
        let dx = to.x - from.x;
        let dy = to.y - from.y;
        let length = (dx * dx + dy * dy).sqrt();
        // Unit normal; coincident endpoints get no offset.
        let (nx, ny) = if length > 0.0 {
            (-dy / length, dx / length)
        } else {
            (0.0, 0.0)
        };

        let mut points = Vec::with_capacity(segments + 1);
        points.push(from);
        for i in 1..segments {
            let t = i as f64 / segments as f64;
            let base = from.lerp(to, t);
            let seed = (a * 3 + b * 7 + i) as f64;
            let offset = wobble(seed) * length * amplitude;
            points.push(Point::new(base.x + nx * offset, base.y + ny * offset));
        }
        points.push(to);

        Self { points, length }
    }

    #[inline]
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    #[inline]
    pub fn segments(&self) -> usize {
        self.points.len() - 1
    }

    /// Straight-line distance between the endpoints.
    #[inline]
    pub fn length(&self) -> f64 {
        self.length
    }

    /// Position at parameter `t ∈ [0, 1]` along the polyline, with segments
    /// weighted equally.
    pub fn point_at(&self, t: f64) -> Point {
        let segments = self.segments();
        let scaled = t.clamp(0.0, 1.0) * segments as f64;
        if scaled >= segments as f64 {
            return self.points[segments];
        }
        let idx = scaled.floor() as usize;
        let local = scaled - idx as f64;
        self.points[idx].lerp(self.points[idx + 1], local)
    }
}

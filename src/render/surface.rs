//! Drawing surface abstraction.
//!
//! The renderer only clears, strokes lines, and fills circles (optionally
//! glowing). Each maps one-to-one onto a 2D canvas context call. The
//! host implements [`Surface`]; [`RecordingSurface`] captures the commands
//! for tests and headless runs.

use crate::viewport::Viewport;

/// A point in surface pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[inline]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Linear interpolation toward `other`.
    #[inline]
    pub fn lerp(self, other: Point, t: f64) -> Point {
        Point::new(self.x + (other.x - self.x) * t, self.y + (other.y - self.y) * t)
    }

    #[inline]
    pub fn distance(self, other: Point) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// 8-bit color with a fractional alpha, clamped to `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f64,
}

impl Rgba {
    #[inline]
    pub fn new(r: u8, g: u8, b: u8, a: f64) -> Self {
        Self { r, g, b, a: a.clamp(0.0, 1.0) }
    }

    /// Opaque color from `0xRRGGBB`.
    #[inline]
    pub fn from_hex(rgb: u32) -> Self {
        Self::new((rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8, 1.0)
    }

    #[inline]
    pub fn white(a: f64) -> Self {
        Self::new(255, 255, 255, a)
    }

    /// CSS `rgba(...)` form, as accepted by canvas style setters.
    pub fn css(&self) -> String {
        format!("rgba({}, {}, {}, {:.3})", self.r, self.g, self.b, self.a)
    }
}

/// Line stroke parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Stroke {
    pub width: f64,
    pub color: Rgba,
}

/// Soft shadow drawn under a filled shape.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Glow {
    pub blur: f64,
    pub color: Rgba,
}

/// Drawing target for one frame.
pub trait Surface {
    /// Fill the whole surface with `color`, discarding the previous frame.
    fn clear(&mut self, color: Rgba, viewport: Viewport);

    /// Stroke a straight, round-capped line.
    fn stroke_line(&mut self, from: Point, to: Point, stroke: Stroke);

    /// Fill a disk, optionally with a glow.
    fn fill_circle(&mut self, center: Point, radius: f64, color: Rgba, glow: Option<Glow>);
}

/// One recorded primitive.
#[derive(Clone, Debug, PartialEq)]
pub enum DrawCommand {
    Clear {
        color: Rgba,
        viewport: Viewport,
    },
    Line {
        from: Point,
        to: Point,
        stroke: Stroke,
    },
    Circle {
        center: Point,
        radius: f64,
        color: Rgba,
        glow: Option<Glow>,
    },
}

/// Surface that records every command instead of rasterizing.
#[derive(Clone, Debug, Default)]
pub struct RecordingSurface {
    pub commands: Vec<DrawCommand>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop recorded commands, keeping the allocation.
    pub fn reset(&mut self) {
        self.commands.clear();
    }

    pub fn lines(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Line { .. }))
            .count()
    }

    pub fn circles(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Circle { .. }))
            .count()
    }

    pub fn glowing_circles(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Circle { glow: Some(_), .. }))
            .count()
    }
}

impl Surface for RecordingSurface {
    fn clear(&mut self, color: Rgba, viewport: Viewport) {
        self.commands.push(DrawCommand::Clear { color, viewport });
    }

    fn stroke_line(&mut self, from: Point, to: Point, stroke: Stroke) {
        self.commands.push(DrawCommand::Line { from, to, stroke });
    }

    fn fill_circle(&mut self, center: Point, radius: f64, color: Rgba, glow: Option<Glow>) {
        self.commands.push(DrawCommand::Circle { center, radius, color, glow });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_decodes_channels() {
        let c = Rgba::from_hex(0x05_10_ff);
        assert_eq!((c.r, c.g, c.b), (0x05, 0x10, 0xff));
        assert_eq!(c.a, 1.0);
    }

    #[test]
    fn alpha_is_clamped() {
        assert_eq!(Rgba::white(1.7).a, 1.0);
        assert_eq!(Rgba::white(-0.2).a, 0.0);
    }

    #[test]
    fn css_form() {
        assert_eq!(Rgba::white(0.5).css(), "rgba(255, 255, 255, 0.500)");
    }

    #[test]
    fn lerp_endpoints() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(10.0, -4.0);
        assert_eq!(a.lerp(b, 0.0), a);
        assert_eq!(a.lerp(b, 1.0), b);
        assert_eq!(a.lerp(b, 0.5), Point::new(5.0, -2.0));
    }

    #[test]
    fn recording_counts_by_kind() {
        let mut s = RecordingSurface::new();
        s.clear(Rgba::from_hex(0), Viewport::new(10.0, 10.0));
        let stroke = Stroke {
            width: 1.0,
            color: Rgba::white(1.0),
        };
        s.stroke_line(Point::default(), Point::new(1.0, 1.0), stroke);
        s.fill_circle(Point::default(), 2.0, Rgba::white(1.0), None);
        s.fill_circle(
            Point::default(),
            2.0,
            Rgba::white(1.0),
            Some(Glow { blur: 4.0, color: Rgba::white(1.0) }),
        );
        assert_eq!(s.lines(), 1);
        assert_eq!(s.circles(), 2);
        assert_eq!(s.glowing_circles(), 1);
        s.reset();
        assert!(s.commands.is_empty());
    }
}

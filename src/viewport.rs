//! Surface geometry — tracked dimensions and the values derived from them.

use crate::config::FieldConfig;

/// Dimensions below this are floored so area- and side-derived values never
/// collapse to zero.
pub const MIN_DIMENSION: f64 = 1.0;

/// Drawing surface size in pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    /// Create a viewport, flooring degenerate or non-finite sides at
    /// [`MIN_DIMENSION`].
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width: floor_dimension(width),
            height: floor_dimension(height),
        }
    }

    #[inline]
    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    #[inline]
    pub fn min_side(&self) -> f64 {
        self.width.min(self.height)
    }

    /// Whether a point lies inside `[0, width] × [0, height]`.
    #[inline]
    pub fn contains(&self, x: f64, y: f64) -> bool {
        (0.0..=self.width).contains(&x) && (0.0..=self.height).contains(&y)
    }
}

fn floor_dimension(v: f64) -> f64 {
    if v.is_finite() {
        v.max(MIN_DIMENSION)
    } else {
        MIN_DIMENSION
    }
}

/// Owns the surface bounds and the connection distance derived from them.
#[derive(Clone, Debug)]
pub struct SurfaceManager {
    viewport: Viewport,
    connection_fraction: f64,
    connection_distance: f64,
}

impl SurfaceManager {
    pub fn new(viewport: Viewport, config: &FieldConfig) -> Self {
        let connection_fraction = config.connection_fraction;
        Self {
            viewport,
            connection_fraction,
            connection_distance: viewport.min_side() * connection_fraction,
        }
    }

    #[inline]
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    #[inline]
    pub fn connection_distance(&self) -> f64 {
        self.connection_distance
    }

    /// Track a new surface size. Returns `true` if anything changed.
    pub fn resize(&mut self, width: f64, height: f64) -> bool {
        let next = Viewport::new(width, height);
        if next == self.viewport {
            return false;
        }
        self.viewport = next;
        self.connection_distance = next.min_side() * self.connection_fraction;
        true
    }

    /// Node count for the current area: `floor(area / density)`, capped.
    pub fn node_count(&self, config: &FieldConfig) -> usize {
        node_count_for(self.viewport, config)
    }
}

/// Node count for a viewport: `floor(area / density)` clamped to `max_nodes`.
pub fn node_count_for(viewport: Viewport, config: &FieldConfig) -> usize {
    let by_area = (viewport.area() / config.density).floor();
    (by_area.max(0.0) as usize).min(config.max_nodes)
}

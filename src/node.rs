//! Node field — drifting point-masses with activation and refractory state.
//!
//! Nodes are created once and mutated in place every frame. Count is fixed
//! for the lifetime of the field.
//!
//! ## Per-node state machine
//!
//! ```text
//! Resting (a = 0) ──fire──▶ Firing (a = 1, refractory = R)
//!      ▲                         │ decay
//!      └──── snap below floor ── Decaying (0 < a < 1)
//! ```
//!
//! Refractory counts down independently of activation and gates every
//! transition into Firing.

use crate::config::FieldConfig;
use crate::random::RandomSource;
use crate::viewport::Viewport;

/// One neuron-like site.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Node {
    pub x: f64,
    pub y: f64,
    pub vx: f64,
    pub vy: f64,
    /// Firing intensity in `[0, 1]`. 0 = resting.
    pub activation: f64,
    /// Frames remaining before the node may fire again.
    pub refractory: u32,
}

impl Node {
    /// A resting node at rest velocity.
    pub fn at(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            vx: 0.0,
            vy: 0.0,
            activation: 0.0,
            refractory: 0,
        }
    }

    #[inline]
    pub fn with_velocity(mut self, vx: f64, vy: f64) -> Self {
        self.vx = vx;
        self.vy = vy;
        self
    }

    /// Euclidean distance to another node.
    #[inline]
    pub fn distance(&self, other: &Node) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    #[inline]
    pub fn is_resting(&self) -> bool {
        self.activation == 0.0
    }

    #[inline]
    pub fn can_fire(&self) -> bool {
        self.refractory == 0
    }

    /// Enter Firing if not refractory. Returns whether the node fired.
    #[inline]
    pub fn fire(&mut self, cooldown: u32) -> bool {
        if !self.can_fire() {
            return false;
        }
        self.activation = 1.0;
        self.refractory = cooldown;
        true
    }

    /// Geometric decay, snapped to exactly 0 below `floor`.
    #[inline]
    fn decay(&mut self, factor: f64, floor: f64) {
        if self.activation > 0.0 {
            self.activation *= factor;
            if self.activation < floor {
                self.activation = 0.0;
            }
        }
    }

    /// Elastic wall bounce. The velocity component is pointed back toward
    /// the interior, so a node left outside by a shrink walks back in.
    #[inline]
    fn bounce(&mut self, bounds: Viewport) {
        if self.x < 0.0 {
            self.vx = self.vx.abs();
        } else if self.x > bounds.width {
            self.vx = -self.vx.abs();
        }
        if self.y < 0.0 {
            self.vy = self.vy.abs();
        } else if self.y > bounds.height {
            self.vy = -self.vy.abs();
        }
    }
}

/// The fixed set of nodes for a session.
#[derive(Clone, Debug, Default)]
pub struct NodeField {
    pub nodes: Vec<Node>,
}

impl NodeField {
    /// Scatter `count` resting nodes uniformly over the viewport with small
    /// random drift.
    pub fn initialize(
        count: usize,
        viewport: Viewport,
        config: &FieldConfig,
        rng: &mut dyn RandomSource,
    ) -> Self {
        let mut nodes = Vec::with_capacity(count);
        for _ in 0..count {
            let x = rng.unit() * viewport.width;
            let y = rng.unit() * viewport.height;
            let vx = (rng.unit() - 0.5) * config.drift_speed;
            let vy = (rng.unit() - 0.5) * config.drift_speed;
            nodes.push(Node::at(x, y).with_velocity(vx, vy));
        }
        Self { nodes }
    }

    /// Wrap an explicit node set.
    pub fn from_nodes(nodes: Vec<Node>) -> Self {
        Self { nodes }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Fire node `idx` with the given cooldown. Returns `false` when the node
    /// is refractory or out of range.
    pub fn fire(&mut self, idx: usize, cooldown: u32) -> bool {
        self.nodes
            .get_mut(idx)
            .map(|n| n.fire(cooldown))
            .unwrap_or(false)
    }

    /// Advance one frame: drift, bounce, decay, refractory recovery, and
    /// spontaneous firing. Returns the number of spontaneous spikes.
    pub fn advance(
        &mut self,
        bounds: Viewport,
        config: &FieldConfig,
        rng: &mut dyn RandomSource,
    ) -> usize {
        let mut spontaneous = 0;
        for node in &mut self.nodes {
            node.x += node.vx;
            node.y += node.vy;
            node.bounce(bounds);

            node.decay(config.decay, config.activation_floor);

            if node.refractory > 0 {
                node.refractory -= 1;
            }

            if node.can_fire() && rng.chance(config.spontaneous_rate) {
                node.fire(config.spontaneous_cooldown);
                spontaneous += 1;
            }
        }
        spontaneous
    }

    /// Number of nodes with non-zero activation.
    pub fn active_count(&self) -> usize {
        self.nodes.iter().filter(|n| !n.is_resting()).count()
    }
}

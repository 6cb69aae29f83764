//! Engine configuration — simulation constants and rendering style.
//!
//! Every value has a default tuned for a full-viewport background. Overrides
//! deserialize through serde with `#[serde(default)]`, so a partial document
//! only needs to name the fields it changes.

use serde::Deserialize;

use crate::error::{EngineError, Result};
use crate::topology::TopologyStrategy;

/// Node field and pulse automaton constants.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct FieldConfig {
    /// Surface area (px²) per node when sizing the field. Default: 15000
    pub density: f64,
    /// Hard ceiling on node count, bounds the quadratic edge build. Default: 80
    pub max_nodes: usize,
    /// Velocity components are drawn from `(u - 0.5) * drift_speed`. Default: 0.2
    pub drift_speed: f64,
    /// Connection distance as a fraction of the smaller surface side. Default: 0.25
    pub connection_fraction: f64,
    /// Per-frame activation multiplier. Default: 0.92
    pub decay: f64,
    /// Activation below this snaps to exactly 0. Default: 0.01
    pub activation_floor: f64,
    /// Per-frame probability of a spontaneous spike. Default: 0.002
    pub spontaneous_rate: f64,
    /// Refractory frames after a spontaneous spike. Default: 50
    pub spontaneous_cooldown: u32,
    /// Refractory frames after a pulse-triggered spike. Default: 40
    pub arrival_cooldown: u32,
    /// Activation a node must exceed to emit pulses. Default: 0.8
    pub spawn_threshold: f64,
    /// Per-frame, per-burst-slot chance of emitting a pulse. Default: 0.1
    pub spawn_chance: f64,
    /// Burst size is `1 + floor(u * max_burst)`. Default: 2
    pub max_burst: u32,
    /// Lower bound of the pulse speed range (progress per frame). Default: 0.02
    pub min_pulse_speed: f64,
    /// Upper bound (exclusive) of the pulse speed range. Default: 0.04
    pub max_pulse_speed: f64,
    /// Edge build strategy. Default: brute force
    pub topology: TopologyStrategy,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            density: 15_000.0,
            max_nodes: 80,
            drift_speed: 0.2,
            connection_fraction: 0.25,
            decay: 0.92,            // fast decay
            activation_floor: 0.01,
            spontaneous_rate: 0.002,
            spontaneous_cooldown: 50,
            arrival_cooldown: 40,
            spawn_threshold: 0.8,
            spawn_chance: 0.1,
            max_burst: 2,
            min_pulse_speed: 0.02,
            max_pulse_speed: 0.04,
            topology: TopologyStrategy::BruteForce,
        }
    }
}

impl FieldConfig {
    /// Largest per-axis velocity a freshly initialized node can have.
    #[inline]
    pub fn max_axis_speed(&self) -> f64 {
        self.drift_speed * 0.5
    }

    fn validate(&self) -> Result<()> {
        if !(self.density > 0.0) {
            return Err(EngineError::invalid("density", "must be positive"));
        }
        if !(self.connection_fraction > 0.0) {
            return Err(EngineError::invalid("connection_fraction", "must be positive"));
        }
        if !(self.decay > 0.0 && self.decay < 1.0) {
            return Err(EngineError::invalid("decay", format!("{} not in (0, 1)", self.decay)));
        }
        if !(self.activation_floor > 0.0 && self.activation_floor < 1.0) {
            return Err(EngineError::invalid(
                "activation_floor",
                format!("{} not in (0, 1)", self.activation_floor),
            ));
        }
        for (field, p) in [
            ("spontaneous_rate", self.spontaneous_rate),
            ("spawn_chance", self.spawn_chance),
        ] {
            if !(0.0..=1.0).contains(&p) {
                return Err(EngineError::invalid(field, format!("probability {p} not in [0, 1]")));
            }
        }
        if !(self.min_pulse_speed > 0.0) {
            return Err(EngineError::invalid("min_pulse_speed", "must be positive"));
        }
        if !(self.max_pulse_speed > self.min_pulse_speed) {
            return Err(EngineError::invalid(
                "max_pulse_speed",
                format!(
                    "range [{}, {}) is empty",
                    self.min_pulse_speed, self.max_pulse_speed
                ),
            ));
        }
        Ok(())
    }
}

/// Edge and pulse drawing style.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderStyle {
    /// Straight hairlines and single-disk pulses.
    Plain,
    /// Wobbled, tapered processes with spines and particle-cloud pulses.
    #[default]
    Organic,
}

/// Renderer constants.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub style: RenderStyle,
    /// Background fill, 0xRRGGBB. Default: 0x050505
    pub background: u32,
    /// Segments per organic edge path. Default: 8
    pub segments: usize,
    /// Wobble amplitude as a fraction of edge length. Default: 0.08
    pub wobble: f64,
    /// Edges longer than this grow spines. Default: 40
    pub spine_min_length: f64,
    /// Particles per pulse cloud. Default: 6
    pub pulse_particles: usize,
    /// Progress span covered by the pulse trail. Default: 0.03
    pub pulse_trail: f64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            style: RenderStyle::Organic,
            background: 0x05_05_05,
            segments: 8,
            wobble: 0.08,
            spine_min_length: 40.0,
            pulse_particles: 6,
            pulse_trail: 0.03,
        }
    }
}

impl RenderConfig {
    fn validate(&self) -> Result<()> {
        if self.segments == 0 {
            return Err(EngineError::invalid("segments", "must be at least 1"));
        }
        if self.pulse_particles == 0 {
            return Err(EngineError::invalid("pulse_particles", "must be at least 1"));
        }
        Ok(())
    }
}

/// Full engine configuration.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub field: FieldConfig,
    pub render: RenderConfig,
}

impl EngineConfig {
    /// Check every range constraint the simulation relies on.
    pub fn validate(&self) -> Result<()> {
        self.field.validate()?;
        self.render.validate()
    }
}

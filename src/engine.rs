//! Engine — the simulation context for one mounted background.
//!
//! Owns every piece of mutable simulation state (nodes, topology, pulses,
//! random source, tracked surface) and runs the per-frame pipeline:
//!
//! ```text
//! NodeField::advance → Topology::build → PulseTrain::spawn → PulseTrain::advance
//! ```
//!
//! The renderer only ever sees `&Engine`.

use tracing::trace;

use crate::config::{EngineConfig, FieldConfig};
use crate::error::Result;
use crate::node::{Node, NodeField};
use crate::pulse::{PulseReport, PulseTrain};
use crate::random::{EntropySource, RandomSource};
use crate::stats::FrameStats;
use crate::topology::Topology;
use crate::viewport::{SurfaceManager, Viewport};

/// Simulation state plus the pipeline that advances it.
pub struct Engine<R: RandomSource = EntropySource> {
    config: EngineConfig,
    surface: SurfaceManager,
    field: NodeField,
    topology: Topology,
    pulses: PulseTrain,
    rng: R,
    frame: u64,
    last: FrameStats,
}

impl<R: RandomSource> Engine<R> {
    /// Size the node field from the viewport area and scatter it.
    pub fn new(viewport: Viewport, config: EngineConfig, mut rng: R) -> Result<Self> {
        config.validate()?;
        let surface = SurfaceManager::new(viewport, &config.field);
        let count = surface.node_count(&config.field);
        let field = NodeField::initialize(count, viewport, &config.field, &mut rng);
        trace!(count, width = viewport.width, height = viewport.height, "node field initialized");
        Ok(Self::assemble(config, surface, field, rng))
    }

    /// Engine over an explicit node set.
    pub fn with_nodes(
        viewport: Viewport,
        config: EngineConfig,
        nodes: Vec<Node>,
        rng: R,
    ) -> Result<Self> {
        config.validate()?;
        let surface = SurfaceManager::new(viewport, &config.field);
        Ok(Self::assemble(config, surface, NodeField::from_nodes(nodes), rng))
    }

    fn assemble(config: EngineConfig, surface: SurfaceManager, field: NodeField, rng: R) -> Self {
        let topology = Topology::build_with(
            &field.nodes,
            surface.connection_distance(),
            config.field.topology,
        );
        Self {
            config,
            surface,
            field,
            topology,
            pulses: PulseTrain::new(),
            rng,
            frame: 0,
            last: FrameStats::default(),
        }
    }

    /// Run one frame of the simulation.
    pub fn step(&mut self) -> FrameStats {
        let bounds = self.surface.viewport();
        let distance = self.surface.connection_distance();
        let cfg = &self.config.field;

        let spontaneous = self.field.advance(bounds, cfg, &mut self.rng);
        self.topology = Topology::build_with(&self.field.nodes, distance, cfg.topology);
        let spawned = self.pulses.spawn(&self.field, &self.topology, cfg, &mut self.rng);
        let report = self.pulses.advance(&mut self.field, distance, cfg);

        self.frame += 1;
        let mut stats = FrameStats {
            frame: self.frame,
            nodes: self.field.len(),
            active: self.field.active_count(),
            connections: self.topology.len(),
            pulses: self.pulses.len(),
            spontaneous,
            ..FrameStats::default()
        };
        stats.absorb(PulseReport { spawned, ..report });

        trace!(%stats, "step");
        self.last = stats;
        stats
    }

    /// Track a new surface size. Nodes are left where they are.
    pub fn resize(&mut self, width: f64, height: f64) -> bool {
        self.surface.resize(width, height)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    #[inline]
    pub fn nodes(&self) -> &[Node] {
        &self.field.nodes
    }

    /// Mutable node access for hosts and tests that force state.
    #[inline]
    pub fn nodes_mut(&mut self) -> &mut [Node] {
        &mut self.field.nodes
    }

    #[inline]
    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    #[inline]
    pub fn pulses(&self) -> &PulseTrain {
        &self.pulses
    }

    #[inline]
    pub fn pulses_mut(&mut self) -> &mut PulseTrain {
        &mut self.pulses
    }

    #[inline]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[inline]
    pub fn field_config(&self) -> &FieldConfig {
        &self.config.field
    }

    #[inline]
    pub fn viewport(&self) -> Viewport {
        self.surface.viewport()
    }

    #[inline]
    pub fn connection_distance(&self) -> f64 {
        self.surface.connection_distance()
    }

    /// Frames stepped so far.
    #[inline]
    pub fn frame(&self) -> u64 {
        self.frame
    }

    #[inline]
    pub fn last_stats(&self) -> FrameStats {
        self.last
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::FixedRandom;

    #[test]
    fn node_count_follows_viewport() {
        let engine = Engine::new(
            Viewport::new(800.0, 600.0),
            EngineConfig::default(),
            FixedRandom(0.5),
        )
        .expect("valid config");
        assert_eq!(engine.nodes().len(), 32);
        assert!((engine.connection_distance() - 150.0).abs() < 1e-9);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let mut cfg = EngineConfig::default();
        cfg.field.spawn_chance = 2.0;
        assert!(Engine::new(Viewport::new(100.0, 100.0), cfg, FixedRandom(0.5)).is_err());
    }

    #[test]
    fn degenerate_viewport_yields_empty_field() {
        let mut engine = Engine::new(
            Viewport::new(0.0, 0.0),
            EngineConfig::default(),
            FixedRandom(0.5),
        )
        .expect("valid config");
        assert!(engine.nodes().is_empty());
        let stats = engine.step();
        assert_eq!(stats.nodes, 0);
        assert_eq!(stats.connections, 0);
    }

    #[test]
    fn resize_keeps_nodes() {
        let mut engine = Engine::new(
            Viewport::new(800.0, 600.0),
            EngineConfig::default(),
            FixedRandom(0.5),
        )
        .expect("valid config");
        let before: Vec<Node> = engine.nodes().to_vec();
        assert!(engine.resize(200.0, 100.0));
        assert_eq!(engine.nodes(), before.as_slice());
        assert!((engine.connection_distance() - 25.0).abs() < 1e-9);
    }

    #[test]
    fn step_rebuilds_topology_from_positions() {
        let nodes = vec![
            Node::at(10.0, 10.0).with_velocity(0.1, 0.0),
            Node::at(20.0, 10.0),
        ];
        let mut engine = Engine::with_nodes(
            Viewport::new(400.0, 400.0),
            EngineConfig::default(),
            nodes,
            FixedRandom(0.5),
        )
        .expect("valid config");
        let stats = engine.step();
        assert_eq!(stats.frame, 1);
        assert_eq!(stats.connections, 1);
        let c = engine.topology().connections[0];
        assert!((c.distance - 9.9).abs() < 1e-9);
        assert_eq!(engine.last_stats(), stats);
    }

    #[test]
    fn in_flight_pulses_never_reach_full_progress() {
        let mut engine = Engine::new(
            Viewport::new(1024.0, 768.0),
            EngineConfig::default(),
            EntropySource::seeded(11),
        )
        .expect("valid config");
        // Seed activity so pulses flow from the first frame.
        for n in engine.nodes_mut().iter_mut().step_by(3) {
            n.activation = 1.0;
        }
        let mut spawned = 0;
        for _ in 0..2_000 {
            let stats = engine.step();
            spawned += stats.spawned;
            for p in engine.pulses() {
                assert!(p.progress < 1.0 && p.progress > 0.0);
                assert!(p.speed >= 0.02 && p.speed < 0.04);
            }
        }
        assert!(spawned > 0, "no pulses spawned in 2000 frames");
    }
}

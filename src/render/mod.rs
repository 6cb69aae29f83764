//! Frame renderer — paints edges, pulses, and nodes from engine state.
//!
//! Rendering is a pure read of the engine: the renderer holds `&Engine` and
//! never mutates nodes, pulses, or connections. Draw order per frame:
//!
//! 1. clear to the background color (no trails)
//! 2. connections, brighter when short and when endpoints are active
//! 3. pulses in flight
//! 4. nodes, whose radius and brightness follow activation
//!
//! Two styles share the same opacity model. `Plain` draws straight hairlines
//! and single-disk pulses. `Organic` draws wobbled, tapered processes with
//! dendritic spines and particle-cloud pulses.

mod path;
mod surface;

pub use path::{wobble, OrganicPath};
pub use surface::{DrawCommand, Glow, Point, RecordingSurface, Rgba, Stroke, Surface};

use std::f64::consts::PI;

use crate::config::{RenderConfig, RenderStyle};
use crate::engine::Engine;
use crate::node::Node;
use crate::pulse::Pulse;
use crate::random::RandomSource;
use crate::topology::Connection;

/// Stateless painter configured with a [`RenderConfig`].
#[derive(Clone, Debug, Default)]
pub struct Renderer {
    config: RenderConfig,
}

impl Renderer {
    pub fn new(config: RenderConfig) -> Self {
        Self { config }
    }

    #[inline]
    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Paint one frame. `clock_ms` only drives the pulse-cloud shimmer.
    pub fn draw<R: RandomSource>(
        &self,
        surface: &mut dyn Surface,
        engine: &Engine<R>,
        clock_ms: f64,
    ) {
        surface.clear(Rgba::from_hex(self.config.background), engine.viewport());

        let nodes = engine.nodes();
        let cd = engine.connection_distance();

        for conn in &engine.topology().connections {
            match self.config.style {
                RenderStyle::Plain => self.draw_plain_edge(surface, nodes, conn, cd),
                RenderStyle::Organic => self.draw_organic_edge(surface, nodes, conn, cd),
            }
        }

        for pulse in engine.pulses() {
            let (Some(src), Some(dst)) = (nodes.get(pulse.source), nodes.get(pulse.target)) else {
                continue;
            };
            match self.config.style {
                RenderStyle::Plain => draw_plain_pulse(surface, src, dst, pulse),
                RenderStyle::Organic => self.draw_pulse_cloud(surface, src, dst, pulse, clock_ms),
            }
        }

        for node in nodes {
            draw_node(surface, node);
        }
    }

    // =========================================================================
    // Connections
    // =========================================================================

    fn draw_plain_edge(
        &self,
        surface: &mut dyn Surface,
        nodes: &[Node],
        conn: &Connection,
        cd: f64,
    ) {
        let (na, nb) = (&nodes[conn.a], &nodes[conn.b]);
        let activity = na.activation + nb.activation;
        let opacity = edge_opacity(conn.distance, cd, activity);
        surface.stroke_line(
            position(na),
            position(nb),
            Stroke {
                width: 0.5 * (1.0 + activity),
                color: Rgba::white(opacity),
            },
        );
    }

    fn draw_organic_edge(
        &self,
        surface: &mut dyn Surface,
        nodes: &[Node],
        conn: &Connection,
        cd: f64,
    ) {
        let (na, nb) = (&nodes[conn.a], &nodes[conn.b]);
        let activity = na.activation + nb.activation;
        let opacity = edge_opacity(conn.distance, cd, activity);

        let path = OrganicPath::between(
            conn.a,
            conn.b,
            position(na),
            position(nb),
            self.config.segments,
            self.config.wobble,
        );
        let points = path.points();
        let segments = path.segments();

        // Tapered process: thick near the somas, thin mid-span.
        for i in 1..points.len() {
            let t = i as f64 / segments as f64;
            let taper = 1.5 - (t * PI).sin() * 0.8;
            surface.stroke_line(
                points[i - 1],
                points[i],
                Stroke {
                    width: taper * (1.0 + activity),
                    color: Rgba::white(opacity * (1.2 - taper * 0.2)),
                },
            );
        }

        // Dendritic spines on longer processes.
        if path.length() > self.config.spine_min_length {
            for (i, p) in points.iter().enumerate().take(segments).skip(1) {
                let seed = conn.a + conn.b + i;
                if seed % 5 != 0 {
                    continue;
                }
                let len = 3.0 + (seed % 4) as f64;
                let angle = (seed % 10) as f64 * PI * 0.2;
                surface.stroke_line(
                    *p,
                    Point::new(p.x + angle.cos() * len, p.y + angle.sin() * len),
                    Stroke {
                        width: 0.5,
                        color: Rgba::white(opacity * 0.5),
                    },
                );
            }
        }
    }

    // =========================================================================
    // Pulses
    // =========================================================================

    /// Trailing particle cloud; the head particle carries the glow.
    fn draw_pulse_cloud(
        &self,
        surface: &mut dyn Surface,
        src: &Node,
        dst: &Node,
        pulse: &Pulse,
        clock_ms: f64,
    ) {
        // Ride the same canonical path the edge was drawn with.
        let forward = pulse.source < pulse.target;
        let (a, b, pa, pb) = if forward {
            (pulse.source, pulse.target, position(src), position(dst))
        } else {
            (pulse.target, pulse.source, position(dst), position(src))
        };
        let path = OrganicPath::between(a, b, pa, pb, self.config.segments, self.config.wobble);

        let count = self.config.pulse_particles;
        for k in 0..count {
            let lag = k as f64 / count as f64;
            let t = (pulse.progress - lag * self.config.pulse_trail).max(0.0);
            let base = path.point_at(if forward { t } else { 1.0 - t });

            let phase = k as f64 * 1.5 + clock_ms * 0.01;
            let center = Point::new(base.x + phase.sin() * 2.0, base.y + phase.cos() * 2.0);
            let radius = 0.8 + particle_noise(pulse, k) * 0.8;
            let alpha = 0.4 + (1.0 - lag) * 0.5;
            let glow = (k == 0).then(|| Glow {
                blur: 12.0,
                color: Rgba::white(1.0),
            });
            surface.fill_circle(center, radius, Rgba::white(alpha), glow);
        }
    }
}

fn draw_plain_pulse(surface: &mut dyn Surface, src: &Node, dst: &Node, pulse: &Pulse) {
    let center = position(src).lerp(position(dst), pulse.progress);
    surface.fill_circle(
        center,
        1.5,
        Rgba::white(0.9),
        Some(Glow {
            blur: 10.0,
            color: Rgba::white(1.0),
        }),
    );
}

// =============================================================================
// Nodes
// =============================================================================

fn draw_node(surface: &mut dyn Surface, node: &Node) {
    let a = node.activation;
    let glow = (a > 0.1).then(|| Glow {
        blur: 15.0 * a,
        color: Rgba::white(0.9),
    });
    surface.fill_circle(position(node), 1.5 + a * 3.0, Rgba::white(0.15 + a * 0.85), glow);
}

// =============================================================================
// Helpers
// =============================================================================

#[inline]
fn position(node: &Node) -> Point {
    Point::new(node.x, node.y)
}

/// Base opacity falls off with distance; endpoint activity adds on top.
#[inline]
pub fn edge_opacity(distance: f64, connection_distance: f64, activity: f64) -> f64 {
    let mut opacity = (1.0 - distance / connection_distance) * 0.15;
    if activity > 0.0 {
        opacity += activity * 0.3;
    }
    opacity
}

/// Stable per-particle noise in `[0, 1)` so particle sizes hold steady
/// between frames instead of flickering.
fn particle_noise(pulse: &Pulse, k: usize) -> f64 {
    let mut z = (pulse.source as u64)
        .wrapping_mul(0x9E37_79B9_7F4A_7C15)
        ^ (pulse.target as u64).wrapping_mul(0xC2B2_AE3D_27D4_EB4F)
        ^ pulse.speed.to_bits()
        ^ k as u64;
    // splitmix64 finalizer
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^= z >> 31;
    (z >> 11) as f64 / (1u64 << 53) as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::random::FixedRandom;
    use crate::viewport::Viewport;

    fn engine_with(nodes: Vec<Node>, style: RenderStyle) -> (Engine<FixedRandom>, Renderer) {
        let mut cfg = EngineConfig::default();
        cfg.render.style = style;
        let renderer = Renderer::new(cfg.render.clone());
        let engine = Engine::with_nodes(Viewport::new(800.0, 600.0), cfg, nodes, FixedRandom(0.5))
            .expect("valid config");
        (engine, renderer)
    }

    #[test]
    fn frame_starts_with_background_clear() {
        let (engine, renderer) = engine_with(vec![Node::at(10.0, 10.0)], RenderStyle::Organic);
        let mut surface = RecordingSurface::new();
        renderer.draw(&mut surface, &engine, 0.0);
        match &surface.commands[0] {
            DrawCommand::Clear { color, viewport } => {
                assert_eq!(*color, Rgba::from_hex(0x050505));
                assert_eq!(*viewport, Viewport::new(800.0, 600.0));
            }
            other => panic!("first command should clear, got {other:?}"),
        }
    }

    #[test]
    fn plain_style_draws_one_primitive_per_item() {
        let nodes = vec![Node::at(100.0, 100.0), Node::at(150.0, 100.0), Node::at(700.0, 500.0)];
        let (mut engine, renderer) = engine_with(nodes, RenderStyle::Plain);
        engine.step();
        engine.pulses_mut().launch(Pulse::new(0, 1, 0.03));

        let mut surface = RecordingSurface::new();
        renderer.draw(&mut surface, &engine, 0.0);
        assert_eq!(surface.lines(), 1);
        assert_eq!(surface.circles(), 3 + 1);
    }

    #[test]
    fn organic_edge_has_segments_and_spines() {
        // a + b + i ≡ 0 (mod 5) hits for i = 4 when (a, b) = (0, 1).
        let nodes = vec![Node::at(100.0, 100.0), Node::at(200.0, 100.0)];
        let (mut engine, renderer) = engine_with(nodes, RenderStyle::Organic);
        engine.step();

        let mut surface = RecordingSurface::new();
        renderer.draw(&mut surface, &engine, 0.0);
        assert_eq!(surface.lines(), 8 + 1);
    }

    #[test]
    fn short_edges_have_no_spines() {
        let nodes = vec![Node::at(100.0, 100.0), Node::at(130.0, 100.0)];
        let (mut engine, renderer) = engine_with(nodes, RenderStyle::Organic);
        engine.step();

        let mut surface = RecordingSurface::new();
        renderer.draw(&mut surface, &engine, 0.0);
        assert_eq!(surface.lines(), 8);
    }

    #[test]
    fn spine_length_threshold_is_strict() {
        for (x, lines) in [(140.0, 8), (140.5, 8 + 1)] {
            let nodes = vec![Node::at(100.0, 100.0), Node::at(x, 100.0)];
            let (mut engine, renderer) = engine_with(nodes, RenderStyle::Organic);
            engine.step();

            let mut surface = RecordingSurface::new();
            renderer.draw(&mut surface, &engine, 0.0);
            assert_eq!(surface.lines(), lines, "edge length {}", x - 100.0);
        }
    }

    #[test]
    fn pulse_cloud_has_one_glowing_head() {
        let nodes = vec![Node::at(100.0, 100.0), Node::at(200.0, 100.0)];
        let (mut engine, renderer) = engine_with(nodes, RenderStyle::Organic);
        engine.pulses_mut().launch(Pulse {
            progress: 0.5,
            ..Pulse::new(1, 0, 0.03)
        });

        let mut surface = RecordingSurface::new();
        renderer.draw(&mut surface, &engine, 0.0);
        // 6 particles + 2 resting nodes; resting nodes do not glow.
        assert_eq!(surface.circles(), 6 + 2);
        assert_eq!(surface.glowing_circles(), 1);
    }

    #[test]
    fn reverse_pulse_rides_the_drawn_edge() {
        let nodes = vec![Node::at(100.0, 100.0), Node::at(200.0, 140.0)];
        let (engine, _) = engine_with(nodes, RenderStyle::Organic);
        let cfg = engine.config().render.clone();
        let path = OrganicPath::between(
            0,
            1,
            Point::new(100.0, 100.0),
            Point::new(200.0, 140.0),
            cfg.segments,
            cfg.wobble,
        );

        let mut surface = RecordingSurface::new();
        let renderer = Renderer::new(cfg);
        let mut engine = engine;
        engine.pulses_mut().launch(Pulse {
            progress: 0.3,
            ..Pulse::new(1, 0, 0.03)
        });
        // clock chosen so the head particle's jitter is (sin, cos)(π/2) · 2 = (2, 0)
        let clock_ms = 50.0 * PI;
        renderer.draw(&mut surface, &engine, clock_ms);

        let head = surface
            .commands
            .iter()
            .find_map(|c| match c {
                DrawCommand::Circle {
                    center,
                    glow: Some(g),
                    ..
                } if g.blur == 12.0 => Some(*center),
                _ => None,
            })
            .expect("head particle");
        let on_path = path.point_at(0.7);
        assert!((head.x - (on_path.x + 2.0)).abs() < 1e-9);
        assert!((head.y - on_path.y).abs() < 1e-9);
    }

    #[test]
    fn node_size_and_glow_follow_activation() {
        let mut hot = Node::at(10.0, 10.0);
        hot.activation = 1.0;
        let mut warm = Node::at(20.0, 10.0);
        warm.activation = 0.05;
        let nodes = vec![hot, warm, Node::at(30.0, 10.0)];
        let (engine, renderer) = engine_with(nodes, RenderStyle::Plain);

        let mut surface = RecordingSurface::new();
        renderer.draw(&mut surface, &engine, 0.0);
        let circles: Vec<_> = surface
            .commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Circle {
                    radius, color, glow, ..
                } => Some((*radius, color.a, glow.is_some())),
                _ => None,
            })
            .collect();
        assert_eq!(circles.len(), 3);
        assert_eq!(circles[0], (4.5, 1.0, true));
        assert!(!circles[1].2, "activation 0.05 must not glow");
        assert!((circles[2].0 - 1.5).abs() < 1e-12);
        assert!((circles[2].1 - 0.15).abs() < 1e-12);
    }

    #[test]
    fn drawing_never_mutates_engine() {
        let mut nodes: Vec<Node> = (0..12)
            .map(|i| Node::at(50.0 + i as f64 * 30.0, 200.0 + (i % 3) as f64 * 20.0))
            .collect();
        nodes[4].activation = 0.9;
        let (mut engine, renderer) = engine_with(nodes, RenderStyle::Organic);
        engine.step();
        engine.pulses_mut().launch(Pulse::new(3, 4, 0.03));

        let nodes_before = engine.nodes().to_vec();
        let topo_before = engine.topology().clone();
        let pulses_before: Vec<Pulse> = engine.pulses().iter().copied().collect();

        let mut surface = RecordingSurface::new();
        for frame in 0..5 {
            renderer.draw(&mut surface, &engine, frame as f64 * 16.0);
        }
        assert_eq!(engine.nodes(), nodes_before.as_slice());
        assert_eq!(engine.topology(), &topo_before);
        assert_eq!(engine.pulses().iter().copied().collect::<Vec<_>>(), pulses_before);
    }

    #[test]
    fn opacity_rises_with_closeness_and_activity() {
        assert!(edge_opacity(10.0, 100.0, 0.0) > edge_opacity(90.0, 100.0, 0.0));
        assert!(edge_opacity(50.0, 100.0, 1.0) > edge_opacity(50.0, 100.0, 0.0));
        assert!((edge_opacity(0.0, 100.0, 0.0) - 0.15).abs() < 1e-12);
    }

    #[test]
    fn particle_noise_is_stable_and_in_range() {
        let p = Pulse::new(3, 9, 0.027);
        for k in 0..6 {
            let n = particle_noise(&p, k);
            assert!((0.0..1.0).contains(&n));
            assert_eq!(n, particle_noise(&p, k));
        }
    }
}

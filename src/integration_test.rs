//! Integration Test: activation cascades through the full frame pipeline.
//!
//! These tests drive `Engine::step` (and the scheduler on top of it) with
//! controlled random sources to check the end-to-end behavior of the field:
//!
//! 1. **Cascade** — a firing node's pulse reaches a resting neighbor and fires it
//! 2. **Refractory suppression** — a pulse reaching a refractory node is spent
//!    without effect
//! 3. **Edge breakage** — a pulse whose endpoints drift apart is dropped
//! 4. **Long run** — containment, refractory countdown, and pulse bounds hold
//!    over thousands of random frames

#[cfg(test)]
mod tests {
    use crate::{
        Engine, EngineConfig, EntropySource, FixedRandom, FrameScheduler, ManualHost, Node,
        RecordingSurface, SchedulerState, Viewport,
    };

    /// 0.05 passes the 10% spawn chance, fails the 0.2% spontaneous chance,
    /// picks burst size 1, neighbor 0, and speed 0.021.
    const SPAWN_ONLY: f64 = 0.05;
    /// Frames for a 0.021-speed pulse to arrive: ceil(1 / 0.021).
    const TRAVEL_FRAMES: usize = 48;

    const A: usize = 0;
    const B: usize = 1;

    fn two_node_engine(b_refractory: u32) -> Engine<FixedRandom> {
        let mut a = Node::at(100.0, 100.0);
        a.activation = 1.0;
        let mut b = Node::at(150.0, 100.0);
        b.refractory = b_refractory;
        Engine::with_nodes(
            Viewport::new(800.0, 600.0),
            EngineConfig::default(),
            vec![a, b],
            FixedRandom(SPAWN_ONLY),
        )
        .expect("valid config")
    }

    // ========================================================================
    // Scenarios
    // ========================================================================

    #[test]
    fn firing_cascade_reaches_neighbor() {
        let mut engine = two_node_engine(0);
        assert!(engine.nodes()[A].distance(&engine.nodes()[B]) < engine.connection_distance());

        // Frames 1 and 2 spawn (activation 0.92, 0.8464); frame 3 is below threshold.
        let mut spawned = 0;
        for frame in 1..TRAVEL_FRAMES {
            let stats = engine.step();
            spawned += stats.spawned;
            assert_eq!(stats.arrived, 0, "frame {frame}: premature arrival");
            assert_eq!(engine.nodes()[B].activation, 0.0, "frame {frame}: B fired early");
        }
        assert_eq!(spawned, 2);
        assert_eq!(engine.pulses().len(), 2);

        let stats = engine.step();
        assert_eq!(stats.arrived, 1, "first pulse must arrive on frame {TRAVEL_FRAMES}");
        assert_eq!(engine.nodes()[B].activation, 1.0);
        assert_eq!(engine.nodes()[B].refractory, engine.field_config().arrival_cooldown);

        // The second pulse lands one frame later, inside B's refractory window.
        let stats = engine.step();
        assert_eq!(stats.suppressed, 1);
        assert_eq!(stats.arrived, 0);
        assert!(engine.nodes()[B].activation < 1.0);
    }

    #[test]
    fn refractory_target_suppresses_arrival() {
        let mut engine = two_node_engine(100);

        let mut suppressed = 0;
        for frame in 1..=TRAVEL_FRAMES + 1 {
            let stats = engine.step();
            suppressed += stats.suppressed;
            assert_eq!(stats.arrived, 0, "frame {frame}: refractory node was triggered");
            assert_eq!(engine.nodes()[B].activation, 0.0, "frame {frame}: B activation changed");
            assert!(engine.nodes()[B].refractory > 0);
        }
        assert_eq!(suppressed, 2, "both pulses retire on arrival");
        assert!(engine.pulses().is_empty());
    }

    #[test]
    fn broken_edge_drops_pulse_in_flight() {
        let mut engine = two_node_engine(0);
        let stats = engine.step();
        assert_eq!(stats.spawned, 1);
        assert_eq!(engine.pulses().len(), 1);

        engine.nodes_mut()[B].x = 400.0;
        let stats = engine.step();
        assert_eq!(stats.dropped, 1);
        assert_eq!(stats.spawned, 0, "no edge left to spawn along");
        assert!(engine.pulses().is_empty());

        for frame in 0..TRAVEL_FRAMES * 2 {
            engine.step();
            assert_eq!(engine.nodes()[B].activation, 0.0, "frame {frame}: dropped pulse fired B");
        }
    }

    // ========================================================================
    // Long-run properties
    // ========================================================================

    #[test]
    fn long_run_invariants_hold() {
        let cfg = EngineConfig::default();
        let slack = cfg.field.max_axis_speed() + 1e-9;
        let mut engine = Engine::new(Viewport::new(1280.0, 800.0), cfg, EntropySource::seeded(2024))
            .expect("valid config");
        // Kick a handful of nodes so the run starts with traffic.
        for n in engine.nodes_mut().iter_mut().step_by(7) {
            n.activation = 1.0;
        }

        let vp = engine.viewport();
        let mut arrivals = 0;
        for frame in 0..4_000 {
            let before: Vec<Node> = engine.nodes().to_vec();
            let stats = engine.step();
            arrivals += stats.arrived;

            for (i, (old, new)) in before.iter().zip(engine.nodes()).enumerate() {
                assert!(
                    new.x >= -slack
                        && new.x <= vp.width + slack
                        && new.y >= -slack
                        && new.y <= vp.height + slack,
                    "frame {frame}: node {i} left the surface at ({}, {})",
                    new.x,
                    new.y
                );
                assert!((0.0..=1.0).contains(&new.activation));
                if old.refractory > 1 {
                    assert_eq!(new.refractory, old.refractory - 1, "frame {frame}: node {i}");
                    assert!(
                        new.activation <= old.activation,
                        "frame {frame}: node {i} fired while refractory"
                    );
                }
                if new.activation == 1.0 && old.activation != 1.0 {
                    assert!(
                        old.refractory <= 1,
                        "frame {frame}: node {i} fired from refractory {}",
                        old.refractory
                    );
                }
            }
            for p in engine.pulses() {
                assert!(p.progress > 0.0 && p.progress < 1.0);
                assert_ne!(p.source, p.target);
            }
        }
        assert!(arrivals > 0, "no pulse ever fired a node");
    }

    #[test]
    fn scheduled_run_then_teardown() {
        let cfg = EngineConfig::default();
        let engine = Engine::new(Viewport::new(1024.0, 768.0), cfg, EntropySource::seeded(5))
            .expect("valid config");
        let mut scheduler = FrameScheduler::new(ManualHost::new(), engine);
        let mut surface = RecordingSurface::new();

        scheduler.start().expect("start");
        let mut clock = 0.0;
        while scheduler.engine().frame() < 120 {
            assert!(scheduler.host_mut().take_due().is_some());
            surface.reset();
            scheduler.tick(clock, &mut surface).expect("tick");
            clock += 16.7;
            assert!(!surface.commands.is_empty());
        }

        scheduler.stop();
        assert_eq!(scheduler.state(), SchedulerState::Stopped);
        assert!(scheduler.host().pending().is_empty());
        assert!(scheduler.host_mut().take_due().is_none());
        assert!(!scheduler.host().resize_attached());
    }
}

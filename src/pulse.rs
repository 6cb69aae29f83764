//! Pulse automaton — spawning and propagation of action potentials.
//!
//! A pulse travels from a source node to a target node over several frames.
//! It is keyed by the `(source, target)` pair, never by an index into the
//! per-frame edge list, and re-validates the endpoint distance every frame.
//!
//! ## Lifecycle
//!
//! ```text
//! spawn (source active > threshold, has neighbors, chance)
//!   │
//!   ▼
//! in flight ── distance > connection distance ──▶ dropped (no effect)
//!   │
//!   │ progress += speed, age += 1
//!   ▼
//! progress ≥ 1 or age ≥ ⌈1/speed⌉
//!   │
//!   ▼
//! arrived: target fires if refractory == 0, otherwise suppressed
//! ```

use crate::config::FieldConfig;
use crate::node::NodeField;
use crate::random::RandomSource;
use crate::topology::Topology;

/// A signal in flight along an edge.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pulse {
    pub source: usize,
    pub target: usize,
    /// Fraction of the path covered, in `[0, 1)` while in flight.
    pub progress: f64,
    /// Progress added per frame.
    pub speed: f64,
    /// Frames advanced since launch.
    pub age: u32,
}

impl Pulse {
    pub fn new(source: usize, target: usize, speed: f64) -> Self {
        Self {
            source,
            target,
            progress: 0.0,
            speed,
            age: 0,
        }
    }

    /// Frames from launch until the pulse arrives.
    ///
    /// Summing `speed` can land a hair under 1.0 after exactly this many
    /// frames (0.1 ten times is 0.999...), so arrival also triggers on age.
    #[inline]
    pub fn lifetime_frames(&self) -> u32 {
        (1.0 / self.speed).ceil() as u32
    }
}

/// Per-frame automaton counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PulseReport {
    pub spawned: usize,
    /// Arrivals that fired their target.
    pub arrived: usize,
    /// Arrivals discarded because the target was refractory.
    pub suppressed: usize,
    /// Pulses lost to a broken edge.
    pub dropped: usize,
}

/// The set of pulses currently in flight.
#[derive(Clone, Debug, Default)]
pub struct PulseTrain {
    pulses: Vec<Pulse>,
}

impl PulseTrain {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.pulses.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pulses.is_empty()
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &Pulse> {
        self.pulses.iter()
    }

    /// Launch a pulse directly, bypassing the spawn rule.
    pub fn launch(&mut self, pulse: Pulse) {
        self.pulses.push(pulse);
    }

    pub fn clear(&mut self) {
        self.pulses.clear();
    }

    /// Emit pulses from every highly active node that has neighbors.
    ///
    /// Each qualifying node draws a burst size in `1..=max_burst`; each burst
    /// slot independently passes `spawn_chance` and then picks a neighbor
    /// uniformly. Returns the number of pulses spawned.
    pub fn spawn(
        &mut self,
        field: &NodeField,
        topology: &Topology,
        config: &FieldConfig,
        rng: &mut dyn RandomSource,
    ) -> usize {
        let before = self.pulses.len();
        for (idx, node) in field.nodes.iter().enumerate() {
            if node.activation <= config.spawn_threshold {
                continue;
            }
            let neighbors = topology.neighbors_of(idx);
            if neighbors.is_empty() {
                continue;
            }

            let burst = 1 + (rng.unit() * config.max_burst as f64).floor() as u32;
            for _ in 0..burst {
                if !rng.chance(config.spawn_chance) {
                    continue;
                }
                let target = neighbors[rng.index(neighbors.len())];
                let speed = rng.range(config.min_pulse_speed, config.max_pulse_speed);
                self.pulses.push(Pulse::new(idx, target, speed));
            }
        }
        self.pulses.len() - before
    }

    /// Move every pulse one frame forward and resolve arrivals and breaks.
    pub fn advance(
        &mut self,
        field: &mut NodeField,
        connection_distance: f64,
        config: &FieldConfig,
    ) -> PulseReport {
        let mut report = PulseReport::default();

        self.pulses.retain_mut(|p| {
            let (Some(src), Some(dst)) = (field.nodes.get(p.source), field.nodes.get(p.target))
            else {
                report.dropped += 1;
                return false;
            };

            if src.distance(dst) > connection_distance {
                report.dropped += 1;
                return false;
            }

            p.age += 1;
            p.progress += p.speed;
            if p.progress < 1.0 && p.age < p.lifetime_frames() {
                return true;
            }

            if field.fire(p.target, config.arrival_cooldown) {
                report.arrived += 1;
            } else {
                report.suppressed += 1;
            }
            false
        });

        report
    }
}

impl<'a> IntoIterator for &'a PulseTrain {
    type Item = &'a Pulse;
    type IntoIter = std::slice::Iter<'a, Pulse>;

    fn into_iter(self) -> Self::IntoIter {
        self.pulses.iter()
    }
}

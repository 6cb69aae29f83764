//! # neurofield
//!
//! Ambient neural-network background animation.
//!
//! A fixed field of drifting nodes is wired every frame by proximity. Nodes
//! fire spontaneously or when a pulse arrives, then decay through a
//! refractory window. Highly active nodes emit pulses that travel along the
//! proximity edges and can trigger their targets in turn.
//!
//! The crate splits into a pure simulation ([`Engine`]), a stateless
//! [`Renderer`] that paints through the [`Surface`] trait, and a
//! [`FrameScheduler`] that drives both from a [`FrameHost`]. On `wasm32` the
//! `web` module wires all three to a browser canvas.

pub mod config;
pub mod engine;
pub mod error;
pub mod node;
pub mod pulse;
pub mod random;
pub mod render;
pub mod scheduler;
pub mod stats;
pub mod topology;
pub mod viewport;

#[cfg(target_arch = "wasm32")]
pub mod web;

#[cfg(test)]
mod integration_test;

pub use config::{EngineConfig, FieldConfig, RenderConfig, RenderStyle};
pub use engine::Engine;
pub use error::{EngineError, Result};
pub use node::{Node, NodeField};
pub use pulse::{Pulse, PulseReport, PulseTrain};
pub use random::{EntropySource, FixedRandom, RandomSource, ScriptedRandom};
pub use render::{DrawCommand, RecordingSurface, Renderer, Rgba, Surface};
pub use scheduler::{attach, FrameHandle, FrameHost, FrameScheduler, ManualHost, SchedulerState};
pub use stats::{FrameStats, RunTotals};
pub use topology::{Connection, Topology, TopologyStrategy};
pub use viewport::{SurfaceManager, Viewport, MIN_DIMENSION};

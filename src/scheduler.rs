//! Frame scheduler — drives the update/draw cycle against a frame host.
//!
//! The host owns the display-refresh mechanism (`requestAnimationFrame` in a
//! browser, a manual pump in tests) and the resize listener. The scheduler
//! owns the engine and the single outstanding frame request.
//!
//! ```text
//! Idle ──start()──▶ Running ──stop()──▶ Stopped
//!                   │    ▲
//!                   └tick┘  (step → draw → request next frame)
//! ```
//!
//! Cancellation is simply not re-registering: `stop()` cancels the pending
//! request, detaches the resize listener, and turns every later `tick` or
//! `resize` into a no-op. `Stopped` is terminal.

use tracing::{debug, trace, warn};

use crate::config::EngineConfig;
use crate::engine::Engine;
use crate::error::{EngineError, Result};
use crate::random::{EntropySource, RandomSource};
use crate::render::{Renderer, Surface};
use crate::stats::FrameStats;
use crate::viewport::Viewport;

/// Opaque id of a registered frame callback.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FrameHandle(pub i64);

/// Display-refresh and resize plumbing provided by the embedding page.
pub trait FrameHost {
    /// Register the next frame callback.
    fn request_frame(&mut self) -> Result<FrameHandle>;

    /// Cancel a registered callback. Unknown handles are ignored.
    fn cancel_frame(&mut self, handle: FrameHandle);

    /// Start delivering viewport resize events.
    fn attach_resize(&mut self) -> Result<()>;

    /// Stop delivering viewport resize events.
    fn detach_resize(&mut self);
}

impl<H: FrameHost + ?Sized> FrameHost for &mut H {
    fn request_frame(&mut self) -> Result<FrameHandle> {
        (**self).request_frame()
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        (**self).cancel_frame(handle)
    }

    fn attach_resize(&mut self) -> Result<()> {
        (**self).attach_resize()
    }

    fn detach_resize(&mut self) {
        (**self).detach_resize()
    }
}

/// Scheduler lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SchedulerState {
    Idle,
    Running,
    Stopped,
}

/// Owns the engine and the frame loop for one mounted background.
pub struct FrameScheduler<H: FrameHost, R: RandomSource = EntropySource> {
    host: H,
    engine: Engine<R>,
    renderer: Renderer,
    pending: Option<FrameHandle>,
    state: SchedulerState,
}

impl<H: FrameHost, R: RandomSource> FrameScheduler<H, R> {
    /// Scheduler painting with the engine's own render settings.
    pub fn new(host: H, engine: Engine<R>) -> Self {
        Self {
            host,
            renderer: Renderer::new(engine.config().render.clone()),
            engine,
            pending: None,
            state: SchedulerState::Idle,
        }
    }

    /// Attach to the host and request the first frame.
    ///
    /// Starting a running scheduler does nothing; starting a stopped one is
    /// refused silently since teardown is final.
    pub fn start(&mut self) -> Result<()> {
        match self.state {
            SchedulerState::Running => return Ok(()),
            SchedulerState::Stopped => {
                debug!("start ignored: scheduler already torn down");
                return Ok(());
            }
            SchedulerState::Idle => {}
        }

        self.host.attach_resize()?;
        match self.host.request_frame() {
            Ok(handle) => self.pending = Some(handle),
            Err(e) => {
                self.host.detach_resize();
                return Err(e);
            }
        }
        self.state = SchedulerState::Running;
        debug!(nodes = self.engine.nodes().len(), "frame loop started");
        Ok(())
    }

    /// One frame: advance the simulation, paint it, request the next frame.
    ///
    /// Returns `None` without touching any state unless running.
    pub fn tick(&mut self, clock_ms: f64, surface: &mut dyn Surface) -> Result<Option<FrameStats>> {
        if self.state != SchedulerState::Running {
            trace!(state = ?self.state, "tick ignored");
            return Ok(None);
        }
        // The callback being serviced is the one we registered.
        self.pending = None;

        let stats = self.engine.step();
        self.renderer.draw(surface, &self.engine, clock_ms);

        match self.host.request_frame() {
            Ok(handle) => self.pending = Some(handle),
            Err(e) => {
                warn!(error = %e, "could not schedule next frame, stopping");
                self.stop();
                return Err(e);
            }
        }
        Ok(Some(stats))
    }

    /// Track a viewport resize. Ignored once stopped.
    pub fn resize(&mut self, width: f64, height: f64) -> bool {
        if self.state == SchedulerState::Stopped {
            return false;
        }
        let changed = self.engine.resize(width, height);
        if changed {
            debug!(
                width,
                height,
                connection_distance = self.engine.connection_distance(),
                "viewport resized"
            );
        }
        changed
    }

    /// Tear down: cancel the pending frame and detach the resize listener.
    /// Idempotent.
    pub fn stop(&mut self) {
        if self.state == SchedulerState::Stopped {
            return;
        }
        if let Some(handle) = self.pending.take() {
            self.host.cancel_frame(handle);
        }
        if self.state == SchedulerState::Running {
            self.host.detach_resize();
        }
        self.state = SchedulerState::Stopped;
        debug!(frames = self.engine.frame(), "frame loop stopped");
    }

    #[inline]
    pub fn state(&self) -> SchedulerState {
        self.state
    }

    /// Frame request currently outstanding, if any.
    #[inline]
    pub fn pending(&self) -> Option<FrameHandle> {
        self.pending
    }

    #[inline]
    pub fn engine(&self) -> &Engine<R> {
        &self.engine
    }

    #[inline]
    pub fn engine_mut(&mut self) -> &mut Engine<R> {
        &mut self.engine
    }

    #[inline]
    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    #[inline]
    pub fn host(&self) -> &H {
        &self.host
    }

    #[inline]
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }
}

/// Acquire a drawing surface, then build an idle scheduler over it.
///
/// `acquire` returns the surface and its current size. If it fails, nothing
/// is built and the host is never touched: no frame is requested and no
/// resize listener is attached. The caller starts the returned scheduler.
pub fn attach<H, R, S, F>(
    host: H,
    config: EngineConfig,
    rng: R,
    acquire: F,
) -> Result<(FrameScheduler<H, R>, S)>
where
    H: FrameHost,
    R: RandomSource,
    S: Surface,
    F: FnOnce() -> Result<(S, Viewport)>,
{
    let (surface, viewport) = acquire()?;
    let engine = Engine::new(viewport, config, rng)?;
    Ok((FrameScheduler::new(host, engine), surface))
}

// ============================================================================
// Manual host
// ============================================================================

/// Host with an explicit frame pump, for headless runs and tests.
///
/// Frame requests queue up as handles; [`ManualHost::take_due`] hands the
/// oldest one back to the driver, which then calls `tick`.
#[derive(Clone, Debug, Default)]
pub struct ManualHost {
    next_id: i64,
    pending: Vec<FrameHandle>,
    cancelled: Vec<FrameHandle>,
    resize_attached: bool,
    refuse_frames: bool,
}

impl ManualHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pop the oldest outstanding request, as if its callback fired.
    pub fn take_due(&mut self) -> Option<FrameHandle> {
        if self.pending.is_empty() {
            None
        } else {
            Some(self.pending.remove(0))
        }
    }

    pub fn pending(&self) -> &[FrameHandle] {
        &self.pending
    }

    pub fn cancelled(&self) -> &[FrameHandle] {
        &self.cancelled
    }

    pub fn resize_attached(&self) -> bool {
        self.resize_attached
    }

    /// Make every later `request_frame` fail.
    pub fn refuse_frames(&mut self) {
        self.refuse_frames = true;
    }
}

impl FrameHost for ManualHost {
    fn request_frame(&mut self) -> Result<FrameHandle> {
        if self.refuse_frames {
            return Err(EngineError::Host("frames refused".into()));
        }
        self.next_id += 1;
        let handle = FrameHandle(self.next_id);
        self.pending.push(handle);
        Ok(handle)
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        let before = self.pending.len();
        self.pending.retain(|h| *h != handle);
        if self.pending.len() != before {
            self.cancelled.push(handle);
        }
    }

    fn attach_resize(&mut self) -> Result<()> {
        self.resize_attached = true;
        Ok(())
    }

    fn detach_resize(&mut self) {
        self.resize_attached = false;
    }
}

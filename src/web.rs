//! Browser host — mounts the engine onto a full-viewport `<canvas>`.
//!
//! ```js
//! import init, { NeuralBackground } from "neurofield";
//! await init();
//! const bg = NeuralBackground.mount("neural-canvas");
//! // ... on unmount
//! bg.unmount();
//! ```
//!
//! Mounting never throws. If the canvas or its 2D context is missing, the
//! returned handle is inert: nothing is drawn and nothing is scheduled.

use std::cell::RefCell;
use std::f64::consts::TAU;
use std::rc::Rc;

use tracing::{debug, warn};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, Window};

use crate::config::EngineConfig;
use crate::error::{EngineError, Result};
use crate::random::EntropySource;
use crate::render::{Glow, Point, Rgba, Stroke, Surface};
use crate::scheduler::{attach, FrameHandle, FrameHost, FrameScheduler, SchedulerState};
use crate::viewport::Viewport;

type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;
type ResizeCallback = Rc<RefCell<Option<Closure<dyn FnMut()>>>>;

// ============================================================================
// Canvas surface
// ============================================================================

/// [`Surface`] over a 2D canvas context.
pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
}

impl CanvasSurface {
    pub fn new(canvas: HtmlCanvasElement, ctx: CanvasRenderingContext2d) -> Self {
        ctx.set_line_cap("round");
        Self { canvas, ctx }
    }

    /// Look up `canvas_id`, take its 2D context, and size it to the window.
    fn acquire(window: &Window, canvas_id: &str) -> Result<(Self, Viewport)> {
        let unavailable = |what: &str| EngineError::SurfaceUnavailable(what.to_string());

        let document = window.document().ok_or_else(|| unavailable("no document"))?;
        let canvas: HtmlCanvasElement = document
            .get_element_by_id(canvas_id)
            .ok_or_else(|| unavailable("canvas element not found"))?
            .dyn_into()
            .map_err(|_| unavailable("element is not a canvas"))?;
        let ctx: CanvasRenderingContext2d = canvas
            .get_context("2d")
            .map_err(|e| unavailable(&format!("getContext failed: {e:?}")))?
            .ok_or_else(|| unavailable("2d context unavailable"))?
            .dyn_into()
            .map_err(|_| unavailable("context is not 2d"))?;

        let (w, h) = window_size(window);
        let viewport = Viewport::new(w, h);
        let surface = Self::new(canvas, ctx);
        surface.fit(viewport);
        Ok((surface, viewport))
    }

    /// Match the canvas backing store to the viewport.
    fn fit(&self, viewport: Viewport) {
        self.canvas.set_width(viewport.width as u32);
        self.canvas.set_height(viewport.height as u32);
    }
}

impl Surface for CanvasSurface {
    fn clear(&mut self, color: Rgba, viewport: Viewport) {
        self.ctx.set_fill_style_str(&color.css());
        self.ctx.fill_rect(0.0, 0.0, viewport.width, viewport.height);
    }

    fn stroke_line(&mut self, from: Point, to: Point, stroke: Stroke) {
        self.ctx.set_line_width(stroke.width);
        self.ctx.set_stroke_style_str(&stroke.color.css());
        self.ctx.begin_path();
        self.ctx.move_to(from.x, from.y);
        self.ctx.line_to(to.x, to.y);
        self.ctx.stroke();
    }

    fn fill_circle(&mut self, center: Point, radius: f64, color: Rgba, glow: Option<Glow>) {
        self.ctx.set_fill_style_str(&color.css());
        if let Some(g) = glow {
            self.ctx.set_shadow_blur(g.blur);
            self.ctx.set_shadow_color(&g.color.css());
        }
        self.ctx.begin_path();
        if self.ctx.arc(center.x, center.y, radius, 0.0, TAU).is_ok() {
            self.ctx.fill();
        }
        if glow.is_some() {
            self.ctx.set_shadow_blur(0.0);
        }
    }
}

// ============================================================================
// Window host
// ============================================================================

/// `requestAnimationFrame` + window `resize` listener.
struct WindowHost {
    window: Window,
    frame_cb: FrameCallback,
    resize_cb: ResizeCallback,
    resize_attached: bool,
}

impl FrameHost for WindowHost {
    fn request_frame(&mut self) -> Result<FrameHandle> {
        let cb = self.frame_cb.borrow();
        let cb = cb
            .as_ref()
            .ok_or_else(|| EngineError::Host("frame callback not installed".into()))?;
        self.window
            .request_animation_frame(cb.as_ref().unchecked_ref())
            .map(|id| FrameHandle(id as i64))
            .map_err(|e| EngineError::Host(format!("requestAnimationFrame: {e:?}")))
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        if let Err(e) = self.window.cancel_animation_frame(handle.0 as i32) {
            debug!(?e, "cancelAnimationFrame failed");
        }
    }

    fn attach_resize(&mut self) -> Result<()> {
        let cb = self.resize_cb.borrow();
        let cb = cb
            .as_ref()
            .ok_or_else(|| EngineError::Host("resize callback not installed".into()))?;
        self.window
            .add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref())
            .map_err(|e| EngineError::Host(format!("addEventListener: {e:?}")))?;
        self.resize_attached = true;
        Ok(())
    }

    fn detach_resize(&mut self) {
        if !self.resize_attached {
            return;
        }
        if let Some(cb) = self.resize_cb.borrow().as_ref() {
            if let Err(e) = self
                .window
                .remove_event_listener_with_callback("resize", cb.as_ref().unchecked_ref())
            {
                debug!(?e, "removeEventListener failed");
            }
        }
        self.resize_attached = false;
    }
}

fn window_size(window: &Window) -> (f64, f64) {
    let w = window.inner_width().ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
    let h = window.inner_height().ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
    (w, h)
}

// ============================================================================
// Mounted instance
// ============================================================================

struct Mounted {
    scheduler: FrameScheduler<WindowHost>,
    surface: CanvasSurface,
}

struct Mount {
    mounted: Rc<RefCell<Mounted>>,
    frame_cb: FrameCallback,
    resize_cb: ResizeCallback,
}

impl Mount {
    fn acquire(canvas_id: &str) -> Result<Self> {
        let window = web_sys::window()
            .ok_or_else(|| EngineError::SurfaceUnavailable("no window".into()))?;

        let frame_cb: FrameCallback = Rc::new(RefCell::new(None));
        let resize_cb: ResizeCallback = Rc::new(RefCell::new(None));
        let host = WindowHost {
            window: window.clone(),
            frame_cb: frame_cb.clone(),
            resize_cb: resize_cb.clone(),
            resize_attached: false,
        };

        let (scheduler, surface) = attach(
            host,
            EngineConfig::default(),
            EntropySource::from_entropy(),
            || CanvasSurface::acquire(&window, canvas_id),
        )?;
        let mounted = Rc::new(RefCell::new(Mounted { scheduler, surface }));

        {
            let mounted = mounted.clone();
            *frame_cb.borrow_mut() = Some(Closure::new(move |clock_ms: f64| {
                let mut m = mounted.borrow_mut();
                let Mounted { scheduler, surface } = &mut *m;
                if let Err(e) = scheduler.tick(clock_ms, surface) {
                    warn!(error = %e, "frame failed");
                }
            }));
        }
        {
            let mounted = mounted.clone();
            let window = window.clone();
            *resize_cb.borrow_mut() = Some(Closure::new(move || {
                let (w, h) = window_size(&window);
                let viewport = Viewport::new(w, h);
                let mut m = mounted.borrow_mut();
                if m.scheduler.resize(viewport.width, viewport.height) {
                    m.surface.fit(viewport);
                }
            }));
        }

        let started = mounted.borrow_mut().scheduler.start();
        if let Err(e) = started {
            frame_cb.borrow_mut().take();
            resize_cb.borrow_mut().take();
            return Err(e);
        }
        Ok(Self {
            mounted,
            frame_cb,
            resize_cb,
        })
    }

    fn teardown(self) {
        self.mounted.borrow_mut().scheduler.stop();
        // Closures hold the mounted state; dropping them breaks the cycle.
        self.frame_cb.borrow_mut().take();
        self.resize_cb.borrow_mut().take();
    }
}

/// Handle returned to the embedding page.
#[wasm_bindgen]
pub struct NeuralBackground {
    mount: Option<Mount>,
}

#[wasm_bindgen]
impl NeuralBackground {
    /// Mount onto the canvas with id `canvas_id` and start animating.
    pub fn mount(canvas_id: &str) -> NeuralBackground {
        match Mount::acquire(canvas_id) {
            Ok(mount) => {
                debug!(canvas_id, "neural background mounted");
                Self { mount: Some(mount) }
            }
            Err(e) => {
                warn!(error = %e, canvas_id, "neural background disabled");
                Self { mount: None }
            }
        }
    }

    /// Whether the animation is live. Turns false if the frame loop stopped
    /// on its own, e.g. after the browser refused a frame request.
    #[wasm_bindgen(getter)]
    pub fn mounted(&self) -> bool {
        self.mount.as_ref().is_some_and(|m| {
            m.mounted
                .try_borrow()
                .map_or(true, |s| s.scheduler.state() == SchedulerState::Running)
        })
    }

    /// Stop the frame loop and detach every listener. Safe to call twice.
    pub fn unmount(&mut self) {
        if let Some(mount) = self.mount.take() {
            mount.teardown();
            debug!("neural background unmounted");
        }
    }
}

impl Drop for NeuralBackground {
    fn drop(&mut self) {
        self.unmount();
    }
}

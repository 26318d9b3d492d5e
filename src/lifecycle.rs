// lifecycle.rs - Mount/unmount glue shared by both renderers
//
//   Unattached --attach--> Attached --teardown--> Detached
//
// Teardown order is fixed: stop the clock, stop observing the host, then
// dispose the renderer. Nothing may tick against a half-released renderer.

use crate::clock::{Frame, FrameClock, FrameSource};
use crate::error::{BackdropError, BackdropResult};
use crate::viewport::{Observation, ViewportState, ViewportTracker};

/// The sized element a backdrop is mounted into.
pub trait HostSurface {
    /// Current content-box size in CSS pixels.
    fn content_size(&self) -> (u32, u32);
    /// Start delivering resize notifications.
    fn observe(&mut self) -> BackdropResult<()>;
    /// Stop delivering resize notifications. Must tolerate repeat calls.
    fn unobserve(&mut self);
}

/// A host that can produce drawing backend `B` (2-D context, GL context, ...).
pub trait AcquireBackend<B>: HostSurface {
    fn acquire(&mut self) -> BackdropResult<B>;
}

pub trait Renderer: Sized {
    type Config;
    type Backend;

    fn initialize(
        config: Self::Config,
        backend: Self::Backend,
        viewport: ViewportState,
    ) -> BackdropResult<Self>;

    fn tick(&mut self, frame: Frame);

    fn on_resize(&mut self, viewport: ViewportState);

    /// Release every backend resource. Called exactly once.
    fn dispose(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Unattached,
    Attached,
    Detached,
}

pub struct Backdrop<R: Renderer, F: FrameSource, H: HostSurface> {
    phase: Phase,
    config: Option<R::Config>,
    clock: FrameClock<F>,
    tracker: ViewportTracker,
    host: H,
    renderer: Option<R>,
}

impl<R: Renderer, F: FrameSource, H: HostSurface> Backdrop<R, F, H> {
    pub fn new(config: R::Config, frames: F, host: H) -> Self {
        Self {
            phase: Phase::Unattached,
            config: Some(config),
            clock: FrameClock::new(frames),
            tracker: ViewportTracker::new(),
            host,
            renderer: None,
        }
    }

    /// Acquire the backend, size it from the host, build the renderer and
    /// start animating. A failed acquisition leaves the backdrop unattached;
    /// any later failure leaves it detached with everything released.
    pub fn attach(&mut self) -> BackdropResult<()>
    where
        H: AcquireBackend<R::Backend>,
    {
        if self.phase != Phase::Unattached {
            return Err(BackdropError::InvalidTransition(self.phase));
        }
        let backend = self.host.acquire()?;

        let (w, h) = self.host.content_size();
        let viewport = match self.tracker.observe(w, h) {
            Observation::Changed(v) => v,
            _ => self.tracker.current().unwrap_or(ViewportState::MINIMAL),
        };

        let config = self
            .config
            .take()
            .ok_or(BackdropError::InvalidTransition(self.phase))?;
        let renderer = match R::initialize(config, backend, viewport) {
            Ok(r) => r,
            Err(e) => {
                self.phase = Phase::Detached;
                return Err(e);
            }
        };
        self.renderer = Some(renderer);
        self.phase = Phase::Attached;

        if let Err(e) = self.host.observe().and_then(|()| self.clock.start()) {
            self.teardown();
            return Err(e);
        }
        log::debug!("backdrop attached at {}x{}", viewport.width, viewport.height);
        Ok(())
    }

    /// Run one frame if the clock has one outstanding. Returns the frame
    /// that ran, `None` if the callback was stale or the backdrop is not
    /// attached.
    pub fn on_frame(&mut self, time_ms: f64) -> Option<Frame> {
        if self.phase != Phase::Attached {
            return None;
        }
        let frame = self.clock.fire(time_ms)?;
        if let Some(renderer) = self.renderer.as_mut() {
            renderer.tick(frame);
        }
        if let Err(e) = self.clock.rearm() {
            // nothing is pending, so the loop is over
            self.clock.stop();
            log::warn!("failed to schedule next frame, animation stopped: {e}");
        }
        Some(frame)
    }

    /// Feed a size observation. The renderer sees the change before the
    /// next frame.
    pub fn resize(&mut self, width: u32, height: u32) -> Observation {
        let observation = self.tracker.observe(width, height);
        if let Observation::Changed(viewport) = observation {
            if let Some(renderer) = self.renderer.as_mut() {
                renderer.on_resize(viewport);
            }
        }
        observation
    }

    /// Re-read the host size; what a resize notification calls.
    pub fn sync_size(&mut self) -> Observation {
        let (w, h) = self.host.content_size();
        self.resize(w, h)
    }

    /// Idempotent. Safe from any phase.
    pub fn teardown(&mut self) {
        match self.phase {
            Phase::Detached => return,
            Phase::Unattached => {
                self.phase = Phase::Detached;
                self.config = None;
                return;
            }
            Phase::Attached => {}
        }
        self.phase = Phase::Detached;

        self.clock.stop();
        self.host.unobserve();
        if let Some(mut renderer) = self.renderer.take() {
            renderer.dispose();
        }
        log::debug!("backdrop detached after {} frames", self.clock.delivered());
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_running(&self) -> bool {
        self.phase == Phase::Attached && self.clock.is_running()
    }

    pub fn renderer(&self) -> Option<&R> {
        self.renderer.as_ref()
    }

    pub fn renderer_mut(&mut self) -> Option<&mut R> {
        self.renderer.as_mut()
    }

    pub fn viewport(&self) -> Option<ViewportState> {
        self.tracker.current()
    }

    pub fn clock(&self) -> &FrameClock<F> {
        &self.clock
    }

    pub fn frames_mut(&mut self) -> &mut F {
        self.clock.source_mut()
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }
}

impl<R: Renderer, F: FrameSource, H: HostSurface> Drop for Backdrop<R, F, H> {
    fn drop(&mut self) {
        self.teardown();
    }
}

// clock.rs - Frame clock
//
// Wraps a FrameSource (requestAnimationFrame, or a manual pump) and enforces:
//   - at most one outstanding frame request
//   - after stop() returns, no frame is ever delivered, even if the host
//     still fires a callback it had already queued

use crate::error::BackdropResult;

/// Opaque id for an outstanding frame request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameRequest(pub i32);

/// One delivered frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    /// 0-based count of frames delivered by this clock.
    pub index: u64,
    /// Host timestamp in milliseconds.
    pub time_ms: f64,
}

pub trait FrameSource {
    fn request(&mut self) -> BackdropResult<FrameRequest>;
    fn cancel(&mut self, request: FrameRequest);
}

pub struct FrameClock<F> {
    source: F,
    pending: Option<FrameRequest>,
    running: bool,
    delivered: u64,
}

impl<F: FrameSource> FrameClock<F> {
    pub fn new(source: F) -> Self {
        Self { source, pending: None, running: false, delivered: 0 }
    }

    pub fn start(&mut self) -> BackdropResult<()> {
        if self.running {
            return Ok(());
        }
        self.running = true;
        self.rearm()
    }

    /// Host callback arrived. Returns the frame to run, or `None` if the
    /// clock is stopped or nothing was requested.
    pub fn fire(&mut self, time_ms: f64) -> Option<Frame> {
        if !self.running {
            return None;
        }
        self.pending.take()?;
        let frame = Frame { index: self.delivered, time_ms };
        self.delivered += 1;
        Some(frame)
    }

    /// Request the next frame if running and none is outstanding.
    pub fn rearm(&mut self) -> BackdropResult<()> {
        if self.running && self.pending.is_none() {
            self.pending = Some(self.source.request()?);
        }
        Ok(())
    }

    /// Idempotent.
    pub fn stop(&mut self) {
        self.running = false;
        if let Some(request) = self.pending.take() {
            self.source.cancel(request);
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn delivered(&self) -> u64 {
        self.delivered
    }

    pub fn source(&self) -> &F {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut F {
        &mut self.source
    }
}

/// Frame source driven by hand: headless previews and tests.
#[derive(Debug, Default)]
pub struct ManualFrames {
    next_id: i32,
    pending: Option<FrameRequest>,
    requested: u64,
    cancelled: u64,
}

impl ManualFrames {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending(&self) -> Option<FrameRequest> {
        self.pending
    }

    pub fn requested(&self) -> u64 {
        self.requested
    }

    pub fn cancelled(&self) -> u64 {
        self.cancelled
    }
}

impl FrameSource for ManualFrames {
    fn request(&mut self) -> BackdropResult<FrameRequest> {
        self.next_id = self.next_id.wrapping_add(1);
        let request = FrameRequest(self.next_id);
        self.pending = Some(request);
        self.requested += 1;
        Ok(request)
    }

    fn cancel(&mut self, request: FrameRequest) {
        if self.pending == Some(request) {
            self.pending = None;
            self.cancelled += 1;
        }
    }
}

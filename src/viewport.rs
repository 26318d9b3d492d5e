// viewport.rs - Host surface size tracking
//
// The tracker sits between raw size observations and the renderer: only a
// real, non-zero change produces a new ViewportState.

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportState {
    pub width: u32,
    pub height: u32,
    pub center_x: f32,
    pub center_y: f32,
    pub aspect: f32,
}

impl ViewportState {
    /// Smallest usable viewport, used when the host has no size yet.
    pub const MINIMAL: ViewportState = ViewportState {
        width: 1,
        height: 1,
        center_x: 0.5,
        center_y: 0.5,
        aspect: 1.0,
    };

    /// `None` if either side is zero.
    pub fn new(width: u32, height: u32) -> Option<Self> {
        if width == 0 || height == 0 {
            return None;
        }
        Some(Self {
            width,
            height,
            center_x: width as f32 * 0.5,
            center_y: height as f32 * 0.5,
            aspect: width as f32 / height as f32,
        })
    }

    #[inline]
    pub fn longest_side(&self) -> f32 {
        self.width.max(self.height) as f32
    }
}

/// Result of feeding one size observation to the tracker.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Observation {
    Changed(ViewportState),
    Unchanged,
    /// Zero-area observation (hidden or collapsed host); ignored.
    Degenerate,
}

#[derive(Debug, Default)]
pub struct ViewportTracker {
    current: Option<ViewportState>,
    degenerate: u64,
}

impl ViewportTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe(&mut self, width: u32, height: u32) -> Observation {
        let Some(next) = ViewportState::new(width, height) else {
            self.degenerate += 1;
            log::trace!("ignoring degenerate viewport {width}x{height}");
            return Observation::Degenerate;
        };
        if self.current == Some(next) {
            return Observation::Unchanged;
        }
        self.current = Some(next);
        Observation::Changed(next)
    }

    /// Last valid state, if any observation was ever non-degenerate.
    pub fn current(&self) -> Option<ViewportState> {
        self.current
    }

    pub fn degenerate_count(&self) -> u64 {
        self.degenerate
    }
}

// Shared journaling doubles: every side effect the lifecycle cares about is
// appended to one journal so tests can assert on ordering across parts.

#![allow(dead_code)]

use backdrop_engine::color::{Color, Hsla};
use backdrop_engine::render::{
    Camera, Canvas2d, Fog, LayerDraw, LayerHandle, LayerStyle, PointBackend,
};
use backdrop_engine::{
    AcquireBackend, BackdropError, BackdropResult, FrameRequest, FrameSource, HostSurface,
    ViewportState,
};
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Request(i32),
    Cancel(i32),
    Acquire,
    Observe,
    Unobserve,
    Render,
    Release(u32),
    Detach,
}

#[derive(Clone, Default)]
pub struct Journal(Rc<RefCell<Vec<Event>>>);

impl Journal {
    pub fn push(&self, e: Event) {
        self.0.borrow_mut().push(e);
    }

    pub fn events(&self) -> Vec<Event> {
        self.0.borrow().clone()
    }

    pub fn position(&self, pred: impl Fn(&Event) -> bool) -> Option<usize> {
        self.0.borrow().iter().position(pred)
    }

    pub fn count(&self, pred: impl Fn(&Event) -> bool) -> usize {
        self.0.borrow().iter().filter(|e| pred(e)).count()
    }
}

pub struct JournalFrames {
    journal: Journal,
    next: i32,
}

impl JournalFrames {
    pub fn new(journal: &Journal) -> Self {
        Self { journal: journal.clone(), next: 1 }
    }
}

impl FrameSource for JournalFrames {
    fn request(&mut self) -> BackdropResult<FrameRequest> {
        let id = self.next;
        self.next += 1;
        self.journal.push(Event::Request(id));
        Ok(FrameRequest(id))
    }

    fn cancel(&mut self, request: FrameRequest) {
        self.journal.push(Event::Cancel(request.0));
    }
}

pub struct JournalHost {
    journal: Journal,
    pub size: (u32, u32),
    pub fail_acquire: bool,
}

impl JournalHost {
    pub fn new(journal: &Journal, width: u32, height: u32) -> Self {
        Self { journal: journal.clone(), size: (width, height), fail_acquire: false }
    }

    fn acquire_check(&self) -> BackdropResult<()> {
        if self.fail_acquire {
            return Err(BackdropError::ResourceAcquisition("context lost".into()));
        }
        self.journal.push(Event::Acquire);
        Ok(())
    }
}

impl HostSurface for JournalHost {
    fn content_size(&self) -> (u32, u32) {
        self.size
    }

    fn observe(&mut self) -> BackdropResult<()> {
        self.journal.push(Event::Observe);
        Ok(())
    }

    fn unobserve(&mut self) {
        self.journal.push(Event::Unobserve);
    }
}

impl AcquireBackend<JournalCanvas> for JournalHost {
    fn acquire(&mut self) -> BackdropResult<JournalCanvas> {
        self.acquire_check()?;
        Ok(JournalCanvas { journal: self.journal.clone(), discs: 0, size: (0, 0) })
    }
}

impl AcquireBackend<JournalPoints> for JournalHost {
    fn acquire(&mut self) -> BackdropResult<JournalPoints> {
        self.acquire_check()?;
        Ok(JournalPoints { journal: self.journal.clone(), next: 0, uploads: 0 })
    }
}

pub struct JournalCanvas {
    journal: Journal,
    pub discs: u64,
    pub size: (u32, u32),
}

impl Canvas2d for JournalCanvas {
    fn set_size(&mut self, width: u32, height: u32) {
        self.size = (width, height);
    }

    fn clear(&mut self) {
        self.journal.push(Event::Render);
    }

    fn fill(&mut self, _color: Color) {}

    fn glow(&mut self, _x: f32, _y: f32, _radius: f32, _color: Hsla) {}

    fn disc(&mut self, _x: f32, _y: f32, _radius: f32, _color: Hsla) {
        self.discs += 1;
    }

    fn detach(&mut self) {
        self.journal.push(Event::Detach);
    }
}

pub struct JournalPoints {
    journal: Journal,
    next: u32,
    pub uploads: u64,
}

impl PointBackend for JournalPoints {
    fn set_viewport(&mut self, _viewport: &ViewportState) {}

    fn create_layer(
        &mut self,
        _positions: &[f32],
        _colors: &[f32],
        _style: &LayerStyle,
    ) -> BackdropResult<LayerHandle> {
        self.next += 1;
        Ok(LayerHandle(self.next - 1))
    }

    fn upload_positions(&mut self, _layer: LayerHandle, _positions: &[f32]) {
        self.uploads += 1;
    }

    fn render(&mut self, _camera: &Camera, _fog: Option<&Fog>, _layers: &[LayerDraw]) {
        self.journal.push(Event::Render);
    }

    fn release_layer(&mut self, layer: LayerHandle) {
        self.journal.push(Event::Release(layer.0));
    }

    fn detach(&mut self) {
        self.journal.push(Event::Detach);
    }
}

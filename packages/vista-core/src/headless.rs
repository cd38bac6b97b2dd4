//! Window-less backend that records draw calls and replays scripted input.
//! Used by tests and by the `--headless` demo mode.

use crate::config::WindowConfig;
use crate::error::RenderError;
use crate::events::Event;
use crate::geometry::Vec2;
use crate::render::{EventSource, Renderer};
use crate::widgets::Image;
use std::collections::VecDeque;

#[derive(Debug, Clone, PartialEq)]
pub struct Blit {
    pub path: String,
    pub position: Vec2,
    pub size: Vec2,
    pub rotation: f32,
}

#[derive(Debug, Default)]
pub struct RecordingRenderer {
    /// Blits of the frame currently being built.
    pub pending: Vec<Blit>,
    /// Blits of every presented frame, oldest first.
    pub frames: Vec<Vec<Blit>>,
    pub open: bool,
    pub closed: bool,
    screen_size: Vec2,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frames_presented(&self) -> usize {
        self.frames.len()
    }

    pub fn last_frame(&self) -> Option<&[Blit]> {
        self.frames.last().map(Vec::as_slice)
    }
}

impl Renderer for RecordingRenderer {
    fn open_window(&mut self, config: &WindowConfig) -> Result<(), RenderError> {
        self.screen_size = config.size();
        self.open = true;
        self.closed = false;
        Ok(())
    }

    fn blit(&mut self, image: &Image, position: Vec2) {
        self.pending.push(Blit {
            path: image.path().to_string(),
            position,
            size: image.size(),
            rotation: image.rotation(),
        });
    }

    fn present(&mut self) -> Result<(), RenderError> {
        if !self.open {
            return Err(RenderError::WindowClosed);
        }
        self.frames.push(std::mem::take(&mut self.pending));
        Ok(())
    }

    fn screen_size(&self) -> Vec2 {
        self.screen_size
    }

    fn close_window(&mut self) {
        self.open = false;
        self.closed = true;
    }
}

/// Hands out one queued batch per poll; empty batches once the script runs out.
#[derive(Debug, Default)]
pub struct ScriptedEvents {
    batches: VecDeque<Vec<Event>>,
}

impl ScriptedEvents {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_batch(&mut self, batch: impl IntoIterator<Item = Event>) {
        self.batches.push_back(batch.into_iter().collect());
    }

    pub fn remaining(&self) -> usize {
        self.batches.len()
    }
}

impl EventSource for ScriptedEvents {
    fn poll_events(&mut self) -> Vec<Event> {
        self.batches.pop_front().unwrap_or_default()
    }
}

#[derive(Debug, Default)]
pub struct HeadlessPlatform {
    pub renderer: RecordingRenderer,
    pub events: ScriptedEvents,
}

impl HeadlessPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_batch(mut self, batch: impl IntoIterator<Item = Event>) -> Self {
        self.events.push_batch(batch);
        self
    }
}

impl Renderer for HeadlessPlatform {
    fn open_window(&mut self, config: &WindowConfig) -> Result<(), RenderError> {
        self.renderer.open_window(config)
    }

    fn blit(&mut self, image: &Image, position: Vec2) {
        self.renderer.blit(image, position);
    }

    fn present(&mut self) -> Result<(), RenderError> {
        self.renderer.present()
    }

    fn screen_size(&self) -> Vec2 {
        self.renderer.screen_size()
    }

    fn close_window(&mut self) {
        self.renderer.close_window();
    }
}

impl EventSource for HeadlessPlatform {
    fn poll_events(&mut self) -> Vec<Event> {
        self.events.poll_events()
    }
}

//! Collaborator interfaces implemented by windowing backends.

use crate::config::WindowConfig;
use crate::error::RenderError;
use crate::events::Event;
use crate::geometry::Vec2;
use crate::widgets::Image;

pub trait Renderer {
    fn open_window(&mut self, config: &WindowConfig) -> Result<(), RenderError>;

    /// Draws `image` with its top-left corner at `position`. Failures to load
    /// the sprite are the backend's to report; drawing continues.
    fn blit(&mut self, image: &Image, position: Vec2);

    /// Shows everything blitted since the last call, then clears the frame.
    fn present(&mut self) -> Result<(), RenderError>;

    fn screen_size(&self) -> Vec2;

    fn close_window(&mut self);
}

pub trait EventSource {
    /// Events gathered since the previous poll, in the order they occurred.
    fn poll_events(&mut self) -> Vec<Event>;
}

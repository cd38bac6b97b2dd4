use crate::commands::Commands;
use crate::events::{Dispatcher, Event, EventKind, ListenerAction, ListenerId, ListenerTarget};
use crate::geometry::Vec2;
use crate::render::Renderer;
use crate::tree::ElementId;
use smallvec::SmallVec;

/// Callback bound to a button. Arguments are captured by the closure when it
/// is created; the triggering event is never passed in.
pub type Callback = Box<dyn FnMut(&mut Commands)>;

/// Descriptor for an externally-owned sprite.
///
/// The renderer decodes and caches pixel data keyed by `path`; the element
/// tree only tracks the logical size and rotation the sprite is drawn with.
#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    path: String,
    size: Vec2,
    rotation: f32,
}

impl Image {
    pub fn new(path: impl Into<String>, size: Vec2) -> Self {
        Self {
            path: path.into(),
            size,
            rotation: 0.0,
        }
    }

    pub fn with_rotation(mut self, degrees: f32) -> Self {
        self.rotate_to(degrees);
        self
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn size(&self) -> Vec2 {
        self.size
    }

    /// Rotation in degrees, always within `[0, 360)`.
    pub fn rotation(&self) -> f32 {
        self.rotation
    }

    pub fn scale_to(&mut self, size: Vec2) {
        self.size = size;
    }

    /// Component-wise scale of the current size.
    pub fn scale_by(&mut self, scale: Vec2) {
        self.size *= scale;
    }

    pub fn rotate_to(&mut self, degrees: f32) {
        let wrapped = degrees.rem_euclid(360.0);
        // rem_euclid rounds tiny negative inputs up to exactly 360.
        self.rotation = if wrapped >= 360.0 { 0.0 } else { wrapped };
    }

    pub fn rotate_by(&mut self, degrees: f32) {
        self.rotate_to(self.rotation + degrees);
    }
}

/// Invisible hit area that fires its callbacks on pointer press/release.
#[derive(Default)]
pub struct Button {
    on_down: Option<Callback>,
    on_up: Option<Callback>,
}

impl Button {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_down(mut self, f: impl FnMut(&mut Commands) + 'static) -> Self {
        self.on_down = Some(Box::new(f));
        self
    }

    pub fn on_up(mut self, f: impl FnMut(&mut Commands) + 'static) -> Self {
        self.on_up = Some(Box::new(f));
        self
    }

    pub(crate) fn handle_pointer(&mut self, kind: EventKind, commands: &mut Commands) {
        let callback = match kind {
            EventKind::PointerDown => self.on_down.as_mut(),
            EventKind::PointerUp => self.on_up.as_mut(),
            _ => None,
        };
        if let Some(callback) = callback {
            callback(commands);
        }
    }
}

/// A button drawn as a sprite; its hit area is the sprite's size.
pub struct ImageButton {
    pub button: Button,
    pub image: Image,
}

impl ImageButton {
    pub fn new(image: Image) -> Self {
        Self {
            button: Button::new(),
            image,
        }
    }

    pub fn on_down(mut self, f: impl FnMut(&mut Commands) + 'static) -> Self {
        self.button = self.button.on_down(f);
        self
    }

    pub fn on_up(mut self, f: impl FnMut(&mut Commands) + 'static) -> Self {
        self.button = self.button.on_up(f);
        self
    }
}

pub struct DrawContext<'a> {
    pub renderer: &'a mut dyn Renderer,
    /// Absolute position of the element being drawn.
    pub position: Vec2,
    pub size: Vec2,
}

/// Handed to [`Widget::on_load`] so a widget can subscribe to events.
///
/// Every subscription is remembered by the tree and removed again when the
/// element unloads.
pub struct LoadContext<'a> {
    pub(crate) dispatcher: &'a mut Dispatcher,
    pub(crate) target: ListenerTarget,
    pub(crate) subscriptions: &'a mut SmallVec<[ListenerId; 2]>,
}

impl LoadContext<'_> {
    pub fn element(&self) -> ElementId {
        self.target.element
    }

    pub fn listen(&mut self, kind: EventKind) -> ListenerId {
        let id = self
            .dispatcher
            .register(kind, ListenerAction::Element(self.target));
        self.subscriptions.push(id);
        id
    }
}

/// User-defined leaf element.
///
/// Only `draw` is required. `draw` is never called while the element is
/// hidden; lifecycle hooks run regardless of visibility.
pub trait Widget: 'static {
    fn draw(&mut self, ctx: &mut DrawContext<'_>);

    /// Overrides the element's own size when `Some`.
    fn size(&self) -> Option<Vec2> {
        None
    }

    fn on_load(&mut self, _ctx: &mut LoadContext<'_>) {}

    fn on_unload(&mut self) {}

    fn on_added_to_container(&mut self, _container: ElementId) {}

    /// Called for every event kind subscribed in `on_load`. `hit` tells
    /// whether the event carried a pointer position inside the element.
    fn on_event(&mut self, _event: &Event, _hit: bool, _commands: &mut Commands) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rotation_wraps() {
        let mut image = Image::new("sprites/a.png", Vec2::new(10.0, 10.0));
        image.rotate_by(350.0);
        image.rotate_by(20.0);
        assert!((image.rotation() - 10.0).abs() < 1e-4);

        image.rotate_by(-30.0);
        assert!((image.rotation() - 340.0).abs() < 1e-4);
    }

    #[test]
    fn test_rotation_stays_below_full_turn() {
        let mut image = Image::new("sprites/a.png", Vec2::new(10.0, 10.0));
        image.rotate_by(-1e-6);
        assert!(image.rotation() < 360.0);
        assert_eq!(image.rotation(), 0.0);

        image.rotate_to(-360.0);
        assert_eq!(image.rotation(), 0.0);
    }

    #[test]
    fn test_scale_by_is_component_wise() {
        let mut image = Image::new("sprites/a.png", Vec2::new(10.0, 20.0));
        image.scale_by(Vec2::new(2.0, 0.5));
        assert_eq!(image.size(), Vec2::new(20.0, 10.0));

        image.scale_to(Vec2::new(1.0, 1.0));
        assert_eq!(image.size(), Vec2::new(1.0, 1.0));
    }
}

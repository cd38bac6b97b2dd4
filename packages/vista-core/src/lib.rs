pub mod commands;
pub mod config;
pub mod element;
pub mod error;
pub mod events;
pub mod geometry;
pub mod headless;
pub mod render;
pub mod runtime;
pub mod scene;
pub mod tree;
pub mod widgets;

pub use commands::{Command, Commands};
pub use config::{RuntimeConfig, WindowConfig};
pub use element::{Alignment, Children, Container, ElementKind, Node, Placement};
pub use error::{ConfigError, RenderError, RuntimeError, SceneError, TreeError};
pub use events::{Dispatcher, ElementTarget, Event, EventKind, ListenerAction, ListenerId, ListenerTarget};
pub use geometry::{Rect, Vec2};
pub use render::{EventSource, Renderer};
pub use runtime::{FrameClock, Profiling, Runtime};
pub use scene::{FrameInfo, Scene, SceneManager};
pub use tree::{ElementId, GuiTree, TreeId};
pub use widgets::{Button, DrawContext, Image, ImageButton, LoadContext, Widget};

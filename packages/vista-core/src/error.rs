use crate::tree::ElementId;
use thiserror::Error;

/// Contract violations on the element tree.
///
/// None of these are expected during normal operation; they flag a caller
/// that broke the attach/load ordering rules of the tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    #[error("element {0:?} does not exist in this tree")]
    UnknownElement(ElementId),
    #[error("element {child:?} already added to container {parent:?}")]
    AlreadyParented { child: ElementId, parent: ElementId },
    #[error("element {0:?} is not a container")]
    NotAContainer(ElementId),
    #[error("element {child:?} is not a child of container {container:?}")]
    NotAChild {
        child: ElementId,
        container: ElementId,
    },
    #[error("container {container:?} expects {expected} placement")]
    PlacementMismatch {
        container: ElementId,
        expected: &'static str,
    },
    #[error("the root container cannot be added to another container")]
    RootCannotBeChild,
    #[error("adding {child:?} to {container:?} would create a cycle")]
    WouldCycle {
        child: ElementId,
        container: ElementId,
    },
    #[error("element {0:?} is already loaded")]
    AlreadyLoaded(ElementId),
    #[error("element {0:?} is not loaded")]
    NotLoaded(ElementId),
    #[error("cannot attach {child:?} to {container:?}: load states differ (use attach_live on a loaded tree)")]
    LoadStateMismatch {
        child: ElementId,
        container: ElementId,
    },
    #[error("root container {0:?} drawn before being loaded")]
    RootNotLoaded(ElementId),
    #[error("element {element:?} is not a {expected}")]
    WrongKind {
        element: ElementId,
        expected: &'static str,
    },
    #[error("tree integrity violated at {0:?}")]
    Integrity(ElementId),
}

#[derive(Debug, Error)]
pub enum SceneError {
    #[error("no scene has been made current yet")]
    NoCurrentScene,
    #[error("no pre-made scene registered under '{0}'")]
    UnknownScene(String),
    #[error(transparent)]
    Tree(#[from] TreeError),
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("window is not open")]
    WindowClosed,
    #[error("failed to load image '{path}': {reason}")]
    Image { path: String, reason: String },
    #[error("render backend error: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config: {0}")]
    Json(#[from] serde_json::Error),
    #[error("window size must be non-zero, got {width}x{height}")]
    InvalidWindowSize { width: u32, height: u32 },
}

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("runtime has not been started")]
    NotStarted,
    #[error(transparent)]
    Scene(#[from] SceneError),
    #[error(transparent)]
    Tree(#[from] TreeError),
    #[error(transparent)]
    Render(#[from] RenderError),
}

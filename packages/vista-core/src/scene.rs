use crate::error::{SceneError, TreeError};
use crate::events::Dispatcher;
use crate::geometry::Vec2;
use crate::render::Renderer;
use crate::tree::GuiTree;
use rustc_hash::FxHashMap;

/// Per-frame data handed to [`Scene::on_frame`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameInfo {
    /// Seconds between the two most recently presented frames.
    pub delta: f32,
    pub frame: u64,
    pub screen_size: Vec2,
}

/// Top-level unit of the application: owns one GUI tree and nothing carries
/// over from one scene to the next.
///
/// Scenes that implement `Default` are "pre-made" and can be switched to by
/// type alone.
pub trait Scene: 'static {
    fn gui(&self) -> &GuiTree;

    fn gui_mut(&mut self) -> &mut GuiTree;

    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Runs before the tree is drawn each frame.
    fn on_frame(&mut self, _frame: &FrameInfo) {}

    fn load(&mut self, dispatcher: &mut Dispatcher) -> Result<(), TreeError> {
        let root = self.gui().root();
        self.gui_mut().load(root, dispatcher)
    }

    fn unload(&mut self, dispatcher: &mut Dispatcher) -> Result<(), TreeError> {
        let root = self.gui().root();
        self.gui_mut().unload(root, dispatcher)
    }

    fn draw(&mut self, renderer: &mut dyn Renderer) -> Result<(), TreeError> {
        let root = self.gui().root();
        self.gui_mut().draw(root, renderer)
    }

    fn is_loaded(&self) -> bool {
        let gui = self.gui();
        gui.is_loaded(gui.root()).unwrap_or(false)
    }
}

pub type SceneFactory = fn() -> Box<dyn Scene>;

/// Holds the single current scene and the registry of pre-made scenes.
#[derive(Default)]
pub struct SceneManager {
    current: Option<Box<dyn Scene>>,
    registry: FxHashMap<String, SceneFactory>,
    switches: u64,
}

impl SceneManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<T: Scene + Default>(&mut self, name: &str) {
        self.register_factory(name, || Box::new(T::default()) as Box<dyn Scene>);
    }

    pub fn register_factory(&mut self, name: &str, factory: SceneFactory) {
        self.registry.insert(name.to_string(), factory);
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.registry.contains_key(name)
    }

    /// Unloads the current scene (if any and still loaded), publishes `scene`
    /// as current and loads it. The previous scene is dropped.
    ///
    /// If the new scene fails to load, the previous scene stays current and
    /// is loaded again when it was loaded before the switch.
    pub fn switch(&mut self, mut scene: Box<dyn Scene>, dispatcher: &mut Dispatcher) -> Result<(), SceneError> {
        let mut was_loaded = false;
        if let Some(previous) = self.current.as_mut() {
            was_loaded = previous.is_loaded();
            if was_loaded {
                previous.unload(dispatcher)?;
            }
            tracing::info!("Unloaded scene {}", previous.name());
        }

        if let Err(err) = scene.load(dispatcher) {
            tracing::warn!("Failed to load scene {}: {}", scene.name(), err);
            self.restore_previous(was_loaded, dispatcher);
            return Err(err.into());
        }
        tracing::info!("Switched to scene {}", scene.name());
        self.current = Some(scene);
        self.switches += 1;
        Ok(())
    }

    fn restore_previous(&mut self, was_loaded: bool, dispatcher: &mut Dispatcher) {
        let Some(previous) = self.current.as_mut() else {
            return;
        };
        if !was_loaded {
            return;
        }
        match previous.load(dispatcher) {
            Ok(()) => tracing::info!("Restored scene {}", previous.name()),
            Err(err) => {
                tracing::warn!("Failed to restore scene {}: {}", previous.name(), err);
                self.current = None;
            }
        }
    }

    pub fn switch_by_type<T: Scene + Default>(&mut self, dispatcher: &mut Dispatcher) -> Result<(), SceneError> {
        self.switch(Box::new(T::default()), dispatcher)
    }

    pub fn switch_to_registered(&mut self, name: &str, dispatcher: &mut Dispatcher) -> Result<(), SceneError> {
        let factory = self
            .registry
            .get(name)
            .copied()
            .ok_or_else(|| SceneError::UnknownScene(name.to_string()))?;
        self.switch(factory(), dispatcher)
    }

    pub fn has_current(&self) -> bool {
        self.current.is_some()
    }

    pub fn current(&self) -> Result<&dyn Scene, SceneError> {
        self.current.as_deref().ok_or(SceneError::NoCurrentScene)
    }

    pub fn current_mut(&mut self) -> Result<&mut dyn Scene, SceneError> {
        match self.current.as_deref_mut() {
            Some(scene) => Ok(scene),
            None => Err(SceneError::NoCurrentScene),
        }
    }

    pub(crate) fn current_opt_mut(&mut self) -> Option<&mut dyn Scene> {
        match self.current.as_deref_mut() {
            Some(scene) => Some(scene),
            None => None,
        }
    }

    pub fn unload_current(&mut self, dispatcher: &mut Dispatcher) -> Result<(), SceneError> {
        let scene = self.current_mut()?;
        if scene.is_loaded() {
            scene.unload(dispatcher)?;
            tracing::info!("Unloaded scene {}", scene.name());
        }
        Ok(())
    }

    pub fn switch_count(&self) -> u64 {
        self.switches
    }
}

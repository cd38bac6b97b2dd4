use crate::error::RuntimeError;
use crate::events::ListenerId;
use crate::runtime::Runtime;
use crate::scene::Scene;
use std::collections::VecDeque;

pub type RuntimeFn = Box<dyn FnOnce(&mut Runtime) -> Result<(), RuntimeError>>;

/// Deferred request produced by a callback.
pub enum Command {
    SwitchScene(Box<dyn Scene>),
    SwitchSceneWith(Box<dyn FnOnce() -> Box<dyn Scene>>),
    SwitchToRegistered(String),
    StopGame,
    Deregister(ListenerId),
    Run(RuntimeFn),
}

impl std::fmt::Debug for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Command::SwitchScene(scene) => write!(f, "SwitchScene({})", scene.name()),
            Command::SwitchSceneWith(_) => f.write_str("SwitchSceneWith(..)"),
            Command::SwitchToRegistered(name) => write!(f, "SwitchToRegistered({name})"),
            Command::StopGame => f.write_str("StopGame"),
            Command::Deregister(id) => write!(f, "Deregister({id:?})"),
            Command::Run(_) => f.write_str("Run(..)"),
        }
    }
}

/// FIFO of commands, drained by the runtime after each dispatched event.
#[derive(Default)]
pub struct Commands {
    queue: VecDeque<Command>,
}

impl Commands {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, command: Command) {
        self.queue.push_back(command);
    }

    pub fn pop(&mut self) -> Option<Command> {
        self.queue.pop_front()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn switch_scene(&mut self, scene: impl Scene) {
        self.push(Command::SwitchScene(Box::new(scene)));
    }

    /// Switches to a pre-made scene, built from its `Default` impl when the
    /// command is applied.
    pub fn switch_scene_by_type<T: Scene + Default>(&mut self) {
        self.push(Command::SwitchSceneWith(Box::new(|| {
            Box::new(T::default()) as Box<dyn Scene>
        })));
    }

    pub fn switch_to(&mut self, name: impl Into<String>) {
        self.push(Command::SwitchToRegistered(name.into()));
    }

    pub fn stop_game(&mut self) {
        self.push(Command::StopGame);
    }

    pub fn deregister(&mut self, id: ListenerId) {
        self.push(Command::Deregister(id));
    }

    pub fn run(&mut self, f: impl FnOnce(&mut Runtime) -> Result<(), RuntimeError> + 'static) {
        self.push(Command::Run(Box::new(f)));
    }
}

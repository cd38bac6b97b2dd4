use crate::commands::Commands;
use crate::geometry::Vec2;
use crate::tree::{ElementId, TreeId};
use rustc_hash::FxHashMap;
use slotmap::{SlotMap, new_key_type};
use smallvec::SmallVec;

new_key_type! {
    pub struct ListenerId;
}

/// A discrete input event produced by an [`EventSource`](crate::render::EventSource).
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    CloseRequested,
    PointerDown { position: Vec2 },
    PointerUp { position: Vec2 },
    PointerMoved { position: Vec2 },
    KeyDown { code: u32 },
    KeyUp { code: u32 },
    Resized { size: Vec2 },
    Custom { code: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    CloseRequested,
    PointerDown,
    PointerUp,
    PointerMoved,
    KeyDown,
    KeyUp,
    Resized,
    Custom(u32),
}

impl Event {
    pub fn kind(&self) -> EventKind {
        match self {
            Event::CloseRequested => EventKind::CloseRequested,
            Event::PointerDown { .. } => EventKind::PointerDown,
            Event::PointerUp { .. } => EventKind::PointerUp,
            Event::PointerMoved { .. } => EventKind::PointerMoved,
            Event::KeyDown { .. } => EventKind::KeyDown,
            Event::KeyUp { .. } => EventKind::KeyUp,
            Event::Resized { .. } => EventKind::Resized,
            Event::Custom { code } => EventKind::Custom(*code),
        }
    }

    pub fn position(&self) -> Option<Vec2> {
        match self {
            Event::PointerDown { position }
            | Event::PointerUp { position }
            | Event::PointerMoved { position } => Some(*position),
            _ => None,
        }
    }
}

pub type EventCallback = Box<dyn FnMut(&Event, &mut Commands)>;

/// An element listening on behalf of itself. Resolved against whichever tree
/// is current when the event arrives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerTarget {
    pub tree: TreeId,
    pub element: ElementId,
}

pub enum ListenerAction {
    Callback(EventCallback),
    Element(ListenerTarget),
}

pub struct Listener {
    pub kind: EventKind,
    pub action: ListenerAction,
}

/// Receives events addressed to elements. Implemented by
/// [`GuiTree`](crate::tree::GuiTree).
pub trait ElementTarget {
    /// Returns `false` when the target could not be resolved and the event
    /// was dropped.
    fn notify(&mut self, target: ListenerTarget, event: &Event, commands: &mut Commands) -> bool;
}

/// Stand-in target used while no scene is current; element listeners are skipped.
pub struct NoTarget;

impl ElementTarget for NoTarget {
    fn notify(&mut self, target: ListenerTarget, _event: &Event, _commands: &mut Commands) -> bool {
        tracing::warn!("No current scene, dropping event for element {:?}", target.element);
        false
    }
}

/// Registry of event listeners keyed by event kind.
#[derive(Default)]
pub struct Dispatcher {
    listeners: SlotMap<ListenerId, Listener>,
    by_kind: FxHashMap<EventKind, SmallVec<[ListenerId; 4]>>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a listener to the list for `kind`.
    pub fn register(&mut self, kind: EventKind, action: ListenerAction) -> ListenerId {
        let id = self.listeners.insert(Listener { kind, action });
        self.by_kind.entry(kind).or_default().push(id);
        id
    }

    pub fn register_callback(
        &mut self,
        kind: EventKind,
        f: impl FnMut(&Event, &mut Commands) + 'static,
    ) -> ListenerId {
        self.register(kind, ListenerAction::Callback(Box::new(f)))
    }

    /// Removing an unknown or already-removed listener is a no-op.
    pub fn deregister(&mut self, id: ListenerId) -> bool {
        let Some(listener) = self.listeners.remove(id) else {
            return false;
        };
        if let Some(ids) = self.by_kind.get_mut(&listener.kind) {
            ids.retain(|other| *other != id);
            if ids.is_empty() {
                self.by_kind.remove(&listener.kind);
            }
        }
        true
    }

    pub fn contains(&self, id: ListenerId) -> bool {
        self.listeners.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Listener ids for `kind`, in registration order.
    pub fn listeners_for(&self, kind: EventKind) -> SmallVec<[ListenerId; 4]> {
        self.by_kind.get(&kind).cloned().unwrap_or_default()
    }

    /// Invokes every listener registered for the event's kind, in
    /// registration order. Returns the number of listeners that ran; element
    /// listeners whose tree or element is gone are not counted.
    ///
    /// The listener list is snapshotted before iterating. Listeners never hold
    /// the dispatcher; registrations or removals they request through
    /// [`Commands`] apply once this event has reached every snapshotted
    /// listener.
    pub fn dispatch(
        &mut self,
        event: &Event,
        targets: &mut dyn ElementTarget,
        commands: &mut Commands,
    ) -> usize {
        let snapshot = self.listeners_for(event.kind());
        let mut invoked = 0;

        for id in snapshot {
            let Some(listener) = self.listeners.get_mut(id) else {
                continue;
            };
            let ran = match &mut listener.action {
                ListenerAction::Callback(callback) => {
                    callback(event, commands);
                    true
                }
                ListenerAction::Element(target) => targets.notify(*target, event, commands),
            };
            if ran {
                invoked += 1;
            }
        }

        tracing::debug!("Dispatched {:?} to {} listener(s)", event.kind(), invoked);
        invoked
    }

    /// Dispatches a batch in the order the source produced it.
    pub fn broadcast(
        &mut self,
        events: impl IntoIterator<Item = Event>,
        targets: &mut dyn ElementTarget,
        commands: &mut Commands,
    ) -> usize {
        events
            .into_iter()
            .map(|event| self.dispatch(&event, targets, commands))
            .sum()
    }
}

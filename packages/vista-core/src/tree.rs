use crate::commands::Commands;
use crate::element::{Alignment, Children, Container, ElementKind, Node, Placement};
use crate::error::TreeError;
use crate::events::{Dispatcher, ElementTarget, Event, EventKind, ListenerTarget};
use crate::geometry::{Rect, Vec2};
use crate::render::Renderer;
use crate::widgets::{Button, DrawContext, Image, LoadContext, Widget};
use slotmap::{SlotMap, new_key_type};
use std::sync::atomic::{AtomicU64, Ordering};

new_key_type! {
    pub struct ElementId;
}

static NEXT_TREE_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a [`GuiTree`]. Element listeners carry it so an
/// element id is never resolved against the wrong tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TreeId(u64);

impl TreeId {
    fn next() -> Self {
        Self(NEXT_TREE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Arena of GUI elements rooted at a single root container.
///
/// The tree owns every element inserted into it. Parent links are plain ids
/// used for position queries; ownership never flows through them.
pub struct GuiTree {
    id: TreeId,
    nodes: SlotMap<ElementId, Node>,
    root: ElementId,
}

impl GuiTree {
    pub fn new(size: Vec2) -> Self {
        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(Node::new(Container::root()).with_size(size));
        Self {
            id: TreeId::next(),
            nodes,
            root,
        }
    }

    pub fn id(&self) -> TreeId {
        self.id
    }

    pub fn root(&self) -> ElementId {
        self.root
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Adds a detached element to the arena.
    pub fn insert(&mut self, node: Node) -> ElementId {
        let id = self.nodes.insert(node);
        tracing::trace!("Inserted detached element {:?}", id);
        id
    }

    pub fn get(&self, id: ElementId) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn get_mut(&mut self, id: ElementId) -> Option<&mut Node> {
        self.nodes.get_mut(id)
    }

    pub fn node(&self, id: ElementId) -> Result<&Node, TreeError> {
        self.nodes.get(id).ok_or(TreeError::UnknownElement(id))
    }

    pub fn node_mut(&mut self, id: ElementId) -> Result<&mut Node, TreeError> {
        self.nodes.get_mut(id).ok_or(TreeError::UnknownElement(id))
    }

    /// Attaches `child` to a plain (or layered, at layer 0) container.
    /// Returns the container id so calls can be chained.
    pub fn add_child(&mut self, container: ElementId, child: ElementId) -> Result<ElementId, TreeError> {
        self.attach(container, child, Placement::Append)
    }

    pub fn add_child_at_layer(
        &mut self,
        container: ElementId,
        child: ElementId,
        layer: i32,
    ) -> Result<ElementId, TreeError> {
        self.attach(container, child, Placement::Layer(layer))
    }

    pub fn add_aligned_child(
        &mut self,
        container: ElementId,
        child: ElementId,
        alignment: Alignment,
    ) -> Result<ElementId, TreeError> {
        self.attach(container, child, Placement::Aligned(alignment))
    }

    pub fn add_to_container(&mut self, child: ElementId, container: ElementId) -> Result<ElementId, TreeError> {
        self.add_child(container, child)
    }

    /// Inserts `node` and attaches it in one step, returning the new child's id.
    pub fn insert_child(
        &mut self,
        container: ElementId,
        node: Node,
        placement: Placement,
    ) -> Result<ElementId, TreeError> {
        let child = self.insert(node);
        if let Err(err) = self.attach(container, child, placement) {
            self.nodes.remove(child);
            return Err(err);
        }
        Ok(child)
    }

    /// Sets the parent link and the container's child entry together. Nothing
    /// is modified when a precondition fails.
    ///
    /// Child and container must agree on being loaded; attaching an unloaded
    /// element under a loaded container goes through [`GuiTree::attach_live`].
    pub fn attach(
        &mut self,
        container: ElementId,
        child: ElementId,
        placement: Placement,
    ) -> Result<ElementId, TreeError> {
        self.link(container, child, placement, false)
    }

    /// Like [`GuiTree::attach`], but loads the child's subtree when the
    /// container is already loaded, so the new elements receive events at
    /// once. On a failed load the child is detached again.
    pub fn attach_live(
        &mut self,
        container: ElementId,
        child: ElementId,
        placement: Placement,
        dispatcher: &mut Dispatcher,
    ) -> Result<ElementId, TreeError> {
        self.link(container, child, placement, true)?;
        if self.node(container)?.loaded && !self.node(child)?.loaded {
            if let Err(err) = self.load(child, dispatcher) {
                self.unlink(container, child);
                return Err(err);
            }
        }
        Ok(container)
    }

    fn link(
        &mut self,
        container: ElementId,
        child: ElementId,
        placement: Placement,
        live: bool,
    ) -> Result<ElementId, TreeError> {
        let child_node = self.node(child)?;
        if child_node.container().is_some_and(Container::is_root) {
            return Err(TreeError::RootCannotBeChild);
        }
        if let Some(parent) = child_node.parent {
            return Err(TreeError::AlreadyParented { child, parent });
        }
        let child_loaded = child_node.loaded;
        let container_node = self.node(container)?;
        if container_node.container().is_none() {
            return Err(TreeError::NotAContainer(container));
        }
        let container_loaded = container_node.loaded;
        if (child_loaded && !container_loaded) || (!live && container_loaded && !child_loaded) {
            return Err(TreeError::LoadStateMismatch { child, container });
        }
        if self.ancestors_inclusive(container).any(|id| id == child) {
            return Err(TreeError::WouldCycle { child, container });
        }

        let children = &mut self
            .node_mut(container)?
            .container_mut()
            .ok_or(TreeError::NotAContainer(container))?
            .children;
        if !children.insert(child, placement) {
            return Err(TreeError::PlacementMismatch {
                container,
                expected: children.expected_placement(),
            });
        }

        let child_node = self.node_mut(child)?;
        child_node.parent = Some(container);
        if let ElementKind::Widget(widget) = &mut child_node.kind {
            widget.on_added_to_container(container);
        }
        tracing::trace!("Attached {:?} to {:?} ({:?})", child, container, placement);
        Ok(container)
    }

    fn unlink(&mut self, container: ElementId, child: ElementId) {
        if let Some(container) = self.nodes.get_mut(container).and_then(Node::container_mut) {
            container.children.remove(child);
        }
        if let Some(node) = self.nodes.get_mut(child) {
            node.parent = None;
        }
    }

    fn ancestors_inclusive(&self, id: ElementId) -> impl Iterator<Item = ElementId> + '_ {
        std::iter::successors(Some(id), |current| {
            self.nodes.get(*current).and_then(|node| node.parent)
        })
    }

    /// Children in iteration (and draw) order.
    pub fn children(&self, id: ElementId) -> Result<Vec<ElementId>, TreeError> {
        let container = self
            .node(id)?
            .container()
            .ok_or(TreeError::NotAContainer(id))?;
        Ok(container.children.iter().collect())
    }

    fn child_ids(&self, id: ElementId) -> Vec<ElementId> {
        self.nodes
            .get(id)
            .and_then(Node::container)
            .map(|container| container.children.iter().collect())
            .unwrap_or_default()
    }

    pub fn parent(&self, id: ElementId) -> Result<Option<ElementId>, TreeError> {
        Ok(self.node(id)?.parent)
    }

    /// Offset the container applies to one of its own children. Recomputed
    /// on every call, so it follows later size changes.
    pub fn child_offset(&self, container: ElementId, child: ElementId) -> Result<Vec2, TreeError> {
        let container_node = self.node(container)?;
        let children = &container_node
            .container()
            .ok_or(TreeError::NotAContainer(container))?
            .children;
        if !children.contains(child) {
            return Err(TreeError::NotAChild { child, container });
        }

        match children {
            Children::Aligned(_) => {
                let alignment = children
                    .alignment_of(child)
                    .ok_or(TreeError::NotAChild { child, container })?;
                Ok(alignment.offset(container_node.size(), self.node(child)?.size()))
            }
            Children::List(_) | Children::Layered(_) => Ok(Vec2::ZERO),
        }
    }

    /// Sum of relative positions and container offsets up the parent chain.
    /// A parentless element sits at the origin.
    pub fn absolute_position(&self, id: ElementId) -> Result<Vec2, TreeError> {
        let mut position = Vec2::ZERO;
        let mut current = id;
        while let Some(parent) = self.node(current)?.parent {
            position += self.node(current)?.relative_position + self.child_offset(parent, current)?;
            current = parent;
        }
        Ok(position)
    }

    pub fn bounds(&self, id: ElementId) -> Result<Rect, TreeError> {
        Ok(Rect::new(self.absolute_position(id)?, self.size(id)?))
    }

    pub fn size(&self, id: ElementId) -> Result<Vec2, TreeError> {
        Ok(self.node(id)?.size())
    }

    pub fn set_size(&mut self, id: ElementId, size: Vec2) -> Result<(), TreeError> {
        self.node_mut(id)?.set_size(size);
        Ok(())
    }

    pub fn set_position(&mut self, id: ElementId, position: Vec2) -> Result<(), TreeError> {
        self.node_mut(id)?.relative_position = position;
        Ok(())
    }

    pub fn set_visible(&mut self, id: ElementId, visible: bool) -> Result<(), TreeError> {
        self.node_mut(id)?.visible = visible;
        Ok(())
    }

    pub fn toggle_visible(&mut self, id: ElementId) -> Result<(), TreeError> {
        self.node_mut(id)?.toggle_visible();
        Ok(())
    }

    pub fn is_loaded(&self, id: ElementId) -> Result<bool, TreeError> {
        Ok(self.node(id)?.loaded)
    }

    pub fn image_mut(&mut self, id: ElementId) -> Result<&mut Image, TreeError> {
        match &mut self.node_mut(id)?.kind {
            ElementKind::Image(image) => Ok(image),
            ElementKind::ImageButton(button) => Ok(&mut button.image),
            _ => Err(TreeError::WrongKind {
                element: id,
                expected: "image",
            }),
        }
    }

    pub fn button_mut(&mut self, id: ElementId) -> Result<&mut Button, TreeError> {
        match &mut self.node_mut(id)?.kind {
            ElementKind::Button(button) => Ok(button),
            ElementKind::ImageButton(button) => Ok(&mut button.button),
            _ => Err(TreeError::WrongKind {
                element: id,
                expected: "button",
            }),
        }
    }

    pub fn widget_mut(&mut self, id: ElementId) -> Result<&mut dyn Widget, TreeError> {
        match &mut self.node_mut(id)?.kind {
            ElementKind::Widget(widget) => Ok(widget.as_mut()),
            _ => Err(TreeError::WrongKind {
                element: id,
                expected: "widget",
            }),
        }
    }

    /// Loads `id` and then every descendant, hidden ones included.
    ///
    /// All or nothing: if any element in the subtree is already loaded, the
    /// elements loaded by this call are unloaded again before returning.
    pub fn load(&mut self, id: ElementId, dispatcher: &mut Dispatcher) -> Result<(), TreeError> {
        if self.node(id)?.loaded {
            return Err(TreeError::AlreadyLoaded(id));
        }

        let mut loaded = Vec::new();
        for element in self.descendants(id) {
            if let Err(err) = self.load_node(element, dispatcher) {
                for element in loaded.into_iter().rev() {
                    self.unload_node(element, dispatcher);
                }
                return Err(err);
            }
            loaded.push(element);
        }
        Ok(())
    }

    fn load_node(&mut self, id: ElementId, dispatcher: &mut Dispatcher) -> Result<(), TreeError> {
        let target = ListenerTarget {
            tree: self.id,
            element: id,
        };
        let node = self.node_mut(id)?;
        if node.loaded {
            return Err(TreeError::AlreadyLoaded(id));
        }
        node.loaded = true;

        let Node {
            kind, listeners, ..
        } = node;
        let mut ctx = LoadContext {
            dispatcher: &mut *dispatcher,
            target,
            subscriptions: listeners,
        };
        match kind {
            ElementKind::Button(_) | ElementKind::ImageButton(_) => {
                ctx.listen(EventKind::PointerDown);
                ctx.listen(EventKind::PointerUp);
            }
            ElementKind::Widget(widget) => widget.on_load(&mut ctx),
            _ => {}
        }
        Ok(())
    }

    /// Unloads `id` and every descendant, removing their event listeners.
    /// The whole subtree is walked; descendants that were not loaded are
    /// skipped with a warning.
    pub fn unload(&mut self, id: ElementId, dispatcher: &mut Dispatcher) -> Result<(), TreeError> {
        if !self.node(id)?.loaded {
            return Err(TreeError::NotLoaded(id));
        }

        for element in self.descendants(id) {
            if !self.unload_node(element, dispatcher) {
                tracing::warn!("Element {:?} was not loaded while unloading {:?}", element, id);
            }
        }
        Ok(())
    }

    /// Returns `false` when the element was not loaded.
    fn unload_node(&mut self, id: ElementId, dispatcher: &mut Dispatcher) -> bool {
        let Some(node) = self.nodes.get_mut(id) else {
            return false;
        };
        if !node.loaded {
            return false;
        }
        node.loaded = false;

        for listener in node.listeners.drain(..) {
            dispatcher.deregister(listener);
        }
        if let ElementKind::Widget(widget) = &mut node.kind {
            widget.on_unload();
        }
        true
    }

    /// Draws `id` and its visible descendants depth-first. The root container
    /// refuses to draw until loaded.
    pub fn draw(&mut self, id: ElementId, renderer: &mut dyn Renderer) -> Result<(), TreeError> {
        let node = self.node(id)?;
        if node.container().is_some_and(Container::is_root) && !node.loaded {
            return Err(TreeError::RootNotLoaded(id));
        }
        self.draw_node(id, renderer)
    }

    fn draw_node(&mut self, id: ElementId, renderer: &mut dyn Renderer) -> Result<(), TreeError> {
        match &self.node(id)?.kind {
            ElementKind::Container(_) => {
                for child in self.child_ids(id) {
                    if self.node(child)?.visible {
                        self.draw_node(child, renderer)?;
                    }
                }
            }
            ElementKind::Image(image) => {
                renderer.blit(image, self.absolute_position(id)?);
            }
            ElementKind::ImageButton(button) => {
                renderer.blit(&button.image, self.absolute_position(id)?);
            }
            ElementKind::Button(_) => {}
            ElementKind::Widget(_) => {
                let position = self.absolute_position(id)?;
                let node = self.node_mut(id)?;
                let size = node.size();
                if let ElementKind::Widget(widget) = &mut node.kind {
                    widget.draw(&mut DrawContext {
                        renderer: &mut *renderer,
                        position,
                        size,
                    });
                }
            }
        }
        Ok(())
    }

    /// Depth-first pre-order walk starting at `id`.
    pub fn descendants(&self, id: ElementId) -> Vec<ElementId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            out.push(current);
            let mut children = self.child_ids(current);
            children.reverse();
            stack.extend(children);
        }
        out
    }

    /// Checks that every parent link matches a child entry and vice versa.
    pub fn verify_integrity(&self) -> Result<(), TreeError> {
        if self.node(self.root)?.parent.is_some() {
            return Err(TreeError::Integrity(self.root));
        }
        for (id, node) in &self.nodes {
            if let Some(parent) = node.parent {
                let listed = self
                    .nodes
                    .get(parent)
                    .and_then(Node::container)
                    .is_some_and(|container| container.children.contains(id));
                if !listed {
                    return Err(TreeError::Integrity(id));
                }
            }
            if let Some(container) = node.container() {
                for child in container.children.iter() {
                    if self.nodes.get(child).and_then(|c| c.parent) != Some(id) {
                        return Err(TreeError::Integrity(child));
                    }
                }
            }
        }
        Ok(())
    }
}

impl ElementTarget for GuiTree {
    fn notify(&mut self, target: ListenerTarget, event: &Event, commands: &mut Commands) -> bool {
        if target.tree != self.id {
            tracing::warn!(
                "Stale listener for {:?} in tree {:?}, current tree is {:?}",
                target.element,
                target.tree,
                self.id
            );
            return false;
        }
        let Some(node) = self.nodes.get(target.element) else {
            tracing::warn!("Event targeted at missing element {:?}", target.element);
            return false;
        };
        if !node.loaded {
            return false;
        }

        let hit = match event.position() {
            Some(point) => match self.bounds(target.element) {
                Ok(bounds) => bounds.contains_point(point),
                Err(err) => {
                    tracing::warn!("Hit test failed for {:?}: {}", target.element, err);
                    false
                }
            },
            None => false,
        };

        let Some(node) = self.nodes.get_mut(target.element) else {
            return false;
        };
        match &mut node.kind {
            ElementKind::Button(button) if hit => button.handle_pointer(event.kind(), commands),
            ElementKind::ImageButton(button) if hit => {
                button.button.handle_pointer(event.kind(), commands)
            }
            ElementKind::Widget(widget) => widget.on_event(event, hit, commands),
            _ => {}
        }
        true
    }
}

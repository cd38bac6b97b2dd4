use crate::events::ListenerId;
use crate::geometry::Vec2;
use crate::tree::ElementId;
use crate::widgets::{Button, Image, ImageButton, Widget};
use smallvec::SmallVec;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub type ChildList = SmallVec<[ElementId; 4]>;

/// Where a child sits inside its container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Alignment {
    TopLeft,
    Top,
    TopRight,
    Left,
    Center,
    Right,
    BottomLeft,
    Bottom,
    BottomRight,
}

impl Alignment {
    pub const ALL: &'static [Alignment] = &[
        Alignment::TopLeft,
        Alignment::Top,
        Alignment::TopRight,
        Alignment::Left,
        Alignment::Center,
        Alignment::Right,
        Alignment::BottomLeft,
        Alignment::Bottom,
        Alignment::BottomRight,
    ];

    /// Fraction of the free space placed before the child on each axis.
    fn factors(self) -> Vec2 {
        let x = match self {
            Self::TopLeft | Self::Left | Self::BottomLeft => 0.0,
            Self::Top | Self::Center | Self::Bottom => 0.5,
            Self::TopRight | Self::Right | Self::BottomRight => 1.0,
        };
        let y = match self {
            Self::TopLeft | Self::Top | Self::TopRight => 0.0,
            Self::Left | Self::Center | Self::Right => 0.5,
            Self::BottomLeft | Self::Bottom | Self::BottomRight => 1.0,
        };
        Vec2::new(x, y)
    }

    pub fn offset(self, container_size: Vec2, child_size: Vec2) -> Vec2 {
        (container_size - child_size) * self.factors()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown alignment '{0}'")]
pub struct ParseAlignmentError(String);

impl FromStr for Alignment {
    type Err = ParseAlignmentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase().replace(['_', ' '], "-");
        let alignment = match normalized.as_str() {
            "TL" | "TOP-LEFT" | "TOPLEFT" => Self::TopLeft,
            "T" | "TOP" => Self::Top,
            "TR" | "TOP-RIGHT" | "TOPRIGHT" => Self::TopRight,
            "L" | "LEFT" => Self::Left,
            "C" | "CENTER" | "CENTRE" => Self::Center,
            "R" | "RIGHT" => Self::Right,
            "BL" | "BOTTOM-LEFT" | "BOTTOMLEFT" => Self::BottomLeft,
            "B" | "BOTTOM" => Self::Bottom,
            "BR" | "BOTTOM-RIGHT" | "BOTTOMRIGHT" => Self::BottomRight,
            _ => return Err(ParseAlignmentError(s.to_string())),
        };
        Ok(alignment)
    }
}

impl fmt::Display for Alignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::TopLeft => "TOP-LEFT",
            Self::Top => "TOP",
            Self::TopRight => "TOP-RIGHT",
            Self::Left => "LEFT",
            Self::Center => "CENTER",
            Self::Right => "RIGHT",
            Self::BottomLeft => "BOTTOM-LEFT",
            Self::Bottom => "BOTTOM",
            Self::BottomRight => "BOTTOM-RIGHT",
        };
        f.write_str(name)
    }
}

/// How a child is attached, matching the container's kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    Append,
    Layer(i32),
    Aligned(Alignment),
}

pub enum Children {
    List(ChildList),
    /// Ascending layer order, insertion order within a layer.
    Layered(BTreeMap<i32, ChildList>),
    Aligned(SmallVec<[(ElementId, Alignment); 4]>),
}

impl Children {
    pub fn iter(&self) -> Box<dyn Iterator<Item = ElementId> + '_> {
        match self {
            Children::List(list) => Box::new(list.iter().copied()),
            Children::Layered(layers) => Box::new(layers.values().flatten().copied()),
            Children::Aligned(list) => Box::new(list.iter().map(|(id, _)| *id)),
        }
    }

    pub fn contains(&self, child: ElementId) -> bool {
        self.iter().any(|id| id == child)
    }

    pub fn len(&self) -> usize {
        match self {
            Children::List(list) => list.len(),
            Children::Layered(layers) => layers.values().map(|l| l.len()).sum(),
            Children::Aligned(list) => list.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn alignment_of(&self, child: ElementId) -> Option<Alignment> {
        match self {
            Children::Aligned(list) => list
                .iter()
                .find(|(id, _)| *id == child)
                .map(|(_, alignment)| *alignment),
            _ => None,
        }
    }

    pub(crate) fn expected_placement(&self) -> &'static str {
        match self {
            Children::List(_) => "append",
            Children::Layered(_) => "layer",
            Children::Aligned(_) => "alignment",
        }
    }

    /// Returns `false` when the placement does not fit this kind of container.
    pub(crate) fn insert(&mut self, child: ElementId, placement: Placement) -> bool {
        match (self, placement) {
            (Children::List(list), Placement::Append) => list.push(child),
            (Children::Layered(layers), Placement::Layer(layer)) => {
                layers.entry(layer).or_default().push(child)
            }
            (Children::Layered(layers), Placement::Append) => {
                layers.entry(0).or_default().push(child)
            }
            (Children::Aligned(list), Placement::Aligned(alignment)) => {
                list.push((child, alignment))
            }
            _ => return false,
        }
        true
    }

    pub(crate) fn remove(&mut self, child: ElementId) -> bool {
        match self {
            Children::List(list) => match list.iter().position(|id| *id == child) {
                Some(index) => {
                    list.remove(index);
                    true
                }
                None => false,
            },
            Children::Layered(layers) => {
                let found = layers.iter_mut().find_map(|(layer, list)| {
                    let index = list.iter().position(|id| *id == child)?;
                    list.remove(index);
                    Some((*layer, list.is_empty()))
                });
                if let Some((layer, true)) = found {
                    layers.remove(&layer);
                }
                found.is_some()
            }
            Children::Aligned(list) => match list.iter().position(|(id, _)| *id == child) {
                Some(index) => {
                    list.remove(index);
                    true
                }
                None => false,
            },
        }
    }
}

pub struct Container {
    pub children: Children,
    root: bool,
}

impl Container {
    pub fn list() -> Self {
        Self {
            children: Children::List(ChildList::new()),
            root: false,
        }
    }

    pub fn layered() -> Self {
        Self {
            children: Children::Layered(BTreeMap::new()),
            root: false,
        }
    }

    pub fn aligned() -> Self {
        Self {
            children: Children::Aligned(SmallVec::new()),
            root: false,
        }
    }

    pub(crate) fn root() -> Self {
        Self {
            root: true,
            ..Self::list()
        }
    }

    pub fn is_root(&self) -> bool {
        self.root
    }
}

pub enum ElementKind {
    Container(Container),
    Image(Image),
    Button(Button),
    ImageButton(ImageButton),
    Widget(Box<dyn Widget>),
}

impl ElementKind {
    pub fn name(&self) -> &'static str {
        match self {
            ElementKind::Container(c) if c.is_root() => "root",
            ElementKind::Container(_) => "container",
            ElementKind::Image(_) => "image",
            ElementKind::Button(_) => "button",
            ElementKind::ImageButton(_) => "image button",
            ElementKind::Widget(_) => "widget",
        }
    }
}

impl From<Container> for ElementKind {
    fn from(container: Container) -> Self {
        ElementKind::Container(container)
    }
}

impl From<Image> for ElementKind {
    fn from(image: Image) -> Self {
        ElementKind::Image(image)
    }
}

impl From<Button> for ElementKind {
    fn from(button: Button) -> Self {
        ElementKind::Button(button)
    }
}

impl From<ImageButton> for ElementKind {
    fn from(button: ImageButton) -> Self {
        ElementKind::ImageButton(button)
    }
}

/// A single element of the GUI tree.
///
/// Built detached (no parent, unloaded) and handed to
/// [`GuiTree::insert`](crate::tree::GuiTree::insert).
pub struct Node {
    pub relative_position: Vec2,
    pub visible: bool,
    pub kind: ElementKind,
    size: Vec2,
    pub(crate) loaded: bool,
    pub(crate) parent: Option<ElementId>,
    pub(crate) listeners: SmallVec<[ListenerId; 2]>,
}

impl Node {
    pub fn new(kind: impl Into<ElementKind>) -> Self {
        Self {
            relative_position: Vec2::ZERO,
            visible: true,
            kind: kind.into(),
            size: Vec2::ZERO,
            loaded: false,
            parent: None,
            listeners: SmallVec::new(),
        }
    }

    pub fn widget(widget: impl Widget) -> Self {
        Self::new(ElementKind::Widget(Box::new(widget)))
    }

    pub fn at(mut self, position: Vec2) -> Self {
        self.relative_position = position;
        self
    }

    pub fn with_size(mut self, size: Vec2) -> Self {
        self.set_size(size);
        self
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    /// Sprite-backed elements report their sprite's size.
    pub fn size(&self) -> Vec2 {
        match &self.kind {
            ElementKind::Image(image) => image.size(),
            ElementKind::ImageButton(button) => button.image.size(),
            ElementKind::Widget(widget) => widget.size().unwrap_or(self.size),
            _ => self.size,
        }
    }

    pub fn set_size(&mut self, size: Vec2) {
        match &mut self.kind {
            ElementKind::Image(image) => image.scale_to(size),
            ElementKind::ImageButton(button) => button.image.scale_to(size),
            _ => self.size = size,
        }
    }

    pub fn toggle_visible(&mut self) {
        self.visible = !self.visible;
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn parent(&self) -> Option<ElementId> {
        self.parent
    }

    pub fn container(&self) -> Option<&Container> {
        match &self.kind {
            ElementKind::Container(container) => Some(container),
            _ => None,
        }
    }

    pub(crate) fn container_mut(&mut self) -> Option<&mut Container> {
        match &mut self.kind {
            ElementKind::Container(container) => Some(container),
            _ => None,
        }
    }
}

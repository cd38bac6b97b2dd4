use vista_core::{
    Alignment, Button, Container, Dispatcher, GuiTree, Image, Node, Placement, TreeError, Vec2,
};

fn image(size: f32) -> Node {
    Node::new(Image::new("sprites/test.png", Vec2::splat(size)))
}

#[test]
fn test_add_child_links_both_directions() {
    let mut tree = GuiTree::new(Vec2::new(200.0, 200.0));
    let root = tree.root();
    let child = tree.insert(image(10.0));

    let returned = tree.add_child(root, child).unwrap();

    assert_eq!(returned, root);
    assert_eq!(tree.parent(child).unwrap(), Some(root));
    assert_eq!(tree.children(root).unwrap(), vec![child]);
    tree.verify_integrity().unwrap();
}

#[test]
fn test_double_add_fails_and_leaves_state_unchanged() {
    let mut tree = GuiTree::new(Vec2::new(200.0, 200.0));
    let root = tree.root();
    let first = tree.insert(Node::new(Container::list()));
    let second = tree.insert(Node::new(Container::list()));
    tree.add_child(root, first).unwrap();
    tree.add_child(root, second).unwrap();

    let child = tree.insert(image(10.0));
    tree.add_child(first, child).unwrap();

    let err = tree.add_child(second, child).unwrap_err();
    assert_eq!(
        err,
        TreeError::AlreadyParented {
            child,
            parent: first
        }
    );
    assert_eq!(tree.parent(child).unwrap(), Some(first));
    assert_eq!(tree.children(first).unwrap(), vec![child]);
    assert!(tree.children(second).unwrap().is_empty());
    tree.verify_integrity().unwrap();
}

#[test]
fn test_absolute_position_three_levels() {
    let mut tree = GuiTree::new(Vec2::new(800.0, 600.0));
    let root = tree.root();
    let middle = tree.insert(
        Node::new(Container::aligned())
            .with_size(Vec2::new(100.0, 100.0))
            .at(Vec2::new(10.0, 10.0)),
    );
    let leaf = tree.insert(image(20.0).at(Vec2::new(5.0, 5.0)));

    tree.add_child(root, middle).unwrap();
    tree.add_aligned_child(middle, leaf, Alignment::TopLeft).unwrap();

    assert_eq!(tree.child_offset(middle, leaf).unwrap(), Vec2::ZERO);
    assert_eq!(tree.absolute_position(leaf).unwrap(), Vec2::new(15.0, 15.0));
}

#[test]
fn test_detached_element_sits_at_origin() {
    let mut tree = GuiTree::new(Vec2::new(100.0, 100.0));
    let lone = tree.insert(image(10.0).at(Vec2::new(30.0, 30.0)));
    assert_eq!(tree.absolute_position(lone).unwrap(), Vec2::ZERO);
}

#[test]
fn test_layered_children_order() {
    let mut tree = GuiTree::new(Vec2::new(100.0, 100.0));
    let root = tree.root();
    let layered = tree.insert(Node::new(Container::layered()));
    tree.add_child(root, layered).unwrap();

    let c = tree.insert(image(1.0));
    let a = tree.insert(image(1.0));
    let b = tree.insert(image(1.0));
    tree.add_child_at_layer(layered, c, 2).unwrap();
    tree.add_child_at_layer(layered, a, 1).unwrap();
    tree.add_child_at_layer(layered, b, 1).unwrap();

    assert_eq!(tree.children(layered).unwrap(), vec![a, b, c]);
}

#[test]
fn test_append_into_layered_uses_layer_zero() {
    let mut tree = GuiTree::new(Vec2::new(100.0, 100.0));
    let root = tree.root();
    let layered = tree.insert(Node::new(Container::layered()));
    tree.add_child(root, layered).unwrap();

    let top = tree.insert(image(1.0));
    let bottom = tree.insert(image(1.0));
    tree.add_child_at_layer(layered, top, 1).unwrap();
    tree.add_child_at_layer(layered, bottom, -1).unwrap();
    let middle = tree.insert(image(1.0));
    tree.add_child(layered, middle).unwrap();

    assert_eq!(tree.children(layered).unwrap(), vec![bottom, middle, top]);
}

#[test]
fn test_alignment_offsets() {
    let mut tree = GuiTree::new(Vec2::new(500.0, 500.0));
    let root = tree.root();
    let aligned = tree.insert(Node::new(Container::aligned()).with_size(Vec2::new(100.0, 100.0)));
    tree.add_child(root, aligned).unwrap();

    let center = tree.insert(image(20.0));
    let top_left = tree.insert(image(20.0));
    let right = tree.insert(image(20.0));
    tree.add_aligned_child(aligned, center, Alignment::Center).unwrap();
    tree.add_aligned_child(aligned, top_left, Alignment::TopLeft).unwrap();
    tree.add_aligned_child(aligned, right, Alignment::Right).unwrap();

    assert_eq!(tree.child_offset(aligned, center).unwrap(), Vec2::new(40.0, 40.0));
    assert_eq!(tree.child_offset(aligned, top_left).unwrap(), Vec2::ZERO);
    assert_eq!(tree.child_offset(aligned, right).unwrap(), Vec2::new(80.0, 40.0));
}

#[test]
fn test_alignment_offset_follows_resize() {
    let mut tree = GuiTree::new(Vec2::new(500.0, 500.0));
    let root = tree.root();
    let aligned = tree.insert(Node::new(Container::aligned()).with_size(Vec2::new(100.0, 100.0)));
    tree.add_child(root, aligned).unwrap();
    let child = tree.insert(image(20.0));
    tree.add_aligned_child(aligned, child, Alignment::BottomRight).unwrap();

    tree.set_size(aligned, Vec2::new(200.0, 50.0)).unwrap();
    assert_eq!(tree.child_offset(aligned, child).unwrap(), Vec2::new(180.0, 30.0));

    tree.image_mut(child).unwrap().scale_to(Vec2::new(40.0, 10.0));
    assert_eq!(tree.child_offset(aligned, child).unwrap(), Vec2::new(160.0, 40.0));
}

#[test]
fn test_offset_of_non_child_fails() {
    let mut tree = GuiTree::new(Vec2::new(100.0, 100.0));
    let root = tree.root();
    let stranger = tree.insert(image(5.0));

    assert_eq!(
        tree.child_offset(root, stranger),
        Err(TreeError::NotAChild {
            child: stranger,
            container: root
        })
    );
}

#[test]
fn test_placement_must_match_container() {
    let mut tree = GuiTree::new(Vec2::new(100.0, 100.0));
    let root = tree.root();
    let aligned = tree.insert(Node::new(Container::aligned()));
    tree.add_child(root, aligned).unwrap();
    let child = tree.insert(image(5.0));

    assert!(matches!(
        tree.add_child(aligned, child),
        Err(TreeError::PlacementMismatch { .. })
    ));
    assert!(matches!(
        tree.attach(root, child, Placement::Aligned(Alignment::Center)),
        Err(TreeError::PlacementMismatch { .. })
    ));
    assert_eq!(tree.parent(child).unwrap(), None);
    tree.verify_integrity().unwrap();
}

#[test]
fn test_structural_errors() {
    let mut tree = GuiTree::new(Vec2::new(100.0, 100.0));
    let root = tree.root();
    let leaf = tree.insert(image(5.0));
    let other = tree.insert(image(5.0));
    let outer = tree.insert(Node::new(Container::list()));
    let inner = tree.insert(Node::new(Container::list()));
    tree.add_child(outer, inner).unwrap();

    assert_eq!(tree.add_child(leaf, other), Err(TreeError::NotAContainer(leaf)));
    assert_eq!(tree.add_child(outer, root), Err(TreeError::RootCannotBeChild));
    assert_eq!(
        tree.add_child(inner, outer),
        Err(TreeError::WouldCycle {
            child: outer,
            container: inner
        })
    );
}

#[test]
fn test_insert_child_removes_node_on_failure() {
    let mut tree = GuiTree::new(Vec2::new(100.0, 100.0));
    let aligned = tree.insert(Node::new(Container::aligned()));
    let before = tree.len();

    assert!(tree.insert_child(aligned, image(1.0), Placement::Append).is_err());
    assert_eq!(tree.len(), before);

    let child = tree
        .insert_child(aligned, image(1.0), Placement::Aligned(Alignment::Top))
        .unwrap();
    assert_eq!(tree.parent(child).unwrap(), Some(aligned));
}

#[test]
fn test_load_unload_round_trip() {
    let mut tree = GuiTree::new(Vec2::new(100.0, 100.0));
    let mut dispatcher = Dispatcher::new();
    let root = tree.root();
    let group = tree.insert(Node::new(Container::list()).hidden());
    let leaf = tree.insert(image(5.0));
    let button = tree.insert(Node::new(Button::new()).with_size(Vec2::splat(5.0)));
    tree.add_child(root, group).unwrap();
    tree.add_child(group, leaf).unwrap();
    tree.add_child(root, button).unwrap();

    tree.load(root, &mut dispatcher).unwrap();
    for id in tree.descendants(root) {
        assert!(tree.is_loaded(id).unwrap(), "{id:?} should be loaded");
    }
    // Press and release listeners for the button.
    assert_eq!(dispatcher.len(), 2);

    tree.unload(root, &mut dispatcher).unwrap();
    for id in tree.descendants(root) {
        assert!(!tree.is_loaded(id).unwrap(), "{id:?} should be unloaded");
    }
    assert!(dispatcher.is_empty());

    assert_eq!(tree.unload(root, &mut dispatcher), Err(TreeError::NotLoaded(root)));
}

#[test]
fn test_double_load_fails() {
    let mut tree = GuiTree::new(Vec2::new(100.0, 100.0));
    let mut dispatcher = Dispatcher::new();
    let root = tree.root();

    tree.load(root, &mut dispatcher).unwrap();
    assert_eq!(tree.load(root, &mut dispatcher), Err(TreeError::AlreadyLoaded(root)));
}

#[test]
fn test_failed_load_rolls_back() {
    let mut tree = GuiTree::new(Vec2::new(100.0, 100.0));
    let mut dispatcher = Dispatcher::new();
    let root = tree.root();
    let button = tree.insert(Node::new(Button::new()).with_size(Vec2::splat(10.0)));
    let nested = tree.insert(Node::new(Container::list()));
    tree.add_child(root, button).unwrap();
    tree.add_child(root, nested).unwrap();
    tree.load(nested, &mut dispatcher).unwrap();

    assert_eq!(tree.load(root, &mut dispatcher), Err(TreeError::AlreadyLoaded(nested)));
    assert!(!tree.is_loaded(root).unwrap());
    assert!(!tree.is_loaded(button).unwrap());
    assert!(tree.is_loaded(nested).unwrap());
    assert!(dispatcher.is_empty());
}

#[test]
fn test_attach_to_loaded_container() {
    let mut tree = GuiTree::new(Vec2::new(100.0, 100.0));
    let mut dispatcher = Dispatcher::new();
    let root = tree.root();
    tree.load(root, &mut dispatcher).unwrap();

    let panel = tree.insert(Node::new(Container::list()));
    let button = tree.insert(Node::new(Button::new()).with_size(Vec2::splat(10.0)));
    tree.add_child(panel, button).unwrap();

    assert_eq!(
        tree.add_child(root, panel),
        Err(TreeError::LoadStateMismatch {
            child: panel,
            container: root
        })
    );
    assert!(tree.children(root).unwrap().is_empty());

    tree.attach_live(root, panel, Placement::Append, &mut dispatcher)
        .unwrap();
    assert!(tree.is_loaded(panel).unwrap());
    assert!(tree.is_loaded(button).unwrap());
    assert_eq!(dispatcher.len(), 2);
    tree.verify_integrity().unwrap();

    tree.unload(root, &mut dispatcher).unwrap();
    assert!(!tree.is_loaded(button).unwrap());
    assert!(dispatcher.is_empty());
}

#[test]
fn test_loaded_element_cannot_join_unloaded_container() {
    let mut tree = GuiTree::new(Vec2::new(100.0, 100.0));
    let mut dispatcher = Dispatcher::new();
    let root = tree.root();
    let child = tree.insert(image(5.0));
    tree.load(child, &mut dispatcher).unwrap();

    assert_eq!(
        tree.attach_live(root, child, Placement::Append, &mut dispatcher),
        Err(TreeError::LoadStateMismatch {
            child,
            container: root
        })
    );
    assert_eq!(tree.parent(child).unwrap(), None);
}

#[test]
fn test_descendants_pre_order() {
    let mut tree = GuiTree::new(Vec2::new(100.0, 100.0));
    let root = tree.root();
    let group = tree.insert(Node::new(Container::list()));
    let a = tree.insert(image(1.0));
    let b = tree.insert(image(1.0));
    tree.add_child(root, group).unwrap();
    tree.add_child(group, a).unwrap();
    tree.add_child(root, b).unwrap();

    assert_eq!(tree.descendants(root), vec![root, group, a, b]);
}

#[test]
fn test_wrong_kind_accessors() {
    let mut tree = GuiTree::new(Vec2::new(100.0, 100.0));
    let leaf = tree.insert(image(5.0));

    assert!(tree.image_mut(leaf).is_ok());
    assert!(matches!(
        tree.button_mut(leaf),
        Err(TreeError::WrongKind {
            expected: "button",
            ..
        })
    ));
    assert!(tree.widget_mut(leaf).is_err());
}

#[test]
fn test_visibility_toggle() {
    let mut tree = GuiTree::new(Vec2::new(100.0, 100.0));
    let leaf = tree.insert(image(5.0));

    tree.toggle_visible(leaf).unwrap();
    assert!(!tree.node(leaf).unwrap().visible);
    tree.set_visible(leaf, true).unwrap();
    assert!(tree.node(leaf).unwrap().visible);
}

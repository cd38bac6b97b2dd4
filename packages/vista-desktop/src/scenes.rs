//! Scenes shipped with the demo binary.

use glam::Vec2;
use vista_core::config::{DEFAULT_HEIGHT, DEFAULT_WIDTH};
use vista_core::{
    Alignment, Container, ElementId, FrameInfo, GuiTree, Image, ImageButton, Node, Placement, Scene,
};

pub const PLAY_BUTTON_SPRITE: &str = "sprites/play_button.png";
pub const TEST_SPRITE: &str = "sprites/SpriteTest.png";

fn default_screen() -> Vec2 {
    Vec2::new(DEFAULT_WIDTH as f32, DEFAULT_HEIGHT as f32)
}

/// Root plus a full-screen alignment container, the layout both demo scenes use.
fn screen_layout() -> (GuiTree, ElementId) {
    let mut gui = GuiTree::new(default_screen());
    let root = gui.root();
    let layout = gui.insert(Node::new(Container::aligned()).with_size(default_screen()));
    attach(&mut gui, root, layout, Placement::Append);
    (gui, layout)
}

fn attach(gui: &mut GuiTree, container: ElementId, child: ElementId, placement: Placement) {
    if let Err(err) = gui.attach(container, child, placement) {
        tracing::warn!("Failed to attach {:?} to {:?}: {}", child, container, err);
    }
}

/// Keeps the root and the layout container matching the window.
fn fit_to_screen(gui: &mut GuiTree, layout: ElementId, screen: Vec2) {
    let root = gui.root();
    if gui.size(root).is_ok_and(|size| size == screen) {
        return;
    }
    for id in [root, layout] {
        if let Err(err) = gui.set_size(id, screen) {
            tracing::warn!("Failed to resize {:?}: {}", id, err);
        }
    }
}

/// A centred play button that switches to [`TestScene`] when released.
pub struct MainMenuScene {
    gui: GuiTree,
    layout: ElementId,
    play: ElementId,
}

impl Default for MainMenuScene {
    fn default() -> Self {
        let (mut gui, layout) = screen_layout();
        let button = ImageButton::new(Image::new(PLAY_BUTTON_SPRITE, Vec2::new(512.0, 256.0)))
            .on_up(|commands| commands.switch_scene_by_type::<TestScene>());
        let play = gui.insert(Node::new(button));
        attach(&mut gui, layout, play, Placement::Aligned(Alignment::Center));
        Self { gui, layout, play }
    }
}

impl MainMenuScene {
    pub fn play_button(&self) -> ElementId {
        self.play
    }
}

impl Scene for MainMenuScene {
    fn gui(&self) -> &GuiTree {
        &self.gui
    }

    fn gui_mut(&mut self) -> &mut GuiTree {
        &mut self.gui
    }

    fn name(&self) -> &str {
        "main-menu"
    }

    fn on_frame(&mut self, frame: &FrameInfo) {
        fit_to_screen(&mut self.gui, self.layout, frame.screen_size);
    }
}

/// Two copies of the test sprite spinning in opposite directions.
pub struct TestScene {
    gui: GuiTree,
    layout: ElementId,
    large: ElementId,
    small: ElementId,
}

impl Default for TestScene {
    fn default() -> Self {
        let (mut gui, layout) = screen_layout();
        let large = gui.insert(Node::new(Image::new(TEST_SPRITE, Vec2::splat(640.0))));
        let small = gui.insert(Node::new(Image::new(TEST_SPRITE, Vec2::splat(320.0))));
        attach(&mut gui, layout, large, Placement::Aligned(Alignment::TopLeft));
        attach(&mut gui, layout, small, Placement::Aligned(Alignment::Right));
        Self {
            gui,
            layout,
            large,
            small,
        }
    }
}

impl TestScene {
    pub const LARGE_SPEED: f32 = 57.0;
    pub const SMALL_SPEED: f32 = -32.0;

    pub fn large(&self) -> ElementId {
        self.large
    }

    pub fn small(&self) -> ElementId {
        self.small
    }
}

impl Scene for TestScene {
    fn gui(&self) -> &GuiTree {
        &self.gui
    }

    fn gui_mut(&mut self) -> &mut GuiTree {
        &mut self.gui
    }

    fn name(&self) -> &str {
        "test"
    }

    fn on_frame(&mut self, frame: &FrameInfo) {
        fit_to_screen(&mut self.gui, self.layout, frame.screen_size);
        for (id, speed) in [(self.large, Self::LARGE_SPEED), (self.small, Self::SMALL_SPEED)] {
            if let Ok(image) = self.gui.image_mut(id) {
                image.rotate_by(frame.delta * speed);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_menu_button_is_centred() {
        let menu = MainMenuScene::default();
        let position = menu.gui().absolute_position(menu.play_button()).unwrap();
        assert_eq!(position, Vec2::new(544.0, 272.0));
    }

    #[test]
    fn test_demo_layouts_are_attached() {
        let menu = MainMenuScene::default();
        assert_eq!(menu.gui().parent(menu.play_button()).unwrap(), Some(menu.layout));
        menu.gui().verify_integrity().unwrap();

        let test = TestScene::default();
        assert_eq!(test.gui().children(test.layout).unwrap(), vec![test.large(), test.small()]);
        assert_eq!(test.gui().parent(test.layout).unwrap(), Some(test.gui().root()));
    }

    #[test]
    fn test_scene_follows_screen_size() {
        let mut scene = TestScene::default();
        scene.on_frame(&FrameInfo {
            delta: 0.0,
            frame: 0,
            screen_size: Vec2::new(800.0, 600.0),
        });

        let small = scene.small();
        assert_eq!(
            scene.gui().absolute_position(small).unwrap(),
            Vec2::new(480.0, 140.0)
        );
    }

    #[test]
    fn test_sprites_spin_with_delta() {
        let mut scene = TestScene::default();
        scene.on_frame(&FrameInfo {
            delta: 0.5,
            frame: 1,
            screen_size: default_screen(),
        });

        let (large, small) = (scene.large(), scene.small());
        let gui = scene.gui_mut();
        assert!((gui.image_mut(large).unwrap().rotation() - 28.5).abs() < 1e-4);
        assert!((gui.image_mut(small).unwrap().rotation() - 344.0).abs() < 1e-4);
    }
}

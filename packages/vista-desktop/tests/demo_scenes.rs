use vista_core::headless::HeadlessPlatform;
use vista_core::{Event, Runtime, RuntimeConfig, Scene, Vec2};
use vista_desktop::scenes::{MainMenuScene, PLAY_BUTTON_SPRITE, TEST_SPRITE};

fn click(x: f32, y: f32) -> [Event; 2] {
    let position = Vec2::new(x, y);
    [Event::PointerDown { position }, Event::PointerUp { position }]
}

#[test]
fn test_play_button_opens_test_scene() {
    let mut runtime = Runtime::new(RuntimeConfig::default());
    let mut platform = HeadlessPlatform::new()
        .with_batch(click(10.0, 10.0))
        .with_batch(click(800.0, 400.0));

    runtime
        .start(&mut platform, Box::new(MainMenuScene::default()))
        .unwrap();

    // A click outside the button keeps the menu.
    runtime.tick(&mut platform).unwrap();
    assert_eq!(runtime.scenes.current().unwrap().name(), "main-menu");
    let menu_frame = platform.renderer.last_frame().unwrap();
    assert_eq!(menu_frame.len(), 1);
    assert_eq!(menu_frame[0].path, PLAY_BUTTON_SPRITE);
    assert_eq!(menu_frame[0].position, Vec2::new(544.0, 272.0));

    runtime.tick(&mut platform).unwrap();
    assert_eq!(runtime.scenes.current().unwrap().name(), "test");

    runtime.tick(&mut platform).unwrap();
    let test_frame = platform.renderer.last_frame().unwrap();
    assert_eq!(test_frame.len(), 2);
    assert!(test_frame.iter().all(|blit| blit.path == TEST_SPRITE));
    assert_eq!(test_frame[0].position, Vec2::ZERO);
    assert_eq!(test_frame[1].position, Vec2::new(1280.0, 240.0));
}

#[test]
fn test_menu_listeners_removed_after_switch() {
    let mut runtime = Runtime::new(RuntimeConfig::default());
    let mut platform = HeadlessPlatform::new().with_batch(click(800.0, 400.0));

    runtime
        .start(&mut platform, Box::new(MainMenuScene::default()))
        .unwrap();
    // Close request plus the play button's press and release.
    assert_eq!(runtime.dispatcher.len(), 3);

    runtime.tick(&mut platform).unwrap();
    assert_eq!(runtime.dispatcher.len(), 1);
}

#[test]
fn test_close_request_stops_demo() {
    let mut runtime = Runtime::new(RuntimeConfig::default().with_size(640, 480));
    let mut platform = HeadlessPlatform::new()
        .with_batch(Vec::new())
        .with_batch([Event::CloseRequested]);

    runtime
        .start(&mut platform, Box::new(MainMenuScene::default()))
        .unwrap();
    runtime.run(&mut platform).unwrap();

    assert!(!runtime.is_open());
    assert!(platform.renderer.closed);
    assert_eq!(platform.renderer.frames_presented(), 1);
    // The menu was fitted to the smaller window before it was drawn.
    assert_eq!(
        platform.renderer.last_frame().unwrap()[0].position,
        Vec2::new(64.0, 112.0)
    );
}

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use vista_core::headless::HeadlessPlatform;
use vista_core::{Event, Runtime, RuntimeConfig, Vec2};
use vista_desktop::DesktopApp;
use vista_desktop::scenes::{MainMenuScene, TestScene};

#[derive(Parser)]
#[command(name = "vista-demo")]
#[command(about = "Vista scene demo", long_about = None)]
struct Cli {
    /// JSON runtime config
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory sprites are loaded from
    #[arg(long)]
    assets: Option<PathBuf>,

    /// Run without a window, clicking the play button on the first frame
    #[arg(long)]
    headless: bool,

    /// Stop after this many frames
    #[arg(long)]
    frames: Option<u64>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => RuntimeConfig::from_path(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => RuntimeConfig::default(),
    };
    if let Some(assets) = cli.assets {
        config = config.with_asset_root(assets);
    }

    if cli.headless {
        return run_headless(config, cli.frames.unwrap_or(60));
    }

    let runtime = DesktopApp::new()
        .with_config(config)
        .run(Box::new(MainMenuScene::default()), cli.frames)?;
    tracing::info!("Profiling: {:?}", runtime.profiling);
    Ok(())
}

fn run_headless(config: RuntimeConfig, frames: u64) -> Result<()> {
    let center = config.window.size() * 0.5;
    let click = |position: Vec2| [Event::PointerDown { position }, Event::PointerUp { position }];
    let mut platform = HeadlessPlatform::new().with_batch(click(center));

    let mut runtime = Runtime::new(config);
    runtime.scenes.register::<MainMenuScene>("main-menu");
    runtime.scenes.register::<TestScene>("test");
    runtime.start(&mut platform, Box::new(MainMenuScene::default()))?;
    runtime.run_frames(&mut platform, Some(frames))?;

    println!(
        "{} frame(s), {} blit(s) in the last frame, final scene: {}",
        platform.renderer.frames_presented(),
        platform.renderer.last_frame().map_or(0, <[_]>::len),
        runtime.scenes.current()?.name()
    );
    Ok(())
}

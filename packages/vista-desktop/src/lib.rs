pub mod raster;
pub mod scenes;
pub mod sprites;

use glam::Vec2;
use pixels::{Pixels, SurfaceTexture};
use raster::Frame;
use sprites::SpriteCache;
use std::time::Duration;
use thiserror::Error;
use vista_core::error::{ConfigError, RenderError, RuntimeError};
use vista_core::{Event, EventSource, Image, Renderer, Runtime, RuntimeConfig, Scene, WindowConfig};
use winit::{
    dpi::PhysicalSize,
    event::{ElementState, Event as WinitEvent, KeyEvent, MouseButton, WindowEvent},
    event_loop::EventLoop,
    platform::pump_events::{EventLoopExtPumpEvents, PumpStatus},
    platform::scancode::PhysicalKeyExtScancode,
    window::{Window, WindowBuilder},
};

#[derive(Debug, Error)]
pub enum DesktopError {
    #[error("failed to create event loop: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Runtime(#[from] RuntimeError),
}

fn backend(err: impl std::fmt::Display) -> RenderError {
    RenderError::Backend(err.to_string().into())
}

struct Surface {
    window: &'static Window,
    pixels: Pixels<'static>,
    width: u32,
    height: u32,
}

/// A winit window with a `pixels` frame buffer, driven one frame at a time.
pub struct DesktopPlatform {
    event_loop: EventLoop<()>,
    surface: Option<Surface>,
    sprites: SpriteCache,
    background: u32,
    screen_size: Vec2,
    cursor: Vec2,
    pending: Vec<Event>,
}

impl DesktopPlatform {
    pub fn new(config: &RuntimeConfig) -> Result<Self, DesktopError> {
        Ok(Self {
            event_loop: EventLoop::new()?,
            surface: None,
            sprites: SpriteCache::new(config.asset_root.clone()),
            background: config.window.background,
            screen_size: config.window.size(),
            cursor: Vec2::ZERO,
            pending: Vec::new(),
        })
    }

    fn translate(&mut self, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => self.pending.push(Event::CloseRequested),
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor = Vec2::new(position.x as f32, position.y as f32);
                self.pending.push(Event::PointerMoved {
                    position: self.cursor,
                });
            }
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => {
                let position = self.cursor;
                self.pending.push(match state {
                    ElementState::Pressed => Event::PointerDown { position },
                    ElementState::Released => Event::PointerUp { position },
                });
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key,
                        state,
                        repeat: false,
                        ..
                    },
                ..
            } => {
                if let Some(code) = physical_key.to_scancode() {
                    self.pending.push(match state {
                        ElementState::Pressed => Event::KeyDown { code },
                        ElementState::Released => Event::KeyUp { code },
                    });
                }
            }
            WindowEvent::Resized(size) => {
                if let Some(surface) = self.surface.as_mut() {
                    if size.width > 0 && size.height > 0 {
                        if let Err(err) = surface.pixels.resize_surface(size.width, size.height) {
                            tracing::warn!("Failed to resize surface: {}", err);
                        }
                    }
                }
                self.pending.push(Event::Resized {
                    size: Vec2::new(size.width as f32, size.height as f32),
                });
            }
            _ => {}
        }
    }
}

impl Renderer for DesktopPlatform {
    fn open_window(&mut self, config: &WindowConfig) -> Result<(), RenderError> {
        if self.surface.is_some() {
            return Ok(());
        }

        // pixels needs a 'static window handle.
        let window: &'static Window = Box::leak(Box::new(
            WindowBuilder::new()
                .with_title(&config.title)
                .with_inner_size(PhysicalSize::new(config.width, config.height))
                .with_resizable(false)
                .build(&self.event_loop)
                .map_err(backend)?,
        ));

        let size = window.inner_size();
        let surface_texture = SurfaceTexture::new(size.width, size.height, window);
        let mut pixels = Pixels::new(config.width, config.height, surface_texture).map_err(backend)?;
        self.background = config.background;
        Frame {
            pixels: pixels.frame_mut(),
            width: config.width,
            height: config.height,
        }
        .clear(self.background);

        tracing::info!("Opened {}x{} window", config.width, config.height);
        self.screen_size = config.size();
        self.surface = Some(Surface {
            window,
            pixels,
            width: config.width,
            height: config.height,
        });
        Ok(())
    }

    fn blit(&mut self, image: &Image, position: Vec2) {
        let Some(surface) = self.surface.as_mut() else {
            return;
        };
        let Some(sprite) = self.sprites.get(image.path()) else {
            return;
        };
        Frame {
            pixels: surface.pixels.frame_mut(),
            width: surface.width,
            height: surface.height,
        }
        .blit(sprite, position, image.size(), image.rotation());
    }

    fn present(&mut self) -> Result<(), RenderError> {
        let surface = self.surface.as_mut().ok_or(RenderError::WindowClosed)?;
        surface.pixels.render().map_err(backend)?;
        Frame {
            pixels: surface.pixels.frame_mut(),
            width: surface.width,
            height: surface.height,
        }
        .clear(self.background);
        Ok(())
    }

    fn screen_size(&self) -> Vec2 {
        self.screen_size
    }

    fn close_window(&mut self) {
        if let Some(surface) = self.surface.take() {
            // The window itself is leaked; hiding it is the closest to closing.
            surface.window.set_visible(false);
            tracing::info!("Closed window");
        }
    }
}

impl EventSource for DesktopPlatform {
    fn poll_events(&mut self) -> Vec<Event> {
        let mut raw = Vec::new();
        let status = self
            .event_loop
            .pump_events(Some(Duration::ZERO), |event, _target| {
                if let WinitEvent::WindowEvent { event, .. } = event {
                    raw.push(event);
                }
            });

        for event in raw {
            self.translate(event);
        }
        if let PumpStatus::Exit(code) = status {
            tracing::debug!("Event loop exited with code {}", code);
            self.pending.push(Event::CloseRequested);
        }
        std::mem::take(&mut self.pending)
    }
}

pub struct DesktopApp {
    config: RuntimeConfig,
}

impl Default for DesktopApp {
    fn default() -> Self {
        Self::new()
    }
}

impl DesktopApp {
    pub fn new() -> Self {
        Self {
            config: RuntimeConfig::default(),
        }
    }

    pub fn with_config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_title(mut self, title: &str) -> Self {
        self.config = self.config.with_title(title);
        self
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Opens the window, activates `initial` and runs until the window closes
    /// or `frames` frames have been shown.
    pub fn run(self, initial: Box<dyn Scene>, frames: Option<u64>) -> Result<Runtime, DesktopError> {
        self.config.validate()?;
        let mut platform = DesktopPlatform::new(&self.config)?;
        let mut runtime = Runtime::new(self.config);
        runtime.start(&mut platform, initial)?;
        runtime.run_frames(&mut platform, frames)?;
        Ok(runtime)
    }
}

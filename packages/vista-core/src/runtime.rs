use crate::commands::{Command, Commands};
use crate::config::RuntimeConfig;
use crate::error::RuntimeError;
use crate::events::{Dispatcher, Event, EventKind, ListenerId, NoTarget};
use crate::render::{EventSource, Renderer};
use crate::scene::{FrameInfo, Scene, SceneManager};
use std::time::Instant;

#[derive(Default, Debug, Clone)]
pub struct Profiling {
    pub frames: u64,
    pub events_dispatched: u64,
    pub listener_invocations: u64,
    pub scene_switches: u64,
}

/// Timestamps of the two most recently presented frames.
#[derive(Debug, Default, Clone, Copy)]
pub struct FrameClock {
    previous: Option<Instant>,
    last: Option<Instant>,
}

impl FrameClock {
    pub fn tick(&mut self) {
        self.tick_at(Instant::now());
    }

    pub fn tick_at(&mut self, now: Instant) {
        self.previous = self.last;
        self.last = Some(now);
    }

    /// Zero until two frames have been presented.
    pub fn delta(&self) -> f32 {
        match (self.previous, self.last) {
            (Some(previous), Some(last)) => last.duration_since(previous).as_secs_f32(),
            _ => 0.0,
        }
    }
}

/// Owns everything one running application needs: the listener registry,
/// the current scene and the deferred command queue.
pub struct Runtime {
    pub dispatcher: Dispatcher,
    pub scenes: SceneManager,
    commands: Commands,
    config: RuntimeConfig,
    open: bool,
    close_listener: Option<ListenerId>,
    clock: FrameClock,
    pub profiling: Profiling,
}

impl Runtime {
    pub fn new(config: RuntimeConfig) -> Self {
        Self {
            dispatcher: Dispatcher::new(),
            scenes: SceneManager::new(),
            commands: Commands::new(),
            config,
            open: false,
            close_listener: None,
            clock: FrameClock::default(),
            profiling: Profiling::default(),
        }
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn delta(&self) -> f32 {
        self.clock.delta()
    }

    /// Opens the window, maps close requests to [`Runtime::stop_game`] and
    /// activates `initial`.
    pub fn start(&mut self, renderer: &mut dyn Renderer, initial: Box<dyn Scene>) -> Result<(), RuntimeError> {
        tracing::info!(
            "Runtime::start opening {}x{} window \"{}\"",
            self.config.window.width,
            self.config.window.height,
            self.config.window.title
        );
        renderer.open_window(&self.config.window)?;

        if self.close_listener.is_none() {
            let id = self
                .dispatcher
                .register_callback(EventKind::CloseRequested, |_, commands| commands.stop_game());
            self.close_listener = Some(id);
        }

        self.open = true;
        self.switch_scene(initial)?;
        Ok(())
    }

    pub fn switch_scene(&mut self, scene: Box<dyn Scene>) -> Result<(), RuntimeError> {
        self.scenes.switch(scene, &mut self.dispatcher)?;
        self.profiling.scene_switches += 1;
        Ok(())
    }

    pub fn switch_scene_by_type<T: Scene + Default>(&mut self) -> Result<(), RuntimeError> {
        self.switch_scene(Box::new(T::default()))
    }

    pub fn switch_to_registered(&mut self, name: &str) -> Result<(), RuntimeError> {
        self.scenes.switch_to_registered(name, &mut self.dispatcher)?;
        self.profiling.scene_switches += 1;
        Ok(())
    }

    /// Unloads the current scene and marks the window for closing. Calling it
    /// again is harmless.
    pub fn stop_game(&mut self) -> Result<(), RuntimeError> {
        if self.scenes.has_current() {
            self.scenes.unload_current(&mut self.dispatcher)?;
        }
        if self.open {
            tracing::info!("Stopping after {} frame(s)", self.profiling.frames);
        }
        self.open = false;
        Ok(())
    }

    /// One frame: advance and draw the current scene, broadcast polled
    /// events, then present.
    pub fn tick<P: Renderer + EventSource>(&mut self, platform: &mut P) -> Result<(), RuntimeError> {
        if !self.open {
            return Err(RuntimeError::NotStarted);
        }

        let frame = FrameInfo {
            delta: self.clock.delta(),
            frame: self.profiling.frames,
            screen_size: platform.screen_size(),
        };
        let scene = self.scenes.current_mut()?;
        scene.on_frame(&frame);
        scene.draw(&mut *platform)?;

        let events = platform.poll_events();
        self.broadcast(events)?;

        if self.open {
            platform.present()?;
            self.clock.tick();
            self.profiling.frames += 1;
        }
        Ok(())
    }

    /// Dispatches each event against the scene current at that moment and
    /// applies the resulting commands before moving to the next event.
    pub fn broadcast(&mut self, events: impl IntoIterator<Item = Event>) -> Result<usize, RuntimeError> {
        let mut invoked = 0;
        for event in events {
            let count = match self.scenes.current_opt_mut() {
                Some(scene) => self
                    .dispatcher
                    .dispatch(&event, scene.gui_mut(), &mut self.commands),
                None => self
                    .dispatcher
                    .dispatch(&event, &mut NoTarget, &mut self.commands),
            };
            invoked += count;
            self.profiling.events_dispatched += 1;
            self.profiling.listener_invocations += count as u64;
            self.apply_commands()?;
        }
        Ok(invoked)
    }

    /// Drains the command queue in FIFO order. Commands pushed while applying
    /// are drained too.
    pub fn apply_commands(&mut self) -> Result<(), RuntimeError> {
        while let Some(command) = self.commands.pop() {
            tracing::debug!("Applying {:?}", command);
            match command {
                Command::SwitchScene(scene) => self.switch_scene(scene)?,
                Command::SwitchSceneWith(build) => self.switch_scene(build())?,
                Command::SwitchToRegistered(name) => self.switch_to_registered(&name)?,
                Command::StopGame => self.stop_game()?,
                Command::Deregister(id) => {
                    self.dispatcher.deregister(id);
                }
                Command::Run(f) => f(self)?,
            }
        }
        Ok(())
    }

    /// Queues a command as if a listener had pushed it.
    pub fn commands(&mut self) -> &mut Commands {
        &mut self.commands
    }

    /// Ticks until the window closes, then releases it.
    pub fn run<P: Renderer + EventSource>(&mut self, platform: &mut P) -> Result<(), RuntimeError> {
        self.run_frames(platform, None)
    }

    /// Like [`Runtime::run`] but stops after `limit` frames when given.
    pub fn run_frames<P: Renderer + EventSource>(
        &mut self,
        platform: &mut P,
        limit: Option<u64>,
    ) -> Result<(), RuntimeError> {
        let mut result = Ok(());
        let mut frames = 0u64;
        while self.open && limit.is_none_or(|limit| frames < limit) {
            if let Err(err) = self.tick(platform) {
                result = Err(err);
                break;
            }
            frames += 1;
        }

        if self.open {
            // Frame limit reached while still running.
            self.stop_game()?;
        }
        platform.close_window();
        tracing::info!(
            "Runtime finished: {} frame(s), {} event(s), {} scene switch(es)",
            self.profiling.frames,
            self.profiling.events_dispatched,
            self.profiling.scene_switches
        );
        result
    }
}

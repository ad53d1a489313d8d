// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! The engine: three pipelines, their settings and the main loop.

use crate::config::EngineConfig;
use crate::headless::HeadlessBackend;
use crate::null::{NullAudio, NullPhysicsWorld, NullUi};
use anyhow::{Context, Result};
use quasar_control::{bind_settings, PhysicsLoop, Pipeline, SharedPipeline};
use quasar_core::audio::AudioSystem;
use quasar_core::dispatch::DispatcherHandle;
use quasar_core::event::MessageSender;
use quasar_core::physics::PhysicsWorld;
use quasar_core::renderer::{CommandProcessor, RenderBackend, RenderCommandQueue};
use quasar_core::scene::{EmptyScene, SceneSource};
use quasar_core::service_registry::StageRegistry;
use quasar_core::settings::{
    PhysicsSettings, RenderSettings, SettingsService, SubscriptionId, UpdateSettings,
};
use quasar_core::ui::{UiEventSink, UiRenderer};
use quasar_core::{
    FrameStats, PhysicsContext, PipelineContext, RenderingContext, Stage, UpdateContext,
};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

/// A snapshot of what the engine has done so far.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineStats {
    /// Ticks completed.
    pub ticks: u64,
    /// Statistics of the last presented frame.
    pub last_frame: FrameStats,
    /// Physics steps completed.
    pub physics_steps: u64,
    /// Physics steps that failed.
    pub physics_faults: u64,
}

/// Assembles an [`Engine`].
///
/// Every collaborator is optional: the defaults are an empty scene, a
/// [`HeadlessBackend`] and the null UI, audio and physics world.
pub struct EngineBuilder {
    config: EngineConfig,
    registry: StageRegistry,
    scene: Arc<dyn SceneSource>,
    commands: Option<Arc<dyn RenderCommandQueue>>,
    ui_events: Box<dyn UiEventSink>,
    ui_renderer: Arc<dyn UiRenderer>,
    audio: Box<dyn AudioSystem>,
    physics_world: Box<dyn PhysicsWorld>,
}

impl EngineBuilder {
    /// Starts from the default configuration and the built-in stages.
    pub fn new() -> Self {
        let mut registry = StageRegistry::new();
        quasar_stages::register_default_stages(&mut registry);
        Self::with_registry(registry)
    }

    /// Starts from the default configuration and the given stages only.
    pub fn with_registry(registry: StageRegistry) -> Self {
        Self {
            config: EngineConfig::default(),
            registry,
            scene: Arc::new(EmptyScene),
            commands: None,
            ui_events: Box::new(NullUi),
            ui_renderer: Arc::new(NullUi),
            audio: Box::new(NullAudio),
            physics_world: Box::new(NullPhysicsWorld),
        }
    }

    /// Sets the initial settings.
    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Adds a stage to the pipeline over context `C`.
    pub fn stage<C, S>(mut self, factory: impl Fn() -> S + Send + Sync + 'static) -> Self
    where
        C: PipelineContext,
        S: Stage<C> + 'static,
    {
        self.registry.register::<C, S>(factory);
        self
    }

    /// Sets the scene to draw.
    pub fn scene(mut self, scene: Arc<dyn SceneSource>) -> Self {
        self.scene = scene;
        self
    }

    /// Sets the graphics backend.
    pub fn backend<B: RenderBackend + 'static>(mut self, backend: B) -> Self {
        self.commands = Some(Arc::new(CommandProcessor::new(backend)));
        self
    }

    /// Sets the UI input handler.
    pub fn ui_events(mut self, ui: Box<dyn UiEventSink>) -> Self {
        self.ui_events = ui;
        self
    }

    /// Sets the UI renderer.
    pub fn ui_renderer(mut self, ui: Arc<dyn UiRenderer>) -> Self {
        self.ui_renderer = ui;
        self
    }

    /// Sets the audio subsystem.
    pub fn audio(mut self, audio: Box<dyn AudioSystem>) -> Self {
        self.audio = audio;
        self
    }

    /// Sets the physics world.
    pub fn physics_world(mut self, world: Box<dyn PhysicsWorld>) -> Self {
        self.physics_world = world;
        self
    }

    /// Starts the pipelines and the physics thread.
    ///
    /// # Errors
    ///
    /// Fails if a pipeline cannot start (dependency cycle, duplicate stage,
    /// failing stage) or the physics thread cannot be spawned. Pipelines
    /// already started are shut down again.
    pub fn build(self) -> Result<Engine> {
        let EngineConfig {
            update: update_settings,
            rendering: render_settings,
            physics: physics_settings,
        } = self.config;
        let registry = Arc::new(self.registry);
        let commands = self
            .commands
            .unwrap_or_else(|| Arc::new(CommandProcessor::new(HeadlessBackend::new())));

        let update_context = UpdateContext::new(update_settings.clone())
            .with_ui(self.ui_events)
            .with_audio(self.audio);
        let messages = update_context.messages.sender();
        let dispatcher = update_context.dispatcher.handle();
        let rendering_context =
            RenderingContext::new(Arc::clone(&commands), self.scene, render_settings.clone())
                .with_ui(self.ui_renderer);
        let physics_context =
            PhysicsContext::new(physics_settings.clone()).with_world(self.physics_world);

        let update = Pipeline::new(registry.clone()).into_shared();
        let rendering = Pipeline::new(registry.clone()).into_shared();
        let physics_pipeline = Pipeline::new(registry).into_shared();

        lock(&update)
            .start(update_context)
            .context("Failed to start the update pipeline")?;
        if let Err(e) = lock(&rendering).start(rendering_context) {
            shutdown_quietly(&update);
            return Err(e).context("Failed to start the rendering pipeline");
        }
        if let Err(e) = lock(&physics_pipeline).start(physics_context) {
            shutdown_quietly(&rendering);
            shutdown_quietly(&update);
            return Err(e).context("Failed to start the physics pipeline");
        }

        let mut physics = PhysicsLoop::new(physics_pipeline, &physics_settings);
        if let Err(e) = physics.start() {
            shutdown_quietly(physics.pipeline());
            shutdown_quietly(&rendering);
            shutdown_quietly(&update);
            return Err(e).context("Failed to spawn the physics thread");
        }

        let update_settings = Arc::new(SettingsService::new(update_settings));
        let render_settings = Arc::new(SettingsService::new(render_settings));
        let physics_settings = Arc::new(SettingsService::new(physics_settings));
        let subscriptions = Subscriptions {
            update: bind_settings(&update, &update_settings),
            rendering: bind_settings(&rendering, &render_settings),
            physics: physics.bind(&physics_settings),
        };

        log::info!("Engine started.");
        Ok(Engine {
            update,
            rendering,
            physics,
            update_settings,
            render_settings,
            physics_settings,
            subscriptions,
            messages,
            dispatcher,
            commands,
            last_tick: None,
            ticks: 0,
            running: true,
        })
    }
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

struct Subscriptions {
    update: SubscriptionId,
    rendering: SubscriptionId,
    physics: SubscriptionId,
}

/// A running engine.
///
/// The update and rendering pipelines run on the thread calling
/// [`tick`](Self::tick); the physics pipeline runs on its own timer thread.
pub struct Engine {
    update: SharedPipeline<UpdateContext>,
    rendering: SharedPipeline<RenderingContext>,
    physics: PhysicsLoop,
    update_settings: Arc<SettingsService<UpdateSettings>>,
    render_settings: Arc<SettingsService<RenderSettings>>,
    physics_settings: Arc<SettingsService<PhysicsSettings>>,
    subscriptions: Subscriptions,
    messages: MessageSender,
    dispatcher: DispatcherHandle,
    commands: Arc<dyn RenderCommandQueue>,
    last_tick: Option<Instant>,
    ticks: u64,
    running: bool,
}

impl Engine {
    /// Shorthand for [`EngineBuilder::new`].
    pub fn builder() -> EngineBuilder {
        EngineBuilder::new()
    }

    /// Runs the update pipeline, then the rendering pipeline.
    ///
    /// Returns `false` once the platform has asked to close.
    pub fn tick(&mut self) -> Result<bool> {
        if !self.running {
            anyhow::bail!("Engine is shut down");
        }

        let now = Instant::now();
        let delta_time = self.last_tick.map_or(Duration::ZERO, |last| now - last);
        self.last_tick = Some(now);

        let exit_requested = {
            let mut update = lock(&self.update);
            if let Some(ctx) = update.context_mut() {
                ctx.delta_time = delta_time;
                ctx.frame = self.ticks;
            }
            update.execute().context("Update pipeline failed")?;
            update.context().is_some_and(|ctx| ctx.exit_requested)
        };
        lock(&self.rendering)
            .execute()
            .context("Rendering pipeline failed")?;

        self.ticks += 1;
        Ok(!exit_requested)
    }

    /// Ticks until the platform asks to close or `max_ticks` is reached.
    ///
    /// Returns the number of ticks run.
    pub fn run(&mut self, max_ticks: Option<u64>) -> Result<u64> {
        let mut ran = 0;
        while max_ticks.map_or(true, |max| ran < max) {
            ran += 1;
            if !self.tick()? {
                log::info!("Exit requested after {ran} tick(s).");
                break;
            }
        }
        Ok(ran)
    }

    /// A handle for posting platform messages from any thread.
    pub fn message_sender(&self) -> MessageSender {
        self.messages.clone()
    }

    /// A handle for posting tasks to run on the main thread.
    pub fn dispatcher(&self) -> DispatcherHandle {
        self.dispatcher.clone()
    }

    /// The update pipeline's settings.
    pub fn update_settings(&self) -> Arc<SettingsService<UpdateSettings>> {
        Arc::clone(&self.update_settings)
    }

    /// The rendering pipeline's settings.
    pub fn render_settings(&self) -> Arc<SettingsService<RenderSettings>> {
        Arc::clone(&self.render_settings)
    }

    /// The physics pipeline's settings.
    pub fn physics_settings(&self) -> Arc<SettingsService<PhysicsSettings>> {
        Arc::clone(&self.physics_settings)
    }

    /// The render command queue, for producers outside the rendering pipeline.
    pub fn commands(&self) -> Arc<dyn RenderCommandQueue> {
        Arc::clone(&self.commands)
    }

    /// Current statistics.
    pub fn stats(&self) -> EngineStats {
        let last_frame = lock(&self.rendering)
            .context()
            .map(|ctx| ctx.last_frame)
            .unwrap_or_default();
        EngineStats {
            ticks: self.ticks,
            last_frame,
            physics_steps: self.physics.tick_count(),
            physics_faults: self.physics.fault_count(),
        }
    }

    /// Stops the physics thread and shuts the pipelines down, physics first
    /// and update last.
    ///
    /// Every pipeline is shut down even if one fails; the first failure is
    /// returned. Calling it again does nothing.
    pub fn shutdown(&mut self) -> Result<()> {
        if !self.running {
            return Ok(());
        }
        self.running = false;

        self.update_settings.unsubscribe(self.subscriptions.update);
        self.render_settings.unsubscribe(self.subscriptions.rendering);
        self.physics_settings.unsubscribe(self.subscriptions.physics);
        self.physics.stop();

        let physics = lock(self.physics.pipeline())
            .shutdown()
            .map(drop)
            .context("Failed to shut down the physics pipeline");
        let rendering = lock(&self.rendering)
            .shutdown()
            .map(drop)
            .context("Failed to shut down the rendering pipeline");
        let update = lock(&self.update)
            .shutdown()
            .map(drop)
            .context("Failed to shut down the update pipeline");

        log::info!("Engine shut down after {} tick(s).", self.ticks);
        physics.and(rendering).and(update)
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        if let Err(e) = self.shutdown() {
            log::error!("{e:#}");
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn shutdown_quietly<C: PipelineContext>(pipeline: &SharedPipeline<C>) {
    if let Err(e) = lock(pipeline).shutdown() {
        log::warn!("{e}");
    }
}

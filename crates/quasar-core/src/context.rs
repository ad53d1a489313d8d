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

//! The shared contexts of the update, rendering and physics pipelines.
//!
//! Each context is built once by the engine, handed to its pipeline at start
//! and lent to every stage of that pipeline. Stages communicate only through
//! the context: the message pump fills `frame_messages` for the UI stage,
//! scene submission fills `layers` for nothing but itself, the frame swap
//! records `stats` for the debug overlay of the next frame, and so on.

use crate::audio::AudioSystem;
use crate::dispatch::{DispatchReport, Dispatcher};
use crate::event::{MessageBus, PlatformMessage};
use crate::physics::PhysicsWorld;
use crate::renderer::{BatchStats, FrameBufferId, RenderCommandQueue, RenderLayers};
use crate::scene::SceneSource;
use crate::settings::{PhysicsSettings, RenderSettings, UpdateSettings};
use crate::stage::{PipelineContext, PipelineKind};
use crate::ui::{UiEventSink, UiRenderer};
use std::sync::Arc;
use std::time::Duration;

/// Context of the update pipeline.
pub struct UpdateContext {
    /// Incoming platform messages.
    pub messages: MessageBus,
    /// Messages pumped during the current tick.
    pub frame_messages: Vec<PlatformMessage>,
    /// Tasks to run on the main thread.
    pub dispatcher: Dispatcher,
    /// Outcome of the last dispatcher run.
    pub last_dispatch: DispatchReport,
    /// The UI input handler, if any.
    pub ui: Option<Box<dyn UiEventSink>>,
    /// Input events consumed by the UI during the current tick.
    pub consumed_ui_events: usize,
    /// The audio subsystem, if any.
    pub audio: Option<Box<dyn AudioSystem>>,
    /// Time elapsed since the previous tick.
    pub delta_time: Duration,
    /// Index of the current tick.
    pub frame: u64,
    /// Set when the platform asked the application to close.
    pub exit_requested: bool,
    settings: UpdateSettings,
}

impl UpdateContext {
    /// Creates a context with a fresh message bus and dispatcher.
    pub fn new(settings: UpdateSettings) -> Self {
        Self {
            messages: MessageBus::new(),
            frame_messages: Vec::new(),
            dispatcher: Dispatcher::new(),
            last_dispatch: DispatchReport::default(),
            ui: None,
            consumed_ui_events: 0,
            audio: None,
            delta_time: Duration::ZERO,
            frame: 0,
            exit_requested: false,
            settings,
        }
    }

    /// Attaches a UI input handler.
    pub fn with_ui(mut self, ui: Box<dyn UiEventSink>) -> Self {
        self.ui = Some(ui);
        self
    }

    /// Attaches an audio subsystem.
    pub fn with_audio(mut self, audio: Box<dyn AudioSystem>) -> Self {
        self.audio = Some(audio);
        self
    }
}

impl PipelineContext for UpdateContext {
    type Settings = UpdateSettings;
    const KIND: PipelineKind = PipelineKind::Update;

    fn settings(&self) -> &UpdateSettings {
        &self.settings
    }

    fn set_settings(&mut self, settings: UpdateSettings) {
        self.settings = settings;
    }
}

/// What the rendering pipeline produced for one frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Index of the frame.
    pub frame: u64,
    /// Cameras drawn.
    pub cameras: usize,
    /// Batch statistics, summed over cameras.
    pub batches: BatchStats,
    /// Commands dispatched to the backend.
    pub commands: usize,
}

/// Context of the rendering pipeline.
pub struct RenderingContext {
    /// The command queue shared with the graphics backend.
    pub commands: Arc<dyn RenderCommandQueue>,
    /// The batch registry, rebuilt per camera.
    pub layers: RenderLayers,
    /// The scene to draw.
    pub scene: Arc<dyn SceneSource>,
    /// The frame buffer presented at the end of the frame.
    pub frame_buffer: FrameBufferId,
    /// The UI renderer, if any.
    pub ui: Option<Arc<dyn UiRenderer>>,
    /// Statistics of the frame being built.
    pub current: FrameStats,
    /// Statistics of the last presented frame.
    pub last_frame: FrameStats,
    settings: RenderSettings,
}

impl RenderingContext {
    /// Creates a context drawing `scene` through `commands` into the primary frame buffer.
    pub fn new(
        commands: Arc<dyn RenderCommandQueue>,
        scene: Arc<dyn SceneSource>,
        settings: RenderSettings,
    ) -> Self {
        Self {
            commands,
            layers: RenderLayers::new(),
            scene,
            frame_buffer: FrameBufferId::PRIMARY,
            ui: None,
            current: FrameStats::default(),
            last_frame: FrameStats::default(),
            settings,
        }
    }

    /// Attaches a UI renderer.
    pub fn with_ui(mut self, ui: Arc<dyn UiRenderer>) -> Self {
        self.ui = Some(ui);
        self
    }
}

impl PipelineContext for RenderingContext {
    type Settings = RenderSettings;
    const KIND: PipelineKind = PipelineKind::Rendering;

    fn settings(&self) -> &RenderSettings {
        &self.settings
    }

    fn set_settings(&mut self, settings: RenderSettings) {
        self.settings = settings;
    }
}

/// Context of the physics pipeline.
pub struct PhysicsContext {
    /// The simulated world, if any.
    pub world: Option<Box<dyn PhysicsWorld>>,
    /// Steps taken since start.
    pub steps: u64,
    /// Simulated time since start.
    pub simulated: Duration,
    settings: PhysicsSettings,
}

impl PhysicsContext {
    /// Creates a context without a world.
    pub fn new(settings: PhysicsSettings) -> Self {
        Self {
            world: None,
            steps: 0,
            simulated: Duration::ZERO,
            settings,
        }
    }

    /// Attaches the world to simulate.
    pub fn with_world(mut self, world: Box<dyn PhysicsWorld>) -> Self {
        self.world = Some(world);
        self
    }
}

impl PipelineContext for PhysicsContext {
    type Settings = PhysicsSettings;
    const KIND: PipelineKind = PipelineKind::Physics;

    fn settings(&self) -> &PhysicsSettings {
        &self.settings
    }

    fn set_settings(&mut self, settings: PhysicsSettings) {
        self.settings = settings;
    }
}

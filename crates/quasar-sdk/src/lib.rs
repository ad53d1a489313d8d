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

//! The public-facing Software Development Kit (SDK) for the Quasar engine.
//! This crate provides a simple and stable API for building, configuring and
//! running an engine and for plugging custom stages into its pipelines.

#![warn(missing_docs)]

mod config;
mod engine;
mod headless;
mod null;

pub use config::EngineConfig;
pub use engine::{Engine, EngineBuilder, EngineStats};
pub use headless::{BackendStats, HeadlessBackend, HeadlessStats};
pub use null::{NullAudio, NullPhysicsWorld, NullUi};

/// Everything needed to write an application and its own stages.
pub mod prelude {
    pub use crate::{Engine, EngineBuilder, EngineConfig, HeadlessBackend};
    pub use quasar_core::event::{InputEvent, PlatformMessage};
    pub use quasar_core::renderer::{
        CameraId, LayerMask, MeshId, ModelId, RenderLayer, ShaderHandle, UiQuad, Viewport,
    };
    pub use quasar_core::scene::{Camera, RenderModel, SceneModel, SceneSource};
    pub use quasar_core::settings::{PhysicsSettings, RenderSettings, UpdateSettings};
    pub use quasar_core::{
        PhysicsContext, PipelineContext, RenderingContext, Stage, StageError, StageId,
        UpdateContext,
    };
    pub use quasar_stages::{
        AudioStage, ClearFrameStage, DebugOverlayStage, DispatcherStage, FrameSwapStage,
        MessagePumpStage, PhysicsStepStage, SceneSubmissionStage, UiDrawStage, UiEventsStage,
    };
}

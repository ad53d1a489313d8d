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

//! # Quasar Stages
//!
//! The built-in stages of the update, rendering and physics pipelines.
//! Each stage declares where it runs relative to the others; the pipeline
//! orders them when it starts.

#![warn(missing_docs)]

pub mod physics_stage;
pub mod render_stage;
pub mod update_stage;

use quasar_core::service_registry::StageRegistry;
use quasar_core::{PhysicsContext, RenderingContext, UpdateContext};

pub use physics_stage::PhysicsStepStage;
pub use render_stage::{
    ClearFrameStage, DebugOverlayStage, FrameSwapStage, SceneSubmissionStage, UiDrawStage,
};
pub use update_stage::{AudioStage, DispatcherStage, MessagePumpStage, UiEventsStage};

/// Registers every built-in stage of the three pipelines.
pub fn register_default_stages(registry: &mut StageRegistry) {
    registry.register::<UpdateContext, _>(MessagePumpStage::default);
    registry.register::<UpdateContext, _>(DispatcherStage::default);
    registry.register::<UpdateContext, _>(UiEventsStage::default);
    registry.register::<UpdateContext, _>(AudioStage::default);

    registry.register::<RenderingContext, _>(ClearFrameStage::default);
    registry.register::<RenderingContext, _>(SceneSubmissionStage::default);
    registry.register::<RenderingContext, _>(UiDrawStage::default);
    registry.register::<RenderingContext, _>(DebugOverlayStage::default);
    registry.register::<RenderingContext, _>(FrameSwapStage::default);

    registry.register::<PhysicsContext, _>(PhysicsStepStage::default);
}

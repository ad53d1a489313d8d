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

//! # Quasar Core
//!
//! Foundational crate containing the pipeline contracts, core types and the
//! data structures shared by every pipeline: the dependency graph used to
//! order stages, the rendering batch registry and the render command queue.

#![warn(missing_docs)]

pub mod audio;
pub mod context;
pub mod dispatch;
pub mod event;
pub mod graph;
pub mod physics;
pub mod renderer;
pub mod scene;
pub mod service_registry;
pub mod settings;
pub mod stage;
pub mod ui;

pub use context::{FrameStats, PhysicsContext, RenderingContext, UpdateContext};
pub use stage::{PipelineContext, PipelineKind, Stage, StageError, StageId, StagePhase};

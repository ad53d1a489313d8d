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

//! # Quasar Control
//!
//! Runs pipelines: orders their stages from the declared `after`/`before`
//! relations, drives the start/execute/shutdown lifecycle, forwards settings
//! changes, and ticks the physics pipeline from its own timer thread.

#![warn(missing_docs)]

pub mod binding;
pub mod error;
pub mod ordering;
pub mod physics_loop;
pub mod pipeline;

pub use binding::{bind_settings, SettingsBinding, SettingsMailbox};
pub use error::PipelineError;
pub use ordering::resolve_stage_order;
pub use physics_loop::{PhysicsLoop, PhysicsTimerBinding};
pub use pipeline::{Pipeline, PipelineState, SharedPipeline};

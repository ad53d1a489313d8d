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

//! Settings consumed by the three engine pipelines.

use crate::renderer::LayerMask;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Settings of the update pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpdateSettings {
    /// Time budget, in milliseconds, for running dispatched tasks each tick.
    /// Tasks still queued when the budget runs out wait for the next tick.
    pub dispatcher_budget_ms: u64,
}

impl UpdateSettings {
    /// The dispatcher budget as a [`Duration`].
    pub fn dispatcher_budget(&self) -> Duration {
        Duration::from_millis(self.dispatcher_budget_ms)
    }
}

impl Default for UpdateSettings {
    fn default() -> Self {
        Self {
            dispatcher_budget_ms: 4,
        }
    }
}

/// Settings of the rendering pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    /// Linear RGBA color the frame buffer is cleared to.
    pub clear_color: [f32; 4],
    /// Layers drawn by scene submission, intersected with each camera's own mask.
    pub scene_layers: LayerMask,
    /// If `true`, frame statistics are drawn on top of the frame.
    pub debug_overlay: bool,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            clear_color: [0.05, 0.05, 0.08, 1.0],
            scene_layers: LayerMask::ALL,
            debug_overlay: false,
        }
    }
}

/// Settings of the physics pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsSettings {
    /// Fixed interval between two physics steps, in milliseconds.
    pub time_step_ms: u64,
    /// If `false`, the physics timer stays disabled.
    pub enabled: bool,
}

impl PhysicsSettings {
    /// The fixed step as a [`Duration`], never shorter than one millisecond.
    pub fn time_step(&self) -> Duration {
        Duration::from_millis(self.time_step_ms.max(1))
    }
}

impl Default for PhysicsSettings {
    fn default() -> Self {
        Self {
            time_step_ms: 16,
            enabled: true,
        }
    }
}

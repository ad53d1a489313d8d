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

//! Physics pipeline stages.

use quasar_core::settings::PhysicsSettings;
use quasar_core::{PhysicsContext, PipelineContext, Stage, StageError, StageId};

/// Steps the physics world by the configured fixed time step.
///
/// Without a world the step is still counted, so simulated time keeps
/// advancing at the timer's rate.
#[derive(Debug, Default)]
pub struct PhysicsStepStage;

impl PhysicsStepStage {
    /// Stage id.
    pub const ID: StageId = StageId::new("physics.step");
}

impl Stage<PhysicsContext> for PhysicsStepStage {
    fn id(&self) -> StageId {
        Self::ID
    }

    fn on_execute(&mut self, ctx: &mut PhysicsContext) -> Result<(), StageError> {
        let step = ctx.settings().time_step();
        if let Some(world) = ctx.world.as_mut() {
            world.step(step)?;
        }
        ctx.steps += 1;
        ctx.simulated += step;
        Ok(())
    }

    fn on_settings_changed(&mut self, settings: &PhysicsSettings) {
        log::debug!("Physics step set to {:?}", settings.time_step());
    }
}

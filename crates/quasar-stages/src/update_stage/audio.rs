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

use super::{DispatcherStage, UiEventsStage};
use quasar_core::{Stage, StageError, StageId, UpdateContext};

/// Advances the audio subsystem by the tick's delta time.
#[derive(Debug, Default)]
pub struct AudioStage;

impl AudioStage {
    /// Stage id.
    pub const ID: StageId = StageId::new("update.audio");
}

impl Stage<UpdateContext> for AudioStage {
    fn id(&self) -> StageId {
        Self::ID
    }

    fn execute_after(&self) -> &'static [StageId] {
        &[DispatcherStage::ID, UiEventsStage::ID]
    }

    fn on_execute(&mut self, ctx: &mut UpdateContext) -> Result<(), StageError> {
        let delta_time = ctx.delta_time;
        match ctx.audio.as_mut() {
            Some(audio) => audio.update(delta_time),
            None => Ok(()),
        }
    }
}

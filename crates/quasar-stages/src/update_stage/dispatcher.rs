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

use super::MessagePumpStage;
use quasar_core::{PipelineContext, Stage, StageError, StageId, UpdateContext};

/// Runs the tasks posted to the main-thread dispatcher, within the budget of
/// [`UpdateSettings::dispatcher_budget_ms`](quasar_core::settings::UpdateSettings).
///
/// Tasks left over when the budget runs out wait for the next tick.
#[derive(Debug, Default)]
pub struct DispatcherStage;

impl DispatcherStage {
    /// Stage id.
    pub const ID: StageId = StageId::new("update.dispatcher");
}

impl Stage<UpdateContext> for DispatcherStage {
    fn id(&self) -> StageId {
        Self::ID
    }

    fn execute_after(&self) -> &'static [StageId] {
        &[MessagePumpStage::ID]
    }

    fn on_execute(&mut self, ctx: &mut UpdateContext) -> Result<(), StageError> {
        let budget = ctx.settings().dispatcher_budget();
        ctx.last_dispatch = ctx.dispatcher.run_pending(budget);
        Ok(())
    }
}

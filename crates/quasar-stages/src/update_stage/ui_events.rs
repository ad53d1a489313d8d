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

use super::{DispatcherStage, MessagePumpStage};
use quasar_core::event::PlatformMessage;
use quasar_core::{Stage, StageError, StageId, UpdateContext};

/// Forwards this tick's input events to the UI.
#[derive(Debug, Default)]
pub struct UiEventsStage;

impl UiEventsStage {
    /// Stage id.
    pub const ID: StageId = StageId::new("update.ui_events");
}

impl Stage<UpdateContext> for UiEventsStage {
    fn id(&self) -> StageId {
        Self::ID
    }

    fn execute_after(&self) -> &'static [StageId] {
        &[MessagePumpStage::ID, DispatcherStage::ID]
    }

    fn on_execute(&mut self, ctx: &mut UpdateContext) -> Result<(), StageError> {
        ctx.consumed_ui_events = 0;
        let Some(ui) = ctx.ui.as_mut() else {
            return Ok(());
        };

        let mut consumed = 0;
        for message in &ctx.frame_messages {
            if let PlatformMessage::Input(event) = message {
                if ui.handle_event(event) {
                    consumed += 1;
                }
            }
        }
        ctx.consumed_ui_events = consumed;
        Ok(())
    }
}

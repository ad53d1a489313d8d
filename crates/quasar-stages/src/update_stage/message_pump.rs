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

use quasar_core::event::PlatformMessage;
use quasar_core::{Stage, StageError, StageId, UpdateContext};

/// Moves the platform messages posted since the last tick into
/// [`UpdateContext::frame_messages`].
#[derive(Debug, Default)]
pub struct MessagePumpStage;

impl MessagePumpStage {
    /// Stage id.
    pub const ID: StageId = StageId::new("update.message_pump");
}

impl Stage<UpdateContext> for MessagePumpStage {
    fn id(&self) -> StageId {
        Self::ID
    }

    fn on_execute(&mut self, ctx: &mut UpdateContext) -> Result<(), StageError> {
        ctx.frame_messages.clear();
        let pumped = ctx.messages.drain_into(&mut ctx.frame_messages);
        if pumped == 0 {
            return Ok(());
        }

        log::trace!("Pumped {pumped} platform message(s)");
        if !ctx.exit_requested
            && ctx
                .frame_messages
                .iter()
                .any(|message| matches!(message, PlatformMessage::CloseRequested))
        {
            log::info!("Close requested by the platform");
            ctx.exit_requested = true;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quasar_core::event::InputEvent;
    use quasar_core::settings::UpdateSettings;

    #[test]
    fn test_pump_replaces_previous_frame() {
        let mut ctx = UpdateContext::new(UpdateSettings::default());
        let mut stage = MessagePumpStage;
        let sender = ctx.messages.sender();

        sender.post(PlatformMessage::FocusChanged(true));
        stage.on_execute(&mut ctx).unwrap();
        assert_eq!(ctx.frame_messages, vec![PlatformMessage::FocusChanged(true)]);

        sender.post(PlatformMessage::Input(InputEvent::KeyDown { code: 4 }));
        stage.on_execute(&mut ctx).unwrap();
        assert_eq!(
            ctx.frame_messages,
            vec![PlatformMessage::Input(InputEvent::KeyDown { code: 4 })]
        );

        stage.on_execute(&mut ctx).unwrap();
        assert!(ctx.frame_messages.is_empty());
    }

    #[test]
    fn test_close_request_sets_exit_flag() {
        let mut ctx = UpdateContext::new(UpdateSettings::default());
        ctx.messages.publish(PlatformMessage::Resized {
            width: 640,
            height: 480,
        });
        ctx.messages.publish(PlatformMessage::CloseRequested);
        MessagePumpStage.on_execute(&mut ctx).unwrap();
        assert!(ctx.exit_requested);
        assert_eq!(ctx.frame_messages.len(), 2);
    }
}

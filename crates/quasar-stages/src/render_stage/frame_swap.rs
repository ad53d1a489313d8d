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

use super::{ClearFrameStage, SceneSubmissionStage};
use quasar_core::renderer::RenderCommand;
use quasar_core::{FrameStats, RenderingContext, Stage, StageError, StageId};

/// Closes the frame: presents the frame buffer and hands every queued command
/// to the backend.
///
/// On success the frame's statistics become [`RenderingContext::last_frame`]
/// and the frame counter advances. A backend failure fails the stage and the
/// frame is not recorded.
#[derive(Debug, Default)]
pub struct FrameSwapStage;

impl FrameSwapStage {
    /// Stage id.
    pub const ID: StageId = StageId::new("render.frame_swap");
}

impl Stage<RenderingContext> for FrameSwapStage {
    fn id(&self) -> StageId {
        Self::ID
    }

    fn execute_after(&self) -> &'static [StageId] {
        &[ClearFrameStage::ID, SceneSubmissionStage::ID]
    }

    fn on_execute(&mut self, ctx: &mut RenderingContext) -> Result<(), StageError> {
        ctx.commands.add(RenderCommand::Present {
            frame_buffer: ctx.frame_buffer,
        });
        let dispatched = ctx.commands.execute_commands()?;

        ctx.current.commands = dispatched;
        ctx.last_frame = ctx.current;
        ctx.current = FrameStats {
            frame: ctx.last_frame.frame + 1,
            ..FrameStats::default()
        };
        log::trace!("Frame {} presented with {dispatched} command(s)", ctx.last_frame.frame);
        Ok(())
    }
}

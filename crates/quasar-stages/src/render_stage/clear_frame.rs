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

use quasar_core::renderer::RenderCommand;
use quasar_core::{PipelineContext, RenderingContext, Stage, StageError, StageId};

/// Depth value every frame starts from.
pub const CLEAR_DEPTH: f32 = 1.0;

/// Opens each frame by clearing the frame buffer.
///
/// On start it also enqueues a backend reset, so the first frame begins from
/// the backend's default state.
#[derive(Debug, Default)]
pub struct ClearFrameStage;

impl ClearFrameStage {
    /// Stage id.
    pub const ID: StageId = StageId::new("render.clear_frame");
}

impl Stage<RenderingContext> for ClearFrameStage {
    fn id(&self) -> StageId {
        Self::ID
    }

    fn on_start(&mut self, ctx: &mut RenderingContext) -> Result<(), StageError> {
        ctx.commands.reset();
        Ok(())
    }

    fn on_execute(&mut self, ctx: &mut RenderingContext) -> Result<(), StageError> {
        ctx.commands.add(RenderCommand::Clear {
            color: ctx.settings().clear_color,
            depth: CLEAR_DEPTH,
        });
        Ok(())
    }
}

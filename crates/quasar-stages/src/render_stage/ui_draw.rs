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

use super::{ClearFrameStage, FrameSwapStage, SceneSubmissionStage};
use quasar_core::renderer::{RenderCommand, UiQuad};
use quasar_core::{RenderingContext, Stage, StageError, StageId};

/// Draws the UI on top of the scene.
#[derive(Debug, Default)]
pub struct UiDrawStage {
    quads: Vec<UiQuad>,
}

impl UiDrawStage {
    /// Stage id.
    pub const ID: StageId = StageId::new("render.ui_draw");
}

impl Stage<RenderingContext> for UiDrawStage {
    fn id(&self) -> StageId {
        Self::ID
    }

    fn execute_after(&self) -> &'static [StageId] {
        &[ClearFrameStage::ID, SceneSubmissionStage::ID]
    }

    fn execute_before(&self) -> &'static [StageId] {
        &[FrameSwapStage::ID]
    }

    fn on_execute(&mut self, ctx: &mut RenderingContext) -> Result<(), StageError> {
        let Some(ui) = ctx.ui.as_ref() else {
            return Ok(());
        };

        // The scratch list keeps its capacity from frame to frame.
        self.quads.clear();
        ui.build_draw_list(&mut self.quads);
        for quad in self.quads.drain(..) {
            ctx.commands.add(RenderCommand::DrawUiQuad(quad));
        }
        Ok(())
    }
}

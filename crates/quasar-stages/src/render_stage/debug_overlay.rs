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

use super::{ClearFrameStage, FrameSwapStage, SceneSubmissionStage, UiDrawStage};
use quasar_core::renderer::RenderCommand;
use quasar_core::{FrameStats, PipelineContext, RenderingContext, Stage, StageError, StageId};

const ORIGIN: [f32; 2] = [8.0, 16.0];
const LINE_HEIGHT: f32 = 16.0;

/// Prints the statistics of the previous frame when
/// [`RenderSettings::debug_overlay`](quasar_core::settings::RenderSettings) is set.
#[derive(Debug, Default)]
pub struct DebugOverlayStage;

impl DebugOverlayStage {
    /// Stage id.
    pub const ID: StageId = StageId::new("render.debug_overlay");
}

impl Stage<RenderingContext> for DebugOverlayStage {
    fn id(&self) -> StageId {
        Self::ID
    }

    fn execute_after(&self) -> &'static [StageId] {
        &[ClearFrameStage::ID, SceneSubmissionStage::ID, UiDrawStage::ID]
    }

    fn execute_before(&self) -> &'static [StageId] {
        &[FrameSwapStage::ID]
    }

    fn on_execute(&mut self, ctx: &mut RenderingContext) -> Result<(), StageError> {
        if !ctx.settings().debug_overlay {
            return Ok(());
        }
        for (line, text) in overlay_lines(&ctx.last_frame).into_iter().enumerate() {
            ctx.commands.add(RenderCommand::DrawDebugText {
                position: [ORIGIN[0], ORIGIN[1] + LINE_HEIGHT * line as f32],
                text,
            });
        }
        Ok(())
    }
}

fn overlay_lines(stats: &FrameStats) -> [String; 3] {
    [
        format!("frame {}", stats.frame),
        format!(
            "cameras {}  batches {}  models {}",
            stats.cameras, stats.batches.active_batches, stats.batches.queued_models
        ),
        format!("commands {}", stats.commands),
    ]
}

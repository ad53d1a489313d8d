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

use super::{ClearFrameStage, UiDrawStage};
use quasar_core::renderer::{
    CullMode, LayerMask, ModelRef, RenderCommand, RenderCommandQueue, RenderLayers,
};
use quasar_core::scene::Camera;
use quasar_core::{PipelineContext, RenderingContext, Stage, StageError, StageId};
use std::sync::Arc;

/// Draws the scene once per camera.
///
/// For each camera the batch registry is rebuilt from the models the scene
/// offers, then submitted layer by layer in ascending layer order. Within a
/// layer, batches are submitted by shader; each batch binds its shader once and
/// draws its single-sided models with back-face culling, then its double-sided
/// models without.
#[derive(Debug, Default)]
pub struct SceneSubmissionStage;

impl SceneSubmissionStage {
    /// Stage id.
    pub const ID: StageId = StageId::new("render.scene_submission");
}

impl Stage<RenderingContext> for SceneSubmissionStage {
    fn id(&self) -> StageId {
        Self::ID
    }

    fn execute_after(&self) -> &'static [StageId] {
        &[ClearFrameStage::ID]
    }

    fn execute_before(&self) -> &'static [StageId] {
        &[UiDrawStage::ID]
    }

    fn on_execute(&mut self, ctx: &mut RenderingContext) -> Result<(), StageError> {
        let scene = Arc::clone(&ctx.scene);
        let scene_layers = ctx.settings().scene_layers;
        let cameras = scene.cameras();

        for camera in &cameras {
            ctx.layers.clear();
            let layers = &mut ctx.layers;
            scene.visit_models(camera, &mut |model| {
                layers.insert_model(model);
            });

            let stats = ctx.layers.stats();
            ctx.current.batches.active_batches += stats.active_batches;
            ctx.current.batches.queued_models += stats.queued_models;

            submit_camera(
                ctx.commands.as_ref(),
                &ctx.layers,
                camera,
                camera.layers & scene_layers,
            );
        }

        ctx.current.cameras += cameras.len();
        Ok(())
    }
}

fn submit_camera(
    commands: &dyn RenderCommandQueue,
    layers: &RenderLayers,
    camera: &Camera,
    mask: LayerMask,
) {
    commands.add(RenderCommand::BindCamera(camera.id));
    commands.add(RenderCommand::SetViewport(camera.viewport));

    for layer in layers.iter_masked(mask) {
        for (shader, batch) in layer.active_batches() {
            log::trace!(
                "Submitting {} model(s) of shader {:?} in layer {}",
                batch.len(),
                shader,
                layer.layer()
            );
            commands.add(RenderCommand::BindShader(shader));
            submit_partition(commands, CullMode::Back, batch.single_sided());
            submit_partition(commands, CullMode::None, batch.double_sided());
        }
    }
}

fn submit_partition<'a>(
    commands: &dyn RenderCommandQueue,
    cull_mode: CullMode,
    models: impl IntoIterator<Item = &'a ModelRef>,
) {
    let mut models: Vec<ModelRef> = models.into_iter().copied().collect();
    if models.is_empty() {
        return;
    }
    // Sets are unordered; sort for a stable draw order across frames.
    models.sort_unstable();

    commands.add(RenderCommand::SetCullMode(cull_mode));
    for model in models {
        commands.add(RenderCommand::DrawMesh {
            model: model.model,
            mesh: model.mesh,
        });
    }
}

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

//! The read-only view of the scene graph used by rendering.
//!
//! The scene graph itself lives outside the engine core. Rendering only needs
//! the cameras to draw from and, per camera, the candidate models with their
//! mesh, shader, layer and sidedness.

use crate::renderer::{CameraId, LayerMask, MeshId, ModelId, RenderLayer, ShaderHandle, Viewport};

/// A model the scene offers for drawing.
pub trait RenderModel {
    /// The model's identity.
    fn id(&self) -> ModelId;
    /// Whether the model is inside the camera's view.
    fn is_visible(&self) -> bool;
    /// Whether the model is enabled in the scene.
    fn is_enabled(&self) -> bool;
    /// The resolved mesh, if loaded.
    fn mesh(&self) -> Option<MeshId>;
    /// The shader of the resolved material, if loaded.
    fn shader(&self) -> Option<ShaderHandle>;
    /// The layer the model is drawn in.
    fn layer(&self) -> RenderLayer;
    /// Whether back-face culling must be disabled for this model.
    fn double_sided(&self) -> bool;
}

/// A plain-data [`RenderModel`].
#[derive(Debug, Clone, PartialEq)]
pub struct SceneModel {
    /// See [`RenderModel::id`].
    pub id: ModelId,
    /// See [`RenderModel::is_visible`].
    pub visible: bool,
    /// See [`RenderModel::is_enabled`].
    pub enabled: bool,
    /// See [`RenderModel::mesh`].
    pub mesh: Option<MeshId>,
    /// See [`RenderModel::shader`].
    pub shader: Option<ShaderHandle>,
    /// See [`RenderModel::layer`].
    pub layer: RenderLayer,
    /// See [`RenderModel::double_sided`].
    pub double_sided: bool,
}

impl RenderModel for SceneModel {
    fn id(&self) -> ModelId {
        self.id
    }
    fn is_visible(&self) -> bool {
        self.visible
    }
    fn is_enabled(&self) -> bool {
        self.enabled
    }
    fn mesh(&self) -> Option<MeshId> {
        self.mesh
    }
    fn shader(&self) -> Option<ShaderHandle> {
        self.shader
    }
    fn layer(&self) -> RenderLayer {
        self.layer
    }
    fn double_sided(&self) -> bool {
        self.double_sided
    }
}

/// A camera the scene is drawn from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    /// The camera's identity.
    pub id: CameraId,
    /// Where on the frame buffer it draws.
    pub viewport: Viewport,
    /// The layers this camera sees.
    pub layers: LayerMask,
}

/// Read access to the scene graph.
pub trait SceneSource: Send + Sync {
    /// The active cameras, in draw order.
    fn cameras(&self) -> Vec<Camera>;

    /// Calls `visitor` for every model that may be visible from `camera`.
    fn visit_models(&self, camera: &Camera, visitor: &mut dyn FnMut(&dyn RenderModel));
}

/// A scene without cameras or models.
#[derive(Debug, Default, Clone, Copy)]
pub struct EmptyScene;

impl SceneSource for EmptyScene {
    fn cameras(&self) -> Vec<Camera> {
        Vec::new()
    }

    fn visit_models(&self, _camera: &Camera, _visitor: &mut dyn FnMut(&dyn RenderModel)) {}
}

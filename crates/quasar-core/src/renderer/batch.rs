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

//! Per-frame grouping of render models by layer and shader.
//!
//! Scene submission fills a [`RenderLayers`] registry every frame: each
//! visible model lands in the [`RenderBatch`] of its (layer, shader) pair,
//! split by whether it is double-sided. Draw submission then walks the
//! selected layers batch by batch, binding each shader once and toggling
//! back-face culling once per partition instead of once per model.
//!
//! Batches are never dropped between frames; [`RenderLayers::clear`] only
//! empties their model sets so their allocations are reused.

use super::layer::{LayerMask, RenderLayer};
use super::{MeshId, ModelId, ShaderHandle};
use crate::scene::RenderModel;
use ahash::{AHashMap, AHashSet};

/// A model queued for drawing, with the mesh it was queued with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModelRef {
    /// The scene model.
    pub model: ModelId,
    /// The mesh to draw for it.
    pub mesh: MeshId,
}

/// The models sharing one shader within one layer.
#[derive(Debug, Default)]
pub struct RenderBatch {
    single_sided: AHashSet<ModelRef>,
    double_sided: AHashSet<ModelRef>,
}

impl RenderBatch {
    /// Creates an empty batch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a model in the partition matching `double_sided`.
    ///
    /// Returns `false` if the model was already queued in that partition.
    pub fn insert(&mut self, model: ModelRef, double_sided: bool) -> bool {
        if double_sided {
            self.double_sided.insert(model)
        } else {
            self.single_sided.insert(model)
        }
    }

    /// Models drawn with back-face culling enabled.
    pub fn single_sided(&self) -> &AHashSet<ModelRef> {
        &self.single_sided
    }

    /// Models drawn with back-face culling disabled.
    pub fn double_sided(&self) -> &AHashSet<ModelRef> {
        &self.double_sided
    }

    /// Total number of queued models.
    pub fn len(&self) -> usize {
        self.single_sided.len() + self.double_sided.len()
    }

    /// Returns `true` if no model is queued.
    pub fn is_empty(&self) -> bool {
        self.single_sided.is_empty() && self.double_sided.is_empty()
    }

    /// Empties both partitions, keeping their capacity.
    pub fn clear(&mut self) {
        self.single_sided.clear();
        self.double_sided.clear();
    }
}

/// One rendering layer and the batches queued in it, keyed by shader.
#[derive(Debug)]
pub struct RenderingLayer {
    layer: RenderLayer,
    batches: AHashMap<ShaderHandle, RenderBatch>,
}

impl RenderingLayer {
    fn new(layer: RenderLayer) -> Self {
        Self {
            layer,
            batches: AHashMap::new(),
        }
    }

    /// Which layer this is.
    pub fn layer(&self) -> RenderLayer {
        self.layer
    }

    /// Returns the batch for `shader`, creating it on first use.
    pub fn batch_mut(&mut self, shader: ShaderHandle) -> &mut RenderBatch {
        self.batches.entry(shader).or_default()
    }

    /// Returns the batch for `shader` if one was ever created.
    pub fn batch(&self, shader: ShaderHandle) -> Option<&RenderBatch> {
        self.batches.get(&shader)
    }

    /// Every batch of this layer, including empty ones kept from earlier frames.
    pub fn batches(&self) -> impl Iterator<Item = (ShaderHandle, &RenderBatch)> {
        self.batches.iter().map(|(shader, batch)| (*shader, batch))
    }

    /// The non-empty batches of this layer, sorted by shader handle.
    pub fn active_batches(&self) -> Vec<(ShaderHandle, &RenderBatch)> {
        let mut active: Vec<_> = self.batches().filter(|(_, b)| !b.is_empty()).collect();
        active.sort_unstable_by_key(|(shader, _)| *shader);
        active
    }

    /// Number of batch objects owned by this layer.
    pub fn batch_count(&self) -> usize {
        self.batches.len()
    }

    fn clear(&mut self) {
        for batch in self.batches.values_mut() {
            batch.clear();
        }
    }
}

/// Summary of what is currently queued in a [`RenderLayers`] registry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchStats {
    /// Batches holding at least one model.
    pub active_batches: usize,
    /// Models queued across all batches.
    pub queued_models: usize,
}

/// The batch registry: one [`RenderingLayer`] per [`RenderLayer`].
#[derive(Debug)]
pub struct RenderLayers {
    layers: [RenderingLayer; RenderLayer::COUNT],
}

impl RenderLayers {
    /// Creates a registry with empty layers.
    pub fn new() -> Self {
        Self {
            layers: RenderLayer::ALL.map(RenderingLayer::new),
        }
    }

    /// Empties every batch of every layer. Batch objects are kept.
    pub fn clear(&mut self) {
        for layer in &mut self.layers {
            layer.clear();
        }
    }

    /// Returns the batch for (`layer`, `shader`), creating it on first use.
    pub fn render_batch(&mut self, layer: RenderLayer, shader: ShaderHandle) -> &mut RenderBatch {
        self.layers[layer.index()].batch_mut(shader)
    }

    /// Returns one layer.
    pub fn layer(&self, layer: RenderLayer) -> &RenderingLayer {
        &self.layers[layer.index()]
    }

    /// Queues a model if it is visible, enabled, and has both a mesh and a shader.
    ///
    /// Returns `true` if the model was queued.
    pub fn insert_model(&mut self, model: &dyn RenderModel) -> bool {
        if !model.is_visible() || !model.is_enabled() {
            return false;
        }
        let (Some(mesh), Some(shader)) = (model.mesh(), model.shader()) else {
            return false;
        };
        let entry = ModelRef {
            model: model.id(),
            mesh,
        };
        self.render_batch(model.layer(), shader)
            .insert(entry, model.double_sided());
        true
    }

    /// Iterates the layers selected by `mask`, in ascending index order.
    ///
    /// Layers are yielded whether or not they hold any batch.
    pub fn iter_masked(&self, mask: LayerMask) -> MaskedLayers<'_> {
        MaskedLayers {
            layers: &self.layers,
            mask,
            next: 0,
        }
    }

    /// Counts what is currently queued.
    pub fn stats(&self) -> BatchStats {
        self.layers
            .iter()
            .flat_map(|layer| layer.batches.values())
            .filter(|batch| !batch.is_empty())
            .fold(BatchStats::default(), |mut stats, batch| {
                stats.active_batches += 1;
                stats.queued_models += batch.len();
                stats
            })
    }
}

impl Default for RenderLayers {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over the layers of a [`RenderLayers`] registry selected by a mask.
///
/// Skips unselected layers in place, so no filtered collection is built.
pub struct MaskedLayers<'a> {
    layers: &'a [RenderingLayer; RenderLayer::COUNT],
    mask: LayerMask,
    next: usize,
}

impl<'a> Iterator for MaskedLayers<'a> {
    type Item = &'a RenderingLayer;

    fn next(&mut self) -> Option<Self::Item> {
        while self.next < self.layers.len() {
            let layer = &self.layers[self.next];
            self.next += 1;
            if self.mask.contains(layer.layer) {
                return Some(layer);
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.layers.len() - self.next))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::SceneModel;

    const LIT: ShaderHandle = ShaderHandle(1);
    const UNLIT: ShaderHandle = ShaderHandle(2);

    fn model(id: u64, layer: RenderLayer, double_sided: bool) -> SceneModel {
        SceneModel {
            id: ModelId(id),
            visible: true,
            enabled: true,
            mesh: Some(MeshId(id * 10)),
            shader: Some(LIT),
            layer,
            double_sided,
        }
    }

    #[test]
    fn test_batch_partition_and_clear() {
        let mut layers = RenderLayers::new();
        let m1 = model(1, RenderLayer::Opaque, false);
        let m2 = model(2, RenderLayer::Opaque, true);
        assert!(layers.insert_model(&m1));
        assert!(layers.insert_model(&m2));

        let r1 = ModelRef { model: ModelId(1), mesh: MeshId(10) };
        let r2 = ModelRef { model: ModelId(2), mesh: MeshId(20) };
        {
            let batch = layers.render_batch(RenderLayer::Opaque, LIT);
            assert!(batch.single_sided().contains(&r1));
            assert!(!batch.double_sided().contains(&r1));
            assert!(batch.double_sided().contains(&r2));
            assert!(!batch.single_sided().contains(&r2));
        }

        layers.clear();
        let opaque = layers.layer(RenderLayer::Opaque);
        assert_eq!(opaque.batch_count(), 1, "batch objects survive a clear");
        let batch = opaque.batch(LIT).unwrap();
        assert!(batch.single_sided().is_empty());
        assert!(batch.double_sided().is_empty());
    }

    #[test]
    fn test_one_batch_per_layer_and_shader() {
        let mut layers = RenderLayers::new();
        let mut a = model(1, RenderLayer::Opaque, false);
        let mut b = model(2, RenderLayer::Opaque, false);
        let mut c = model(3, RenderLayer::Transparent, false);
        a.shader = Some(LIT);
        b.shader = Some(UNLIT);
        c.shader = Some(LIT);
        let d = model(4, RenderLayer::Opaque, true);

        for m in [&a, &b, &c, &d] {
            layers.insert_model(m);
        }

        assert_eq!(layers.layer(RenderLayer::Opaque).batch_count(), 2);
        assert_eq!(layers.layer(RenderLayer::Transparent).batch_count(), 1);
        assert_eq!(layers.layer(RenderLayer::Opaque).batch(LIT).unwrap().len(), 2);
        assert_eq!(
            layers.stats(),
            BatchStats {
                active_batches: 3,
                queued_models: 4
            }
        );
    }

    #[test]
    fn test_unresolved_or_hidden_models_are_skipped() {
        let mut layers = RenderLayers::new();

        let mut hidden = model(1, RenderLayer::Opaque, false);
        hidden.visible = false;
        let mut disabled = model(2, RenderLayer::Opaque, false);
        disabled.enabled = false;
        let mut no_mesh = model(3, RenderLayer::Opaque, false);
        no_mesh.mesh = None;
        let mut no_shader = model(4, RenderLayer::Opaque, false);
        no_shader.shader = None;

        for m in [&hidden, &disabled, &no_mesh, &no_shader] {
            assert!(!layers.insert_model(m));
        }
        assert_eq!(layers.stats(), BatchStats::default());
        assert_eq!(layers.layer(RenderLayer::Opaque).batch_count(), 0);
    }

    #[test]
    fn test_duplicate_insert_is_idempotent() {
        let mut layers = RenderLayers::new();
        let m = model(1, RenderLayer::Opaque, false);
        layers.insert_model(&m);
        layers.insert_model(&m);
        assert_eq!(layers.stats().queued_models, 1);
    }

    #[test]
    fn test_masked_iteration_ignores_content() {
        let mut layers = RenderLayers::new();
        layers.insert_model(&model(1, RenderLayer::Opaque, false));
        layers.insert_model(&model(2, RenderLayer::Transparent, false));

        let mask = RenderLayer::Background | RenderLayer::Cutout;
        let selected: Vec<_> = layers.iter_masked(mask).map(|l| l.layer()).collect();
        assert_eq!(selected, vec![RenderLayer::Background, RenderLayer::Cutout]);

        assert_eq!(layers.iter_masked(LayerMask::NONE).count(), 0);
        assert_eq!(layers.iter_masked(LayerMask::ALL).count(), RenderLayer::COUNT);
    }

    #[test]
    fn test_active_batches_sorted_by_shader() {
        let mut layers = RenderLayers::new();
        let mut a = model(1, RenderLayer::Opaque, false);
        a.shader = Some(ShaderHandle(9));
        let mut b = model(2, RenderLayer::Opaque, false);
        b.shader = Some(ShaderHandle(3));
        let mut c = model(3, RenderLayer::Opaque, false);
        c.shader = Some(ShaderHandle(5));
        for m in [&a, &b, &c] {
            layers.insert_model(m);
        }
        layers.clear();
        layers.insert_model(&a);
        layers.insert_model(&b);

        let shaders: Vec<_> = layers
            .layer(RenderLayer::Opaque)
            .active_batches()
            .into_iter()
            .map(|(s, _)| s)
            .collect();
        assert_eq!(shaders, vec![ShaderHandle(3), ShaderHandle(9)]);
    }
}

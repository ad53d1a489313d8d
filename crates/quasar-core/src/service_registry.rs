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

//! Stage resolution for pipelines.
//!
//! A pipeline never knows which concrete stages exist. At start-up it asks a
//! [`StageSource`] for fresh instances of every stage registered for its
//! context type, in no particular order, and sorts them itself.
//!
//! The [`StageRegistry`] is the default source: a type-map from context type
//! to the list of stage factories registered for it.

use crate::stage::{PipelineContext, Stage};
use std::any::{Any, TypeId};
use std::collections::HashMap;

/// Produces the unordered set of stages for pipelines over context `C`.
pub trait StageSource<C: PipelineContext>: Send + Sync {
    /// Returns fresh instances of every stage currently registered for `C`.
    fn resolve_stages(&self) -> Vec<Box<dyn Stage<C>>>;
}

impl<C, F> StageSource<C> for F
where
    C: PipelineContext,
    F: Fn() -> Vec<Box<dyn Stage<C>>> + Send + Sync,
{
    fn resolve_stages(&self) -> Vec<Box<dyn Stage<C>>> {
        self()
    }
}

type StageFactory<C> = Box<dyn Fn() -> Box<dyn Stage<C>> + Send + Sync>;

/// A registry of stage factories keyed by the [`TypeId`] of their context.
///
/// # Example
///
/// ```rust,ignore
/// use quasar_core::service_registry::StageRegistry;
///
/// let mut registry = StageRegistry::new();
/// registry.register::<RenderingContext, _>(ClearFrameStage::default);
/// registry.register::<RenderingContext, _>(FrameSwapStage::default);
///
/// let stages = registry.resolve::<RenderingContext>();
/// assert_eq!(stages.len(), 2);
/// ```
#[derive(Default)]
pub struct StageRegistry {
    factories: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl StageRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Registers a stage constructor for pipelines over context `C`.
    ///
    /// The factory is invoked every time a pipeline over `C` starts.
    pub fn register<C, S>(&mut self, factory: impl Fn() -> S + Send + Sync + 'static)
    where
        C: PipelineContext,
        S: Stage<C> + 'static,
    {
        self.register_boxed::<C>(Box::new(move || Box::new(factory()) as Box<dyn Stage<C>>));
    }

    /// Registers an already boxed stage factory for pipelines over context `C`.
    pub fn register_boxed<C: PipelineContext>(&mut self, factory: StageFactory<C>) {
        let entry = self
            .factories
            .entry(TypeId::of::<C>())
            .or_insert_with(|| Box::new(Vec::<StageFactory<C>>::new()));
        // Entries are keyed by the context type, so the downcast always matches.
        if let Some(factories) = entry.downcast_mut::<Vec<StageFactory<C>>>() {
            factories.push(factory);
        }
    }

    /// Instantiates every stage registered for `C`, in registration order.
    #[must_use]
    pub fn resolve<C: PipelineContext>(&self) -> Vec<Box<dyn Stage<C>>> {
        self.factories_for::<C>()
            .map(|factories| factories.iter().map(|factory| factory()).collect())
            .unwrap_or_default()
    }

    /// Returns the number of stages registered for `C`.
    #[must_use]
    pub fn count<C: PipelineContext>(&self) -> usize {
        self.factories_for::<C>().map_or(0, Vec::len)
    }

    /// Returns `true` if no stage is registered for any context.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    fn factories_for<C: PipelineContext>(&self) -> Option<&Vec<StageFactory<C>>> {
        self.factories
            .get(&TypeId::of::<C>())
            .and_then(|boxed| boxed.downcast_ref::<Vec<StageFactory<C>>>())
    }
}

impl<C: PipelineContext> StageSource<C> for StageRegistry {
    fn resolve_stages(&self) -> Vec<Box<dyn Stage<C>>> {
        self.resolve::<C>()
    }
}

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

//! # Stage Abstraction
//!
//! A **Stage** is one discrete unit of per-tick work inside a pipeline
//! (clearing the frame buffer, pumping platform messages, stepping physics...).
//! Stages never call each other: a pipeline owns an ordered list of stages and
//! runs them one after the other, handing every stage the same mutable
//! pipeline context.
//!
//! ## Lifecycle
//!
//! ```text
//! on_start(ctx)  →  [ on_execute(ctx) ]*  →  on_shutdown(ctx)
//! ```
//!
//! ## Ordering
//!
//! Stages do not carry an index. Instead each stage declares which other
//! stages it runs after and before, by [`StageId`]. The pipeline turns these
//! declarations into a dependency graph when it starts. Declarations naming
//! a stage that is not registered are ignored, so optional stages (debug
//! overlays, plugins) can be referenced freely.
//!
//! ```rust,ignore
//! use quasar_core::stage::{Stage, StageError, StageId};
//!
//! struct FrameSwap;
//!
//! impl FrameSwap {
//!     const ID: StageId = StageId::new("render.frame_swap");
//! }
//!
//! impl Stage<RenderingContext> for FrameSwap {
//!     fn id(&self) -> StageId { Self::ID }
//!     fn execute_after(&self) -> &'static [StageId] { &[ClearFrame::ID] }
//!     fn on_execute(&mut self, ctx: &mut RenderingContext) -> Result<(), StageError> {
//!         ctx.commands.add(RenderCommand::Present { frame_buffer: ctx.frame_buffer });
//!         Ok(())
//!     }
//! }
//! ```

use std::fmt;

/// Stable identity of a stage kind.
///
/// Each concrete stage type owns exactly one id, usually exposed as an
/// associated constant so other stages can reference it in their ordering
/// declarations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StageId(&'static str);

impl StageId {
    /// Creates a stage id from a unique, dotted name (e.g. `"render.clear_frame"`).
    pub const fn new(name: &'static str) -> Self {
        Self(name)
    }

    /// Returns the name of the stage.
    pub const fn name(self) -> &'static str {
        self.0
    }
}

impl fmt::Display for StageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// The kinds of pipelines run by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PipelineKind {
    /// Per-frame update work: messages, dispatched tasks, UI events, audio.
    Update,
    /// Per-frame rendering work: clear, scene submission, UI, present.
    Rendering,
    /// Fixed-interval physics work, driven from its own thread.
    Physics,
}

impl fmt::Display for PipelineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineKind::Update => write!(f, "Update"),
            PipelineKind::Rendering => write!(f, "Rendering"),
            PipelineKind::Physics => write!(f, "Physics"),
        }
    }
}

/// The lifecycle call during which a stage failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StagePhase {
    /// `on_start`
    Start,
    /// `on_execute`
    Execute,
    /// `on_shutdown`
    Shutdown,
}

impl fmt::Display for StagePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StagePhase::Start => write!(f, "start"),
            StagePhase::Execute => write!(f, "execute"),
            StagePhase::Shutdown => write!(f, "shutdown"),
        }
    }
}

/// The shared, mutable state of one pipeline.
///
/// A context is created by the owner of the pipeline, handed over when the
/// pipeline starts, lent to every stage on every call and given back at
/// shutdown.
pub trait PipelineContext: Send + 'static {
    /// The tunable settings pushed to the stages of this pipeline.
    type Settings: Clone + Send + Sync + 'static;

    /// Which pipeline this context belongs to.
    const KIND: PipelineKind;

    /// The current settings snapshot.
    fn settings(&self) -> &Self::Settings;

    /// Replaces the current settings snapshot.
    fn set_settings(&mut self, settings: Self::Settings);
}

/// Error type for stage operations.
#[derive(Debug)]
pub enum StageError {
    /// A resource the stage needs is missing from the pipeline context.
    MissingResource(&'static str),
    /// A domain-specific error occurred during execution.
    ExecutionFailed(Box<dyn std::error::Error + Send + Sync>),
    /// A domain-specific error occurred during start-up.
    InitializationFailed(Box<dyn std::error::Error + Send + Sync>),
    /// A domain-specific error occurred while shutting down.
    ShutdownFailed(Box<dyn std::error::Error + Send + Sync>),
}

impl fmt::Display for StageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StageError::MissingResource(name) => {
                write!(f, "Missing resource in pipeline context: {name}")
            }
            StageError::ExecutionFailed(e) => write!(f, "Stage execution failed: {e}"),
            StageError::InitializationFailed(e) => write!(f, "Stage initialization failed: {e}"),
            StageError::ShutdownFailed(e) => write!(f, "Stage shutdown failed: {e}"),
        }
    }
}

impl std::error::Error for StageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StageError::ExecutionFailed(e)
            | StageError::InitializationFailed(e)
            | StageError::ShutdownFailed(e) => Some(e.as_ref()),
            StageError::MissingResource(_) => None,
        }
    }
}

impl StageError {
    /// Convenience constructor wrapping any error as an execution failure.
    pub fn execution<E>(error: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        StageError::ExecutionFailed(error.into())
    }
}

/// A unit of work run by a pipeline over a context of type `C`.
///
/// Only [`id`](Stage::id) and [`on_execute`](Stage::on_execute) are required;
/// everything else defaults to "no ordering constraints" and no-ops.
pub trait Stage<C: PipelineContext>: Send {
    /// The stable identity of this stage kind.
    fn id(&self) -> StageId;

    /// Stages that must run before this one.
    fn execute_after(&self) -> &'static [StageId] {
        &[]
    }

    /// Stages that must run after this one.
    fn execute_before(&self) -> &'static [StageId] {
        &[]
    }

    /// Called once, in pipeline order, when the pipeline starts.
    fn on_start(&mut self, _ctx: &mut C) -> Result<(), StageError> {
        Ok(())
    }

    /// Called once per tick, in pipeline order.
    fn on_execute(&mut self, ctx: &mut C) -> Result<(), StageError>;

    /// Called once, in reverse pipeline order, when the pipeline shuts down.
    fn on_shutdown(&mut self, _ctx: &mut C) -> Result<(), StageError> {
        Ok(())
    }

    /// Called whenever the pipeline's settings change between start and shutdown.
    fn on_settings_changed(&mut self, _settings: &C::Settings) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[derive(Debug)]
    struct Boom;

    impl fmt::Display for Boom {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "boom")
        }
    }

    impl Error for Boom {}

    #[test]
    fn test_stage_id_display_and_name() {
        const ID: StageId = StageId::new("render.clear_frame");
        assert_eq!(ID.name(), "render.clear_frame");
        assert_eq!(ID.to_string(), "render.clear_frame");
    }

    #[test]
    fn test_stage_error_source_chain() {
        let err = StageError::execution(Boom);
        assert_eq!(err.to_string(), "Stage execution failed: boom");
        assert_eq!(err.source().unwrap().to_string(), "boom");

        let missing = StageError::MissingResource("AudioSystem");
        assert!(missing.source().is_none());
        assert!(missing.to_string().contains("AudioSystem"));
    }

    #[test]
    fn test_stage_error_from_string() {
        let err = StageError::execution("device lost");
        assert_eq!(err.to_string(), "Stage execution failed: device lost");
    }
}

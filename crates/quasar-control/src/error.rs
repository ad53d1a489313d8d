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

//! Errors raised by pipelines.

use quasar_core::{PipelineKind, StageError, StageId, StagePhase};

/// An error raised while starting, executing or shutting down a pipeline.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// `execute` or `shutdown` was called on a pipeline that is not running.
    #[error("{pipeline} pipeline is not started")]
    NotStarted {
        /// The pipeline.
        pipeline: PipelineKind,
    },
    /// `start` was called on a running pipeline.
    #[error("{pipeline} pipeline is already started")]
    AlreadyStarted {
        /// The pipeline.
        pipeline: PipelineKind,
    },
    /// Two registered stages share the same id.
    #[error("stage '{stage}' is registered more than once")]
    DuplicateStage {
        /// The duplicated id.
        stage: StageId,
    },
    /// The declared stage ordering contains a cycle.
    #[error("dependency cycle detected at stage '{stage}': {}", format_cycle(.cycle))]
    DependencyCycle {
        /// The stage that was reached twice.
        stage: StageId,
        /// The stages forming the cycle, starting and ending with `stage`.
        cycle: Vec<StageId>,
    },
    /// A stage failed; the lifecycle call was aborted.
    #[error("stage '{stage}' failed during {phase} of the {pipeline} pipeline")]
    Stage {
        /// The pipeline.
        pipeline: PipelineKind,
        /// The failing stage.
        stage: StageId,
        /// The lifecycle call that failed.
        phase: StagePhase,
        /// The stage's error.
        #[source]
        source: StageError,
    },
}

fn format_cycle(cycle: &[StageId]) -> String {
    cycle
        .iter()
        .map(|id| id.name())
        .collect::<Vec<_>>()
        .join(" -> ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_cycle_message_lists_path() {
        let a = StageId::new("a");
        let b = StageId::new("b");
        let err = PipelineError::DependencyCycle {
            stage: a,
            cycle: vec![a, b, a],
        };
        assert_eq!(
            err.to_string(),
            "dependency cycle detected at stage 'a': a -> b -> a"
        );
    }

    #[test]
    fn test_stage_error_is_source() {
        let err = PipelineError::Stage {
            pipeline: PipelineKind::Rendering,
            stage: StageId::new("render.frame_swap"),
            phase: StagePhase::Execute,
            source: StageError::MissingResource("backend"),
        };
        assert_eq!(
            err.to_string(),
            "stage 'render.frame_swap' failed during execute of the Rendering pipeline"
        );
        assert!(err.source().unwrap().to_string().contains("backend"));
    }
}

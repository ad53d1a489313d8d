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

//! Turns an unordered set of stages into their execution order.

use crate::error::PipelineError;
use quasar_core::graph::{CyclePolicy, DependencyGraph, NodeId};
use quasar_core::{PipelineContext, Stage, StageId};
use std::collections::HashMap;

/// Orders `stages` so every stage runs after the stages it depends on.
///
/// Both `execute_after` and `execute_before` declarations become edges from
/// the later stage to the earlier one. Declarations naming a stage that is
/// not part of `stages` are ignored. Stages without constraints between them
/// keep their input order.
///
/// # Errors
///
/// * [`PipelineError::DuplicateStage`] if two stages share an id.
/// * [`PipelineError::DependencyCycle`] if the declarations form a cycle.
pub fn resolve_stage_order<C: PipelineContext>(
    stages: Vec<Box<dyn Stage<C>>>,
) -> Result<Vec<Box<dyn Stage<C>>>, PipelineError> {
    let mut graph = DependencyGraph::with_capacity(stages.len());
    let mut nodes: HashMap<StageId, NodeId> = HashMap::with_capacity(stages.len());
    let mut ids = Vec::with_capacity(stages.len());
    let mut declarations = Vec::with_capacity(stages.len());

    // 1. One node per stage, keyed by stage id.
    for stage in stages {
        let id = stage.id();
        let after = stage.execute_after();
        let before = stage.execute_before();
        let node = graph.add_node(stage);
        if nodes.insert(id, node).is_some() {
            return Err(PipelineError::DuplicateStage { stage: id });
        }
        ids.push(id);
        declarations.push((id, node, after, before));
    }

    // 2. Translate declarations into edges towards the stage that runs first.
    for (id, node, after, before) in declarations {
        for target in before {
            match nodes.get(target) {
                Some(&later) => graph.add_dependency(later, node),
                None => log::debug!("Stage '{id}': ignoring 'before {target}', stage not registered"),
            }
        }
        for target in after {
            match nodes.get(target) {
                Some(&earlier) => graph.add_dependency(node, earlier),
                None => log::debug!("Stage '{id}': ignoring 'after {target}', stage not registered"),
            }
        }
    }

    // 3. Sort; a cycle is a configuration error.
    graph
        .sort(CyclePolicy::Fail)
        .map_err(|err| PipelineError::DependencyCycle {
            stage: ids[err.node.index()],
            cycle: err.path.iter().map(|node| ids[node.index()]).collect(),
        })
}

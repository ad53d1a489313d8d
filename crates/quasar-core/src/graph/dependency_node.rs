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

//! A depth-first, postorder topological sort over dependency nodes.
//!
//! Every node wraps a payload and the list of nodes that must be emitted
//! before it. Sorting visits each root in insertion order, recurses into its
//! dependencies and emits the node once all of them have been emitted, so
//! dependencies always precede their dependents in the output.

use std::fmt;

/// Index of a node inside a [`DependencyGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    /// Returns the raw index of the node, in insertion order.
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What [`DependencyGraph::sort`] does when it walks back into a node that is
/// still being visited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CyclePolicy {
    /// Abort the sort with a [`CycleError`].
    Fail,
    /// Skip the offending edge and keep going. Every node is still emitted
    /// exactly once, but the edges forming the cycle are not all honored.
    Ignore,
}

/// An error indicating that a cycle was detected in the graph.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("dependency cycle detected at node {node}")]
pub struct CycleError {
    /// The node that was reached a second time while still being visited.
    pub node: NodeId,
    /// The nodes forming the cycle, starting and ending with `node`.
    pub path: Vec<NodeId>,
}

/// A payload together with the nodes it depends on.
#[derive(Debug)]
pub struct DependencyNode<T> {
    payload: T,
    dependencies: Vec<NodeId>,
}

impl<T> DependencyNode<T> {
    /// The wrapped payload.
    pub fn payload(&self) -> &T {
        &self.payload
    }

    /// The nodes that must be emitted before this one, in declaration order.
    pub fn dependencies(&self) -> &[NodeId] {
        &self.dependencies
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    InProgress,
    Emitted,
}

/// An arena of [`DependencyNode`]s.
///
/// The graph is meant to be short-lived: build it, call [`sort`](Self::sort),
/// and use the ordered payloads.
#[derive(Debug)]
pub struct DependencyGraph<T> {
    nodes: Vec<DependencyNode<T>>,
}

impl<T> DependencyGraph<T> {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    /// Creates an empty graph able to hold `capacity` nodes without reallocating.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(capacity),
        }
    }

    /// Adds a node without dependencies and returns its id.
    pub fn add_node(&mut self, payload: T) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(DependencyNode {
            payload,
            dependencies: Vec::new(),
        });
        id
    }

    /// Records that `dependency` must be emitted before `node`.
    ///
    /// Duplicate edges are allowed. A node is never added to its own
    /// dependency list: such a request is ignored.
    ///
    /// # Panics
    ///
    /// Panics if either id does not belong to this graph.
    pub fn add_dependency(&mut self, node: NodeId, dependency: NodeId) {
        assert!(
            dependency.0 < self.nodes.len(),
            "dependency {dependency} is not part of this graph"
        );
        if node == dependency {
            log::warn!("Ignoring reflexive dependency on node {node}");
            return;
        }
        self.nodes[node.0].dependencies.push(dependency);
    }

    /// Returns the node with the given id, if present.
    pub fn node(&self, id: NodeId) -> Option<&DependencyNode<T>> {
        self.nodes.get(id.0)
    }

    /// Returns the number of nodes in the graph.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if the graph has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Computes a dependency-respecting order of the node ids.
    ///
    /// Roots are visited in insertion order, and dependencies in declaration
    /// order, so independent nodes keep their relative insertion order.
    pub fn sort_indices(&self, policy: CyclePolicy) -> Result<Vec<NodeId>, CycleError> {
        let mut marks = vec![Mark::Unvisited; self.nodes.len()];
        let mut order = Vec::with_capacity(self.nodes.len());
        // (node, index of the next dependency to visit)
        let mut stack: Vec<(usize, usize)> = Vec::new();

        for root in 0..self.nodes.len() {
            if marks[root] != Mark::Unvisited {
                continue;
            }
            marks[root] = Mark::InProgress;
            stack.push((root, 0));

            while let Some(&(current, next)) = stack.last() {
                let Some(&dependency) = self.nodes[current].dependencies.get(next) else {
                    marks[current] = Mark::Emitted;
                    order.push(NodeId(current));
                    stack.pop();
                    continue;
                };

                if let Some(top) = stack.last_mut() {
                    top.1 += 1;
                }

                match marks[dependency.0] {
                    Mark::Unvisited => {
                        marks[dependency.0] = Mark::InProgress;
                        stack.push((dependency.0, 0));
                    }
                    Mark::InProgress => match policy {
                        CyclePolicy::Fail => {
                            let start = stack
                                .iter()
                                .position(|&(n, _)| n == dependency.0)
                                .unwrap_or(0);
                            let mut path: Vec<NodeId> =
                                stack[start..].iter().map(|&(n, _)| NodeId(n)).collect();
                            path.push(dependency);
                            return Err(CycleError {
                                node: dependency,
                                path,
                            });
                        }
                        CyclePolicy::Ignore => {
                            log::trace!(
                                "Skipping back edge {} -> {} while sorting",
                                NodeId(current),
                                dependency
                            );
                        }
                    },
                    Mark::Emitted => {}
                }
            }
        }

        Ok(order)
    }

    /// Consumes the graph and returns its payloads in dependency order.
    pub fn sort(self, policy: CyclePolicy) -> Result<Vec<T>, CycleError> {
        let order = self.sort_indices(policy)?;
        let mut slots: Vec<Option<T>> = self.nodes.into_iter().map(|n| Some(n.payload)).collect();
        Ok(order
            .into_iter()
            .filter_map(|id| slots[id.0].take())
            .collect())
    }
}

impl<T> Default for DependencyGraph<T> {
    fn default() -> Self {
        Self::new()
    }
}

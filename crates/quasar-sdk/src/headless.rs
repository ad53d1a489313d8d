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

//! A graphics backend that draws nothing and counts everything.

use quasar_core::renderer::{BackendError, RenderBackend, RenderCommand};
use std::sync::{Arc, Mutex, PoisonError};

/// Counters kept by a [`HeadlessBackend`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BackendStats {
    /// `Present` commands executed.
    pub frames_presented: u64,
    /// Meshes drawn.
    pub draw_calls: u64,
    /// UI quads drawn.
    pub ui_quads: u64,
    /// Debug text lines drawn.
    pub debug_texts: u64,
    /// Camera, viewport, shader and cull mode changes.
    pub state_changes: u64,
    /// Frame buffer clears.
    pub clears: u64,
    /// Backend resets.
    pub resets: u64,
    /// Color of the last clear.
    pub last_clear_color: [f32; 4],
    /// Meshes drawn in the last presented frame.
    pub last_frame_draws: u64,
}

/// A cloneable read handle on the counters of a [`HeadlessBackend`].
#[derive(Debug, Clone)]
pub struct HeadlessStats(Arc<Mutex<BackendStats>>);

impl HeadlessStats {
    /// Returns a copy of the current counters.
    pub fn snapshot(&self) -> BackendStats {
        *self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// A [`RenderBackend`] without a device, for tests, servers and tools.
#[derive(Debug, Default)]
pub struct HeadlessBackend {
    stats: Arc<Mutex<BackendStats>>,
    frame_draws: u64,
}

impl HeadlessBackend {
    /// Creates a backend with zeroed counters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a handle for reading the counters once the backend is moved
    /// into a command processor.
    pub fn stats_handle(&self) -> HeadlessStats {
        HeadlessStats(Arc::clone(&self.stats))
    }
}

impl RenderBackend for HeadlessBackend {
    fn on_execute_command(&mut self, command: &RenderCommand) -> Result<(), BackendError> {
        let mut stats = self.stats.lock().unwrap_or_else(PoisonError::into_inner);
        match command {
            RenderCommand::Reset => stats.resets += 1,
            RenderCommand::Clear { color, .. } => {
                stats.clears += 1;
                stats.last_clear_color = *color;
            }
            RenderCommand::SetViewport(_)
            | RenderCommand::BindCamera(_)
            | RenderCommand::BindShader(_)
            | RenderCommand::SetCullMode(_) => stats.state_changes += 1,
            RenderCommand::DrawMesh { .. } => {
                stats.draw_calls += 1;
                self.frame_draws += 1;
            }
            RenderCommand::DrawUiQuad(_) => stats.ui_quads += 1,
            RenderCommand::DrawDebugText { .. } => stats.debug_texts += 1,
            RenderCommand::Present { frame_buffer } => {
                stats.frames_presented += 1;
                stats.last_frame_draws = std::mem::take(&mut self.frame_draws);
                log::trace!(
                    "Presented frame buffer {:?} ({} draw(s))",
                    frame_buffer,
                    stats.last_frame_draws
                );
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quasar_core::renderer::{CullMode, FrameBufferId, MeshId, ModelId, ShaderHandle};

    #[test]
    fn test_counts_per_command_kind() {
        let mut backend = HeadlessBackend::new();
        let stats = backend.stats_handle();
        let frame = [
            RenderCommand::Reset,
            RenderCommand::Clear {
                color: [0.5, 0.5, 0.5, 1.0],
                depth: 1.0,
            },
            RenderCommand::BindShader(ShaderHandle(1)),
            RenderCommand::SetCullMode(CullMode::Back),
            RenderCommand::DrawMesh {
                model: ModelId(1),
                mesh: MeshId(1),
            },
            RenderCommand::DrawMesh {
                model: ModelId(2),
                mesh: MeshId(1),
            },
            RenderCommand::Present {
                frame_buffer: FrameBufferId::PRIMARY,
            },
        ];
        for command in &frame {
            backend.on_execute_command(command).unwrap();
        }

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.resets, 1);
        assert_eq!(snapshot.clears, 1);
        assert_eq!(snapshot.last_clear_color, [0.5, 0.5, 0.5, 1.0]);
        assert_eq!(snapshot.state_changes, 2);
        assert_eq!(snapshot.draw_calls, 2);
        assert_eq!(snapshot.frames_presented, 1);
        assert_eq!(snapshot.last_frame_draws, 2);
    }
}

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

//! The double-buffered render command queue.
//!
//! Any thread may [`add`](CommandProcessor::add) commands. The render thread
//! periodically calls [`execute_commands`](CommandProcessor::execute_commands),
//! which swaps the pending list with the (empty) executing list under the
//! lock and then dispatches the executing list to the [`RenderBackend`]
//! without holding it. Producers therefore only ever wait for a pointer swap.

use super::error::{BackendError, CommandError};
use super::{CameraId, FrameBufferId, MeshId, ModelId, ShaderHandle};
use std::sync::{Mutex, PoisonError};

/// Face culling state used while drawing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CullMode {
    /// Draw both faces.
    None,
    /// Cull back faces.
    Back,
}

/// A viewport rectangle in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Viewport {
    /// Left edge.
    pub x: u32,
    /// Top edge.
    pub y: u32,
    /// Width.
    pub width: u32,
    /// Height.
    pub height: u32,
}

/// A screen-space quad produced by the UI renderer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UiQuad {
    /// Position of the top-left corner, in pixels.
    pub position: [f32; 2],
    /// Size, in pixels.
    pub size: [f32; 2],
    /// Linear RGBA color.
    pub color: [f32; 4],
}

/// A single value-type instruction for the graphics backend.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderCommand {
    /// Restores the backend's default state and clears the frame buffer.
    Reset,
    /// Clears the bound frame buffer.
    Clear {
        /// Linear RGBA clear color.
        color: [f32; 4],
        /// Depth clear value.
        depth: f32,
    },
    /// Sets the viewport for subsequent draws.
    SetViewport(Viewport),
    /// Binds a camera's view and projection for subsequent draws.
    BindCamera(CameraId),
    /// Binds a shader program.
    BindShader(ShaderHandle),
    /// Changes face culling.
    SetCullMode(CullMode),
    /// Draws one model with the bound shader.
    DrawMesh {
        /// The scene model being drawn.
        model: ModelId,
        /// Its mesh.
        mesh: MeshId,
    },
    /// Draws a UI quad.
    DrawUiQuad(UiQuad),
    /// Draws a line of debug text at the given pixel position.
    DrawDebugText {
        /// Position of the text baseline, in pixels.
        position: [f32; 2],
        /// The text.
        text: String,
    },
    /// Presents a frame buffer.
    Present {
        /// The frame buffer to present.
        frame_buffer: FrameBufferId,
    },
}

/// A graphics backend consuming render commands on the render thread.
pub trait RenderBackend: Send {
    /// Executes one command.
    fn on_execute_command(&mut self, command: &RenderCommand) -> Result<(), BackendError>;
}

/// Object-safe access to a command processor, independent of its backend type.
pub trait RenderCommandQueue: Send + Sync {
    /// Appends a command to the pending list.
    fn add(&self, command: RenderCommand);

    /// Appends a [`RenderCommand::Reset`] to the pending list.
    fn reset(&self) {
        self.add(RenderCommand::Reset);
    }

    /// Swaps the lists and dispatches every pending command to the backend.
    ///
    /// Returns the number of commands dispatched.
    fn execute_commands(&self) -> Result<usize, CommandError>;

    /// Number of commands waiting for the next [`execute_commands`](Self::execute_commands).
    fn pending_len(&self) -> usize;
}

struct Consumer<B> {
    executing: Vec<RenderCommand>,
    backend: B,
}

/// Double-buffered command queue feeding a [`RenderBackend`].
pub struct CommandProcessor<B> {
    pending: Mutex<Vec<RenderCommand>>,
    consumer: Mutex<Consumer<B>>,
}

impl<B: RenderBackend> CommandProcessor<B> {
    /// Creates a processor dispatching to `backend`.
    pub fn new(backend: B) -> Self {
        Self {
            pending: Mutex::new(Vec::new()),
            consumer: Mutex::new(Consumer {
                executing: Vec::new(),
                backend,
            }),
        }
    }

    /// Appends a command to the pending list.
    pub fn add(&self, command: RenderCommand) {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(command);
    }

    /// Appends a [`RenderCommand::Reset`], so the reset happens in order with
    /// the other queued commands rather than immediately.
    pub fn reset(&self) {
        self.add(RenderCommand::Reset);
    }

    /// Dispatches, in FIFO order, every command added before this call.
    ///
    /// Commands added while the dispatch runs (including from the backend
    /// itself) wait for the next call. If the backend fails, the remaining
    /// commands of this batch are discarded and the error is returned.
    pub fn execute_commands(&self) -> Result<usize, CommandError> {
        let mut consumer = self.consumer.lock().unwrap_or_else(PoisonError::into_inner);
        let Consumer { executing, backend } = &mut *consumer;

        {
            let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
            std::mem::swap(&mut *pending, executing);
        }

        let count = executing.len();
        log::trace!("Dispatching {count} render command(s)");
        for (index, command) in executing.drain(..).enumerate() {
            backend
                .on_execute_command(&command)
                .map_err(|source| CommandError::Backend { index, source })?;
        }
        Ok(count)
    }

    /// Number of commands waiting for the next dispatch.
    pub fn pending_len(&self) -> usize {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Runs `f` with exclusive access to the backend.
    ///
    /// Blocks while a dispatch is in progress.
    pub fn with_backend<R>(&self, f: impl FnOnce(&mut B) -> R) -> R {
        let mut consumer = self.consumer.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut consumer.backend)
    }
}

impl<B: RenderBackend> RenderCommandQueue for CommandProcessor<B> {
    fn add(&self, command: RenderCommand) {
        CommandProcessor::add(self, command);
    }

    fn execute_commands(&self) -> Result<usize, CommandError> {
        CommandProcessor::execute_commands(self)
    }

    fn pending_len(&self) -> usize {
        CommandProcessor::pending_len(self)
    }
}

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

//! Platform messages and the channel that carries them to the update pipeline.
//!
//! The windowing layer translates its native events into [`PlatformMessage`]s
//! and posts them through a [`MessageSender`]. The update pipeline's message
//! pump drains the [`MessageBus`] once per tick.

mod bus;

pub use self::bus::{MessageBus, MessageSender};

/// A user input event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// A key was pressed.
    KeyDown {
        /// Platform key code.
        code: u32,
    },
    /// A key was released.
    KeyUp {
        /// Platform key code.
        code: u32,
    },
    /// The cursor moved, in window pixels.
    MouseMoved {
        /// Horizontal position.
        x: f32,
        /// Vertical position.
        y: f32,
    },
    /// A mouse button changed state.
    MouseButton {
        /// Button index (0 = left).
        button: u8,
        /// `true` when pressed.
        pressed: bool,
    },
    /// A character was typed.
    Text(char),
}

/// A message from the windowing layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlatformMessage {
    /// User input.
    Input(InputEvent),
    /// The window's client area changed size.
    Resized {
        /// New width in pixels.
        width: u32,
        /// New height in pixels.
        height: u32,
    },
    /// The window gained (`true`) or lost focus.
    FocusChanged(bool),
    /// The user asked to close the window.
    CloseRequested,
}

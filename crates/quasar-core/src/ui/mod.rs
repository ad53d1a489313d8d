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

//! Contracts with the user-interface subsystem.

use crate::event::InputEvent;
use crate::renderer::UiQuad;

/// Receives input events routed to the user interface.
pub trait UiEventSink: Send {
    /// Handles one event. Returns `true` if the UI consumed it.
    fn handle_event(&mut self, event: &InputEvent) -> bool;
}

/// Produces the quads of the user interface for the current frame.
pub trait UiRenderer: Send + Sync {
    /// Appends this frame's quads to `out`, back to front.
    fn build_draw_list(&self, out: &mut Vec<UiQuad>);
}

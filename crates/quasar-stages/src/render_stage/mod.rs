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

//! Rendering pipeline stages.
//!
//! A frame runs `ClearFrame`, `SceneSubmission`, `UiDraw`, `DebugOverlay`
//! and finally `FrameSwap`, which hands everything enqueued so far to the
//! graphics backend.

mod clear_frame;
mod debug_overlay;
mod frame_swap;
mod scene_submission;
mod ui_draw;

pub use clear_frame::*;
pub use debug_overlay::*;
pub use frame_swap::*;
pub use scene_submission::*;
pub use ui_draw::*;

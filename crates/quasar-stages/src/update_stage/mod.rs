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

//! Update pipeline stages: message pump, dispatcher, UI events, audio.

mod audio;
mod dispatcher;
mod message_pump;
mod ui_events;

pub use audio::*;
pub use dispatcher::*;
pub use message_pump::*;
pub use ui_events::*;

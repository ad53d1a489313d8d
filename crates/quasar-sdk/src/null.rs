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

//! Collaborators that do nothing, used when the application supplies none.

use quasar_core::audio::AudioSystem;
use quasar_core::event::InputEvent;
use quasar_core::physics::PhysicsWorld;
use quasar_core::renderer::UiQuad;
use quasar_core::ui::{UiEventSink, UiRenderer};
use quasar_core::StageError;
use std::time::Duration;

/// A UI that consumes no input and draws nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullUi;

impl UiEventSink for NullUi {
    fn handle_event(&mut self, _event: &InputEvent) -> bool {
        false
    }
}

impl UiRenderer for NullUi {
    fn build_draw_list(&self, _quads: &mut Vec<UiQuad>) {}
}

/// An audio system without output.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullAudio;

impl AudioSystem for NullAudio {
    fn update(&mut self, _delta_time: Duration) -> Result<(), StageError> {
        Ok(())
    }
}

/// A physics world without bodies.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullPhysicsWorld;

impl PhysicsWorld for NullPhysicsWorld {
    fn step(&mut self, _delta_time: Duration) -> Result<(), StageError> {
        Ok(())
    }
}

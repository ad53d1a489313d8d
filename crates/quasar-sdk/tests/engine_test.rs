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

use anyhow::Result;
use quasar_sdk::prelude::*;
use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tempfile::NamedTempFile;

struct Grid;

impl SceneSource for Grid {
    fn cameras(&self) -> Vec<Camera> {
        vec![Camera {
            id: CameraId(0),
            viewport: Viewport {
                x: 0,
                y: 0,
                width: 800,
                height: 600,
            },
            layers: LayerMask::ALL,
        }]
    }

    fn visit_models(&self, _camera: &Camera, visitor: &mut dyn FnMut(&dyn RenderModel)) {
        for id in 0..6u64 {
            visitor(&SceneModel {
                id: ModelId(id),
                visible: true,
                enabled: true,
                mesh: Some(MeshId(id % 2)),
                shader: Some(ShaderHandle((id % 3) as u32)),
                layer: if id < 4 {
                    RenderLayer::Opaque
                } else {
                    RenderLayer::Transparent
                },
                double_sided: id == 5,
            });
        }
    }
}

fn fast_physics() -> EngineConfig {
    let mut config = EngineConfig::default();
    config.physics.time_step_ms = 1;
    config
}

#[test]
fn test_engine_renders_every_tick() -> Result<()> {
    let backend = HeadlessBackend::new();
    let stats = backend.stats_handle();
    let mut engine = EngineBuilder::new()
        .config(fast_physics())
        .scene(Arc::new(Grid))
        .backend(backend)
        .build()?;

    assert_eq!(engine.run(Some(3))?, 3);
    let frame = engine.stats().last_frame;
    assert_eq!(frame.frame, 2);
    assert_eq!(frame.cameras, 1);
    assert_eq!(frame.batches.queued_models, 6);

    let backend = stats.snapshot();
    assert_eq!(backend.frames_presented, 3);
    assert_eq!(backend.draw_calls, 18);
    assert_eq!(backend.last_frame_draws, 6);
    assert_eq!(backend.resets, 1);

    engine.shutdown()?;
    assert!(engine.tick().is_err());
    Ok(())
}

#[test]
fn test_close_request_ends_the_run() -> Result<()> {
    let mut engine = EngineBuilder::new().config(fast_physics()).build()?;
    let sender = engine.message_sender();
    engine.run(Some(2))?;
    sender.post(PlatformMessage::CloseRequested);
    assert_eq!(engine.run(None)?, 1);
    Ok(())
}

#[test]
fn test_settings_reach_running_pipelines() -> Result<()> {
    let backend = HeadlessBackend::new();
    let stats = backend.stats_handle();
    let mut engine = EngineBuilder::new()
        .config(fast_physics())
        .backend(backend)
        .build()?;

    engine.render_settings().update(|s| {
        s.clear_color = [1.0, 0.0, 1.0, 1.0];
        s.debug_overlay = true;
    });
    engine.tick()?;

    let snapshot = stats.snapshot();
    assert_eq!(snapshot.last_clear_color, [1.0, 0.0, 1.0, 1.0]);
    assert_eq!(snapshot.debug_texts, 3);
    Ok(())
}

#[test]
fn test_physics_runs_on_its_own_thread() -> Result<()> {
    let engine = EngineBuilder::new().config(fast_physics()).build()?;
    let deadline = Instant::now() + Duration::from_secs(5);
    while engine.stats().physics_steps < 3 && Instant::now() < deadline {
        std::thread::sleep(Duration::from_millis(2));
    }
    assert!(engine.stats().physics_steps >= 3);
    assert_eq!(engine.stats().physics_faults, 0);

    engine.physics_settings().update(|s| s.enabled = false);
    std::thread::sleep(Duration::from_millis(20));
    let paused = engine.stats().physics_steps;
    std::thread::sleep(Duration::from_millis(20));
    assert_eq!(engine.stats().physics_steps, paused);
    Ok(())
}

struct CountTicks(Arc<AtomicUsize>);

impl Stage<UpdateContext> for CountTicks {
    fn id(&self) -> StageId {
        StageId::new("test.count_ticks")
    }

    fn execute_after(&self) -> &'static [StageId] {
        &[MessagePumpStage::ID]
    }

    fn on_execute(&mut self, _ctx: &mut UpdateContext) -> Result<(), StageError> {
        self.0.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[test]
fn test_custom_stage_joins_the_pipeline() -> Result<()> {
    let ticks = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&ticks);
    let mut engine = EngineBuilder::new()
        .config(fast_physics())
        .stage::<UpdateContext, _>(move || CountTicks(Arc::clone(&counter)))
        .build()?;
    engine.run(Some(4))?;
    assert_eq!(ticks.load(Ordering::SeqCst), 4);
    Ok(())
}

struct Loop;

impl Stage<RenderingContext> for Loop {
    fn id(&self) -> StageId {
        StageId::new("test.loop")
    }

    fn execute_after(&self) -> &'static [StageId] {
        &[FrameSwapStage::ID]
    }

    fn execute_before(&self) -> &'static [StageId] {
        &[ClearFrameStage::ID]
    }

    fn on_execute(&mut self, _ctx: &mut RenderingContext) -> Result<(), StageError> {
        Ok(())
    }
}

#[test]
fn test_cycle_fails_the_build() {
    let result = EngineBuilder::new()
        .config(fast_physics())
        .stage::<RenderingContext, _>(|| Loop)
        .build();
    let message = format!("{:#}", result.err().unwrap());
    assert!(message.contains("Failed to start the rendering pipeline"));
    assert!(message.contains("dependency cycle"));
}

#[test]
fn test_config_file_drives_initial_settings() -> Result<()> {
    let mut file = NamedTempFile::new()?;
    writeln!(
        file,
        "(rendering: (clear_color: (0.0, 1.0, 0.0, 1.0)), physics: (time_step_ms: 1))"
    )?;
    let config = EngineConfig::load(file.path())?;

    let backend = HeadlessBackend::new();
    let stats = backend.stats_handle();
    let mut engine = EngineBuilder::new().config(config).backend(backend).build()?;
    engine.tick()?;
    assert_eq!(stats.snapshot().last_clear_color, [0.0, 1.0, 0.0, 1.0]);
    Ok(())
}

#[test]
fn test_missing_config_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = EngineConfig::load(dir.path().join("absent.ron")).unwrap_err();
    assert!(err.to_string().contains("Failed to read engine configuration"));
}

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

// Quasar Tutorial
// Drives the three pipelines headlessly with a custom update stage

use std::path::PathBuf;
use std::sync::{Arc, PoisonError, RwLock};
use std::thread;

use anyhow::Result;
use clap::Parser;
use quasar_sdk::prelude::*;

#[derive(Clone, Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Engine configuration file (RON).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of frames to run.
    #[arg(long, default_value_t = 120)]
    frames: u64,
}

/// A small scene whose models are edited by [`Orbit`].
struct DemoScene {
    models: RwLock<Vec<SceneModel>>,
}

impl DemoScene {
    fn new() -> Self {
        let layers = [
            RenderLayer::Background,
            RenderLayer::Opaque,
            RenderLayer::Opaque,
            RenderLayer::Cutout,
            RenderLayer::Transparent,
            RenderLayer::Debug,
        ];
        let models = layers
            .iter()
            .enumerate()
            .map(|(i, &layer)| SceneModel {
                id: ModelId(i as u64),
                visible: true,
                // The last model is enabled once its mesh "loads".
                enabled: i + 1 < layers.len(),
                mesh: Some(MeshId(i as u64 % 3)),
                shader: Some(ShaderHandle(i as u32 % 2)),
                layer,
                double_sided: layer == RenderLayer::Cutout,
            })
            .collect();
        Self {
            models: RwLock::new(models),
        }
    }

    fn edit(&self, f: impl FnOnce(&mut Vec<SceneModel>)) {
        f(&mut self.models.write().unwrap_or_else(PoisonError::into_inner));
    }
}

impl SceneSource for DemoScene {
    fn cameras(&self) -> Vec<Camera> {
        vec![
            Camera {
                id: CameraId(0),
                viewport: Viewport {
                    x: 0,
                    y: 0,
                    width: 1280,
                    height: 720,
                },
                layers: LayerMask::GEOMETRY,
            },
            Camera {
                id: CameraId(1),
                viewport: Viewport {
                    x: 960,
                    y: 0,
                    width: 320,
                    height: 180,
                },
                layers: LayerMask::ALL,
            },
        ]
    }

    fn visit_models(&self, _camera: &Camera, visitor: &mut dyn FnMut(&dyn RenderModel)) {
        let models = self.models.read().unwrap_or_else(PoisonError::into_inner);
        for model in models.iter() {
            visitor(model);
        }
    }
}

/// Moves models in and out of view every few frames.
struct Orbit {
    scene: Arc<DemoScene>,
}

impl Orbit {
    const ID: StageId = StageId::new("tutorial.orbit");
    const PERIOD: u64 = 10;
}

impl Stage<UpdateContext> for Orbit {
    fn id(&self) -> StageId {
        Self::ID
    }

    fn execute_after(&self) -> &'static [StageId] {
        &[DispatcherStage::ID]
    }

    fn on_execute(&mut self, ctx: &mut UpdateContext) -> Result<(), StageError> {
        if ctx.frame % Self::PERIOD != 0 {
            return Ok(());
        }
        let hidden = (ctx.frame / Self::PERIOD) as usize;
        self.scene.edit(|models| {
            let count = models.len();
            for (i, model) in models.iter_mut().enumerate() {
                model.visible = i != hidden % count;
            }
        });
        Ok(())
    }
}

fn main() -> Result<()> {
    use env_logger::{Builder, Env};

    Builder::from_env(Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };

    let scene = Arc::new(DemoScene::new());
    let backend = HeadlessBackend::new();
    let backend_stats = backend.stats_handle();

    let orbit_scene = Arc::clone(&scene);
    let mut engine = Engine::builder()
        .config(config)
        .scene(scene.clone())
        .backend(backend)
        .stage::<UpdateContext, _>(move || Orbit {
            scene: Arc::clone(&orbit_scene),
        })
        .build()?;

    // Simulated asset load finishing on a worker thread.
    let dispatcher = engine.dispatcher();
    let loaded_scene = Arc::clone(&scene);
    let loader = thread::spawn(move || {
        dispatcher.post(move || {
            loaded_scene.edit(|models| {
                if let Some(model) = models.last_mut() {
                    model.enabled = true;
                }
            });
            log::info!("Debug gizmo mesh loaded.");
        })
    });
    if loader.join().map_or(true, |posted| !posted) {
        log::warn!("Asset loader could not reach the dispatcher.");
    }

    let mut ran = 0;
    while ran < args.frames {
        if ran == args.frames / 2 {
            log::info!("Turning the debug overlay on.");
            engine.render_settings().update(|s| s.debug_overlay = true);
        }
        ran += 1;
        if !engine.tick()? {
            break;
        }
    }

    let stats = engine.stats();
    let backend = backend_stats.snapshot();
    log::info!(
        "Ran {} tick(s): {} frame(s) presented, {} draw call(s), {} debug text line(s), {} physics step(s).",
        stats.ticks,
        backend.frames_presented,
        backend.draw_calls,
        backend.debug_texts,
        stats.physics_steps
    );
    log::info!("Last frame: {:?}", stats.last_frame);

    engine.shutdown()
}

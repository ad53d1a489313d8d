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

//! Drives the physics pipeline from a fixed-interval timer thread.

use crate::binding::SettingsBinding;
use crate::pipeline::SharedPipeline;
use quasar_core::settings::{PhysicsSettings, SettingsObserver, SettingsService, SubscriptionId};
use quasar_core::PhysicsContext;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, PoisonError};
use std::thread;
use std::time::{Duration, Instant};

struct TimerState {
    running: AtomicBool,
    enabled: AtomicBool,
    interval_us: AtomicU64,
    ticks: AtomicU64,
    faults: AtomicU64,
}

impl TimerState {
    fn interval(&self) -> Duration {
        Duration::from_micros(self.interval_us.load(Ordering::SeqCst))
    }

    fn set_interval(&self, interval: Duration) {
        let micros = u64::try_from(interval.as_micros()).unwrap_or(u64::MAX).max(1);
        self.interval_us.store(micros, Ordering::SeqCst);
    }
}

/// Executes the physics pipeline once per time step on a dedicated thread.
///
/// The pipeline must be started before the loop; a tick on a stopped
/// pipeline is counted as a fault.
pub struct PhysicsLoop {
    pipeline: SharedPipeline<PhysicsContext>,
    timer: Arc<TimerState>,
    handle: Option<thread::JoinHandle<()>>,
}

impl PhysicsLoop {
    /// Creates a stopped loop ticking at `settings.time_step()`.
    pub fn new(pipeline: SharedPipeline<PhysicsContext>, settings: &PhysicsSettings) -> Self {
        let timer = Arc::new(TimerState {
            running: AtomicBool::new(false),
            enabled: AtomicBool::new(settings.enabled),
            interval_us: AtomicU64::new(0),
            ticks: AtomicU64::new(0),
            faults: AtomicU64::new(0),
        });
        timer.set_interval(settings.time_step());
        Self {
            pipeline,
            timer,
            handle: None,
        }
    }

    /// Spawns the timer thread. Does nothing if it is already running.
    pub fn start(&mut self) -> std::io::Result<()> {
        if self.timer.running.swap(true, Ordering::SeqCst) {
            return Ok(());
        }

        let timer = Arc::clone(&self.timer);
        let pipeline = Arc::clone(&self.pipeline);
        let spawned = thread::Builder::new()
            .name("quasar-physics".into())
            .spawn(move || run_timer(&timer, &pipeline));

        match spawned {
            Ok(handle) => {
                self.handle = Some(handle);
                Ok(())
            }
            Err(e) => {
                self.timer.running.store(false, Ordering::SeqCst);
                Err(e)
            }
        }
    }

    /// Stops the timer thread and waits for the tick in flight to finish.
    pub fn stop(&mut self) {
        self.timer.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            handle.thread().unpark();
            if handle.join().is_err() {
                log::error!("Physics loop thread panicked");
            }
        }
    }

    /// Returns `true` while the timer thread is running.
    pub fn is_running(&self) -> bool {
        self.timer.running.load(Ordering::SeqCst)
    }

    /// Returns `true` if ticks are currently executed.
    pub fn is_enabled(&self) -> bool {
        self.timer.enabled.load(Ordering::SeqCst)
    }

    /// The current tick interval.
    pub fn interval(&self) -> Duration {
        self.timer.interval()
    }

    /// Ticks that completed successfully.
    pub fn tick_count(&self) -> u64 {
        self.timer.ticks.load(Ordering::SeqCst)
    }

    /// Ticks that returned an error.
    pub fn fault_count(&self) -> u64 {
        self.timer.faults.load(Ordering::SeqCst)
    }

    /// The driven pipeline.
    pub fn pipeline(&self) -> &SharedPipeline<PhysicsContext> {
        &self.pipeline
    }

    /// Builds an observer that retimes the loop and forwards the settings to the pipeline.
    pub fn settings_observer(&self) -> PhysicsTimerBinding {
        PhysicsTimerBinding {
            timer: Arc::clone(&self.timer),
            binding: SettingsBinding::new(&self.pipeline),
        }
    }

    /// Subscribes the loop to `service`.
    pub fn bind(&self, service: &SettingsService<PhysicsSettings>) -> SubscriptionId {
        service.subscribe(Arc::new(self.settings_observer()))
    }
}

impl Drop for PhysicsLoop {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Observer returned by [`PhysicsLoop::settings_observer`].
///
/// The timer is disabled while the interval and the pipeline settings are
/// updated, then re-enabled if the new settings ask for it.
pub struct PhysicsTimerBinding {
    timer: Arc<TimerState>,
    binding: SettingsBinding<PhysicsContext>,
}

impl SettingsObserver<PhysicsSettings> for PhysicsTimerBinding {
    fn on_settings_changed(&self, settings: &PhysicsSettings) {
        self.timer.enabled.store(false, Ordering::SeqCst);
        self.timer.set_interval(settings.time_step());
        self.binding.deliver(settings);
        self.timer.enabled.store(settings.enabled, Ordering::SeqCst);
        log::debug!(
            "Physics loop retimed to {:?} ({})",
            settings.time_step(),
            if settings.enabled { "enabled" } else { "disabled" }
        );
    }
}

fn run_timer(timer: &TimerState, pipeline: &SharedPipeline<PhysicsContext>) {
    log::info!("Physics loop started at {:?} per step.", timer.interval());
    let mut next_tick = Instant::now() + timer.interval();

    while timer.running.load(Ordering::Relaxed) {
        let now = Instant::now();
        if now < next_tick {
            thread::park_timeout(next_tick - now);
            continue;
        }
        // Late ticks are not caught up.
        next_tick = now + timer.interval();

        if !timer.enabled.load(Ordering::SeqCst) {
            continue;
        }

        let result = pipeline
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .execute();
        match result {
            Ok(()) => {
                timer.ticks.fetch_add(1, Ordering::SeqCst);
            }
            Err(e) => {
                timer.faults.fetch_add(1, Ordering::SeqCst);
                log::error!("Physics tick failed: {e}");
            }
        }
    }

    log::info!("Physics loop stopped.");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::Pipeline;
    use quasar_core::{PipelineContext, Stage, StageError, StageId};

    struct Step;

    impl Stage<PhysicsContext> for Step {
        fn id(&self) -> StageId {
            StageId::new("test.step")
        }
        fn on_execute(&mut self, ctx: &mut PhysicsContext) -> Result<(), StageError> {
            ctx.steps += 1;
            Ok(())
        }
    }

    fn fast_settings(enabled: bool) -> PhysicsSettings {
        PhysicsSettings {
            time_step_ms: 1,
            enabled,
        }
    }

    fn started_pipeline(settings: &PhysicsSettings) -> SharedPipeline<PhysicsContext> {
        let source = || vec![Box::new(Step) as Box<dyn Stage<PhysicsContext>>];
        let mut pipeline = Pipeline::new(Arc::new(source));
        pipeline.start(PhysicsContext::new(settings.clone())).unwrap();
        pipeline.into_shared()
    }

    fn wait_for(mut condition: impl FnMut() -> bool) -> bool {
        let deadline = Instant::now() + Duration::from_secs(5);
        while Instant::now() < deadline {
            if condition() {
                return true;
            }
            thread::sleep(Duration::from_millis(2));
        }
        false
    }

    #[test]
    fn test_loop_lifecycle() {
        let settings = fast_settings(true);
        let mut physics = PhysicsLoop::new(started_pipeline(&settings), &settings);
        physics.start().unwrap();
        assert!(physics.is_running());
        assert!(wait_for(|| physics.tick_count() >= 3));
        physics.stop();
        assert!(!physics.is_running());

        let steps = physics.pipeline().lock().unwrap().context().unwrap().steps;
        assert_eq!(steps, physics.tick_count());
    }

    #[test]
    fn test_disabled_loop_does_not_tick() {
        let settings = fast_settings(false);
        let mut physics = PhysicsLoop::new(started_pipeline(&settings), &settings);
        physics.start().unwrap();
        thread::sleep(Duration::from_millis(30));
        physics.stop();
        assert_eq!(physics.tick_count(), 0);
    }

    #[test]
    fn test_settings_change_retimes_and_enables() {
        let initial = PhysicsSettings {
            time_step_ms: 50,
            enabled: false,
        };
        let service = SettingsService::new(initial.clone());
        let mut physics = PhysicsLoop::new(started_pipeline(&initial), &initial);
        physics.bind(&service);
        physics.start().unwrap();

        service.set(fast_settings(true));
        assert_eq!(physics.interval(), Duration::from_millis(1));
        assert!(physics.is_enabled());
        assert!(wait_for(|| physics.tick_count() > 0));
        physics.stop();

        let pipeline = physics.pipeline().lock().unwrap();
        assert_eq!(pipeline.context().unwrap().settings().time_step_ms, 1);
    }

    #[test]
    fn test_stopped_pipeline_counts_faults() {
        let settings = fast_settings(true);
        let source = || vec![Box::new(Step) as Box<dyn Stage<PhysicsContext>>];
        let pipeline = Pipeline::new(Arc::new(source)).into_shared();
        let mut physics = PhysicsLoop::new(pipeline, &settings);
        physics.start().unwrap();
        assert!(wait_for(|| physics.fault_count() > 0));
        physics.stop();
        assert_eq!(physics.tick_count(), 0);
    }
}

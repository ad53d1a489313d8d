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

//! Forwards settings changes from a [`SettingsService`] into a running pipeline.

use crate::pipeline::{Pipeline, SharedPipeline};
use quasar_core::settings::{SettingsObserver, SettingsService, SubscriptionId};
use quasar_core::PipelineContext;
use std::sync::{Arc, Mutex, PoisonError, TryLockError, Weak};

/// Holds the latest settings value that could not be applied right away.
///
/// Posting overwrites any value still waiting; only the latest one matters.
pub struct SettingsMailbox<S> {
    slot: Arc<Mutex<Option<S>>>,
}

impl<S> SettingsMailbox<S> {
    /// Creates an empty mailbox.
    pub fn new() -> Self {
        Self {
            slot: Arc::new(Mutex::new(None)),
        }
    }

    /// Parks `settings`, replacing any value still waiting.
    pub fn post(&self, settings: S) {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(settings);
    }

    /// Takes the waiting value, if any.
    pub fn take(&self) -> Option<S> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner).take()
    }

    /// Returns `true` if a value is waiting.
    pub fn is_pending(&self) -> bool {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner).is_some()
    }
}

impl<S> Clone for SettingsMailbox<S> {
    fn clone(&self) -> Self {
        Self {
            slot: Arc::clone(&self.slot),
        }
    }
}

impl<S> Default for SettingsMailbox<S> {
    fn default() -> Self {
        Self::new()
    }
}

/// A [`SettingsObserver`] that pushes new settings into a pipeline.
///
/// If the pipeline is free, the settings are applied on the notifying thread.
/// If it is busy (for example mid-tick on another thread, or the change was
/// made by one of its own stages), they are parked in the pipeline's mailbox
/// and applied at the start of its next tick.
pub struct SettingsBinding<C: PipelineContext> {
    pipeline: Weak<Mutex<Pipeline<C>>>,
    mailbox: SettingsMailbox<C::Settings>,
}

impl<C: PipelineContext> SettingsBinding<C> {
    /// Creates a binding for `pipeline`.
    ///
    /// Holds the pipeline weakly, so the service does not keep it alive.
    pub fn new(pipeline: &SharedPipeline<C>) -> Self {
        let mailbox = pipeline
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .settings_mailbox();
        Self {
            pipeline: Arc::downgrade(pipeline),
            mailbox,
        }
    }

    /// Delivers `settings` now or at the pipeline's next tick.
    pub fn deliver(&self, settings: &C::Settings) {
        let Some(pipeline) = self.pipeline.upgrade() else {
            return;
        };
        let attempt = pipeline.try_lock();
        match attempt {
            Ok(mut pipeline) => pipeline.apply_settings(settings.clone()),
            Err(TryLockError::Poisoned(poisoned)) => {
                poisoned.into_inner().apply_settings(settings.clone())
            }
            Err(TryLockError::WouldBlock) => {
                log::debug!("{} pipeline is busy, deferring settings change", C::KIND);
                self.mailbox.post(settings.clone());
            }
        };
    }
}

impl<C: PipelineContext> SettingsObserver<C::Settings> for SettingsBinding<C> {
    fn on_settings_changed(&self, settings: &C::Settings) {
        self.deliver(settings);
    }
}

/// Subscribes `pipeline` to changes published by `service`.
pub fn bind_settings<C: PipelineContext>(
    pipeline: &SharedPipeline<C>,
    service: &SettingsService<C::Settings>,
) -> SubscriptionId {
    service.subscribe(Arc::new(SettingsBinding::new(pipeline)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use quasar_core::{PipelineKind, Stage, StageError, StageId};

    #[derive(Default)]
    struct Counter {
        settings: u8,
    }

    impl PipelineContext for Counter {
        type Settings = u8;
        const KIND: PipelineKind = PipelineKind::Physics;
        fn settings(&self) -> &u8 {
            &self.settings
        }
        fn set_settings(&mut self, settings: u8) {
            self.settings = settings;
        }
    }

    struct Noop;

    impl Stage<Counter> for Noop {
        fn id(&self) -> StageId {
            StageId::new("noop")
        }
        fn on_execute(&mut self, _: &mut Counter) -> Result<(), StageError> {
            Ok(())
        }
    }

    fn started() -> SharedPipeline<Counter> {
        let source = || vec![Box::new(Noop) as Box<dyn Stage<Counter>>];
        let mut pipeline = Pipeline::new(Arc::new(source));
        pipeline.start(Counter::default()).unwrap();
        pipeline.into_shared()
    }

    fn current(pipeline: &SharedPipeline<Counter>) -> u8 {
        *pipeline.lock().unwrap().context().unwrap().settings()
    }

    #[test]
    fn test_mailbox_keeps_latest() {
        let mailbox = SettingsMailbox::new();
        mailbox.post(1);
        mailbox.post(2);
        assert!(mailbox.is_pending());
        assert_eq!(mailbox.take(), Some(2));
        assert_eq!(mailbox.take(), None);
    }

    #[test]
    fn test_free_pipeline_applies_immediately() {
        let pipeline = started();
        let service = SettingsService::new(0u8);
        bind_settings(&pipeline, &service);
        service.set(5);
        assert_eq!(current(&pipeline), 5);
    }

    #[test]
    fn test_busy_pipeline_defers_to_next_tick() {
        let pipeline = started();
        let binding = SettingsBinding::new(&pipeline);
        {
            let _busy = pipeline.lock().unwrap();
            binding.deliver(&9);
        }
        assert_eq!(current(&pipeline), 0);
        pipeline.lock().unwrap().execute().unwrap();
        assert_eq!(current(&pipeline), 9);
    }

    #[test]
    fn test_poisoned_pipeline_still_receives_settings() {
        let pipeline = started();
        let poisoner = Arc::clone(&pipeline);
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.lock().unwrap();
            panic!("stage panicked mid-tick");
        })
        .join();
        assert!(pipeline.is_poisoned());

        SettingsBinding::new(&pipeline).deliver(&4);
        let settings = *pipeline
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .context()
            .unwrap()
            .settings();
        assert_eq!(settings, 4);
    }

    #[test]
    fn test_dropped_pipeline_is_ignored() {
        let pipeline = started();
        let service = SettingsService::new(0u8);
        bind_settings(&pipeline, &service);
        drop(pipeline);
        service.set(3);
    }
}

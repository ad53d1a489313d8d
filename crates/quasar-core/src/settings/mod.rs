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

//! Observable settings snapshots.
//!
//! A [`SettingsService`] holds the current value of one settings type and
//! pushes every change synchronously to its observers. Persistence is not
//! handled here: whoever loads settings from disk simply calls
//! [`SettingsService::set`].

mod types;

pub use self::types::*;

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

/// Receives settings changes.
pub trait SettingsObserver<T>: Send + Sync {
    /// Called on the thread that changed the settings, after the new value is stored.
    fn on_settings_changed(&self, settings: &T);
}

impl<T, F> SettingsObserver<T> for F
where
    F: Fn(&T) + Send + Sync,
{
    fn on_settings_changed(&self, settings: &T) {
        self(settings)
    }
}

/// Handle returned by [`SettingsService::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(u64);

/// The current value of a settings type and the observers interested in it.
pub struct SettingsService<T> {
    current: RwLock<T>,
    observers: Mutex<BTreeMap<SubscriptionId, Arc<dyn SettingsObserver<T>>>>,
    next_id: AtomicU64,
}

impl<T: Clone + Send + Sync + 'static> SettingsService<T> {
    /// Creates a service holding `initial`.
    pub fn new(initial: T) -> Self {
        Self {
            current: RwLock::new(initial),
            observers: Mutex::new(BTreeMap::new()),
            next_id: AtomicU64::new(0),
        }
    }

    /// Returns a snapshot of the current settings.
    pub fn get(&self) -> T {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Stores `settings` and notifies every observer, in subscription order.
    ///
    /// Observers are called without any internal lock held, so they may read
    /// the service or even subscribe new observers.
    pub fn set(&self, settings: T) {
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = settings.clone();

        let observers: Vec<_> = self
            .observers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect();
        log::debug!("Settings changed, notifying {} observer(s)", observers.len());
        for observer in observers {
            observer.on_settings_changed(&settings);
        }
    }

    /// Applies `change` to a copy of the current settings and stores the result.
    pub fn update(&self, change: impl FnOnce(&mut T)) {
        let mut settings = self.get();
        change(&mut settings);
        self.set(settings);
    }

    /// Registers an observer; it is not called for the current value.
    pub fn subscribe(&self, observer: Arc<dyn SettingsObserver<T>>) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.observers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, observer);
        id
    }

    /// Removes an observer. Returns `false` if it was not subscribed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.observers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&id)
            .is_some()
    }

    /// Returns the number of subscribed observers.
    pub fn observer_count(&self) -> usize {
        self.observers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl<T: Clone + Default + Send + Sync + 'static> Default for SettingsService<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

use std::sync::{Arc, PoisonError, RwLock};

use super::config::ParameterStore;

/// Configuration shared between the control surface and the worker.
///
/// Writers swap in a whole new value; the worker takes one snapshot per
/// frame and never observes a half-applied edit.
#[derive(Clone, Debug, Default)]
pub struct ParameterHandle {
    inner: Arc<RwLock<Arc<ParameterStore>>>,
}

impl ParameterHandle {
    pub fn new(params: ParameterStore) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Arc::new(params))),
        }
    }

    /// The current configuration.
    pub fn snapshot(&self) -> Arc<ParameterStore> {
        let guard = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard)
    }

    /// Replace the configuration.
    pub fn publish(&self, params: ParameterStore) {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        *guard = Arc::new(params);
    }

    /// Edit a copy of the configuration and publish it atomically.
    pub fn update<F>(&self, edit: F)
    where
        F: FnOnce(&mut ParameterStore),
    {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        let mut next = ParameterStore::clone(&guard);
        edit(&mut next);
        *guard = Arc::new(next);
    }

    /// Restore defaults, keeping what was taken from the source (fps,
    /// channel count and ring length in seconds).
    pub fn reset(&self) {
        self.update(|params| {
            let mut fresh = ParameterStore {
                fps: params.fps,
                n_channels: params.n_channels,
                active_channels: vec![true; params.n_channels],
                ..ParameterStore::default()
            };
            fresh.set_buffer_seconds(params.buffer_seconds().max(1));
            *params = fresh;
        });
    }
}

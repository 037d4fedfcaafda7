//! Scoped environment overrides for integration tests.

use std::env;
use std::sync::{Mutex, MutexGuard, OnceLock};

static ENV_MUTEX: OnceLock<Mutex<()>> = OnceLock::new();

/// Restores the overridden variables when dropped.
///
/// Guards serialise on a process-wide mutex, so tests touching the
/// environment never interleave.
pub struct EnvOverride {
    saved: Vec<(&'static str, Option<String>)>,
    _lock: MutexGuard<'static, ()>,
}

impl EnvOverride {
    /// Sets or clears each variable for the guard lifetime.
    pub fn apply(changes: &[(&'static str, Option<&str>)]) -> Self {
        let lock = ENV_MUTEX
            .get_or_init(|| Mutex::new(()))
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let saved = changes
            .iter()
            .map(|(key, value)| {
                let previous = env::var(key).ok();
                write_var(key, *value);
                (*key, previous)
            })
            .collect();
        Self { saved, _lock: lock }
    }
}

impl Drop for EnvOverride {
    fn drop(&mut self) {
        for (key, previous) in self.saved.drain(..) {
            write_var(key, previous.as_deref());
        }
    }
}

fn write_var(key: &str, value: Option<&str>) {
    unsafe {
        // SAFETY: ENV_MUTEX serialises environment mutation across tests.
        match value {
            Some(new_value) => env::set_var(key, new_value),
            None => env::remove_var(key),
        }
    }
}

use std::sync::{Mutex, MutexGuard};

/// Guard that overrides process environment variables for its lifetime.
///
/// The environment is process-global and Rust runs tests in parallel, so the
/// guard also holds a mutex that serializes env-sensitive tests. Dropping it
/// restores every touched variable to its previous value, including on panic.
pub struct ScopedEnv {
    saved: Vec<(String, Option<String>)>,
    _serialize: MutexGuard<'static, ()>,
}

impl ScopedEnv {
    /// Apply `overrides` and return the guard. `Some(v)` sets a variable,
    /// `None` unsets it.
    pub fn set(overrides: &[(&str, Option<&str>)]) -> Self {
        static ENV_MUTEX: Mutex<()> = Mutex::new(());
        // A panic while a guard was live is already reported by that test.
        let serialize = ENV_MUTEX
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let mut saved: Vec<(String, Option<String>)> = Vec::with_capacity(overrides.len());
        for (key, value) in overrides {
            if !saved.iter().any(|(k, _)| k == key) {
                saved.push((key.to_string(), std::env::var(key).ok()));
            }
            match value {
                Some(v) => std::env::set_var(key, v),
                None => std::env::remove_var(key),
            }
        }

        Self {
            saved,
            _serialize: serialize,
        }
    }
}

impl Drop for ScopedEnv {
    fn drop(&mut self) {
        for (key, value) in self.saved.drain(..) {
            match value {
                Some(v) => std::env::set_var(&key, v),
                None => std::env::remove_var(&key),
            }
        }
    }
}

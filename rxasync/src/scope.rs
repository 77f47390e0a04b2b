use std::fmt;
use std::sync::{Mutex, PoisonError};
use tracing::debug;

type TeardownHook = Box<dyn FnOnce() + Send>;

/// The owning view of one or more async handles.
///
/// Hooks registered with [`ViewScope::on_unmount`] run once, in registration
/// order, when the scope is unmounted or dropped.
pub struct ViewScope {
    hooks: Mutex<Option<Vec<TeardownHook>>>,
}

impl ViewScope {
    pub fn new() -> Self {
        ViewScope {
            hooks: Mutex::new(Some(Vec::new())),
        }
    }

    /// Register a teardown hook. On an already unmounted scope the hook
    /// runs immediately.
    pub fn on_unmount<F>(&self, hook: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let mut guard = self.hooks.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(hooks) = guard.as_mut() {
            hooks.push(Box::new(hook));
            return;
        }
        drop(guard);
        hook();
    }

    pub fn is_mounted(&self) -> bool {
        self.hooks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    pub fn unmount(&self) {
        let hooks = self
            .hooks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(hooks) = hooks {
            debug!("ViewScope | unmount, running {} hook(s)", hooks.len());
            for hook in hooks {
                hook();
            }
        }
    }
}

impl Default for ViewScope {
    fn default() -> Self {
        ViewScope::new()
    }
}

impl Drop for ViewScope {
    fn drop(&mut self) {
        self.unmount();
    }
}

impl fmt::Debug for ViewScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewScope")
            .field("mounted", &self.is_mounted())
            .finish()
    }
}

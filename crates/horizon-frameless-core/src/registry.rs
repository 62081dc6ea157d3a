//! Per-window chrome registry.
//!
//! The [`ChromeRegistry`] maps a [`WindowHandle`] to its [`ChromeState`] and
//! keeps the ordered list of managed windows. It is the only shared mutable
//! state of the engine and is guarded by a single mutex.
//!
//! # Locking
//!
//! Every operation holds the lock only for the duration of a map access.
//! Readers get a copy of the record ([`ChromeRegistry::lookup`]) and must not
//! call into the OS or into user callbacks while holding the lock, because
//! native message handling can be re-entered synchronously by those calls.
//! [`ChromeRegistry::update`] runs a short closure under the lock; the
//! closure must stay free of such calls as well.
//!
//! # Example
//!
//! ```
//! use horizon_frameless_core::{ChromeRegistry, ChromeSettings, WindowHandle};
//!
//! let registry = ChromeRegistry::new();
//! let window = WindowHandle::new(0x1000);
//!
//! assert!(registry.add_window(window, ChromeSettings::new()));
//! assert!(!registry.add_window(window, ChromeSettings::new()));
//! assert!(registry.lookup(window).is_some());
//! assert!(registry.remove_window(window));
//! assert!(!registry.remove_window(window));
//! ```

use std::collections::HashMap;
use std::sync::OnceLock;

use parking_lot::Mutex;

use crate::logging::targets;
use crate::state::{ChromeLifecycle, ChromeSettings, ChromeState, WindowHandle};

/// Global registry instance.
static CHROME_REGISTRY: OnceLock<ChromeRegistry> = OnceLock::new();

#[derive(Debug, Default)]
struct RegistryInner {
    records: HashMap<WindowHandle, ChromeState>,
    order: Vec<WindowHandle>,
}

/// Thread-safe table of registered windows.
#[derive(Debug, Default)]
pub struct ChromeRegistry {
    inner: Mutex<RegistryInner>,
}

impl ChromeRegistry {
    /// Create an empty registry.
    ///
    /// Most code uses [`ChromeRegistry::instance`]; separate registries are
    /// useful for tests and embedding.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the process-wide registry, creating it on first use.
    pub fn instance() -> &'static ChromeRegistry {
        CHROME_REGISTRY.get_or_init(ChromeRegistry::new)
    }

    /// Register `window` with `settings`.
    ///
    /// Returns `false` without touching the existing record when the window
    /// is already registered, and for the null handle.
    pub fn add_window(&self, window: WindowHandle, settings: ChromeSettings) -> bool {
        if window.is_null() {
            tracing::debug!(target: targets::REGISTRY, "ignoring registration of null window handle");
            return false;
        }

        let mut inner = self.inner.lock();
        if inner.records.contains_key(&window) {
            tracing::debug!(target: targets::REGISTRY, %window, "window already registered");
            return false;
        }
        inner
            .records
            .insert(window, ChromeState::new(window, settings));
        inner.order.push(window);
        drop(inner);

        tracing::debug!(target: targets::REGISTRY, %window, "window registered");
        true
    }

    /// Unregister `window`. Returns `false` if it was not registered.
    pub fn remove_window(&self, window: WindowHandle) -> bool {
        self.take_window(window).is_some()
    }

    /// Unregister `window`, returning its last record.
    pub fn take_window(&self, window: WindowHandle) -> Option<ChromeState> {
        let mut inner = self.inner.lock();
        let state = inner.records.remove(&window)?;
        inner.order.retain(|id| *id != window);
        drop(inner);

        tracing::debug!(target: targets::REGISTRY, %window, "window unregistered");
        Some(state)
    }

    /// Copy out the record for `window`.
    pub fn lookup(&self, window: WindowHandle) -> Option<ChromeState> {
        self.inner.lock().records.get(&window).cloned()
    }

    /// Run `f` on the record for `window` while holding the lock.
    ///
    /// Returns `None` if the window is not registered.
    pub fn update<R>(&self, window: WindowHandle, f: impl FnOnce(&mut ChromeState) -> R) -> Option<R> {
        self.inner.lock().records.get_mut(&window).map(f)
    }

    /// Replace the settings of a registered window.
    ///
    /// Blur can only change before the window is first shown, so a blur
    /// change on an already-initialized window is stored but reported.
    pub fn update_settings(&self, window: WindowHandle, settings: ChromeSettings) -> bool {
        let blur_changed = self.update(window, |state| {
            let changed = state.initialized()
                && state.settings.blur_enabled() != settings.blur_enabled();
            state.settings = settings;
            changed
        });

        match blur_changed {
            Some(true) => {
                tracing::warn!(
                    target: targets::REGISTRY,
                    %window,
                    "blur can only be enabled or disabled before the window is shown"
                );
                true
            }
            Some(false) => true,
            None => {
                tracing::debug!(target: targets::REGISTRY, %window, "settings update for unregistered window");
                false
            }
        }
    }

    /// Move `window` from `Registered` to `Initialized`.
    ///
    /// Only the first caller for a given registration gets `true`; the
    /// caller then owns the one-time setup.
    pub fn begin_initialization(&self, window: WindowHandle) -> bool {
        self.update(window, |state| {
            if state.lifecycle == ChromeLifecycle::Registered {
                state.lifecycle = ChromeLifecycle::Initialized;
                true
            } else {
                false
            }
        })
        .unwrap_or(false)
    }

    /// Mark the one-time setup of `window` as finished.
    pub fn mark_active(&self, window: WindowHandle) -> bool {
        self.update(window, |state| {
            state.lifecycle = ChromeLifecycle::Active;
        })
        .is_some()
    }

    /// Claim `window` for removal.
    ///
    /// Only the first caller gets `true`; it restores the default frame and
    /// then removes the record. Later callers see the window as already
    /// being removed.
    pub fn begin_removal(&self, window: WindowHandle) -> bool {
        self.update(window, |state| !std::mem::replace(&mut state.detaching, true))
            .unwrap_or(false)
    }

    /// Whether `window` is registered.
    pub fn contains(&self, window: WindowHandle) -> bool {
        self.inner.lock().records.contains_key(&window)
    }

    /// Number of registered windows.
    pub fn len(&self) -> usize {
        self.inner.lock().records.len()
    }

    /// Whether no window is registered.
    pub fn is_empty(&self) -> bool {
        self.inner.lock().records.is_empty()
    }

    /// Registered windows in registration order.
    pub fn window_ids(&self) -> Vec<WindowHandle> {
        self.inner.lock().order.clone()
    }
}

static_assertions::assert_impl_all!(ChromeRegistry: Send, Sync);

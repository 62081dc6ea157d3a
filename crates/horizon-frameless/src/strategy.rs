//! The chrome strategy interface.
//!
//! Two strategies implement the same conceptual contract:
//!
//! - [`MessageInterceptor`](crate::MessageInterceptor) rewrites native
//!   non-client message handling (Windows).
//! - [`ToolkitEventFilter`](crate::ToolkitEventFilter) performs the same
//!   edge and drag decisions from toolkit pointer events.
//!
//! One of them is selected per process by [`ImplementationKind::select`] and
//! never mixed.

use std::fmt;

use horizon_frameless_core::hit_test;
use horizon_frameless_core::{
    ChromeState, HitZone, PlatformMetrics, Point, Signal, Size, WindowHandle,
};

/// Which strategy manages windows in this process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImplementationKind {
    /// Native message interception.
    NativeMessage,
    /// Toolkit pointer events.
    ToolkitEvent,
}

impl ImplementationKind {
    /// Select the strategy for this platform.
    ///
    /// Native interception exists only on Windows, and even there the
    /// toolkit path can be forced with `use_cross_platform`.
    pub fn select(use_cross_platform: bool) -> Self {
        if cfg!(target_os = "windows") && !use_cross_platform {
            Self::NativeMessage
        } else {
            Self::ToolkitEvent
        }
    }
}

impl fmt::Display for ImplementationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NativeMessage => f.write_str("native message"),
            Self::ToolkitEvent => f.write_str("toolkit event"),
        }
    }
}

/// Common behaviour of the chrome strategies.
pub trait ChromeStrategy: Send + Sync {
    /// Which strategy this is.
    fn kind(&self) -> ImplementationKind;

    /// Start managing a registered window.
    fn attach(&self, window: WindowHandle) -> bool;

    /// Stop managing a window and let the platform restore its default
    /// frame. Called while the window's record still exists.
    fn detach(&self, window: WindowHandle);

    /// Platform default frame metrics for `window` at `scale`.
    fn platform_metrics(&self, _window: WindowHandle, scale: f64) -> PlatformMetrics {
        PlatformMetrics::builtin(scale)
    }

    /// Classify a client-space point.
    fn classify_hit_test(
        &self,
        state: &ChromeState,
        point: Point,
        client: Size,
        scale: f64,
        maximized: bool,
    ) -> HitZone {
        let defaults = self.platform_metrics(state.window, scale);
        hit_test::classify(point, client, &state.settings, scale, &defaults, maximized)
    }

    /// Desktop composition was switched on or off.
    fn on_composition_changed(&self, window: WindowHandle);

    /// Visual styles were switched on or off.
    fn on_theme_changed(&self, window: WindowHandle);

    /// The window moved to another screen.
    fn on_screen_changed(&self, _window: WindowHandle) {}

    /// Emitted when the strategy rebuilt a frame on its own, outside any
    /// manager call.
    fn frame_refreshed(&self) -> Option<&Signal<WindowHandle>> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cross_platform_override() {
        assert_eq!(
            ImplementationKind::select(true),
            ImplementationKind::ToolkitEvent
        );
    }

    #[cfg(target_os = "windows")]
    #[test]
    fn test_windows_default_is_native() {
        assert_eq!(
            ImplementationKind::select(false),
            ImplementationKind::NativeMessage
        );
    }

    #[cfg(not(target_os = "windows"))]
    #[test]
    fn test_other_platforms_use_toolkit_events() {
        assert_eq!(
            ImplementationKind::select(false),
            ImplementationKind::ToolkitEvent
        );
    }
}

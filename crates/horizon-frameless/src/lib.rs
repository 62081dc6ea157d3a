//! Horizon Frameless - frameless windows that keep native behaviour.
//!
//! Removes the OS-drawn window frame while keeping edge and corner resize,
//! drag-to-move, maximize snapping and the frame shadow. This is the umbrella
//! crate: it re-exports `horizon-frameless-core` and adds the two chrome
//! strategies plus the [`FramelessManager`] facade.
//!
//! - **Native messages** ([`MessageInterceptor`]): rewrites non-client
//!   message handling (Windows)
//! - **Toolkit events** ([`ToolkitEventFilter`]): the same decisions from
//!   winit pointer events, on every platform
//!
//! # Example
//!
//! ```no_run
//! use horizon_frameless::{ChromeSettings, FramelessManager, Rect};
//! # fn run(window: &winit::window::Window, event: &winit::event::WindowEvent) {
//! let manager = FramelessManager::instance();
//! manager.add_winit_window(
//!     window,
//!     ChromeSettings::new()
//!         .with_titlebar_height(32.0)
//!         .with_ignore_area(Rect::new(700.0, 0.0, 100.0, 32.0)),
//! );
//!
//! // Inside the winit event handler:
//! if manager.handle_window_event(window, event) {
//!     return;
//! }
//! # }
//! ```

pub use horizon_frameless_core::*;

pub mod dpi;
pub mod fallback;
mod handle;
pub mod interceptor;
pub mod manager;
pub mod strategy;
pub mod theme;
#[cfg(target_os = "windows")]
pub mod win32;

pub use dpi::{DpiCapabilities, DpiResolver, DpiSource, SystemMetric};
pub use fallback::{HostWindow, ToolkitEventFilter};
pub use handle::window_handle_of;
pub use interceptor::{MessageInterceptor, MonitorInfo, NativeWindowApi, OsVersion, Reply};
pub use manager::{global_flag, FramelessManager};
pub use strategy::{ChromeStrategy, ImplementationKind};
pub use theme::{AccentColor, SystemTheme, ThemeSnapshot, ThemeSource, ThemeTracker};

//! Core systems for Horizon Frameless.
//!
//! This crate holds the platform-neutral half of the frameless window engine:
//!
//! - **Geometry**: logical and native rectangle types
//! - **Scale**: DPI to scale-factor conversion, rounding policy, platform
//!   frame metrics and the half-step DPI table used for metric queries
//! - **Hit-testing**: classification of pointer positions into resize edges,
//!   the draggable title bar, or client area
//! - **State & Registry**: per-window chrome records behind one lock
//! - **Signals**: synchronous change notifications
//! - **Config**: engine options from environment variables and a settings file
//!
//! The `horizon-frameless` crate builds the native message interceptor and
//! the toolkit-event fallback on top of these pieces.
//!
//! # Hit-test Example
//!
//! ```
//! use horizon_frameless_core::{
//!     hit_test, ChromeRegistry, ChromeSettings, HitZone, PlatformMetrics, Point, Rect, Size,
//!     WindowHandle,
//! };
//!
//! let registry = ChromeRegistry::new();
//! let window = WindowHandle::new(0x42);
//! registry.add_window(
//!     window,
//!     ChromeSettings::new()
//!         .with_border(8.0)
//!         .with_titlebar_height(32.0)
//!         .with_ignore_area(Rect::new(350.0, 0.0, 100.0, 32.0)),
//! );
//!
//! let state = registry.lookup(window).unwrap();
//! let zone = hit_test::classify(
//!     Point::new(400.0, 16.0),
//!     Size::new(800.0, 600.0),
//!     &state.settings,
//!     1.0,
//!     &PlatformMetrics::builtin(1.0),
//!     false,
//! );
//! assert_eq!(zone, HitZone::Client);
//! ```

pub mod config;
mod error;
pub mod geometry;
pub mod logging;
pub mod registry;
pub mod scale;
pub mod signal;
pub mod state;

pub use config::{ChromeConfig, ConfigOption};
pub use error::{ChromeError, ChromeResult};
pub use geometry::{IRect, Point, Rect, Size};
pub use hit_test::{ChromeMetrics, HitZone};
pub use registry::ChromeRegistry;
pub use scale::{scale_factor, snap_dpi_half_step, PlatformMetrics, ScaleRoundingPolicy, BASELINE_DPI};
pub use signal::{ConnectionId, Signal};
pub use state::{ChromeLifecycle, ChromeOptions, ChromeSettings, ChromeState, WindowHandle};

// Re-export winit and cursor types that appear in the public API
pub use cursor_icon::CursorIcon;
pub use winit::window::ResizeDirection;

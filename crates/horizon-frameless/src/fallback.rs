//! Toolkit-event fallback.
//!
//! Where native message interception is unavailable, the
//! [`ToolkitEventFilter`] makes the same edge and drag decisions from
//! ordinary pointer events:
//!
//! - on pointer move, the cursor follows the hit zone under the pointer
//! - on primary press over an edge, a system resize starts and the event is
//!   consumed
//!
//! Everything else passes through to the host. The filter reads window
//! settings from the shared [`ChromeRegistry`] and reaches the window only
//! through the [`HostWindow`] trait, which is implemented for
//! [`winit::window::Window`].
//!
//! # Example
//!
//! ```ignore
//! use horizon_frameless::{ChromeSettings, FramelessManager};
//!
//! let manager = FramelessManager::instance();
//! manager.add_winit_window(&window, ChromeSettings::new().with_titlebar_height(32.0));
//!
//! // In the winit event handler:
//! if manager.handle_window_event(&window, &event) {
//!     return;
//! }
//! ```

use std::collections::HashMap;

use parking_lot::Mutex;
use winit::event::{ElementState, MouseButton, WindowEvent};
use winit::window::Window;

use horizon_frameless_core::logging::targets;
use horizon_frameless_core::{
    hit_test, ChromeRegistry, CursorIcon, HitZone, PlatformMetrics, Point, ResizeDirection,
    ScaleRoundingPolicy, Size, WindowHandle,
};

use crate::handle::window_handle_of;
use crate::strategy::{ChromeStrategy, ImplementationKind};

/// What the fallback needs from a host window.
pub trait HostWindow {
    /// Identity used as the registry key.
    fn handle(&self) -> WindowHandle;
    /// Client size in physical pixels.
    fn client_size(&self) -> Size;
    /// Raw scale factor reported by the toolkit.
    fn scale_factor(&self) -> f64;
    fn is_maximized(&self) -> bool;
    /// Whether the user may not resize the window.
    fn is_fixed_size(&self) -> bool;
    /// Show `cursor`, or the default cursor for `None`.
    fn set_cursor(&self, cursor: Option<CursorIcon>);
    /// Show or hide the toolkit's own decorations.
    fn set_decorated(&self, decorated: bool);
    /// Begin an OS-driven resize from the current pointer position.
    fn start_system_resize(&self, direction: ResizeDirection) -> bool;
}

impl HostWindow for Window {
    fn handle(&self) -> WindowHandle {
        window_handle_of(self)
    }

    fn client_size(&self) -> Size {
        let size = self.inner_size();
        Size::new(f64::from(size.width), f64::from(size.height))
    }

    fn scale_factor(&self) -> f64 {
        Window::scale_factor(self)
    }

    fn is_maximized(&self) -> bool {
        Window::is_maximized(self)
    }

    fn is_fixed_size(&self) -> bool {
        !self.is_resizable()
    }

    fn set_cursor(&self, cursor: Option<CursorIcon>) {
        Window::set_cursor(self, cursor.unwrap_or_default());
    }

    fn set_decorated(&self, decorated: bool) {
        self.set_decorations(decorated);
    }

    fn start_system_resize(&self, direction: ResizeDirection) -> bool {
        match self.drag_resize_window(direction) {
            Ok(()) => true,
            Err(err) => {
                tracing::debug!(target: targets::FALLBACK, ?direction, %err, "system resize refused");
                false
            }
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct PointerState {
    position: Option<Point>,
    cursor_overridden: bool,
}

/// The toolkit-event strategy.
#[derive(Debug)]
pub struct ToolkitEventFilter<'r> {
    registry: &'r ChromeRegistry,
    policy: ScaleRoundingPolicy,
    dont_touch_cursor: bool,
    pointers: Mutex<HashMap<WindowHandle, PointerState>>,
}

impl<'r> ToolkitEventFilter<'r> {
    /// Create a filter over `registry`.
    pub fn new(registry: &'r ChromeRegistry, policy: ScaleRoundingPolicy) -> Self {
        Self {
            registry,
            policy,
            dont_touch_cursor: false,
            pointers: Mutex::new(HashMap::new()),
        }
    }

    /// Leave the cursor alone for every window.
    pub fn with_dont_touch_cursor(mut self, enabled: bool) -> Self {
        self.dont_touch_cursor = enabled;
        self
    }

    /// Hide the toolkit decorations of a registered host.
    pub fn adopt(&self, host: &impl HostWindow) -> bool {
        if !self.registry.contains(host.handle()) {
            return false;
        }
        host.set_decorated(false);
        true
    }

    /// Give the toolkit decorations back to `host`.
    pub fn release(&self, host: &impl HostWindow) {
        host.set_decorated(true);
        host.set_cursor(None);
    }

    fn zone_at(&self, host: &impl HostWindow, point: Point) -> Option<HitZone> {
        let state = self.registry.lookup(host.handle())?;
        if host.is_fixed_size() {
            return None;
        }
        let scale = self.policy.apply(host.scale_factor());
        let defaults = PlatformMetrics::builtin(scale);
        Some(hit_test::classify(
            point,
            host.client_size(),
            &state.settings,
            scale,
            &defaults,
            host.is_maximized(),
        ))
    }

    /// Pointer moved to `point` (client coordinates, physical pixels).
    ///
    /// Never consumes the event.
    pub fn pointer_moved(&self, host: &impl HostWindow, point: Point) -> bool {
        let window = host.handle();
        let Some(state) = self.registry.lookup(window) else {
            return false;
        };

        let touch_cursor = !self.dont_touch_cursor && !state.settings.options().dont_touch_cursor_shape;
        let cursor = self.zone_at(host, point).and_then(HitZone::cursor);

        let clear = {
            let mut pointers = self.pointers.lock();
            let pointer = pointers.entry(window).or_default();
            pointer.position = Some(point);
            if !touch_cursor {
                false
            } else if cursor.is_some() {
                pointer.cursor_overridden = true;
                false
            } else {
                std::mem::take(&mut pointer.cursor_overridden)
            }
        };

        if touch_cursor && cursor.is_some() {
            host.set_cursor(cursor);
        } else if clear {
            host.set_cursor(None);
        }
        false
    }

    /// Primary button pressed at the last known pointer position.
    ///
    /// Returns `true` when a system resize started and the event should be
    /// consumed.
    pub fn primary_pressed(&self, host: &impl HostWindow) -> bool {
        let window = host.handle();
        let position = self.pointers.lock().get(&window).and_then(|p| p.position);
        let Some(point) = position else {
            return false;
        };
        let Some(direction) = self.zone_at(host, point).and_then(HitZone::resize_direction) else {
            return false;
        };

        tracing::trace!(target: targets::FALLBACK, %window, ?direction, "starting system resize");
        host.start_system_resize(direction)
    }

    /// Pointer left the window.
    pub fn pointer_left(&self, host: &impl HostWindow) {
        let overridden = self
            .pointers
            .lock()
            .get_mut(&host.handle())
            .map(|pointer| {
                pointer.position = None;
                std::mem::take(&mut pointer.cursor_overridden)
            })
            .unwrap_or(false);
        if overridden {
            host.set_cursor(None);
        }
    }

    /// Drop per-window pointer bookkeeping.
    pub fn forget(&self, window: WindowHandle) {
        self.pointers.lock().remove(&window);
    }

    /// Feed one winit event. Returns `true` when the event was consumed.
    pub fn handle_window_event(&self, window: &Window, event: &WindowEvent) -> bool {
        match event {
            WindowEvent::CursorMoved { position, .. } => {
                self.pointer_moved(window, Point::new(position.x, position.y))
            }
            WindowEvent::MouseInput {
                state: ElementState::Pressed,
                button: MouseButton::Left,
                ..
            } => self.primary_pressed(window),
            WindowEvent::CursorLeft { .. } => {
                self.pointer_left(window);
                false
            }
            WindowEvent::Destroyed => {
                self.forget(window.handle());
                false
            }
            _ => false,
        }
    }
}

impl ChromeStrategy for ToolkitEventFilter<'_> {
    fn kind(&self) -> ImplementationKind {
        ImplementationKind::ToolkitEvent
    }

    fn attach(&self, window: WindowHandle) -> bool {
        self.pointers.lock().entry(window).or_default();
        true
    }

    fn detach(&self, window: WindowHandle) {
        self.forget(window);
    }

    fn on_composition_changed(&self, _window: WindowHandle) {}

    fn on_theme_changed(&self, _window: WindowHandle) {}
}

static_assertions::assert_impl_all!(ToolkitEventFilter<'static>: Send, Sync);

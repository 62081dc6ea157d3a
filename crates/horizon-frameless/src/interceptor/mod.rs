//! Native message interceptor.
//!
//! The [`MessageInterceptor`] rewrites non-client message handling for
//! registered windows: it removes the system frame while keeping native
//! resize, drag, maximize and shadow behaviour. It is a platform-neutral
//! state machine fed raw `(message, wParam, lParam)` triples; every OS call
//! goes through the [`NativeWindowApi`] trait, implemented for Win32 by
//! `win32::Win32Api`.
//!
//! # Lifecycle
//!
//! A registered window starts in
//! [`ChromeLifecycle::Registered`](horizon_frameless_core::ChromeLifecycle).
//! The first message intercepted for it runs the one-time setup, in this
//! order:
//!
//! 1. frameless window style and layered colour-key extended style
//! 2. composition probe, shadow and blur
//! 3. theme probe
//!
//! after which the window is `Active`. Unregistered windows always get
//! [`Reply::Default`].
//!
//! # Message Contract
//!
//! | message | reply |
//! |---|---|
//! | `WM_NCCALCSIZE` | [`Reply::FrameRect`], work area when maximized |
//! | `WM_NCHITTEST` | [`Reply::Handled`] with the hit-test code |
//! | `WM_GETMINMAXINFO` | [`Reply::MinMax`] clamped to the work area |
//! | `WM_DWMCOMPOSITIONCHANGED` | re-probe, shadow, blur, frame change, [`MessageInterceptor::frame_refreshed`] |
//! | `WM_NCUAHDRAWCAPTION` / `WM_NCUAHDRAWFRAME` | suppressed |
//! | `WM_NCPAINT` | suppressed only without composition |
//! | `WM_NCACTIVATE` | default handling with `lParam = -1` |
//! | `WM_SETTEXT` / `WM_SETICON` | default handling with `WS_VISIBLE` cleared, when composition and theming are both off |
//! | `WM_THEMECHANGED` | re-probe theme, then default |
//! | `WM_WINDOWPOSCHANGED` | invalidate, then default |
//! | `WM_DPICHANGED` | frame change, then default |
//! | `WM_NCDESTROY` | unhook and drop the record, then default |

mod blur;
pub mod messages;

pub use blur::{select_blur_method, AccentState, BlurMethod, OsVersion};

use horizon_frameless_core::logging::targets;
use horizon_frameless_core::{
    scale_factor, ChromeRegistry, ChromeResult, ChromeState, IRect, PlatformMetrics, Point, Signal,
    Size, WindowHandle,
};

use crate::dpi::DpiResolver;
use crate::strategy::{ChromeStrategy, ImplementationKind};
use messages::*;

/// Screen edge hosting a taskbar (`ABE_*`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScreenEdge {
    Left,
    Top,
    Right,
    Bottom,
}

/// Monitor geometry in virtual-screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MonitorInfo {
    /// Full monitor rectangle.
    pub monitor: IRect,
    /// Monitor rectangle minus taskbars and app bars.
    pub work: IRect,
}

/// Values for the `MINMAXINFO` of a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MinMaxInfo {
    pub max_position: (i32, i32),
    pub max_size: (i32, i32),
    pub max_track_size: (i32, i32),
    /// Left untouched when `None`.
    pub min_track_size: Option<(i32, i32)>,
}

/// The interceptor's answer to one message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reply {
    /// Not handled: run default processing.
    Default,
    /// Handled with this result.
    Handled(isize),
    /// `WM_NCCALCSIZE` handled with result 0. When set, the rectangle
    /// replaces the proposed client rectangle.
    FrameRect(Option<IRect>),
    /// `WM_GETMINMAXINFO` handled with result 0 and these values.
    MinMax(MinMaxInfo),
}

/// Every OS call the interceptor makes.
///
/// Queries return plain values. Mutations return a result so failures can
/// be logged; the interceptor never aborts on them.
pub trait NativeWindowApi: Send + Sync {
    fn os_version(&self) -> OsVersion;
    fn is_composition_enabled(&self) -> bool;
    fn is_theme_active(&self) -> bool;

    fn is_maximized(&self, window: WindowHandle) -> bool;
    /// Client size in physical pixels.
    fn client_size(&self, window: WindowHandle) -> Size;
    fn screen_to_client(&self, window: WindowHandle, x: i32, y: i32) -> Point;
    /// Geometry of the monitor nearest to `window`.
    fn monitor_info(&self, window: WindowHandle) -> Option<MonitorInfo>;
    fn is_taskbar_auto_hide(&self) -> bool;
    /// Edge of the taskbar, if it lives on the same monitor as `window`.
    fn taskbar_edge(&self, window: WindowHandle) -> Option<ScreenEdge>;

    fn style(&self, window: WindowHandle) -> u32;
    fn set_style(&self, window: WindowHandle, style: u32) -> ChromeResult<()>;
    fn set_ex_style(&self, window: WindowHandle, ex_style: u32) -> ChromeResult<()>;
    fn set_color_key(&self, window: WindowHandle, color: u32) -> ChromeResult<()>;
    fn enable_non_client_rendering(&self, window: WindowHandle) -> ChromeResult<()>;
    fn extend_frame_into_client_area(&self, window: WindowHandle, margin: i32) -> ChromeResult<()>;
    fn apply_blur(&self, window: WindowHandle, method: BlurMethod) -> ChromeResult<()>;
    /// Make the OS recompute the frame and resend size information.
    fn trigger_frame_change(&self, window: WindowHandle) -> ChromeResult<()>;
    fn invalidate(&self, window: WindowHandle);
    fn default_proc(&self, window: WindowHandle, message: u32, wparam: usize, lparam: isize) -> isize;

    fn install_hook(&self, window: WindowHandle) -> ChromeResult<()>;
    fn remove_hook(&self, window: WindowHandle) -> ChromeResult<()>;
}

fn log_failure(window: WindowHandle, operation: &'static str, result: ChromeResult<()>) {
    if let Err(err) = result {
        tracing::debug!(target: targets::INTERCEPTOR, %window, operation, %err, "native call failed");
    }
}

/// The native message strategy.
pub struct MessageInterceptor<'r, A> {
    registry: &'r ChromeRegistry,
    api: A,
    resolver: DpiResolver,
    blur_all: bool,
    frame_refreshed: Signal<WindowHandle>,
}

impl<'r, A: NativeWindowApi> MessageInterceptor<'r, A> {
    /// Create an interceptor over `registry`.
    pub fn new(registry: &'r ChromeRegistry, api: A, resolver: DpiResolver) -> Self {
        Self {
            registry,
            api,
            resolver,
            blur_all: false,
            frame_refreshed: Signal::new(),
        }
    }

    /// Blur every window regardless of its own settings.
    pub fn with_blur_all(mut self, enabled: bool) -> Self {
        self.blur_all = enabled;
        self
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn resolver(&self) -> &DpiResolver {
        &self.resolver
    }

    pub fn registry(&self) -> &'r ChromeRegistry {
        self.registry
    }

    /// Emitted after the frame was rebuilt for a composition change the
    /// system reported to the window itself.
    pub fn frame_refreshed(&self) -> &Signal<WindowHandle> {
        &self.frame_refreshed
    }

    /// Process one message for `window`.
    pub fn handle_message(
        &self,
        window: WindowHandle,
        message: u32,
        wparam: usize,
        lparam: isize,
    ) -> Reply {
        if window.is_null() {
            return Reply::Default;
        }
        if message == WM_NCDESTROY {
            self.forget_destroyed(window);
            return Reply::Default;
        }
        if self.registry.begin_initialization(window) {
            self.initialize(window);
            self.registry.mark_active(window);
        }
        let Some(state) = self.registry.lookup(window) else {
            return Reply::Default;
        };

        match message {
            WM_NCCALCSIZE => self.frame_rect(window, wparam),
            WM_DWMCOMPOSITIONCHANGED => {
                self.handle_composition_changed(window);
                self.frame_refreshed.emit(window);
                Reply::Handled(0)
            }
            WM_NCUAHDRAWCAPTION | WM_NCUAHDRAWFRAME => Reply::Handled(0),
            WM_NCPAINT => {
                if state.composition_enabled {
                    Reply::Default
                } else {
                    Reply::Handled(0)
                }
            }
            WM_NCACTIVATE => Reply::Handled(self.api.default_proc(window, message, wparam, -1)),
            WM_NCHITTEST => self.hit_test(&state, lparam),
            WM_GETMINMAXINFO => self.min_max_info(&state),
            WM_SETICON | WM_SETTEXT => {
                if state.composition_enabled || state.theme_enabled {
                    return Reply::Default;
                }
                let style = self.api.style(window);
                log_failure(window, "hide", self.api.set_style(window, style & !WS_VISIBLE));
                let result = self.api.default_proc(window, message, wparam, lparam);
                log_failure(window, "restore style", self.api.set_style(window, style));
                Reply::Handled(result)
            }
            WM_THEMECHANGED => {
                self.handle_theme_changed(window);
                Reply::Default
            }
            WM_WINDOWPOSCHANGED => {
                self.api.invalidate(window);
                Reply::Default
            }
            WM_DPICHANGED => {
                let dpi = u32::from(hiword(wparam));
                tracing::debug!(
                    target: targets::INTERCEPTOR,
                    %window,
                    dpi,
                    scale = scale_factor(dpi, self.resolver.policy()),
                    "window DPI changed"
                );
                log_failure(window, "frame change", self.api.trigger_frame_change(window));
                Reply::Default
            }
            _ => Reply::Default,
        }
    }

    /// The window is going away: unhook it and drop its record so the
    /// handle value can be registered again once the OS reuses it.
    fn forget_destroyed(&self, window: WindowHandle) {
        if !self.registry.contains(window) {
            return;
        }
        log_failure(window, "remove hook", self.api.remove_hook(window));
        if self.registry.remove_window(window) {
            tracing::debug!(target: targets::INTERCEPTOR, %window, "destroyed window dropped");
        }
    }

    fn initialize(&self, window: WindowHandle) {
        log_failure(window, "set style", self.api.set_style(window, FRAMELESS_STYLE));
        log_failure(window, "set ex style", self.api.set_ex_style(window, FRAMELESS_EX_STYLE));
        log_failure(window, "color key", self.api.set_color_key(window, COLOR_KEY));
        self.handle_composition_changed(window);
        self.handle_theme_changed(window);

        let scale = self.resolver.scale_factor(Some(window));
        let metrics = self.resolver.platform_metrics(Some(window));
        tracing::debug!(
            target: targets::INTERCEPTOR,
            %window,
            dpi = self.resolver.dpi(Some(window)),
            scale,
            border_width = metrics.border_width(),
            border_height = metrics.border_height(),
            titlebar_height = metrics.titlebar_height(),
            "window initialized"
        );
    }

    fn handle_composition_changed(&self, window: WindowHandle) {
        let enabled = self.api.is_composition_enabled();
        let Some(blur_requested) = self.registry.update(window, |state| {
            state.composition_enabled = enabled;
            state.settings.blur_enabled()
        }) else {
            return;
        };

        if enabled {
            log_failure(window, "non-client rendering", self.api.enable_non_client_rendering(window));
            log_failure(window, "extend frame", self.api.extend_frame_into_client_area(window, -1));
        }
        if enabled && (blur_requested || self.blur_all) {
            self.apply_blur(window);
        }
        log_failure(window, "frame change", self.api.trigger_frame_change(window));
    }

    fn apply_blur(&self, window: WindowHandle) {
        let version = self.api.os_version();
        match select_blur_method(version) {
            Some(method) => log_failure(window, "blur", self.api.apply_blur(window, method)),
            None => tracing::debug!(target: targets::INTERCEPTOR, %window, %version, "blur unsupported"),
        }
    }

    fn handle_theme_changed(&self, window: WindowHandle) {
        let active = self.api.is_theme_active();
        self.registry.update(window, |state| state.theme_enabled = active);
    }

    fn frame_rect(&self, window: WindowHandle, wparam: usize) -> Reply {
        if wparam == 0 || !self.api.is_maximized(window) {
            return Reply::FrameRect(None);
        }
        let Some(info) = self.api.monitor_info(window) else {
            return Reply::FrameRect(None);
        };

        let mut rect = info.work;
        // A client rect equal to the monitor rect makes the shell treat the
        // window as fullscreen and hide auto-hide taskbars for good.
        if rect == info.monitor && self.api.is_taskbar_auto_hide() {
            match self.api.taskbar_edge(window) {
                Some(ScreenEdge::Bottom) => rect.bottom -= 1,
                Some(ScreenEdge::Left) => rect.left += 1,
                Some(ScreenEdge::Top) => rect.top += 1,
                Some(ScreenEdge::Right) => rect.right -= 1,
                None => {}
            }
        }
        Reply::FrameRect(Some(rect))
    }

    fn hit_test(&self, state: &ChromeState, lparam: isize) -> Reply {
        let window = state.window;
        let point = self
            .api
            .screen_to_client(window, get_x_lparam(lparam), get_y_lparam(lparam));
        let client = self.api.client_size(window);
        let scale = self.resolver.scale_factor(Some(window));
        let maximized = self.api.is_maximized(window);

        let zone = self.classify_hit_test(state, point, client, scale, maximized);
        Reply::Handled(zone.native_code() as isize)
    }

    fn min_max_info(&self, state: &ChromeState) -> Reply {
        let window = state.window;
        let Some(MonitorInfo { monitor, work }) = self.api.monitor_info(window) else {
            return Reply::Default;
        };

        let max_position = if self.api.os_version().at_least(OsVersion::WINDOWS_8) {
            ((work.left - monitor.left).abs(), (work.top - monitor.top).abs())
        } else {
            (monitor.left, monitor.top)
        };
        let max_size = (work.width().abs(), work.height().abs());

        let minimum = state.settings.minimum_size();
        let min_track_size = (!minimum.is_empty()).then(|| {
            let scaled = minimum.scaled(self.resolver.scale_factor(Some(window)));
            (scaled.width as i32, scaled.height as i32)
        });

        Reply::MinMax(MinMaxInfo {
            max_position,
            max_size,
            max_track_size: max_size,
            min_track_size,
        })
    }
}

impl<A: NativeWindowApi> ChromeStrategy for MessageInterceptor<'_, A> {
    fn kind(&self) -> ImplementationKind {
        ImplementationKind::NativeMessage
    }

    fn frame_refreshed(&self) -> Option<&Signal<WindowHandle>> {
        Some(&self.frame_refreshed)
    }

    fn attach(&self, window: WindowHandle) -> bool {
        match self.api.install_hook(window) {
            Ok(()) => {
                log_failure(window, "frame change", self.api.trigger_frame_change(window));
                true
            }
            Err(err) => {
                tracing::debug!(target: targets::INTERCEPTOR, %window, %err, "failed to hook window");
                false
            }
        }
    }

    fn detach(&self, window: WindowHandle) {
        log_failure(window, "remove hook", self.api.remove_hook(window));
        log_failure(window, "frame change", self.api.trigger_frame_change(window));
    }

    fn platform_metrics(&self, window: WindowHandle, _scale: f64) -> PlatformMetrics {
        self.resolver.platform_metrics(Some(window))
    }

    fn on_composition_changed(&self, window: WindowHandle) {
        self.handle_composition_changed(window);
    }

    fn on_theme_changed(&self, window: WindowHandle) {
        self.handle_theme_changed(window);
    }

    fn on_screen_changed(&self, window: WindowHandle) {
        log_failure(window, "frame change", self.api.trigger_frame_change(window));
    }
}

#[cfg(test)]
mod tests;

//! Win32 backend.
//!
//! [`Win32Api`] implements [`NativeWindowApi`] over the `windows` crate, and
//! a window subclass procedure feeds every message of a managed window to
//! the process-wide [`MessageInterceptor`].
//!
//! # Safety
//!
//! All calls take window handles that were registered by the host. A stale
//! handle makes the individual call fail, which is logged and ignored.

mod procs;

pub use procs::dpi_capabilities;

use std::ffi::c_void;
use std::mem::size_of;
use std::sync::{Arc, OnceLock};

use windows::Win32::Foundation::{BOOL, COLORREF, HWND, LPARAM, LRESULT, POINT, RECT, TRUE, WPARAM};
use windows::Win32::Graphics::Dwm::{
    DwmEnableBlurBehindWindow, DwmExtendFrameIntoClientArea, DwmGetColorizationColor,
    DwmIsCompositionEnabled, DwmSetWindowAttribute, DWMNCRP_ENABLED, DWMWA_NCRENDERING_POLICY,
    DWM_BB_ENABLE, DWM_BLURBEHIND,
};
use windows::Win32::Graphics::Gdi::{
    GetMonitorInfoW, InvalidateRect, MonitorFromRect, MonitorFromWindow, ScreenToClient, UpdateWindow,
    MONITORINFO, MONITOR_DEFAULTTONEAREST,
};
use windows::Win32::UI::Accessibility::HIGHCONTRASTW;
use windows::Win32::UI::Controls::{IsThemeActive, MARGINS};
use windows::Win32::UI::Shell::{
    DefSubclassProc, RemoveWindowSubclass, SHAppBarMessage, SetWindowSubclass, APPBARDATA,
};
use windows::Win32::UI::WindowsAndMessaging::{
    GetClientRect, GetWindowLongW, IsZoomed, SendMessageW, SetLayeredWindowAttributes,
    SetWindowLongW, SetWindowPos, SystemParametersInfoW, GWL_EXSTYLE, GWL_STYLE, LWA_COLORKEY,
    MINMAXINFO, NCCALCSIZE_PARAMS, SPI_GETHIGHCONTRAST, SWP_FRAMECHANGED, SWP_NOACTIVATE,
    SWP_NOMOVE, SWP_NOOWNERZORDER, SWP_NOSIZE, SWP_NOZORDER, WM_SIZE,
};

use horizon_frameless_core::logging::targets;
use horizon_frameless_core::{
    ChromeError, ChromeRegistry, ChromeResult, IRect, Point, Size, WindowHandle,
};

use crate::dpi::DpiResolver;
use crate::interceptor::{
    BlurMethod, MessageInterceptor, MonitorInfo, NativeWindowApi, OsVersion, Reply, ScreenEdge,
};
use crate::strategy::ChromeStrategy;
use procs::{procs, AccentPolicy, WindowCompositionAttribData, WCA_ACCENT_POLICY};

const SUBCLASS_ID: usize = 0x4846;

const ABM_GETSTATE: u32 = 0x4;
const ABM_GETTASKBARPOS: u32 = 0x5;
const ABS_AUTOHIDE: usize = 0x1;
const ABE_LEFT: u32 = 0;
const ABE_TOP: u32 = 1;
const ABE_RIGHT: u32 = 2;
const ABE_BOTTOM: u32 = 3;

const SIZE_RESTORED: usize = 0;
const SIZE_MAXIMIZED: usize = 2;

/// `HCF_HIGHCONTRASTON`.
const HIGH_CONTRAST_ON: u32 = 0x1;

static INTERCEPTOR: OnceLock<Arc<MessageInterceptor<'static, Win32Api>>> = OnceLock::new();

pub(crate) fn hwnd(window: WindowHandle) -> HWND {
    HWND(window.raw() as *mut c_void)
}

fn window_handle(hwnd: HWND) -> WindowHandle {
    WindowHandle::new(hwnd.0 as usize)
}

fn platform_error(err: windows::core::Error) -> ChromeError {
    ChromeError::Platform(err.to_string())
}

fn check(ok: BOOL, operation: &str) -> ChromeResult<()> {
    if ok.as_bool() {
        Ok(())
    } else {
        Err(ChromeError::Platform(format!("{operation} failed")))
    }
}

fn irect(rect: RECT) -> IRect {
    IRect::new(rect.left, rect.top, rect.right, rect.bottom)
}

/// The process-wide interceptor, created on first call.
///
/// Later calls return the existing interceptor unchanged.
pub fn install_interceptor(
    registry: &'static ChromeRegistry,
    resolver: DpiResolver,
    blur_all: bool,
) -> Arc<dyn ChromeStrategy> {
    INTERCEPTOR
        .get_or_init(|| {
            Arc::new(MessageInterceptor::new(registry, Win32Api, resolver).with_blur_all(blur_all))
        })
        .clone()
}

/// Whether the high contrast accessibility mode is on.
pub fn is_high_contrast() -> bool {
    let mut hc = HIGHCONTRASTW {
        cbSize: size_of::<HIGHCONTRASTW>() as u32,
        ..Default::default()
    };
    // SAFETY: `hc` is a stack-allocated HIGHCONTRASTW with its size field
    // set, and the API only writes within it.
    let result = unsafe {
        SystemParametersInfoW(
            SPI_GETHIGHCONTRAST,
            hc.cbSize,
            Some(&mut hc as *mut _ as *mut c_void),
            Default::default(),
        )
    };
    result.is_ok() && (hc.dwFlags.0 & HIGH_CONTRAST_ON) != 0
}

/// The DWM colorization colour as `0xAARRGGBB`.
pub fn colorization_color() -> Option<u32> {
    let mut color = 0u32;
    let mut opaque = BOOL::default();
    // SAFETY: both out pointers are valid locals.
    unsafe { DwmGetColorizationColor(&mut color, &mut opaque) }
        .ok()
        .map(|()| color)
}

/// [`NativeWindowApi`] over Win32.
#[derive(Debug, Clone, Copy, Default)]
pub struct Win32Api;

impl NativeWindowApi for Win32Api {
    fn os_version(&self) -> OsVersion {
        procs::os_version()
    }

    fn is_composition_enabled(&self) -> bool {
        // SAFETY: no arguments.
        unsafe { DwmIsCompositionEnabled() }.is_ok_and(|enabled| enabled.as_bool())
    }

    fn is_theme_active(&self) -> bool {
        // SAFETY: no arguments.
        unsafe { IsThemeActive() }.as_bool()
    }

    fn is_maximized(&self, window: WindowHandle) -> bool {
        // SAFETY: returns FALSE for invalid handles.
        unsafe { IsZoomed(hwnd(window)) }.as_bool()
    }

    fn client_size(&self, window: WindowHandle) -> Size {
        let mut rect = RECT::default();
        // SAFETY: `rect` is a valid out pointer.
        match unsafe { GetClientRect(hwnd(window), &mut rect) } {
            Ok(()) => irect(rect).size(),
            Err(err) => {
                tracing::debug!(target: targets::INTERCEPTOR, %window, %err, "GetClientRect failed");
                Size::ZERO
            }
        }
    }

    fn screen_to_client(&self, window: WindowHandle, x: i32, y: i32) -> Point {
        let mut point = POINT { x, y };
        // SAFETY: `point` is a valid in/out pointer.
        unsafe {
            let _ = ScreenToClient(hwnd(window), &mut point);
        }
        Point::new(f64::from(point.x), f64::from(point.y))
    }

    fn monitor_info(&self, window: WindowHandle) -> Option<MonitorInfo> {
        let mut info = MONITORINFO {
            cbSize: size_of::<MONITORINFO>() as u32,
            ..Default::default()
        };
        // SAFETY: the monitor handle comes from MonitorFromWindow and `info`
        // has its size field set.
        let ok = unsafe {
            let monitor = MonitorFromWindow(hwnd(window), MONITOR_DEFAULTTONEAREST);
            !monitor.is_invalid() && GetMonitorInfoW(monitor, &mut info).as_bool()
        };
        ok.then(|| MonitorInfo {
            monitor: irect(info.rcMonitor),
            work: irect(info.rcWork),
        })
    }

    fn is_taskbar_auto_hide(&self) -> bool {
        let mut data = APPBARDATA {
            cbSize: size_of::<APPBARDATA>() as u32,
            ..Default::default()
        };
        // SAFETY: `data` has its size field set.
        let state = unsafe { SHAppBarMessage(ABM_GETSTATE, &mut data) };
        state & ABS_AUTOHIDE != 0
    }

    fn taskbar_edge(&self, window: WindowHandle) -> Option<ScreenEdge> {
        let mut data = APPBARDATA {
            cbSize: size_of::<APPBARDATA>() as u32,
            ..Default::default()
        };
        // SAFETY: `data` has its size field set; `data.rc` is filled by the
        // shell before MonitorFromRect reads it.
        let same_monitor = unsafe {
            if SHAppBarMessage(ABM_GETTASKBARPOS, &mut data) == 0 {
                return None;
            }
            MonitorFromRect(&data.rc, MONITOR_DEFAULTTONEAREST)
                == MonitorFromWindow(hwnd(window), MONITOR_DEFAULTTONEAREST)
        };
        if !same_monitor {
            return None;
        }
        match data.uEdge {
            ABE_LEFT => Some(ScreenEdge::Left),
            ABE_TOP => Some(ScreenEdge::Top),
            ABE_RIGHT => Some(ScreenEdge::Right),
            ABE_BOTTOM => Some(ScreenEdge::Bottom),
            _ => None,
        }
    }

    fn style(&self, window: WindowHandle) -> u32 {
        // SAFETY: returns 0 for invalid handles.
        unsafe { GetWindowLongW(hwnd(window), GWL_STYLE) as u32 }
    }

    fn set_style(&self, window: WindowHandle, style: u32) -> ChromeResult<()> {
        // SAFETY: plain integer write to the window's style slot.
        unsafe { SetWindowLongW(hwnd(window), GWL_STYLE, style as i32) };
        Ok(())
    }

    fn set_ex_style(&self, window: WindowHandle, ex_style: u32) -> ChromeResult<()> {
        // SAFETY: plain integer write to the window's extended style slot.
        unsafe { SetWindowLongW(hwnd(window), GWL_EXSTYLE, ex_style as i32) };
        Ok(())
    }

    fn set_color_key(&self, window: WindowHandle, color: u32) -> ChromeResult<()> {
        // SAFETY: the window is layered at this point.
        unsafe { SetLayeredWindowAttributes(hwnd(window), COLORREF(color), 0, LWA_COLORKEY) }
            .map_err(platform_error)
    }

    fn enable_non_client_rendering(&self, window: WindowHandle) -> ChromeResult<()> {
        let policy = DWMNCRP_ENABLED;
        // SAFETY: `policy` outlives the call and its size is passed along.
        unsafe {
            DwmSetWindowAttribute(
                hwnd(window),
                DWMWA_NCRENDERING_POLICY,
                &policy as *const _ as *const c_void,
                size_of_val(&policy) as u32,
            )
        }
        .map_err(platform_error)
    }

    fn extend_frame_into_client_area(&self, window: WindowHandle, margin: i32) -> ChromeResult<()> {
        let margins = MARGINS {
            cxLeftWidth: margin,
            cxRightWidth: margin,
            cyTopHeight: margin,
            cyBottomHeight: margin,
        };
        // SAFETY: `margins` outlives the call.
        unsafe { DwmExtendFrameIntoClientArea(hwnd(window), &margins) }.map_err(platform_error)
    }

    fn apply_blur(&self, window: WindowHandle, method: BlurMethod) -> ChromeResult<()> {
        match method {
            BlurMethod::DwmBlurBehind => {
                let blur = DWM_BLURBEHIND {
                    dwFlags: DWM_BB_ENABLE,
                    fEnable: TRUE,
                    ..Default::default()
                };
                // SAFETY: `blur` outlives the call.
                unsafe { DwmEnableBlurBehindWindow(hwnd(window), &blur) }.map_err(platform_error)
            }
            BlurMethod::Accent(state) => {
                let set_attribute = procs()
                    .set_window_composition_attribute
                    .ok_or(ChromeError::CapabilityUnavailable("SetWindowCompositionAttribute"))?;
                let mut policy = AccentPolicy {
                    state: state as u32,
                    ..Default::default()
                };
                let mut data = WindowCompositionAttribData {
                    attrib: WCA_ACCENT_POLICY,
                    data: &mut policy as *mut _ as *mut c_void,
                    size: size_of::<AccentPolicy>(),
                };
                // SAFETY: `data` points at `policy`, both live for the call.
                check(unsafe { set_attribute(hwnd(window), &mut data) }, "SetWindowCompositionAttribute")
            }
        }
    }

    fn trigger_frame_change(&self, window: WindowHandle) -> ChromeResult<()> {
        let hwnd = hwnd(window);
        let flags = SWP_FRAMECHANGED
            | SWP_NOACTIVATE
            | SWP_NOSIZE
            | SWP_NOMOVE
            | SWP_NOZORDER
            | SWP_NOOWNERZORDER;
        // SAFETY: all calls tolerate a stale handle by failing.
        unsafe {
            SetWindowPos(hwnd, HWND::default(), 0, 0, 0, 0, flags).map_err(platform_error)?;

            let mut rect = RECT::default();
            if GetClientRect(hwnd, &mut rect).is_ok() {
                let kind = if IsZoomed(hwnd).as_bool() { SIZE_MAXIMIZED } else { SIZE_RESTORED };
                let size = ((rect.bottom - rect.top) as u32 & 0xFFFF) << 16
                    | ((rect.right - rect.left) as u32 & 0xFFFF);
                SendMessageW(hwnd, WM_SIZE, WPARAM(kind), LPARAM(size as isize));
            }
            let _ = UpdateWindow(hwnd);
        }
        Ok(())
    }

    fn invalidate(&self, window: WindowHandle) {
        // SAFETY: a null rectangle invalidates the whole client area.
        unsafe {
            let _ = InvalidateRect(hwnd(window), None, TRUE);
        }
    }

    fn default_proc(&self, window: WindowHandle, message: u32, wparam: usize, lparam: isize) -> isize {
        // SAFETY: only reached from inside the subclass procedure.
        unsafe { DefSubclassProc(hwnd(window), message, WPARAM(wparam), LPARAM(lparam)) }.0
    }

    fn install_hook(&self, window: WindowHandle) -> ChromeResult<()> {
        // SAFETY: `subclass_proc` matches SUBCLASSPROC and lives forever.
        check(
            unsafe { SetWindowSubclass(hwnd(window), Some(subclass_proc), SUBCLASS_ID, 0) },
            "SetWindowSubclass",
        )
    }

    fn remove_hook(&self, window: WindowHandle) -> ChromeResult<()> {
        // SAFETY: removing an absent subclass fails harmlessly.
        check(
            unsafe { RemoveWindowSubclass(hwnd(window), Some(subclass_proc), SUBCLASS_ID) },
            "RemoveWindowSubclass",
        )
    }
}

unsafe extern "system" fn subclass_proc(
    hwnd: HWND,
    message: u32,
    wparam: WPARAM,
    lparam: LPARAM,
    _id: usize,
    _data: usize,
) -> LRESULT {
    let Some(interceptor) = INTERCEPTOR.get() else {
        // SAFETY: forwarding the original arguments down the chain.
        return unsafe { DefSubclassProc(hwnd, message, wparam, lparam) };
    };

    match interceptor.handle_message(window_handle(hwnd), message, wparam.0, lparam.0) {
        // SAFETY: forwarding the original arguments down the chain.
        Reply::Default => unsafe { DefSubclassProc(hwnd, message, wparam, lparam) },
        Reply::Handled(result) => LRESULT(result),
        Reply::FrameRect(rect) => {
            if let Some(rect) = rect.filter(|_| wparam.0 != 0) {
                // SAFETY: for WM_NCCALCSIZE with a non-zero wParam, lParam
                // points to a NCCALCSIZE_PARAMS owned by the system.
                let params = unsafe { &mut *(lparam.0 as *mut NCCALCSIZE_PARAMS) };
                params.rgrc[0] = RECT {
                    left: rect.left,
                    top: rect.top,
                    right: rect.right,
                    bottom: rect.bottom,
                };
            }
            LRESULT(0)
        }
        Reply::MinMax(info) => {
            // SAFETY: for WM_GETMINMAXINFO, lParam points to a MINMAXINFO
            // owned by the system.
            let mmi = unsafe { &mut *(lparam.0 as *mut MINMAXINFO) };
            let point = |(x, y): (i32, i32)| POINT { x, y };
            mmi.ptMaxPosition = point(info.max_position);
            mmi.ptMaxSize = point(info.max_size);
            mmi.ptMaxTrackSize = point(info.max_track_size);
            if let Some(min) = info.min_track_size {
                mmi.ptMinTrackSize = point(min);
            }
            LRESULT(0)
        }
    }
}

//! Functions resolved at runtime.
//!
//! Per-window and per-process DPI queries, `GetDpiForMonitor` and
//! `SetWindowCompositionAttribute` are missing on older Windows releases,
//! so they are looked up with `GetProcAddress` once and cached.

use std::ffi::c_void;
use std::sync::OnceLock;

use windows::core::{s, w, PCSTR, PCWSTR};
use windows::Win32::Foundation::{BOOL, FARPROC, HANDLE, HMODULE, HWND};
use windows::Win32::Graphics::Gdi::{
    GetDC, GetDeviceCaps, MonitorFromWindow, ReleaseDC, HMONITOR, LOGPIXELSX, MONITOR_DEFAULTTONEAREST,
};
use windows::Win32::System::LibraryLoader::{GetModuleHandleW, GetProcAddress, LoadLibraryW};
use windows::Win32::System::SystemInformation::OSVERSIONINFOW;
use windows::Win32::System::Threading::GetCurrentProcess;
use windows::Win32::UI::WindowsAndMessaging::{GetSystemMetrics, SYSTEM_METRICS_INDEX};

use horizon_frameless_core::logging::targets;
use horizon_frameless_core::WindowHandle;

use super::hwnd;
use crate::dpi::{
    metric_reading, DeviceDpiFn, DpiCapabilities, GlobalDpiFn, MetricFn, MetricForDpiFn, SystemMetric,
    WindowDpiFn,
};
use crate::interceptor::OsVersion;

type GetDpiForWindowFn = unsafe extern "system" fn(HWND) -> u32;
type GetSystemDpiForProcessFn = unsafe extern "system" fn(HANDLE) -> u32;
type GetDpiForSystemFn = unsafe extern "system" fn() -> u32;
type GetSystemMetricsForDpiFn = unsafe extern "system" fn(i32, u32) -> i32;
type GetDpiForMonitorFn = unsafe extern "system" fn(HMONITOR, i32, *mut u32, *mut u32) -> i32;
type RtlGetVersionFn = unsafe extern "system" fn(*mut OSVERSIONINFOW) -> i32;
pub(super) type SetWindowCompositionAttributeFn =
    unsafe extern "system" fn(HWND, *mut WindowCompositionAttribData) -> BOOL;

/// `MDT_EFFECTIVE_DPI`.
const EFFECTIVE_DPI: i32 = 0;

/// `WINDOWCOMPOSITIONATTRIBDATA` (undocumented).
#[repr(C)]
pub(super) struct WindowCompositionAttribData {
    pub attrib: u32,
    pub data: *mut c_void,
    pub size: usize,
}

/// `ACCENT_POLICY` (undocumented).
#[repr(C)]
#[derive(Default)]
pub(super) struct AccentPolicy {
    pub state: u32,
    pub flags: u32,
    pub gradient_color: u32,
    pub animation_id: u32,
}

/// `WCA_ACCENT_POLICY`.
pub(super) const WCA_ACCENT_POLICY: u32 = 19;

pub(super) struct Procs {
    get_dpi_for_window: Option<GetDpiForWindowFn>,
    get_system_dpi_for_process: Option<GetSystemDpiForProcessFn>,
    get_dpi_for_system: Option<GetDpiForSystemFn>,
    get_system_metrics_for_dpi: Option<GetSystemMetricsForDpiFn>,
    get_dpi_for_monitor: Option<GetDpiForMonitorFn>,
    rtl_get_version: Option<RtlGetVersionFn>,
    pub(super) set_window_composition_attribute: Option<SetWindowCompositionAttributeFn>,
}

static PROCS: OnceLock<Procs> = OnceLock::new();

fn module(name: PCWSTR, load: bool) -> Option<HMODULE> {
    // SAFETY: `name` is a static, NUL-terminated wide string.
    let module = unsafe {
        if load {
            LoadLibraryW(name)
        } else {
            GetModuleHandleW(name)
        }
    };
    module.ok()
}

fn symbol(module: Option<HMODULE>, name: PCSTR) -> FARPROC {
    // SAFETY: `module` is a loaded module and `name` a static ANSI string.
    module.and_then(|module| unsafe { GetProcAddress(module, name) })
}

macro_rules! resolve {
    ($module:expr, $name:literal, $ty:ty) => {
        // SAFETY: the exported symbol has exactly the signature `$ty`.
        symbol($module, s!($name)).map(|f| unsafe { std::mem::transmute::<_, $ty>(f) })
    };
}

pub(super) fn procs() -> &'static Procs {
    PROCS.get_or_init(|| {
        let user32 = module(w!("user32.dll"), true);
        let shcore = module(w!("shcore.dll"), true);
        let ntdll = module(w!("ntdll.dll"), false);

        let procs = Procs {
            get_dpi_for_window: resolve!(user32, "GetDpiForWindow", GetDpiForWindowFn),
            get_system_dpi_for_process: resolve!(
                user32,
                "GetSystemDpiForProcess",
                GetSystemDpiForProcessFn
            ),
            get_dpi_for_system: resolve!(user32, "GetDpiForSystem", GetDpiForSystemFn),
            get_system_metrics_for_dpi: resolve!(
                user32,
                "GetSystemMetricsForDpi",
                GetSystemMetricsForDpiFn
            ),
            get_dpi_for_monitor: resolve!(shcore, "GetDpiForMonitor", GetDpiForMonitorFn),
            rtl_get_version: resolve!(ntdll, "RtlGetVersion", RtlGetVersionFn),
            set_window_composition_attribute: resolve!(
                user32,
                "SetWindowCompositionAttribute",
                SetWindowCompositionAttributeFn
            ),
        };
        tracing::debug!(
            target: targets::DPI,
            window_dpi = procs.get_dpi_for_window.is_some(),
            process_dpi = procs.get_system_dpi_for_process.is_some(),
            system_dpi = procs.get_dpi_for_system.is_some(),
            monitor_dpi = procs.get_dpi_for_monitor.is_some(),
            metric_for_dpi = procs.get_system_metrics_for_dpi.is_some(),
            "resolved optional system functions"
        );
        procs
    })
}

/// The kernel-reported OS version, unaffected by compatibility shims.
pub(super) fn os_version() -> OsVersion {
    static VERSION: OnceLock<OsVersion> = OnceLock::new();
    *VERSION.get_or_init(|| {
        let Some(rtl_get_version) = procs().rtl_get_version else {
            return OsVersion::default();
        };
        let mut info = OSVERSIONINFOW {
            dwOSVersionInfoSize: std::mem::size_of::<OSVERSIONINFOW>() as u32,
            ..Default::default()
        };
        // SAFETY: `info` is a properly sized, writable OSVERSIONINFOW.
        let status = unsafe { rtl_get_version(&mut info) };
        if status != 0 {
            tracing::debug!(target: targets::ROOT, status, "RtlGetVersion failed");
            return OsVersion::default();
        }
        OsVersion::new(info.dwMajorVersion, info.dwMinorVersion, info.dwBuildNumber)
    })
}

fn non_zero(value: u32) -> Option<u32> {
    (value > 0).then_some(value)
}

fn window_dpi(window: WindowHandle) -> Option<u32> {
    let query = procs().get_dpi_for_window?;
    // SAFETY: GetDpiForWindow returns 0 for invalid handles.
    non_zero(unsafe { query(hwnd(window)) })
}

fn process_dpi() -> Option<u32> {
    let query = procs().get_system_dpi_for_process?;
    // SAFETY: the pseudo handle of the current process is always valid.
    non_zero(unsafe { query(GetCurrentProcess()) })
}

fn system_dpi() -> Option<u32> {
    let query = procs().get_dpi_for_system?;
    // SAFETY: takes no arguments.
    non_zero(unsafe { query() })
}

fn monitor_dpi(window: WindowHandle) -> Option<u32> {
    let query = procs().get_dpi_for_monitor?;
    let (mut x, mut y) = (0u32, 0u32);
    // SAFETY: the monitor handle comes straight from MonitorFromWindow and
    // both out pointers are valid locals.
    let status = unsafe {
        let monitor = MonitorFromWindow(hwnd(window), MONITOR_DEFAULTTONEAREST);
        query(monitor, EFFECTIVE_DPI, &mut x, &mut y)
    };
    if status < 0 {
        return None;
    }
    non_zero((x + y) / 2)
}

fn device_context_dpi(window: Option<WindowHandle>) -> Option<u32> {
    let window = window.map(hwnd).unwrap_or_default();
    // SAFETY: the DC is released before returning. A null window yields the
    // screen DC.
    let dpi = unsafe {
        let dc = GetDC(window);
        if dc.is_invalid() {
            return None;
        }
        let dpi = GetDeviceCaps(dc, LOGPIXELSX);
        ReleaseDC(window, dc);
        dpi
    };
    u32::try_from(dpi).ok().and_then(non_zero)
}

fn metric_for_dpi(metric: SystemMetric, dpi: u32) -> Option<i32> {
    let query = procs().get_system_metrics_for_dpi?;
    // SAFETY: plain integer query.
    let value = unsafe { query(metric.index(), dpi) };
    metric_reading(value)
}

fn metric(metric: SystemMetric) -> Option<i32> {
    // SAFETY: plain integer query.
    let value = unsafe { GetSystemMetrics(SYSTEM_METRICS_INDEX(metric.index())) };
    metric_reading(value)
}

/// The DPI capability table of this machine.
pub fn dpi_capabilities() -> DpiCapabilities {
    let procs = procs();
    DpiCapabilities {
        window_dpi: procs
            .get_dpi_for_window
            .is_some()
            .then_some(window_dpi as WindowDpiFn),
        process_dpi: procs
            .get_system_dpi_for_process
            .is_some()
            .then_some(process_dpi as GlobalDpiFn),
        system_dpi: procs
            .get_dpi_for_system
            .is_some()
            .then_some(system_dpi as GlobalDpiFn),
        monitor_dpi: procs
            .get_dpi_for_monitor
            .is_some()
            .then_some(monitor_dpi as WindowDpiFn),
        device_context_dpi: Some(device_context_dpi as DeviceDpiFn),
        metric_for_dpi: procs
            .get_system_metrics_for_dpi
            .is_some()
            .then_some(metric_for_dpi as MetricForDpiFn),
        metric: Some(metric as MetricFn),
    }
}

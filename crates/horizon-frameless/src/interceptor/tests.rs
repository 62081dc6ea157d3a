use parking_lot::Mutex;

use horizon_frameless_core::hit_test::codes;
use horizon_frameless_core::{ChromeError, ChromeLifecycle, ChromeSettings, Rect};

use super::*;

#[derive(Debug, Clone, PartialEq)]
enum Call {
    SetStyle(u32),
    SetExStyle(u32),
    ColorKey(u32),
    NonClientRendering,
    ExtendFrame(i32),
    Blur(BlurMethod),
    FrameChange,
    Invalidate,
    DefaultProc(u32, isize),
    InstallHook,
    RemoveHook,
}

struct MockApi {
    version: OsVersion,
    composition: Mutex<bool>,
    theme_active: Mutex<bool>,
    maximized: Mutex<bool>,
    origin: (i32, i32),
    client: Size,
    monitor: Option<MonitorInfo>,
    auto_hide: bool,
    taskbar: Option<ScreenEdge>,
    style: u32,
    fail_hook: bool,
    calls: Mutex<Vec<Call>>,
}

impl Default for MockApi {
    fn default() -> Self {
        Self {
            version: OsVersion::new(10, 0, 19045),
            composition: Mutex::new(true),
            theme_active: Mutex::new(true),
            maximized: Mutex::new(false),
            origin: (100, 100),
            client: Size::new(800.0, 600.0),
            monitor: Some(MonitorInfo {
                monitor: IRect::new(0, 0, 1920, 1080),
                work: IRect::new(0, 0, 1920, 1040),
            }),
            auto_hide: false,
            taskbar: None,
            style: FRAMELESS_STYLE | WS_VISIBLE,
            fail_hook: false,
            calls: Mutex::new(Vec::new()),
        }
    }
}

impl MockApi {
    fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    fn clear(&self) {
        self.calls.lock().clear();
    }

    fn record(&self, call: Call) -> ChromeResult<()> {
        self.calls.lock().push(call);
        Ok(())
    }
}

impl NativeWindowApi for MockApi {
    fn os_version(&self) -> OsVersion {
        self.version
    }
    fn is_composition_enabled(&self) -> bool {
        *self.composition.lock()
    }
    fn is_theme_active(&self) -> bool {
        *self.theme_active.lock()
    }
    fn is_maximized(&self, _window: WindowHandle) -> bool {
        *self.maximized.lock()
    }
    fn client_size(&self, _window: WindowHandle) -> Size {
        self.client
    }
    fn screen_to_client(&self, _window: WindowHandle, x: i32, y: i32) -> Point {
        Point::new(f64::from(x - self.origin.0), f64::from(y - self.origin.1))
    }
    fn monitor_info(&self, _window: WindowHandle) -> Option<MonitorInfo> {
        self.monitor
    }
    fn is_taskbar_auto_hide(&self) -> bool {
        self.auto_hide
    }
    fn taskbar_edge(&self, _window: WindowHandle) -> Option<ScreenEdge> {
        self.taskbar
    }
    fn style(&self, _window: WindowHandle) -> u32 {
        self.style
    }
    fn set_style(&self, _window: WindowHandle, style: u32) -> ChromeResult<()> {
        self.record(Call::SetStyle(style))
    }
    fn set_ex_style(&self, _window: WindowHandle, ex_style: u32) -> ChromeResult<()> {
        self.record(Call::SetExStyle(ex_style))
    }
    fn set_color_key(&self, _window: WindowHandle, color: u32) -> ChromeResult<()> {
        self.record(Call::ColorKey(color))
    }
    fn enable_non_client_rendering(&self, _window: WindowHandle) -> ChromeResult<()> {
        self.record(Call::NonClientRendering)
    }
    fn extend_frame_into_client_area(&self, _window: WindowHandle, margin: i32) -> ChromeResult<()> {
        self.record(Call::ExtendFrame(margin))
    }
    fn apply_blur(&self, _window: WindowHandle, method: BlurMethod) -> ChromeResult<()> {
        self.record(Call::Blur(method))
    }
    fn trigger_frame_change(&self, _window: WindowHandle) -> ChromeResult<()> {
        self.record(Call::FrameChange)
    }
    fn invalidate(&self, _window: WindowHandle) {
        let _ = self.record(Call::Invalidate);
    }
    fn default_proc(&self, _window: WindowHandle, message: u32, _wparam: usize, lparam: isize) -> isize {
        let _ = self.record(Call::DefaultProc(message, lparam));
        1
    }
    fn install_hook(&self, _window: WindowHandle) -> ChromeResult<()> {
        if self.fail_hook {
            return Err(ChromeError::Platform("subclass failed".into()));
        }
        self.record(Call::InstallHook)
    }
    fn remove_hook(&self, _window: WindowHandle) -> ChromeResult<()> {
        self.record(Call::RemoveHook)
    }
}

const WINDOW: WindowHandle = WindowHandle::new(0x1000);

fn interceptor(registry: &ChromeRegistry, api: MockApi) -> MessageInterceptor<'_, MockApi> {
    MessageInterceptor::new(registry, api, DpiResolver::default())
}

fn registered(settings: ChromeSettings) -> ChromeRegistry {
    let registry = ChromeRegistry::new();
    assert!(registry.add_window(WINDOW, settings));
    registry
}

fn hit(interceptor: &MessageInterceptor<'_, MockApi>, x: i32, y: i32) -> Reply {
    // Mock window origin is (100, 100).
    interceptor.handle_message(WINDOW, WM_NCHITTEST, 0, make_point_lparam(x + 100, y + 100))
}

#[test]
fn test_unregistered_window_is_ignored() {
    let registry = ChromeRegistry::new();
    let interceptor = interceptor(&registry, MockApi::default());

    assert_eq!(interceptor.handle_message(WINDOW, WM_NCCALCSIZE, 1, 0), Reply::Default);
    assert_eq!(interceptor.handle_message(WINDOW, WM_NCHITTEST, 0, 0), Reply::Default);
    assert_eq!(
        interceptor.handle_message(WindowHandle::NULL, WM_NCHITTEST, 0, 0),
        Reply::Default
    );
    assert!(interceptor.api().calls().is_empty());
}

#[test]
fn test_first_message_initializes_once() {
    let registry = registered(ChromeSettings::new());
    let interceptor = interceptor(&registry, MockApi::default());

    interceptor.handle_message(WINDOW, WM_SIZE, 0, 0);
    assert_eq!(
        interceptor.api().calls(),
        vec![
            Call::SetStyle(FRAMELESS_STYLE),
            Call::SetExStyle(FRAMELESS_EX_STYLE),
            Call::ColorKey(COLOR_KEY),
            Call::NonClientRendering,
            Call::ExtendFrame(-1),
            Call::FrameChange,
        ]
    );

    let state = registry.lookup(WINDOW).unwrap();
    assert_eq!(state.lifecycle, ChromeLifecycle::Active);
    assert!(state.composition_enabled);
    assert!(state.theme_enabled);

    interceptor.api().clear();
    interceptor.handle_message(WINDOW, WM_SIZE, 0, 0);
    assert!(interceptor.api().calls().is_empty());
}

#[test]
fn test_initialize_without_composition_skips_shadow() {
    let registry = registered(ChromeSettings::new().with_blur(true));
    let api = MockApi::default();
    *api.composition.lock() = false;
    let interceptor = interceptor(&registry, api);

    interceptor.handle_message(WINDOW, WM_SIZE, 0, 0);
    let calls = interceptor.api().calls();
    assert!(!calls.contains(&Call::NonClientRendering));
    assert!(!calls.iter().any(|c| matches!(c, Call::Blur(_))));
    assert!(calls.contains(&Call::FrameChange));
}

#[test]
fn test_blur_requested_per_window() {
    let registry = registered(ChromeSettings::new().with_blur(true));
    let interceptor = interceptor(&registry, MockApi::default());

    interceptor.handle_message(WINDOW, WM_SIZE, 0, 0);
    assert!(
        interceptor
            .api()
            .calls()
            .contains(&Call::Blur(BlurMethod::Accent(AccentState::AcrylicBlurBehind)))
    );
}

#[test]
fn test_blur_all_and_windows_7() {
    let registry = registered(ChromeSettings::new());
    let api = MockApi {
        version: OsVersion::new(6, 1, 7601),
        ..MockApi::default()
    };
    let interceptor = MessageInterceptor::new(&registry, api, DpiResolver::default()).with_blur_all(true);

    interceptor.handle_message(WINDOW, WM_SIZE, 0, 0);
    assert!(interceptor.api().calls().contains(&Call::Blur(BlurMethod::DwmBlurBehind)));
}

#[test]
fn test_nccalcsize_restored_window_keeps_rect() {
    let registry = registered(ChromeSettings::new());
    let interceptor = interceptor(&registry, MockApi::default());

    assert_eq!(
        interceptor.handle_message(WINDOW, WM_NCCALCSIZE, 1, 0),
        Reply::FrameRect(None)
    );
    assert_eq!(
        interceptor.handle_message(WINDOW, WM_NCCALCSIZE, 0, 0),
        Reply::FrameRect(None)
    );
}

#[test]
fn test_nccalcsize_maximized_uses_work_area() {
    let registry = registered(ChromeSettings::new());
    let api = MockApi::default();
    *api.maximized.lock() = true;
    let interceptor = interceptor(&registry, api);

    assert_eq!(
        interceptor.handle_message(WINDOW, WM_NCCALCSIZE, 1, 0),
        Reply::FrameRect(Some(IRect::new(0, 0, 1920, 1040)))
    );
}

#[test]
fn test_nccalcsize_auto_hide_taskbar_correction() {
    let full = IRect::new(0, 0, 1920, 1080);
    let cases = [
        (ScreenEdge::Bottom, IRect::new(0, 0, 1920, 1079)),
        (ScreenEdge::Top, IRect::new(0, 1, 1920, 1080)),
        (ScreenEdge::Left, IRect::new(1, 0, 1920, 1080)),
        (ScreenEdge::Right, IRect::new(0, 0, 1919, 1080)),
    ];

    for (edge, expected) in cases {
        let registry = registered(ChromeSettings::new());
        let api = MockApi {
            monitor: Some(MonitorInfo {
                monitor: full,
                work: full,
            }),
            auto_hide: true,
            taskbar: Some(edge),
            ..MockApi::default()
        };
        *api.maximized.lock() = true;
        let interceptor = interceptor(&registry, api);

        assert_eq!(
            interceptor.handle_message(WINDOW, WM_NCCALCSIZE, 1, 0),
            Reply::FrameRect(Some(expected)),
            "taskbar on {edge:?}"
        );
    }
}

#[test]
fn test_nccalcsize_taskbar_on_other_monitor() {
    let full = IRect::new(0, 0, 1920, 1080);
    let registry = registered(ChromeSettings::new());
    let api = MockApi {
        monitor: Some(MonitorInfo {
            monitor: full,
            work: full,
        }),
        auto_hide: true,
        taskbar: None,
        ..MockApi::default()
    };
    *api.maximized.lock() = true;
    let interceptor = interceptor(&registry, api);

    assert_eq!(
        interceptor.handle_message(WINDOW, WM_NCCALCSIZE, 1, 0),
        Reply::FrameRect(Some(full))
    );
}

#[test]
fn test_nchittest_zones() {
    let registry = registered(ChromeSettings::new());
    let interceptor = interceptor(&registry, MockApi::default());

    assert_eq!(hit(&interceptor, 2, 2), Reply::Handled(codes::HTTOPLEFT as isize));
    assert_eq!(hit(&interceptor, 797, 2), Reply::Handled(codes::HTTOPRIGHT as isize));
    assert_eq!(hit(&interceptor, 2, 597), Reply::Handled(codes::HTBOTTOMLEFT as isize));
    assert_eq!(hit(&interceptor, 797, 597), Reply::Handled(codes::HTBOTTOMRIGHT as isize));
    assert_eq!(hit(&interceptor, 400, 2), Reply::Handled(codes::HTTOP as isize));
    assert_eq!(hit(&interceptor, 400, 597), Reply::Handled(codes::HTBOTTOM as isize));
    assert_eq!(hit(&interceptor, 2, 300), Reply::Handled(codes::HTLEFT as isize));
    assert_eq!(hit(&interceptor, 797, 300), Reply::Handled(codes::HTRIGHT as isize));
    assert_eq!(hit(&interceptor, 400, 20), Reply::Handled(codes::HTCAPTION as isize));
    assert_eq!(hit(&interceptor, 400, 300), Reply::Handled(codes::HTCLIENT as isize));
}

#[test]
fn test_nchittest_ignore_area() {
    let settings = ChromeSettings::new().with_ignore_area(Rect::new(700.0, 0.0, 100.0, 31.0));
    let registry = registered(settings);
    let interceptor = interceptor(&registry, MockApi::default());

    assert_eq!(hit(&interceptor, 750, 20), Reply::Handled(codes::HTCLIENT as isize));
    assert_eq!(hit(&interceptor, 400, 20), Reply::Handled(codes::HTCAPTION as isize));
}

#[test]
fn test_nchittest_maximized_has_no_edges() {
    let registry = registered(ChromeSettings::new());
    let api = MockApi::default();
    *api.maximized.lock() = true;
    let interceptor = interceptor(&registry, api);

    assert_eq!(hit(&interceptor, 2, 2), Reply::Handled(codes::HTCAPTION as isize));
    assert_eq!(hit(&interceptor, 400, 597), Reply::Handled(codes::HTCLIENT as isize));
}

#[test]
fn test_getminmaxinfo() {
    let settings = ChromeSettings::new().with_minimum_size(Size::new(320.5, 240.0));
    let registry = registered(settings);
    let api = MockApi {
        monitor: Some(MonitorInfo {
            monitor: IRect::new(1920, 0, 3840, 1080),
            work: IRect::new(1920, 40, 3840, 1080),
        }),
        ..MockApi::default()
    };
    let interceptor = interceptor(&registry, api);

    assert_eq!(
        interceptor.handle_message(WINDOW, WM_GETMINMAXINFO, 0, 0),
        Reply::MinMax(MinMaxInfo {
            max_position: (0, 40),
            max_size: (1920, 1040),
            max_track_size: (1920, 1040),
            min_track_size: Some((320, 240)),
        })
    );
}

#[test]
fn test_getminmaxinfo_windows_7_uses_monitor_origin() {
    let registry = registered(ChromeSettings::new());
    let api = MockApi {
        version: OsVersion::new(6, 1, 7601),
        monitor: Some(MonitorInfo {
            monitor: IRect::new(1920, 0, 3840, 1080),
            work: IRect::new(1920, 0, 3840, 1040),
        }),
        ..MockApi::default()
    };
    let interceptor = interceptor(&registry, api);

    let Reply::MinMax(info) = interceptor.handle_message(WINDOW, WM_GETMINMAXINFO, 0, 0) else {
        panic!("expected a min/max reply");
    };
    assert_eq!(info.max_position, (1920, 0));
    assert_eq!(info.min_track_size, None);
}

#[test]
fn test_getminmaxinfo_without_monitor() {
    let registry = registered(ChromeSettings::new());
    let api = MockApi {
        monitor: None,
        ..MockApi::default()
    };
    let interceptor = interceptor(&registry, api);

    assert_eq!(
        interceptor.handle_message(WINDOW, WM_GETMINMAXINFO, 0, 0),
        Reply::Default
    );
}

#[test]
fn test_ncpaint_depends_on_composition() {
    let registry = registered(ChromeSettings::new());
    let interceptor = interceptor(&registry, MockApi::default());
    assert_eq!(interceptor.handle_message(WINDOW, WM_NCPAINT, 0, 0), Reply::Default);

    *interceptor.api().composition.lock() = false;
    assert_eq!(
        interceptor.handle_message(WINDOW, WM_DWMCOMPOSITIONCHANGED, 0, 0),
        Reply::Handled(0)
    );
    assert_eq!(interceptor.handle_message(WINDOW, WM_NCPAINT, 0, 0), Reply::Handled(0));
}

#[test]
fn test_composition_message_emits_frame_refresh() {
    let registry = registered(ChromeSettings::new());
    let interceptor = interceptor(&registry, MockApi::default());
    let refreshed = std::sync::Arc::new(Mutex::new(Vec::new()));
    let sink = refreshed.clone();
    interceptor.frame_refreshed().connect(move |window| sink.lock().push(*window));

    interceptor.handle_message(WINDOW, WM_SIZE, 0, 0);
    interceptor.on_composition_changed(WINDOW);
    assert!(refreshed.lock().is_empty());

    interceptor.handle_message(WINDOW, WM_DWMCOMPOSITIONCHANGED, 0, 0);
    assert_eq!(*refreshed.lock(), vec![WINDOW]);
}

#[test]
fn test_themed_caption_paint_suppressed() {
    let registry = registered(ChromeSettings::new());
    let interceptor = interceptor(&registry, MockApi::default());

    assert_eq!(interceptor.handle_message(WINDOW, WM_NCUAHDRAWCAPTION, 0, 0), Reply::Handled(0));
    assert_eq!(interceptor.handle_message(WINDOW, WM_NCUAHDRAWFRAME, 0, 0), Reply::Handled(0));
}

#[test]
fn test_ncactivate_forwards_with_minus_one() {
    let registry = registered(ChromeSettings::new());
    let interceptor = interceptor(&registry, MockApi::default());
    interceptor.handle_message(WINDOW, WM_SIZE, 0, 0);
    interceptor.api().clear();

    assert_eq!(interceptor.handle_message(WINDOW, WM_NCACTIVATE, 1, 0), Reply::Handled(1));
    assert_eq!(interceptor.api().calls(), vec![Call::DefaultProc(WM_NCACTIVATE, -1)]);
}

#[test]
fn test_settext_hides_caption_redraw_without_composition_or_theme() {
    let registry = registered(ChromeSettings::new());
    let api = MockApi::default();
    *api.composition.lock() = false;
    *api.theme_active.lock() = false;
    let interceptor = interceptor(&registry, api);
    interceptor.handle_message(WINDOW, WM_SIZE, 0, 0);
    interceptor.api().clear();

    assert_eq!(interceptor.handle_message(WINDOW, WM_SETTEXT, 0, 7), Reply::Handled(1));
    let style = FRAMELESS_STYLE | WS_VISIBLE;
    assert_eq!(
        interceptor.api().calls(),
        vec![
            Call::SetStyle(style & !WS_VISIBLE),
            Call::DefaultProc(WM_SETTEXT, 7),
            Call::SetStyle(style),
        ]
    );
}

#[test]
fn test_settext_default_with_composition() {
    let registry = registered(ChromeSettings::new());
    let interceptor = interceptor(&registry, MockApi::default());
    assert_eq!(interceptor.handle_message(WINDOW, WM_SETICON, 0, 0), Reply::Default);
}

#[test]
fn test_theme_changed_reprobes() {
    let registry = registered(ChromeSettings::new());
    let interceptor = interceptor(&registry, MockApi::default());
    interceptor.handle_message(WINDOW, WM_SIZE, 0, 0);
    assert!(registry.lookup(WINDOW).unwrap().theme_enabled);

    *interceptor.api().theme_active.lock() = false;
    assert_eq!(interceptor.handle_message(WINDOW, WM_THEMECHANGED, 0, 0), Reply::Default);
    assert!(!registry.lookup(WINDOW).unwrap().theme_enabled);
}

#[test]
fn test_position_change_invalidates() {
    let registry = registered(ChromeSettings::new());
    let interceptor = interceptor(&registry, MockApi::default());
    interceptor.handle_message(WINDOW, WM_SIZE, 0, 0);
    interceptor.api().clear();

    assert_eq!(interceptor.handle_message(WINDOW, WM_WINDOWPOSCHANGED, 0, 0), Reply::Default);
    assert_eq!(interceptor.api().calls(), vec![Call::Invalidate]);
}

#[test]
fn test_dpi_change_refreshes_frame() {
    let registry = registered(ChromeSettings::new());
    let interceptor = interceptor(&registry, MockApi::default());
    interceptor.handle_message(WINDOW, WM_SIZE, 0, 0);
    interceptor.api().clear();

    assert_eq!(
        interceptor.handle_message(WINDOW, WM_DPICHANGED, 0x00C0_00C0, 0),
        Reply::Default
    );
    assert_eq!(interceptor.api().calls(), vec![Call::FrameChange]);
}

#[test]
fn test_attach_and_detach() {
    let registry = registered(ChromeSettings::new());
    let interceptor = interceptor(&registry, MockApi::default());

    assert_eq!(interceptor.kind(), ImplementationKind::NativeMessage);
    assert!(interceptor.attach(WINDOW));
    interceptor.detach(WINDOW);
    assert_eq!(
        interceptor.api().calls(),
        vec![
            Call::InstallHook,
            Call::FrameChange,
            Call::RemoveHook,
            Call::FrameChange,
        ]
    );
}

#[test]
fn test_destroyed_window_is_unhooked_and_forgotten() {
    let registry = registered(ChromeSettings::new());
    let interceptor = interceptor(&registry, MockApi::default());
    interceptor.handle_message(WINDOW, WM_SIZE, 0, 0);
    interceptor.api().calls.lock().clear();

    assert_eq!(interceptor.handle_message(WINDOW, WM_NCDESTROY, 0, 0), Reply::Default);
    assert_eq!(interceptor.api().calls(), vec![Call::RemoveHook]);
    assert!(!registry.contains(WINDOW));

    // A new window reusing the handle value registers and initializes afresh.
    assert!(registry.add_window(WINDOW, ChromeSettings::new()));
    interceptor.handle_message(WINDOW, WM_SIZE, 0, 0);
    assert_eq!(registry.lookup(WINDOW).unwrap().lifecycle, ChromeLifecycle::Active);
}

#[test]
fn test_destroy_of_unregistered_window_is_ignored() {
    let registry = ChromeRegistry::new();
    let interceptor = interceptor(&registry, MockApi::default());

    assert_eq!(interceptor.handle_message(WINDOW, WM_NCDESTROY, 0, 0), Reply::Default);
    assert!(interceptor.api().calls().is_empty());
}

#[test]
fn test_attach_failure() {
    let registry = registered(ChromeSettings::new());
    let api = MockApi {
        fail_hook: true,
        ..MockApi::default()
    };
    let interceptor = interceptor(&registry, api);

    assert!(!interceptor.attach(WINDOW));
    assert!(interceptor.api().calls().is_empty());
}

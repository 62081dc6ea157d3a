//! The process-wide frameless window manager.
//!
//! [`FramelessManager`] is the facade hosts talk to. It owns the chosen
//! [`ChromeStrategy`], the [`ThemeTracker`] and the change signals, and
//! forwards registration to the shared [`ChromeRegistry`].
//!
//! # Strategy Selection
//!
//! The strategy is chosen once, when the manager is built:
//!
//! - Windows: native message interception, unless
//!   [`ConfigOption::UseCrossPlatformImplementation`] is set
//! - everywhere else: toolkit events
//!
//! # Global Flag
//!
//! Building the first manager records the engine version in a write-once
//! process flag, readable through [`global_flag`]. On Windows the value is
//! also exported in the `__HORIZON_FRAMELESS__` environment variable so
//! unrelated in-process code can detect the engine.

use std::fmt;
use std::sync::{Arc, OnceLock};

use winit::event::WindowEvent;
use winit::window::Window;

use horizon_frameless_core::logging::targets;
use horizon_frameless_core::{
    ChromeConfig, ChromeRegistry, ChromeSettings, ChromeState, ConfigOption, Signal, WindowHandle,
};

use crate::fallback::ToolkitEventFilter;
use crate::handle::window_handle_of;
use crate::strategy::{ChromeStrategy, ImplementationKind};
use crate::theme::{SystemTheme, ThemeTracker};

/// Environment variable carrying the global flag.
pub const GLOBAL_FLAG_ENV: &str = "__HORIZON_FRAMELESS__";

static GLOBAL_FLAG: OnceLock<u32> = OnceLock::new();
static MANAGER: OnceLock<FramelessManager> = OnceLock::new();

/// The engine version packed as `0x00MMmmpp`.
pub fn engine_version() -> u32 {
    let part = |value: &str| value.parse::<u32>().unwrap_or(0) & 0xFF;
    (part(env!("CARGO_PKG_VERSION_MAJOR")) << 16)
        | (part(env!("CARGO_PKG_VERSION_MINOR")) << 8)
        | part(env!("CARGO_PKG_VERSION_PATCH"))
}

/// The global flag, if a manager was ever built in this process.
pub fn global_flag() -> Option<u32> {
    GLOBAL_FLAG.get().copied()
}

fn set_global_flag() {
    let mut first = false;
    let value = *GLOBAL_FLAG.get_or_init(|| {
        first = true;
        engine_version()
    });
    if !first {
        return;
    }

    // SAFETY: runs once per process and this crate never reads the
    // environment concurrently with it.
    #[cfg(target_os = "windows")]
    unsafe {
        std::env::set_var(GLOBAL_FLAG_ENV, value.to_string());
    }
    tracing::debug!(target: targets::ROOT, version = value, "global flag set");
}

/// Manages frameless windows for the whole process.
pub struct FramelessManager {
    kind: ImplementationKind,
    strategy: Arc<dyn ChromeStrategy>,
    toolkit: Option<Arc<ToolkitEventFilter<'static>>>,
    registry: &'static ChromeRegistry,
    theme: ThemeTracker,
    config: ChromeConfig,
    frame_refresh_requested: Arc<Signal<WindowHandle>>,
}

impl fmt::Debug for FramelessManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FramelessManager")
            .field("kind", &self.kind)
            .field("windows", &self.registry.len())
            .field("theme", &self.theme)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl FramelessManager {
    /// The process-wide manager, configured from the environment and the
    /// settings file on first use.
    pub fn instance() -> &'static FramelessManager {
        MANAGER.get_or_init(|| Self::new(ChromeConfig::new().load()))
    }

    /// Build a manager over the global registry and the running platform.
    pub fn new(config: ChromeConfig) -> Self {
        let registry = ChromeRegistry::instance();
        let use_cross_platform = config.is_set(ConfigOption::UseCrossPlatformImplementation);
        let native = match ImplementationKind::select(use_cross_platform) {
            ImplementationKind::NativeMessage => Self::native_strategy(registry, &config),
            ImplementationKind::ToolkitEvent => None,
        };
        Self::with_parts(registry, config, ThemeTracker::for_platform(), native)
    }

    #[cfg(target_os = "windows")]
    fn native_strategy(
        registry: &'static ChromeRegistry,
        config: &ChromeConfig,
    ) -> Option<Arc<dyn ChromeStrategy>> {
        let resolver = crate::dpi::DpiResolver::for_platform(config.scale_rounding());
        let blur_all = config.is_set(ConfigOption::EnableBlurBehindWindow);
        Some(crate::win32::install_interceptor(registry, resolver, blur_all))
    }

    #[cfg(not(target_os = "windows"))]
    fn native_strategy(
        _registry: &'static ChromeRegistry,
        _config: &ChromeConfig,
    ) -> Option<Arc<dyn ChromeStrategy>> {
        None
    }

    /// Build a manager from explicit parts.
    ///
    /// `native` is used unless the configuration forces the cross-platform
    /// implementation. Without it, the toolkit-event fallback is used.
    pub fn with_parts(
        registry: &'static ChromeRegistry,
        config: ChromeConfig,
        theme: ThemeTracker,
        native: Option<Arc<dyn ChromeStrategy>>,
    ) -> Self {
        set_global_flag();

        let native = native.filter(|_| !config.is_set(ConfigOption::UseCrossPlatformImplementation));
        let (strategy, toolkit) = match native {
            Some(strategy) => (strategy, None),
            None => {
                let filter = Arc::new(
                    ToolkitEventFilter::new(registry, config.scale_rounding())
                        .with_dont_touch_cursor(config.is_set(ConfigOption::DontTouchCursorShape)),
                );
                (filter.clone() as Arc<dyn ChromeStrategy>, Some(filter))
            }
        };
        let kind = strategy.kind();
        tracing::debug!(target: targets::ROOT, implementation = %kind, "frameless manager created");

        let frame_refresh_requested = Arc::new(Signal::new());
        if let Some(refreshed) = strategy.frame_refreshed() {
            let forward = frame_refresh_requested.clone();
            refreshed.connect(move |window: &WindowHandle| forward.emit(*window));
        }

        Self {
            kind,
            strategy,
            toolkit,
            registry,
            theme,
            config,
            frame_refresh_requested,
        }
    }

    // =========================================================================
    // Registration
    // =========================================================================

    /// Manage `window`.
    ///
    /// Returns `false` for a null handle, an already managed window, or when
    /// the strategy could not attach.
    pub fn add_window(&self, window: WindowHandle, settings: ChromeSettings) -> bool {
        if !self.registry.add_window(window, settings) {
            return false;
        }
        if !self.strategy.attach(window) {
            tracing::debug!(target: targets::ROOT, %window, "strategy refused window");
            self.registry.remove_window(window);
            return false;
        }
        true
    }

    /// Manage a winit window. On the toolkit path its decorations are
    /// turned off.
    pub fn add_winit_window(&self, window: &Window, settings: ChromeSettings) -> bool {
        if !self.add_window(window_handle_of(window), settings) {
            return false;
        }
        if let Some(toolkit) = &self.toolkit {
            toolkit.adopt(window);
        }
        true
    }

    /// Stop managing `window` and restore its default frame.
    ///
    /// Returns `false` when the window was not managed.
    pub fn remove_window(&self, window: WindowHandle) -> bool {
        if !self.registry.begin_removal(window) {
            return false;
        }
        self.strategy.detach(window);
        self.registry.remove_window(window)
    }

    /// Stop managing a winit window and give it its decorations back.
    pub fn remove_winit_window(&self, window: &Window) -> bool {
        let handle = window_handle_of(window);
        if !self.registry.contains(handle) {
            return false;
        }
        if let Some(toolkit) = &self.toolkit {
            toolkit.release(window);
        }
        self.remove_window(handle)
    }

    /// Replace the settings of a managed window.
    pub fn update_settings(&self, window: WindowHandle, settings: ChromeSettings) -> bool {
        if !self.registry.update_settings(window, settings) {
            return false;
        }
        self.frame_refresh_requested.emit(window);
        true
    }

    /// A copy of the record for `window`.
    pub fn lookup(&self, window: WindowHandle) -> Option<ChromeState> {
        self.registry.lookup(window)
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Which implementation manages windows in this process.
    pub fn implementation(&self) -> ImplementationKind {
        self.kind
    }

    /// Whether the toolkit-event fallback is in use.
    pub fn uses_cross_platform_implementation(&self) -> bool {
        self.kind == ImplementationKind::ToolkitEvent
    }

    pub fn config(&self) -> &ChromeConfig {
        &self.config
    }

    pub fn registry(&self) -> &'static ChromeRegistry {
        self.registry
    }

    pub fn theme(&self) -> &ThemeTracker {
        &self.theme
    }

    /// The effective system theme.
    pub fn system_theme(&self) -> SystemTheme {
        self.theme.system_theme()
    }

    /// Force the effective theme. [`SystemTheme::Unknown`] clears it.
    pub fn set_override_theme(&self, theme: SystemTheme) -> bool {
        self.theme.set_override_theme(theme)
    }

    // =========================================================================
    // Notifications
    // =========================================================================

    /// Emitted with the effective theme when it changes.
    pub fn system_theme_changed(&self) -> &Signal<SystemTheme> {
        self.theme.system_theme_changed()
    }

    /// Emitted when a window's frame should be redrawn by the host.
    ///
    /// Covers changes made through the manager as well as composition
    /// changes the native path receives directly from the system.
    pub fn frame_refresh_requested(&self) -> &Signal<WindowHandle> {
        &self.frame_refresh_requested
    }

    /// Re-read the system theme and emit if it changed.
    pub fn notify_system_theme_changed_or_not(&self) -> bool {
        if !self.theme.notify_changed_or_not() {
            return false;
        }
        for window in self.registry.window_ids() {
            self.strategy.on_theme_changed(window);
        }
        true
    }

    /// Desktop composition was toggled.
    pub fn notify_composition_changed(&self) {
        for window in self.registry.window_ids() {
            self.strategy.on_composition_changed(window);
            self.frame_refresh_requested.emit(window);
        }
    }

    /// `window` moved to another screen.
    pub fn notify_screen_changed(&self, window: WindowHandle) {
        if !self.registry.contains(window) {
            return;
        }
        self.strategy.on_screen_changed(window);
        self.frame_refresh_requested.emit(window);
    }

    /// Feed one winit event. Returns `true` when the event was consumed.
    ///
    /// Theme changes are forwarded to the tracker for every window, managed
    /// or not.
    pub fn handle_window_event(&self, window: &Window, event: &WindowEvent) -> bool {
        match event {
            WindowEvent::ThemeChanged(_) => {
                self.notify_system_theme_changed_or_not();
                return false;
            }
            WindowEvent::ScaleFactorChanged { .. } => {
                self.notify_screen_changed(window_handle_of(window));
            }
            WindowEvent::Destroyed => {
                let handle = window_handle_of(window);
                if self.registry.remove_window(handle) {
                    tracing::debug!(target: targets::ROOT, window = %handle, "destroyed window dropped");
                }
            }
            _ => {}
        }
        self.toolkit
            .as_ref()
            .is_some_and(|toolkit| toolkit.handle_window_event(window, event))
    }
}

static_assertions::assert_impl_all!(FramelessManager: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::theme::{ThemeSnapshot, ThemeSource};

    #[derive(Clone, Default)]
    struct FixedSource(Arc<Mutex<SystemTheme>>);

    impl ThemeSource for FixedSource {
        fn snapshot(&self) -> ThemeSnapshot {
            ThemeSnapshot {
                theme: *self.0.lock(),
                accent: None,
            }
        }
    }

    #[derive(Default)]
    struct RecordingStrategy {
        refuse: bool,
        events: Mutex<Vec<(&'static str, WindowHandle)>>,
        refreshed: Signal<WindowHandle>,
    }

    impl ChromeStrategy for RecordingStrategy {
        fn kind(&self) -> ImplementationKind {
            ImplementationKind::NativeMessage
        }
        fn attach(&self, window: WindowHandle) -> bool {
            self.events.lock().push(("attach", window));
            !self.refuse
        }
        fn detach(&self, window: WindowHandle) {
            self.events.lock().push(("detach", window));
        }
        fn on_composition_changed(&self, window: WindowHandle) {
            self.events.lock().push(("composition", window));
        }
        fn on_theme_changed(&self, window: WindowHandle) {
            self.events.lock().push(("theme", window));
        }
        fn on_screen_changed(&self, window: WindowHandle) {
            self.events.lock().push(("screen", window));
        }
        fn frame_refreshed(&self) -> Option<&Signal<WindowHandle>> {
            Some(&self.refreshed)
        }
    }

    fn leaked_registry() -> &'static ChromeRegistry {
        Box::leak(Box::new(ChromeRegistry::new()))
    }

    fn native_manager(strategy: Arc<RecordingStrategy>) -> FramelessManager {
        FramelessManager::with_parts(
            leaked_registry(),
            ChromeConfig::new(),
            ThemeTracker::new(FixedSource::default()),
            Some(strategy),
        )
    }

    const WINDOW: WindowHandle = WindowHandle::new(0x3000);

    #[test]
    fn test_global_flag_set() {
        let _manager = native_manager(Arc::default());
        assert_eq!(global_flag(), Some(engine_version()));
        assert_eq!(engine_version() >> 16, 1);
    }

    #[test]
    fn test_native_registration() {
        let strategy = Arc::new(RecordingStrategy::default());
        let manager = native_manager(strategy.clone());

        assert_eq!(manager.implementation(), ImplementationKind::NativeMessage);
        assert!(manager.add_window(WINDOW, ChromeSettings::new()));
        assert!(!manager.add_window(WINDOW, ChromeSettings::new().with_border(3.0)));
        assert_eq!(manager.lookup(WINDOW).unwrap().settings.border_width(), 0.0);

        assert!(manager.remove_window(WINDOW));
        assert!(!manager.remove_window(WINDOW));
        assert_eq!(
            *strategy.events.lock(),
            vec![("attach", WINDOW), ("detach", WINDOW)]
        );
    }

    #[test]
    fn test_null_window_rejected() {
        let strategy = Arc::new(RecordingStrategy::default());
        let manager = native_manager(strategy.clone());

        assert!(!manager.add_window(WindowHandle::NULL, ChromeSettings::new()));
        assert!(!manager.remove_window(WindowHandle::NULL));
        assert!(strategy.events.lock().is_empty());
    }

    #[test]
    fn test_refused_attach_rolls_back() {
        let strategy = Arc::new(RecordingStrategy {
            refuse: true,
            ..RecordingStrategy::default()
        });
        let manager = native_manager(strategy);

        assert!(!manager.add_window(WINDOW, ChromeSettings::new()));
        assert!(manager.lookup(WINDOW).is_none());
    }

    #[test]
    fn test_cross_platform_override_wins() {
        let mut config = ChromeConfig::new();
        config.set(ConfigOption::UseCrossPlatformImplementation, true);
        let manager = FramelessManager::with_parts(
            leaked_registry(),
            config,
            ThemeTracker::new(FixedSource::default()),
            Some(Arc::new(RecordingStrategy::default())),
        );

        assert_eq!(manager.implementation(), ImplementationKind::ToolkitEvent);
        assert!(manager.uses_cross_platform_implementation());
        assert!(manager.add_window(WINDOW, ChromeSettings::new()));
    }

    #[test]
    fn test_notifications_reach_strategy() {
        let strategy = Arc::new(RecordingStrategy::default());
        let manager = native_manager(strategy.clone());
        manager.add_window(WINDOW, ChromeSettings::new());

        let refreshes = Arc::new(AtomicUsize::new(0));
        let counter = refreshes.clone();
        manager.frame_refresh_requested().connect(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        manager.notify_composition_changed();
        manager.notify_screen_changed(WINDOW);
        manager.notify_screen_changed(WindowHandle::new(0x9999));
        assert!(manager.update_settings(WINDOW, ChromeSettings::new().with_titlebar_height(40.0)));

        assert_eq!(refreshes.load(Ordering::SeqCst), 3);
        assert_eq!(
            *strategy.events.lock(),
            vec![("attach", WINDOW), ("composition", WINDOW), ("screen", WINDOW)]
        );
    }

    #[test]
    fn test_strategy_refresh_is_forwarded() {
        let strategy = Arc::new(RecordingStrategy::default());
        let manager = native_manager(strategy.clone());

        let received = Arc::new(Mutex::new(Vec::new()));
        let sink = received.clone();
        manager
            .frame_refresh_requested()
            .connect(move |window| sink.lock().push(*window));

        strategy.refreshed.emit(WINDOW);
        assert_eq!(*received.lock(), vec![WINDOW]);
    }

    #[test]
    fn test_concurrent_removal_detaches_once() {
        let strategy = Arc::new(RecordingStrategy::default());
        let manager = native_manager(strategy.clone());
        manager.add_window(WINDOW, ChromeSettings::new());

        let removed = std::thread::scope(|scope| {
            let workers: Vec<_> = (0..4)
                .map(|_| scope.spawn(|| manager.remove_window(WINDOW)))
                .collect();
            workers
                .into_iter()
                .map(|worker| worker.join().unwrap())
                .filter(|removed| *removed)
                .count()
        });

        assert_eq!(removed, 1);
        assert!(manager.lookup(WINDOW).is_none());
        assert_eq!(
            *strategy.events.lock(),
            vec![("attach", WINDOW), ("detach", WINDOW)]
        );
    }

    #[test]
    fn test_theme_change_reaches_windows() {
        let strategy = Arc::new(RecordingStrategy::default());
        let source = FixedSource::default();
        *source.0.lock() = SystemTheme::Light;
        let manager = FramelessManager::with_parts(
            leaked_registry(),
            ChromeConfig::new(),
            ThemeTracker::new(source.clone()),
            Some(strategy.clone()),
        );
        manager.add_window(WINDOW, ChromeSettings::new());

        assert!(!manager.notify_system_theme_changed_or_not());
        *source.0.lock() = SystemTheme::Dark;
        assert!(manager.notify_system_theme_changed_or_not());
        assert_eq!(manager.system_theme(), SystemTheme::Dark);
        assert!(strategy.events.lock().contains(&("theme", WINDOW)));

        assert!(manager.set_override_theme(SystemTheme::Light));
        assert_eq!(manager.system_theme(), SystemTheme::Light);
    }
}

//! System theme tracking.
//!
//! [`ThemeTracker`] remembers the last observed system theme and accent
//! colour and emits [`ThemeTracker::system_theme_changed`] when a re-read
//! finds a difference. Hosts call
//! [`notify_changed_or_not`](ThemeTracker::notify_changed_or_not) whenever
//! the platform hints that appearance settings may have changed; the
//! toolkit-event fallback does so for every `ThemeChanged` window event.
//!
//! A user override takes priority over the detected theme. While an override
//! is active, detected changes are recorded but not announced.
//!
//! # Platform Notes
//!
//! - **Color scheme**: `dark-light` crate (registry on Windows, user defaults
//!   on macOS, XDG portal on Linux)
//! - **High contrast**: `SPI_GETHIGHCONTRAST` on Windows
//! - **Accent**: DWM colorization colour on Windows

use std::fmt;

use parking_lot::Mutex;

use horizon_frameless_core::logging::targets;
use horizon_frameless_core::Signal;

/// The system appearance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SystemTheme {
    Light,
    Dark,
    HighContrast,
    /// Could not be determined. As an override, clears the override.
    #[default]
    Unknown,
}

impl fmt::Display for SystemTheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Light => "light",
            Self::Dark => "dark",
            Self::HighContrast => "high contrast",
            Self::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

/// An RGB color value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AccentColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl AccentColor {
    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Create an accent color from a 32-bit ARGB value.
    pub fn from_argb(argb: u32) -> Self {
        Self {
            r: ((argb >> 16) & 0xFF) as u8,
            g: ((argb >> 8) & 0xFF) as u8,
            b: (argb & 0xFF) as u8,
        }
    }
}

impl fmt::Display for AccentColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// One reading of the system appearance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ThemeSnapshot {
    pub theme: SystemTheme,
    pub accent: Option<AccentColor>,
}

/// Where theme readings come from.
pub trait ThemeSource: Send + Sync {
    /// Read the current appearance.
    fn snapshot(&self) -> ThemeSnapshot;
}

/// Reads the appearance of the running platform.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlatformThemeSource;

impl PlatformThemeSource {
    #[cfg(feature = "system-theme")]
    fn color_scheme() -> SystemTheme {
        match dark_light::detect() {
            dark_light::Mode::Dark => SystemTheme::Dark,
            dark_light::Mode::Light => SystemTheme::Light,
            dark_light::Mode::Default => SystemTheme::Unknown,
        }
    }

    #[cfg(not(feature = "system-theme"))]
    fn color_scheme() -> SystemTheme {
        SystemTheme::Unknown
    }

    #[cfg(target_os = "windows")]
    fn is_high_contrast() -> bool {
        crate::win32::is_high_contrast()
    }

    #[cfg(not(target_os = "windows"))]
    fn is_high_contrast() -> bool {
        false
    }

    #[cfg(target_os = "windows")]
    fn accent_color() -> Option<AccentColor> {
        crate::win32::colorization_color().map(AccentColor::from_argb)
    }

    #[cfg(not(target_os = "windows"))]
    fn accent_color() -> Option<AccentColor> {
        None
    }
}

impl ThemeSource for PlatformThemeSource {
    fn snapshot(&self) -> ThemeSnapshot {
        let theme = if Self::is_high_contrast() {
            SystemTheme::HighContrast
        } else {
            Self::color_scheme()
        };
        ThemeSnapshot {
            theme,
            accent: Self::accent_color(),
        }
    }
}

#[derive(Debug, Default)]
struct TrackerState {
    current: ThemeSnapshot,
    override_theme: Option<SystemTheme>,
}

/// Tracks the system theme and announces changes.
pub struct ThemeTracker {
    source: Box<dyn ThemeSource>,
    state: Mutex<TrackerState>,
    system_theme_changed: Signal<SystemTheme>,
}

impl fmt::Debug for ThemeTracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThemeTracker")
            .field("state", &*self.state.lock())
            .finish_non_exhaustive()
    }
}

impl ThemeTracker {
    /// Create a tracker and take the initial reading from `source`.
    pub fn new(source: impl ThemeSource + 'static) -> Self {
        let current = source.snapshot();
        tracing::debug!(
            target: targets::THEME,
            theme = %current.theme,
            accent = ?current.accent,
            "initial system theme"
        );
        Self {
            source: Box::new(source),
            state: Mutex::new(TrackerState {
                current,
                override_theme: None,
            }),
            system_theme_changed: Signal::new(),
        }
    }

    /// A tracker over the running platform.
    pub fn for_platform() -> Self {
        Self::new(PlatformThemeSource)
    }

    /// Emitted with the effective theme whenever it or the accent changes.
    pub fn system_theme_changed(&self) -> &Signal<SystemTheme> {
        &self.system_theme_changed
    }

    /// The effective theme: the override if set, else the detected theme.
    pub fn system_theme(&self) -> SystemTheme {
        let state = self.state.lock();
        state.override_theme.unwrap_or(state.current.theme)
    }

    /// The last detected accent colour.
    pub fn accent_color(&self) -> Option<AccentColor> {
        self.state.lock().current.accent
    }

    /// The active override, if any.
    pub fn override_theme(&self) -> Option<SystemTheme> {
        self.state.lock().override_theme
    }

    /// Re-read the platform and emit if anything changed.
    ///
    /// Returns whether a change was detected. Nothing is emitted while an
    /// override is active.
    pub fn notify_changed_or_not(&self) -> bool {
        let reading = self.source.snapshot();

        let (changed, overridden, effective) = {
            let mut state = self.state.lock();
            let changed = state.current != reading;
            state.current = reading;
            (
                changed,
                state.override_theme.is_some(),
                state.override_theme.unwrap_or(reading.theme),
            )
        };

        if changed {
            tracing::debug!(
                target: targets::THEME,
                theme = %reading.theme,
                accent = ?reading.accent,
                overridden,
                "system theme changed"
            );
            if !overridden {
                self.system_theme_changed.emit(effective);
            }
        }
        changed
    }

    /// Force the effective theme.
    ///
    /// [`SystemTheme::Unknown`] clears the override. Returns `false` without
    /// emitting when the effective theme already equals `theme`.
    pub fn set_override_theme(&self, theme: SystemTheme) -> bool {
        let effective = {
            let mut state = self.state.lock();
            let effective = state.override_theme.unwrap_or(state.current.theme);
            if effective == theme {
                return false;
            }
            state.override_theme = (theme != SystemTheme::Unknown).then_some(theme);
            state.override_theme.unwrap_or(state.current.theme)
        };

        tracing::debug!(target: targets::THEME, %theme, "system theme overridden");
        self.system_theme_changed.emit(effective);
        true
    }
}

static_assertions::assert_impl_all!(ThemeTracker: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// A source whose reading tests can change.
    #[derive(Clone, Default)]
    struct FakeSource(Arc<Mutex<ThemeSnapshot>>);

    impl FakeSource {
        fn set(&self, theme: SystemTheme, accent: Option<AccentColor>) {
            *self.0.lock() = ThemeSnapshot { theme, accent };
        }
    }

    impl ThemeSource for FakeSource {
        fn snapshot(&self) -> ThemeSnapshot {
            *self.0.lock()
        }
    }

    fn tracker() -> (ThemeTracker, FakeSource, Arc<AtomicUsize>) {
        let source = FakeSource::default();
        source.set(SystemTheme::Light, None);
        let tracker = ThemeTracker::new(source.clone());
        let emitted = Arc::new(AtomicUsize::new(0));
        let counter = emitted.clone();
        tracker.system_theme_changed().connect(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        (tracker, source, emitted)
    }

    #[test]
    fn test_no_change_no_emit() {
        let (tracker, _source, emitted) = tracker();
        assert!(!tracker.notify_changed_or_not());
        assert_eq!(emitted.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_theme_change_emits() {
        let (tracker, source, emitted) = tracker();
        source.set(SystemTheme::Dark, None);
        assert!(tracker.notify_changed_or_not());
        assert_eq!(tracker.system_theme(), SystemTheme::Dark);
        assert_eq!(emitted.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_accent_change_emits() {
        let (tracker, source, emitted) = tracker();
        source.set(SystemTheme::Light, Some(AccentColor::new(0, 120, 215)));
        assert!(tracker.notify_changed_or_not());
        assert_eq!(tracker.accent_color(), Some(AccentColor::new(0, 120, 215)));
        assert_eq!(emitted.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_override_suppresses_detected_changes() {
        let (tracker, source, emitted) = tracker();
        assert!(tracker.set_override_theme(SystemTheme::Dark));
        assert_eq!(emitted.load(Ordering::SeqCst), 1);

        source.set(SystemTheme::HighContrast, None);
        assert!(tracker.notify_changed_or_not());
        assert_eq!(emitted.load(Ordering::SeqCst), 1);
        assert_eq!(tracker.system_theme(), SystemTheme::Dark);
    }

    #[test]
    fn test_override_same_theme_is_noop() {
        let (tracker, _source, emitted) = tracker();
        assert!(!tracker.set_override_theme(SystemTheme::Light));
        assert_eq!(emitted.load(Ordering::SeqCst), 0);
        assert_eq!(tracker.override_theme(), None);
    }

    #[test]
    fn test_unknown_clears_override() {
        let (tracker, _source, emitted) = tracker();
        tracker.set_override_theme(SystemTheme::Dark);
        assert!(tracker.set_override_theme(SystemTheme::Unknown));
        assert_eq!(tracker.override_theme(), None);
        assert_eq!(tracker.system_theme(), SystemTheme::Light);
        assert_eq!(emitted.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_accent_from_argb() {
        let color = AccentColor::from_argb(0xC40078D7);
        assert_eq!(color, AccentColor::new(0x00, 0x78, 0xD7));
        assert_eq!(color.to_string(), "#0078d7");
    }

    #[test]
    fn test_platform_source_does_not_panic() {
        let _ = PlatformThemeSource.snapshot();
    }
}

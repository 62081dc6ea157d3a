//! Per-window chrome state.
//!
//! A [`ChromeState`] record exists for a window exactly while that window is
//! registered with the [`ChromeRegistry`](crate::ChromeRegistry). The record
//! carries the host-supplied [`ChromeSettings`] together with the platform
//! state last observed for the window (composition, theming) and the
//! [`ChromeLifecycle`] stage of the window's one-time setup.

use winit::window::WindowId;

use crate::geometry::{Rect, Size};

/// Opaque native identity of a window.
///
/// On Windows this is the `HWND` value. Elsewhere it is derived from the
/// toolkit's window id. The value `0` is the null handle and is never
/// registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct WindowHandle(usize);

impl WindowHandle {
    /// The null handle.
    pub const NULL: Self = Self(0);

    /// Wrap a raw native handle value.
    pub const fn new(raw: usize) -> Self {
        Self(raw)
    }

    /// The raw handle value.
    pub const fn raw(self) -> usize {
        self.0
    }

    /// Returns `true` for the null handle.
    pub const fn is_null(self) -> bool {
        self.0 == 0
    }
}

impl From<WindowId> for WindowHandle {
    fn from(id: WindowId) -> Self {
        Self(u64::from(id) as usize)
    }
}

impl std::fmt::Display for WindowHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// Lifecycle stage of a registered window.
///
/// Unregistered windows have no record at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ChromeLifecycle {
    /// Registered, frameless style not yet applied.
    #[default]
    Registered,
    /// One-time style, shadow and blur setup is running or has run.
    Initialized,
    /// Steady-state message handling.
    Active,
}

/// Per-window behaviour switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ChromeOptions {
    /// Leave the cursor shape alone on the toolkit-event path.
    pub dont_touch_cursor_shape: bool,
}

/// Host-supplied chrome settings for one window.
///
/// All lengths are logical pixels. A zero border or title bar length means
/// "use the platform default".
///
/// # Example
///
/// ```
/// use horizon_frameless_core::{ChromeSettings, Rect, Size};
///
/// let settings = ChromeSettings::new()
///     .with_titlebar_height(32.0)
///     .with_minimum_size(Size::new(320.0, 240.0))
///     .with_ignore_area(Rect::new(700.0, 0.0, 100.0, 32.0));
///
/// assert_eq!(settings.titlebar_height(), 32.0);
/// assert_eq!(settings.ignore_areas().len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ChromeSettings {
    border_width: f64,
    border_height: f64,
    titlebar_height: f64,
    minimum_size: Size,
    blur_enabled: bool,
    draggable_areas: Vec<Rect>,
    ignore_areas: Vec<Rect>,
    options: ChromeOptions,
}

impl ChromeSettings {
    /// Create settings that use platform defaults everywhere.
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // Builder Methods
    // =========================================================================

    /// Override the resize border width.
    pub fn with_border_width(mut self, width: f64) -> Self {
        self.border_width = width.max(0.0);
        self
    }

    /// Override the resize border height.
    pub fn with_border_height(mut self, height: f64) -> Self {
        self.border_height = height.max(0.0);
        self
    }

    /// Override both resize border dimensions.
    pub fn with_border(self, thickness: f64) -> Self {
        self.with_border_width(thickness)
            .with_border_height(thickness)
    }

    /// Override the title bar height.
    pub fn with_titlebar_height(mut self, height: f64) -> Self {
        self.titlebar_height = height.max(0.0);
        self
    }

    /// Set the minimum track size.
    pub fn with_minimum_size(mut self, size: Size) -> Self {
        self.minimum_size = size;
        self
    }

    /// Request blur behind the window.
    ///
    /// Only honoured if set before the window is first shown.
    pub fn with_blur(mut self, enabled: bool) -> Self {
        self.blur_enabled = enabled;
        self
    }

    /// Add a draggable area.
    ///
    /// With no draggable areas the whole title bar strip drags the window.
    pub fn with_draggable_area(mut self, area: Rect) -> Self {
        self.draggable_areas.push(area);
        self
    }

    /// Add an ignore area. Ignore areas always override draggability.
    pub fn with_ignore_area(mut self, area: Rect) -> Self {
        self.ignore_areas.push(area);
        self
    }

    /// Set the per-window options.
    pub fn with_options(mut self, options: ChromeOptions) -> Self {
        self.options = options;
        self
    }

    // =========================================================================
    // Setters
    // =========================================================================

    pub fn set_border_width(&mut self, width: f64) {
        self.border_width = width.max(0.0);
    }

    pub fn set_border_height(&mut self, height: f64) {
        self.border_height = height.max(0.0);
    }

    pub fn set_titlebar_height(&mut self, height: f64) {
        self.titlebar_height = height.max(0.0);
    }

    pub fn set_minimum_size(&mut self, size: Size) {
        self.minimum_size = size;
    }

    pub fn set_blur_enabled(&mut self, enabled: bool) {
        self.blur_enabled = enabled;
    }

    /// Replace the draggable areas.
    pub fn set_draggable_areas(&mut self, areas: Vec<Rect>) {
        self.draggable_areas = areas;
    }

    /// Replace the ignore areas.
    pub fn set_ignore_areas(&mut self, areas: Vec<Rect>) {
        self.ignore_areas = areas;
    }

    pub fn set_options(&mut self, options: ChromeOptions) {
        self.options = options;
    }

    // =========================================================================
    // Getters
    // =========================================================================

    pub fn border_width(&self) -> f64 {
        self.border_width
    }

    pub fn border_height(&self) -> f64 {
        self.border_height
    }

    pub fn titlebar_height(&self) -> f64 {
        self.titlebar_height
    }

    pub fn minimum_size(&self) -> Size {
        self.minimum_size
    }

    pub fn blur_enabled(&self) -> bool {
        self.blur_enabled
    }

    pub fn draggable_areas(&self) -> &[Rect] {
        &self.draggable_areas
    }

    pub fn ignore_areas(&self) -> &[Rect] {
        &self.ignore_areas
    }

    pub fn options(&self) -> ChromeOptions {
        self.options
    }
}

/// The chrome record for one registered window.
#[derive(Debug, Clone, PartialEq)]
pub struct ChromeState {
    /// The window this record belongs to.
    pub window: WindowHandle,
    /// Progress of the one-time setup.
    pub lifecycle: ChromeLifecycle,
    /// Whether desktop composition was enabled when last probed.
    pub composition_enabled: bool,
    /// Whether visual styles were active when last probed.
    pub theme_enabled: bool,
    /// Host-supplied settings.
    pub settings: ChromeSettings,
    /// Set once a removal has claimed the record.
    pub detaching: bool,
}

impl ChromeState {
    /// Create a freshly registered record.
    pub fn new(window: WindowHandle, settings: ChromeSettings) -> Self {
        Self {
            window,
            lifecycle: ChromeLifecycle::Registered,
            composition_enabled: false,
            theme_enabled: false,
            settings,
            detaching: false,
        }
    }

    /// Whether the one-time setup has started.
    pub fn initialized(&self) -> bool {
        !matches!(self.lifecycle, ChromeLifecycle::Registered)
    }
}

static_assertions::assert_impl_all!(ChromeState: Send, Sync);

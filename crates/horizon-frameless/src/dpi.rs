//! DPI resolution and DPI-aware system metrics.
//!
//! The platform exposes DPI through several APIs that appeared in different
//! OS releases. [`DpiCapabilities`] is the table of those that resolved at
//! runtime; it is probed once per process and cached. [`DpiResolver`] walks
//! the table in a fixed preference order and falls through to the next tier
//! whenever an API is missing or reports nothing:
//!
//! 1. per-window DPI
//! 2. per-process DPI
//! 3. system DPI
//! 4. per-monitor DPI (of the monitor nearest the window)
//! 5. device-context DPI
//! 6. [`BASELINE_DPI`]
//!
//! Tiers 1 and 4 need a window and are skipped for process-wide queries.
//!
//! # System Metrics
//!
//! Frame thickness and caption height are requested through the DPI-aware
//! metric API when it exists, with the DPI snapped to the half-step table of
//! [`snap_dpi_half_step`] unless the rounding policy is pass-through. Without
//! it the DPI-unaware metric is multiplied by the scale factor, and without
//! either the built-in defaults of [`PlatformMetrics::BUILTIN`] are scaled.

use std::sync::OnceLock;

use horizon_frameless_core::logging::targets;
use horizon_frameless_core::{
    scale_factor, snap_dpi_half_step, PlatformMetrics, ScaleRoundingPolicy, WindowHandle,
    BASELINE_DPI,
};

/// DPI query for a specific window.
pub type WindowDpiFn = fn(WindowHandle) -> Option<u32>;
/// Process-wide DPI query.
pub type GlobalDpiFn = fn() -> Option<u32>;
/// Device-context DPI query, for a window or for the screen.
pub type DeviceDpiFn = fn(Option<WindowHandle>) -> Option<u32>;
/// DPI-aware system metric query.
pub type MetricForDpiFn = fn(SystemMetric, u32) -> Option<i32>;
/// DPI-unaware system metric query.
pub type MetricFn = fn(SystemMetric) -> Option<i32>;

/// Interpret a raw system metric value.
///
/// Zero is a real reading (`SM_CXPADDEDBORDER` is 0 under classic themes);
/// only negative values count as a failed query.
pub fn metric_reading(value: i32) -> Option<i32> {
    (value >= 0).then_some(value)
}

/// System metrics the chrome engine depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SystemMetric {
    /// Horizontal sizing frame thickness (`SM_CXFRAME`).
    FrameWidth,
    /// Vertical sizing frame thickness (`SM_CYFRAME`).
    FrameHeight,
    /// Padding around the sizing frame (`SM_CXPADDEDBORDER`).
    PaddedBorder,
    /// Caption bar height (`SM_CYCAPTION`).
    CaptionHeight,
}

impl SystemMetric {
    /// The Win32 `GetSystemMetrics` index of this metric.
    pub fn index(self) -> i32 {
        match self {
            Self::FrameWidth => 32,
            Self::FrameHeight => 33,
            Self::PaddedBorder => 92,
            Self::CaptionHeight => 4,
        }
    }

    /// Built-in logical value used when nothing can be queried.
    pub fn builtin(self) -> f64 {
        let metrics = PlatformMetrics::BUILTIN;
        match self {
            Self::FrameWidth => metrics.frame_width,
            Self::FrameHeight => metrics.frame_height,
            Self::PaddedBorder => metrics.padded_border,
            Self::CaptionHeight => metrics.caption_height,
        }
    }
}

/// Which tier produced a DPI value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DpiSource {
    Window,
    Process,
    System,
    Monitor,
    DeviceContext,
    Baseline,
}

/// Platform DPI and metric APIs available in this process.
#[derive(Debug, Clone, Copy, Default)]
pub struct DpiCapabilities {
    pub window_dpi: Option<WindowDpiFn>,
    pub process_dpi: Option<GlobalDpiFn>,
    pub system_dpi: Option<GlobalDpiFn>,
    pub monitor_dpi: Option<WindowDpiFn>,
    pub device_context_dpi: Option<DeviceDpiFn>,
    pub metric_for_dpi: Option<MetricForDpiFn>,
    pub metric: Option<MetricFn>,
}

static CAPABILITIES: OnceLock<DpiCapabilities> = OnceLock::new();

impl DpiCapabilities {
    /// A table with nothing available.
    pub const fn none() -> Self {
        Self {
            window_dpi: None,
            process_dpi: None,
            system_dpi: None,
            monitor_dpi: None,
            device_context_dpi: None,
            metric_for_dpi: None,
            metric: None,
        }
    }

    /// The capabilities of the running platform, probed on first use.
    pub fn instance() -> &'static DpiCapabilities {
        CAPABILITIES.get_or_init(|| {
            let capabilities = Self::probe();
            tracing::debug!(target: targets::DPI, ?capabilities, "probed DPI capabilities");
            capabilities
        })
    }

    #[cfg(target_os = "windows")]
    fn probe() -> Self {
        crate::win32::dpi_capabilities()
    }

    #[cfg(not(target_os = "windows"))]
    fn probe() -> Self {
        Self::none()
    }
}

/// Resolves DPI, scale factor and system metrics for windows.
#[derive(Debug, Clone, Copy)]
pub struct DpiResolver {
    capabilities: DpiCapabilities,
    policy: ScaleRoundingPolicy,
}

impl DpiResolver {
    /// Create a resolver over an explicit capability table.
    pub fn new(capabilities: DpiCapabilities, policy: ScaleRoundingPolicy) -> Self {
        Self {
            capabilities,
            policy,
        }
    }

    /// A resolver over the running platform's capabilities.
    pub fn for_platform(policy: ScaleRoundingPolicy) -> Self {
        Self::new(*DpiCapabilities::instance(), policy)
    }

    pub fn policy(&self) -> ScaleRoundingPolicy {
        self.policy
    }

    pub fn capabilities(&self) -> &DpiCapabilities {
        &self.capabilities
    }

    /// Resolve the DPI for `window`, or process-wide for `None`.
    pub fn resolve(&self, window: Option<WindowHandle>) -> (u32, DpiSource) {
        let window = window.filter(|w| !w.is_null());
        let caps = &self.capabilities;
        let valid = |dpi: Option<u32>| dpi.filter(|d| *d > 0);

        if let Some(dpi) = window.and_then(|w| caps.window_dpi.and_then(|f| valid(f(w)))) {
            return (dpi, DpiSource::Window);
        }
        if let Some(dpi) = caps.process_dpi.and_then(|f| valid(f())) {
            return (dpi, DpiSource::Process);
        }
        if let Some(dpi) = caps.system_dpi.and_then(|f| valid(f())) {
            return (dpi, DpiSource::System);
        }
        if let Some(dpi) = window.and_then(|w| caps.monitor_dpi.and_then(|f| valid(f(w)))) {
            return (dpi, DpiSource::Monitor);
        }
        if let Some(dpi) = caps.device_context_dpi.and_then(|f| valid(f(window))) {
            return (dpi, DpiSource::DeviceContext);
        }

        tracing::debug!(target: targets::DPI, ?window, "no DPI source available, using baseline");
        (BASELINE_DPI, DpiSource::Baseline)
    }

    /// The effective DPI for `window`.
    pub fn dpi(&self, window: Option<WindowHandle>) -> u32 {
        self.resolve(window).0
    }

    /// The rounded scale factor for `window`.
    pub fn scale_factor(&self, window: Option<WindowHandle>) -> f64 {
        scale_factor(self.dpi(window), self.policy)
    }

    /// A system metric in physical pixels for `window`.
    pub fn system_metric(&self, metric: SystemMetric, window: Option<WindowHandle>) -> f64 {
        if let Some(query) = self.capabilities.metric_for_dpi {
            let dpi = self.dpi(window);
            let dpi = if self.policy == ScaleRoundingPolicy::PassThrough {
                dpi
            } else {
                snap_dpi_half_step(dpi)
            };
            if let Some(value) = query(metric, dpi) {
                return f64::from(value);
            }
            tracing::debug!(target: targets::DPI, ?metric, dpi, "DPI-aware metric query failed");
        }

        let scale = self.scale_factor(window);
        if let Some(value) = self.capabilities.metric.and_then(|query| query(metric)) {
            return f64::from(value) * scale;
        }
        metric.builtin() * scale
    }

    /// Frame metrics for `window` in physical pixels.
    pub fn platform_metrics(&self, window: Option<WindowHandle>) -> PlatformMetrics {
        PlatformMetrics {
            frame_width: self.system_metric(SystemMetric::FrameWidth, window),
            frame_height: self.system_metric(SystemMetric::FrameHeight, window),
            padded_border: self.system_metric(SystemMetric::PaddedBorder, window),
            caption_height: self.system_metric(SystemMetric::CaptionHeight, window),
        }
    }
}

impl Default for DpiResolver {
    fn default() -> Self {
        Self::new(DpiCapabilities::none(), ScaleRoundingPolicy::default())
    }
}

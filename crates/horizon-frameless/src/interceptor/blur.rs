//! OS version and blur technique selection.

use std::fmt;

/// Operating system version as reported by the kernel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct OsVersion {
    pub major: u32,
    pub minor: u32,
    pub build: u32,
}

impl OsVersion {
    pub const WINDOWS_7: Self = Self::new(6, 1, 0);
    pub const WINDOWS_8: Self = Self::new(6, 2, 0);
    pub const WINDOWS_8_1: Self = Self::new(6, 3, 0);
    pub const WINDOWS_10: Self = Self::new(10, 0, 0);
    /// Windows 10 1607, first release with per-window DPI queries.
    pub const WINDOWS_10_1607: Self = Self::new(10, 0, 14393);
    /// Windows 10 1709, first release with acrylic.
    pub const WINDOWS_10_1709: Self = Self::new(10, 0, 16299);
    /// Windows 10 1803, first release with per-process system DPI.
    pub const WINDOWS_10_1803: Self = Self::new(10, 0, 17134);

    pub const fn new(major: u32, minor: u32, build: u32) -> Self {
        Self {
            major,
            minor,
            build,
        }
    }

    /// Whether this version is at least `other`.
    pub fn at_least(self, other: Self) -> bool {
        self >= other
    }
}

impl fmt::Display for OsVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.build)
    }
}

/// `ACCENT_STATE` values for `SetWindowCompositionAttribute`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum AccentState {
    TransparentGradient = 2,
    BlurBehind = 3,
    AcrylicBlurBehind = 4,
}

/// How blur is applied to a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlurMethod {
    /// `DwmEnableBlurBehindWindow` (Windows 7).
    DwmBlurBehind,
    /// `SetWindowCompositionAttribute` accent policy (Windows 8 and later).
    Accent(AccentState),
}

/// Pick the blur technique for `version`, or `None` when unsupported.
pub fn select_blur_method(version: OsVersion) -> Option<BlurMethod> {
    if !version.at_least(OsVersion::WINDOWS_7) {
        None
    } else if !version.at_least(OsVersion::WINDOWS_8) {
        Some(BlurMethod::DwmBlurBehind)
    } else if version.at_least(OsVersion::WINDOWS_10_1709) {
        Some(BlurMethod::Accent(AccentState::AcrylicBlurBehind))
    } else if version.at_least(OsVersion::WINDOWS_10) {
        Some(BlurMethod::Accent(AccentState::BlurBehind))
    } else {
        Some(BlurMethod::Accent(AccentState::TransparentGradient))
    }
}

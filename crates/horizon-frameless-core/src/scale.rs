//! DPI arithmetic.
//!
//! Converts a dots-per-inch value into the scale factor used for every
//! logical-to-physical conversion in the engine, and carries the platform
//! frame metrics the hit-test engine falls back to when a window has no
//! explicit border or title bar override.
//!
//! # Rounding
//!
//! Fractional scale factors produce visible seams while a window is being
//! resized, so [`ScaleRoundingPolicy::Round`] is the default. Hosts that
//! render fractional scales correctly can opt into
//! [`ScaleRoundingPolicy::PassThrough`].

use std::fmt;
use std::str::FromStr;

use crate::error::ChromeError;
use crate::logging::targets;

/// The DPI of a display at 100% scaling.
pub const BASELINE_DPI: u32 = 96;

/// How the raw `dpi / 96` ratio is adjusted before use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ScaleRoundingPolicy {
    /// Use the exact ratio.
    PassThrough,
    /// Round down to an integer.
    Floor,
    /// Round up to an integer.
    Ceil,
    /// Round to the nearest integer.
    #[default]
    Round,
}

impl ScaleRoundingPolicy {
    /// Apply this policy to a raw scale factor.
    pub fn apply(self, raw: f64) -> f64 {
        match self {
            Self::PassThrough => raw,
            Self::Floor => raw.floor(),
            Self::Ceil => raw.ceil(),
            Self::Round => raw.round(),
        }
    }
}

impl fmt::Display for ScaleRoundingPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::PassThrough => "passthrough",
            Self::Floor => "floor",
            Self::Ceil => "ceil",
            Self::Round => "round",
        };
        f.write_str(name)
    }
}

impl FromStr for ScaleRoundingPolicy {
    type Err = ChromeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "passthrough" | "pass-through" | "pass_through" => Ok(Self::PassThrough),
            "floor" => Ok(Self::Floor),
            "ceil" => Ok(Self::Ceil),
            "round" => Ok(Self::Round),
            other => Err(ChromeError::Config(format!(
                "unknown scale rounding policy `{other}`"
            ))),
        }
    }
}

/// Scale factor for `dpi` under `policy`.
///
/// A DPI of zero is treated as [`BASELINE_DPI`]. The result is never below
/// zero and is monotonic non-decreasing in `dpi` for every policy.
pub fn scale_factor(dpi: u32, policy: ScaleRoundingPolicy) -> f64 {
    let dpi = if dpi == 0 { BASELINE_DPI } else { dpi };
    policy.apply(f64::from(dpi) / f64::from(BASELINE_DPI))
}

/// Snap `dpi` to the half-step table used when querying DPI-aware metrics.
///
/// Values between the exact half steps (144, 240, 336) collapse down to the
/// integral step below them. Anything from 432 upwards is returned unchanged.
pub fn snap_dpi_half_step(dpi: u32) -> u32 {
    const STEP: u32 = BASELINE_DPI;
    const HALF: u32 = BASELINE_DPI / 2;

    if dpi < STEP + HALF {
        STEP
    } else if dpi == STEP + HALF {
        dpi
    } else if dpi < 2 * STEP + HALF {
        2 * STEP
    } else if dpi == 2 * STEP + HALF {
        dpi
    } else if dpi < 3 * STEP + HALF {
        3 * STEP
    } else if dpi == 3 * STEP + HALF {
        dpi
    } else if dpi < 4 * STEP + HALF {
        4 * STEP
    } else {
        tracing::warn!(target: targets::DPI, dpi, "DPI too large");
        dpi
    }
}

/// Physical frame metrics reported by the platform for one window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlatformMetrics {
    /// Horizontal sizing frame thickness.
    pub frame_width: f64,
    /// Vertical sizing frame thickness.
    pub frame_height: f64,
    /// Padding added around the sizing frame.
    pub padded_border: f64,
    /// Caption bar height.
    pub caption_height: f64,
}

impl PlatformMetrics {
    /// Built-in logical values used when no platform query is possible.
    pub const BUILTIN: Self = Self {
        frame_width: 4.0,
        frame_height: 4.0,
        padded_border: 4.0,
        caption_height: 23.0,
    };

    /// The built-in values multiplied by `scale`.
    pub fn builtin(scale: f64) -> Self {
        Self::BUILTIN.scaled(scale)
    }

    /// Multiply every metric by `scale`.
    pub fn scaled(self, scale: f64) -> Self {
        Self {
            frame_width: self.frame_width * scale,
            frame_height: self.frame_height * scale,
            padded_border: self.padded_border * scale,
            caption_height: self.caption_height * scale,
        }
    }

    /// Default resize border width: frame plus padding.
    pub fn border_width(&self) -> f64 {
        self.frame_width + self.padded_border
    }

    /// Default resize border height: frame plus padding.
    pub fn border_height(&self) -> f64 {
        self.frame_height + self.padded_border
    }

    /// Default title bar height: border height plus caption.
    pub fn titlebar_height(&self) -> f64 {
        self.border_height() + self.caption_height
    }
}

impl Default for PlatformMetrics {
    fn default() -> Self {
        Self::BUILTIN
    }
}

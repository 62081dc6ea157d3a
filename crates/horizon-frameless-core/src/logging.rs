//! Logging facilities for Horizon Frameless.
//!
//! Horizon Frameless uses the `tracing` crate for instrumentation. Nothing is
//! printed unless the application installs a subscriber:
//!
//! ```ignore
//! fn main() {
//!     tracing_subscriber::fmt()
//!         .with_env_filter("horizon_frameless=debug")
//!         .init();
//!
//!     // Your application code...
//! }
//! ```
//!
//! Invalid input (null handles, unknown windows) and capability fallbacks
//! are reported at `debug`. Configuration problems are reported at `warn`.

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem.
pub mod targets {
    /// Root target.
    pub const ROOT: &str = "horizon_frameless";
    /// Window registry target.
    pub const REGISTRY: &str = "horizon_frameless::registry";
    /// Native message interceptor target.
    pub const INTERCEPTOR: &str = "horizon_frameless::interceptor";
    /// DPI and system metric resolution target.
    pub const DPI: &str = "horizon_frameless::dpi";
    /// Toolkit-event fallback target.
    pub const FALLBACK: &str = "horizon_frameless::fallback";
    /// System theme tracking target.
    pub const THEME: &str = "horizon_frameless::theme";
    /// Configuration loading target.
    pub const CONFIG: &str = "horizon_frameless::config";
    /// Signal emission target.
    pub const SIGNAL: &str = "horizon_frameless::signal";
}

//! Engine configuration.
//!
//! A small table of boolean [`ConfigOption`]s plus the scale-factor rounding
//! policy. Each option can be switched on from two sources:
//!
//! - an environment variable `HORIZON_FRAMELESS_<NAME>` holding an integer
//!   greater than zero;
//! - the key `<Name>` in the `[Options]` section of `.horizon-frameless.ini`
//!   next to the executable, holding a boolean.
//!
//! Either source can be disabled before loading, and [`ChromeConfig::set`]
//! overrides whatever was loaded.
//!
//! # Example
//!
//! ```
//! use horizon_frameless_core::{ChromeConfig, ConfigOption};
//!
//! let mut config = ChromeConfig::new();
//! assert!(!config.is_set(ConfigOption::UseCrossPlatformImplementation));
//!
//! config.set(ConfigOption::UseCrossPlatformImplementation, true);
//! assert!(config.is_set(ConfigOption::UseCrossPlatformImplementation));
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use ini::Ini;

use crate::error::{ChromeError, ChromeResult};
use crate::logging::targets;
use crate::scale::ScaleRoundingPolicy;

/// File name of the optional settings file.
pub const CONFIG_FILE_NAME: &str = ".horizon-frameless.ini";

/// Section holding every option in the settings file.
pub const CONFIG_SECTION: &str = "Options";

const SCALE_ROUNDING_ENV: &str = "HORIZON_FRAMELESS_SCALE_ROUNDING";
const SCALE_ROUNDING_KEY: &str = "ScaleFactorRoundingPolicy";

/// Boolean engine options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigOption {
    /// Use the toolkit-event path even where native message access exists.
    UseCrossPlatformImplementation,
    /// Enable blur behind every registered window.
    EnableBlurBehindWindow,
    /// Never change the cursor shape on the toolkit-event path.
    DontTouchCursorShape,
}

impl ConfigOption {
    /// Every option, in table order.
    pub const ALL: [Self; 3] = [
        Self::UseCrossPlatformImplementation,
        Self::EnableBlurBehindWindow,
        Self::DontTouchCursorShape,
    ];

    /// Environment variable controlling this option.
    pub fn env_var(self) -> &'static str {
        match self {
            Self::UseCrossPlatformImplementation => {
                "HORIZON_FRAMELESS_USE_CROSS_PLATFORM_IMPLEMENTATION"
            }
            Self::EnableBlurBehindWindow => "HORIZON_FRAMELESS_ENABLE_BLUR_BEHIND_WINDOW",
            Self::DontTouchCursorShape => "HORIZON_FRAMELESS_DONT_TOUCH_CURSOR_SHAPE",
        }
    }

    /// Key of this option in the `[Options]` section.
    pub fn ini_key(self) -> &'static str {
        match self {
            Self::UseCrossPlatformImplementation => "UseCrossPlatformImplementation",
            Self::EnableBlurBehindWindow => "EnableBlurBehindWindow",
            Self::DontTouchCursorShape => "DontTouchCursorShape",
        }
    }
}

/// Resolved configuration.
#[derive(Debug, Clone, Default)]
pub struct ChromeConfig {
    options: HashMap<ConfigOption, bool>,
    scale_rounding: ScaleRoundingPolicy,
    env_disabled: bool,
    file_disabled: bool,
    file_path: Option<PathBuf>,
}

impl ChromeConfig {
    /// A configuration with every option off and the default rounding policy.
    ///
    /// Nothing is read until [`load`](Self::load) is called.
    pub fn new() -> Self {
        Self::default()
    }

    /// Skip environment variables when loading.
    pub fn with_env_disabled(mut self, disabled: bool) -> Self {
        self.env_disabled = disabled;
        self
    }

    /// Skip the settings file when loading.
    pub fn with_file_disabled(mut self, disabled: bool) -> Self {
        self.file_disabled = disabled;
        self
    }

    /// Read the settings file from `path` instead of next to the executable.
    pub fn with_file_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.file_path = Some(path.into());
        self
    }

    /// Load from the process environment and the settings file.
    pub fn load(self) -> Self {
        let ini = if self.file_disabled {
            None
        } else {
            self.file_path
                .clone()
                .or_else(default_file_path)
                .and_then(|path| match read_settings_file(&path) {
                    Ok(ini) => ini,
                    Err(err) => {
                        tracing::warn!(target: targets::CONFIG, path = %path.display(), %err, "ignoring settings file");
                        None
                    }
                })
        };
        self.load_from(|name| std::env::var(name).ok(), ini.as_ref())
    }

    /// Load from explicit sources.
    ///
    /// `env` looks up an environment variable by name. Sources disabled on
    /// this configuration are skipped even when supplied.
    pub fn load_from(mut self, env: impl Fn(&str) -> Option<String>, ini: Option<&Ini>) -> Self {
        let ini = if self.file_disabled { None } else { ini };
        let env_disabled = self.env_disabled;
        let env_value = |name: &str| if env_disabled { None } else { env(name) };

        for option in ConfigOption::ALL {
            let from_env = env_value(option.env_var())
                .and_then(|value| value.trim().parse::<i64>().ok())
                .is_some_and(|value| value > 0);
            let from_file = ini
                .and_then(|ini| ini.get_from(Some(CONFIG_SECTION), option.ini_key()))
                .is_some_and(parse_bool);
            self.options.insert(option, from_env || from_file);
        }

        let rounding = env_value(SCALE_ROUNDING_ENV).or_else(|| {
            ini.and_then(|ini| ini.get_from(Some(CONFIG_SECTION), SCALE_ROUNDING_KEY))
                .map(str::to_owned)
        });
        if let Some(value) = rounding {
            match value.parse::<ScaleRoundingPolicy>() {
                Ok(policy) => self.scale_rounding = policy,
                Err(err) => tracing::warn!(target: targets::CONFIG, %err, "keeping default scale rounding"),
            }
        }

        tracing::debug!(target: targets::CONFIG, options = ?self.options, rounding = %self.scale_rounding, "configuration loaded");
        self.warn_inappropriate();
        self
    }

    /// Whether `option` is on.
    pub fn is_set(&self, option: ConfigOption) -> bool {
        self.options.get(&option).copied().unwrap_or(false)
    }

    /// Force `option` on or off.
    pub fn set(&mut self, option: ConfigOption, on: bool) {
        self.options.insert(option, on);
    }

    /// The configured scale-factor rounding policy.
    pub fn scale_rounding(&self) -> ScaleRoundingPolicy {
        self.scale_rounding
    }

    pub fn set_scale_rounding(&mut self, policy: ScaleRoundingPolicy) {
        self.scale_rounding = policy;
    }

    /// Log option combinations that have no effect on this platform.
    pub fn warn_inappropriate(&self) {
        if !cfg!(target_os = "windows") && self.is_set(ConfigOption::UseCrossPlatformImplementation) {
            tracing::warn!(
                target: targets::CONFIG,
                "UseCrossPlatformImplementation is the default on non-Windows platforms"
            );
        }
        if self.is_set(ConfigOption::EnableBlurBehindWindow)
            && (self.is_set(ConfigOption::UseCrossPlatformImplementation)
                || !cfg!(target_os = "windows"))
        {
            tracing::warn!(
                target: targets::CONFIG,
                "EnableBlurBehindWindow only has an effect with the native Windows implementation"
            );
        }
    }
}

/// The settings file next to the running executable.
pub fn default_file_path() -> Option<PathBuf> {
    let exe = std::env::current_exe().ok()?;
    Some(exe.parent()?.join(CONFIG_FILE_NAME))
}

/// Read a settings file. A missing file is not an error.
pub fn read_settings_file(path: &Path) -> ChromeResult<Option<Ini>> {
    if !path.is_file() {
        return Ok(None);
    }
    Ini::load_from_file(path)
        .map(Some)
        .map_err(|err| ChromeError::Config(format!("{}: {err}", path.display())))
}

fn parse_bool(value: &str) -> bool {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" => true,
        other => other.parse::<i64>().is_ok_and(|n| n > 0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_defaults() {
        let config = ChromeConfig::new().load_from(no_env, None);
        for option in ConfigOption::ALL {
            assert!(!config.is_set(option));
        }
        assert_eq!(config.scale_rounding(), ScaleRoundingPolicy::Round);
    }

    #[test]
    fn test_env_integer_threshold() {
        let env = |name: &str| match name {
            "HORIZON_FRAMELESS_USE_CROSS_PLATFORM_IMPLEMENTATION" => Some("1".to_string()),
            "HORIZON_FRAMELESS_DONT_TOUCH_CURSOR_SHAPE" => Some("0".to_string()),
            "HORIZON_FRAMELESS_ENABLE_BLUR_BEHIND_WINDOW" => Some("yes".to_string()),
            _ => None,
        };
        let config = ChromeConfig::new().load_from(env, None);
        assert!(config.is_set(ConfigOption::UseCrossPlatformImplementation));
        assert!(!config.is_set(ConfigOption::DontTouchCursorShape));
        assert!(!config.is_set(ConfigOption::EnableBlurBehindWindow));
    }

    #[test]
    fn test_ini_source() {
        let ini = Ini::load_from_str(
            "[Options]\nDontTouchCursorShape=true\nScaleFactorRoundingPolicy=floor\n",
        )
        .unwrap();
        let config = ChromeConfig::new().load_from(no_env, Some(&ini));
        assert!(config.is_set(ConfigOption::DontTouchCursorShape));
        assert_eq!(config.scale_rounding(), ScaleRoundingPolicy::Floor);
    }

    #[test]
    fn test_disabled_sources() {
        let env = |_: &str| Some("1".to_string());
        let ini = Ini::load_from_str("[Options]\nEnableBlurBehindWindow=true\n").unwrap();

        let config = ChromeConfig::new()
            .with_env_disabled(true)
            .load_from(env, Some(&ini));
        assert!(!config.is_set(ConfigOption::UseCrossPlatformImplementation));
        assert!(config.is_set(ConfigOption::EnableBlurBehindWindow));

        let config = ChromeConfig::new()
            .with_file_disabled(true)
            .with_env_disabled(true)
            .load_from(env, Some(&ini));
        assert!(!config.is_set(ConfigOption::EnableBlurBehindWindow));
    }

    #[test]
    fn test_env_rounding_wins_over_file() {
        let env = |name: &str| (name == SCALE_ROUNDING_ENV).then(|| "passthrough".to_string());
        let ini = Ini::load_from_str("[Options]\nScaleFactorRoundingPolicy=ceil\n").unwrap();
        let config = ChromeConfig::new().load_from(env, Some(&ini));
        assert_eq!(config.scale_rounding(), ScaleRoundingPolicy::PassThrough);
    }

    #[test]
    fn test_invalid_rounding_keeps_default() {
        let env = |name: &str| (name == SCALE_ROUNDING_ENV).then(|| "sideways".to_string());
        let config = ChromeConfig::new().load_from(env, None);
        assert_eq!(config.scale_rounding(), ScaleRoundingPolicy::Round);
    }

    #[test]
    fn test_set_overrides_loaded_value() {
        let mut config = ChromeConfig::new().load_from(|_| Some("1".to_string()), None);
        assert!(config.is_set(ConfigOption::DontTouchCursorShape));
        config.set(ConfigOption::DontTouchCursorShape, false);
        assert!(!config.is_set(ConfigOption::DontTouchCursorShape));
    }

    #[test]
    fn test_missing_file_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        assert!(matches!(read_settings_file(&path), Ok(None)));
    }

    #[test]
    fn test_load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "[Options]\nUseCrossPlatformImplementation=1\n").unwrap();

        let config = ChromeConfig::new()
            .with_env_disabled(true)
            .with_file_path(&path)
            .load();
        assert!(config.is_set(ConfigOption::UseCrossPlatformImplementation));
    }
}

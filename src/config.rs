//! Container options.
//!
//! Options come from code, from the environment, or (with the `config`
//! feature) from JSON.

use std::env;
use std::fmt;
use std::str::FromStr;

#[cfg(feature = "config")]
use serde::{Deserialize, Serialize};

use crate::error::{DiError, DiResult};
use crate::internal::DEFAULT_MAX_DEPTH;

/// Environment variable overriding [`ContainerOptions::max_resolution_depth`].
pub const ENV_MAX_DEPTH: &str = "FERROUS_IOC_MAX_DEPTH";

/// Environment variable overriding [`ContainerOptions::timing_log_level`].
pub const ENV_TIMING_LEVEL: &str = "FERROUS_IOC_TIMING_LEVEL";

/// Level at which timing records are emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(rename_all = "lowercase"))]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl FromStr for LogLevel {
    type Err = DiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            other => Err(DiError::InvalidConfiguration(format!(
                "unknown log level '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        };
        f.write_str(name)
    }
}

/// Tunables for a [`Container`](crate::Container).
///
/// # Examples
///
/// ```rust
/// use ferrous_ioc::{ContainerOptions, LogLevel};
///
/// let options = ContainerOptions::new()
///     .with_max_resolution_depth(16)
///     .with_timing_log_level(LogLevel::Debug);
///
/// assert_eq!(options.max_resolution_depth, 16);
/// assert_eq!(ContainerOptions::default().max_resolution_depth, 64);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct ContainerOptions {
    /// Nested resolutions allowed on one thread before `UnboundedRecursion`.
    pub max_resolution_depth: usize,
    /// Level of the timing records emitted by proxies.
    pub timing_log_level: LogLevel,
}

impl Default for ContainerOptions {
    fn default() -> Self {
        Self {
            max_resolution_depth: DEFAULT_MAX_DEPTH,
            timing_log_level: LogLevel::default(),
        }
    }
}

impl ContainerOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_resolution_depth(mut self, depth: usize) -> Self {
        self.max_resolution_depth = depth;
        self
    }

    pub fn with_timing_log_level(mut self, level: LogLevel) -> Self {
        self.timing_log_level = level;
        self
    }

    /// Defaults overridden by `FERROUS_IOC_MAX_DEPTH` and
    /// `FERROUS_IOC_TIMING_LEVEL` when set.
    pub fn from_env() -> DiResult<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for the environment keys.
    pub fn from_lookup<F>(lookup: F) -> DiResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut options = Self::default();
        if let Some(raw) = lookup(ENV_MAX_DEPTH) {
            options.max_resolution_depth = raw.trim().parse().map_err(|_| {
                DiError::InvalidConfiguration(format!("{} must be an integer, got '{}'", ENV_MAX_DEPTH, raw))
            })?;
        }
        if let Some(raw) = lookup(ENV_TIMING_LEVEL) {
            options.timing_log_level = raw.parse()?;
        }
        options.validate()?;
        Ok(options)
    }

    /// Parses options from JSON; missing fields keep their defaults.
    ///
    /// ```rust
    /// use ferrous_ioc::{ContainerOptions, LogLevel};
    ///
    /// let options = ContainerOptions::from_json_str(r#"{"timing_log_level": "warn"}"#).unwrap();
    /// assert_eq!(options.timing_log_level, LogLevel::Warn);
    /// assert_eq!(options.max_resolution_depth, 64);
    /// ```
    #[cfg(feature = "config")]
    pub fn from_json_str(json: &str) -> DiResult<Self> {
        let options: Self = serde_json::from_str(json)
            .map_err(|e| DiError::InvalidConfiguration(e.to_string()))?;
        options.validate()?;
        Ok(options)
    }

    #[cfg(feature = "config")]
    pub fn to_json_string(&self) -> DiResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| DiError::InvalidConfiguration(e.to_string()))
    }

    /// Rejects a zero depth budget, which would refuse every bean.
    pub fn validate(&self) -> DiResult<()> {
        if self.max_resolution_depth == 0 {
            return Err(DiError::InvalidConfiguration(
                "max_resolution_depth must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

//! Configuration for automation sessions

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::{AutomationError, Result};

/// Size of the page viewport in CSS pixels
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
        }
    }
}

/// Configuration shared by a session and its pages
///
/// Durations are stored in milliseconds so the configuration serializes to
/// plain numbers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AutomationConfig {
    /// Default timeout for waits, 0 disables it
    default_timeout_ms: u64,

    /// Interval between selector polls
    polling_interval_ms: u64,

    viewport: Viewport,
}

impl AutomationConfig {
    /// Create a new builder for AutomationConfig
    ///
    /// # Example
    ///
    /// ```
    /// use page_automation::AutomationConfig;
    /// use std::time::Duration;
    ///
    /// let config = AutomationConfig::builder()
    ///     .default_timeout(Duration::from_secs(5))
    ///     .viewport(1280, 720)
    ///     .build();
    /// assert_eq!(config.viewport().width, 1280);
    /// ```
    pub fn builder() -> AutomationConfigBuilder {
        AutomationConfigBuilder::default()
    }

    pub fn default_timeout(&self) -> Duration {
        Duration::from_millis(self.default_timeout_ms)
    }

    pub fn polling_interval(&self) -> Duration {
        Duration::from_millis(self.polling_interval_ms)
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Check that the configuration can drive a page
    pub fn validate(&self) -> Result<()> {
        if self.viewport.width == 0 || self.viewport.height == 0 {
            return Err(AutomationError::InvalidConfiguration(format!(
                "viewport must not be empty, got {}x{}",
                self.viewport.width, self.viewport.height
            )));
        }
        if self.polling_interval_ms == 0 {
            return Err(AutomationError::InvalidConfiguration(
                "polling interval must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for AutomationConfig {
    /// Default values:
    /// - default_timeout: 30 s
    /// - polling_interval: 100 ms
    /// - viewport: 800x600
    fn default() -> Self {
        Self {
            default_timeout_ms: 30_000,
            polling_interval_ms: 100,
            viewport: Viewport::default(),
        }
    }
}

/// Builder for AutomationConfig
#[derive(Debug, Clone, Default)]
pub struct AutomationConfigBuilder {
    default_timeout: Option<Duration>,
    polling_interval: Option<Duration>,
    viewport: Option<Viewport>,
}

impl AutomationConfigBuilder {
    /// Set the default wait timeout; `Duration::ZERO` waits forever
    pub fn default_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = Some(timeout);
        self
    }

    pub fn polling_interval(mut self, interval: Duration) -> Self {
        self.polling_interval = Some(interval);
        self
    }

    pub fn viewport(mut self, width: u32, height: u32) -> Self {
        self.viewport = Some(Viewport { width, height });
        self
    }

    /// Build the AutomationConfig
    ///
    /// Uses default values for any options not explicitly set. The result is
    /// not validated; sessions validate it on creation.
    pub fn build(self) -> AutomationConfig {
        let default = AutomationConfig::default();

        AutomationConfig {
            default_timeout_ms: self
                .default_timeout
                .map(|timeout| timeout.as_millis() as u64)
                .unwrap_or(default.default_timeout_ms),
            polling_interval_ms: self
                .polling_interval
                .map(|interval| interval.as_millis() as u64)
                .unwrap_or(default.polling_interval_ms),
            viewport: self.viewport.unwrap_or(default.viewport),
        }
    }
}

/// Per-call options for [`crate::Page::wait_for_selector`]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WaitForSelectorOptions {
    /// Wait until the element is present and visible
    pub visible: bool,
    /// Wait until the element is absent or hidden
    pub hidden: bool,
    /// Overrides the session's default timeout
    pub timeout: Option<Duration>,
    /// Overrides the session's polling interval
    pub polling: Option<Duration>,
}

impl WaitForSelectorOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn visible(mut self) -> Self {
        self.visible = true;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn polling(mut self, interval: Duration) -> Self {
        self.polling = Some(interval);
        self
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.visible && self.hidden {
            return Err(AutomationError::InvalidConfiguration(
                "visible and hidden cannot both be requested".to_string(),
            ));
        }
        if self.polling.is_some_and(|interval| interval.is_zero()) {
            return Err(AutomationError::InvalidConfiguration(
                "polling interval must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

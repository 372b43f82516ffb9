//! Harness configuration

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{HarnessError, HarnessResult};
use crate::visual::{DEFAULT_ACCURACY, DEFAULT_CHANNEL_TOLERANCE};
use crate::wait::WaitConfig;

/// Largest accepted multiplier for post-gesture pauses
pub const MAX_SETTLE_FACTOR: f64 = 100.0;

/// Harness configuration, usually loaded from `wikiqa.toml`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    /// Wiki under test
    pub base_url: String,

    /// WebDriver endpoint (chromedriver, selenium, appium)
    pub webdriver_url: String,

    /// Browser requested from the endpoint
    pub browser: Browser,

    /// Run without a visible window
    pub headless: bool,

    /// Desktop viewport; emulation profiles bring their own
    pub viewport: Viewport,

    /// Minimum similarity for two screenshots to count as the same
    pub accuracy: f64,

    /// Per-channel colour tolerance when matching pixels
    pub channel_tolerance: u8,

    /// Bounded waits used by page objects
    pub wait: WaitSettings,

    /// Logs, screenshots and results; recreated at suite start
    pub output_dir: PathBuf,

    /// How long to wait for the WebDriver endpoint to report ready
    pub webdriver_ready_timeout_ms: u64,

    /// Multiplier for the fixed pauses after touch gestures; 0 disables them
    pub settle_factor: f64,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            base_url: "http://mediawiki119.wikia.com".to_string(),
            webdriver_url: "http://127.0.0.1:9515".to_string(),
            browser: Browser::Chrome,
            headless: true,
            viewport: Viewport::default(),
            accuracy: DEFAULT_ACCURACY,
            channel_tolerance: DEFAULT_CHANNEL_TOLERANCE,
            wait: WaitSettings::default(),
            output_dir: PathBuf::from("logs"),
            webdriver_ready_timeout_ms: 30_000,
            settle_factor: 1.0,
        }
    }
}

impl HarnessConfig {
    /// Load configuration from file, falling back to defaults when absent
    pub fn load(path: &Path) -> HarnessResult<Self> {
        let config = if path.exists() {
            let content = std::fs::read_to_string(path)?;
            toml::from_str(&content)?
        } else {
            Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> HarnessResult<()> {
        let content = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> HarnessResult<()> {
        if !(0.0..=1.0).contains(&self.accuracy) {
            return Err(HarnessError::Config(format!(
                "accuracy must be within [0, 1], got {}",
                self.accuracy
            )));
        }
        if self.base_url.trim().is_empty() {
            return Err(HarnessError::Config("base_url is empty".to_string()));
        }
        if !(0.0..=MAX_SETTLE_FACTOR).contains(&self.settle_factor) {
            return Err(HarnessError::Config(format!(
                "settle_factor must be within [0, {}], got {}",
                MAX_SETTLE_FACTOR, self.settle_factor
            )));
        }
        if self.wait.timeout_ms == 0 || self.wait.poll_interval_ms == 0 {
            return Err(HarnessError::Config("wait timeout and poll interval must be positive".to_string()));
        }
        Ok(())
    }

    /// Scales a nominal post-gesture pause by `settle_factor`.
    pub fn settle(&self, nominal: Duration) -> HarnessResult<Duration> {
        Duration::try_from_secs_f64(nominal.as_secs_f64() * self.settle_factor).map_err(|e| {
            HarnessError::Config(format!(
                "settle_factor {} cannot scale {:?}: {}",
                self.settle_factor, nominal, e
            ))
        })
    }

    pub fn wait_config(&self) -> WaitConfig {
        WaitConfig::new(
            Duration::from_millis(self.wait.timeout_ms),
            Duration::from_millis(self.wait.poll_interval_ms),
        )
    }

    /// Absolute URL for a wiki path such as `/wiki/Gallery`
    pub fn wiki_url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path.trim_start_matches('/'))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Browser {
    #[default]
    Chrome,
    Firefox,
}

impl Browser {
    pub fn as_str(&self) -> &'static str {
        match self {
            Browser::Chrome => "chrome",
            Browser::Firefox => "firefox",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self { width: 1280, height: 720 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaitSettings {
    pub timeout_ms: u64,
    pub poll_interval_ms: u64,
}

impl Default for WaitSettings {
    fn default() -> Self {
        Self {
            timeout_ms: 30_000,
            poll_interval_ms: 100,
        }
    }
}

/// Mobile device emulation applied when a session is opened
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmulationProfile {
    GoogleNexus5,
    AppleIphone6,
    AppleIpad,
}

impl EmulationProfile {
    /// Device name as known to Chrome's mobile emulation
    pub fn device_name(&self) -> &'static str {
        match self {
            EmulationProfile::GoogleNexus5 => "Nexus 5",
            EmulationProfile::AppleIphone6 => "iPhone 6",
            EmulationProfile::AppleIpad => "iPad",
        }
    }

    pub fn viewport(&self) -> Viewport {
        match self {
            EmulationProfile::GoogleNexus5 => Viewport { width: 360, height: 640 },
            EmulationProfile::AppleIphone6 => Viewport { width: 375, height: 667 },
            EmulationProfile::AppleIpad => Viewport { width: 768, height: 1024 },
        }
    }
}

/// Traffic routing for a session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxyProfile {
    /// `host:port` of the HTTP proxy
    pub http_proxy: String,

    /// `host:port` for TLS traffic; defaults to the HTTP proxy
    #[serde(default)]
    pub ssl_proxy: Option<String>,

    #[serde(default)]
    pub no_proxy: Vec<String>,
}

impl ProxyProfile {
    pub fn new(http_proxy: impl Into<String>) -> Self {
        Self {
            http_proxy: http_proxy.into(),
            ssl_proxy: None,
            no_proxy: Vec::new(),
        }
    }
}

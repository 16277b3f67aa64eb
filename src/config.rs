use log::{debug, warn, Level};
use serde::Deserialize;

use crate::dom::View;
use crate::error::ConfigError;

/// Id of the optional `<script type="application/json">` block carrying overrides.
pub const CONFIG_ELEMENT_ID: &str = "site-behaviors-config";

#[cfg(debug_assertions)]
pub fn log_level() -> Level {
    Level::Debug // verbose while developing locally
}

#[cfg(not(debug_assertions))]
pub fn log_level() -> Level {
    Level::Info
}

/// Tunables for every page behavior. Fields missing from the JSON keep their defaults.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Used when the page has no `.l-header`.
    pub fallback_header_height_px: f64,
    pub nav: NavConfig,
    pub reveal: RevealConfig,
    pub ripple: RippleConfig,
    pub form: FormConfig,
    pub scroll_spy: ScrollSpyConfig,
    pub counter: CounterConfig,
    pub scroll_to_top: ScrollToTopConfig,
    pub parallax: ParallaxConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct NavConfig {
    /// Viewport width at and above which an open mobile menu closes.
    pub breakpoint_px: f64,
    pub resize_debounce_ms: u32,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RevealConfig {
    pub threshold: f64,
    pub root_margin: String,
    pub offset_px: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RippleConfig {
    pub duration_ms: u32,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct FormConfig {
    pub submit_delay_ms: u32,
    pub confirmation_url: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ScrollSpyConfig {
    pub threshold: f64,
    pub root_margin: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CounterConfig {
    pub threshold: f64,
    pub duration_ms: u32,
    pub tick_ms: u32,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ScrollToTopConfig {
    pub show_after_px: f64,
    pub throttle_ms: u32,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ParallaxConfig {
    pub throttle_ms: u32,
    /// Hero offset per pixel scrolled.
    pub rate: f64,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            fallback_header_height_px: 80.0,
            nav: NavConfig::default(),
            reveal: RevealConfig::default(),
            ripple: RippleConfig::default(),
            form: FormConfig::default(),
            scroll_spy: ScrollSpyConfig::default(),
            counter: CounterConfig::default(),
            scroll_to_top: ScrollToTopConfig::default(),
            parallax: ParallaxConfig::default(),
        }
    }
}

impl Default for NavConfig {
    fn default() -> Self {
        Self { breakpoint_px: 1024.0, resize_debounce_ms: 250 }
    }
}

impl Default for RevealConfig {
    fn default() -> Self {
        Self {
            threshold: 0.1,
            root_margin: "0px 0px -50px 0px".to_string(),
            offset_px: 30.0,
        }
    }
}

impl Default for RippleConfig {
    fn default() -> Self {
        Self { duration_ms: 600 }
    }
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            submit_delay_ms: 800,
            confirmation_url: "thank_you.html".to_string(),
        }
    }
}

impl Default for ScrollSpyConfig {
    fn default() -> Self {
        Self {
            threshold: 0.3,
            root_margin: "-100px 0px -60% 0px".to_string(),
        }
    }
}

impl Default for CounterConfig {
    fn default() -> Self {
        Self { threshold: 0.5, duration_ms: 2000, tick_ms: 16 }
    }
}

impl Default for ScrollToTopConfig {
    fn default() -> Self {
        Self { show_after_px: 300.0, throttle_ms: 100 }
    }
}

impl Default for ParallaxConfig {
    fn default() -> Self {
        Self { throttle_ms: 10, rate: 0.5 }
    }
}

impl SiteConfig {
    /// Page-provided overrides, falling back to the defaults when absent or invalid.
    pub fn load<V: View + ?Sized>(view: &V) -> Self {
        let Some(block) = view.by_id(CONFIG_ELEMENT_ID) else {
            return Self::default();
        };
        match Self::from_json(&view.text(&block)) {
            Ok(config) => {
                debug!("Loaded site configuration from #{CONFIG_ELEMENT_ID}");
                config
            }
            Err(err) => {
                warn!("{err}; using default configuration");
                Self::default()
            }
        }
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: SiteConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, threshold) in [
            ("reveal.threshold", self.reveal.threshold),
            ("scroll_spy.threshold", self.scroll_spy.threshold),
            ("counter.threshold", self.counter.threshold),
        ] {
            if !(0.0..=1.0).contains(&threshold) {
                return Err(ConfigError::Invalid {
                    field,
                    reason: format!("{threshold} is outside 0..=1"),
                });
            }
        }
        if self.counter.tick_ms == 0 {
            return Err(ConfigError::Invalid {
                field: "counter.tick_ms",
                reason: "must be positive".to_string(),
            });
        }
        if self.counter.duration_ms < self.counter.tick_ms {
            return Err(ConfigError::Invalid {
                field: "counter.duration_ms",
                reason: format!("shorter than one tick ({}ms)", self.counter.tick_ms),
            });
        }
        if self.form.confirmation_url.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "form.confirmation_url",
                reason: "must not be empty".to_string(),
            });
        }
        Ok(())
    }
}

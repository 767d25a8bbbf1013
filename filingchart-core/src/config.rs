//! Overlay configuration, loadable from TOML.
//!
//! Every field has a default, so a config file only needs the keys it
//! overrides:
//!
//! ```toml
//! [settle]
//! delays_ms = [50, 200]
//!
//! [tooltip]
//! width = 360
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Post-fit reposition retries.
///
/// A fixed-delay list is a polling workaround for engines that finish layout
/// asynchronously without telling anyone. Engines that report
/// `LayoutSettled` cut the list short.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettleConfig {
    pub delays_ms: Vec<u64>,
}

impl Default for SettleConfig {
    fn default() -> Self {
        Self {
            delays_ms: vec![50, 200],
        }
    }
}

impl SettleConfig {
    pub fn delays(&self) -> impl Iterator<Item = Duration> + '_ {
        self.delays_ms.iter().map(|ms| Duration::from_millis(*ms))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkerConfig {
    /// Pixels the marker sits above its price anchor.
    pub offset_px: f64,
    pub pointer_size: f64,
    pub touch_size: f64,
}

impl Default for MarkerConfig {
    fn default() -> Self {
        Self {
            offset_px: 20.0,
            pointer_size: 12.0,
            touch_size: 18.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TooltipConfig {
    pub width: f64,
    /// Horizontal distance between anchor and tooltip edge.
    pub gap: f64,
    /// Vertical distance kept above the anchor.
    pub lift: f64,
    /// Height of one event entry.
    pub entry_height: f64,
    /// Inner padding, applied top and bottom.
    pub padding: f64,
    /// Maximum height of a bottom-docked tooltip on touch layouts.
    pub touch_max_height: f64,
}

impl Default for TooltipConfig {
    fn default() -> Self {
        Self {
            width: 320.0,
            gap: 16.0,
            lift: 10.0,
            entry_height: 46.0,
            padding: 10.0,
            touch_max_height: 220.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportConfig {
    /// Vertical space taken by surrounding chrome on pointer layouts.
    pub pointer_chrome: f64,
    /// Vertical space taken by surrounding chrome on touch layouts.
    pub touch_chrome: f64,
    /// Viewports narrower than this are treated as touch layouts.
    pub touch_breakpoint: f64,
    pub min_chart_height: f64,
    /// Minimum pixels per bar when fitting content.
    pub min_bar_spacing: f64,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            pointer_chrome: 180.0,
            touch_chrome: 140.0,
            touch_breakpoint: 768.0,
            min_chart_height: 200.0,
            min_bar_spacing: 0.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoticeConfig {
    pub ttl_ms: u64,
}

impl Default for NoticeConfig {
    fn default() -> Self {
        Self { ttl_ms: 3000 }
    }
}

impl NoticeConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_millis(self.ttl_ms)
    }
}

/// Complete overlay configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    pub settle: SettleConfig,
    pub markers: MarkerConfig,
    pub tooltip: TooltipConfig,
    pub viewport: ViewportConfig,
    pub notice: NoticeConfig,
}

impl OverlayConfig {
    /// Defaults for a character-cell surface, where one cell is one "pixel".
    pub fn terminal() -> Self {
        Self {
            settle: SettleConfig::default(),
            markers: MarkerConfig {
                offset_px: 1.0,
                pointer_size: 1.0,
                touch_size: 1.0,
            },
            tooltip: TooltipConfig {
                width: 44.0,
                gap: 2.0,
                lift: 1.0,
                entry_height: 3.0,
                padding: 1.0,
                touch_max_height: 10.0,
            },
            viewport: ViewportConfig {
                pointer_chrome: 4.0,
                touch_chrome: 3.0,
                touch_breakpoint: 80.0,
                min_chart_height: 8.0,
                min_bar_spacing: 1.0,
            },
            notice: NoticeConfig::default(),
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Layer a TOML file over `base`: keys present in the file replace the
    /// base values, everything else is kept.
    pub fn overlay_toml_str(base: &Self, content: &str) -> Result<Self, ConfigError> {
        let mut merged = toml::Value::try_from(base)?;
        let patch: toml::Value = toml::from_str(content)?;
        merge_values(&mut merged, patch);
        let config: Self = merged.try_into()?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Load `path` over `base` if it exists; otherwise return `base`.
    pub fn load_over(base: Self, path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(base);
        }
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::overlay_toml_str(&base, &content)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tooltip.width <= 0.0 {
            return Err(ConfigError::Invalid("tooltip.width must be positive".into()));
        }
        if self.tooltip.entry_height <= 0.0 {
            return Err(ConfigError::Invalid(
                "tooltip.entry_height must be positive".into(),
            ));
        }
        if self.viewport.touch_breakpoint < 0.0 {
            return Err(ConfigError::Invalid(
                "viewport.touch_breakpoint must not be negative".into(),
            ));
        }
        if self.settle.delays_ms.windows(2).any(|w| w[0] > w[1]) {
            return Err(ConfigError::Invalid(
                "settle.delays_ms must be ascending".into(),
            ));
        }
        Ok(())
    }
}

fn merge_values(base: &mut toml::Value, patch: toml::Value) {
    match (base, patch) {
        (toml::Value::Table(base), toml::Value::Table(patch)) => {
            for (key, value) in patch {
                match base.get_mut(&key) {
                    Some(existing) => merge_values(existing, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (slot, value) => *slot = value,
    }
}

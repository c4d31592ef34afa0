//! Inventory configuration
//!
//! Settings are plain serde data and can be stored as JSON. The drag mode may
//! be overridden with the `INVENTORY_DRAG_MODE` environment variable
//! (`remove_on_drag` or `remove_on_drop`).
//!
//! ```json
//! {
//!   "drag_mode": "remove_on_drag",
//!   "default_button": "Left",
//!   "search": { "interval": 1.0, "multiplier": 1.0, "delay": 1.0 }
//! }
//! ```

use crate::error::ConfigError;
use crate::slot::PointerButton;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Environment variable overriding the drag mode
pub const DRAG_MODE_ENV: &str = "INVENTORY_DRAG_MODE";

/// When the source of a drag gives up its item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DragMode {
    /// The source is vacated as soon as the drag begins
    #[default]
    RemoveOnDrag,
    /// The source is vacated only when a drop succeeds
    RemoveOnDrop,
}

impl fmt::Display for DragMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RemoveOnDrag => write!(f, "remove_on_drag"),
            Self::RemoveOnDrop => write!(f, "remove_on_drop"),
        }
    }
}

impl FromStr for DragMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "remove_on_drag" | "drag" => Ok(Self::RemoveOnDrag),
            "remove_on_drop" | "drop" => Ok(Self::RemoveOnDrop),
            _ => Err(format!("Unknown drag mode: {}", s)),
        }
    }
}

/// Timing of progressive container search
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Seconds per revealed item
    pub interval: f32,
    /// Scale applied to `interval`
    pub multiplier: f32,
    /// Seconds before the first reveal
    pub delay: f32,
}

impl SearchConfig {
    /// Seconds between two reveals
    pub fn rate(&self) -> f32 {
        (self.interval * self.multiplier).max(0.0)
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            interval: 1.0,
            multiplier: 1.0,
            delay: 1.0,
        }
    }
}

/// Inventory settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InventoryConfig {
    /// Drag mode shared by every container a coordinator touches
    pub drag_mode: DragMode,
    /// Button new slots accept
    pub default_button: PointerButton,
    /// Progressive search timing
    pub search: SearchConfig,
}

impl Default for InventoryConfig {
    fn default() -> Self {
        Self {
            drag_mode: DragMode::RemoveOnDrag,
            default_button: PointerButton::Left,
            search: SearchConfig::default(),
        }
    }
}

impl InventoryConfig {
    /// Create the default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Set drag mode
    pub fn with_drag_mode(mut self, mode: DragMode) -> Self {
        self.drag_mode = mode;
        self
    }

    /// Set default pointer button
    pub fn with_default_button(mut self, button: PointerButton) -> Self {
        self.default_button = button;
        self
    }

    /// Set search timing
    pub fn with_search(mut self, search: SearchConfig) -> Self {
        self.search = search;
        self
    }

    /// Parse from JSON
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize to pretty JSON
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_json(&content)?;
        log::info!("Loaded inventory config from {}", path.display());
        Ok(config)
    }

    /// Save to a JSON file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        std::fs::write(path.as_ref(), self.to_json()?)?;
        Ok(())
    }

    /// Apply environment overrides
    pub fn apply_env(&mut self) {
        if let Ok(value) = std::env::var(DRAG_MODE_ENV) {
            match value.parse() {
                Ok(mode) => {
                    self.drag_mode = mode;
                    log::info!("Drag mode from env: {}", mode);
                }
                Err(err) => log::warn!("Ignoring {}: {}", DRAG_MODE_ENV, err),
            }
        }
    }
}

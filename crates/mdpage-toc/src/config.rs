//! Styling applied when the outline container is toggled.

use serde::{Deserialize, Serialize};

/// Styling configuration for the outline and its toggle button.
///
/// Serializes to the `config` object read by the browser runtime:
/// `{ "button": { "color": { "active", "bg" } }, "toc": { "width", "minwidth" } }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct TocConfig {
    #[serde(default)]
    pub button: ButtonStyle,
    #[serde(default)]
    pub toc: ContainerStyle,
}

/// Toggle button styling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ButtonStyle {
    #[serde(default)]
    pub color: ButtonColors,
}

/// Button background colors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ButtonColors {
    /// Background while the outline is collapsed
    #[serde(default = "default_active_color")]
    pub active: String,
    /// Background while the outline is expanded
    #[serde(default = "default_bg_color")]
    pub bg: String,
}

impl Default for ButtonColors {
    fn default() -> Self {
        Self {
            active: default_active_color(),
            bg: default_bg_color(),
        }
    }
}

/// Container dimensions when expanded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContainerStyle {
    #[serde(default = "default_width")]
    pub width: String,
    #[serde(default = "default_min_width")]
    pub minwidth: String,
}

impl Default for ContainerStyle {
    fn default() -> Self {
        Self {
            width: default_width(),
            minwidth: default_min_width(),
        }
    }
}

fn default_active_color() -> String {
    "#e06c75".to_string()
}
fn default_bg_color() -> String {
    "#4078c0".to_string()
}
fn default_width() -> String {
    "20%".to_string()
}
fn default_min_width() -> String {
    "200px".to_string()
}

impl TocConfig {
    /// Render the config as a script statement defining the global `config`.
    pub fn to_script(&self) -> Result<String, serde_json::Error> {
        Ok(format!("var config = {};", serde_json::to_string(self)?))
    }
}

use crate::policy::GraphMode;
use crate::theme::Theme;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Constants of the card height prediction model. These are calibrated
/// against the consuming renderer's default card styling; the shipped test
/// fixtures assume the defaults below.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CardMetrics {
    pub base_padding: f32,
    pub bottom_buffer: f32,
    pub heading_height: f32,
    pub divider_height: f32,
    pub blank_height: f32,
    pub line_height: f32,
    /// Visual-length units per row for cards wider than `wide_width_threshold`.
    pub wide_capacity: f32,
    pub narrow_capacity: f32,
    pub wide_width_threshold: f32,
    /// Weight of code points above U+00FF (CJK and fullwidth forms).
    pub wide_char_weight: f32,
    pub empty_height: f32,
}

impl Default for CardMetrics {
    fn default() -> Self {
        Self {
            base_padding: 50.0,
            bottom_buffer: 15.0,
            heading_height: 40.0,
            divider_height: 15.0,
            blank_height: 5.0,
            line_height: 26.0,
            wide_capacity: 50.0,
            narrow_capacity: 38.0,
            wide_width_threshold: 400.0,
            wide_char_weight: 1.8,
            empty_height: 100.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub card_gap_x: f32,
    pub card_gap_y: f32,
    pub group_padding: f32,
    pub group_gap_x: f32,
    pub group_gap_y: f32,
    /// Vertical band reserved below a group's top edge for its title.
    pub group_title_band: f32,
    pub satellite_columns: usize,
    pub group_columns: usize,
    /// Size-class width factors applied to the policy card width.
    pub small_scale: f32,
    pub large_scale: f32,
    /// Hubs within this vertical distance count as being on the same row.
    pub same_row_tolerance: f32,
    pub metrics: CardMetrics,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            card_gap_x: 50.0,
            card_gap_y: 100.0,
            group_padding: 40.0,
            group_gap_x: 180.0,
            group_gap_y: 150.0,
            group_title_band: 40.0,
            satellite_columns: 3,
            group_columns: 2,
            small_scale: 0.8,
            large_scale: 1.25,
            same_row_tolerance: 24.0,
            metrics: CardMetrics::default(),
        }
    }
}

impl LayoutConfig {
    /// Architecture-tier boards carry wide list cards and spread out more.
    pub fn for_mode(mode: GraphMode) -> Self {
        let mut config = Self::default();
        if mode == GraphMode::Architecture {
            config.card_gap_x = 60.0;
            config.group_padding = 50.0;
            config.group_gap_x = 220.0;
            config.group_gap_y = 180.0;
        }
        config
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub theme: Theme,
    pub layout: LayoutConfig,
}

/// Loads a JSON config file merged over the defaults. No path yields the
/// defaults unchanged.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let contents = std::fs::read_to_string(path)?;
    let config: Config = serde_json::from_str(&contents)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_keeps_defaults() {
        let config: Config =
            serde_json::from_str(r#"{"layout": {"group_padding": 64.0}}"#).unwrap();
        assert_eq!(config.layout.group_padding, 64.0);
        assert_eq!(config.layout.satellite_columns, 3);
        assert_eq!(config.theme.group_color, "6");
    }

    #[test]
    fn architecture_mode_widens_gaps() {
        let config = LayoutConfig::for_mode(GraphMode::Architecture);
        assert_eq!(config.group_gap_x, 220.0);
        assert_eq!(LayoutConfig::for_mode(GraphMode::Story).group_gap_x, 180.0);
    }
}

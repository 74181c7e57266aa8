use duel_replays::analyzer::{DuelSampler, KillFilter};
use serde::{Deserialize, Serialize};

use crate::extractor::{AlignOptions, GroupExtractor};
use crate::groups::FeatureGroup;

/// Extraction configuration, loadable from a TOML file.
///
/// Every field falls back to its default when missing from the file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Frames per kill window
    pub window_size: usize,
    /// Only align one-on-one kills
    pub clean_only: bool,
    /// Keep only the last frame of every per-frame feature
    pub last_frame_only: bool,
    pub groups: Vec<FeatureGroup>,
    pub tick_window: TickWindowConfig,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            window_size: 5,
            clean_only: true,
            last_frame_only: false,
            groups: FeatureGroup::ALL.to_vec(),
            tick_window: TickWindowConfig::default(),
        }
    }
}

/// Windows cut from tick-stream telemetry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TickWindowConfig {
    pub window_length: usize,
    pub window_lag: i64,
    pub window_step: usize,
    pub last_row_only: bool,
}

impl Default for TickWindowConfig {
    fn default() -> Self {
        Self {
            window_length: 128,
            window_lag: 0,
            window_step: 1,
            last_row_only: true,
        }
    }
}

impl ExtractionConfig {
    /// Load config from a TOML file.
    pub fn load(path: &std::path::Path) -> Result<Self, rootcause::Report> {
        use rootcause::prelude::*;
        let contents = std::fs::read_to_string(path).context("Failed to read config file")?;
        let config: Self = toml::from_str(&contents).context("Failed to parse config file")?;
        Ok(config)
    }

    pub fn from_toml_str(s: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(s)
    }

    pub fn align_options(&self) -> AlignOptions {
        AlignOptions {
            window_size: self.window_size,
            filter: KillFilter::from_clean_only(self.clean_only),
        }
    }

    pub fn build_extractor(&self) -> GroupExtractor {
        let extractor = GroupExtractor::new(self.groups.clone());
        extractor.last_frame_only(self.last_frame_only)
    }

    pub fn sampler(&self) -> DuelSampler {
        let tick = &self.tick_window;
        DuelSampler::new(tick.window_length, tick.window_lag, tick.window_step)
    }

    /// Generate a commented default TOML config string.
    pub fn generate_default_toml() -> String {
        r#"# Duel feature extraction configuration

# Frames in the window preceding each kill
window_size = 5

# Only use kills without assists, trades, suicides or team kills
clean_only = true

# Keep only the last frame of per-frame features instead of the whole window
last_frame_only = false

# Feature groups, merged in this order:
#   snapshot            per-frame player values of both duel participants
#   aim_alignment       per-frame crosshair placement toward the opponent
#   team_aggregates     per-frame team health, players alive and equipment value
#   rolling_performance kills and deaths before the round relative to the match average
groups = ["snapshot", "aim_alignment", "team_aggregates", "rolling_performance"]

# Windows cut from tick-stream telemetry
[tick_window]

# Ticks in the window
window_length = 128

# Ticks between the end of the window and the death
window_lag = 0

# Keep every n-th tick of the window
window_step = 1

# Keep only the last tick's values
last_row_only = true
"#
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_toml_matches_default() {
        let toml = ExtractionConfig::generate_default_toml();
        let parsed = ExtractionConfig::from_toml_str(&toml).unwrap();
        assert_eq!(parsed, ExtractionConfig::default());
    }

    #[test]
    fn missing_fields_fall_back() {
        let config = ExtractionConfig::from_toml_str(
            r#"
window_size = 8
groups = ["aim_alignment"]

[tick_window]
window_step = 4
"#,
        )
        .unwrap();
        assert_eq!(config.window_size, 8);
        assert!(config.clean_only);
        assert_eq!(config.groups, vec![FeatureGroup::AimAlignment]);
        assert_eq!(config.tick_window.window_step, 4);
        assert_eq!(config.tick_window.window_length, 128);

        let sampler = config.sampler();
        assert_eq!(sampler.window_step(), 4);
        assert_eq!(sampler.window_length(), 128);
        let extractor = config.build_extractor();
        assert_eq!(extractor.groups(), &[FeatureGroup::AimAlignment]);
    }

    #[test]
    fn clean_only_selects_filter() {
        let config = ExtractionConfig {
            clean_only: false,
            ..Default::default()
        };
        assert_eq!(config.align_options().filter, KillFilter::All);
        let default = ExtractionConfig::default();
        assert_eq!(default.align_options().filter, KillFilter::Clean);
    }

    #[test]
    fn unknown_group_is_rejected() {
        let parsed = ExtractionConfig::from_toml_str(r#"groups = ["vibes"]"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn load_reports_missing_file() {
        let path = std::path::Path::new("/nonexistent/duel.toml");
        assert!(ExtractionConfig::load(path).is_err());
    }
}

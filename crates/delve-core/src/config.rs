//! Generation knobs and configuration file loading
//!
//! Every knob has a range and a default; configs are stored as JSON.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default number of search steps one corridor request may spend.
pub const DEFAULT_CORRIDOR_STEP_BUDGET: usize = 250_000;

/// Configuration loading and validation errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("could not read config '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("{name} = {value} is outside {min}..={max}")]
    OutOfRange {
        name: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
}

/// A tunable knob: its name, limits and the step used when nudging it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Setting {
    pub name: &'static str,
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

impl Setting {
    pub const fn new(name: &'static str, min: f64, max: f64, step: f64) -> Self {
        Self {
            name,
            min,
            max,
            step,
        }
    }

    /// Move `value` one step up (or down when `negative`), staying within limits.
    pub fn increment(&self, value: f64, negative: bool) -> f64 {
        if negative {
            (value - self.step).max(self.min)
        } else {
            (value + self.step).min(self.max)
        }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    fn check(&self, value: f64) -> Result<(), ConfigError> {
        if self.contains(value) {
            Ok(())
        } else {
            Err(ConfigError::OutOfRange {
                name: self.name,
                value,
                min: self.min,
                max: self.max,
            })
        }
    }
}

pub const BLOBULOUSNESS: Setting = Setting::new("blobulousness", 0.0, 3.0, 1.0);
pub const DENSENESS: Setting = Setting::new("denseness", 0.0, 1.0, 0.05);
pub const SMOOTHNESS: Setting = Setting::new("smoothness", 0.0, 10.0, 1.0);
pub const SMOOTHING_PASSES: Setting = Setting::new("smoothing_passes", 0.0, 20.0, 1.0);
pub const CORRIDOR_LENGTH: Setting = Setting::new("corridor_length", 1.0, 70.0, 1.0);
pub const FILL_RADIUS: Setting = Setting::new("fill_radius", 0.0, 10.0, 1.0);
pub const MAZE_WIDTH: Setting = Setting::new("maze_width", 5.0, 60.0, 1.0);
pub const MAZE_HEIGHT: Setting = Setting::new("maze_height", 5.0, 60.0, 1.0);

/// All knobs, in display order.
pub const SETTINGS: [Setting; 8] = [
    BLOBULOUSNESS,
    DENSENESS,
    SMOOTHNESS,
    SMOOTHING_PASSES,
    CORRIDOR_LENGTH,
    FILL_RADIUS,
    MAZE_WIDTH,
    MAZE_HEIGHT,
];

/// Parameters for a generation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenConfig {
    /// Loosens the wall-density requirement of corridor tiles; 0 is strictest
    pub blobulousness: u32,
    /// Probability that `reset` makes an interior tile a wall
    pub denseness: f64,
    /// 3x3 wall count at which smoothing keeps a wall
    pub smoothness: u32,
    /// Smoothing passes used by the cavern recipe
    pub smoothing_passes: u32,
    /// Longest corridor the winding recipe asks for
    pub corridor_length: usize,
    /// Chebyshev radius used by `fill_caverns`
    pub fill_radius: u32,
    pub maze_width: usize,
    pub maze_height: usize,
    /// Search steps a single corridor request may take before giving up
    pub corridor_step_budget: usize,
}

impl Default for GenConfig {
    fn default() -> Self {
        Self {
            blobulousness: 0,
            denseness: 0.5,
            smoothness: 5,
            smoothing_passes: 4,
            corridor_length: 15,
            fill_radius: 2,
            maze_width: 20,
            maze_height: 20,
            corridor_step_budget: DEFAULT_CORRIDOR_STEP_BUDGET,
        }
    }
}

impl GenConfig {
    /// Load a config from a JSON file and validate it
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;

        Self::parse_json(&contents)
    }

    /// Parse a JSON config; missing fields take their defaults
    pub fn parse_json(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check every knob against its limits
    pub fn validate(&self) -> Result<(), ConfigError> {
        BLOBULOUSNESS.check(self.blobulousness as f64)?;
        DENSENESS.check(self.denseness)?;
        SMOOTHNESS.check(self.smoothness as f64)?;
        SMOOTHING_PASSES.check(self.smoothing_passes as f64)?;
        CORRIDOR_LENGTH.check(self.corridor_length as f64)?;
        FILL_RADIUS.check(self.fill_radius as f64)?;
        MAZE_WIDTH.check(self.maze_width as f64)?;
        MAZE_HEIGHT.check(self.maze_height as f64)?;
        if self.corridor_step_budget == 0 {
            return Err(ConfigError::OutOfRange {
                name: "corridor_step_budget",
                value: 0.0,
                min: 1.0,
                max: usize::MAX as f64,
            });
        }
        Ok(())
    }

    /// Snap every knob into its limits
    pub fn clamp(mut self) -> Self {
        let snap = |s: &Setting, v: f64| v.clamp(s.min, s.max);
        self.blobulousness = snap(&BLOBULOUSNESS, self.blobulousness as f64) as u32;
        self.denseness = if self.denseness.is_nan() {
            DENSENESS.min
        } else {
            snap(&DENSENESS, self.denseness)
        };
        self.smoothness = snap(&SMOOTHNESS, self.smoothness as f64) as u32;
        self.smoothing_passes = snap(&SMOOTHING_PASSES, self.smoothing_passes as f64) as u32;
        self.corridor_length = snap(&CORRIDOR_LENGTH, self.corridor_length as f64) as usize;
        self.fill_radius = snap(&FILL_RADIUS, self.fill_radius as f64) as u32;
        self.maze_width = snap(&MAZE_WIDTH, self.maze_width as f64) as usize;
        self.maze_height = snap(&MAZE_HEIGHT, self.maze_height as f64) as usize;
        self.corridor_step_budget = self.corridor_step_budget.max(1);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = GenConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.smoothness, 5);
        assert_eq!(config.corridor_length, 15);
    }

    #[test]
    fn test_parse_partial_json() {
        let config = GenConfig::parse_json(r#"{"denseness": 0.45, "blobulousness": 2}"#).unwrap();
        assert_eq!(config.blobulousness, 2);
        assert!((config.denseness - 0.45).abs() < f64::EPSILON);
        assert_eq!(config.fill_radius, 2);
    }

    #[test]
    fn test_parse_rejects_out_of_range() {
        let err = GenConfig::parse_json(r#"{"smoothness": 11}"#).unwrap_err();
        match err {
            ConfigError::OutOfRange { name, .. } => assert_eq!(name, "smoothness"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_parse_rejects_bad_json() {
        assert!(matches!(
            GenConfig::parse_json("{not json"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_zero_budget_rejected() {
        let config = GenConfig {
            corridor_step_budget: 0,
            ..GenConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_clamp_snaps_into_range() {
        let config = GenConfig {
            blobulousness: 9,
            denseness: 1.5,
            maze_width: 2,
            corridor_step_budget: 0,
            ..GenConfig::default()
        }
        .clamp();
        assert_eq!(config.blobulousness, 3);
        assert!((config.denseness - 1.0).abs() < f64::EPSILON);
        assert_eq!(config.maze_width, 5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_setting_increment_clamps() {
        assert_eq!(SMOOTHNESS.increment(10.0, false), 10.0);
        assert_eq!(SMOOTHNESS.increment(0.0, true), 0.0);
        assert_eq!(SMOOTHNESS.increment(4.0, false), 5.0);
        let d = DENSENESS.increment(0.5, true);
        assert!((d - 0.45).abs() < 1e-9);
    }

    #[test]
    fn test_roundtrip() {
        let config = GenConfig {
            smoothness: 7,
            ..GenConfig::default()
        };
        let json = config.to_json().unwrap();
        let parsed = GenConfig::parse_json(&json).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_load_missing_file() {
        let err = GenConfig::load_from_file(Path::new("/nonexistent/delve.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}

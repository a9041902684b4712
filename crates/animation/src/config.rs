use std::fs;
use std::path::{Path, PathBuf};

use foundation::easing::Easing;
use foundation::time::DEFAULT_FPS;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::interpolator::DEFAULT_LARGE_ZOOM_DELTA;
use crate::keyframe::{DEFAULT_SMOOTHNESS, InterpolationMode};
use crate::timeline::TimelineSettings;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("config parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Tunables for playback and authoring. Missing JSON fields take defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    pub tick_interval_ms: u64,
    pub default_duration_ms: f64,
    pub min_explicit_duration_ms: f64,
    pub snap_fps: u32,
    pub keyframe_interval_ms: f64,
    pub duplicate_offset_ms: f64,
    pub default_interpolation: InterpolationMode,
    pub default_easing: Easing,
    pub default_smoothness: f64,
    pub play_without_keyframes: bool,
    pub large_zoom_delta: f64,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 16,
            default_duration_ms: 60_000.0,
            min_explicit_duration_ms: 1_000.0,
            snap_fps: DEFAULT_FPS,
            keyframe_interval_ms: 4_000.0,
            duplicate_offset_ms: 2_000.0,
            default_interpolation: InterpolationMode::Simple,
            default_easing: Easing::EaseInOutQuad,
            default_smoothness: DEFAULT_SMOOTHNESS,
            play_without_keyframes: true,
            large_zoom_delta: DEFAULT_LARGE_ZOOM_DELTA,
        }
    }
}

impl AnimationConfig {
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw)?;
        Ok(config.sanitized())
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&raw)
    }

    /// Replaces unusable values (zero fps, negative spans, NaN) with defaults.
    pub fn sanitized(self) -> Self {
        let d = Self::default();
        let non_negative = |v: f64, fallback: f64| if v.is_finite() && v >= 0.0 { v } else { fallback };
        Self {
            tick_interval_ms: if self.tick_interval_ms == 0 {
                d.tick_interval_ms
            } else {
                self.tick_interval_ms
            },
            default_duration_ms: non_negative(self.default_duration_ms, d.default_duration_ms),
            min_explicit_duration_ms: non_negative(
                self.min_explicit_duration_ms,
                d.min_explicit_duration_ms,
            ),
            snap_fps: if self.snap_fps == 0 { d.snap_fps } else { self.snap_fps },
            keyframe_interval_ms: non_negative(self.keyframe_interval_ms, d.keyframe_interval_ms),
            duplicate_offset_ms: non_negative(self.duplicate_offset_ms, d.duplicate_offset_ms),
            default_smoothness: if self.default_smoothness.is_nan() {
                d.default_smoothness
            } else {
                self.default_smoothness.clamp(0.0, 1.0)
            },
            large_zoom_delta: non_negative(self.large_zoom_delta, d.large_zoom_delta),
            ..self
        }
    }

    pub fn timeline_settings(&self) -> TimelineSettings {
        TimelineSettings {
            snap_fps: self.snap_fps,
            keyframe_interval_ms: self.keyframe_interval_ms,
            duplicate_offset_ms: self.duplicate_offset_ms,
            default_interpolation: self.default_interpolation,
            default_easing: self.default_easing,
            default_smoothness: self.default_smoothness,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let c = AnimationConfig::default();
        assert_eq!(c.tick_interval_ms, 16);
        assert_eq!(c.default_duration_ms, 60_000.0);
        assert_eq!(c.snap_fps, 30);
        assert!(c.play_without_keyframes);
        assert_eq!(c.timeline_settings(), TimelineSettings::default());
    }

    #[test]
    fn partial_json_fills_defaults() {
        let c = AnimationConfig::from_json_str(
            r#"{ "snap_fps": 60, "default_interpolation": "ArcZoom", "play_without_keyframes": false }"#,
        )
        .expect("parse config");
        assert_eq!(c.snap_fps, 60);
        assert_eq!(c.default_interpolation, InterpolationMode::ArcZoom);
        assert!(!c.play_without_keyframes);
        assert_eq!(c.keyframe_interval_ms, 4_000.0);
    }

    #[test]
    fn unusable_values_fall_back() {
        let c = AnimationConfig::from_json_str(
            r#"{ "snap_fps": 0, "tick_interval_ms": 0, "keyframe_interval_ms": -5, "default_smoothness": 4 }"#,
        )
        .expect("parse config");
        assert_eq!(c.snap_fps, 30);
        assert_eq!(c.tick_interval_ms, 16);
        assert_eq!(c.keyframe_interval_ms, 4_000.0);
        assert_eq!(c.default_smoothness, 1.0);
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let err = AnimationConfig::from_json_str("{ snap_fps: ").expect_err("must fail");
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let mut path = std::env::temp_dir();
        path.push(format!("flythrough_missing_config_{}.json", std::process::id()));
        let err = AnimationConfig::from_path(&path).expect_err("must fail");
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn loads_from_file() {
        let mut path = std::env::temp_dir();
        path.push(format!("flythrough_config_{}.json", std::process::id()));
        fs::write(&path, r#"{ "duplicate_offset_ms": 500 }"#).expect("write config");
        let c = AnimationConfig::from_path(&path).expect("load config");
        let _ = fs::remove_file(&path);
        assert_eq!(c.duplicate_offset_ms, 500.0);
    }
}

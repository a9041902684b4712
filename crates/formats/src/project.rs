//! Versioned project document: keyframes, playback settings and speed curve.
//!
//! Version history:
//! - 1 (or no `version` field): keyframes stored zoom, not altitude.
//! - 2: keyframes store altitude; zoom is derived on load.
//!
//! Records without an altitude are never reinterpreted from their zoom. They
//! load with the default pose at their stored time and produce a
//! [`LoadWarning`], so the author can re-capture them.

use std::fmt;
use std::fs;
use std::path::Path;

use animation::{
    AnimationController, CameraSink, CameraState, InterpolationMode, Keyframe, SpeedCurve,
    SpeedPoint,
};
use foundation::easing::Easing;
use runtime::Clock;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::ProjectError;

pub const PROJECT_VERSION: u32 = 2;
pub const LEGACY_ZOOM_VERSION: u32 = 1;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<u32>,
    #[serde(default)]
    pub keyframes: Vec<KeyframeRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub playback: Option<PlaybackSettings>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub speed_curve: Vec<SpeedPoint>,
}

/// A keyframe as stored on disk. Every field is optional so older files
/// parse; tags stay wide integers so unknown values can be reported instead
/// of failing the whole document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyframeRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub altitude: Option<f64>,
    /// Version 1 only; never read back as a pose.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zoom: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bearing: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tilt: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_ms: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interpolation: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub easing: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub smoothness: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlaybackSettings {
    pub playback_speed: f64,
    pub looping: bool,
    pub explicit_duration_ms: f64,
    pub use_explicit_duration: bool,
    pub speed_curve_enabled: bool,
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            playback_speed: 1.0,
            looping: false,
            explicit_duration_ms: 60_000.0,
            use_explicit_duration: false,
            speed_curve_enabled: false,
        }
    }
}

/// Recoverable record-level problem found while loading.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadWarning {
    /// No altitude (zoom-era record); the default pose was substituted.
    LegacyRecord { index: usize },
    UnknownInterpolation { index: usize, tag: i64 },
    UnknownEasing { index: usize, tag: i64 },
}

impl fmt::Display for LoadWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadWarning::LegacyRecord { index } => write!(
                f,
                "keyframe {index}: no altitude (zoom-based record); default pose substituted"
            ),
            LoadWarning::UnknownInterpolation { index, tag } => {
                write!(f, "keyframe {index}: unknown interpolation tag {tag}; using default")
            }
            LoadWarning::UnknownEasing { index, tag } => {
                write!(f, "keyframe {index}: unknown easing tag {tag}; using default")
            }
        }
    }
}

/// Decoded project ready to apply to a controller.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedProject {
    pub version: u32,
    pub keyframes: Vec<Keyframe>,
    pub playback: Option<PlaybackSettings>,
    pub speed_curve: Option<SpeedCurve>,
    pub warnings: Vec<LoadWarning>,
}

impl ProjectDocument {
    /// Parses and checks the version. A missing version means version 1.
    pub fn from_json_str(raw: &str) -> Result<Self, ProjectError> {
        let doc: Self = serde_json::from_str(raw)?;
        let version = doc.effective_version();
        if version != LEGACY_ZOOM_VERSION && version != PROJECT_VERSION {
            return Err(ProjectError::UnsupportedVersion { found: version });
        }
        Ok(doc)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ProjectError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| ProjectError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&raw)
    }

    pub fn to_json_string(&self) -> Result<String, ProjectError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ProjectError> {
        let path = path.as_ref();
        let payload = self.to_json_string()?;
        fs::write(path, payload).map_err(|source| ProjectError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn effective_version(&self) -> u32 {
        self.version.unwrap_or(LEGACY_ZOOM_VERSION)
    }

    /// Snapshot of a controller's keyframes, playback settings and curve.
    pub fn from_controller<C: Clock, S: CameraSink>(controller: &AnimationController<C, S>) -> Self {
        let keyframes = controller
            .timeline()
            .keyframes()
            .iter()
            .map(KeyframeRecord::from_keyframe)
            .collect();
        Self {
            version: Some(PROJECT_VERSION),
            keyframes,
            playback: Some(PlaybackSettings {
                playback_speed: controller.playback_speed(),
                looping: controller.is_looping(),
                explicit_duration_ms: controller.explicit_duration_ms(),
                use_explicit_duration: controller.use_explicit_duration(),
                speed_curve_enabled: controller.speed_curve_enabled(),
            }),
            speed_curve: controller.speed_curve().points().to_vec(),
        }
    }

    /// Converts records to keyframes, collecting warnings for anything that
    /// had to be substituted.
    pub fn decode(&self) -> LoadedProject {
        let version = self.effective_version();
        let mut warnings = Vec::new();
        let keyframes = self
            .keyframes
            .iter()
            .enumerate()
            .map(|(index, record)| record.to_keyframe(index, version, &mut warnings))
            .collect();

        for warning in &warnings {
            warn!(%warning, "project record recovered");
        }

        let speed_curve = if self.speed_curve.is_empty() {
            None
        } else {
            Some(SpeedCurve::from_points(self.speed_curve.iter().copied()))
        };

        LoadedProject {
            version,
            keyframes,
            playback: self.playback.clone(),
            speed_curve,
            warnings,
        }
    }
}

impl KeyframeRecord {
    pub fn from_keyframe(kf: &Keyframe) -> Self {
        Self {
            latitude: Some(kf.latitude),
            longitude: Some(kf.longitude),
            altitude: Some(kf.altitude),
            zoom: None,
            bearing: Some(kf.bearing),
            tilt: Some(kf.tilt),
            time_ms: Some(kf.time_ms),
            interpolation: Some(i64::from(kf.interpolation.to_tag())),
            easing: Some(i64::from(kf.easing.to_tag())),
            smoothness: Some(kf.smoothness),
        }
    }

    fn to_keyframe(&self, index: usize, version: u32, warnings: &mut Vec<LoadWarning>) -> Keyframe {
        let time_ms = self.time_ms.unwrap_or(0.0);
        let pose = match self.altitude {
            Some(altitude) if version >= PROJECT_VERSION => CameraState::new(
                self.latitude.unwrap_or(0.0),
                self.longitude.unwrap_or(0.0),
                altitude,
                self.bearing.unwrap_or(0.0),
                self.tilt.unwrap_or(0.0),
            ),
            _ => {
                warnings.push(LoadWarning::LegacyRecord { index });
                CameraState::default()
            }
        };

        let interpolation = match self.interpolation {
            None => InterpolationMode::default(),
            Some(tag) => tag_to_u8(tag)
                .and_then(InterpolationMode::from_tag)
                .unwrap_or_else(|| {
                    warnings.push(LoadWarning::UnknownInterpolation { index, tag });
                    InterpolationMode::default()
                }),
        };
        let easing = match self.easing {
            None => Easing::default(),
            Some(tag) => tag_to_u8(tag).and_then(Easing::from_tag).unwrap_or_else(|| {
                warnings.push(LoadWarning::UnknownEasing { index, tag });
                Easing::default()
            }),
        };

        let mut kf = Keyframe::new(pose, time_ms)
            .with_interpolation(interpolation)
            .with_easing(easing);
        if let Some(smoothness) = self.smoothness {
            kf = kf.with_smoothness(smoothness);
        }
        kf
    }
}

fn tag_to_u8(tag: i64) -> Option<u8> {
    u8::try_from(tag).ok()
}

impl LoadedProject {
    /// Replaces the controller's project state with this one and parks the
    /// playhead at 0. Returns the load warnings.
    pub fn apply_to<C: Clock, S: CameraSink>(
        self,
        controller: &mut AnimationController<C, S>,
    ) -> Vec<LoadWarning> {
        controller.reset();
        let count = self.keyframes.len();
        controller.edit_timeline(|tl| tl.replace_all(self.keyframes));

        if let Some(playback) = &self.playback {
            controller.set_playback_speed(playback.playback_speed);
            controller.set_looping(playback.looping);
            controller.set_explicit_duration(playback.explicit_duration_ms);
            controller.set_use_explicit_duration(playback.use_explicit_duration);
            controller.set_speed_curve_enabled(playback.speed_curve_enabled);
        }
        if let Some(curve) = self.speed_curve {
            *controller.speed_curve_mut() = curve;
        }

        controller.refresh_camera();
        debug!(
            version = self.version,
            keyframes = count,
            warnings = self.warnings.len(),
            "project applied"
        );
        self.warnings
    }
}

use foundation::easing::Easing;
use foundation::math::zoom_to_altitude;
use serde::{Deserialize, Serialize};

use crate::camera::CameraState;

pub const DEFAULT_SMOOTHNESS: f64 = 0.5;

/// How the camera travels into a keyframe from the one before it.
///
/// Chosen per segment on the destination keyframe. Discriminants are the
/// stable integer tags written to project files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum InterpolationMode {
    /// Linear pose blend through one easing curve, with zoom-aware position warping.
    #[default]
    Simple = 0,
    /// Straight flight with a shallow zoom dip on long pans.
    DirectFly = 1,
    /// Zoom out, pan, zoom back in.
    ArcZoom = 2,
    /// Pull out to a near-global view, rotate, then dive.
    Orbital = 3,
    /// Double-smoothstepped blend; the slowest transition.
    Glide = 4,
    /// Instant cut to the destination.
    SnapCut = 5,
}

impl InterpolationMode {
    pub const ALL: [InterpolationMode; 6] = [
        InterpolationMode::Simple,
        InterpolationMode::DirectFly,
        InterpolationMode::ArcZoom,
        InterpolationMode::Orbital,
        InterpolationMode::Glide,
        InterpolationMode::SnapCut,
    ];

    pub fn to_tag(self) -> u8 {
        self as u8
    }

    pub fn from_tag(tag: u8) -> Option<Self> {
        Self::ALL.get(tag as usize).copied()
    }
}

/// A camera pose pinned to an absolute timeline position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Keyframe {
    pub latitude: f64,
    pub longitude: f64,
    /// Meters above the surface; zoom is derived.
    pub altitude: f64,
    pub bearing: f64,
    pub tilt: f64,
    /// Absolute timeline position (milliseconds).
    pub time_ms: f64,
    pub interpolation: InterpolationMode,
    pub easing: Easing,
    /// User smoothness for [`Easing::Adaptive`], in `[0, 1]`.
    pub smoothness: f64,
}

impl Default for Keyframe {
    fn default() -> Self {
        Self::new(CameraState::default(), 0.0)
    }
}

impl Keyframe {
    /// Builds a keyframe from a pose; every field is brought into range.
    pub fn new(pose: CameraState, time_ms: f64) -> Self {
        let mut kf = Self {
            latitude: 0.0,
            longitude: 0.0,
            altitude: 1.0,
            bearing: 0.0,
            tilt: 0.0,
            time_ms,
            interpolation: InterpolationMode::default(),
            easing: Easing::default(),
            smoothness: DEFAULT_SMOOTHNESS,
        };
        kf.set_pose(pose);
        kf.time_ms = sanitize_time(time_ms);
        kf
    }

    pub fn with_interpolation(mut self, mode: InterpolationMode) -> Self {
        self.interpolation = mode;
        self
    }

    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    pub fn with_smoothness(mut self, smoothness: f64) -> Self {
        self.smoothness = sanitize_smoothness(smoothness);
        self
    }

    pub fn pose(&self) -> CameraState {
        CameraState::new(
            self.latitude,
            self.longitude,
            self.altitude,
            self.bearing,
            self.tilt,
        )
    }

    pub fn set_pose(&mut self, pose: CameraState) {
        let pose = pose.clamped();
        self.latitude = pose.latitude;
        self.longitude = pose.longitude;
        self.altitude = pose.altitude;
        self.bearing = pose.bearing;
        self.tilt = pose.tilt;
    }

    pub fn zoom(&self) -> f64 {
        self.pose().zoom()
    }

    pub fn set_zoom(&mut self, zoom: f64) {
        let mut pose = self.pose();
        pose.altitude = zoom_to_altitude(zoom);
        self.set_pose(pose);
    }

    /// Same camera pose, ignoring time and transition settings.
    pub fn same_pose(&self, other: &Keyframe) -> bool {
        self.pose() == other.pose()
    }

    /// Copy with every field brought into range.
    pub fn sanitized(mut self) -> Self {
        let pose = self.pose();
        self.set_pose(pose);
        self.time_ms = sanitize_time(self.time_ms);
        self.smoothness = sanitize_smoothness(self.smoothness);
        self
    }
}

/// Partial keyframe edit; `None` fields are left untouched.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct KeyframeUpdate {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub altitude: Option<f64>,
    /// Converted to altitude; wins over `altitude` when both are set.
    pub zoom: Option<f64>,
    pub bearing: Option<f64>,
    pub tilt: Option<f64>,
    pub time_ms: Option<f64>,
    pub interpolation: Option<InterpolationMode>,
    pub easing: Option<Easing>,
    pub smoothness: Option<f64>,
}

impl KeyframeUpdate {
    /// Applies the pose and mode fields. Time is handled by the timeline,
    /// which has to re-sort afterwards.
    pub(crate) fn apply_pose_and_modes(&self, kf: &mut Keyframe) -> bool {
        let before = *kf;
        let mut pose = kf.pose();
        if let Some(v) = self.latitude {
            pose.latitude = v;
        }
        if let Some(v) = self.longitude {
            pose.longitude = v;
        }
        if let Some(v) = self.altitude {
            pose.altitude = v;
        }
        if let Some(z) = self.zoom {
            pose.altitude = zoom_to_altitude(z);
        }
        if let Some(v) = self.bearing {
            pose.bearing = v;
        }
        if let Some(v) = self.tilt {
            pose.tilt = v;
        }
        kf.set_pose(pose);
        if let Some(mode) = self.interpolation {
            kf.interpolation = mode;
        }
        if let Some(easing) = self.easing {
            kf.easing = easing;
        }
        if let Some(s) = self.smoothness {
            kf.smoothness = sanitize_smoothness(s);
        }
        *kf != before
    }
}

fn sanitize_time(time_ms: f64) -> f64 {
    if time_ms.is_nan() { 0.0 } else { time_ms.max(0.0) }
}

fn sanitize_smoothness(s: f64) -> f64 {
    if s.is_nan() {
        DEFAULT_SMOOTHNESS
    } else {
        s.clamp(0.0, 1.0)
    }
}

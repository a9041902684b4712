//! Camera pose values and the sink the controller writes them into.

use foundation::math::{
    MIN_ALTITUDE_M, altitude_to_zoom, clamp_latitude, normalize_bearing, wrap_longitude,
    zoom_to_altitude,
};
use serde::{Deserialize, Serialize};

/// Maximum camera pitch away from straight down (degrees).
pub const MAX_TILT: f64 = 89.0;

/// Default view: center of Europe at zoom 5.
pub const DEFAULT_LATITUDE: f64 = 52.5;
pub const DEFAULT_LONGITUDE: f64 = 10.0;
pub const DEFAULT_ZOOM: f64 = 5.0;

/// A camera pose. Altitude is stored; zoom is always derived from it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraState {
    pub latitude: f64,
    pub longitude: f64,
    /// Height above the surface (meters).
    pub altitude: f64,
    /// Degrees clockwise from north.
    pub bearing: f64,
    /// Degrees away from straight down.
    pub tilt: f64,
}

impl Default for CameraState {
    fn default() -> Self {
        Self::from_zoom(DEFAULT_LATITUDE, DEFAULT_LONGITUDE, DEFAULT_ZOOM, 0.0, 0.0)
    }
}

impl CameraState {
    pub fn new(latitude: f64, longitude: f64, altitude: f64, bearing: f64, tilt: f64) -> Self {
        Self {
            latitude,
            longitude,
            altitude,
            bearing,
            tilt,
        }
    }

    pub fn from_zoom(latitude: f64, longitude: f64, zoom: f64, bearing: f64, tilt: f64) -> Self {
        Self::new(latitude, longitude, zoom_to_altitude(zoom), bearing, tilt)
    }

    pub fn zoom(&self) -> f64 {
        altitude_to_zoom(self.altitude)
    }

    /// Brings every field into its valid range.
    ///
    /// Latitude and tilt are clamped, longitude and bearing wrapped, and
    /// altitude floored at one meter. NaN altitude falls back to the floor.
    pub fn clamped(self) -> Self {
        Self {
            latitude: clamp_latitude(self.latitude),
            longitude: wrap_longitude(self.longitude),
            altitude: self.altitude.max(MIN_ALTITUDE_M),
            bearing: normalize_bearing(self.bearing),
            tilt: self.tilt.clamp(0.0, MAX_TILT),
        }
    }
}

/// The external camera the controller drives.
pub trait CameraSink {
    fn set_position(&mut self, state: &CameraState);
}

impl<S: CameraSink + ?Sized> CameraSink for Box<S> {
    fn set_position(&mut self, state: &CameraState) {
        (**self).set_position(state);
    }
}

/// In-memory camera that remembers the last pose written to it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CameraTarget {
    state: Option<CameraState>,
    writes: u64,
}

impl CameraTarget {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> Option<CameraState> {
        self.state
    }

    /// Number of `set_position` calls received.
    pub fn writes(&self) -> u64 {
        self.writes
    }
}

impl CameraSink for CameraTarget {
    fn set_position(&mut self, state: &CameraState) {
        self.state = Some(*state);
        self.writes += 1;
    }
}

/// Which subsystem may currently write the camera.
///
/// Playback and direct user edits both want the camera; only one holds it
/// at a time. Camera-change notifications are honored only outside
/// `PlaybackWriting`, which breaks the camera -> keyframe -> camera cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CameraWriter {
    #[default]
    Idle,
    PlaybackWriting,
    UserEditing,
}

impl CameraWriter {
    pub fn accepts_camera_changes(self) -> bool {
        matches!(self, CameraWriter::Idle | CameraWriter::UserEditing)
    }
}

//! Camera pose between two keyframes.
//!
//! Every strategy is a pure function of `(from, to, t)`. Progress is eased
//! first (except for [`InterpolationMode::SnapCut`]), then handed to the
//! strategy. Multi-phase strategies work in zoom space and convert back to
//! altitude at the end.

use std::f64::consts::PI;

use foundation::easing::{Easing, adaptive_ease_in_out, smoothstep};
use foundation::math::{
    great_circle_distance_km, interpolate_bearing, interpolate_longitude, lerp, zoom_to_altitude,
};

use crate::camera::CameraState;
use crate::keyframe::{InterpolationMode, Keyframe};

/// Zoom-level delta above which Simple mode warps position against zoom.
pub const DEFAULT_LARGE_ZOOM_DELTA: f64 = 2.0;

/// Pans shorter than this fly straight without a zoom dip (km).
const DIRECT_FLY_DIP_MIN_KM: f64 = 100.0;
const DIRECT_FLY_MAX_DIP: f64 = 2.0;

const ARC_ZOOM_OUT_END: f64 = 0.3;
const ARC_ZOOM_IN_START: f64 = 0.7;
/// Share of the pan covered while zooming out (and again while zooming in).
const ARC_EDGE_PAN: f64 = 0.1;

const ORBITAL_SPACE_ZOOM: f64 = 2.0;
const ORBITAL_ZOOM_OUT_END: f64 = 0.35;
const ORBITAL_DIVE_START: f64 = 0.65;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interpolator {
    large_zoom_delta: f64,
}

impl Default for Interpolator {
    fn default() -> Self {
        Self::new(DEFAULT_LARGE_ZOOM_DELTA)
    }
}

impl Interpolator {
    pub fn new(large_zoom_delta: f64) -> Self {
        Self {
            large_zoom_delta: large_zoom_delta.max(0.0),
        }
    }

    pub fn large_zoom_delta(&self) -> f64 {
        self.large_zoom_delta
    }

    /// Interpolates using the transition settings stored on `to`.
    pub fn interpolate_segment(&self, from: &Keyframe, to: &Keyframe, progress: f64) -> CameraState {
        self.interpolate(from, to, progress, to.interpolation, to.easing)
    }

    /// Camera pose at `progress` in `[0, 1]` between two keyframes.
    ///
    /// Out-of-range or NaN progress is clamped. A degenerate segment (same
    /// pose at both ends) returns the destination pose for every mode.
    pub fn interpolate(
        &self,
        from: &Keyframe,
        to: &Keyframe,
        progress: f64,
        mode: InterpolationMode,
        easing: Easing,
    ) -> CameraState {
        if mode == InterpolationMode::SnapCut || from.same_pose(to) {
            return to.pose();
        }

        let t = if progress.is_nan() {
            0.0
        } else {
            progress.clamp(0.0, 1.0)
        };
        let eased = eased_progress(from, to, t, easing);

        let state = match mode {
            InterpolationMode::Simple => self.simple(from, to, eased),
            InterpolationMode::DirectFly => direct_fly(from, to, eased),
            InterpolationMode::ArcZoom => arc_zoom(from, to, eased),
            InterpolationMode::Orbital => orbital(from, to, eased),
            InterpolationMode::Glide => glide(from, to, eased),
            InterpolationMode::SnapCut => to.pose(),
        };
        state.clamped()
    }

    /// Linear blend with zoom-aware position warping.
    ///
    /// On large zoom changes the position leads the zoom when zooming in
    /// (`sqrt`) and lags it when zooming out (squared), so pan and zoom read
    /// as one motion.
    fn simple(&self, from: &Keyframe, to: &Keyframe, t: f64) -> CameraState {
        let zoom_delta = to.zoom() - from.zoom();
        let position_t = if zoom_delta.abs() > self.large_zoom_delta {
            if zoom_delta > 0.0 { t.sqrt() } else { t * t }
        } else {
            t
        };

        CameraState {
            latitude: lerp(from.latitude, to.latitude, position_t),
            longitude: interpolate_longitude(from.longitude, to.longitude, position_t),
            altitude: lerp(from.altitude, to.altitude, t),
            bearing: interpolate_bearing(from.bearing, to.bearing, t),
            tilt: lerp(from.tilt, to.tilt, t),
        }
    }
}

fn eased_progress(from: &Keyframe, to: &Keyframe, t: f64, easing: Easing) -> f64 {
    match easing {
        Easing::Adaptive => adaptive_ease_in_out(t, to.smoothness, from.altitude, to.altitude),
        other => other.ease(t),
    }
}

/// Pose along the straight path at position `p`, with an explicit zoom.
fn along(from: &Keyframe, to: &Keyframe, p: f64, zoom: f64, bearing_t: f64) -> CameraState {
    CameraState {
        latitude: lerp(from.latitude, to.latitude, p),
        longitude: interpolate_longitude(from.longitude, to.longitude, p),
        altitude: zoom_to_altitude(zoom),
        bearing: interpolate_bearing(from.bearing, to.bearing, bearing_t),
        tilt: 0.0,
    }
}

fn distance_km(from: &Keyframe, to: &Keyframe) -> f64 {
    great_circle_distance_km(from.latitude, from.longitude, to.latitude, to.longitude)
}

fn direct_fly(from: &Keyframe, to: &Keyframe, t: f64) -> CameraState {
    let base_zoom = lerp(from.zoom(), to.zoom(), t);
    let distance = distance_km(from, to);
    let zoom = if distance > DIRECT_FLY_DIP_MIN_KM {
        let dip = (distance / DIRECT_FLY_DIP_MIN_KM).log10().min(DIRECT_FLY_MAX_DIP);
        base_zoom - dip * (t * PI).sin()
    } else {
        base_zoom
    };

    CameraState {
        tilt: lerp(from.tilt, to.tilt, t),
        ..along(from, to, t, zoom, t)
    }
}

/// Zoom level the arc climbs to, stepped by pan distance.
pub fn arc_zoom_out_level(distance_km: f64, from_zoom: f64, to_zoom: f64) -> f64 {
    let base = from_zoom.min(to_zoom);
    if distance_km < 10.0 {
        base - 0.5
    } else if distance_km < 100.0 {
        base - 1.5
    } else if distance_km < 500.0 {
        base - 2.5
    } else if distance_km < 2000.0 {
        (base - 3.0).min(6.0)
    } else {
        (base - 4.0).min(4.0)
    }
}

fn arc_zoom(from: &Keyframe, to: &Keyframe, t: f64) -> CameraState {
    let (from_zoom, to_zoom) = (from.zoom(), to.zoom());
    let arc = arc_zoom_out_level(distance_km(from, to), from_zoom, to_zoom);

    let (p, zoom) = if t < ARC_ZOOM_OUT_END {
        let phase = smoothstep(t / ARC_ZOOM_OUT_END);
        (ARC_EDGE_PAN * phase, lerp(from_zoom, arc, phase))
    } else if t < ARC_ZOOM_IN_START {
        let phase = (t - ARC_ZOOM_OUT_END) / (ARC_ZOOM_IN_START - ARC_ZOOM_OUT_END);
        let pan = 1.0 - 2.0 * ARC_EDGE_PAN;
        (ARC_EDGE_PAN + pan * phase, arc)
    } else {
        let phase = smoothstep((t - ARC_ZOOM_IN_START) / (1.0 - ARC_ZOOM_IN_START));
        (1.0 - ARC_EDGE_PAN + ARC_EDGE_PAN * phase, lerp(arc, to_zoom, phase))
    };

    CameraState {
        tilt: lerp(from.tilt, to.tilt, t),
        ..along(from, to, p, zoom, t)
    }
}

fn orbital(from: &Keyframe, to: &Keyframe, t: f64) -> CameraState {
    let state = if t < ORBITAL_ZOOM_OUT_END {
        let phase = smoothstep(t / ORBITAL_ZOOM_OUT_END);
        along(from, to, 0.0, lerp(from.zoom(), ORBITAL_SPACE_ZOOM, phase), 0.0)
    } else if t < ORBITAL_DIVE_START {
        let phase = (t - ORBITAL_ZOOM_OUT_END) / (ORBITAL_DIVE_START - ORBITAL_ZOOM_OUT_END);
        along(from, to, phase, ORBITAL_SPACE_ZOOM, phase)
    } else {
        let phase = smoothstep((t - ORBITAL_DIVE_START) / (1.0 - ORBITAL_DIVE_START));
        along(from, to, 1.0, lerp(ORBITAL_SPACE_ZOOM, to.zoom(), phase), 1.0)
    };

    CameraState {
        tilt: lerp(from.tilt, to.tilt, t),
        ..state
    }
}

fn glide(from: &Keyframe, to: &Keyframe, t: f64) -> CameraState {
    let s = smoothstep(smoothstep(t));
    CameraState {
        tilt: lerp(from.tilt, to.tilt, s),
        ..along(from, to, s, lerp(from.zoom(), to.zoom(), s), s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: f64, b: f64, eps: f64) {
        assert!((a - b).abs() <= eps, "expected {b}, got {a} (eps {eps})");
    }

    fn kf(lat: f64, lon: f64, alt: f64, time_ms: f64) -> Keyframe {
        Keyframe::new(CameraState::new(lat, lon, alt, 0.0, 0.0), time_ms)
    }

    fn assert_pose_close(a: CameraState, b: CameraState) {
        assert_close(a.latitude, b.latitude, 1e-6);
        assert_close(a.longitude, b.longitude, 1e-6);
        assert_close(a.altitude, b.altitude, 1e-3 * b.altitude.max(1.0));
        assert_close(a.bearing, b.bearing, 1e-6);
        assert_close(a.tilt, b.tilt, 1e-6);
    }

    #[test]
    fn simple_linear_midpoint() {
        let from = kf(0.0, 0.0, 1_000_000.0, 0.0);
        let to = kf(10.0, 10.0, 500_000.0, 10_000.0);
        let s = Interpolator::default().interpolate(
            &from,
            &to,
            0.5,
            InterpolationMode::Simple,
            Easing::Linear,
        );
        assert_close(s.latitude, 5.0, 1e-9);
        assert_close(s.longitude, 5.0, 1e-9);
        assert_close(s.altitude, 750_000.0, 1e-6);
    }

    #[test]
    fn simple_warps_position_on_large_zoom_in() {
        let from = CameraState::from_zoom(0.0, 0.0, 4.0, 0.0, 0.0);
        let to = CameraState::from_zoom(10.0, 0.0, 12.0, 0.0, 0.0);
        let s = Interpolator::default().interpolate(
            &Keyframe::new(from, 0.0),
            &Keyframe::new(to, 1000.0),
            0.25,
            InterpolationMode::Simple,
            Easing::Linear,
        );
        // sqrt(0.25) = 0.5: position leads.
        assert_close(s.latitude, 5.0, 1e-9);

        let s = Interpolator::default().interpolate(
            &Keyframe::new(to, 0.0),
            &Keyframe::new(from, 1000.0),
            0.5,
            InterpolationMode::Simple,
            Easing::Linear,
        );
        // 0.5^2 = 0.25: position lags.
        assert_close(s.latitude, 7.5, 1e-9);
    }

    #[test]
    fn endpoints_match_keyframes_for_every_mode() {
        let from = Keyframe::new(CameraState::from_zoom(48.0, 2.0, 10.0, 30.0, 20.0), 0.0);
        let to = Keyframe::new(CameraState::from_zoom(40.0, -74.0, 11.0, 300.0, 45.0), 5000.0);
        let interp = Interpolator::default();
        for mode in InterpolationMode::ALL {
            let end = interp.interpolate(&from, &to, 1.0, mode, Easing::EaseInOutCubic);
            assert_pose_close(end, to.pose());
            if mode != InterpolationMode::SnapCut {
                let start = interp.interpolate(&from, &to, 0.0, mode, Easing::EaseInOutCubic);
                assert_pose_close(start, from.pose());
            }
        }
    }

    #[test]
    fn degenerate_segment_returns_destination() {
        let a = kf(12.0, 34.0, 5_000.0, 0.0);
        let b = kf(12.0, 34.0, 5_000.0, 0.0);
        let interp = Interpolator::default();
        for mode in InterpolationMode::ALL {
            for easing in Easing::ALL {
                let s = interp.interpolate(&a, &b, 0.37, mode, easing);
                assert_eq!(s, b.pose(), "{mode:?} {easing:?}");
            }
        }
    }

    #[test]
    fn snap_cut_ignores_progress() {
        let from = kf(0.0, 0.0, 1_000.0, 0.0);
        let to = kf(1.0, 1.0, 2_000.0, 1_000.0);
        let interp = Interpolator::default();
        for t in [0.0, 0.01, 0.25, 0.5, 0.75, 0.999, 1.0] {
            for easing in [Easing::Linear, Easing::EaseInOutCubic, Easing::Adaptive] {
                let s = interp.interpolate(&from, &to, t, InterpolationMode::SnapCut, easing);
                assert_eq!(s, to.pose(), "t={t} easing={easing:?}");
            }
        }
    }

    #[test]
    fn longitude_takes_the_short_way_across_antimeridian() {
        let from = kf(0.0, 170.0, 10_000.0, 0.0);
        let to = kf(0.0, -170.0, 10_000.0, 1_000.0);
        let s = Interpolator::default().interpolate(
            &from,
            &to,
            0.5,
            InterpolationMode::Simple,
            Easing::Linear,
        );
        assert_close(s.longitude.abs(), 180.0, 1e-9);
    }

    #[test]
    fn direct_fly_dips_on_long_pans() {
        let from = Keyframe::new(CameraState::from_zoom(48.0, 2.0, 10.0, 0.0, 0.0), 0.0);
        let to = Keyframe::new(CameraState::from_zoom(52.0, 13.0, 10.0, 0.0, 0.0), 1000.0);
        let s = Interpolator::default().interpolate(
            &from,
            &to,
            0.5,
            InterpolationMode::DirectFly,
            Easing::Linear,
        );
        let distance = distance_km(&from, &to);
        let expected_dip = (distance / 100.0).log10().min(2.0);
        assert_close(s.zoom(), 10.0 - expected_dip, 1e-6);
    }

    #[test]
    fn arc_zoom_climbs_above_both_endpoints() {
        let from = Keyframe::new(CameraState::from_zoom(48.0, 2.0, 12.0, 0.0, 0.0), 0.0);
        let to = Keyframe::new(CameraState::from_zoom(41.0, 12.0, 12.0, 0.0, 0.0), 1000.0);
        let s = Interpolator::default().interpolate(
            &from,
            &to,
            0.5,
            InterpolationMode::ArcZoom,
            Easing::Linear,
        );
        let expected = arc_zoom_out_level(distance_km(&from, &to), 12.0, 12.0);
        assert_close(s.zoom(), expected, 1e-6);
        assert!(s.zoom() < 12.0);
        // Midpoint of the linear middle phase is the midpoint of the pan.
        assert_close(s.latitude, 44.5, 1e-6);
    }

    #[test]
    fn arc_zoom_level_steps_with_distance() {
        assert_close(arc_zoom_out_level(5.0, 12.0, 14.0), 11.5, 1e-12);
        assert_close(arc_zoom_out_level(50.0, 12.0, 14.0), 10.5, 1e-12);
        assert_close(arc_zoom_out_level(300.0, 12.0, 14.0), 9.5, 1e-12);
        assert_close(arc_zoom_out_level(1000.0, 12.0, 14.0), 6.0, 1e-12);
        assert_close(arc_zoom_out_level(9000.0, 12.0, 14.0), 4.0, 1e-12);
    }

    #[test]
    fn orbital_reaches_space_zoom() {
        let from = Keyframe::new(CameraState::from_zoom(48.0, 2.0, 10.0, 0.0, 0.0), 0.0);
        let to = Keyframe::new(CameraState::from_zoom(-33.0, 151.0, 10.0, 0.0, 0.0), 1000.0);
        let s = Interpolator::default().interpolate(
            &from,
            &to,
            0.5,
            InterpolationMode::Orbital,
            Easing::Linear,
        );
        assert_close(s.zoom(), ORBITAL_SPACE_ZOOM, 1e-6);
    }

    #[test]
    fn glide_is_slower_than_linear_early_on() {
        let from = kf(0.0, 0.0, 10_000.0, 0.0);
        let to = kf(10.0, 0.0, 10_000.0, 1000.0);
        let s = Interpolator::default().interpolate(
            &from,
            &to,
            0.2,
            InterpolationMode::Glide,
            Easing::Linear,
        );
        assert!(s.latitude < 2.0);
        assert!(s.latitude > 0.0);
    }

    #[test]
    fn segment_uses_destination_settings() {
        let from = kf(0.0, 0.0, 10_000.0, 0.0);
        let to = kf(10.0, 0.0, 10_000.0, 1000.0).with_interpolation(InterpolationMode::SnapCut);
        let s = Interpolator::default().interpolate_segment(&from, &to, 0.1);
        assert_eq!(s, to.pose());
    }

    #[test]
    fn out_of_range_progress_is_clamped() {
        let from = kf(0.0, 0.0, 10_000.0, 0.0);
        let to = kf(10.0, 0.0, 10_000.0, 1000.0);
        let interp = Interpolator::default();
        let hi = interp.interpolate(&from, &to, 7.0, InterpolationMode::Simple, Easing::Linear);
        let nan = interp.interpolate(&from, &to, f64::NAN, InterpolationMode::Simple, Easing::Linear);
        assert_close(hi.latitude, 10.0, 1e-9);
        assert_close(nan.latitude, 0.0, 1e-9);
    }

    #[test]
    fn adaptive_easing_uses_keyframe_altitudes() {
        let from = kf(0.0, 0.0, 500.0, 0.0);
        let to = kf(10.0, 0.0, 500.0, 1000.0).with_smoothness(1.0);
        let s = Interpolator::default().interpolate(
            &from,
            &to,
            0.25,
            InterpolationMode::Glide,
            Easing::Adaptive,
        );
        let eased = adaptive_ease_in_out(0.25, 1.0, 500.0, 500.0);
        assert_close(s.latitude, 10.0 * smoothstep(smoothstep(eased)), 1e-9);
    }
}

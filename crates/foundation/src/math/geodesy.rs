//! Spherical geodesy helpers for camera paths.
//!
//! Angles are degrees throughout. Longitudes live in `(-180, 180]` and
//! bearings in `[0, 360)`; every interpolation helper takes the short way
//! around the circle so camera paths never cross the antimeridian the long way.

/// Mean Earth radius used by the haversine formula (kilometers).
pub const EARTH_RADIUS_KM: f64 = 6_371.0;

/// Altitude (meters) that corresponds to zoom level 0: `2^25`.
pub const ZOOM_ALTITUDE_BASE_M: f64 = 33_554_432.0;

/// Altitudes are floored to this value before taking logarithms.
pub const MIN_ALTITUDE_M: f64 = 1.0;

/// Latitude bounds (degrees).
pub const MAX_LATITUDE: f64 = 90.0;

/// Great-circle distance between two points in kilometers (haversine).
///
/// Total: NaN inputs propagate NaN, nothing else fails.
pub fn great_circle_distance_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();

    let sin_lat = (d_lat * 0.5).sin();
    let sin_lon = (d_lon * 0.5).sin();
    let a = sin_lat * sin_lat
        + lat1.to_radians().cos() * lat2.to_radians().cos() * sin_lon * sin_lon;

    // Rounding can push `a` marginally past 1 for antipodal points.
    let a = a.clamp(0.0, 1.0);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_KM * c
}

#[inline]
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

#[inline]
pub fn clamp_latitude(lat: f64) -> f64 {
    lat.clamp(-MAX_LATITUDE, MAX_LATITUDE)
}

/// Wraps a longitude into `(-180, 180]`.
pub fn wrap_longitude(lon: f64) -> f64 {
    if lon > -180.0 && lon <= 180.0 {
        return lon;
    }
    let wrapped = (lon + 180.0).rem_euclid(360.0) - 180.0;
    if wrapped <= -180.0 { wrapped + 360.0 } else { wrapped }
}

/// Normalizes a bearing into `[0, 360)`.
pub fn normalize_bearing(bearing: f64) -> f64 {
    let b = bearing.rem_euclid(360.0);
    // `rem_euclid` rounds tiny negatives up to exactly 360.
    if b >= 360.0 { 0.0 } else { b }
}

/// Signed shortest angular difference `to - from`, in `(-180, 180]`.
pub fn shortest_angle_delta(from: f64, to: f64) -> f64 {
    let d = (to - from).rem_euclid(360.0);
    if d > 180.0 { d - 360.0 } else { d }
}

/// Interpolates longitude along the shorter arc and re-wraps into `(-180, 180]`.
pub fn interpolate_longitude(from: f64, to: f64, t: f64) -> f64 {
    wrap_longitude(from + shortest_angle_delta(from, to) * t)
}

/// Interpolates bearing along the shorter arc, normalized into `[0, 360)`.
pub fn interpolate_bearing(from: f64, to: f64, t: f64) -> f64 {
    normalize_bearing(from + shortest_angle_delta(from, to) * t)
}

/// Web-mercator style zoom level to camera altitude in meters.
pub fn zoom_to_altitude(zoom: f64) -> f64 {
    ZOOM_ALTITUDE_BASE_M / 2f64.powf(zoom)
}

/// Camera altitude in meters to zoom level. Inverse of [`zoom_to_altitude`].
pub fn altitude_to_zoom(altitude_m: f64) -> f64 {
    25.0 - altitude_m.max(MIN_ALTITUDE_M).log2()
}

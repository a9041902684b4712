use foundation::math::lerp;
use foundation::time::cmp_time_ms;
use serde::{Deserialize, Serialize};

/// Curve value that plays at 1x.
pub const NORMAL_SPEED: f64 = 0.5;

/// One control point of a [`SpeedCurve`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpeedPoint {
    #[serde(rename = "timeMs")]
    pub time_ms: f64,
    /// In `[0, 1]`; 0.5 is normal rate.
    pub speed: f64,
}

impl SpeedPoint {
    pub fn new(time_ms: f64, speed: f64) -> Self {
        let time_ms = if time_ms.is_nan() { 0.0 } else { time_ms.max(0.0) };
        let speed = if speed.is_nan() {
            NORMAL_SPEED
        } else {
            speed.clamp(0.0, 1.0)
        };
        Self { time_ms, speed }
    }
}

/// Piecewise-linear playback-rate curve over playback time.
///
/// Always holds at least one point, sorted by time.
#[derive(Debug, Clone, PartialEq)]
pub struct SpeedCurve {
    points: Vec<SpeedPoint>,
}

impl Default for SpeedCurve {
    fn default() -> Self {
        Self {
            points: vec![SpeedPoint::new(0.0, NORMAL_SPEED)],
        }
    }
}

impl SpeedCurve {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a curve from arbitrary points; an empty input gives the default.
    pub fn from_points(points: impl IntoIterator<Item = SpeedPoint>) -> Self {
        let mut points: Vec<SpeedPoint> = points
            .into_iter()
            .map(|p| SpeedPoint::new(p.time_ms, p.speed))
            .collect();
        if points.is_empty() {
            return Self::default();
        }
        points.sort_by(|a, b| cmp_time_ms(a.time_ms, b.time_ms));
        Self { points }
    }

    pub fn points(&self) -> &[SpeedPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always false.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Inserts a point, or overwrites the speed of a point at the same time.
    /// Returns the point's index.
    pub fn add_point(&mut self, time_ms: f64, speed: f64) -> usize {
        let point = SpeedPoint::new(time_ms, speed);
        if let Some(i) = self.points.iter().position(|p| p.time_ms == point.time_ms) {
            self.points[i].speed = point.speed;
            return i;
        }
        let index = self.points.partition_point(|p| p.time_ms < point.time_ms);
        self.points.insert(index, point);
        index
    }

    /// Removes a point. The last remaining point is never removed.
    pub fn remove_point(&mut self, index: usize) -> bool {
        if self.points.len() <= 1 || index >= self.points.len() {
            return false;
        }
        self.points.remove(index);
        true
    }

    /// Moves and re-values a point. Returns its index after re-sorting.
    pub fn set_point(&mut self, index: usize, time_ms: f64, speed: f64) -> Option<usize> {
        let slot = self.points.get_mut(index)?;
        *slot = SpeedPoint::new(time_ms, speed);
        let moved = *slot;
        self.points.sort_by(|a, b| cmp_time_ms(a.time_ms, b.time_ms));
        self.points.iter().position(|p| *p == moved)
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Curve value at `time_ms`, held flat before the first and after the
    /// last point.
    pub fn sample(&self, time_ms: f64) -> f64 {
        let (Some(first), Some(last)) = (self.points.first(), self.points.last()) else {
            return NORMAL_SPEED;
        };
        if time_ms <= first.time_ms || time_ms.is_nan() {
            return first.speed;
        }
        if time_ms >= last.time_ms {
            return last.speed;
        }

        let after = self.points.partition_point(|p| p.time_ms <= time_ms);
        let a = self.points[after - 1];
        let b = self.points[after];
        let span = b.time_ms - a.time_ms;
        if span <= 0.0 {
            return b.speed;
        }
        lerp(a.speed, b.speed, (time_ms - a.time_ms) / span)
    }

    /// Playback-rate multiplier at `time_ms` (`sample * 2`, so 0.5 plays at 1x).
    pub fn multiplier_at(&self, time_ms: f64) -> f64 {
        self.sample(time_ms) * 2.0
    }
}

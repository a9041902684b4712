use core::cmp::Ordering;

/// Timeline time primitives. All timeline positions are milliseconds.
pub const DEFAULT_FPS: u32 = 30;

/// Length of one frame in milliseconds. `fps == 0` falls back to [`DEFAULT_FPS`].
pub fn frame_duration_ms(fps: u32) -> f64 {
    let fps = if fps == 0 { DEFAULT_FPS } else { fps };
    1000.0 / fps as f64
}

/// Rounds `time_ms` to the nearest multiple of one frame.
///
/// Computed as `frames * 1000 / fps` so whole-frame times come out exact.
pub fn snap_to_frame(time_ms: f64, fps: u32) -> f64 {
    let fps = f64::from(if fps == 0 { DEFAULT_FPS } else { fps });
    (time_ms * fps / 1000.0).round() * 1000.0 / fps
}

/// Canonicalize a time value for deterministic ordering.
///
/// `-0.0` becomes `0.0` and all NaNs collapse to one canonical NaN.
pub fn canonical_ms(v: f64) -> f64 {
    if v == 0.0 {
        0.0
    } else if v.is_nan() {
        f64::NAN
    } else {
        v
    }
}

/// Deterministic total ordering for timeline times. Prefer this when sorting.
pub fn cmp_time_ms(a: f64, b: f64) -> Ordering {
    canonical_ms(a).total_cmp(&canonical_ms(b))
}

/// Half-open span of timeline time `[start_ms, end_ms)`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TimeSpan {
    pub start_ms: f64,
    pub end_ms: f64,
}

impl TimeSpan {
    pub fn new(start_ms: f64, end_ms: f64) -> Self {
        Self { start_ms, end_ms }
    }

    pub fn instant(t: f64) -> Self {
        Self {
            start_ms: t,
            end_ms: t,
        }
    }

    pub fn duration_ms(&self) -> f64 {
        (self.end_ms - self.start_ms).max(0.0)
    }

    pub fn contains(&self, t: f64) -> bool {
        t >= self.start_ms && t < self.end_ms
    }
}

use foundation::time::{frame_duration_ms, TimeSpan};

/// Deterministic frame metadata.
///
/// This is the timebase for export and offline sampling. It is intentionally
/// small and pure so a camera path can be sampled, recorded and replayed
/// without touching the wall clock.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Frame {
    /// 0-based frame index.
    pub index: u64,
    /// Fixed delta time (milliseconds).
    pub dt_ms: f64,
    /// Timeline time at the start of the frame (milliseconds).
    pub time_ms: f64,
}

impl Frame {
    pub fn new(index: u64, dt_ms: f64) -> Self {
        Self {
            index,
            dt_ms,
            time_ms: index as f64 * dt_ms,
        }
    }

    pub fn at_fps(index: u64, fps: u32) -> Self {
        Self::new(index, frame_duration_ms(fps))
    }

    pub fn next(self) -> Self {
        Self::new(self.index + 1, self.dt_ms)
    }
}

/// Most frames a plan may describe; about six days at 30 fps.
pub const MAX_PLAN_FRAMES: u64 = 1 << 24;

/// A fixed-rate sampling plan over `[0, duration_ms]`.
///
/// The final frame lands on or before `duration_ms`; a zero duration still
/// yields the single frame at t=0.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FramePlan {
    pub fps: u32,
    pub span: TimeSpan,
}

impl FramePlan {
    pub fn new(fps: u32, duration_ms: f64) -> Self {
        Self {
            fps,
            span: TimeSpan::new(0.0, duration_ms.max(0.0)),
        }
    }

    pub fn dt_ms(&self) -> f64 {
        frame_duration_ms(self.fps)
    }

    pub fn frame_count(&self) -> u64 {
        let duration = self.span.duration_ms();
        if !duration.is_finite() {
            return 1;
        }
        // Tolerate rounding so that e.g. 1000 ms at 30 fps includes frame 30.
        // The cast saturates on huge durations, so the add has to as well.
        ((duration / self.dt_ms() + 1e-9).floor() as u64).saturating_add(1)
    }

    /// False when sampling this plan would exceed [`MAX_PLAN_FRAMES`].
    pub fn is_within_limit(&self) -> bool {
        self.frame_count() <= MAX_PLAN_FRAMES
    }

    pub fn frames(&self) -> impl Iterator<Item = Frame> + '_ {
        let dt_ms = self.dt_ms();
        (0..self.frame_count()).map(move |i| Frame::new(i, dt_ms))
    }
}

#[cfg(test)]
mod tests {
    use super::{Frame, FramePlan, MAX_PLAN_FRAMES};

    #[test]
    fn frame_time_is_deterministic() {
        let a = Frame::new(10, 1000.0 / 60.0);
        let b = Frame::new(10, 1000.0 / 60.0);
        assert_eq!(a, b);
        assert_eq!(a.time_ms, 10.0 * (1000.0 / 60.0));
    }

    #[test]
    fn next_advances_index_and_time() {
        let f0 = Frame::new(0, 500.0);
        let f1 = f0.next();
        assert_eq!(f1.index, 1);
        assert_eq!(f1.time_ms, 500.0);
    }

    #[test]
    fn plan_covers_duration_inclusive() {
        let plan = FramePlan::new(30, 1000.0);
        assert_eq!(plan.frame_count(), 31);
        let last = plan.frames().last().expect("at least one frame");
        assert_eq!(last.index, 30);
        assert!((last.time_ms - 1000.0).abs() < 1e-9);
    }

    #[test]
    fn empty_plan_has_single_frame() {
        let plan = FramePlan::new(24, 0.0);
        let frames: Vec<_> = plan.frames().collect();
        assert_eq!(frames, vec![Frame::at_fps(0, 24)]);
    }

    #[test]
    fn huge_duration_saturates_and_exceeds_limit() {
        let plan = FramePlan::new(30, 1e22);
        assert_eq!(plan.frame_count(), u64::MAX);
        assert!(!plan.is_within_limit());
    }

    #[test]
    fn limit_boundary() {
        let at_limit = FramePlan::new(1, (MAX_PLAN_FRAMES - 1) as f64 * 1000.0);
        assert_eq!(at_limit.frame_count(), MAX_PLAN_FRAMES);
        assert!(at_limit.is_within_limit());
        assert!(!FramePlan::new(1, MAX_PLAN_FRAMES as f64 * 1000.0).is_within_limit());
    }

    #[test]
    fn negative_duration_is_clamped() {
        assert_eq!(FramePlan::new(30, -50.0).frame_count(), 1);
    }
}

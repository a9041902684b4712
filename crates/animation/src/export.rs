//! Fixed-rate camera path sampling for offline export.
//!
//! Frames step timeline time directly; wall clock, playback speed and the
//! speed curve play no part, so the same project always samples the same path.

use runtime::{Clock, Frame, FramePlan};
use serde::Serialize;

use crate::camera::{CameraSink, CameraState};
use crate::controller::AnimationController;

/// One exported frame. `camera` is `None` while the timeline is empty.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SampledFrame {
    pub index: u64,
    pub time_ms: f64,
    pub camera: Option<CameraState>,
}

impl<C: Clock, S: CameraSink> AnimationController<C, S> {
    /// Plan covering the resolved total duration at `fps`.
    pub fn export_plan(&self, fps: u32) -> FramePlan {
        FramePlan::new(fps, self.total_duration_ms())
    }

    pub fn sample_frame(&self, frame: Frame) -> SampledFrame {
        SampledFrame {
            index: frame.index,
            time_ms: frame.time_ms,
            camera: self.camera_at_time(frame.time_ms),
        }
    }

    /// Samples every frame of `plan`. Check [`FramePlan::is_within_limit`]
    /// first when the duration comes from user input.
    pub fn sample_frames(&self, plan: &FramePlan) -> Vec<SampledFrame> {
        plan.frames().map(|frame| self.sample_frame(frame)).collect()
    }
}

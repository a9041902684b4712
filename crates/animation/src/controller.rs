//! Playback state machine.
//!
//! One logical thread drives everything: the host calls [`AnimationController::tick`]
//! every `tick_interval_ms`. Each tick reads the clock, advances timeline time,
//! resolves the active segment, interpolates and pushes one pose into the
//! camera sink, in that order.
//!
//! The camera has two writers, playback and the user in edit mode. The
//! [`CameraWriter`] state decides which one currently owns it; pose
//! notifications coming back from the camera are only turned into keyframe
//! edits while the user owns it.

use runtime::{Clock, EventBus};
use tracing::{debug, warn};

use crate::camera::{CameraSink, CameraState, CameraWriter};
use crate::config::AnimationConfig;
use crate::interpolator::Interpolator;
use crate::speed_curve::SpeedCurve;
use crate::timeline::{KeyframeTimeline, TimelineEvent};

pub const MIN_PLAYBACK_SPEED: f64 = 0.1;
pub const MAX_PLAYBACK_SPEED: f64 = 4.0;

/// Times closer than this count as the same playhead position.
const TIME_EPS_MS: f64 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlaybackEvent {
    PlayingChanged(bool),
    CurrentTimeChanged(f64),
    CurrentKeyframeIndexChanged(usize),
    PlaybackSpeedChanged(f64),
    LoopingChanged(bool),
    TotalDurationChanged(f64),
    /// Non-looping playback reached the end and paused.
    AnimationComplete,
    /// One tick finished; carries the playhead time.
    FrameRendered(f64),
    /// A timeline mutation, forwarded from the owned timeline.
    Timeline(TimelineEvent),
}

pub struct AnimationController<C: Clock, S: CameraSink> {
    timeline: KeyframeTimeline,
    interpolator: Interpolator,
    speed_curve: SpeedCurve,
    speed_curve_enabled: bool,
    config: AnimationConfig,
    clock: C,
    camera: S,

    current_time_ms: f64,
    playing: bool,
    looping: bool,
    playback_speed: f64,
    explicit_duration_ms: f64,
    use_explicit_duration: bool,
    last_tick_ms: Option<f64>,
    last_total_duration_ms: f64,

    writer: CameraWriter,
    edit_mode: bool,
    last_written: Option<CameraState>,
    events: EventBus<PlaybackEvent>,
}

impl<C: Clock, S: CameraSink> AnimationController<C, S> {
    pub fn new(clock: C, camera: S, config: AnimationConfig) -> Self {
        let config = config.sanitized();
        let timeline = KeyframeTimeline::with_settings(config.timeline_settings());
        let mut controller = Self {
            timeline,
            interpolator: Interpolator::new(config.large_zoom_delta),
            speed_curve: SpeedCurve::default(),
            speed_curve_enabled: false,
            clock,
            camera,
            current_time_ms: 0.0,
            playing: false,
            looping: false,
            playback_speed: 1.0,
            explicit_duration_ms: config.default_duration_ms,
            use_explicit_duration: false,
            last_tick_ms: None,
            last_total_duration_ms: 0.0,
            writer: CameraWriter::Idle,
            edit_mode: false,
            last_written: None,
            events: EventBus::new(),
            config,
        };
        controller.last_total_duration_ms = controller.total_duration_ms();
        controller
    }

    pub fn config(&self) -> &AnimationConfig {
        &self.config
    }

    pub fn timeline(&self) -> &KeyframeTimeline {
        &self.timeline
    }

    /// Runs a timeline edit, forwards its events, then re-publishes the total
    /// duration if it moved.
    pub fn edit_timeline<R>(&mut self, edit: impl FnOnce(&mut KeyframeTimeline) -> R) -> R {
        let out = edit(&mut self.timeline);
        self.forward_timeline_events();
        self.sync_total_duration();
        out
    }

    pub fn interpolator(&self) -> &Interpolator {
        &self.interpolator
    }

    pub fn camera(&self) -> &S {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut S {
        &mut self.camera
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn speed_curve(&self) -> &SpeedCurve {
        &self.speed_curve
    }

    pub fn speed_curve_mut(&mut self) -> &mut SpeedCurve {
        &mut self.speed_curve
    }

    pub fn speed_curve_enabled(&self) -> bool {
        self.speed_curve_enabled
    }

    pub fn set_speed_curve_enabled(&mut self, enabled: bool) {
        self.speed_curve_enabled = enabled;
    }

    pub fn camera_writer(&self) -> CameraWriter {
        self.writer
    }

    pub fn events(&self) -> &[PlaybackEvent] {
        self.events.events()
    }

    pub fn drain_events(&mut self) -> Vec<PlaybackEvent> {
        self.events.drain()
    }

    pub fn tick_interval_ms(&self) -> u64 {
        self.config.tick_interval_ms
    }

    pub fn current_time_ms(&self) -> f64 {
        self.current_time_ms
    }

    pub fn current_keyframe_index(&self) -> usize {
        self.timeline.current_index()
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn is_looping(&self) -> bool {
        self.looping
    }

    pub fn playback_speed(&self) -> f64 {
        self.playback_speed
    }

    pub fn explicit_duration_ms(&self) -> f64 {
        self.explicit_duration_ms
    }

    pub fn use_explicit_duration(&self) -> bool {
        self.use_explicit_duration
    }

    /// Explicit duration when enabled, otherwise the keyframe duration with
    /// `default_duration_ms` as a floor.
    pub fn total_duration_ms(&self) -> f64 {
        if self.use_explicit_duration {
            self.explicit_duration_ms
        } else {
            self.timeline
                .total_duration_ms()
                .max(self.config.default_duration_ms)
        }
    }

    pub fn play(&mut self) {
        if self.playing {
            return;
        }
        if self.timeline.is_empty() && !self.config.play_without_keyframes {
            debug!("play ignored: timeline is empty");
            return;
        }
        self.playing = true;
        self.last_tick_ms = Some(self.clock.now_ms());
        self.writer = CameraWriter::PlaybackWriting;
        debug!(time_ms = self.current_time_ms, "playback started");
        self.events.emit(PlaybackEvent::PlayingChanged(true));
    }

    pub fn pause(&mut self) {
        if !self.playing {
            return;
        }
        self.playing = false;
        self.last_tick_ms = None;
        self.writer = self.resting_writer();
        debug!(time_ms = self.current_time_ms, "playback paused");
        self.events.emit(PlaybackEvent::PlayingChanged(false));
    }

    pub fn toggle_play_pause(&mut self) {
        if self.playing {
            self.pause();
        } else {
            self.play();
        }
    }

    /// Stops playback, rewinds to 0 and forces a camera update there.
    pub fn stop(&mut self) {
        self.pause();
        debug!("playback stopped");

        if self.current_time_ms != 0.0 {
            self.current_time_ms = 0.0;
            self.events.emit(PlaybackEvent::CurrentTimeChanged(0.0));
        }
        self.set_current_keyframe_index(0);
        self.update_camera_from_time(0.0);
    }

    pub fn seek_to(&mut self, time_ms: f64) {
        self.set_current_time(time_ms);
    }

    /// Moves the playhead. Clamped to >= 0 with no upper bound, so authoring
    /// past the last keyframe works. Non-finite times are ignored.
    pub fn set_current_time(&mut self, time_ms: f64) {
        if time_ms.is_nan() || time_ms == f64::INFINITY {
            warn!(time_ms, "ignoring non-finite playhead time");
            return;
        }
        let time_ms = time_ms.max(0.0);
        if (time_ms - self.current_time_ms).abs() <= TIME_EPS_MS {
            return;
        }

        self.current_time_ms = time_ms;
        self.update_camera_from_time(time_ms);
        self.events.emit(PlaybackEvent::CurrentTimeChanged(time_ms));

        if let Some(index) = self.timeline.keyframe_index_at_time(time_ms) {
            self.set_current_keyframe_index(index);
        }
    }

    pub fn set_playback_speed(&mut self, speed: f64) {
        if speed.is_nan() {
            return;
        }
        let speed = speed.clamp(MIN_PLAYBACK_SPEED, MAX_PLAYBACK_SPEED);
        if speed != self.playback_speed {
            self.playback_speed = speed;
            self.events.emit(PlaybackEvent::PlaybackSpeedChanged(speed));
        }
    }

    pub fn set_looping(&mut self, looping: bool) {
        if looping != self.looping {
            self.looping = looping;
            self.events.emit(PlaybackEvent::LoopingChanged(looping));
        }
    }

    /// Clamped to `min_explicit_duration_ms`.
    pub fn set_explicit_duration(&mut self, duration_ms: f64) {
        if duration_ms.is_nan() {
            return;
        }
        let duration_ms = duration_ms.max(self.config.min_explicit_duration_ms);
        if duration_ms != self.explicit_duration_ms {
            self.explicit_duration_ms = duration_ms;
            self.sync_total_duration();
        }
    }

    pub fn set_use_explicit_duration(&mut self, enabled: bool) {
        if enabled != self.use_explicit_duration {
            self.use_explicit_duration = enabled;
            self.sync_total_duration();
        }
    }

    /// Seeks to the next keyframe; wraps to the first when looping.
    pub fn step_forward(&mut self) {
        let count = self.timeline.len();
        if count == 0 {
            return;
        }
        let next = self.current_keyframe_index() + 1;
        let next = if next < count {
            next
        } else if self.looping {
            0
        } else {
            count - 1
        };
        self.seek_to_keyframe(next);
    }

    /// Seeks to the previous keyframe; wraps to the last when looping.
    pub fn step_backward(&mut self) {
        let count = self.timeline.len();
        if count == 0 {
            return;
        }
        let prev = match self.current_keyframe_index().checked_sub(1) {
            Some(prev) => prev,
            None if self.looping => count - 1,
            None => 0,
        };
        self.seek_to_keyframe(prev);
    }

    /// Periodic playback step. Does nothing while paused.
    pub fn tick(&mut self) {
        if !self.playing {
            return;
        }
        let now = self.clock.now_ms();
        let delta_ms = match self.last_tick_ms.replace(now) {
            Some(prev) => (now - prev).max(0.0),
            None => 0.0,
        };
        self.advance(delta_ms);
    }

    /// Playback-rate multiplier at the playhead, speed curve included.
    pub fn effective_speed(&self) -> f64 {
        let curve = if self.speed_curve_enabled {
            self.speed_curve.multiplier_at(self.current_time_ms)
        } else {
            1.0
        };
        self.playback_speed * curve
    }

    fn advance(&mut self, delta_ms: f64) {
        let mut time_ms = self.current_time_ms + delta_ms * self.effective_speed();
        let keyframe_duration = self.timeline.total_duration_ms();
        let total = self.total_duration_ms();
        let mut completed = false;

        if self.looping {
            let period = if keyframe_duration > 0.0 {
                keyframe_duration
            } else {
                total
            };
            if period > 0.0 && time_ms >= period {
                time_ms %= period;
                debug!(time_ms, period, "playback wrapped");
            }
        } else if time_ms >= total {
            time_ms = total;
            completed = true;
        }

        self.set_current_time(time_ms);
        if completed {
            self.pause();
            debug!(time_ms, "playback complete");
            self.events.emit(PlaybackEvent::AnimationComplete);
        }
        self.events
            .emit(PlaybackEvent::FrameRendered(self.current_time_ms));
    }

    /// Pose at timeline time `t`, without touching the camera or playhead.
    ///
    /// `None` on an empty timeline; a single keyframe is returned as-is.
    pub fn camera_at_time(&self, time_ms: f64) -> Option<CameraState> {
        let keyframes = self.timeline.keyframes();
        if let [only] = keyframes {
            return Some(only.pose());
        }
        let seg = self.timeline.progress_at_time(time_ms)?;
        let from = &keyframes[seg.from_index];
        let to = &keyframes[seg.to_index];
        if seg.from_index == seg.to_index {
            return Some(to.pose());
        }
        Some(self.interpolator.interpolate_segment(from, to, seg.progress))
    }

    /// Pushes the pose at `t` into the camera. No-op on an empty timeline.
    pub fn update_camera_from_time(&mut self, time_ms: f64) {
        let Some(state) = self.camera_at_time(time_ms) else {
            return;
        };
        self.writer = CameraWriter::PlaybackWriting;
        self.camera.set_position(&state);
        self.last_written = Some(state);
        self.writer = self.resting_writer();
    }

    /// Re-applies the pose at the current playhead, e.g. after editing keyframes.
    pub fn refresh_camera(&mut self) {
        self.update_camera_from_time(self.current_time_ms);
    }

    pub fn edit_mode(&self) -> bool {
        self.edit_mode
    }

    /// While enabled and paused, camera changes edit the current keyframe.
    pub fn set_edit_mode(&mut self, enabled: bool) {
        self.edit_mode = enabled;
        self.writer = self.resting_writer();
    }

    /// Camera-change notification from the host.
    ///
    /// Echoes of the last pose playback wrote are dropped; anything else is
    /// forwarded to [`Self::update_current_position`] when the user owns the
    /// camera. Returns whether a keyframe changed.
    pub fn camera_changed(&mut self, state: CameraState) -> bool {
        if self.writer != CameraWriter::UserEditing {
            return false;
        }
        if self.last_written == Some(state) {
            return false;
        }
        self.update_current_position(state)
    }

    /// Writes `pose` into the current keyframe. Accepted only in edit mode.
    pub fn update_current_position(&mut self, pose: CameraState) -> bool {
        if self.writer != CameraWriter::UserEditing {
            warn!(writer = ?self.writer, "camera edit rejected outside edit mode");
            return false;
        }
        let changed = self.timeline.update_current_position(pose).is_some();
        self.forward_timeline_events();
        if changed {
            self.last_written = Some(pose);
        }
        changed
    }

    /// Resets playback state for a new or freshly loaded project.
    pub fn reset(&mut self) {
        self.pause();
        self.timeline.clear();
        self.forward_timeline_events();
        self.speed_curve.reset();
        self.speed_curve_enabled = false;
        self.set_playback_speed(1.0);
        self.set_looping(false);
        self.use_explicit_duration = false;
        self.explicit_duration_ms = self.config.default_duration_ms;
        self.last_written = None;
        if self.current_time_ms != 0.0 {
            self.current_time_ms = 0.0;
            self.events.emit(PlaybackEvent::CurrentTimeChanged(0.0));
        }
        self.sync_total_duration();
    }

    fn resting_writer(&self) -> CameraWriter {
        if self.playing {
            CameraWriter::PlaybackWriting
        } else if self.edit_mode {
            CameraWriter::UserEditing
        } else {
            CameraWriter::Idle
        }
    }

    fn seek_to_keyframe(&mut self, index: usize) {
        let Some(time_ms) = self.timeline.keyframe(index).map(|kf| kf.time_ms) else {
            return;
        };
        self.set_current_time(time_ms);
        // Equal-time seeks leave the playhead alone; still land on `index`.
        self.set_current_keyframe_index(index);
    }

    fn set_current_keyframe_index(&mut self, index: usize) {
        self.timeline.set_current_index(index);
        self.forward_timeline_events();
    }

    /// Moves pending timeline events onto the controller's bus, so the
    /// timeline's own queue stays empty between calls.
    fn forward_timeline_events(&mut self) {
        for event in self.timeline.drain_events() {
            let event = match event {
                TimelineEvent::CurrentIndexChanged(index) => {
                    PlaybackEvent::CurrentKeyframeIndexChanged(index)
                }
                other => PlaybackEvent::Timeline(other),
            };
            self.events.emit(event);
        }
    }

    fn sync_total_duration(&mut self) {
        let total = self.total_duration_ms();
        if total != self.last_total_duration_ms {
            self.last_total_duration_ms = total;
            self.events.emit(PlaybackEvent::TotalDurationChanged(total));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::CameraTarget;
    use crate::keyframe::{InterpolationMode, Keyframe};
    use crate::speed_curve::SpeedPoint;
    use foundation::easing::Easing;
    use runtime::ManualClock;

    type TestController = AnimationController<ManualClock, CameraTarget>;

    fn assert_close(a: f64, b: f64, eps: f64) {
        assert!((a - b).abs() <= eps, "expected {b}, got {a} (eps {eps})");
    }

    fn controller() -> (TestController, ManualClock) {
        let clock = ManualClock::new();
        let c = AnimationController::new(clock.clone(), CameraTarget::new(), AnimationConfig::default());
        (c, clock)
    }

    fn linear(lat: f64, lon: f64, alt: f64, time_ms: f64) -> Keyframe {
        Keyframe::new(CameraState::new(lat, lon, alt, 0.0, 0.0), time_ms)
            .with_interpolation(InterpolationMode::Simple)
            .with_easing(Easing::Linear)
    }

    fn two_keyframes(c: &mut TestController) {
        c.edit_timeline(|tl| {
            tl.insert_keyframe(linear(0.0, 0.0, 1_000_000.0, 0.0));
            tl.insert_keyframe(linear(10.0, 10.0, 500_000.0, 10_000.0));
        });
    }

    #[test]
    fn seek_interpolates_midpoint() {
        let (mut c, _clock) = controller();
        two_keyframes(&mut c);
        c.seek_to(5_000.0);
        let s = c.camera().state().expect("camera written");
        assert_close(s.latitude, 5.0, 1e-9);
        assert_close(s.longitude, 5.0, 1e-9);
        assert_close(s.altitude, 750_000.0, 1e-6);
        assert_eq!(c.current_keyframe_index(), 0);
    }

    #[test]
    fn seek_clamps_negative_and_allows_past_end() {
        let (mut c, _clock) = controller();
        two_keyframes(&mut c);
        c.seek_to(4_000.0);
        c.seek_to(-50.0);
        assert_eq!(c.current_time_ms(), 0.0);
        c.seek_to(25_000.0);
        assert_eq!(c.current_time_ms(), 25_000.0);
        assert_eq!(c.current_keyframe_index(), 1);
        let s = c.camera().state().expect("camera written");
        assert_close(s.latitude, 10.0, 1e-9);
    }

    #[test]
    fn non_finite_seek_is_ignored() {
        let (mut c, _clock) = controller();
        c.seek_to(1_000.0);
        c.seek_to(f64::NAN);
        c.seek_to(f64::INFINITY);
        assert_eq!(c.current_time_ms(), 1_000.0);
    }

    #[test]
    fn tick_advances_by_wall_time_times_speed() {
        let (mut c, clock) = controller();
        two_keyframes(&mut c);
        c.set_playback_speed(2.0);
        c.play();
        clock.advance(100.0);
        c.tick();
        assert_close(c.current_time_ms(), 200.0, 1e-9);
        assert!(c.events().contains(&PlaybackEvent::FrameRendered(200.0)));
    }

    #[test]
    fn looping_playback_keeps_timeline_queue_empty() {
        let (mut c, clock) = controller();
        c.edit_timeline(|tl| {
            tl.insert_keyframe(linear(0.0, 0.0, 1_000_000.0, 0.0));
            tl.insert_keyframe(linear(1.0, 1.0, 1_000_000.0, 1_000.0));
            tl.insert_keyframe(linear(2.0, 2.0, 1_000_000.0, 2_000.0));
        });
        assert!(c.timeline().events().is_empty());
        c.set_looping(true);
        c.play();

        let mut index_changes = 0;
        for _ in 0..10_000 {
            clock.advance(16.0);
            c.tick();
            index_changes += c
                .drain_events()
                .iter()
                .filter(|e| matches!(e, PlaybackEvent::CurrentKeyframeIndexChanged(_)))
                .count();
            assert!(c.timeline().events().is_empty());
        }
        assert!(c.is_playing());
        // 160 s over a 2 s loop crosses segment boundaries many times.
        assert!(index_changes > 100, "saw {index_changes} index changes");
    }

    #[test]
    fn timeline_edits_are_forwarded() {
        let (mut c, _clock) = controller();
        two_keyframes(&mut c);
        let events = c.drain_events();
        assert!(events.contains(&PlaybackEvent::Timeline(TimelineEvent::KeyframeAdded(1))));
        assert!(c.timeline().events().is_empty());
    }

    #[test]
    fn paused_tick_does_nothing() {
        let (mut c, clock) = controller();
        two_keyframes(&mut c);
        clock.advance(500.0);
        c.tick();
        assert_eq!(c.current_time_ms(), 0.0);
        c.play();
        c.pause();
        clock.advance(500.0);
        c.tick();
        assert_eq!(c.current_time_ms(), 0.0);
    }

    #[test]
    fn looping_wraps_at_keyframe_duration() {
        let (mut c, clock) = controller();
        two_keyframes(&mut c);
        c.set_looping(true);
        c.seek_to(9_000.0);
        c.play();
        clock.advance(1_500.0);
        c.tick();
        assert_close(c.current_time_ms(), 500.0, 1e-9);
        assert!(c.is_playing());
    }

    #[test]
    fn non_looping_stops_at_total_duration() {
        let (mut c, clock) = controller();
        two_keyframes(&mut c);
        c.set_use_explicit_duration(true);
        c.set_explicit_duration(10_000.0);
        c.seek_to(9_000.0);
        c.play();
        c.drain_events();
        clock.advance(5_000.0);
        c.tick();
        assert_eq!(c.current_time_ms(), 10_000.0);
        assert!(!c.is_playing());
        let events = c.drain_events();
        assert!(events.contains(&PlaybackEvent::AnimationComplete));
        assert!(events.contains(&PlaybackEvent::PlayingChanged(false)));
    }

    #[test]
    fn speed_curve_scales_advance() {
        let (mut c, clock) = controller();
        two_keyframes(&mut c);
        *c.speed_curve_mut() =
            SpeedCurve::from_points([SpeedPoint::new(0.0, 0.5), SpeedPoint::new(5_000.0, 1.0)]);
        c.set_speed_curve_enabled(true);
        c.seek_to(2_500.0);
        assert_close(c.effective_speed(), 1.5, 1e-12);
        c.play();
        clock.advance(100.0);
        c.tick();
        assert_close(c.current_time_ms(), 2_650.0, 1e-9);
    }

    #[test]
    fn duration_has_a_floor_unless_explicit() {
        let (mut c, _clock) = controller();
        two_keyframes(&mut c);
        assert_eq!(c.total_duration_ms(), 60_000.0);
        c.set_explicit_duration(10.0);
        assert_eq!(c.explicit_duration_ms(), 1_000.0);
        c.set_use_explicit_duration(true);
        assert_eq!(c.total_duration_ms(), 1_000.0);
        assert!(
            c.events()
                .contains(&PlaybackEvent::TotalDurationChanged(1_000.0))
        );
    }

    #[test]
    fn playback_speed_is_clamped() {
        let (mut c, _clock) = controller();
        c.set_playback_speed(100.0);
        assert_eq!(c.playback_speed(), MAX_PLAYBACK_SPEED);
        c.set_playback_speed(0.0);
        assert_eq!(c.playback_speed(), MIN_PLAYBACK_SPEED);
    }

    #[test]
    fn empty_timeline_plays_but_never_writes_camera() {
        let (mut c, clock) = controller();
        c.play();
        assert!(c.is_playing());
        clock.advance(100.0);
        c.tick();
        assert_eq!(c.camera().writes(), 0);
        assert_close(c.current_time_ms(), 100.0, 1e-9);
    }

    #[test]
    fn empty_timeline_play_can_be_disabled() {
        let config = AnimationConfig {
            play_without_keyframes: false,
            ..AnimationConfig::default()
        };
        let mut c = AnimationController::new(ManualClock::new(), CameraTarget::new(), config);
        c.play();
        assert!(!c.is_playing());
    }

    #[test]
    fn single_keyframe_snaps_camera() {
        let (mut c, _clock) = controller();
        c.edit_timeline(|tl| tl.insert_keyframe(linear(3.0, 4.0, 2_000.0, 500.0)));
        c.seek_to(7_000.0);
        let s = c.camera().state().expect("camera written");
        assert_eq!((s.latitude, s.longitude, s.altitude), (3.0, 4.0, 2_000.0));
    }

    #[test]
    fn stop_rewinds_and_updates_camera() {
        let (mut c, clock) = controller();
        two_keyframes(&mut c);
        c.play();
        clock.advance(3_000.0);
        c.tick();
        c.stop();
        assert!(!c.is_playing());
        assert_eq!(c.current_time_ms(), 0.0);
        assert_eq!(c.current_keyframe_index(), 0);
        let s = c.camera().state().expect("camera written");
        assert_close(s.latitude, 0.0, 1e-12);
    }

    #[test]
    fn step_wraps_only_when_looping() {
        let (mut c, _clock) = controller();
        two_keyframes(&mut c);
        c.step_forward();
        assert_eq!(c.current_keyframe_index(), 1);
        assert_eq!(c.current_time_ms(), 10_000.0);
        c.step_forward();
        assert_eq!(c.current_keyframe_index(), 1);

        c.set_looping(true);
        c.step_forward();
        assert_eq!(c.current_keyframe_index(), 0);
        assert_eq!(c.current_time_ms(), 0.0);
        c.step_backward();
        assert_eq!(c.current_keyframe_index(), 1);
    }

    #[test]
    fn camera_changes_edit_only_in_edit_mode() {
        let (mut c, _clock) = controller();
        two_keyframes(&mut c);
        let moved = CameraState::new(1.0, 2.0, 3_000.0, 0.0, 0.0);

        assert!(!c.camera_changed(moved));
        assert!(!c.update_current_position(moved));

        c.set_edit_mode(true);
        assert_eq!(c.camera_writer(), CameraWriter::UserEditing);
        assert!(c.camera_changed(moved));
        assert_eq!(c.timeline().keyframe(0).map(|kf| kf.latitude), Some(1.0));
    }

    #[test]
    fn playback_writes_do_not_feed_back() {
        let (mut c, clock) = controller();
        two_keyframes(&mut c);
        c.set_edit_mode(true);
        c.seek_to(5_000.0);
        // The host echoes the pose playback just wrote.
        let echoed = c.camera().state().expect("camera written");
        assert!(!c.camera_changed(echoed));

        c.play();
        assert_eq!(c.camera_writer(), CameraWriter::PlaybackWriting);
        clock.advance(16.0);
        c.tick();
        let echoed = c.camera().state().expect("camera written");
        assert!(!c.camera_changed(echoed));
        assert!(!c.camera_changed(CameraState::default()));
        assert_eq!(c.timeline().keyframe(0).map(|kf| kf.latitude), Some(0.0));
    }

    #[test]
    fn camera_at_time_is_pure() {
        let (mut c, _clock) = controller();
        assert_eq!(c.camera_at_time(0.0), None);
        two_keyframes(&mut c);
        let s = c.camera_at_time(2_500.0).expect("pose");
        assert_close(s.latitude, 2.5, 1e-9);
        assert_eq!(c.camera().writes(), 0);
        assert_eq!(c.current_time_ms(), 0.0);
    }

    #[test]
    fn reset_clears_project_state() {
        let (mut c, _clock) = controller();
        two_keyframes(&mut c);
        c.set_looping(true);
        c.set_playback_speed(3.0);
        c.seek_to(4_000.0);
        c.reset();
        assert!(c.timeline().is_empty());
        assert!(!c.is_looping());
        assert_eq!(c.playback_speed(), 1.0);
        assert_eq!(c.current_time_ms(), 0.0);
    }
}

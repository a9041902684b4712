//! Ordered keyframe collection with editing, selection and time lookup.
//!
//! Invariants:
//! - keyframes are sorted ascending by `time_ms` after every mutation;
//! - `total_duration_ms()` is the last keyframe's time (0 when empty);
//! - the current index and the selection follow their keyframes through
//!   every re-sort and removal.

use foundation::easing::Easing;
use foundation::time::{cmp_time_ms, frame_duration_ms, snap_to_frame, DEFAULT_FPS};
use runtime::EventBus;
use tracing::debug;

use crate::camera::CameraState;
use crate::keyframe::{InterpolationMode, Keyframe, KeyframeUpdate, DEFAULT_SMOOTHNESS};
use crate::selection::SelectionSet;

/// Two times closer than this are treated as the same frame.
const SAME_TIME_EPS_MS: f64 = 1e-6;

/// Editing defaults applied by the timeline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimelineSettings {
    /// Frame grid keyframe times snap to.
    pub snap_fps: u32,
    /// Spacing used by [`KeyframeTimeline::add_keyframe`].
    pub keyframe_interval_ms: f64,
    /// Offset used by [`KeyframeTimeline::duplicate_keyframe`].
    pub duplicate_offset_ms: f64,
    pub default_interpolation: InterpolationMode,
    pub default_easing: Easing,
    pub default_smoothness: f64,
}

impl Default for TimelineSettings {
    fn default() -> Self {
        Self {
            snap_fps: DEFAULT_FPS,
            keyframe_interval_ms: 4_000.0,
            duplicate_offset_ms: 2_000.0,
            default_interpolation: InterpolationMode::default(),
            default_easing: Easing::default(),
            default_smoothness: DEFAULT_SMOOTHNESS,
        }
    }
}

/// Notifications for timeline views.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TimelineEvent {
    KeyframeAdded(usize),
    KeyframeRemoved(usize),
    KeyframeModified(usize),
    /// Keyframes were re-sorted; indices held by views are stale.
    Reordered,
    CurrentIndexChanged(usize),
    SelectionChanged,
    DurationChanged(f64),
    Cleared,
    Loaded(usize),
}

/// Where a timeline time falls between two keyframes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentProgress {
    pub from_index: usize,
    pub to_index: usize,
    /// Normalized position within the segment, in `[0, 1]`.
    pub progress: f64,
}

#[derive(Debug, Clone, Default)]
pub struct KeyframeTimeline {
    keyframes: Vec<Keyframe>,
    current_index: usize,
    selection: SelectionSet,
    settings: TimelineSettings,
    events: EventBus<TimelineEvent>,
}

impl KeyframeTimeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(settings: TimelineSettings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    pub fn settings(&self) -> &TimelineSettings {
        &self.settings
    }

    pub fn set_settings(&mut self, settings: TimelineSettings) {
        self.settings = settings;
    }

    pub fn len(&self) -> usize {
        self.keyframes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keyframes.is_empty()
    }

    pub fn keyframes(&self) -> &[Keyframe] {
        &self.keyframes
    }

    pub fn keyframe(&self, index: usize) -> Option<&Keyframe> {
        self.keyframes.get(index)
    }

    pub fn total_duration_ms(&self) -> f64 {
        self.keyframes.last().map_or(0.0, |kf| kf.time_ms)
    }

    pub fn events(&self) -> &[TimelineEvent] {
        self.events.events()
    }

    pub fn drain_events(&mut self) -> Vec<TimelineEvent> {
        self.events.drain()
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn current_keyframe(&self) -> Option<&Keyframe> {
        self.keyframes.get(self.current_index)
    }

    /// Clamps into the valid index range (0 when empty).
    pub fn set_current_index(&mut self, index: usize) {
        let index = index.min(self.keyframes.len().saturating_sub(1));
        if index != self.current_index {
            self.current_index = index;
            self.events.emit(TimelineEvent::CurrentIndexChanged(index));
        }
    }

    pub fn go_to_next_keyframe(&mut self) -> usize {
        if !self.keyframes.is_empty() {
            self.set_current_index(self.current_index + 1);
        }
        self.current_index
    }

    pub fn go_to_previous_keyframe(&mut self) -> usize {
        if !self.keyframes.is_empty() {
            self.set_current_index(self.current_index.saturating_sub(1));
        }
        self.current_index
    }

    /// Writes a camera pose into the current keyframe.
    ///
    /// Returns the index when something changed. Callers gate this on edit
    /// mode; see `AnimationController::camera_changed`.
    pub fn update_current_position(&mut self, pose: CameraState) -> Option<usize> {
        let index = self.current_index;
        let kf = self.keyframes.get_mut(index)?;
        let before = *kf;
        kf.set_pose(pose);
        if *kf == before {
            return None;
        }
        self.events.emit(TimelineEvent::KeyframeModified(index));
        Some(index)
    }

    /// Appends a keyframe one `keyframe_interval_ms` after the last one.
    pub fn add_keyframe(&mut self, pose: CameraState) -> usize {
        let time_ms = if self.keyframes.is_empty() {
            0.0
        } else {
            self.total_duration_ms() + self.settings.keyframe_interval_ms
        };
        self.add_keyframe_at_time(pose, time_ms)
    }

    /// Inserts a keyframe at `time_ms` (clamped to >= 0, snapped to the
    /// frame grid, nudged past occupied frames). Returns its index.
    pub fn add_keyframe_at_time(&mut self, pose: CameraState, time_ms: f64) -> usize {
        let kf = Keyframe::new(pose, time_ms)
            .with_interpolation(self.settings.default_interpolation)
            .with_easing(self.settings.default_easing)
            .with_smoothness(self.settings.default_smoothness);
        self.insert_keyframe(kf)
    }

    /// Inserts a fully specified keyframe. Returns its index.
    pub fn insert_keyframe(&mut self, keyframe: Keyframe) -> usize {
        let mut kf = keyframe.sanitized();
        kf.time_ms = self.free_time(kf.time_ms, None);
        self.push_sorted(kf)
    }

    pub fn remove_keyframe(&mut self, index: usize) -> Option<Keyframe> {
        if index >= self.keyframes.len() {
            return None;
        }
        let old_duration = self.total_duration_ms();
        let removed = self.keyframes.remove(index);

        let had_selection = self.selection.contains(index);
        self.selection.remove_and_shift(index);
        if had_selection {
            self.events.emit(TimelineEvent::SelectionChanged);
        }

        let current = if self.current_index > index {
            self.current_index - 1
        } else {
            self.current_index
        }
        .min(self.keyframes.len().saturating_sub(1));
        if current != self.current_index {
            self.current_index = current;
            self.events.emit(TimelineEvent::CurrentIndexChanged(current));
        }

        debug!(index, remaining = self.keyframes.len(), "keyframe removed");
        self.events.emit(TimelineEvent::KeyframeRemoved(index));
        self.emit_duration_if_changed(old_duration);
        Some(removed)
    }

    /// Re-times one keyframe. Returns its index after re-sorting.
    pub fn move_keyframe(&mut self, index: usize, time_ms: f64) -> Option<usize> {
        self.update_keyframe(
            index,
            &KeyframeUpdate {
                time_ms: Some(time_ms),
                ..Default::default()
            },
        )
    }

    /// Copies a keyframe `duplicate_offset_ms` later. Returns the copy's index.
    pub fn duplicate_keyframe(&mut self, index: usize) -> Option<usize> {
        let source = *self.keyframes.get(index)?;
        let time_ms = source.time_ms + self.settings.duplicate_offset_ms;
        self.duplicate_with_time(source, time_ms)
    }

    /// Copies a keyframe to `time_ms` and makes the copy current.
    pub fn duplicate_keyframe_at_time(&mut self, index: usize, time_ms: f64) -> Option<usize> {
        let source = *self.keyframes.get(index)?;
        let new_index = self.duplicate_with_time(source, time_ms)?;
        self.set_current_index(new_index);
        Some(new_index)
    }

    /// Applies a partial edit. Returns the keyframe's index after any re-sort.
    pub fn update_keyframe(&mut self, index: usize, update: &KeyframeUpdate) -> Option<usize> {
        let old_duration = self.total_duration_ms();
        let mut changed = update.apply_pose_and_modes(self.keyframes.get_mut(index)?);
        let mut new_index = index;

        if let Some(time_ms) = update.time_ms {
            let time_ms = self.free_time(time_ms, Some(index));
            if self.keyframes[index].time_ms != time_ms {
                self.keyframes[index].time_ms = time_ms;
                new_index = self.sort_by_time()[index];
                changed = true;
            }
        }

        if changed {
            self.events.emit(TimelineEvent::KeyframeModified(new_index));
            self.emit_duration_if_changed(old_duration);
        }
        Some(new_index)
    }

    pub fn set_keyframe_interpolation(&mut self, index: usize, mode: InterpolationMode) -> bool {
        let update = KeyframeUpdate {
            interpolation: Some(mode),
            ..Default::default()
        };
        self.apply_settings_update(index, &update)
    }

    pub fn set_keyframe_easing(&mut self, index: usize, easing: Easing) -> bool {
        let update = KeyframeUpdate {
            easing: Some(easing),
            ..Default::default()
        };
        self.apply_settings_update(index, &update)
    }

    pub fn clear(&mut self) {
        let old_duration = self.total_duration_ms();
        self.keyframes.clear();
        self.selection.clear();
        self.current_index = 0;
        self.events.emit(TimelineEvent::Cleared);
        self.emit_duration_if_changed(old_duration);
    }

    /// Bulk-loads keyframes, replacing the current contents.
    ///
    /// Values are sanitized and sorted; equal times keep their input order.
    pub fn replace_all(&mut self, keyframes: impl IntoIterator<Item = Keyframe>) {
        let old_duration = self.total_duration_ms();
        self.keyframes = keyframes.into_iter().map(Keyframe::sanitized).collect();
        self.selection.clear();
        self.current_index = 0;
        self.sort_by_time();
        self.events.emit(TimelineEvent::Loaded(self.keyframes.len()));
        self.emit_duration_if_changed(old_duration);
    }

    /// Index of the last keyframe with `time_ms <= t`: the segment's "from".
    ///
    /// Times before the first keyframe map to 0; `None` only when empty.
    pub fn keyframe_index_at_time(&self, t: f64) -> Option<usize> {
        if self.keyframes.is_empty() {
            return None;
        }
        let after = self.keyframes.partition_point(|kf| kf.time_ms <= t);
        Some(after.saturating_sub(1))
    }

    /// Segment and normalized progress for timeline time `t`.
    ///
    /// - empty: `None`
    /// - one keyframe: `(0, 0, 0.0)`
    /// - past the last keyframe: `(last, last, 1.0)`
    /// - zero-length segment (equal times): progress 0
    pub fn progress_at_time(&self, t: f64) -> Option<SegmentProgress> {
        let from_index = self.keyframe_index_at_time(t)?;
        let last = self.keyframes.len() - 1;

        if last == 0 {
            return Some(SegmentProgress {
                from_index: 0,
                to_index: 0,
                progress: 0.0,
            });
        }
        if from_index >= last {
            return Some(SegmentProgress {
                from_index: last,
                to_index: last,
                progress: 1.0,
            });
        }

        let to_index = from_index + 1;
        let from = &self.keyframes[from_index];
        let to = &self.keyframes[to_index];
        let span = to.time_ms - from.time_ms;
        let progress = if span > 0.0 {
            let p = (t - from.time_ms) / span;
            if p.is_nan() { 0.0 } else { p.clamp(0.0, 1.0) }
        } else {
            0.0
        };

        Some(SegmentProgress {
            from_index,
            to_index,
            progress,
        })
    }

    /// First keyframe within `tolerance_ms` of `t`.
    pub fn keyframe_near_time(&self, t: f64, tolerance_ms: f64) -> Option<usize> {
        self.keyframes
            .iter()
            .position(|kf| (kf.time_ms - t).abs() <= tolerance_ms)
    }

    pub fn has_keyframe_near_time(&self, t: f64, tolerance_ms: f64) -> bool {
        self.keyframe_near_time(t, tolerance_ms).is_some()
    }

    /// Rounds to this timeline's frame grid.
    pub fn snap_to_frame(&self, t: f64) -> f64 {
        snap_to_frame(t, self.settings.snap_fps)
    }

    pub fn selection(&self) -> &SelectionSet {
        &self.selection
    }

    pub fn selected_indices(&self) -> Vec<usize> {
        self.selection.iter().collect()
    }

    pub fn is_selected(&self, index: usize) -> bool {
        self.selection.contains(index)
    }

    /// Selects one keyframe, replacing the selection unless `add_to_selection`.
    pub fn select_keyframe(&mut self, index: usize, add_to_selection: bool) -> bool {
        if index >= self.keyframes.len() {
            return false;
        }
        if !add_to_selection {
            self.selection.clear();
        }
        self.selection.insert(index);
        self.events.emit(TimelineEvent::SelectionChanged);
        true
    }

    pub fn deselect_keyframe(&mut self, index: usize) -> bool {
        let changed = self.selection.remove(index);
        if changed {
            self.events.emit(TimelineEvent::SelectionChanged);
        }
        changed
    }

    /// Replaces the selection with the inclusive range; bounds may be given
    /// in either order and are clamped to existing keyframes.
    pub fn select_range(&mut self, start: usize, end: usize) {
        let (start, end) = if start <= end { (start, end) } else { (end, start) };
        self.selection.clear();
        if !self.keyframes.is_empty() {
            let end = end.min(self.keyframes.len() - 1);
            for i in start..=end {
                self.selection.insert(i);
            }
        }
        self.events.emit(TimelineEvent::SelectionChanged);
    }

    pub fn select_all(&mut self) {
        if let Some(last) = self.keyframes.len().checked_sub(1) {
            self.select_range(0, last);
        }
    }

    pub fn clear_selection(&mut self) {
        if !self.selection.is_empty() {
            self.selection.clear();
            self.events.emit(TimelineEvent::SelectionChanged);
        }
    }

    /// Shifts every selected keyframe by the same delta.
    ///
    /// The delta is clamped first so the earliest selected keyframe stops at
    /// zero; relative spacing within the selection is preserved. Returns the
    /// delta actually applied.
    pub fn move_selected_keyframes(&mut self, delta_ms: f64) -> f64 {
        let Some(min_time) = self
            .selection
            .iter()
            .filter_map(|i| self.keyframes.get(i))
            .map(|kf| kf.time_ms)
            .reduce(f64::min)
        else {
            return 0.0;
        };
        if !delta_ms.is_finite() {
            return 0.0;
        }

        let delta = delta_ms.max(-min_time);
        if delta == 0.0 {
            return 0.0;
        }

        let old_duration = self.total_duration_ms();
        let fps = self.settings.snap_fps;
        let selected: Vec<usize> = self.selection.iter().collect();
        for i in selected {
            if let Some(kf) = self.keyframes.get_mut(i) {
                kf.time_ms = snap_to_frame(kf.time_ms + delta, fps).max(0.0);
            }
        }
        self.sort_by_time();
        // The selection followed the moved keyframes through the sort.
        let moved: Vec<usize> = self.selection.iter().collect();
        for index in moved {
            self.events.emit(TimelineEvent::KeyframeModified(index));
        }
        self.emit_duration_if_changed(old_duration);
        delta
    }

    fn duplicate_with_time(&mut self, source: Keyframe, time_ms: f64) -> Option<usize> {
        let mut copy = source;
        copy.time_ms = time_ms;
        Some(self.insert_keyframe(copy))
    }

    fn apply_settings_update(&mut self, index: usize, update: &KeyframeUpdate) -> bool {
        let Some(kf) = self.keyframes.get_mut(index) else {
            return false;
        };
        let changed = update.apply_pose_and_modes(kf);
        if changed {
            self.events.emit(TimelineEvent::KeyframeModified(index));
        }
        changed
    }

    fn push_sorted(&mut self, kf: Keyframe) -> usize {
        let old_duration = self.total_duration_ms();
        self.keyframes.push(kf);
        let appended = self.keyframes.len() - 1;
        let index = self.sort_by_time()[appended];
        self.events.emit(TimelineEvent::KeyframeAdded(index));
        self.emit_duration_if_changed(old_duration);
        index
    }

    /// Snapped, non-negative time not occupied by any keyframe except `skip`.
    ///
    /// Occupied frames are resolved by nudging forward one frame at a time.
    fn free_time(&self, time_ms: f64, skip: Option<usize>) -> f64 {
        let fps = self.settings.snap_fps;
        let frame_ms = frame_duration_ms(fps);
        let time_ms = if time_ms.is_nan() { 0.0 } else { time_ms };
        let mut candidate = snap_to_frame(time_ms.max(0.0), fps);

        let occupied = |t: f64| {
            self.keyframes
                .iter()
                .enumerate()
                .any(|(i, kf)| Some(i) != skip && (kf.time_ms - t).abs() < SAME_TIME_EPS_MS)
        };
        // Each step moves past at least one distinct keyframe time.
        for _ in 0..=self.keyframes.len() {
            if !occupied(candidate) {
                break;
            }
            candidate = snap_to_frame(candidate + frame_ms, fps);
        }
        candidate
    }

    /// Stable sort by time. Returns `new_index_of[old_index]`.
    fn sort_by_time(&mut self) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.keyframes.len()).collect();
        order.sort_by(|&a, &b| cmp_time_ms(self.keyframes[a].time_ms, self.keyframes[b].time_ms));

        let mut new_index_of = vec![0; order.len()];
        for (new, &old) in order.iter().enumerate() {
            new_index_of[old] = new;
        }
        if order.iter().enumerate().all(|(new, &old)| new == old) {
            return new_index_of;
        }

        self.keyframes = order.iter().map(|&old| self.keyframes[old]).collect();
        self.selection = self.selection.remap(&new_index_of);
        if let Some(&current) = new_index_of.get(self.current_index) {
            if current != self.current_index {
                self.current_index = current;
                self.events.emit(TimelineEvent::CurrentIndexChanged(current));
            }
        }
        self.events.emit(TimelineEvent::Reordered);
        new_index_of
    }

    fn emit_duration_if_changed(&mut self, old_duration: f64) {
        let duration = self.total_duration_ms();
        if duration != old_duration {
            self.events.emit(TimelineEvent::DurationChanged(duration));
        }
    }
}

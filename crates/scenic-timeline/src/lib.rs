// SPDX-License-Identifier: Apache-2.0
//! Precomputed animation timelines.
//!
//! A [`Timeline`] is an ordered collection of frames plus descriptive
//! markers, built incrementally (programmatic [`Timeline::add_frame`], the
//! [`Timeline::from_function`] sampler, or a fixed-grid [`Recorder`]) and
//! serialized once into the `load_animation` payload. After the renderer
//! accepts that payload it owns playback entirely; the producer can discard
//! its local copy.
//!
//! # Frame ordering
//!
//! `add_frame` preserves frames in the order given, even when their times
//! are not monotonic; ad hoc construction is the caller's responsibility.
//! The fixed-grid paths ([`Timeline::from_function`], [`Recorder`]) always
//! produce non-decreasing times.

use std::collections::BTreeMap;

use scenic_proto::{
    AnimationPayload, FramePayload, MarkerPayload, Matrix4, PackedRgb, TransformInput,
    DEFAULT_MARKER_COLOR,
};

/// Per-object state for one frame, before normalization.
///
/// Transforms are accepted in either input form and collapsed to canonical
/// matrices when the frame is appended.
#[derive(Debug, Clone, Default)]
pub struct FrameContent {
    transforms: BTreeMap<String, TransformInput>,
    colors: BTreeMap<String, PackedRgb>,
    visibility: BTreeMap<String, bool>,
    opacity: BTreeMap<String, f32>,
}

impl FrameContent {
    /// Empty frame content.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an object's transform for this frame.
    pub fn transform(mut self, name: impl Into<String>, t: impl Into<TransformInput>) -> Self {
        self.transforms.insert(name.into(), t.into());
        self
    }

    /// Set an object's uniform color for this frame.
    pub fn color(mut self, name: impl Into<String>, color: PackedRgb) -> Self {
        self.colors.insert(name.into(), color);
        self
    }

    /// Set an object's visibility for this frame.
    pub fn visible(mut self, name: impl Into<String>, visible: bool) -> Self {
        self.visibility.insert(name.into(), visible);
        self
    }

    /// Set an object's opacity for this frame.
    pub fn opacity(mut self, name: impl Into<String>, opacity: f32) -> Self {
        self.opacity.insert(name.into(), opacity);
        self
    }

    fn into_payload(self, time: f64) -> FramePayload {
        let transforms: BTreeMap<String, Matrix4> = self
            .transforms
            .into_iter()
            .map(|(name, t)| (name, t.to_matrix()))
            .collect();
        FramePayload {
            time,
            transforms,
            colors: self.colors,
            visibility: self.visibility,
            opacity: self.opacity,
        }
    }
}

/// An in-memory, ordered collection of frames and markers.
#[derive(Debug, Clone, Default)]
pub struct Timeline {
    looped: bool,
    frames: Vec<FramePayload>,
    markers: Vec<MarkerPayload>,
}

impl Timeline {
    /// Empty timeline.
    pub fn new(looped: bool) -> Self {
        Self {
            looped,
            ..Self::default()
        }
    }

    /// Append a frame at an absolute time in seconds.
    ///
    /// Frames are immutable once appended and kept in insertion order.
    pub fn add_frame(&mut self, time: f64, content: FrameContent) {
        self.frames.push(content.into_payload(time));
    }

    /// Append a marker with the default color.
    pub fn add_marker(&mut self, time: f64, label: impl Into<String>) {
        self.add_marker_colored(time, label, DEFAULT_MARKER_COLOR);
    }

    /// Append a marker with an explicit color.
    pub fn add_marker_colored(&mut self, time: f64, label: impl Into<String>, color: PackedRgb) {
        self.markers.push(MarkerPayload {
            time,
            label: label.into(),
            color,
        });
    }

    /// Number of frames.
    pub fn n_frames(&self) -> usize {
        self.frames.len()
    }

    /// Whether playback wraps around at the end.
    pub fn looped(&self) -> bool {
        self.looped
    }

    /// The last frame's time in seconds, `0.0` when empty.
    pub fn duration(&self) -> f64 {
        self.frames.last().map_or(0.0, |f| f.time)
    }

    /// Frame rate estimated from the spacing of the first two frames,
    /// `0.0` with fewer than two frames or non-increasing leading times.
    pub fn fps(&self) -> f64 {
        match self.frames.as_slice() {
            [first, second, ..] if second.time > first.time => 1.0 / (second.time - first.time),
            _ => 0.0,
        }
    }

    /// Frames in playback order.
    pub fn frames(&self) -> &[FramePayload] {
        &self.frames
    }

    /// Markers in insertion order.
    pub fn markers(&self) -> &[MarkerPayload] {
        &self.markers
    }

    /// Build a timeline by sampling `f` on the grid `0, 1/fps, … < duration`.
    pub fn from_function(
        mut f: impl FnMut(f64) -> FrameContent,
        duration: f64,
        fps: u32,
        looped: bool,
    ) -> Self {
        let mut timeline = Self::new(looped);
        for t in sample_times(duration, fps) {
            let content = f(t);
            timeline.add_frame(t, content);
        }
        timeline
    }

    /// Start a scoped recording over the same fixed grid as
    /// [`Timeline::from_function`]. The recorded timeline loops.
    pub fn record(duration: f64, fps: u32) -> Recorder {
        Recorder::new(duration, fps)
    }

    /// Serialize into the `load_animation` wire payload.
    pub fn to_payload(&self) -> AnimationPayload {
        AnimationPayload {
            looped: self.looped,
            duration: self.duration(),
            frames: self.frames.clone(),
            markers: self.markers.clone(),
        }
    }

    /// Consume the timeline into the `load_animation` wire payload.
    pub fn into_payload(self) -> AnimationPayload {
        AnimationPayload {
            looped: self.looped,
            duration: self.frames.last().map_or(0.0, |f| f.time),
            frames: self.frames,
            markers: self.markers,
        }
    }
}

/// Scoped recorder bound to a fixed time grid.
///
/// The recorder is an explicit acquire/release pair: acquire with
/// [`Timeline::record`], iterate [`Recorder::times`] appending one frame
/// per sample, release with [`Recorder::finish`]. Frames recorded before
/// an early exit are preserved: finishing (or inspecting
/// [`Recorder::timeline`]) after a partial loop yields the partial
/// timeline, never nothing.
#[derive(Debug, Clone)]
pub struct Recorder {
    times: Vec<f64>,
    fps: u32,
    cursor: usize,
    timeline: Timeline,
}

impl Recorder {
    /// Recorder over the grid `0, 1/fps, … < duration`.
    pub fn new(duration: f64, fps: u32) -> Self {
        Self {
            times: sample_times(duration, fps),
            fps,
            cursor: 0,
            timeline: Timeline::new(true),
        }
    }

    /// The precomputed sample times, for the caller to iterate.
    pub fn times(&self) -> &[f64] {
        &self.times
    }

    /// Append a frame at the current grid time and advance the cursor.
    ///
    /// Calls beyond the precomputed grid continue on the same spacing, so
    /// recorded times stay non-decreasing no matter how long the caller
    /// iterates.
    pub fn add_frame(&mut self, content: FrameContent) {
        let time = self
            .times
            .get(self.cursor)
            .copied()
            .unwrap_or_else(|| grid_time(self.cursor, self.fps));
        self.timeline.add_frame(time, content);
        self.cursor += 1;
    }

    /// Append a marker to the recorded timeline.
    pub fn add_marker(&mut self, time: f64, label: impl Into<String>) {
        self.timeline.add_marker(time, label);
    }

    /// The timeline recorded so far.
    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    /// Finalize, yielding the recorded timeline.
    pub fn finish(self) -> Timeline {
        self.timeline
    }
}

/// The fixed sample grid `0, 1/fps, 2/fps, … < duration`.
fn sample_times(duration: f64, fps: u32) -> Vec<f64> {
    if fps == 0 || !duration.is_finite() || duration <= 0.0 {
        return Vec::new();
    }
    let n = (duration * f64::from(fps)).round() as usize;
    (0..n).map(|i| grid_time(i, fps)).collect()
}

fn grid_time(index: usize, fps: u32) -> f64 {
    index as f64 / f64::from(fps)
}

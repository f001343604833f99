// SPDX-License-Identifier: Apache-2.0
//! The `load_animation` payload: a complete precomputed timeline.
//!
//! The whole timeline is serialized into one message; after the renderer
//! accepts it, playback runs autonomously with no further producer
//! involvement until `stop_animation` or a replacement timeline arrives.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{Matrix4, PackedRgb};

/// Marker color used when a caller does not pick one.
pub const DEFAULT_MARKER_COLOR: PackedRgb = 0x888888;

/// One timestamped snapshot of many objects' state.
///
/// Frames are immutable once appended to a timeline. Only `transforms` is
/// mandatory; the optional maps are omitted from the wire when empty.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FramePayload {
    /// Absolute time of this frame in seconds.
    pub time: f64,
    /// Canonical transform per object name.
    pub transforms: BTreeMap<String, Matrix4>,
    /// Uniform color per object name.
    #[serde(skip_serializing_if = "BTreeMap::is_empty", default)]
    pub colors: BTreeMap<String, PackedRgb>,
    /// Visibility flag per object name.
    #[serde(skip_serializing_if = "BTreeMap::is_empty", default)]
    pub visibility: BTreeMap<String, bool>,
    /// Opacity in `[0, 1]` per object name.
    #[serde(skip_serializing_if = "BTreeMap::is_empty", default)]
    pub opacity: BTreeMap<String, f32>,
}

/// A labeled timestamp annotation on the timeline UI.
///
/// Markers are descriptive only and never affect object state; they need
/// not align with any frame time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MarkerPayload {
    /// Absolute time of the marker in seconds.
    pub time: f64,
    /// Label shown on the timeline.
    pub label: String,
    /// Packed 24-bit RGB marker color.
    pub color: PackedRgb,
}

/// The single wire payload consumed whole by the renderer's playback loop.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AnimationPayload {
    /// Whether playback wraps around at the end.
    #[serde(rename = "loop")]
    pub looped: bool,
    /// Total duration in seconds (the last frame's time).
    pub duration: f64,
    /// Frames in playback order.
    pub frames: Vec<FramePayload>,
    /// Timeline markers.
    pub markers: Vec<MarkerPayload>,
}

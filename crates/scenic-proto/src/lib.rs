// SPDX-License-Identifier: Apache-2.0
//! Wire schema for the scenic viewer protocol.
//!
//! A producer process authors a 3D scene in a remote renderer by sending
//! JSON commands (declare objects, batch-update transforms, load a
//! precomputed animation) interleaved with out-of-band binary payload
//! frames for large numeric arrays. Both travel in the deterministic
//! packet framing defined in [`wire`].
//!
//! This crate holds the schema only: command and payload types, the
//! canonical transform representation, and the framing codec. Policy
//! (registries, validation, colormap resolution) lives in `scenic-client`.

use serde::{Deserialize, Serialize};

mod animation;
mod command;
mod transform;
pub mod wire;

pub use animation::{AnimationPayload, FramePayload, MarkerPayload, DEFAULT_MARKER_COLOR};
pub use command::{Command, Shape, UpdateEntry};
pub use transform::{Matrix4, Rotation, TransformInput, IDENTITY_MATRIX};

/// Identifier pairing a JSON command with its out-of-band binary frame.
pub type RefId = u64;

/// Packed 24-bit RGB color (`0xRRGGBB`), the single-color wire form.
pub type PackedRgb = u32;

/// Pack unit-range RGB components into a [`PackedRgb`].
///
/// Components are clamped to `[0, 1]` first, so colormap output can be
/// packed directly.
pub fn pack_rgb(rgb: [f32; 3]) -> PackedRgb {
    let quantize = |c: f32| -> u32 {
        let c = if c.is_finite() { c.clamp(0.0, 1.0) } else { 0.0 };
        (c * 255.0).round() as u32
    };
    (quantize(rgb[0]) << 16) | (quantize(rgb[1]) << 8) | quantize(rgb[2])
}

/// Unpack a [`PackedRgb`] into unit-range RGB components.
pub fn unpack_rgb(color: PackedRgb) -> [f32; 3] {
    [
        ((color >> 16) & 0xFF) as f32 / 255.0,
        ((color >> 8) & 0xFF) as f32 / 255.0,
        (color & 0xFF) as f32 / 255.0,
    ]
}

/// How an object's color is carried on the wire.
///
/// Colors are always pre-resolved RGB by the time they reach this type;
/// raw scalar + colormap + range tuples never cross the wire.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ColorMode {
    /// One packed RGB color for the whole object.
    Uniform {
        /// Packed 24-bit RGB.
        color: PackedRgb,
    },
    /// Pre-resolved per-element RGB triples embedded in the command.
    Array {
        /// One RGB triple per element, components in `[0, 1]`.
        rgb: Vec<[f32; 3]>,
    },
    /// Pre-resolved per-element RGB triples routed through the binary
    /// channel (used when the array is as large as the geometry itself).
    Ref {
        /// Reference id of the binary frame carrying the RGB triples.
        colors_ref: RefId,
    },
}

/// Severity/kind of a renderer-originated event.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// A command was applied.
    Ack,
    /// Informational message.
    Info,
    /// Something degraded but the renderer continues.
    Warn,
    /// A command was rejected or playback failed.
    Error,
}

/// Event sent by the renderer back to the producer.
///
/// Events are advisory; the producer never needs one to make progress.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RendererEvent {
    /// Event severity/kind.
    pub kind: EventKind,
    /// Human readable message.
    pub message: String,
}

// SPDX-License-Identifier: Apache-2.0
//! Producer → renderer command set.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{AnimationPayload, ColorMode, Matrix4, PackedRgb, RefId};

/// Renderer-native primitive shapes, described by parametric dimensions.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Shape {
    /// Axis-aligned box.
    Box {
        /// Extent along X.
        width: f32,
        /// Extent along Y.
        height: f32,
        /// Extent along Z.
        depth: f32,
    },
    /// Sphere.
    Sphere {
        /// Radius.
        radius: f32,
    },
    /// Cylinder, optionally tapered (a zero top radius makes a cone).
    Cylinder {
        /// Radius at the top cap.
        radius_top: f32,
        /// Radius at the bottom cap.
        radius_bottom: f32,
        /// Height along the axis.
        height: f32,
    },
    /// Capsule (cylinder with hemispherical caps).
    Capsule {
        /// Cap and body radius.
        radius: f32,
        /// Length of the cylindrical section.
        length: f32,
    },
}

/// One object's entry in a `batch_update` message.
///
/// Absent fields leave the corresponding renderer state untouched, so the
/// hot path only carries what actually changed this frame.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct UpdateEntry {
    /// New canonical transform.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub matrix: Option<Matrix4>,
    /// New uniform color.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub color: Option<PackedRgb>,
    /// New visibility flag.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub visible: Option<bool>,
    /// New opacity in `[0, 1]`.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub opacity: Option<f32>,
}

impl UpdateEntry {
    /// Whether the entry carries no change at all.
    pub fn is_empty(&self) -> bool {
        self.matrix.is_none()
            && self.color.is_none()
            && self.visible.is_none()
            && self.opacity.is_none()
    }
}

/// Wire command kinds carried in `KIND=command` packets.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum Command {
    /// Declare (or redeclare) a parametric primitive.
    DeclarePrimitive {
        /// Unique object name.
        name: String,
        /// Parametric shape description.
        shape: Shape,
        /// Pre-resolved color.
        color: ColorMode,
        /// Initial canonical transform.
        matrix: Matrix4,
    },
    /// Declare (or redeclare) a polyline whose points travel out-of-band.
    DeclarePolyline {
        /// Unique object name.
        name: String,
        /// Number of points in the binary frame.
        point_count: u32,
        /// Reference id of the binary frame carrying the points.
        points_ref: RefId,
        /// Pre-resolved color (uniform, or per-point via a second ref).
        color: ColorMode,
        /// Line width in pixels.
        line_width: f32,
    },
    /// Declare (or redeclare) a mesh model whose bytes travel out-of-band.
    DeclareModel {
        /// Unique object name.
        name: String,
        /// Declared blob format tag (e.g. `"obj"`); parsing is the
        /// renderer's concern.
        format: String,
        /// Reference id of the binary frame carrying the blob.
        blob_ref: RefId,
    },
    /// Mutate many already-declared objects in one round trip. The
    /// real-time streaming hot path; carries no declaration side effects.
    BatchUpdate {
        /// Per-object state changes, keyed by object name.
        updates: BTreeMap<String, UpdateEntry>,
    },
    /// Set one object's uniform color.
    SetColor {
        /// Target object name.
        name: String,
        /// Packed 24-bit RGB.
        color: PackedRgb,
    },
    /// Remove every object and reset renderer-side state.
    Clear,
    /// Hand a complete precomputed timeline to the renderer, which plays
    /// it back autonomously until stopped or replaced.
    LoadAnimation {
        /// The full timeline payload.
        animation: AnimationPayload,
    },
    /// Stop autonomous playback and return the renderer to live updates.
    StopAnimation,
}

impl Command {
    /// Canonical command-kind string for this variant (the wire tag).
    pub fn kind(&self) -> &'static str {
        match self {
            Command::DeclarePrimitive { .. } => "declare_primitive",
            Command::DeclarePolyline { .. } => "declare_polyline",
            Command::DeclareModel { .. } => "declare_model",
            Command::BatchUpdate { .. } => "batch_update",
            Command::SetColor { .. } => "set_color",
            Command::Clear => "clear",
            Command::LoadAnimation { .. } => "load_animation",
            Command::StopAnimation => "stop_animation",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::IDENTITY_MATRIX;

    #[test]
    fn command_tag_matches_kind_string() {
        let commands = vec![
            Command::DeclarePrimitive {
                name: "ground".into(),
                shape: Shape::Box {
                    width: 10.0,
                    height: 10.0,
                    depth: 0.05,
                },
                color: ColorMode::Uniform { color: 0x444444 },
                matrix: IDENTITY_MATRIX,
            },
            Command::SetColor {
                name: "ground".into(),
                color: 0xFFAA00,
            },
            Command::Clear,
            Command::StopAnimation,
        ];
        for cmd in commands {
            let value = serde_json::to_value(&cmd).unwrap();
            assert_eq!(value["cmd"], cmd.kind());
        }
    }

    #[test]
    fn batch_update_roundtrips_through_json() {
        let mut updates = BTreeMap::new();
        updates.insert(
            "sphere_0".to_string(),
            UpdateEntry {
                matrix: Some(IDENTITY_MATRIX),
                color: Some(0x00FF00),
                visible: Some(true),
                opacity: Some(0.5),
            },
        );
        updates.insert(
            "sphere_1".to_string(),
            UpdateEntry {
                opacity: Some(0.25),
                ..UpdateEntry::default()
            },
        );
        let cmd = Command::BatchUpdate { updates };
        let bytes = serde_json::to_vec(&cmd).unwrap();
        let back: Command = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(back, cmd);
    }

    #[test]
    fn absent_update_fields_are_omitted_from_the_wire() {
        let entry = UpdateEntry {
            opacity: Some(1.0),
            ..UpdateEntry::default()
        };
        let value = serde_json::to_value(&entry).unwrap();
        let obj = value.as_object().unwrap();
        assert_eq!(obj.len(), 1);
        assert!(obj.contains_key("opacity"));
    }

    #[test]
    fn empty_entry_reports_empty() {
        assert!(UpdateEntry::default().is_empty());
        assert!(!UpdateEntry {
            visible: Some(false),
            ..UpdateEntry::default()
        }
        .is_empty());
    }

    #[test]
    fn shape_tags_are_snake_case() {
        let shape = Shape::Cylinder {
            radius_top: 0.0,
            radius_bottom: 0.5,
            height: 2.0,
        };
        let value = serde_json::to_value(shape).unwrap();
        assert_eq!(value["kind"], "cylinder");
        assert_eq!(value["radius_top"], 0.0);
    }
}

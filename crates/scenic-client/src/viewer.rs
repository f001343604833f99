// SPDX-License-Identifier: Apache-2.0
//! The command encoder: authoring calls in, framed packets out.

use std::collections::BTreeMap;
use std::path::Path;

use tracing::{debug, warn};

use scenic_proto::wire::{self, BinaryFrame};
use scenic_proto::{
    ColorMode, Command, PackedRgb, RefId, RendererEvent, Shape, TransformInput, UpdateEntry,
};
use scenic_timeline::Timeline;

use crate::registry::{ObjectKind, ObjectRegistry};
use crate::transport::{default_endpoint, TcpTransport, Transport};
use crate::ClientError;

/// Delivery mode of a connected session.
///
/// `load_animation` moves the session into `Animating`; `stop_animation`
/// returns it to `Idle`; sending a batch update enters `Streaming`
/// implicitly. `clear` never changes the state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SessionState {
    /// Connected, nothing being driven.
    #[default]
    Idle,
    /// Producer is pushing per-frame state in real time.
    Streaming,
    /// Renderer is playing back a loaded timeline autonomously.
    Animating,
}

/// Color specification for a polyline.
#[derive(Debug, Clone)]
pub enum LineColor {
    /// One packed RGB color for the whole line.
    Uniform(PackedRgb),
    /// Per-point scalars resolved through a colormap producer-side.
    Mapped {
        /// One scalar per point.
        values: Vec<f32>,
        /// Colormap name; unknown names fall back to viridis.
        colormap: String,
        /// `(cmin, cmax)`; defaults to the observed min/max of `values`.
        range: Option<(f32, f32)>,
    },
}

/// Styling for a polyline declaration.
#[derive(Debug, Clone)]
pub struct PolylineStyle {
    /// Line color.
    pub color: LineColor,
    /// Line width in pixels.
    pub line_width: f32,
}

impl PolylineStyle {
    /// Uniform color at the default width.
    pub fn uniform(color: PackedRgb) -> Self {
        Self {
            color: LineColor::Uniform(color),
            line_width: 2.0,
        }
    }

    /// Scalar-mapped color at the default width, range auto-derived.
    pub fn mapped(values: Vec<f32>, colormap: impl Into<String>) -> Self {
        Self {
            color: LineColor::Mapped {
                values,
                colormap: colormap.into(),
                range: None,
            },
            line_width: 2.0,
        }
    }

    /// Pin the scalar range instead of deriving it from the data.
    pub fn with_range(mut self, cmin: f32, cmax: f32) -> Self {
        if let LineColor::Mapped { range, .. } = &mut self.color {
            *range = Some((cmin, cmax));
        }
        self
    }

    /// Set the line width.
    pub fn with_width(mut self, line_width: f32) -> Self {
        self.line_width = line_width;
        self
    }
}

/// One object's change in a batch update, before normalization.
#[derive(Debug, Clone, Default)]
pub struct Update {
    /// New transform in either input form.
    pub transform: Option<TransformInput>,
    /// New uniform color.
    pub color: Option<PackedRgb>,
    /// New visibility flag.
    pub visible: Option<bool>,
    /// New opacity in `[0, 1]`.
    pub opacity: Option<f32>,
}

impl Update {
    /// Transform-only update.
    pub fn transform(t: impl Into<TransformInput>) -> Self {
        Self {
            transform: Some(t.into()),
            ..Self::default()
        }
    }

    /// Translation-only update, the common streaming case.
    pub fn at(position: [f32; 3]) -> Self {
        Self::transform(TransformInput::at(position))
    }

    /// Add a color change.
    pub fn with_color(mut self, color: PackedRgb) -> Self {
        self.color = Some(color);
        self
    }

    /// Add a visibility change.
    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = Some(visible);
        self
    }

    /// Add an opacity change.
    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = Some(opacity);
        self
    }
}

/// Producer-side viewer handle: validates authoring calls, resolves
/// colors, and encodes protocol messages onto a [`Transport`].
///
/// One `Viewer` is one session. Construct it explicitly and pass it
/// wherever authoring happens; there is no process-wide implicit handle.
#[derive(Debug)]
pub struct Viewer<T: Transport> {
    transport: T,
    registry: ObjectRegistry,
    next_ref: RefId,
    state: SessionState,
}

impl Viewer<TcpTransport> {
    /// Connect to the default viewer endpoint.
    pub fn connect() -> Result<Self, ClientError> {
        Self::connect_to(default_endpoint())
    }

    /// Connect to an explicit viewer endpoint.
    pub fn connect_to(addr: impl std::net::ToSocketAddrs) -> Result<Self, ClientError> {
        let transport = TcpTransport::connect(addr).map_err(ClientError::Transport)?;
        Ok(Self::with_transport(transport))
    }
}

impl<T: Transport> Viewer<T> {
    /// Wrap an already-connected transport.
    pub fn with_transport(transport: T) -> Self {
        Self {
            transport,
            registry: ObjectRegistry::new(),
            next_ref: 0,
            state: SessionState::default(),
        }
    }

    /// Current delivery mode.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// The registry of declared objects.
    pub fn registry(&self) -> &ObjectRegistry {
        &self.registry
    }

    /// Borrow the underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Drain renderer events received so far.
    pub fn poll_events(&mut self) -> Vec<RendererEvent> {
        self.transport.poll_events()
    }

    /// Close the session.
    pub fn disconnect(mut self) {
        self.transport.close();
    }

    fn alloc_ref(&mut self) -> RefId {
        let id = self.next_ref;
        self.next_ref += 1;
        id
    }

    fn send_command(&mut self, cmd: &Command) -> Result<(), ClientError> {
        debug!(cmd = cmd.kind(), "send command");
        let packet = wire::encode_command(cmd)?;
        self.transport
            .send_packet(&packet)
            .map_err(ClientError::Transport)
    }

    fn send_frame(&mut self, frame: &BinaryFrame) -> Result<(), ClientError> {
        let packet = frame.encode()?;
        self.transport
            .send_packet(&packet)
            .map_err(ClientError::Transport)
    }

    /// Declare a parametric primitive with a uniform color.
    pub fn add_primitive(
        &mut self,
        name: &str,
        shape: Shape,
        color: PackedRgb,
        at: TransformInput,
    ) -> Result<(), ClientError> {
        self.declare_primitive(name, shape, ColorMode::Uniform { color }, at)
    }

    /// Declare a parametric primitive colored by per-element scalars.
    ///
    /// Scalars are resolved through the colormap engine here and the
    /// resulting RGB array is embedded in the command; the renderer never
    /// computes colormaps. The array must match the geometry the shape
    /// implies 1:1, which only the renderer can ultimately check.
    pub fn add_primitive_mapped(
        &mut self,
        name: &str,
        shape: Shape,
        scalars: &[f32],
        colormap: &str,
        range: Option<(f32, f32)>,
        at: TransformInput,
    ) -> Result<(), ClientError> {
        if scalars.is_empty() {
            return Err(ClientError::MalformedPayload(
                "scalar color array is empty".into(),
            ));
        }
        let (cmin, cmax) = range.unwrap_or_else(|| scenic_colormap::auto_range(scalars));
        let rgb = scenic_colormap::apply(scalars, colormap, cmin, cmax);
        self.declare_primitive(name, shape, ColorMode::Array { rgb }, at)
    }

    fn declare_primitive(
        &mut self,
        name: &str,
        shape: Shape,
        color: ColorMode,
        at: TransformInput,
    ) -> Result<(), ClientError> {
        let matrix = at.to_matrix();
        self.send_command(&Command::DeclarePrimitive {
            name: name.to_string(),
            shape,
            color,
            matrix,
        })?;
        self.registry.declare(name, ObjectKind::Primitive);
        self.registry.note_transform(name, matrix);
        Ok(())
    }

    /// Declare a box primitive.
    pub fn add_box(
        &mut self,
        name: &str,
        width: f32,
        height: f32,
        depth: f32,
        color: PackedRgb,
        at: TransformInput,
    ) -> Result<(), ClientError> {
        self.add_primitive(
            name,
            Shape::Box {
                width,
                height,
                depth,
            },
            color,
            at,
        )
    }

    /// Declare a sphere primitive.
    pub fn add_sphere(
        &mut self,
        name: &str,
        radius: f32,
        color: PackedRgb,
        at: TransformInput,
    ) -> Result<(), ClientError> {
        self.add_primitive(name, Shape::Sphere { radius }, color, at)
    }

    /// Declare a cylinder primitive (zero top radius makes a cone).
    pub fn add_cylinder(
        &mut self,
        name: &str,
        radius_top: f32,
        radius_bottom: f32,
        height: f32,
        color: PackedRgb,
        at: TransformInput,
    ) -> Result<(), ClientError> {
        self.add_primitive(
            name,
            Shape::Cylinder {
                radius_top,
                radius_bottom,
                height,
            },
            color,
            at,
        )
    }

    /// Declare a capsule primitive.
    pub fn add_capsule(
        &mut self,
        name: &str,
        radius: f32,
        length: f32,
        color: PackedRgb,
        at: TransformInput,
    ) -> Result<(), ClientError> {
        self.add_primitive(name, Shape::Capsule { radius, length }, color, at)
    }

    /// Declare a polyline. Point data (and per-point colors, when mapped)
    /// travel out-of-band through the binary channel.
    ///
    /// Fails with [`ClientError::MalformedPayload`] when fewer than two
    /// points are given or a scalar color array does not match the point
    /// count. Rejection happens before anything reaches the transport.
    pub fn add_polyline(
        &mut self,
        name: &str,
        points: &[[f32; 3]],
        style: PolylineStyle,
    ) -> Result<(), ClientError> {
        if points.len() < 2 {
            return Err(ClientError::MalformedPayload(format!(
                "polyline {name:?} needs at least 2 points, got {}",
                points.len()
            )));
        }

        // Resolve colors fully before allocating refs or sending anything,
        // so a malformed payload leaves no partial traffic behind.
        let (color, color_frame) = match style.color {
            LineColor::Uniform(color) => (ColorMode::Uniform { color }, None),
            LineColor::Mapped {
                values,
                colormap,
                range,
            } => {
                if values.len() != points.len() {
                    return Err(ClientError::MalformedPayload(format!(
                        "polyline {name:?} has {} points but {} color scalars",
                        points.len(),
                        values.len()
                    )));
                }
                let (cmin, cmax) = range.unwrap_or_else(|| scenic_colormap::auto_range(&values));
                let rgb = scenic_colormap::apply(&values, &colormap, cmin, cmax);
                let colors_ref = self.alloc_ref();
                (
                    ColorMode::Ref { colors_ref },
                    Some(BinaryFrame::from_triples(colors_ref, &rgb)),
                )
            }
        };

        let points_ref = self.alloc_ref();
        self.send_command(&Command::DeclarePolyline {
            name: name.to_string(),
            point_count: points.len() as u32,
            points_ref,
            color,
            line_width: style.line_width,
        })?;
        self.send_frame(&BinaryFrame::from_triples(points_ref, points))?;
        if let Some(frame) = color_frame {
            self.send_frame(&frame)?;
        }
        self.registry.declare(name, ObjectKind::Polyline);
        Ok(())
    }

    /// Declare a mesh model from a file on disk.
    ///
    /// The blob is opaque to the client; parsing happens renderer-side
    /// based on the declared format tag.
    pub fn add_model_file(
        &mut self,
        name: &str,
        path: &Path,
        format: &str,
    ) -> Result<(), ClientError> {
        let bytes = std::fs::read(path).map_err(|source| ClientError::ModelRead {
            path: path.to_path_buf(),
            source,
        })?;
        self.add_model_bytes(name, bytes, format)
    }

    /// Declare a mesh model from in-memory bytes.
    pub fn add_model_bytes(
        &mut self,
        name: &str,
        bytes: Vec<u8>,
        format: &str,
    ) -> Result<(), ClientError> {
        let blob_ref = self.alloc_ref();
        self.send_command(&Command::DeclareModel {
            name: name.to_string(),
            format: format.to_string(),
            blob_ref,
        })?;
        self.send_frame(&BinaryFrame::from_blob(blob_ref, bytes))?;
        self.registry.declare(name, ObjectKind::Model);
        Ok(())
    }

    /// Mutate many already-declared objects in one round trip.
    ///
    /// The real-time streaming hot path. Entries naming undeclared
    /// objects are logged and skipped, so one bad key never aborts the
    /// batch, and a skipped entry mutates nothing. Returns the number of
    /// entries applied; nothing is sent when every entry was skipped.
    pub fn batch_update(
        &mut self,
        updates: impl IntoIterator<Item = (String, Update)>,
    ) -> Result<usize, ClientError> {
        let mut wire_updates: BTreeMap<String, UpdateEntry> = BTreeMap::new();
        for (name, update) in updates {
            if !self.registry.exists(&name) {
                warn!(%name, "skipping batch entry for undeclared object");
                continue;
            }
            let matrix = update.transform.as_ref().map(TransformInput::to_matrix);
            if let Some(m) = matrix {
                self.registry.note_transform(&name, m);
            }
            wire_updates.insert(
                name,
                UpdateEntry {
                    matrix,
                    color: update.color,
                    visible: update.visible,
                    opacity: update.opacity,
                },
            );
        }

        let applied = wire_updates.len();
        if applied > 0 {
            self.send_command(&Command::BatchUpdate {
                updates: wire_updates,
            })?;
            self.state = SessionState::Streaming;
        }
        Ok(applied)
    }

    /// Set one object's uniform color.
    ///
    /// Unlike batch entries, a single-target update against an undeclared
    /// name fails with [`ClientError::UnknownObject`].
    pub fn set_color(&mut self, name: &str, color: PackedRgb) -> Result<(), ClientError> {
        if !self.registry.exists(name) {
            return Err(ClientError::UnknownObject(name.to_string()));
        }
        self.send_command(&Command::SetColor {
            name: name.to_string(),
            color,
        })
    }

    /// Remove every object and reset the registry.
    ///
    /// Valid in any state and does not change the delivery mode.
    pub fn clear(&mut self) -> Result<(), ClientError> {
        self.send_command(&Command::Clear)?;
        self.registry.clear_all();
        Ok(())
    }

    /// Hand a complete timeline to the renderer as one atomic payload.
    ///
    /// There is no partial failure: either the whole timeline is accepted
    /// or the call fails. Afterwards the renderer owns playback and the
    /// producer may discard its copy of the timeline.
    pub fn load_animation(&mut self, timeline: &Timeline) -> Result<(), ClientError> {
        self.send_command(&Command::LoadAnimation {
            animation: timeline.to_payload(),
        })?;
        self.state = SessionState::Animating;
        Ok(())
    }

    /// Stop autonomous playback.
    pub fn stop_animation(&mut self) -> Result<(), ClientError> {
        self.send_command(&Command::StopAnimation)?;
        self.state = SessionState::Idle;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::RecordingTransport;
    use scenic_proto::wire::PacketKind;
    use scenic_timeline::FrameContent;

    fn viewer() -> Viewer<RecordingTransport> {
        Viewer::with_transport(RecordingTransport::new())
    }

    #[test]
    fn declares_register_and_reach_the_wire() {
        let mut v = viewer();
        v.add_sphere("sun", 1.0, 0xFFDD00, TransformInput::at([0.0, 0.0, 0.0]))
            .unwrap();
        assert_eq!(v.registry().kind_of("sun"), Some(ObjectKind::Primitive));
        let commands = v.transport().commands();
        assert_eq!(commands.len(), 1);
        match &commands[0] {
            Command::DeclarePrimitive { name, shape, .. } => {
                assert_eq!(name, "sun");
                assert_eq!(*shape, Shape::Sphere { radius: 1.0 });
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn batch_update_skips_unknown_names_without_raising() {
        let mut v = viewer();
        v.add_sphere("a", 0.5, 0xFF0000, TransformInput::at([1.0, 0.0, 0.0]))
            .unwrap();
        let before = v.registry().record("a").unwrap().last_transform;

        let applied = v
            .batch_update([("b".to_string(), Update::at([9.0, 9.0, 9.0]))])
            .unwrap();
        assert_eq!(applied, 0);
        // Nothing was sent and "a" was not touched by the attempted "b" entry.
        assert_eq!(v.transport().commands().len(), 1);
        assert_eq!(v.registry().record("a").unwrap().last_transform, before);
        assert_eq!(v.state(), SessionState::Idle);
    }

    #[test]
    fn batch_update_applies_known_entries_and_streams() {
        let mut v = viewer();
        v.add_sphere("a", 0.5, 0xFF0000, TransformInput::at([0.0, 0.0, 0.0]))
            .unwrap();
        let applied = v
            .batch_update([
                ("a".to_string(), Update::at([2.0, 0.0, 0.0]).with_opacity(0.5)),
                ("ghost".to_string(), Update::at([0.0, 0.0, 0.0])),
            ])
            .unwrap();
        assert_eq!(applied, 1);
        assert_eq!(v.state(), SessionState::Streaming);

        let last = v.registry().record("a").unwrap().last_transform.unwrap();
        assert_eq!(&last[12..15], &[2.0, 0.0, 0.0]);

        let commands = v.transport().commands();
        match commands.last().unwrap() {
            Command::BatchUpdate { updates } => {
                assert_eq!(updates.len(), 1);
                assert!(updates.contains_key("a"));
                assert_eq!(updates["a"].opacity, Some(0.5));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn redeclaring_a_name_replaces_its_kind() {
        let mut v = viewer();
        v.add_sphere("a", 0.5, 0xFF0000, TransformInput::default())
            .unwrap();
        v.add_polyline(
            "a",
            &[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0]],
            PolylineStyle::uniform(0xFFFFFF),
        )
        .unwrap();
        assert_eq!(v.registry().kind_of("a"), Some(ObjectKind::Polyline));
    }

    #[test]
    fn polyline_rejects_too_few_points_before_sending() {
        let mut v = viewer();
        let err = v
            .add_polyline("line", &[[0.0; 3]], PolylineStyle::uniform(0xFFFFFF))
            .unwrap_err();
        assert!(matches!(err, ClientError::MalformedPayload(_)));
        assert!(v.transport().packets.is_empty());
        assert!(!v.registry().exists("line"));
    }

    #[test]
    fn polyline_rejects_mismatched_color_length_before_sending() {
        let mut v = viewer();
        let points = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [2.0, 0.0, 0.0]];
        let err = v
            .add_polyline(
                "line",
                &points,
                PolylineStyle::mapped(vec![0.0, 1.0], "viridis"),
            )
            .unwrap_err();
        assert!(matches!(err, ClientError::MalformedPayload(_)));
        assert!(v.transport().packets.is_empty());
    }

    #[test]
    fn polyline_sends_command_before_its_binary_frames() {
        let mut v = viewer();
        let points = [[0.0, 0.0, 0.0], [1.0, 0.0, 1.0], [2.0, 0.0, 4.0]];
        v.add_polyline(
            "helix",
            &points,
            PolylineStyle::mapped(vec![0.0, 1.0, 4.0], "turbo").with_width(4.0),
        )
        .unwrap();

        assert_eq!(
            v.transport().kinds(),
            vec![PacketKind::Command, PacketKind::Binary, PacketKind::Binary]
        );

        let commands = v.transport().commands();
        let frames = v.transport().frames();
        match &commands[0] {
            Command::DeclarePolyline {
                point_count,
                points_ref,
                color: ColorMode::Ref { colors_ref },
                line_width,
                ..
            } => {
                assert_eq!(*point_count, 3);
                assert_eq!(*line_width, 4.0);
                let point_frame = frames.iter().find(|f| f.ref_id == *points_ref).unwrap();
                assert_eq!(point_frame.as_triples().unwrap(), points.to_vec());
                let color_frame = frames.iter().find(|f| f.ref_id == *colors_ref).unwrap();
                assert_eq!(color_frame.count(), 3);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn mapped_colors_are_resolved_producer_side() {
        let mut v = viewer();
        let points = [[0.0; 3], [1.0; 3], [2.0; 3]];
        // No explicit range: defaults to observed min/max of the scalars.
        v.add_polyline(
            "line",
            &points,
            PolylineStyle::mapped(vec![0.0, 5.0, 10.0], "plasma"),
        )
        .unwrap();

        let frames = v.transport().frames();
        let rgb = frames[1].as_triples().unwrap();
        let expect = scenic_colormap::apply(&[0.0, 5.0, 10.0], "plasma", 0.0, 10.0);
        assert_eq!(rgb, expect);
        for triple in rgb {
            for c in triple {
                assert!((0.0..=1.0).contains(&c));
            }
        }
    }

    #[test]
    fn primitive_mapped_embeds_the_rgb_array() {
        let mut v = viewer();
        v.add_primitive_mapped(
            "cloud",
            Shape::Sphere { radius: 1.0 },
            &[0.0, 0.5, 1.0],
            "viridis",
            Some((0.0, 1.0)),
            TransformInput::default(),
        )
        .unwrap();
        match &v.transport().commands()[0] {
            Command::DeclarePrimitive {
                color: ColorMode::Array { rgb },
                ..
            } => assert_eq!(rgb.len(), 3),
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn model_bytes_travel_out_of_band() {
        let mut v = viewer();
        let blob = b"o teapot\nv 0 0 0\n".to_vec();
        v.add_model_bytes("teapot", blob.clone(), "obj").unwrap();

        assert_eq!(v.registry().kind_of("teapot"), Some(ObjectKind::Model));
        match &v.transport().commands()[0] {
            Command::DeclareModel {
                format, blob_ref, ..
            } => {
                assert_eq!(format, "obj");
                let frames = v.transport().frames();
                assert_eq!(frames[0].ref_id, *blob_ref);
                assert_eq!(frames[0].data, blob);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn set_color_requires_a_declared_target() {
        let mut v = viewer();
        let err = v.set_color("nobody", 0xFF0000).unwrap_err();
        assert!(matches!(err, ClientError::UnknownObject(_)));

        v.add_sphere("sun", 1.0, 0xFFDD00, TransformInput::default())
            .unwrap();
        v.set_color("sun", 0x00FF00).unwrap();
        match v.transport().commands().last().unwrap() {
            Command::SetColor { name, color } => {
                assert_eq!(name, "sun");
                assert_eq!(*color, 0x00FF00);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn clear_resets_the_registry_but_not_the_state() {
        let mut v = viewer();
        v.add_sphere("a", 1.0, 0xFFFFFF, TransformInput::default())
            .unwrap();
        v.batch_update([("a".to_string(), Update::at([1.0, 0.0, 0.0]))])
            .unwrap();
        assert_eq!(v.state(), SessionState::Streaming);

        v.clear().unwrap();
        assert!(v.registry().is_empty());
        assert_eq!(v.state(), SessionState::Streaming);
        assert_eq!(v.transport().commands().last().unwrap(), &Command::Clear);
    }

    #[test]
    fn animation_handoff_drives_the_state_machine() {
        let mut v = viewer();
        v.add_sphere("sun", 1.0, 0xFFDD00, TransformInput::default())
            .unwrap();

        let mut timeline = Timeline::new(true);
        timeline.add_frame(0.0, FrameContent::new().transform("sun", TransformInput::at([0.0; 3])));
        timeline.add_frame(1.0, FrameContent::new().transform("sun", TransformInput::at([1.0, 0.0, 0.0])));
        timeline.add_marker(0.0, "Start");

        v.load_animation(&timeline).unwrap();
        assert_eq!(v.state(), SessionState::Animating);
        match v.transport().commands().last().unwrap() {
            Command::LoadAnimation { animation } => {
                assert!(animation.looped);
                assert_eq!(animation.frames.len(), 2);
                assert_eq!(animation.duration, 1.0);
                assert_eq!(animation.markers.len(), 1);
            }
            other => panic!("unexpected command {other:?}"),
        }

        // A fresh batch update returns the session to streaming.
        v.batch_update([("sun".to_string(), Update::at([2.0, 0.0, 0.0]))])
            .unwrap();
        assert_eq!(v.state(), SessionState::Streaming);

        v.load_animation(&timeline).unwrap();
        assert_eq!(v.state(), SessionState::Animating);
        v.stop_animation().unwrap();
        assert_eq!(v.state(), SessionState::Idle);
    }

    #[test]
    fn poll_events_drains_the_transport() {
        let mut transport = RecordingTransport::new();
        transport.queued_events.push(scenic_proto::RendererEvent {
            kind: scenic_proto::EventKind::Error,
            message: "unknown object".into(),
        });
        let mut v = Viewer::with_transport(transport);
        let events = v.poll_events();
        assert_eq!(events.len(), 1);
        assert!(v.poll_events().is_empty());
    }

    #[test]
    fn disconnect_closes_the_transport() {
        use std::sync::atomic::{AtomicBool, Ordering};
        use std::sync::Arc;

        struct CloseProbe(Arc<AtomicBool>);
        impl Transport for CloseProbe {
            fn send_packet(&mut self, _packet: &[u8]) -> std::io::Result<()> {
                Ok(())
            }
            fn close(&mut self) {
                self.0.store(true, Ordering::SeqCst);
            }
        }

        let closed = Arc::new(AtomicBool::new(false));
        let v = Viewer::with_transport(CloseProbe(Arc::clone(&closed)));
        v.disconnect();
        assert!(closed.load(Ordering::SeqCst));
    }
}

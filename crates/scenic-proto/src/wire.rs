// SPDX-License-Identifier: Apache-2.0
//! Deterministic packet framing for both protocol channels.
//!
//! Packet layout:
//!
//! ``MAGIC(4) || VERSION(2) || KIND(1) || RESERVED(1) || LENGTH(4) || PAYLOAD || CHECKSUM(32)``
//!
//! * Integers are big-endian; `LENGTH` counts PAYLOAD bytes only.
//! * CHECKSUM = blake3-256 over HEADER (first 12 bytes) || PAYLOAD.
//! * `KIND=command` and `KIND=event` payloads are JSON; `KIND=binary`
//!   payloads are [`BinaryFrame`] bodies.
//!
//! The binary payload channel exists so million-point arrays never pass
//! through JSON number encoding. A binary frame is self-describing:
//!
//! ``REF_ID(8) || DTYPE(1) || RESERVED(1) || COUNT(4) || DATA``
//!
//! with `DATA` holding `COUNT` little-endian elements of the declared
//! type. The JSON command naming a `REF_ID` is always sent before the
//! frame that carries it; nothing else about the channel is acknowledged.

use blake3::Hasher;
use thiserror::Error;

use crate::{Command, RefId, RendererEvent};

/// Protocol magic constant `"SCNC"`.
pub const MAGIC: [u8; 4] = *b"SCNC";
/// Wire protocol version (big-endian u16).
pub const VERSION: u16 = 0x0001;
/// Header length in bytes (magic + version + kind + reserved + length).
pub const HEADER_LEN: usize = 12;
/// Checksum length in bytes (blake3-256).
pub const CHECKSUM_LEN: usize = 32;
/// Payload byte cap, sized for million-point clouds.
///
/// Decoders reject larger length claims before allocating anything.
pub const MAX_PAYLOAD: usize = 256 * 1024 * 1024;

/// Binary frame body header length (ref id + dtype + reserved + count).
const BODY_HEADER_LEN: usize = 14;

/// Channel discriminator carried in every packet header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum PacketKind {
    /// JSON command, producer → renderer.
    Command = 0,
    /// Binary payload frame, producer → renderer.
    Binary = 1,
    /// JSON event, renderer → producer.
    Event = 2,
}

impl PacketKind {
    fn from_tag(tag: u8) -> Result<Self, WireError> {
        match tag {
            0 => Ok(Self::Command),
            1 => Ok(Self::Binary),
            2 => Ok(Self::Event),
            other => Err(WireError::UnknownKind(other)),
        }
    }
}

/// Error type for framing and codec failures.
#[derive(Debug, Error)]
pub enum WireError {
    /// Not enough bytes for the structure being decoded.
    #[error("incomplete packet: have {have} bytes, need {need}")]
    Truncated {
        /// Bytes available.
        have: usize,
        /// Bytes required.
        need: usize,
    },
    /// Leading magic bytes do not match [`MAGIC`].
    #[error("bad magic")]
    BadMagic,
    /// Header names a protocol version this build does not speak.
    #[error("unsupported version {0:#06x}")]
    UnsupportedVersion(u16),
    /// Header names an unknown packet kind.
    #[error("unknown packet kind {0}")]
    UnknownKind(u8),
    /// Header claims a payload larger than [`MAX_PAYLOAD`].
    #[error("payload length {0} exceeds cap {MAX_PAYLOAD}")]
    PayloadTooLarge(usize),
    /// Packet checksum does not match its contents.
    #[error("checksum mismatch")]
    ChecksumMismatch,
    /// Packet kind differs from what the caller asked to decode.
    #[error("expected {expected:?} packet, got {got:?}")]
    WrongKind {
        /// Kind the caller expected.
        expected: PacketKind,
        /// Kind found in the header.
        got: PacketKind,
    },
    /// Binary frame body names an unknown element type.
    #[error("unknown element type {0}")]
    UnknownElementType(u8),
    /// Binary frame data length disagrees with its count and stride.
    #[error("binary frame length mismatch: {count} x {stride} != {len}")]
    LengthMismatch {
        /// Declared element count.
        count: usize,
        /// Element stride in bytes.
        stride: usize,
        /// Actual data length in bytes.
        len: usize,
    },
    /// Frame holds a different element type than the accessor expects.
    #[error("element type mismatch: expected {expected:?}, got {got:?}")]
    ElementTypeMismatch {
        /// Element type the accessor expects.
        expected: ElementType,
        /// Element type the frame declares.
        got: ElementType,
    },
    /// JSON payload failed to encode or decode.
    #[error("json codec: {0}")]
    Json(#[from] serde_json::Error),
}

/// Assemble a full packet from a payload.
pub fn encode_packet(kind: PacketKind, payload: &[u8]) -> Result<Vec<u8>, WireError> {
    if payload.len() > MAX_PAYLOAD {
        return Err(WireError::PayloadTooLarge(payload.len()));
    }
    let mut header = [0u8; HEADER_LEN];
    header[0..4].copy_from_slice(&MAGIC);
    header[4..6].copy_from_slice(&VERSION.to_be_bytes());
    header[6] = kind as u8;
    header[7] = 0;
    header[8..12].copy_from_slice(&(payload.len() as u32).to_be_bytes());

    let mut hasher = Hasher::new();
    hasher.update(&header);
    hasher.update(payload);
    let checksum = *hasher.finalize().as_bytes();

    let mut out = Vec::with_capacity(HEADER_LEN + payload.len() + CHECKSUM_LEN);
    out.extend_from_slice(&header);
    out.extend_from_slice(payload);
    out.extend_from_slice(&checksum);
    Ok(out)
}

/// Validate a packet header and return the full frame length it implies
/// (header + payload + checksum).
///
/// Stream readers call this after buffering [`HEADER_LEN`] bytes so a
/// hostile length claim is rejected before any allocation.
pub fn frame_len(header: &[u8; HEADER_LEN]) -> Result<usize, WireError> {
    if header[0..4] != MAGIC {
        return Err(WireError::BadMagic);
    }
    let version = u16::from_be_bytes([header[4], header[5]]);
    if version != VERSION {
        return Err(WireError::UnsupportedVersion(version));
    }
    PacketKind::from_tag(header[6])?;
    let len = u32::from_be_bytes([header[8], header[9], header[10], header[11]]) as usize;
    if len > MAX_PAYLOAD {
        return Err(WireError::PayloadTooLarge(len));
    }
    Ok(HEADER_LEN + len + CHECKSUM_LEN)
}

/// Decode one packet from the front of a byte slice.
///
/// Returns the packet kind, its payload, and the bytes consumed.
pub fn decode_packet(bytes: &[u8]) -> Result<(PacketKind, &[u8], usize), WireError> {
    if bytes.len() < HEADER_LEN {
        return Err(WireError::Truncated {
            have: bytes.len(),
            need: HEADER_LEN,
        });
    }
    let mut header = [0u8; HEADER_LEN];
    header.copy_from_slice(&bytes[..HEADER_LEN]);
    let total = frame_len(&header)?;
    if bytes.len() < total {
        return Err(WireError::Truncated {
            have: bytes.len(),
            need: total,
        });
    }
    let payload = &bytes[HEADER_LEN..total - CHECKSUM_LEN];
    let checksum = &bytes[total - CHECKSUM_LEN..total];

    let mut hasher = Hasher::new();
    hasher.update(&header);
    hasher.update(payload);
    if hasher.finalize().as_bytes() != checksum {
        return Err(WireError::ChecksumMismatch);
    }

    let kind = PacketKind::from_tag(header[6])?;
    Ok((kind, payload, total))
}

fn expect_kind(got: PacketKind, expected: PacketKind) -> Result<(), WireError> {
    if got == expected {
        Ok(())
    } else {
        Err(WireError::WrongKind { expected, got })
    }
}

/// Encode a [`Command`] into a full packet byte vector.
pub fn encode_command(cmd: &Command) -> Result<Vec<u8>, WireError> {
    let payload = serde_json::to_vec(cmd)?;
    encode_packet(PacketKind::Command, &payload)
}

/// Decode a [`Command`] packet, returning the command and bytes consumed.
pub fn decode_command(bytes: &[u8]) -> Result<(Command, usize), WireError> {
    let (kind, payload, used) = decode_packet(bytes)?;
    expect_kind(kind, PacketKind::Command)?;
    let cmd = serde_json::from_slice(payload)?;
    Ok((cmd, used))
}

/// Encode a [`RendererEvent`] into a full packet byte vector.
pub fn encode_event(event: &RendererEvent) -> Result<Vec<u8>, WireError> {
    let payload = serde_json::to_vec(event)?;
    encode_packet(PacketKind::Event, &payload)
}

/// Decode an event packet, returning the event and bytes consumed.
pub fn decode_event(bytes: &[u8]) -> Result<(RendererEvent, usize), WireError> {
    let (kind, payload, used) = decode_packet(bytes)?;
    expect_kind(kind, PacketKind::Event)?;
    let event = serde_json::from_slice(payload)?;
    Ok((event, used))
}

/// Element type of a binary frame's data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ElementType {
    /// Scalar `f32`, stride 4.
    F32 = 0,
    /// Row-major `[f32; 3]` triple (points, RGB), stride 12.
    F32x3 = 1,
    /// Opaque bytes (model blobs), stride 1.
    Bytes = 2,
}

impl ElementType {
    /// Bytes per element.
    pub fn stride(self) -> usize {
        match self {
            Self::F32 => 4,
            Self::F32x3 => 12,
            Self::Bytes => 1,
        }
    }

    fn from_tag(tag: u8) -> Result<Self, WireError> {
        match tag {
            0 => Ok(Self::F32),
            1 => Ok(Self::F32x3),
            2 => Ok(Self::Bytes),
            other => Err(WireError::UnknownElementType(other)),
        }
    }
}

/// A self-describing out-of-band payload frame.
///
/// `data` always holds exactly `count() * stride` bytes; the constructors
/// keep that invariant, and decoding re-validates it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryFrame {
    /// Reference id named by the paired JSON command.
    pub ref_id: RefId,
    /// Declared element type.
    pub dtype: ElementType,
    /// Raw little-endian element data.
    pub data: Vec<u8>,
}

impl BinaryFrame {
    /// Frame a scalar array.
    pub fn from_scalars(ref_id: RefId, values: &[f32]) -> Self {
        let mut data = Vec::with_capacity(values.len() * 4);
        for v in values {
            data.extend_from_slice(&v.to_le_bytes());
        }
        Self {
            ref_id,
            dtype: ElementType::F32,
            data,
        }
    }

    /// Frame an array of 3D points or RGB triples.
    pub fn from_triples(ref_id: RefId, triples: &[[f32; 3]]) -> Self {
        let mut data = Vec::with_capacity(triples.len() * 12);
        for t in triples {
            for v in t {
                data.extend_from_slice(&v.to_le_bytes());
            }
        }
        Self {
            ref_id,
            dtype: ElementType::F32x3,
            data,
        }
    }

    /// Frame an opaque byte blob (mesh file contents).
    pub fn from_blob(ref_id: RefId, bytes: Vec<u8>) -> Self {
        Self {
            ref_id,
            dtype: ElementType::Bytes,
            data: bytes,
        }
    }

    /// Number of elements in the frame.
    pub fn count(&self) -> usize {
        self.data.len() / self.dtype.stride()
    }

    /// Reinterpret the data as scalars. Fails on a non-scalar frame.
    pub fn as_scalars(&self) -> Result<Vec<f32>, WireError> {
        if self.dtype != ElementType::F32 {
            return Err(WireError::ElementTypeMismatch {
                expected: ElementType::F32,
                got: self.dtype,
            });
        }
        Ok(self
            .data
            .chunks_exact(4)
            .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect())
    }

    /// Reinterpret the data as triples. Fails on a non-triple frame.
    pub fn as_triples(&self) -> Result<Vec<[f32; 3]>, WireError> {
        if self.dtype != ElementType::F32x3 {
            return Err(WireError::ElementTypeMismatch {
                expected: ElementType::F32x3,
                got: self.dtype,
            });
        }
        Ok(self
            .data
            .chunks_exact(12)
            .map(|c| {
                [
                    f32::from_le_bytes([c[0], c[1], c[2], c[3]]),
                    f32::from_le_bytes([c[4], c[5], c[6], c[7]]),
                    f32::from_le_bytes([c[8], c[9], c[10], c[11]]),
                ]
            })
            .collect())
    }

    /// Encode into a full `KIND=binary` packet byte vector.
    pub fn encode(&self) -> Result<Vec<u8>, WireError> {
        let mut payload = Vec::with_capacity(BODY_HEADER_LEN + self.data.len());
        payload.extend_from_slice(&self.ref_id.to_be_bytes());
        payload.push(self.dtype as u8);
        payload.push(0);
        payload.extend_from_slice(&(self.count() as u32).to_be_bytes());
        payload.extend_from_slice(&self.data);
        encode_packet(PacketKind::Binary, &payload)
    }

    /// Decode a frame from a `KIND=binary` packet payload.
    pub fn decode_body(payload: &[u8]) -> Result<Self, WireError> {
        if payload.len() < BODY_HEADER_LEN {
            return Err(WireError::Truncated {
                have: payload.len(),
                need: BODY_HEADER_LEN,
            });
        }
        let ref_id = u64::from_be_bytes([
            payload[0], payload[1], payload[2], payload[3], payload[4], payload[5], payload[6],
            payload[7],
        ]);
        let dtype = ElementType::from_tag(payload[8])?;
        let count =
            u32::from_be_bytes([payload[10], payload[11], payload[12], payload[13]]) as usize;
        let data = &payload[BODY_HEADER_LEN..];
        if count * dtype.stride() != data.len() {
            return Err(WireError::LengthMismatch {
                count,
                stride: dtype.stride(),
                len: data.len(),
            });
        }
        Ok(Self {
            ref_id,
            dtype,
            data: data.to_vec(),
        })
    }
}

/// Decode a binary frame packet, returning the frame and bytes consumed.
pub fn decode_binary_frame(bytes: &[u8]) -> Result<(BinaryFrame, usize), WireError> {
    let (kind, payload, used) = decode_packet(bytes)?;
    expect_kind(kind, PacketKind::Binary)?;
    Ok((BinaryFrame::decode_body(payload)?, used))
}

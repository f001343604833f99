// SPDX-License-Identifier: Apache-2.0
//! Recording transport for headless testing of the command encoder.
//!
//! `RecordingTransport` captures every packet a [`Viewer`](crate::Viewer)
//! sends, decoded on demand, so tests can assert on wire traffic without
//! a renderer process.

use std::io;

use scenic_proto::wire::{self, BinaryFrame, PacketKind};
use scenic_proto::{Command, RendererEvent};

use crate::Transport;

/// Transport that records packets instead of sending them.
#[derive(Debug, Default)]
pub struct RecordingTransport {
    /// Every packet sent, in order, as raw bytes.
    pub packets: Vec<Vec<u8>>,
    /// Events handed back on the next [`Transport::poll_events`] call.
    pub queued_events: Vec<RendererEvent>,
    /// Whether [`Transport::close`] was called.
    pub closed: bool,
}

impl RecordingTransport {
    /// Empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Packet kinds in send order. Undecodable packets are skipped.
    pub fn kinds(&self) -> Vec<PacketKind> {
        self.packets
            .iter()
            .filter_map(|p| wire::decode_packet(p).ok().map(|(kind, _, _)| kind))
            .collect()
    }

    /// All commands sent, in order.
    pub fn commands(&self) -> Vec<Command> {
        self.packets
            .iter()
            .filter_map(|p| wire::decode_command(p).ok().map(|(cmd, _)| cmd))
            .collect()
    }

    /// All binary frames sent, in order.
    pub fn frames(&self) -> Vec<BinaryFrame> {
        self.packets
            .iter()
            .filter_map(|p| wire::decode_binary_frame(p).ok().map(|(frame, _)| frame))
            .collect()
    }
}

impl Transport for RecordingTransport {
    fn send_packet(&mut self, packet: &[u8]) -> io::Result<()> {
        self.packets.push(packet.to_vec());
        Ok(())
    }

    fn poll_events(&mut self) -> Vec<RendererEvent> {
        std::mem::take(&mut self.queued_events)
    }

    fn close(&mut self) {
        self.closed = true;
    }
}

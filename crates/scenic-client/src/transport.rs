// SPDX-License-Identifier: Apache-2.0
//! Transport port and the blocking TCP implementation.
//!
//! The [`Transport`] trait is the seam between the command encoder and
//! whatever carries packets to the renderer. Sends may block briefly under
//! backpressure from a slow renderer; streaming callers budget a frame
//! period around that. No retry or timeout policy lives here.

use std::io::{self, Read, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;

use scenic_proto::wire::{self, HEADER_LEN};
use scenic_proto::RendererEvent;
use tracing::debug;

/// Default TCP port of a local viewer process.
pub const DEFAULT_PORT: u16 = 5666;

/// Default endpoint for the viewer connection.
///
/// Honors `SCENIC_ENDPOINT` when set and falls back to the local viewer
/// port.
pub fn default_endpoint() -> String {
    std::env::var("SCENIC_ENDPOINT").unwrap_or_else(|_| format!("localhost:{DEFAULT_PORT}"))
}

/// Packet sink toward the renderer, plus event drainage back from it.
pub trait Transport {
    /// Write one fully framed packet. May block briefly under
    /// backpressure.
    fn send_packet(&mut self, packet: &[u8]) -> io::Result<()>;

    /// Drain renderer events received so far. Never blocks.
    fn poll_events(&mut self) -> Vec<RendererEvent> {
        Vec::new()
    }

    /// Close the connection. Further sends fail.
    fn close(&mut self) {}
}

/// Blocking TCP transport with a background event reader.
///
/// The reader thread decodes inbound `KIND=event` packets into a channel;
/// it exits quietly when the connection drops or the transport is
/// dropped.
#[derive(Debug)]
pub struct TcpTransport {
    stream: TcpStream,
    events: Receiver<RendererEvent>,
}

impl TcpTransport {
    /// Connect to a viewer endpoint.
    pub fn connect(addr: impl ToSocketAddrs) -> io::Result<Self> {
        let stream = TcpStream::connect(addr)?;
        // The streaming hot path sends many small batch packets.
        stream.set_nodelay(true)?;
        let reader = stream.try_clone()?;
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || read_events(reader, &tx));
        Ok(Self {
            stream,
            events: rx,
        })
    }
}

impl Transport for TcpTransport {
    fn send_packet(&mut self, packet: &[u8]) -> io::Result<()> {
        self.stream.write_all(packet)
    }

    fn poll_events(&mut self) -> Vec<RendererEvent> {
        let mut out = Vec::new();
        while let Ok(event) = self.events.try_recv() {
            out.push(event);
        }
        out
    }

    fn close(&mut self) {
        let _ = self.stream.shutdown(std::net::Shutdown::Both);
    }
}

/// Read framed packets until the stream closes, forwarding decoded events.
///
/// Reads the full header before trusting any length so short reads cannot
/// desynchronize framing. Undecodable packets are skipped, not fatal.
fn read_events(mut stream: TcpStream, tx: &Sender<RendererEvent>) {
    loop {
        let mut header = [0u8; HEADER_LEN];
        if stream.read_exact(&mut header).is_err() {
            break;
        }
        let total = match wire::frame_len(&header) {
            Ok(total) => total,
            Err(err) => {
                debug!(?err, "unreadable frame header, closing event reader");
                break;
            }
        };
        let mut rest = vec![0u8; total - HEADER_LEN];
        if stream.read_exact(&mut rest).is_err() {
            break;
        }
        let mut packet = Vec::with_capacity(total);
        packet.extend_from_slice(&header);
        packet.extend_from_slice(&rest);
        match wire::decode_event(&packet) {
            Ok((event, _)) => {
                if tx.send(event).is_err() {
                    break;
                }
            }
            Err(err) => {
                debug!(?err, "skipping undecodable inbound packet");
            }
        }
    }
}

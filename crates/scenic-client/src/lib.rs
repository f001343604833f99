// SPDX-License-Identifier: Apache-2.0
//! Producer-side client for driving a scenic viewer.
//!
//! A [`Viewer`] is the command encoder: it validates authoring calls
//! against the [`ObjectRegistry`], resolves scalar coloring through
//! `scenic-colormap`, routes large numeric payloads through the binary
//! channel, and writes framed packets to a [`Transport`].
//!
//! Two delivery modes drive animation:
//!
//! * **real-time streaming** — the producer pushes per-frame state with
//!   [`Viewer::batch_update`] at interactive rates;
//! * **precomputed playback** — the producer builds a `scenic-timeline`
//!   [`Timeline`](scenic_timeline::Timeline) and hands it over whole with
//!   [`Viewer::load_animation`]; the renderer then plays it back on its
//!   own until [`Viewer::stop_animation`] or a replacement arrives.
//!
//! The registry and viewer are single-owner, single-thread structures; a
//! producer that introduces a second writer must add its own mutual
//! exclusion.

use std::path::PathBuf;

use thiserror::Error;

use scenic_proto::wire::WireError;

mod registry;
mod session;
mod transport;
mod viewer;

#[cfg(any(test, feature = "test-utils"))]
pub mod mock;

pub use registry::{ObjectKind, ObjectRecord, ObjectRegistry};
pub use session::AsyncSession;
pub use transport::{default_endpoint, TcpTransport, Transport, DEFAULT_PORT};
pub use viewer::{LineColor, PolylineStyle, SessionState, Update, Viewer};

/// Error type for producer-side authoring calls.
#[derive(Debug, Error)]
pub enum ClientError {
    /// A single-target update named an object that was never declared.
    ///
    /// Batch updates never raise this: the offending entry is logged and
    /// skipped so one bad key cannot abort a whole frame.
    #[error("unknown object {0:?}")]
    UnknownObject(String),
    /// Invalid payload (mismatched lengths, empty polyline), rejected
    /// before anything reaches the transport.
    #[error("malformed payload: {0}")]
    MalformedPayload(String),
    /// The connection failed or a send did not complete. Surfaced to the
    /// caller; the client never auto-reconnects.
    #[error("transport failure: {0}")]
    Transport(#[source] std::io::Error),
    /// A model blob could not be read from disk.
    #[error("failed to read model {path}: {source}")]
    ModelRead {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// Framing or JSON codec failure.
    #[error(transparent)]
    Wire(#[from] WireError),
}

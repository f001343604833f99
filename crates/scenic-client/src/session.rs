// SPDX-License-Identifier: Apache-2.0
//! Minimal async session for tokio-based producers.
//!
//! Async producers (simulations already living on a runtime) use this
//! instead of the blocking [`TcpTransport`](crate::TcpTransport); the
//! framing and command set are identical.

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpStream, ToSocketAddrs};

use scenic_proto::wire::{self, BinaryFrame, HEADER_LEN};
use scenic_proto::{Command, RendererEvent};

use crate::ClientError;

/// Async viewer connection over TCP.
#[derive(Debug)]
pub struct AsyncSession {
    stream: TcpStream,
}

impl AsyncSession {
    /// Connect to a viewer endpoint.
    pub async fn connect(addr: impl ToSocketAddrs) -> Result<Self, ClientError> {
        let stream = TcpStream::connect(addr).await.map_err(ClientError::Transport)?;
        stream.set_nodelay(true).map_err(ClientError::Transport)?;
        Ok(Self { stream })
    }

    /// Send one command.
    pub async fn send_command(&mut self, cmd: &Command) -> Result<(), ClientError> {
        let packet = wire::encode_command(cmd)?;
        self.stream
            .write_all(&packet)
            .await
            .map_err(ClientError::Transport)
    }

    /// Send one binary payload frame.
    pub async fn send_frame(&mut self, frame: &BinaryFrame) -> Result<(), ClientError> {
        let packet = frame.encode()?;
        self.stream
            .write_all(&packet)
            .await
            .map_err(ClientError::Transport)
    }

    /// Read the next renderer event.
    ///
    /// Returns `Ok(None)` when the stream closes cleanly before any bytes
    /// of the next frame arrive. Reads until a full frame header is
    /// buffered so short reads cannot desynchronize framing.
    pub async fn poll_event(&mut self) -> Result<Option<RendererEvent>, ClientError> {
        let mut header = [0u8; HEADER_LEN];
        let mut read = 0usize;
        while read < header.len() {
            let n = self
                .stream
                .read(&mut header[read..])
                .await
                .map_err(ClientError::Transport)?;
            if n == 0 {
                if read == 0 {
                    return Ok(None);
                }
                return Err(ClientError::Transport(std::io::Error::new(
                    std::io::ErrorKind::UnexpectedEof,
                    format!("truncated frame header: read {read} of {} bytes", header.len()),
                )));
            }
            read += n;
        }
        let total = wire::frame_len(&header)?;
        let mut rest = vec![0u8; total - HEADER_LEN];
        self.stream
            .read_exact(&mut rest)
            .await
            .map_err(ClientError::Transport)?;
        let mut packet = Vec::with_capacity(total);
        packet.extend_from_slice(&header);
        packet.extend_from_slice(&rest);
        let (event, _) = wire::decode_event(&packet)?;
        Ok(Some(event))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scenic_proto::EventKind;
    use tokio::task;

    #[tokio::test]
    async fn poll_event_handles_partial_header_without_losing_bytes() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let event = RendererEvent {
            kind: EventKind::Info,
            message: "partial-header".to_string(),
        };
        let encoded = wire::encode_event(&event).unwrap();

        let client_task = task::spawn(async move {
            let mut session = AsyncSession::connect(addr).await.unwrap();
            session.poll_event().await
        });

        let (mut server, _) = listener.accept().await.unwrap();
        server.write_all(&encoded[..5]).await.unwrap();
        server.flush().await.unwrap();
        task::yield_now().await;
        server.write_all(&encoded[5..]).await.unwrap();
        server.flush().await.unwrap();

        let got = client_task.await.unwrap().unwrap();
        assert_eq!(got, Some(event));
    }

    #[tokio::test]
    async fn poll_event_returns_none_on_clean_close() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let client_task = task::spawn(async move {
            let mut session = AsyncSession::connect(addr).await.unwrap();
            session.poll_event().await
        });

        let (server, _) = listener.accept().await.unwrap();
        drop(server);

        let got = client_task.await.unwrap().unwrap();
        assert_eq!(got, None);
    }

    #[tokio::test]
    async fn commands_arrive_framed_on_the_peer() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let client_task = task::spawn(async move {
            let mut session = AsyncSession::connect(addr).await.unwrap();
            session.send_command(&Command::Clear).await.unwrap();
            session
                .send_frame(&BinaryFrame::from_scalars(1, &[1.0, 2.0]))
                .await
                .unwrap();
        });

        let (mut server, _) = listener.accept().await.unwrap();
        let mut buf = Vec::new();
        server.read_to_end(&mut buf).await.unwrap();
        client_task.await.unwrap();

        let (cmd, used) = wire::decode_command(&buf).unwrap();
        assert_eq!(cmd, Command::Clear);
        let (frame, _) = wire::decode_binary_frame(&buf[used..]).unwrap();
        assert_eq!(frame.as_scalars().unwrap(), vec![1.0, 2.0]);
    }
}

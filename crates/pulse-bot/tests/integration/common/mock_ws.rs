//! Mock ticker feed server for integration tests.
//!
//! Accepts WebSocket connections, replays a fixed list of frames, and
//! either holds the connection open or closes it to exercise the
//! reconnect path.

use futures_util::{SinkExt, StreamExt};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, Mutex};
use tokio_tungstenite::{accept_async, tungstenite::Message};

pub struct MockTickerServer {
    addr: SocketAddr,
    shutdown_tx: mpsc::Sender<()>,
    connections: Arc<Mutex<u32>>,
}

impl MockTickerServer {
    /// Start a server that sends `frames` to every new connection.
    ///
    /// With `close_after_send`, the server closes each connection after
    /// replaying the frames, forcing the client to reconnect.
    pub async fn start(frames: Vec<String>, close_after_send: bool) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let connections: Arc<Mutex<u32>> = Arc::new(Mutex::new(0));
        let (shutdown_tx, mut shutdown_rx) = mpsc::channel::<()>(1);

        let connections_clone = connections.clone();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    Ok((stream, _)) = listener.accept() => {
                        let frames = frames.clone();
                        let connections = connections_clone.clone();
                        tokio::spawn(handle_connection(
                            stream,
                            frames,
                            close_after_send,
                            connections,
                        ));
                    }
                    _ = shutdown_rx.recv() => {
                        break;
                    }
                }
            }
        });

        Self {
            addr,
            shutdown_tx,
            connections,
        }
    }

    /// The server's WebSocket endpoint base.
    pub fn url(&self) -> String {
        format!("ws://{}", self.addr)
    }

    /// Number of connections accepted so far.
    pub async fn connection_count(&self) -> u32 {
        *self.connections.lock().await
    }

    /// Shut the server down.
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(()).await;
    }
}

async fn handle_connection(
    stream: TcpStream,
    frames: Vec<String>,
    close_after_send: bool,
    connections: Arc<Mutex<u32>>,
) {
    {
        let mut count = connections.lock().await;
        *count += 1;
    }

    let ws_stream = match accept_async(stream).await {
        Ok(ws) => ws,
        Err(e) => {
            eprintln!("WebSocket handshake failed: {e}");
            return;
        }
    };

    let (mut write, mut read) = ws_stream.split();

    for frame in frames {
        if write.send(Message::Text(frame)).await.is_err() {
            return;
        }
    }

    if close_after_send {
        let _ = write.send(Message::Close(None)).await;
        return;
    }

    // Hold the connection open, answering pings, until the peer leaves.
    while let Some(msg) = read.next().await {
        match msg {
            Ok(Message::Ping(data)) => {
                let _ = write.send(Message::Pong(data)).await;
            }
            Ok(Message::Close(_)) | Err(_) => break,
            _ => {}
        }
    }
}

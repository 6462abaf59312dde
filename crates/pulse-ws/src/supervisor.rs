//! Per-symbol connection supervision.
//!
//! Each watched symbol gets one supervisor owning one WebSocket
//! connection. The supervisor drives the lifecycle (connect, stream,
//! back off, retry) and forwards decoded updates to the feed event loop.

use crate::backoff::BackoffPolicy;
use crate::error::{WsError, WsResult};
use futures_util::{SinkExt, StreamExt};
use pulse_core::{SupervisorState, Symbol, TickerUpdate};
use pulse_feed::{FeedStatus, TickerDecoder};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_tungstenite::{connect_async_tls_with_config, tungstenite::Message};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Supervisor configuration, shared by all per-symbol supervisors.
#[derive(Debug, Clone)]
pub struct SupervisorConfig {
    /// Stream endpoint base (e.g., "wss://stream.binance.com:9443/ws").
    pub endpoint: String,
    /// Reconnect attempt ceiling (0 = retry forever).
    pub max_reconnect_attempts: u32,
    /// Backoff schedule between attempts.
    pub backoff: BackoffPolicy,
}

impl Default for SupervisorConfig {
    fn default() -> Self {
        Self {
            endpoint: "wss://stream.binance.com:9443/ws".to_string(),
            max_reconnect_attempts: 0,
            backoff: BackoffPolicy::default(),
        }
    }
}

/// Supervises one symbol's connection until shutdown or the attempt
/// ceiling.
pub struct ConnectionSupervisor {
    symbol: Symbol,
    url: String,
    config: SupervisorConfig,
    decoder: Arc<TickerDecoder>,
    status: Arc<FeedStatus>,
    update_tx: mpsc::Sender<TickerUpdate>,
    shutdown: CancellationToken,
}

impl ConnectionSupervisor {
    pub fn new(
        symbol: Symbol,
        config: SupervisorConfig,
        decoder: Arc<TickerDecoder>,
        status: Arc<FeedStatus>,
        update_tx: mpsc::Sender<TickerUpdate>,
        shutdown: CancellationToken,
    ) -> Self {
        let url = stream_url(&config.endpoint, &symbol);
        Self {
            symbol,
            url,
            config,
            decoder,
            status,
            update_tx,
            shutdown,
        }
    }

    /// Run the connection lifecycle until shutdown or the attempt ceiling.
    ///
    /// The attempt counter resets to zero each time a connection reaches
    /// the streaming state, so the ceiling only terminates connections
    /// that fail repeatedly without ever streaming in between.
    pub async fn run(&self) -> WsResult<()> {
        let mut attempt = 0u32;

        loop {
            if self.shutdown.is_cancelled() {
                info!(symbol = %self.symbol, "Shutdown requested, exiting supervisor");
                self.status.set_state(&self.symbol, SupervisorState::Idle);
                return Ok(());
            }

            self.status
                .set_state(&self.symbol, SupervisorState::Connecting);

            match self.stream_once(&mut attempt).await {
                Ok(()) => {
                    info!(symbol = %self.symbol, "Connection closed");
                }
                Err(e) => {
                    error!(symbol = %self.symbol, %e, "Connection error");
                }
            }

            if self.shutdown.is_cancelled() {
                info!(symbol = %self.symbol, "Shutdown requested after disconnect, not reconnecting");
                self.status.set_state(&self.symbol, SupervisorState::Idle);
                return Ok(());
            }

            attempt += 1;

            if self.config.max_reconnect_attempts > 0
                && attempt >= self.config.max_reconnect_attempts
            {
                error!(symbol = %self.symbol, attempt, "Reconnect attempt ceiling reached");
                self.status
                    .set_state(&self.symbol, SupervisorState::Terminated);
                return Err(WsError::AttemptsExhausted(attempt));
            }

            self.status
                .set_state(&self.symbol, SupervisorState::Backoff);

            let delay = self.config.backoff.delay(attempt);
            warn!(symbol = %self.symbol, attempt, delay_ms = delay.as_millis(), "Reconnecting");

            tokio::select! {
                () = tokio::time::sleep(delay) => {}
                () = self.shutdown.cancelled() => {
                    info!(symbol = %self.symbol, "Shutdown requested during backoff, exiting");
                    self.status.set_state(&self.symbol, SupervisorState::Idle);
                    return Ok(());
                }
            }
        }
    }

    /// Connect once and pump frames until the connection ends.
    async fn stream_once(&self, attempt: &mut u32) -> WsResult<()> {
        info!(symbol = %self.symbol, url = %self.url, "Connecting");

        let (ws_stream, _response) =
            connect_async_tls_with_config(&self.url, None, true, None).await?;
        let (mut write, mut read) = ws_stream.split();

        *attempt = 0;
        self.status
            .set_state(&self.symbol, SupervisorState::Streaming);
        info!(symbol = %self.symbol, "Streaming");

        loop {
            tokio::select! {
                () = self.shutdown.cancelled() => {
                    info!(symbol = %self.symbol, "Shutdown signal received in read loop");
                    if let Err(e) = write.send(Message::Close(None)).await {
                        warn!(symbol = %self.symbol, %e, "Failed to send Close frame during shutdown");
                    }
                    return Ok(());
                }

                msg = read.next() => {
                    match msg {
                        Some(Ok(Message::Text(text))) => {
                            self.handle_frame(&text).await;
                        }
                        Some(Ok(Message::Ping(data))) => {
                            debug!(symbol = %self.symbol, "Received ping, sending pong");
                            write.send(Message::Pong(data)).await?;
                        }
                        Some(Ok(Message::Close(frame))) => {
                            let (code, reason) = frame
                                .map(|f| (f.code.into(), f.reason.to_string()))
                                .unwrap_or((1000, "Normal close".to_string()));
                            warn!(symbol = %self.symbol, code, %reason, "Closed by server");
                            return Err(WsError::ConnectionClosed { code, reason });
                        }
                        Some(Err(e)) => {
                            error!(symbol = %self.symbol, %e, "Read error");
                            return Err(e.into());
                        }
                        None => {
                            warn!(symbol = %self.symbol, "Stream ended");
                            return Ok(());
                        }
                        _ => {}
                    }
                }
            }
        }
    }

    /// Decode one text frame and forward the update if accepted.
    ///
    /// Decode failures are skips, never connection errors.
    async fn handle_frame(&self, text: &str) {
        if let Some(update) = self.decoder.decode(text) {
            if self.update_tx.send(update).await.is_err() {
                warn!(symbol = %self.symbol, "Update receiver dropped");
            }
        }
    }
}

/// Stream URL for one symbol's ticker channel.
fn stream_url(endpoint: &str, symbol: &Symbol) -> String {
    format!("{}/{}", endpoint.trim_end_matches('/'), symbol.ticker_stream())
}

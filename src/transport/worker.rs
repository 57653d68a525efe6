//! Websocket worker thread
//!
//! This module runs the websocket on a dedicated thread hosting a small
//! tokio runtime. The UI thread talks to it through [`WsTransport`]:
//!
//! - **Commands** (UI → worker) travel over a tokio unbounded channel so the
//!   worker can `select!` on them alongside the socket.
//! - **Events** (worker → UI) travel over a crossbeam channel that the UI
//!   drains without blocking once per frame.
//!
//! The worker connects only when told to. A handshake that does not finish
//! within the connect timeout is abandoned. When the socket ends it reports
//! [`TransportEvent::Closed`] and goes back to waiting; reconnect timing is
//! decided by the session on the UI thread.

use super::{Transport, TransportEvent};
use crate::error::{DashboardError, Result, ResultExt};
use crossbeam_channel::{Receiver, Sender};
use futures::{SinkExt, StreamExt};
use std::collections::VecDeque;
use std::thread::JoinHandle;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, error, info, warn};
use url::Url;

/// Commands sent from the UI thread to the worker
#[derive(Debug, Clone)]
enum WorkerCommand {
    Connect,
    Send(String),
    Shutdown,
}

/// UI-side handle to the websocket worker thread
pub struct WsTransport {
    url: Url,
    cmd_tx: mpsc::UnboundedSender<WorkerCommand>,
    event_rx: Receiver<TransportEvent>,
    /// Events synthesized locally when the worker is unreachable
    pending: VecDeque<TransportEvent>,
    handle: Option<JoinHandle<()>>,
}

impl WsTransport {
    /// Validate the URL and spawn the worker thread
    ///
    /// The worker stays idle until [`Transport::connect`] is called. Each
    /// connect attempt is given `connect_timeout` to complete the handshake.
    pub fn spawn(url: &str, connect_timeout: Duration) -> Result<Self> {
        let url = Url::parse(url)?;
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = crossbeam_channel::unbounded();

        let worker = ChannelWorker {
            url: url.clone(),
            connect_timeout,
            cmd_rx,
            event_tx,
        };

        let handle = std::thread::Builder::new()
            .name("fleetvis-channel".to_string())
            .spawn(move || {
                let runtime = match tokio::runtime::Builder::new_multi_thread()
                    .worker_threads(1)
                    .enable_all()
                    .build()
                {
                    Ok(rt) => rt,
                    Err(e) => {
                        error!("Failed to start channel runtime: {}", e);
                        let _ = worker.event_tx.send(TransportEvent::Closed {
                            reason: format!("runtime failed to start: {}", e),
                        });
                        return;
                    }
                };
                runtime.block_on(worker.run());
            })
            .map_err(DashboardError::from)
            .context("Failed to spawn channel worker thread")?;

        Ok(Self {
            url,
            cmd_tx,
            event_rx,
            pending: VecDeque::new(),
            handle: Some(handle),
        })
    }

    /// URL the worker connects to
    pub fn url(&self) -> &Url {
        &self.url
    }

    fn command(&self, cmd: WorkerCommand) -> Result<()> {
        self.cmd_tx
            .send(cmd)
            .map_err(|_| DashboardError::Channel("channel worker has stopped".to_string()))
    }
}

impl Transport for WsTransport {
    fn connect(&mut self) {
        if let Err(e) = self.command(WorkerCommand::Connect) {
            self.pending.push_back(TransportEvent::Closed {
                reason: e.to_string(),
            });
        }
    }

    fn send(&mut self, text: String) -> Result<()> {
        self.command(WorkerCommand::Send(text))
    }

    fn poll_event(&mut self) -> Option<TransportEvent> {
        self.pending
            .pop_front()
            .or_else(|| self.event_rx.try_recv().ok())
    }
}

impl Drop for WsTransport {
    fn drop(&mut self) {
        let _ = self.cmd_tx.send(WorkerCommand::Shutdown);
        // A pending connect gives up within the connect timeout, then sees Shutdown.
        if let Some(handle) = self.handle.take() {
            debug!("Detaching channel worker {:?}", handle.thread().name());
        }
    }
}

/// State owned by the worker thread
struct ChannelWorker {
    url: Url,
    connect_timeout: Duration,
    cmd_rx: mpsc::UnboundedReceiver<WorkerCommand>,
    event_tx: Sender<TransportEvent>,
}

impl ChannelWorker {
    async fn run(mut self) {
        loop {
            match self.cmd_rx.recv().await {
                Some(WorkerCommand::Connect) => {
                    if !self.connect_and_serve().await {
                        break;
                    }
                }
                Some(WorkerCommand::Send(_)) => {
                    self.emit(TransportEvent::Error(
                        "send attempted while disconnected".to_string(),
                    ));
                }
                Some(WorkerCommand::Shutdown) | None => break,
            }
        }
        info!("Channel worker stopped");
    }

    fn emit(&self, event: TransportEvent) {
        if self.event_tx.send(event).is_err() {
            debug!("UI side dropped, event discarded");
        }
    }

    /// Serve one connection. Returns `false` when the worker should exit.
    async fn connect_and_serve(&mut self) -> bool {
        info!("Connecting to {}...", self.url);

        let handshake = connect_async(self.url.as_str());
        let ws_stream = match tokio::time::timeout(self.connect_timeout, handshake).await {
            Ok(Ok((ws_stream, _))) => ws_stream,
            Ok(Err(e)) => {
                warn!("Connection to {} failed: {}", self.url, e);
                self.emit(TransportEvent::Closed {
                    reason: format!("connect failed: {}", e),
                });
                return true;
            }
            Err(_) => {
                warn!(
                    "Connection to {} timed out after {:?}",
                    self.url, self.connect_timeout
                );
                self.emit(TransportEvent::Closed {
                    reason: format!("connect timed out after {:?}", self.connect_timeout),
                });
                return true;
            }
        };

        info!("Connected to {}", self.url);
        self.emit(TransportEvent::Opened);

        let (mut write, mut read) = ws_stream.split();

        loop {
            tokio::select! {
                frame = read.next() => {
                    match frame {
                        Some(Ok(Message::Text(text))) => {
                            self.emit(TransportEvent::Text(text.to_string()));
                        }
                        Some(Ok(Message::Binary(bytes))) => match String::from_utf8(bytes.to_vec()) {
                            Ok(text) => self.emit(TransportEvent::Text(text)),
                            Err(_) => self.emit(TransportEvent::Error(
                                "binary frame is not UTF-8".to_string(),
                            )),
                        },
                        Some(Ok(Message::Close(frame))) => {
                            let reason = frame
                                .map(|f| f.reason.to_string())
                                .filter(|r| !r.is_empty())
                                .unwrap_or_else(|| "closed by server".to_string());
                            self.emit(TransportEvent::Closed { reason });
                            return true;
                        }
                        // Ping/pong are answered by tungstenite
                        Some(Ok(_)) => {}
                        Some(Err(e)) => {
                            error!("Websocket error: {}", e);
                            self.emit(TransportEvent::Closed { reason: e.to_string() });
                            return true;
                        }
                        None => {
                            warn!("Stream ended unexpectedly");
                            self.emit(TransportEvent::Closed {
                                reason: "stream ended".to_string(),
                            });
                            return true;
                        }
                    }
                }
                cmd = self.cmd_rx.recv() => {
                    match cmd {
                        Some(WorkerCommand::Send(text)) => {
                            if let Err(e) = write.send(Message::Text(text.into())).await {
                                error!("Failed to send frame: {}", e);
                                self.emit(TransportEvent::Closed { reason: e.to_string() });
                                return true;
                            }
                        }
                        Some(WorkerCommand::Connect) => {
                            debug!("Connect requested while already connected");
                        }
                        Some(WorkerCommand::Shutdown) | None => {
                            let _ = write.send(Message::Close(None)).await;
                            return false;
                        }
                    }
                }
            }
        }
    }
}

use crate::{
    abstract_trait::realtime::{InboundEvent, OutboundEvent, RealtimeChannelTrait},
    config::SocketConfig,
    domain::response::chat::ChatMessage,
    realtime::Packet,
};
use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use serde_json::Value;
use shared::errors::ClientError;
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};
use tokio::{
    net::TcpStream,
    sync::{mpsc, oneshot, watch},
    time::{sleep, timeout},
};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};
use tracing::{debug, error, info, warn};

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

const RECEIVE_MESSAGE: &str = "receive_message";

#[derive(Debug, PartialEq, Eq)]
enum SessionEnd {
    /// `acknowledged` is false when the server never accepted the Socket.IO
    /// connect; such a session counts as a failed attempt.
    Lost { acknowledged: bool },
    Shutdown,
}

/// A frame waiting for the worker, with the caller waiting on its write.
#[derive(Debug)]
struct Outgoing {
    frame: String,
    written: oneshot::Sender<Result<(), ClientError>>,
}

impl Outgoing {
    fn reject(self) {
        let _ = self.written.send(Err(ClientError::ChannelDisconnected));
    }
}

/// The one shared real-time connection of a client.
///
/// A background task owns the websocket, answers heartbeats and reconnects
/// after a drop. After `reconnect_attempts` consecutive failures it gives up
/// and the inbound queue is closed.
#[derive(Debug)]
pub struct SocketIoChannel {
    connected: Arc<AtomicBool>,
    outbound: mpsc::Sender<Outgoing>,
    shutdown: watch::Sender<bool>,
}

impl SocketIoChannel {
    pub fn connect(url: String, config: SocketConfig) -> (Self, mpsc::Receiver<InboundEvent>) {
        let connected = Arc::new(AtomicBool::new(false));
        let (outbound_tx, outbound_rx) = mpsc::channel(64);
        let (inbound_tx, inbound_rx) = mpsc::channel(256);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let worker = Worker {
            url,
            config,
            connected: connected.clone(),
            outbound: outbound_rx,
            inbound: inbound_tx,
            shutdown: shutdown_rx,
        };
        tokio::spawn(worker.run());

        (
            Self {
                connected,
                outbound: outbound_tx,
                shutdown: shutdown_tx,
            },
            inbound_rx,
        )
    }

    /// Disconnects and stops reconnecting.
    pub fn close(&self) {
        let _ = self.shutdown.send(true);
    }
}

#[async_trait]
impl RealtimeChannelTrait for SocketIoChannel {
    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    /// Resolves once the frame is written to the socket. A frame still queued
    /// when the connection drops fails with `ChannelDisconnected`.
    async fn emit(&self, event: OutboundEvent) -> Result<(), ClientError> {
        if !self.is_connected() {
            return Err(ClientError::ChannelDisconnected);
        }

        let (written, result) = oneshot::channel();
        let outgoing = Outgoing {
            frame: Packet::event(event.name(), event.payload()?).encode(),
            written,
        };
        self.outbound
            .send(outgoing)
            .await
            .map_err(|_| ClientError::ChannelDisconnected)?;

        result
            .await
            .map_err(|_| ClientError::ChannelDisconnected)??;

        debug!("Emitted {}", event.name());
        Ok(())
    }
}

struct Worker {
    url: String,
    config: SocketConfig,
    connected: Arc<AtomicBool>,
    outbound: mpsc::Receiver<Outgoing>,
    inbound: mpsc::Sender<InboundEvent>,
    shutdown: watch::Receiver<bool>,
}

impl Worker {
    async fn run(mut self) {
        let mut failures = 0u32;

        loop {
            if *self.shutdown.borrow() {
                break;
            }

            match timeout(self.config.connect_timeout, connect_async(self.url.as_str())).await {
                Ok(Ok((socket, _))) => {
                    debug!("Websocket open to {}", self.url);

                    let end = self.session(socket).await;
                    self.mark_disconnected().await;
                    match end {
                        SessionEnd::Shutdown => break,
                        SessionEnd::Lost { acknowledged: true } => {
                            failures = 0;
                            warn!("Real-time connection lost");
                        }
                        SessionEnd::Lost {
                            acknowledged: false,
                        } => {
                            failures += 1;
                            warn!("Real-time connect attempt {failures} was not accepted");
                        }
                    }
                }
                Ok(Err(e)) => {
                    failures += 1;
                    warn!("Real-time connect attempt {failures} failed: {e}");
                }
                Err(_) => {
                    failures += 1;
                    warn!(
                        "Real-time connect attempt {failures} timed out after {:?}",
                        self.config.connect_timeout
                    );
                }
            }

            if failures > self.config.reconnect_attempts {
                error!("Giving up on the real-time channel after {failures} failed attempts");
                break;
            }

            tokio::select! {
                _ = sleep(self.config.reconnect_delay) => {}
                _ = self.shutdown.changed() => break,
            }
        }

        self.connected.store(false, Ordering::SeqCst);
        self.outbound.close();
        while let Ok(outgoing) = self.outbound.try_recv() {
            outgoing.reject();
        }
        debug!("Real-time worker stopped");
    }

    async fn session(&mut self, socket: Socket) -> SessionEnd {
        let (mut sink, mut stream) = socket.split();
        let mut acknowledged = false;

        // the Socket.IO connect must be accepted within the connect timeout
        let handshake_deadline = sleep(self.config.connect_timeout);
        tokio::pin!(handshake_deadline);

        loop {
            tokio::select! {
                frame = stream.next() => match frame {
                    Some(Ok(Message::Text(text))) => {
                        let reply = match Packet::decode(text.as_str()) {
                            Ok(Packet::Open(handshake)) => {
                                debug!("Engine.IO session {}", handshake.sid);
                                Some(Packet::Connect)
                            }
                            Ok(Packet::Ping) => Some(Packet::Pong),
                            Ok(Packet::Connect) => {
                                acknowledged = true;
                                self.connected.store(true, Ordering::SeqCst);
                                info!("Real-time channel connected to {}", self.url);
                                let _ = self.inbound.send(InboundEvent::Connected).await;
                                None
                            }
                            Ok(Packet::Event { name, data }) => {
                                self.dispatch(&name, data).await;
                                None
                            }
                            Ok(Packet::ConnectError(message)) => {
                                error!("Real-time connect rejected: {message}");
                                return SessionEnd::Lost { acknowledged };
                            }
                            Ok(Packet::Disconnect | Packet::Close) => {
                                return SessionEnd::Lost { acknowledged };
                            }
                            Ok(_) => None,
                            Err(e) => {
                                warn!("Ignoring real-time frame: {e}");
                                None
                            }
                        };

                        if let Some(packet) = reply
                            && let Err(e) = sink.send(Message::text(packet.encode())).await
                        {
                            warn!("Real-time write failed: {e}");
                            return SessionEnd::Lost { acknowledged };
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => return SessionEnd::Lost { acknowledged },
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        warn!("Real-time read failed: {e}");
                        return SessionEnd::Lost { acknowledged };
                    }
                },
                outgoing = self.outbound.recv() => match outgoing {
                    Some(outgoing) if !acknowledged => outgoing.reject(),
                    Some(Outgoing { frame, written }) => {
                        match sink.send(Message::text(frame)).await {
                            Ok(()) => {
                                let _ = written.send(Ok(()));
                            }
                            Err(e) => {
                                let _ = written.send(Err(ClientError::ChannelDisconnected));
                                warn!("Real-time write failed: {e}");
                                return SessionEnd::Lost { acknowledged };
                            }
                        }
                    }
                    None => {
                        let _ = sink.send(Message::text(Packet::Disconnect.encode())).await;
                        let _ = sink.close().await;
                        return SessionEnd::Shutdown;
                    }
                },
                _ = &mut handshake_deadline, if !acknowledged => {
                    warn!(
                        "Socket.IO connect not accepted within {:?}",
                        self.config.connect_timeout
                    );
                    return SessionEnd::Lost { acknowledged };
                }
                _ = self.shutdown.changed() => {
                    let _ = sink.send(Message::text(Packet::Disconnect.encode())).await;
                    let _ = sink.close().await;
                    return SessionEnd::Shutdown;
                }
            }
        }
    }

    async fn dispatch(&self, name: &str, data: Value) {
        if name != RECEIVE_MESSAGE {
            debug!("Ignoring real-time event {name}");
            return;
        }

        match serde_json::from_value::<ChatMessage>(data) {
            Ok(message) => {
                let _ = self
                    .inbound
                    .send(InboundEvent::ReceiveMessage(message))
                    .await;
            }
            Err(e) => warn!("Dropping malformed {RECEIVE_MESSAGE}: {e}"),
        }
    }

    async fn mark_disconnected(&mut self) {
        // frames queued for the dead connection fail instead of being replayed
        while let Ok(outgoing) = self.outbound.try_recv() {
            outgoing.reject();
        }

        if self.connected.swap(false, Ordering::SeqCst) {
            let _ = self.inbound.send(InboundEvent::Disconnected).await;
        }
    }
}

//! Server network layer: the UDP gateway and the outgoing datagram queue

use crate::broadcast::Broadcaster;
use crate::controller::{SessionController, SessionHandle};
use crate::dictionary::WordValidator;
use crate::registry::PeerId;
use crate::round::SubmitOutcome;
use crate::session::{GameSummary, Session, SessionError};
use log::{debug, error, info};
use shared::{ClientMessage, ServerMessage, MAX_DATAGRAM_SIZE};
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::net::UdpSocket;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    Session(#[from] SessionError),
}

/// Datagrams queued for the network sender task
#[derive(Debug)]
pub enum Outgoing {
    Send { peer: PeerId, text: String },
    Broadcast { peers: Vec<PeerId>, text: String },
    /// Everything queued before this is sent, then the sender task stops
    Shutdown,
}

/// Cheap handle for queueing outgoing messages without touching the socket.
#[derive(Clone)]
pub struct Outbox {
    tx: mpsc::UnboundedSender<Outgoing>,
}

impl Outbox {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Outgoing>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    pub fn send(&self, peer: PeerId, message: &ServerMessage) {
        self.queue(Outgoing::Send {
            peer,
            text: message.to_string(),
        });
    }

    pub fn broadcast(&self, peers: Vec<PeerId>, message: &ServerMessage) {
        self.queue(Outgoing::Broadcast {
            peers,
            text: message.to_string(),
        });
    }

    pub(crate) fn shutdown(&self) {
        self.queue(Outgoing::Shutdown);
    }

    fn queue(&self, message: Outgoing) {
        if let Err(e) = self.tx.send(message) {
            error!("Failed to queue outgoing message: {}", e);
        }
    }
}

/// Decodes one datagram and routes it into the session
///
/// Anything that is not valid UTF-8 or not a known message is dropped without a reply.
pub async fn handle_datagram(handle: &SessionHandle, outbox: &Outbox, data: &[u8], peer: PeerId) {
    let text = match std::str::from_utf8(data) {
        Ok(text) => text,
        Err(_) => {
            debug!("Dropping non-UTF-8 datagram from {}", peer);
            return;
        }
    };

    match ClientMessage::parse(text) {
        Ok(ClientMessage::Join { name }) => {
            if let Err(reason) = handle.join(peer, &name, outbox).await {
                info!("Rejected join from {} ({}): {}", peer, name, reason);
            }
        }
        Ok(ClientMessage::Word { word }) => {
            if handle.submit(peer, &word, outbox).await == SubmitOutcome::Ignored {
                debug!("Ignored word '{}' from {}", word, peer);
            }
        }
        Err(e) => debug!("Dropping datagram from {}: {}", peer, e),
    }
}

/// A bound game server: one socket, one session
pub struct GameServer {
    socket: Arc<UdpSocket>,
    handle: Arc<SessionHandle>,
    validator: WordValidator,
    outbox: Outbox,
    outbox_rx: mpsc::UnboundedReceiver<Outgoing>,
}

impl GameServer {
    pub async fn bind(
        addr: &str,
        session: Session,
        validator: WordValidator,
    ) -> Result<Self, ServerError> {
        let socket = UdpSocket::bind(addr)
            .await
            .map_err(|source| ServerError::Bind {
                addr: addr.to_string(),
                source,
            })?;
        info!("Server listening on {}", addr);

        let (outbox, outbox_rx) = Outbox::new();

        Ok(GameServer {
            socket: Arc::new(socket),
            handle: SessionHandle::new(session),
            validator,
            outbox,
            outbox_rx,
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    /// Shared session, for event sources outside the network such as the admin console
    pub fn handle(&self) -> Arc<SessionHandle> {
        Arc::clone(&self.handle)
    }

    /// Queue for replies from event sources outside the network
    pub fn outbox(&self) -> Outbox {
        self.outbox.clone()
    }

    /// Plays one full game and returns its record once the final result is sent.
    pub async fn run(self) -> Result<GameSummary, ServerError> {
        let GameServer {
            socket,
            handle,
            validator,
            outbox,
            outbox_rx,
        } = self;

        let sender = spawn_network_sender(Arc::clone(&socket), outbox_rx);
        let receiver = spawn_network_receiver(socket, Arc::clone(&handle), outbox.clone());

        let controller =
            SessionController::new(handle, Broadcaster::new(outbox.clone()), validator);
        let result = controller.run().await;

        // Stop taking datagrams, then let the sender drain the queue. The admin
        // console may still hold an outbox, so the queue is closed explicitly.
        receiver.abort();
        let _ = receiver.await;
        outbox.shutdown();
        if let Err(e) = sender.await {
            error!("Network sender task failed: {}", e);
        }

        info!("Server shut down");
        Ok(result?)
    }
}

/// Spawns the task that receives datagrams until the game ends
fn spawn_network_receiver(
    socket: Arc<UdpSocket>,
    handle: Arc<SessionHandle>,
    outbox: Outbox,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut buffer = [0u8; MAX_DATAGRAM_SIZE];

        loop {
            match socket.recv_from(&mut buffer).await {
                Ok((len, addr)) => {
                    handle_datagram(&handle, &outbox, &buffer[..len], addr.into()).await;
                }
                Err(e) => {
                    error!("Error receiving datagram: {}", e);
                    tokio::time::sleep(Duration::from_millis(10)).await;
                }
            }
        }
    })
}

/// Spawns the task that writes queued messages to the socket
///
/// Runs until it reaches `Outgoing::Shutdown` or every `Outbox` is dropped.
fn spawn_network_sender(
    socket: Arc<UdpSocket>,
    mut outbox_rx: mpsc::UnboundedReceiver<Outgoing>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(message) = outbox_rx.recv().await {
            match message {
                Outgoing::Send { peer, text } => {
                    if let Err(e) = send_text(&socket, &text, peer).await {
                        error!("Failed to send to {}: {}", peer, e);
                    }
                }
                Outgoing::Broadcast { peers, text } => {
                    for peer in peers {
                        if let Err(e) = send_text(&socket, &text, peer).await {
                            error!("Failed to send to {}: {}", peer, e);
                        }
                    }
                }
                Outgoing::Shutdown => break,
            }
        }
    })
}

async fn send_text(socket: &UdpSocket, text: &str, peer: PeerId) -> io::Result<()> {
    socket.send_to(text.as_bytes(), peer.addr()).await?;
    Ok(())
}

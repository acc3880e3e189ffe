use crate::input::InputManager;
use crate::rendering::{is_final, render};
use log::{debug, error, info, warn};
use shared::{ClientMessage, ServerMessage, MAX_DATAGRAM_SIZE};
use std::io;
use std::net::SocketAddr;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::net::UdpSocket;

pub struct Client {
    socket: UdpSocket,
    server_addr: SocketAddr,
    input: InputManager,
}

impl Client {
    pub async fn new(server_addr: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let server_addr: SocketAddr = server_addr.parse()?;
        let bind_addr = if server_addr.is_ipv6() {
            "[::]:0"
        } else {
            "0.0.0.0:0"
        };
        let socket = UdpSocket::bind(bind_addr).await?;

        Ok(Client {
            socket,
            server_addr,
            input: InputManager::new(),
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    pub fn is_joined(&self) -> bool {
        self.input.is_joined()
    }

    pub async fn send(&self, message: &ClientMessage) -> io::Result<()> {
        self.socket
            .send_to(message.to_string().as_bytes(), self.server_addr)
            .await?;
        Ok(())
    }

    /// Waits for the next decodable datagram from the server
    pub async fn next_message(&self) -> io::Result<ServerMessage> {
        let mut buffer = [0u8; MAX_DATAGRAM_SIZE];

        loop {
            let (len, addr) = self.socket.recv_from(&mut buffer).await?;
            if addr != self.server_addr {
                debug!("Ignoring datagram from {}", addr);
                continue;
            }

            let text = String::from_utf8_lossy(&buffer[..len]);
            match ServerMessage::parse(&text) {
                Ok(message) => return Ok(message),
                Err(e) => warn!("Unreadable message from server: {}", e),
            }
        }
    }

    /// Applies a server message to local state. Returns true when the game is over.
    pub fn handle_message(&mut self, message: &ServerMessage) -> bool {
        match message {
            ServerMessage::JoinOk { .. } => self.input.set_joined(true),
            ServerMessage::JoinReject { .. } => self.input.set_joined(false),
            _ => {}
        }
        is_final(message)
    }

    /// Plays until the final result arrives
    ///
    /// With a `name` the join is sent right away; otherwise the first typed line is
    /// used as the name.
    pub async fn run<R>(
        &mut self,
        name: Option<String>,
        input: R,
    ) -> Result<(), Box<dyn std::error::Error>>
    where
        R: AsyncBufRead + Unpin,
    {
        info!("Connecting to {}", self.server_addr);

        match name {
            Some(name) => self.send(&ClientMessage::Join { name }).await?,
            None => println!("Enter your name:"),
        }

        let mut lines = input.lines();
        let mut input_open = true;

        loop {
            tokio::select! {
                line = lines.next_line(), if input_open => {
                    match line {
                        Ok(Some(line)) => {
                            if let Some(message) = self.input.line_to_message(&line) {
                                if let Err(e) = self.send(&message).await {
                                    error!("Failed to send to server: {}", e);
                                }
                            }
                        }
                        Ok(None) => input_open = false,
                        Err(e) => {
                            error!("Failed to read input: {}", e);
                            input_open = false;
                        }
                    }
                },

                message = self.next_message() => {
                    match message {
                        Ok(message) => {
                            println!("{}", render(&message));
                            if self.handle_message(&message) {
                                break;
                            }
                        }
                        Err(e) => error!("Error receiving from server: {}", e),
                    }
                },
            }
        }

        Ok(())
    }
}

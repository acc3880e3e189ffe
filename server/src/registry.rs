//! Player registration and score bookkeeping for a single game session
//!
//! This module tracks everyone who joined the lobby:
//! - Peer identity derived from the datagram source address
//! - Display names and cumulative scores
//! - Lobby capacity and the point where registration closes
//!
//! Players are never removed. Once the game starts the registry is closed and
//! only scores change from then on.

use log::info;
use shared::{RejectReason, Standing};
use std::fmt;
use std::net::SocketAddr;

/// Stable identity of a remote peer for the lifetime of a session
///
/// Derived from the source address and port of the peer's datagrams. A client
/// that rebinds its socket shows up as a different peer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PeerId(SocketAddr);

impl PeerId {
    pub fn addr(&self) -> SocketAddr {
        self.0
    }
}

impl From<SocketAddr> for PeerId {
    fn from(addr: SocketAddr) -> Self {
        PeerId(addr)
    }
}

impl fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.0.ip(), self.0.port())
    }
}

/// A registered player
#[derive(Debug, Clone)]
pub struct Player {
    /// Identity of the peer that joined
    pub id: PeerId,
    /// Name given in the join request
    pub name: String,
    /// Sum of all points awarded so far
    pub score: u32,
}

impl Player {
    /// Creates a player with a score of zero
    pub fn new(id: PeerId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            score: 0,
        }
    }
}

/// Outcome of an accepted join
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Joined {
    /// True when this join filled the last free slot
    pub lobby_full: bool,
}

/// All players of the session in join order
///
/// Iteration order is the order in which players joined. Scoreboards and tie
/// announcements rely on it being stable.
#[derive(Debug)]
pub struct PlayerRegistry {
    players: Vec<Player>,
    max_players: usize,
    closed: bool,
}

impl PlayerRegistry {
    /// Creates an empty, open registry with the given capacity
    pub fn new(max_players: usize) -> Self {
        Self {
            players: Vec::with_capacity(max_players),
            max_players,
            closed: false,
        }
    }

    /// Attempts to register a new player
    ///
    /// A peer that already joined is always told it is a duplicate, even after the
    /// game started. Any other peer is refused once registration is closed or
    /// when the lobby has no free slot.
    pub fn try_join(&mut self, id: PeerId, name: &str) -> Result<Joined, RejectReason> {
        if self.contains(&id) {
            return Err(RejectReason::DuplicatePlayer);
        }
        if self.closed {
            return Err(RejectReason::GameAlreadyStarted);
        }
        if self.is_full() {
            return Err(RejectReason::LobbyFull);
        }

        info!("Player joined -> {} at {}", name, id);
        self.players.push(Player::new(id, name));

        Ok(Joined {
            lobby_full: self.is_full(),
        })
    }

    /// Stops accepting new players
    pub fn close(&mut self) {
        self.closed = true;
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn contains(&self, id: &PeerId) -> bool {
        self.players.iter().any(|p| p.id == *id)
    }

    pub fn get(&self, id: &PeerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == *id)
    }

    /// Adds points to a player's score. Returns false for unknown peers.
    pub fn award(&mut self, id: &PeerId, points: u32) -> bool {
        match self.players.iter_mut().find(|p| p.id == *id) {
            Some(player) => {
                player.score = player.score.saturating_add(points);
                true
            }
            None => false,
        }
    }

    /// Snapshot of every registered peer, used for broadcasting
    pub fn peers(&self) -> Vec<PeerId> {
        self.players.iter().map(|p| p.id).collect()
    }

    /// Current scoreboard in join order
    pub fn standings(&self) -> Vec<Standing> {
        self.players
            .iter()
            .map(|p| Standing::new(p.name.clone(), p.score))
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Player> {
        self.players.iter()
    }

    pub fn is_full(&self) -> bool {
        self.players.len() >= self.max_players
    }

    pub fn max_players(&self) -> usize {
        self.max_players
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
}

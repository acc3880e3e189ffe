//! # Word Round Server Library
//!
//! Authoritative server for a multi-round word game played over UDP. Players join
//! a lobby, every round the server deals a shared pool of letters, each player
//! submits one word, and the server scores the round once everyone has answered.
//!
//! ## Round Barrier
//!
//! A round only ends when every player counted at its start has submitted. There is
//! no deadline: a silent player stalls the game. Datagrams from different players
//! arrive in any order, so the receive loop and the round loop run as separate
//! tasks that meet in one locked session (see [`controller::SessionHandle`]).
//!
//! ## Module Organization
//!
//! - `registry`: players, peer identities and scores
//! - `round`: one round's letter pool and submissions, sealed at the expected count
//! - `dictionary`: letter-pool containment check plus the word-list oracle
//! - `letters`: random and scripted letter sources
//! - `session`: the game state machine (`Lobby → RoundActive(k) → Finished`)
//! - `controller`: the shared session handle, start/seal signals and the round loop
//! - `broadcast`: message fan-out to a registry snapshot
//! - `network`: UDP receive loop, outgoing queue and the bound [`network::GameServer`]
//! - `admin`: operator console (`start`)
//! - `config`: game parameters
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use server::config::GameConfig;
//! use server::dictionary::{WordList, WordValidator};
//! use server::letters::RandomLetters;
//! use server::network::GameServer;
//! use server::session::Session;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let words = WordList::load("/usr/share/dict/words")?;
//!     let session = Session::new(GameConfig::default(), Box::new(RandomLetters::new()));
//!
//!     let server = GameServer::bind(
//!         "0.0.0.0:8888",
//!         session,
//!         WordValidator::new(Arc::new(words)),
//!     )
//!     .await?;
//!
//!     let summary = server.run().await?;
//!     println!("{:?}", summary.result);
//!     Ok(())
//! }
//! ```

pub mod admin;
pub mod broadcast;
pub mod config;
pub mod controller;
pub mod dictionary;
pub mod letters;
pub mod network;
pub mod registry;
pub mod round;
pub mod session;

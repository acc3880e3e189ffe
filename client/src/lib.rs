//! # Word Round Client Library
//!
//! Terminal client for the word round server. It sends typed lines to the server
//! over UDP and prints what comes back.
//!
//! ## Module Organization
//!
//! - `input`: decides whether a typed line is a name (`JOIN`) or a word (`WORD`)
//! - `network`: the UDP socket and the main loop over stdin and the server
//! - `rendering`: human-readable text for each server message
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use client::network::Client;
//! use tokio::io::BufReader;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut client = Client::new("127.0.0.1:8888").await?;
//!     client
//!         .run(Some("alice".to_string()), BufReader::new(tokio::io::stdin()))
//!         .await
//! }
//! ```
//!
//! The client keeps no game state of its own beyond whether the join was accepted.
//! Scores, rounds and the final result all come from the server.

pub mod input;
pub mod network;
pub mod rendering;

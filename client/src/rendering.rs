//! Terminal rendering of server messages

use shared::ServerMessage;
use std::fmt::Write;

/// Human-readable text for a server message
pub fn render(message: &ServerMessage) -> String {
    match message {
        ServerMessage::JoinOk { name } => {
            format!("Joined as {name}. Waiting for the game to start...")
        }
        ServerMessage::JoinReject { reason } => {
            format!("Join refused ({reason}). Type another name to retry.")
        }
        ServerMessage::RoundStart { round } => format!("=== Round {round} ==="),
        ServerMessage::RoundLetters { letters } => {
            let spaced: Vec<String> = letters.chars().map(String::from).collect();
            format!("Letters: {}\nType a word:", spaced.join(" "))
        }
        ServerMessage::Received { round } => {
            format!("Word received for round {round}. Waiting for other players...")
        }
        ServerMessage::RoundOver { round, scores } => {
            let mut text = format!("Round {round} over. Scores:");
            for standing in scores {
                let _ = write!(text, "\n  {:<16} {:>4}", standing.name, standing.score);
            }
            text
        }
        ServerMessage::Winner { name, score } => {
            format!("Game over! {name} wins with {score} points.")
        }
        ServerMessage::Tie { names, score } => {
            format!("Game over! Tie between {} at {score} points.", names.join(", "))
        }
    }
}

/// True for the last message of a game
pub fn is_final(message: &ServerMessage) -> bool {
    matches!(
        message,
        ServerMessage::Winner { .. } | ServerMessage::Tie { .. }
    )
}

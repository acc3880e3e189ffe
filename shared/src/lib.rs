use serde::Serialize;
use std::fmt;
use thiserror::Error;

pub const DEFAULT_PORT: u16 = 8888;
pub const MAX_PLAYERS: usize = 4;
pub const NUM_ROUNDS: u32 = 5;
pub const LETTERS_PER_ROUND: usize = 10;
pub const MAX_DATAGRAM_SIZE: usize = 1024;
pub const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";

const JOIN: &str = "JOIN:";
const WORD: &str = "WORD:";
const JOIN_OK: &str = "JOIN_OK:";
const JOIN_REJECT: &str = "JOIN_REJECT:";
const ROUND_START: &str = "ROUND_START:";
const ROUND_LETTERS: &str = "ROUND_LETTERS:";
const RECEIVED: &str = "RECEIVED:";
const ROUND_OVER: &str = "ROUND_OVER:";
const WINNER: &str = "WINNER:";
const TIE: &str = "TIE:";

const WELCOME: &str = "Welcome ";
const RECEIVED_TEXT: &str = "Your word for round ";
const SCORES_HEADER: &str = "Current Scores:";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("unknown message tag in {0:?}")]
    UnknownTag(String),
    #[error("empty payload for {0}")]
    EmptyPayload(&'static str),
    #[error("control characters in payload for {0}")]
    ControlCharacters(&'static str),
    #[error("malformed {0} message")]
    Malformed(&'static str),
}

/// Messages a client sends to the server, one per datagram.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientMessage {
    Join { name: String },
    Word { word: String },
}

impl ClientMessage {
    /// Decodes a single datagram line. Surrounding whitespace is ignored, an empty
    /// payload or one containing control characters is rejected.
    pub fn parse(line: &str) -> Result<Self, ProtocolError> {
        let line = line.trim();
        if let Some(name) = line.strip_prefix(JOIN) {
            Ok(ClientMessage::Join {
                name: payload(name, "JOIN")?,
            })
        } else if let Some(word) = line.strip_prefix(WORD) {
            Ok(ClientMessage::Word {
                word: payload(word, "WORD")?,
            })
        } else {
            Err(ProtocolError::UnknownTag(line.chars().take(32).collect()))
        }
    }
}

fn payload(raw: &str, tag: &'static str) -> Result<String, ProtocolError> {
    let value = raw.trim();
    if value.is_empty() {
        return Err(ProtocolError::EmptyPayload(tag));
    }
    if value.chars().any(char::is_control) {
        return Err(ProtocolError::ControlCharacters(tag));
    }
    Ok(value.to_string())
}

impl fmt::Display for ClientMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientMessage::Join { name } => write!(f, "{JOIN}{name}"),
            ClientMessage::Word { word } => write!(f, "{WORD}{word}"),
        }
    }
}

/// Why a join request was refused. Sent on the wire by variant name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumString)]
pub enum RejectReason {
    LobbyFull,
    DuplicatePlayer,
    GameAlreadyStarted,
}

/// One scoreboard line: a player's display name and cumulative score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Standing {
    pub name: String,
    pub score: u32,
}

impl Standing {
    pub fn new(name: impl Into<String>, score: u32) -> Self {
        Self {
            name: name.into(),
            score,
        }
    }
}

/// Messages the server sends, either to a single player or to everyone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerMessage {
    JoinOk { name: String },
    JoinReject { reason: RejectReason },
    RoundStart { round: u32 },
    RoundLetters { letters: String },
    Received { round: u32 },
    RoundOver { round: u32, scores: Vec<Standing> },
    Winner { name: String, score: u32 },
    Tie { names: Vec<String>, score: u32 },
}

impl fmt::Display for ServerMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServerMessage::JoinOk { name } => write!(f, "{JOIN_OK}{WELCOME}{name}"),
            ServerMessage::JoinReject { reason } => write!(f, "{JOIN_REJECT}{reason}"),
            ServerMessage::RoundStart { round } => write!(f, "{ROUND_START}{round}"),
            ServerMessage::RoundLetters { letters } => write!(f, "{ROUND_LETTERS}{letters}"),
            ServerMessage::Received { round } => write!(f, "{RECEIVED}{RECEIVED_TEXT}{round}"),
            ServerMessage::RoundOver { round, scores } => {
                writeln!(f, "{ROUND_OVER}{round}")?;
                writeln!(f, "{SCORES_HEADER}")?;
                for standing in scores {
                    writeln!(f, "{} -> {} points", standing.name, standing.score)?;
                }
                Ok(())
            }
            ServerMessage::Winner { name, score } => write!(f, "{WINNER}{name}:{score}"),
            ServerMessage::Tie { names, score } => {
                write!(f, "{TIE}[{}]:{score}", names.join(", "))
            }
        }
    }
}

impl ServerMessage {
    /// Decodes a datagram sent by the server. Used by clients.
    pub fn parse(text: &str) -> Result<Self, ProtocolError> {
        let text = text.trim_end();
        if let Some(rest) = text.strip_prefix(JOIN_OK) {
            let name = rest
                .strip_prefix(WELCOME)
                .ok_or(ProtocolError::Malformed("JOIN_OK"))?;
            Ok(ServerMessage::JoinOk {
                name: name.to_string(),
            })
        } else if let Some(rest) = text.strip_prefix(JOIN_REJECT) {
            let reason = rest
                .trim()
                .parse::<RejectReason>()
                .map_err(|_| ProtocolError::Malformed("JOIN_REJECT"))?;
            Ok(ServerMessage::JoinReject { reason })
        } else if let Some(rest) = text.strip_prefix(ROUND_START) {
            Ok(ServerMessage::RoundStart {
                round: parse_number(rest, "ROUND_START")?,
            })
        } else if let Some(rest) = text.strip_prefix(ROUND_LETTERS) {
            Ok(ServerMessage::RoundLetters {
                letters: rest.trim().to_string(),
            })
        } else if let Some(rest) = text.strip_prefix(RECEIVED) {
            let round = rest
                .strip_prefix(RECEIVED_TEXT)
                .ok_or(ProtocolError::Malformed("RECEIVED"))?;
            Ok(ServerMessage::Received {
                round: parse_number(round, "RECEIVED")?,
            })
        } else if let Some(rest) = text.strip_prefix(ROUND_OVER) {
            parse_round_over(rest)
        } else if let Some(rest) = text.strip_prefix(WINNER) {
            let (name, score) = rest
                .rsplit_once(':')
                .ok_or(ProtocolError::Malformed("WINNER"))?;
            Ok(ServerMessage::Winner {
                name: name.to_string(),
                score: parse_number(score, "WINNER")?,
            })
        } else if let Some(rest) = text.strip_prefix(TIE) {
            let (list, score) = rest.rsplit_once(':').ok_or(ProtocolError::Malformed("TIE"))?;
            let inner = list
                .strip_prefix('[')
                .and_then(|l| l.strip_suffix(']'))
                .ok_or(ProtocolError::Malformed("TIE"))?;
            let names = if inner.is_empty() {
                Vec::new()
            } else {
                inner.split(", ").map(str::to_string).collect()
            };
            Ok(ServerMessage::Tie {
                names,
                score: parse_number(score, "TIE")?,
            })
        } else {
            Err(ProtocolError::UnknownTag(text.chars().take(32).collect()))
        }
    }
}

fn parse_number(raw: &str, tag: &'static str) -> Result<u32, ProtocolError> {
    raw.trim().parse().map_err(|_| ProtocolError::Malformed(tag))
}

fn parse_round_over(rest: &str) -> Result<ServerMessage, ProtocolError> {
    let mut lines = rest.lines();
    let round = parse_number(lines.next().unwrap_or_default(), "ROUND_OVER")?;
    if lines.next() != Some(SCORES_HEADER) {
        return Err(ProtocolError::Malformed("ROUND_OVER"));
    }

    let mut scores = Vec::new();
    for line in lines.filter(|l| !l.is_empty()) {
        let (name, points) = line
            .rsplit_once(" -> ")
            .ok_or(ProtocolError::Malformed("ROUND_OVER"))?;
        let points = points
            .strip_suffix(" points")
            .ok_or(ProtocolError::Malformed("ROUND_OVER"))?;
        scores.push(Standing::new(name, parse_number(points, "ROUND_OVER")?));
    }

    Ok(ServerMessage::RoundOver { round, scores })
}

// Gold grid game wire types
// Server and client messages are JSON objects with PascalCase keys

use serde::{Deserialize, Serialize};

/// Message type codes shared by both directions of the protocol
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MsgType {
    Login,
    LoginRejected,
    Prepare,
    Ready,
    RoundFrame,
    PlayerMove,
    GameOver,
}

impl MsgType {
    /// Decodes a raw message type code, `None` for codes we do not know
    pub fn from_code(code: i32) -> Option<MsgType> {
        match code {
            0 => Some(MsgType::Login),
            -1 => Some(MsgType::LoginRejected),
            1 => Some(MsgType::Prepare),
            2 => Some(MsgType::Ready),
            3 => Some(MsgType::RoundFrame),
            4 => Some(MsgType::PlayerMove),
            5 => Some(MsgType::GameOver),
            _ => None,
        }
    }

    pub fn code(&self) -> i32 {
        match self {
            MsgType::Login => 0,
            MsgType::LoginRejected => -1,
            MsgType::Prepare => 1,
            MsgType::Ready => 2,
            MsgType::RoundFrame => 3,
            MsgType::PlayerMove => 4,
            MsgType::GameOver => 5,
        }
    }
}

/// A player's name and gold, used both for tile occupants and final standings
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct GameScore {
    pub name: String,
    pub gold: i32,
}

/// One tile of the server's tilemap
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq, Default)]
#[serde(rename_all = "PascalCase")]
pub struct Tile {
    pub gold: i32,
    #[serde(default)]
    pub players: Vec<GameScore>,
}

/// Any message sent by the server
///
/// Login replies, prepare notices, round frames and game-over notices all
/// share this shape; fields that a given message type does not carry are
/// left at their defaults.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct ServerMessage {
    #[serde(rename = "Msgtype")]
    pub msg_type: i32,
    #[serde(rename = "GameID")]
    pub game_id: u64,
    #[serde(rename = "RoundID")]
    pub round_id: u32,
    #[serde(rename = "Wid")]
    pub width: i32,
    #[serde(rename = "Hei")]
    pub height: i32,
    /// Rows indexed by y, each row indexed by x
    #[serde(rename = "Tilemap")]
    pub tilemap: Vec<Vec<Option<Tile>>>,
    #[serde(rename = "Results")]
    pub results: Vec<GameScore>,
}

impl ServerMessage {
    pub fn kind(&self) -> Option<MsgType> {
        MsgType::from_code(self.msg_type)
    }
}

/// Any message sent by the client
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct ClientMessage {
    pub msgtype: i32,
    pub token: String,
    #[serde(rename = "RoundID")]
    pub round_id: u32,
    pub x: i32,
    pub y: i32,
}

impl ClientMessage {
    pub fn login(token: &str) -> Self {
        ClientMessage {
            msgtype: MsgType::Login.code(),
            token: token.to_string(),
            round_id: 0,
            x: 0,
            y: 0,
        }
    }

    pub fn ready(token: &str) -> Self {
        ClientMessage {
            msgtype: MsgType::Ready.code(),
            ..Self::login(token)
        }
    }

    pub fn player_move(token: &str, mv: &Move) -> Self {
        ClientMessage {
            msgtype: MsgType::PlayerMove.code(),
            token: token.to_string(),
            round_id: mv.round_id,
            x: mv.target.x,
            y: mv.target.y,
        }
    }
}

/// 2D coordinate on the board
#[derive(Deserialize, Serialize, Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub struct Coord {
    pub x: i32,
    pub y: i32,
}

impl Coord {
    pub fn new(x: i32, y: i32) -> Self {
        Coord { x, y }
    }

    /// Manhattan distance to another coordinate
    pub fn manhattan(&self, other: &Coord) -> i32 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }
}

/// The destination chosen for one round
#[derive(Deserialize, Serialize, Debug, PartialEq, Eq, Clone, Copy)]
pub struct Move {
    pub round_id: u32,
    pub target: Coord,
}

impl Move {
    /// Builds a move whose target is clamped into a `width x height` board
    pub fn clamped(round_id: u32, target: Coord, width: i32, height: i32) -> Self {
        let target = Coord {
            x: target.x.clamp(0, (width - 1).max(0)),
            y: target.y.clamp(0, (height - 1).max(0)),
        };
        Move { round_id, target }
    }
}

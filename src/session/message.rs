use crate::rules::*;
use serde::Deserialize;
use serde::Serialize;
use shakmaty::Square;

/// Move submitted by a client, in board coordinates.
/// Promotion is optional and only meaningful for pawns reaching the last rank.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MoveRequest {
    pub from: String,
    pub to: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub promotion: Option<String>,
}

impl MoveRequest {
    /// Long algebraic notation understood by the rule engine.
    /// None unless `from` and `to` are squares and `promotion`, if present,
    /// names a piece a pawn can become.
    pub fn notation(&self) -> Option<String> {
        let from = self.from.trim().parse::<Square>().ok()?;
        let to = self.to.trim().parse::<Square>().ok()?;
        let promotion = match self.promotion.as_deref().map(str::trim) {
            None => "",
            Some(p @ ("q" | "r" | "b" | "n")) => p,
            Some(_) => return None,
        };
        Some(format!("{}{}{}", from, to, promotion))
    }
}

impl TryFrom<&str> for MoveRequest {
    type Error = serde_json::Error;
    fn try_from(s: &str) -> Result<Self, Self::Error> {
        serde_json::from_str(s)
    }
}

/// Messages sent from server to client over WebSocket.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Seat assignment and current position, sent once to the joiner.
    Init { fen: String, color: Slot },
    /// Position after an accepted move, sent to every participant.
    Update {
        fen: String,
        is_game_over: bool,
        turn: Slot,
    },
    /// Rejected request, sent to the requester only.
    Error { message: String },
}

impl ServerMessage {
    pub fn init<R: Rules>(rules: &R, state: &R::State, color: Slot) -> Self {
        Self::Init {
            fen: rules.serialize(state),
            color,
        }
    }
    pub fn update<R: Rules>(rules: &R, state: &R::State) -> Self {
        Self::Update {
            fen: rules.serialize(state),
            is_game_over: rules.is_terminal(state),
            turn: rules.turn(state),
        }
    }
    pub fn error<E: std::fmt::Display>(e: E) -> Self {
        Self::Error {
            message: e.to_string(),
        }
    }
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).expect("serialize server message")
    }
}

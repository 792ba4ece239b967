use crate::ParticipantId;
use crate::SessionId;

/// Why a well-formed action was refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Illegal {
    /// The sender does not hold the side to move.
    WrongTurn,
    /// The rule engine rejected the move in the current state.
    Rejected(String),
}

/// Errors scoped to a single request or a single connection.
/// None of them are fatal to the process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    MalformedRequest(String),
    IllegalAction(Illegal),
    SessionFull(SessionId),
    Occupied(ParticipantId),
    NotFound(SessionId),
    Disconnected(ParticipantId),
}

impl SessionError {
    /// Whether the error should be reported back to the requesting client.
    /// Lookups that raced a concurrent leave are absorbed silently.
    pub fn is_reportable(&self) -> bool {
        match self {
            Self::MalformedRequest(_) => true,
            Self::IllegalAction(_) => true,
            Self::SessionFull(_) => true,
            Self::Occupied(_) => true,
            Self::NotFound(_) => false,
            Self::Disconnected(_) => false,
        }
    }
}

impl std::fmt::Display for Illegal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::WrongTurn => write!(f, "not your turn"),
            Self::Rejected(action) => write!(f, "illegal move: {}", action),
        }
    }
}

impl std::fmt::Display for SessionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MalformedRequest(s) => write!(f, "malformed move: {}", s),
            Self::IllegalAction(reason) => write!(f, "{}", reason),
            Self::SessionFull(id) => write!(f, "session {} is full", id),
            Self::Occupied(id) => write!(f, "participant {} is already connected", id),
            Self::NotFound(id) => write!(f, "session {} not found", id),
            Self::Disconnected(id) => write!(f, "participant {} disconnected", id),
        }
    }
}

impl std::error::Error for SessionError {}

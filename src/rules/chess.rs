use super::*;
use shakmaty::Chess;
use shakmaty::Color;
use shakmaty::EnPassantMode;
use shakmaty::Position;
use shakmaty::fen::Fen;
use shakmaty::uci::Uci;

/// Standard chess. Actions are UCI moves (`e2e4`, `e7e8q`),
/// states serialize to FEN with en passant squares shown only when
/// a capture is actually available.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChessRules;

impl Rules for ChessRules {
    type State = Chess;
    type Action = Uci;

    fn initial_state(&self) -> Chess {
        Chess::default()
    }
    fn parse(&self, notation: &str) -> Option<Uci> {
        notation.parse::<Uci>().ok()
    }
    fn is_legal(&self, state: &Chess, action: &Uci) -> bool {
        action.to_move(state).is_ok()
    }
    fn apply(&self, state: &Chess, action: &Uci) -> Option<Chess> {
        action
            .to_move(state)
            .ok()
            .and_then(|m| state.clone().play(&m).ok())
    }
    fn serialize(&self, state: &Chess) -> String {
        Fen::from_position(state.clone(), EnPassantMode::Legal).to_string()
    }
    fn is_terminal(&self, state: &Chess) -> bool {
        state.is_game_over()
    }
    fn turn(&self, state: &Chess) -> Slot {
        match state.turn() {
            Color::White => Slot::First,
            Color::Black => Slot::Second,
        }
    }
}

use super::Slot;

/// Pure rule engine for a two-sided, turn-based game.
///
/// Every method is a function of its arguments: the engine holds no
/// per-game state, so one instance serves every session in the registry.
pub trait Rules: Send + Sync + 'static {
    /// Full game state, owned by a session.
    type State: Clone + Send + Sync + 'static;
    /// Candidate state transition submitted by a participant.
    type Action: Clone + Send + Sync + std::fmt::Display + 'static;

    /// State every new session starts from.
    fn initial_state(&self) -> Self::State;
    /// Parses textual move notation into the engine's action vocabulary.
    /// Returns None when the text is not a well-formed action at all.
    fn parse(&self, notation: &str) -> Option<Self::Action>;
    fn is_legal(&self, state: &Self::State, action: &Self::Action) -> bool;
    /// Successor state, defined only when the action is legal.
    fn apply(&self, state: &Self::State, action: &Self::Action) -> Option<Self::State>;
    /// Deterministic encoding sufficient to reconstruct the state.
    fn serialize(&self, state: &Self::State) -> String;
    fn is_terminal(&self, state: &Self::State) -> bool;
    /// Side expected to act next.
    fn turn(&self, state: &Self::State) -> Slot;
}

use super::*;
use crate::ParticipantId;
use crate::SessionId;
use crate::rules::*;

/// A participant's place in a session.
#[derive(Debug, Clone)]
pub struct Seat {
    pub slot: Slot,
    pub connection: Connection,
}

/// Authoritative record for one live game.
///
/// Seats are kept in slot order. The rule-engine state is set once at
/// construction and only ever advanced by accepted moves. A session whose
/// last participant left is retired and must not be joined again.
pub struct Session<R: Rules> {
    id: SessionId,
    state: R::State,
    seats: Vec<Seat>,
    retired: bool,
}

impl<R: Rules> Session<R> {
    /// Opens a session with its creator in the first slot.
    pub fn new(id: SessionId, state: R::State, creator: Connection) -> Self {
        Self {
            id,
            state,
            seats: vec![Seat {
                slot: Slot::First,
                connection: creator,
            }],
            retired: false,
        }
    }
    pub fn id(&self) -> SessionId {
        self.id
    }
    pub fn state(&self) -> &R::State {
        &self.state
    }
    pub fn seats(&self) -> &[Seat] {
        &self.seats
    }
    pub fn participants(&self) -> usize {
        self.seats.len()
    }
    pub fn is_empty(&self) -> bool {
        self.seats.is_empty()
    }
    pub fn is_retired(&self) -> bool {
        self.retired
    }
    pub fn slot_of(&self, participant: ParticipantId) -> Option<Slot> {
        self.seats
            .iter()
            .find(|s| s.connection.participant() == participant)
            .map(|s| s.slot)
    }
    /// Connections in slot order.
    pub fn targets(&self) -> Vec<Connection> {
        self.seats.iter().map(|s| s.connection.clone()).collect()
    }
}

impl<R: Rules> Session<R> {
    /// Seats a new participant in the lowest free slot.
    pub fn admit(&mut self, connection: Connection) -> Result<Slot, SessionError> {
        if self.slot_of(connection.participant()).is_some() {
            return Err(SessionError::Occupied(connection.participant()));
        }
        let slot = Slot::ALL
            .into_iter()
            .find(|slot| self.seats.iter().all(|s| s.slot != *slot))
            .ok_or(SessionError::SessionFull(self.id))?;
        self.seats.push(Seat { slot, connection });
        self.seats.sort_by_key(|s| s.slot);
        Ok(slot)
    }
    /// Removes the seat held by exactly this connection.
    /// Returns false when it was not seated here.
    pub fn remove(&mut self, connection: &Connection) -> bool {
        let before = self.seats.len();
        self.seats.retain(|s| !s.connection.same(connection));
        self.seats.len() < before
    }
    pub fn advance(&mut self, state: R::State) {
        self.state = state;
    }
    pub fn retire(&mut self) {
        self.retired = true;
    }
}

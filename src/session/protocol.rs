use super::*;
use crate::ParticipantId;
use crate::SessionId;
use crate::rules::*;

/// Result of a request that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Move accepted, applied, and broadcast.
    Applied(ServerMessage),
    /// Session or sender vanished concurrently; nothing to do.
    Ignored,
}

/// Whether the participant seated in `slot` is the side to move.
pub fn is_participants_turn<R: Rules>(rules: &R, state: &R::State, slot: Slot) -> bool {
    rules.turn(state) == slot
}

/// Validate, apply, broadcast: the sequence run for every inbound move.
pub struct Protocol;

impl Protocol {
    /// Parses a raw client payload into the engine's action vocabulary.
    pub fn decode<R: Rules>(rules: &R, payload: &str) -> Result<R::Action, SessionError> {
        MoveRequest::try_from(payload)
            .ok()
            .and_then(|request| request.notation())
            .and_then(|notation| rules.parse(&notation))
            .ok_or_else(|| SessionError::MalformedRequest(payload.to_string()))
    }

    /// Runs one request against session `id`.
    ///
    /// Turn ownership, legality, apply and broadcast all happen under the
    /// session lock, so moves on one session are totally ordered and every
    /// participant receives updates in apply order.
    pub async fn submit<R: Rules>(
        registry: &Registry<R>,
        id: SessionId,
        participant: ParticipantId,
        payload: &str,
    ) -> Result<Outcome, SessionError> {
        let rules = registry.rules();
        let action = Self::decode(rules, payload)?;
        let Ok(session) = registry.get_state(id).await else {
            return Ok(Outcome::Ignored);
        };
        let mut session = session.lock().await;
        let Some(slot) = session.slot_of(participant) else {
            return Ok(Outcome::Ignored);
        };
        if !is_participants_turn(rules, session.state(), slot) {
            return Err(SessionError::IllegalAction(Illegal::WrongTurn));
        }
        if !rules.is_legal(session.state(), &action) {
            return Err(SessionError::IllegalAction(Illegal::Rejected(
                action.to_string(),
            )));
        }
        let next = rules
            .apply(session.state(), &action)
            .ok_or_else(|| SessionError::IllegalAction(Illegal::Rejected(action.to_string())))?;
        session.advance(next);
        log::debug!("[session {}] {} played {}", id, slot, action);
        let update = ServerMessage::update(rules, session.state());
        Dispatcher::fanout(&session.targets(), &update);
        Ok(Outcome::Applied(update))
    }

    /// Runs one request on behalf of `connection`, reporting any refusal
    /// to that connection alone.
    pub async fn handle<R: Rules>(
        registry: &Registry<R>,
        id: SessionId,
        connection: &Connection,
        payload: &str,
    ) -> Outcome {
        match Self::submit(registry, id, connection.participant(), payload).await {
            Ok(outcome) => outcome,
            Err(e) => {
                log::debug!("[session {}] P{} refused: {}", id, connection.participant(), e);
                if e.is_reportable() {
                    let _ = connection
                        .send(&ServerMessage::error(&e))
                        .inspect_err(|_| {
                            connection.hangup();
                        });
                }
                Outcome::Ignored
            }
        }
    }
}

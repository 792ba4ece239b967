use super::*;
use crate::SessionId;
use crate::rules::*;

/// Fans a message out to every seated connection of a session.
///
/// A recipient whose send fails is hung up so its own handler runs the
/// regular disconnect cleanup. The dispatcher never unseats anyone itself
/// and never fails.
pub struct Dispatcher;

impl Dispatcher {
    /// Snapshots the session's targets and fans the message out.
    /// Returns how many recipients accepted it.
    pub async fn broadcast<R: Rules>(
        registry: &Registry<R>,
        id: SessionId,
        message: &ServerMessage,
    ) -> usize {
        Self::fanout(&registry.broadcast_targets(id).await, message)
    }

    /// Sends to an already snapshotted target list.
    pub fn fanout(targets: &[Connection], message: &ServerMessage) -> usize {
        let json = message.to_json();
        targets
            .iter()
            .map(|target| (target, target.deliver(json.clone())))
            .filter_map(|(target, res)| match res {
                Ok(()) => Some(target),
                Err(e) => {
                    log::warn!("failed broadcast to P{}: {}", target.participant(), e);
                    target.hangup();
                    None
                }
            })
            .count()
    }
}

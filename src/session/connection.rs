use super::*;
use crate::ParticipantId;
use std::sync::Arc;
use std::sync::atomic::AtomicU8;
use std::sync::atomic::Ordering;
use tokio::sync::Notify;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::mpsc::unbounded_channel;

/// Liveness of a connection's outbound side.
///
/// `Open` accepts messages. `Closing` means a failed send was observed
/// and the owning handler has been asked to hang up. `Closed` means the
/// handler ran its cleanup; it is reached exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Liveness {
    Open,
    Closing,
    Closed,
}

impl From<u8> for Liveness {
    fn from(n: u8) -> Self {
        match n {
            0 => Self::Open,
            1 => Self::Closing,
            _ => Self::Closed,
        }
    }
}

impl From<Liveness> for u8 {
    fn from(l: Liveness) -> Self {
        match l {
            Liveness::Open => 0,
            Liveness::Closing => 1,
            Liveness::Closed => 2,
        }
    }
}

#[derive(Debug)]
struct Link {
    state: AtomicU8,
    hangup: Notify,
}

/// Handle for sending JSON to one participant's socket.
///
/// Messages are queued on an unbounded channel drained by the participant's
/// handler task, so sending never suspends and may happen under a session
/// lock. Clones share liveness.
#[derive(Debug, Clone)]
pub struct Connection {
    participant: ParticipantId,
    outbox: UnboundedSender<String>,
    link: Arc<Link>,
}

impl Connection {
    /// Creates a handle and the receiving end its handler must drain.
    pub fn pair(participant: ParticipantId) -> (Self, UnboundedReceiver<String>) {
        let (tx, rx) = unbounded_channel::<String>();
        let connection = Self {
            participant,
            outbox: tx,
            link: Arc::new(Link {
                state: AtomicU8::new(Liveness::Open.into()),
                hangup: Notify::new(),
            }),
        };
        (connection, rx)
    }
    pub fn participant(&self) -> ParticipantId {
        self.participant
    }
    pub fn liveness(&self) -> Liveness {
        Liveness::from(self.link.state.load(Ordering::Acquire))
    }
    /// Whether both handles refer to the same underlying connection.
    pub fn same(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.link, &other.link)
    }
}

impl Connection {
    pub fn send(&self, message: &ServerMessage) -> Result<(), SessionError> {
        self.deliver(message.to_json())
    }
    /// Queues pre-encoded JSON. Fails once the connection is no longer open
    /// or its handler dropped the receiving end.
    pub fn deliver(&self, json: String) -> Result<(), SessionError> {
        match self.liveness() {
            Liveness::Open => self
                .outbox
                .send(json)
                .map_err(|_| SessionError::Disconnected(self.participant)),
            _ => Err(SessionError::Disconnected(self.participant)),
        }
    }
}

impl Connection {
    /// Moves `Open` to `Closing` and wakes the handler.
    /// Returns true only for the call that made the transition.
    pub fn hangup(&self) -> bool {
        self.link
            .state
            .compare_exchange(
                Liveness::Open.into(),
                Liveness::Closing.into(),
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .map(|_| self.link.hangup.notify_one())
            .is_ok()
    }
    /// Resolves once someone has hung this connection up.
    pub async fn hungup(&self) {
        if self.liveness() == Liveness::Open {
            self.link.hangup.notified().await;
        }
    }
    /// Marks the connection `Closed`.
    /// Returns true only for the first call, which owns cleanup.
    pub fn close(&self) -> bool {
        self.link.state.swap(Liveness::Closed.into(), Ordering::AcqRel) != u8::from(Liveness::Closed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn delivers_while_open() {
        let (connection, mut rx) = Connection::pair(1);
        connection.send(&ServerMessage::error("x")).unwrap();
        assert_eq!(rx.try_recv().unwrap(), r#"{"type":"error","message":"x"}"#);
    }
    #[test]
    fn dropped_receiver_fails_send() {
        let (connection, rx) = Connection::pair(1);
        drop(rx);
        assert_eq!(
            connection.deliver("{}".into()),
            Err(SessionError::Disconnected(1))
        );
    }
    #[test]
    fn hangup_transitions_once() {
        let (connection, _rx) = Connection::pair(1);
        assert!(connection.hangup());
        assert!(!connection.hangup());
        assert_eq!(connection.liveness(), Liveness::Closing);
        assert!(connection.deliver("{}".into()).is_err());
    }
    #[test]
    fn close_owned_by_first_caller() {
        let (connection, _rx) = Connection::pair(1);
        let clone = connection.clone();
        assert!(connection.hangup());
        assert!(clone.close());
        assert!(!connection.close());
        assert!(!connection.hangup());
        assert_eq!(connection.liveness(), Liveness::Closed);
    }
    #[test]
    fn identity_is_shared_by_clones() {
        let (a, _ra) = Connection::pair(1);
        let (b, _rb) = Connection::pair(1);
        assert!(a.same(&a.clone()));
        assert!(!a.same(&b));
    }
    #[tokio::test]
    async fn hungup_wakes_waiter() {
        let (connection, _rx) = Connection::pair(1);
        let waiter = connection.clone();
        let task = tokio::spawn(async move { waiter.hungup().await });
        tokio::task::yield_now().await;
        connection.hangup();
        tokio::time::timeout(std::time::Duration::from_secs(1), task)
            .await
            .expect("woken")
            .expect("joined");
    }
    #[tokio::test]
    async fn hungup_after_the_fact_is_immediate() {
        let (connection, _rx) = Connection::pair(1);
        connection.hangup();
        tokio::time::timeout(std::time::Duration::from_secs(1), connection.hungup())
            .await
            .expect("immediate");
    }
}

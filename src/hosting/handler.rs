use crate::ParticipantId;
use crate::SessionId;
use crate::rules::*;
use crate::session::*;
use actix_ws::CloseCode;
use actix_ws::CloseReason;
use actix_ws::Message;
use actix_ws::MessageStream;
use futures::StreamExt;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedReceiver;

/// Control loop for one WebSocket connection.
///
/// Joins the session, sends `init` straight to the socket, then multiplexes
/// three sources until any of them ends the connection: inbound frames
/// (each run through [`Protocol`]), the connection's outbox (broadcasts),
/// and the hangup signal raised when a broadcast found this socket dead.
pub struct Handler<R: Rules> {
    registry: Arc<Registry<R>>,
    session: SessionId,
    connection: Connection,
    outbox: UnboundedReceiver<String>,
    socket: actix_ws::Session,
    stream: MessageStream,
}

impl<R: Rules> Handler<R> {
    pub fn new(
        registry: Arc<Registry<R>>,
        session: SessionId,
        participant: ParticipantId,
        socket: actix_ws::Session,
        stream: MessageStream,
    ) -> Self {
        let (connection, outbox) = Connection::pair(participant);
        Self {
            registry,
            session,
            connection,
            outbox,
            socket,
            stream,
        }
    }
    /// Runs the handler on the current worker's local task set.
    pub fn spawn(self) {
        actix_web::rt::spawn(self.run());
    }
}

impl<R: Rules> Handler<R> {
    /// Connecting, then either active until the socket ends or refused.
    async fn run(mut self) {
        match self.connect().await {
            Ok(()) => {
                self.serve().await;
                self.close().await;
            }
            Err(e) => self.reject(e).await,
        }
    }

    async fn connect(&mut self) -> Result<(), SessionError> {
        let (slot, state) = self
            .registry
            .join(self.session, self.connection.clone())
            .await?;
        let init = ServerMessage::init(self.registry.rules(), &state, slot);
        // written before the outbox is drained, so init precedes any queued update
        if self.socket.text(init.to_json()).await.is_err() {
            log::debug!("[bridge {}] P{} gone before init", self.session, self.participant());
        }
        Ok(())
    }

    async fn serve(&mut self) {
        let Self {
            ref registry,
            ref connection,
            ref mut outbox,
            ref mut socket,
            ref mut stream,
            session,
            ..
        } = *self;
        log::debug!("[bridge {}] P{} connected", session, connection.participant());
        'sesh: loop {
            tokio::select! {
                biased;
                _ = connection.hungup() => break 'sesh,
                msg = outbox.recv() => match msg {
                    Some(json) => if socket.text(json).await.is_err() { break 'sesh },
                    None => break 'sesh,
                },
                msg = stream.next() => match msg {
                    Some(Ok(Message::Text(text))) => {
                        Protocol::handle(&**registry, session, connection, &text).await;
                    }
                    Some(Ok(Message::Ping(bytes))) => if socket.pong(&bytes).await.is_err() { break 'sesh },
                    Some(Ok(Message::Binary(_))) | Some(Ok(Message::Continuation(_))) => {
                        let refusal = SessionError::MalformedRequest("expected a text frame".into());
                        let _ = connection
                            .send(&ServerMessage::error(refusal))
                            .inspect_err(|_| {
                                connection.hangup();
                            });
                    }
                    Some(Ok(Message::Close(_))) => break 'sesh,
                    Some(Err(_)) => break 'sesh,
                    None => break 'sesh,
                    _ => continue 'sesh,
                },
            }
        }
    }

    /// Runs disconnect cleanup. Only the call that closes the connection
    /// unseats it, however many paths noticed the disconnect.
    async fn close(self) {
        if self.connection.close() {
            self.registry.leave(self.session, &self.connection).await;
            log::debug!("[bridge {}] P{} disconnected", self.session, self.participant());
        }
        let _ = self.socket.close(None).await;
    }

    /// Refuses a connection that could not be seated. It never joined,
    /// so there is nothing to leave.
    async fn reject(mut self, e: SessionError) {
        self.connection.close();
        log::warn!("[bridge {}] P{} rejected: {}", self.session, self.participant(), e);
        let _ = self.socket.text(ServerMessage::error(&e).to_json()).await;
        let _ = self
            .socket
            .close(Some(CloseReason {
                code: CloseCode::Policy,
                description: Some(e.to_string()),
            }))
            .await;
    }

    fn participant(&self) -> ParticipantId {
        self.connection.participant()
    }
}

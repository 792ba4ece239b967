//! Authoritative session state and the per-move protocol.
//!
//! ## Architecture
//!
//! - [`Registry`] — session id to [`Session`], one lock per session
//! - [`Session`] — rule-engine state plus the two seated connections
//! - [`Connection`] — outbound handle with explicit liveness
//! - [`Protocol`] — validate, apply, broadcast for one inbound request
//! - [`Dispatcher`] — fan-out that tolerates dead recipients
//!
//! ## Wire
//!
//! - [`MoveRequest`] — client to server
//! - [`ServerMessage`] — server to one or all clients
mod connection;
mod dispatcher;
mod error;
mod message;
mod protocol;
mod registry;
mod state;

pub use connection::*;
pub use dispatcher::*;
pub use error::*;
pub use message::*;
pub use protocol::*;
pub use registry::*;
pub use state::*;

//! Game rules consumed by the session layer.
//!
//! The session coordinator never reasons about chess directly. It asks a
//! [`Rules`] implementation for the initial position, legality of a
//! candidate action, the successor state, and a canonical string form.
//!
//! - [`Rules`] — opaque rule-engine capability
//! - [`Slot`] — the two sides a participant may occupy
//! - [`ChessRules`] — standard chess backed by `shakmaty`
mod chess;
mod engine;
mod slot;

pub use chess::*;
pub use engine::*;
pub use slot::*;

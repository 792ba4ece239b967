//! WebSocket hosting for live sessions.
//!
//! - [`Server`] — actix-web app, routes, and CORS
//! - [`Handler`] — one control loop per connected socket
//! - [`Config`] — bind address and worker count
mod config;
mod handler;
mod server;

pub use config::*;
pub use handler::*;
pub use server::*;

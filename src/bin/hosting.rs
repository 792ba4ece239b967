//! hosting Server Binary
//!
//! Runs the HTTP server for live chess sessions.
//! Clients connect at /ws/board/{session_id}/{participant_id}.

use chessroom::*;
use clap::Parser;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = hosting::Config::parse();
    log();
    kys();
    hosting::Server::run(config).await
}

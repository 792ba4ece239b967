//! Real-time coordinator for two-player chess sessions.
//!
//! Two participants connect over WebSocket to the same session id. The
//! server keeps the only authoritative board, validates every move
//! against the rules, and pushes each accepted position to both sides.
//!
//! ## Modules
//!
//! - [`rules`] — rule-engine capability and its chess implementation
//! - [`session`] — registry, session state, move protocol, broadcast
//! - [`hosting`] — actix-web server and per-connection handler
pub mod rules;
pub mod session;

#[cfg(feature = "server")]
pub mod hosting;

/// Externally supplied key naming a game instance.
pub type SessionId = u64;
/// Externally supplied key distinguishing connections within a session.
pub type ParticipantId = u64;

/// Initialize dual logging (terminal + file) with timestamped log files.
/// Creates `logs/` directory and writes DEBUG level to file, INFO to terminal.
#[cfg(feature = "server")]
pub fn log() {
    std::fs::create_dir_all("logs").expect("create logs directory");
    let config = simplelog::ConfigBuilder::new()
        .set_location_level(log::LevelFilter::Off)
        .set_target_level(log::LevelFilter::Off)
        .set_thread_level(log::LevelFilter::Off)
        .build();
    let time = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("time moves slow")
        .as_secs();
    let file = simplelog::WriteLogger::new(
        log::LevelFilter::Debug,
        config.clone(),
        std::fs::File::create(format!("logs/{}.log", time)).expect("create log file"),
    );
    let term = simplelog::TermLogger::new(
        log::LevelFilter::Info,
        config.clone(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    );
    simplelog::CombinedLogger::init(vec![term, file]).expect("initialize logger");
}

/// Register Ctrl+C handler for immediate termination.
/// Live sessions are in memory only, so there is nothing to flush.
#[cfg(feature = "server")]
pub fn kys() {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            println!();
            log::warn!("interrupt received, exiting immediately");
            std::process::exit(0);
        }
    });
}

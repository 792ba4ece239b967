/// Runtime configuration for the hosting server.
#[derive(Debug, Clone, clap::Parser)]
#[command(name = "hosting", about = "Host live two-player chess sessions over WebSocket")]
pub struct Config {
    /// Address to listen on.
    #[arg(long, env = "BIND_ADDR", default_value = "0.0.0.0:8888")]
    pub bind: String,
    /// Number of HTTP worker threads.
    #[arg(long, env = "WORKERS", default_value_t = 4)]
    pub workers: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:8888".to_string(),
            workers: 4,
        }
    }
}

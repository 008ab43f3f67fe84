use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use rate_board::config::PusherConfig;
use rate_board::pusher::RatePusher;

#[tokio::main]
async fn main() {
    let cfg = match PusherConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {e}");
            std::process::exit(1);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&cfg.log_level))
        .init();

    info!(
        "Pushing sale rates from {} to {} every {}s",
        cfg.local_base_url, cfg.webhook_url, cfg.interval_secs
    );

    match RatePusher::new(cfg) {
        Ok(pusher) => pusher.run().await,
        Err(e) => {
            error!("Fatal error: {e}");
            std::process::exit(1);
        }
    }
}

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use rate_board::api::{router, ApiState};
use rate_board::config::Config;
use rate_board::db::{self, SignageStore};
use rate_board::error::Result;

#[tokio::main]
async fn main() {
    let cfg = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {e}");
            std::process::exit(1);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&cfg.log_level))
        .init();

    if let Err(e) = run(cfg).await {
        error!("Fatal error: {e}");
        std::process::exit(1);
    }
}

async fn run(cfg: Config) -> Result<()> {
    // --- Database setup ---
    let pool = db::connect(&cfg.db_path).await?;
    info!("Database ready at {}", cfg.db_path);

    let store = SignageStore::new(pool);
    if let Some(rates) = store.current_rates().await? {
        info!(
            gold_24k_sale = rates.gold_24k_sale,
            silver_per_kg_sale = rates.silver_per_kg_sale,
            "Active rate snapshot {} from {}",
            rates.id,
            rates.created_date,
        );
    } else {
        info!("No rate snapshot yet; displays will show the waiting screen until one is posted");
    }

    // --- HTTP API server ---
    let app = router(ApiState::new(store, cfg.timezone));
    let bind_addr = format!("0.0.0.0:{}", cfg.api_port);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("HTTP API listening on {bind_addr} (display timezone {})", cfg.timezone.name());

    axum::serve(listener, app).await?;

    Ok(())
}

//! mechdeck API server entry point.

use std::sync::{Arc, Mutex};

use mechdeck_api::config::ApiConfig;
use mechdeck_api::error::AppError;
use mechdeck_api::state::AppState;
use mechdeck_core::clock::{Clock, SystemClock};
use mechdeck_core::repository::{ProgressRepository, RewardLedger};
use mechdeck_core::rng::{DeterministicRng, StdRandom};
use mechdeck_narrative::domain::loader::DirectoryStorySource;
use mechdeck_rewards::domain::catalog::JsonCardCatalog;
use mechdeck_store::memory::{InMemoryProgressRepository, InMemoryRewardLedger};
use mechdeck_store::pg_progress_repository::PgProgressRepository;
use mechdeck_store::pg_reward_ledger::PgRewardLedger;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // Initialize tracing subscriber.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    tracing::info!("Starting mechdeck API server");

    let config = ApiConfig::from_env()?;

    // Persistence: PostgreSQL when configured, otherwise process memory.
    let (progress, ledger): (Arc<dyn ProgressRepository>, Arc<dyn RewardLedger>) =
        match &config.database_url {
            Some(database_url) => {
                let pool = PgPoolOptions::new()
                    .max_connections(10)
                    .connect(database_url)
                    .await?;
                mechdeck_store::MIGRATOR.run(&pool).await?;
                (
                    Arc::new(PgProgressRepository::new(pool.clone())),
                    Arc::new(PgRewardLedger::new(pool)),
                )
            }
            None => {
                tracing::warn!("DATABASE_URL not set; progress and ledger are kept in memory");
                (
                    Arc::new(InMemoryProgressRepository::new()),
                    Arc::new(InMemoryRewardLedger::new()),
                )
            }
        };

    let stories = Arc::new(DirectoryStorySource::new(&config.stories_dir));
    let catalog = Arc::new(JsonCardCatalog::from_path(&config.card_catalog_path)?);
    tracing::info!(
        stories_dir = %config.stories_dir.display(),
        cards = catalog.len(),
        "content loaded"
    );

    let rng: Arc<Mutex<dyn DeterministicRng>> = match config.rng_seed {
        Some(seed) => Arc::new(Mutex::new(StdRandom::seeded(seed))),
        None => Arc::new(Mutex::new(StdRandom::from_os())),
    };
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let app_state = AppState::new(clock, rng, stories, catalog, progress, ledger);
    let app = mechdeck_api::build_router(app_state);

    // Start server.
    let addr = config.socket_addr()?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app).await?;

    Ok(())
}

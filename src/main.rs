use std::sync::Arc;

use swap_orchestrator::{
    api,
    clock::{ Clock, SystemClock },
    db::{ JsonFileStore, KeyValueStore, RecoveryRepository, TransactionRepository },
    dex::SolverQuoteClient,
    providers::{ CachedCatalog, FileCatalog },
    services::QuoteService,
    Config,
};
use tower_http::{ cors::CorsLayer, trace::TraceLayer };
use tracing_subscriber::{ layer::SubscriberExt, util::SubscriberInitExt };

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber
        ::registry()
        .with(
            tracing_subscriber::EnvFilter
                ::try_from_default_env()
                .unwrap_or_else(|_| "swap_orchestrator=debug,tower_http=debug".into())
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    tracing::info!("Starting swap-orchestrator against solver {}", config.solver_api_url);

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let store: Arc<dyn KeyValueStore> = Arc::new(JsonFileStore::open(&config.data_dir).await?);
    tracing::info!("Persisting state in {}", config.data_dir.display());

    let ledger = Arc::new(TransactionRepository::open(store.clone(), clock.clone()).await?);
    let recovery = Arc::new(RecoveryRepository::open(store, clock.clone()).await?);

    if let Some(pending) = recovery.get().await? {
        tracing::warn!(
            "Pending swap {} ({} {} -> {}) awaits confirmation",
            pending.tx_hash,
            pending.from_amount,
            pending.from_token.symbol,
            pending.to_token.symbol
        );
    }

    let quote_service = Arc::new(
        QuoteService::new(Arc::new(SolverQuoteClient::new(config.solver_api_url.clone())), clock)
    );
    let catalog = Arc::new(CachedCatalog::new(Arc::new(FileCatalog::new(&config.catalog_path))));

    let app_state = api::AppState::new(
        quote_service,
        catalog,
        ledger,
        recovery,
        config.default_slippage
    );

    let app = api::router(app_state).layer(CorsLayer::permissive()).layer(TraceLayer::new_for_http());

    let addr = config.server_addr();
    tracing::info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

use search_gateway::backend::{ElasticsearchBackend, SearchBackend};
use search_gateway::cache::{CacheAside, CacheStore, MemoryStore, RedisStore, WriteBackQueue};
use search_gateway::config::Config;
use search_gateway::geo::{GeoGate, RangeDbClassifier, RegionClassifier, StaticRangeClassifier};
use search_gateway::moderation::{Blocklist, ContentModerator};
use search_gateway::search::handlers::{build_router, cors_layer};
use search_gateway::search::SearchService;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env();
    tracing::info!("Starting search gateway: {}", config.summary());

    // 1. Backend:
    let backend: Arc<dyn SearchBackend> = Arc::new(
        ElasticsearchBackend::new(
            &config.elasticsearch_url,
            &config.elasticsearch_index,
            config.backend_timeout,
        )
        .with_attempts(config.backend_attempts),
    );

    // 2. Cache and write-back worker:
    let store = connect_cache(&config).await;
    let write_back = WriteBackQueue::start(store.clone(), config.write_back_capacity);
    let cache = CacheAside::new(store, write_back.clone());
    let service = Arc::new(SearchService::new(backend, cache, config.cache_ttl));

    // 3. Moderation and geo classification:
    let blocklist = match &config.blocklist_path {
        Some(path) => Blocklist::load(path)?,
        None => Blocklist::default(),
    };
    let moderator = Arc::new(ContentModerator::new(blocklist));

    let classifier: Arc<dyn RegionClassifier> = match &config.geo_db_path {
        Some(path) => Arc::new(RangeDbClassifier::load(path)?),
        None => Arc::new(StaticRangeClassifier::new()),
    };
    let gate = GeoGate::new(classifier, config.trust_forwarded_for)
        .with_trusted_proxies(config.trusted_proxies.clone());

    // 4. HTTP server:
    let app = build_router(
        service,
        gate,
        moderator,
        cors_layer(&config.cors_allowed_origins),
    );
    let addr = config.bind_addr()?;

    tracing::info!("HTTP server listening on {}", addr);
    tracing::info!("Press Ctrl+C to shutdown");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // 5. Flush pending cache writes:
    write_back.shutdown().await;
    tracing::info!("Search gateway stopped");

    Ok(())
}

/// Redis when configured and reachable, otherwise the in-process store.
async fn connect_cache(config: &Config) -> Arc<dyn CacheStore> {
    if config.uses_memory_cache() {
        tracing::info!("Using in-process cache");
        return Arc::new(MemoryStore::new());
    }

    match RedisStore::connect(&config.redis_url()).await {
        Ok(store) => {
            tracing::info!("Connected to redis at {}", config.redis_addr);
            Arc::new(store)
        }
        Err(e) => {
            tracing::warn!(
                "Redis at {} unavailable ({}), falling back to in-process cache",
                config.redis_addr,
                e
            );
            Arc::new(MemoryStore::new())
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

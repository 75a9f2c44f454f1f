use std::net::SocketAddr;

use rag_server::api::{create_router, AppState};
use rag_server::infrastructure::AppConfig;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "rag_server=debug,api=debug,tower_http=debug".into());
    let json = std::env::var("LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json"));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = AppConfig::load()?;
    info!(
        llm = ?config.config.llm.provider,
        vector_store = ?config.config.vector_store.provider,
        collection = %config.config.vector_store.collection,
        "configuration loaded"
    );

    let state = AppState::from_config(config).await?;
    let server = &state.config.config.server;
    let addr = SocketAddr::new(server.host.parse()?, server.port);
    let app = create_router(state);

    info!("RAG server listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

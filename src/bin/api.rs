use std::sync::Arc;
use tracing::info;
use wealth_advisory_orchestrator::{
    api::start_server,
    config::Config,
    gemini::GeminiClient,
    orchestrator::Orchestrator,
    search::{LinkupClient, WebSearch},
    storage,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    dotenv::dotenv().ok();
    let config = Config::from_env();

    info!("Wealth Advisory Orchestrator - API Server");
    info!("Port: {}", config.port);

    let generator = Arc::new(GeminiClient::new(
        config.gemini_api_key.clone().unwrap_or_default(),
        config.gemini_base_url.clone(),
    ));

    let search: Option<Arc<dyn WebSearch>> = config.linkup_api_key.as_ref().map(|key| {
        Arc::new(LinkupClient::new(key.clone(), config.linkup_base_url.clone()))
            as Arc<dyn WebSearch>
    });

    let store = storage::build_store(&config);

    let orchestrator = Arc::new(Orchestrator::new(generator, search, store));

    info!("Orchestrator initialized with all 6 agents");

    start_server(orchestrator, config.port).await?;

    Ok(())
}

//! Offline demo: runs the full analysis against a sample client and writes
//! the rendered report to `financial_report.md`.

use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::info;
use wealth_advisory_orchestrator::{
    config::Config,
    gemini::GeminiClient,
    models::{ClientRecord, Goal, GoalPriority, Portfolio, Profile, RiskTolerance, TaxInfo},
    orchestrator::Orchestrator,
    report::render_report,
    search::{LinkupClient, WebSearch},
    storage,
};

fn sample_client() -> ClientRecord {
    let mut holdings = BTreeMap::new();
    holdings.insert("stocks".to_string(), 300_000.0);
    holdings.insert("bonds".to_string(), 150_000.0);
    holdings.insert("cash".to_string(), 50_000.0);

    ClientRecord::new(
        Profile {
            user_id: "client_001".to_string(),
            name: "John Doe".to_string(),
            age: 45,
            income: 150_000.0,
            risk_tolerance: RiskTolerance::Moderate,
            investment_timeline: "15 years".to_string(),
        },
        Portfolio {
            user_id: "client_001".to_string(),
            total_value: 500_000.0,
            holdings,
            risk_score: Some(6.5),
        },
        TaxInfo {
            tax_bracket: Some("24%".to_string()),
            state: Some("California".to_string()),
            filing_status: Some("married_joint".to_string()),
        },
        vec![
            Goal {
                name: "Retirement".to_string(),
                target_amount: 2_000_000.0,
                timeline: "15 years".to_string(),
                priority: GoalPriority::High,
            },
            Goal {
                name: "College Fund".to_string(),
                target_amount: 200_000.0,
                timeline: "8 years".to_string(),
                priority: GoalPriority::Medium,
            },
        ],
    )
}

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

    info!("Wealth Advisory Orchestrator - demo analysis");

    let generator = Arc::new(GeminiClient::new(
        config.gemini_api_key.clone().unwrap_or_default(),
        config.gemini_base_url.clone(),
    ));

    let search: Option<Arc<dyn WebSearch>> = config.linkup_api_key.as_ref().map(|key| {
        Arc::new(LinkupClient::new(key.clone(), config.linkup_base_url.clone()))
            as Arc<dyn WebSearch>
    });

    let store = storage::build_store(&config);
    let orchestrator = Orchestrator::new(generator, search, store);

    let record = sample_client();
    let results = orchestrator.comprehensive_analysis(&record).await;
    let report = render_report(&results, &record);

    std::fs::write("financial_report.md", &report)?;
    info!("Report saved to financial_report.md");

    println!("{}", report);

    Ok(())
}

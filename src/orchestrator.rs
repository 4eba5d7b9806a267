//! Advisory orchestrator
//!
//! Runs the six section agents concurrently against one client record and
//! assembles their outputs into a `Report`. Agent outputs — including error
//! sentinels — are opaque text here; fallback substitution happens at
//! render time. Persistence is best-effort and never fails the analysis.

use crate::agents::{
    ComplianceAgent, FinancialPlanningAgent, MarketResearchAgent, PortfolioManagerAgent,
    RiskAssessmentAgent, TaxOptimizationAgent,
};
use crate::gemini::TextGenerator;
use crate::models::{ClientRecord, Report, SectionKey};
use crate::search::WebSearch;
use crate::storage::ClientStore;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

pub struct Orchestrator {
    risk_assessor: RiskAssessmentAgent,
    portfolio_manager: PortfolioManagerAgent,
    tax_optimizer: TaxOptimizationAgent,
    market_researcher: MarketResearchAgent,
    financial_planner: FinancialPlanningAgent,
    compliance_officer: ComplianceAgent,
    store: Option<Arc<dyn ClientStore>>,
}

impl Orchestrator {
    pub fn new(
        generator: Arc<dyn TextGenerator>,
        search: Option<Arc<dyn WebSearch>>,
        store: Option<Arc<dyn ClientStore>>,
    ) -> Self {
        Self {
            risk_assessor: RiskAssessmentAgent::new(generator.clone()),
            portfolio_manager: PortfolioManagerAgent::new(generator.clone(), search.clone()),
            tax_optimizer: TaxOptimizationAgent::new(generator.clone(), search.clone()),
            market_researcher: MarketResearchAgent::new(generator.clone(), search),
            financial_planner: FinancialPlanningAgent::new(generator.clone()),
            compliance_officer: ComplianceAgent::new(generator),
            store,
        }
    }

    /// Run all six agents and assemble the report. End-to-end latency is
    /// bounded by the slowest single agent, not the sum of all six.
    pub async fn comprehensive_analysis(&self, record: &ClientRecord) -> Report {
        let start = Instant::now();

        info!(
            analysis_id = %record.analysis_id,
            user_id = %record.profile.user_id,
            "Starting comprehensive analysis"
        );

        let (
            risk_assessment,
            portfolio_analysis,
            tax_optimization,
            market_research,
            financial_plan,
            compliance_review,
        ) = tokio::join!(
            self.risk_assessor.conduct_risk_assessment(record),
            self.portfolio_manager.analyze_portfolio(record),
            self.tax_optimizer.identify_tax_opportunities(record),
            self.market_researcher.analyze_market_trends(),
            self.financial_planner.create_financial_plan(record),
            self.compliance_officer.review_client_submission(record),
        );

        let mut report = Report::new();
        report.insert(SectionKey::RiskAssessment, risk_assessment);
        report.insert(SectionKey::PortfolioAnalysis, portfolio_analysis);
        report.insert(SectionKey::TaxOptimization, tax_optimization);
        report.insert(SectionKey::MarketResearch, market_research);
        report.insert(SectionKey::FinancialPlan, financial_plan);
        report.insert(SectionKey::ComplianceReview, compliance_review);

        info!(
            analysis_id = %record.analysis_id,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Analysis complete"
        );

        self.persist(record, &report).await;

        report
    }

    /// Best-effort persistence. The raw report (sentinels intact) is stored
    /// so failed sections stay diagnosable.
    async fn persist(&self, record: &ClientRecord, report: &Report) {
        let Some(store) = &self.store else {
            warn!(
                user_id = %record.profile.user_id,
                "No storage backend configured; skipping persistence"
            );
            return;
        };

        if let Err(e) = store.upsert_client(record, Some(report)).await {
            warn!(
                user_id = %record.profile.user_id,
                "Failed to persist client record, continuing: {}",
                e
            );
        }
    }
}

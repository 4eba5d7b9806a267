//! The six section agents
//!
//! Each agent maps the client record to one report section through a single
//! LLM call. Three agents (portfolio, market, tax) first run a web search
//! and interpolate the snippets into their prompt; search failures are
//! non-fatal. No agent reads another agent's output, so all six can run in
//! any order or in parallel.
//!
//! Failure contract: a generation error is recorded as an
//! `"Error: Could not complete task. ..."` sentinel string. The sentinel is
//! the permanent record for that section; it is never retried and never
//! escalated to a request-level failure. Rendering substitutes fallback
//! text for it later.

use crate::gemini::TextGenerator;
use crate::models::ClientRecord;
use crate::search::{self, WebSearch};
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info};

fn pretty_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
}

/// Run one generation call, converting any failure into the sentinel string.
async fn execute_task(
    generator: &dyn TextGenerator,
    agent_name: &str,
    system_prompt: &str,
    task: &str,
) -> String {
    match generator.generate(system_prompt, task).await {
        Ok(text) => {
            info!(agent = agent_name, "Section generated");
            text
        }
        Err(e) => {
            error!(agent = agent_name, "Task failed: {}", e);
            format!("Error: Could not complete task. {}", e)
        }
    }
}

//
// ================= Risk Assessment =================
//

pub struct RiskAssessmentAgent {
    generator: Arc<dyn TextGenerator>,
}

impl RiskAssessmentAgent {
    const SYSTEM_PROMPT: &'static str = "\
You are an expert Risk Assessment Specialist with expertise in:
- Risk tolerance assessment and profiling
- Portfolio volatility analysis (standard deviation, beta, VaR)
- Stress testing and scenario analysis
- Correlation analysis across assets
- Drawdown analysis
- Risk-adjusted return metrics (Sharpe ratio, Sortino ratio)

Provide comprehensive risk analysis with clear explanations for non-technical clients.";

    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    pub async fn conduct_risk_assessment(&self, record: &ClientRecord) -> String {
        let task = format!(
            "Conduct a comprehensive risk assessment:\n\n\
             Portfolio:\n{}\n\n\
             Client Profile:\n{}\n\n\
             Please provide:\n\
             1. Risk tolerance alignment analysis\n\
             2. Portfolio volatility metrics\n\
             3. Stress test scenarios (market crash, inflation surge, recession)\n\
             4. Concentration risk assessment\n\
             5. Risk mitigation recommendations",
            pretty_json(&record.portfolio),
            pretty_json(&record.profile)
        );

        execute_task(
            self.generator.as_ref(),
            "risk_assessor",
            Self::SYSTEM_PROMPT,
            &task,
        )
        .await
    }
}

//
// ================= Portfolio Manager =================
//

pub struct PortfolioManagerAgent {
    generator: Arc<dyn TextGenerator>,
    search: Option<Arc<dyn WebSearch>>,
}

impl PortfolioManagerAgent {
    const SYSTEM_PROMPT: &'static str = "\
You are an expert Portfolio Manager specializing in investment strategy and asset allocation.
Your expertise includes:
- Modern Portfolio Theory and asset allocation strategies
- Risk-return optimization
- Portfolio rebalancing strategies
- Diversification across asset classes
- Investment vehicle selection (stocks, bonds, ETFs, mutual funds)
- Long-term wealth building strategies

Provide detailed, actionable investment recommendations based on client goals and risk tolerance.";

    pub fn new(generator: Arc<dyn TextGenerator>, search: Option<Arc<dyn WebSearch>>) -> Self {
        Self { generator, search }
    }

    pub async fn analyze_portfolio(&self, record: &ClientRecord) -> String {
        let query = search::investment_strategy_query(&record.profile, &record.portfolio);
        let snippets = search::search_or_empty(self.search.as_deref(), &query).await;

        let task = format!(
            "Analyze the following portfolio and provide comprehensive recommendations:\n\n\
             Portfolio Data:\n{}\n\n\
             Client Profile:\n{}\n\n\
             Current Strategy Research:\n{}\n\n\
             Please provide:\n\
             1. Current allocation analysis\n\
             2. Risk-adjusted performance assessment\n\
             3. Rebalancing recommendations\n\
             4. Diversification improvements\n\
             5. Expected returns and risk metrics",
            pretty_json(&record.portfolio),
            pretty_json(&record.profile),
            search::format_snippets(&snippets)
        );

        execute_task(
            self.generator.as_ref(),
            "portfolio_manager",
            Self::SYSTEM_PROMPT,
            &task,
        )
        .await
    }
}

//
// ================= Tax Optimization =================
//

pub struct TaxOptimizationAgent {
    generator: Arc<dyn TextGenerator>,
    search: Option<Arc<dyn WebSearch>>,
}

impl TaxOptimizationAgent {
    const SYSTEM_PROMPT: &'static str = "\
You are an expert Tax Optimization Specialist with deep knowledge of:
- Tax-loss harvesting strategies
- Capital gains and losses management
- Tax-efficient fund placement (tax-advantaged vs taxable accounts)
- Qualified dividend strategies
- Tax brackets and marginal tax rate optimization

Provide specific, actionable tax optimization strategies while noting that clients should consult with tax professionals.";

    pub fn new(generator: Arc<dyn TextGenerator>, search: Option<Arc<dyn WebSearch>>) -> Self {
        Self { generator, search }
    }

    pub async fn identify_tax_opportunities(&self, record: &ClientRecord) -> String {
        let query = search::tax_strategy_query(&record.tax_info);
        let snippets = search::search_or_empty(self.search.as_deref(), &query).await;

        let task = format!(
            "Identify tax optimization opportunities:\n\n\
             Portfolio Holdings:\n{}\n\n\
             Tax Information:\n{}\n\n\
             Current Tax Strategy Research:\n{}\n\n\
             Please identify:\n\
             1. Tax-loss harvesting opportunities\n\
             2. Capital gains optimization strategies\n\
             3. Asset location optimization\n\
             4. Estimated tax savings\n\
             5. Implementation timeline",
            pretty_json(&record.portfolio),
            pretty_json(&record.tax_info),
            search::format_snippets(&snippets)
        );

        execute_task(
            self.generator.as_ref(),
            "tax_optimizer",
            Self::SYSTEM_PROMPT,
            &task,
        )
        .await
    }
}

//
// ================= Market Research =================
//

pub struct MarketResearchAgent {
    generator: Arc<dyn TextGenerator>,
    search: Option<Arc<dyn WebSearch>>,
}

impl MarketResearchAgent {
    const SYSTEM_PROMPT: &'static str = "\
You are an expert Market Research Analyst specializing in:
- Macroeconomic trend analysis
- Sector rotation strategies
- Industry and sector performance analysis
- Economic indicator interpretation (GDP, inflation, unemployment, interest rates)
- Global market dynamics

Provide data-driven insights and forward-looking market perspectives.";

    pub fn new(generator: Arc<dyn TextGenerator>, search: Option<Arc<dyn WebSearch>>) -> Self {
        Self { generator, search }
    }

    pub async fn analyze_market_trends(&self) -> String {
        let query = search::market_trends_query();
        let snippets = search::search_or_empty(self.search.as_deref(), &query).await;

        let task = format!(
            "Provide current market analysis:\n\n\
             Current Market Research:\n{}\n\n\
             Please analyze:\n\
             1. Current economic environment and key trends\n\
             2. Sector performance and outlook\n\
             3. Interest rate impact\n\
             4. Inflation considerations\n\
             5. Investment opportunities and risks\n\
             6. 6-12 month outlook",
            search::format_snippets(&snippets)
        );

        execute_task(
            self.generator.as_ref(),
            "market_researcher",
            Self::SYSTEM_PROMPT,
            &task,
        )
        .await
    }
}

//
// ================= Financial Planning =================
//

pub struct FinancialPlanningAgent {
    generator: Arc<dyn TextGenerator>,
}

impl FinancialPlanningAgent {
    const SYSTEM_PROMPT: &'static str = "\
You are an expert Financial Planning Specialist with expertise in:
- Comprehensive financial planning
- Goal-based investing strategies
- Retirement planning and projections
- Education funding (529 plans, etc.)
- Cash flow analysis and budgeting
- Milestone-based financial roadmaps

Create clear, actionable financial plans with realistic timelines and measurable milestones.";

    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    pub async fn create_financial_plan(&self, record: &ClientRecord) -> String {
        let task = format!(
            "Create a comprehensive financial plan:\n\n\
             Client Data:\n{}\n\n\
             Financial Goals:\n{}\n\n\
             Portfolio:\n{}\n\n\
             Please provide:\n\
             1. Current financial situation assessment\n\
             2. Goal prioritization and timeline\n\
             3. Savings and investment requirements\n\
             4. Milestone-based action plan\n\
             5. Progress tracking recommendations\n\
             6. Contingency planning",
            pretty_json(&record.profile),
            pretty_json(&record.goals),
            pretty_json(&record.portfolio)
        );

        execute_task(
            self.generator.as_ref(),
            "financial_planner",
            Self::SYSTEM_PROMPT,
            &task,
        )
        .await
    }
}

//
// ================= Compliance =================
//

pub struct ComplianceAgent {
    generator: Arc<dyn TextGenerator>,
}

impl ComplianceAgent {
    const SYSTEM_PROMPT: &'static str = "\
You are an expert Compliance Officer specializing in:
- SEC regulations and compliance
- FINRA rules and guidelines
- Fiduciary duty standards
- Documentation requirements
- Risk disclosure protocols
- KYC (Know Your Customer) procedures

Ensure all recommendations meet regulatory requirements and proper disclosures are made.";

    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    pub async fn review_client_submission(&self, record: &ClientRecord) -> String {
        let task = format!(
            "Review the following client submission for compliance:\n\n\
             Client Profile:\n{}\n\n\
             Portfolio:\n{}\n\n\
             Stated Goals:\n{}\n\n\
             Please verify:\n\
             1. Regulatory compliance (SEC, FINRA)\n\
             2. Appropriate risk disclosures\n\
             3. Suitability for client\n\
             4. Documentation requirements\n\
             5. Required client acknowledgments\n\
             6. Any compliance concerns or flags",
            pretty_json(&record.profile),
            pretty_json(&record.portfolio),
            pretty_json(&record.goals)
        );

        execute_task(
            self.generator.as_ref(),
            "compliance_officer",
            Self::SYSTEM_PROMPT,
            &task,
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AdvisoryError;
    use crate::models::{Portfolio, Profile, TaxInfo};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct EchoGenerator {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl TextGenerator for EchoGenerator {
        async fn generate(&self, _system_prompt: &str, task: &str) -> crate::Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(format!("analysis of: {}", &task[..task.len().min(40)]))
        }
    }

    struct FailingGenerator;

    #[async_trait]
    impl TextGenerator for FailingGenerator {
        async fn generate(&self, _system_prompt: &str, _task: &str) -> crate::Result<String> {
            Err(AdvisoryError::LlmError(
                "Empty response from Gemini".to_string(),
            ))
        }
    }

    fn sample_record() -> ClientRecord {
        ClientRecord::new(
            Profile {
                user_id: "client_001".to_string(),
                name: "John Doe".to_string(),
                age: 45,
                income: 150_000.0,
                risk_tolerance: Default::default(),
                investment_timeline: "15 years".to_string(),
            },
            Portfolio::default(),
            TaxInfo::default(),
            vec![],
        )
    }

    #[tokio::test]
    async fn test_failed_generation_records_sentinel() {
        let agent = RiskAssessmentAgent::new(Arc::new(FailingGenerator));
        let text = agent.conduct_risk_assessment(&sample_record()).await;

        assert!(text.starts_with("Error: Could not complete task."));
        assert!(text.contains("Empty response from Gemini"));
    }

    #[tokio::test]
    async fn test_portfolio_agent_runs_without_search_backend() {
        let generator = Arc::new(EchoGenerator {
            calls: AtomicUsize::new(0),
        });
        let agent = PortfolioManagerAgent::new(generator.clone(), None);

        let text = agent.analyze_portfolio(&sample_record()).await;
        assert!(text.starts_with("analysis of:"));
        assert_eq!(generator.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_market_agent_interpolates_missing_search_note() {
        struct CaptureGenerator {
            last_task: std::sync::Mutex<String>,
        }

        #[async_trait]
        impl TextGenerator for CaptureGenerator {
            async fn generate(&self, _system: &str, task: &str) -> crate::Result<String> {
                *self.last_task.lock().unwrap() = task.to_string();
                Ok("ok".to_string())
            }
        }

        let generator = Arc::new(CaptureGenerator {
            last_task: std::sync::Mutex::new(String::new()),
        });
        let agent = MarketResearchAgent::new(generator.clone(), None);
        agent.analyze_market_trends().await;

        let task = generator.last_task.lock().unwrap().clone();
        assert!(task.contains("No web search results available."));
    }
}

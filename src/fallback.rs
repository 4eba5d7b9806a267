//! Fallback section generation
//!
//! When an agent's output is missing, blank, or a recorded error sentinel,
//! the rendered report substitutes a deterministic paragraph built from the
//! client record alone. No external calls are made here. Substitution
//! happens at render time; the stored report keeps the raw value.

use crate::models::{format_usd, ClientRecord, SectionKey};

/// Upstream error phrasings recognized in stored section text. The
/// generation client returns typed errors, but sentinels recorded by agents
/// (and legacy stored reports) are plain strings, so rendering still has to
/// recognize them.
const FAILURE_PATTERNS: [&str; 3] = ["error:", "empty response", "could not complete task"];

/// True when the stored section text should be replaced by fallback text.
pub fn is_failure(text: &str) -> bool {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return true;
    }

    let lowered = trimmed.to_lowercase();
    FAILURE_PATTERNS
        .iter()
        .any(|pattern| lowered.contains(pattern))
}

/// Resolve a section to displayable text: the agent's output when healthy,
/// fallback text otherwise.
pub fn resolve_section(key: SectionKey, raw: Option<&str>, record: &ClientRecord) -> String {
    match raw {
        Some(text) if !is_failure(text) => text.to_string(),
        _ => fallback_section(key, record),
    }
}

/// Deterministic local paragraph for one section.
pub fn fallback_section(key: SectionKey, record: &ClientRecord) -> String {
    match key {
        SectionKey::RiskAssessment => risk_assessment(record),
        SectionKey::PortfolioAnalysis => portfolio_analysis(record),
        SectionKey::TaxOptimization => tax_optimization(record),
        SectionKey::MarketResearch => market_research(record),
        SectionKey::FinancialPlan => financial_plan(record),
        SectionKey::ComplianceReview => compliance_review(record),
    }
}

fn risk_assessment(record: &ClientRecord) -> String {
    let profile = &record.profile;
    let score = record
        .portfolio
        .risk_score
        .map(|s| format!(" The portfolio carries a recorded risk score of {:.1}/10.", s))
        .unwrap_or_default();

    format!(
        "Based on the submitted profile, {} (age {}) reports a {} risk tolerance \
         with an investment timeline of {}. A portfolio of {} should be reviewed \
         against that tolerance, with particular attention to concentration in any \
         single asset class and to drawdown behavior in stressed markets.{}",
        profile.name,
        profile.age,
        profile.risk_tolerance,
        profile.investment_timeline,
        format_usd(record.portfolio.total_value),
        score
    )
}

fn portfolio_analysis(record: &ClientRecord) -> String {
    let portfolio = &record.portfolio;

    let holdings = if portfolio.holdings.is_empty() {
        "no holdings were provided".to_string()
    } else {
        portfolio
            .holdings
            .iter()
            .map(|(label, amount)| format!("{} at {}", label, format_usd(*amount)))
            .collect::<Vec<_>>()
            .join(", ")
    };

    format!(
        "The portfolio totals {} across the following allocations: {}. A standard \
         review would compare this mix against the client's {} risk tolerance, \
         rebalance positions that have drifted from target weights, and confirm \
         adequate diversification across asset classes.",
        format_usd(portfolio.total_value),
        holdings,
        record.profile.risk_tolerance
    )
}

fn tax_optimization(record: &ClientRecord) -> String {
    let tax = &record.tax_info;
    let bracket = tax.tax_bracket.as_deref().unwrap_or("an unspecified");
    let state = tax.state.as_deref().unwrap_or("an unspecified state");
    let filing = tax.filing_status.as_deref().unwrap_or("unspecified");

    format!(
        "With {} tax bracket, {} filing status, and residence in {}, standard \
         opportunities to evaluate include tax-loss harvesting in taxable accounts, \
         asset location between tax-advantaged and taxable accounts, and the timing \
         of capital gains. A licensed tax professional should review any specific \
         strategy before implementation.",
        bracket, filing, state
    )
}

fn market_research(record: &ClientRecord) -> String {
    format!(
        "Live market research is unavailable for this report. As a general \
         orientation for a {} investor with a {} timeline: broad-market index \
         exposure, regular rebalancing, and attention to interest-rate and \
         inflation trends remain the baseline considerations for positioning a \
         portfolio of this size ({}).",
        record.profile.risk_tolerance,
        record.profile.investment_timeline,
        format_usd(record.portfolio.total_value)
    )
}

fn financial_plan(record: &ClientRecord) -> String {
    if record.goals.is_empty() {
        return format!(
            "No financial goals were submitted. A plan for {} would begin by \
             establishing concrete goals with target amounts and timelines, then \
             mapping required savings rates against current income of {}.",
            record.profile.name,
            format_usd(record.profile.income)
        );
    }

    let goals = record
        .goals
        .iter()
        .map(|g| {
            format!(
                "{} ({} in {}, {} priority)",
                g.name,
                format_usd(g.target_amount),
                g.timeline,
                g.priority
            )
        })
        .collect::<Vec<_>>()
        .join("; ");

    format!(
        "The submitted goals are: {}. A milestone-based plan would fund these in \
         priority order from current income of {}, review progress annually, and \
         adjust contributions as timelines shorten.",
        goals,
        format_usd(record.profile.income)
    )
}

fn compliance_review(record: &ClientRecord) -> String {
    format!(
        "This report was generated for {} for informational purposes only and does \
         not constitute individualized investment advice. Recommendations should be \
         reviewed for suitability against the client's stated risk tolerance and \
         objectives, with appropriate risk disclosures, before any action is taken. \
         Consult licensed financial, tax, and legal professionals.",
        record.profile.name
    )
}

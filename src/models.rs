//! Core data models for the advisory system
//!
//! A `ClientRecord` is built once per analysis request and never mutated;
//! every agent reads the same record.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

//
// ================= Enums =================
//

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum RiskTolerance {
    Conservative,
    #[default]
    Moderate,
    Aggressive,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum GoalPriority {
    High,
    #[default]
    Medium,
    Low,
}

/// The six fixed report sections, declared in render order.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
#[serde(rename_all = "snake_case")]
pub enum SectionKey {
    RiskAssessment,
    PortfolioAnalysis,
    TaxOptimization,
    MarketResearch,
    FinancialPlan,
    ComplianceReview,
}

impl SectionKey {
    pub const ALL: [SectionKey; 6] = [
        SectionKey::RiskAssessment,
        SectionKey::PortfolioAnalysis,
        SectionKey::TaxOptimization,
        SectionKey::MarketResearch,
        SectionKey::FinancialPlan,
        SectionKey::ComplianceReview,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SectionKey::RiskAssessment => "risk_assessment",
            SectionKey::PortfolioAnalysis => "portfolio_analysis",
            SectionKey::TaxOptimization => "tax_optimization",
            SectionKey::MarketResearch => "market_research",
            SectionKey::FinancialPlan => "financial_plan",
            SectionKey::ComplianceReview => "compliance_review",
        }
    }

    /// Human-readable heading used in the rendered report.
    pub fn title(&self) -> &'static str {
        match self {
            SectionKey::RiskAssessment => "Risk Assessment",
            SectionKey::PortfolioAnalysis => "Portfolio Analysis",
            SectionKey::TaxOptimization => "Tax Optimization Opportunities",
            SectionKey::MarketResearch => "Market Research & Trends",
            SectionKey::FinancialPlan => "Financial Planning",
            SectionKey::ComplianceReview => "Compliance Review",
        }
    }
}

impl fmt::Display for SectionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

//
// ================= Client Record =================
//

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct Profile {
    pub user_id: String,
    pub name: String,
    pub age: u32,
    pub income: f64,
    pub risk_tolerance: RiskTolerance,
    pub investment_timeline: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct Portfolio {
    pub user_id: String,
    pub total_value: f64,
    /// Asset-class label → dollar amount. Labels are free-form.
    pub holdings: BTreeMap<String, f64>,
    pub risk_score: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct TaxInfo {
    pub tax_bracket: Option<String>,
    pub state: Option<String>,
    pub filing_status: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Goal {
    pub name: String,
    pub target_amount: f64,
    pub timeline: String,
    #[serde(default)]
    pub priority: GoalPriority,
}

/// The aggregate driving one analysis request. Immutable after creation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClientRecord {
    pub analysis_id: Uuid,
    pub profile: Profile,
    pub portfolio: Portfolio,
    pub tax_info: TaxInfo,
    pub goals: Vec<Goal>,
}

impl ClientRecord {
    pub fn new(
        profile: Profile,
        portfolio: Portfolio,
        tax_info: TaxInfo,
        goals: Vec<Goal>,
    ) -> Self {
        Self {
            analysis_id: Uuid::new_v4(),
            profile,
            portfolio,
            tax_info,
            goals,
        }
    }

    /// Basic form constraints. Checked before any outbound call is made.
    pub fn validate(&self) -> crate::Result<()> {
        if self.profile.user_id.trim().is_empty() {
            return Err(crate::error::AdvisoryError::ValidationError(
                "profile.user_id is required".to_string(),
            ));
        }

        for (label, amount) in &self.portfolio.holdings {
            if *amount < 0.0 {
                return Err(crate::error::AdvisoryError::ValidationError(format!(
                    "holding '{}' has a negative amount",
                    label
                )));
            }
        }

        Ok(())
    }
}

//
// ================= Report =================
//

/// Section key → generated text. Sentinel values are stored as-is; fallback
/// substitution happens at render time.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(transparent)]
pub struct Report {
    sections: BTreeMap<SectionKey, String>,
}

impl Report {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: SectionKey, text: String) {
        self.sections.insert(key, text);
    }

    pub fn get(&self, key: SectionKey) -> Option<&str> {
        self.sections.get(&key).map(String::as_str)
    }

    pub fn sections(&self) -> impl Iterator<Item = (SectionKey, &str)> {
        self.sections.iter().map(|(k, v)| (*k, v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}

//
// ================= Search =================
//

/// One web-search result snippet.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct SearchSnippet {
    pub title: String,
    pub url: String,
    pub content: String,
}

//
// ================= Formatting =================
//

/// Format a dollar amount with thousands separators, e.g. `$500,000`.
pub fn format_usd(amount: f64) -> String {
    let rounded = amount.round() as i64;
    let negative = rounded < 0;
    let digits = rounded.unsigned_abs().to_string();

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    if negative {
        format!("-${}", grouped)
    } else {
        format!("${}", grouped)
    }
}

impl fmt::Display for RiskTolerance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RiskTolerance::Conservative => "conservative",
            RiskTolerance::Moderate => "moderate",
            RiskTolerance::Aggressive => "aggressive",
        };
        write!(f, "{}", s)
    }
}

impl fmt::Display for GoalPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            GoalPriority::High => "high",
            GoalPriority::Medium => "medium",
            GoalPriority::Low => "low",
        };
        write!(f, "{}", s)
    }
}

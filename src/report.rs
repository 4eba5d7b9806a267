//! Report rendering
//!
//! Assembles the six sections into one markdown document. Each section is
//! resolved through the fallback check first, so an error sentinel or empty
//! section renders as locally templated text, never as the raw sentinel.

use crate::fallback;
use crate::models::{ClientRecord, Report, SectionKey};

const REPORT_FOOTER: &str = "*This report is for informational purposes only and does not \
constitute financial advice. Please consult with licensed financial professionals before \
making investment decisions.*";

/// Render the full advisory report as markdown.
pub fn render_report(report: &Report, record: &ClientRecord) -> String {
    let mut out = String::new();

    out.push_str("# Comprehensive Financial Advisory Report\n");
    out.push_str(&format!(
        "Generated: {}\n",
        chrono::Utc::now().format("%Y-%m-%d %H:%M:%S")
    ));

    for key in SectionKey::ALL {
        out.push_str("\n---\n\n");
        out.push_str(&format!("## {}\n", key.title()));
        out.push_str(&fallback::resolve_section(key, report.get(key), record));
        out.push('\n');
    }

    out.push_str("\n---\n\n");
    out.push_str(REPORT_FOOTER);
    out.push('\n');

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Portfolio, Profile, TaxInfo};
    use std::collections::BTreeMap;

    fn sample_record() -> ClientRecord {
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
                risk_tolerance: Default::default(),
                investment_timeline: "15 years".to_string(),
            },
            Portfolio {
                user_id: "client_001".to_string(),
                total_value: 500_000.0,
                holdings,
                risk_score: Some(6.5),
            },
            TaxInfo::default(),
            vec![],
        )
    }

    #[test]
    fn test_render_includes_all_section_titles() {
        let report = Report::new();
        let rendered = render_report(&report, &sample_record());

        for key in SectionKey::ALL {
            assert!(rendered.contains(key.title()), "missing {}", key.title());
        }
        assert!(rendered.contains("informational purposes only"));
    }

    #[test]
    fn test_render_never_shows_raw_sentinel() {
        let mut report = Report::new();
        report.insert(
            SectionKey::PortfolioAnalysis,
            "Error: Could not complete task. Empty response from Gemini".to_string(),
        );
        report.insert(SectionKey::MarketResearch, "".to_string());
        report.insert(
            SectionKey::RiskAssessment,
            "Volatility is moderate.".to_string(),
        );

        let rendered = render_report(&report, &sample_record());

        assert!(!rendered.contains("Error: Could not complete task."));
        assert!(rendered.contains("Volatility is moderate."));
        // The failed portfolio section falls back to holdings + total.
        assert!(rendered.contains("$500,000"));
        assert!(rendered.contains("stocks"));
    }
}

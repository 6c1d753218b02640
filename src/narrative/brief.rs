use std::fmt::Write;

use crate::currency::{format_currency, format_percent, format_runway, FormatSettings};
use crate::engine::{CategoryBreakdown, ComparisonResult, ScenarioReport};

const SAMPLE_ITEMS_PER_CATEGORY: usize = 3;
const RULE: &str = "────────────────────────────────────────";

/// Structured text describing both sides of a comparison, suitable as the
/// input prompt of a narrative collaborator.
pub fn render_comparison_brief(comparison: &ComparisonResult, settings: &FormatSettings) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Scenario comparison ({})", comparison.window);
    write_report(&mut out, "Scenario A", &comparison.left, settings);
    write_report(&mut out, "Scenario B", &comparison.right, settings);

    let delta = &comparison.delta;
    let _ = writeln!(out);
    let _ = writeln!(out, "Differences (B minus A):");
    let _ = writeln!(out, "  • Total Costs: {}", format_currency(delta.total_costs, settings));
    let _ = writeln!(
        out,
        "  • Total Revenue: {}",
        format_currency(delta.total_revenue, settings)
    );
    let _ = writeln!(out, "  • Net Burn: {}", format_currency(delta.net_burn, settings));
    let _ = writeln!(
        out,
        "  • Monthly Net Burn: {}",
        format_currency(delta.monthly_net_burn, settings)
    );
    let _ = writeln!(out, "  • Growth Rate: {}", format_percent(delta.growth_rate));
    out
}

fn write_report(out: &mut String, label: &str, report: &ScenarioReport, settings: &FormatSettings) {
    let metrics = &report.metrics;
    let _ = writeln!(out);
    let _ = writeln!(out, "{label}:");
    let _ = writeln!(out, "{RULE}");
    let _ = writeln!(out, "Name: {}", report.identity.name);
    let _ = writeln!(
        out,
        "Description: {}",
        report.identity.description.as_deref().unwrap_or("N/A")
    );
    let funding = match metrics.funding {
        Some(amount) => format_currency(amount, settings),
        None => "Not specified".into(),
    };
    let _ = writeln!(out, "Funding: {funding}");
    let _ = writeln!(out);
    let _ = writeln!(out, "Financial Metrics:");
    let _ = writeln!(
        out,
        "  • Total Costs: {}",
        format_currency(metrics.total_costs, settings)
    );
    let _ = writeln!(
        out,
        "  • Total Revenue: {}",
        format_currency(metrics.total_revenue, settings)
    );
    let _ = writeln!(out, "  • Net Burn: {}", format_currency(metrics.net_burn, settings));
    let _ = writeln!(
        out,
        "  • Monthly Net Burn: {}",
        format_currency(metrics.monthly_net_burn, settings)
    );
    let _ = writeln!(out, "  • Growth Rate: {}", format_percent(metrics.growth_rate));
    let _ = writeln!(out, "  • Runway: {}", format_runway(metrics.runway_months));

    let _ = writeln!(out);
    let _ = writeln!(out, "Cost Structure ({} items):", report.cost_items);
    write_groups(out, &report.cost_breakdown, "No costs defined", settings);
    let _ = writeln!(out);
    let _ = writeln!(out, "Revenue Structure ({} items):", report.revenue_items);
    write_groups(out, &report.revenue_breakdown, "No revenues defined", settings);
}

fn write_groups(
    out: &mut String,
    breakdown: &CategoryBreakdown,
    empty: &str,
    settings: &FormatSettings,
) {
    if breakdown.is_empty() {
        let _ = writeln!(out, "  {empty}");
        return;
    }
    for group in &breakdown.groups {
        let _ = writeln!(
            out,
            "  {}: {} ({} items)",
            group.category,
            format_currency(group.category_total, settings),
            group.item_count
        );
        for title in group.item_titles.iter().take(SAMPLE_ITEMS_PER_CATEGORY) {
            let _ = writeln!(out, "    - {title}");
        }
        if group.item_titles.len() > SAMPLE_ITEMS_PER_CATEGORY {
            let _ = writeln!(
                out,
                "    ... and {} more items",
                group.item_titles.len() - SAMPLE_ITEMS_PER_CATEGORY
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ItemDraft, ScenarioIdentity, ScenarioSnapshot};
    use crate::engine::ScenarioComparator;
    use rust_decimal_macros::dec;

    fn team(name: &str, engineers: usize) -> ScenarioSnapshot {
        let items = (0..engineers).map(|idx| {
            ItemDraft::cost(format!("Engineer #{}", idx + 1), dec!(120000), 1)
                .with_category("Engineering")
                .validate()
                .unwrap()
        });
        ScenarioSnapshot::from_items(ScenarioIdentity::new(name), None, items).unwrap()
    }

    #[test]
    fn brief_lists_both_scenarios_and_the_delta() {
        let comparison = ScenarioComparator::new()
            .compare(&team("Lean", 1), &team("Scale", 5))
            .unwrap();
        let brief = render_comparison_brief(&comparison, &FormatSettings::default());

        assert!(brief.starts_with("Scenario comparison (months 1-12)"));
        assert!(brief.contains("Name: Lean"));
        assert!(brief.contains("Name: Scale"));
        assert!(brief.contains("Funding: Not specified"));
        assert!(brief.contains("  Engineering: $600,000.00 (5 items)"));
        assert!(brief.contains("    - Engineer #3"));
        assert!(!brief.contains("    - Engineer #4"));
        assert!(brief.contains("    ... and 2 more items"));
        assert!(brief.contains("No revenues defined"));
        assert!(brief.contains("  • Total Costs: $480,000.00"));
        assert!(brief.contains("  • Runway: N/A"));
    }
}

//! Stage-by-stage projection of a scenario across a window, with cumulative burn.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::{month_name, year_of, MonthWindow, ScenarioIdentity, ScenarioSnapshot};
use crate::engine::aggregator::PortfolioAggregator;
use crate::errors::{EngineError, EngineResult, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageGrouping {
    #[default]
    Monthly,
    Quarterly,
}

impl StageGrouping {
    pub fn stage_len(&self) -> u32 {
        match self {
            StageGrouping::Monthly => 1,
            StageGrouping::Quarterly => 3,
        }
    }

    /// `Qn` only for stages covering a whole calendar quarter; any other
    /// multi-month stage is labelled by its month range.
    fn label(&self, stage: MonthWindow) -> String {
        let (start, end) = (stage.start(), stage.end());
        let base = if start == end {
            month_name(start).to_string()
        } else if *self == StageGrouping::Quarterly && stage.len() == 3 && (start - 1) % 3 == 0 {
            format!("Q{}", ((start - 1) % 12) / 3 + 1)
        } else {
            format!("{}-{}", month_name(start), month_name(end))
        };
        match year_of(start) {
            1 => base,
            year => format!("Y{year} {base}"),
        }
    }
}

impl fmt::Display for StageGrouping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StageGrouping::Monthly => f.write_str("monthly"),
            StageGrouping::Quarterly => f.write_str("quarterly"),
        }
    }
}

impl FromStr for StageGrouping {
    type Err = ValidationError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "monthly" => Ok(StageGrouping::Monthly),
            "quarterly" => Ok(StageGrouping::Quarterly),
            _ => Err(ValidationError::UnknownGrouping(raw.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageMetrics {
    pub label: String,
    pub window: MonthWindow,
    pub total_costs: Decimal,
    pub total_revenue: Decimal,
    pub net_burn: Decimal,
    pub growth_rate: Decimal,
    /// Net burn summed from the first stage through this one.
    pub cumulative_burn: Decimal,
    /// Funding left after the cumulative burn; absent without funding.
    pub cash_remaining: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineProjection {
    pub identity: ScenarioIdentity,
    pub window: MonthWindow,
    pub grouping: StageGrouping,
    pub funding: Option<Decimal>,
    pub stages: Vec<StageMetrics>,
}

impl TimelineProjection {
    /// First stage whose remaining cash drops below zero.
    pub fn first_shortfall(&self) -> Option<&StageMetrics> {
        self.stages.iter().find(|stage| {
            stage
                .cash_remaining
                .map(|cash| cash < Decimal::ZERO)
                .unwrap_or(false)
        })
    }
}

pub fn project_timeline(
    snapshot: &ScenarioSnapshot,
    window: MonthWindow,
    grouping: StageGrouping,
) -> EngineResult<TimelineProjection> {
    let items: Vec<_> = snapshot
        .costs()
        .iter()
        .chain(snapshot.revenues())
        .collect();
    let mut cumulative_burn = Decimal::ZERO;
    let mut stages = Vec::new();

    for stage in window.split_by(grouping.stage_len()) {
        let totals = PortfolioAggregator::totals(items.iter().copied(), stage)?;
        let net_burn = totals.net_burn()?;
        cumulative_burn = cumulative_burn
            .checked_add(net_burn)
            .ok_or_else(|| EngineError::overflow("cumulative burn"))?;
        let cash_remaining = match snapshot.funding() {
            Some(funding) => Some(
                funding
                    .checked_sub(cumulative_burn)
                    .ok_or_else(|| EngineError::overflow("cash remaining"))?,
            ),
            None => None,
        };
        stages.push(StageMetrics {
            label: grouping.label(stage),
            window: stage,
            total_costs: totals.costs,
            total_revenue: totals.revenue,
            net_burn,
            growth_rate: PortfolioAggregator::growth_rate(totals.costs, totals.revenue)?,
            cumulative_burn,
            cash_remaining,
        });
    }

    debug!(
        scenario = %snapshot.identity().name,
        stages = stages.len(),
        grouping = %grouping,
        "projected timeline"
    );

    Ok(TimelineProjection {
        identity: snapshot.identity().clone(),
        window,
        grouping,
        funding: snapshot.funding(),
        stages,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ItemDraft;
    use rust_decimal_macros::dec;

    fn scenario(funding: Option<Decimal>) -> ScenarioSnapshot {
        ScenarioSnapshot::from_items(
            ScenarioIdentity::new("Runway check"),
            funding,
            vec![
                ItemDraft::cost("Engineer", dec!(120000), 1).validate().unwrap(),
                ItemDraft::revenue("MRR", dec!(60000), 7).validate().unwrap(),
            ],
        )
        .unwrap()
    }

    #[test]
    fn quarterly_stages_accumulate_burn() {
        let projection = project_timeline(
            &scenario(Some(dec!(100000))),
            MonthWindow::FIRST_YEAR,
            StageGrouping::Quarterly,
        )
        .unwrap();
        let labels: Vec<_> = projection.stages.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(labels, vec!["Q1", "Q2", "Q3", "Q4"]);

        assert_eq!(projection.stages[0].net_burn, dec!(30000));
        assert_eq!(projection.stages[2].net_burn, dec!(15000));
        assert_eq!(projection.stages[3].cumulative_burn, dec!(90000));
        assert_eq!(projection.stages[3].cash_remaining, Some(dec!(10000)));
        assert!(projection.first_shortfall().is_none());
    }

    #[test]
    fn stage_totals_add_up_to_the_window_total() {
        let snapshot = scenario(None);
        let projection =
            project_timeline(&snapshot, MonthWindow::FIRST_YEAR, StageGrouping::Monthly).unwrap();
        let summed: Decimal = projection.stages.iter().map(|s| s.total_costs).sum();
        let whole = PortfolioAggregator::aggregate_snapshot(&snapshot, MonthWindow::FIRST_YEAR)
            .unwrap();
        assert_eq!(summed, whole.total_costs);
        assert_eq!(projection.stages.len(), 12);
        assert!(projection.stages.iter().all(|s| s.cash_remaining.is_none()));
    }

    #[test]
    fn later_years_are_prefixed() {
        let window = MonthWindow::new(12, 15).unwrap();
        let projection = project_timeline(&scenario(None), window, StageGrouping::Monthly).unwrap();
        let labels: Vec<_> = projection.stages.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(labels, vec!["Dec", "Y2 Jan", "Y2 Feb", "Y2 Mar"]);
    }

    #[test]
    fn reports_first_shortfall() {
        let projection = project_timeline(
            &scenario(Some(dec!(25000))),
            MonthWindow::FIRST_YEAR,
            StageGrouping::Monthly,
        )
        .unwrap();
        let shortfall = projection.first_shortfall().expect("funding runs out");
        assert_eq!(shortfall.label, "Mar");
    }

    #[test]
    fn grouping_parses_from_config_strings() {
        assert_eq!("Quarterly".parse::<StageGrouping>().unwrap(), StageGrouping::Quarterly);
        assert_eq!(
            "weekly".parse::<StageGrouping>(),
            Err(ValidationError::UnknownGrouping("weekly".into()))
        );
    }

    #[test]
    fn misaligned_quarters_are_labelled_by_month_range() {
        let window = MonthWindow::new(2, 12).unwrap();
        let projection =
            project_timeline(&scenario(None), window, StageGrouping::Quarterly).unwrap();
        let labels: Vec<_> = projection.stages.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(labels, vec!["Feb-Apr", "May-Jul", "Aug-Oct", "Nov-Dec"]);
    }

    #[test]
    fn aligned_quarters_in_later_years_keep_quarter_labels() {
        let window = MonthWindow::new(13, 20).unwrap();
        let projection =
            project_timeline(&scenario(None), window, StageGrouping::Quarterly).unwrap();
        let labels: Vec<_> = projection.stages.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(labels, vec!["Y2 Q1", "Y2 Q2", "Y2 Jul-Aug"]);
    }
}

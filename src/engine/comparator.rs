//! Side-by-side metrics for two scenarios.

use std::fmt;
use std::sync::Arc;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::domain::{MonthWindow, ScenarioIdentity, ScenarioSnapshot};
use crate::engine::aggregator::{Metrics, PortfolioAggregator};
use crate::engine::breakdown::CategoryBreakdown;
use crate::errors::{EngineError, EngineResult};
use crate::narrative::{NarrativeCollaborator, NarrativeError};

/// Everything computed for one side of a comparison.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioReport {
    pub identity: ScenarioIdentity,
    pub metrics: Metrics,
    pub cost_breakdown: CategoryBreakdown,
    pub revenue_breakdown: CategoryBreakdown,
    pub cost_items: usize,
    pub revenue_items: usize,
}

impl ScenarioReport {
    pub fn build(snapshot: &ScenarioSnapshot, window: MonthWindow) -> EngineResult<Self> {
        Ok(Self {
            identity: snapshot.identity().clone(),
            metrics: PortfolioAggregator::aggregate_snapshot(snapshot, window)?,
            cost_breakdown: CategoryBreakdown::build(snapshot.costs(), window)?,
            revenue_breakdown: CategoryBreakdown::build(snapshot.revenues(), window)?,
            cost_items: snapshot.costs().len(),
            revenue_items: snapshot.revenues().len(),
        })
    }
}

/// Right-minus-left differences. Carries no judgement about which side is better.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsDelta {
    pub total_costs: Decimal,
    pub total_revenue: Decimal,
    pub net_burn: Decimal,
    pub monthly_net_burn: Decimal,
    pub growth_rate: Decimal,
}

impl MetricsDelta {
    fn between(left: &Metrics, right: &Metrics) -> EngineResult<Self> {
        let diff = |r: Decimal, l: Decimal, what: &str| {
            r.checked_sub(l).ok_or_else(|| EngineError::overflow(what))
        };
        Ok(Self {
            total_costs: diff(right.total_costs, left.total_costs, "cost delta")?,
            total_revenue: diff(right.total_revenue, left.total_revenue, "revenue delta")?,
            net_burn: diff(right.net_burn, left.net_burn, "net burn delta")?,
            monthly_net_burn: diff(
                right.monthly_net_burn,
                left.monthly_net_burn,
                "monthly net burn delta",
            )?,
            growth_rate: diff(right.growth_rate, left.growth_rate, "growth rate delta")?,
        })
    }
}

/// Structured comparison handed to the narrative collaborator or an API response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparisonResult {
    pub window: MonthWindow,
    pub left: ScenarioReport,
    pub right: ScenarioReport,
    pub delta: MetricsDelta,
}

/// A comparison plus the collaborator's prose, passed through unmodified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NarratedComparison {
    pub comparison: ComparisonResult,
    pub narrative: String,
}

/// Runs the aggregator over two scenarios. A narrative collaborator may be injected
/// by the host; the comparator never owns its lifetime.
#[derive(Clone)]
pub struct ScenarioComparator {
    window: MonthWindow,
    narrator: Option<Arc<dyn NarrativeCollaborator>>,
}

impl Default for ScenarioComparator {
    fn default() -> Self {
        Self {
            window: MonthWindow::FIRST_YEAR,
            narrator: None,
        }
    }
}

impl fmt::Debug for ScenarioComparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScenarioComparator")
            .field("window", &self.window)
            .field("has_narrator", &self.narrator.is_some())
            .finish()
    }
}

impl ScenarioComparator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_window(mut self, window: MonthWindow) -> Self {
        self.window = window;
        self
    }

    pub fn with_narrator(mut self, narrator: Arc<dyn NarrativeCollaborator>) -> Self {
        self.narrator = Some(narrator);
        self
    }

    pub fn window(&self) -> MonthWindow {
        self.window
    }

    pub fn compare(
        &self,
        left: &ScenarioSnapshot,
        right: &ScenarioSnapshot,
    ) -> EngineResult<ComparisonResult> {
        let left_report = ScenarioReport::build(left, self.window)?;
        let right_report = ScenarioReport::build(right, self.window)?;
        let delta = MetricsDelta::between(&left_report.metrics, &right_report.metrics)?;
        info!(
            left = %left.identity().name,
            right = %right.identity().name,
            window = %self.window,
            "compared scenarios"
        );
        Ok(ComparisonResult {
            window: self.window,
            left: left_report,
            right: right_report,
            delta,
        })
    }

    /// Compares, then asks the injected collaborator for prose about the result.
    pub fn compare_and_narrate(
        &self,
        left: &ScenarioSnapshot,
        right: &ScenarioSnapshot,
    ) -> EngineResult<NarratedComparison> {
        let narrator = self
            .narrator
            .as_ref()
            .ok_or(EngineError::Narrative(NarrativeError::Unavailable))?;
        let comparison = self.compare(left, right)?;
        let narrative = narrator.narrate_comparison(&comparison)?;
        Ok(NarratedComparison {
            comparison,
            narrative,
        })
    }
}

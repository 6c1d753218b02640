//! Portfolio-level burn, runway and growth metrics for a single scenario.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::scenario::ensure_bag_kind;
use crate::domain::{ItemKind, MonthWindow, RecurringItem, ScenarioSnapshot};
use crate::engine::amortizer::amortize;
use crate::errors::{EngineError, EngineResult};

const PERCENT: Decimal = dec!(100);

/// How long funding lasts at the current monthly net burn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Runway {
    /// Revenue covers or exceeds cost; funding is never exhausted.
    Infinite,
    Months { months: Decimal },
}

impl Runway {
    pub fn months(&self) -> Option<Decimal> {
        match self {
            Runway::Infinite => None,
            Runway::Months { months } => Some(*months),
        }
    }

    pub fn is_infinite(&self) -> bool {
        matches!(self, Runway::Infinite)
    }
}

/// Windowed cost and revenue sums, split by ledger side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LedgerTotals {
    pub costs: Decimal,
    pub revenue: Decimal,
    pub active_costs: usize,
    pub active_revenues: usize,
}

impl LedgerTotals {
    fn record(&mut self, item: &RecurringItem, window: MonthWindow) -> EngineResult<()> {
        if !item.is_active() {
            return Ok(());
        }
        let share = amortize(item, window);
        match item.kind() {
            ItemKind::Cost => {
                self.costs = self
                    .costs
                    .checked_add(share)
                    .ok_or_else(|| EngineError::overflow("total costs"))?;
                self.active_costs += 1;
            }
            ItemKind::Revenue => {
                self.revenue = self
                    .revenue
                    .checked_add(share)
                    .ok_or_else(|| EngineError::overflow("total revenue"))?;
                self.active_revenues += 1;
            }
        }
        Ok(())
    }

    /// Costs minus revenue; positive while spending more than earning.
    pub fn net_burn(&self) -> EngineResult<Decimal> {
        self.costs
            .checked_sub(self.revenue)
            .ok_or_else(|| EngineError::overflow("net burn"))
    }
}

/// Summary health metrics of one scenario over one window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metrics {
    pub window: MonthWindow,
    pub funding: Option<Decimal>,
    pub total_costs: Decimal,
    pub total_revenue: Decimal,
    pub net_burn: Decimal,
    pub monthly_burn: Decimal,
    pub monthly_revenue: Decimal,
    pub monthly_net_burn: Decimal,
    /// `(revenue - costs) / costs * 100` over the same window. A profitability
    /// ratio, not a period-over-period trend.
    pub growth_rate: Decimal,
    pub runway_months: Option<Runway>,
    pub active_costs: usize,
    pub active_revenues: usize,
}

/// Sums amortized item values and derives scenario metrics.
pub struct PortfolioAggregator;

impl PortfolioAggregator {
    /// Sums the amortized share of every active item, routed by its kind.
    pub fn totals<'a, I>(items: I, window: MonthWindow) -> EngineResult<LedgerTotals>
    where
        I: IntoIterator<Item = &'a RecurringItem>,
    {
        let mut totals = LedgerTotals::default();
        for item in items {
            totals.record(item, window)?;
        }
        Ok(totals)
    }

    /// Every item in `costs` must be a cost and every item in `revenues` a
    /// revenue; a misplaced item is a [`KindMismatch`](crate::ValidationError::KindMismatch).
    pub fn aggregate(
        costs: &[RecurringItem],
        revenues: &[RecurringItem],
        funding: Option<Decimal>,
        window: MonthWindow,
    ) -> EngineResult<Metrics> {
        ensure_bag_kind(costs, ItemKind::Cost)?;
        ensure_bag_kind(revenues, ItemKind::Revenue)?;
        let totals = Self::totals(costs.iter().chain(revenues), window)?;
        let metrics = Self::metrics_from_totals(totals, funding, window)?;
        debug!(
            window = %window,
            costs = costs.len(),
            revenues = revenues.len(),
            total_costs = %metrics.total_costs,
            total_revenue = %metrics.total_revenue,
            "aggregated portfolio"
        );
        Ok(metrics)
    }

    /// [`aggregate`](Self::aggregate) over months 1 through 12.
    pub fn aggregate_first_year(
        costs: &[RecurringItem],
        revenues: &[RecurringItem],
        funding: Option<Decimal>,
    ) -> EngineResult<Metrics> {
        Self::aggregate(costs, revenues, funding, MonthWindow::FIRST_YEAR)
    }

    pub fn aggregate_snapshot(
        snapshot: &ScenarioSnapshot,
        window: MonthWindow,
    ) -> EngineResult<Metrics> {
        Self::aggregate(
            snapshot.costs(),
            snapshot.revenues(),
            snapshot.funding(),
            window,
        )
    }

    pub fn metrics_from_totals(
        totals: LedgerTotals,
        funding: Option<Decimal>,
        window: MonthWindow,
    ) -> EngineResult<Metrics> {
        let months = Decimal::from(window.len());
        let net_burn = totals.net_burn()?;
        let monthly_burn = per_month(totals.costs, months, "monthly burn")?;
        let monthly_revenue = per_month(totals.revenue, months, "monthly revenue")?;
        let monthly_net_burn = per_month(net_burn, months, "monthly net burn")?;

        Ok(Metrics {
            window,
            funding,
            total_costs: totals.costs,
            total_revenue: totals.revenue,
            net_burn,
            monthly_burn,
            monthly_revenue,
            monthly_net_burn,
            growth_rate: Self::growth_rate(totals.costs, totals.revenue)?,
            runway_months: Self::runway_for(funding, monthly_net_burn)?,
            active_costs: totals.active_costs,
            active_revenues: totals.active_revenues,
        })
    }

    /// `(revenue - costs) / costs * 100`, or zero when there are no costs.
    pub fn growth_rate(total_costs: Decimal, total_revenue: Decimal) -> EngineResult<Decimal> {
        if total_costs <= Decimal::ZERO {
            return Ok(Decimal::ZERO);
        }
        total_revenue
            .checked_sub(total_costs)
            .and_then(|surplus| surplus.checked_div(total_costs))
            .and_then(|ratio| ratio.checked_mul(PERCENT))
            .ok_or_else(|| EngineError::overflow("growth rate"))
    }

    /// Runway policy: absent or zero funding has no runway, non-positive burn is
    /// infinite, anything else is `funding / monthly_net_burn`.
    pub fn runway_for(
        funding: Option<Decimal>,
        monthly_net_burn: Decimal,
    ) -> EngineResult<Option<Runway>> {
        let funding = match funding {
            Some(amount) if amount > Decimal::ZERO => amount,
            _ => return Ok(None),
        };
        if monthly_net_burn <= Decimal::ZERO {
            return Ok(Some(Runway::Infinite));
        }
        let months = funding
            .checked_div(monthly_net_burn)
            .ok_or_else(|| EngineError::overflow("runway"))?;
        Ok(Some(Runway::Months { months }))
    }
}

fn per_month(total: Decimal, months: Decimal, what: &str) -> EngineResult<Decimal> {
    total
        .checked_div(months)
        .ok_or_else(|| EngineError::Computation(format!("cannot spread {what} over {months} months")))
}

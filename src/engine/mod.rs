//! Pure projection services: amortization, aggregation, breakdowns, comparison
//! and stage timelines. Nothing in here performs I/O.

pub mod aggregator;
pub mod amortizer;
pub mod breakdown;
pub mod comparator;
pub mod timeline;

pub use aggregator::{LedgerTotals, Metrics, PortfolioAggregator, Runway};
pub use amortizer::{amortize, amortize_between, overlap_months, MONTHS_PER_YEAR};
pub use breakdown::{CategoryBreakdown, CategoryGroup};
pub use comparator::{
    ComparisonResult, MetricsDelta, NarratedComparison, ScenarioComparator, ScenarioReport,
};
pub use timeline::{project_timeline, StageGrouping, StageMetrics, TimelineProjection};

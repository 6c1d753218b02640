use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::debug;

use crate::cli::output::{self, field};
use crate::cli::{Command, WindowArgs};
use crate::config::{Config, ConfigManager};
use crate::currency::{format_currency, format_percent, format_runway, FormatSettings};
use crate::domain::{Displayable, Identifiable, MonthWindow, ScenarioSnapshot};
use crate::engine::{
    amortize, project_timeline, CategoryBreakdown, ComparisonResult, ScenarioComparator,
    ScenarioReport, StageGrouping, TimelineProjection,
};
use crate::errors::EngineResult;
use crate::narrative::{parse_template_response, BriefNarrator};
use crate::storage::{save_snapshot_to_path, JsonScenarioStore, ScenarioSource};
use crate::utils::build_info;

/// Loaded configuration plus the scenario store it points at.
pub struct CommandContext {
    config: Config,
    settings: FormatSettings,
    store: JsonScenarioStore,
}

impl CommandContext {
    pub fn load(home: Option<PathBuf>) -> EngineResult<Self> {
        let manager = match home {
            Some(dir) => ConfigManager::with_base_dir(dir)?,
            None => ConfigManager::new()?,
        };
        let config = manager.load()?;
        crate::init_with_directive(config.log_level.as_deref());
        let store = JsonScenarioStore::new(manager.scenarios_dir())?;
        debug!(config = %manager.path().display(), "loaded configuration");
        Ok(Self {
            settings: config.format_settings(),
            config,
            store,
        })
    }

    fn window(&self, args: WindowArgs) -> EngineResult<MonthWindow> {
        let default = self.config.default_window;
        let start = args.from.unwrap_or(default.start());
        let end = args.to.unwrap_or(default.end().max(start));
        Ok(MonthWindow::new(start, end)?)
    }

    /// A path to a scenario document, or the key of a saved scenario.
    fn load_scenario(&self, reference: &str) -> EngineResult<ScenarioSnapshot> {
        let path = Path::new(reference);
        if path.is_file() {
            self.store.load_snapshot_from_path(path)
        } else {
            self.store.load_snapshot(reference)
        }
    }

    fn money(&self, amount: Decimal) -> String {
        format_currency(amount, &self.settings)
    }

    fn signed_money(&self, amount: Decimal) -> String {
        let rendered = self.money(amount);
        if amount > Decimal::ZERO {
            format!("+{rendered}")
        } else {
            rendered
        }
    }
}

pub fn dispatch(context: &CommandContext, command: Command) -> EngineResult<()> {
    match command {
        Command::Summary {
            scenario,
            window,
            json,
            items,
        } => summary(context, &scenario, window, json, items),
        Command::Compare {
            left,
            right,
            window,
            json,
            narrate,
        } => compare(context, &left, &right, window, json, narrate),
        Command::Timeline {
            scenario,
            quarterly,
            monthly,
            window,
            json,
        } => {
            let grouping = if quarterly {
                StageGrouping::Quarterly
            } else if monthly {
                StageGrouping::Monthly
            } else {
                context.config.timeline_grouping
            };
            timeline(context, &scenario, grouping, window, json)
        }
        Command::ImportTemplate { reply, out } => import_template(context, &reply, out),
        Command::List => list(context),
        Command::Version => {
            version();
            Ok(())
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> EngineResult<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn summary(
    context: &CommandContext,
    reference: &str,
    window: WindowArgs,
    json: bool,
    items: bool,
) -> EngineResult<()> {
    let window = context.window(window)?;
    let snapshot = context.load_scenario(reference)?;
    let report = ScenarioReport::build(&snapshot, window)?;
    if json {
        return print_json(&report);
    }

    let metrics = &report.metrics;
    output::section(format!("{} ({})", report.identity.display_label(), window));
    field(
        "Funding",
        metrics
            .funding
            .map(|amount| context.money(amount))
            .unwrap_or_else(|| "Not specified".into()),
    );
    field("Total costs", context.money(metrics.total_costs));
    field("Total revenue", context.money(metrics.total_revenue));
    field("Net burn", context.money(metrics.net_burn));
    field("Monthly burn", context.money(metrics.monthly_burn));
    field("Monthly revenue", context.money(metrics.monthly_revenue));
    field("Monthly net burn", context.money(metrics.monthly_net_burn));
    field("Growth rate", format_percent(metrics.growth_rate));
    field("Runway", format_runway(metrics.runway_months));
    field(
        "Active items",
        format!(
            "{} costs, {} revenues",
            metrics.active_costs, metrics.active_revenues
        ),
    );

    print_breakdown(context, "Costs by category", &report.cost_breakdown);
    print_breakdown(context, "Revenue by category", &report.revenue_breakdown);

    if items {
        output::section("Items");
        for item in snapshot.costs().iter().chain(snapshot.revenues()) {
            let share = amortize(item, window);
            let marker = if item.is_active() { " " } else { "-" };
            println!(
                "  {marker} {} {:<56} {:>18}",
                short_id(item),
                item.display_label(),
                context.money(share)
            );
        }
    }
    Ok(())
}

/// First eight hex digits of the entity id.
fn short_id(entity: &impl Identifiable) -> String {
    let mut id = entity.id().simple().to_string();
    id.truncate(8);
    id
}

fn print_breakdown(context: &CommandContext, title: &str, breakdown: &CategoryBreakdown) {
    output::section(title);
    if breakdown.is_empty() {
        println!("  (none)");
        return;
    }
    for group in &breakdown.groups {
        println!(
            "  {:<20} {:>18}  ({} items)",
            group.category,
            context.money(group.category_total),
            group.item_count
        );
    }
}

fn compare(
    context: &CommandContext,
    left: &str,
    right: &str,
    window: WindowArgs,
    json: bool,
    narrate: bool,
) -> EngineResult<()> {
    let window = context.window(window)?;
    let left = context.load_scenario(left)?;
    let right = context.load_scenario(right)?;
    let comparator = ScenarioComparator::new().with_window(window);

    if narrate {
        let narrated = comparator
            .with_narrator(Arc::new(BriefNarrator::new(context.settings.clone())))
            .compare_and_narrate(&left, &right)?;
        if json {
            return print_json(&narrated);
        }
        print_comparison(context, &narrated.comparison);
        output::separator();
        println!("{}", narrated.narrative);
        return Ok(());
    }

    let comparison = comparator.compare(&left, &right)?;
    if json {
        return print_json(&comparison);
    }
    print_comparison(context, &comparison);
    Ok(())
}

fn print_comparison(context: &CommandContext, comparison: &ComparisonResult) {
    let (left, right) = (&comparison.left.metrics, &comparison.right.metrics);
    let delta = &comparison.delta;
    output::section(format!(
        "{} vs {} ({})",
        comparison.left.identity.name, comparison.right.identity.name, comparison.window
    ));
    println!(
        "  {:<18} {:>18} {:>18} {:>18}",
        "Metric", comparison.left.identity.name, comparison.right.identity.name, "Change"
    );

    let rows = [
        ("Total costs", left.total_costs, right.total_costs, delta.total_costs, true),
        (
            "Total revenue",
            left.total_revenue,
            right.total_revenue,
            delta.total_revenue,
            false,
        ),
        ("Net burn", left.net_burn, right.net_burn, delta.net_burn, true),
        (
            "Monthly net burn",
            left.monthly_net_burn,
            right.monthly_net_burn,
            delta.monthly_net_burn,
            true,
        ),
    ];
    for (label, l, r, change, higher_is_worse) in rows {
        println!(
            "  {:<18} {:>18} {:>18} {}",
            label,
            context.money(l),
            context.money(r),
            output::delta(
                change,
                format!("{:>18}", context.signed_money(change)),
                higher_is_worse
            )
        );
    }

    let growth_change = if delta.growth_rate > Decimal::ZERO {
        format!("+{}", format_percent(delta.growth_rate))
    } else {
        format_percent(delta.growth_rate)
    };
    println!(
        "  {:<18} {:>18} {:>18} {}",
        "Growth rate",
        format_percent(left.growth_rate),
        format_percent(right.growth_rate),
        output::delta(delta.growth_rate, format!("{growth_change:>18}"), false)
    );
    println!(
        "  {:<18} {:>18} {:>18}",
        "Runway",
        format_runway(left.runway_months),
        format_runway(right.runway_months)
    );
}

fn timeline(
    context: &CommandContext,
    reference: &str,
    grouping: StageGrouping,
    window: WindowArgs,
    json: bool,
) -> EngineResult<()> {
    let window = context.window(window)?;
    let snapshot = context.load_scenario(reference)?;
    let projection = project_timeline(&snapshot, window, grouping)?;
    if json {
        return print_json(&projection);
    }
    print_timeline(context, &projection);
    Ok(())
}

fn print_timeline(context: &CommandContext, projection: &TimelineProjection) {
    output::section(format!(
        "Timeline: {} ({}, {})",
        projection.identity.name, projection.grouping, projection.window
    ));
    println!(
        "  {:<10} {:>16} {:>16} {:>16} {:>16} {:>16}",
        "Stage", "Costs", "Revenue", "Net burn", "Cumulative", "Cash left"
    );
    for stage in &projection.stages {
        let cash = stage
            .cash_remaining
            .map(|cash| context.money(cash))
            .unwrap_or_else(|| "-".into());
        println!(
            "  {:<10} {:>16} {:>16} {:>16} {:>16} {:>16}",
            stage.label,
            context.money(stage.total_costs),
            context.money(stage.total_revenue),
            context.money(stage.net_burn),
            context.money(stage.cumulative_burn),
            cash
        );
    }
    if let Some(stage) = projection.first_shortfall() {
        output::warning(format!("Funding runs out during {}", stage.label));
    }
}

fn import_template(context: &CommandContext, reply: &Path, out: Option<PathBuf>) -> EngineResult<()> {
    let text = fs::read_to_string(reply)?;
    let snapshot = parse_template_response(&text)?.into_snapshot()?;
    let destination = match out {
        Some(path) => {
            save_snapshot_to_path(&snapshot, &path)?;
            path
        }
        None => {
            let key = context
                .store
                .save_snapshot(&snapshot, &snapshot.identity().name)?;
            context.store.scenario_path(&key)
        }
    };
    output::success(format!(
        "Saved scenario `{}` ({} costs, {} revenues) to {}",
        snapshot.identity().name,
        snapshot.costs().len(),
        snapshot.revenues().len(),
        destination.display()
    ));
    Ok(())
}

fn list(context: &CommandContext) -> EngineResult<()> {
    let keys = context.store.list_keys()?;
    if keys.is_empty() {
        output::warning(format!(
            "No saved scenarios in {}",
            context.store.root().display()
        ));
        return Ok(());
    }
    output::section("Saved scenarios");
    for key in keys {
        println!("  {key}");
    }
    Ok(())
}

fn version() {
    let meta = build_info::current();
    println!("{}", meta.summary());
    field("rustc", meta.rustc);
}

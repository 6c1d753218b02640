//! Spreads an item's annual value across the months it overlaps a window.

use rust_decimal::Decimal;

use crate::domain::{MonthWindow, RecurringItem};
use crate::errors::ValidationError;

/// Months an annualized value is spread over.
pub const MONTHS_PER_YEAR: u32 = 12;

/// Number of months in which `item` is active inside `window`, or zero when the
/// item is inactive or its active range misses the window.
pub fn overlap_months(item: &RecurringItem, window: MonthWindow) -> u32 {
    if !item.is_active() {
        return 0;
    }
    let first_active = window.start().max(item.starts_at());
    let last_active = window.end().min(item.end_at().unwrap_or(window.end()));
    if first_active > window.end() || last_active < window.start() {
        return 0;
    }
    last_active - first_active + 1
}

/// Portion of the item's annual value that falls inside `window`:
/// `value / 12` for every overlapping month.
///
/// The product is formed before dividing so a twelve-month overlap yields the
/// full value exactly, whatever its cents.
pub fn amortize(item: &RecurringItem, window: MonthWindow) -> Decimal {
    let months = overlap_months(item, window);
    if months == 0 {
        return Decimal::ZERO;
    }
    item.value() * Decimal::from(months) / Decimal::from(MONTHS_PER_YEAR)
}

/// [`amortize`] over raw window bounds, rejecting malformed windows.
pub fn amortize_between(
    item: &RecurringItem,
    window_start: u32,
    window_end: u32,
) -> Result<Decimal, ValidationError> {
    let window = MonthWindow::new(window_start, window_end)?;
    Ok(amortize(item, window))
}

//! Display formatting for monetary amounts, runway and month indices.

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::domain::{month_name, year_of};
use crate::engine::Runway;

const DAYS_PER_MONTH: Decimal = dec!(30);
const MONTHS_PER_YEAR: Decimal = dec!(12);

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum NegativeStyle {
    #[default]
    Sign,
    Parentheses,
}

/// Locale-ish preferences used when rendering amounts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatSettings {
    pub currency: String,
    pub decimal_separator: char,
    pub grouping_separator: char,
    #[serde(default)]
    pub negative_style: NegativeStyle,
}

impl Default for FormatSettings {
    fn default() -> Self {
        Self {
            currency: "USD".into(),
            decimal_separator: '.',
            grouping_separator: ',',
            negative_style: NegativeStyle::Sign,
        }
    }
}

impl FormatSettings {
    pub fn with_currency(mut self, code: impl Into<String>) -> Self {
        self.currency = code.into();
        self
    }
}

pub fn symbol_for(code: &str) -> String {
    match code {
        "USD" => "$".into(),
        "EUR" => "€".into(),
        "GBP" => "£".into(),
        "JPY" => "¥".into(),
        "AUD" => "A$".into(),
        _ => format!("{code} "),
    }
}

pub fn minor_units_for(code: &str) -> u32 {
    match code {
        "JPY" => 0,
        "KWD" | "BHD" => 3,
        _ => 2,
    }
}

/// Renders a non-negative decimal with a fixed number of fraction digits and
/// grouped integer digits.
pub fn format_number(value: Decimal, precision: u32, settings: &FormatSettings) -> String {
    let rounded = value
        .abs()
        .round_dp_with_strategy(precision, RoundingStrategy::MidpointAwayFromZero);
    let body = format!("{:.*}", precision as usize, rounded);
    let (int_part, frac_part) = match body.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (body.as_str(), None),
    };
    let mut rendered = group_digits(int_part, settings.grouping_separator);
    if let Some(frac) = frac_part {
        rendered.push(settings.decimal_separator);
        rendered.push_str(frac);
    }
    rendered
}

fn group_digits(digits: &str, separator: char) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx != 0 && (digits.len() - idx) % 3 == 0 {
            grouped.push(separator);
        }
        grouped.push(ch);
    }
    grouped
}

pub fn format_currency(amount: Decimal, settings: &FormatSettings) -> String {
    let precision = minor_units_for(&settings.currency);
    let body = format!(
        "{}{}",
        symbol_for(&settings.currency),
        format_number(amount, precision, settings)
    );
    let rounds_to_zero = amount
        .round_dp_with_strategy(precision, RoundingStrategy::MidpointAwayFromZero)
        .is_zero();
    if amount >= Decimal::ZERO || rounds_to_zero {
        return body;
    }
    match settings.negative_style {
        NegativeStyle::Sign => format!("-{body}"),
        NegativeStyle::Parentheses => format!("({body})"),
    }
}

/// Percentage with two decimals, e.g. `-80.00%`.
pub fn format_percent(value: Decimal) -> String {
    let rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    format!("{:.2}%", rounded)
}

/// Human runway: days under a month, one-decimal months under a year, then
/// years and months.
pub fn format_runway(runway: Option<Runway>) -> String {
    let months = match runway {
        None => return "N/A".into(),
        Some(Runway::Infinite) => return "∞ (Profitable)".into(),
        Some(Runway::Months { months }) => months,
    };
    if months < Decimal::ONE {
        let days = (months * DAYS_PER_MONTH).floor();
        return format!("{days} days");
    }
    if months < MONTHS_PER_YEAR {
        let tenths = months
            .round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero)
            .normalize();
        return format!("{tenths} months");
    }
    let years = (months / MONTHS_PER_YEAR).floor();
    let remainder = (months % MONTHS_PER_YEAR)
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .normalize();
    if remainder > Decimal::ZERO {
        format!("{years}y {remainder}m")
    } else {
        format!("{years} years")
    }
}

/// `Mar` inside the first year, `Mar Y2` afterwards.
pub fn month_label(month: u32) -> String {
    match year_of(month) {
        1 => month_name(month).to_string(),
        year => format!("{} Y{}", month_name(month), year),
    }
}

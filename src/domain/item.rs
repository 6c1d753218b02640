//! Recurring cost and revenue line items.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::common::{Displayable, Identifiable, NamedEntity};
use crate::errors::ValidationError;

/// Largest annualized value an item may carry (15 digits, 2 decimal places).
pub const MAX_ITEM_VALUE: Decimal = dec!(9_999_999_999_999.99);

/// Label used when a producer leaves the category blank.
pub const DEFAULT_CATEGORY: &str = "Other";

/// Which side of the ledger an item contributes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    Cost,
    Revenue,
}

impl ItemKind {
    pub fn label(&self) -> &'static str {
        match self {
            ItemKind::Cost => "cost",
            ItemKind::Revenue => "revenue",
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Descriptive cadence tag. Carried for display and filtering only; amortization
/// always treats the item value as an annual figure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "String")]
pub enum Frequency {
    OneTime,
    Monthly,
    Quarterly,
    Yearly,
    Annual,
}

impl Frequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Frequency::OneTime => "one_time",
            Frequency::Monthly => "monthly",
            Frequency::Quarterly => "quarterly",
            Frequency::Yearly => "yearly",
            Frequency::Annual => "annual",
        }
    }
}

impl Default for Frequency {
    fn default() -> Self {
        Frequency::Annual
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Frequency {
    type Err = ValidationError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let normalized = raw.trim().to_ascii_lowercase().replace('-', "_");
        match normalized.as_str() {
            "one_time" => Ok(Frequency::OneTime),
            "monthly" => Ok(Frequency::Monthly),
            "quarterly" => Ok(Frequency::Quarterly),
            "yearly" => Ok(Frequency::Yearly),
            "annual" => Ok(Frequency::Annual),
            _ => Err(ValidationError::UnknownFrequency(raw.to_string())),
        }
    }
}

impl TryFrom<String> for Frequency {
    type Error = ValidationError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        raw.parse()
    }
}

fn default_active() -> bool {
    true
}

/// Unvalidated line item as produced by a storage or narrative collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemDraft {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<ItemKind>,
    pub value: Decimal,
    #[serde(default)]
    pub category: String,
    pub starts_at: u32,
    #[serde(default, alias = "ends_at")]
    pub end_at: Option<u32>,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default, alias = "freq")]
    pub frequency: Frequency,
}

impl ItemDraft {
    pub fn new(kind: ItemKind, title: impl Into<String>, value: Decimal, starts_at: u32) -> Self {
        Self {
            id: None,
            title: title.into(),
            kind: Some(kind),
            value,
            category: String::new(),
            starts_at,
            end_at: None,
            is_active: true,
            frequency: Frequency::default(),
        }
    }

    pub fn cost(title: impl Into<String>, value: Decimal, starts_at: u32) -> Self {
        Self::new(ItemKind::Cost, title, value, starts_at)
    }

    pub fn revenue(title: impl Into<String>, value: Decimal, starts_at: u32) -> Self {
        Self::new(ItemKind::Revenue, title, value, starts_at)
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn with_end(mut self, end_at: u32) -> Self {
        self.end_at = Some(end_at);
        self
    }

    pub fn with_frequency(mut self, frequency: Frequency) -> Self {
        self.frequency = frequency;
        self
    }

    pub fn inactive(mut self) -> Self {
        self.is_active = false;
        self
    }

    /// Checks every item invariant and produces the immutable engine value.
    pub fn validate(self) -> Result<RecurringItem, ValidationError> {
        let kind = self.kind.ok_or(ValidationError::MissingField("kind"))?;
        if self.value < Decimal::ZERO {
            return Err(ValidationError::NegativeValue {
                field: "value",
                value: self.value,
            });
        }
        if self.value > MAX_ITEM_VALUE {
            return Err(ValidationError::ValueTooLarge {
                field: "value",
                value: self.value,
                max: MAX_ITEM_VALUE,
            });
        }
        if self.starts_at < 1 {
            return Err(ValidationError::StartBeforeFirstMonth(self.starts_at));
        }
        if let Some(end_at) = self.end_at {
            if end_at < self.starts_at {
                return Err(ValidationError::EndBeforeStart {
                    starts_at: self.starts_at,
                    end_at,
                });
            }
        }
        let category = match self.category.trim() {
            "" => DEFAULT_CATEGORY.to_string(),
            trimmed => trimmed.to_string(),
        };
        Ok(RecurringItem {
            id: self.id.unwrap_or_else(Uuid::new_v4),
            title: self.title.trim().to_string(),
            kind,
            value: self.value.abs(),
            category,
            starts_at: self.starts_at,
            end_at: self.end_at,
            is_active: self.is_active,
            frequency: self.frequency,
        })
    }
}

/// A validated, immutable recurring line item. `value` is the annualized magnitude.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ItemDraft")]
pub struct RecurringItem {
    id: Uuid,
    title: String,
    kind: ItemKind,
    value: Decimal,
    category: String,
    starts_at: u32,
    end_at: Option<u32>,
    is_active: bool,
    frequency: Frequency,
}

impl TryFrom<ItemDraft> for RecurringItem {
    type Error = ValidationError;

    fn try_from(draft: ItemDraft) -> Result<Self, Self::Error> {
        draft.validate()
    }
}

impl RecurringItem {
    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn kind(&self) -> ItemKind {
        self.kind
    }

    pub fn value(&self) -> Decimal {
        self.value
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn starts_at(&self) -> u32 {
        self.starts_at
    }

    pub fn end_at(&self) -> Option<u32> {
        self.end_at
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn frequency(&self) -> Frequency {
        self.frequency
    }

    /// Returns an editable copy; the result must be validated again.
    pub fn to_draft(&self) -> ItemDraft {
        ItemDraft {
            id: Some(self.id),
            title: self.title.clone(),
            kind: Some(self.kind),
            value: self.value,
            category: self.category.clone(),
            starts_at: self.starts_at,
            end_at: self.end_at,
            is_active: self.is_active,
            frequency: self.frequency,
        }
    }
}

impl Identifiable for RecurringItem {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl NamedEntity for RecurringItem {
    fn name(&self) -> &str {
        &self.title
    }
}

impl Displayable for RecurringItem {
    fn display_label(&self) -> String {
        let end = self
            .end_at
            .map(|month| month.to_string())
            .unwrap_or_else(|| "open".into());
        format!(
            "{} [{}] {} from month {} to {}",
            self.title, self.category, self.kind, self.starts_at, end
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_rejects_negative_value() {
        let err = ItemDraft::cost("Laptop", dec!(-1), 1)
            .validate()
            .expect_err("negative value must fail");
        assert!(matches!(err, ValidationError::NegativeValue { .. }));
    }

    #[test]
    fn validate_rejects_month_zero() {
        let err = ItemDraft::cost("Rent", dec!(1200), 0)
            .validate()
            .expect_err("month zero must fail");
        assert_eq!(err, ValidationError::StartBeforeFirstMonth(0));
    }

    #[test]
    fn validate_rejects_end_before_start() {
        let err = ItemDraft::revenue("Pilot", dec!(5000), 6)
            .with_end(5)
            .validate()
            .expect_err("inverted range must fail");
        assert_eq!(
            err,
            ValidationError::EndBeforeStart {
                starts_at: 6,
                end_at: 5
            }
        );
    }

    #[test]
    fn validate_rejects_values_past_storage_limit() {
        let err = ItemDraft::cost("Moonshot", MAX_ITEM_VALUE + dec!(0.01), 1)
            .validate()
            .expect_err("too large");
        assert!(matches!(err, ValidationError::ValueTooLarge { .. }));
    }

    #[test]
    fn blank_category_becomes_other() {
        let item = ItemDraft::cost("Misc", dec!(10), 1)
            .with_category("   ")
            .validate()
            .unwrap();
        assert_eq!(item.category(), DEFAULT_CATEGORY);
    }

    #[test]
    fn single_month_range_is_valid() {
        let item = ItemDraft::cost("Offsite", dec!(2400), 4)
            .with_end(4)
            .with_frequency(Frequency::OneTime)
            .validate()
            .unwrap();
        assert_eq!(item.end_at(), Some(4));
        assert_eq!(item.frequency(), Frequency::OneTime);
    }

    #[test]
    fn frequency_parses_loosely() {
        assert_eq!("Monthly".parse::<Frequency>().unwrap(), Frequency::Monthly);
        assert_eq!("one-time".parse::<Frequency>().unwrap(), Frequency::OneTime);
        assert!(matches!(
            "fortnightly".parse::<Frequency>(),
            Err(ValidationError::UnknownFrequency(_))
        ));
    }

    #[test]
    fn deserializing_an_item_runs_validation() {
        let json = r#"{"kind":"cost","title":"Engineer","value":"150000","starts_at":0}"#;
        assert!(serde_json::from_str::<RecurringItem>(json).is_err());

        let json = r#"{"kind":"revenue","title":"MRR","value":90000,"starts_at":3,"freq":"monthly"}"#;
        let item: RecurringItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.value(), dec!(90000));
        assert_eq!(item.frequency(), Frequency::Monthly);
        assert!(item.is_active());
    }

    #[test]
    fn drafts_without_a_kind_are_rejected() {
        let mut draft = ItemDraft::cost("Anything", dec!(1), 1);
        draft.kind = None;
        assert_eq!(
            draft.validate(),
            Err(ValidationError::MissingField("kind"))
        );
    }
}

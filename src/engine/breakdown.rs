use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::{MonthWindow, NamedEntity, RecurringItem};
use crate::engine::amortizer::amortize;
use crate::errors::{EngineError, EngineResult};

/// Active items sharing one category label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryGroup {
    pub category: String,
    pub item_count: usize,
    /// Amortized share of the group inside the breakdown window.
    pub category_total: Decimal,
    /// Sum of the raw annualized values.
    pub annualized_total: Decimal,
    #[serde(default)]
    pub item_titles: Vec<String>,
}

/// Category groups in order of first appearance.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CategoryBreakdown {
    pub groups: Vec<CategoryGroup>,
}

impl CategoryBreakdown {
    pub fn build(items: &[RecurringItem], window: MonthWindow) -> EngineResult<Self> {
        let mut groups: Vec<CategoryGroup> = Vec::new();
        let mut index: HashMap<&str, usize> = HashMap::new();

        for item in items.iter().filter(|item| item.is_active()) {
            let slot = *index.entry(item.category()).or_insert_with(|| {
                groups.push(CategoryGroup {
                    category: item.category().to_string(),
                    item_count: 0,
                    category_total: Decimal::ZERO,
                    annualized_total: Decimal::ZERO,
                    item_titles: Vec::new(),
                });
                groups.len() - 1
            });
            let group = &mut groups[slot];
            group.item_count += 1;
            group.category_total = group
                .category_total
                .checked_add(amortize(item, window))
                .ok_or_else(|| EngineError::overflow("category total"))?;
            group.annualized_total = group
                .annualized_total
                .checked_add(item.value())
                .ok_or_else(|| EngineError::overflow("annualized category total"))?;
            group.item_titles.push(item.name().to_string());
        }

        Ok(Self { groups })
    }

    pub fn get(&self, category: &str) -> Option<&CategoryGroup> {
        self.groups.iter().find(|group| group.category == category)
    }

    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().map(|group| group.category.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

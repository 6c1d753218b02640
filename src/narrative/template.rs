//! Scenario templates drafted by the narrative collaborator. Replies are loosely
//! typed (numbers often arrive as strings), so everything is validated here
//! before it becomes a [`ScenarioSnapshot`].

use std::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::domain::{
    Frequency, ItemDraft, ItemKind, RecurringItem, ScenarioIdentity, ScenarioSnapshot,
};
use crate::errors::{EngineResult, ValidationError};
use crate::narrative::NarrativeError;

/// A number that may be sent either as a JSON number or as text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LooseNumber {
    Number(serde_json::Number),
    Text(String),
}

impl LooseNumber {
    fn raw(&self) -> String {
        match self {
            LooseNumber::Number(number) => number.to_string(),
            LooseNumber::Text(text) => text.trim().to_string(),
        }
    }

    /// `None` for blank text.
    fn decimal(&self, field: &'static str) -> Result<Option<Decimal>, ValidationError> {
        let raw = self.raw();
        if raw.is_empty() {
            return Ok(None);
        }
        Decimal::from_str(&raw)
            .or_else(|_| Decimal::from_scientific(&raw))
            .map(Some)
            .map_err(|_| ValidationError::InvalidNumber { field, raw })
    }

    fn month(&self, field: &'static str) -> Result<Option<u32>, ValidationError> {
        let value = match self.decimal(field)? {
            Some(value) => value,
            None => return Ok(None),
        };
        if !value.fract().is_zero() {
            return Err(ValidationError::InvalidNumber {
                field,
                raw: self.raw(),
            });
        }
        value.to_u32().map(Some).ok_or_else(|| ValidationError::InvalidNumber {
            field,
            raw: self.raw(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateScenario {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub funding: Option<LooseNumber>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateItem {
    pub title: String,
    pub value: LooseNumber,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub starts_at: Option<LooseNumber>,
    #[serde(default)]
    pub end_at: Option<LooseNumber>,
    #[serde(default, alias = "frequency")]
    pub freq: Option<String>,
}

impl TemplateItem {
    pub fn into_draft(self, kind: ItemKind) -> Result<ItemDraft, ValidationError> {
        let value = self
            .value
            .decimal("value")?
            .ok_or(ValidationError::MissingField("value"))?;
        let starts_at = match &self.starts_at {
            Some(raw) => raw.month("starts_at")?.unwrap_or(1),
            None => 1,
        };
        let end_at = match &self.end_at {
            Some(raw) => raw.month("end_at")?,
            None => None,
        };
        let frequency = match self.freq.as_deref().map(str::trim) {
            Some(tag) if !tag.is_empty() => tag.parse()?,
            _ => Frequency::default(),
        };

        let mut draft = ItemDraft::new(kind, self.title, value, starts_at)
            .with_category(self.category)
            .with_frequency(frequency);
        draft.end_at = end_at;
        Ok(draft)
    }

    fn into_item(self, kind: ItemKind) -> Result<RecurringItem, ValidationError> {
        let title = self.title.clone();
        self.into_draft(kind)
            .and_then(ItemDraft::validate)
            .map_err(|err| {
                warn!(item = %title, kind = %kind, error = %err, "rejected template item");
                err
            })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioTemplate {
    pub scenario: TemplateScenario,
    #[serde(default)]
    pub costs: Vec<TemplateItem>,
    #[serde(default)]
    pub revenues: Vec<TemplateItem>,
}

impl ScenarioTemplate {
    pub fn into_snapshot(self) -> EngineResult<ScenarioSnapshot> {
        let name = self.scenario.name.trim().to_string();
        if name.is_empty() {
            return Err(ValidationError::MissingField("name").into());
        }
        let mut identity = ScenarioIdentity::new(name);
        if let Some(description) = self.scenario.description {
            if !description.trim().is_empty() {
                identity = identity.with_description(description.trim());
            }
        }
        let funding = match &self.scenario.funding {
            Some(raw) => raw.decimal("funding")?,
            None => None,
        };

        let costs = self
            .costs
            .into_iter()
            .map(|item| item.into_item(ItemKind::Cost))
            .collect::<Result<Vec<_>, _>>()?;
        let revenues = self
            .revenues
            .into_iter()
            .map(|item| item.into_item(ItemKind::Revenue))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ScenarioSnapshot::new(identity, funding, costs, revenues)?)
    }
}

/// Parses a collaborator reply, tolerating a surrounding Markdown code fence.
pub fn parse_template_response(text: &str) -> EngineResult<ScenarioTemplate> {
    let body = strip_code_fence(text);
    serde_json::from_str(body)
        .map_err(|err| NarrativeError::MalformedReply(err.to_string()).into())
}

fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string (`json`) on the opening line.
    let rest = match rest.find('\n') {
        Some(newline) => &rest[newline + 1..],
        None => rest,
    };
    rest.trim_end().strip_suffix("```").unwrap_or(rest).trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::EngineError;
    use rust_decimal_macros::dec;

    const REPLY: &str = r#"```json
{
  "scenario": { "name": "Seed plan", "description": "Two hires", "funding": 500000 },
  "costs": [
    { "title": "Engineer", "value": "150000", "category": "Engineering", "starts_at": "1", "end_at": "", "freq": "annual" },
    { "title": "Designer", "value": "90000", "category": "", "starts_at": "4", "end_at": "12", "freq": "annual" }
  ],
  "revenues": [
    { "title": "MRR", "value": "90000", "category": "Subscriptions", "starts_at": "3", "end_at": "", "freq": "annual" }
  ]
}
```"#;

    #[test]
    fn fenced_reply_becomes_a_snapshot() {
        let snapshot = parse_template_response(REPLY)
            .unwrap()
            .into_snapshot()
            .unwrap();
        assert_eq!(snapshot.identity().name, "Seed plan");
        assert_eq!(snapshot.identity().description.as_deref(), Some("Two hires"));
        assert_eq!(snapshot.funding(), Some(dec!(500000)));
        assert_eq!(snapshot.costs().len(), 2);
        assert_eq!(snapshot.costs()[0].end_at(), None);
        assert_eq!(snapshot.costs()[1].category(), "Other");
        assert_eq!(snapshot.costs()[1].end_at(), Some(12));
        assert_eq!(snapshot.revenues()[0].starts_at(), 3);
        assert_eq!(snapshot.revenues()[0].value(), dec!(90000));
    }

    #[test]
    fn bare_json_is_accepted() {
        let reply = r#"{"scenario":{"name":"Bare"},"costs":[{"title":"Rent","value":24000}]}"#;
        let snapshot = parse_template_response(reply)
            .unwrap()
            .into_snapshot()
            .unwrap();
        assert_eq!(snapshot.costs()[0].starts_at(), 1);
        assert_eq!(snapshot.costs()[0].frequency(), Frequency::Annual);
        assert_eq!(snapshot.funding(), None);
    }

    #[test]
    fn non_numeric_text_is_rejected() {
        let reply = r#"{"scenario":{"name":"Bad"},"costs":[{"title":"Rent","value":"lots"}]}"#;
        let err = parse_template_response(reply)
            .unwrap()
            .into_snapshot()
            .expect_err("value is not a number");
        assert!(matches!(
            err,
            EngineError::Validation(ValidationError::InvalidNumber { field: "value", .. })
        ));
    }

    #[test]
    fn fractional_months_are_rejected() {
        let reply = r#"{"scenario":{"name":"Bad"},"costs":[{"title":"Rent","value":"1","starts_at":"2.5"}]}"#;
        let err = parse_template_response(reply)
            .unwrap()
            .into_snapshot()
            .unwrap_err();
        assert!(matches!(
            err,
            EngineError::Validation(ValidationError::InvalidNumber { field: "starts_at", .. })
        ));
    }

    #[test]
    fn prose_reply_is_malformed() {
        let err = parse_template_response("Sorry, I cannot help with that.").unwrap_err();
        assert!(matches!(
            err,
            EngineError::Narrative(NarrativeError::MalformedReply(_))
        ));
    }
}

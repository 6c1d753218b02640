//! Read-only scenario snapshots handed to the engine by a storage collaborator.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::common::{Displayable, Identifiable, NamedEntity};
use crate::domain::item::{ItemDraft, ItemKind, RecurringItem};
use crate::errors::ValidationError;

/// Opaque identity of a scenario. Never used in computation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioIdentity {
    pub id: Uuid,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ScenarioIdentity {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

impl Identifiable for ScenarioIdentity {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl NamedEntity for ScenarioIdentity {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Displayable for ScenarioIdentity {
    fn display_label(&self) -> String {
        match &self.description {
            Some(description) if !description.is_empty() => {
                format!("{} ({})", self.name, description)
            }
            _ => self.name.clone(),
        }
    }
}

/// A validated scenario: funding plus one bag of cost items and one of revenue items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ScenarioDocument", into = "ScenarioDocument")]
pub struct ScenarioSnapshot {
    identity: ScenarioIdentity,
    funding: Option<Decimal>,
    costs: Vec<RecurringItem>,
    revenues: Vec<RecurringItem>,
    captured_at: DateTime<Utc>,
}

impl ScenarioSnapshot {
    pub fn new(
        identity: ScenarioIdentity,
        funding: Option<Decimal>,
        costs: Vec<RecurringItem>,
        revenues: Vec<RecurringItem>,
    ) -> Result<Self, ValidationError> {
        if let Some(amount) = funding {
            if amount < Decimal::ZERO {
                return Err(ValidationError::NegativeFunding(amount));
            }
        }
        ensure_bag_kind(&costs, ItemKind::Cost)?;
        ensure_bag_kind(&revenues, ItemKind::Revenue)?;
        Ok(Self {
            identity,
            funding,
            costs,
            revenues,
            captured_at: Utc::now(),
        })
    }

    /// Builds a snapshot from a mixed list, routing each item by its kind while
    /// keeping the original relative order inside each bag.
    pub fn from_items(
        identity: ScenarioIdentity,
        funding: Option<Decimal>,
        items: impl IntoIterator<Item = RecurringItem>,
    ) -> Result<Self, ValidationError> {
        let (costs, revenues): (Vec<_>, Vec<_>) = items
            .into_iter()
            .partition(|item| item.kind() == ItemKind::Cost);
        Self::new(identity, funding, costs, revenues)
    }

    pub fn identity(&self) -> &ScenarioIdentity {
        &self.identity
    }

    pub fn funding(&self) -> Option<Decimal> {
        self.funding
    }

    pub fn costs(&self) -> &[RecurringItem] {
        &self.costs
    }

    pub fn revenues(&self) -> &[RecurringItem] {
        &self.revenues
    }

    pub fn captured_at(&self) -> DateTime<Utc> {
        self.captured_at
    }

    pub fn item_count(&self) -> usize {
        self.costs.len() + self.revenues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.item_count() == 0
    }

    pub fn to_document(&self) -> ScenarioDocument {
        ScenarioDocument {
            id: Some(self.identity.id),
            name: self.identity.name.clone(),
            description: self.identity.description.clone(),
            funding: self.funding,
            costs: self.costs.iter().map(RecurringItem::to_draft).collect(),
            revenues: self.revenues.iter().map(RecurringItem::to_draft).collect(),
            captured_at: Some(self.captured_at),
        }
    }
}

pub(crate) fn ensure_bag_kind(items: &[RecurringItem], expected: ItemKind) -> Result<(), ValidationError> {
    match items.iter().find(|item| item.kind() != expected) {
        Some(item) => Err(ValidationError::KindMismatch {
            title: item.title().to_string(),
            expected: expected.label(),
            found: item.kind().label(),
        }),
        None => Ok(()),
    }
}

/// Serialized scenario shape exchanged with storage. Items inside a bag may omit
/// their `kind`; the bag they appear in supplies it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub funding: Option<Decimal>,
    #[serde(default)]
    pub costs: Vec<ItemDraft>,
    #[serde(default)]
    pub revenues: Vec<ItemDraft>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub captured_at: Option<DateTime<Utc>>,
}

impl ScenarioDocument {
    pub fn into_snapshot(self) -> Result<ScenarioSnapshot, ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::MissingField("name"));
        }
        let identity = ScenarioIdentity {
            id: self.id.unwrap_or_else(Uuid::new_v4),
            name: self.name.trim().to_string(),
            description: self.description,
        };
        let costs = validate_bag(self.costs, ItemKind::Cost)?;
        let revenues = validate_bag(self.revenues, ItemKind::Revenue)?;
        let mut snapshot = ScenarioSnapshot::new(identity, self.funding, costs, revenues)?;
        if let Some(captured_at) = self.captured_at {
            snapshot.captured_at = captured_at;
        }
        Ok(snapshot)
    }
}

impl TryFrom<ScenarioDocument> for ScenarioSnapshot {
    type Error = ValidationError;

    fn try_from(document: ScenarioDocument) -> Result<Self, Self::Error> {
        document.into_snapshot()
    }
}

fn validate_bag(
    drafts: Vec<ItemDraft>,
    kind: ItemKind,
) -> Result<Vec<RecurringItem>, ValidationError> {
    drafts
        .into_iter()
        .map(|mut draft| {
            draft.kind.get_or_insert(kind);
            draft.validate()
        })
        .collect()
}

impl From<ScenarioSnapshot> for ScenarioDocument {
    fn from(snapshot: ScenarioSnapshot) -> Self {
        snapshot.to_document()
    }
}

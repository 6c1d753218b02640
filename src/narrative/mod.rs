//! Seam to the external narrative collaborator: the comparison brief it is given,
//! the template replies it sends back, and an offline stand-in.

pub mod brief;
pub mod template;

use thiserror::Error;

use crate::currency::FormatSettings;
use crate::engine::ComparisonResult;

pub use brief::render_comparison_brief;
pub use template::{parse_template_response, ScenarioTemplate, TemplateItem, TemplateScenario};

#[derive(Debug, Error)]
pub enum NarrativeError {
    #[error("no narrative collaborator is configured")]
    Unavailable,
    #[error("narrative collaborator failed: {0}")]
    Collaborator(String),
    #[error("malformed collaborator reply: {0}")]
    MalformedReply(String),
}

/// Produces prose from engine output and scenario templates from free text.
/// The host owns the implementation and its lifetime.
pub trait NarrativeCollaborator: Send + Sync {
    fn narrate_comparison(&self, comparison: &ComparisonResult) -> Result<String, NarrativeError>;

    /// Returns the raw reply; callers hand it to [`parse_template_response`].
    fn draft_scenario(&self, description: &str) -> Result<String, NarrativeError>;
}

/// Offline collaborator that answers with the rendered comparison brief.
#[derive(Debug, Clone, Default)]
pub struct BriefNarrator {
    settings: FormatSettings,
}

impl BriefNarrator {
    pub fn new(settings: FormatSettings) -> Self {
        Self { settings }
    }
}

impl NarrativeCollaborator for BriefNarrator {
    fn narrate_comparison(&self, comparison: &ComparisonResult) -> Result<String, NarrativeError> {
        Ok(render_comparison_brief(comparison, &self.settings))
    }

    fn draft_scenario(&self, _description: &str) -> Result<String, NarrativeError> {
        Err(NarrativeError::Unavailable)
    }
}

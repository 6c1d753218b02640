//! Value objects consumed by the projection engine.

pub mod common;
pub mod item;
pub mod scenario;
pub mod window;

pub use common::{Displayable, Identifiable, NamedEntity};
pub use item::{Frequency, ItemDraft, ItemKind, RecurringItem, DEFAULT_CATEGORY, MAX_ITEM_VALUE};
pub use scenario::{ScenarioDocument, ScenarioIdentity, ScenarioSnapshot};
pub use window::{month_name, year_of, MonthWindow, MAX_WINDOW_MONTHS};

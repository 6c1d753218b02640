//! Closed, inclusive ranges of 1-based month indices.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::ValidationError;

/// Widest window accepted by the engine (one hundred years).
pub const MAX_WINDOW_MONTHS: u32 = 1200;

/// An inclusive month range `[start, end]` with `1 <= start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawWindow")]
pub struct MonthWindow {
    start: u32,
    end: u32,
}

#[derive(Deserialize)]
struct RawWindow {
    start: u32,
    end: u32,
}

impl TryFrom<RawWindow> for MonthWindow {
    type Error = ValidationError;

    fn try_from(raw: RawWindow) -> Result<Self, Self::Error> {
        MonthWindow::new(raw.start, raw.end)
    }
}

impl MonthWindow {
    /// Months 1 through 12.
    pub const FIRST_YEAR: MonthWindow = MonthWindow { start: 1, end: 12 };

    pub fn new(start: u32, end: u32) -> Result<Self, ValidationError> {
        if start < 1 || end < start {
            return Err(ValidationError::InvalidWindow { start, end });
        }
        let len = end - start + 1;
        if len > MAX_WINDOW_MONTHS {
            return Err(ValidationError::WindowTooWide {
                len,
                max: MAX_WINDOW_MONTHS,
            });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> u32 {
        self.start
    }

    pub fn end(&self) -> u32 {
        self.end
    }

    /// Number of months covered; never zero.
    pub fn len(&self) -> u32 {
        self.end - self.start + 1
    }

    pub fn contains(&self, month: u32) -> bool {
        month >= self.start && month <= self.end
    }

    pub fn months(&self) -> impl Iterator<Item = u32> {
        self.start..=self.end
    }

    /// Splits the window into consecutive stages of `stage_len` months. The last
    /// stage is shorter when the window length is not a multiple of `stage_len`.
    pub fn split_by(&self, stage_len: u32) -> Vec<MonthWindow> {
        let step = stage_len.max(1);
        let mut stages = Vec::new();
        let mut cursor = self.start;
        while cursor <= self.end {
            let stage_end = cursor.saturating_add(step - 1).min(self.end);
            stages.push(MonthWindow {
                start: cursor,
                end: stage_end,
            });
            match stage_end.checked_add(1) {
                Some(next) => cursor = next,
                None => break,
            }
        }
        stages
    }
}

const MONTH_NAMES: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Short calendar name of a 1-based month index; wraps every twelve months.
pub fn month_name(month: u32) -> &'static str {
    MONTH_NAMES[(month.max(1) as usize - 1) % 12]
}

/// 1-based year a month index falls in.
pub fn year_of(month: u32) -> u32 {
    (month.max(1) - 1) / 12 + 1
}

impl Default for MonthWindow {
    fn default() -> Self {
        Self::FIRST_YEAR
    }
}

impl fmt::Display for MonthWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "months {}-{}", self.start, self.end)
    }
}

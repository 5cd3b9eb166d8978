use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::task_id::TaskId;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<NaiveTime>,
    #[serde(default)]
    pub completed: bool,
    /// Present exactly when `completed` is true. Keeps the offset it was
    /// recorded with so its calendar date is the local day of completion.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completion_time: Option<DateTime<FixedOffset>>,
    pub created_at: DateTime<Utc>,
}

impl Task {
    /// Calendar day (in the offset it was recorded with) this task was completed on.
    pub fn completion_date(&self) -> Option<NaiveDate> {
        if !self.completed {
            return None;
        }
        self.completion_time.map(|t| t.date_naive())
    }

    pub fn is_completed_on(&self, day: NaiveDate) -> bool {
        self.completion_date() == Some(day)
    }

    /// `completion_time` is present iff `completed`.
    pub fn is_consistent(&self) -> bool {
        self.completed == self.completion_time.is_some()
    }
}

/// Input for creating a task. The store assigns id, completion state and timestamps.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    pub category: String,
    pub due_date: Option<NaiveDate>,
    pub time: Option<NaiveTime>,
}

impl NewTask {
    pub fn new(title: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            category: category.into(),
            ..Self::default()
        }
    }
}

/// Field-level edit of an existing task. `None` leaves a field untouched.
/// Completion state is only ever changed through toggling.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub time: Option<NaiveTime>,
}

impl TaskPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.category.is_none()
            && self.due_date.is_none()
            && self.time.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryKind {
    Default,
    Custom,
}

impl std::fmt::Display for CategoryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Default => write!(f, "default"),
            Self::Custom => write!(f, "custom"),
        }
    }
}

/// Read-only projection of one category for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryEntry {
    pub name: String,
    pub kind: CategoryKind,
}

/// A category label known to the category store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryRef {
    Default(String),
    Custom(String),
}

impl CategoryRef {
    pub fn name(&self) -> &str {
        match self {
            Self::Default(name) | Self::Custom(name) => name,
        }
    }

    pub fn kind(&self) -> CategoryKind {
        match self {
            Self::Default(_) => CategoryKind::Default,
            Self::Custom(_) => CategoryKind::Custom,
        }
    }

    pub fn into_name(self) -> String {
        match self {
            Self::Default(name) | Self::Custom(name) => name,
        }
    }
}

/// Restricts task listings to one category label, or lets everything through.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(String),
}

impl CategoryFilter {
    pub const ALL_SENTINEL: &'static str = "all";

    pub fn matches(&self, task: &Task) -> bool {
        match self {
            Self::All => true,
            Self::Only(category) => task.category == *category,
        }
    }
}

impl From<Option<String>> for CategoryFilter {
    fn from(value: Option<String>) -> Self {
        match value {
            None => Self::All,
            Some(v) if v == Self::ALL_SENTINEL => Self::All,
            Some(v) => Self::Only(v),
        }
    }
}

impl std::str::FromStr for CategoryFilter {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(Some(s.to_string())))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakState {
    pub current_streak: u32,
    pub last_completion_date: Option<NaiveDate>,
}

impl StreakState {
    /// A positive streak must be anchored to a completion date.
    pub fn is_consistent(&self) -> bool {
        self.current_streak == 0 || self.last_completion_date.is_some()
    }
}

/// The "daily goals" roll-up shown next to the task list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DailySummary {
    pub total: usize,
    pub completed: usize,
    pub percent: u8,
    pub completed_today: usize,
    pub streak: u32,
}

impl DailySummary {
    pub fn new(total: usize, completed: usize, completed_today: usize, streak: u32) -> Self {
        Self {
            total,
            completed,
            percent: percent_done(completed, total),
            completed_today,
            streak,
        }
    }
}

/// Rounded completion percentage, halves rounding up. Zero when there is nothing to do.
pub fn percent_done(completed: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    let completed = completed.min(total);
    let rounded = (completed * 200 + total) / (total * 2);
    u8::try_from(rounded).unwrap_or(100)
}

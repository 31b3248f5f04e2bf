use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Number of description characters shown on a card before truncation.
pub const DESCRIPTION_PREVIEW_CHARS: usize = 90;

/// Fixed workflow stage a task lives in. Board order is `ColumnId::ALL`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnId {
    #[default]
    Backlog,
    InProgress,
    Review,
    Done,
}

impl ColumnId {
    pub const ALL: &[ColumnId] = &[
        ColumnId::Backlog,
        ColumnId::InProgress,
        ColumnId::Review,
        ColumnId::Done,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnId::Backlog => "backlog",
            ColumnId::InProgress => "in_progress",
            ColumnId::Review => "review",
            ColumnId::Done => "done",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ColumnId::Backlog => "Backlog",
            ColumnId::InProgress => "In Progress",
            ColumnId::Review => "In Review",
            ColumnId::Done => "Done",
        }
    }

    pub fn parse_str(s: &str) -> Option<Self> {
        match s {
            "backlog" => Some(ColumnId::Backlog),
            "in_progress" => Some(ColumnId::InProgress),
            "review" => Some(ColumnId::Review),
            "done" => Some(ColumnId::Done),
            _ => None,
        }
    }
}

impl fmt::Display for ColumnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    pub const ALL: &[Priority] = &[Priority::Low, Priority::Medium, Priority::High];

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Priority::Low => "Low",
            Priority::Medium => "Medium",
            Priority::High => "High",
        }
    }

    pub fn parse_str(s: &str) -> Option<Self> {
        match s {
            "low" => Some(Priority::Low),
            "medium" => Some(Priority::Medium),
            "high" => Some(Priority::High),
            _ => None,
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// A task as stored by the remote resource service.
///
/// The id and `created_at` are chosen by the client at creation time;
/// the server stores them as given.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub column: ColumnId,
    pub priority: Priority,
    pub created_at: DateTime<Utc>,
}

impl Task {
    /// Build the full creation payload from form values.
    pub fn from_form(id: String, created_at: DateTime<Utc>, values: TaskFormValues) -> Self {
        Self {
            id,
            title: values.title,
            description: values.description,
            column: values.column,
            priority: values.priority,
            created_at,
        }
    }

    /// Case-insensitive substring match on title or description.
    /// A blank term matches everything.
    pub fn matches_search(&self, term: &str) -> bool {
        let term = term.trim();
        if term.is_empty() {
            return true;
        }
        let needle = term.to_lowercase();
        self.title.to_lowercase().contains(&needle)
            || self.description.to_lowercase().contains(&needle)
    }

    /// Description cut to `DESCRIPTION_PREVIEW_CHARS`, with an ellipsis when truncated.
    pub fn description_preview(&self) -> String {
        if self.description.chars().count() <= DESCRIPTION_PREVIEW_CHARS {
            return self.description.clone();
        }
        let mut preview: String = self
            .description
            .chars()
            .take(DESCRIPTION_PREVIEW_CHARS)
            .collect();
        preview.push('…');
        preview
    }
}

/// Editable fields of a task, as collected by the create/edit form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskFormValues {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub column: ColumnId,
    pub priority: Priority,
}

impl TaskFormValues {
    /// Blank values for create mode, placed in `column`.
    pub fn blank(column: ColumnId) -> Self {
        Self {
            column,
            ..Default::default()
        }
    }

    pub fn from_task(task: &Task) -> Self {
        Self {
            title: task.title.clone(),
            description: task.description.clone(),
            column: task.column,
            priority: task.priority,
        }
    }
}

/// Partial patch: only `Some` fields are sent and applied.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateTask {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<ColumnId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
}

impl UpdateTask {
    pub fn move_to(column: ColumnId) -> Self {
        Self {
            column: Some(column),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.column.is_none()
            && self.priority.is_none()
    }

    pub fn apply_to(&self, task: &mut Task) {
        if let Some(ref title) = self.title {
            task.title = title.clone();
        }
        if let Some(ref description) = self.description {
            task.description = description.clone();
        }
        if let Some(column) = self.column {
            task.column = column;
        }
        if let Some(priority) = self.priority {
            task.priority = priority;
        }
    }
}

impl From<TaskFormValues> for UpdateTask {
    fn from(values: TaskFormValues) -> Self {
        Self {
            title: Some(values.title),
            description: Some(values.description),
            column: Some(values.column),
            priority: Some(values.priority),
        }
    }
}

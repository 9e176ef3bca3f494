use chrono::{DateTime, Utc};
use derivative::Derivative;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub type TaskId = i64;

pub const DEFAULT_CATEGORY: &str = "General";

// Every textual priority, whatever its origin, is parsed by FromStr.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown priority `{0}` (expected low, medium or high)")]
pub struct ParsePriorityError(pub String);

impl FromStr for Priority {
    type Err = ParsePriorityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            _ => Err(ParsePriorityError(s.to_string())),
        }
    }
}

impl TryFrom<String> for Priority {
    type Error = ParsePriorityError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub category: String,
    pub priority: Priority,
    pub due_time: String,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
}

// Caller-supplied fields for a new task. Id, creation time and completion
// are always decided by the store.
#[derive(Derivative, Clone, PartialEq, Eq)]
#[derivative(Default, Debug)]
pub struct NewTask {
    pub title: String,
    #[derivative(Default(value = "DEFAULT_CATEGORY.to_string()"))]
    pub category: String,
    pub priority: Priority,
    pub due_time: String,
}

impl NewTask {
    pub fn titled(title: impl Into<String>) -> Self {
        NewTask {
            title: title.into(),
            ..NewTask::default()
        }
    }
}

// Partial update: only the fields that are `Some` change.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub category: Option<String>,
    pub priority: Option<Priority>,
    pub due_time: Option<String>,
    pub completed: Option<bool>,
}

impl TaskPatch {
    pub fn completed(completed: bool) -> Self {
        TaskPatch {
            completed: Some(completed),
            ..TaskPatch::default()
        }
    }

    pub fn apply_to(self, task: &mut Task) {
        if let Some(title) = self.title {
            task.title = title;
        }
        if let Some(category) = self.category {
            task.category = category;
        }
        if let Some(priority) = self.priority {
            task.priority = priority;
        }
        if let Some(due_time) = self.due_time {
            task.due_time = due_time;
        }
        if let Some(completed) = self.completed {
            task.completed = completed;
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskStats {
    pub total: usize,
    pub completed: usize,
    pub percentage: u8,
}

impl TaskStats {
    pub fn new(total: usize, completed: usize) -> Self {
        // round(completed / total * 100) with halves rounded up
        let percentage = if total == 0 {
            0
        } else {
            let scaled = (completed * 200 + total) / (total * 2);
            u8::try_from(scaled.min(100)).unwrap_or(100)
        };
        TaskStats {
            total,
            completed,
            percentage,
        }
    }

    pub fn from_tasks(tasks: &[Task]) -> Self {
        TaskStats::new(tasks.len(), tasks.iter().filter(|task| task.completed).count())
    }

    pub fn remaining(&self) -> usize {
        self.total.saturating_sub(self.completed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentage_rounds_like_the_progress_bar() {
        assert_eq!(TaskStats::new(0, 0).percentage, 0);
        assert_eq!(TaskStats::new(2, 1).percentage, 50);
        assert_eq!(TaskStats::new(3, 1).percentage, 33);
        assert_eq!(TaskStats::new(3, 2).percentage, 67);
        assert_eq!(TaskStats::new(8, 1).percentage, 13);
        assert_eq!(TaskStats::new(4, 4).percentage, 100);
        assert_eq!(TaskStats::new(5, 3).remaining(), 2);
    }

    #[test]
    fn priority_parses_case_insensitively() {
        assert_eq!("HIGH".parse::<Priority>(), Ok(Priority::High));
        assert_eq!(" low ".parse::<Priority>(), Ok(Priority::Low));
        assert!("urgent".parse::<Priority>().is_err());
    }

    #[test]
    fn document_priorities_follow_the_same_rule() {
        let parsed: Vec<Priority> = serde_json::from_str(r#"["High", "LOW", "medium"]"#).unwrap();
        assert_eq!(parsed, vec![Priority::High, Priority::Low, Priority::Medium]);
        assert!(serde_json::from_str::<Priority>(r#""urgent""#).is_err());
        assert_eq!(serde_json::to_string(&Priority::High).unwrap(), r#""high""#);
    }

    #[test]
    fn new_task_defaults_to_general_and_medium() {
        let task = NewTask::titled("Buy milk");
        assert_eq!(task.category, "General");
        assert_eq!(task.priority, Priority::Medium);
        assert!(task.due_time.is_empty());
    }

    #[test]
    fn patch_only_touches_named_fields() {
        let mut task = Task {
            id: 7,
            title: "Call mom".into(),
            category: "Phone".into(),
            priority: Priority::Low,
            due_time: "Due 5pm".into(),
            completed: false,
            created_at: Utc::now(),
        };
        let before = task.clone();

        TaskPatch::completed(true).apply_to(&mut task);

        assert!(task.completed);
        assert_eq!(task.title, before.title);
        assert_eq!(task.category, before.category);
        assert_eq!(task.priority, before.priority);
        assert_eq!(task.due_time, before.due_time);
        assert_eq!(task.created_at, before.created_at);
    }
}

// Display-side projections of the task collection and the collaborator
// traits the controller renders through.
//
// Nothing in here knows about the terminal: the TUI maps Accent and
// DueMarker onto real colours and glyphs.

use chrono::{Datelike, TimeZone};
use std::collections::HashMap;

use crate::app::filter::{TaskFilter, DUE_MARKER};
use crate::app::models::{Priority, Task, TaskId, TaskStats};

// Palette slot used to tint a category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Accent {
    Orange,
    Blue,
    Green,
    Purple,
    Red,
}

// Icon shown next to the due text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DueMarker {
    // Text mentions "Due".
    Clock,
    // Text looks like a date range.
    Range,
    // Anything else.
    Day,
}

impl DueMarker {
    pub fn for_due_time(due_time: &str) -> DueMarker {
        if due_time.contains(DUE_MARKER) {
            DueMarker::Clock
        } else if due_time.contains('-') {
            DueMarker::Range
        } else {
            DueMarker::Day
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Success,
    Error,
    Info,
}

// Lookup tables for the rendering path.
#[derive(Debug, Clone)]
pub struct DisplayConfig {
    pub category_accents: HashMap<String, Accent>,
    pub default_accent: Accent,
    pub filter_labels: HashMap<TaskFilter, String>,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        let category_accents = [
            ("OmniMarketing", Accent::Orange),
            ("Books", Accent::Blue),
            ("Office", Accent::Green),
            ("Shopping", Accent::Purple),
            ("Social", Accent::Red),
            ("Omni Meals 2.0", Accent::Green),
            ("Vacation", Accent::Blue),
            ("Cats", Accent::Orange),
            ("Food iPad", Accent::Green),
            ("Phone", Accent::Red),
            ("Conference", Accent::Purple),
        ]
        .into_iter()
        .map(|(category, accent)| (category.to_string(), accent))
        .collect();

        let filter_labels = [
            (TaskFilter::All, "All"),
            (TaskFilter::Pending, "Pending"),
            (TaskFilter::Completed, "Completed"),
            (TaskFilter::HighPriority, "High priority"),
            (TaskFilter::DueToday, "Today"),
        ]
        .into_iter()
        .map(|(filter, label)| (filter, label.to_string()))
        .collect();

        DisplayConfig {
            category_accents,
            default_accent: Accent::Orange,
            filter_labels,
        }
    }
}

impl DisplayConfig {
    pub fn accent_for(&self, category: &str) -> Accent {
        self.category_accents
            .get(category)
            .copied()
            .unwrap_or(self.default_accent)
    }

    // Falls back to the filter's key when no label is configured.
    pub fn filter_label(&self, filter: TaskFilter) -> String {
        self.filter_labels
            .get(&filter)
            .cloned()
            .unwrap_or_else(|| filter.key().to_string())
    }
}

// Everything one list entry needs to draw itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskView {
    pub id: TaskId,
    pub title: String,
    pub category: String,
    pub accent: Accent,
    pub priority: Priority,
    pub completed: bool,
    // `None` when the task has no due text; no due block is drawn then.
    pub due: Option<(DueMarker, String)>,
}

impl TaskView {
    pub fn project(task: &Task, config: &DisplayConfig) -> TaskView {
        let due = if task.due_time.is_empty() {
            None
        } else {
            Some((DueMarker::for_due_time(&task.due_time), task.due_time.clone()))
        };
        TaskView {
            id: task.id,
            title: task.title.clone(),
            category: task.category.clone(),
            accent: config.accent_for(&task.category),
            priority: task.priority,
            completed: task.completed,
            due,
        }
    }
}

pub const WEEKDAY_LABELS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

// Tasks created per weekday, Monday first.
pub type WeekCounts = [usize; 7];

// Counts task creation per weekday as seen in `tz`.
pub fn weekday_counts<Tz: TimeZone>(tasks: &[Task], tz: &Tz) -> WeekCounts {
    let mut counts = [0; 7];
    for task in tasks {
        let weekday = task.created_at.with_timezone(tz).weekday();
        // num_days_from_monday puts Sunday last
        counts[weekday.num_days_from_monday() as usize] += 1;
    }
    counts
}

// The rendering collaborator. Each call replaces what was shown before.
pub trait Renderer {
    // Hides the loading state and reveals the progress and task sections.
    fn show_main(&mut self);
    fn render_progress(&mut self, stats: &TaskStats);
    // An empty slice means "nothing to show" for the current filter.
    fn render_tasks(&mut self, tasks: &[TaskView]);
    fn render_calendar(&mut self, counts: &WeekCounts);
    fn render_filter_label(&mut self, label: &str);
    fn render_clock(&mut self, text: &str);
}

// The notification collaborator: decides nothing about presentation.
pub trait Notifier {
    fn notify(&mut self, message: &str, severity: Severity);
}

use crate::app::models::{Priority, Task};

// Marker that flags a task as due today.
pub const DUE_MARKER: &str = "Due";

// Named predicate selecting the visible tasks. Cycles forward, wrapping
// back to `All` after `DueToday`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TaskFilter {
    #[default]
    All,
    Pending,
    Completed,
    HighPriority,
    DueToday,
}

impl TaskFilter {
    pub const CYCLE: [TaskFilter; 5] = [
        TaskFilter::All,
        TaskFilter::Pending,
        TaskFilter::Completed,
        TaskFilter::HighPriority,
        TaskFilter::DueToday,
    ];

    pub fn next(self) -> TaskFilter {
        let index = TaskFilter::CYCLE
            .iter()
            .position(|filter| *filter == self)
            .unwrap_or(0);
        TaskFilter::CYCLE[(index + 1) % TaskFilter::CYCLE.len()]
    }

    pub fn key(self) -> &'static str {
        match self {
            TaskFilter::All => "all",
            TaskFilter::Pending => "pending",
            TaskFilter::Completed => "completed",
            TaskFilter::HighPriority => "high",
            TaskFilter::DueToday => "today",
        }
    }

    pub fn matches(self, task: &Task) -> bool {
        match self {
            TaskFilter::All => true,
            TaskFilter::Pending => !task.completed,
            TaskFilter::Completed => task.completed,
            TaskFilter::HighPriority => task.priority == Priority::High,
            TaskFilter::DueToday => task.due_time.contains(DUE_MARKER),
        }
    }

    // Tasks matching this filter, in their original order.
    pub fn apply<'a>(self, tasks: &'a [Task]) -> Vec<&'a Task> {
        tasks.iter().filter(|task| self.matches(task)).collect()
    }
}

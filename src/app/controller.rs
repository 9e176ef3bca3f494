// Application context: mediates between the store, the current filter and
// the rendering collaborators.
//
// The local `tasks` cache mirrors the store and is only touched after the
// corresponding store operation succeeded. Store failures stop here: they
// are logged and turned into an error notification.

use chrono::{DateTime, Local, TimeZone};
use std::time::{Duration, Instant};

use crate::app::events::{EventKind, InputBus, Subscription, UiEvent};
use crate::app::filter::TaskFilter;
use crate::app::models::{NewTask, Task, TaskId, TaskPatch, TaskStats};
use crate::app::source::TaskSource;
use crate::app::storage::TaskStore;
use crate::app::view::{weekday_counts, DisplayConfig, Notifier, Renderer, Severity, TaskView};

pub const DEFAULT_CLOCK_INTERVAL: Duration = Duration::from_secs(60);

pub fn clock_text<Tz: TimeZone>(now: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    format!("Updated at {}", now.format("%H:%M"))
}

// Decides when the "Updated at" clock is due for a refresh.
#[derive(Debug)]
struct ClockTicker {
    interval: Duration,
    last: Option<Instant>,
}

impl ClockTicker {
    fn start(&mut self, now: Instant) {
        self.last = Some(now);
    }

    fn due(&mut self, now: Instant) -> bool {
        match self.last {
            Some(last) if now.saturating_duration_since(last) >= self.interval => {
                self.last = Some(now);
                true
            }
            _ => false,
        }
    }
}

pub struct TaskController<S: TaskSource, V: Renderer + Notifier> {
    store: TaskStore<S>,
    view: V,
    config: DisplayConfig,
    bus: InputBus,
    subscriptions: Vec<Subscription>,
    tasks: Vec<Task>,
    current_filter: TaskFilter,
    clock: ClockTicker,
}

impl<S: TaskSource, V: Renderer + Notifier> TaskController<S, V> {
    pub fn new(store: TaskStore<S>, view: V, config: DisplayConfig) -> Self {
        TaskController {
            store,
            view,
            config,
            bus: InputBus::new(),
            subscriptions: Vec::new(),
            tasks: Vec::new(),
            current_filter: TaskFilter::default(),
            clock: ClockTicker {
                interval: DEFAULT_CLOCK_INTERVAL,
                last: None,
            },
        }
    }

    pub fn with_clock_interval(mut self, interval: Duration) -> Self {
        self.clock.interval = interval;
        self
    }

    // Wires input, loads tasks, reveals the main view, renders and starts the clock.
    pub async fn initialize(&mut self) {
        self.subscriptions = [
            EventKind::Toggle,
            EventKind::Add,
            EventKind::Delete,
            EventKind::CycleFilter,
        ]
        .into_iter()
        .map(|kind| self.bus.subscribe(kind))
        .collect();

        self.load_tasks().await;
        self.view.show_main();
        let label = self.filter_label();
        self.view.render_filter_label(&label);
        self.render();
        self.clock.start(Instant::now());
    }

    async fn load_tasks(&mut self) {
        let loaded = match self.store.load().await {
            Ok(_) => self.store.list(),
            Err(err) => Err(err),
        };
        match loaded {
            Ok(tasks) => self.tasks = tasks,
            Err(err) => {
                tracing::error!(error = %err, "error loading tasks");
                self.view.notify("Error loading tasks", Severity::Error);
            }
        }
    }

    // Handle the UI emits into; drained by TaskController::pump_events.
    pub fn bus(&self) -> InputBus {
        self.bus.clone()
    }

    // Drops every subscription; later events are discarded.
    pub fn detach_input(&mut self) {
        self.subscriptions.clear();
    }

    pub fn pump_events(&mut self) {
        for event in self.bus.drain() {
            self.handle(event);
        }
    }

    pub fn handle(&mut self, event: UiEvent) {
        match event {
            UiEvent::Toggle(id) => self.toggle_task(id),
            UiEvent::Add(new_task) => self.add_task(new_task),
            UiEvent::Delete(id) => self.delete_task(id),
            UiEvent::CycleFilter => self.cycle_filter(),
        }
    }

    pub fn toggle_task(&mut self, id: TaskId) {
        let Some(index) = self.tasks.iter().position(|task| task.id == id) else {
            tracing::debug!(id, "toggle for a task that is not displayed");
            return;
        };
        let completed = !self.tasks[index].completed;

        match self.store.update(id, TaskPatch::completed(completed)) {
            Ok(updated) => {
                let message = if updated.completed {
                    "Task completed!"
                } else {
                    "Task marked as pending"
                };
                self.tasks[index] = updated;
                self.render();
                self.view.notify(message, Severity::Success);
            }
            Err(err) => {
                tracing::error!(id, error = %err, "error updating task");
                self.view.notify("Error updating task", Severity::Error);
            }
        }
    }

    // Advances the filter and redraws the list only.
    pub fn cycle_filter(&mut self) {
        self.current_filter = self.current_filter.next();
        tracing::debug!(filter = self.current_filter.key(), "filter changed");
        let label = self.filter_label();
        self.view.render_filter_label(&label);
        self.render_tasks();
    }

    pub fn filtered_tasks(&self) -> Vec<&Task> {
        self.current_filter.apply(&self.tasks)
    }

    pub fn add_task(&mut self, new_task: NewTask) {
        match self.store.add(new_task) {
            Ok(task) => {
                tracing::info!(id = task.id, "task added");
                self.tasks.push(task);
                self.render();
                self.view.notify("Task added", Severity::Success);
            }
            Err(err) => {
                tracing::error!(error = %err, "error adding task");
                self.view.notify("Error adding task", Severity::Error);
            }
        }
    }

    pub fn delete_task(&mut self, id: TaskId) {
        match self.store.remove(id) {
            Ok(_) => {
                self.tasks.retain(|task| task.id != id);
                self.render();
                self.view.notify("Task deleted", Severity::Success);
            }
            Err(err) => {
                tracing::error!(id, error = %err, "error deleting task");
                self.view.notify("Error deleting task", Severity::Error);
            }
        }
    }

    pub fn render(&mut self) {
        let stats = self.store.stats().unwrap_or_else(|err| {
            tracing::warn!(error = %err, "stats unavailable, using cached tasks");
            TaskStats::from_tasks(&self.tasks)
        });
        self.view.render_progress(&stats);
        self.render_tasks();
        self.refresh_clock();
        let counts = weekday_counts(&self.tasks, &Local);
        self.view.render_calendar(&counts);
    }

    fn render_tasks(&mut self) {
        let visible: Vec<TaskView> = self
            .filtered_tasks()
            .into_iter()
            .map(|task| TaskView::project(task, &self.config))
            .collect();
        self.view.render_tasks(&visible);
    }

    fn refresh_clock(&mut self) {
        self.view.render_clock(&clock_text(&Local::now()));
    }

    // Called from the event loop; refreshes only the clock string.
    pub fn on_tick(&mut self, now: Instant) {
        if self.clock.due(now) {
            self.refresh_clock();
        }
    }

    pub fn current_filter(&self) -> TaskFilter {
        self.current_filter
    }

    pub fn filter_label(&self) -> String {
        self.config.filter_label(self.current_filter)
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn store(&self) -> &TaskStore<S> {
        &self.store
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::source::StaticSource;
    use crate::app::view::{TaskView, WeekCounts};
    use chrono::Utc;

    #[derive(Default)]
    struct Recorder {
        task_renders: usize,
        notes: Vec<(String, Severity)>,
    }

    impl Renderer for Recorder {
        fn show_main(&mut self) {}
        fn render_progress(&mut self, _stats: &TaskStats) {}
        fn render_tasks(&mut self, _tasks: &[TaskView]) {
            self.task_renders += 1;
        }
        fn render_calendar(&mut self, _counts: &WeekCounts) {}
        fn render_filter_label(&mut self, _label: &str) {}
        fn render_clock(&mut self, _text: &str) {}
    }

    impl Notifier for Recorder {
        fn notify(&mut self, message: &str, severity: Severity) {
            self.notes.push((message.to_string(), severity));
        }
    }

    async fn controller_with(document: String) -> TaskController<StaticSource, Recorder> {
        let store = TaskStore::new(StaticSource::new(document)).unwrap();
        let mut controller = TaskController::new(store, Recorder::default(), DisplayConfig::default());
        controller.initialize().await;
        controller
    }

    fn one_task(id: TaskId) -> String {
        format!(
            r#"[{{"id": {id}, "title": "A", "category": "Books", "priority": "high",
                  "createdAt": "2024-01-17T12:00:00Z"}}]"#
        )
    }

    #[tokio::test]
    async fn toggle_rejected_by_store_keeps_cache_and_reports_error() {
        let mut controller = controller_with(one_task(1)).await;
        controller.store.remove(1).unwrap();
        let renders = controller.view.task_renders;

        controller.toggle_task(1);

        assert_eq!(
            controller.view.notes,
            vec![("Error updating task".to_string(), Severity::Error)]
        );
        assert!(!controller.tasks[0].completed);
        assert_eq!(controller.tasks.len(), 1);
        assert_eq!(controller.view.task_renders, renders);
    }

    #[tokio::test]
    async fn add_rejected_by_store_keeps_cache_and_reports_error() {
        let mut controller = controller_with(one_task(TaskId::MAX)).await;
        let renders = controller.view.task_renders;

        controller.add_task(NewTask::titled("B"));

        assert_eq!(
            controller.view.notes,
            vec![("Error adding task".to_string(), Severity::Error)]
        );
        assert_eq!(controller.tasks.len(), 1);
        assert_eq!(controller.view.task_renders, renders);
    }

    #[test]
    fn clock_ticks_only_after_interval() {
        let mut clock = ClockTicker {
            interval: Duration::from_secs(60),
            last: None,
        };
        let start = Instant::now();
        assert!(!clock.due(start));

        clock.start(start);
        assert!(!clock.due(start + Duration::from_secs(59)));
        assert!(clock.due(start + Duration::from_secs(60)));
        assert!(!clock.due(start + Duration::from_secs(61)));
        assert!(clock.due(start + Duration::from_secs(120)));
    }

    #[test]
    fn clock_text_shows_hours_and_minutes() {
        let at = Utc.with_ymd_and_hms(2024, 1, 17, 9, 5, 0).unwrap();
        assert_eq!(clock_text(&at), "Updated at 09:05");
    }
}

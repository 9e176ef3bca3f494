use task_board::app::controller::TaskController;
use task_board::app::events::UiEvent;
use task_board::app::filter::TaskFilter;
use task_board::app::models::{NewTask, Priority, TaskStats};
use task_board::app::source::StaticSource;
use task_board::app::storage::TaskStore;
use task_board::app::view::{
    DisplayConfig, Notifier, Renderer, Severity, TaskView, WeekCounts,
};

// Remembers everything it was asked to show.
#[derive(Default)]
struct RecordingView {
    main_shown: bool,
    progress: Vec<TaskStats>,
    lists: Vec<Vec<TaskView>>,
    calendars: Vec<WeekCounts>,
    labels: Vec<String>,
    clocks: Vec<String>,
    notifications: Vec<(String, Severity)>,
}

impl RecordingView {
    fn last_ids(&self) -> Vec<i64> {
        self.lists
            .last()
            .map(|list| list.iter().map(|task| task.id).collect())
            .unwrap_or_default()
    }

    fn last_notification(&self) -> Option<(&str, Severity)> {
        self.notifications
            .last()
            .map(|(message, severity)| (message.as_str(), *severity))
    }
}

impl Renderer for RecordingView {
    fn show_main(&mut self) {
        self.main_shown = true;
    }
    fn render_progress(&mut self, stats: &TaskStats) {
        self.progress.push(*stats);
    }
    fn render_tasks(&mut self, tasks: &[TaskView]) {
        self.lists.push(tasks.to_vec());
    }
    fn render_calendar(&mut self, counts: &WeekCounts) {
        self.calendars.push(*counts);
    }
    fn render_filter_label(&mut self, label: &str) {
        self.labels.push(label.to_string());
    }
    fn render_clock(&mut self, text: &str) {
        self.clocks.push(text.to_string());
    }
}

impl Notifier for RecordingView {
    fn notify(&mut self, message: &str, severity: Severity) {
        self.notifications.push((message.to_string(), severity));
    }
}

const DOCUMENT: &str = r#"[
  {"id": 1, "title": "A", "category": "Books", "priority": "high",
   "dueTime": "Due 5pm", "completed": false, "createdAt": "2024-01-17T12:00:00Z"},
  {"id": 2, "title": "B", "category": "Gardening", "priority": "low",
   "dueTime": "Mon - Fri", "completed": true, "createdAt": "2024-01-18T12:00:00Z"},
  {"id": 3, "title": "C", "category": "Phone", "priority": "medium",
   "dueTime": "", "completed": false, "createdAt": "2024-01-19T12:00:00Z"}
]"#;

async fn controller_with(document: &str) -> TaskController<StaticSource, RecordingView> {
    let store = TaskStore::new(StaticSource::new(document)).unwrap();
    let mut controller =
        TaskController::new(store, RecordingView::default(), DisplayConfig::default());
    controller.initialize().await;
    controller
}

#[tokio::test]
async fn initialize_loads_and_renders_everything() {
    let controller = controller_with(DOCUMENT).await;
    let view = controller.view();

    assert!(view.main_shown);
    assert_eq!(view.last_ids(), vec![1, 2, 3]);
    assert_eq!(
        view.progress.last(),
        Some(&TaskStats {
            total: 3,
            completed: 1,
            percentage: 33
        })
    );
    assert_eq!(view.labels, vec!["All".to_string()]);
    assert_eq!(view.calendars.last().map(|c| c.iter().sum::<usize>()), Some(3));
    assert!(view.clocks.last().unwrap().starts_with("Updated at "));
    assert!(view.notifications.is_empty());
}

#[tokio::test]
async fn projected_entries_carry_display_fields() {
    let controller = controller_with(DOCUMENT).await;
    let list = controller.view().lists.last().unwrap();

    assert_eq!(list[0].accent, task_board::app::view::Accent::Blue);
    assert_eq!(list[1].accent, task_board::app::view::Accent::Orange);
    assert_eq!(
        list[0].due,
        Some((task_board::app::view::DueMarker::Clock, "Due 5pm".to_string()))
    );
    assert_eq!(
        list[1].due.as_ref().map(|(marker, _)| *marker),
        Some(task_board::app::view::DueMarker::Range)
    );
    assert_eq!(list[2].due, None);
}

#[tokio::test]
async fn failed_load_is_surfaced_without_crashing() {
    let controller = controller_with("not a document").await;
    let view = controller.view();

    assert!(view.main_shown);
    assert!(controller.tasks().is_empty());
    assert_eq!(view.last_notification(), Some(("Error loading tasks", Severity::Error)));
    assert_eq!(view.progress.last(), Some(&TaskStats::default()));
}

#[tokio::test]
async fn toggle_updates_cache_store_and_notifies() {
    let mut controller = controller_with(DOCUMENT).await;

    controller.toggle_task(1);

    assert!(controller.tasks()[0].completed);
    assert!(controller.store().get(1).unwrap().completed);
    assert_eq!(controller.view().progress.last().unwrap().completed, 2);
    assert_eq!(
        controller.view().last_notification(),
        Some(("Task completed!", Severity::Success))
    );

    controller.toggle_task(1);
    assert!(!controller.tasks()[0].completed);
    assert_eq!(
        controller.view().last_notification(),
        Some(("Task marked as pending", Severity::Success))
    );
}

#[tokio::test]
async fn toggle_of_unknown_id_is_a_silent_no_op() {
    let mut controller = controller_with(DOCUMENT).await;
    let renders = controller.view().lists.len();

    controller.toggle_task(42);

    assert_eq!(controller.view().lists.len(), renders);
    assert!(controller.view().notifications.is_empty());
}

#[tokio::test]
async fn filter_cycle_rerenders_list_only() {
    let mut controller = controller_with(DOCUMENT).await;
    let progress_renders = controller.view().progress.len();
    let calendar_renders = controller.view().calendars.len();

    let mut seen = Vec::new();
    for _ in 0..5 {
        controller.cycle_filter();
        seen.push((controller.current_filter(), controller.view().last_ids()));
    }

    assert_eq!(
        seen,
        vec![
            (TaskFilter::Pending, vec![1, 3]),
            (TaskFilter::Completed, vec![2]),
            (TaskFilter::HighPriority, vec![1]),
            (TaskFilter::DueToday, vec![1]),
            (TaskFilter::All, vec![1, 2, 3]),
        ]
    );
    assert_eq!(
        controller.view().labels[1..],
        ["Pending", "Completed", "High priority", "Today", "All"].map(String::from)
    );
    assert_eq!(controller.view().progress.len(), progress_renders);
    assert_eq!(controller.view().calendars.len(), calendar_renders);
}

#[tokio::test]
async fn filtered_tasks_follow_current_filter() {
    let mut controller = controller_with(DOCUMENT).await;
    controller.cycle_filter();
    controller.cycle_filter();

    let completed: Vec<_> = controller.filtered_tasks().iter().map(|t| t.title.clone()).collect();
    assert_eq!(completed, vec!["B".to_string()]);
}

#[tokio::test]
async fn add_appends_and_rerenders() {
    let mut controller = controller_with(DOCUMENT).await;

    controller.add_task(NewTask {
        title: "Call the vet".into(),
        category: "Cats".into(),
        priority: Priority::High,
        due_time: String::new(),
    });

    let added = controller.tasks().last().unwrap().clone();
    assert_eq!(added.title, "Call the vet");
    assert!(!added.completed);
    assert_eq!(controller.view().last_ids().last(), Some(&added.id));
    assert_eq!(controller.view().progress.last().unwrap().total, 4);
    assert_eq!(
        controller.view().last_notification(),
        Some(("Task added", Severity::Success))
    );
}

#[tokio::test]
async fn new_task_hidden_by_completed_filter() {
    let mut controller = controller_with(DOCUMENT).await;
    controller.cycle_filter();
    controller.cycle_filter();

    controller.add_task(NewTask::titled("fresh"));

    assert_eq!(controller.view().last_ids(), vec![2]);
    assert_eq!(controller.current_filter(), TaskFilter::Completed);
}

#[tokio::test]
async fn delete_drops_task_even_when_absent() {
    let mut controller = controller_with(DOCUMENT).await;

    controller.delete_task(2);
    assert_eq!(controller.view().last_ids(), vec![1, 3]);
    assert_eq!(controller.view().progress.last().unwrap().completed, 0);

    controller.delete_task(2);
    assert_eq!(
        controller.view().last_notification(),
        Some(("Task deleted", Severity::Success))
    );
    assert_eq!(controller.tasks().len(), 2);
}

#[tokio::test]
async fn bus_events_reach_the_controller() {
    let mut controller = controller_with(DOCUMENT).await;
    let bus = controller.bus();

    assert!(bus.emit(UiEvent::CycleFilter));
    assert!(bus.emit(UiEvent::Toggle(3)));
    controller.pump_events();

    assert_eq!(controller.current_filter(), TaskFilter::Pending);
    assert!(controller.store().get(3).unwrap().completed);
    assert_eq!(controller.view().last_ids(), vec![1]);
}

#[tokio::test]
async fn detached_input_ignores_events() {
    let mut controller = controller_with(DOCUMENT).await;
    let bus = controller.bus();
    controller.detach_input();

    assert!(!bus.emit(UiEvent::CycleFilter));
    controller.pump_events();
    assert_eq!(controller.current_filter(), TaskFilter::All);
}

#[tokio::test]
async fn clock_tick_touches_only_the_clock() {
    let store = TaskStore::new(StaticSource::new(DOCUMENT)).unwrap();
    let mut controller =
        TaskController::new(store, RecordingView::default(), DisplayConfig::default())
            .with_clock_interval(std::time::Duration::from_millis(1));
    controller.initialize().await;
    let lists = controller.view().lists.len();
    let clocks = controller.view().clocks.len();

    controller.on_tick(std::time::Instant::now() + std::time::Duration::from_secs(1));

    assert_eq!(controller.view().clocks.len(), clocks + 1);
    assert_eq!(controller.view().lists.len(), lists);
}

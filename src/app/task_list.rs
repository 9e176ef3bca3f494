use ratatui::style::{Color, Modifier, Style, Stylize};
use ratatui::text::{Line, Span};
use ratatui::widgets::*;

use crate::app::models::{Priority, TaskId};
use crate::app::ui::TerminalView;
use crate::app::view::{Accent, DueMarker, TaskView, WeekCounts, WEEKDAY_LABELS};

// Selection state over the tasks the controller last rendered
#[derive(Default)]
pub struct TaskList {
    pub state: ListState,
    pub items: Vec<TaskView>,
}

impl TaskList {
    // Replace the items, keeping the selection on the same task when it is still visible
    pub fn replace_items(&mut self, items: &[TaskView]) {
        let selected_id = self.selected_id();
        self.items = items.to_vec();

        let index = match selected_id {
            Some(id) => self
                .items
                .iter()
                .position(|task| task.id == id)
                .or_else(|| self.state.selected().map(|i| i.min(self.items.len().saturating_sub(1)))),
            None => None,
        };
        self.state
            .select(if self.items.is_empty() { None } else { index });
    }

    // Move the selection to the next item, wrapping around
    pub fn next(&mut self) {
        if self.items.is_empty() {
            self.state.select(None);
            return;
        }
        let i = match self.state.selected() {
            Some(i) if i + 1 < self.items.len() => i + 1,
            _ => 0,
        };
        self.state.select(Some(i));
    }

    // Move the selection to the previous item, wrapping around
    pub fn previous(&mut self) {
        if self.items.is_empty() {
            self.state.select(None);
            return;
        }
        let i = match self.state.selected() {
            Some(0) | None => self.items.len() - 1,
            Some(i) => i - 1,
        };
        self.state.select(Some(i));
    }

    pub fn unselect(&mut self) {
        self.state.select(None);
    }

    pub fn selected_id(&self) -> Option<TaskId> {
        self.state
            .selected()
            .and_then(|i| self.items.get(i))
            .map(|task| task.id)
    }
}

pub fn accent_color(accent: Accent) -> Color {
    match accent {
        Accent::Orange => Color::Rgb(255, 149, 0),
        Accent::Blue => Color::Rgb(0, 122, 255),
        Accent::Green => Color::Rgb(52, 199, 89),
        Accent::Purple => Color::Rgb(175, 82, 222),
        Accent::Red => Color::Rgb(255, 59, 48),
    }
}

fn priority_span<'a>(priority: Priority) -> Span<'a> {
    match priority {
        Priority::High => Span::from(" ●").fg(Color::Red),
        Priority::Medium => Span::from(" ●").fg(Color::Yellow),
        Priority::Low => Span::from(" ●").fg(Color::Green),
    }
}

fn due_icon(marker: DueMarker) -> &'static str {
    match marker {
        DueMarker::Clock => "⏰",
        DueMarker::Range => "📅",
        DueMarker::Day => "🗓",
    }
}

// Build the UI (list) for the visible tasks
pub fn get_list_items_ui(tasks: &[TaskView]) -> Vec<ListItem<'_>> {
    tasks
        .iter()
        .map(|task| {
            let title_style = if task.completed {
                Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::CROSSED_OUT)
            } else {
                Style::default().fg(Color::White)
            };

            let mut lines = vec![Line::from(vec![
                Span::from(if task.completed { "[✓] " } else { "[ ] " }),
                Span::styled(task.title.as_str(), title_style),
                priority_span(task.priority),
            ])];

            let mut meta = vec![
                Span::from("    ▍").fg(accent_color(task.accent)),
                Span::from(task.category.as_str()),
            ];
            if let Some((marker, text)) = &task.due {
                meta.push(Span::from(format!("   {} {}", due_icon(*marker), text)));
            }
            lines.push(Line::from(meta));

            ListItem::new(lines)
        })
        .collect()
}

// Build the UI (lines) for the progress infobox
pub fn get_statistics_ui(view: &TerminalView) -> Vec<Line<'_>> {
    vec![
        Line::from(format!(
            "{} pending • {} completed",
            view.stats.remaining(),
            view.stats.completed
        )),
        Line::from(format!("Total tasks: {}", view.stats.total)),
        Line::from(vec![Span::from(view.clock.as_str()).fg(Color::DarkGray)]),
    ]
}

// Build the week strip, Monday first, with today's column highlighted
pub fn get_calendar_ui<'a>(counts: &WeekCounts, today: usize) -> Vec<Line<'a>> {
    let mut labels = Vec::with_capacity(7);
    let mut values = Vec::with_capacity(7);
    for (i, (label, count)) in WEEKDAY_LABELS.iter().zip(counts.iter()).enumerate() {
        let style = if i == today {
            Style::default().fg(Color::Black).bg(Color::LightGreen)
        } else {
            Style::default()
        };
        labels.push(Span::styled(format!(" {label} "), style));
        values.push(Span::styled(format!(" {count:^3} "), style));
    }
    vec![Line::from(values), Line::from(labels)]
}

// Build the UI (lines) for instructions infobox
pub fn get_instructions_ui<'a>() -> Vec<Line<'a>> {
    vec![
        "Enter/Space - toggle do/done".into(),
        "a - add a task".into(),
        "x - delete a task".into(),
        "f - next filter".into(),
        "q - quit".into(),
    ]
}

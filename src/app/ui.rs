use chrono::{Datelike, Local};
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::{prelude::*, widgets::*};
use std::{
    io,
    time::{Duration, Instant},
};

use crate::app::controller::TaskController;
use crate::app::events::{InputBus, UiEvent};
use crate::app::models::TaskStats;
use crate::app::source::TaskSource;
use crate::app::view::{Notifier, Renderer, Severity, TaskView, WeekCounts};
use crate::app::{task_edit::*, task_list::*};

pub const TOAST_TTL: Duration = Duration::from_secs(3);

pub struct Toast {
    pub message: String,
    pub severity: Severity,
    pub shown_at: Instant,
}

// Everything the controller last rendered, plus the purely local UI state
// (selection, add dialog) that never goes through the controller
pub struct TerminalView {
    pub loading: bool,
    pub stats: TaskStats,
    pub items: TaskList,
    pub calendar: WeekCounts,
    pub filter_label: String,
    pub clock: String,
    pub toasts: Vec<Toast>,
    pub add_task_dialog: AddTaskDialog,
}

impl Default for TerminalView {
    fn default() -> Self {
        TerminalView {
            loading: true,
            stats: TaskStats::default(),
            items: TaskList::default(),
            calendar: [0; 7],
            filter_label: String::new(),
            clock: String::new(),
            toasts: Vec::new(),
            add_task_dialog: AddTaskDialog::default(),
        }
    }
}

impl TerminalView {
    pub fn expire_toasts(&mut self, now: Instant) {
        self.toasts
            .retain(|toast| now.saturating_duration_since(toast.shown_at) < TOAST_TTL);
    }
}

impl Renderer for TerminalView {
    fn show_main(&mut self) {
        self.loading = false;
    }

    fn render_progress(&mut self, stats: &TaskStats) {
        self.stats = *stats;
    }

    fn render_tasks(&mut self, tasks: &[TaskView]) {
        self.items.replace_items(tasks);
    }

    fn render_calendar(&mut self, counts: &WeekCounts) {
        self.calendar = *counts;
    }

    fn render_filter_label(&mut self, label: &str) {
        self.filter_label = label.to_string();
    }

    fn render_clock(&mut self, text: &str) {
        self.clock = text.to_string();
    }
}

impl Notifier for TerminalView {
    fn notify(&mut self, message: &str, severity: Severity) {
        self.toasts.push(Toast {
            message: message.to_string(),
            severity,
            shown_at: Instant::now(),
        });
    }
}

// Translate one key press into local UI changes or bus events.
// Returns false when the user asked to quit.
pub fn handle_key(view: &mut TerminalView, bus: &InputBus, code: KeyCode) -> bool {
    if view.add_task_dialog.dialog_active {
        let dialog = &mut view.add_task_dialog;
        match code {
            KeyCode::Down | KeyCode::Tab => dialog.move_cursor_down(),
            KeyCode::Up | KeyCode::BackTab => dialog.move_cursor_up(),
            KeyCode::Esc => dialog.cancel(),
            KeyCode::Enter => {
                if let Some(new_task) = dialog.submit() {
                    bus.emit(UiEvent::Add(new_task));
                }
            }
            KeyCode::Left => dialog.move_cursor_left(),
            KeyCode::Right => dialog.move_cursor_right(),
            KeyCode::Backspace => dialog.delete_char(),
            KeyCode::Char(to_insert) => dialog.input(to_insert),
            _ => {}
        }
        return true;
    }

    match code {
        KeyCode::Char('q') => return false,
        KeyCode::Down => view.items.next(),
        KeyCode::Up => view.items.previous(),
        KeyCode::Left => view.items.unselect(),
        KeyCode::Char('a') => view.add_task_dialog.open(),
        KeyCode::Char('f') => {
            bus.emit(UiEvent::CycleFilter);
        }
        KeyCode::Char('x') => {
            if let Some(id) = view.items.selected_id() {
                bus.emit(UiEvent::Delete(id));
            }
        }
        KeyCode::Enter | KeyCode::Char(' ') => {
            if let Some(id) = view.items.selected_id() {
                bus.emit(UiEvent::Toggle(id));
            }
        }
        _ => {}
    }
    true
}

pub fn run_app<B: Backend, S: TaskSource>(
    terminal: &mut Terminal<B>,
    controller: &mut TaskController<S, TerminalView>,
    tick_rate: Duration,
) -> io::Result<()> {
    let bus = controller.bus();
    let mut last_tick = Instant::now();
    loop {
        terminal.draw(|f| draw_ui(f, controller.view_mut()))?;
        let timeout = tick_rate.saturating_sub(last_tick.elapsed());

        if crossterm::event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press && !handle_key(controller.view_mut(), &bus, key.code) {
                    return Ok(());
                }
            }
        }
        controller.pump_events();

        if last_tick.elapsed() >= tick_rate {
            let now = Instant::now();
            controller.on_tick(now);
            controller.view_mut().expire_toasts(now);
            last_tick = now;
        }
    }
}

fn severity_color(severity: Severity) -> Color {
    match severity {
        Severity::Success => Color::Green,
        Severity::Error => Color::Red,
        Severity::Info => Color::Blue,
    }
}

// Draws the whole user interface
pub fn draw_ui(f: &mut Frame, view: &mut TerminalView) {
    if view.loading {
        let loading = Paragraph::new("Loading tasks...")
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL).title("Tasks"));
        f.render_widget(loading, f.size());
        return;
    }

    // Create two chunks of screen in 60-40 ratio
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(f.size());

    // DRAW LEFT PART
    let list_title = format!("Tasks · {}", view.filter_label);
    if view.items.items.is_empty() {
        let empty = Paragraph::new("No tasks to show")
            .alignment(Alignment::Center)
            .style(Style::new().fg(Color::DarkGray))
            .block(Block::default().borders(Borders::ALL).title(list_title));
        f.render_widget(empty, chunks[0]);
    } else {
        let task_list = List::new(get_list_items_ui(view.items.items.as_slice()))
            .block(Block::default().borders(Borders::ALL).title(list_title))
            .highlight_style(
                Style::default()
                    .bg(Color::Rgb(40, 60, 40))
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol(">> ");
        f.render_stateful_widget(task_list, chunks[0], &mut view.items.state);
    }

    // DRAW RIGHT PART
    if view.add_task_dialog.dialog_active {
        let add_task = Paragraph::new(get_task_edit_ui(&view.add_task_dialog))
            .block(Block::new().title("Add Task").borders(Borders::ALL))
            .style(Style::new().white());
        f.render_widget(add_task, chunks[1]);
    } else {
        let right_side = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(5),
                Constraint::Length(4),
                Constraint::Min(0),
            ])
            .split(chunks[1]);

        let gauge = Gauge::default()
            .block(Block::new().title("Progress").borders(Borders::ALL))
            .gauge_style(Style::new().fg(Color::Green).bg(Color::Rgb(40, 40, 40)))
            .percent(u16::from(view.stats.percentage))
            .label(format!("{}% completed", view.stats.percentage));

        let statistics = Paragraph::new(get_statistics_ui(view))
            .block(Block::new().title("Statistics").borders(Borders::ALL))
            .style(Style::new().white());

        let today = Local::now().weekday().num_days_from_monday() as usize;
        let calendar = Paragraph::new(get_calendar_ui(&view.calendar, today))
            .block(Block::new().title("Created this week").borders(Borders::ALL));

        let instructions = Paragraph::new(get_instructions_ui())
            .block(Block::new().title("Commands").borders(Borders::ALL))
            .style(Style::new().white());

        f.render_widget(gauge, right_side[0]);
        f.render_widget(statistics, right_side[1]);
        f.render_widget(calendar, right_side[2]);
        f.render_widget(instructions, right_side[3]);
    }

    draw_toasts(f, &view.toasts);
}

// Stack notifications in the top right corner, newest first
fn draw_toasts(f: &mut Frame, toasts: &[Toast]) {
    let area = f.size();
    let width = area.width.min(40);
    for (i, toast) in toasts.iter().rev().enumerate() {
        let y = area.y + 1 + (i as u16) * 3;
        if y + 3 > area.bottom() {
            break;
        }
        let rect = Rect::new(area.right().saturating_sub(width + 1), y, width, 3);
        let color = severity_color(toast.severity);
        let widget = Paragraph::new(toast.message.as_str())
            .style(Style::new().fg(Color::White))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::new().fg(color)),
            );
        f.render_widget(Clear, rect);
        f.render_widget(widget, rect);
    }
}

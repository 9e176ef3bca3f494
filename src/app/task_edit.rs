use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

use crate::app::models::{NewTask, Priority, DEFAULT_CATEGORY};
use derivative::Derivative;

const FIELD_COUNT: usize = 4;

// State object for the add task dialog
// Keeps track of whether the dialog is open, the typed values and the cursor
#[derive(Derivative)]
#[derivative(Default)]
pub struct AddTaskDialog {
    pub dialog_active: bool,
    content: AddTaskContent,
    // (char column, field row)
    cursor_position: (usize, usize),
}

// Raw text of every field; defaults are applied on submit
#[derive(Default)]
struct AddTaskContent {
    title: String,
    category: String,
    priority: String,
    due_time: String,
}

impl AddTaskContent {
    fn field(&self, y_position: usize) -> Option<&String> {
        match y_position {
            0 => Some(&self.title),
            1 => Some(&self.category),
            2 => Some(&self.priority),
            3 => Some(&self.due_time),
            _ => None,
        }
    }

    fn field_mut(&mut self, y_position: usize) -> Option<&mut String> {
        match y_position {
            0 => Some(&mut self.title),
            1 => Some(&mut self.category),
            2 => Some(&mut self.priority),
            3 => Some(&mut self.due_time),
            _ => None,
        }
    }
}

// Byte offset of the char at `column`, or the end of the string
fn byte_offset(text: &str, column: usize) -> usize {
    text.char_indices()
        .nth(column)
        .map_or(text.len(), |(offset, _)| offset)
}

impl AddTaskDialog {
    // Opens the dialog with empty fields
    pub fn open(&mut self) {
        self.dialog_active = true;
        self.content = AddTaskContent::default();
        self.cursor_position = (0, 0);
    }

    pub fn cancel(&mut self) {
        self.dialog_active = false;
    }

    fn field_len(&self, y_position: usize) -> usize {
        self.content
            .field(y_position)
            .map_or(0, |field| field.chars().count())
    }

    // Move the cursor one field down, keeping the column when possible
    pub fn move_cursor_down(&mut self) {
        let (x, y) = self.cursor_position;
        let next_y = (y + 1).min(FIELD_COUNT - 1);
        self.cursor_position = (x.min(self.field_len(next_y)), next_y);
    }

    // Move the cursor one field up, keeping the column when possible
    pub fn move_cursor_up(&mut self) {
        let (x, y) = self.cursor_position;
        let next_y = y.saturating_sub(1);
        self.cursor_position = (x.min(self.field_len(next_y)), next_y);
    }

    pub fn move_cursor_left(&mut self) {
        let (x, y) = self.cursor_position;
        self.cursor_position = (x.saturating_sub(1), y);
    }

    pub fn move_cursor_right(&mut self) {
        let (x, y) = self.cursor_position;
        self.cursor_position = ((x + 1).min(self.field_len(y)), y);
    }

    // Insert a char at the cursor in the active field
    pub fn input(&mut self, to_insert: char) {
        let (x, y) = self.cursor_position;
        if let Some(field) = self.content.field_mut(y) {
            let offset = byte_offset(field, x);
            field.insert(offset, to_insert);
            self.move_cursor_right();
        }
    }

    // Delete the char before the cursor
    pub fn delete_char(&mut self) {
        let (x, y) = self.cursor_position;
        if x == 0 {
            return;
        }
        if let Some(field) = self.content.field_mut(y) {
            let offset = byte_offset(field, x - 1);
            if offset < field.len() {
                field.remove(offset);
            }
        }
        self.move_cursor_left();
    }

    // Closes the dialog and turns the typed values into a task.
    //
    // An empty title aborts without creating anything. An empty category
    // becomes "General"; an unknown priority becomes medium.
    pub fn submit(&mut self) -> Option<NewTask> {
        self.dialog_active = false;
        let content = std::mem::take(&mut self.content);

        let title = content.title.trim();
        if title.is_empty() {
            return None;
        }

        let category = match content.category.trim() {
            "" => DEFAULT_CATEGORY.to_string(),
            category => category.to_string(),
        };

        let priority = match content.priority.trim() {
            "" => Priority::default(),
            raw => raw.parse().unwrap_or_else(|err| {
                tracing::warn!(error = %err, "falling back to medium priority");
                Priority::default()
            }),
        };

        Some(NewTask {
            title: title.to_string(),
            category,
            priority,
            due_time: content.due_time.trim().to_string(),
        })
    }
}

// Returns the UI content for the add task dialog
pub fn get_task_edit_ui(dialog: &AddTaskDialog) -> Vec<Line<'_>> {
    const GRAY_TEXT: Style = Style::new().fg(Color::Rgb(62, 62, 62));
    const WHITE_TEXT: Style = Style::new().fg(Color::White);
    const BLACK_ON_WHITE: Style = Style::new().fg(Color::Black).bg(Color::White);

    let prefixes = [
        ("Title:    ", "My task name"),
        ("Category: ", DEFAULT_CATEGORY),
        ("Priority: ", "medium"),
        ("Due:      ", "Due 5pm"),
    ];

    let (cursor_x, cursor_y) = dialog.cursor_position;
    let mut text = Vec::new();

    for (i, (prefix, placeholder)) in prefixes.iter().enumerate() {
        let value = dialog.content.field(i).map_or("", String::as_str);
        let mut spans = vec![Span::styled(*prefix, WHITE_TEXT)];

        if value.is_empty() {
            // Empty field shows a gray placeholder; the first char doubles as cursor
            if cursor_y == i {
                spans.push(Span::styled(
                    placeholder.chars().take(1).collect::<String>(),
                    BLACK_ON_WHITE,
                ));
                spans.push(Span::styled(
                    placeholder.chars().skip(1).collect::<String>(),
                    GRAY_TEXT,
                ));
            } else {
                spans.push(Span::styled(*placeholder, GRAY_TEXT));
            }
        } else if cursor_y == i {
            spans.push(Span::styled(
                value.chars().take(cursor_x).collect::<String>(),
                WHITE_TEXT,
            ));
            let under_cursor = value.chars().skip(cursor_x).take(1).collect::<String>();
            if under_cursor.is_empty() {
                spans.push(Span::styled(" ", BLACK_ON_WHITE));
            } else {
                spans.push(Span::styled(under_cursor, BLACK_ON_WHITE));
            }
            spans.push(Span::styled(
                value.chars().skip(cursor_x + 1).collect::<String>(),
                WHITE_TEXT,
            ));
        } else {
            spans.push(Span::styled(value, WHITE_TEXT));
        }

        text.push(Line::from(spans));
    }

    text.push(Line::raw(""));
    text.push(Line::styled("Priority: low, medium or high", GRAY_TEXT));
    text.push(Line::styled("Enter - save, Esc - cancel", WHITE_TEXT));

    text
}

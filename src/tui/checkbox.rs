use crossterm::event::KeyCode;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Span;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};

use super::{Status, UiEvent, Widget, is_cancel_key};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CheckboxItem {
    pub label: String,
    pub value: String,
    pub checked: bool,
    pub disabled: bool,
}

impl CheckboxItem {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
            checked: false,
            disabled: false,
        }
    }

    pub fn checked(mut self, checked: bool) -> Self {
        self.checked = checked;
        self
    }

    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }
}

#[derive(Debug)]
pub struct CheckboxGroup {
    title: String,
    items: Vec<CheckboxItem>,
    cursor: usize,
    status: Status,
}

impl CheckboxGroup {
    pub fn new(title: &str, items: Vec<CheckboxItem>) -> Self {
        Self {
            title: title.to_string(),
            items,
            cursor: 0,
            status: Status::Pending,
        }
    }

    /// Items in their original order with their final checked state.
    pub fn items(&self) -> &[CheckboxItem] {
        &self.items
    }

    pub fn checked_values(&self) -> Vec<String> {
        self.items
            .iter()
            .filter(|i| i.checked)
            .map(|i| i.value.clone())
            .collect()
    }
}

impl Widget for CheckboxGroup {
    fn update(&mut self, event: &UiEvent) {
        let UiEvent::Key(key) = event else {
            return;
        };
        if is_cancel_key(key) {
            self.status = Status::Cancelled;
            return;
        }
        match key.code {
            KeyCode::Up | KeyCode::Char('k') | KeyCode::Char('w') => {
                self.cursor = self.cursor.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') | KeyCode::Char('s') => {
                if self.cursor + 1 < self.items.len() {
                    self.cursor += 1;
                }
            }
            KeyCode::Char(' ') => {
                if let Some(item) = self.items.get_mut(self.cursor) {
                    if !item.disabled {
                        item.checked = !item.checked;
                    }
                }
            }
            KeyCode::Enter => self.status = Status::Submitted,
            _ => {}
        }
    }

    fn draw(&self, frame: &mut ratatui::Frame) {
        let parts = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(3), Constraint::Length(1)])
            .split(frame.area());

        let rows: Vec<ListItem> = self
            .items
            .iter()
            .map(|i| {
                let mark = if i.checked { "[x]" } else { "[ ]" };
                let style = if i.disabled {
                    Style::default().fg(Color::DarkGray)
                } else {
                    Style::default()
                };
                ListItem::new(Span::styled(format!("{} {}", mark, i.label), style))
            })
            .collect();
        let mut state = ListState::default();
        if !self.items.is_empty() {
            state.select(Some(self.cursor));
        }
        let list = List::new(rows)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(self.title.as_str()),
            )
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
            .highlight_symbol("> ");
        frame.render_stateful_widget(list, parts[0], &mut state);
        frame.render_widget(
            Paragraph::new(Span::styled(
                "space toggle · enter confirm · esc cancel",
                Style::default().fg(Color::Gray),
            )),
            parts[1],
        );
    }

    fn status(&self) -> Status {
        self.status
    }

    fn height(&self) -> u16 {
        (self.items.len().min(12) + 3) as u16
    }
}

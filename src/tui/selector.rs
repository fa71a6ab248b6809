use crossterm::event::KeyCode;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};

use super::{Status, UiEvent, Widget, is_cancel_key};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Choice {
    pub label: String,
    pub description: Option<String>,
    pub value: String,
}

impl Choice {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            description: None,
            value: value.into(),
        }
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        let d = description.into();
        self.description = (!d.is_empty()).then_some(d);
        self
    }

    pub(super) fn list_item(&self) -> ListItem<'_> {
        let mut spans = vec![Span::raw(self.label.as_str())];
        if let Some(d) = &self.description {
            spans.push(Span::raw("  "));
            spans.push(Span::styled(d.as_str(), Style::default().fg(Color::Gray)));
        }
        ListItem::new(Line::from(spans))
    }
}

pub(super) fn draw_choices(
    frame: &mut ratatui::Frame,
    area: ratatui::layout::Rect,
    title: &str,
    choices: &[&Choice],
    cursor: usize,
) {
    let items: Vec<ListItem> = choices.iter().map(|c| c.list_item()).collect();
    let mut state = ListState::default();
    if !choices.is_empty() {
        state.select(Some(cursor.min(choices.len() - 1)));
    }
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");
    frame.render_stateful_widget(list, area, &mut state);
}

pub(super) const HINT: &str = "↑/↓ move · enter select · esc cancel";

#[derive(Debug)]
pub struct Selector {
    title: String,
    choices: Vec<Choice>,
    cursor: usize,
    status: Status,
}

impl Selector {
    pub fn new(title: &str, choices: Vec<Choice>) -> Self {
        Self {
            title: title.to_string(),
            choices,
            cursor: 0,
            status: Status::Pending,
        }
    }

    pub fn selected(&self) -> Option<&Choice> {
        match self.status {
            Status::Submitted => self.choices.get(self.cursor),
            _ => None,
        }
    }

    pub fn value(&self) -> Option<&str> {
        self.selected().map(|c| c.value.as_str())
    }
}

impl Widget for Selector {
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
                if self.cursor + 1 < self.choices.len() {
                    self.cursor += 1;
                }
            }
            KeyCode::Enter if !self.choices.is_empty() => self.status = Status::Submitted,
            _ => {}
        }
    }

    fn draw(&self, frame: &mut ratatui::Frame) {
        let parts = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(3), Constraint::Length(1)])
            .split(frame.area());
        let refs: Vec<&Choice> = self.choices.iter().collect();
        draw_choices(frame, parts[0], &self.title, &refs, self.cursor);
        frame.render_widget(
            Paragraph::new(Span::styled(HINT, Style::default().fg(Color::Gray))),
            parts[1],
        );
    }

    fn status(&self) -> Status {
        self.status
    }

    fn height(&self) -> u16 {
        (self.choices.len().min(10) + 3) as u16
    }
}

use std::collections::BTreeMap;

use crossterm::event::KeyCode;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};

use super::input::Input;
use super::{Status, UiEvent, Widget, is_cancel_key};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldKind {
    String,
    Integer,
    /// Echoed as `*`; the value is returned verbatim.
    Password,
}

#[derive(Debug)]
pub(super) struct Field {
    pub(super) id: String,
    pub(super) label: String,
    pub(super) kind: FieldKind,
    pub(super) input: Input,
    pub(super) error: Option<String>,
}

pub(super) enum Step {
    Continue,
    SubmitRequested,
}

/// A stack of labelled inputs followed by a Submit button.
#[derive(Debug)]
pub struct Prompt {
    title: String,
    pub(super) fields: Vec<Field>,
    focus: usize,
    status: Status,
    blink: bool,
}

impl Prompt {
    pub fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            fields: Vec::new(),
            focus: 0,
            status: Status::Pending,
            blink: true,
        }
    }

    pub fn field(self, id: &str, label: &str, kind: FieldKind) -> Self {
        self.field_with_value(id, label, kind, "")
    }

    pub fn field_with_value(mut self, id: &str, label: &str, kind: FieldKind, value: &str) -> Self {
        self.fields.push(Field {
            id: id.to_string(),
            label: label.to_string(),
            kind,
            input: Input::with_value(value),
            error: None,
        });
        self
    }

    pub fn value(&self, id: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.id == id)
            .map(|f| f.input.value())
    }

    pub fn values(&self) -> BTreeMap<String, String> {
        self.fields
            .iter()
            .map(|f| (f.id.clone(), f.input.value().to_string()))
            .collect()
    }

    /// Index of the focused field; `fields.len()` is the Submit button.
    pub fn focus(&self) -> usize {
        self.focus
    }

    pub(super) fn set_focus(&mut self, focus: usize) {
        self.focus = focus.min(self.fields.len());
    }

    pub(super) fn set_status(&mut self, status: Status) {
        self.status = status;
    }

    fn stops(&self) -> usize {
        self.fields.len() + 1
    }

    pub(super) fn step(&mut self, event: &UiEvent) -> Step {
        let key = match event {
            UiEvent::Tick => {
                self.blink = !self.blink;
                return Step::Continue;
            }
            UiEvent::Resize(..) => return Step::Continue,
            UiEvent::Key(key) => key,
        };
        if is_cancel_key(key) {
            self.status = Status::Cancelled;
            return Step::Continue;
        }
        self.blink = true;
        match key.code {
            KeyCode::Tab | KeyCode::Down => self.focus = (self.focus + 1) % self.stops(),
            KeyCode::BackTab | KeyCode::Up => {
                self.focus = (self.focus + self.stops() - 1) % self.stops()
            }
            KeyCode::Enter if self.focus == self.fields.len() => return Step::SubmitRequested,
            KeyCode::Enter => self.focus += 1,
            _ => {
                let Some(field) = self.fields.get_mut(self.focus) else {
                    return Step::Continue;
                };
                if let (FieldKind::Integer, KeyCode::Char(c)) = (field.kind, key.code) {
                    if !(c.is_ascii_digit() || c == '-') {
                        return Step::Continue;
                    }
                }
                field.input.handle_key(key);
            }
        }
        Step::Continue
    }
}

impl Widget for Prompt {
    fn update(&mut self, event: &UiEvent) {
        if let Step::SubmitRequested = self.step(event) {
            self.status = Status::Submitted;
        }
    }

    fn draw(&self, frame: &mut ratatui::Frame) {
        let area = frame.area();
        let mut constraints = vec![Constraint::Length(1)];
        for f in &self.fields {
            constraints.push(Constraint::Length(3));
            if f.error.is_some() {
                constraints.push(Constraint::Length(1));
            }
        }
        constraints.push(Constraint::Length(1));
        constraints.push(Constraint::Min(0));
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .split(area);

        frame.render_widget(
            Paragraph::new(Span::styled(
                self.title.as_str(),
                Style::default().add_modifier(Modifier::BOLD),
            )),
            rows[0],
        );

        let mut row = 1;
        for (i, f) in self.fields.iter().enumerate() {
            let focused = i == self.focus;
            let border = if f.error.is_some() {
                Style::default().fg(Color::Red)
            } else if focused {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default()
            };
            let text = f
                .input
                .render(f.kind == FieldKind::Password, focused && self.blink);
            frame.render_widget(
                Paragraph::new(text).block(
                    Block::default()
                        .borders(Borders::ALL)
                        .border_style(border)
                        .title(f.label.as_str()),
                ),
                rows[row],
            );
            row += 1;
            if let Some(err) = &f.error {
                frame.render_widget(
                    Paragraph::new(Span::styled(
                        format!("  {}", err),
                        Style::default().fg(Color::Red),
                    )),
                    rows[row],
                );
                row += 1;
            }
        }

        let button = if self.focus == self.fields.len() {
            Span::styled("[ Submit ]", Style::default().add_modifier(Modifier::REVERSED))
        } else {
            Span::raw("[ Submit ]")
        };
        frame.render_widget(Paragraph::new(Line::from(button)), rows[row]);
    }

    fn status(&self) -> Status {
        self.status
    }

    fn height(&self) -> u16 {
        let errors = self.fields.iter().filter(|f| f.error.is_some()).count();
        (2 + self.fields.len() * 3 + errors) as u16
    }
}

use crossterm::event::KeyCode;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};

use super::input::Input;
use super::selector::{Choice, draw_choices};
use super::{Status, UiEvent, Widget, is_cancel_key};

/// A selector with a text filter. Typing narrows the list; arrows leave the
/// filter and move within the narrowed view; `/` returns to the filter.
#[derive(Debug)]
pub struct FilterList {
    title: String,
    choices: Vec<Choice>,
    filter: Input,
    filtering: bool,
    cursor: usize,
    status: Status,
    chosen: Option<usize>,
    blink: bool,
}

impl FilterList {
    pub fn new(title: &str, choices: Vec<Choice>) -> Self {
        Self {
            title: title.to_string(),
            choices,
            filter: Input::default(),
            filtering: true,
            cursor: 0,
            status: Status::Pending,
            chosen: None,
            blink: true,
        }
    }

    /// Starts in navigation mode; `/` still opens the filter.
    pub fn without_filter(mut self) -> Self {
        self.filtering = false;
        self
    }

    pub fn filtering(&self) -> bool {
        self.filtering
    }

    pub fn selected(&self) -> Option<&Choice> {
        self.chosen.and_then(|i| self.choices.get(i))
    }

    pub fn value(&self) -> Option<&str> {
        self.selected().map(|c| c.value.as_str())
    }

    /// Indexes into `choices` of the entries matching the filter.
    pub fn visible(&self) -> Vec<usize> {
        let needle = self.filter.value().trim().to_lowercase();
        self.choices
            .iter()
            .enumerate()
            .filter(|(_, c)| {
                needle.is_empty()
                    || c.label.to_lowercase().contains(&needle)
                    || c.value.to_lowercase().contains(&needle)
                    || c
                        .description
                        .as_deref()
                        .is_some_and(|d| d.to_lowercase().contains(&needle))
            })
            .map(|(i, _)| i)
            .collect()
    }

    fn move_cursor(&mut self, down: bool, len: usize) {
        if down {
            if self.cursor + 1 < len {
                self.cursor += 1;
            }
        } else {
            self.cursor = self.cursor.saturating_sub(1);
        }
    }

    fn commit(&mut self) {
        if let Some(&i) = self.visible().get(self.cursor) {
            self.chosen = Some(i);
            self.status = Status::Submitted;
        }
    }
}

impl Widget for FilterList {
    fn update(&mut self, event: &UiEvent) {
        let key = match event {
            UiEvent::Tick => {
                self.blink = !self.blink;
                return;
            }
            UiEvent::Resize(..) => return,
            UiEvent::Key(key) => key,
        };
        if is_cancel_key(key) {
            self.status = Status::Cancelled;
            return;
        }
        let len = self.visible().len();
        match key.code {
            KeyCode::Enter => self.commit(),
            KeyCode::Up | KeyCode::Down => {
                self.filtering = false;
                self.move_cursor(key.code == KeyCode::Down, len);
            }
            _ if self.filtering => {
                if self.filter.handle_key(key) {
                    self.cursor = 0;
                }
            }
            KeyCode::Char('/') => self.filtering = true,
            KeyCode::Char('j') | KeyCode::Char('s') => self.move_cursor(true, len),
            KeyCode::Char('k') | KeyCode::Char('w') => self.move_cursor(false, len),
            _ => {}
        }
        let len = self.visible().len();
        if len > 0 && self.cursor >= len {
            self.cursor = len - 1;
        }
    }

    fn draw(&self, frame: &mut ratatui::Frame) {
        let parts = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(3),
                Constraint::Length(1),
            ])
            .split(frame.area());

        let filter_style = if self.filtering {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default()
        };
        frame.render_widget(
            Paragraph::new(self.filter.render(false, self.filtering && self.blink)).block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(filter_style)
                    .title("Filter"),
            ),
            parts[0],
        );

        let visible = self.visible();
        let shown: Vec<&Choice> = visible.iter().map(|&i| &self.choices[i]).collect();
        let title = format!("{} ({}/{})", self.title, shown.len(), self.choices.len());
        draw_choices(frame, parts[1], &title, &shown, self.cursor);

        let hint = if self.filtering {
            "type to filter · ↑/↓ move · enter select · esc cancel"
        } else {
            "/ filter · ↑/↓ move · enter select · esc cancel"
        };
        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(hint, Style::default().fg(Color::Gray)))),
            parts[2],
        );
    }

    fn status(&self) -> Status {
        self.status
    }

    fn height(&self) -> u16 {
        (self.choices.len().min(10) + 6) as u16
    }
}

use crossterm::event::KeyCode;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use super::{Mode, Status, UiEvent, Widget, is_cancel_key};

const INLINE_MAX_WIDTH: u16 = 72;

/// Bordered modal with OK and an optional Cancel button. Choosing the
/// negative button leaves the dialog `Cancelled`.
#[derive(Debug)]
pub struct Dialog {
    title: String,
    message: String,
    ok_label: String,
    cancel_label: Option<String>,
    mode: Mode,
    on_cancel: bool,
    status: Status,
}

impl Dialog {
    pub fn alert(title: &str, message: &str) -> Self {
        Self {
            title: title.to_string(),
            message: message.to_string(),
            ok_label: "OK".to_string(),
            cancel_label: None,
            mode: Mode::Fullscreen,
            on_cancel: false,
            status: Status::Pending,
        }
    }

    pub fn confirm(title: &str, message: &str) -> Self {
        let mut d = Self::alert(title, message);
        d.cancel_label = Some("Cancel".to_string());
        d
    }

    pub fn labels(mut self, ok: &str, cancel: &str) -> Self {
        self.ok_label = ok.to_string();
        if self.cancel_label.is_some() {
            self.cancel_label = Some(cancel.to_string());
        }
        self
    }

    pub fn inline(mut self) -> Self {
        self.mode = Mode::Inline;
        self
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn confirmed(&self) -> bool {
        self.status == Status::Submitted
    }

    fn box_area(&self, area: Rect) -> Rect {
        match self.mode {
            Mode::Fullscreen => {
                let w = area.width.saturating_sub(6).clamp(20, 90).min(area.width);
                let h = self.height().min(area.height);
                Rect {
                    x: area.x + area.width.saturating_sub(w) / 2,
                    y: area.y + area.height.saturating_sub(h) / 2,
                    width: w,
                    height: h,
                }
            }
            Mode::Inline => Rect {
                width: area.width.min(INLINE_MAX_WIDTH),
                ..area
            },
        }
    }

    fn buttons(&self) -> Line<'_> {
        let button = |label: &str, focused: bool| {
            let text = format!("[ {} ]", label);
            if focused {
                Span::styled(text, Style::default().add_modifier(Modifier::REVERSED))
            } else {
                Span::raw(text)
            }
        };
        let mut spans = vec![button(&self.ok_label, !self.on_cancel)];
        if let Some(cancel) = &self.cancel_label {
            spans.push(Span::raw("  "));
            spans.push(button(cancel, self.on_cancel));
        }
        Line::from(spans)
    }
}

impl Widget for Dialog {
    fn update(&mut self, event: &UiEvent) {
        let UiEvent::Key(key) = event else {
            return;
        };
        if is_cancel_key(key) {
            self.status = Status::Cancelled;
            return;
        }
        let has_cancel = self.cancel_label.is_some();
        match key.code {
            KeyCode::Left | KeyCode::Right | KeyCode::Tab | KeyCode::BackTab if has_cancel => {
                self.on_cancel = !self.on_cancel;
            }
            KeyCode::Char('y') | KeyCode::Char('Y') => self.status = Status::Submitted,
            KeyCode::Char('n') | KeyCode::Char('N') if has_cancel => {
                self.status = Status::Cancelled;
            }
            KeyCode::Enter => {
                self.status = if self.on_cancel {
                    Status::Cancelled
                } else {
                    Status::Submitted
                };
            }
            _ => {}
        }
    }

    fn draw(&self, frame: &mut ratatui::Frame) {
        let area = self.box_area(frame.area());
        frame.render_widget(Clear, area);

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(self.title.as_str());
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let parts = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(1), Constraint::Length(1)])
            .split(inner);
        frame.render_widget(
            Paragraph::new(self.message.as_str()).wrap(Wrap { trim: false }),
            parts[0],
        );
        frame.render_widget(
            Paragraph::new(self.buttons()).alignment(Alignment::Center),
            parts[1],
        );
    }

    fn status(&self) -> Status {
        self.status
    }

    fn height(&self) -> u16 {
        let width = (INLINE_MAX_WIDTH - 2) as usize;
        let lines: usize = self
            .message
            .lines()
            .map(|l| l.chars().count().div_ceil(width).max(1))
            .sum();
        (lines.max(1) + 3) as u16
    }
}

use std::collections::VecDeque;
use std::io::{self, IsTerminal, Stdout};
use std::sync::atomic::{AtomicU8, Ordering};
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::cursor::Show;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::backend::{CrosstermBackend, TestBackend};
use ratatui::{Terminal, TerminalOptions, Viewport};

use super::{Mode, UiEvent, Widget};

const TICK: Duration = Duration::from_millis(500);

const RELEASED: u8 = 0;
const RAW_INLINE: u8 = 1;
const RAW_FULLSCREEN: u8 = 2;

/// How the real terminal is currently held by a [`TerminalDriver`].
static HELD: AtomicU8 = AtomicU8::new(RELEASED);

/// Leaves raw mode and the alternate screen if a widget still holds the
/// terminal. Returns whether anything had to be undone.
///
/// Callable from any thread.
pub fn restore_terminal() -> bool {
    let held = HELD.swap(RELEASED, Ordering::SeqCst);
    if held == RELEASED {
        return false;
    }
    disable_raw_mode().ok();
    let mut stdout = io::stdout();
    if held == RAW_FULLSCREEN {
        execute!(stdout, LeaveAlternateScreen).ok();
    }
    execute!(stdout, Show).ok();
    true
}

/// Source of input events and sink for frames.
pub trait Driver {
    /// Whether a person can answer; selection helpers refuse to guess
    /// when this is false.
    fn interactive(&self) -> bool;
    fn begin(&mut self, mode: Mode, height: u16) -> Result<()>;
    fn draw(&mut self, widget: &dyn Widget) -> Result<()>;
    fn next_event(&mut self) -> Result<UiEvent>;
    fn end(&mut self) -> Result<()>;
}

#[derive(Default)]
pub struct TerminalDriver {
    terminal: Option<Terminal<CrosstermBackend<Stdout>>>,
    mode: Mode,
}

impl TerminalDriver {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Driver for TerminalDriver {
    fn interactive(&self) -> bool {
        io::stdin().is_terminal() && io::stdout().is_terminal()
    }

    fn begin(&mut self, mode: Mode, height: u16) -> Result<()> {
        if !self.interactive() {
            anyhow::bail!("interactive input requires a terminal (TTY); pass the values as flags");
        }
        let mut stdout = io::stdout();
        enable_raw_mode().context("enable raw mode")?;
        let held = match mode {
            Mode::Fullscreen => RAW_FULLSCREEN,
            Mode::Inline => RAW_INLINE,
        };
        HELD.store(held, Ordering::SeqCst);
        let terminal = match mode {
            Mode::Fullscreen => {
                execute!(stdout, EnterAlternateScreen).context("enter alternate screen")?;
                let mut t = Terminal::new(CrosstermBackend::new(stdout)).context("create terminal")?;
                t.clear().ok();
                t
            }
            Mode::Inline => Terminal::with_options(
                CrosstermBackend::new(stdout),
                TerminalOptions {
                    viewport: Viewport::Inline(height.max(1)),
                },
            )
            .context("create inline terminal")?,
        };
        self.terminal = Some(terminal);
        self.mode = mode;
        Ok(())
    }

    fn draw(&mut self, widget: &dyn Widget) -> Result<()> {
        let Some(terminal) = self.terminal.as_mut() else {
            anyhow::bail!("terminal not started");
        };
        terminal.draw(|f| widget.draw(f)).context("draw")?;
        Ok(())
    }

    fn next_event(&mut self) -> Result<UiEvent> {
        loop {
            if !event::poll(TICK).context("poll")? {
                return Ok(UiEvent::Tick);
            }
            match event::read().context("read event")? {
                Event::Key(k) if k.kind == KeyEventKind::Press => return Ok(UiEvent::Key(k)),
                Event::Resize(w, h) => {
                    if let Some(t) = self.terminal.as_mut() {
                        t.autoresize().ok();
                    }
                    return Ok(UiEvent::Resize(w, h));
                }
                _ => {}
            }
        }
    }

    fn end(&mut self) -> Result<()> {
        let Some(mut terminal) = self.terminal.take() else {
            return Ok(());
        };
        HELD.store(RELEASED, Ordering::SeqCst);
        disable_raw_mode().ok();
        match self.mode {
            Mode::Fullscreen => {
                execute!(terminal.backend_mut(), LeaveAlternateScreen).ok();
            }
            Mode::Inline => {
                terminal.clear().ok();
            }
        }
        terminal.show_cursor().ok();
        Ok(())
    }
}

/// Replays queued events against an in-memory screen.
pub struct ScriptedDriver {
    size: (u16, u16),
    terminal: Option<Terminal<TestBackend>>,
    events: VecDeque<UiEvent>,
    interactive: bool,
    screens: Vec<String>,
}

impl ScriptedDriver {
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            size: (width, height),
            terminal: None,
            events: VecDeque::new(),
            interactive: true,
            screens: Vec::new(),
        }
    }

    /// A driver that reports no TTY, for exercising flag-only paths.
    pub fn detached() -> Self {
        let mut d = Self::new(80, 24);
        d.interactive = false;
        d
    }

    pub fn push(&mut self, event: UiEvent) -> &mut Self {
        self.events.push_back(event);
        self
    }

    pub fn key(&mut self, code: KeyCode) -> &mut Self {
        self.push(UiEvent::key(code))
    }

    pub fn ctrl(&mut self, c: char) -> &mut Self {
        self.push(UiEvent::ctrl(c))
    }

    pub fn text(&mut self, s: &str) -> &mut Self {
        for c in s.chars() {
            self.push(UiEvent::Key(event::KeyEvent::new(
                KeyCode::Char(c),
                KeyModifiers::NONE,
            )));
        }
        self
    }

    pub fn enter(&mut self) -> &mut Self {
        self.key(KeyCode::Enter)
    }

    pub fn remaining(&self) -> usize {
        self.events.len()
    }

    /// Text of the most recent frame, one line per row, right-trimmed.
    pub fn screen(&self) -> String {
        self.screens.last().cloned().unwrap_or_default()
    }

    /// Every frame drawn so far.
    pub fn screens(&self) -> &[String] {
        &self.screens
    }
}

impl Driver for ScriptedDriver {
    fn interactive(&self) -> bool {
        self.interactive
    }

    fn begin(&mut self, _mode: Mode, _height: u16) -> Result<()> {
        if !self.interactive {
            anyhow::bail!("interactive input requires a terminal (TTY); pass the values as flags");
        }
        if self.terminal.is_none() {
            let (w, h) = self.size;
            self.terminal = Some(Terminal::new(TestBackend::new(w, h)).context("create test terminal")?);
        }
        Ok(())
    }

    fn draw(&mut self, widget: &dyn Widget) -> Result<()> {
        let Some(terminal) = self.terminal.as_mut() else {
            anyhow::bail!("terminal not started");
        };
        let frame = terminal.draw(|f| widget.draw(f)).context("draw")?;
        let buf = frame.buffer;
        let mut lines = Vec::with_capacity(buf.area.height as usize);
        for y in buf.area.top()..buf.area.bottom() {
            let mut line = String::new();
            for x in buf.area.left()..buf.area.right() {
                line.push_str(buf[(x, y)].symbol());
            }
            lines.push(line.trim_end().to_string());
        }
        self.screens.push(lines.join("\n"));
        Ok(())
    }

    fn next_event(&mut self) -> Result<UiEvent> {
        self.events
            .pop_front()
            .context("scripted input exhausted while a widget was waiting")
    }

    fn end(&mut self) -> Result<()> {
        Ok(())
    }
}

//! Interactive terminal widgets and the loop that drives them.
//!
//! Every widget implements [`Widget`] and is run by [`run`] against a
//! [`Driver`]: the real terminal in production, a scripted backend in tests.

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

mod boxed;
pub use self::boxed::{Tone, render_box, write_box};

mod checkbox;
pub use self::checkbox::{CheckboxGroup, CheckboxItem};

mod dialog;
pub use self::dialog::Dialog;

mod driver;
pub use self::driver::{Driver, ScriptedDriver, TerminalDriver, restore_terminal};

mod filter_list;
pub use self::filter_list::FilterList;

mod form;
pub use self::form::{Form, Validator};

mod input;

mod prompt;
pub use self::prompt::{FieldKind, Prompt};

mod selector;
pub use self::selector::{Choice, Selector};

mod table;
pub use self::table::{Cell, Table, Width};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UiEvent {
    Key(KeyEvent),
    Resize(u16, u16),
    /// Emitted by drivers while idle; drives the cursor blink.
    Tick,
}

impl UiEvent {
    pub fn key(code: KeyCode) -> Self {
        UiEvent::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    pub fn ctrl(c: char) -> Self {
        UiEvent::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Status {
    Pending,
    Submitted,
    Cancelled,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Mode {
    #[default]
    Fullscreen,
    Inline,
}

pub trait Widget {
    fn init(&mut self) {}
    fn update(&mut self, event: &UiEvent);
    fn draw(&self, frame: &mut ratatui::Frame);
    fn status(&self) -> Status;
    /// Rows needed when drawn in an inline viewport.
    fn height(&self) -> u16;
}

/// The user backed out of an interactive step.
#[derive(Debug, thiserror::Error)]
#[error("cancelled by user")]
pub struct Cancelled;

pub fn is_cancelled(err: &anyhow::Error) -> bool {
    err.chain().any(|e| e.is::<Cancelled>())
}

/// Drives `widget` until it leaves `Pending`. A cancelled widget becomes
/// the [`Cancelled`] error.
pub fn run(driver: &mut dyn Driver, widget: &mut dyn Widget, mode: Mode) -> Result<()> {
    driver.begin(mode, widget.height())?;
    widget.init();
    let res = event_loop(driver, widget);
    let end = driver.end();
    res?;
    end?;

    match widget.status() {
        Status::Submitted => Ok(()),
        Status::Cancelled => Err(Cancelled.into()),
        Status::Pending => anyhow::bail!("widget stopped before completing"),
    }
}

fn event_loop(driver: &mut dyn Driver, widget: &mut dyn Widget) -> Result<()> {
    loop {
        driver.draw(widget)?;
        if widget.status() != Status::Pending {
            return Ok(());
        }
        let event = driver.next_event()?;
        widget.update(&event);
    }
}

pub(crate) fn is_cancel_key(key: &KeyEvent) -> bool {
    match key.code {
        KeyCode::Esc => true,
        KeyCode::Char('c') => key.modifiers.contains(KeyModifiers::CONTROL),
        _ => false,
    }
}

/// Marker shown at the cursor position while the blink phase is on.
pub(crate) const CURSOR: &str = "█";

#[cfg(test)]
#[path = "tests/tui/widget_tests.rs"]
mod tests;

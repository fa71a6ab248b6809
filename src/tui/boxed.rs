use std::io::{self, Write};

use crossterm::style::{Color, Stylize};
use unicode_width::UnicodeWidthStr;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tone {
    Info,
    Success,
    Warn,
    Error,
}

impl Tone {
    pub fn header(self) -> &'static str {
        match self {
            Tone::Info => "🔵 INFO",
            Tone::Success => "🟢 SUCCESS",
            Tone::Warn => "🟡 WARNING",
            Tone::Error => "🔴 ERROR",
        }
    }

    fn accent(self) -> Color {
        match self {
            Tone::Info => Color::Blue,
            Tone::Success => Color::Green,
            Tone::Warn => Color::Yellow,
            Tone::Error => Color::Red,
        }
    }
}

/// Renders a message inside a rounded box headed by the tone's icon.
pub fn render_box(tone: Tone, message: &str, color: bool) -> String {
    let header = tone.header();
    let lines: Vec<&str> = message.trim_end().lines().collect();
    let inner = lines
        .iter()
        .map(|l| l.width())
        .chain(std::iter::once(header.width()))
        .max()
        .unwrap_or(0)
        + 2;

    let paint = |s: String| -> String {
        if color {
            s.with(tone.accent()).to_string()
        } else {
            s
        }
    };
    let row = |text: &str, emphasise: bool| -> String {
        let pad = inner.saturating_sub(text.width() + 1);
        let body = if emphasise && color {
            text.bold().to_string()
        } else {
            text.to_string()
        };
        format!("{} {}{}{}", paint("│".into()), body, " ".repeat(pad), paint("│".into()))
    };

    let mut out = String::new();
    out.push_str(&paint(format!("╭{}╮", "─".repeat(inner))));
    out.push('\n');
    out.push_str(&row(header, true));
    out.push('\n');
    for line in &lines {
        out.push_str(&row(line, false));
        out.push('\n');
    }
    out.push_str(&paint(format!("╰{}╯", "─".repeat(inner))));
    out.push('\n');
    out
}

pub fn write_box(out: &mut dyn Write, tone: Tone, message: &str, color: bool) -> io::Result<()> {
    out.write_all(render_box(tone, message, color).as_bytes())
}

//! Text and JSON output for command results.

use std::io::Write;
use std::str::FromStr;

use anyhow::{Context, Result};
use serde::Serialize;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{OffsetDateTime, PrimitiveDateTime, UtcOffset};

mod actions;
pub use self::actions::{Actions, UnknownAction, VERBS};

mod audit;
pub use self::audit::describe as describe_audit_log;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            other => anyhow::bail!("unsupported output format '{}' (expected text or json)", other),
        }
    }
}

/// Writes `value` as two-space indented JSON followed by a newline.
pub fn emit_json<T: Serialize + ?Sized>(out: &mut dyn Write, value: &T) -> Result<()> {
    let mut s = serde_json::to_string_pretty(value).context("serialize output")?;
    s.push('\n');
    out.write_all(s.as_bytes()).context("write output")?;
    Ok(())
}

/// Labelled `key: value` lines with the values aligned.
pub fn emit_fields(out: &mut dyn Write, fields: &[(&str, String)]) -> Result<()> {
    let width = fields.iter().map(|(k, _)| k.len()).max().unwrap_or(0);
    for (key, value) in fields {
        let label = format!("{}:", key);
        writeln!(out, "{:<w$} {}", label, value, w = width + 1).context("write output")?;
    }
    Ok(())
}

/// How timestamps are shown in text output.
#[derive(Clone, Copy, Debug)]
pub struct Clock {
    pub offset: UtcOffset,
    pub utc: bool,
}

impl Clock {
    pub fn new(offset: UtcOffset, utc: bool) -> Self {
        Self { offset, utc }
    }

    pub fn utc() -> Self {
        Self::new(UtcOffset::UTC, true)
    }

    /// Column heading suffix, e.g. `timestamp (utc)`.
    pub fn label(&self, base: &str) -> String {
        if self.utc {
            format!("{} (utc)", base)
        } else {
            base.to_string()
        }
    }

    /// Formats an RFC 3339 timestamp; anything unparseable passes through.
    pub fn format(&self, raw: &str) -> String {
        match OffsetDateTime::parse(raw, &Rfc3339) {
            Ok(dt) => self.format_datetime(dt),
            Err(_) => raw.to_string(),
        }
    }

    pub fn format_opt(&self, raw: Option<&str>) -> String {
        match raw {
            Some(raw) if !raw.is_empty() => self.format(raw),
            _ => "-".to_string(),
        }
    }

    pub fn format_datetime(&self, dt: OffsetDateTime) -> String {
        // Jan 2 2006 03:04:05 PM
        let layout = format_description!(
            "[month repr:short] [day padding:none] [year] [hour repr:12]:[minute]:[second] [period]"
        );
        let offset = if self.utc { UtcOffset::UTC } else { self.offset };
        dt.to_offset(offset)
            .format(layout)
            .unwrap_or_else(|_| dt.to_string())
    }

    /// Parses `2024-01-01T00:00:00`, with or without an offset. Offset-less
    /// input is read in this clock's zone.
    pub fn parse(&self, raw: &str) -> Result<OffsetDateTime> {
        if let Ok(dt) = OffsetDateTime::parse(raw, &Rfc3339) {
            return Ok(dt);
        }
        let local = format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]");
        let date_only = format_description!("[year]-[month]-[day]");
        let naive = PrimitiveDateTime::parse(raw, local)
            .or_else(|_| {
                time::Date::parse(raw, date_only).map(|d| d.with_time(time::Time::MIDNIGHT))
            })
            .with_context(|| {
                format!("invalid timestamp '{}' (expected YYYY-MM-DDTHH:MM:SS)", raw)
            })?;
        let offset = if self.utc { UtcOffset::UTC } else { self.offset };
        Ok(naive.assume_offset(offset))
    }
}

pub fn to_rfc3339(dt: OffsetDateTime) -> Result<String> {
    dt.to_offset(UtcOffset::UTC)
        .format(&Rfc3339)
        .context("format timestamp")
}

#[cfg(test)]
#[path = "tests/render_tests.rs"]
mod tests;

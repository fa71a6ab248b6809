use std::time::Duration;

use super::{ConfigError, Source};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FlagKind {
    Bool,
    Duration,
    Float,
    Integer,
    String,
    StringList,
}

impl std::fmt::Display for FlagKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            FlagKind::Bool => "bool",
            FlagKind::Duration => "duration",
            FlagKind::Float => "float",
            FlagKind::Integer => "integer",
            FlagKind::String => "string",
            FlagKind::StringList => "string-list",
        };
        f.write_str(s)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum FlagValue {
    Bool(bool),
    Duration(Duration),
    Float(f64),
    Integer(i64),
    String(String),
    StringList(Vec<String>),
}

impl FlagValue {
    pub fn kind(&self) -> FlagKind {
        match self {
            FlagValue::Bool(_) => FlagKind::Bool,
            FlagValue::Duration(_) => FlagKind::Duration,
            FlagValue::Float(_) => FlagKind::Float,
            FlagValue::Integer(_) => FlagKind::Integer,
            FlagValue::String(_) => FlagKind::String,
            FlagValue::StringList(_) => FlagKind::StringList,
        }
    }

    /// Repeated occurrences only matter for lists; other kinds take the last.
    pub(super) fn from_cli(name: &str, kind: FlagKind, raw: &[String]) -> Result<Self, ConfigError> {
        if kind == FlagKind::StringList {
            return Ok(FlagValue::StringList(
                raw.iter().flat_map(|r| split_list(r)).collect(),
            ));
        }
        let last = raw.last().map(String::as_str).unwrap_or_default();
        Self::from_text(name, kind, last, Source::CommandLine)
    }

    pub(super) fn from_text(
        name: &str,
        kind: FlagKind,
        raw: &str,
        origin: Source,
    ) -> Result<Self, ConfigError> {
        let fail = || ConfigError::Coerce {
            name: name.to_string(),
            value: raw.to_string(),
            origin,
            kind,
        };
        let trimmed = raw.trim();
        let v = match kind {
            FlagKind::Bool => FlagValue::Bool(parse_bool(trimmed).ok_or_else(fail)?),
            FlagKind::Duration => FlagValue::Duration(parse_duration(trimmed).ok_or_else(fail)?),
            FlagKind::Float => FlagValue::Float(trimmed.parse().map_err(|_| fail())?),
            FlagKind::Integer => FlagValue::Integer(trimmed.parse().map_err(|_| fail())?),
            FlagKind::String => FlagValue::String(raw.to_string()),
            FlagKind::StringList => FlagValue::StringList(split_list(raw)),
        };
        Ok(v)
    }

    pub(super) fn from_yaml(
        name: &str,
        kind: FlagKind,
        raw: &serde_yaml::Value,
    ) -> Result<Self, ConfigError> {
        use serde_yaml::Value;

        let fail = |shown: String| ConfigError::Coerce {
            name: name.to_string(),
            value: shown,
            origin: Source::ConfigFile,
            kind,
        };
        match (kind, raw) {
            (FlagKind::Bool, Value::Bool(b)) => Ok(FlagValue::Bool(*b)),
            (FlagKind::Integer, Value::Number(n)) => n
                .as_i64()
                .map(FlagValue::Integer)
                .ok_or_else(|| fail(n.to_string())),
            (FlagKind::Float, Value::Number(n)) => n
                .as_f64()
                .map(FlagValue::Float)
                .ok_or_else(|| fail(n.to_string())),
            (FlagKind::Duration, Value::Number(n)) => n
                .as_u64()
                .map(|secs| FlagValue::Duration(Duration::from_secs(secs)))
                .ok_or_else(|| fail(n.to_string())),
            (FlagKind::StringList, Value::Sequence(items)) => items
                .iter()
                .map(|item| match item {
                    Value::String(s) => Ok(s.clone()),
                    Value::Number(n) => Ok(n.to_string()),
                    Value::Bool(b) => Ok(b.to_string()),
                    other => Err(fail(format!("{other:?}"))),
                })
                .collect::<Result<Vec<_>, _>>()
                .map(FlagValue::StringList),
            (FlagKind::String, Value::Number(n)) => Ok(FlagValue::String(n.to_string())),
            (FlagKind::String, Value::Bool(b)) => Ok(FlagValue::String(b.to_string())),
            (_, Value::String(s)) => Self::from_text(name, kind, s, Source::ConfigFile),
            (_, other) => Err(fail(format!("{other:?}"))),
        }
    }

    /// Text form used by `utils print` and in help output.
    pub fn display(&self) -> String {
        match self {
            FlagValue::Bool(b) => b.to_string(),
            FlagValue::Duration(d) => format_duration(*d),
            FlagValue::Float(f) => f.to_string(),
            FlagValue::Integer(i) => i.to_string(),
            FlagValue::String(s) => s.clone(),
            FlagValue::StringList(v) => v.join(","),
        }
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "y" | "on" => Some(true),
        "false" | "0" | "no" | "n" | "off" => Some(false),
        _ => None,
    }
}

/// Parses `250ms`, `30s`, `5m`, `1h30m` or a bare number of seconds.
pub fn parse_duration(raw: &str) -> Option<Duration> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(secs) = raw.parse::<u64>() {
        return Some(Duration::from_secs(secs));
    }

    let mut total = Duration::ZERO;
    let mut rest = raw;
    while !rest.is_empty() {
        let digits = rest
            .find(|c: char| !c.is_ascii_digit() && c != '.')
            .unwrap_or(rest.len());
        if digits == 0 {
            return None;
        }
        let amount: f64 = rest.get(..digits)?.parse().ok()?;
        rest = rest.get(digits..)?;
        let unit_len = rest
            .find(|c: char| c.is_ascii_digit())
            .unwrap_or(rest.len());
        let unit = rest.get(..unit_len)?;
        rest = rest.get(unit_len..)?;
        let secs = match unit {
            "ms" => amount / 1000.0,
            "s" => amount,
            "m" => amount * 60.0,
            "h" => amount * 3600.0,
            _ => return None,
        };
        total = total.checked_add(Duration::try_from_secs_f64(secs).ok()?)?;
    }
    Some(total)
}

fn format_duration(d: Duration) -> String {
    let ms = d.as_millis();
    if ms % 1000 != 0 {
        return format!("{ms}ms");
    }
    let secs = d.as_secs();
    if secs != 0 && secs % 3600 == 0 {
        format!("{}h", secs / 3600)
    } else if secs != 0 && secs % 60 == 0 {
        format!("{}m", secs / 60)
    } else {
        format!("{secs}s")
    }
}

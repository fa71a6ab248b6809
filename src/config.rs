//! Flag definitions and the effective configuration they resolve to.
//!
//! A command declares a [`FlagSet`]. After the command line is parsed the set
//! is bound into an [`Effective`] view, taking each value from the first
//! source that supplies it: command line, environment, config file, default.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};

mod value;
pub use self::value::{FlagKind, FlagValue, parse_bool, parse_duration};

/// Errors raised while defining flags or resolving their values.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("flag --{0} is defined more than once")]
    DuplicateFlag(String),

    #[error("short flag -{short} is used by both --{first} and --{second}")]
    DuplicateShort {
        short: char,
        first: String,
        second: String,
    },

    #[error("flag --{0} is not defined on this command")]
    Undefined(String),

    #[error("flag --{name} is a {actual} flag, not a {requested} flag")]
    WrongKind {
        name: String,
        actual: FlagKind,
        requested: FlagKind,
    },

    #[error("invalid value {value:?} for --{name} from {origin}: expected {kind}")]
    Coerce {
        name: String,
        value: String,
        origin: Source,
        kind: FlagKind,
    },
}

/// Where an effective value came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Source {
    CommandLine,
    Environment,
    ConfigFile,
    Default,
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Source::CommandLine => "command line",
            Source::Environment => "environment",
            Source::ConfigFile => "config file",
            Source::Default => "default",
        };
        f.write_str(s)
    }
}

/// A single flag declaration.
#[derive(Clone, Debug)]
pub struct FlagSpec {
    pub name: &'static str,
    pub short: Option<char>,
    pub default: FlagValue,
    pub usage: &'static str,
}

impl FlagSpec {
    pub fn kind(&self) -> FlagKind {
        self.default.kind()
    }

    /// `controller-url` -> `CONTROLLER_URL`
    pub fn env_key(&self) -> String {
        env_key(self.name)
    }
}

pub fn env_key(name: &str) -> String {
    name.to_ascii_uppercase().replace('-', "_")
}

/// The flags installed on one command.
///
/// Definition problems are collected rather than panicking so the whole
/// command tree can be validated once at startup.
#[derive(Clone, Debug, Default)]
pub struct FlagSet {
    specs: Vec<FlagSpec>,
    problems: Vec<String>,
}

impl FlagSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn define(&mut self, spec: FlagSpec) -> Result<(), ConfigError> {
        if self.specs.iter().any(|s| s.name == spec.name) {
            return Err(ConfigError::DuplicateFlag(spec.name.to_string()));
        }
        if let Some(short) = spec.short
            && let Some(other) = self.specs.iter().find(|s| s.short == Some(short))
        {
            return Err(ConfigError::DuplicateShort {
                short,
                first: other.name.to_string(),
                second: spec.name.to_string(),
            });
        }
        self.specs.push(spec);
        Ok(())
    }

    fn push(mut self, spec: FlagSpec) -> Self {
        if let Err(err) = self.define(spec) {
            self.problems.push(err.to_string());
        }
        self
    }

    pub fn bool(self, name: &'static str, short: Option<char>, default: bool, usage: &'static str) -> Self {
        self.push(FlagSpec {
            name,
            short,
            default: FlagValue::Bool(default),
            usage,
        })
    }

    pub fn duration(
        self,
        name: &'static str,
        short: Option<char>,
        default: Duration,
        usage: &'static str,
    ) -> Self {
        self.push(FlagSpec {
            name,
            short,
            default: FlagValue::Duration(default),
            usage,
        })
    }

    pub fn float(self, name: &'static str, short: Option<char>, default: f64, usage: &'static str) -> Self {
        self.push(FlagSpec {
            name,
            short,
            default: FlagValue::Float(default),
            usage,
        })
    }

    pub fn integer(self, name: &'static str, short: Option<char>, default: i64, usage: &'static str) -> Self {
        self.push(FlagSpec {
            name,
            short,
            default: FlagValue::Integer(default),
            usage,
        })
    }

    pub fn string(self, name: &'static str, short: Option<char>, default: &str, usage: &'static str) -> Self {
        self.push(FlagSpec {
            name,
            short,
            default: FlagValue::String(default.to_string()),
            usage,
        })
    }

    pub fn string_list(
        self,
        name: &'static str,
        short: Option<char>,
        default: &[&str],
        usage: &'static str,
    ) -> Self {
        self.push(FlagSpec {
            name,
            short,
            default: FlagValue::StringList(default.iter().map(|s| s.to_string()).collect()),
            usage,
        })
    }

    /// Appends every flag of `other`, recording clashes as problems.
    pub fn merge(mut self, other: FlagSet) -> Self {
        self.problems.extend(other.problems);
        for spec in other.specs {
            self = self.push(spec);
        }
        self
    }

    pub fn specs(&self) -> &[FlagSpec] {
        &self.specs
    }

    pub fn problems(&self) -> &[String] {
        &self.problems
    }

    pub fn get(&self, name: &str) -> Option<&FlagSpec> {
        self.specs.iter().find(|s| s.name == name)
    }
}

/// Snapshot of the process environment.
#[derive(Clone, Debug, Default)]
pub struct Env(BTreeMap<String, String>);

impl Env {
    pub fn from_process() -> Self {
        Self(std::env::vars().collect())
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self(pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }
}

/// Values from `~/.opsicle/config.yaml`, keyed by canonical flag name.
#[derive(Clone, Debug, Default)]
pub struct ConfigFile {
    path: Option<PathBuf>,
    values: BTreeMap<String, serde_yaml::Value>,
}

impl ConfigFile {
    pub fn empty() -> Self {
        Self::default()
    }

    /// A missing file yields an empty config; a malformed one is an error.
    pub fn load(path: &Path) -> Result<Self> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Self::default());
            }
            Err(err) => {
                return Err(err).with_context(|| format!("read config file {}", path.display()));
            }
        };
        let mut cfg = Self::parse(&text)
            .with_context(|| format!("parse config file {}", path.display()))?;
        cfg.path = Some(path.to_path_buf());
        Ok(cfg)
    }

    pub fn parse(text: &str) -> Result<Self> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        let values: BTreeMap<String, serde_yaml::Value> =
            serde_yaml::from_str(text).context("expected a mapping of flag names to values")?;
        Ok(Self { path: None, values })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn get(&self, name: &str) -> Option<&serde_yaml::Value> {
        self.values.get(name)
    }
}

/// Raw command-line occurrences per flag name, as the parser saw them.
pub type CliValues = BTreeMap<String, Vec<String>>;

#[derive(Clone, Debug)]
struct Resolved {
    value: FlagValue,
    source: Source,
}

/// The frozen name -> value mapping for one command invocation.
#[derive(Clone, Debug, Default)]
pub struct Effective {
    values: BTreeMap<&'static str, Resolved>,
}

impl Effective {
    pub fn bind(
        flags: &FlagSet,
        cli: &CliValues,
        env: &Env,
        file: &ConfigFile,
    ) -> Result<Self, ConfigError> {
        let mut values = BTreeMap::new();
        for spec in flags.specs() {
            let kind = spec.kind();
            let resolved = if let Some(raw) = cli.get(spec.name).filter(|v| !v.is_empty()) {
                Resolved {
                    value: FlagValue::from_cli(spec.name, kind, raw)?,
                    source: Source::CommandLine,
                }
            } else if let Some(raw) = env.get(&spec.env_key()) {
                Resolved {
                    value: FlagValue::from_text(spec.name, kind, raw, Source::Environment)?,
                    source: Source::Environment,
                }
            } else if let Some(raw) = file.get(spec.name) {
                Resolved {
                    value: FlagValue::from_yaml(spec.name, kind, raw)?,
                    source: Source::ConfigFile,
                }
            } else {
                Resolved {
                    value: spec.default.clone(),
                    source: Source::Default,
                }
            };
            values.insert(spec.name, resolved);
        }
        Ok(Self { values })
    }

    fn lookup(&self, name: &str, requested: FlagKind) -> Result<&FlagValue, ConfigError> {
        let resolved = self
            .values
            .get(name)
            .ok_or_else(|| ConfigError::Undefined(name.to_string()))?;
        if resolved.value.kind() != requested {
            return Err(ConfigError::WrongKind {
                name: name.to_string(),
                actual: resolved.value.kind(),
                requested,
            });
        }
        Ok(&resolved.value)
    }

    pub fn string(&self, name: &str) -> Result<&str, ConfigError> {
        match self.lookup(name, FlagKind::String)? {
            FlagValue::String(s) => Ok(s),
            _ => Err(ConfigError::Undefined(name.to_string())),
        }
    }

    pub fn boolean(&self, name: &str) -> Result<bool, ConfigError> {
        match self.lookup(name, FlagKind::Bool)? {
            FlagValue::Bool(b) => Ok(*b),
            _ => Err(ConfigError::Undefined(name.to_string())),
        }
    }

    pub fn integer(&self, name: &str) -> Result<i64, ConfigError> {
        match self.lookup(name, FlagKind::Integer)? {
            FlagValue::Integer(i) => Ok(*i),
            _ => Err(ConfigError::Undefined(name.to_string())),
        }
    }

    pub fn float(&self, name: &str) -> Result<f64, ConfigError> {
        match self.lookup(name, FlagKind::Float)? {
            FlagValue::Float(f) => Ok(*f),
            _ => Err(ConfigError::Undefined(name.to_string())),
        }
    }

    pub fn duration(&self, name: &str) -> Result<Duration, ConfigError> {
        match self.lookup(name, FlagKind::Duration)? {
            FlagValue::Duration(d) => Ok(*d),
            _ => Err(ConfigError::Undefined(name.to_string())),
        }
    }

    pub fn list(&self, name: &str) -> Result<&[String], ConfigError> {
        match self.lookup(name, FlagKind::StringList)? {
            FlagValue::StringList(v) => Ok(v),
            _ => Err(ConfigError::Undefined(name.to_string())),
        }
    }

    pub fn source(&self, name: &str) -> Option<Source> {
        self.values.get(name).map(|r| r.source)
    }

    /// Overrides a value after binding, as if it came from the command line.
    pub fn set(&mut self, name: &'static str, value: FlagValue) {
        self.values.insert(
            name,
            Resolved {
                value,
                source: Source::CommandLine,
            },
        );
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &FlagValue, Source)> + '_ {
        self.values.iter().map(|(k, r)| (*k, &r.value, r.source))
    }
}

#[cfg(test)]
#[path = "tests/config/resolver_tests.rs"]
mod tests;

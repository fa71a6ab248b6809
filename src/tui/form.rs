use std::sync::LazyLock;

use regex::Regex;

use super::prompt::{FieldKind, Prompt, Step};
use super::{Status, UiEvent, Widget};

static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+$").expect("valid email pattern"));

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Validator {
    Required,
    Integer,
    Float,
    Boolean,
    Email,
    /// Any single line of printable text.
    String,
}

impl Validator {
    /// Empty input only fails `Required`; the other checks apply to what
    /// was typed.
    pub fn check(self, value: &str) -> Result<(), String> {
        let v = value.trim();
        if v.is_empty() {
            return match self {
                Validator::Required => Err("this field is required".to_string()),
                _ => Ok(()),
            };
        }
        let ok = match self {
            Validator::Required => true,
            Validator::Integer => v.parse::<i64>().is_ok(),
            Validator::Float => v.parse::<f64>().map(f64::is_finite).unwrap_or(false),
            Validator::Boolean => crate::config::parse_bool(v).is_some(),
            Validator::Email => EMAIL.is_match(v),
            Validator::String => !value.chars().any(char::is_control),
        };
        if ok {
            return Ok(());
        }
        Err(match self {
            Validator::Integer => "must be a whole number",
            Validator::Float => "must be a number",
            Validator::Boolean => "must be true or false",
            Validator::Email => "must be an email address",
            Validator::String | Validator::Required => "must be plain text",
        }
        .to_string())
    }
}

/// A [`Prompt`] whose fields are validated on submit. Failing fields get an
/// inline error and focus moves to the first of them.
#[derive(Debug)]
pub struct Form {
    prompt: Prompt,
    validators: Vec<Vec<Validator>>,
}

impl Form {
    pub fn new(title: &str) -> Self {
        Self {
            prompt: Prompt::new(title),
            validators: Vec::new(),
        }
    }

    pub fn field(self, id: &str, label: &str, kind: FieldKind, validators: &[Validator]) -> Self {
        self.field_with_value(id, label, kind, "", validators)
    }

    pub fn field_with_value(
        mut self,
        id: &str,
        label: &str,
        kind: FieldKind,
        value: &str,
        validators: &[Validator],
    ) -> Self {
        self.prompt = self.prompt.field_with_value(id, label, kind, value);
        self.validators.push(validators.to_vec());
        self
    }

    pub fn value(&self, id: &str) -> Option<&str> {
        self.prompt.value(id)
    }

    pub fn values(&self) -> std::collections::BTreeMap<String, String> {
        self.prompt.values()
    }

    pub fn focus(&self) -> usize {
        self.prompt.focus()
    }

    pub fn error(&self, id: &str) -> Option<&str> {
        self.prompt
            .fields
            .iter()
            .find(|f| f.id == id)
            .and_then(|f| f.error.as_deref())
    }

    fn validate(&mut self) -> Option<usize> {
        let mut first_invalid = None;
        for (i, (field, checks)) in self
            .prompt
            .fields
            .iter_mut()
            .zip(&self.validators)
            .enumerate()
        {
            field.error = checks
                .iter()
                .find_map(|v| v.check(field.input.value()).err());
            if field.error.is_some() && first_invalid.is_none() {
                first_invalid = Some(i);
            }
        }
        first_invalid
    }
}

impl Widget for Form {
    fn update(&mut self, event: &UiEvent) {
        if let Step::SubmitRequested = self.prompt.step(event) {
            match self.validate() {
                Some(i) => {
                    tracing::debug!(field = %self.prompt.fields[i].id, "form validation failed");
                    self.prompt.set_focus(i);
                }
                None => self.prompt.set_status(Status::Submitted),
            }
        }
    }

    fn draw(&self, frame: &mut ratatui::Frame) {
        self.prompt.draw(frame);
    }

    fn status(&self) -> Status {
        self.prompt.status()
    }

    fn height(&self) -> u16 {
        self.prompt.height()
    }
}

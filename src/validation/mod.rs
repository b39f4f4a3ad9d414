//! Declarative request validation.
//!
//! A rule set is an ordered slice of [`Rule`]s. Every rule runs, and every
//! failure is collected, so a client sees all field problems in one response.
//! Successful rules yield normalized values (trimmed strings, lowercased
//! emails, parsed numbers, dates and ids) that the typed builders in
//! [`rules`] turn into persistence inputs.

pub mod rules;

use std::collections::HashMap;
use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value};
use uuid::Uuid;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles")
});

/// Which part of the request a field is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Location {
    Body,
    Params,
    Query,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
    pub location: Location,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Check {
    /// Non-empty string after trimming.
    Text,
    /// Any string, trimmed. Empty is allowed.
    AnyText,
    /// String of at least this many characters, not trimmed.
    Secret { min_len: usize },
    /// Email address, trimmed and lowercased.
    Email,
    /// JSON number or numeric string, optionally bounded below.
    Number { min: Option<f64> },
    /// ISO-8601 date or date-time. Values without an offset are taken as UTC.
    Date,
    /// Record id.
    Id,
}

#[derive(Debug, Clone, Copy)]
pub struct FieldRule {
    pub field: &'static str,
    pub location: Location,
    pub check: Check,
    pub required: bool,
    pub lowercase: bool,
    /// Treat a whitespace-only string as if the field were missing.
    pub blank_is_absent: bool,
    pub message: &'static str,
}

impl FieldRule {
    pub const fn required(field: &'static str, check: Check, message: &'static str) -> Self {
        Self {
            field,
            location: Location::Body,
            check,
            required: true,
            lowercase: false,
            blank_is_absent: false,
            message,
        }
    }

    pub const fn optional(field: &'static str, check: Check, message: &'static str) -> Self {
        Self {
            required: false,
            ..Self::required(field, check, message)
        }
    }

    pub const fn in_params(self) -> Self {
        Self {
            location: Location::Params,
            ..self
        }
    }

    pub const fn in_query(self) -> Self {
        Self {
            location: Location::Query,
            ..self
        }
    }

    pub const fn lowercased(self) -> Self {
        Self {
            lowercase: true,
            ..self
        }
    }

    pub const fn blank_as_absent(self) -> Self {
        Self {
            blank_is_absent: true,
            ..self
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub enum Rule {
    Field(FieldRule),
    /// At least one of `fields` must be present in the body.
    AnyOf {
        label: &'static str,
        fields: &'static [&'static str],
        message: &'static str,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Normalized {
    Text(String),
    Number(f64),
    Date(DateTime<Utc>),
    Id(Uuid),
}

/// The three request sources a rule can read from.
#[derive(Debug, Default)]
pub struct Input<'a> {
    pub body: Option<&'a Map<String, Value>>,
    pub params: Option<&'a HashMap<String, String>>,
    pub query: Option<&'a HashMap<String, String>>,
}

impl<'a> Input<'a> {
    pub fn body(body: &'a Map<String, Value>) -> Self {
        Self {
            body: Some(body),
            ..Default::default()
        }
    }

    /// Missing keys and JSON nulls both count as absent.
    fn get(&self, location: Location, field: &str) -> Option<Value> {
        match location {
            Location::Body => self
                .body
                .and_then(|b| b.get(field))
                .filter(|v| !v.is_null())
                .cloned(),
            Location::Params => self
                .params
                .and_then(|p| p.get(field))
                .map(|s| Value::String(s.clone())),
            Location::Query => self
                .query
                .and_then(|q| q.get(field))
                .map(|s| Value::String(s.clone())),
        }
    }
}

/// Values produced by a passing rule set, keyed by field name.
#[derive(Debug, Default)]
pub struct Validated {
    values: HashMap<&'static str, Normalized>,
}

impl Validated {
    pub fn text(&mut self, field: &str) -> Option<String> {
        match self.values.remove(field) {
            Some(Normalized::Text(s)) => Some(s),
            _ => None,
        }
    }

    pub fn number(&mut self, field: &str) -> Option<f64> {
        match self.values.remove(field) {
            Some(Normalized::Number(n)) => Some(n),
            _ => None,
        }
    }

    pub fn date(&mut self, field: &str) -> Option<DateTime<Utc>> {
        match self.values.remove(field) {
            Some(Normalized::Date(d)) => Some(d),
            _ => None,
        }
    }

    pub fn id(&mut self, field: &str) -> Option<Uuid> {
        match self.values.remove(field) {
            Some(Normalized::Id(id)) => Some(id),
            _ => None,
        }
    }
}

/// Run every rule in order and collect all failures.
pub fn validate(rules: &[Rule], input: &Input<'_>) -> Result<Validated, Vec<FieldError>> {
    let mut validated = Validated::default();
    let mut errors = Vec::new();

    for rule in rules {
        match rule {
            Rule::Field(rule) => match input
                .get(rule.location, rule.field)
                .filter(|v| !(rule.blank_is_absent && is_blank(v)))
            {
                None if rule.required => errors.push(field_error(rule)),
                None => {}
                Some(raw) => match apply(rule, &raw) {
                    Some(value) => {
                        validated.values.insert(rule.field, value);
                    }
                    None => errors.push(field_error(rule)),
                },
            },
            Rule::AnyOf {
                label,
                fields,
                message,
            } => {
                let present = fields.iter().any(|f| {
                    input
                        .get(Location::Body, f)
                        .is_some_and(|v| !is_blank(&v))
                });
                if !present {
                    errors.push(FieldError {
                        field: (*label).to_string(),
                        message: (*message).to_string(),
                        location: Location::Body,
                    });
                }
            }
        }
    }

    if errors.is_empty() {
        Ok(validated)
    } else {
        Err(errors)
    }
}

fn is_blank(value: &Value) -> bool {
    value.as_str().is_some_and(|s| s.trim().is_empty())
}

fn field_error(rule: &FieldRule) -> FieldError {
    FieldError {
        field: rule.field.to_string(),
        message: rule.message.to_string(),
        location: rule.location,
    }
}

fn apply(rule: &FieldRule, raw: &Value) -> Option<Normalized> {
    let value = match rule.check {
        Check::Text => {
            let s = raw.as_str()?.trim();
            (!s.is_empty()).then(|| Normalized::Text(s.to_string()))?
        }
        Check::AnyText => Normalized::Text(raw.as_str()?.trim().to_string()),
        Check::Secret { min_len } => {
            let s = raw.as_str()?;
            (s.chars().count() >= min_len.max(1)).then(|| Normalized::Text(s.to_string()))?
        }
        Check::Email => {
            let s = raw.as_str()?.trim().to_lowercase();
            EMAIL_RE.is_match(&s).then_some(Normalized::Text(s))?
        }
        Check::Number { min } => {
            let n = match raw {
                Value::Number(n) => n.as_f64()?,
                Value::String(s) => s.trim().parse::<f64>().ok()?,
                _ => return None,
            };
            if !n.is_finite() || min.is_some_and(|min| n < min) {
                return None;
            }
            Normalized::Number(n)
        }
        Check::Date => Normalized::Date(parse_date(raw.as_str()?.trim())?),
        Check::Id => Normalized::Id(Uuid::parse_str(raw.as_str()?.trim()).ok()?),
    };

    Some(match value {
        Normalized::Text(s) if rule.lowercase => Normalized::Text(s.to_lowercase()),
        other => other,
    })
}

fn parse_date(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

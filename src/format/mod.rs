//! Output formatting for API responses (plain text or JSON).

use crate::dojo::CreationOutcome;
use serde::Serialize;
use serde_json::{json, Value};

/// Output format for results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl OutputFormat {
    /// Picks JSON when the `--json` flag is set.
    pub fn from_json_flag(json: bool) -> Self {
        if json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

/// Formats command results.
pub struct Formatter {
    format: OutputFormat,
}

impl Formatter {
    /// Creates a new formatter.
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Formats a parsed response body.
    pub fn format_response(&self, response: &Value) -> String {
        match self.format {
            OutputFormat::Json => pretty_json(response),
            OutputFormat::Text => text_record(response),
        }
    }

    /// Formats the result of create-if-not-exists for the product `name`.
    pub fn format_outcome(&self, name: &str, outcome: &CreationOutcome) -> String {
        match self.format {
            OutputFormat::Json => pretty_json(&outcome_json(name, outcome)),
            OutputFormat::Text => match outcome {
                CreationOutcome::AlreadyExists { .. } => exists_message(name),
                CreationOutcome::Created(record) => {
                    format!("Product created:\n{}", text_record(record))
                }
            },
        }
    }
}

fn exists_message(name: &str) -> String {
    format!("Product '{}' exists", name)
}

fn outcome_json(name: &str, outcome: &CreationOutcome) -> Value {
    match outcome {
        CreationOutcome::AlreadyExists { id } => {
            json!({ "exists": true, "message": exists_message(name), "id": id })
        }
        CreationOutcome::Created(record) => {
            json!({ "exists": false, "created": true, "response": record })
        }
    }
}

// JSON formatting

fn pretty_json(value: &Value) -> String {
    let mut out = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut out, formatter);

    match value.serialize(&mut ser) {
        Ok(()) => String::from_utf8(out).unwrap_or_else(|_| value.to_string()),
        Err(_) => value.to_string(),
    }
}

// Text formatting

fn text_record(value: &Value) -> String {
    let Value::Object(map) = value else {
        return text_value(value);
    };

    if map.is_empty() {
        return "{}".to_string();
    }

    let width = map.keys().map(|k| k.len()).max().unwrap_or(0) + 1;
    map.iter()
        .map(|(key, val)| format!("{:<width$} {}", format!("{}:", key), text_value(val)))
        .collect::<Vec<_>>()
        .join("\n")
}

fn text_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

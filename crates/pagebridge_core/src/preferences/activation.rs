//! Activation list decoding.
//!
//! # Responsibility
//! - Decode the raw render-process preference payload into activation
//!   entries.
//! - Skip malformed entries with a precise parse error instead of
//!   failing the whole list.
//!
//! # Invariants
//! - Decoded entry order equals payload order (it is the injection
//!   order).
//! - A payload that is not a sequence yields zero entries and one parse
//!   error.

use crate::inject::capability::is_valid_extension_id;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Wire field carrying the extension identifier.
pub const FIELD_EXTENSION_ID: &str = "extensionId";
/// Wire field selecting background injection; absent means content.
pub const FIELD_BACKGROUND: &str = "background";

/// One decoded activation record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivationEntry {
    pub extension_id: String,
    #[serde(default)]
    pub background: bool,
}

impl ActivationEntry {
    /// Convenience constructor for a content-mode activation.
    pub fn content(extension_id: impl Into<String>) -> Self {
        Self {
            extension_id: extension_id.into(),
            background: false,
        }
    }

    /// Convenience constructor for a background-mode activation.
    pub fn background(extension_id: impl Into<String>) -> Self {
        Self {
            extension_id: extension_id.into(),
            background: true,
        }
    }
}

/// Per-entry decode failure; the entry is skipped, decoding continues.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActivationParseError {
    NotASequence { found: &'static str },
    NotAnObject { index: usize },
    MissingExtensionId { index: usize },
    InvalidExtensionId { index: usize, value: String },
}

impl Display for ActivationParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotASequence { found } => {
                write!(f, "activation payload is not a sequence (found {found})")
            }
            Self::NotAnObject { index } => {
                write!(f, "activation entry {index} is not an object")
            }
            Self::MissingExtensionId { index } => {
                write!(f, "activation entry {index} is missing {FIELD_EXTENSION_ID}")
            }
            Self::InvalidExtensionId { index, value } => {
                write!(f, "activation entry {index} has invalid extension id: {value}")
            }
        }
    }
}

impl Error for ActivationParseError {}

/// Result of one tolerant decode pass.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ActivationParse {
    /// Well-formed entries in payload order.
    pub entries: Vec<ActivationEntry>,
    /// Skipped-entry failures, for diagnostic reporting.
    pub skipped: Vec<ActivationParseError>,
}

/// Decodes a raw preference payload into activation entries.
///
/// # Contract
/// - Never fails as a whole; every defect is localized to one
///   [`ActivationParseError`].
/// - Order of `entries` matches order in the payload.
pub fn parse_activation_list(raw: &Value) -> ActivationParse {
    let mut parse = ActivationParse::default();

    let items = match raw.as_array() {
        Some(items) => items,
        None => {
            parse.skipped.push(ActivationParseError::NotASequence {
                found: json_kind(raw),
            });
            return parse;
        }
    };

    for (index, item) in items.iter().enumerate() {
        let object = match item.as_object() {
            Some(object) => object,
            None => {
                parse.skipped.push(ActivationParseError::NotAnObject { index });
                continue;
            }
        };

        let extension_id = match object.get(FIELD_EXTENSION_ID).and_then(Value::as_str) {
            Some(value) => value,
            None => {
                parse
                    .skipped
                    .push(ActivationParseError::MissingExtensionId { index });
                continue;
            }
        };

        if !is_valid_extension_id(extension_id) {
            parse.skipped.push(ActivationParseError::InvalidExtensionId {
                index,
                value: extension_id.to_string(),
            });
            continue;
        }

        let background = object
            .get(FIELD_BACKGROUND)
            .and_then(Value::as_bool)
            .unwrap_or(false);

        parse.entries.push(ActivationEntry {
            extension_id: extension_id.to_string(),
            background,
        });
    }

    parse
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

//! Error Identity Inspector — decides whether a value of unknown shape
//! behaves like an error, and extracts its identity.
//!
//! Classification is structural: a value is error-like when it exposes a
//! non-empty string `name` and a string `message`. No coercion is performed,
//! and a property read that fails or panics makes the value "not error-like"
//! instead of propagating.

use std::error::Error as StdError;
use std::panic::{self, AssertUnwindSafe};

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::error::BusinessError;
use crate::types::{ErrorLike, ForeignObject, Thrown};

/// The identity reported for values that are not error-like.
pub const FALLBACK_NAME: &str = "Error";

/// Snapshot of an error-like value's identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorIdentity {
    pub name: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
}

/// Returned by [`assert_error`] for values that are not error-like.
#[derive(Debug, Clone, Error)]
#[error("expected an error-like value, got {found}")]
pub struct NotAnError {
    /// Short description of the rejected value (e.g. `"number"`).
    pub found: String,
}

/// Returns `true` if `value` behaves like an error.
pub fn is_error_like(value: &Thrown) -> bool {
    probe(value, false).is_some()
}

/// Returns the `name` of an error-like value, or [`FALLBACK_NAME`].
pub fn extract_name(value: &Thrown) -> String {
    probe(value, false)
        .map(|id| id.name)
        .unwrap_or_else(|| FALLBACK_NAME.to_owned())
}

/// Returns the full identity (including any stack) of an error-like value.
pub fn inspect(value: &Thrown) -> Option<ErrorIdentity> {
    probe(value, true)
}

/// Like [`inspect`], but fails with [`NotAnError`] for non-error values.
pub fn assert_error(value: &Thrown) -> Result<ErrorIdentity, NotAnError> {
    inspect(value).ok_or_else(|| NotAnError {
        found: describe(value),
    })
}

/// Render any value as a single human-readable line.
///
/// Error-like values render as `"{name}: {message}"`.
pub fn stringify(value: &Thrown) -> String {
    if let Some(id) = probe(value, false) {
        return format!("{}: {}", id.name, id.message);
    }
    match value {
        Thrown::Data(data) => format!("unknown error '{data}'"),
        _ => format!("unknown error '<{}>'", describe(value)),
    }
}

pub(crate) fn probe(value: &Thrown, with_stack: bool) -> Option<ErrorIdentity> {
    match value {
        Thrown::Error(err) => Some(own_identity(err, with_stack)),
        Thrown::Native(err) => native_identity(&**err, with_stack),
        Thrown::Data(data) => data_identity(data, with_stack),
        Thrown::Object(obj) => object_identity(&**obj, with_stack),
    }
}

fn own_identity(err: &BusinessError, with_stack: bool) -> ErrorIdentity {
    ErrorIdentity {
        name: err.name().to_owned(),
        message: err.message().to_owned(),
        stack: if with_stack { ErrorLike::stack(err) } else { None },
    }
}

fn native_identity(
    err: &(dyn StdError + Send + Sync + 'static),
    with_stack: bool,
) -> Option<ErrorIdentity> {
    if let Some(own) = err.downcast_ref::<BusinessError>() {
        return Some(own_identity(own, with_stack));
    }
    let message = display_guarded(err)?;
    Some(ErrorIdentity {
        name: FALLBACK_NAME.to_owned(),
        message,
        stack: None,
    })
}

fn data_identity(data: &Value, with_stack: bool) -> Option<ErrorIdentity> {
    let fields = data.as_object()?;
    let name = fields.get("name").and_then(Value::as_str).filter(|n| !n.is_empty())?;
    let message = fields.get("message").and_then(Value::as_str)?;
    let stack = if with_stack {
        fields.get("stack").and_then(Value::as_str).map(str::to_owned)
    } else {
        None
    };
    Some(ErrorIdentity {
        name: name.to_owned(),
        message: message.to_owned(),
        stack,
    })
}

fn object_identity(obj: &dyn ForeignObject, with_stack: bool) -> Option<ErrorIdentity> {
    let name = match read_property(obj, "name")? {
        Value::String(name) if !name.is_empty() => name,
        _ => return None,
    };
    let message = match read_property(obj, "message")? {
        Value::String(message) => message,
        _ => return None,
    };
    // An unreadable stack does not disqualify the value.
    let stack = if with_stack {
        match read_property(obj, "stack") {
            Some(Value::String(stack)) => Some(stack),
            _ => None,
        }
    } else {
        None
    };
    Some(ErrorIdentity { name, message, stack })
}

/// Read a property from a host object, containing both errors and panics.
pub(crate) fn read_property(obj: &dyn ForeignObject, key: &str) -> Option<Value> {
    match panic::catch_unwind(AssertUnwindSafe(|| obj.property(key))) {
        Ok(Ok(value)) => value,
        Ok(Err(e)) => {
            debug!(
                property = key,
                error = %e,
                "property read failed, treating value as not error-like"
            );
            None
        }
        Err(_) => {
            debug!(property = key, "property read panicked, treating value as not error-like");
            None
        }
    }
}

/// `to_string()` on a foreign error, containing panics from its `Display`.
pub(crate) fn display_guarded(err: &dyn StdError) -> Option<String> {
    match panic::catch_unwind(AssertUnwindSafe(|| err.to_string())) {
        Ok(message) => Some(message),
        Err(_) => {
            debug!("Display of a native error panicked, treating value as not error-like");
            None
        }
    }
}

fn describe(value: &Thrown) -> String {
    let kind = match value {
        Thrown::Error(_) | Thrown::Native(_) => "error",
        Thrown::Object(_) => "foreign object",
        Thrown::Data(data) => match data.as_ref() {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
        },
    };
    kind.to_owned()
}

// ─── Tests ────────────────────────────────────────────────────────────────────

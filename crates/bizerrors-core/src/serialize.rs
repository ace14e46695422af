//! Transport rendering — turn error-like values into a plain, serializable
//! shape and back.
//!
//! Only `name`, `message`, an opt-in `stack` and error-like causes are
//! emitted. Non-error causes are dropped, so arbitrary context data attached
//! as a cause never reaches the wire.

use std::error::Error as StdError;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::BusinessError;
use crate::inspect::{display_guarded, probe, read_property, FALLBACK_NAME};
use crate::types::Thrown;

/// The wire form of an error-like value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SerializedError {
    pub name: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cause: Option<Box<SerializedError>>,
}

/// Options for [`serialize_error`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializeOptions {
    /// Emit stack traces. Leave off for responses sent to untrusted clients.
    #[serde(default)]
    pub include_stack: bool,
    /// How many levels of cause to emit (0 = none).
    #[serde(default = "default_max_cause_depth")]
    pub max_cause_depth: usize,
}

fn default_max_cause_depth() -> usize {
    8
}

impl Default for SerializeOptions {
    fn default() -> Self {
        Self {
            include_stack: false,
            max_cause_depth: default_max_cause_depth(),
        }
    }
}

impl SerializedError {
    /// Serialize a `BusinessError` directly.
    pub fn from_error(err: &BusinessError, opts: &SerializeOptions) -> Self {
        serialize_business(err, opts, 0)
    }

    /// Convert to a JSON object with the same shape as the serde output.
    pub fn to_value(&self) -> Value {
        let mut fields = Map::new();
        fields.insert("name".into(), Value::String(self.name.clone()));
        fields.insert("message".into(), Value::String(self.message.clone()));
        if let Some(stack) = &self.stack {
            fields.insert("stack".into(), Value::String(stack.clone()));
        }
        if let Some(cause) = &self.cause {
            fields.insert("cause".into(), cause.to_value());
        }
        Value::Object(fields)
    }
}

/// Serialize any value. Returns `None` if it is not error-like.
pub fn serialize_error(value: &Thrown, opts: &SerializeOptions) -> Option<SerializedError> {
    serialize_at(value, opts, 0)
}

/// Rebuild a thrown value from its wire form.
///
/// The result is plain data; it is recognized as error-like structurally,
/// and its causes remain reachable as nested `cause` objects.
pub fn deserialize_error(serialized: &SerializedError) -> Thrown {
    Thrown::Data(Arc::new(serialized.to_value()))
}

fn serialize_at(value: &Thrown, opts: &SerializeOptions, depth: usize) -> Option<SerializedError> {
    if let Some(err) = value.as_business_error() {
        return Some(serialize_business(err, opts, depth));
    }
    let identity = probe(value, opts.include_stack)?;
    let cause = if depth < opts.max_cause_depth {
        match value {
            Thrown::Native(err) => err
                .source()
                .and_then(|src| serialize_source(src, opts, depth + 1))
                .map(Box::new),
            Thrown::Data(data) => data
                .get("cause")
                .and_then(|c| serialize_at(&Thrown::data(c.clone()), opts, depth + 1))
                .map(Box::new),
            Thrown::Object(obj) => read_property(&**obj, "cause")
                .and_then(|c| serialize_at(&Thrown::from(c), opts, depth + 1))
                .map(Box::new),
            Thrown::Error(_) => None,
        }
    } else {
        None
    };
    Some(SerializedError {
        name: identity.name,
        message: identity.message,
        stack: identity.stack,
        cause,
    })
}

fn serialize_business(
    err: &BusinessError,
    opts: &SerializeOptions,
    depth: usize,
) -> SerializedError {
    let cause = if depth < opts.max_cause_depth {
        err.cause()
            .and_then(|c| serialize_at(c, opts, depth + 1))
            .map(Box::new)
    } else {
        None
    };
    SerializedError {
        name: err.name().to_owned(),
        message: err.message().to_owned(),
        stack: opts.include_stack.then(|| err.stack()),
        cause,
    }
}

/// `source()` links of foreign errors are borrowed, so they are rendered
/// directly instead of going through `Thrown`.
fn serialize_source(
    src: &(dyn StdError + 'static),
    opts: &SerializeOptions,
    depth: usize,
) -> Option<SerializedError> {
    if let Some(err) = src.downcast_ref::<BusinessError>() {
        return Some(serialize_business(err, opts, depth));
    }
    let message = display_guarded(src)?;
    let cause = if depth < opts.max_cause_depth {
        src.source()
            .and_then(|next| serialize_source(next, opts, depth + 1))
            .map(Box::new)
    } else {
        None
    };
    Some(SerializedError {
        name: FALLBACK_NAME.to_owned(),
        message,
        stack: None,
        cause,
    })
}

// ─── Tests ────────────────────────────────────────────────────────────────────

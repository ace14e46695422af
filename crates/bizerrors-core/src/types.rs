//! Core types for the bizerrors taxonomy.

use std::error::Error as StdError;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::error::BusinessError;

// ─── ErrorKind ────────────────────────────────────────────────────────────────

/// The kind/taxonomy of a business-logic error.
///
/// Every kind except [`ErrorKind::Forwarded`] has a fixed discriminator
/// (see [`ErrorKind::identity`]). A forwarded error borrows its
/// discriminator from its cause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The given inputs are malformed and cannot be processed.
    Input,
    /// The request requires authentication, which was not properly supplied.
    Authentication,
    /// The authenticated caller is not allowed to perform this request.
    NotAllowed,
    /// The requested resource could not be found.
    ///
    /// Usually means an entity with a given ID does not exist, rather than
    /// an entire route being missing.
    NotFound,
    /// The request could not complete due to a conflict in the current state
    /// of the resource.
    Conflict,
    /// The requested resource has not changed since the last request.
    NotModified,
    /// The functionality required to fulfill the request is not supported.
    NotImplemented,
    /// An underlying cause forwarded with additional context.
    Forwarded,
}

impl ErrorKind {
    /// The seven kinds whose discriminator is fixed.
    pub const TAXONOMY: [ErrorKind; 7] = [
        Self::Input,
        Self::Authentication,
        Self::NotAllowed,
        Self::NotFound,
        Self::Conflict,
        Self::NotModified,
        Self::NotImplemented,
    ];

    /// The declared identity of this kind (e.g. `"NotFoundError"`).
    pub fn identity(self) -> &'static str {
        match self {
            Self::Input => "InputError",
            Self::Authentication => "AuthenticationError",
            Self::NotAllowed => "NotAllowedError",
            Self::NotFound => "NotFoundError",
            Self::Conflict => "ConflictError",
            Self::NotModified => "NotModifiedError",
            Self::NotImplemented => "NotImplementedError",
            Self::Forwarded => "ForwardedError",
        }
    }

    /// Look a kind up by its declared identity.
    pub fn from_identity(identity: &str) -> Option<Self> {
        Self::TAXONOMY
            .into_iter()
            .chain([Self::Forwarded])
            .find(|k| k.identity() == identity)
    }

    /// Returns `true` if the discriminator of this kind is its own identity.
    pub fn has_fixed_name(self) -> bool {
        !matches!(self, Self::Forwarded)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.identity())
    }
}

/// Returned when a string names no known [`ErrorKind`].
#[derive(Debug, Clone, Error)]
#[error("unknown error kind: {0}")]
pub struct UnknownKind(pub String);

impl FromStr for ErrorKind {
    type Err = UnknownKind;

    /// Accepts either the identity (`"NotFoundError"`) or the snake_case
    /// tag (`"not_found"`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(kind) = Self::from_identity(s) {
            return Ok(kind);
        }
        serde_json::from_value(Value::String(s.to_owned()))
            .map_err(|_| UnknownKind(s.to_owned()))
    }
}

// ─── ErrorLike ────────────────────────────────────────────────────────────────

/// The minimal error shape, for types known at compile time.
///
/// Values of unknown shape are classified with
/// [`is_error_like`](crate::inspect::is_error_like) instead.
pub trait ErrorLike {
    fn name(&self) -> &str;

    fn message(&self) -> &str;

    /// A rendered stack trace, if one is available.
    fn stack(&self) -> Option<String> {
        None
    }
}

// ─── ForeignObject ────────────────────────────────────────────────────────────

/// A property read on a [`ForeignObject`] failed.
#[derive(Debug, Clone, Error)]
#[error("property `{property}` is not readable: {reason}")]
pub struct PropertyAccessError {
    pub property: String,
    pub reason: String,
}

/// A host object exposing named properties whose reads may fail.
///
/// This is how values from outside the crate's type system (scripting
/// hosts, plugin boundaries, FFI handles) are presented to the inspector.
pub trait ForeignObject: fmt::Debug + Send + Sync {
    /// Read a property. `Ok(None)` means the property is absent.
    fn property(&self, key: &str) -> Result<Option<Value>, PropertyAccessError>;
}

// ─── Thrown ───────────────────────────────────────────────────────────────────

/// An arbitrary failure value of unknown shape.
///
/// Every payload sits behind an `Arc`, so cloning a `Thrown` shares the
/// value rather than copying it. An absent cause is `Option::<Thrown>::None`;
/// `null` is `Thrown::Data(Value::Null)`.
#[derive(Debug, Clone)]
pub enum Thrown {
    /// An error built by this crate.
    Error(Arc<BusinessError>),
    /// Any other Rust error value.
    Native(Arc<dyn StdError + Send + Sync>),
    /// Plain data: null, primitives, arrays, objects.
    Data(Arc<Value>),
    /// A host object with fallible property access.
    Object(Arc<dyn ForeignObject>),
}

impl Thrown {
    /// Wrap any Rust error. A `BusinessError` keeps its identity.
    pub fn native<E>(err: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self::from(Box::new(err) as Box<dyn StdError + Send + Sync>)
    }

    /// Wrap plain data.
    pub fn data(value: impl Into<Value>) -> Self {
        Self::Data(Arc::new(value.into()))
    }

    /// The `null` value.
    pub fn null() -> Self {
        Self::data(Value::Null)
    }

    /// Wrap a host object.
    pub fn object(obj: impl ForeignObject + 'static) -> Self {
        Self::Object(Arc::new(obj))
    }

    /// Reference equality: `true` if both handles point at the same value.
    pub fn ptr_eq(&self, other: &Thrown) -> bool {
        match (self, other) {
            (Self::Error(a), Self::Error(b)) => Arc::ptr_eq(a, b),
            (Self::Native(a), Self::Native(b)) => Arc::ptr_eq(a, b),
            (Self::Data(a), Self::Data(b)) => Arc::ptr_eq(a, b),
            (Self::Object(a), Self::Object(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Returns the contained `BusinessError`, including one carried as a
    /// native error.
    pub fn as_business_error(&self) -> Option<&BusinessError> {
        match self {
            Self::Error(err) => Some(err),
            Self::Native(err) => err.downcast_ref::<BusinessError>(),
            _ => None,
        }
    }

    /// Returns the plain data, if this is `Thrown::Data`.
    pub fn as_data(&self) -> Option<&Value> {
        match self {
            Self::Data(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the value as a Rust error, if it is one.
    pub fn as_std_error(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Self::Error(err) => Some(&**err as &(dyn StdError + 'static)),
            Self::Native(err) => Some(&**err as &(dyn StdError + 'static)),
            _ => None,
        }
    }
}

impl fmt::Display for Thrown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&crate::inspect::stringify(self))
    }
}

impl From<BusinessError> for Thrown {
    fn from(err: BusinessError) -> Self {
        Self::Error(Arc::new(err))
    }
}

impl From<Arc<BusinessError>> for Thrown {
    fn from(err: Arc<BusinessError>) -> Self {
        Self::Error(err)
    }
}

impl From<Box<dyn StdError + Send + Sync>> for Thrown {
    fn from(err: Box<dyn StdError + Send + Sync>) -> Self {
        match err.downcast::<BusinessError>() {
            Ok(own) => Self::Error(Arc::from(own)),
            Err(other) => Self::Native(Arc::from(other)),
        }
    }
}

/// A `BusinessError` under anyhow context layers comes back as a chain of
/// forwarded errors, one per context message, outermost first. Anything
/// else is kept whole as a native error.
impl From<anyhow::Error> for Thrown {
    fn from(err: anyhow::Error) -> Self {
        let contexts = anyhow_contexts(&err);
        match err.downcast::<BusinessError>() {
            Ok(own) => contexts
                .into_iter()
                .rev()
                .fold(Self::from(own), |cause, context| {
                    Self::from(BusinessError::forward(context, cause))
                }),
            Err(other) => {
                let boxed = Box::<dyn StdError + Send + Sync>::from(other);
                Self::Native(Arc::from(boxed))
            }
        }
    }
}

/// Context messages layered above the wrapped `BusinessError`.
fn anyhow_contexts(err: &anyhow::Error) -> Vec<String> {
    let Some(inner) = err.downcast_ref::<BusinessError>() else {
        return Vec::new();
    };
    let own_links =
        std::iter::successors(Some(inner as &(dyn StdError + 'static)), |e| (*e).source()).count();
    let layers = err.chain().count().saturating_sub(own_links);
    err.chain().take(layers).map(ToString::to_string).collect()
}

impl From<Value> for Thrown {
    fn from(value: Value) -> Self {
        Self::Data(Arc::new(value))
    }
}

impl From<&str> for Thrown {
    fn from(s: &str) -> Self {
        Self::data(s)
    }
}

impl From<String> for Thrown {
    fn from(s: String) -> Self {
        Self::data(s)
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────

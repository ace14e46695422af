//! bizerrors-core — business-logic error taxonomy for services.
//!
//! This crate defines:
//! - [`ErrorKind`] — the taxonomy of business error kinds
//! - [`BusinessError`] — the single error type every kind is built through
//! - [`Thrown`] — a failure value of unknown shape (a cause)
//! - the identity inspector ([`is_error_like`], [`extract_name`], [`inspect`])
//! - [`SerializedError`] — the transport form of an error-like value
//!
//! # Quick Start
//!
//! ```rust
//! use bizerrors_core::{BusinessError, Thrown, is_error_like};
//! use serde_json::json;
//!
//! // A failure reported by another process, as JSON.
//! let remote = Thrown::data(json!({"name": "NotFoundError", "message": "no such user"}));
//! assert!(is_error_like(&remote));
//!
//! let err = BusinessError::forward("could not load the profile page", remote);
//! assert_eq!(err.name(), "NotFoundError");
//! assert_eq!(err.to_string(), "NotFoundError: could not load the profile page");
//! ```

pub mod error;
pub mod inspect;
pub mod serialize;
pub mod types;

pub use error::{BusinessError, Chain};
pub use inspect::{
    assert_error, extract_name, inspect, is_error_like, stringify, ErrorIdentity, NotAnError,
    FALLBACK_NAME,
};
pub use serialize::{deserialize_error, serialize_error, SerializeOptions, SerializedError};
pub use types::{ErrorKind, ErrorLike, ForeignObject, PropertyAccessError, Thrown, UnknownKind};

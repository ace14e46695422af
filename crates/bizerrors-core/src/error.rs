//! `BusinessError` — the single construction path for every taxonomy kind.
//!
//! A `BusinessError` carries a discriminator (`name`), a caller-supplied
//! `message`, the call site it was built at, and an optional `cause` stored
//! verbatim. Instances have no mutators; share them behind an `Arc`
//! (see [`Thrown::Error`]).

use std::backtrace::{Backtrace, BacktraceStatus};
use std::borrow::Cow;
use std::error::Error as StdError;
use std::fmt;
use std::panic::Location;

use tracing::trace;

use crate::inspect::{extract_name, FALLBACK_NAME};
use crate::types::{ErrorKind, ErrorLike, Thrown};

/// A business-logic failure of one of the [`ErrorKind`]s.
///
/// # Usage
/// ```rust
/// use bizerrors_core::{BusinessError, ErrorKind};
///
/// let root = BusinessError::not_found("user 42 does not exist");
/// let err = BusinessError::forward("failed to load profile", root);
///
/// assert_eq!(err.name(), "NotFoundError");
/// assert_eq!(err.message(), "failed to load profile");
/// assert_eq!(err.kind(), ErrorKind::Forwarded);
/// ```
pub struct BusinessError {
    kind: ErrorKind,
    name: Cow<'static, str>,
    message: String,
    cause: Option<Thrown>,
    location: &'static Location<'static>,
    backtrace: Backtrace,
}

impl BusinessError {
    /// Build an error of the given kind.
    ///
    /// The name is `kind.identity()`, except for [`ErrorKind::Forwarded`]
    /// whose name is taken from the cause (or [`FALLBACK_NAME`] when the
    /// cause is absent or not error-like). The cause is stored as-is and is
    /// only inspected for forwarded errors.
    #[track_caller]
    pub fn new(kind: ErrorKind, message: impl Into<String>, cause: Option<Thrown>) -> Self {
        let name = if kind.has_fixed_name() {
            Cow::Borrowed(kind.identity())
        } else {
            Cow::Owned(forwarded_name(cause.as_ref()))
        };
        Self {
            kind,
            name,
            message: message.into(),
            cause,
            location: Location::caller(),
            backtrace: Backtrace::capture(),
        }
    }

    /// Wrap `cause` with added context, presenting the cause's own name.
    ///
    /// The message is exactly `message`; the cause's message is never
    /// appended to it.
    #[track_caller]
    pub fn forward(message: impl Into<String>, cause: impl Into<Thrown>) -> Self {
        Self::new(ErrorKind::Forwarded, message, Some(cause.into()))
    }

    /// The given inputs are malformed and cannot be processed.
    #[track_caller]
    pub fn input(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Input, message, None)
    }

    /// Authentication was required but not properly supplied.
    #[track_caller]
    pub fn authentication(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Authentication, message, None)
    }

    /// The authenticated caller may not perform this request.
    #[track_caller]
    pub fn not_allowed(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotAllowed, message, None)
    }

    /// The requested resource could not be found.
    #[track_caller]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message, None)
    }

    /// The current state of the resource conflicts with the request.
    #[track_caller]
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Conflict, message, None)
    }

    /// The resource has not changed since the last request.
    #[track_caller]
    pub fn not_modified(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotModified, message, None)
    }

    /// The required functionality is not supported.
    #[track_caller]
    pub fn not_implemented(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotImplemented, message, None)
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// The discriminator downstream consumers switch on.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// The causing value, exactly as it was passed in.
    pub fn cause(&self) -> Option<&Thrown> {
        self.cause.as_ref()
    }

    /// Where this error was constructed.
    pub fn location(&self) -> &'static Location<'static> {
        self.location
    }

    /// The backtrace captured at construction. Only populated when
    /// `RUST_BACKTRACE` or `RUST_LIB_BACKTRACE` enables it.
    pub fn backtrace(&self) -> &Backtrace {
        &self.backtrace
    }

    /// Render the stack: a header line, the construction site, then the
    /// captured backtrace if there is one.
    pub fn stack(&self) -> String {
        let mut out = format!("{}: {}\n    at {}", self.name, self.message, self.location);
        if self.backtrace.status() == BacktraceStatus::Captured {
            out.push('\n');
            out.push_str(&self.backtrace.to_string());
        }
        out
    }

    /// Iterate the cause chain, outermost cause first.
    ///
    /// Iteration follows causes that are themselves `BusinessError`s and
    /// ends at the first one that is not.
    pub fn chain(&self) -> Chain<'_> {
        Chain {
            next: self.cause.as_ref(),
        }
    }

    /// The innermost reachable cause.
    pub fn root_cause(&self) -> Option<&Thrown> {
        self.chain().last()
    }
}

fn forwarded_name(cause: Option<&Thrown>) -> String {
    let name = match cause {
        Some(cause) => extract_name(cause),
        None => FALLBACK_NAME.to_owned(),
    };
    trace!(name = %name, "forwarded error adopts cause name");
    name
}

impl ErrorLike for BusinessError {
    fn name(&self) -> &str {
        &self.name
    }

    fn message(&self) -> &str {
        &self.message
    }

    fn stack(&self) -> Option<String> {
        Some(BusinessError::stack(self))
    }
}

impl fmt::Debug for BusinessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BusinessError")
            .field("kind", &self.kind)
            .field("name", &self.name)
            .field("message", &self.message)
            .field("cause", &self.cause)
            .field("location", &self.location)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for BusinessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.message)
    }
}

impl StdError for BusinessError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.cause.as_ref().and_then(Thrown::as_std_error)
    }
}

// ─── Chain ────────────────────────────────────────────────────────────────────

/// Iterator over a [`BusinessError`]'s causes. See [`BusinessError::chain`].
#[derive(Debug, Clone)]
pub struct Chain<'a> {
    next: Option<&'a Thrown>,
}

impl<'a> Iterator for Chain<'a> {
    type Item = &'a Thrown;

    fn next(&mut self) -> Option<&'a Thrown> {
        let current = self.next.take()?;
        self.next = current.as_business_error().and_then(BusinessError::cause);
        Some(current)
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inspect::is_error_like;
    use crate::types::{ForeignObject, PropertyAccessError};
    use serde_json::{json, Value};

    fn causes() -> Vec<Thrown> {
        vec![
            Thrown::null(),
            Thrown::data(json!({"user": 42})),
            Thrown::from("plain string"),
            Thrown::native(std::io::Error::other("disk")),
            Thrown::from(BusinessError::input("inner")),
        ]
    }

    #[test]
    fn taxonomy_names_and_messages() {
        for kind in ErrorKind::TAXONOMY {
            let err = BusinessError::new(kind, "something failed", None);
            assert_eq!(err.message(), "something failed");
            assert_eq!(err.name(), kind.identity());
            assert_eq!(err.kind(), kind);
            assert!(err.cause().is_none());
            assert!(is_error_like(&Thrown::from(err)));
        }
    }

    #[test]
    fn empty_message_is_kept() {
        let err = BusinessError::conflict("");
        assert_eq!(err.message(), "");
        assert_eq!(err.to_string(), "ConflictError: ");
    }

    #[test]
    fn shorthands_match_kinds() {
        assert_eq!(BusinessError::input("m").name(), "InputError");
        assert_eq!(BusinessError::authentication("m").name(), "AuthenticationError");
        assert_eq!(BusinessError::not_allowed("m").name(), "NotAllowedError");
        assert_eq!(BusinessError::not_found("m").name(), "NotFoundError");
        assert_eq!(BusinessError::conflict("m").name(), "ConflictError");
        assert_eq!(BusinessError::not_modified("m").name(), "NotModifiedError");
        assert_eq!(BusinessError::not_implemented("m").name(), "NotImplementedError");
    }

    #[test]
    fn cause_is_stored_by_reference() {
        for kind in ErrorKind::TAXONOMY {
            for cause in causes() {
                let err = BusinessError::new(kind, "ctx", Some(cause.clone()));
                assert!(err.cause().unwrap().ptr_eq(&cause), "{kind} / {cause}");
                assert_eq!(err.name(), kind.identity());
            }
        }
    }

    #[test]
    fn cause_fields_are_untouched() {
        let inner = BusinessError::not_found("missing");
        let thrown = Thrown::from(inner);
        let _outer = BusinessError::forward("ctx", thrown.clone());
        let inner = thrown.as_business_error().unwrap();
        assert_eq!(inner.name(), "NotFoundError");
        assert_eq!(inner.message(), "missing");
    }

    #[test]
    fn forward_adopts_cause_name() {
        let cause = Thrown::data(json!({"name": "Foo", "message": "inner"}));
        let err = BusinessError::forward("ctx", cause);
        assert_eq!(err.name(), "Foo");
        assert_eq!(err.message(), "ctx");
        assert_eq!(err.kind(), ErrorKind::Forwarded);
    }

    #[test]
    fn forward_of_non_error_uses_fallback() {
        assert_eq!(BusinessError::forward("ctx", "plain string").name(), "Error");
        assert_eq!(BusinessError::forward("ctx", Thrown::null()).name(), "Error");
        assert_eq!(BusinessError::new(ErrorKind::Forwarded, "ctx", None).name(), "Error");
    }

    #[test]
    fn forward_never_concatenates_messages() {
        let err = BusinessError::forward("ctx", BusinessError::input("inner"));
        assert_eq!(err.message(), "ctx");
        assert_eq!(err.name(), "InputError");
        assert_eq!(err.to_string(), "InputError: ctx");
    }

    #[test]
    fn forward_of_forward_keeps_root_name() {
        let err = BusinessError::forward(
            "outer",
            BusinessError::forward("middle", BusinessError::not_allowed("root")),
        );
        assert_eq!(err.name(), "NotAllowedError");
    }

    #[test]
    fn forward_survives_hostile_cause() {
        #[derive(Debug)]
        struct Exploding;

        impl ForeignObject for Exploding {
            fn property(&self, key: &str) -> Result<Option<Value>, PropertyAccessError> {
                if key == "name" {
                    panic!("name getter exploded");
                }
                Err(PropertyAccessError {
                    property: key.to_owned(),
                    reason: "nope".into(),
                })
            }
        }

        let cause = Thrown::object(Exploding);
        let err = BusinessError::forward("ctx", cause.clone());
        assert_eq!(err.name(), "Error");
        assert!(err.cause().unwrap().ptr_eq(&cause));

        let err = BusinessError::new(ErrorKind::Input, "ctx", Some(cause));
        assert_eq!(err.name(), "InputError");
    }

    #[test]
    fn chain_reaches_root() {
        let root = BusinessError::not_found("root");
        let inner = BusinessError::new(ErrorKind::Conflict, "inner", Some(root.into()));
        let err = BusinessError::new(ErrorKind::Input, "outer", Some(inner.into()));
        let messages: Vec<_> = err
            .chain()
            .map(|c| c.as_business_error().unwrap().message().to_owned())
            .collect();
        assert_eq!(messages, ["inner", "root"]);

        let second = err.cause().unwrap().as_business_error().unwrap().cause().unwrap();
        assert_eq!(second.as_business_error().unwrap().message(), "root");
        assert_eq!(
            err.root_cause().unwrap().as_business_error().unwrap().message(),
            "root"
        );
    }

    #[test]
    fn chain_stops_at_foreign_cause() {
        let err = BusinessError::forward("outer", BusinessError::forward("inner", "just data"));
        let chain: Vec<_> = err.chain().collect();
        assert_eq!(chain.len(), 2);
        assert_eq!(chain[1].as_data(), Some(&json!("just data")));
    }

    #[test]
    fn source_exposes_error_causes_only() {
        let err = BusinessError::forward("ctx", Thrown::native(std::io::Error::other("disk")));
        assert_eq!(err.source().unwrap().to_string(), "disk");

        let err = BusinessError::forward("ctx", "data");
        assert!(err.source().is_none());
    }

    #[test]
    fn stack_points_at_call_site() {
        let line = line!() + 1;
        let err = BusinessError::not_found("nope");
        assert_eq!(err.location().file(), file!());
        assert_eq!(err.location().line(), line);
        let stack = err.stack();
        assert!(stack.starts_with("NotFoundError: nope\n    at "));
        assert!(stack.contains(&format!("{}:{}", file!(), line)));
    }

    #[test]
    fn errors_are_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<BusinessError>();
        assert_send_sync::<Thrown>();

        let shared = Thrown::from(BusinessError::forward("ctx", BusinessError::conflict("busy")));
        std::thread::scope(|s| {
            for _ in 0..4 {
                let shared = shared.clone();
                s.spawn(move || {
                    let err = shared.as_business_error().unwrap();
                    assert_eq!(err.name(), "ConflictError");
                    assert_eq!(err.message(), "ctx");
                });
            }
        });
    }
}

#![forbid(unsafe_code)]

//! The error type shared by every Tessel crate.
//!
//! # Taxonomy
//!
//! - [`Error::InvalidArgument`]: rejected input (non-positive sizes, malformed
//!   ranges, a binding rule producing the wrong kind of value).
//! - [`Error::OutOfRange`]: a lookup outside the addressable area (pixels,
//!   table positions, diagonal starts, list indices).
//! - [`Error::Precondition`]: the call is valid but the object is not in a state
//!   that allows it (erasing before anything was drawn).
//! - [`Error::Resource`]: a collaborator (decoder, text renderer, presenter)
//!   failed. The collaborator's error is carried untouched and exposed
//!   through [`std::error::Error::source`].
//! - [`Error::Factory`]: every constructor in an ordered factory list failed.

use std::fmt;

/// Boxed collaborator error.
pub type ResourceError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors raised by geometry, raster, object, and layout operations.
#[derive(Debug)]
pub enum Error {
    /// An argument was rejected.
    InvalidArgument(String),
    /// A lookup fell outside the valid area.
    OutOfRange(String),
    /// The operation requires state the object does not have.
    Precondition(String),
    /// An external collaborator failed.
    Resource(ResourceError),
    /// All constructors tried by a factory failed, in try order.
    Factory(Vec<Error>),
}

impl Error {
    /// Shorthand for [`Error::InvalidArgument`].
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// Shorthand for [`Error::OutOfRange`].
    pub fn out_of_range(msg: impl Into<String>) -> Self {
        Self::OutOfRange(msg.into())
    }

    /// Shorthand for [`Error::Precondition`].
    pub fn precondition(msg: impl Into<String>) -> Self {
        Self::Precondition(msg.into())
    }

    /// Wrap a collaborator error without altering it.
    pub fn resource<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Resource(Box::new(err))
    }

    /// True for [`Error::InvalidArgument`].
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidArgument(_))
    }

    /// True for [`Error::OutOfRange`].
    pub fn is_out_of_range(&self) -> bool {
        matches!(self, Self::OutOfRange(_))
    }

    /// True for [`Error::Precondition`].
    pub fn is_precondition(&self) -> bool {
        matches!(self, Self::Precondition(_))
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidArgument(msg) => write!(f, "invalid argument: {msg}"),
            Self::OutOfRange(msg) => write!(f, "out of range: {msg}"),
            Self::Precondition(msg) => write!(f, "precondition violated: {msg}"),
            Self::Resource(err) => write!(f, "{err}"),
            Self::Factory(errors) => {
                write!(f, "no constructor succeeded")?;
                for (i, err) in errors.iter().enumerate() {
                    let sep = if i == 0 { ": " } else { " *** " };
                    write!(f, "{sep}{err}")?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Resource(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

/// Standard result type for Tessel APIs.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;
    use std::io;

    #[test]
    fn resource_keeps_collaborator_error_as_source() {
        let err = Error::resource(io::Error::new(io::ErrorKind::NotFound, "missing.png"));
        assert_eq!(err.to_string(), "missing.png");
        let source = err.source().expect("source");
        let io_err = source.downcast_ref::<io::Error>().expect("io error");
        assert_eq!(io_err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn factory_lists_every_failure() {
        let err = Error::Factory(vec![Error::invalid("a"), Error::precondition("b")]);
        assert_eq!(
            err.to_string(),
            "no constructor succeeded: invalid argument: a *** precondition violated: b"
        );
    }

    #[test]
    fn kind_predicates() {
        assert!(Error::invalid("x").is_invalid_argument());
        assert!(Error::out_of_range("x").is_out_of_range());
        assert!(Error::precondition("x").is_precondition());
        assert!(!Error::invalid("x").is_out_of_range());
    }
}

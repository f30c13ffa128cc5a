//! This crate provides a wrapper around an error that includes the location of
//! the error.
//!
//! ```rust
//! use std::panic::Location;
//! use swarmshare_located_error::{Located, LocatedError};
//!
//! #[derive(thiserror::Error, Debug)]
//! enum TestError {
//!     #[error("Test")]
//!     Test,
//! }
//!
//! #[track_caller]
//! fn get_caller_location() -> Location<'static> {
//!     *Location::caller()
//! }
//!
//! let e = TestError::Test;
//!
//! let b: LocatedError<TestError> = Located(e).into();
//! let l = get_caller_location();
//!
//! assert!(b.to_string().starts_with("Test, "));
//! assert_eq!(b.location().file(), l.file());
//! ```
//!
//! # Credits
//!
//! <https://stackoverflow.com/questions/74336993/getting-line-numbers-with-when-using-boxdyn-stderrorerror>
use std::error::Error;
use std::panic::Location;
use std::sync::Arc;

/// A type-erased shared error.
pub type DynError = Arc<dyn std::error::Error + Send + Sync>;

/// A generic wrapper around an error.
///
/// Where `E` is the inner error (source error).
pub struct Located<E>(pub E);

/// A wrapper around an error that includes the location of the error.
#[derive(Debug)]
pub struct LocatedError<'a, E>
where
    E: Error + ?Sized + Send + Sync + 'static,
{
    source: Arc<E>,
    location: Box<Location<'a>>,
}

impl<E> std::fmt::Display for LocatedError<'_, E>
where
    E: Error + ?Sized + Send + Sync + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}, {}", self.source, self.location)
    }
}

impl<E> Error for LocatedError<'_, E>
where
    E: Error + ?Sized + Send + Sync + 'static,
{
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.source)
    }
}

impl<E> Clone for LocatedError<'_, E>
where
    E: Error + ?Sized + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        LocatedError {
            source: self.source.clone(),
            location: self.location.clone(),
        }
    }
}

impl<E> LocatedError<'_, E>
where
    E: Error + ?Sized + Send + Sync + 'static,
{
    /// The wrapped error.
    #[must_use]
    pub fn inner(&self) -> &E {
        &self.source
    }

    /// Where the error was located.
    #[must_use]
    pub fn location(&self) -> &Location<'_> {
        &self.location
    }
}

#[allow(clippy::from_over_into)]
impl<'a, E> From<Located<E>> for LocatedError<'a, E>
where
    E: Error + Send + Sync + 'static,
{
    #[track_caller]
    fn from(err: Located<E>) -> Self {
        let e = LocatedError {
            source: Arc::new(err.0),
            location: Box::new(*std::panic::Location::caller()),
        };
        tracing::debug!("{e}");
        e
    }
}

impl<'a> From<DynError> for LocatedError<'a, dyn std::error::Error + Send + Sync> {
    #[track_caller]
    fn from(err: DynError) -> Self {
        let e = LocatedError {
            source: err,
            location: Box::new(*std::panic::Location::caller()),
        };
        tracing::debug!("{e}");
        e
    }
}

#[cfg(test)]
mod tests {
    use std::panic::Location;
    use std::sync::Arc;

    use super::{DynError, Located, LocatedError};

    #[derive(thiserror::Error, Debug)]
    enum TestError {
        #[error("Test")]
        Test,
    }

    #[track_caller]
    fn get_caller_location() -> Location<'static> {
        *Location::caller()
    }

    #[test]
    fn error_should_include_location() {
        let e = TestError::Test;

        let b: LocatedError<'_, TestError> = Located(e).into();
        let l = get_caller_location();

        assert_eq!(b.location.file(), l.file());
    }

    #[test]
    fn it_should_wrap_type_erased_errors() {
        let e: DynError = Arc::new(std::io::Error::other("boom"));

        let b: LocatedError<'_, dyn std::error::Error + Send + Sync> = e.into();

        assert!(b.to_string().starts_with("boom, "));
    }
}

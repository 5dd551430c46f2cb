//! Result envelope returned by every request-building operation

use crate::error::GridError;

/// Either the decoded response payload or the error that was caught
///
/// Request-building operations never return `Err`; callers branch on this
/// instead. Use [`Outcome::into_result`] to get back into `?` territory.
#[derive(Debug, Clone, PartialEq)]
#[must_use = "an Outcome may hold an error that should be inspected"]
pub enum Outcome<T> {
    Success(T),
    Failure(GridError),
}

impl<T> Outcome<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }

    pub fn is_failure(&self) -> bool {
        !self.is_success()
    }

    /// The payload, present only on success
    pub fn data(&self) -> Option<&T> {
        match self {
            Outcome::Success(data) => Some(data),
            Outcome::Failure(_) => None,
        }
    }

    /// The caught error, present only on failure
    pub fn error(&self) -> Option<&GridError> {
        match self {
            Outcome::Success(_) => None,
            Outcome::Failure(err) => Some(err),
        }
    }

    pub fn into_data(self) -> Option<T> {
        match self {
            Outcome::Success(data) => Some(data),
            Outcome::Failure(_) => None,
        }
    }

    pub fn into_error(self) -> Option<GridError> {
        match self {
            Outcome::Success(_) => None,
            Outcome::Failure(err) => Some(err),
        }
    }

    pub fn into_result(self) -> Result<T, GridError> {
        match self {
            Outcome::Success(data) => Ok(data),
            Outcome::Failure(err) => Err(err),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Outcome::Success(data) => Outcome::Success(f(data)),
            Outcome::Failure(err) => Outcome::Failure(err),
        }
    }
}

impl<T> From<Result<T, GridError>> for Outcome<T> {
    fn from(result: Result<T, GridError>) -> Self {
        match result {
            Ok(data) => Outcome::Success(data),
            Err(err) => Outcome::Failure(err),
        }
    }
}

impl<T> From<Outcome<T>> for Result<T, GridError> {
    fn from(outcome: Outcome<T>) -> Self {
        outcome.into_result()
    }
}

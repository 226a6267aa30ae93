//! Per-stage lookup outcome.
//!
//! Pipeline stages report one of three outcomes so callers (and tests) can
//! tell a field that is simply absent from one whose lookup failed.

use crate::error::ScraperError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup<T> {
    Found(T),
    NotFound,
    Error(String),
}

impl<T> Lookup<T> {
    /// Collapses the outcome to an `Option`, treating errors as absent.
    pub fn found(self) -> Option<T> {
        match self {
            Lookup::Found(value) => Some(value),
            Lookup::NotFound | Lookup::Error(_) => None,
        }
    }

    /// `NotFound`, or `Error` carrying the last failure seen while searching.
    pub(crate) fn missing(last_error: Option<String>) -> Self {
        last_error.map_or(Lookup::NotFound, Lookup::Error)
    }
}

impl<T> From<Option<T>> for Lookup<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Lookup::NotFound, Lookup::Found)
    }
}

impl<T> From<Result<Option<T>, ScraperError>> for Lookup<T> {
    fn from(value: Result<Option<T>, ScraperError>) -> Self {
        match value {
            Ok(inner) => inner.into(),
            Err(err) => Lookup::Error(err.to_string()),
        }
    }
}

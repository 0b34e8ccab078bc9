//! Error types

use std::fmt;

/// A required dependency was not supplied when building a [`Dispatcher`](crate::Dispatcher).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfigurationError {
    missing: &'static str,
}

/// A required argument of a dispatcher operation was absent or blank.
///
/// The queues are left untouched when this is returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationError {
    argument: &'static str,
}

/// An error produced when the search push worker has shut down and can no longer accept
/// operations.
#[derive(Debug)]
pub struct Closed {
    _p: (),
}

// ===== impl ConfigurationError =====

impl ConfigurationError {
    pub(crate) fn missing(missing: &'static str) -> Self {
        Self { missing }
    }

    /// Name of the configuration entry that was not supplied.
    pub fn name(&self) -> &'static str {
        self.missing
    }
}

impl fmt::Display for ConfigurationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "missing required configuration `{}`", self.missing)
    }
}

impl std::error::Error for ConfigurationError {}

// ===== impl ValidationError =====

impl ValidationError {
    pub(crate) fn missing(argument: &'static str) -> Self {
        Self { argument }
    }

    /// Name of the offending argument.
    pub fn argument(&self) -> &'static str {
        self.argument
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "missing required argument `{}`", self.argument)
    }
}

impl std::error::Error for ValidationError {}

// ===== impl Closed =====

impl Closed {
    pub(crate) fn new() -> Self {
        Closed { _p: () }
    }
}

impl fmt::Display for Closed {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt.write_str("search push worker closed unexpectedly")
    }
}

impl std::error::Error for Closed {}

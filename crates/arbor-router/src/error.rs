use std::fmt;

use arbor_core::ReconcileError;

/// A route path that cannot be compiled into a matcher.
#[derive(Debug, Clone)]
pub enum RouteError {
    InvalidPattern { pattern: String, reason: String },
}

impl fmt::Display for RouteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteError::InvalidPattern { pattern, reason } => {
                write!(f, "invalid route pattern `{pattern}`: {reason}")
            }
        }
    }
}

impl std::error::Error for RouteError {}

#[derive(Debug, Clone)]
pub enum RouterError {
    Route(RouteError),
    Render(ReconcileError),
}

impl fmt::Display for RouterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouterError::Route(err) => write!(f, "{err}"),
            RouterError::Render(err) => write!(f, "route render failed: {err}"),
        }
    }
}

impl std::error::Error for RouterError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RouterError::Route(err) => Some(err),
            RouterError::Render(err) => Some(err),
        }
    }
}

impl From<RouteError> for RouterError {
    fn from(err: RouteError) -> Self {
        RouterError::Route(err)
    }
}

impl From<ReconcileError> for RouterError {
    fn from(err: ReconcileError) -> Self {
        RouterError::Render(err)
    }
}

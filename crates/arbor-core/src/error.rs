use std::fmt;

use crate::host::HostError;

/// A component failed to produce its node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderError {
    component: Option<&'static str>,
    message: String,
}

impl RenderError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            component: None,
            message: message.into(),
        }
    }

    /// Attributes the error to `component` unless an inner component already claimed it.
    pub fn in_component(mut self, component: &'static str) -> Self {
        self.component.get_or_insert(component);
        self
    }

    pub fn component(&self) -> Option<&'static str> {
        self.component
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.component {
            Some(name) => write!(f, "component `{name}` failed to render: {}", self.message),
            None => write!(f, "render failed: {}", self.message),
        }
    }
}

impl std::error::Error for RenderError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileError {
    Render(RenderError),
    Host(HostError),
}

impl fmt::Display for ReconcileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReconcileError::Render(err) => write!(f, "{err}"),
            ReconcileError::Host(err) => write!(f, "host mutation failed: {err}"),
        }
    }
}

impl std::error::Error for ReconcileError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ReconcileError::Render(err) => Some(err),
            ReconcileError::Host(err) => Some(err),
        }
    }
}

impl From<RenderError> for ReconcileError {
    fn from(err: RenderError) -> Self {
        ReconcileError::Render(err)
    }
}

impl From<HostError> for ReconcileError {
    fn from(err: HostError) -> Self {
        ReconcileError::Host(err)
    }
}

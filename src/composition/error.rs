//! Diagnostics raised while deriving textures from documents

use std::fmt;

/// How serious a diagnostic is. Neither level stops the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Recoverable error: a safe default was substituted
    Error,
    /// Suspicious input that was handled
    Warning,
}

/// A diagnostic generated while compositing, slicing or rasterizing.
#[derive(Debug, Clone, PartialEq)]
pub struct Warning {
    pub severity: Severity,
    pub message: String,
}

impl Warning {
    pub fn new(message: impl Into<String>) -> Self {
        Self { severity: Severity::Warning, message: message.into() }
    }

    /// A recoverable error.
    pub fn error(message: impl Into<String>) -> Self {
        Self { severity: Severity::Error, message: message.into() }
    }

    /// Prefix the message with the document or asset it concerns.
    pub fn in_source(mut self, source: &str) -> Self {
        self.message = format!("{}: {}", source, self.message);
        self
    }

    /// Emit through the `log` facade at the matching level.
    pub fn log(&self) {
        match self.severity {
            Severity::Error => log::error!("{}", self.message),
            Severity::Warning => log::warn!("{}", self.message),
        }
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.severity {
            Severity::Error => write!(f, "error: {}", self.message),
            Severity::Warning => write!(f, "warning: {}", self.message),
        }
    }
}

//! Descriptor outputs.
//!
//! Every configuration's [`crate::models::BuildResult`] is merged into one
//! [`Descriptor`], which is then written by one or more exporters:
//!
//! - **Rust**: generated source with name enums, lookup functions and one
//!   module of constants per atlas (the primary output)
//! - **JSON**: the same data for tools not written in Rust

pub mod descriptor;
pub mod ident;
pub mod json;
pub mod rust;

pub use descriptor::Descriptor;
pub use json::JsonExporter;
pub use rust::RustExporter;

use std::path::Path;

/// Common error type for export operations.
#[derive(Debug)]
pub enum ExportError {
    /// IO error during file writing
    Io(std::io::Error),
    /// Serialization error
    Serialization(String),
}

impl std::fmt::Display for ExportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExportError::Io(e) => write!(f, "IO error: {}", e),
            ExportError::Serialization(e) => write!(f, "Serialization error: {}", e),
        }
    }
}

impl std::error::Error for ExportError {}

impl From<std::io::Error> for ExportError {
    fn from(e: std::io::Error) -> Self {
        ExportError::Io(e)
    }
}

impl From<serde_json::Error> for ExportError {
    fn from(e: serde_json::Error) -> Self {
        ExportError::Serialization(e.to_string())
    }
}

/// Result type alias for export operations.
pub type Result<T> = std::result::Result<T, ExportError>;

/// Options for export operations.
#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// Pretty print output (with indentation)
    pub pretty: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self { pretty: true }
    }
}

/// Trait for descriptor output formats.
pub trait Exporter {
    /// Write the descriptor to the specified path.
    fn export(&self, descriptor: &Descriptor, output_path: &Path, options: &ExportOptions) -> Result<()>;

    /// Get the format name for this exporter.
    fn format_name(&self) -> &'static str;

    /// Get the default file extension for this format.
    fn extension(&self) -> &'static str;
}

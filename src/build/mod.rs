//! Build pipeline module for atlasbake
//!
//! Turns the atlas configurations of a `bake.toml` into packed atlas images
//! and one descriptor describing all of them.
//!
//! # Overview
//!
//! The build pipeline consists of:
//! - **Discovery**: Find source files in each atlas's source directory
//! - **Derivation**: Composite documents, slice tilesets, rasterize glyphs
//! - **Assembly**: Pack, render and crop each atlas, then write the PNG
//! - **Emission**: Merge every atlas into the Rust (and JSON) descriptor
//!
//! # Example
//!
//! ```ignore
//! use atlasbake::build::{BuildContext, BuildPipeline};
//! use atlasbake::config::load_config;
//!
//! let (path, config) = load_config(None)?;
//! let context = BuildContext::new(config, path.parent().unwrap().to_path_buf());
//! let summary = BuildPipeline::new(context).build()?;
//! println!("{}", summary.summary());
//! ```

pub mod context;
pub mod discovery;
pub mod naming;
pub mod pipeline;
pub mod result;

pub use context::*;
pub use discovery::*;
pub use naming::*;
pub use pipeline::*;
pub use result::*;

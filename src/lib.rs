//! Atlasbake - offline asset baker for texture atlases
//!
//! This library provides functionality to:
//! - Decode layered Aseprite documents and composite their frames
//! - Slice tileset images and rasterize font glyphs
//! - Pack everything into one atlas image per configuration
//! - Emit a deterministic Rust (and optional JSON) descriptor of the result

pub mod aseprite;
pub mod atlas;
pub mod build;
pub mod cli;
pub mod composition;
pub mod config;
pub mod export;
pub mod glyph;
pub mod models;
pub mod output;
pub mod packer;
pub mod tileset;

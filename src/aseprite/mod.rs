//! Aseprite document model and decoder.
//!
//! The decoder is a pure structural decode of the chunked `.ase` format:
//! indexed pixels stay indices here and are resolved against the palette by
//! the compositor.
//!
//! Format reference: <https://github.com/aseprite/aseprite/blob/main/docs/ase-file-specs.md>

mod error;
mod parse;

pub use error::ParseError;
pub use parse::{parse_document, read_document};

use image::Rgba;
use serde::{Deserialize, Serialize};

/// Pixel storage of the whole document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorDepth {
    /// 32 bpp RGBA
    Rgba,
    /// 8 bpp palette indices
    Indexed,
}

impl ColorDepth {
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            ColorDepth::Rgba => 4,
            ColorDepth::Indexed => 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub width: u16,
    pub height: u16,
    pub color_depth: ColorDepth,
    /// Whether layer opacity values are meaningful
    pub layer_opacity_valid: bool,
    /// Palette index treated as transparent in indexed documents
    pub transparent_index: u8,
    pub num_colors: u16,
}

/// A decoded document: header plus frames in file order.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub header: Header,
    pub frames: Vec<Frame>,
}

impl Document {
    /// All layer declarations, in declaration order.
    pub fn layers(&self) -> impl Iterator<Item = &LayerChunk> {
        self.chunks().filter_map(|chunk| match chunk {
            Chunk::Layer(layer) => Some(layer),
            _ => None,
        })
    }

    /// All tag ranges across every tags chunk.
    pub fn tags(&self) -> impl Iterator<Item = &TagRange> {
        self.chunks()
            .filter_map(|chunk| match chunk {
                Chunk::Tags(tags) => Some(tags.iter()),
                _ => None,
            })
            .flatten()
    }

    /// Every chunk of every frame, in file order.
    pub fn chunks(&self) -> impl Iterator<Item = &Chunk> {
        self.frames.iter().flat_map(|f| f.chunks.iter())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub duration_ms: u16,
    pub chunks: Vec<Chunk>,
}

impl Frame {
    pub fn cels(&self) -> impl Iterator<Item = &CelChunk> {
        self.chunks.iter().filter_map(|chunk| match chunk {
            Chunk::Cel(cel) => Some(cel),
            _ => None,
        })
    }
}

/// One typed chunk of a frame.
#[derive(Debug, Clone, PartialEq)]
pub enum Chunk {
    Layer(LayerChunk),
    Cel(CelChunk),
    Tags(Vec<TagRange>),
    Palette(Palette),
    /// Pre-1.2 palette chunk (`0x0004`), consulted only without a new palette
    LegacyPalette(Palette),
    /// Any chunk type not needed by the pipeline
    Other { kind: u16 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerKind {
    Normal,
    Group,
    Tilemap,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerChunk {
    /// Position among all layer declarations of the document
    pub index: usize,
    pub visible: bool,
    /// Reference layers are editing aids and never exported
    pub reference: bool,
    pub kind: LayerKind,
    /// Nesting depth inside groups, 0 at the top level
    pub child_level: u16,
    pub opacity: u8,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CelChunk {
    pub layer_index: u16,
    pub x: i16,
    pub y: i16,
    pub opacity: u8,
    pub z_index: i16,
    pub content: CelContent,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CelContent {
    Image(CelImage),
    /// Shares the cel of the same layer in another frame
    Linked { frame: u16 },
    /// Tilemap cels are decoded but not exported
    Tilemap,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CelImage {
    pub width: u16,
    pub height: u16,
    pub pixels: CelPixels,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CelPixels {
    /// Four bytes per pixel, non-premultiplied
    Rgba(Vec<u8>),
    /// One palette index per pixel
    Indexed(Vec<u8>),
}

/// How an animation clip plays back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoopDirection {
    #[default]
    Forward,
    Reverse,
    PingPong,
    PingPongReverse,
}

impl LoopDirection {
    pub(crate) fn from_byte(value: u8) -> Self {
        match value {
            1 => LoopDirection::Reverse,
            2 => LoopDirection::PingPong,
            3 => LoopDirection::PingPongReverse,
            _ => LoopDirection::Forward,
        }
    }

    /// Variant name as it appears in generated code.
    pub fn as_str(&self) -> &'static str {
        match self {
            LoopDirection::Forward => "Forward",
            LoopDirection::Reverse => "Reverse",
            LoopDirection::PingPong => "PingPong",
            LoopDirection::PingPongReverse => "PingPongReverse",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagRange {
    pub name: String,
    pub from: u16,
    pub to: u16,
    pub direction: LoopDirection,
    /// 0 repeats forever
    pub repeat: u16,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Palette {
    pub colors: Vec<Rgba<u8>>,
}

impl Palette {
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    pub fn get(&self, index: u8) -> Option<Rgba<u8>> {
        self.colors.get(index as usize).copied()
    }
}

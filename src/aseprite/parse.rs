//! Binary decoder for the chunked document format.

use std::io::{self, Cursor, Read};
use std::path::Path;

use byteorder::{LittleEndian, ReadBytesExt};
use flate2::read::ZlibDecoder;
use image::Rgba;

use super::{
    CelChunk, CelContent, CelImage, CelPixels, Chunk, ColorDepth, Document, Frame, Header,
    LayerChunk, LayerKind, LoopDirection, Palette, ParseError, TagRange,
};

const HEADER_MAGIC: u16 = 0xA5E0;
const FRAME_MAGIC: u16 = 0xF1FA;
const HEADER_SIZE: usize = 128;
const FRAME_HEADER_SIZE: usize = 16;
const CHUNK_HEADER_SIZE: usize = 6;

const CHUNK_LEGACY_PALETTE: u16 = 0x0004;
const CHUNK_LAYER: u16 = 0x2004;
const CHUNK_CEL: u16 = 0x2005;
const CHUNK_TAGS: u16 = 0x2018;
const CHUNK_PALETTE: u16 = 0x2019;

const HEADER_FLAG_LAYER_OPACITY: u32 = 0x0001;
const LAYER_FLAG_VISIBLE: u16 = 0x0001;
const LAYER_FLAG_REFERENCE: u16 = 0x0040;
const PALETTE_ENTRY_HAS_NAME: u16 = 0x0001;

/// Largest palette the format can address with 16-bit indices.
const MAX_PALETTE_SIZE: u32 = 65536;

type Reader<'a> = Cursor<&'a [u8]>;

fn truncated(context: &'static str) -> impl Fn(io::Error) -> ParseError {
    move |_| ParseError::Truncated { context }
}

fn skip(reader: &mut Reader<'_>, count: u64) {
    reader.set_position(reader.position() + count);
}

fn read_string(reader: &mut Reader<'_>, context: &'static str) -> Result<String, ParseError> {
    let len = reader.read_u16::<LittleEndian>().map_err(truncated(context))?;
    let mut bytes = vec![0u8; len as usize];
    reader.read_exact(&mut bytes).map_err(truncated(context))?;
    String::from_utf8(bytes).map_err(|_| ParseError::malformed(context, "string is not valid UTF-8"))
}

/// Read and decode a document from disk.
pub fn read_document(path: &Path) -> Result<Document, ParseError> {
    let bytes = std::fs::read(path)?;
    parse_document(&bytes)
}

/// Decode a document from raw bytes.
///
/// Either the whole document decodes or an error is returned; no partial
/// model escapes.
pub fn parse_document(bytes: &[u8]) -> Result<Document, ParseError> {
    let header_bytes =
        bytes.get(..HEADER_SIZE).ok_or(ParseError::Truncated { context: "header" })?;
    let (header, frame_count) = parse_header(header_bytes)?;

    let mut frames = Vec::with_capacity(frame_count.min(1024));
    let mut offset = HEADER_SIZE;
    let mut layer_count = 0usize;
    for frame_index in 0..frame_count {
        let data = bytes.get(offset..).ok_or(ParseError::Truncated { context: "frame" })?;
        let (frame, size) = parse_frame(data, frame_index, &header, &mut layer_count)?;
        offset += size;
        frames.push(frame);
    }

    Ok(Document { header, frames })
}

fn parse_header(data: &[u8]) -> Result<(Header, usize), ParseError> {
    let mut r = Cursor::new(data);
    let t = truncated("header");

    let _file_size = r.read_u32::<LittleEndian>().map_err(&t)?;
    let magic = r.read_u16::<LittleEndian>().map_err(&t)?;
    if magic != HEADER_MAGIC {
        return Err(ParseError::BadMagic { found: magic });
    }
    let frame_count = r.read_u16::<LittleEndian>().map_err(&t)?;
    let width = r.read_u16::<LittleEndian>().map_err(&t)?;
    let height = r.read_u16::<LittleEndian>().map_err(&t)?;
    let color_depth = match r.read_u16::<LittleEndian>().map_err(&t)? {
        32 => ColorDepth::Rgba,
        8 => ColorDepth::Indexed,
        other => return Err(ParseError::UnsupportedColorDepth(other)),
    };
    let flags = r.read_u32::<LittleEndian>().map_err(&t)?;
    // deprecated speed + two reserved dwords
    skip(&mut r, 2 + 8);
    let transparent_index = r.read_u8().map_err(&t)?;
    skip(&mut r, 3);
    let num_colors = r.read_u16::<LittleEndian>().map_err(&t)?;

    let header = Header {
        width,
        height,
        color_depth,
        layer_opacity_valid: flags & HEADER_FLAG_LAYER_OPACITY != 0,
        transparent_index,
        num_colors,
    };
    Ok((header, frame_count as usize))
}

fn parse_frame(
    data: &[u8],
    frame_index: usize,
    header: &Header,
    layer_count: &mut usize,
) -> Result<(Frame, usize), ParseError> {
    let mut r = Cursor::new(data);
    let t = truncated("frame header");

    let frame_size = r.read_u32::<LittleEndian>().map_err(&t)? as usize;
    let magic = r.read_u16::<LittleEndian>().map_err(&t)?;
    if magic != FRAME_MAGIC {
        return Err(ParseError::BadFrameMagic { frame: frame_index, found: magic });
    }
    let old_chunk_count = r.read_u16::<LittleEndian>().map_err(&t)?;
    let duration_ms = r.read_u16::<LittleEndian>().map_err(&t)?;
    skip(&mut r, 2);
    let new_chunk_count = r.read_u32::<LittleEndian>().map_err(&t)?;
    let chunk_count =
        if new_chunk_count == 0 { old_chunk_count as usize } else { new_chunk_count as usize };

    if frame_size < FRAME_HEADER_SIZE {
        return Err(ParseError::malformed("frame header", format!("frame size {}", frame_size)));
    }
    let body = data
        .get(FRAME_HEADER_SIZE..frame_size)
        .ok_or(ParseError::Truncated { context: "frame" })?;

    let mut chunks = Vec::with_capacity(chunk_count.min(256));
    let mut pos = 0usize;
    for _ in 0..chunk_count {
        let chunk_header = body
            .get(pos..pos + CHUNK_HEADER_SIZE)
            .ok_or(ParseError::Truncated { context: "chunk header" })?;
        let size = u32::from_le_bytes([
            chunk_header[0],
            chunk_header[1],
            chunk_header[2],
            chunk_header[3],
        ]) as usize;
        let kind = u16::from_le_bytes([chunk_header[4], chunk_header[5]]);
        if size < CHUNK_HEADER_SIZE {
            return Err(ParseError::malformed("chunk header", format!("chunk size {}", size)));
        }
        let payload = body
            .get(pos + CHUNK_HEADER_SIZE..pos + size)
            .ok_or(ParseError::Truncated { context: "chunk" })?;
        chunks.push(parse_chunk(kind, payload, header, layer_count)?);
        pos += size;
    }

    Ok((Frame { duration_ms, chunks }, frame_size))
}

fn parse_chunk(
    kind: u16,
    payload: &[u8],
    header: &Header,
    layer_count: &mut usize,
) -> Result<Chunk, ParseError> {
    let chunk = match kind {
        CHUNK_LAYER => {
            let layer = parse_layer(payload, *layer_count)?;
            *layer_count += 1;
            Chunk::Layer(layer)
        }
        CHUNK_CEL => Chunk::Cel(parse_cel(payload, header.color_depth)?),
        CHUNK_TAGS => Chunk::Tags(parse_tags(payload)?),
        CHUNK_PALETTE => Chunk::Palette(parse_palette(payload)?),
        CHUNK_LEGACY_PALETTE => Chunk::LegacyPalette(parse_legacy_palette(payload)?),
        other => Chunk::Other { kind: other },
    };
    Ok(chunk)
}

fn parse_layer(payload: &[u8], index: usize) -> Result<LayerChunk, ParseError> {
    let mut r = Cursor::new(payload);
    let t = truncated("layer chunk");

    let flags = r.read_u16::<LittleEndian>().map_err(&t)?;
    let kind = match r.read_u16::<LittleEndian>().map_err(&t)? {
        0 => LayerKind::Normal,
        1 => LayerKind::Group,
        2 => LayerKind::Tilemap,
        other => {
            return Err(ParseError::malformed("layer chunk", format!("unknown layer type {}", other)))
        }
    };
    let child_level = r.read_u16::<LittleEndian>().map_err(&t)?;
    // default width/height and blend mode
    skip(&mut r, 6);
    let opacity = r.read_u8().map_err(&t)?;
    skip(&mut r, 3);
    let name = read_string(&mut r, "layer name")?;

    Ok(LayerChunk {
        index,
        visible: flags & LAYER_FLAG_VISIBLE != 0,
        reference: flags & LAYER_FLAG_REFERENCE != 0,
        kind,
        child_level,
        opacity,
        name,
    })
}

fn parse_cel(payload: &[u8], depth: ColorDepth) -> Result<CelChunk, ParseError> {
    let mut r = Cursor::new(payload);
    let t = truncated("cel chunk");

    let layer_index = r.read_u16::<LittleEndian>().map_err(&t)?;
    let x = r.read_i16::<LittleEndian>().map_err(&t)?;
    let y = r.read_i16::<LittleEndian>().map_err(&t)?;
    let opacity = r.read_u8().map_err(&t)?;
    let cel_type = r.read_u16::<LittleEndian>().map_err(&t)?;
    let z_index = r.read_i16::<LittleEndian>().map_err(&t)?;
    skip(&mut r, 5);

    let content = match cel_type {
        0 | 2 => {
            let width = r.read_u16::<LittleEndian>().map_err(&t)?;
            let height = r.read_u16::<LittleEndian>().map_err(&t)?;
            let expected = width as usize * height as usize * depth.bytes_per_pixel();
            let data = if cel_type == 0 {
                let start = r.position() as usize;
                let remaining = &payload[start.min(payload.len())..];
                if remaining.len() < expected {
                    return Err(ParseError::Truncated { context: "cel pixels" });
                }
                if remaining.len() > expected {
                    return Err(ParseError::malformed(
                        "cel pixels",
                        format!("expected {} bytes of pixel data, got {}", expected, remaining.len()),
                    ));
                }
                remaining.to_vec()
            } else {
                inflate_pixels(&payload[r.position() as usize..], expected, layer_index)?
            };
            let pixels = match depth {
                ColorDepth::Rgba => CelPixels::Rgba(data),
                ColorDepth::Indexed => CelPixels::Indexed(data),
            };
            CelContent::Image(CelImage { width, height, pixels })
        }
        1 => CelContent::Linked { frame: r.read_u16::<LittleEndian>().map_err(&t)? },
        3 => CelContent::Tilemap,
        other => {
            return Err(ParseError::malformed("cel chunk", format!("unknown cel type {}", other)))
        }
    };

    Ok(CelChunk { layer_index, x, y, opacity, z_index, content })
}

fn inflate_pixels(compressed: &[u8], expected: usize, layer: u16) -> Result<Vec<u8>, ParseError> {
    // Deflate expands at most 1032:1
    let mut data = Vec::with_capacity(expected.min(compressed.len().saturating_mul(1032)));
    // One byte past the expected size is enough to detect oversized streams
    ZlibDecoder::new(compressed)
        .take(expected as u64 + 1)
        .read_to_end(&mut data)
        .map_err(|source| ParseError::Decompress { layer, source })?;
    if data.len() != expected {
        return Err(ParseError::malformed(
            "cel pixels",
            format!("expected {} bytes of pixel data, got {}", expected, data.len()),
        ));
    }
    Ok(data)
}

fn parse_tags(payload: &[u8]) -> Result<Vec<TagRange>, ParseError> {
    let mut r = Cursor::new(payload);
    let t = truncated("tags chunk");

    let count = r.read_u16::<LittleEndian>().map_err(&t)?;
    skip(&mut r, 8);
    let mut tags = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let from = r.read_u16::<LittleEndian>().map_err(&t)?;
        let to = r.read_u16::<LittleEndian>().map_err(&t)?;
        let direction = LoopDirection::from_byte(r.read_u8().map_err(&t)?);
        let repeat = r.read_u16::<LittleEndian>().map_err(&t)?;
        // reserved, RGB color, extra byte
        skip(&mut r, 6 + 3 + 1);
        let name = read_string(&mut r, "tag name")?;
        if to < from {
            return Err(ParseError::malformed(
                "tags chunk",
                format!("tag '{}' ends at frame {} before it starts at {}", name, to, from),
            ));
        }
        tags.push(TagRange { name, from, to, direction, repeat });
    }
    Ok(tags)
}

fn parse_palette(payload: &[u8]) -> Result<Palette, ParseError> {
    let mut r = Cursor::new(payload);
    let t = truncated("palette chunk");

    let size = r.read_u32::<LittleEndian>().map_err(&t)?;
    let first = r.read_u32::<LittleEndian>().map_err(&t)?;
    let last = r.read_u32::<LittleEndian>().map_err(&t)?;
    skip(&mut r, 8);
    if size > MAX_PALETTE_SIZE || first > last || last >= size {
        return Err(ParseError::malformed(
            "palette chunk",
            format!("entries {}..={} do not fit a palette of {}", first, last, size),
        ));
    }

    let mut colors = vec![Rgba([0, 0, 0, 0]); size as usize];
    for index in first..=last {
        let flags = r.read_u16::<LittleEndian>().map_err(&t)?;
        let mut rgba = [0u8; 4];
        r.read_exact(&mut rgba).map_err(&t)?;
        if flags & PALETTE_ENTRY_HAS_NAME != 0 {
            read_string(&mut r, "palette entry name")?;
        }
        colors[index as usize] = Rgba(rgba);
    }
    Ok(Palette { colors })
}

fn parse_legacy_palette(payload: &[u8]) -> Result<Palette, ParseError> {
    let mut r = Cursor::new(payload);
    let t = truncated("legacy palette chunk");

    let packets = r.read_u16::<LittleEndian>().map_err(&t)?;
    let mut colors: Vec<Rgba<u8>> = Vec::new();
    let mut index = 0usize;
    for _ in 0..packets {
        index += r.read_u8().map_err(&t)? as usize;
        let count = match r.read_u8().map_err(&t)? {
            0 => 256,
            n => n as usize,
        };
        for _ in 0..count {
            let mut rgb = [0u8; 3];
            r.read_exact(&mut rgb).map_err(&t)?;
            if colors.len() <= index {
                colors.resize(index + 1, Rgba([0, 0, 0, 0]));
            }
            colors[index] = Rgba([rgb[0], rgb[1], rgb[2], 255]);
            index += 1;
        }
    }
    Ok(Palette { colors })
}

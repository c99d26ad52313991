//! Shared fixtures for the integration tests
//!
//! Builds Aseprite documents byte by byte so the tests do not depend on
//! binary files checked into the repository.

#![allow(dead_code)]

use std::fs;
use std::io::Write;
use std::path::Path;

use byteorder::{LittleEndian, WriteBytesExt};
use flate2::write::ZlibEncoder;
use flate2::Compression;
use image::{Rgba, RgbaImage};

const HEADER_MAGIC: u16 = 0xA5E0;
const FRAME_MAGIC: u16 = 0xF1FA;
const HEADER_SIZE: usize = 128;

const LAYER: u16 = 0x2004;
const CEL: u16 = 0x2005;
const TAGS: u16 = 0x2018;
const PALETTE: u16 = 0x2019;

pub const VISIBLE: u16 = 1;
pub const DEPTH_RGBA: u16 = 32;
pub const DEPTH_INDEXED: u16 = 8;

/// Loop direction bytes of the tags chunk.
pub const FORWARD: u8 = 0;
pub const REVERSE: u8 = 1;
pub const PING_PONG: u8 = 2;

fn string(out: &mut Vec<u8>, s: &str) {
    out.write_u16::<LittleEndian>(s.len() as u16).unwrap();
    out.extend_from_slice(s.as_bytes());
}

/// One chunk with its six-byte header.
pub fn chunk(kind: u16, payload: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    out.write_u32::<LittleEndian>(payload.len() as u32 + 6).unwrap();
    out.write_u16::<LittleEndian>(kind).unwrap();
    out.extend_from_slice(payload);
    out
}

/// Normal image layer at the root of the layer tree.
pub fn layer(name: &str) -> Vec<u8> {
    layer_with(VISIBLE, 0, 0, name)
}

pub fn hidden_layer(name: &str) -> Vec<u8> {
    layer_with(0, 0, 0, name)
}

pub fn layer_with(flags: u16, kind: u16, level: u16, name: &str) -> Vec<u8> {
    let mut p = Vec::new();
    p.write_u16::<LittleEndian>(flags).unwrap();
    p.write_u16::<LittleEndian>(kind).unwrap();
    p.write_u16::<LittleEndian>(level).unwrap();
    p.extend_from_slice(&[0; 6]);
    p.write_u8(255).unwrap();
    p.extend_from_slice(&[0; 3]);
    string(&mut p, name);
    chunk(LAYER, &p)
}

fn cel_prefix(p: &mut Vec<u8>, layer: u16, x: i16, y: i16, cel_type: u16) {
    p.write_u16::<LittleEndian>(layer).unwrap();
    p.write_i16::<LittleEndian>(x).unwrap();
    p.write_i16::<LittleEndian>(y).unwrap();
    p.write_u8(255).unwrap();
    p.write_u16::<LittleEndian>(cel_type).unwrap();
    p.write_i16::<LittleEndian>(0).unwrap();
    p.extend_from_slice(&[0; 5]);
}

/// Uncompressed cel; `pixels` holds 4 bytes per pixel for RGBA documents and
/// one palette index per pixel for indexed documents.
pub fn raw_cel(layer: u16, x: i16, y: i16, w: u16, h: u16, pixels: &[u8]) -> Vec<u8> {
    let mut p = Vec::new();
    cel_prefix(&mut p, layer, x, y, 0);
    p.write_u16::<LittleEndian>(w).unwrap();
    p.write_u16::<LittleEndian>(h).unwrap();
    p.extend_from_slice(pixels);
    chunk(CEL, &p)
}

/// Cel that reuses the pixels of the same layer in another frame.
pub fn linked_cel(layer: u16, x: i16, y: i16, frame: u16) -> Vec<u8> {
    let mut p = Vec::new();
    cel_prefix(&mut p, layer, x, y, 1);
    p.write_u16::<LittleEndian>(frame).unwrap();
    chunk(CEL, &p)
}

pub fn compressed_cel(layer: u16, x: i16, y: i16, w: u16, h: u16, pixels: &[u8]) -> Vec<u8> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(pixels).unwrap();
    let compressed = encoder.finish().unwrap();

    let mut p = Vec::new();
    cel_prefix(&mut p, layer, x, y, 2);
    p.write_u16::<LittleEndian>(w).unwrap();
    p.write_u16::<LittleEndian>(h).unwrap();
    p.extend_from_slice(&compressed);
    chunk(CEL, &p)
}

/// Solid RGBA cel of `w x h` pixels.
pub fn solid_cel(layer: u16, x: i16, y: i16, w: u16, h: u16, color: [u8; 4]) -> Vec<u8> {
    let pixels: Vec<u8> = (0..w as usize * h as usize).flat_map(|_| color).collect();
    raw_cel(layer, x, y, w, h, &pixels)
}

/// Tags chunk from `(name, from, to, direction, repeat)` entries.
pub fn tags(entries: &[(&str, u16, u16, u8, u16)]) -> Vec<u8> {
    let mut p = Vec::new();
    p.write_u16::<LittleEndian>(entries.len() as u16).unwrap();
    p.extend_from_slice(&[0; 8]);
    for (name, from, to, direction, repeat) in entries {
        p.write_u16::<LittleEndian>(*from).unwrap();
        p.write_u16::<LittleEndian>(*to).unwrap();
        p.write_u8(*direction).unwrap();
        p.write_u16::<LittleEndian>(*repeat).unwrap();
        p.extend_from_slice(&[0; 6]);
        p.extend_from_slice(&[0; 4]);
        string(&mut p, name);
    }
    chunk(TAGS, &p)
}

/// Palette chunk covering indices `0..colors.len()`.
pub fn palette(colors: &[[u8; 4]]) -> Vec<u8> {
    let mut p = Vec::new();
    p.write_u32::<LittleEndian>(colors.len() as u32).unwrap();
    p.write_u32::<LittleEndian>(0).unwrap();
    p.write_u32::<LittleEndian>(colors.len() as u32 - 1).unwrap();
    p.extend_from_slice(&[0; 8]);
    for color in colors {
        p.write_u16::<LittleEndian>(0).unwrap();
        p.extend_from_slice(color);
    }
    chunk(PALETTE, &p)
}

/// One frame holding the given chunks.
pub fn frame(duration: u16, chunks: &[Vec<u8>]) -> Vec<u8> {
    let body: Vec<u8> = chunks.concat();
    let mut out = Vec::new();
    out.write_u32::<LittleEndian>(body.len() as u32 + 16).unwrap();
    out.write_u16::<LittleEndian>(FRAME_MAGIC).unwrap();
    out.write_u16::<LittleEndian>(chunks.len() as u16).unwrap();
    out.write_u16::<LittleEndian>(duration).unwrap();
    out.extend_from_slice(&[0; 2]);
    out.write_u32::<LittleEndian>(chunks.len() as u32).unwrap();
    out.extend_from_slice(&body);
    out
}

/// Complete document with layer opacity enabled.
pub fn document(width: u16, height: u16, depth: u16, frames: &[Vec<u8>]) -> Vec<u8> {
    let body: Vec<u8> = frames.concat();
    let mut out = Vec::new();
    out.write_u32::<LittleEndian>((HEADER_SIZE + body.len()) as u32).unwrap();
    out.write_u16::<LittleEndian>(HEADER_MAGIC).unwrap();
    out.write_u16::<LittleEndian>(frames.len() as u16).unwrap();
    out.write_u16::<LittleEndian>(width).unwrap();
    out.write_u16::<LittleEndian>(height).unwrap();
    out.write_u16::<LittleEndian>(depth).unwrap();
    out.write_u32::<LittleEndian>(1).unwrap();
    out.resize(HEADER_SIZE, 0);
    out.extend_from_slice(&body);
    out
}

/// Write `bytes` to `root/relative`, creating parent directories.
pub fn write_file(root: &Path, relative: &str, bytes: &[u8]) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, bytes).unwrap();
}

pub fn write_png(root: &Path, relative: &str, image: &RgbaImage) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    image.save(path).unwrap();
}

/// `w x h` image with a single opaque block at `(x, y)`.
pub fn block_image(w: u32, h: u32, x: u32, y: u32, bw: u32, bh: u32, color: [u8; 4]) -> RgbaImage {
    let mut image = RgbaImage::new(w, h);
    for py in y..y + bh {
        for px in x..x + bw {
            image.put_pixel(px, py, Rgba(color));
        }
    }
    image
}

//! Tileset slicing - cutting a flattened image into a fixed grid

use image::RgbaImage;
use thiserror::Error;

use crate::models::{Tile, Tileset};

/// Error produced when a tileset image cannot be sliced.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TilesetError {
    #[error("Tile size must be greater than zero")]
    ZeroTileSize,
    #[error("Tileset '{name}' is {width}x{height}, not a multiple of the {tile_size}px tile size")]
    NotDivisible { name: String, width: u32, height: u32, tile_size: u32 },
}

/// Divide `image` into `tile_size` cells, keeping every cell that has at
/// least one pixel with non-zero alpha.
///
/// Tiles are recorded row by row, left to right.
pub fn slice_tileset(name: &str, image: RgbaImage, tile_size: u32) -> Result<Tileset, TilesetError> {
    if tile_size == 0 {
        return Err(TilesetError::ZeroTileSize);
    }
    let (width, height) = image.dimensions();
    if width % tile_size != 0 || height % tile_size != 0 {
        return Err(TilesetError::NotDivisible { name: name.to_string(), width, height, tile_size });
    }

    let columns = width / tile_size;
    let rows = height / tile_size;
    let mut tiles = Vec::new();
    for row in 0..rows {
        for column in 0..columns {
            if !cell_is_blank(&image, column * tile_size, row * tile_size, tile_size) {
                tiles.push(Tile { column, row, placed: None });
            }
        }
    }

    Ok(Tileset { name: name.to_string(), image, tile_size, columns, rows, tiles })
}

fn cell_is_blank(image: &RgbaImage, x0: u32, y0: u32, size: u32) -> bool {
    (y0..y0 + size).all(|y| (x0..x0 + size).all(|x| image.get_pixel(x, y)[3] == 0))
}

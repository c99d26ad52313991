//! Rectangle bin packing
//!
//! The packing orchestrator only sees the [`BinPacker`] trait, so the
//! heuristic can be swapped or stubbed without touching the pipeline.

/// A rectangle to place, identified by its index in the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PackRect {
    pub id: usize,
    pub w: u32,
    pub h: u32,
}

/// Where a rectangle was placed inside the bin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub id: usize,
    pub x: u32,
    pub y: u32,
}

/// Result of one packing call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackOutcome {
    /// Placed rectangles; never overlapping, always inside the bin
    pub placements: Vec<Placement>,
    /// Set when at least one rectangle could not be placed
    pub overflow: bool,
}

/// A bin packing heuristic.
pub trait BinPacker {
    /// Place `rects` inside a `bin_width` x `bin_height` bin.
    fn pack(&self, bin_width: u32, bin_height: u32, rects: &[PackRect]) -> PackOutcome;
}

/// A shelf in the shelf packing algorithm
#[derive(Debug)]
struct Shelf {
    y: u32,
    height: u32,
    width_used: u32,
}

/// Shelf packer: rectangles are sorted by height (tallest first) and placed
/// left to right into horizontal shelves.
///
/// Ties keep request order, so the result is deterministic.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShelfPacker;

impl BinPacker for ShelfPacker {
    fn pack(&self, bin_width: u32, bin_height: u32, rects: &[PackRect]) -> PackOutcome {
        let mut sorted: Vec<&PackRect> = rects.iter().collect();
        sorted.sort_by(|a, b| b.h.cmp(&a.h));

        let mut shelves = Vec::new();
        let mut outcome = PackOutcome::default();
        for rect in sorted {
            match try_place_in_shelves(&mut shelves, rect.w, rect.h, (bin_width, bin_height)) {
                Some((x, y)) => outcome.placements.push(Placement { id: rect.id, x, y }),
                None => outcome.overflow = true,
            }
        }
        outcome
    }
}

/// Try to place a rectangle in the given shelves
fn try_place_in_shelves(shelves: &mut Vec<Shelf>, w: u32, h: u32, bin: (u32, u32)) -> Option<(u32, u32)> {
    // Try to fit in existing shelf
    for shelf in shelves.iter_mut() {
        if h <= shelf.height && shelf.width_used + w <= bin.0 {
            let x = shelf.width_used;
            shelf.width_used += w;
            return Some((x, shelf.y));
        }
    }

    // Try to create new shelf
    let new_shelf_y = shelves.last().map(|s| s.y + s.height).unwrap_or(0);
    if new_shelf_y + h <= bin.1 && w <= bin.0 {
        shelves.push(Shelf { y: new_shelf_y, height: h, width_used: w });
        return Some((0, new_shelf_y));
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rects(sizes: &[(u32, u32)]) -> Vec<PackRect> {
        sizes.iter().enumerate().map(|(id, &(w, h))| PackRect { id, w, h }).collect()
    }

    fn overlaps(a: (&Placement, &PackRect), b: (&Placement, &PackRect)) -> bool {
        let (pa, ra) = a;
        let (pb, rb) = b;
        pa.x < pb.x + rb.w && pb.x < pa.x + ra.w && pa.y < pb.y + rb.h && pb.y < pa.y + ra.h
    }

    #[test]
    fn test_empty_request() {
        let outcome = ShelfPacker.pack(16, 16, &[]);
        assert!(outcome.placements.is_empty());
        assert!(!outcome.overflow);
    }

    #[test]
    fn test_tallest_first_on_shelves() {
        let request = rects(&[(4, 2), (4, 8), (4, 4)]);
        let outcome = ShelfPacker.pack(16, 16, &request);

        assert!(!outcome.overflow);
        assert_eq!(
            outcome.placements,
            vec![Placement { id: 1, x: 0, y: 0 }, Placement { id: 2, x: 4, y: 0 }, Placement { id: 0, x: 8, y: 0 }]
        );
    }

    #[test]
    fn test_wraps_to_new_shelf() {
        let request = rects(&[(6, 4), (6, 4), (6, 2)]);
        let outcome = ShelfPacker.pack(12, 12, &request);

        assert!(!outcome.overflow);
        let third = outcome.placements.iter().find(|p| p.id == 2).unwrap();
        assert_eq!((third.x, third.y), (0, 4));
    }

    #[test]
    fn test_overflow_places_only_what_fits() {
        // Combined area 4 * 64 exceeds the 8x8 bin
        let request = rects(&[(8, 8), (8, 8), (8, 8), (8, 8)]);
        let outcome = ShelfPacker.pack(8, 8, &request);

        assert!(outcome.overflow);
        assert_eq!(outcome.placements, vec![Placement { id: 0, x: 0, y: 0 }]);
    }

    #[test]
    fn test_overflow_keeps_valid_non_overlapping_placements() {
        let request = rects(&[(5, 5), (3, 3), (7, 2), (2, 9), (4, 4), (6, 6), (1, 1)]);
        let outcome = ShelfPacker.pack(10, 10, &request);

        assert!(outcome.overflow);
        for (i, a) in outcome.placements.iter().enumerate() {
            let ra = &request[a.id];
            assert!(a.x + ra.w <= 10 && a.y + ra.h <= 10);
            for b in &outcome.placements[i + 1..] {
                assert!(!overlaps((a, ra), (b, &request[b.id])), "{:?} overlaps {:?}", a, b);
            }
        }
    }

    #[test]
    fn test_too_wide_rect_overflows() {
        let outcome = ShelfPacker.pack(4, 4, &rects(&[(5, 1)]));
        assert!(outcome.overflow);
        assert!(outcome.placements.is_empty());
    }
}

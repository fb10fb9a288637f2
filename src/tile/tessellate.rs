//! Grid tessellation of one tile, in tile-local coordinates.
//!
//! Cells are emitted row by row, six vertices each, in the order
//! top-left, bottom-left, top-right, bottom-left, top-right, bottom-right.

use macroquad::prelude::*;

use crate::atlas::SubTextureRect;
use crate::vertex::{TileVertex, QUAD_VERTICES};

/// Largest grid a single tile may tessellate into. Larger requests fall back
/// to one quad.
pub const MAX_TILE_CELLS: usize = 1 << 18;

/// What a tile's slice will hold after the next rebuild.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Layout {
    /// One quad over the whole rectangle.
    Solid { sub: Option<SubTextureRect> },
    /// A grid of sub-texture copies, the last row/column clipped.
    Grid {
        sub: SubTextureRect,
        scale: Vec2,
        cell: Vec2,
        cells_x: usize,
        cells_y: usize,
    },
}

impl Layout {
    pub fn plan(size: Vec2, scale: Vec2, sub: Option<SubTextureRect>) -> Self {
        let Some(sub) = sub else {
            return Layout::Solid { sub: None };
        };
        if size.x <= 0.0 || size.y <= 0.0 {
            return Layout::Solid { sub: Some(sub) };
        }

        let cell = sub.size() * scale;
        if !(cell.x > 0.0 && cell.y > 0.0 && cell.is_finite()) {
            log::warn!("degenerate cell size {cell:?}, emitting a single quad");
            return Layout::Solid { sub: Some(sub) };
        }

        let cells_x = (size.x / cell.x).ceil();
        let cells_y = (size.y / cell.y).ceil();
        // Checked in f32 first so the casts below cannot saturate.
        if !(cells_x * cells_y <= MAX_TILE_CELLS as f32) {
            log::warn!("{cells_x}x{cells_y} cells exceed the per-tile cap, emitting a single quad");
            return Layout::Solid { sub: Some(sub) };
        }

        Layout::Grid {
            sub,
            scale,
            cell,
            cells_x: cells_x as usize,
            cells_y: cells_y as usize,
        }
    }

    /// One cell spanning the whole tile, independent of how `scale` rounded.
    pub fn stretched(size: Vec2, scale: Vec2, sub: SubTextureRect) -> Self {
        Layout::Grid {
            sub,
            scale,
            cell: size,
            cells_x: 1,
            cells_y: 1,
        }
    }

    pub fn vertex_count(&self) -> usize {
        match *self {
            Layout::Solid { .. } => QUAD_VERTICES,
            // `plan` keeps the product within MAX_TILE_CELLS.
            Layout::Grid {
                cells_x, cells_y, ..
            } => cells_x * cells_y * QUAD_VERTICES,
        }
    }

    /// Writes the layout into `out`, which must be exactly
    /// [`Layout::vertex_count`] long.
    pub fn write(&self, size: Vec2, out: &mut [TileVertex]) {
        debug_assert_eq!(out.len(), self.vertex_count());
        match *self {
            Layout::Solid { sub } => write_solid(size, sub, out),
            Layout::Grid {
                sub,
                scale,
                cell,
                cells_x,
                cells_y,
            } => write_grid(size, sub, scale, cell, cells_x, cells_y, out),
        }
    }
}

fn write_quad(out: &mut [TileVertex], min: Vec2, max: Vec2, uv_min: Vec2, uv_max: Vec2) {
    let top_left = TileVertex::new(min, uv_min);
    let bottom_left = TileVertex::new(vec2(min.x, max.y), vec2(uv_min.x, uv_max.y));
    let top_right = TileVertex::new(vec2(max.x, min.y), vec2(uv_max.x, uv_min.y));
    let bottom_right = TileVertex::new(max, uv_max);

    out[0] = top_left;
    out[1] = bottom_left;
    out[2] = top_right;
    out[3] = bottom_left;
    out[4] = top_right;
    out[5] = bottom_right;
}

fn write_solid(size: Vec2, sub: Option<SubTextureRect>, out: &mut [TileVertex]) {
    let (uv_min, uv_max) = match sub {
        Some(sub) => (sub.position(), sub.position() + sub.size()),
        None => (Vec2::ZERO, Vec2::ZERO),
    };
    write_quad(out, Vec2::ZERO, size, uv_min, uv_max);
}

fn write_grid(
    size: Vec2,
    sub: SubTextureRect,
    scale: Vec2,
    cell: Vec2,
    cells_x: usize,
    cells_y: usize,
    out: &mut [TileVertex],
) {
    let uv_min = sub.position();
    let mut quads = out.chunks_exact_mut(QUAD_VERTICES);

    for row in 0..cells_y {
        let y0 = row as f32 * cell.y;
        let (y1, v1) = if y0 + cell.y > size.y {
            (size.y, uv_min.y + (size.y - y0) / scale.y)
        } else {
            (y0 + cell.y, uv_min.y + sub.height)
        };

        for col in 0..cells_x {
            let x0 = col as f32 * cell.x;
            // Unclipped cells stop one texel short of the sub-texture edge so
            // the neighbouring atlas cell never bleeds in.
            let (x1, u1) = if x0 + cell.x > size.x {
                (size.x, uv_min.x + (size.x - x0) / scale.x)
            } else {
                (x0 + cell.x, uv_min.x + sub.width - 1.0)
            };

            if let Some(quad) = quads.next() {
                write_quad(quad, vec2(x0, y0), vec2(x1, y1), uv_min, vec2(u1, v1));
            }
        }
    }
}

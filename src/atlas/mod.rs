//! Sub-texture tables: named rectangles inside one shared atlas image.

mod rules;

use std::path::Path;

use macroquad::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::TileError;

pub use rules::parse_rules;

/// Region of the atlas, in source-image pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "[f32; 4]", into = "[f32; 4]")]
pub struct SubTextureRect {
    /// Left edge, in atlas pixels.
    pub left: f32,
    /// Top edge, in atlas pixels.
    pub top: f32,
    /// Width, in atlas pixels.
    pub width: f32,
    /// Height, in atlas pixels.
    pub height: f32,
}

impl SubTextureRect {
    /// A rect from its edges and size.
    pub const fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Top-left corner.
    #[inline]
    pub fn position(&self) -> Vec2 {
        vec2(self.left, self.top)
    }

    /// Width and height.
    #[inline]
    pub fn size(&self) -> Vec2 {
        vec2(self.width, self.height)
    }
}

impl From<[f32; 4]> for SubTextureRect {
    fn from([left, top, width, height]: [f32; 4]) -> Self {
        Self::new(left, top, width, height)
    }
}

impl From<SubTextureRect> for [f32; 4] {
    fn from(r: SubTextureRect) -> Self {
        [r.left, r.top, r.width, r.height]
    }
}

/// Ordered sub-texture rectangles; the position in the table is the index
/// tiles refer to.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubTextureTable {
    rects: Vec<SubTextureRect>,
}

impl SubTextureTable {
    /// An empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// A table of the given rects, in index order.
    pub fn from_rects(rects: Vec<SubTextureRect>) -> Self {
        Self { rects }
    }

    /// Splits a texture of `texture_size` into `count` equal vertical strips,
    /// left to right, each spanning the full height.
    pub fn uniform(texture_size: Vec2, count: usize) -> Self {
        if count == 0 {
            return Self::default();
        }
        let width = texture_size.x / count as f32;
        let rects = (0..count)
            .map(|i| SubTextureRect::new(width * i as f32, 0.0, width, texture_size.y))
            .collect();
        Self { rects }
    }

    /// Reads a `left,top,width,height` rules file.
    pub fn load_rules(path: impl AsRef<Path>) -> Result<Self, TileError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| TileError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let table = parse_rules(&text)?;
        if table.is_empty() {
            return Err(TileError::EmptyRules {
                path: path.to_path_buf(),
            });
        }
        log::debug!("loaded {} sub-textures from {}", table.len(), path.display());
        Ok(table)
    }

    /// Parses a JSON array of `[left, top, width, height]` records.
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Reads a JSON array of `[left, top, width, height]` records.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, TileError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| TileError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let table = Self::from_json_str(&text).map_err(|source| TileError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        log::debug!("loaded {} sub-textures from {}", table.len(), path.display());
        Ok(table)
    }

    /// The rect at `index`.
    pub fn get(&self, index: usize) -> Result<SubTextureRect, TileError> {
        self.rects
            .get(index)
            .copied()
            .ok_or(TileError::SubTextureOutOfRange {
                index,
                len: self.rects.len(),
            })
    }

    /// Number of sub-textures.
    pub fn len(&self) -> usize {
        self.rects.len()
    }

    /// Whether the collection is empty.
    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }

    /// Rects in index order.
    pub fn iter(&self) -> impl Iterator<Item = &SubTextureRect> {
        self.rects.iter()
    }

    /// Rects as a slice.
    pub fn as_slice(&self) -> &[SubTextureRect] {
        &self.rects
    }
}

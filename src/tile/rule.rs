use macroquad::prelude::*;
use serde::{Deserialize, Serialize};

/// How resizing and rescaling trade tile size against texture zoom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextureRule {
    /// The texture repeats inside the tile; scaling only grows the tile.
    #[default]
    RepeatTexture,
    /// Height drives one uniform factor for both axes.
    #[serde(alias = "height_first")]
    KeepHeight,
    /// Width drives one uniform factor for both axes.
    #[serde(alias = "width_first")]
    KeepWidth,
    /// The tile never changes size; scaling only zooms the texture.
    KeepSize,
    /// Size and zoom follow the request independently per axis.
    AdjustableSize,
    /// One copy of the sub-texture is stretched over the whole tile.
    FillSpace,
}

impl TextureRule {
    /// Applies a zoom `factor` to `(size, scale)` and returns the new pair.
    ///
    /// The factor multiplies the current state; it is not an absolute scale.
    pub fn rescale(self, size: Vec2, scale: Vec2, factor: Vec2) -> (Vec2, Vec2) {
        match self {
            TextureRule::RepeatTexture | TextureRule::FillSpace => (size * factor, scale),
            TextureRule::KeepHeight => (size * factor.y, scale * factor.y),
            TextureRule::KeepWidth => (size * factor.x, scale * factor.x),
            TextureRule::KeepSize => (size, scale * factor),
            TextureRule::AdjustableSize => (size * factor, scale * factor),
        }
    }

    /// Applies a requested tile size to `(size, scale)` and returns the new pair.
    pub fn resize(self, size: Vec2, scale: Vec2, requested: Vec2) -> (Vec2, Vec2) {
        match self {
            TextureRule::RepeatTexture | TextureRule::AdjustableSize | TextureRule::FillSpace => {
                (requested, scale)
            }
            // A zero dimension has no ratio to follow; take the request as is.
            TextureRule::KeepHeight if size.y == 0.0 => (requested, scale),
            TextureRule::KeepWidth if size.x == 0.0 => (requested, scale),
            TextureRule::KeepHeight => {
                let factor = requested.y / size.y;
                (size * factor, scale * factor)
            }
            TextureRule::KeepWidth => {
                let factor = requested.x / size.x;
                (size * factor, scale * factor)
            }
            TextureRule::KeepSize => (size, scale),
        }
    }
}

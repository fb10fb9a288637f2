use std::ops::{Deref, DerefMut};

use crate::texture::AtlasTexture;
use crate::tileset::TileSet;

/// Open batch on a [`TileSet`], from [`TileSet::batch`].
///
/// Derefs to the set, so every set method is available while it lives.
/// Mutations through it do not rebuild the render meshes; the outermost
/// guard does that once when dropped.
pub struct TileBatch<'a, T: AtlasTexture> {
    set: &'a mut TileSet<T>,
}

impl<'a, T: AtlasTexture> TileBatch<'a, T> {
    pub(crate) fn new(set: &'a mut TileSet<T>) -> Self {
        set.batch_depth += 1;
        Self { set }
    }
}

impl<T: AtlasTexture> Deref for TileBatch<'_, T> {
    type Target = TileSet<T>;

    fn deref(&self) -> &TileSet<T> {
        self.set
    }
}

impl<T: AtlasTexture> DerefMut for TileBatch<'_, T> {
    fn deref_mut(&mut self) -> &mut TileSet<T> {
        self.set
    }
}

impl<T: AtlasTexture> Drop for TileBatch<'_, T> {
    fn drop(&mut self) {
        self.set.batch_depth -= 1;
        if self.set.batch_depth == 0 {
            self.set.flush();
        }
    }
}

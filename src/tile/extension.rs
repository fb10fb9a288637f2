use std::any::Any;
use std::fmt;

use super::Tile;
use crate::vertex::TileVertex;

/// Extra per-tile state carried alongside the geometry.
///
/// Any `Clone + Debug + 'static` type can implement this; cloning and
/// downcasting come from [`ExtensionObject`] automatically.
pub trait TileExtension: ExtensionObject + fmt::Debug {
    /// Short name of the tile kind, for logs and debugging.
    fn kind(&self) -> &'static str;

    /// Post-processes the tile's finished vertices. Runs after every full
    /// rebuild and every recolor, so it must be repeatable.
    fn decorate(&self, _tile: &Tile, _vertices: &mut [TileVertex]) {}
}

/// Object-safe plumbing for [`TileExtension`].
pub trait ExtensionObject {
    /// Boxed copy of the payload.
    fn clone_boxed(&self) -> Box<dyn TileExtension>;
    /// For downcasting.
    fn as_any(&self) -> &dyn Any;
    /// For mutable downcasting.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: TileExtension + Clone + 'static> ExtensionObject for T {
    fn clone_boxed(&self) -> Box<dyn TileExtension> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

impl Clone for Box<dyn TileExtension> {
    fn clone(&self) -> Self {
        (**self).clone_boxed()
    }
}

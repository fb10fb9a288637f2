//! Shared vertex storage for every tile of a set.
//!
//! All tiles live in one flat `Vec<TileVertex>`. Slot `i` owns the contiguous
//! range `offsets[i]..offsets[i + 1]` (or up to the end of the buffer for the
//! last slot). Growing or shrinking one slot shifts every later slot in place
//! and patches their offsets, so the buffer never fragments.

use std::ops::Range;

use crate::error::TileError;
use crate::vertex::{TileVertex, QUAD_VERTICES};

/// Stable reference to one slot of a [`VertexArena`].
///
/// Handles stay valid across splices. They go stale when the arena is cleared
/// or a slot is removed, since both renumber the slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SliceHandle {
    slot: usize,
    generation: u32,
}

impl SliceHandle {
    /// Index of the slot in the offset table.
    #[inline]
    pub fn slot(self) -> usize {
        self.slot
    }

    /// Arena generation the handle was issued in.
    #[inline]
    pub fn generation(self) -> u32 {
        self.generation
    }
}

/// One flat vertex buffer shared by every tile, plus the offset of each
/// tile's slice in it.
#[derive(Debug, Clone, Default)]
pub struct VertexArena {
    vertices: Vec<TileVertex>,
    offsets: Vec<usize>,
    generation: u32,
}

impl VertexArena {
    /// An empty arena.
    pub fn new() -> Self {
        Self::default()
    }

    /// The whole buffer, in slot order.
    pub fn vertices(&self) -> &[TileVertex] {
        &self.vertices
    }

    /// First vertex index of every slot.
    pub fn offsets(&self) -> &[usize] {
        &self.offsets
    }

    /// Total vertices across all slots.
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    /// Whether the buffer holds no vertices.
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Number of slots, one per tile.
    pub fn slot_count(&self) -> usize {
        self.offsets.len()
    }

    /// Bumped whenever slots are renumbered.
    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// Appends a new slot of `count` default vertices at the end of the buffer.
    pub fn push_slice(&mut self, count: usize) -> SliceHandle {
        let slot = self.offsets.len();
        self.offsets.push(self.vertices.len());
        self.vertices
            .resize(self.vertices.len() + count, TileVertex::default());
        SliceHandle {
            slot,
            generation: self.generation,
        }
    }

    /// Current handle for `slot`, if it exists.
    pub fn handle(&self, slot: usize) -> Option<SliceHandle> {
        (slot < self.offsets.len()).then_some(SliceHandle {
            slot,
            generation: self.generation,
        })
    }

    fn check(&self, handle: SliceHandle) -> Result<usize, TileError> {
        if handle.generation != self.generation || handle.slot >= self.offsets.len() {
            return Err(TileError::StaleSlice {
                slot: handle.slot,
                generation: handle.generation,
            });
        }
        Ok(handle.slot)
    }

    fn range_of(&self, slot: usize) -> Range<usize> {
        let start = self.offsets[slot];
        let end = self
            .offsets
            .get(slot + 1)
            .copied()
            .unwrap_or(self.vertices.len());
        start..end
    }

    /// Buffer range owned by `handle`.
    pub fn range(&self, handle: SliceHandle) -> Result<Range<usize>, TileError> {
        let slot = self.check(handle)?;
        Ok(self.range_of(slot))
    }

    /// Vertex count of one slot.
    pub fn slice_len(&self, handle: SliceHandle) -> Result<usize, TileError> {
        Ok(self.range(handle)?.len())
    }

    /// Vertices of one slot.
    pub fn slice(&self, handle: SliceHandle) -> Result<&[TileVertex], TileError> {
        let range = self.range(handle)?;
        Ok(&self.vertices[range])
    }

    /// Mutable vertices of one slot.
    pub fn slice_mut(&mut self, handle: SliceHandle) -> Result<&mut [TileVertex], TileError> {
        let range = self.range(handle)?;
        Ok(&mut self.vertices[range])
    }

    /// Resizes one slot to `new_count` vertices, shifting every later slot.
    ///
    /// The first `min(old, new)` vertices of the slot keep their contents;
    /// newly reserved vertices are defaulted. Later slots keep their contents
    /// and move by `new_count - old_count`.
    pub fn resize_slice(&mut self, handle: SliceHandle, new_count: usize) -> Result<(), TileError> {
        let slot = self.check(handle)?;
        let range = self.range_of(slot);
        let old_count = range.len();
        if new_count == old_count {
            return Ok(());
        }

        log::trace!("splicing slot {slot}: {old_count} -> {new_count} vertices");

        let tail = range.end;
        let old_len = self.vertices.len();

        if new_count > old_count {
            let delta = new_count - old_count;
            self.vertices.resize(old_len + delta, TileVertex::default());
            // Overlapping move; copy_within handles the direction.
            self.vertices.copy_within(tail..old_len, tail + delta);
            self.vertices[tail..tail + delta].fill(TileVertex::default());
            for offset in &mut self.offsets[slot + 1..] {
                *offset += delta;
            }
        } else {
            let delta = old_count - new_count;
            self.vertices.copy_within(tail..old_len, tail - delta);
            self.vertices.truncate(old_len - delta);
            for offset in &mut self.offsets[slot + 1..] {
                *offset -= delta;
            }
        }
        Ok(())
    }

    /// Drops a slot entirely. Every outstanding handle goes stale; fetch new
    /// ones with [`VertexArena::handle`].
    pub fn remove_slice(&mut self, handle: SliceHandle) -> Result<(), TileError> {
        self.resize_slice(handle, 0)?;
        self.offsets.remove(handle.slot);
        self.generation = self.generation.wrapping_add(1);
        Ok(())
    }

    /// Drops every slot and vertex. Every outstanding handle goes stale.
    pub fn clear(&mut self) {
        self.vertices.clear();
        self.offsets.clear();
        self.generation = self.generation.wrapping_add(1);
    }

    /// Verifies the layout: offsets start at zero, never decrease, stay inside
    /// the buffer, and every slot holds whole quads.
    pub fn check_invariants(&self) -> Result<(), String> {
        if let Some(&first) = self.offsets.first() {
            if first != 0 {
                return Err(format!("first offset is {first}, expected 0"));
            }
        } else if !self.vertices.is_empty() {
            return Err(format!("{} vertices but no slots", self.vertices.len()));
        }

        let mut total = 0;
        for slot in 0..self.offsets.len() {
            let start = self.offsets[slot];
            let end = self
                .offsets
                .get(slot + 1)
                .copied()
                .unwrap_or(self.vertices.len());
            if end < start || end > self.vertices.len() {
                return Err(format!("slot {slot} has invalid range {start}..{end}"));
            }
            let count = end - start;
            if count % QUAD_VERTICES != 0 {
                return Err(format!("slot {slot} holds {count} vertices, not whole quads"));
            }
            total += count;
        }

        if total != self.vertices.len() {
            return Err(format!(
                "slots cover {total} vertices, buffer holds {}",
                self.vertices.len()
            ));
        }
        Ok(())
    }
}

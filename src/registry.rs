//! Position-keyed light storage.

use indexmap::IndexMap;

use crate::grid::Position;
use crate::radiance::Radiance;

/// Lights keyed by the cell they sit in, one per cell, in insertion order.
#[derive(Debug, Clone, Default)]
pub struct LightRegistry {
    lights: IndexMap<Position, Radiance>,
}

impl LightRegistry {
    pub fn new() -> Self {
        LightRegistry {
            lights: IndexMap::with_capacity(32),
        }
    }

    /// Insert `light` at `pos`, replacing (and returning) whatever was there.
    pub fn add(&mut self, pos: Position, light: Radiance) -> Option<Radiance> {
        self.lights.insert(pos, light)
    }

    /// O(n): later lights shift down so blend order stays insertion order.
    pub fn remove(&mut self, pos: Position) -> Option<Radiance> {
        self.lights.shift_remove(&pos)
    }

    /// Move the light at `from` to `to`, keeping the same descriptor (and so the same
    /// flicker pattern) and its place in iteration order. A light already at `to` is
    /// dropped. Returns `false` if there was nothing at `from`.
    pub fn relocate(&mut self, from: Position, to: Position) -> bool {
        if from == to {
            return self.lights.contains_key(&from);
        }
        let Some(mut index) = self.lights.get_index_of(&from) else {
            return false;
        };
        if let Some(existing) = self.lights.get_index_of(&to) {
            self.lights.shift_remove_index(existing);
            if existing < index {
                index -= 1;
            }
        }
        if let Some((_, light)) = self.lights.shift_remove_index(index) {
            self.lights.shift_insert(index, to, light);
        }
        true
    }

    pub fn get(&self, pos: Position) -> Option<&Radiance> {
        self.lights.get(&pos)
    }

    /// Mutable access, for the owner to adjust [`Radiance::flare`].
    pub fn get_mut(&mut self, pos: Position) -> Option<&mut Radiance> {
        self.lights.get_mut(&pos)
    }

    pub fn contains(&self, pos: Position) -> bool {
        self.lights.contains_key(&pos)
    }

    pub fn len(&self) -> usize {
        self.lights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lights.is_empty()
    }

    pub fn clear(&mut self) {
        self.lights.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (Position, &Radiance)> {
        self.lights.iter().map(|(&pos, light)| (pos, light))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (Position, &mut Radiance)> {
        self.lights.iter_mut().map(|(&pos, light)| (pos, light))
    }

    /// Largest nominal range of any light, or `0.0` when empty.
    pub fn max_range(&self) -> f32 {
        self.lights.values().map(Radiance::range).fold(0.0, f32::max)
    }
}

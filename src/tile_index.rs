//! Sparse mapping from tile-id to a (vertex-slot base, capacity) pair.

use crate::error::GraphError;
use crate::growable::ensure_index;

const TILE_SLOT_SIZE: usize = 5;
const INDEX_GROWTH: usize = 1024;
const MAX_CAPACITY_BITS: u8 = 31;

pub(crate) enum TileLookup {
    NotLoaded,
    Found { base: u32, capacity: u32 },
}

/// Byte-addressed index from `tileId` to `(basePtr, capacityBitsExp)`. An absent tile is
/// five consecutive `0xFF` bytes.
pub(crate) struct TileIndex {
    bytes: Vec<u8>,
    vertex_pointer_high: u32,
}

impl TileIndex {
    pub fn new() -> Self {
        Self {
            bytes: Vec::new(),
            vertex_pointer_high: 0,
        }
    }

    pub fn vertex_pointer_high(&self) -> u32 {
        self.vertex_pointer_high
    }

    fn offset(tile_id: u32) -> usize {
        tile_id as usize * TILE_SLOT_SIZE
    }

    pub fn find(&self, tile_id: u32) -> TileLookup {
        let off = Self::offset(tile_id);
        if off + TILE_SLOT_SIZE > self.bytes.len() {
            return TileLookup::NotLoaded;
        }
        let record = &self.bytes[off..off + TILE_SLOT_SIZE];
        if record.iter().all(|&b| b == 0xFF) {
            return TileLookup::NotLoaded;
        }
        let base = u32::from_le_bytes([record[0], record[1], record[2], record[3]]);
        let capacity = 1u32 << record[4];
        TileLookup::Found { base, capacity }
    }

    /// Allocate a fresh one-slot range for a tile seen for the first time.
    pub fn add(&mut self, tile_id: u32) -> Result<(u32, u32), GraphError> {
        let off = Self::offset(tile_id);
        ensure_index(&mut self.bytes, off + TILE_SLOT_SIZE - 1, INDEX_GROWTH, 0xFF);
        let base = self.vertex_pointer_high;
        self.write_record(tile_id, base, 0);
        self.vertex_pointer_high = self
            .vertex_pointer_high
            .checked_add(1)
            .ok_or_else(|| GraphError::CapacityExceeded("vertex pointer high overflow".into()))?;
        log::debug!("tile {tile_id} allocated at base {base} (capacity 1)");
        Ok((base, 1))
    }

    /// Double a tile's capacity, relocating it to a fresh high-water range. The old
    /// range is abandoned; the caller is responsible for copying live data forward.
    pub fn grow(&mut self, tile_id: u32, old_capacity: u32) -> Result<(u32, u32), GraphError> {
        let off = Self::offset(tile_id);
        let old_bits = self.bytes[off + 4];
        let new_bits = old_bits.checked_add(1).filter(|&b| b <= MAX_CAPACITY_BITS).ok_or_else(|| {
            GraphError::CapacityExceeded(format!(
                "tile {tile_id} capacity would exceed 2^{MAX_CAPACITY_BITS}"
            ))
        })?;
        let advance = old_capacity
            .checked_mul(2)
            .ok_or_else(|| GraphError::CapacityExceeded("tile capacity overflow".into()))?;
        let new_base = self.vertex_pointer_high;
        self.vertex_pointer_high = self
            .vertex_pointer_high
            .checked_add(advance)
            .ok_or_else(|| GraphError::CapacityExceeded("vertex pointer high overflow".into()))?;
        self.write_record(tile_id, new_base, new_bits);
        let new_capacity = 1u32 << new_bits;
        log::debug!("tile {tile_id} grown to capacity {new_capacity} at base {new_base}");
        Ok((new_base, new_capacity))
    }

    fn write_record(&mut self, tile_id: u32, base: u32, capacity_bits: u8) {
        let off = Self::offset(tile_id);
        let b = base.to_le_bytes();
        self.bytes[off..off + 4].copy_from_slice(&b);
        self.bytes[off + 4] = capacity_bits;
    }

    pub(crate) fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub(crate) fn from_parts(bytes: Vec<u8>, vertex_pointer_high: u32) -> Self {
        Self {
            bytes,
            vertex_pointer_high,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_tile_reports_not_loaded() {
        let idx = TileIndex::new();
        assert!(matches!(idx.find(42), TileLookup::NotLoaded));
    }

    #[test]
    fn add_then_find_round_trips() {
        let mut idx = TileIndex::new();
        let (base, cap) = idx.add(7).unwrap();
        assert_eq!((base, cap), (0, 1));
        match idx.find(7) {
            TileLookup::Found { base, capacity } => assert_eq!((base, capacity), (0, 1)),
            TileLookup::NotLoaded => panic!("expected tile to be found"),
        }
    }

    #[test]
    fn grow_doubles_capacity_and_advances_high_water_mark() {
        let mut idx = TileIndex::new();
        idx.add(1).unwrap();
        let (new_base, new_cap) = idx.grow(1, 1).unwrap();
        assert_eq!(new_cap, 2);
        assert_eq!(new_base, 1);
        assert_eq!(idx.vertex_pointer_high(), 3);
        let (new_base2, new_cap2) = idx.grow(1, 2).unwrap();
        assert_eq!(new_cap2, 4);
        assert_eq!(new_base2, 3);
        assert_eq!(idx.vertex_pointer_high(), 7);
    }
}

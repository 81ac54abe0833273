//! Packed intra-tile coordinates plus the parallel first-edge-pointer array.

use geo_types::Coord;

use crate::growable::ensure_index;
use crate::projection::{Tile, RESOLUTION};
use crate::tile_index::{TileIndex, TileLookup};
use crate::vertex::VertexId;

/// Slot is empty; no vertex has ever been written there.
pub(crate) const NO_VERTEX: u32 = u32::MAX;
/// Slot holds a vertex, but it has no incident edges yet.
pub(crate) const NO_EDGES: u32 = NO_VERTEX - 1;

const SLOT_GROWTH: usize = 1024;
const COORD_BYTES: usize = 3;

pub(crate) struct VertexStore {
    vertices: Vec<u8>,
    edge_pointers: Vec<u32>,
}

impl VertexStore {
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            edge_pointers: Vec::new(),
        }
    }

    fn ensure_slots(&mut self, last_slot: u32) {
        let last_slot = last_slot as usize;
        ensure_index(&mut self.edge_pointers, last_slot, SLOT_GROWTH, NO_VERTEX);
        ensure_index(
            &mut self.vertices,
            last_slot * COORD_BYTES + (COORD_BYTES - 1),
            SLOT_GROWTH * COORD_BYTES,
            0xFF,
        );
    }

    pub fn edge_pointer(&self, slot: usize) -> u32 {
        self.edge_pointers[slot]
    }

    pub fn set_edge_pointer(&mut self, slot: usize, value: u32) {
        self.edge_pointers[slot] = value;
    }

    fn write_coord(&mut self, slot: u32, ix: u32, iy: u32) {
        let packed = (ix << 12) | iy;
        let off = slot as usize * COORD_BYTES;
        self.vertices[off] = (packed & 0xFF) as u8;
        self.vertices[off + 1] = ((packed >> 8) & 0xFF) as u8;
        self.vertices[off + 2] = ((packed >> 16) & 0xFF) as u8;
    }

    fn read_coord(&self, slot: usize) -> Option<(u32, u32)> {
        let off = slot * COORD_BYTES;
        let bytes = &self.vertices[off..off + COORD_BYTES];
        if bytes.iter().all(|&b| b == 0xFF) {
            return None;
        }
        let packed = bytes[0] as u32 | (bytes[1] as u32) << 8 | (bytes[2] as u32) << 16;
        let iy = packed & 0xFFF;
        let ix = (packed >> 12) & 0xFFF;
        Some((ix, iy))
    }

    /// Resolve a `VertexId` to its absolute slot, `None` if the tile, local id, or the
    /// slot itself does not currently hold a vertex.
    pub fn slot_of(&self, tile_index: &TileIndex, v: VertexId) -> Option<usize> {
        let (base, capacity) = match tile_index.find(v.tile_id) {
            TileLookup::Found { base, capacity } => (base, capacity),
            TileLookup::NotLoaded => return None,
        };
        if v.local_id >= capacity {
            return None;
        }
        let slot = (base + v.local_id) as usize;
        if slot >= self.edge_pointers.len() || self.edge_pointers[slot] == NO_VERTEX {
            return None;
        }
        Some(slot)
    }

    pub fn try_get(&self, tile_index: &TileIndex, zoom: u8, v: VertexId) -> Option<Coord<f64>> {
        let slot = self.slot_of(tile_index, v)?;
        let (ix, iy) = self.read_coord(slot)?;
        let tile = Tile::from_local_id(v.tile_id, zoom);
        Some(tile.from_local_coordinates(ix, iy, RESOLUTION))
    }

    pub fn add_vertex(
        &mut self,
        tile_index: &mut TileIndex,
        zoom: u8,
        lon: f64,
        lat: f64,
    ) -> Result<VertexId, crate::error::GraphError> {
        let tile = Tile::world_to_tile(lon, lat, zoom);
        let tile_id = tile.local_id();

        let (mut base, mut capacity) = match tile_index.find(tile_id) {
            TileLookup::Found { base, capacity } => (base, capacity),
            TileLookup::NotLoaded => tile_index.add(tile_id)?,
        };

        self.ensure_slots(base + capacity - 1);

        let mut chosen: Option<u32> = None;
        let mut p = base + capacity - 1;
        while self.edge_pointers[p as usize] == NO_VERTEX {
            chosen = Some(p);
            if p == base {
                break;
            }
            p -= 1;
        }

        let slot = match chosen {
            Some(s) => s,
            None => {
                let old_capacity = capacity;
                let (new_base, new_capacity) = tile_index.grow(tile_id, old_capacity)?;
                self.ensure_slots(new_base + new_capacity - 1);
                for offset in 0..old_capacity {
                    let old_slot = (base + offset) as usize;
                    let new_slot = (new_base + offset) as usize;
                    self.edge_pointers[new_slot] = self.edge_pointers[old_slot];
                    let off_old = old_slot * COORD_BYTES;
                    let off_new = new_slot * COORD_BYTES;
                    let bytes = [
                        self.vertices[off_old],
                        self.vertices[off_old + 1],
                        self.vertices[off_old + 2],
                    ];
                    self.vertices[off_new..off_new + COORD_BYTES].copy_from_slice(&bytes);
                }
                base = new_base;
                capacity = new_capacity;
                new_base + old_capacity
            }
        };
        let _ = capacity;

        let (ix, iy) = tile.to_local_coordinates(lon, lat, RESOLUTION);
        self.edge_pointers[slot as usize] = NO_EDGES;
        self.write_coord(slot, ix, iy);

        log::trace!("added vertex at tile {tile_id}, slot {slot}");
        Ok(VertexId::new(tile_id, slot - base))
    }

    pub(crate) fn vertices_bytes(&self) -> &[u8] {
        &self.vertices
    }

    pub(crate) fn edge_pointers_slice(&self) -> &[u32] {
        &self.edge_pointers
    }

    pub(crate) fn from_parts(vertices: Vec<u8>, edge_pointers: Vec<u32>) -> Self {
        Self {
            vertices,
            edge_pointers,
        }
    }
}

//! Append-only byte arena of fixed-width edge records, each threading two intrusive
//! linked lists (one per endpoint) through its `prev1`/`prev2` fields.

use crate::error::GraphError;
use crate::growable::ensure_index;
use crate::vertex::VertexId;
use crate::vertex_store::{VertexStore, NO_EDGES};
use crate::tile_index::TileIndex;

const RECORD_HEADER_SIZE: usize = 24;
const ARENA_EDGE_GROWTH: usize = 1024;

pub(crate) struct EdgeArena {
    bytes: Vec<u8>,
    edge_pointer_high: u32,
    edge_size: usize,
}

impl EdgeArena {
    pub fn new(edge_data_size: usize) -> Self {
        Self {
            bytes: Vec::new(),
            edge_pointer_high: 0,
            edge_size: RECORD_HEADER_SIZE + edge_data_size,
        }
    }

    pub fn edge_pointer_high(&self) -> u32 {
        self.edge_pointer_high
    }

    pub fn edge_size(&self) -> usize {
        self.edge_size
    }

    fn ensure_capacity(&mut self, edge_id: u32) {
        let last_byte = (edge_id as usize + 1) * self.edge_size - 1;
        ensure_index(&mut self.bytes, last_byte, ARENA_EDGE_GROWTH * self.edge_size, 0xFF);
    }

    fn write_u32(&mut self, off: usize, value: u32) {
        self.bytes[off..off + 4].copy_from_slice(&value.to_le_bytes());
    }

    fn read_u32(&self, off: usize) -> u32 {
        u32::from_le_bytes(self.bytes[off..off + 4].try_into().unwrap())
    }

    #[allow(clippy::too_many_arguments)]
    pub fn add_edge(
        &mut self,
        vertex_store: &mut VertexStore,
        tile_index: &TileIndex,
        v1: VertexId,
        v2: VertexId,
        payload: Option<&[u8]>,
        edge_data_size: usize,
    ) -> Result<u32, GraphError> {
        let slot1 = vertex_store
            .slot_of(tile_index, v1)
            .ok_or(GraphError::VertexDoesNotExist(v1))?;
        let slot2 = vertex_store
            .slot_of(tile_index, v2)
            .ok_or(GraphError::VertexDoesNotExist(v2))?;

        if let Some(p) = payload {
            if p.len() > edge_data_size {
                return Err(GraphError::PayloadTooLarge {
                    actual: p.len(),
                    max: edge_data_size,
                });
            }
        }

        let prev1 = vertex_store.edge_pointer(slot1);
        let prev2 = vertex_store.edge_pointer(slot2);

        if self.edge_pointer_high == NO_EDGES {
            return Err(GraphError::CapacityExceeded(
                "edge count exceeds the addressable u32 range".into(),
            ));
        }
        let edge_id = self.edge_pointer_high;
        self.ensure_capacity(edge_id);

        let off = edge_id as usize * self.edge_size;
        self.write_u32(off, v1.tile_id);
        self.write_u32(off + 4, v1.local_id);
        self.write_u32(off + 8, v2.tile_id);
        self.write_u32(off + 12, v2.local_id);
        self.write_u32(off + 16, if prev1 == NO_EDGES { 0 } else { prev1 + 1 });
        self.write_u32(off + 20, if prev2 == NO_EDGES { 0 } else { prev2 + 1 });

        let payload_off = off + RECORD_HEADER_SIZE;
        let payload_end = payload_off + edge_data_size;
        match payload {
            Some(p) => {
                self.bytes[payload_off..payload_off + p.len()].copy_from_slice(p);
                for b in &mut self.bytes[payload_off + p.len()..payload_end] {
                    *b = 0xFF;
                }
            }
            None => {
                for b in &mut self.bytes[payload_off..payload_end] {
                    *b = 0xFF;
                }
            }
        }

        vertex_store.set_edge_pointer(slot1, edge_id);
        vertex_store.set_edge_pointer(slot2, edge_id);

        self.edge_pointer_high += 1;
        log::trace!("added edge {edge_id} between {v1:?} and {v2:?}");
        Ok(edge_id)
    }

    pub(crate) fn record(&self, edge_id: u32) -> EdgeRecordView<'_> {
        EdgeRecordView {
            arena: self,
            off: edge_id as usize * self.edge_size,
        }
    }

    pub(crate) fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub(crate) fn from_parts(bytes: Vec<u8>, edge_pointer_high: u32, edge_size: usize) -> Self {
        Self {
            bytes,
            edge_pointer_high,
            edge_size,
        }
    }
}

pub(crate) struct EdgeRecordView<'a> {
    arena: &'a EdgeArena,
    off: usize,
}

impl<'a> EdgeRecordView<'a> {
    pub fn v1(&self) -> VertexId {
        VertexId::new(self.arena.read_u32(self.off), self.arena.read_u32(self.off + 4))
    }

    pub fn v2(&self) -> VertexId {
        VertexId::new(
            self.arena.read_u32(self.off + 8),
            self.arena.read_u32(self.off + 12),
        )
    }

    pub fn prev1(&self) -> u32 {
        self.arena.read_u32(self.off + 16)
    }

    pub fn prev2(&self) -> u32 {
        self.arena.read_u32(self.off + 20)
    }

    pub fn payload(&self) -> &'a [u8] {
        let start = self.off + RECORD_HEADER_SIZE;
        let end = self.off + self.arena.edge_size;
        &self.arena.bytes[start..end]
    }
}

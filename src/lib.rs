//! Storage core of a tiled routing graph.
//!
//! Georeferenced vertices and the edges connecting them live in contiguous byte
//! arenas, bucketed by web-mercator tile. The graph supports adding vertices and
//! edges and streaming an endpoint's incident edges through [`EdgeEnumerator`], but
//! never deletes or relocates anything once written — higher layers (shortest-path
//! search, map-matching, contraction hierarchies) build on top of this.

pub mod config;
pub mod error;
pub mod projection;
pub mod vertex;

mod edge_arena;
mod enumerator;
mod growable;
mod serializer;
mod shape_store;
mod tile_index;
mod vertex_store;

use std::io::{Read, Write};

use geo_types::Coord;

pub use config::GraphConfig;
pub use enumerator::EdgeEnumerator;
pub use error::GraphError;
pub use projection::{Tile, RESOLUTION};
pub use vertex::VertexId;

use edge_arena::EdgeArena;
use shape_store::ShapeStore;
use tile_index::TileIndex;
use vertex_store::VertexStore;

/// Sentinel for an empty vertex slot.
pub const NO_VERTEX: u32 = vertex_store::NO_VERTEX;
/// Sentinel for a vertex slot that exists but has no incident edges.
pub const NO_EDGES: u32 = vertex_store::NO_EDGES;

/// The tiled routing graph: vertices, edges, and the indices that connect them.
pub struct Graph {
    pub(crate) config: GraphConfig,
    pub(crate) tile_index: TileIndex,
    pub(crate) vertex_store: VertexStore,
    pub(crate) edge_arena: EdgeArena,
    pub(crate) shape_store: ShapeStore,
}

impl Graph {
    pub fn new(config: GraphConfig) -> Self {
        let edge_arena = EdgeArena::new(config.edge_data_size as usize);
        Self {
            config,
            tile_index: TileIndex::new(),
            vertex_store: VertexStore::new(),
            edge_arena,
            shape_store: ShapeStore::new(),
        }
    }

    /// Construct with the default zoom (14) and no edge payload.
    pub fn with_defaults() -> Self {
        Self::new(GraphConfig::default())
    }

    pub fn zoom(&self) -> u8 {
        self.config.zoom
    }

    pub fn edge_data_size(&self) -> u8 {
        self.config.edge_data_size
    }

    /// Number of vertex slots allocated so far (the high-water mark, not the live count
    /// — growth tombstones old ranges rather than reclaiming them).
    pub fn vertex_slot_count(&self) -> u32 {
        self.tile_index.vertex_pointer_high()
    }

    /// Number of edges appended so far.
    pub fn edge_count(&self) -> u32 {
        self.edge_arena.edge_pointer_high()
    }

    /// Project `(lon, lat)` into its tile, allocate a vertex slot, and return its id.
    pub fn add_vertex(&mut self, lon: f64, lat: f64) -> Result<VertexId, GraphError> {
        self.vertex_store
            .add_vertex(&mut self.tile_index, self.config.zoom, lon, lat)
    }

    /// Look up a vertex's coordinate, `None` if it does not exist.
    pub fn try_get_vertex(&self, v: VertexId) -> Option<Coord<f64>> {
        self.vertex_store.try_get(&self.tile_index, self.config.zoom, v)
    }

    /// Strict variant of [`Graph::try_get_vertex`].
    pub fn get_vertex(&self, v: VertexId) -> Result<Coord<f64>, GraphError> {
        self.try_get_vertex(v).ok_or(GraphError::VertexDoesNotExist(v))
    }

    /// Append an edge between `v1` and `v2`, splicing it into both endpoints'
    /// linked lists. Fails if either endpoint does not resolve to a live vertex.
    pub fn add_edge(
        &mut self,
        v1: VertexId,
        v2: VertexId,
        payload: Option<&[u8]>,
        shape: Option<Vec<Coord<f64>>>,
    ) -> Result<u32, GraphError> {
        let edge_id = self.edge_arena.add_edge(
            &mut self.vertex_store,
            &self.tile_index,
            v1,
            v2,
            payload,
            self.config.edge_data_size as usize,
        )?;
        if let Some(shape) = shape {
            self.shape_store.set(edge_id, shape);
        }
        Ok(edge_id)
    }

    /// A cursor for walking incident edges, starting unpositioned; call
    /// [`EdgeEnumerator::move_to`] or [`EdgeEnumerator::move_to_edge`] before
    /// [`EdgeEnumerator::move_next`].
    pub fn enumerator(&self) -> EdgeEnumerator<'_> {
        EdgeEnumerator::new(self)
    }

    /// Serialise the whole graph to `writer`, returning the number of bytes written.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<u64, GraphError> {
        serializer::write_to(self, writer)
    }

    /// Deserialise a graph previously written by [`Graph::write_to`].
    pub fn read_from<R: Read>(reader: &mut R) -> Result<Graph, GraphError> {
        serializer::read_from(reader)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph() -> Graph {
        Graph::with_defaults()
    }

    #[test]
    fn scenario_simple_edge_enumerates_both_directions() {
        let mut g = graph();
        let a = g.add_vertex(4.8, 51.26).unwrap();
        let b = g.add_vertex(4.81, 51.27).unwrap();
        let e = g.add_edge(a, b, None, None).unwrap();
        assert_eq!(e, 0);

        let mut en = g.enumerator();
        en.move_to(a);
        assert!(en.move_next());
        assert_eq!(en.to(), b);
        assert!(en.forward());
        assert_eq!(en.edge_id(), Some(0));
        assert!(!en.move_next());

        en.move_to(b);
        assert!(en.move_next());
        assert_eq!(en.to(), a);
        assert!(!en.forward());
        assert!(!en.move_next());
    }

    #[test]
    fn scenario_third_vertex_sees_both_neighbours() {
        let mut g = graph();
        let a = g.add_vertex(4.8, 51.26).unwrap();
        let b = g.add_vertex(4.81, 51.27).unwrap();
        let c = g.add_vertex(4.82, 51.28).unwrap();
        g.add_edge(a, c, None, None).unwrap();
        g.add_edge(b, c, None, None).unwrap();

        let mut en = g.enumerator();
        en.move_to(c);
        let mut seen = std::collections::HashSet::new();
        while en.move_next() {
            seen.insert(en.to());
        }
        assert_eq!(seen, [a, b].into_iter().collect());
    }

    #[test]
    fn scenario_tile_growth_preserves_prior_vertices() {
        let _ = env_logger::builder().is_test(true).try_init();
        let mut g = graph();
        let mut ids = Vec::new();
        for _ in 0..5 {
            ids.push(g.add_vertex(4.8, 51.26).unwrap());
            for id in &ids {
                assert!(g.try_get_vertex(*id).is_some());
            }
        }
    }

    #[test]
    fn scenario_self_loop_enumerated_twice() {
        let mut g = graph();
        let a = g.add_vertex(4.8, 51.26).unwrap();
        g.add_edge(a, a, None, None).unwrap();

        let mut en = g.enumerator();
        en.move_to(a);
        assert!(en.move_next());
        assert_eq!(en.to(), a);
        let first_forward = en.forward();
        assert!(en.move_next());
        assert_eq!(en.to(), a);
        assert_ne!(first_forward, en.forward());
        assert!(!en.move_next());
    }

    #[test]
    fn scenario_add_edge_with_bogus_endpoint_fails() {
        let mut g = graph();
        let a = g.add_vertex(4.8, 51.26).unwrap();
        let bogus = VertexId::new(a.tile_id, 9999);
        let err = g.add_edge(a, bogus, None, None).unwrap_err();
        assert!(matches!(err, GraphError::VertexDoesNotExist(_)));
    }

    #[test]
    fn round_trip_preserves_vertices_and_edges() {
        let _ = env_logger::builder().is_test(true).try_init();
        let mut g = Graph::new(GraphConfig::new(14, 8).unwrap());
        let mut ids = Vec::new();
        for i in 0..50u32 {
            let lon = -10.0 + (i as f64) * 0.3;
            let lat = 40.0 + (i as f64) * 0.2;
            ids.push(g.add_vertex(lon, lat).unwrap());
        }
        for i in 0..ids.len() - 1 {
            let payload = (i as u64).to_le_bytes();
            g.add_edge(ids[i], ids[i + 1], Some(&payload), None).unwrap();
        }

        let mut buf = Vec::new();
        g.write_to(&mut buf).unwrap();
        let g2 = Graph::read_from(&mut std::io::Cursor::new(buf)).unwrap();

        assert_eq!(g2.zoom(), g.zoom());
        assert_eq!(g2.edge_count(), g.edge_count());
        for id in &ids {
            assert_eq!(g2.try_get_vertex(*id), g.try_get_vertex(*id));
        }

        for id in &ids {
            let mut e1 = g.enumerator();
            let mut e2 = g2.enumerator();
            e1.move_to(*id);
            e2.move_to(*id);
            loop {
                let a = e1.move_next();
                let b = e2.move_next();
                assert_eq!(a, b);
                if !a {
                    break;
                }
                assert_eq!(e1.to(), e2.to());
                assert_eq!(e1.forward(), e2.forward());
            }
        }
    }

    #[test]
    fn shape_round_trips_and_reverses_on_backward_view() {
        let _ = env_logger::builder().is_test(true).try_init();
        let mut g = Graph::with_defaults();
        let a = g.add_vertex(4.80, 51.26).unwrap();
        let b = g.add_vertex(4.81, 51.27).unwrap();
        let shape = vec![
            Coord { x: 4.80, y: 51.26 },
            Coord { x: 4.805, y: 51.265 },
            Coord { x: 4.81, y: 51.27 },
        ];
        g.add_edge(a, b, None, Some(shape.clone())).unwrap();

        let mut forward = g.enumerator();
        forward.move_to(a);
        assert!(forward.move_next());
        assert!(forward.forward());
        assert_eq!(forward.shape(), Some(shape.clone()));

        let mut backward = g.enumerator();
        backward.move_to(b);
        assert!(backward.move_next());
        assert!(!backward.forward());
        let reversed: Vec<Coord<f64>> = shape.iter().rev().cloned().collect();
        assert_eq!(backward.shape(), Some(reversed.clone()));

        let mut buf = Vec::new();
        g.write_to(&mut buf).unwrap();
        let g2 = Graph::read_from(&mut std::io::Cursor::new(buf)).unwrap();

        let mut forward2 = g2.enumerator();
        forward2.move_to(a);
        assert!(forward2.move_next());
        assert_eq!(forward2.shape(), Some(shape));

        let mut backward2 = g2.enumerator();
        backward2.move_to(b);
        assert!(backward2.move_next());
        assert_eq!(backward2.shape(), Some(reversed));
    }

    #[test]
    fn rejects_mismatched_header_on_read() {
        let mut buf = Vec::new();
        buf.extend_from_slice(&4u32.to_le_bytes());
        buf.extend_from_slice(b"Nope");
        let err = Graph::read_from(&mut std::io::Cursor::new(buf)).unwrap_err();
        assert!(matches!(err, GraphError::FormatError { .. }));
    }
}

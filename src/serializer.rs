//! Length-prefixed stream format for the whole graph.

use std::io::{Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use geo_types::Coord;

use crate::config::GraphConfig;
use crate::edge_arena::EdgeArena;
use crate::error::GraphError;
use crate::shape_store::ShapeStore;
use crate::tile_index::TileIndex;
use crate::vertex_store::VertexStore;
use crate::Graph;

const HEADER: &str = "Graph";
const VERSION: u8 = 1;
const TILE_SIZE_IN_INDEX: u8 = 5;
const COORDINATE_SIZE_IN_BYTES: u8 = 3;

fn write_string<W: Write>(w: &mut W, s: &str) -> Result<(), GraphError> {
    w.write_u32::<LittleEndian>(s.len() as u32)?;
    w.write_all(s.as_bytes())?;
    Ok(())
}

fn read_string<R: Read>(r: &mut R) -> Result<String, GraphError> {
    let len = r.read_u32::<LittleEndian>()? as usize;
    let mut buf = vec![0u8; len];
    r.read_exact(&mut buf)?;
    String::from_utf8(buf).map_err(|_| GraphError::FormatError {
        field: "header",
        found: "<invalid utf-8>".to_string(),
    })
}

fn write_sized_bytes<W: Write>(w: &mut W, bytes: &[u8]) -> Result<(), GraphError> {
    w.write_u64::<LittleEndian>(bytes.len() as u64)?;
    w.write_all(bytes)?;
    Ok(())
}

fn read_sized_bytes<R: Read>(r: &mut R) -> Result<Vec<u8>, GraphError> {
    let len = r.read_u64::<LittleEndian>()? as usize;
    let mut buf = vec![0u8; len];
    r.read_exact(&mut buf)?;
    Ok(buf)
}

fn write_u32_array<W: Write>(w: &mut W, values: &[u32]) -> Result<(), GraphError> {
    w.write_u64::<LittleEndian>(values.len() as u64)?;
    for &v in values {
        w.write_u32::<LittleEndian>(v)?;
    }
    Ok(())
}

fn read_u32_array<R: Read>(r: &mut R) -> Result<Vec<u32>, GraphError> {
    let len = r.read_u64::<LittleEndian>()? as usize;
    let mut out = Vec::with_capacity(len);
    for _ in 0..len {
        out.push(r.read_u32::<LittleEndian>()?);
    }
    Ok(out)
}

fn write_shapes<W: Write>(w: &mut W, shapes: &ShapeStore) -> Result<(), GraphError> {
    w.write_i64::<LittleEndian>(shapes.len() as i64)?;
    for i in 0..shapes.len() {
        match shapes.get_raw(i) {
            Some(coords) => {
                w.write_u8(1)?;
                w.write_u32::<LittleEndian>(coords.len() as u32)?;
                for c in coords {
                    w.write_f64::<LittleEndian>(c.x)?;
                    w.write_f64::<LittleEndian>(c.y)?;
                }
            }
            None => w.write_u8(0)?,
        }
    }
    Ok(())
}

fn read_shapes<R: Read>(r: &mut R) -> Result<ShapeStore, GraphError> {
    let count = r.read_i64::<LittleEndian>()?;
    if count < 0 {
        return Err(GraphError::FormatError {
            field: "shapeCount",
            found: count.to_string(),
        });
    }
    let mut slots = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let present = r.read_u8()?;
        if present == 0 {
            slots.push(None);
            continue;
        }
        let point_count = r.read_u32::<LittleEndian>()? as usize;
        let mut coords = Vec::with_capacity(point_count);
        for _ in 0..point_count {
            let x = r.read_f64::<LittleEndian>()?;
            let y = r.read_f64::<LittleEndian>()?;
            coords.push(Coord { x, y });
        }
        slots.push(Some(coords));
    }
    Ok(ShapeStore::from_slots(slots))
}

pub(crate) fn write_to<W: Write>(graph: &Graph, w: &mut W) -> Result<u64, GraphError> {
    let mut counted = CountingWriter { inner: w, count: 0 };

    write_string(&mut counted, HEADER)?;
    counted.write_u8(VERSION)?;
    counted.write_u8(graph.config.zoom)?;
    counted.write_u8(graph.config.edge_data_size)?;
    counted.write_u8(TILE_SIZE_IN_INDEX)?;
    write_sized_bytes(&mut counted, graph.tile_index.as_bytes())?;
    counted.write_u8(COORDINATE_SIZE_IN_BYTES)?;
    counted.write_i64::<LittleEndian>(graph.tile_index.vertex_pointer_high() as i64)?;
    write_sized_bytes(&mut counted, graph.vertex_store.vertices_bytes())?;
    write_u32_array(&mut counted, graph.vertex_store.edge_pointers_slice())?;
    counted.write_i64::<LittleEndian>(graph.edge_arena.edge_pointer_high() as i64)?;
    write_sized_bytes(&mut counted, graph.edge_arena.as_bytes())?;
    write_shapes(&mut counted, &graph.shape_store)?;

    Ok(counted.count)
}

pub(crate) fn read_from<R: Read>(r: &mut R) -> Result<Graph, GraphError> {
    let header = read_string(r)?;
    if header != HEADER {
        return Err(GraphError::FormatError {
            field: "header",
            found: header,
        });
    }
    let version = r.read_u8()?;
    if version != VERSION {
        return Err(GraphError::FormatError {
            field: "version",
            found: version.to_string(),
        });
    }
    let zoom = r.read_u8()?;
    let edge_data_size = r.read_u8()?;
    let tile_size_in_index = r.read_u8()?;
    if tile_size_in_index != TILE_SIZE_IN_INDEX {
        return Err(GraphError::FormatError {
            field: "tileSizeInIndex",
            found: tile_size_in_index.to_string(),
        });
    }
    let tile_index_bytes = read_sized_bytes(r)?;
    let coordinate_size = r.read_u8()?;
    if coordinate_size != COORDINATE_SIZE_IN_BYTES {
        return Err(GraphError::FormatError {
            field: "coordinateSizeInBytes",
            found: coordinate_size.to_string(),
        });
    }
    let vertex_pointer_high = r.read_i64::<LittleEndian>()?;
    let vertices_bytes = read_sized_bytes(r)?;
    let edge_pointers = read_u32_array(r)?;
    let edge_pointer_high = r.read_i64::<LittleEndian>()?;
    let edges_bytes = read_sized_bytes(r)?;
    let shape_store = read_shapes(r)?;

    let config = GraphConfig::new(zoom, edge_data_size)?;
    let tile_index = TileIndex::from_parts(tile_index_bytes, vertex_pointer_high as u32);
    let vertex_store = VertexStore::from_parts(vertices_bytes, edge_pointers);
    let edge_arena = EdgeArena::from_parts(edges_bytes, edge_pointer_high as u32, config.edge_size());

    Ok(Graph {
        config,
        tile_index,
        vertex_store,
        edge_arena,
        shape_store,
    })
}

/// Thin wrapper so `write_to` can report the exact byte count written, the way the
/// public `WriteTo(stream) -> byteCount` contract expects.
struct CountingWriter<'w, W: Write> {
    inner: &'w mut W,
    count: u64,
}

impl<'w, W: Write> Write for CountingWriter<'w, W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let n = self.inner.write(buf)?;
        self.count += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}

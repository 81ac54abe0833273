//! Per-edge optional polyline, stored densely in a parallel array indexed by edge-id.

use geo_types::Coord;

use crate::growable::ensure_index;

const SHAPE_GROWTH: usize = 1024;

pub(crate) struct ShapeStore {
    shapes: Vec<Option<Vec<Coord<f64>>>>,
}

impl ShapeStore {
    pub fn new() -> Self {
        Self { shapes: Vec::new() }
    }

    pub fn set(&mut self, edge_id: u32, shape: Vec<Coord<f64>>) {
        ensure_index(&mut self.shapes, edge_id as usize, SHAPE_GROWTH, None);
        self.shapes[edge_id as usize] = Some(shape);
    }

    pub fn get(&self, edge_id: u32) -> Option<&Vec<Coord<f64>>> {
        self.shapes.get(edge_id as usize).and_then(|s| s.as_ref())
    }

    pub(crate) fn len(&self) -> usize {
        self.shapes.len()
    }

    pub(crate) fn get_raw(&self, index: usize) -> Option<&Vec<Coord<f64>>> {
        self.shapes[index].as_ref()
    }

    pub(crate) fn from_slots(shapes: Vec<Option<Vec<Coord<f64>>>>) -> Self {
        Self { shapes }
    }
}

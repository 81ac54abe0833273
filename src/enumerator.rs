//! Cursor that walks a vertex's edge list, normalising direction at each step.

use geo_types::Coord;

use crate::vertex::VertexId;
use crate::Graph;

/// Walks the incident edges of a vertex, one call to [`EdgeEnumerator::move_next`] at a
/// time. Borrows the graph immutably for its whole lifetime, so a concurrent mutation
/// would be a borrow-checker error rather than a runtime hazard.
pub struct EdgeEnumerator<'g> {
    graph: &'g Graph,
    anchor: VertexId,
    first_edge: bool,
    raw_ptr: Option<u32>,
    next_raw_ptr: Option<u32>,
    forward: bool,
    to: VertexId,
    self_loop_second_pass: bool,
}

impl<'g> EdgeEnumerator<'g> {
    pub(crate) fn new(graph: &'g Graph) -> Self {
        let zero = VertexId::new(0, 0);
        Self {
            graph,
            anchor: zero,
            first_edge: true,
            raw_ptr: None,
            next_raw_ptr: None,
            forward: true,
            to: zero,
            self_loop_second_pass: false,
        }
    }

    /// Position the cursor at `v`'s most recently added edge. Returns `false` if `v`
    /// does not resolve to a live vertex.
    pub fn move_to(&mut self, v: VertexId) -> bool {
        let slot = match self.graph.vertex_store.slot_of(&self.graph.tile_index, v) {
            Some(s) => s,
            None => return false,
        };
        let head = self.graph.vertex_store.edge_pointer(slot);
        self.anchor = v;
        self.first_edge = true;
        self.raw_ptr = if head == crate::vertex_store::NO_EDGES {
            None
        } else {
            Some(head)
        };
        self.next_raw_ptr = None;
        self.self_loop_second_pass = false;
        true
    }

    /// Position directly on `edge_id`, viewed from the endpoint named by `forward`
    /// (`true` = the edge's first endpoint, `false` = its second).
    pub fn move_to_edge(&mut self, edge_id: u32, forward: bool) -> bool {
        if edge_id >= self.graph.edge_arena.edge_pointer_high() {
            return false;
        }
        let rec = self.graph.edge_arena.record(edge_id);
        let (anchor, to, next_ptr) = if forward {
            (rec.v1(), rec.v2(), rec.prev1())
        } else {
            (rec.v2(), rec.v1(), rec.prev2())
        };
        self.anchor = anchor;
        self.first_edge = false;
        self.raw_ptr = Some(edge_id);
        self.forward = forward;
        self.to = to;
        self.next_raw_ptr = if next_ptr == 0 { None } else { Some(next_ptr - 1) };
        self.self_loop_second_pass = false;
        true
    }

    /// Re-enter `move_to` on the current anchor vertex.
    pub fn reset(&mut self) -> bool {
        self.move_to(self.anchor)
    }

    /// Advance to the next incident edge. A self-loop is yielded twice in a row, once
    /// per direction, before the cursor advances past it.
    pub fn move_next(&mut self) -> bool {
        if self.self_loop_second_pass {
            self.self_loop_second_pass = false;
            let rec = self.graph.edge_arena.record(self.raw_ptr.expect("self-loop pending without a current edge"));
            self.forward = false;
            self.to = rec.v1();
            return true;
        }

        let current = if self.first_edge {
            self.first_edge = false;
            match self.raw_ptr {
                Some(p) => p,
                None => return false,
            }
        } else {
            let next = match self.next_raw_ptr {
                Some(n) => n,
                None => return false,
            };
            self.raw_ptr = Some(next);
            next
        };

        let rec = self.graph.edge_arena.record(current);
        let v1 = rec.v1();
        let v2 = rec.v2();
        let is_self_loop = v1 == v2 && v1 == self.anchor;

        if v1 == self.anchor {
            self.forward = true;
            self.to = v2;
            let p = rec.prev1();
            self.next_raw_ptr = if p == 0 { None } else { Some(p - 1) };
        } else {
            self.forward = false;
            self.to = v1;
            let p = rec.prev2();
            self.next_raw_ptr = if p == 0 { None } else { Some(p - 1) };
        }

        self.self_loop_second_pass = is_self_loop;
        true
    }

    pub fn from(&self) -> VertexId {
        self.anchor
    }

    pub fn to(&self) -> VertexId {
        self.to
    }

    pub fn forward(&self) -> bool {
        self.forward
    }

    pub fn edge_id(&self) -> Option<u32> {
        self.raw_ptr
    }

    /// Copy the current edge's payload into `dst`, truncating to whichever is shorter.
    pub fn copy_data(&self, dst: &mut [u8]) {
        if let Some(e) = self.raw_ptr {
            let payload = self.graph.edge_arena.record(e).payload();
            let n = dst.len().min(payload.len());
            dst[..n].copy_from_slice(&payload[..n]);
        }
    }

    /// The current edge's shape, reversed if the cursor is viewing it backward.
    pub fn shape(&self) -> Option<Vec<Coord<f64>>> {
        let e = self.raw_ptr?;
        let coords = self.graph.shape_store.get(e)?;
        if self.forward {
            Some(coords.clone())
        } else {
            Some(coords.iter().rev().cloned().collect())
        }
    }
}

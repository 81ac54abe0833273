//! Shared amortised growth rule for the graph's backing arrays.
//!
//! Every array in the graph (tile index bytes, vertex coordinate bytes, edge-pointer
//! slots, edge records, shape slots) grows the same way: when an operation needs to
//! address `index`, the array is resized up to the next multiple of `increment` that
//! covers it, and the newly exposed elements are filled with the component's sentinel.
//! One helper instead of five hand-rolled `Vec::resize` call sites keeps that rule from
//! drifting between components.

pub(crate) fn ensure_index<T: Clone>(buf: &mut Vec<T>, index: usize, increment: usize, fill: T) {
    if index < buf.len() {
        return;
    }
    let new_len = (index / increment + 1) * increment;
    log::debug!(
        "growing array from {} to {} elements (increment {})",
        buf.len(),
        new_len,
        increment
    );
    buf.resize(new_len, fill);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grows_to_next_increment_boundary() {
        let mut buf: Vec<u8> = Vec::new();
        ensure_index(&mut buf, 5, 4, 0xFF);
        assert_eq!(buf.len(), 8);
        assert!(buf.iter().all(|&b| b == 0xFF));
    }

    #[test]
    fn no_op_when_already_large_enough() {
        let mut buf: Vec<u8> = vec![1, 2, 3, 4];
        ensure_index(&mut buf, 2, 4, 0xFF);
        assert_eq!(buf, vec![1, 2, 3, 4]);
    }

    #[test]
    fn exact_boundary_needs_one_more_increment() {
        let mut buf: Vec<u8> = Vec::new();
        ensure_index(&mut buf, 8, 4, 0xFF);
        assert_eq!(buf.len(), 12);
    }
}

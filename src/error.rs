use thiserror::Error;

use crate::vertex::VertexId;

/// Errors surfaced across the public graph API.
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("vertex {0:?} does not exist")]
    VertexDoesNotExist(VertexId),

    #[error("edge payload of {actual} bytes exceeds the configured edge_data_size of {max}")]
    PayloadTooLarge { actual: usize, max: usize },

    #[error("format error: field `{field}` had unexpected value {found}")]
    FormatError { field: &'static str, found: String },

    #[error("capacity exceeded: {0}")]
    CapacityExceeded(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

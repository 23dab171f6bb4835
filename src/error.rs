use thiserror::Error;

/// Everything that can go wrong while mapping or filling depressions.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SinkFillError {
    /// A named node field was asked for but the grid does not carry it.
    #[error("field `{0}` does not exist on the grid")]
    MissingField(String),

    /// Caller handed over something malformed: an empty lake, a node id past the end of the grid,
    /// a non-positive slope, non-finite elevations.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A depression with no node it could spill through, e.g. walled in by closed boundaries.
    #[error("depression {code} has no valid outlet")]
    DegenerateLake { code: usize },

    /// A field stored on the grid does not have one value per node.
    #[error("field `{name}` has {got} values but the grid has {expected} nodes")]
    FieldSize {
        name: String,
        expected: usize,
        got: usize,
    },
}

pub type Result<T> = std::result::Result<T, SinkFillError>;

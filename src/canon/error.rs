use thiserror::Error;

/// Reasons a molecular structure cannot be perceived or canonicalized.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StructureError {
    #[error("structure contains no atoms")]
    Empty,

    #[error("invalid bond between atoms {i} and {j}: {detail}")]
    InvalidBond { i: usize, j: usize, detail: String },

    #[error("connectivity cannot be inferred: {0}")]
    MissingConnectivity(String),

    #[error("structure has {0} disconnected fragments but a connected graph is required")]
    Disconnected(usize),

    #[error("canonical labeling exceeded the search budget of {0} leaves")]
    SearchBudgetExceeded(usize),
}

impl StructureError {
    pub fn invalid_bond(i: usize, j: usize, details: impl Into<String>) -> Self {
        Self::InvalidBond {
            i,
            j,
            detail: details.into(),
        }
    }
}

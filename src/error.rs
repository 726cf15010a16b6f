//! Error types for universe construction and derived-table computation.
//!
//! A single [`Error`] enum covers every failure surfaced by the geometry,
//! two-body and molecule engines as well as by the [`Universe`](crate::Universe)
//! container. Variants fall into four groups: configuration problems,
//! missing upstream data, lookups of identifiers that do not exist, and
//! operations that are intentionally unsupported.

use thiserror::Error;

/// Errors that can occur while building or computing a universe.
#[derive(Debug, Error)]
pub enum Error {
    /// A periodic frame has no cell vectors, or its cell is singular.
    #[error("periodic frame {frame} has an unusable unit cell: {detail}")]
    InvalidCell {
        /// Identifier of the offending frame.
        frame: usize,
        /// Description of the problem.
        detail: String,
    },

    /// Engine settings are out of range (non-positive tolerance, zero slice step, ...).
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// Failed to parse a custom bonding cutoff table.
    #[error("failed to parse bonding cutoffs: {0}")]
    CutoffParse(#[from] toml::de::Error),

    /// A compute step was invoked before its upstream table exists.
    #[error("cannot compute {target}: the {missing} table is absent")]
    MissingData {
        /// Table being computed.
        target: &'static str,
        /// Upstream table that is required.
        missing: &'static str,
    },

    /// A frame identifier does not exist in the frame table.
    #[error("frame {0} does not exist in the universe")]
    FrameNotFound(usize),

    /// A positional frame index is outside the frame table.
    #[error("frame position {position} is out of range for a universe with {len} frames")]
    FramePosition {
        /// Requested position (negative values count from the end).
        position: isize,
        /// Number of frames in the universe.
        len: usize,
    },

    /// An atom identifier does not exist in the atom table.
    #[error("atom {0} does not exist in the atom table")]
    AtomNotFound(usize),

    /// A molecule identifier does not exist in the molecule table.
    #[error("molecule {0} does not exist in the molecule table")]
    MoleculeNotFound(usize),

    /// Frame and atom tables disagree on how many atoms a frame holds.
    #[error("frame {frame} declares {expected} atoms but the atom table holds {found}")]
    AtomCountMismatch {
        /// Frame identifier.
        frame: usize,
        /// Count recorded on the frame row.
        expected: usize,
        /// Count found in the atom table.
        found: usize,
    },

    /// Field dimension rows and value arrays were supplied in different numbers.
    #[error("field append needs one value entry per dimension row ({dimensions} rows, {values} value entries)")]
    FieldArity {
        /// Number of dimension rows.
        dimensions: usize,
        /// Number of value entries.
        values: usize,
    },

    /// A field value array does not match the product of its sample counts.
    #[error("field {label}: expected {expected} values per component, found {found}")]
    FieldLength {
        /// Field label.
        label: i64,
        /// Product of the per-axis sample counts.
        expected: usize,
        /// Length of the offending array.
        found: usize,
    },

    /// A field label is already used by another entry of the store.
    #[error("field label {0} is already present in the field store")]
    DuplicateFieldLabel(i64),

    /// No atomic mass is known for an element symbol.
    #[error("no atomic mass is tabulated for symbol '{0}'")]
    UnknownElement(String),

    /// The operation exists on the interface but is not implemented.
    #[error("operation '{0}' is not supported")]
    Unsupported(&'static str),
}

impl Error {
    /// Creates an [`InvalidCell`](Error::InvalidCell) error.
    pub fn invalid_cell(frame: usize, detail: impl Into<String>) -> Self {
        Self::InvalidCell {
            frame,
            detail: detail.into(),
        }
    }

    /// Creates a [`MissingData`](Error::MissingData) error.
    pub fn missing_data(target: &'static str, missing: &'static str) -> Self {
        Self::MissingData { target, missing }
    }

    /// Creates a [`Configuration`](Error::Configuration) error.
    pub fn configuration(detail: impl Into<String>) -> Self {
        Self::Configuration(detail.into())
    }
}

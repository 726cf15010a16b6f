//! Reading and writing universes.
//!
//! - [`xyz`] reads and writes multi-frame XYZ text. Frames whose comment line
//!   carries an extended-XYZ `Lattice="..."` entry are read as periodic.
//! - [`snapshot`] stores a universe with all of its computed tables as JSON
//!   and restores it without recomputation.

use std::fmt;

pub mod error;
pub mod snapshot;
pub mod xyz;

pub use error::Error;
pub use snapshot::UniverseSnapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Xyz,
    Json,
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Format::Xyz => write!(f, "XYZ"),
            Format::Json => write!(f, "JSON"),
        }
    }
}

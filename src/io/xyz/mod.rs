//! Multi-frame XYZ text.
//!
//! Each frame is an atom count line, a comment line and one
//! `symbol x y z` line per atom. The comment may carry extended-XYZ
//! `key=value` entries; `Lattice="ax ay az bx by bz cx cy cz"` marks the
//! frame periodic with those cell vectors and `frame=N` sets its identifier.

pub mod reader;
pub mod writer;

pub use reader::read;
pub use writer::write;

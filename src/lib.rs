//! A pure Rust library for multi-frame atomic universes: periodic geometry,
//! pairwise distances, bond perception and molecule grouping, computed lazily
//! and cached per table with explicit invalidation.
//!
//! # Features
//!
//! - **Periodic geometry**: Folding atoms into the unit cell, 27-image
//!   supercell projection and bond-graph unwrapping of molecules split by
//!   the cell boundary
//! - **Two-body tables**: Free-boundary pair distances and minimum-image
//!   periodic pairs with bond decisions from element-pair cutoffs
//! - **Molecules**: Connected components of the bond graph with formulas,
//!   mass-weighted centers and rule-based classification
//! - **Fields**: Append-only store of scalar and vector grids sampled on
//!   regular lattices
//! - **I/O**: Multi-frame (extended) XYZ and lossless JSON snapshots
//!
//! # Quick Start
//!
//! The main entry point is [`Universe`], which owns the frame and atom tables
//! and computes derived tables on first access:
//!
//! ```
//! use atomverse::{Atom, AtomTable, Frame, FrameTable, Universe};
//!
//! // Two hydrogens that touch through the x boundary of a 10 Å cubic cell
//! let frames = FrameTable::new().with_frame(0, Frame::orthorhombic(2, 10.0, 10.0, 10.0));
//! let atoms = AtomTable::new(vec![
//!     Atom::new(0, "H", [0.1, 0.0, 0.0]),
//!     Atom::new(0, "H", [9.95, 0.0, 0.0]),
//! ]);
//! let mut universe = Universe::new(Some(frames), atoms)?;
//!
//! // The nearest image of atom 1 lies across the boundary
//! let pairs = universe.periodic_two()?;
//! assert_eq!(pairs.len(), 1);
//! assert!((pairs[0].pair.distance - 0.15).abs() < 1e-9);
//! assert!(pairs[0].pair.bond);
//!
//! // Both atoms form one molecule
//! let molecules = universe.molecule()?;
//! assert_eq!(molecules.len(), 1);
//! assert_eq!(molecules.get(0).unwrap().formula.to_string(), "H(2)");
//!
//! // Unwrapped coordinates keep the molecule whole
//! let visual = universe.visual_atom_merged()?;
//! assert!((visual.get(1).unwrap().position[0] - -0.05).abs() < 1e-9);
//! # Ok::<(), atomverse::Error>(())
//! ```
//!
//! # Module Organization
//!
//! - [`io`]: XYZ reader/writer and JSON snapshots
//! - [`Universe`]: Table container with lazy computation and invalidation
//! - [`TwoBodyConfig`]: Bond cutoffs, truncation and evaluation strategy
//!
//! # Data Types
//!
//! ## Base Tables
//!
//! - [`FrameTable`] / [`Frame`]: Per-frame atom counts, periodicity and cell
//! - [`AtomTable`] / [`Atom`]: Symbol, frame and Cartesian position per atom
//! - [`Field`]: Sampled grids described by [`FieldDimension`] and
//!   [`FieldValues`]
//!
//! ## Derived Tables
//!
//! - [`UnitAtom`]: Positions folded into the unit cell (sparse overlay)
//! - [`ProjectedAtomTable`]: The 27 periodic images of every atom
//! - [`TwoBody`]: Free [`Pair`]s and periodic [`PeriodicPair`]s
//! - [`MoleculeTable`]: [`Molecule`]s with [`Formula`]s and classifications
//! - [`VisualAtom`]: Unwrapped molecule positions (sparse overlay)
//!
//! ## Configuration
//!
//! - [`CutoffTable`]: Tolerance, fallback cutoff and [`PairCutoff`] overrides
//! - [`Strategy`]: Scalar or rayon-parallel evaluation across frames
//! - [`ClassificationRule`]: Formula pattern to molecule label
//! - [`FrameSelection`]: Frame positions and ranges for slicing

mod engine;
mod error;
mod model;
mod universe;

pub mod io;

pub use error::Error;

pub use universe::{Cached, FrameSelection, Table, Universe};

pub use model::atom::{
    Atom, AtomTable, IDENTITY_IMAGE, IMAGE_COUNT, PositionOverlay, ProjectedAtom,
    ProjectedAtomTable, UnitAtom, VisualAtom, image_translation, projected_id,
};
pub use model::field::{Field, FieldDimension, FieldEntry, FieldValues};
pub use model::frame::{CellVectors, Frame, FrameTable};
pub use model::molecule::{ClassificationRule, Formula, Molecule, MoleculeTable};
pub use model::two::{Pair, PeriodicPair, TwoBody};
pub use model::types::{Element, ParseElementError};

pub use engine::{
    Cell, CutoffTable, PairCutoff, Strategy, TwoBodyConfig, default_cutoffs, periodic::fold,
};

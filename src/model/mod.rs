//! Table schemas shared by the engines and the [`Universe`](crate::Universe).
//!
//! - [`frame`] – Per-frame atom counts, periodicity flags and cell vectors.
//! - [`atom`] – Raw atom rows, sparse position overlays and periodic images.
//! - [`two`] – Pairwise distances and bond decisions.
//! - [`molecule`] – Bond-graph components, formulas and classifications.
//! - [`field`] – Append-only store of sampled scalar and vector grids.
//! - [`types`] – Periodic table data.
//!
//! Base tables ([`frame`], [`atom`], [`field`]) are supplied by the caller;
//! every other table is derived and owned by the universe that computed it.

pub mod atom;
pub mod field;
pub mod frame;
pub mod molecule;
pub mod two;
pub mod types;

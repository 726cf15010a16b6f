//! Numerical engines that derive tables from the base frame and atom tables.
//!
//! Each engine is a set of pure functions from input tables to a freshly
//! built output table; caching and invalidation live in
//! [`Universe`](crate::Universe). Work is split per frame and scheduled
//! according to [`Strategy`], with results concatenated in frame order.

mod cell;
mod config;
mod cutoffs;
mod spatial;

pub(crate) mod molecule;
pub(crate) mod periodic;
pub(crate) mod two;

pub use cell::Cell;
pub use config::{Strategy, TwoBodyConfig};
pub use cutoffs::{CutoffTable, PairCutoff, default_cutoffs};

use crate::error::Error;
use crate::model::atom::AtomTable;
use crate::model::frame::{Frame, FrameTable};
use rayon::prelude::*;

/// Atoms of one frame, ascending by identifier.
#[derive(Debug)]
pub(crate) struct FrameGroup<'a> {
    pub id: usize,
    pub frame: &'a Frame,
    pub atoms: Vec<usize>,
}

/// Groups atoms by frame, in ascending frame order.
pub(crate) fn frame_groups<'a>(
    frames: &'a FrameTable,
    atoms: &AtomTable,
) -> Result<Vec<FrameGroup<'a>>, Error> {
    atoms
        .by_frame()
        .into_iter()
        .map(|(id, atoms)| {
            let frame = frames.get(id).ok_or(Error::FrameNotFound(id))?;
            Ok(FrameGroup { id, frame, atoms })
        })
        .collect()
}

/// Applies `f` to every group, in parallel under [`Strategy::Parallel`].
///
/// Output order always follows input order.
pub(crate) fn map_frames<T, R, F>(strategy: Strategy, groups: &[T], f: F) -> Result<Vec<R>, Error>
where
    T: Sync,
    R: Send,
    F: Fn(&T) -> Result<R, Error> + Sync + Send,
{
    match strategy {
        Strategy::Scalar => groups.iter().map(f).collect(),
        Strategy::Parallel => groups.par_iter().map(f).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::atom::Atom;

    #[test]
    fn groups_follow_frame_order() {
        let atoms = AtomTable::new(vec![
            Atom::new(2, "H", [0.0; 3]),
            Atom::new(0, "H", [0.0; 3]),
            Atom::new(2, "O", [0.0; 3]),
        ]);
        let frames = FrameTable::minimal(&atoms);
        let groups = frame_groups(&frames, &atoms).unwrap();

        let ids: Vec<_> = groups.iter().map(|g| (g.id, g.atoms.clone())).collect();
        assert_eq!(ids, vec![(0, vec![1]), (2, vec![0, 2])]);
    }

    #[test]
    fn dangling_frame_reference_is_reported() {
        let atoms = AtomTable::new(vec![Atom::new(3, "H", [0.0; 3])]);
        let frames = FrameTable::new();
        assert!(matches!(
            frame_groups(&frames, &atoms),
            Err(Error::FrameNotFound(3))
        ));
    }

    #[test]
    fn strategies_agree_on_order() {
        let items: Vec<usize> = (0..64).collect();
        let square = |x: &usize| Ok::<_, Error>(x * x);
        let scalar = map_frames(Strategy::Scalar, &items, square).unwrap();
        let parallel = map_frames(Strategy::Parallel, &items, square).unwrap();
        assert_eq!(scalar, parallel);
        assert_eq!(scalar[7], 49);
    }
}

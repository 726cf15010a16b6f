use super::atom::AtomTable;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Unit-cell vectors `[a, b, c]`, each a Cartesian 3-vector.
pub type CellVectors = [[f64; 3]; 3];

/// One snapshot of the simulated system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub atom_count: usize,
    pub is_periodic: bool,
    pub is_variable_cell: bool,
    pub cell: Option<CellVectors>,
}

impl Frame {
    /// A non-periodic frame holding `atom_count` atoms.
    pub fn new(atom_count: usize) -> Self {
        Self {
            atom_count,
            is_periodic: false,
            is_variable_cell: false,
            cell: None,
        }
    }

    /// A periodic frame with the given cell vectors.
    pub fn periodic(atom_count: usize, cell: CellVectors) -> Self {
        Self {
            atom_count,
            is_periodic: true,
            is_variable_cell: false,
            cell: Some(cell),
        }
    }

    /// A periodic frame with an orthorhombic cell of side lengths `a`, `b`, `c`.
    pub fn orthorhombic(atom_count: usize, a: f64, b: f64, c: f64) -> Self {
        Self::periodic(atom_count, [[a, 0.0, 0.0], [0.0, b, 0.0], [0.0, 0.0, c]])
    }

    pub fn with_variable_cell(mut self, is_variable_cell: bool) -> Self {
        self.is_variable_cell = is_variable_cell;
        self
    }
}

/// Frame rows keyed by frame identifier, iterated in ascending identifier order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FrameTable {
    frames: BTreeMap<usize, Frame>,
}

impl FrameTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Derives the minimal frame table from an atom table: one non-periodic
    /// row per distinct frame identifier with the number of atoms it holds.
    pub fn minimal(atoms: &AtomTable) -> Self {
        let mut frames = BTreeMap::new();
        for atom in atoms.iter() {
            frames
                .entry(atom.frame)
                .or_insert_with(|| Frame::new(0))
                .atom_count += 1;
        }
        Self { frames }
    }

    /// Inserts or replaces the row for `id`.
    pub fn insert(&mut self, id: usize, frame: Frame) -> Option<Frame> {
        self.frames.insert(id, frame)
    }

    pub fn with_frame(mut self, id: usize, frame: Frame) -> Self {
        self.frames.insert(id, frame);
        self
    }

    pub fn get(&self, id: usize) -> Option<&Frame> {
        self.frames.get(&id)
    }

    pub fn contains(&self, id: usize) -> bool {
        self.frames.contains_key(&id)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &Frame)> {
        self.frames.iter().map(|(id, frame)| (*id, frame))
    }

    pub fn ids(&self) -> impl Iterator<Item = usize> + '_ {
        self.frames.keys().copied()
    }

    /// `true` if any frame is periodic.
    pub fn is_periodic(&self) -> bool {
        self.frames.values().any(|f| f.is_periodic)
    }

    /// `true` if any frame has a variable cell.
    pub fn is_variable_cell(&self) -> bool {
        self.frames.values().any(|f| f.is_variable_cell)
    }

    /// Copy of the rows whose identifiers are in `ids`.
    pub fn restrict(&self, ids: &[usize]) -> Self {
        let frames = ids
            .iter()
            .filter_map(|id| self.frames.get(id).map(|f| (*id, f.clone())))
            .collect();
        Self { frames }
    }

    /// Applies the same cell to every frame, marking them all periodic.
    pub fn set_cell(&mut self, cell: CellVectors) {
        for frame in self.frames.values_mut() {
            frame.is_periodic = true;
            frame.cell = Some(cell);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::atom::Atom;

    #[test]
    fn minimal_frame_counts_atoms_per_frame() {
        let atoms = AtomTable::new(vec![
            Atom::new(4, "H", [0.0, 0.0, 0.0]),
            Atom::new(4, "H", [0.0, 0.7, 0.0]),
            Atom::new(9, "O", [0.0, 0.0, 0.0]),
        ]);
        let frames = FrameTable::minimal(&atoms);

        assert_eq!(frames.len(), 2);
        assert_eq!(frames.get(4).unwrap().atom_count, 2);
        assert_eq!(frames.get(9).unwrap().atom_count, 1);
        assert!(!frames.is_periodic());
        assert_eq!(frames.ids().collect::<Vec<_>>(), vec![4, 9]);
    }

    #[test]
    fn restrict_keeps_only_requested_ids() {
        let frames = FrameTable::new()
            .with_frame(0, Frame::new(1))
            .with_frame(5, Frame::orthorhombic(2, 10.0, 10.0, 10.0))
            .with_frame(7, Frame::new(3));
        let sub = frames.restrict(&[5, 7, 42]);

        assert_eq!(sub.ids().collect::<Vec<_>>(), vec![5, 7]);
        assert!(sub.is_periodic());
        assert!(!sub.is_variable_cell());
    }

    #[test]
    fn set_cell_makes_every_frame_periodic() {
        let mut frames = FrameTable::new()
            .with_frame(0, Frame::new(1))
            .with_frame(1, Frame::new(1));
        frames.set_cell([[5.0, 0.0, 0.0], [0.0, 5.0, 0.0], [0.0, 0.0, 5.0]]);
        assert!(frames.iter().all(|(_, f)| f.is_periodic && f.cell.is_some()));
    }
}

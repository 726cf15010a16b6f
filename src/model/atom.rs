use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Number of periodic images generated per atom (the `{-1, 0, 1}^3` supercell).
pub const IMAGE_COUNT: usize = 27;

/// Image index of the `(0, 0, 0)` translation.
pub const IDENTITY_IMAGE: u8 = 13;

/// Projected bond count of an image row that no bond references.
pub const UNBONDED_IMAGE: i32 = -1;

/// Lattice translation of image `index`.
///
/// Images are enumerated lexicographically over `{-1, 0, 1}^3` with the x
/// component varying slowest, so index 0 is `(-1, -1, -1)`, index 13 the
/// identity and index 26 `(1, 1, 1)`.
#[inline]
pub fn image_translation(index: u8) -> [i32; 3] {
    let i = i32::from(index);
    [i / 9 - 1, (i / 3) % 3 - 1, i % 3 - 1]
}

/// Projected-atom identifier of image `image` of atom `atom`.
#[inline]
pub fn projected_id(atom: usize, image: u8) -> usize {
    atom * IMAGE_COUNT + usize::from(image)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Atom {
    pub frame: usize,
    pub symbol: String,
    pub position: [f64; 3],
    /// Identity of the atom across frames (e.g. along a trajectory).
    pub label: Option<i64>,
    pub bond_count: Option<u32>,
}

impl Atom {
    pub fn new(frame: usize, symbol: impl Into<String>, position: [f64; 3]) -> Self {
        Self {
            frame,
            symbol: symbol.into(),
            position,
            label: None,
            bond_count: None,
        }
    }

    pub fn with_label(mut self, label: i64) -> Self {
        self.label = Some(label);
        self
    }
}

/// Atom rows; an atom's identifier is its position in the table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AtomTable {
    atoms: Vec<Atom>,
}

impl AtomTable {
    pub fn new(atoms: Vec<Atom>) -> Self {
        Self { atoms }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.atoms.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    pub fn get(&self, id: usize) -> Option<&Atom> {
        self.atoms.get(id)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Atom> {
        self.atoms.iter()
    }

    pub fn as_slice(&self) -> &[Atom] {
        &self.atoms
    }

    /// Atom identifiers grouped by frame, in ascending order within each frame.
    pub fn by_frame(&self) -> BTreeMap<usize, Vec<usize>> {
        let mut groups: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
        for (id, atom) in self.atoms.iter().enumerate() {
            groups.entry(atom.frame).or_default().push(id);
        }
        groups
    }

    /// Bond counts of every atom, `None` until they have been computed.
    pub fn bond_counts(&self) -> Option<Vec<u32>> {
        self.atoms.iter().map(|a| a.bond_count).collect()
    }

    pub(crate) fn set_bond_counts(&mut self, counts: &[u32]) {
        for (atom, count) in self.atoms.iter_mut().zip(counts) {
            atom.bond_count = Some(*count);
        }
    }

    /// Clears bond counts; returns `true` if any were set.
    pub(crate) fn clear_bond_counts(&mut self) -> bool {
        let mut cleared = false;
        for atom in &mut self.atoms {
            cleared |= atom.bond_count.take().is_some();
        }
        cleared
    }

    /// Copy of the rows belonging to `frames`, renumbered from zero.
    pub(crate) fn restrict_to_frames(&self, frames: &[usize]) -> Self {
        let atoms = self
            .atoms
            .iter()
            .filter(|a| frames.contains(&a.frame))
            .map(|a| Atom {
                bond_count: None,
                ..a.clone()
            })
            .collect();
        Self { atoms }
    }
}

impl FromIterator<Atom> for AtomTable {
    fn from_iter<I: IntoIterator<Item = Atom>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Sparse per-atom position overrides.
///
/// Only atoms whose position differs from the raw atom table are stored;
/// every other atom keeps its raw coordinates in the merged view.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PositionOverlay {
    positions: BTreeMap<usize, [f64; 3]>,
}

/// Positions folded into the primary unit cell.
pub type UnitAtom = PositionOverlay;

/// Positions unwrapped so that molecules stay whole across cell boundaries.
pub type VisualAtom = PositionOverlay;

impl PositionOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&mut self, atom: usize, position: [f64; 3]) {
        self.positions.insert(atom, position);
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// The overriding position of `atom`, if one is stored.
    pub fn get(&self, atom: usize) -> Option<[f64; 3]> {
        self.positions.get(&atom).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, [f64; 3])> + '_ {
        self.positions.iter().map(|(id, pos)| (*id, *pos))
    }

    /// Position of `atom` with the override applied.
    pub fn position(&self, atoms: &AtomTable, atom: usize) -> Option<[f64; 3]> {
        self.get(atom).or_else(|| atoms.get(atom).map(|a| a.position))
    }

    /// Copy of `atoms` with overridden positions applied.
    pub fn merge(&self, atoms: &AtomTable) -> AtomTable {
        let mut merged = atoms.clone();
        for (id, position) in &self.positions {
            if let Some(atom) = merged.atoms.get_mut(*id) {
                atom.position = *position;
            }
        }
        merged
    }
}

/// One periodic image of an atom.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectedAtom {
    pub id: usize,
    /// Source atom identifier.
    pub atom: usize,
    pub frame: usize,
    pub image: u8,
    pub position: [f64; 3],
    /// Bonds referencing this image; [`UNBONDED_IMAGE`] if none.
    pub bond_count: Option<i32>,
}

impl ProjectedAtom {
    pub fn translation(&self) -> [i32; 3] {
        image_translation(self.image)
    }
}

/// Projected atoms ordered by identifier (atom-major, then image index).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectedAtomTable {
    rows: Vec<ProjectedAtom>,
    truncated: bool,
}

impl ProjectedAtomTable {
    pub(crate) fn new(rows: Vec<ProjectedAtom>) -> Self {
        debug_assert!(rows.windows(2).all(|w| w[0].id < w[1].id));
        Self {
            rows,
            truncated: false,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// `true` once rows not referenced by the two-body table were dropped.
    pub fn is_truncated(&self) -> bool {
        self.truncated
    }

    pub fn get(&self, id: usize) -> Option<&ProjectedAtom> {
        self.rows
            .binary_search_by_key(&id, |r| r.id)
            .ok()
            .map(|i| &self.rows[i])
    }

    pub fn contains(&self, id: usize) -> bool {
        self.get(id).is_some()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ProjectedAtom> {
        self.rows.iter()
    }

    pub(crate) fn rows_mut(&mut self) -> &mut [ProjectedAtom] {
        &mut self.rows
    }

    pub(crate) fn retain(&mut self, mut keep: impl FnMut(&ProjectedAtom) -> bool) {
        self.rows.retain(|r| keep(r));
        self.truncated = true;
    }

    /// Clears projected bond counts; returns `true` if any were set.
    pub(crate) fn clear_bond_counts(&mut self) -> bool {
        let mut cleared = false;
        for row in &mut self.rows {
            cleared |= row.bond_count.take().is_some();
        }
        cleared
    }
}

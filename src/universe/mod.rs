//! The [`Universe`] container: base tables, lazily computed derived tables
//! and the invalidation rules tying them together.
//!
//! Derived tables are computed on first access and cached. Every
//! `compute_*` method discards the previous value of its table and of
//! everything downstream of it before recomputing, and reassigning a base
//! table drops every derived table.

mod cache;
mod selection;

pub use cache::{Cached, Table};
pub use selection::FrameSelection;

use crate::engine::{TwoBodyConfig, molecule, periodic, two};
use crate::error::Error;
use crate::model::atom::{AtomTable, ProjectedAtomTable, UnitAtom, VisualAtom};
use crate::model::field::{Field, FieldDimension, FieldValues};
use crate::model::frame::FrameTable;
use crate::model::molecule::{ClassificationRule, MoleculeTable};
use crate::model::two::{Pair, PeriodicPair, TwoBody};
use log::{debug, info};
use std::collections::BTreeMap;

/// A multi-frame atomic system with cached derived tables.
///
/// # Examples
///
/// ```
/// use atomverse::{Atom, AtomTable, CutoffTable, TwoBodyConfig, Universe};
///
/// let atoms = AtomTable::new(vec![
///     Atom::new(0, "H", [0.0, 0.0, 0.0]),
///     Atom::new(0, "H", [0.0, 0.7, 0.0]),
///     Atom::new(0, "H", [0.0, -0.7, 0.0]),
/// ]);
/// let mut universe = Universe::from_atoms(atoms)?.with_two_body_config(TwoBodyConfig {
///     cutoffs: CutoffTable::default().with_tolerance(1.0).with_pair("H", "H", 0.8),
///     ..Default::default()
/// });
///
/// assert_eq!(universe.two()?.bond_count(), 2);
/// let molecules = universe.molecule()?;
/// assert_eq!(molecules.len(), 1);
/// assert_eq!(molecules.get(0).unwrap().formula.to_string(), "H(3)");
/// # Ok::<(), atomverse::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct Universe {
    pub(crate) frame: FrameTable,
    pub(crate) atom: Option<AtomTable>,
    pub(crate) field: Field,
    pub(crate) config: TwoBodyConfig,
    pub(crate) unit_atom: Cached<UnitAtom>,
    pub(crate) projected_atom: Cached<ProjectedAtomTable>,
    pub(crate) two: Cached<TwoBody>,
    pub(crate) molecule: Cached<MoleculeTable>,
    pub(crate) visual_atom: Cached<VisualAtom>,
}

/// Checks that every atom references an existing frame and that frame atom
/// counts agree with the atom table.
fn validate(frame: &FrameTable, atom: &AtomTable) -> Result<(), Error> {
    let mut counts: BTreeMap<usize, usize> = BTreeMap::new();
    for a in atom.iter() {
        if !frame.contains(a.frame) {
            return Err(Error::FrameNotFound(a.frame));
        }
        *counts.entry(a.frame).or_insert(0) += 1;
    }
    for (id, f) in frame.iter() {
        let found = counts.get(&id).copied().unwrap_or(0);
        if f.atom_count != found {
            return Err(Error::AtomCountMismatch {
                frame: id,
                expected: f.atom_count,
                found,
            });
        }
    }
    Ok(())
}

fn resolve_frame(frame: Option<FrameTable>, atom: &AtomTable) -> Result<FrameTable, Error> {
    match frame {
        Some(frame) => {
            validate(&frame, atom)?;
            Ok(frame)
        }
        None => Ok(FrameTable::minimal(atom)),
    }
}

impl Universe {
    /// Builds a universe from an atom table and an optional frame table.
    ///
    /// Without a frame table the minimal one is derived: one non-periodic
    /// frame per distinct frame identifier.
    pub fn new(frame: Option<FrameTable>, atom: AtomTable) -> Result<Self, Error> {
        let frame = resolve_frame(frame, &atom)?;
        debug!(
            "universe: {} frames, {} atoms",
            frame.len(),
            atom.len()
        );
        Ok(Self {
            frame,
            atom: Some(atom),
            ..Default::default()
        })
    }

    pub fn from_atoms(atom: AtomTable) -> Result<Self, Error> {
        Self::new(None, atom)
    }

    pub fn with_two_body_config(mut self, config: TwoBodyConfig) -> Self {
        self.set_two_body_config(config);
        self
    }

    /// Replaces the two-body settings, dropping tables computed under the old ones.
    pub fn set_two_body_config(&mut self, config: TwoBodyConfig) {
        self.config = config;
        self.invalidate(Table::Two);
    }

    pub fn two_body_config(&self) -> &TwoBodyConfig {
        &self.config
    }

    pub fn frame(&self) -> &FrameTable {
        &self.frame
    }

    pub fn atom(&self) -> Option<&AtomTable> {
        self.atom.as_ref()
    }

    pub fn field(&self) -> &Field {
        &self.field
    }

    /// Number of frames.
    pub fn len(&self) -> usize {
        self.frame.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frame.is_empty()
    }

    pub fn is_periodic(&self) -> bool {
        self.frame.is_periodic()
    }

    pub fn is_variable_cell(&self) -> bool {
        self.frame.is_variable_cell()
    }

    /// `true` if `table` currently holds data.
    pub fn is_present(&self, table: Table) -> bool {
        match table {
            Table::Frame => !self.frame.is_empty(),
            Table::Atom => self.atom.is_some(),
            Table::UnitAtom => self.unit_atom.is_present(),
            Table::ProjectedAtom => self.projected_atom.is_present(),
            Table::Two => self.two.is_present(),
            Table::BondCount => self
                .atom
                .as_ref()
                .is_some_and(|a| !a.is_empty() && a.bond_counts().is_some()),
            Table::ProjectedBondCount => self
                .projected_atom
                .get()
                .is_some_and(|p| p.iter().any(|r| r.bond_count.is_some())),
            Table::Molecule => self.molecule.is_present(),
            Table::VisualAtom => self.visual_atom.is_present(),
        }
    }

    fn require_atom(&self, target: &'static str) -> Result<&AtomTable, Error> {
        self.atom
            .as_ref()
            .ok_or(Error::missing_data(target, "atom"))
    }

    // --- base tables ---------------------------------------------------------

    /// Replaces the atom table.
    ///
    /// The atoms are validated against the current frame table; a universe
    /// without frames derives the minimal frame table instead.
    pub fn set_atom(&mut self, atom: AtomTable) -> Result<(), Error> {
        if self.frame.is_empty() {
            self.frame = FrameTable::minimal(&atom);
        } else {
            validate(&self.frame, &atom)?;
        }
        self.atom = Some(atom);
        self.invalidate(Table::Atom);
        Ok(())
    }

    /// Replaces the frame table, which must agree with the current atoms.
    pub fn set_frame(&mut self, frame: FrameTable) -> Result<(), Error> {
        if let Some(atom) = &self.atom {
            validate(&frame, atom)?;
        }
        self.frame = frame;
        self.invalidate(Table::Frame);
        Ok(())
    }

    /// Replaces both base tables at once.
    pub fn set_tables(&mut self, frame: Option<FrameTable>, atom: AtomTable) -> Result<(), Error> {
        self.frame = resolve_frame(frame, &atom)?;
        self.atom = Some(atom);
        self.invalidate(Table::Atom);
        Ok(())
    }

    /// Rebuilds the minimal frame table from the atom table.
    ///
    /// Periodicity and cell vectors of the previous frame table are lost.
    pub fn compute_frame(&mut self) -> Result<(), Error> {
        let frame = FrameTable::minimal(self.require_atom("frame")?);
        self.frame = frame;
        self.invalidate(Table::Frame);
        Ok(())
    }

    // --- invalidation --------------------------------------------------------

    /// Drops `table` (unless it is a base table) and everything downstream.
    pub fn invalidate(&mut self, table: Table) {
        let mut dropped = Vec::new();
        let tables = std::iter::once(table)
            .filter(|t| !t.is_base())
            .chain(table.downstream());
        for t in tables {
            if self.drop_table(t) {
                dropped.push(t);
            }
        }
        if !dropped.is_empty() {
            let names: Vec<String> = dropped.iter().map(ToString::to_string).collect();
            info!("{table} changed; dropped {}", names.join(", "));
        }
    }

    fn drop_table(&mut self, table: Table) -> bool {
        match table {
            Table::Frame | Table::Atom => false,
            Table::UnitAtom => self.unit_atom.take().is_some(),
            Table::ProjectedAtom => self.projected_atom.take().is_some(),
            Table::Two => self.two.take().is_some(),
            Table::BondCount => self
                .atom
                .as_mut()
                .is_some_and(AtomTable::clear_bond_counts),
            Table::ProjectedBondCount => self
                .projected_atom
                .get_mut()
                .is_some_and(ProjectedAtomTable::clear_bond_counts),
            Table::Molecule => self.molecule.take().is_some(),
            Table::VisualAtom => self.visual_atom.take().is_some(),
        }
    }

    // --- periodic geometry ---------------------------------------------------

    pub fn compute_unit_atom(&mut self) -> Result<(), Error> {
        self.invalidate(Table::UnitAtom);
        let atom = self.require_atom("unit atom")?;
        let unit = periodic::compute_unit_atom(&self.frame, atom, self.config.strategy)?;
        self.unit_atom = Cached::Present(unit);
        Ok(())
    }

    /// Sparse unit-cell positions; only atoms that moved when folded.
    pub fn unit_atom(&mut self) -> Result<&UnitAtom, Error> {
        if !self.unit_atom.is_present() {
            self.compute_unit_atom()?;
        }
        self.unit_atom
            .get()
            .ok_or(Error::missing_data("unit atom", "unit atom"))
    }

    /// Atom table with unit-cell positions applied.
    pub fn unit_atom_merged(&mut self) -> Result<AtomTable, Error> {
        self.unit_atom()?;
        let atom = self.require_atom("unit atom")?;
        Ok(self.unit_atom.get().map_or_else(|| atom.clone(), |u| u.merge(atom)))
    }

    pub fn compute_projected_atom(&mut self) -> Result<(), Error> {
        self.unit_atom()?;
        self.invalidate(Table::ProjectedAtom);
        let atom = self.require_atom("projected atom")?;
        let unit = self
            .unit_atom
            .get()
            .ok_or(Error::missing_data("projected atom", "unit atom"))?;
        let projected =
            periodic::compute_projected_atom(&self.frame, atom, unit, self.config.strategy)?;
        self.projected_atom = Cached::Present(projected);
        Ok(())
    }

    pub fn projected_atom(&mut self) -> Result<&ProjectedAtomTable, Error> {
        if !self.projected_atom.is_present() {
            self.compute_projected_atom()?;
        }
        self.projected_atom
            .get()
            .ok_or(Error::missing_data("projected atom", "projected atom"))
    }

    // --- two-body ------------------------------------------------------------

    /// Computes distances and bonds for every frame.
    ///
    /// Periodic frames need the full projected table, which is regenerated
    /// if it was truncated. With `periodic_truncate` set the projected table
    /// is truncated afterwards.
    pub fn compute_two_body(&mut self) -> Result<(), Error> {
        self.require_atom("two-body")?;
        let complete = self
            .projected_atom
            .get()
            .is_some_and(|p| !p.is_truncated());
        if !complete {
            self.compute_projected_atom()?;
        }
        self.invalidate(Table::Two);

        let engine = two::TwoBodyEngine::new(&self.config)?;
        let atom = self.require_atom("two-body")?;
        let table = engine.compute(&self.frame, atom, self.projected_atom.get())?;
        self.two = Cached::Present(table);

        if self.frame.is_periodic() && self.config.periodic_truncate {
            self.truncate_projected_atom()?;
        }
        Ok(())
    }

    pub fn two(&mut self) -> Result<&TwoBody, Error> {
        if !self.two.is_present() {
            self.compute_two_body()?;
        }
        self.two
            .get()
            .ok_or(Error::missing_data("two-body", "two-body"))
    }

    /// Pairs of non-periodic frames.
    pub fn free_two(&mut self) -> Result<&[Pair], Error> {
        Ok(&self.two()?.free)
    }

    /// Pairs of periodic frames.
    pub fn periodic_two(&mut self) -> Result<&[PeriodicPair], Error> {
        Ok(&self.two()?.periodic)
    }

    /// Keeps only the projected rows that periodic pairs reference.
    ///
    /// Call [`compute_projected_atom`](Self::compute_projected_atom) to
    /// regenerate the full table.
    pub fn truncate_projected_atom(&mut self) -> Result<(), Error> {
        self.two()?;
        if let (Some(two), Some(projected)) = (self.two.get(), self.projected_atom.get_mut()) {
            two::truncate_projected_atom(two, projected);
        }
        Ok(())
    }

    /// Stores the number of bonds of every atom on the atom table.
    pub fn compute_bond_count(&mut self) -> Result<(), Error> {
        self.two()?;
        self.invalidate(Table::BondCount);
        let two = self
            .two
            .get()
            .ok_or(Error::missing_data("bond count", "two-body"))?;
        let atom = self
            .atom
            .as_mut()
            .ok_or(Error::missing_data("bond count", "atom"))?;
        let counts = two::compute_bond_count(two, atom.len());
        atom.set_bond_counts(&counts);
        Ok(())
    }

    /// Bonds per atom, in atom order.
    pub fn bond_count(&mut self) -> Result<Vec<u32>, Error> {
        if !self.is_present(Table::BondCount) {
            self.compute_bond_count()?;
        }
        Ok(self
            .require_atom("bond count")?
            .bond_counts()
            .unwrap_or_default())
    }

    /// Stores on every projected row the number of bonds referencing it.
    pub fn compute_projected_bond_count(&mut self) -> Result<(), Error> {
        self.projected_atom()?;
        self.two()?;
        self.invalidate(Table::ProjectedBondCount);
        if let (Some(two), Some(projected)) = (self.two.get(), self.projected_atom.get_mut()) {
            two::compute_projected_bond_count(two, projected);
        }
        Ok(())
    }

    // --- molecules -----------------------------------------------------------

    /// Groups bonded atoms into molecules.
    ///
    /// With `recenter`, the visual atom table is computed as well and every
    /// molecule gets its center of mass from the unwrapped positions.
    pub fn compute_molecule(&mut self, recenter: bool) -> Result<(), Error> {
        self.two()?;
        self.invalidate(Table::Molecule);
        let atom = self.require_atom("molecule")?;
        let two = self
            .two
            .get()
            .ok_or(Error::missing_data("molecule", "two-body"))?;
        self.molecule = Cached::Present(molecule::compute_molecule(atom, two));

        if recenter {
            if let Err(e) = self.recenter_molecules() {
                self.invalidate(Table::Molecule);
                return Err(e);
            }
        }
        Ok(())
    }

    fn recenter_molecules(&mut self) -> Result<(), Error> {
        let positions = self.visual_atom_merged()?;
        let molecules = self
            .molecule
            .get_mut()
            .ok_or(Error::missing_data("center of mass", "molecule"))?;
        molecule::compute_center_of_mass(molecules, &positions)
    }

    pub fn molecule(&mut self) -> Result<&MoleculeTable, Error> {
        if !self.molecule.is_present() {
            self.compute_molecule(false)?;
        }
        self.molecule
            .get()
            .ok_or(Error::missing_data("molecule", "molecule"))
    }

    /// Labels molecules with the first matching rule, computing molecules
    /// first if needed. Returns how many molecules were labelled.
    pub fn classify_molecules(&mut self, rules: &[ClassificationRule]) -> Result<usize, Error> {
        self.molecule()?;
        let molecules = self
            .molecule
            .get_mut()
            .ok_or(Error::missing_data("classification", "molecule"))?;
        Ok(molecules.classify(rules))
    }

    pub fn compute_visual_atom(&mut self) -> Result<(), Error> {
        self.molecule()?;
        self.invalidate(Table::VisualAtom);
        let missing = |what| Error::missing_data("visual atom", what);
        let atom = self.atom.as_ref().ok_or(missing("atom"))?;
        let unit = self.unit_atom.get().ok_or(missing("unit atom"))?;
        let two = self.two.get().ok_or(missing("two-body"))?;
        let molecules = self.molecule.get().ok_or(missing("molecule"))?;
        let visual = periodic::compute_visual_atom(&self.frame, atom, unit, two, molecules)?;
        self.visual_atom = Cached::Present(visual);
        Ok(())
    }

    /// Sparse unwrapped positions; only atoms that differ from their raw position.
    pub fn visual_atom(&mut self) -> Result<&VisualAtom, Error> {
        if !self.visual_atom.is_present() {
            self.compute_visual_atom()?;
        }
        self.visual_atom
            .get()
            .ok_or(Error::missing_data("visual atom", "visual atom"))
    }

    /// Atom table with unwrapped positions applied.
    pub fn visual_atom_merged(&mut self) -> Result<AtomTable, Error> {
        self.visual_atom()?;
        let atom = self.require_atom("visual atom")?;
        Ok(self.visual_atom.get().map_or_else(|| atom.clone(), |v| v.merge(atom)))
    }

    /// Not supported; molecule-based slicing is not offered.
    pub fn slice_by_molecules(&self, _molecules: &[usize]) -> Result<Universe, Error> {
        Err(Error::Unsupported("slice_by_molecules"))
    }

    // --- fields --------------------------------------------------------------

    /// Appends field entries, attaching them to `frame` when given.
    pub fn append_field(
        &mut self,
        mut dimensions: Vec<FieldDimension>,
        values: Vec<FieldValues>,
        frame: Option<usize>,
    ) -> Result<(), Error> {
        if let Some(id) = frame {
            if !self.frame.contains(id) {
                return Err(Error::FrameNotFound(id));
            }
            for dimension in &mut dimensions {
                dimension.frame = Some(id);
            }
        }
        let added = dimensions.len();
        self.field.append(dimensions, values)?;
        debug!("field: appended {added} entries, {} total", self.field.len());
        Ok(())
    }

    /// Not supported; fields are appended with [`append_field`](Self::append_field).
    pub fn append_dataframe(&mut self) -> Result<(), Error> {
        Err(Error::Unsupported("append_dataframe"))
    }

    /// Memory held by field values.
    pub fn field_bytes(&self) -> usize {
        self.field.bytes()
    }

    // --- slicing -------------------------------------------------------------

    /// A new universe holding only the selected frames.
    ///
    /// Base tables and fields are copied; atoms are renumbered from zero in
    /// their original order and keep their labels. No derived table is
    /// carried over.
    pub fn slice(&self, selection: impl Into<FrameSelection>) -> Result<Universe, Error> {
        let ids: Vec<usize> = self.frame.ids().collect();
        let positions = selection.into().resolve(ids.len())?;
        let selected: Vec<usize> = positions.into_iter().map(|p| ids[p]).collect();

        debug!("slice: keeping {} of {} frames", selected.len(), ids.len());
        Ok(Universe {
            frame: self.frame.restrict(&selected),
            atom: self.atom.as_ref().map(|a| a.restrict_to_frames(&selected)),
            field: self.field.restrict(&selected),
            config: self.config.clone(),
            ..Default::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{CutoffTable, Strategy};
    use crate::model::atom::{Atom, IDENTITY_IMAGE, IMAGE_COUNT, projected_id};
    use crate::model::frame::Frame;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn hh_config() -> TwoBodyConfig {
        TwoBodyConfig {
            cutoffs: CutoffTable::default()
                .with_tolerance(1.0)
                .with_pair("H", "H", 0.8),
            ..Default::default()
        }
    }

    fn hydrogen_chain() -> Universe {
        let atoms = AtomTable::new(vec![
            Atom::new(0, "H", [0.0, 0.0, 0.0]),
            Atom::new(0, "H", [0.0, 0.7, 0.0]),
            Atom::new(0, "H", [0.0, -0.7, 0.0]),
        ]);
        Universe::from_atoms(atoms)
            .unwrap()
            .with_two_body_config(hh_config())
    }

    fn periodic_pair() -> Universe {
        let atoms = AtomTable::new(vec![
            Atom::new(0, "H", [0.1, 0.0, 0.0]),
            Atom::new(0, "H", [9.95, 0.0, 0.0]),
        ]);
        let frames = FrameTable::new().with_frame(0, Frame::orthorhombic(2, 10.0, 10.0, 10.0));
        Universe::new(Some(frames), atoms)
            .unwrap()
            .with_two_body_config(hh_config())
    }

    /// Three frames of one water molecule each, the middle one periodic.
    fn trajectory() -> Universe {
        let water = |frame: usize, dx: f64| {
            vec![
                Atom::new(frame, "O", [dx, 0.0, 0.0]).with_label(0),
                Atom::new(frame, "H", [dx + 0.96, 0.0, 0.0]).with_label(1),
                Atom::new(frame, "H", [dx - 0.24, 0.93, 0.0]).with_label(2),
            ]
        };
        let atoms: AtomTable = [water(0, 1.0), water(1, 2.0), water(2, 3.0)]
            .into_iter()
            .flatten()
            .collect();
        let frames = FrameTable::new()
            .with_frame(0, Frame::new(3))
            .with_frame(1, Frame::orthorhombic(3, 8.0, 8.0, 8.0))
            .with_frame(2, Frame::new(3));
        Universe::new(Some(frames), atoms).unwrap()
    }

    #[test]
    fn hydrogen_chain_forms_one_molecule() {
        let mut universe = hydrogen_chain();
        let two = universe.two().unwrap();
        assert_eq!(two.free.len(), 3);
        assert_eq!(two.bond_count(), 2);
        assert!(two.distance(1, 2).is_some_and(|d| approx_eq(d, 1.4)));

        let molecules = universe.molecule().unwrap();
        assert_eq!(molecules.len(), 1);
        let molecule = molecules.get(0).unwrap();
        assert_eq!(molecule.formula.count("H"), 3);
        assert_eq!(molecule.atoms, vec![0, 1, 2]);

        assert_eq!(universe.bond_count().unwrap(), vec![2, 1, 1]);
    }

    #[test]
    fn periodic_pair_is_found_through_an_image() {
        let mut universe = periodic_pair();
        let rows = universe.periodic_two().unwrap().to_vec();
        assert_eq!(rows.len(), 1);
        assert!(approx_eq(rows[0].pair.distance, 0.15));
        assert_eq!(rows[0].prjd_atom1 % IMAGE_COUNT, 4);

        let projected = universe.projected_atom().unwrap();
        assert!(projected.is_truncated());
        assert_eq!(projected.len(), 2);
        assert!(projected.contains(projected_id(0, IDENTITY_IMAGE)));
    }

    #[test]
    fn truncation_can_be_disabled_and_undone() {
        let mut universe = periodic_pair().with_two_body_config(TwoBodyConfig {
            periodic_truncate: false,
            ..hh_config()
        });
        universe.two().unwrap();
        assert_eq!(universe.projected_atom().unwrap().len(), 2 * IMAGE_COUNT);

        universe.truncate_projected_atom().unwrap();
        assert_eq!(universe.projected_atom().unwrap().len(), 2);
        assert!(universe.is_present(Table::Two));

        universe.compute_projected_atom().unwrap();
        assert_eq!(universe.projected_atom().unwrap().len(), 2 * IMAGE_COUNT);
        assert!(!universe.is_present(Table::Two));

        // Recomputing pairs from a truncated table regenerates it first.
        universe.truncate_projected_atom().unwrap();
        universe.compute_two_body().unwrap();
        assert_eq!(universe.periodic_two().unwrap().len(), 1);
    }

    #[test]
    fn projected_bond_counts_use_sentinel() {
        let mut universe = periodic_pair().with_two_body_config(TwoBodyConfig {
            periodic_truncate: false,
            ..hh_config()
        });
        universe.compute_projected_bond_count().unwrap();
        let projected = universe.projected_atom().unwrap();
        let count = |id| projected.get(id).and_then(|r| r.bond_count);
        assert_eq!(count(projected_id(0, IDENTITY_IMAGE)), Some(1));
        assert_eq!(count(projected_id(1, 4)), Some(1));
        assert_eq!(count(projected_id(1, IDENTITY_IMAGE)), Some(-1));
        assert!(universe.is_present(Table::ProjectedBondCount));
    }

    #[test]
    fn reassigning_atoms_drops_every_derived_table() {
        let mut universe = periodic_pair();
        universe.compute_molecule(true).unwrap();
        universe.compute_bond_count().unwrap();
        for table in [
            Table::UnitAtom,
            Table::ProjectedAtom,
            Table::Two,
            Table::BondCount,
            Table::Molecule,
            Table::VisualAtom,
        ] {
            assert!(universe.is_present(table), "{table} should be present");
        }

        let atoms = AtomTable::new(vec![
            Atom::new(0, "H", [1.0, 0.0, 0.0]),
            Atom::new(0, "H", [2.0, 0.0, 0.0]),
        ]);
        universe.set_atom(atoms).unwrap();
        for table in Table::Atom.downstream() {
            assert!(!universe.is_present(table), "{table} should be absent");
        }
        assert!(universe.is_periodic());
    }

    #[test]
    fn recomputing_molecules_keeps_two_body() {
        let mut universe = hydrogen_chain();
        universe.compute_molecule(false).unwrap();
        universe.visual_atom().unwrap();
        assert!(universe.is_present(Table::VisualAtom));

        universe.compute_molecule(false).unwrap();
        assert!(universe.is_present(Table::Two));
        assert!(universe.is_present(Table::Molecule));
        assert!(!universe.is_present(Table::VisualAtom));
    }

    #[test]
    fn recentered_molecule_uses_unwrapped_positions() {
        let mut universe = periodic_pair();
        universe.compute_molecule(true).unwrap();
        let center = universe.molecule().unwrap().get(0).unwrap().center_of_mass.unwrap();
        assert!(approx_eq(center[0], 0.025));

        let visual = universe.visual_atom_merged().unwrap();
        assert!(approx_eq(visual.get(1).unwrap().position[0], -0.05));
        let unit = universe.unit_atom_merged().unwrap();
        assert!(approx_eq(unit.get(1).unwrap().position[0], 9.95));
    }

    #[test]
    fn failed_recentering_leaves_molecules_absent() {
        let atoms = AtomTable::new(vec![
            Atom::new(0, "Qq", [0.0, 0.0, 0.0]),
            Atom::new(0, "H", [0.0, 0.7, 0.0]),
        ]);
        let mut universe = Universe::from_atoms(atoms).unwrap();
        universe.compute_molecule(false).unwrap();

        assert!(matches!(
            universe.compute_molecule(true),
            Err(Error::UnknownElement(s)) if s == "Qq"
        ));
        assert!(universe.is_present(Table::Two));
        assert!(!universe.is_present(Table::Molecule));
        assert!(!universe.is_present(Table::VisualAtom));

        let molecules = universe.molecule().unwrap();
        assert!(molecules.iter().all(|m| m.center_of_mass.is_none()));
    }

    #[test]
    fn classification_computes_molecules_on_demand() {
        let mut universe = trajectory();
        let rules = [ClassificationRule::new("H(2)O(1)", "solvent", true)];
        assert_eq!(universe.classify_molecules(&rules).unwrap(), 3);
        assert!(universe
            .molecule()
            .unwrap()
            .iter()
            .all(|m| m.classification.as_deref() == Some("solvent")));
    }

    #[test]
    fn parallel_strategy_matches_scalar() {
        let mut scalar = trajectory();
        let mut parallel = trajectory().with_two_body_config(TwoBodyConfig {
            strategy: Strategy::Parallel,
            ..Default::default()
        });
        assert_eq!(scalar.two().unwrap(), parallel.two().unwrap());
        assert_eq!(scalar.molecule().unwrap(), parallel.molecule().unwrap());
    }

    #[test]
    fn missing_atoms_are_reported() {
        let mut universe = Universe::default();
        assert!(matches!(
            universe.compute_two_body(),
            Err(Error::MissingData { missing: "atom", .. })
        ));
        assert!(!universe.is_present(Table::Two));
        assert!(universe.compute_frame().is_err());
    }

    #[test]
    fn construction_validates_frame_references() {
        let atoms = AtomTable::new(vec![Atom::new(1, "H", [0.0; 3])]);
        let frames = FrameTable::new().with_frame(0, Frame::new(1));
        assert!(matches!(
            Universe::new(Some(frames), atoms.clone()),
            Err(Error::FrameNotFound(1))
        ));

        let frames = FrameTable::new().with_frame(1, Frame::new(2));
        assert!(matches!(
            Universe::new(Some(frames), atoms),
            Err(Error::AtomCountMismatch {
                frame: 1,
                expected: 2,
                found: 1
            })
        ));
    }

    #[test]
    fn compute_frame_derives_minimal_frames() {
        let mut universe = periodic_pair();
        universe.unit_atom().unwrap();
        universe.compute_frame().unwrap();
        assert!(!universe.is_periodic());
        assert_eq!(universe.frame().get(0).unwrap().atom_count, 2);
        assert!(!universe.is_present(Table::UnitAtom));
    }

    #[test]
    fn slicing_restricts_base_tables() {
        let mut universe = trajectory();
        universe
            .append_field(
                vec![
                    FieldDimension::cubic(0.0, 1.0, 2, None, 10),
                    FieldDimension::cubic(0.0, 1.0, 2, None, 11),
                ],
                vec![
                    FieldValues::Scalar(vec![0.0; 8]),
                    FieldValues::Scalar(vec![1.0; 8]),
                ],
                Some(2),
            )
            .unwrap();
        universe.two().unwrap();

        let mut last = universe.slice(FrameSelection::Position(-1)).unwrap();
        assert_eq!(last.len(), 1);
        assert_eq!(last.frame().ids().collect::<Vec<_>>(), vec![2]);
        let atoms = last.atom().unwrap();
        assert_eq!(atoms.len(), 3);
        assert_eq!(atoms.get(0).unwrap().label, Some(0));
        assert!(approx_eq(atoms.get(0).unwrap().position[0], 3.0));
        assert_eq!(last.field().len(), 2);
        assert!(!last.is_present(Table::Two));
        assert_eq!(last.two().unwrap().free.len(), 3);

        let ends = universe
            .slice(FrameSelection::Range {
                start: None,
                stop: None,
                step: 2,
            })
            .unwrap();
        assert_eq!(ends.frame().ids().collect::<Vec<_>>(), vec![0, 2]);
        assert_eq!(ends.atom().unwrap().len(), 6);
        assert!(!ends.is_periodic());

        let middle = universe.slice(FrameSelection::Positions(vec![1])).unwrap();
        assert!(middle.is_periodic());
        assert!(middle.field().is_empty());

        assert!(matches!(
            universe.slice(FrameSelection::Position(5)),
            Err(Error::FramePosition { position: 5, len: 3 })
        ));
    }

    #[test]
    fn field_append_checks_frame_and_is_additive() {
        let mut universe = trajectory();
        let dim = |label| FieldDimension::cubic(-1.0, 1.0, 3, None, label);
        let scalar = || FieldValues::Scalar(vec![0.5; 27]);

        assert!(matches!(
            universe.append_field(vec![dim(0)], vec![scalar()], Some(7)),
            Err(Error::FrameNotFound(7))
        ));
        universe.append_field(vec![dim(0)], vec![scalar()], Some(1)).unwrap();
        universe.append_field(vec![dim(1)], vec![scalar()], None).unwrap();

        assert_eq!(universe.field().len(), 2);
        assert_eq!(universe.field().get(0).unwrap().dimension.frame, Some(1));
        assert_eq!(universe.field().get(1).unwrap().dimension.frame, None);
        assert_eq!(universe.field_bytes(), 2 * 27 * 8);
    }

    #[test]
    fn unsupported_operations_say_so() {
        let mut universe = trajectory();
        assert!(matches!(
            universe.append_dataframe(),
            Err(Error::Unsupported("append_dataframe"))
        ));
        assert!(matches!(
            universe.slice_by_molecules(&[0]),
            Err(Error::Unsupported("slice_by_molecules"))
        ));
    }

    #[test]
    fn universe_len_counts_frames() {
        let universe = trajectory();
        assert_eq!(universe.len(), 3);
        assert!(!universe.is_empty());
        assert!(universe.is_periodic());
        assert!(!universe.is_variable_cell());
        assert!(Universe::default().is_empty());
    }
}

//! Lossless JSON snapshots of a universe and its computed tables.
//!
//! The two-body settings are not part of a snapshot; a restored universe
//! uses the default [`TwoBodyConfig`](crate::TwoBodyConfig) until another
//! one is set.

use crate::Universe;
use crate::io::error::Error;
use crate::model::{
    atom::{AtomTable, ProjectedAtomTable, UnitAtom, VisualAtom},
    field::Field,
    frame::FrameTable,
    molecule::MoleculeTable,
    two::TwoBody,
};
use crate::universe::Cached;
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};

pub const SNAPSHOT_VERSION: u32 = 1;

/// Serialized form of a [`Universe`]: base tables plus whichever derived
/// tables were present when it was taken.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UniverseSnapshot {
    pub version: u32,
    pub frame: FrameTable,
    pub atom: Option<AtomTable>,
    #[serde(default)]
    pub field: Field,
    #[serde(default)]
    pub unit_atom: Option<UnitAtom>,
    #[serde(default)]
    pub projected_atom: Option<ProjectedAtomTable>,
    #[serde(default)]
    pub two: Option<TwoBody>,
    #[serde(default)]
    pub molecule: Option<MoleculeTable>,
    #[serde(default)]
    pub visual_atom: Option<VisualAtom>,
}

impl From<&Universe> for UniverseSnapshot {
    fn from(universe: &Universe) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            frame: universe.frame.clone(),
            atom: universe.atom.clone(),
            field: universe.field.clone(),
            unit_atom: universe.unit_atom.get().cloned(),
            projected_atom: universe.projected_atom.get().cloned(),
            two: universe.two.get().cloned(),
            molecule: universe.molecule.get().cloned(),
            visual_atom: universe.visual_atom.get().cloned(),
        }
    }
}

impl UniverseSnapshot {
    /// Rebuilds the universe, validating the base tables against each other.
    pub fn into_universe(self) -> Result<Universe, Error> {
        if self.version != SNAPSHOT_VERSION {
            return Err(Error::SnapshotVersion {
                found: self.version,
                expected: SNAPSHOT_VERSION,
            });
        }

        let mut universe = match self.atom {
            Some(atom) => Universe::new(Some(self.frame), atom)?,
            None => Universe {
                frame: self.frame,
                ..Default::default()
            },
        };
        universe.field = self.field;
        universe.unit_atom = Cached::from(self.unit_atom);
        universe.projected_atom = Cached::from(self.projected_atom);
        universe.two = Cached::from(self.two);
        universe.molecule = Cached::from(self.molecule);
        universe.visual_atom = Cached::from(self.visual_atom);
        Ok(universe)
    }
}

pub fn write<W: Write>(writer: W, universe: &Universe) -> Result<(), Error> {
    serde_json::to_writer_pretty(writer, &UniverseSnapshot::from(universe))?;
    Ok(())
}

pub fn read<R: Read>(reader: R) -> Result<Universe, Error> {
    let snapshot: UniverseSnapshot = serde_json::from_reader(reader)?;
    snapshot.into_universe()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Table;
    use crate::model::{
        atom::Atom,
        field::{FieldDimension, FieldValues},
        frame::Frame,
    };
    use std::io::Cursor;

    fn periodic_universe() -> Universe {
        let frames = FrameTable::new().with_frame(0, Frame::orthorhombic(3, 10.0, 10.0, 10.0));
        let atoms = AtomTable::new(vec![
            Atom::new(0, "H", [10.1, 0.0, 0.0]),
            Atom::new(0, "H", [9.95, 0.0, 0.0]),
            Atom::new(0, "O", [5.0, 5.0, 5.0]).with_label(7),
        ]);
        Universe::new(Some(frames), atoms).unwrap()
    }

    #[test]
    fn computed_tables_survive_a_round_trip() {
        let mut universe = periodic_universe();
        universe.compute_molecule(true).unwrap();
        universe
            .append_field(
                vec![FieldDimension::cubic(-1.0, 1.0, 2, None, 3)],
                vec![FieldValues::Scalar(vec![0.5; 8])],
                None,
            )
            .unwrap();

        let mut buf = Vec::new();
        write(&mut buf, &universe).expect("write snapshot");
        let restored = read(Cursor::new(buf)).expect("read snapshot");

        for table in [
            Table::UnitAtom,
            Table::ProjectedAtom,
            Table::Two,
            Table::Molecule,
            Table::VisualAtom,
        ] {
            assert_eq!(
                restored.is_present(table),
                universe.is_present(table),
                "{table}"
            );
        }
        assert_eq!(
            UniverseSnapshot::from(&restored),
            UniverseSnapshot::from(&universe)
        );
        assert_eq!(restored.atom().unwrap().get(2).unwrap().label, Some(7));
        assert_eq!(restored.field().len(), 1);
    }

    #[test]
    fn absent_tables_stay_absent() {
        let universe = periodic_universe();
        let mut buf = Vec::new();
        write(&mut buf, &universe).expect("write snapshot");
        let restored = read(Cursor::new(buf)).expect("read snapshot");

        assert!(!restored.is_present(Table::UnitAtom));
        assert!(!restored.is_present(Table::Two));
        assert_eq!(restored.frame(), universe.frame());
    }

    #[test]
    fn inconsistent_base_tables_are_rejected() {
        let mut snapshot = UniverseSnapshot::from(&periodic_universe());
        snapshot.frame = FrameTable::new().with_frame(0, Frame::new(2));
        assert!(matches!(
            snapshot.clone().into_universe(),
            Err(Error::Universe(crate::Error::AtomCountMismatch { .. }))
        ));

        snapshot.version = 99;
        assert!(matches!(
            snapshot.into_universe(),
            Err(Error::SnapshotVersion { found: 99, .. })
        ));
    }

    #[test]
    fn malformed_json_is_a_json_error() {
        assert!(matches!(read(Cursor::new("{")), Err(Error::Json(_))));
    }
}

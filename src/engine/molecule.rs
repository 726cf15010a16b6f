//! Molecule perception from the bond graph.

use crate::error::Error;
use crate::model::atom::AtomTable;
use crate::model::molecule::{Formula, Molecule, MoleculeTable};
use crate::model::two::TwoBody;
use crate::model::types::Element;
use log::debug;
use petgraph::unionfind::UnionFind;
use std::collections::HashMap;

/// Groups atoms into connected components of the bond graph.
///
/// Periodic bonds join their source atoms. Molecules are numbered by frame,
/// then by their lowest atom identifier; isolated atoms form molecules of
/// their own.
pub fn compute_molecule(atoms: &AtomTable, two: &TwoBody) -> MoleculeTable {
    let mut components = UnionFind::<usize>::new(atoms.len());
    for pair in two.bonds() {
        components.union(pair.atom0, pair.atom1);
    }

    let mut molecules: Vec<Molecule> = Vec::new();
    for (frame, ids) in atoms.by_frame() {
        let mut by_root: HashMap<usize, usize> = HashMap::new();
        for id in ids {
            let root = components.find(id);
            let index = *by_root.entry(root).or_insert_with(|| {
                molecules.push(Molecule {
                    id: molecules.len(),
                    frame,
                    atoms: Vec::new(),
                    formula: Formula::default(),
                    center_of_mass: None,
                    classification: None,
                });
                molecules.len() - 1
            });
            molecules[index].atoms.push(id);
        }
    }

    let slice = atoms.as_slice();
    for molecule in &mut molecules {
        molecule.formula =
            Formula::from_symbols(molecule.atoms.iter().map(|&id| slice[id].symbol.as_str()));
    }

    debug!(
        "molecule: {} molecules from {} atoms",
        molecules.len(),
        atoms.len()
    );
    MoleculeTable::new(molecules)
}

/// Mass-weighted centers from `positions`, which should hold unwrapped
/// coordinates so periodic molecules are not split by the cell.
pub fn compute_center_of_mass(
    molecules: &mut MoleculeTable,
    positions: &AtomTable,
) -> Result<(), Error> {
    let mut masses: HashMap<&str, f64> = HashMap::new();
    let mut centers = Vec::with_capacity(molecules.len());

    for molecule in molecules.iter() {
        let mut total = 0.0;
        let mut weighted = [0.0; 3];
        for &id in &molecule.atoms {
            let atom = positions.get(id).ok_or(Error::AtomNotFound(id))?;
            let mass = match masses.get(atom.symbol.as_str()) {
                Some(m) => *m,
                None => {
                    let m = Element::from_symbol_ignore_case(&atom.symbol)
                        .map(|e| e.atomic_mass())
                        .ok_or_else(|| Error::UnknownElement(atom.symbol.clone()))?;
                    masses.insert(atom.symbol.as_str(), m);
                    m
                }
            };
            total += mass;
            for (w, x) in weighted.iter_mut().zip(atom.position) {
                *w += mass * x;
            }
        }
        centers.push(weighted.map(|w| w / total));
    }

    for (molecule, center) in molecules.iter_mut().zip(centers) {
        molecule.center_of_mass = Some(center);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::atom::Atom;
    use crate::model::two::Pair;

    fn bond(frame: usize, atom0: usize, atom1: usize) -> Pair {
        Pair {
            frame,
            atom0,
            atom1,
            distance: 1.0,
            bond: true,
        }
    }

    fn two_frames() -> (AtomTable, TwoBody) {
        let atoms = AtomTable::new(vec![
            Atom::new(0, "H", [0.0, 0.0, 0.0]),
            Atom::new(0, "Na", [5.0, 0.0, 0.0]),
            Atom::new(0, "O", [0.0, 1.0, 0.0]),
            Atom::new(0, "H", [0.0, 2.0, 0.0]),
            Atom::new(1, "H", [0.0, 0.0, 0.0]),
            Atom::new(1, "H", [0.0, 0.7, 0.0]),
        ]);
        let two = TwoBody {
            free: vec![
                bond(0, 0, 2),
                bond(0, 2, 3),
                Pair {
                    bond: false,
                    ..bond(0, 0, 1)
                },
                bond(1, 4, 5),
            ],
            periodic: Vec::new(),
        };
        (atoms, two)
    }

    #[test]
    fn components_partition_every_frame() {
        let (atoms, two) = two_frames();
        let molecules = compute_molecule(&atoms, &two);

        assert_eq!(molecules.len(), 3);
        let summary: Vec<_> = molecules
            .iter()
            .map(|m| (m.id, m.frame, m.atoms.clone(), m.formula.to_string()))
            .collect();
        assert_eq!(
            summary,
            vec![
                (0, 0, vec![0, 2, 3], "H(2)O(1)".to_string()),
                (1, 0, vec![1], "Na(1)".to_string()),
                (2, 1, vec![4, 5], "H(2)".to_string()),
            ]
        );

        let mut seen: Vec<usize> = molecules.iter().flat_map(|m| m.atoms.clone()).collect();
        seen.sort_unstable();
        assert_eq!(seen, (0..atoms.len()).collect::<Vec<_>>());
    }

    #[test]
    fn center_of_mass_is_mass_weighted() {
        let (atoms, two) = two_frames();
        let mut molecules = compute_molecule(&atoms, &two);
        compute_center_of_mass(&mut molecules, &atoms).unwrap();

        let h2 = molecules.get(2).unwrap().center_of_mass.unwrap();
        assert!((h2[1] - 0.35).abs() < 1e-9);

        let water = molecules.get(0).unwrap().center_of_mass.unwrap();
        let h = Element::H.atomic_mass();
        let o = Element::O.atomic_mass();
        let expected_y = (o * 1.0 + h * 2.0) / (2.0 * h + o);
        assert!((water[1] - expected_y).abs() < 1e-9);
    }

    #[test]
    fn unknown_symbol_blocks_center_of_mass() {
        let atoms = AtomTable::new(vec![Atom::new(0, "Qq", [0.0; 3])]);
        let mut molecules = compute_molecule(&atoms, &TwoBody::default());
        assert!(matches!(
            compute_center_of_mass(&mut molecules, &atoms),
            Err(Error::UnknownElement(s)) if s == "Qq"
        ));
        assert!(molecules.get(0).unwrap().center_of_mass.is_none());
    }
}

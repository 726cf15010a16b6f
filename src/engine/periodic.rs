//! Periodic-boundary geometry: unit-cell folding, supercell projection and
//! molecule unwrapping.

use super::{Cell, FrameGroup, Strategy, frame_groups, map_frames};
use crate::error::Error;
use crate::model::atom::{
    AtomTable, IMAGE_COUNT, PositionOverlay, ProjectedAtom, ProjectedAtomTable, UnitAtom,
    VisualAtom, image_translation, projected_id,
};
use crate::model::frame::FrameTable;
use crate::model::molecule::MoleculeTable;
use crate::model::two::TwoBody;
use log::debug;
use std::collections::{HashMap, VecDeque};

/// Positions closer than this to their raw value are not stored in an overlay.
const POSITION_TOLERANCE: f64 = 1e-8;

/// Fractional coordinates this close below 1 wrap to 0.
const WRAP_EPSILON: f64 = 1e-12;

fn moved(a: [f64; 3], b: [f64; 3]) -> bool {
    a.iter().zip(&b).any(|(x, y)| (x - y).abs() > POSITION_TOLERANCE)
}

fn periodic_groups<'a>(
    frames: &'a FrameTable,
    atoms: &AtomTable,
) -> Result<Vec<(FrameGroup<'a>, Cell)>, Error> {
    frame_groups(frames, atoms)?
        .into_iter()
        .filter(|g| g.frame.is_periodic)
        .map(|g| {
            let cell = Cell::for_frame(g.id, g.frame)?;
            Ok((g, cell))
        })
        .collect()
}

/// Maps `position` into the primary cell, `[0, 1)` on every fractional axis.
pub fn fold(cell: &Cell, position: [f64; 3]) -> [f64; 3] {
    let mut frac = cell.to_fractional(position);
    for x in &mut frac {
        *x = x.rem_euclid(1.0);
        if 1.0 - *x < WRAP_EPSILON {
            *x = 0.0;
        }
    }
    cell.to_cartesian(frac)
}

/// Folds atoms of periodic frames into their unit cell.
///
/// Only atoms whose folded position differs from the raw one are stored.
pub fn compute_unit_atom(
    frames: &FrameTable,
    atoms: &AtomTable,
    strategy: Strategy,
) -> Result<UnitAtom, Error> {
    let groups = periodic_groups(frames, atoms)?;
    let per_frame = map_frames(strategy, &groups, |(group, cell)| {
        let mut rows = Vec::new();
        for &id in &group.atoms {
            let raw = atoms.as_slice()[id].position;
            let folded = fold(cell, raw);
            if moved(raw, folded) {
                rows.push((id, folded));
            }
        }
        Ok(rows)
    })?;

    let mut unit = PositionOverlay::new();
    for (id, position) in per_frame.into_iter().flatten() {
        unit.insert(id, position);
    }
    debug!(
        "unit atom: folded {} of {} atoms in {} periodic frames",
        unit.len(),
        atoms.len(),
        groups.len()
    );
    Ok(unit)
}

/// Generates the 27 supercell images of every atom in a periodic frame.
pub fn compute_projected_atom(
    frames: &FrameTable,
    atoms: &AtomTable,
    unit: &UnitAtom,
    strategy: Strategy,
) -> Result<ProjectedAtomTable, Error> {
    let groups = periodic_groups(frames, atoms)?;
    let per_frame = map_frames(strategy, &groups, |(group, cell)| {
        let mut rows = Vec::with_capacity(group.atoms.len() * IMAGE_COUNT);
        for &id in &group.atoms {
            let base = unit
                .position(atoms, id)
                .ok_or(Error::AtomNotFound(id))?;
            for image in 0..IMAGE_COUNT as u8 {
                rows.push(ProjectedAtom {
                    id: projected_id(id, image),
                    atom: id,
                    frame: group.id,
                    image,
                    position: cell.translate(base, image_translation(image)),
                    bond_count: None,
                });
            }
        }
        Ok(rows)
    })?;

    let mut rows: Vec<ProjectedAtom> = per_frame.into_iter().flatten().collect();
    rows.sort_by_key(|r| r.id);
    debug!("projected atom: {} images", rows.len());
    Ok(ProjectedAtomTable::new(rows))
}

/// Unwraps molecules of periodic frames so bonded atoms sit next to each
/// other instead of on opposite faces of the cell.
///
/// Each molecule is walked breadth-first over its bonds from its lowest
/// atom, which keeps its folded position. Every neighbour is placed at the
/// displacement of the image the bond was found with.
pub fn compute_visual_atom(
    frames: &FrameTable,
    atoms: &AtomTable,
    unit: &UnitAtom,
    two: &TwoBody,
    molecules: &MoleculeTable,
) -> Result<VisualAtom, Error> {
    let mut cells = HashMap::new();
    for (group, cell) in periodic_groups(frames, atoms)? {
        cells.insert(group.id, cell);
    }

    let folded = |id: usize| unit.position(atoms, id).ok_or(Error::AtomNotFound(id));

    let mut edges: HashMap<usize, Vec<(usize, [f64; 3])>> = HashMap::new();
    for row in two.periodic.iter().filter(|p| p.pair.bond) {
        let Some(cell) = cells.get(&row.pair.frame) else {
            continue;
        };
        let (a, b) = (row.pair.atom0, row.pair.atom1);
        let image = (row.prjd_atom1 % IMAGE_COUNT) as u8;
        let origin = folded(a)?;
        let target = cell.translate(folded(b)?, image_translation(image));
        let d = [target[0] - origin[0], target[1] - origin[1], target[2] - origin[2]];
        edges.entry(a).or_default().push((b, d));
        edges.entry(b).or_default().push((a, [-d[0], -d[1], -d[2]]));
    }

    let mut visual = PositionOverlay::new();
    for molecule in molecules.iter().filter(|m| cells.contains_key(&m.frame)) {
        let Some(&root) = molecule.atoms.first() else {
            continue;
        };
        let mut placed: HashMap<usize, [f64; 3]> = HashMap::new();
        placed.insert(root, folded(root)?);
        let mut queue = VecDeque::from([root]);

        while let Some(current) = queue.pop_front() {
            let here = placed[&current];
            for &(next, d) in edges.get(&current).map(Vec::as_slice).unwrap_or_default() {
                if placed.contains_key(&next) {
                    continue;
                }
                placed.insert(next, [here[0] + d[0], here[1] + d[1], here[2] + d[2]]);
                queue.push_back(next);
            }
        }

        for (id, position) in placed {
            let raw = atoms.get(id).ok_or(Error::AtomNotFound(id))?.position;
            if moved(raw, position) {
                visual.insert(id, position);
            }
        }
    }
    debug!("visual atom: {} unwrapped positions", visual.len());
    Ok(visual)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::atom::{Atom, IDENTITY_IMAGE};
    use crate::model::frame::Frame;
    use crate::model::molecule::{Formula, Molecule};
    use crate::model::two::{Pair, PeriodicPair};

    fn approx_eq(a: [f64; 3], b: [f64; 3]) -> bool {
        a.iter().zip(&b).all(|(x, y)| (x - y).abs() < 1e-9)
    }

    fn cubic(atoms: &AtomTable, side: f64) -> FrameTable {
        let mut frames = FrameTable::minimal(atoms);
        frames.set_cell([[side, 0.0, 0.0], [0.0, side, 0.0], [0.0, 0.0, side]]);
        frames
    }

    #[test]
    fn folding_is_sparse_and_idempotent() {
        let atoms = AtomTable::new(vec![
            Atom::new(0, "H", [1.0, 2.0, 3.0]),
            Atom::new(0, "H", [11.0, -2.0, 3.0]),
            Atom::new(0, "H", [-0.5, 0.0, 25.0]),
        ]);
        let frames = cubic(&atoms, 10.0);
        let unit = compute_unit_atom(&frames, &atoms, Strategy::Scalar).unwrap();

        assert_eq!(unit.len(), 2);
        assert!(unit.get(0).is_none());
        assert!(approx_eq(unit.get(1).unwrap(), [1.0, 8.0, 3.0]));
        assert!(approx_eq(unit.get(2).unwrap(), [9.5, 0.0, 5.0]));

        let folded = unit.merge(&atoms);
        let again = compute_unit_atom(&frames, &folded, Strategy::Scalar).unwrap();
        assert!(again.is_empty());
    }

    #[test]
    fn free_frames_are_not_folded() {
        let atoms = AtomTable::new(vec![Atom::new(0, "H", [42.0, -7.0, 0.0])]);
        let frames = FrameTable::minimal(&atoms);
        assert!(compute_unit_atom(&frames, &atoms, Strategy::Scalar).unwrap().is_empty());
        let unit = UnitAtom::new();
        let projected =
            compute_projected_atom(&frames, &atoms, &unit, Strategy::Scalar).unwrap();
        assert!(projected.is_empty());
    }

    #[test]
    fn periodic_frame_without_cell_fails() {
        let atoms = AtomTable::new(vec![Atom::new(0, "H", [0.0; 3])]);
        let mut frame = Frame::orthorhombic(1, 5.0, 5.0, 5.0);
        frame.cell = None;
        let frames = FrameTable::new().with_frame(0, frame);
        assert!(matches!(
            compute_unit_atom(&frames, &atoms, Strategy::Scalar),
            Err(Error::InvalidCell { frame: 0, .. })
        ));
    }

    #[test]
    fn projection_emits_all_images_in_order() {
        let atoms = AtomTable::new(vec![
            Atom::new(0, "H", [1.0, 2.0, 3.0]),
            Atom::new(0, "O", [12.0, 2.0, 3.0]),
        ]);
        let frames = cubic(&atoms, 10.0);
        let unit = compute_unit_atom(&frames, &atoms, Strategy::Scalar).unwrap();
        let projected =
            compute_projected_atom(&frames, &atoms, &unit, Strategy::Parallel).unwrap();

        assert_eq!(projected.len(), 2 * IMAGE_COUNT);
        let ids: Vec<_> = projected.iter().map(|r| r.id).collect();
        assert_eq!(ids, (0..54).collect::<Vec<_>>());

        let identity = projected.get(projected_id(1, IDENTITY_IMAGE)).unwrap();
        assert!(approx_eq(identity.position, unit.position(&atoms, 1).unwrap()));
        let corner = projected.get(projected_id(1, 0)).unwrap();
        assert!(approx_eq(corner.position, [-8.0, -8.0, -7.0]));
    }

    #[test]
    fn bonded_molecule_is_unwrapped_across_the_boundary() {
        let atoms = AtomTable::new(vec![
            Atom::new(0, "H", [0.1, 5.0, 5.0]),
            Atom::new(0, "H", [9.95, 5.0, 5.0]),
        ]);
        let frames = cubic(&atoms, 10.0);
        let unit = compute_unit_atom(&frames, &atoms, Strategy::Scalar).unwrap();
        let two = TwoBody {
            free: Vec::new(),
            periodic: vec![PeriodicPair {
                pair: Pair {
                    frame: 0,
                    atom0: 0,
                    atom1: 1,
                    distance: 0.15,
                    bond: true,
                },
                prjd_atom0: projected_id(0, IDENTITY_IMAGE),
                prjd_atom1: projected_id(1, 4),
            }],
        };
        let molecules = MoleculeTable::new(vec![Molecule {
            id: 0,
            frame: 0,
            atoms: vec![0, 1],
            formula: Formula::from_symbols(["H", "H"]),
            center_of_mass: None,
            classification: None,
        }]);

        let visual = compute_visual_atom(&frames, &atoms, &unit, &two, &molecules).unwrap();
        assert_eq!(visual.len(), 1);
        assert!(approx_eq(visual.get(1).unwrap(), [-0.05, 5.0, 5.0]));
        assert!(visual.get(0).is_none());
    }
}

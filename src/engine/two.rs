//! Pairwise distances, bond perception and bond counting.

use super::cutoffs::ThresholdLookup;
use super::spatial::{SpatialGrid, distance_sq};
use super::{FrameGroup, TwoBodyConfig, frame_groups, map_frames};
use crate::error::Error;
use crate::model::atom::{
    AtomTable, IDENTITY_IMAGE, IMAGE_COUNT, ProjectedAtomTable, UNBONDED_IMAGE, projected_id,
};
use crate::model::frame::FrameTable;
use crate::model::two::{Pair, PeriodicPair, TwoBody};
use log::debug;
use std::collections::HashMap;

/// Computes two-body tables under a validated configuration.
pub struct TwoBodyEngine<'a> {
    config: &'a TwoBodyConfig,
    thresholds: ThresholdLookup<'a>,
}

impl<'a> TwoBodyEngine<'a> {
    pub fn new(config: &'a TwoBodyConfig) -> Result<Self, Error> {
        config.validate()?;
        Ok(Self {
            config,
            thresholds: ThresholdLookup::new(&config.cutoffs),
        })
    }

    fn pair(&self, atoms: &AtomTable, frame: usize, a: usize, b: usize, distance: f64) -> Pair {
        let slice = atoms.as_slice();
        let threshold = self.thresholds.threshold(&slice[a].symbol, &slice[b].symbol);
        Pair {
            frame,
            atom0: a,
            atom1: b,
            distance,
            bond: distance <= threshold,
        }
    }

    /// Computes every pair of every frame.
    ///
    /// Free frames use raw positions. Periodic frames use `projected`, which
    /// must hold all 27 images of each of their atoms; for every pair only
    /// the closest image of the higher atom is kept.
    pub fn compute(
        &self,
        frames: &FrameTable,
        atoms: &AtomTable,
        projected: Option<&ProjectedAtomTable>,
    ) -> Result<TwoBody, Error> {
        let (periodic, free): (Vec<_>, Vec<_>) = frame_groups(frames, atoms)?
            .into_iter()
            .partition(|g| g.frame.is_periodic);

        let free_rows = map_frames(self.config.strategy, &free, |g| Ok(self.free_pairs(atoms, g)))?;

        let periodic_rows = if periodic.is_empty() {
            Vec::new()
        } else {
            let projected = projected
                .filter(|p| !p.is_truncated())
                .ok_or(Error::missing_data("periodic two-body", "projected atom"))?;
            map_frames(self.config.strategy, &periodic, |g| {
                self.periodic_pairs(atoms, projected, g)
            })?
        };

        let two = TwoBody {
            free: free_rows.into_iter().flatten().collect(),
            periodic: periodic_rows.into_iter().flatten().collect(),
        };
        debug!(
            "two-body: {} free and {} periodic pairs, {} bonds",
            two.free.len(),
            two.periodic.len(),
            two.bond_count()
        );
        Ok(two)
    }

    fn free_pairs(&self, atoms: &AtomTable, group: &FrameGroup<'_>) -> Vec<Pair> {
        let slice = atoms.as_slice();
        let positions: Vec<[f64; 3]> = group.atoms.iter().map(|&id| slice[id].position).collect();

        let local_pairs: Vec<(usize, usize)> = match self.config.max_distance {
            Some(ceiling) => SpatialGrid::from_positions(&positions, ceiling)
                .pairs_within(&positions, ceiling),
            None => (0..positions.len())
                .flat_map(|i| (i + 1..positions.len()).map(move |j| (i, j)))
                .collect(),
        };

        local_pairs
            .into_iter()
            .map(|(i, j)| {
                let distance = distance_sq(positions[i], positions[j]).sqrt();
                self.pair(atoms, group.id, group.atoms[i], group.atoms[j], distance)
            })
            .collect()
    }

    fn periodic_pairs(
        &self,
        atoms: &AtomTable,
        projected: &ProjectedAtomTable,
        group: &FrameGroup<'_>,
    ) -> Result<Vec<PeriodicPair>, Error> {
        let mut images: Vec<[[f64; 3]; IMAGE_COUNT]> = Vec::with_capacity(group.atoms.len());
        for &id in &group.atoms {
            let mut set = [[0.0; 3]; IMAGE_COUNT];
            for (image, slot) in set.iter_mut().enumerate() {
                *slot = projected
                    .get(projected_id(id, image as u8))
                    .ok_or(Error::missing_data("periodic two-body", "projected atom"))?
                    .position;
            }
            images.push(set);
        }

        let ceiling_sq = self.config.max_distance.map(|d| d * d);
        let mut rows = Vec::new();
        for i in 0..images.len() {
            let origin = images[i][usize::from(IDENTITY_IMAGE)];
            for j in i + 1..images.len() {
                // Strict comparison keeps the lowest image index on ties.
                let mut best = (0, f64::INFINITY);
                for (image, position) in images[j].iter().enumerate() {
                    let d_sq = distance_sq(origin, *position);
                    if d_sq < best.1 {
                        best = (image, d_sq);
                    }
                }
                if ceiling_sq.is_some_and(|c| best.1 > c) {
                    continue;
                }
                let (a, b) = (group.atoms[i], group.atoms[j]);
                rows.push(PeriodicPair {
                    pair: self.pair(atoms, group.id, a, b, best.1.sqrt()),
                    prjd_atom0: projected_id(a, IDENTITY_IMAGE),
                    prjd_atom1: projected_id(b, best.0 as u8),
                });
            }
        }
        Ok(rows)
    }
}

/// Number of bonds of each atom; atoms without bonds count 0.
pub fn compute_bond_count(two: &TwoBody, atom_count: usize) -> Vec<u32> {
    let mut counts = vec![0; atom_count];
    for pair in two.bonds() {
        counts[pair.atom0] += 1;
        counts[pair.atom1] += 1;
    }
    counts
}

/// Stores on each projected row the number of bonds referencing it, or
/// [`UNBONDED_IMAGE`] when none do.
pub fn compute_projected_bond_count(two: &TwoBody, projected: &mut ProjectedAtomTable) {
    let mut counts: HashMap<usize, i32> = HashMap::new();
    for row in two.periodic.iter().filter(|p| p.pair.bond) {
        *counts.entry(row.prjd_atom0).or_insert(0) += 1;
        *counts.entry(row.prjd_atom1).or_insert(0) += 1;
    }
    for row in projected.rows_mut() {
        row.bond_count = Some(counts.get(&row.id).copied().unwrap_or(UNBONDED_IMAGE));
    }
}

/// Drops projected rows that no periodic pair references.
pub fn truncate_projected_atom(two: &TwoBody, projected: &mut ProjectedAtomTable) {
    let keep = two.referenced_projections();
    let before = projected.len();
    projected.retain(|row| keep.binary_search(&row.id).is_ok());
    debug!(
        "projected atom truncated from {before} to {} rows",
        projected.len()
    );
}

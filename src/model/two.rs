use serde::{Deserialize, Serialize};

/// One unordered atom pair within a frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pair {
    pub frame: usize,
    /// Lower atom identifier of the pair.
    pub atom0: usize,
    /// Higher atom identifier of the pair.
    pub atom1: usize,
    pub distance: f64,
    pub bond: bool,
}

/// A pair from a periodic frame together with the images that realize
/// its minimum distance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PeriodicPair {
    #[serde(flatten)]
    pub pair: Pair,
    /// Projected identifier of `atom0`'s image (always the identity image).
    pub prjd_atom0: usize,
    /// Projected identifier of the nearest image of `atom1`.
    pub prjd_atom1: usize,
}

/// Pairwise distances and bond decisions, split by frame periodicity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TwoBody {
    pub free: Vec<Pair>,
    pub periodic: Vec<PeriodicPair>,
}

impl TwoBody {
    pub fn len(&self) -> usize {
        self.free.len() + self.periodic.len()
    }

    pub fn is_empty(&self) -> bool {
        self.free.is_empty() && self.periodic.is_empty()
    }

    /// Every pair, free rows first, each group in stored order.
    pub fn pairs(&self) -> impl Iterator<Item = &Pair> + '_ {
        self.free.iter().chain(self.periodic.iter().map(|p| &p.pair))
    }

    pub fn bonds(&self) -> impl Iterator<Item = &Pair> + '_ {
        self.pairs().filter(|p| p.bond)
    }

    pub fn bond_count(&self) -> usize {
        self.bonds().count()
    }

    /// Distance between two atoms of the same frame, in either argument order.
    pub fn distance(&self, a: usize, b: usize) -> Option<f64> {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        self.pairs()
            .find(|p| p.atom0 == lo && p.atom1 == hi)
            .map(|p| p.distance)
    }

    /// Projected identifiers referenced by periodic rows, sorted and deduplicated.
    pub fn referenced_projections(&self) -> Vec<usize> {
        let mut ids: Vec<usize> = self
            .periodic
            .iter()
            .flat_map(|p| [p.prjd_atom0, p.prjd_atom1])
            .collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }
}

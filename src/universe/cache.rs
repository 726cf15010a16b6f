//! Cache state of derived tables and the dependency graph between tables.

use std::fmt;

/// A derived table that is either absent or computed.
#[derive(Debug, Clone, PartialEq)]
pub enum Cached<T> {
    Absent,
    Present(T),
}

impl<T> Default for Cached<T> {
    fn default() -> Self {
        Self::Absent
    }
}

impl<T> Cached<T> {
    pub fn is_present(&self) -> bool {
        matches!(self, Self::Present(_))
    }

    pub fn get(&self) -> Option<&T> {
        match self {
            Self::Present(value) => Some(value),
            Self::Absent => None,
        }
    }

    pub fn get_mut(&mut self) -> Option<&mut T> {
        match self {
            Self::Present(value) => Some(value),
            Self::Absent => None,
        }
    }

    /// Resets to `Absent`, returning the previous value.
    pub fn take(&mut self) -> Option<T> {
        match std::mem::take(self) {
            Self::Present(value) => Some(value),
            Self::Absent => None,
        }
    }
}

impl<T> From<Option<T>> for Cached<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Absent, Self::Present)
    }
}

/// Every table a universe holds, base and derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Frame,
    Atom,
    UnitAtom,
    ProjectedAtom,
    Two,
    BondCount,
    ProjectedBondCount,
    Molecule,
    VisualAtom,
}

impl Table {
    /// Tables computed directly from this one.
    pub fn dependents(self) -> &'static [Table] {
        match self {
            Table::Frame | Table::Atom => &[Table::UnitAtom],
            Table::UnitAtom => &[Table::ProjectedAtom, Table::Two, Table::VisualAtom],
            Table::ProjectedAtom => &[Table::Two, Table::ProjectedBondCount],
            Table::Two => &[
                Table::BondCount,
                Table::ProjectedBondCount,
                Table::Molecule,
                Table::VisualAtom,
            ],
            Table::Molecule => &[Table::VisualAtom],
            Table::BondCount | Table::ProjectedBondCount | Table::VisualAtom => &[],
        }
    }

    /// Every table transitively computed from this one, nearest first.
    pub fn downstream(self) -> Vec<Table> {
        let mut found: Vec<Table> = Vec::new();
        let mut next = 0;
        found.extend(self.dependents());
        while next < found.len() {
            for &dep in found[next].dependents() {
                if !found.contains(&dep) {
                    found.push(dep);
                }
            }
            next += 1;
        }
        found
    }

    pub fn is_base(self) -> bool {
        matches!(self, Table::Frame | Table::Atom)
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Table::Frame => "frame",
            Table::Atom => "atom",
            Table::UnitAtom => "unit atom",
            Table::ProjectedAtom => "projected atom",
            Table::Two => "two-body",
            Table::BondCount => "bond count",
            Table::ProjectedBondCount => "projected bond count",
            Table::Molecule => "molecule",
            Table::VisualAtom => "visual atom",
        };
        f.write_str(name)
    }
}

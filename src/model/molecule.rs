use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Element multiset of a molecule.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Formula(BTreeMap<String, usize>);

impl Formula {
    pub fn from_symbols<'a>(symbols: impl IntoIterator<Item = &'a str>) -> Self {
        let mut counts = BTreeMap::new();
        for symbol in symbols {
            *counts.entry(symbol.to_string()).or_insert(0) += 1;
        }
        Self(counts)
    }

    pub fn count(&self, symbol: &str) -> usize {
        self.0.get(symbol).copied().unwrap_or(0)
    }

    pub fn atom_count(&self) -> usize {
        self.0.values().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> + '_ {
        self.0.iter().map(|(s, n)| (s.as_str(), *n))
    }

    /// Parses `H(2)O(1)`, `H2O` or `NaCl` style text; a symbol without a
    /// count counts once. Returns `None` for empty or malformed text.
    pub fn parse(text: &str) -> Option<Self> {
        let mut counts = BTreeMap::new();
        let mut chars = text.trim().chars().peekable();
        while let Some(first) = chars.next() {
            if !first.is_ascii_uppercase() {
                return None;
            }
            let mut symbol = first.to_string();
            while let Some(c) = chars.next_if(char::is_ascii_lowercase) {
                symbol.push(c);
            }

            let parenthesized = chars.next_if_eq(&'(').is_some();
            let mut digits = String::new();
            while let Some(c) = chars.next_if(char::is_ascii_digit) {
                digits.push(c);
            }
            if parenthesized && chars.next_if_eq(&')').is_none() {
                return None;
            }
            let count = match digits.as_str() {
                "" if parenthesized => return None,
                "" => 1,
                n => n.parse::<usize>().ok().filter(|&n| n > 0)?,
            };
            *counts.entry(symbol).or_insert(0) += count;
        }
        (!counts.is_empty()).then_some(Self(counts))
    }
}

/// Renders symbols in ascending order as `Symbol(count)`, e.g. `H(2)O(1)`.
impl fmt::Display for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (symbol, count) in &self.0 {
            write!(f, "{symbol}({count})")?;
        }
        Ok(())
    }
}

/// One connected component of a frame's bond graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Molecule {
    pub id: usize,
    pub frame: usize,
    /// Member atom identifiers, ascending.
    pub atoms: Vec<usize>,
    pub formula: Formula,
    pub center_of_mass: Option<[f64; 3]>,
    pub classification: Option<String>,
}

/// A classification rule matched against molecule formulas.
///
/// `pattern` is read as a formula. Exact rules require the same element
/// counts; the others match when every element of the pattern is present.
/// A pattern that is not a formula matches nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassificationRule {
    pub pattern: String,
    pub label: String,
    pub exact: bool,
}

impl ClassificationRule {
    pub fn new(pattern: impl Into<String>, label: impl Into<String>, exact: bool) -> Self {
        Self {
            pattern: pattern.into(),
            label: label.into(),
            exact,
        }
    }

    pub fn matches(&self, formula: &Formula) -> bool {
        let Some(pattern) = Formula::parse(&self.pattern) else {
            return false;
        };
        if self.exact {
            pattern == *formula
        } else {
            pattern.iter().all(|(symbol, _)| formula.count(symbol) > 0)
        }
    }
}

/// Molecules ordered by frame, then by lowest member atom.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MoleculeTable {
    molecules: Vec<Molecule>,
}

impl MoleculeTable {
    pub(crate) fn new(molecules: Vec<Molecule>) -> Self {
        Self { molecules }
    }

    pub fn len(&self) -> usize {
        self.molecules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.molecules.is_empty()
    }

    pub fn get(&self, id: usize) -> Option<&Molecule> {
        self.molecules.get(id)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Molecule> {
        self.molecules.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> std::slice::IterMut<'_, Molecule> {
        self.molecules.iter_mut()
    }

    /// Labels every molecule with the first matching rule; molecules matching
    /// no rule lose any previous label. Returns how many were labelled.
    pub fn classify(&mut self, rules: &[ClassificationRule]) -> usize {
        let mut labelled = 0;
        for molecule in &mut self.molecules {
            molecule.classification = rules
                .iter()
                .find(|r| r.matches(&molecule.formula))
                .map(|r| r.label.clone());
            labelled += usize::from(molecule.classification.is_some());
        }
        labelled
    }
}

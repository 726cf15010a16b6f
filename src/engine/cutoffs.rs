//! Element-pair bonding cutoffs.
//!
//! The default table is embedded from `resources/bonding.toml` and parsed
//! once. Custom tables use the same TOML layout.

use crate::error::Error;
use crate::model::types::Element;
use log::warn;
use serde::Deserialize;
use std::collections::HashSet;
use std::sync::{Mutex, OnceLock};

const DEFAULT_BONDING_TOML: &str = include_str!("../../resources/bonding.toml");

static DEFAULT_CUTOFFS: OnceLock<CutoffTable> = OnceLock::new();

/// Explicit cutoff for one symbol pair, in Ångströms.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PairCutoff {
    pub a: String,
    pub b: String,
    pub cutoff: f64,
}

impl PairCutoff {
    fn matches(&self, a: &str, b: &str) -> bool {
        (self.a.eq_ignore_ascii_case(a) && self.b.eq_ignore_ascii_case(b))
            || (self.a.eq_ignore_ascii_case(b) && self.b.eq_ignore_ascii_case(a))
    }
}

/// Bonding thresholds for element pairs.
///
/// A pair is bonded when its distance does not exceed
/// [`threshold`](Self::threshold), i.e. the pair cutoff scaled by `tolerance`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CutoffTable {
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
    /// Cutoff used when a symbol has no tabulated covalent radius.
    #[serde(default = "default_fallback")]
    pub fallback: f64,
    #[serde(default)]
    pub pairs: Vec<PairCutoff>,
}

fn default_tolerance() -> f64 {
    1.2
}
fn default_fallback() -> f64 {
    2.0
}

fn is_positive(x: f64) -> bool {
    x.is_finite() && x > 0.0
}

impl Default for CutoffTable {
    fn default() -> Self {
        default_cutoffs().clone()
    }
}

impl CutoffTable {
    /// Parses a custom table, or returns the embedded defaults for `None`.
    pub fn load(custom_toml: Option<&str>) -> Result<Self, Error> {
        match custom_toml {
            Some(toml) => Ok(toml::from_str(toml)?),
            None => Ok(default_cutoffs().clone()),
        }
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Adds or replaces the explicit cutoff for `a`-`b`.
    pub fn with_pair(mut self, a: &str, b: &str, cutoff: f64) -> Self {
        self.pairs.retain(|p| !p.matches(a, b));
        self.pairs.push(PairCutoff {
            a: a.to_string(),
            b: b.to_string(),
            cutoff,
        });
        self
    }

    pub(crate) fn validate(&self) -> Result<(), Error> {
        if !is_positive(self.tolerance) {
            return Err(Error::configuration(format!(
                "bond tolerance must be positive, got {}",
                self.tolerance
            )));
        }
        if !is_positive(self.fallback) {
            return Err(Error::configuration(format!(
                "fallback cutoff must be positive, got {}",
                self.fallback
            )));
        }
        if let Some(p) = self.pairs.iter().find(|p| !is_positive(p.cutoff)) {
            return Err(Error::configuration(format!(
                "cutoff for {}-{} must be positive, got {}",
                p.a, p.b, p.cutoff
            )));
        }
        Ok(())
    }

    /// Unscaled cutoff for a symbol pair and whether it fell back to the
    /// generic value.
    pub fn cutoff(&self, a: &str, b: &str) -> (f64, bool) {
        if let Some(p) = self.pairs.iter().find(|p| p.matches(a, b)) {
            return (p.cutoff, false);
        }
        let radius =
            |s: &str| Element::from_symbol_ignore_case(s).and_then(|e| e.covalent_radius());
        match (radius(a), radius(b)) {
            (Some(ra), Some(rb)) => (ra + rb, false),
            _ => (self.fallback, true),
        }
    }

    /// Maximum bonded distance for a symbol pair.
    pub fn threshold(&self, a: &str, b: &str) -> f64 {
        self.cutoff(a, b).0 * self.tolerance
    }
}

/// Per-computation threshold lookup that reports each fallback pair once.
pub(crate) struct ThresholdLookup<'a> {
    table: &'a CutoffTable,
    warned: Mutex<HashSet<(String, String)>>,
}

impl<'a> ThresholdLookup<'a> {
    pub(crate) fn new(table: &'a CutoffTable) -> Self {
        Self {
            table,
            warned: Mutex::new(HashSet::new()),
        }
    }

    pub(crate) fn threshold(&self, a: &str, b: &str) -> f64 {
        let (cutoff, fell_back) = self.table.cutoff(a, b);
        if fell_back {
            let key = if a <= b {
                (a.to_string(), b.to_string())
            } else {
                (b.to_string(), a.to_string())
            };
            let mut warned = self.warned.lock().unwrap_or_else(|e| e.into_inner());
            if warned.insert(key) {
                warn!(
                    "no covalent radius for pair {a}-{b}; using fallback cutoff {:.3} Å",
                    self.table.fallback
                );
            }
        }
        cutoff * self.table.tolerance
    }
}

pub fn default_cutoffs() -> &'static CutoffTable {
    DEFAULT_CUTOFFS.get_or_init(|| {
        toml::from_str(DEFAULT_BONDING_TOML)
            .expect("Failed to parse embedded bonding cutoffs. This is a library bug.")
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn embedded_defaults_parse() {
        let table = CutoffTable::default();
        assert!(approx_eq(table.tolerance, 1.2));
        assert!(approx_eq(table.fallback, 2.0));
        assert!(table.pairs.is_empty());
        assert!(table.validate().is_ok());
    }

    #[test]
    fn covalent_radii_sum_is_scaled_by_tolerance() {
        let table = CutoffTable::default().with_tolerance(1.0);
        let h = Element::H.covalent_radius().unwrap();
        let o = Element::O.covalent_radius().unwrap();
        assert!(approx_eq(table.threshold("O", "H"), h + o));
        assert!(approx_eq(table.threshold("h", "o"), h + o));
    }

    #[test]
    fn explicit_pairs_override_radii_in_either_order() {
        let table = CutoffTable::default()
            .with_tolerance(1.0)
            .with_pair("H", "O", 1.1)
            .with_pair("O", "H", 1.3);
        assert_eq!(table.pairs.len(), 1);
        assert!(approx_eq(table.threshold("H", "O"), 1.3));
        assert!(approx_eq(table.threshold("O", "H"), 1.3));
    }

    #[test]
    fn unknown_symbols_fall_back() {
        let table = CutoffTable::default();
        assert_eq!(table.cutoff("Xx", "H"), (2.0, true));
        let lookup = ThresholdLookup::new(&table);
        assert!(approx_eq(lookup.threshold("Xx", "H"), 2.4));
        assert!(approx_eq(lookup.threshold("H", "Xx"), 2.4));
        assert_eq!(lookup.warned.lock().unwrap().len(), 1);
    }

    #[test]
    fn custom_toml_uses_serde_defaults() {
        let table = CutoffTable::load(Some(
            r#"
            [[pairs]]
            a = "Na"
            b = "Cl"
            cutoff = 3.0
            "#,
        ))
        .unwrap();
        assert!(approx_eq(table.tolerance, 1.2));
        assert!(approx_eq(table.threshold("Cl", "Na"), 3.6));
    }

    #[test]
    fn invalid_tables_are_rejected() {
        assert!(matches!(
            CutoffTable::load(Some("tolerance = \"high\"")),
            Err(Error::CutoffParse(_))
        ));
        let table = CutoffTable::default().with_tolerance(0.0);
        assert!(matches!(table.validate(), Err(Error::Configuration(_))));
        let table = CutoffTable::default().with_pair("H", "H", -1.0);
        assert!(table.validate().is_err());
    }
}

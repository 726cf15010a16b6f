//! Settings for the two-body engine.

use super::cutoffs::CutoffTable;
use crate::error::Error;

/// How per-frame work is scheduled.
///
/// Both strategies produce identical tables; `Parallel` spreads frames
/// over the rayon thread pool.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Strategy {
    #[default]
    Scalar,
    Parallel,
}

/// Two-body computation settings.
///
/// # Examples
///
/// ```
/// use atomverse::{CutoffTable, Strategy, TwoBodyConfig};
///
/// let config = TwoBodyConfig {
///     cutoffs: CutoffTable::default().with_pair("H", "H", 0.8),
///     max_distance: Some(6.0),
///     strategy: Strategy::Parallel,
///     ..Default::default()
/// };
/// assert!(config.periodic_truncate);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct TwoBodyConfig {
    pub cutoffs: CutoffTable,

    /// Drop projected atoms no periodic pair references once the pairs exist.
    pub periodic_truncate: bool,

    /// Pairs farther apart than this are not stored.
    ///
    /// `None` keeps every pair. When set, free frames are searched with a
    /// spatial grid instead of the all-pairs loop.
    pub max_distance: Option<f64>,

    pub strategy: Strategy,
}

impl Default for TwoBodyConfig {
    fn default() -> Self {
        Self {
            cutoffs: CutoffTable::default(),
            periodic_truncate: true,
            max_distance: None,
            strategy: Strategy::Scalar,
        }
    }
}

impl TwoBodyConfig {
    pub fn validate(&self) -> Result<(), Error> {
        self.cutoffs.validate()?;
        if let Some(d) = self.max_distance {
            if !(d.is_finite() && d > 0.0) {
                return Err(Error::configuration(format!(
                    "maximum pair distance must be positive, got {d}"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let config = TwoBodyConfig::default();
        assert!(config.periodic_truncate);
        assert!(config.max_distance.is_none());
        assert_eq!(config.strategy, Strategy::Scalar);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_non_positive_distance_ceiling() {
        let config = TwoBodyConfig {
            max_distance: Some(0.0),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(Error::Configuration(_))));
    }
}

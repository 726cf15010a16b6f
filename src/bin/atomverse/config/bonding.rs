use std::fs;

use anyhow::{Context, Result};

use atomverse::{CutoffTable, Strategy, TwoBodyConfig};

use crate::cli::BondingOptions;

pub fn build_two_body_config(opts: &BondingOptions) -> Result<TwoBodyConfig> {
    let mut cutoffs = match &opts.cutoffs {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("Failed to read cutoff table: {}", path.display()))?;
            CutoffTable::load(Some(&text))
                .with_context(|| format!("Invalid cutoff table: {}", path.display()))?
        }
        None => CutoffTable::default(),
    };

    if let Some(tolerance) = opts.tolerance {
        cutoffs = cutoffs.with_tolerance(tolerance);
    }
    for pair in &opts.pairs {
        cutoffs = cutoffs.with_pair(&pair.a, &pair.b, pair.cutoff);
    }

    let config = TwoBodyConfig {
        cutoffs,
        periodic_truncate: !opts.keep_images,
        max_distance: opts.max_distance,
        strategy: if opts.parallel {
            Strategy::Parallel
        } else {
            Strategy::Scalar
        },
    };
    config.validate().context("Invalid bond perception settings")?;
    Ok(config)
}

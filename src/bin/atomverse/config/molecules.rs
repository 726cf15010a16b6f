use atomverse::ClassificationRule;

use crate::cli::MoleculeOptions;

pub fn build_rules(opts: &MoleculeOptions) -> Vec<ClassificationRule> {
    opts.rules
        .iter()
        .map(|r| ClassificationRule::new(r.pattern.clone(), r.label.clone(), r.exact))
        .collect()
}

mod bonding;
mod cell;
mod molecules;

pub use bonding::build_two_body_config;
pub use cell::build_cell;
pub use molecules::build_rules;

use std::path::PathBuf;
use std::str::FromStr;

use clap::{ArgAction, Args, Parser, Subcommand};

use atomverse::Formula;

#[derive(Parser)]
#[command(
    name = "atomverse",
    about = "Bonds and molecules of multi-frame atomic universes",
    version,
    author,
    before_help = crate::display::banner_for_help(),
    propagate_version = true
)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Compute pair distances and bonds
    #[command(visible_alias = "b")]
    Bonds(BondsArgs),

    /// Group atoms into molecules along the bond graph
    #[command(visible_alias = "m")]
    Molecules(MoleculesArgs),
}

impl Command {
    pub fn quiet(&self) -> bool {
        match self {
            Command::Bonds(args) => args.io.quiet,
            Command::Molecules(args) => args.io.quiet,
        }
    }
}

/// I/O options shared by all commands.
#[derive(Args)]
pub struct IoOptions {
    /// Input XYZ file (stdin if omitted)
    #[arg(value_name = "INPUT")]
    pub input: Option<PathBuf>,

    /// Output file(s), format from extension (.json snapshot, .xyz coordinates)
    #[arg(short, long, value_name = "FILE", action = ArgAction::Append)]
    pub output: Vec<PathBuf>,

    /// Suppress progress output (for scripting)
    #[arg(short, long)]
    pub quiet: bool,
}

/// Periodic cell applied to every frame of the input.
#[derive(Args)]
#[command(next_help_heading = "Periodic Cell")]
pub struct CellOptions {
    /// Orthorhombic cell side lengths (Å)
    #[arg(
        long,
        value_name = "A,B,C",
        value_delimiter = ',',
        conflicts_with = "cell_matrix"
    )]
    pub cell: Option<Vec<f64>>,

    /// Full cell vectors ax,ay,az,bx,by,bz,cx,cy,cz (Å)
    #[arg(
        long = "cell-matrix",
        value_name = "VECTORS",
        value_delimiter = ',',
        allow_hyphen_values = true
    )]
    pub cell_matrix: Option<Vec<f64>>,
}

/// Bond perception options shared by all commands.
#[derive(Args)]
#[command(next_help_heading = "Bond Perception")]
pub struct BondingOptions {
    /// Multiplier applied to every pair cutoff
    #[arg(long, value_name = "FACTOR")]
    pub tolerance: Option<f64>,

    /// Custom cutoff table (TOML file)
    #[arg(long, value_name = "FILE")]
    pub cutoffs: Option<PathBuf>,

    /// Pair cutoff override (A-B=CUTOFF), repeatable
    #[arg(long = "pair", value_name = "A-B=CUTOFF", action = ArgAction::Append)]
    pub pairs: Vec<PairSpec>,

    /// Drop pairs farther apart than this distance (Å)
    #[arg(long = "max-distance", value_name = "Å")]
    pub max_distance: Option<f64>,

    /// Keep every periodic image instead of those referenced by pairs
    #[arg(long = "keep-images")]
    pub keep_images: bool,

    /// Evaluate frames in parallel
    #[arg(long)]
    pub parallel: bool,
}

#[derive(Args)]
pub struct BondsArgs {
    #[command(flatten)]
    pub io: IoOptions,

    #[command(flatten)]
    pub cell: CellOptions,

    #[command(flatten)]
    pub bonding: BondingOptions,
}

#[derive(Args)]
pub struct MoleculesArgs {
    #[command(flatten)]
    pub io: IoOptions,

    #[command(flatten)]
    pub cell: CellOptions,

    #[command(flatten)]
    pub bonding: BondingOptions,

    #[command(flatten)]
    pub molecules: MoleculeOptions,
}

#[derive(Args)]
#[command(next_help_heading = "Molecules")]
pub struct MoleculeOptions {
    /// Compute centers of mass on unwrapped coordinates
    #[arg(long)]
    pub recenter: bool,

    /// Classification rule (PATTERN=LABEL, trailing ! for an exact match), repeatable
    #[arg(long = "classify", value_name = "RULE", action = ArgAction::Append)]
    pub rules: Vec<RuleSpec>,
}

/// A pair cutoff override such as `H-H=0.8`.
#[derive(Clone, Debug, PartialEq)]
pub struct PairSpec {
    pub a: String,
    pub b: String,
    pub cutoff: f64,
}

impl FromStr for PairSpec {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (pair, cutoff) = s
            .split_once('=')
            .ok_or_else(|| format!("expected A-B=CUTOFF, found '{}'", s))?;
        let (a, b) = pair
            .split_once('-')
            .ok_or_else(|| format!("expected two symbols joined by '-', found '{}'", pair))?;
        let cutoff = cutoff
            .trim()
            .parse::<f64>()
            .map_err(|_| format!("invalid cutoff: {}", cutoff))?;
        if a.trim().is_empty() || b.trim().is_empty() {
            return Err(format!("empty element symbol in '{}'", s));
        }
        Ok(Self {
            a: a.trim().to_string(),
            b: b.trim().to_string(),
            cutoff,
        })
    }
}

/// A molecule classification rule such as `H(2)O(1)=water!`.
#[derive(Clone, Debug, PartialEq)]
pub struct RuleSpec {
    pub pattern: String,
    pub label: String,
    pub exact: bool,
}

impl FromStr for RuleSpec {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (pattern, label) = s
            .rsplit_once('=')
            .ok_or_else(|| format!("expected PATTERN=LABEL, found '{}'", s))?;
        let (label, exact) = match label.strip_suffix('!') {
            Some(label) => (label, true),
            None => (label, false),
        };
        if pattern.is_empty() || label.is_empty() {
            return Err(format!("pattern and label must be non-empty in '{}'", s));
        }
        if Formula::parse(pattern).is_none() {
            return Err(format!(
                "'{}' is not a formula such as Na, H2O or H(2)O(1)",
                pattern
            ));
        }
        Ok(Self {
            pattern: pattern.to_string(),
            label: label.to_string(),
            exact,
        })
    }
}

pub fn parse() -> Cli {
    Cli::parse()
}

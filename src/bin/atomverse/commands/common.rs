use std::io::Write;

use anyhow::{Context, Result, bail};

use atomverse::io::{Format, snapshot, xyz};
use atomverse::{AtomTable, CellVectors, IMAGE_COUNT, Universe};

use crate::cli::IoOptions;
use crate::io::{OutputSpec, Terminal, create_output, open_input};

pub fn ensure_input(io: &IoOptions, command: &str) -> Result<()> {
    if io.input.is_none() && Terminal::detect().stdin {
        bail!(
            "No input file specified and stdin is a terminal.\n\nUsage: atomverse {command} <INPUT> or pipe XYZ data via stdin."
        );
    }
    Ok(())
}

/// Reads the XYZ input, applying `cell` to every frame when given.
pub fn read_universe(io: &IoOptions, cell: Option<CellVectors>) -> Result<Universe> {
    let input = open_input(io.input.as_deref())?;
    let mut universe = xyz::read(input).context("Failed to read structure")?;

    if let Some(cell) = cell {
        let mut frames = universe.frame().clone();
        frames.set_cell(cell);
        universe
            .set_frame(frames)
            .context("Failed to apply the periodic cell")?;
    }
    Ok(universe)
}

pub fn read_substeps(universe: &Universe, cell_override: bool) -> Vec<String> {
    let atoms = universe.atom().map_or(0, AtomTable::len);
    let mut steps = vec![format!(
        "Parse XYZ ({} frames, {} atoms)",
        universe.len(),
        atoms
    )];
    if cell_override {
        steps.push("Apply cell from the command line".to_string());
    } else if universe.is_periodic() {
        steps.push("Read lattice from extended XYZ comments".to_string());
    }
    steps
}

/// Without `-o`, a snapshot goes to stdout when it is piped.
pub fn resolve_outputs(io: &IoOptions) -> Result<Vec<OutputSpec>> {
    if io.output.is_empty() {
        if Terminal::detect().stdout {
            return Ok(Vec::new());
        }
        return Ok(vec![OutputSpec::stdout_snapshot()]);
    }
    io.output.iter().map(|path| OutputSpec::for_path(path)).collect()
}

/// Computes pairs and bond counts, returning a description of what was done.
pub fn compute_two_body(universe: &mut Universe) -> Result<Vec<String>> {
    universe
        .compute_two_body()
        .context("Two-body computation failed")?;
    universe.compute_bond_count()?;

    let mut steps = Vec::new();
    if universe.is_periodic() {
        universe.compute_projected_bond_count()?;
        let moved = universe.unit_atom()?.len();
        steps.push(format!("Fold atoms into the unit cell ({moved} moved)"));

        let projected = universe.projected_atom()?;
        steps.push(if projected.is_truncated() {
            format!(
                "Project {IMAGE_COUNT} images per atom, keep {} referenced",
                projected.len()
            )
        } else {
            format!("Project {IMAGE_COUNT} images per atom ({} rows)", projected.len())
        });
    }

    let tolerance = universe.two_body_config().cutoffs.tolerance;
    let two = universe.two()?;
    steps.push(format!(
        "{} free pairs, {} periodic pairs",
        two.free.len(),
        two.periodic.len()
    ));
    steps.push(format!(
        "Perceive {} bonds (tolerance ×{tolerance})",
        two.bond_count()
    ));
    Ok(steps)
}

/// Writes every output; XYZ outputs take their positions from `coordinates`.
pub fn write_outputs(
    universe: &Universe,
    coordinates: &AtomTable,
    specs: &[OutputSpec],
) -> Result<()> {
    for spec in specs {
        let mut writer = create_output(spec)?;
        match spec.format {
            Format::Json => {
                snapshot::write(&mut writer, universe).context("Failed to write snapshot")?;
            }
            Format::Xyz => {
                xyz::write(&mut writer, universe.frame(), coordinates)
                    .context("Failed to write XYZ file")?;
            }
        }
        writer.flush().context("Failed to flush output")?;
    }
    Ok(())
}

pub fn write_substeps(specs: &[OutputSpec]) -> Vec<String> {
    specs
        .iter()
        .map(|spec| match spec.format {
            Format::Json => format!("Write snapshot → {}", spec.target()),
            Format::Xyz => format!("Write XYZ → {}", spec.target()),
        })
        .collect()
}

use anyhow::{Context, Result};
use log::info;

use crate::cli::MoleculesArgs;
use crate::config::{build_cell, build_rules, build_two_body_config};
use crate::display::{
    Context as DisplayContext, Progress, print_molecule_summary, print_universe_info,
};

use super::common::{
    compute_two_body, ensure_input, read_substeps, read_universe, resolve_outputs, write_outputs,
    write_substeps,
};

const TOTAL_STEPS: u8 = 4;

pub fn run_molecules(args: MoleculesArgs, ctx: DisplayContext) -> Result<()> {
    ensure_input(&args.io, "molecules")?;
    let outputs = resolve_outputs(&args.io)?;
    let config = build_two_body_config(&args.bonding)?;
    let cell = build_cell(&args.cell)?;
    let rules = build_rules(&args.molecules);

    let mut progress = Progress::new(ctx.interactive, TOTAL_STEPS);

    progress.step("Reading universe");
    let mut universe = read_universe(&args.io, cell)?.with_two_body_config(config);
    progress.complete_step("Reading universe", &read_substeps(&universe, cell.is_some()));

    if ctx.interactive {
        print_universe_info(&universe);
    }

    progress.step("Computing two-body table");
    let steps = compute_two_body(&mut universe)?;
    progress.complete_step("Computing two-body table", &steps);

    progress.step("Grouping molecules");
    universe
        .compute_molecule(args.molecules.recenter)
        .context("Molecule grouping failed")?;
    let mut steps = vec![format!(
        "Group bonded atoms into {} molecules",
        universe.molecule()?.len()
    )];
    if args.molecules.recenter {
        steps.push("Compute centers of mass on unwrapped positions".to_string());
    }
    if !rules.is_empty() {
        let labelled = universe.classify_molecules(&rules)?;
        steps.push(format!(
            "Classify {labelled} molecules with {} rules",
            rules.len()
        ));
    }
    // Unwrapped positions for XYZ output keep molecules whole across the cell.
    let coordinates = universe.visual_atom_merged()?;
    progress.complete_step("Grouping molecules", &steps);

    if ctx.interactive {
        print_molecule_summary(universe.molecule()?);
    }

    progress.step("Writing output");
    write_outputs(&universe, &coordinates, &outputs)?;
    info!("molecules: wrote {} outputs", outputs.len());
    progress.complete_step("Writing output", &write_substeps(&outputs));

    progress.finish();
    Ok(())
}

use anyhow::{Context, Result};
use log::info;

use crate::cli::BondsArgs;
use crate::config::{build_cell, build_two_body_config};
use crate::display::{Context as DisplayContext, Progress, print_bond_summary, print_universe_info};

use super::common::{
    compute_two_body, ensure_input, read_substeps, read_universe, resolve_outputs, write_outputs,
    write_substeps,
};

const TOTAL_STEPS: u8 = 3;

pub fn run_bonds(args: BondsArgs, ctx: DisplayContext) -> Result<()> {
    ensure_input(&args.io, "bonds")?;
    let outputs = resolve_outputs(&args.io)?;
    let config = build_two_body_config(&args.bonding)?;
    let cell = build_cell(&args.cell)?;

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

    if ctx.interactive {
        let atoms = universe
            .atom()
            .context("Universe has no atom table")?
            .clone();
        print_bond_summary(universe.two()?, &atoms);
    }

    progress.step("Writing output");
    let coordinates = universe.atom().cloned().unwrap_or_default();
    write_outputs(&universe, &coordinates, &outputs)?;
    info!("bonds: wrote {} outputs", outputs.len());
    progress.complete_step("Writing output", &write_substeps(&outputs));

    progress.finish();
    Ok(())
}

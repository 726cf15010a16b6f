mod bonds;
mod common;
mod molecules;

use bonds::run_bonds;
use molecules::run_molecules;

use anyhow::Result;

use crate::cli::Command;
use crate::display::Context;

pub fn dispatch(command: Command, ctx: Context) -> Result<()> {
    match command {
        Command::Bonds(args) => run_bonds(args, ctx),
        Command::Molecules(args) => run_molecules(args, ctx),
    }
}

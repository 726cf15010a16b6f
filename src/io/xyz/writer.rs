use crate::io::error::Error;
use crate::model::{atom::AtomTable, frame::FrameTable};
use std::io::Write;

/// Writes every frame of `frames` with the atoms `atoms` assigns to it.
///
/// Pass a merged overlay (such as the unwrapped visual positions) as `atoms`
/// to export derived coordinates. Periodic frames carry a `Lattice` entry,
/// and every comment records the frame identifier so that sparse
/// identifiers survive a round trip.
pub fn write<W: Write>(mut writer: W, frames: &FrameTable, atoms: &AtomTable) -> Result<(), Error> {
    let by_frame = atoms.by_frame();
    let slice = atoms.as_slice();

    for (id, frame) in frames.iter() {
        let ids = by_frame.get(&id).map(Vec::as_slice).unwrap_or_default();
        writeln!(writer, "{}", ids.len())?;

        match frame.cell.filter(|_| frame.is_periodic) {
            Some(cell) => {
                let lattice: Vec<String> = cell.iter().flatten().map(f64::to_string).collect();
                writeln!(
                    writer,
                    "Lattice=\"{}\" pbc=\"T T T\" frame={}",
                    lattice.join(" "),
                    id
                )?;
            }
            None => writeln!(writer, "frame={id}")?,
        }

        for &i in ids {
            let atom = &slice[i];
            writeln!(
                writer,
                "{:<3}{:>16.8}{:>16.8}{:>16.8}",
                atom.symbol, atom.position[0], atom.position[1], atom.position[2]
            )?;
        }
    }
    Ok(())
}

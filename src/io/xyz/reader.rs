use crate::Universe;
use crate::io::{Format, error::Error};
use crate::model::{
    atom::{Atom, AtomTable},
    frame::{CellVectors, Frame, FrameTable},
    types::Element,
};
use std::collections::BTreeSet;
use std::io::BufRead;

/// Reads every frame of an XYZ stream into a universe.
///
/// Frames without a `frame=` entry are numbered after the previous frame.
/// Element symbols are normalized to their canonical case; unrecognized
/// symbols are kept verbatim. When periodic frames disagree on their cell,
/// every periodic frame is flagged as variable-cell.
pub fn read<R: BufRead>(reader: R) -> Result<Universe, Error> {
    let mut lines = reader.lines().enumerate();
    let mut frames: Vec<(usize, Frame)> = Vec::new();
    let mut atoms: Vec<Atom> = Vec::new();
    let mut seen = BTreeSet::new();

    loop {
        let (count_ln, count_line) = match next_line(&mut lines)? {
            Some((ln, line)) if line.trim().is_empty() => {
                if frames.is_empty() {
                    return Err(Error::parse(Format::Xyz, ln, "expected an atom count"));
                }
                continue;
            }
            Some(entry) => entry,
            None => break,
        };
        let atom_count: usize = count_line.trim().parse().map_err(|_| {
            Error::parse(
                Format::Xyz,
                count_ln,
                format!("invalid atom count '{}'", count_line.trim()),
            )
        })?;

        let (comment_ln, comment) = next_line(&mut lines)?.ok_or_else(|| {
            Error::parse(Format::Xyz, count_ln + 1, "frame ended before its comment line")
        })?;
        let cell = parse_lattice(&comment)
            .map_err(|details| Error::parse(Format::Xyz, comment_ln, details))?;
        let explicit = parse_frame_id(&comment)
            .map_err(|details| Error::parse(Format::Xyz, comment_ln, details))?;

        let id = explicit.unwrap_or_else(|| frames.last().map_or(0, |(id, _)| id + 1));
        if !seen.insert(id) {
            return Err(Error::parse(
                Format::Xyz,
                comment_ln,
                format!("duplicate frame identifier {id}"),
            ));
        }

        for k in 0..atom_count {
            let (ln, line) = next_line(&mut lines)?.ok_or_else(|| {
                Error::parse(
                    Format::Xyz,
                    comment_ln + k + 1,
                    format!("frame {id} ended after {k} of {atom_count} atoms"),
                )
            })?;
            atoms.push(parse_atom(&line, ln, id)?);
        }

        let frame = match cell {
            Some(cell) => Frame::periodic(atom_count, cell),
            None => Frame::new(atom_count),
        };
        frames.push((id, frame));
    }

    let cells: Vec<CellVectors> = frames.iter().filter_map(|(_, f)| f.cell).collect();
    let variable = cells.windows(2).any(|w| w[0] != w[1]);

    let mut table = FrameTable::new();
    for (id, frame) in frames {
        let periodic = frame.is_periodic;
        table.insert(id, frame.with_variable_cell(variable && periodic));
    }
    Ok(Universe::new(Some(table), AtomTable::new(atoms))?)
}

fn next_line<I>(lines: &mut I) -> Result<Option<(usize, String)>, Error>
where
    I: Iterator<Item = (usize, std::io::Result<String>)>,
{
    match lines.next() {
        Some((i, line)) => Ok(Some((i + 1, line?))),
        None => Ok(None),
    }
}

fn parse_atom(line: &str, ln: usize, frame: usize) -> Result<Atom, Error> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() < 4 {
        return Err(Error::parse(
            Format::Xyz,
            ln,
            format!("expected 'symbol x y z', found {} columns", fields.len()),
        ));
    }

    let mut position = [0.0; 3];
    for (slot, raw) in position.iter_mut().zip(&fields[1..4]) {
        *slot = raw
            .parse()
            .map_err(|_| Error::parse(Format::Xyz, ln, format!("invalid coordinate '{raw}'")))?;
    }

    let symbol = Element::from_symbol_ignore_case(fields[0])
        .map_or_else(|| fields[0].to_string(), |e| e.symbol().to_string());
    Ok(Atom::new(frame, symbol, position))
}

/// Extracts the cell from a `Lattice="..."` entry, matching the key
/// case-insensitively.
fn parse_lattice(comment: &str) -> Result<Option<CellVectors>, String> {
    let lowered = comment.to_ascii_lowercase();
    let Some(start) = lowered.find("lattice=\"") else {
        return Ok(None);
    };
    let body = &comment[start + "lattice=\"".len()..];
    let end = body
        .find('"')
        .ok_or_else(|| "unterminated Lattice entry".to_string())?;

    let values = body[..end]
        .split_whitespace()
        .map(|v| v.parse::<f64>().map_err(|_| format!("invalid lattice value '{v}'")))
        .collect::<Result<Vec<_>, _>>()?;
    if values.len() != 9 {
        return Err(format!(
            "Lattice entry needs 9 values, found {}",
            values.len()
        ));
    }

    let mut cell = [[0.0; 3]; 3];
    for (i, v) in values.into_iter().enumerate() {
        cell[i / 3][i % 3] = v;
    }
    Ok(Some(cell))
}

fn parse_frame_id(comment: &str) -> Result<Option<usize>, String> {
    for token in comment.split_whitespace() {
        if let Some(raw) = token.strip_prefix("frame=") {
            return raw
                .parse()
                .map(Some)
                .map_err(|_| format!("invalid frame identifier '{raw}'"));
        }
    }
    Ok(None)
}

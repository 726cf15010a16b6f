use std::collections::{BTreeMap, HashMap};
use std::io::{self, Write};

use atomverse::{AtomTable, CellVectors, MoleculeTable, TwoBody, Universe};

use crate::util::text::truncate;

const INDENT: &str = "      ";
const MAX_ROWS: usize = 15;

#[derive(Clone, Copy)]
enum Align {
    Left,
    Right,
}

#[derive(Clone, Copy)]
struct Column {
    header: &'static str,
    width: usize,
    align: Align,
}

const fn col(header: &'static str, width: usize, align: Align) -> Column {
    Column {
        header,
        width,
        align,
    }
}

pub fn print_universe_info(universe: &Universe) {
    let mut out = io::stderr().lock();
    let frames = universe.frame();
    let periodic = frames.iter().filter(|(_, f)| f.is_periodic).count();

    let mut rows = vec![
        kv("Frames", frames.len().to_string()),
        kv("Atoms", universe.atom().map_or(0, AtomTable::len).to_string()),
        kv(
            "Periodic",
            match periodic {
                0 => "no".to_string(),
                n if n == frames.len() => "yes".to_string(),
                n => format!("{n} of {} frames", frames.len()),
            },
        ),
    ];

    if let Some(cell) = frames.iter().find_map(|(_, f)| f.cell.filter(|_| f.is_periodic)) {
        let [a, b, c] = cell.map(|v| norm(&v));
        rows.push(kv("Cell (Å)", format!("{a:.2} × {b:.2} × {c:.2}")));
        let (alpha, beta, gamma) = cell_angles(&cell);
        rows.push(kv(
            "Angles (α β γ)",
            format!("{alpha:.1}° {beta:.1}° {gamma:.1}°"),
        ));
        if universe.is_variable_cell() {
            rows.push(kv("Variable cell", "yes".to_string()));
        }
    }

    print_table(
        &mut out,
        "Universe Summary",
        &[col("Metric", 16, Align::Left), col("Value", 34, Align::Right)],
        &rows,
    );

    if let Some(atoms) = universe.atom() {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for atom in atoms.iter() {
            *counts.entry(atom.symbol.as_str()).or_insert(0) += 1;
        }
        let mut sorted: Vec<(String, usize)> =
            counts.into_iter().map(|(s, n)| (s.to_string(), n)).collect();
        sorted.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        print_distribution(&mut out, "Element Distribution", "Element", &sorted, atoms.len());
    }
}

pub fn print_bond_summary(two: &TwoBody, atoms: &AtomTable) {
    let mut out = io::stderr().lock();

    print_table(
        &mut out,
        "Two-Body Summary",
        &[col("Table", 16, Align::Left), col("Pairs", 12, Align::Right), col("Bonds", 18, Align::Right)],
        &[
            vec![
                "Free".to_string(),
                two.free.len().to_string(),
                two.free.iter().filter(|p| p.bond).count().to_string(),
            ],
            vec![
                "Periodic".to_string(),
                two.periodic.len().to_string(),
                two.periodic.iter().filter(|p| p.pair.bond).count().to_string(),
            ],
        ],
    );

    // symbol pair -> (count, summed length, shortest, longest)
    let mut stats: BTreeMap<String, (usize, f64, f64, f64)> = BTreeMap::new();
    for pair in two.bonds() {
        let (Some(a), Some(b)) = (atoms.get(pair.atom0), atoms.get(pair.atom1)) else {
            continue;
        };
        let (first, second) = if a.symbol <= b.symbol {
            (&a.symbol, &b.symbol)
        } else {
            (&b.symbol, &a.symbol)
        };
        let entry = stats
            .entry(format!("{first}-{second}"))
            .or_insert((0, 0.0, f64::INFINITY, 0.0));
        entry.0 += 1;
        entry.1 += pair.distance;
        entry.2 = entry.2.min(pair.distance);
        entry.3 = entry.3.max(pair.distance);
    }
    if stats.is_empty() {
        return;
    }

    let mut sorted: Vec<_> = stats.into_iter().collect();
    sorted.sort_by(|a, b| b.1.0.cmp(&a.1.0));
    let rows: Vec<Vec<String>> = sorted
        .iter()
        .map(|(name, (n, sum, lo, hi))| {
            vec![
                name.clone(),
                n.to_string(),
                format!("{:.3}", sum / *n as f64),
                format!("{lo:.3}–{hi:.3}"),
            ]
        })
        .collect();
    print_table(
        &mut out,
        "Bond Lengths (Å)",
        &[
            col("Pair", 10, Align::Left),
            col("Count", 8, Align::Right),
            col("Mean", 8, Align::Right),
            col("Range", 15, Align::Right),
        ],
        &rows,
    );
}

pub fn print_molecule_summary(molecules: &MoleculeTable) {
    let mut out = io::stderr().lock();

    let mut by_formula: HashMap<String, (usize, Option<&str>)> = HashMap::new();
    for molecule in molecules.iter() {
        let entry = by_formula
            .entry(molecule.formula.to_string())
            .or_insert((0, molecule.classification.as_deref()));
        entry.0 += 1;
    }

    let mut sorted: Vec<_> = by_formula.into_iter().collect();
    sorted.sort_by(|a, b| b.1.0.cmp(&a.1.0).then_with(|| a.0.cmp(&b.0)));
    let rows: Vec<Vec<String>> = sorted
        .iter()
        .map(|(formula, (n, label))| {
            vec![formula.clone(), n.to_string(), label.unwrap_or("–").to_string()]
        })
        .collect();

    print_table(
        &mut out,
        &format!("Molecules ({} total)", molecules.len()),
        &[
            col("Formula", 22, Align::Left),
            col("Count", 8, Align::Right),
            col("Class", 14, Align::Left),
        ],
        &rows,
    );
}

fn kv(key: &str, value: String) -> Vec<String> {
    vec![key.to_string(), value]
}

fn print_distribution(
    out: &mut impl Write,
    title: &str,
    name: &'static str,
    data: &[(String, usize)],
    total: usize,
) {
    let bar_width = 20;
    let rows: Vec<Vec<String>> = data
        .iter()
        .map(|(label, count)| {
            let pct = *count as f64 / total.max(1) as f64 * 100.0;
            vec![
                label.clone(),
                count.to_string(),
                format!("{}  {:>5.1}%", make_bar(pct, bar_width), pct),
            ]
        })
        .collect();
    print_table(
        out,
        title,
        &[
            col(name, 10, Align::Left),
            col("Count", 8, Align::Right),
            col("Distribution", bar_width + 8, Align::Left),
        ],
        &rows,
    );
}

fn print_table(out: &mut impl Write, title: &str, columns: &[Column], rows: &[Vec<String>]) {
    let rule = |left: &str, mid: &str, right: &str| {
        let parts: Vec<String> = columns.iter().map(|c| "─".repeat(c.width + 2)).collect();
        format!("{INDENT}{left}{}{right}", parts.join(mid))
    };
    let line = |cells: &[String]| {
        let parts: Vec<String> = columns
            .iter()
            .zip(cells)
            .map(|(c, cell)| {
                let cell = truncate(cell, c.width);
                match c.align {
                    Align::Left => format!(" {:<w$} ", cell, w = c.width),
                    Align::Right => format!(" {:>w$} ", cell, w = c.width),
                }
            })
            .collect();
        format!("{INDENT}│{}│", parts.join("│"))
    };

    let _ = writeln!(out, "{INDENT}┌─ {title} ─┐");
    let _ = writeln!(out, "{}", rule("┌", "┬", "┐"));
    let headers: Vec<String> = columns.iter().map(|c| c.header.to_string()).collect();
    let _ = writeln!(out, "{}", line(&headers));
    let _ = writeln!(out, "{}", rule("├", "┼", "┤"));
    for row in rows.iter().take(MAX_ROWS) {
        let _ = writeln!(out, "{}", line(row));
    }
    if rows.len() > MAX_ROWS {
        let mut more = vec![String::from("..."); columns.len()];
        if let Some(last) = more.last_mut() {
            *last = format!("({} more)", rows.len() - MAX_ROWS);
        }
        let _ = writeln!(out, "{}", line(&more));
    }
    let _ = writeln!(out, "{}", rule("└", "┴", "┘"));
}

fn make_bar(pct: f64, max_width: usize) -> String {
    let filled = ((pct / 100.0) * max_width as f64).round() as usize;
    let filled = filled.min(max_width);
    format!("{}{}", "█".repeat(filled), "░".repeat(max_width - filled))
}

fn norm(v: &[f64; 3]) -> f64 {
    v.iter().map(|x| x * x).sum::<f64>().sqrt()
}

fn angle(u: &[f64; 3], v: &[f64; 3]) -> f64 {
    let dot: f64 = u.iter().zip(v).map(|(a, b)| a * b).sum();
    (dot / (norm(u) * norm(v))).clamp(-1.0, 1.0).acos().to_degrees()
}

fn cell_angles(cell: &CellVectors) -> (f64, f64, f64) {
    let [a, b, c] = cell;
    (angle(b, c), angle(a, c), angle(a, b))
}

use std::io::{self, Write};

use anyhow::Error;

use atomverse::Error as UniverseError;
use atomverse::io::{Error as IoError, Format};

use crate::util::text::wrap;

#[rustfmt::skip]
pub fn print_error(err: &Error) {
    let mut stderr = io::stderr().lock();

    let _ = writeln!(stderr);
    let _ = writeln!(stderr, "   ╔══════════════════════════════════════════════════════════════╗");
    let _ = writeln!(stderr, "   ║  ✗ Error                                                     ║");
    let _ = writeln!(stderr, "   ╟──────────────────────────────────────────────────────────────╢");

    for line in wrap(&err.to_string(), 59) {
        let _ = writeln!(stderr, "   ║  {:<59} ║", line);
    }

    for cause in err.chain().skip(1) {
        let _ = writeln!(stderr, "   ╟──────────────────────────────────────────────────────────────╢");
        let _ = writeln!(stderr, "   ║  Caused by:                                                  ║");
        for line in wrap(&cause.to_string(), 57) {
            let _ = writeln!(stderr, "   ║    {:<57} ║", line);
        }
    }

    let hints = collect_hints(err);
    if !hints.is_empty() {
        let _ = writeln!(stderr, "   ╟──────────────────────────────────────────────────────────────╢");
        let _ = writeln!(stderr, "   ║  Hints:                                                      ║");
        for hint in hints {
            let wrapped = wrap(&hint, 55);
            if let Some((first, rest)) = wrapped.split_first() {
                let _ = writeln!(stderr, "   ║    • {:<55} ║", first);
                for line in rest {
                    let _ = writeln!(stderr, "   ║      {:<55} ║", line);
                }
            }
        }
    }

    let _ = writeln!(stderr, "   ╚══════════════════════════════════════════════════════════════╝");
    let _ = writeln!(stderr);
}

/// Suggestions for the most specific typed error in the chain, falling back
/// to message heuristics for untyped ones.
fn collect_hints(err: &Error) -> Vec<String> {
    if let Some(io_err) = err.downcast_ref::<IoError>() {
        return io_hints(io_err);
    }
    if let Some(universe_err) = err.downcast_ref::<UniverseError>() {
        return universe_hints(universe_err);
    }
    fallback_hints(err)
}

fn io_hints(err: &IoError) -> Vec<String> {
    match err {
        IoError::Io { source } => std_io_hints(source),
        IoError::Parse { format, line, .. } => {
            let mut hints = vec![
                format!("Parser encountered an issue near line {line} in {format} format"),
                "Inspect the file around that line for malformed entries".to_string(),
            ];
            match format {
                Format::Xyz => {
                    hints.push("XYZ: each frame is a count line, a comment line, then one 'symbol x y z' line per atom".to_string());
                    hints.push("XYZ: a Lattice entry needs 9 numbers in double quotes".to_string());
                }
                Format::Json => {
                    hints.push("Snapshots must be written by 'atomverse -o FILE.json'".to_string());
                }
            }
            hints
        }
        IoError::Json(_) => vec![
            "The snapshot is not valid JSON or was written by an incompatible version".to_string(),
            "Regenerate it from the source structure".to_string(),
        ],
        IoError::SnapshotVersion { .. } => vec![
            "The snapshot was written by a different atomverse release".to_string(),
            "Regenerate it from the source structure".to_string(),
        ],
        IoError::Universe(inner) => universe_hints(inner),
    }
}

fn std_io_hints(source: &io::Error) -> Vec<String> {
    use io::ErrorKind;

    let hints: &[&str] = match source.kind() {
        ErrorKind::NotFound => &[
            "File or directory not found",
            "Check the path spelling and ensure the file exists",
        ],
        ErrorKind::PermissionDenied => &[
            "Permission denied accessing the file",
            "Ensure you have read/write access as needed",
        ],
        ErrorKind::InvalidData => &[
            "File contains invalid or non-UTF-8 data",
            "Verify the file is plain XYZ text",
        ],
        ErrorKind::BrokenPipe => &[
            "Broken pipe: the output consumer terminated",
            "This may occur when piping to commands like `head`",
        ],
        _ => &["Check file path, permissions, and disk space"],
    };
    hints.iter().map(|h| h.to_string()).collect()
}

fn universe_hints(err: &UniverseError) -> Vec<String> {
    match err {
        UniverseError::InvalidCell { frame, .. } => vec![
            format!("Frame {frame} is periodic but its cell cannot be inverted"),
            "Provide a cell with --cell A,B,C or --cell-matrix".to_string(),
            "Or add a Lattice=\"...\" entry to the frame's comment line".to_string(),
        ],
        UniverseError::Configuration(_) => vec![
            "Check --tolerance, --max-distance and --pair values".to_string(),
            "All cutoffs and distances must be positive".to_string(),
        ],
        UniverseError::CutoffParse(_) => vec![
            "The cutoff table has invalid TOML syntax".to_string(),
            "Expected keys: tolerance, fallback and [[pairs]] entries with a, b, cutoff".to_string(),
        ],
        UniverseError::AtomCountMismatch { frame, .. } => vec![
            format!("The atom count line of frame {frame} disagrees with its atom lines"),
        ],
        UniverseError::UnknownElement(symbol) => vec![
            format!("'{symbol}' is not an element symbol, so it has no mass"),
            "Rename the atom or drop --recenter".to_string(),
        ],
        _ => Vec::new(),
    }
}

fn fallback_hints(err: &Error) -> Vec<String> {
    let msg = error_chain_text(err);

    let hints: &[&str] = if msg.contains("terminal") || msg.contains("stdin") {
        &[
            "Input appears to be from a terminal",
            "Pass an input file or pipe XYZ data to stdin",
        ]
    } else if msg.contains("infer format") {
        &["Use a .json or .xyz extension for output files"]
    } else if msg.contains("no such file") || msg.contains("not found") {
        &[
            "Check that the file path is correct",
            "Verify the file exists and is readable",
        ]
    } else {
        &[]
    };
    hints.iter().map(|h| h.to_string()).collect()
}

fn error_chain_text(err: &Error) -> String {
    err.chain()
        .map(|cause| cause.to_string())
        .collect::<Vec<_>>()
        .join("\n")
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn typed_errors_are_found_behind_context() {
        let err = Err::<(), _>(IoError::parse(Format::Xyz, 4, "bad"))
            .context("Failed to read structure")
            .unwrap_err();
        let hints = collect_hints(&err);
        assert!(hints[0].contains("line 4"));
        assert!(hints.iter().any(|h| h.starts_with("XYZ:")));
    }

    #[test]
    fn wrapped_universe_errors_get_universe_hints() {
        let err = Error::new(IoError::Universe(UniverseError::invalid_cell(2, "singular")));
        let hints = collect_hints(&err);
        assert!(hints[0].contains("Frame 2"));
    }

    #[test]
    fn untyped_errors_fall_back_to_message_heuristics() {
        let err = anyhow::anyhow!("No input file specified and stdin is a terminal.");
        assert_eq!(collect_hints(&err).len(), 2);
        assert!(collect_hints(&anyhow::anyhow!("something odd")).is_empty());
    }
}

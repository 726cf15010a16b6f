use std::path::{Path, PathBuf};

use anyhow::{Result, anyhow};

use atomverse::io::Format;

use super::infer;

#[derive(Debug, Clone, PartialEq)]
pub struct OutputSpec {
    /// Path to write to, or `None` for stdout.
    pub path: Option<PathBuf>,
    pub format: Format,
}

impl OutputSpec {
    /// Output whose format follows the file extension.
    pub fn for_path(path: &Path) -> Result<Self> {
        let format = infer::output(path).ok_or_else(|| {
            anyhow!(
                "Cannot infer format from '{}'. Use a .json or .xyz extension.",
                path.display()
            )
        })?;
        Ok(Self {
            path: Some(path.to_path_buf()),
            format,
        })
    }

    /// JSON snapshot on stdout.
    pub fn stdout_snapshot() -> Self {
        Self {
            path: None,
            format: Format::Json,
        }
    }

    /// File name for progress messages, or `stdout`.
    pub fn target(&self) -> String {
        self.path
            .as_deref()
            .and_then(Path::file_name)
            .map_or_else(|| "stdout".to_string(), |n| n.to_string_lossy().into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_carry_their_format() {
        let spec = OutputSpec::for_path(Path::new("out/run.xyz")).unwrap();
        assert_eq!(spec.format, Format::Xyz);
        assert_eq!(spec.target(), "run.xyz");
        assert_eq!(OutputSpec::stdout_snapshot().target(), "stdout");

        let err = OutputSpec::for_path(Path::new("run.pdb")).unwrap_err();
        assert!(err.to_string().contains("infer format"));
    }
}

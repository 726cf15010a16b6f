use std::path::Path;

use atomverse::io::Format;

pub fn output(path: &Path) -> Option<Format> {
    let ext = path.extension()?.to_str()?.to_lowercase();
    match ext.as_str() {
        "json" => Some(Format::Json),
        "xyz" | "extxyz" => Some(Format::Xyz),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_follow_the_extension() {
        assert_eq!(output(Path::new("run/snap.JSON")), Some(Format::Json));
        assert_eq!(output(Path::new("traj.extxyz")), Some(Format::Xyz));
        assert_eq!(output(Path::new("traj.pdb")), None);
        assert_eq!(output(Path::new("noext")), None);
    }
}

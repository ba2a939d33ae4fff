use std::path::{Path, PathBuf};

/// Suffix appended to the input file stem.
const OUTPUT_SUFFIX: &str = "_acl";

/// Output path derived from the input's base name, placed beside the input.
///
/// `configs/edge-fw.cfg` with extension `xml` becomes `configs/edge-fw_acl.xml`.
pub fn default_output_path(input: &Path, extension: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "config".to_string());
    input.with_file_name(format!("{stem}{OUTPUT_SUFFIX}.{extension}"))
}

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};

    use super::default_output_path;

    #[test]
    fn derives_name_from_stem() {
        assert_eq!(
            default_output_path(Path::new("configs/edge-fw.cfg"), "xml"),
            PathBuf::from("configs/edge-fw_acl.xml")
        );
        assert_eq!(
            default_output_path(Path::new("running-config"), "json"),
            PathBuf::from("running-config_acl.json")
        );
    }
}

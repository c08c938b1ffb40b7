use serde::Deserialize;
use std::{
    fs::File,
    io::{self, BufReader, Read},
    path::PathBuf,
};
use thiserror::Error;

pub const MANIFEST_FILE: &str = "edge.toml";

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("Error reading edge.toml: {0}")]
    Io(#[from] io::Error),
    #[error("Error parsing edge.toml: {0}")]
    Parse(#[from] toml::de::Error),
}

/// The subset of a project's `edge.toml` the CLI reads. Unknown keys are
/// ignored.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Manifest {
    pub service_id: Option<String>,
    pub profile: Option<String>,
}

impl TryFrom<PathBuf> for Manifest {
    type Error = ManifestError;

    fn try_from(path: PathBuf) -> Result<Self, Self::Error> {
        if !path.try_exists()? {
            return Ok(Manifest::default());
        }

        let file = File::open(&path)?;
        let mut buf_reader = BufReader::new(file);
        let mut contents = String::new();
        buf_reader.read_to_string(&mut contents)?;

        let mut manifest: Manifest = toml::from_str(&contents)?;
        manifest.service_id = manifest.service_id.filter(|id| !id.is_empty());
        manifest.profile = manifest.profile.filter(|p| !p.is_empty());
        Ok(manifest)
    }
}

pub fn get_manifest_from_pwd() -> Result<Manifest, ManifestError> {
    let path = std::env::current_dir()?.join(MANIFEST_FILE);
    path.try_into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_manifest_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = Manifest::try_from(dir.path().join(MANIFEST_FILE)).unwrap();
        assert_eq!(manifest, Manifest::default());
    }

    #[test]
    fn test_manifest_reads_service_and_profile() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(MANIFEST_FILE);
        std::fs::write(
            &path,
            "name = \"my-app\"\nservice_id = \"123abc\"\nprofile = \"work\"\n\n[scripts]\nbuild = \"make\"\n",
        )
        .unwrap();

        let manifest = Manifest::try_from(path).unwrap();
        assert_eq!(manifest.service_id.as_deref(), Some("123abc"));
        assert_eq!(manifest.profile.as_deref(), Some("work"));
    }

    #[test]
    fn test_empty_values_are_treated_as_unset() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(MANIFEST_FILE);
        std::fs::write(&path, "service_id = \"\"\n").unwrap();

        let manifest = Manifest::try_from(path).unwrap();
        assert_eq!(manifest.service_id, None);
    }
}

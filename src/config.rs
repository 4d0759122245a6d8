//! Import options supplied once per parse
//!
//! Options can be built in code or loaded from a YAML file:
//!
//! ```yaml
//! ignore_device_speed: true
//! import_notes_into_title: true
//! title_truncation_length: 40
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

use crate::{ImportError, Result};

/// User preferences consumed by the decoder
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ImportOptions {
    /// Do not apply speed leaves from the vendor extensions
    pub ignore_device_speed: bool,
    /// Copy tour notes into the description
    pub import_notes_into_description: bool,
    /// Copy tour notes into the title
    pub import_notes_into_title: bool,
    /// Use the whole note as title instead of truncating it
    pub import_all_notes_into_title: bool,
    /// Maximum title length in characters when notes are truncated
    pub title_truncation_length: usize,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            ignore_device_speed: false,
            import_notes_into_description: true,
            import_notes_into_title: false,
            import_all_notes_into_title: false,
            title_truncation_length: 100,
        }
    }
}

impl ImportOptions {
    /// Parse options from YAML; missing keys keep their defaults.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml_ng::from_str(yaml)?)
    }

    /// Load options from a YAML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path)
            .map_err(|e| ImportError::file_error(path.to_path_buf(), e))?;
        let options = Self::from_yaml(&yaml)?;
        debug!(path = %path.display(), ?options, "Loaded import options");
        Ok(options)
    }

    /// Builder-style toggle for [`ImportOptions::ignore_device_speed`]
    pub fn with_ignore_device_speed(mut self, ignore: bool) -> Self {
        self.ignore_device_speed = ignore;
        self
    }

    /// Route notes into the description and/or title.
    pub fn with_notes(mut self, into_description: bool, into_title: bool) -> Self {
        self.import_notes_into_description = into_description;
        self.import_notes_into_title = into_title;
        self
    }

    /// Title length used when notes are truncated into the title
    pub fn with_title_truncation(mut self, length: usize) -> Self {
        self.title_truncation_length = length;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_yaml_gives_defaults() {
        assert_eq!(ImportOptions::from_yaml("").unwrap(), ImportOptions::default());
    }

    #[test]
    fn partial_yaml_keeps_other_defaults() {
        let options =
            ImportOptions::from_yaml("ignore_device_speed: true\ntitle_truncation_length: 12\n")
                .unwrap();
        assert!(options.ignore_device_speed);
        assert_eq!(options.title_truncation_length, 12);
        assert!(options.import_notes_into_description);
        assert!(!options.import_notes_into_title);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = ImportOptions::from_yaml("ignore_speed: true").unwrap_err();
        assert!(matches!(err, ImportError::Config { .. }));
    }

    #[test]
    fn load_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "import_notes_into_title: true").unwrap();
        writeln!(file, "import_all_notes_into_title: true").unwrap();

        let options = ImportOptions::load(file.path()).unwrap();
        assert!(options.import_notes_into_title);
        assert!(options.import_all_notes_into_title);
    }

    #[test]
    fn load_reports_missing_file_with_path() {
        let err = ImportOptions::load("/definitely/not/here.yaml").unwrap_err();
        match err {
            ImportError::File { path, .. } => assert!(path.ends_with("here.yaml")),
            other => panic!("Expected File error, got {:?}", other),
        }
    }
}

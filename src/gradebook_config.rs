use std::{fs::OpenOptions, io::BufReader, path::Path};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    config::{
        default_settings_file, DEFAULT_BANNED_HEADERS, DEFAULT_EXCLUDE_NAMES,
        DEFAULT_HEADER_ROTATION,
    },
    error::Result,
};

/// Settings that may be kept next to the exports as `gradebook.json`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct GradebookConfig {
    pub course_name: Option<String>,
    pub exclude_names: Vec<String>,
    pub banned_headers: Vec<String>,
    pub header_rotation: i16,
    pub pdf: bool,
}

impl Default for GradebookConfig {
    fn default() -> Self {
        GradebookConfig {
            course_name: None,
            exclude_names: DEFAULT_EXCLUDE_NAMES.iter().map(|s| s.to_string()).collect(),
            banned_headers: DEFAULT_BANNED_HEADERS.iter().map(|s| s.to_string()).collect(),
            header_rotation: DEFAULT_HEADER_ROTATION,
            pdf: true,
        }
    }
}

pub fn read_config(path: &Path) -> Result<GradebookConfig> {
    let file = OpenOptions::new().read(true).open(path)?;
    let config = serde_json::from_reader(BufReader::new(file))?;
    debug!("Loaded settings from {}", path.display());
    Ok(config)
}

/// An explicit path must exist; otherwise `gradebook.json` in the input directory is optional.
pub fn load_config(explicit: Option<&Path>, input_dir: &Path) -> Result<GradebookConfig> {
    match explicit {
        Some(path) => read_config(path),
        None => {
            let fallback = default_settings_file(input_dir);
            if fallback.is_file() {
                read_config(&fallback)
            } else {
                Ok(GradebookConfig::default())
            }
        }
    }
}

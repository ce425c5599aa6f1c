use std::fs;
use std::path::{Path, PathBuf};

use log::info;
use serde::Deserialize;

use crate::error::{PipelineError, Result};

pub static CONFIG_FILE_NAME: &str = "nhanes.json";

static DEMOGRAPHICS_PATH: &str = "data/nhanes/DEMO_J.XPT";
static BODY_MEASURES_PATH: &str = "data/nhanes/BMX_J.XPT";
static BLOOD_PRESSURE_PATH: &str = "data/nhanes/BPX_J.XPT";
static PLOT_DIR: &str = "output/plots/";

/// Input files and the chart directory. Every field may be overridden from
/// `nhanes.json`; fields it omits keep their defaults.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub demographics: PathBuf,
    pub body_measures: PathBuf,
    pub blood_pressure: PathBuf,
    pub plot_dir: PathBuf,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            demographics: PathBuf::from(DEMOGRAPHICS_PATH),
            body_measures: PathBuf::from(BODY_MEASURES_PATH),
            blood_pressure: PathBuf::from(BLOOD_PRESSURE_PATH),
            plot_dir: PathBuf::from(PLOT_DIR),
        }
    }
}

impl PipelineConfig {
    /// Reads `path` if it exists, otherwise returns the defaults.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }

        info!("Reading config from {}", path.display());
        let raw = fs::read_to_string(path)?;
        serde_json::from_str(&raw).map_err(|source| PipelineError::Config {
            path: path.to_path_buf(),
            source,
        })
    }
}

//! Subcommands and the setup they share.

pub mod batch;
pub mod config;
pub mod models;
pub mod process;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use invscan_core::{Annotator, InvoicePipeline, PureOcrDetector, ScanConfig, ScanError};

/// Load the config from `path`, else the default config file, else built-in defaults.
pub fn load_config(path: Option<&str>) -> anyhow::Result<ScanConfig> {
    if let Some(path) = path {
        return Ok(ScanConfig::from_file(Path::new(path))?);
    }

    let default_path = config::default_config_path();
    if default_path.exists() {
        debug!("Using config file {}", default_path.display());
        Ok(ScanConfig::from_file(&default_path)?)
    } else {
        Ok(ScanConfig::default())
    }
}

/// Pick the model directory: explicit override, then the configured directory
/// if it holds a detection model, then the per-user data directory.
pub fn resolve_model_dir(override_dir: Option<&Path>, config: &ScanConfig) -> PathBuf {
    if let Some(dir) = override_dir {
        return dir.to_path_buf();
    }

    if config.model_path(&config.models.detection_model).exists() {
        return config.models.model_dir.clone();
    }

    models::default_model_dir()
}

/// Load the detector once and wrap it in a pipeline.
pub fn build_pipeline(config: &ScanConfig, model_dir: &Path) -> Result<InvoicePipeline, ScanError> {
    debug!("Loading OCR models from {}", model_dir.display());

    let detector = PureOcrDetector::from_dir(model_dir, &config.models, config.ocr.clone())?;
    let annotator = Annotator::new(config.annotation.clone())?;

    Ok(InvoicePipeline::new(Arc::new(detector), annotator))
}

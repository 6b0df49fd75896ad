//! JSON configuration for the whole pipeline.

use crate::card::CardDetectorParams;
use crate::measure::MeasurementConfig;
use crate::{HarvestError, UploadLimits};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

#[derive(thiserror::Error, Debug)]
pub enum ConfigIoError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Every tunable of the pipeline. Missing sections fall back to defaults.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarvestConfig {
    pub upload: UploadLimits,
    pub detector: CardDetectorParams,
    pub measurement: MeasurementConfig,
}

impl HarvestConfig {
    /// Load a JSON config from disk.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, ConfigIoError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Write this config to disk as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), ConfigIoError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), HarvestError> {
        if self.upload.max_bytes == 0 || self.upload.allowed_formats.is_empty() {
            return Err(HarvestError::InvalidConfig(
                "upload limits must allow at least one format and a non-zero size".to_string(),
            ));
        }
        let d = &self.detector;
        if !d.card.is_valid() || !(d.aspect_tolerance >= 0.0) || d.max_candidates == 0 {
            return Err(HarvestError::InvalidConfig(
                "detector needs a valid card, a non-negative tolerance and at least one candidate"
                    .to_string(),
            ));
        }
        self.measurement.validate()?;
        Ok(())
    }
}

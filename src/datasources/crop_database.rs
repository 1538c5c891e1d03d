use super::CropCatalog;
use crate::error::{AgriWaterError, Result};
use crate::logic::validation;
use crate::models::{CropProfile, StageParameters};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

const BUNDLED_CROPS: &str = include_str!("../../data/crops_parameters.json");

#[derive(Debug, Deserialize)]
struct CropFile {
    crops: BTreeMap<String, CropProfile>,
}

/// Crop parameters loaded once from a JSON document.
#[derive(Debug, Clone)]
pub struct CropDatabase {
    crops: BTreeMap<String, CropProfile>,
}

impl CropDatabase {
    /// The crop table shipped with the binary.
    pub fn bundled() -> Result<Self> {
        Self::from_json_str(BUNDLED_CROPS)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let db = Self::from_json_str(&content)?;
        tracing::info!(
            "Crop parameters loaded from {} ({} crops)",
            path.display(),
            db.crops.len()
        );
        Ok(db)
    }

    /// Use `path` if given, otherwise the bundled table.
    pub fn load_or_bundled(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::load(p),
            None => Self::bundled(),
        }
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        let file: CropFile = serde_json::from_str(content)?;
        let crops = file
            .crops
            .into_iter()
            .map(|(key, mut profile)| {
                let name = key.to_lowercase();
                profile.name = name.clone();
                profile.stages = profile
                    .stages
                    .into_iter()
                    .map(|(stage, coefficient)| (stage.to_lowercase(), coefficient))
                    .collect();
                (name, profile)
            })
            .collect();
        Ok(Self { crops })
    }

    pub fn crop_exists(&self, name: &str) -> bool {
        self.crops.contains_key(&name.to_lowercase())
    }

    pub fn stage_exists(&self, crop: &str, stage: &str) -> bool {
        self.crops
            .get(&crop.to_lowercase())
            .is_some_and(|p| p.stage(stage).is_some())
    }
}

impl CropCatalog for CropDatabase {
    fn available_crops(&self) -> Vec<&str> {
        self.crops.keys().map(String::as_str).collect()
    }

    fn crop(&self, name: &str) -> Result<&CropProfile> {
        self.crops.get(&name.to_lowercase()).ok_or_else(|| {
            AgriWaterError::CropData(format!(
                "Invalid crop: '{}'. Available crops: {}",
                name,
                self.available_crops().join(", ")
            ))
        })
    }

    fn stage_parameters(&self, crop: &str, stage: &str) -> Result<StageParameters> {
        let profile = self.crop(crop)?;
        let coefficient = profile.stage(stage).ok_or_else(|| {
            AgriWaterError::CropData(format!(
                "Invalid stage: '{}'. Available stages for {}: {}",
                stage,
                crop,
                profile.stage_names().join(", ")
            ))
        })?;

        validation::validate_crop_coefficient(coefficient.kc)?;

        Ok(StageParameters {
            kc: coefficient.kc,
            irrigation_interval: profile.irrigation_interval,
        })
    }
}

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Crop coefficient and duration of one phenological stage.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StageCoefficient {
    pub kc: f64,
    pub duration_days: u32,
}

/// Recommended number of days between two waterings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "[u32; 2]", into = "[u32; 2]")]
pub struct IrrigationInterval {
    pub min_days: u32,
    pub max_days: u32,
}

impl From<[u32; 2]> for IrrigationInterval {
    fn from([a, b]: [u32; 2]) -> Self {
        Self {
            min_days: a.min(b),
            max_days: a.max(b),
        }
    }
}

impl From<IrrigationInterval> for [u32; 2] {
    fn from(interval: IrrigationInterval) -> Self {
        [interval.min_days, interval.max_days]
    }
}

impl std::fmt::Display for IrrigationInterval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{} days", self.min_days, self.max_days)
    }
}

/// Agronomic parameters of a crop, as stored in the crop database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CropProfile {
    #[serde(default)]
    pub name: String,
    pub full_name: String,
    #[serde(default)]
    pub scientific_name: Option<String>,
    #[serde(default, rename = "type")]
    pub crop_type: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub water_stress_sensitivity: Option<String>,
    #[serde(rename = "phenological_stages")]
    pub stages: BTreeMap<String, StageCoefficient>,
    pub irrigation_interval: IrrigationInterval,
    pub total_cycle_days: u32,
}

impl CropProfile {
    pub fn stage(&self, stage: &str) -> Option<&StageCoefficient> {
        self.stages.get(&stage.to_lowercase())
    }

    /// Stage names in FAO-56 cycle order; unknown stage names sort last.
    pub fn stage_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.stages.keys().map(String::as_str).collect();
        names.sort_by_key(|name| stage_rank(name));
        names
    }
}

fn stage_rank(stage: &str) -> usize {
    match stage {
        "initial" => 0,
        "development" => 1,
        "mid_season" => 2,
        "late_season" => 3,
        _ => 4,
    }
}

/// What the orchestrator needs from the crop catalog for one crop/stage pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StageParameters {
    pub kc: f64,
    pub irrigation_interval: IrrigationInterval,
}

/// `mid_season` -> `Mid Season`
pub fn readable_stage(stage: &str) -> String {
    stage
        .split('_')
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_profile() -> CropProfile {
        serde_json::from_str(
            r#"{
                "full_name": "Maize",
                "phenological_stages": {
                    "late_season": {"kc": 0.35, "duration_days": 30},
                    "initial": {"kc": 0.3, "duration_days": 30},
                    "mid_season": {"kc": 1.2, "duration_days": 50},
                    "development": {"kc": 0.7, "duration_days": 40}
                },
                "irrigation_interval": [7, 5],
                "total_cycle_days": 150
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn interval_is_normalized_to_min_max() {
        let profile = sample_profile();
        assert_eq!(profile.irrigation_interval.min_days, 5);
        assert_eq!(profile.irrigation_interval.max_days, 7);
        assert_eq!(profile.irrigation_interval.to_string(), "5-7 days");
    }

    #[test]
    fn stage_lookup_is_case_insensitive() {
        let profile = sample_profile();
        assert_eq!(profile.stage("MID_SEASON").map(|s| s.kc), Some(1.2));
        assert!(profile.stage("flowering").is_none());
    }

    #[test]
    fn stage_names_follow_the_growing_cycle() {
        assert_eq!(
            sample_profile().stage_names(),
            vec!["initial", "development", "mid_season", "late_season"]
        );
    }

    #[test]
    fn readable_stage_titles_words() {
        assert_eq!(readable_stage("mid_season"), "Mid Season");
        assert_eq!(readable_stage("initial"), "Initial");
    }
}

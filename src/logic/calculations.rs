use crate::error::{AgriWaterError, Result};

/// 1 mm of water over one hectare is exactly 10 m³.
pub const M3_PER_HA_PER_MM: f64 = 10.0;

/// Convert a water depth (mm) to a volume per hectare (m³/ha).
pub fn mm_to_m3_per_ha(mm: f64) -> f64 {
    mm * M3_PER_HA_PER_MM
}

/// Convert a volume (m³) spread over `surface_ha` back to a depth (mm).
pub fn m3_to_mm(m3: f64, surface_ha: f64) -> Result<f64> {
    if surface_ha <= 0.0 {
        return Err(AgriWaterError::Validation(format!(
            "Surface area must be positive to calculate depth (provided: {})",
            surface_ha
        )));
    }
    Ok(m3 / (M3_PER_HA_PER_MM * surface_ha))
}

/// Total volume (m³) of a water depth (mm) applied over `surface_ha`.
pub fn mm_to_m3(mm: f64, surface_ha: f64) -> f64 {
    mm_to_m3_per_ha(mm) * surface_ha
}

pub fn mean(values: impl IntoIterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values
        .into_iter()
        .fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}

//! Checks on caller-supplied parameters. Every check fails with
//! [`AgriWaterError::Validation`].

use crate::error::{AgriWaterError, Result};

pub const LATITUDE_RANGE: (f64, f64) = (-90.0, 90.0);
pub const LONGITUDE_RANGE: (f64, f64) = (-180.0, 180.0);
pub const KC_RANGE: (f64, f64) = (0.0, 2.0);

/// Reports every violation at once, joined with ` | `.
pub fn validate_coordinates(latitude: f64, longitude: f64) -> Result<()> {
    let mut errors = Vec::new();

    if !latitude.is_finite() {
        errors.push(format!("Latitude must be a number, got {}", latitude));
    } else if !(LATITUDE_RANGE.0..=LATITUDE_RANGE.1).contains(&latitude) {
        errors.push(format!("Latitude {} is out of range [-90, 90]", latitude));
    }

    if !longitude.is_finite() {
        errors.push(format!("Longitude must be a number, got {}", longitude));
    } else if !(LONGITUDE_RANGE.0..=LONGITUDE_RANGE.1).contains(&longitude) {
        errors.push(format!("Longitude {} is out of range [-180, 180]", longitude));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(AgriWaterError::Validation(errors.join(" | ")))
    }
}

pub fn validate_surface(area_ha: f64) -> Result<()> {
    if !area_ha.is_finite() {
        return Err(AgriWaterError::Validation(format!(
            "Surface area must be a number, got {}",
            area_ha
        )));
    }
    if area_ha <= 0.0 {
        return Err(AgriWaterError::Validation(format!(
            "Surface area must be positive (provided: {} ha)",
            area_ha
        )));
    }
    Ok(())
}

pub fn validate_crop_coefficient(kc: f64) -> Result<()> {
    if !(KC_RANGE.0..=KC_RANGE.1).contains(&kc) {
        return Err(AgriWaterError::Validation(format!(
            "Kc must be between 0 and 2. Received: {}",
            kc
        )));
    }
    Ok(())
}

pub fn validate_efficiency(efficiency: f64) -> Result<()> {
    if !(efficiency > 0.0 && efficiency <= 1.0) {
        return Err(AgriWaterError::Validation(format!(
            "Irrigation efficiency must be in (0, 1] (received: {})",
            efficiency
        )));
    }
    Ok(())
}

/// The window must fit inside the series; it is never truncated or padded.
pub fn validate_period(days: u32, series_length: usize) -> Result<()> {
    if days == 0 {
        return Err(AgriWaterError::Validation(
            "period_days must be a positive integer".into(),
        ));
    }
    if days as usize > series_length {
        return Err(AgriWaterError::Validation(format!(
            "Requested period ({} days) exceeds available weather data ({} days)",
            days, series_length
        )));
    }
    Ok(())
}

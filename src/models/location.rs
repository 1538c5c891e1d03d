use crate::error::Result;
use crate::logic::validation;
use serde::{Deserialize, Serialize};

/// A validated WGS84 position. Fields are private so an instance always
/// holds in-range values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoCoordinate {
    latitude: f64,
    longitude: f64,
}

impl GeoCoordinate {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self> {
        validation::validate_coordinates(latitude, longitude)?;
        Ok(Self {
            latitude,
            longitude,
        })
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }
}

impl std::fmt::Display for GeoCoordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.4}, {:.4})", self.latitude, self.longitude)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AgriWaterError;

    #[test]
    fn accepts_montpellier() {
        let coord = GeoCoordinate::new(43.6109, 3.8772).unwrap();
        assert_eq!(coord.latitude(), 43.6109);
        assert_eq!(coord.longitude(), 3.8772);
        assert_eq!(coord.to_string(), "(43.6109, 3.8772)");
    }

    #[test]
    fn rejects_out_of_range() {
        assert!(matches!(
            GeoCoordinate::new(95.0, 3.8772),
            Err(AgriWaterError::Validation(_))
        ));
    }
}

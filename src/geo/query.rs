use serde::Deserialize;

use super::Coordinate;
use crate::error::AppError;

/// Query string of the proximity endpoint: `?lat=..&lng=..&radius=..`.
#[derive(Debug, Default, Deserialize)]
pub struct SpotQuery {
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub radius: Option<f64>,
}

impl SpotQuery {
    /// Origin and radius for the search, or a validation error.
    ///
    /// A latitude or longitude of exactly zero counts as not provided.
    pub fn validate(&self, default_radius_km: f64) -> Result<(Coordinate, f64), AppError> {
        let (lat, lng) = match (self.lat, self.lng) {
            (Some(lat), Some(lng)) if lat != 0.0 && lng != 0.0 => (lat, lng),
            _ => {
                return Err(AppError::ValidationError(
                    "Latitude and longitude are required".into(),
                ))
            }
        };

        let origin = Coordinate::new(lat, lng)?;

        let radius = self.radius.unwrap_or(default_radius_km);
        if !radius.is_finite() || radius < 0.0 {
            return Err(AppError::ValidationError(format!(
                "Radius must be a non-negative number, got {}",
                radius
            )));
        }

        Ok((origin, radius))
    }
}

use actix_web::{web, HttpResponse};
use serde::Serialize;
use std::collections::HashMap;
use tracing::{debug, info};

use super::query::SpotQuery;
use super::search::search;
use super::{RankedSpot, SpotCandidate};
use crate::db::models::User;
use crate::error::AppError;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct OwnerSummary {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

impl OwnerSummary {
    fn from_user(owner: Option<&User>) -> Self {
        match owner {
            Some(owner) => Self {
                first_name: owner.first_name.clone().unwrap_or_default(),
                last_name: owner.last_name.clone().unwrap_or_default(),
                email: owner.email.clone(),
            },
            None => Self {
                first_name: "Unknown".to_string(),
                last_name: "Owner".to_string(),
                email: String::new(),
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct NearbySpot {
    pub id: i64,
    pub title: String,
    pub latitude: f64,
    pub longitude: f64,
    pub location: Option<String>,
    pub parking_type: Option<String>,
    pub price_per_hour: f64,
    pub max_vehicle_size: String,
    pub availability_hours: String,
    pub is_available: bool,
    pub contact_phone: Option<String>,
    pub description: String,
    pub distance_km: f64,
    pub owner: OwnerSummary,
}

impl NearbySpot {
    fn new(ranked: RankedSpot, owner: Option<&User>) -> Self {
        let RankedSpot { spot, distance_km } = ranked;
        let SpotCandidate {
            id,
            coordinate,
            is_available,
            price_per_hour,
            title,
            parking_type,
            contact_phone,
            availability_hours,
            location,
            description,
            max_vehicle_size,
            ..
        } = spot;

        Self {
            id,
            title: title
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| format!("Parking Spot {}", id)),
            latitude: coordinate.latitude,
            longitude: coordinate.longitude,
            location,
            parking_type,
            price_per_hour,
            max_vehicle_size,
            availability_hours: if availability_hours.is_empty() {
                "24/7".to_string()
            } else {
                availability_hours
            },
            is_available,
            contact_phone,
            description: description.unwrap_or_default(),
            distance_km: (distance_km * 100.0).round() / 100.0,
            owner: OwnerSummary::from_user(owner),
        }
    }
}

/// `GET /api/parking-spots?lat=..&lng=..&radius=..`
pub async fn nearby_spots(
    query: web::Query<SpotQuery>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let (origin, radius_km) = query.validate(state.config.search.default_radius_km)?;

    let candidates: Vec<SpotCandidate> = state
        .spots
        .list_available_spots(state.config.search.candidate_limit)
        .await?
        .into_iter()
        .map(SpotCandidate::from)
        .collect();
    debug!("Ranking {} candidate spots", candidates.len());

    let ranked = search(origin, radius_km, &candidates);

    let mut owners: HashMap<i64, Option<User>> = HashMap::new();
    for owner_id in ranked.iter().filter_map(|r| r.spot.owner_id) {
        if !owners.contains_key(&owner_id) {
            let owner = state.identities.get_identity_by_id(owner_id).await?;
            owners.insert(owner_id, owner);
        }
    }

    let body: Vec<NearbySpot> = ranked
        .into_iter()
        .map(|r| {
            let owner = r
                .spot
                .owner_id
                .and_then(|id| owners.get(&id))
                .and_then(Option::as_ref);
            NearbySpot::new(r, owner)
        })
        .collect();

    info!(
        "Found {} spots within {} km of ({}, {})",
        body.len(),
        radius_km,
        origin.latitude,
        origin.longitude
    );
    Ok(HttpResponse::Ok().json(body))
}

use actix_web::http::StatusCode;
use actix_web::{test, web, App};
use chrono::{Duration, Utc};
use parkspace_server::db::{NewUser, ParkingSpot};
use parkspace_server::{
    configure_routes, AppState, IdentityStore, InMemoryStore, PasswordHasher, Settings, TokenCodec,
};
use serde_json::{json, Value};
use std::sync::Arc;

macro_rules! init_app {
    ($state:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($state.clone()))
                .configure(configure_routes),
        )
        .await
    };
}

fn setup() -> (InMemoryStore, AppState) {
    let store = InMemoryStore::new();
    let config = Settings::new_for_test().expect("Failed to load test config");
    let state = AppState::with_store(config, Arc::new(store.clone())).expect("Failed to build state");
    (store, state)
}

async fn seed_user(store: &InMemoryStore, email: &str, password: &str, role: Option<&str>) -> i64 {
    let password_hash = PasswordHasher::new(1_000).hash(password).unwrap();
    let new_user = NewUser {
        first_name: Some("Seeded".into()),
        last_name: Some("User".into()),
        email: email.to_string(),
        password_hash,
        ..Default::default()
    };
    let user = match role {
        Some(role) => store.create_identity_with_role(new_user, role).await,
        None => store.create_identity(new_user).await,
    };
    user.unwrap().id
}

fn spot(latitude: f64, longitude: f64, is_available: bool, owner_id: Option<i64>) -> ParkingSpot {
    let now = Utc::now();
    ParkingSpot {
        id: 0,
        title: None,
        description: Some("Gated".into()),
        location: Some("Kolkata".into()),
        latitude,
        longitude,
        price_per_hour: 30.0,
        parking_type: Some("open".into()),
        is_available,
        owner_id,
        max_vehicle_size: "car".into(),
        contact_phone: None,
        availability_hours: "24/7".into(),
        created_at: now,
        updated_at: now,
        is_active: true,
    }
}

fn test_codec() -> TokenCodec {
    TokenCodec::new("test_secret", Duration::minutes(60))
}

#[actix_web::test]
async fn test_signup_and_login() {
    let (_, state) = setup();
    let app = init_app!(state);

    let resp = test::TestRequest::post()
        .uri("/user/signup")
        .set_json(json!({
            "email": "ria@example.com",
            "password": "password123",
            "first_name": "Ria"
        }))
        .send_request(&app)
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["role"], "seeker");
    assert!(body.get("generated_password").is_none());

    let resp = test::TestRequest::put()
        .uri("/user")
        .set_json(json!({ "email": "ria@example.com", "password": "password123" }))
        .send_request(&app)
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Login successful");
    assert_eq!(body["role"], "seeker");

    let token = body["token"].as_str().unwrap();
    let principal = test_codec().decode(token, Utc::now()).unwrap();
    assert_eq!(principal.identity_id, body["user_id"].as_i64().unwrap());
}

#[actix_web::test]
async fn test_login_with_wrong_password() {
    let (store, state) = setup();
    seed_user(&store, "ria@example.com", "password123", None).await;
    let app = init_app!(state);

    let resp = test::TestRequest::put()
        .uri("/user")
        .set_json(json!({ "email": "ria@example.com", "password": "wrong" }))
        .send_request(&app)
        .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"]["message"], "Authentication error: Invalid credentials");

    let resp = test::TestRequest::put()
        .uri("/user")
        .set_json(json!({ "email": "nobody@example.com", "password": "password123" }))
        .send_request(&app)
        .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"]["message"], "Authentication error: Invalid credentials");
}

#[actix_web::test]
async fn test_login_requires_email_and_password() {
    let (_, state) = setup();
    let app = init_app!(state);

    let resp = test::TestRequest::put()
        .uri("/user")
        .set_json(json!({ "email": "ria@example.com" }))
        .send_request(&app)
        .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_user_list_requires_token() {
    let (_, state) = setup();
    let app = init_app!(state);

    let resp = test::TestRequest::get().uri("/user").send_request(&app).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"]["message"], "Authentication error: Authorization token missing");

    let resp = test::TestRequest::get()
        .uri("/user")
        .insert_header(("Authorization", "Bearer garbage"))
        .send_request(&app)
        .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"]["message"], "Authentication error: Invalid or expired token");
}

#[actix_web::test]
async fn test_user_list_role_gating() {
    let (store, state) = setup();
    let seeker_id = seed_user(&store, "seeker@example.com", "pw-seeker", None).await;
    let admin_id = seed_user(&store, "admin@example.com", "pw-admin", Some("admin")).await;
    let app = init_app!(state);
    let codec = test_codec();

    let seeker_token = codec.issue(seeker_id, "seeker", Utc::now()).unwrap();
    let resp = test::TestRequest::get()
        .uri("/user")
        .insert_header(("Authorization", format!("Bearer {}", seeker_token)))
        .send_request(&app)
        .await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let admin_token = codec.issue(admin_id, "admin", Utc::now()).unwrap();
    let resp = test::TestRequest::get()
        .uri("/user")
        .insert_header(("Authorization", format!("Bearer {}", admin_token)))
        .send_request(&app)
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    let users = body.as_array().unwrap();
    assert_eq!(users.len(), 2);
    assert_eq!(users[0]["role"], "seeker");
    assert_eq!(users[1]["role"], "admin");
    assert_eq!(users[1]["name"], "Seeded User");
    assert!(users[0].get("password_hash").is_none());
}

#[actix_web::test]
async fn test_token_for_removed_user_is_not_found() {
    let (store, state) = setup();
    let admin_id = seed_user(&store, "admin@example.com", "pw-admin", Some("admin")).await;
    let token = test_codec().issue(admin_id, "admin", Utc::now()).unwrap();
    assert!(store.remove_identity(admin_id).await);
    let app = init_app!(state);

    let resp = test::TestRequest::get()
        .uri("/user")
        .insert_header(("Authorization", format!("Bearer {}", token)))
        .send_request(&app)
        .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_expired_token_is_unauthorized() {
    let (store, state) = setup();
    let admin_id = seed_user(&store, "admin@example.com", "pw-admin", Some("admin")).await;
    let token = test_codec()
        .issue(admin_id, "admin", Utc::now() - Duration::minutes(61))
        .unwrap();
    let app = init_app!(state);

    let resp = test::TestRequest::get()
        .uri("/user")
        .insert_header(("Authorization", format!("Bearer {}", token)))
        .send_request(&app)
        .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_parking_spots_require_coordinates() {
    let (_, state) = setup();
    let app = init_app!(state);

    for uri in [
        "/api/parking-spots",
        "/api/parking-spots?lat=22.5726",
        "/api/parking-spots?lat=0&lng=88.3639",
        "/api/parking-spots?lat=22.5726&lng=0",
        "/api/parking-spots?lat=95&lng=88.3639",
        "/api/parking-spots?lat=22.5726&lng=88.3639&radius=-1",
    ] {
        let resp = test::TestRequest::get().uri(uri).send_request(&app).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "uri: {}", uri);
    }
}

#[actix_web::test]
async fn test_parking_spots_ranked_by_distance() {
    let (store, state) = setup();
    let owner_id = seed_user(&store, "owner@example.com", "pw", Some("provider")).await;
    store.insert_spot(spot(22.6000, 88.4000, true, None)).await;
    store.insert_spot(spot(22.5750, 88.3650, true, Some(owner_id))).await;
    store.insert_spot(spot(22.5751, 88.3651, false, Some(owner_id))).await;
    store.insert_spot(spot(28.6139, 77.2090, true, None)).await;
    let app = init_app!(state);

    let resp = test::TestRequest::get()
        .uri("/api/parking-spots?lat=22.5726&lng=88.3639&radius=10")
        .send_request(&app)
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    let spots = body.as_array().unwrap();

    assert_eq!(spots.len(), 2);
    assert_eq!(spots[0]["id"], 2);
    assert_eq!(spots[0]["distance_km"], 0.29);
    assert_eq!(spots[0]["title"], "Parking Spot 2");
    assert_eq!(spots[0]["owner"]["email"], "owner@example.com");
    assert_eq!(spots[1]["id"], 1);
    assert_eq!(spots[1]["owner"]["first_name"], "Unknown");
    assert_eq!(spots[1]["owner"]["last_name"], "Owner");
}

#[actix_web::test]
async fn test_parking_spots_default_radius() {
    let (store, state) = setup();
    store.insert_spot(spot(22.5750, 88.3650, true, None)).await;
    // ~1300 km away, outside the 200 km default.
    store.insert_spot(spot(28.6139, 77.2090, true, None)).await;
    let app = init_app!(state);

    let resp = test::TestRequest::get()
        .uri("/api/parking-spots?lat=22.5726&lng=88.3639")
        .send_request(&app)
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
}

#[actix_web::test]
async fn test_provider_signup_listing_is_searchable() {
    let (_, state) = setup();
    let app = init_app!(state);

    let resp = test::TestRequest::post()
        .uri("/user/signup")
        .set_json(json!({
            "email": "owner@example.com",
            "password": "password123",
            "first_name": "Dev",
            "last_name": "Roy",
            "role": "provider",
            "latitude": 22.5750,
            "longitude": 88.3650,
            "address": "Park Street, Kolkata",
            "hourly_rate": 50.0,
            "parking_type": "covered"
        }))
        .send_request(&app)
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["role"], "provider");
    assert_eq!(body["parking_spot"]["title"], "Parking - Park Street, Kolkata");

    let resp = test::TestRequest::get()
        .uri("/api/parking-spots?lat=22.5726&lng=88.3639&radius=2")
        .send_request(&app)
        .await;
    let body: Value = test::read_body_json(resp).await;
    let spots = body.as_array().unwrap();
    assert_eq!(spots.len(), 1);
    assert_eq!(spots[0]["price_per_hour"], 50.0);
    assert_eq!(spots[0]["owner"]["first_name"], "Dev");
}

#[actix_web::test]
async fn test_signup_cannot_claim_admin() {
    let (_, state) = setup();
    let app = init_app!(state);

    let resp = test::TestRequest::post()
        .uri("/user/signup")
        .set_json(json!({ "email": "boss@example.com", "password": "pw", "role": "admin" }))
        .send_request(&app)
        .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_malformed_query_uses_error_body() {
    let (_, state) = setup();
    let app = init_app!(state);

    let resp = test::TestRequest::get()
        .uri("/api/parking-spots?lat=abc&lng=88.3639")
        .send_request(&app)
        .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"]["status"], 400);
    assert!(body["error"]["message"].as_str().unwrap().starts_with("Validation error:"));
}

#[actix_web::test]
async fn test_malformed_signup_body_uses_error_body() {
    let (_, state) = setup();
    let app = init_app!(state);

    let resp = test::TestRequest::post()
        .uri("/user/signup")
        .set_json(json!({ "email": "owner@example.com", "role": "provider", "latitude": "north" }))
        .send_request(&app)
        .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"]["status"], 400);
}

#[actix_web::test]
async fn test_provider_signup_with_string_numbers() {
    let (_, state) = setup();
    let app = init_app!(state);

    let resp = test::TestRequest::post()
        .uri("/user/signup")
        .set_json(json!({
            "email": "form@example.com",
            "password": "password123",
            "role": "provider",
            "latitude": "22.5726",
            "longitude": "88.3639",
            "address": "Salt Lake, Kolkata",
            "hourly_rate": "50.0"
        }))
        .send_request(&app)
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["parking_spot"]["latitude"], 22.5726);
    assert_eq!(body["parking_spot"]["longitude"], 88.3639);
    assert_eq!(body["parking_spot"]["price_per_hour"], 50.0);
}

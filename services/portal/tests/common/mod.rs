//! A small in-process stand-in for the spa backend, served with axum on an
//! ephemeral port. It records what the client sent so tests can assert on it.

use axum::extract::{Multipart, Path, RawQuery, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;
use url::Url;

#[derive(Default)]
pub struct Seen {
    pub queries: Vec<Option<String>>,
    pub auth_headers: Vec<Option<String>>,
    pub multipart_fields: Vec<(String, Option<String>, Vec<u8>)>,
    pub bookings: Vec<Value>,
    pub service_active: bool,
    pub toggles: usize,
}

type Shared = Arc<Mutex<Seen>>;

pub struct MockBackend {
    pub base_url: Url,
    pub seen: Shared,
}

pub async fn spawn() -> MockBackend {
    let seen: Shared = Arc::new(Mutex::new(Seen {
        service_active: true,
        ..Default::default()
    }));

    let app = Router::new()
        .route("/api/bookings", get(list_bookings).post(create_booking))
        .route(
            "/api/bookings/{id}",
            get(get_booking).put(update_booking).delete(delete_booking),
        )
        .route("/api/services/categories", get(categories))
        .route("/api/services/{id}/toggle-status", patch(toggle_service))
        .route("/api/contacts", post(reject_with_message))
        .route("/api/newsletter/subscribe", post(reject_without_message))
        .route("/api/newsletter/count", get(subscriber_count))
        .route("/api/auth/login", post(login))
        .route("/api/auth/register", post(register))
        .route("/api/auth/me", get(me))
        .with_state(seen.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    MockBackend {
        base_url: Url::parse(&format!("http://{}/api/", addr)).unwrap(),
        seen,
    }
}

fn ok(data: Value) -> Json<Value> {
    Json(json!({ "success": true, "data": data }))
}

fn not_found(message: &str) -> (StatusCode, Json<Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "success": false, "message": message })),
    )
}

async fn list_bookings(State(seen): State<Shared>, RawQuery(query): RawQuery) -> Json<Value> {
    let mut seen = seen.lock().unwrap();
    seen.queries.push(query);
    let total = seen.bookings.len();
    Json(json!({
        "success": true,
        "data": seen.bookings,
        "pagination": { "page": 1, "limit": 10, "total": total, "pages": 1 }
    }))
}

async fn create_booking(
    State(seen): State<Shared>,
    Json(mut body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let mut seen = seen.lock().unwrap();
    let id = format!("64f0c0ffee{}", seen.bookings.len() + 1);
    body["_id"] = json!(id);
    body["status"] = json!("pending");
    body["createdAt"] = json!("2025-03-01T09:30:00.000Z");
    seen.bookings.push(body.clone());
    (StatusCode::CREATED, ok(body))
}

async fn get_booking(
    State(seen): State<Shared>,
    Path(id): Path<String>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let seen = seen.lock().unwrap();
    seen.bookings
        .iter()
        .find(|b| b["_id"] == id)
        .map(|b| ok(b.clone()))
        .ok_or_else(|| not_found("Booking not found"))
}

async fn update_booking(
    State(seen): State<Shared>,
    Path(id): Path<String>,
    Json(changes): Json<Value>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let mut seen = seen.lock().unwrap();
    let booking = seen
        .bookings
        .iter_mut()
        .find(|b| b["_id"] == id)
        .ok_or_else(|| not_found("Booking not found"))?;
    if let Some(fields) = changes.as_object() {
        for (key, value) in fields {
            booking[key.as_str()] = value.clone();
        }
    }
    Ok(ok(booking.clone()))
}

async fn delete_booking(
    State(seen): State<Shared>,
    Path(id): Path<String>,
) -> Json<Value> {
    seen.lock().unwrap().bookings.retain(|b| b["_id"] != id);
    Json(json!({ "success": true, "message": "Booking deleted" }))
}

async fn categories() -> Json<Value> {
    ok(json!([
        "Massage",
        { "_id": "c2", "name": "Facials", "icon": "sparkles" },
        { "slug": "body-treatments" },
        42
    ]))
}

async fn toggle_service(State(seen): State<Shared>, Path(id): Path<String>) -> Json<Value> {
    let mut seen = seen.lock().unwrap();
    seen.service_active = !seen.service_active;
    seen.toggles += 1;
    ok(json!({
        "_id": id,
        "slug": "swedish-massage",
        "name": "Swedish Massage",
        "durations": [{ "duration": 60, "price": 85 }],
        "isActive": seen.service_active
    }))
}

async fn reject_with_message() -> (StatusCode, Json<Value>) {
    (
        StatusCode::OK,
        Json(json!({ "success": false, "message": "Message could not be delivered" })),
    )
}

async fn reject_without_message() -> (StatusCode, Json<Value>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "success": false })),
    )
}

async fn subscriber_count() -> Json<Value> {
    ok(json!({ "count": 17 }))
}

fn user_json() -> Value {
    json!({
        "_id": "u1",
        "name": "Ada Admin",
        "email": "ada@spa.test",
        "username": "ada",
        "mobile": "5550100",
        "role": "admin"
    })
}

async fn login(Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    if body["identifier"] == "ada" && body["password"] == "correct horse" {
        (
            StatusCode::OK,
            ok(json!({ "token": "tok-live", "user": user_json() })),
        )
    } else {
        (
            StatusCode::BAD_REQUEST,
            Json(json!({ "success": false, "message": "Invalid credentials" })),
        )
    }
}

async fn register(State(seen): State<Shared>, mut multipart: Multipart) -> Json<Value> {
    let mut fields = Vec::new();
    while let Some(field) = multipart.next_field().await.unwrap() {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_string);
        let data = field.bytes().await.unwrap().to_vec();
        fields.push((name, file_name, data));
    }
    seen.lock().unwrap().multipart_fields = fields;
    ok(json!({ "token": "tok-new", "user": user_json() }))
}

async fn me(State(seen): State<Shared>, headers: HeaderMap) -> Json<Value> {
    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    seen.lock().unwrap().auth_headers.push(auth);
    ok(user_json())
}

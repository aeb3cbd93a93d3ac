#![allow(dead_code)]

use std::{
    collections::HashMap,
    net::SocketAddr,
    path::PathBuf,
    sync::{Arc, Mutex},
};

use axum::{
    extract::{Path, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use chrono::NaiveDate;
use itinera::{clock::FixedClock, config::ClientConfig, state::AppState};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use uuid::Uuid;

pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 16).expect("valid date")
}

pub fn app_state(store: &FakeStore, session_dir: PathBuf) -> AppState {
    let config = ClientConfig::with_base(&store.base_url(), session_dir).expect("config");
    AppState::with_clock(config, Arc::new(FixedClock(today()))).expect("app state")
}

struct Account {
    id: String,
    name: String,
    email: String,
    password: String,
}

#[derive(Default)]
pub struct Db {
    accounts: Vec<Account>,
    tokens: HashMap<String, String>,
    trips: Vec<Value>,
    activities: HashMap<String, Vec<Value>>,
    budget: HashMap<String, Vec<Value>>,
    next_id: u64,
    requests: usize,
    fail_next: Option<u16>,
}

impl Db {
    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    /// Counts the request, applies injected failures and resolves the caller.
    fn gate(&mut self, headers: &HeaderMap) -> Result<String, Response> {
        self.admit()?;
        let token = headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .unwrap_or_default();
        self.tokens
            .get(token)
            .cloned()
            .ok_or_else(|| reject(StatusCode::UNAUTHORIZED, "error", "Unauthorized"))
    }

    fn admit(&mut self) -> Result<(), Response> {
        self.requests += 1;
        match self.fail_next.take() {
            Some(status) => Err(reject(
                StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
                "error",
                "injected failure",
            )),
            None => Ok(()),
        }
    }
}

fn reject(status: StatusCode, key: &str, message: &str) -> Response {
    let mut body = serde_json::Map::new();
    body.insert(key.to_string(), Value::from(message));
    (status, Json(Value::Object(body))).into_response()
}

type Shared = Arc<Mutex<Db>>;

/// In-process stand-in for the trip store REST service.
#[derive(Clone)]
pub struct FakeStore {
    pub addr: SocketAddr,
    db: Shared,
}

impl FakeStore {
    pub async fn spawn() -> Self {
        let db: Shared = Arc::default();
        let app = Router::new()
            .route("/api/register", post(register))
            .route("/api/login", post(login))
            .route("/api/trips", get(list_trips).post(create_trip))
            .route("/api/trips/:trip_id", get(show_trip))
            .route(
                "/api/activities/:trip_id",
                get(list_activities).post(create_activity),
            )
            .route("/api/activities/:trip_id/:id", delete(delete_activity))
            .route("/api/budget/:trip_id", get(list_budget))
            .with_state(db.clone());

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind fake store");
        let addr = listener.local_addr().expect("fake store addr");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("fake store stopped");
        });
        Self { addr, db }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}/", self.addr)
    }

    pub fn requests(&self) -> usize {
        self.db.lock().unwrap().requests
    }

    pub fn fail_next(&self, status: u16) {
        self.db.lock().unwrap().fail_next = Some(status);
    }

    pub fn trips(&self) -> Vec<Value> {
        self.db.lock().unwrap().trips.clone()
    }

    pub fn trip_id(&self, title: &str) -> Option<String> {
        self.trips()
            .iter()
            .find(|t| t["title"] == title)
            .map(|t| t["tripId"].to_string())
    }

    pub fn seed_trip(&self, title: &str, location: &str, start: &str, end: &str) -> String {
        let mut db = self.db.lock().unwrap();
        let id = db.next_id();
        db.trips.push(json!({
            "tripId": id,
            "title": title,
            "location": location,
            "startDate": start,
            "endDate": end,
        }));
        id.to_string()
    }

    pub fn seed_activity(&self, trip_id: &str, time: &str, name: &str) -> String {
        let mut db = self.db.lock().unwrap();
        let id = db.next_id();
        db.activities
            .entry(trip_id.to_string())
            .or_default()
            .push(json!({ "id": id, "startTime": time, "name": name }));
        id.to_string()
    }

    pub fn seed_budget(&self, trip_id: &str, entry: Value) {
        let mut db = self.db.lock().unwrap();
        db.budget.entry(trip_id.to_string()).or_default().push(entry);
    }

    pub fn activities(&self, trip_id: &str) -> Vec<Value> {
        self.db
            .lock()
            .unwrap()
            .activities
            .get(trip_id)
            .cloned()
            .unwrap_or_default()
    }

    pub fn activity_id(&self, trip_id: &str, name: &str) -> Option<String> {
        self.activities(trip_id)
            .iter()
            .find(|a| a["name"] == name)
            .map(|a| a["id"].to_string())
    }
}

async fn register(State(db): State<Shared>, Json(body): Json<Value>) -> Response {
    let mut db = db.lock().unwrap();
    if let Err(resp) = db.admit() {
        return resp;
    }
    let email = body["email"].as_str().unwrap_or_default().to_string();
    if db.accounts.iter().any(|a| a.email == email) {
        return reject(StatusCode::BAD_REQUEST, "message", "User already exists");
    }
    let id = Uuid::new_v4().to_string();
    db.accounts.push(Account {
        id,
        name: body["name"].as_str().unwrap_or_default().to_string(),
        email,
        password: body["password"].as_str().unwrap_or_default().to_string(),
    });
    (
        StatusCode::CREATED,
        Json(json!({ "message": "User registered" })),
    )
        .into_response()
}

async fn login(State(db): State<Shared>, Json(body): Json<Value>) -> Response {
    let mut db = db.lock().unwrap();
    if let Err(resp) = db.admit() {
        return resp;
    }
    let found = db
        .accounts
        .iter()
        .find(|a| a.email == body["email"] && a.password == body["password"])
        .map(|a| (a.id.clone(), a.name.clone(), a.email.clone()));
    let Some((id, name, email)) = found else {
        return reject(StatusCode::UNAUTHORIZED, "message", "Invalid credentials");
    };
    let token = Uuid::new_v4().to_string();
    db.tokens.insert(token.clone(), id.clone());
    Json(json!({
        "token": token,
        "user": { "id": id, "name": name, "email": email }
    }))
    .into_response()
}

async fn list_trips(State(db): State<Shared>, headers: HeaderMap) -> Response {
    let mut db = db.lock().unwrap();
    if let Err(resp) = db.gate(&headers) {
        return resp;
    }
    Json(db.trips.clone()).into_response()
}

async fn create_trip(
    State(db): State<Shared>,
    headers: HeaderMap,
    Json(mut body): Json<Value>,
) -> Response {
    let mut db = db.lock().unwrap();
    let user = match db.gate(&headers) {
        Ok(user) => user,
        Err(resp) => return resp,
    };
    let id = db.next_id();
    body["tripId"] = json!(id);
    body["userId"] = json!(user);
    db.trips.push(body.clone());
    (StatusCode::CREATED, Json(body)).into_response()
}

// The real service answers with a one-element array here.
async fn show_trip(
    State(db): State<Shared>,
    headers: HeaderMap,
    Path(trip_id): Path<String>,
) -> Response {
    let mut db = db.lock().unwrap();
    if let Err(resp) = db.gate(&headers) {
        return resp;
    }
    let found: Vec<Value> = db
        .trips
        .iter()
        .filter(|t| t["tripId"].to_string() == trip_id)
        .cloned()
        .collect();
    if found.is_empty() {
        return reject(StatusCode::NOT_FOUND, "error", "Trip not found");
    }
    Json(found).into_response()
}

async fn list_activities(
    State(db): State<Shared>,
    headers: HeaderMap,
    Path(trip_id): Path<String>,
) -> Response {
    let mut db = db.lock().unwrap();
    if let Err(resp) = db.gate(&headers) {
        return resp;
    }
    Json(db.activities.get(&trip_id).cloned().unwrap_or_default()).into_response()
}

async fn create_activity(
    State(db): State<Shared>,
    headers: HeaderMap,
    Path(trip_id): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    let mut db = db.lock().unwrap();
    if let Err(resp) = db.gate(&headers) {
        return resp;
    }
    let id = db.next_id();
    db.activities.entry(trip_id).or_default().push(json!({
        "id": id,
        "startTime": body["time"],
        "name": body["description"],
    }));
    (
        StatusCode::CREATED,
        Json(json!({ "message": "Activity added" })),
    )
        .into_response()
}

async fn delete_activity(
    State(db): State<Shared>,
    headers: HeaderMap,
    Path((trip_id, id)): Path<(String, String)>,
) -> Response {
    let mut db = db.lock().unwrap();
    if let Err(resp) = db.gate(&headers) {
        return resp;
    }
    let Some(rows) = db.activities.get_mut(&trip_id) else {
        return reject(StatusCode::NOT_FOUND, "error", "Activity not found");
    };
    let before = rows.len();
    rows.retain(|a| a["id"].to_string() != id);
    if rows.len() == before {
        return reject(StatusCode::NOT_FOUND, "error", "Activity not found");
    }
    Json(json!({ "message": "Activity deleted" })).into_response()
}

async fn list_budget(
    State(db): State<Shared>,
    headers: HeaderMap,
    Path(trip_id): Path<String>,
) -> Response {
    let mut db = db.lock().unwrap();
    if let Err(resp) = db.gate(&headers) {
        return resp;
    }
    Json(db.budget.get(&trip_id).cloned().unwrap_or_default()).into_response()
}

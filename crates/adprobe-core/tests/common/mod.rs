//! In-process stand-in for the listings service, served with axum on a
//! random local port.

use adprobe_core::{Config, ListingsClient};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::net::TcpListener;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

/// Deliberate contract violations the stand-in can be asked to commit.
#[allow(dead_code)]
#[derive(Debug, Clone, Copy, Default)]
pub struct Faults {
    pub accept_negative_price: bool,
    pub ignore_seller_filter: bool,
    pub negative_counters: bool,
    /// Store and echo `"mangled"` instead of the submitted title.
    pub mangle_echo: bool,
    /// Answer validation failures with 422 instead of 400.
    pub reject_with_422: bool,
    /// Reject titles or descriptions longer than 255 characters.
    pub reject_long_strings: bool,
    /// Serve a listing and stats for any id, known or not.
    pub serve_unknown_ids: bool,
}

const MAX_TEXT_LEN: usize = 255;

pub struct TestApp {
    pub client: ListingsClient,
    items: Arc<Mutex<Vec<Value>>>,
}

#[allow(dead_code)]
impl TestApp {
    pub fn stored(&self) -> usize {
        self.items.lock().unwrap().len()
    }
}

#[derive(Clone)]
struct AppState {
    items: Arc<Mutex<Vec<Value>>>,
    next_id: Arc<AtomicU64>,
    faults: Faults,
}

#[allow(dead_code)]
pub async fn spawn_app() -> TestApp {
    spawn_app_with(Faults::default()).await
}

pub async fn spawn_app_with(faults: Faults) -> TestApp {
    let items = Arc::new(Mutex::new(Vec::new()));
    let state = AppState {
        items: items.clone(),
        next_id: Arc::new(AtomicU64::new(1)),
        faults,
    };
    let app = Router::new()
        .route("/api/items", get(list_items).post(create_item))
        .route("/api/items/:id", get(get_item))
        .route("/api/items/:id/stats", get(get_stats))
        .with_state(state);

    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    let server = axum::Server::from_tcp(listener)
        .expect("Failed to bind address")
        .serve(app.into_make_service());
    let _ = tokio::spawn(server);

    let client =
        ListingsClient::new(Config::new(address)).expect("Failed to build client");

    TestApp {
        client,
        items,
    }
}

/// A base url nothing is listening on.
#[allow(dead_code)]
pub fn dead_address() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{}", port)
}

fn rejection(status: StatusCode, message: &str) -> Response {
    let body = json!({
        "result": { "message": message, "messages": {} },
        "status": status.as_u16().to_string(),
    });
    let request_id = format!("req-{}", status.as_u16());
    (status, [("x-request-id", request_id)], Json(body)).into_response()
}

fn invalid(faults: &Faults, message: &str) -> Response {
    let status = if faults.reject_with_422 {
        StatusCode::UNPROCESSABLE_ENTITY
    } else {
        StatusCode::BAD_REQUEST
    };
    rejection(status, message)
}

async fn create_item(State(state): State<AppState>, Json(body): Json<Value>) -> Response {
    let seller_id = body.get("sellerId").and_then(Value::as_i64);
    let title = body.get("title").and_then(Value::as_str);
    let description = body.get("description").and_then(Value::as_str);
    let price = body.get("price").and_then(Value::as_i64);
    let picture = body.get("picture").and_then(Value::as_str);

    let (Some(seller_id), Some(title), Some(description), Some(price), Some(picture)) =
        (seller_id, title, description, price, picture)
    else {
        return invalid(&state.faults, "missing required fields");
    };
    if price < 0 && !state.faults.accept_negative_price {
        return invalid(&state.faults, "price must not be negative");
    }
    if state.faults.reject_long_strings
        && (title.chars().count() > MAX_TEXT_LEN || description.chars().count() > MAX_TEXT_LEN)
    {
        return invalid(&state.faults, "title too long");
    }
    let title = if state.faults.mangle_echo {
        "mangled"
    } else {
        title
    };

    let id = format!("item-{}", state.next_id.fetch_add(1, Ordering::SeqCst));
    let item = json!({
        "id": id,
        "sellerId": seller_id,
        "title": title,
        "description": description,
        "price": price,
        "picture": picture,
        "createdAt": chrono::Utc::now().to_rfc3339(),
    });
    state.items.lock().unwrap().push(item.clone());
    Json(item).into_response()
}

async fn list_items(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let Some(seller_id) = params.get("sellerId").and_then(|v| v.parse::<i64>().ok()) else {
        return rejection(StatusCode::BAD_REQUEST, "sellerId is required");
    };
    let items: Vec<Value> = state
        .items
        .lock()
        .unwrap()
        .iter()
        .filter(|item| {
            state.faults.ignore_seller_filter || item["sellerId"].as_i64() == Some(seller_id)
        })
        .cloned()
        .collect();
    Json(json!({ "items": items })).into_response()
}

fn find(state: &AppState, id: &str) -> Option<Value> {
    state
        .items
        .lock()
        .unwrap()
        .iter()
        .find(|item| item["id"] == id)
        .cloned()
}

async fn get_item(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    match find(&state, &id) {
        Some(item) => Json(item).into_response(),
        None if state.faults.serve_unknown_ids => Json(json!({
            "id": id,
            "sellerId": 0,
            "title": "",
            "description": "",
            "price": 0,
            "picture": "",
            "createdAt": chrono::Utc::now().to_rfc3339(),
        }))
        .into_response(),
        None => rejection(StatusCode::NOT_FOUND, "item not found"),
    }
}

async fn get_stats(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    if find(&state, &id).is_none() && !state.faults.serve_unknown_ids {
        return rejection(StatusCode::NOT_FOUND, "item not found");
    }
    let views = if state.faults.negative_counters { -1 } else { 0 };
    Json(json!({ "itemId": id, "views": views, "clicks": 0 })).into_response()
}

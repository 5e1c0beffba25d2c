//! In-process fake NowDB service for integration tests.
//!
//! Records every request it receives and either answers with a canned reply
//! or emulates the service over an in-memory document list.

#![allow(dead_code)]

use actix_web::dev::ServerHandle;
use actix_web::http::{header, StatusCode};
use actix_web::{web, App, HttpRequest, HttpResponse, HttpServer};
use nowdb_rs::ClientConfig;
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use uuid::Uuid;

pub const TOKEN: &str = "55002ab88d909e8324aaea01";
pub const PROJECT: &str = "rust_nowdb";
pub const APP_ID: &str = "56af6e3c1f6d04391f004740";

/// Form keys that are never document attributes
const RESERVED_KEYS: [&str; 8] = [
    "token",
    "project",
    "appid",
    "collection",
    "limit",
    "offset",
    "order",
    "mixin",
];

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub operation: String,
    pub content_type: String,
    pub form: HashMap<String, String>,
}

#[derive(Debug, Clone)]
pub enum Reply {
    Json(Value),
    Text(String),
    Status(u16, String),
    Delayed(Duration, Value),
    Emulate,
}

struct FakeState {
    reply: Reply,
    requests: Mutex<Vec<RecordedRequest>>,
    documents: Mutex<Vec<(String, Value)>>,
}

pub struct FakeNowDb {
    addr: SocketAddr,
    state: Arc<FakeState>,
    handle: ServerHandle,
}

impl FakeNowDb {
    /// Start on an ephemeral port. Must be called inside an actix runtime.
    pub fn start(reply: Reply) -> Self {
        let state = Arc::new(FakeState {
            reply,
            requests: Mutex::new(Vec::new()),
            documents: Mutex::new(Vec::new()),
        });
        let data = web::Data::from(state.clone());

        let server = HttpServer::new(move || {
            App::new()
                .app_data(data.clone())
                .route("/operation/{operation}", web::post().to(handle_operation))
        })
        .workers(1)
        .disable_signals()
        .bind(("127.0.0.1", 0))
        .expect("bind fake NowDB server");

        let addr = server.addrs()[0];
        let server = server.run();
        let handle = server.handle();
        actix_web::rt::spawn(server);

        Self {
            addr,
            state,
            handle,
        }
    }

    pub fn emulator() -> Self {
        Self::start(Reply::Emulate)
    }

    pub fn base_url(&self) -> String {
        format!("http://{}/operation", self.addr)
    }

    /// Client config pointed at this server, with no collection set
    pub fn config(&self) -> ClientConfig {
        ClientConfig::new(TOKEN, PROJECT, APP_ID).with_base_url(self.base_url())
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().unwrap().clone()
    }

    pub fn last_request(&self) -> RecordedRequest {
        self.requests()
            .pop()
            .expect("fake NowDB server received no requests")
    }

    pub async fn stop(self) {
        self.handle.stop(false).await;
    }
}

async fn handle_operation(
    path: web::Path<String>,
    http_req: HttpRequest,
    form: web::Form<HashMap<String, String>>,
    state: web::Data<FakeState>,
) -> HttpResponse {
    let operation = path.into_inner();
    let form = form.into_inner();
    let content_type = http_req
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();

    state.requests.lock().unwrap().push(RecordedRequest {
        operation: operation.clone(),
        content_type,
        form: form.clone(),
    });

    match &state.reply {
        Reply::Json(value) => HttpResponse::Ok().json(value),
        Reply::Text(text) => HttpResponse::Ok()
            .content_type("text/plain")
            .body(text.clone()),
        Reply::Status(code, body) => {
            let status = StatusCode::from_u16(*code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            HttpResponse::build(status).body(body.clone())
        }
        Reply::Delayed(delay, value) => {
            actix_web::rt::time::sleep(*delay).await;
            HttpResponse::Ok().json(value)
        }
        Reply::Emulate => emulate(&state, &operation, &form),
    }
}

fn emulate(state: &FakeState, operation: &str, form: &HashMap<String, String>) -> HttpResponse {
    let collection = form.get("collection").cloned().unwrap_or_default();
    let mut documents = state.documents.lock().unwrap();

    match operation {
        "insert" => {
            let mut record = Map::new();
            record.insert("id".to_string(), json!(Uuid::new_v4().to_string()));
            for (key, value) in attributes(form) {
                record.insert(key.clone(), json!(value));
            }
            let record = Value::Object(record);
            documents.push((collection, record.clone()));
            HttpResponse::Ok().json(json!([record]))
        }
        "select_all" => {
            let matches = documents
                .iter()
                .filter(|(c, _)| *c == collection)
                .map(|(_, doc)| doc.clone());
            HttpResponse::Ok().json(page(matches, form))
        }
        "select_id" => {
            let id = form.get("id").map(String::as_str).unwrap_or_default();
            let found = documents
                .iter()
                .find(|(c, doc)| *c == collection && doc["id"] == id)
                .map(|(_, doc)| doc.clone());
            HttpResponse::Ok().json(found.unwrap_or_else(|| json!({"error": "not found"})))
        }
        "select_where" => {
            let criteria: Vec<(&String, &String)> = attributes(form).collect();
            let matches = documents
                .iter()
                .filter(|(c, doc)| {
                    *c == collection && criteria.iter().all(|(k, v)| doc[k.as_str()] == v.as_str())
                })
                .map(|(_, doc)| doc.clone());
            HttpResponse::Ok().json(page(matches, form))
        }
        _ => HttpResponse::NotFound().body("unknown operation"),
    }
}

fn attributes(form: &HashMap<String, String>) -> impl Iterator<Item = (&String, &String)> {
    form.iter()
        .filter(|(k, _)| !RESERVED_KEYS.contains(&k.as_str()))
}

fn page(docs: impl Iterator<Item = Value>, form: &HashMap<String, String>) -> Value {
    let offset = form
        .get("offset")
        .and_then(|v| v.parse().ok())
        .unwrap_or(0);
    let limit = form
        .get("limit")
        .and_then(|v| v.parse().ok())
        .unwrap_or(usize::MAX);
    Value::Array(docs.skip(offset).take(limit).collect())
}

//! Common test utilities and helpers
//!
//! [`FakeObjectService`] is an in-process stand-in for the objects service:
//! a `wiremock` responder backed by a mutable store seeded with the reference
//! objects. Tests that need the service to misbehave mount extra mocks with a
//! higher priority on the same server.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use objectcheck::{ClientConfig, TestContext, data};
use serde_json::{Map, Value, json};
use wiremock::matchers::{method, path, path_regex};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

/// Regex matching the collection and single-object paths.
pub const OBJECTS_ROUTE: &str = r"^/objects(/[^/]+)?$";

/// Stateful fake of the objects endpoint.
#[derive(Clone, Default)]
pub struct FakeObjectService {
    store: Arc<Mutex<Vec<Value>>>,
}

impl FakeObjectService {
    /// A service holding the seeded reference objects.
    pub fn seeded() -> Self {
        let records = data::reference_objects()
            .into_iter()
            .map(|record| serde_json::to_value(record).unwrap())
            .collect();
        Self {
            store: Arc::new(Mutex::new(records)),
        }
    }

    /// Start a mock server with a seeded fake mounted at `/objects`.
    pub async fn start() -> (MockServer, Self) {
        let server = MockServer::start().await;
        let fake = Self::seeded();
        fake.mount(&server).await;
        (server, fake)
    }

    /// Mount this fake on `server` at the default priority.
    pub async fn mount(&self, server: &MockServer) {
        Mock::given(path_regex(OBJECTS_ROUTE))
            .respond_with(self.clone())
            .mount(server)
            .await;
    }

    /// Make POST store the object but answer with a body whose `price` is a
    /// string, so the response fails validation after the create happened.
    pub async fn mount_rejected_create(&self, server: &MockServer, id: &'static str) {
        let fake = self.clone();
        Mock::given(method("POST"))
            .and(path("/objects"))
            .respond_with(move |_request: &Request| {
                let record = json!({
                    "id": id,
                    "name": "Apple MacBook Pro 16",
                    "data": {"year": 2019, "price": "1849.99"}
                });
                fake.insert(record.clone());
                ResponseTemplate::new(200).set_body_json(record)
            })
            .with_priority(1)
            .mount(server)
            .await;
    }

    /// Whether an object with `id` is stored.
    pub fn contains(&self, id: &str) -> bool {
        self.find(id).is_some()
    }

    /// Number of stored objects.
    pub fn len(&self) -> usize {
        self.store.lock().unwrap().len()
    }

    /// Stored copy of an object.
    pub fn find(&self, id: &str) -> Option<Value> {
        self.store
            .lock()
            .unwrap()
            .iter()
            .find(|record| record["id"] == id)
            .cloned()
    }

    /// Store an object directly, bypassing HTTP.
    pub fn insert(&self, record: Value) {
        self.store.lock().unwrap().push(record);
    }

    fn list(&self, request: &Request) -> ResponseTemplate {
        let ids: Vec<String> = request
            .url
            .query_pairs()
            .filter(|(key, _)| key == "id")
            .map(|(_, value)| value.into_owned())
            .collect();

        let store = self.store.lock().unwrap();
        let records: Vec<Value> = if request.url.query_pairs().any(|(key, _)| key == "id") {
            store
                .iter()
                .filter(|record| ids.iter().any(|id| record["id"] == id.as_str()))
                .cloned()
                .collect()
        } else {
            store.clone()
        };
        ResponseTemplate::new(200).set_body_json(Value::Array(records))
    }

    fn get(&self, id: &str) -> ResponseTemplate {
        match self.find(id) {
            Some(record) => ResponseTemplate::new(200).set_body_json(record),
            None => not_found(id),
        }
    }

    fn create(&self, request: &Request) -> ResponseTemplate {
        let Some(body) = parse_body(request) else {
            return bad_request();
        };
        let record = json!({
            "id": uuid::Uuid::new_v4().simple().to_string(),
            "name": body.get("name").cloned().unwrap_or(Value::Null),
            "data": body.get("data").cloned().unwrap_or(Value::Null),
            "createdAt": chrono::Utc::now().to_rfc3339(),
        });
        self.store.lock().unwrap().push(record.clone());
        ResponseTemplate::new(200).set_body_json(record)
    }

    fn replace(&self, id: &str, request: &Request) -> ResponseTemplate {
        let Some(body) = parse_body(request) else {
            return bad_request();
        };
        self.update(id, |record| {
            record["name"] = body.get("name").cloned().unwrap_or(Value::Null);
            record["data"] = body.get("data").cloned().unwrap_or(Value::Null);
        })
    }

    fn patch(&self, id: &str, request: &Request) -> ResponseTemplate {
        let Some(body) = parse_body(request) else {
            return bad_request();
        };
        self.update(id, |record| {
            if let Some(name) = body.get("name") {
                record["name"] = name.clone();
            }
            if let Some(Value::Object(patch)) = body.get("data") {
                if !record["data"].is_object() {
                    record["data"] = Value::Object(Map::new());
                }
                if let Value::Object(data) = &mut record["data"] {
                    for (key, value) in patch {
                        data.insert(key.clone(), value.clone());
                    }
                }
            }
        })
    }

    fn update(&self, id: &str, apply: impl FnOnce(&mut Value)) -> ResponseTemplate {
        let mut store = self.store.lock().unwrap();
        let Some(record) = store.iter_mut().find(|record| record["id"] == id) else {
            return not_found(id);
        };
        apply(record);
        if let Value::Object(fields) = record {
            fields.remove("createdAt");
            fields.insert(
                "updatedAt".to_string(),
                Value::String(chrono::Utc::now().to_rfc3339()),
            );
        }
        ResponseTemplate::new(200).set_body_json(record.clone())
    }

    fn delete(&self, id: &str) -> ResponseTemplate {
        let mut store = self.store.lock().unwrap();
        let before = store.len();
        store.retain(|record| record["id"] != id);
        if store.len() == before {
            return not_found(id);
        }
        ResponseTemplate::new(200).set_body_json(json!({
            "message": format!("Object with id = {}, has been deleted.", id)
        }))
    }
}

impl Respond for FakeObjectService {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let id = request
            .url
            .path()
            .strip_prefix("/objects/")
            .map(|id| id.to_string());

        match (request.method.as_str(), id.as_deref()) {
            ("GET", None) => self.list(request),
            ("GET", Some(id)) => self.get(id),
            ("POST", None) => self.create(request),
            ("PUT", Some(id)) => self.replace(id, request),
            ("PATCH", Some(id)) => self.patch(id, request),
            ("DELETE", Some(id)) => self.delete(id),
            _ => ResponseTemplate::new(405)
                .set_body_json(json!({"error": "Method not allowed"})),
        }
    }
}

fn parse_body(request: &Request) -> Option<Map<String, Value>> {
    match serde_json::from_slice(&request.body) {
        Ok(Value::Object(body)) => Some(body),
        _ => None,
    }
}

fn not_found(id: &str) -> ResponseTemplate {
    ResponseTemplate::new(404).set_body_json(json!({
        "error": format!("Object with id={} was not found.", id)
    }))
}

fn bad_request() -> ResponseTemplate {
    ResponseTemplate::new(400).set_body_json(json!({
        "error": "400 Bad Request. The request body is not a valid JSON object"
    }))
}

/// Configuration pointing at `server` with a short timeout.
pub fn config(server: &MockServer) -> ClientConfig {
    ClientConfig::builder()
        .base_url(server.uri())
        .timeout(Duration::from_secs(5))
        .build()
}

/// A fresh test context against `server`.
pub fn context(server: &MockServer) -> TestContext {
    TestContext::new(&config(server)).expect("Failed to build test context")
}

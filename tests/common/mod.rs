//! In-memory stand-in for a Solr core, shared by the integration tests.
//!
//! Understands ping, JSON updates (add with atomic modifiers, delete by id
//! and `*:*`), and selects on `*:*` or `field:value` with `rows`, `start`
//! and `facet.field`. Endpoints can be marked unreachable.

#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::{Map, Value, json};

use solrium::adapter::Adapter;
use solrium::client::Client;
use solrium::endpoint::Endpoint;
use solrium::error::{Result, SolriumError};
use solrium::request::Request;
use solrium::response::Response;

#[derive(Debug, Clone)]
pub struct Sent {
    pub endpoint: String,
    pub method: String,
    pub handler: String,
    pub query_string: String,
    pub body: String,
}

#[derive(Debug, Default)]
pub struct FakeSolr {
    docs: Mutex<Vec<Map<String, Value>>>,
    down: Mutex<HashSet<String>>,
    sent: Mutex<Vec<Sent>>,
}

impl FakeSolr {
    pub fn new() -> Arc<FakeSolr> {
        Arc::new(FakeSolr::default())
    }

    pub fn with_docs(docs: Vec<Value>) -> Arc<FakeSolr> {
        let fake = FakeSolr::default();
        *fake.docs.lock() = docs.into_iter().filter_map(|d| d.as_object().cloned()).collect();
        Arc::new(fake)
    }

    pub fn take_down(&self, key: &str) {
        self.down.lock().insert(key.to_string());
    }

    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().clone()
    }

    pub fn sent_to(&self, handler: &str) -> Vec<Sent> {
        self.sent().into_iter().filter(|s| s.handler == handler).collect()
    }

    pub fn doc(&self, id: &str) -> Option<Map<String, Value>> {
        self.docs.lock().iter().find(|d| id_of(d) == Some(id)).cloned()
    }

    fn update(&self, body: &str) -> Response {
        let Ok(Value::Object(commands)) = serde_json::from_str::<Value>(body) else {
            // XML and CBOR bodies are accepted without being applied.
            return ok(json!({}));
        };
        let mut docs = self.docs.lock();
        for (command, value) in commands {
            match command.as_str() {
                "add" => {
                    if let Some(doc) = value.get("doc").and_then(Value::as_object) {
                        apply_add(&mut docs, doc);
                    }
                }
                "delete" => match value {
                    Value::Array(ids) => {
                        let ids: Vec<&str> = ids.iter().filter_map(Value::as_str).collect();
                        docs.retain(|d| !id_of(d).is_some_and(|id| ids.contains(&id)));
                    }
                    Value::Object(q) if q.get("query").and_then(Value::as_str) == Some("*:*") => docs.clear(),
                    _ => {}
                },
                _ => {}
            }
        }
        ok(json!({}))
    }

    fn select(&self, request: &Request) -> Response {
        let docs = self.docs.lock();
        let q = request.param("q").unwrap_or("*:*");
        let matching: Vec<&Map<String, Value>> = docs
            .iter()
            .filter(|d| match q.split_once(':') {
                Some(("*", "*")) => true,
                Some((field, value)) => d.get(field).is_some_and(|v| values(v).iter().any(|s| s == value)),
                None => false,
            })
            .collect();
        let start: usize = request.param("start").and_then(|s| s.parse().ok()).unwrap_or(0);
        let rows: usize = request.param("rows").and_then(|s| s.parse().ok()).unwrap_or(10);
        let page: Vec<Value> = matching
            .iter()
            .skip(start)
            .take(rows)
            .map(|d| Value::Object((*d).clone()))
            .collect();

        let mut body = json!({
            "responseHeader": {"status": 0, "QTime": 1},
            "response": {"numFound": matching.len(), "start": start, "docs": page}
        });
        if let Some(fields) = request.params().get("facet.field") {
            let mut facet_fields = Map::new();
            for field in fields {
                let mut counts: Vec<(String, u64)> = Vec::new();
                for doc in &matching {
                    for value in doc.get(field.as_str()).map(values).unwrap_or_default() {
                        match counts.iter_mut().find(|(v, _)| *v == value) {
                            Some((_, count)) => *count += 1,
                            None => counts.push((value, 1)),
                        }
                    }
                }
                counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
                let flat: Vec<Value> = counts.into_iter().flat_map(|(v, c)| [json!(v), json!(c)]).collect();
                facet_fields.insert(field.clone(), Value::Array(flat));
            }
            body["facet_counts"] = json!({"facet_fields": facet_fields});
        }
        Response::ok(body.to_string())
    }
}

impl Adapter for FakeSolr {
    fn execute(&self, request: &Request, endpoint: &Endpoint) -> Result<Response> {
        let body = String::from_utf8_lossy(request.raw_data().unwrap_or_default()).into_owned();
        self.sent.lock().push(Sent {
            endpoint: endpoint.key().to_string(),
            method: request.method().as_str().to_string(),
            handler: request.handler().to_string(),
            query_string: request.query_string(),
            body: body.clone(),
        });
        if self.down.lock().contains(endpoint.key()) {
            return Err(SolriumError::transport(format!("Connection refused: {}", endpoint.key())));
        }
        Ok(match request.handler() {
            "admin/ping" => ok(json!({"status": "OK"})),
            "update" => self.update(&body),
            "select" => self.select(request),
            _ => Response::new(
                404,
                "Not Found",
                Vec::new(),
                json!({"error": {"msg": "Unknown handler", "code": 404}}).to_string(),
            ),
        })
    }
}

fn ok(mut body: Value) -> Response {
    body["responseHeader"] = json!({"status": 0, "QTime": 0});
    Response::ok(body.to_string())
}

fn id_of(doc: &Map<String, Value>) -> Option<&str> {
    doc.get("id").and_then(Value::as_str)
}

fn values(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items.iter().flat_map(values).collect(),
        Value::String(s) => vec![s.clone()],
        Value::Null => Vec::new(),
        other => vec![other.to_string()],
    }
}

fn apply_add(docs: &mut Vec<Map<String, Value>>, doc: &Map<String, Value>) {
    let Some(id) = id_of(doc).map(str::to_string) else {
        return;
    };
    let atomic = doc
        .values()
        .any(|v| v.as_object().is_some_and(|m| m.contains_key("inc") || m.contains_key("set")));
    let position = docs.iter().position(|d| id_of(d) == Some(id.as_str()));
    if !atomic {
        match position {
            Some(i) => docs[i] = doc.clone(),
            None => docs.push(doc.clone()),
        }
        return;
    }

    let index = match position {
        Some(i) => i,
        None => {
            let mut new = Map::new();
            new.insert("id".to_string(), json!(id));
            docs.push(new);
            docs.len() - 1
        }
    };
    let target = &mut docs[index];
    for (field, value) in doc {
        match value.as_object() {
            Some(modifier) if modifier.contains_key("inc") => {
                let delta = modifier.get("inc").and_then(Value::as_i64).unwrap_or(0);
                let current = target.get(field).and_then(Value::as_i64).unwrap_or(0);
                target.insert(field.clone(), json!(current + delta));
            }
            Some(modifier) if modifier.contains_key("set") => {
                target.insert(field.clone(), modifier.get("set").cloned().unwrap_or(Value::Null));
            }
            _ => {
                target.insert(field.clone(), value.clone());
            }
        }
    }
}

/// A client with the fake registered under `key`.
pub fn client(fake: &Arc<FakeSolr>, key: &str) -> Client {
    let client = Client::with_registry(fake.clone(), solrium::registry::QueryTypeRegistry::with_defaults());
    client
        .add_endpoint(Endpoint::builder(key).host(format!("{key}.local")).core("books").build())
        .unwrap();
    client
}

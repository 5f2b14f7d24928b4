//! Criterion benchmarks for solrium.
//!
//! Covers the client-side cost of a round trip:
//! - Building select and update requests
//! - Decoding JSON and XML response bodies
//! - Parsing select results

use std::hint::black_box;

use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use serde_json::json;

use solrium::adapter::Adapter;
use solrium::client::Client;
use solrium::document::{Document, Modifier};
use solrium::endpoint::Endpoint;
use solrium::error::Result;
use solrium::query::update::RequestFormat;
use solrium::query::{SelectQuery, UpdateQuery};
use solrium::request::Request;
use solrium::response::Response;
use solrium::writer::{self, ResponseWriter};

/// Answers every request with the same body.
#[derive(Debug)]
struct StaticAdapter {
    body: String,
}

impl Adapter for StaticAdapter {
    fn execute(&self, _request: &Request, _endpoint: &Endpoint) -> Result<Response> {
        Ok(Response::ok(self.body.clone()))
    }
}

fn client(body: String) -> Client {
    let client = Client::new(StaticAdapter { body });
    client
        .add_endpoint(Endpoint::builder("bench").core("books").build())
        .unwrap();
    client
}

/// Generate test documents for benchmarking.
fn generate_test_documents(count: usize) -> Vec<Document> {
    let categories = ["scifi", "classic", "poetry", "history", "travel"];
    (0..count)
        .map(|i| {
            Document::builder()
                .field("id", format!("book-{i}"))
                .field("title", format!("Title number {i} with \"quotes\" & <markup>"))
                .add("cat", categories[i % categories.len()])
                .add("cat", categories[(i * 7) % categories.len()])
                .field("price", (i % 50) as f64 + 0.99)
                .update("popularity", Modifier::Inc, 1)
                .build()
        })
        .collect()
}

fn select_response(count: usize) -> serde_json::Value {
    let docs: Vec<_> = (0..count)
        .map(|i| json!({"id": format!("book-{i}"), "title": format!("Title {i}"), "cat": ["scifi", "classic"], "score": 1.0 / (i + 1) as f64}))
        .collect();
    json!({
        "responseHeader": {"status": 0, "QTime": 3},
        "response": {"numFound": 1000, "start": 0, "maxScore": 1.0, "docs": docs},
        "facet_counts": {"facet_fields": {"cat": ["scifi", 600, "classic", 400]}}
    })
}

/// Benchmark request building.
fn bench_request_building(c: &mut Criterion) {
    let mut group = c.benchmark_group("request_building");
    let client = client(String::new());

    let mut select = SelectQuery::new();
    select
        .set_query("title:\"big deal\" AND cat:scifi")
        .set_rows(50)
        .set_fields(["id", "title", "score"]);
    select.create_filter_query("stock", "inStock:true").unwrap();
    select.create_filter_query("price", "price:[10 TO 100]").unwrap();
    select.facet_set().create_facet_field("cat").unwrap().set_field("cat");
    select.highlighting().add_fields("title");

    group.bench_function("select_with_components", |b| {
        b.iter(|| black_box(client.create_request(black_box(&select)).unwrap()))
    });

    let documents = generate_test_documents(100);
    group.throughput(Throughput::Elements(100));
    for format in [RequestFormat::Xml, RequestFormat::Json, RequestFormat::Cbor] {
        let mut update = UpdateQuery::new();
        update.set_request_format(format);
        update.add_documents(documents.iter().cloned(), Some(true), None);
        update.add_commit();
        group.bench_function(format!("update_100_documents_{format:?}").to_lowercase(), |b| {
            b.iter(|| black_box(client.create_request(black_box(&update)).unwrap()))
        });
    }

    group.finish();
}

/// Benchmark response decoding.
fn bench_response_decoding(c: &mut Criterion) {
    let mut group = c.benchmark_group("response_decoding");

    let body = select_response(100).to_string();
    group.throughput(Throughput::Bytes(body.len() as u64));
    group.bench_function("decode_json", |b| {
        b.iter(|| black_box(writer::decode(ResponseWriter::Json, black_box(body.as_bytes())).unwrap()))
    });

    let xml = format!(
        "<?xml version=\"1.0\"?><response><lst name=\"responseHeader\"><int name=\"status\">0</int>\
         <int name=\"QTime\">3</int></lst><result name=\"response\" numFound=\"1000\" start=\"0\">{}</result></response>",
        (0..100)
            .map(|i| format!("<doc><str name=\"id\">book-{i}</str><arr name=\"cat\"><str>scifi</str></arr></doc>"))
            .collect::<String>()
    );
    group.throughput(Throughput::Bytes(xml.len() as u64));
    group.bench_function("decode_xml", |b| {
        b.iter(|| black_box(writer::decode(ResponseWriter::Xml, black_box(xml.as_bytes())).unwrap()))
    });

    group.finish();
}

/// Benchmark the full select pipeline against a static adapter.
fn bench_select_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("select_pipeline");
    let client = client(select_response(100).to_string());
    let mut query = SelectQuery::new();
    query.facet_set().create_facet_field("cat").unwrap().set_field("cat");

    group.throughput(Throughput::Elements(100));
    group.bench_function("select_100_documents", |b| {
        b.iter(|| black_box(client.select(black_box(&query)).unwrap()))
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_request_building,
    bench_response_decoding,
    bench_select_pipeline
);

criterion_main!(benches);

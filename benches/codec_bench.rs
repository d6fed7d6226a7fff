// benches/codec_bench.rs
//! Codec and serializer hot-path benchmarks
//!
//! Covers the work done on every recorded call: slug derivation, id
//! create/decode, and document encoding.

use bytes::Bytes;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use httptape::transaction::{Slug, Transaction, TransactionDocument, TransactionId};
use httptape::{HttpRequest, HttpResponse};

fn bench_slug(c: &mut Criterion) {
    c.bench_function("slug_from_path", |b| {
        b.iter(|| Slug::from_raw(black_box("/repos/octocat/hello-world/issues/1347")))
    });
}

fn bench_id_round_trip(c: &mut Criterion) {
    let slug = Slug::from_raw("/repos/octocat/hello-world");
    c.bench_function("id_create_decode", |b| {
        b.iter(|| {
            let id = TransactionId::create(black_box(1700000000123), "GET", &slug);
            id.decode().unwrap()
        })
    });
}

fn bench_document_encode(c: &mut Criterion) {
    let id = TransactionId::create(1700000000123, "GET", &Slug::from_raw("/users/42"));
    let body = serde_json::to_vec(&serde_json::json!({"id": 42, "name": "Ada"})).unwrap();
    let transaction = Transaction::new(
        id,
        HttpRequest::get("https://api.example.com/users/42"),
        HttpResponse::new(200)
            .with_header("content-type", "application/json")
            .with_body(Bytes::from(body)),
    );

    c.bench_function("document_encode", |b| {
        b.iter(|| TransactionDocument::encode(black_box(&transaction)).unwrap())
    });
}

criterion_group!(benches, bench_slug, bench_id_round_trip, bench_document_encode);
criterion_main!(benches);

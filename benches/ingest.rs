//! Performance benchmarks for a3s-soc
//!
//! Run with: cargo bench

use a3s_soc::query::{AlertParams, AlertQuery};
use a3s_soc::{Dashboard, IngestRequest, Normalizer};
use chrono::Utc;
use criterion::{criterion_group, criterion_main, Criterion};

fn sample_request() -> IngestRequest {
    IngestRequest::new(
        "Login-Failure",
        "idp",
        serde_json::json!({
            "user": "alice",
            "src_ip": "10.0.0.7",
            "timestamp": "2024-06-01T12:00:00Z",
            "message": "Failed login for alice",
        }),
    )
}

fn bench_normalize(c: &mut Criterion) {
    let normalizer = Normalizer::default();

    c.bench_function("Normalizer::normalize", |b| {
        b.iter(|| normalizer.normalize(sample_request(), Utc::now()).unwrap());
    });

    let body = serde_json::to_vec(&sample_request()).unwrap();
    c.bench_function("IngestRequest deserialize", |b| {
        b.iter(|| serde_json::from_slice::<IngestRequest>(&body).unwrap());
    });
}

fn bench_dashboard_ingest(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let dashboard = Dashboard::default();

    c.bench_function("Dashboard ingest (memory store)", |b| {
        b.to_async(&rt)
            .iter(|| async { dashboard.ingest(sample_request()).await.unwrap() });
    });
}

fn bench_alert_query(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let dashboard = Dashboard::default();
    rt.block_on(async {
        for _ in 0..5_000 {
            dashboard.ingest(sample_request()).await.unwrap();
        }
    });

    let query = AlertQuery::from_params(&AlertParams {
        severity: Some("medium".into()),
        limit: Some("50".into()),
        ..AlertParams::default()
    })
    .unwrap();

    c.bench_function("query_alerts (5k alerts)", |b| {
        b.to_async(&rt)
            .iter(|| async { dashboard.store().query_alerts(&query).await.unwrap() });
    });
}

criterion_group!(
    benches,
    bench_normalize,
    bench_dashboard_ingest,
    bench_alert_query
);
criterion_main!(benches);

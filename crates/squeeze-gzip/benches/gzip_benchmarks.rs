// Performance benchmarks for the gzip middleware
//
// Run with: cargo bench -p squeeze-gzip --bench gzip_benchmarks

use bytes::Bytes;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use http::Request;
use squeeze_core::{Context, Middleware, Next, Pipeline};
use squeeze_gzip::{CompressionLevel, Gzip, GzipEncoder, GzipOptions, GzipPool};
use tokio::runtime::Runtime;

// Writes a fixed payload as the response body
#[derive(Debug, Clone)]
struct BenchHandler {
    payload: Bytes,
}

#[async_trait::async_trait]
impl Middleware for BenchHandler {
    async fn call(&self, ctx: &mut Context, _next: Next) -> squeeze_core::Result<()> {
        ctx.write(&self.payload)
    }
}

fn payload(size: usize) -> Bytes {
    let text = "{\"id\":42,\"name\":\"squeeze\",\"tags\":[\"gzip\",\"pool\"]},";
    Bytes::from(text.repeat(size / text.len() + 1)).slice(..size)
}

fn benchmark_encoder_reuse(c: &mut Criterion) {
    let mut group = c.benchmark_group("encoder");
    let data = payload(4096);
    group.throughput(Throughput::Bytes(data.len() as u64));

    group.bench_function("fresh", |b| {
        b.iter(|| {
            let mut encoder = GzipEncoder::new(CompressionLevel::DEFAULT);
            let mut out = Vec::with_capacity(1024);
            encoder.write(&data, &mut out).unwrap();
            encoder.finish(&mut out).unwrap();
            black_box(out)
        });
    });

    let pool = GzipPool::new(CompressionLevel::DEFAULT);
    group.bench_function("pooled", |b| {
        b.iter(|| {
            let mut encoder = pool.acquire();
            let mut out = Vec::with_capacity(1024);
            encoder.write(&data, &mut out).unwrap();
            encoder.finish(&mut out).unwrap();
            black_box(out)
        });
    });

    group.finish();
}

fn benchmark_pipeline(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let mut group = c.benchmark_group("pipeline");

    for size in [1024, 10240, 102400].iter() {
        group.throughput(Throughput::Bytes(*size as u64));

        let pipeline = Pipeline::builder()
            .with(Gzip::new(-1, GzipOptions::default()).unwrap())
            .with(BenchHandler {
                payload: payload(*size),
            })
            .build();

        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.to_async(&rt).iter(|| {
                let pipeline = pipeline.clone();
                async move {
                    let req = Request::builder()
                        .uri("/api/test")
                        .header("Accept-Encoding", "gzip")
                        .body(Bytes::new())
                        .unwrap();

                    black_box(pipeline.handle(req).await.unwrap())
                }
            });
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_encoder_reuse, benchmark_pipeline);
criterion_main!(benches);

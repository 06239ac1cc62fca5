use std::time::Duration;

use criterion::measurement::WallTime;
use criterion::{Criterion, criterion_group, criterion_main};
use kubeclient::resource::{Deployment, register_builtin};
use kubeclient::{ObjectMeta, Registry, RequestOptions, ResourceIdentity, format_url, resource_url};

pub fn format_url_benchmark(c: &mut Criterion) -> &mut Criterion<WallTime> {
    let identity = ResourceIdentity::new("apps", "v1", "deployments", true);
    let options = RequestOptions::new()
        .timeout(Duration::from_secs(30))
        .resource_version("1234")
        .label_selector("app=web,tier in (frontend,backend)")
        .watch();

    c.bench_function("format_url", |b| {
        b.iter(|| {
            format_url(
                "https://example.com",
                &identity,
                "my-namespace",
                None,
                &options,
            )
            .unwrap();
        })
    })
}

pub fn resource_url_benchmark(c: &mut Criterion) -> &mut Criterion<WallTime> {
    let registry = Registry::new();
    register_builtin(&registry).unwrap();
    let deployment = Deployment {
        metadata: ObjectMeta::named("my-namespace", "my-deployment"),
        ..Default::default()
    };
    let options = RequestOptions::new().subresource("status");

    c.bench_function("resource_url", |b| {
        b.iter(|| {
            resource_url(
                &registry,
                "https://example.com",
                &deployment,
                true,
                &options,
            )
            .unwrap();
        })
    })
}

criterion_group!(benches, format_url_benchmark, resource_url_benchmark);
criterion_main!(benches);

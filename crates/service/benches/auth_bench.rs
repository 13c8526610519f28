use criterion::{criterion_group, criterion_main, Criterion};
use std::sync::Arc;

use service::auth::domain::{LoginInput, RegisterInput};
use service::auth::password::HashParams;
use service::auth::repository::mock::MockAuthRepository;
use service::auth::service::{AuthConfig, AuthService};

fn bench_login(c: &mut Criterion) {
    let repo = Arc::new(MockAuthRepository::default());
    // production-like cost so the numbers mean something
    let cfg = AuthConfig { hash_params: HashParams { memory_kib: 19456, iterations: 2, parallelism: 1 }, ..AuthConfig::for_tests() };
    let svc = AuthService::new(repo, cfg).unwrap();

    let rt = tokio::runtime::Runtime::new().unwrap();
    rt.block_on(svc.register(RegisterInput { name: "Bench".into(), login: "bench".into(), password: "Benchmark1".into() }))
        .unwrap();

    c.bench_function("auth_login_verify", |b| {
        b.iter(|| {
            let session = rt
                .block_on(svc.login(LoginInput { login: "bench".into(), password: "Benchmark1".into() }))
                .unwrap();
            svc.verify_token(&session.token).unwrap();
        });
    });
}

criterion_group!(benches, bench_login);
criterion_main!(benches);

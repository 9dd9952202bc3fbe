use criterion::{criterion_group, criterion_main, Criterion};

use fastmath_core::config::EngineConfig;
use fastmath_core::session::DrillSession;
use fastmath_core::traits::ManualClock;

fn play_run(questions: u32) -> u32 {
    let config = EngineConfig {
        seed: Some(7),
        ..EngineConfig::default()
    };
    let clock = ManualClock::new();
    let mut session = DrillSession::with_clock(config, clock.clone()).unwrap();

    for _ in 0..questions {
        let pair = session.next_question().unwrap();
        clock.advance_secs(1.0);
        session.submit_input(&pair.answer()).unwrap();
    }
    session.end_run().final_stage
}

fn bench_full_run(c: &mut Criterion) {
    let mut group = c.benchmark_group("session");

    group.bench_function("100_questions", |b| b.iter(|| play_run(100)));
    group.bench_function("500_questions", |b| b.iter(|| play_run(500)));

    group.finish();
}

criterion_group!(benches, bench_full_run);
criterion_main!(benches);

use std::sync::atomic::AtomicUsize;
use std::sync::Arc;

use cordial_core::{Event, ShardId, Snowflake};
use cordial_testkit::fixtures::{counting, guild_create, TestFixture};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

fn recurring_dispatch(c: &mut Criterion) {
    let mut group = c.benchmark_group("recurring_dispatch");
    for handlers in [1usize, 8, 64] {
        let fixture = TestFixture::new();
        let hits = Arc::new(AtomicUsize::new(0));
        for _ in 0..handlers {
            fixture.client.on("BENCH", counting(&hits));
        }
        let event = Event::empty("BENCH");

        group.bench_with_input(BenchmarkId::from_parameter(handlers), &event, |b, event| {
            b.iter(|| fixture.client.dispatch(ShardId(0), black_box(event)))
        });
    }
    group.finish();
}

fn once_register_and_dispatch(c: &mut Criterion) {
    let fixture = TestFixture::new();
    let hits = Arc::new(AtomicUsize::new(0));
    let event = Event::empty("BENCH_ONCE");

    c.bench_function("once_register_and_dispatch", |b| {
        b.iter(|| {
            fixture.client.once("BENCH_ONCE", counting(&hits));
            fixture.client.dispatch(ShardId(0), black_box(&event))
        })
    });
}

fn guild_create_decode(c: &mut Criterion) {
    let fixture = TestFixture::new();
    let event = guild_create(Snowflake::new(244200618854580224));

    c.bench_function("guild_create_decode", |b| {
        b.iter(|| fixture.client.dispatch(ShardId(0), black_box(&event)))
    });
}

criterion_group!(
    benches,
    recurring_dispatch,
    once_register_and_dispatch,
    guild_create_decode
);
criterion_main!(benches);

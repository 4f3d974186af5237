//! Pipeline step benchmarks
//!
//! The per-character budget is a fraction of a 16.6ms frame, so the
//! interesting numbers are one full pipeline step and a pool tick at a
//! realistic cast size.

use ahash::AHashMap;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use glam::Vec2;

use sinew::animator::Animator;
use sinew::core::types::{ActionState, CharacterId, Context};
use sinew::pool::AnimatorPool;

const DT: f32 = 1.0 / 60.0;

fn walking_context(t: f32) -> Context {
    Context {
        position: Vec2::new(t * 150.0, 0.0),
        velocity: Vec2::new(150.0, 0.0),
        action: ActionState::Idle,
        wind: 0.2,
        ..Default::default()
    }
}

fn bench_single_step(c: &mut Criterion) {
    let mut animator = Animator::with_defaults(CharacterId::new()).unwrap();
    let mut t = 0.0;
    c.bench_function("animator_advance", |b| {
        b.iter(|| {
            t += DT;
            black_box(animator.advance(DT, &walking_context(t)))
        })
    });
}

fn bench_pool_tick(c: &mut Criterion) {
    const CAST: usize = 100;
    let mut pool = AnimatorPool::new();
    let mut contexts = AHashMap::new();
    for _ in 0..CAST {
        let id = CharacterId::new();
        pool.insert(Animator::with_defaults(id).unwrap());
        contexts.insert(id, walking_context(0.0));
    }
    c.bench_function("pool_tick_100", |b| {
        b.iter(|| black_box(pool.advance_all(DT, &contexts)))
    });
}

criterion_group!(benches, bench_single_step, bench_pool_tick);
criterion_main!(benches);

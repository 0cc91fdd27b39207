use std::time::{Duration, Instant};

use criterion::{Criterion, black_box, criterion_group, criterion_main};

use studywire::api::models::PracticeCard;
use studywire::session::practice::{Grade, PracticeQueue};
use studywire::ui::disclosure::Disclosure;

fn make_pool(count: usize) -> Vec<PracticeCard> {
    (0..count)
        .map(|i| PracticeCard {
            id: i as i64,
            deck_id: 1,
            front: format!("front {i}"),
            back: format!("back {i}"),
            source_id: None,
            source_chunk_id: None,
        })
        .collect()
}

fn bench_session_drain(c: &mut Criterion) {
    let pool = make_pool(1000);

    c.bench_function("practice drain (1K cards, ~25% again)", |b| {
        b.iter(|| {
            let mut queue = PracticeQueue::new("bench", black_box(pool.clone()));
            let mut i = 0usize;
            while !queue.is_finished() {
                queue.reveal();
                // Requeue roughly a quarter of first-sight cards, then
                // retire them on the second pass.
                let grade = if i % 4 == 0 && i < 1000 {
                    Grade::Again
                } else {
                    Grade::Good
                };
                queue.grade(grade).unwrap();
                i += 1;
            }
            queue.seen_count()
        })
    });
}

fn bench_step_back_storm(c: &mut Criterion) {
    let pool = make_pool(500);

    c.bench_function("step_back storm (500 grades undone)", |b| {
        b.iter(|| {
            let mut queue = PracticeQueue::new("bench", black_box(pool.clone()));
            for i in 0..500 {
                queue
                    .grade(if i % 3 == 0 { Grade::Again } else { Grade::Good })
                    .unwrap();
            }
            for _ in 0..500 {
                queue.step_back();
            }
            queue.seen_count()
        })
    });
}

fn bench_disclosure_churn(c: &mut Criterion) {
    c.bench_function("disclosure churn (10K request/settle cycles)", |b| {
        b.iter(|| {
            let t0 = Instant::now();
            let mut d = Disclosure::new(false, 40, Duration::from_millis(200));
            let mut settles = 0usize;
            for i in 0u64..10_000 {
                let now = t0 + Duration::from_millis(i * 50);
                d.set_open(black_box(i % 3 != 0), now);
                if d.tick(now + Duration::from_millis(250)).is_some() {
                    settles += 1;
                }
            }
            settles
        })
    });
}

criterion_group!(
    benches,
    bench_session_drain,
    bench_step_back_storm,
    bench_disclosure_churn,
);
criterion_main!(benches);

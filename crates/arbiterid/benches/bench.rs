use arbiterid::{ArbiterId, Encoding, Generator, GeneratorOptions, SystemClock, TimeSource};
use core::hint::black_box;
use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use std::{
    sync::{
        Arc, Barrier,
        atomic::{AtomicU64, Ordering},
    },
    thread::scope,
    time::Instant,
};

/// Advances one millisecond every `1024` reads so the sequence never runs
/// out and nothing sleeps.
#[derive(Default)]
struct SteppingMockTime {
    reads: AtomicU64,
}

impl TimeSource for SteppingMockTime {
    fn current_millis(&self) -> u64 {
        self.reads.fetch_add(1, Ordering::Relaxed) >> ArbiterId::SEQUENCE_BITS
    }
}

// Number of IDs generated per benchmark iteration (split across threads for
// contended runs).
const TOTAL_IDS: usize = 4096;

const QUIET: GeneratorOptions = GeneratorOptions::new().with_quiet(true);

fn bench_generator<T>(c: &mut Criterion, group_name: &str, generator_fn: impl Fn() -> Generator<T>)
where
    T: TimeSource,
{
    let mut group = c.benchmark_group(group_name);
    group.throughput(Throughput::Elements(TOTAL_IDS as u64));

    group.bench_function(format!("elems/{TOTAL_IDS}"), |b| {
        b.iter_custom(|iters| {
            let start = Instant::now();

            for _ in 0..iters {
                let generator = generator_fn();
                for _ in 0..TOTAL_IDS {
                    black_box(generator.generate(black_box(1)).unwrap());
                }
            }

            start.elapsed()
        });
    });

    group.finish();
}

fn bench_generator_contended<T>(
    c: &mut Criterion,
    group_name: &str,
    generator_fn: impl Fn() -> Generator<T>,
) where
    T: TimeSource + Send + Sync,
{
    let mut group = c.benchmark_group(group_name);

    for thread_count in [1, 2, 4, 8] {
        let ids_per_thread = TOTAL_IDS / thread_count;

        group.throughput(Throughput::Elements(TOTAL_IDS as u64));
        group.bench_function(format!("elems/{TOTAL_IDS}/threads/{thread_count}"), |b| {
            b.iter_custom(|iters| {
                let start = Instant::now();

                for _ in 0..iters {
                    let generator = Arc::new(generator_fn());
                    let barrier = Arc::new(Barrier::new(thread_count + 1));
                    scope(|s| {
                        for _ in 0..thread_count {
                            let generator = Arc::clone(&generator);
                            let barrier = Arc::clone(&barrier);
                            s.spawn(move || {
                                barrier.wait();
                                for _ in 0..ids_per_thread {
                                    black_box(generator.generate(1).unwrap());
                                }
                            });
                        }
                        barrier.wait();
                    });
                }

                start.elapsed()
            });
        });
    }

    group.finish();
}

fn benchmark_mock_sequential(c: &mut Criterion) {
    bench_generator(c, "mock/sequential", || {
        Generator::with_clock(0, QUIET, SteppingMockTime::default()).unwrap()
    });
}

fn benchmark_mock_contended(c: &mut Criterion) {
    bench_generator_contended(c, "mock/contended", || {
        Generator::with_clock(0, QUIET, SteppingMockTime::default()).unwrap()
    });
}

fn benchmark_system_sequential(c: &mut Criterion) {
    bench_generator(c, "system/sequential", || {
        Generator::with_clock(0, QUIET, SystemClock).unwrap()
    });
}

fn benchmark_system_contended(c: &mut Criterion) {
    bench_generator_contended(c, "system/contended", || {
        Generator::with_clock(0, QUIET, SystemClock).unwrap()
    });
}

fn benchmark_generate_at(c: &mut Criterion) {
    let mut group = c.benchmark_group("generate_at");
    let elems = usize::from(ArbiterId::MAX_SEQUENCE) + 1;
    group.throughput(Throughput::Elements(elems as u64));

    group.bench_function(format!("elems/{elems}"), |b| {
        b.iter_custom(|iters| {
            let start = Instant::now();
            for _ in 0..iters {
                let generator = Generator::with_clock(0, QUIET, SystemClock).unwrap();
                for _ in 0..elems {
                    black_box(
                        generator
                            .generate_at_unix_millis(1, black_box(1_750_000_000_000))
                            .unwrap(),
                    );
                }
            }
            start.elapsed()
        });
    });

    group.finish();
}

fn benchmark_codecs(c: &mut Criterion) {
    let id = ArbiterId::from(777, 123_456_789, 2, 512);

    for encoding in Encoding::ALL {
        let mut group = c.benchmark_group(format!("codec/{encoding}"));
        let encoded = encoding.encode(id);

        group.bench_function("encode", |b| {
            b.iter(|| black_box(encoding.encode(black_box(id))));
        });
        group.bench_function("decode", |b| {
            b.iter(|| black_box(encoding.decode(black_box(&encoded)).unwrap()));
        });

        group.finish();
    }
}

criterion_group!(
    benches,
    // Mock clock
    benchmark_mock_sequential,
    benchmark_mock_contended,
    // Wall clock (may wait on exhausted milliseconds)
    benchmark_system_sequential,
    benchmark_system_contended,
    // Deterministic
    benchmark_generate_at,
    // Text formats
    benchmark_codecs,
);
criterion_main!(benches);

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use spsc_ring_rs::RingBuffer;
use std::sync::Arc;
use std::thread;

const MSG_COUNT: u64 = 10_000_000;
const RING_CAPACITY: usize = 1 << 20;

fn bench_spsc_value(c: &mut Criterion) {
    let mut group = c.benchmark_group("spsc");
    group.throughput(Throughput::Elements(MSG_COUNT));

    group.bench_function("write_value_read_value_u32", |b| {
        b.iter(|| {
            let mut ring = RingBuffer::new();
            ring.allocate(RING_CAPACITY);
            let ring = Arc::new(ring);

            let producer_ring = Arc::clone(&ring);
            let producer = thread::spawn(move || {
                for i in 0..MSG_COUNT {
                    while !producer_ring.write_value(&(i as u32)) {
                        std::hint::spin_loop();
                    }
                }
            });

            let mut received = 0u64;
            while received < MSG_COUNT {
                if let Some(value) = ring.read_value::<u32>() {
                    black_box(value);
                    received += 1;
                } else {
                    std::hint::spin_loop();
                }
            }

            producer.join().unwrap();
        });
    });

    group.finish();
}

fn bench_batch_sizes(c: &mut Criterion) {
    let mut group = c.benchmark_group("batch_sizes");
    group.throughput(Throughput::Elements(MSG_COUNT));

    for batch_size in [256usize, 1024, 4096, 16384].iter() {
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("batch_{}", batch_size)),
            batch_size,
            |b, &batch| {
                b.iter(|| {
                    let mut ring = RingBuffer::new();
                    ring.allocate(RING_CAPACITY);
                    let ring = Arc::new(ring);
                    let chunk: Vec<u8> = (0..batch).map(|i| i as u8).collect();

                    let producer_ring = Arc::clone(&ring);
                    let producer_chunk = chunk.clone();
                    let producer = thread::spawn(move || {
                        let mut sent = 0usize;
                        while sent < (MSG_COUNT as usize) * batch {
                            let n = producer_ring.write(&producer_chunk, true);
                            if n == 0 {
                                std::hint::spin_loop();
                            } else {
                                sent += n;
                            }
                        }
                    });

                    let mut scratch = vec![0u8; batch];
                    let mut received = 0usize;
                    while received < (MSG_COUNT as usize) * batch {
                        let n = ring.read(&mut scratch, true);
                        if n == 0 {
                            std::hint::spin_loop();
                        } else {
                            black_box(&scratch[..n]);
                            received += n;
                        }
                    }

                    producer.join().unwrap();
                });
            },
        );
    }

    group.finish();
}

fn bench_zero_copy(c: &mut Criterion) {
    let mut group = c.benchmark_group("zero_copy");

    let msgs = 1_000_000u64;
    group.throughput(Throughput::Elements(msgs));

    // Vector interface: write directly into the free segments, bypassing
    // the bulk engine's own memcpy.
    group.bench_function("write_vector_commit", |b| {
        b.iter(|| {
            let mut ring = RingBuffer::new();
            ring.allocate(RING_CAPACITY);
            let ring = Arc::new(ring);

            let producer_ring = Arc::clone(&ring);
            let producer = thread::spawn(move || {
                let mut sent = 0u64;
                while sent < msgs {
                    let mut vec = producer_ring.write_vector();
                    let want = (msgs - sent).min(vec.len() as u64) as usize;
                    if want == 0 {
                        drop(vec);
                        std::hint::spin_loop();
                        continue;
                    }
                    let front_len = vec.front.len().min(want);
                    for (i, byte) in vec.front[..front_len].iter_mut().enumerate() {
                        *byte = ((sent as usize + i) & 0xff) as u8;
                    }
                    for (i, byte) in vec.back[..want - front_len].iter_mut().enumerate() {
                        *byte = ((sent as usize + front_len + i) & 0xff) as u8;
                    }
                    drop(vec);
                    producer_ring.commit_write(want);
                    sent += want as u64;
                }
            });

            let mut received = 0u64;
            while received < msgs {
                let vec = ring.read_vector();
                let want = vec.len();
                if want == 0 {
                    std::hint::spin_loop();
                    continue;
                }
                black_box(vec.front);
                black_box(vec.back);
                ring.commit_read(want);
                received += want as u64;
            }

            producer.join().unwrap();
        });
    });

    group.finish();
}

fn bench_wraparound(c: &mut Criterion) {
    let mut group = c.benchmark_group("wraparound");

    // Small ring forces every write/read through the wrap-around split
    // path rather than the single-memcpy fast path.
    let payload = [0xABu8; 37];
    group.throughput(Throughput::Bytes(payload.len() as u64 * MSG_COUNT));

    group.bench_function("small_ring_forced_wrap", |b| {
        b.iter(|| {
            let mut ring = RingBuffer::new();
            ring.allocate(64);
            let ring = Arc::new(ring);

            let producer_ring = Arc::clone(&ring);
            let producer = thread::spawn(move || {
                for _ in 0..MSG_COUNT {
                    while producer_ring.write(&payload, false) == 0 {
                        std::hint::spin_loop();
                    }
                }
            });

            let mut scratch = [0u8; 37];
            for _ in 0..MSG_COUNT {
                while ring.read(&mut scratch, false) == 0 {
                    std::hint::spin_loop();
                }
                black_box(&scratch);
            }

            producer.join().unwrap();
        });
    });

    group.finish();
}

criterion_group!(benches, bench_spsc_value, bench_batch_sizes, bench_zero_copy, bench_wraparound);
criterion_main!(benches);

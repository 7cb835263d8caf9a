use spsc_ring_rs::RingBuffer;
use std::sync::Arc;
use std::thread;
use std::time::Instant;

/// Demonstrates the vector interface (`write_vector`/`commit_write`,
/// `read_vector`/`commit_read`): the producer writes directly into the
/// ring's free segments instead of handing `write()` a caller-owned
/// buffer to copy out of, and the consumer reads the used segments in
/// place instead of having `read()` copy them out.
fn main() {
    println!("spsc-ring-rs Zero-Copy Example");
    println!("===============================\n");

    let mut ring = RingBuffer::new();
    assert!(ring.allocate(1 << 16));
    let ring = Arc::new(ring);

    const TOTAL_BYTES: u64 = 256 * 1024 * 1024;

    println!("Configuration:");
    println!("  Ring capacity: {} bytes", ring.capacity());
    println!("  Total bytes to stream: {}\n", TOTAL_BYTES);

    let start = Instant::now();

    let producer_ring = Arc::clone(&ring);
    let producer = thread::spawn(move || {
        let mut sent = 0u64;
        while sent < TOTAL_BYTES {
            let mut vec = producer_ring.write_vector();
            if vec.is_empty() {
                drop(vec);
                thread::yield_now();
                continue;
            }
            let want = (TOTAL_BYTES - sent).min(vec.len() as u64) as usize;
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

    let consumer_ring = Arc::clone(&ring);
    let consumer = thread::spawn(move || {
        let mut received = 0u64;
        let mut checksum = 0u64;
        while received < TOTAL_BYTES {
            let vec = consumer_ring.read_vector();
            let want = vec.len();
            if want == 0 {
                thread::yield_now();
                continue;
            }
            for &byte in vec.front.iter().chain(vec.back.iter()) {
                checksum = checksum.wrapping_add(byte as u64);
            }
            consumer_ring.commit_read(want);
            received += want as u64;
        }
        (received, checksum)
    });

    producer.join().unwrap();
    let (received, checksum) = consumer.join().unwrap();
    let duration = start.elapsed();

    let gib = received as f64 / (1024.0 * 1024.0 * 1024.0);
    println!("\nResults:");
    println!("  Bytes consumed: {}", received);
    println!("  Checksum: {}", checksum);
    println!("  Duration: {:.2?}", duration);
    println!("  Bandwidth: {:.2} GiB/sec", gib / duration.as_secs_f64());
}

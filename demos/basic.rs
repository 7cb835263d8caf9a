use spsc_ring_rs::RingBuffer;
use std::sync::Arc;
use std::thread;
use std::time::Instant;

fn main() {
    println!("spsc-ring-rs Basic Example");
    println!("==========================\n");

    let mut ring = RingBuffer::new();
    assert!(ring.allocate(1 << 16));
    let ring = Arc::new(ring);

    const ITEMS: u64 = 5_000_000;

    println!("Configuration:");
    println!("  Ring capacity: {} bytes", ring.capacity());
    println!("  Items to send: {}\n", ITEMS);

    let start = Instant::now();

    let producer_ring = Arc::clone(&ring);
    let producer = thread::spawn(move || {
        for i in 0..ITEMS {
            // writeValue retries itself if there isn't room; a real caller
            // decides its own backpressure policy (busy-spin here).
            while !producer_ring.write_value(&i) {
                thread::yield_now();
            }
        }
        println!("Producer finished");
    });

    let consumer = thread::spawn(move || {
        let mut total = 0u64;
        let mut sum = 0u64;

        while total < ITEMS {
            match ring.read_value::<u64>() {
                Some(value) => {
                    sum += value;
                    total += 1;
                }
                None => thread::yield_now(),
            }
        }

        (total, sum)
    });

    producer.join().unwrap();
    let (total, sum) = consumer.join().unwrap();
    let duration = start.elapsed();

    println!("\nResults:");
    println!("  Items consumed: {}", total);
    println!("  Sum: {}", sum);
    println!("  Duration: {:.2?}", duration);
    println!(
        "  Throughput: {:.2} million items/sec",
        total as f64 / duration.as_secs_f64() / 1_000_000.0
    );
}

use criterion::{Criterion, Throughput, black_box, criterion_group, criterion_main};
use slate_perf::{sample_line, temp_ring_path};
use slate_ring::{Command, Frame, RingConsumer, RingProducer};

fn bench_submit_drain(c: &mut Criterion) {
    let path = temp_ring_path("crit_pair");
    let mut producer = RingProducer::create(&path, 1 << 20).expect("failed to create ring");
    let mut consumer = RingConsumer::attach(&path).expect("failed to attach consumer");
    let line = sample_line();

    let mut group = c.benchmark_group("ring");
    group.throughput(Throughput::Bytes(line.len() as u64));

    // One submit matched by one drain per iteration keeps the ring level,
    // so the submit path never sees backpressure.
    group.bench_function("submit+drain", |b| {
        b.iter(|| {
            producer
                .try_submit(Command::LogMsg, black_box(&line))
                .expect("submit failed");
            match consumer.next_frame().expect("framing error") {
                Some(Frame::LogMsg(payload)) => {
                    black_box(payload);
                }
                other => panic!("unexpected frame: {other:?}"),
            }
            consumer.commit();
        });
    });

    group.bench_function("poll (empty)", |b| {
        b.iter(|| black_box(consumer.next_frame().expect("framing error").is_none()));
    });

    drop(group);
    drop(producer);
    drop(consumer);
    let _ = std::fs::remove_file(&path);
}

criterion_group!(benches, bench_submit_drain);
criterion_main!(benches);

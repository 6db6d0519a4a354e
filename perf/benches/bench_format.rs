use criterion::{Criterion, Throughput, black_box, criterion_group, criterion_main};
use slate_format::{Arg, current_tid, format_into, write_prefix};

fn bench_line_assembly(c: &mut Criterion) {
    let mut group = c.benchmark_group("format");
    group.throughput(Throughput::Elements(1));

    group.bench_function("prefix", |b| {
        let mut buf = Vec::with_capacity(64);
        let tid = current_tid();
        b.iter(|| {
            buf.clear();
            write_prefix(&mut buf, b'I', black_box(tid));
            black_box(buf.len())
        });
    });

    group.bench_function("pattern %v x3", |b| {
        let mut buf = Vec::with_capacity(128);
        let args: &[Arg<'_>] = &[
            Arg::from("orders"),
            Arg::from(184467u64),
            Arg::from(3.25f64),
        ];
        b.iter(|| {
            buf.clear();
            format_into(&mut buf, black_box("queue %v depth %v p99 %v ms"), args);
            black_box(buf.len())
        });
    });

    group.bench_function("full line", |b| {
        let mut buf = Vec::with_capacity(160);
        let tid = current_tid();
        let args: &[Arg<'_>] = &[Arg::from("XNAS"), Arg::from(100u32)];
        b.iter(|| {
            buf.clear();
            write_prefix(&mut buf, b'I', tid);
            format_into(&mut buf, "order accepted venue %v qty %v", args);
            buf.push(b'\n');
            black_box(buf.len())
        });
    });

    drop(group);
}

criterion_group!(benches, bench_line_assembly);
criterion_main!(benches);

//! Benchmark suite for the buffer engine hot paths:
//! - Sequential primitive writes/reads on the growable backend
//! - Absolute access on heap vs composite storage
//! - Composite sequential traversal (component cache effectiveness)
//! - Content equality and hex dump utilities

#![allow(missing_docs)]
#![allow(clippy::semicolon_if_nothing_returned)]

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};

use netbuf::{factory, ByteBuf, ByteOrder};

const PAYLOAD: usize = 16 * 1024;

fn sequential_write_read(c: &mut Criterion) {
    let mut group = c.benchmark_group("sequential");
    group.throughput(Throughput::Bytes(PAYLOAD as u64));

    group.bench_function("write_u32_dynamic", |b| {
        b.iter(|| {
            let mut buf = factory::dynamic_buffer(ByteOrder::Big, 64);
            for i in 0..(PAYLOAD / 4) as u32 {
                buf.write_u32(black_box(i)).unwrap();
            }
            black_box(buf.writer_index())
        });
    });

    group.bench_function("read_u32_heap", |b| {
        let mut src = factory::dynamic_buffer(ByteOrder::Big, PAYLOAD);
        for i in 0..(PAYLOAD / 4) as u32 {
            src.write_u32(i).unwrap();
        }
        b.iter(|| {
            let mut buf = src.duplicate();
            let mut acc = 0u32;
            while buf.readable_bytes() >= 4 {
                acc = acc.wrapping_add(buf.read_u32().unwrap());
            }
            black_box(acc)
        });
    });

    group.finish();
}

fn composite_traversal(c: &mut Criterion) {
    let mut group = c.benchmark_group("composite");
    group.throughput(Throughput::Bytes(PAYLOAD as u64));

    let chunks: Vec<Box<dyn ByteBuf>> = (0..16)
        .map(|i| {
            Box::new(factory::wrapped_buffer(
                ByteOrder::Big,
                vec![i as u8; PAYLOAD / 16],
            )) as Box<dyn ByteBuf>
        })
        .collect();
    let composite = factory::composite_buffer(ByteOrder::Big, chunks).unwrap();

    group.bench_function("get_u8_sequential", |b| {
        b.iter(|| {
            let mut acc = 0u64;
            for i in 0..composite.capacity() {
                acc = acc.wrapping_add(u64::from(composite.get_u8(black_box(i)).unwrap()));
            }
            black_box(acc)
        });
    });

    group.bench_function("get_bytes_bulk", |b| {
        let mut dst = vec![0u8; PAYLOAD];
        b.iter(|| {
            composite.get_bytes(0, &mut dst).unwrap();
            black_box(dst[0])
        });
    });

    group.finish();
}

fn utilities(c: &mut Criterion) {
    let mut group = c.benchmark_group("utilities");
    let bytes: Vec<u8> = (0..PAYLOAD).map(|i| i as u8).collect();
    let a = factory::wrapped_buffer(ByteOrder::Big, bytes.clone());
    let b_buf = factory::wrapped_buffer(ByteOrder::Little, bytes);

    group.throughput(Throughput::Bytes(PAYLOAD as u64));
    group.bench_function("equals_mixed_order", |b| {
        b.iter(|| black_box(factory::equals(&a, &b_buf)));
    });

    group.bench_function("hash_code", |b| {
        b.iter(|| black_box(factory::hash_code(&a)));
    });

    group.bench_function("hex_dump_1k", |b| {
        b.iter(|| black_box(factory::hex_dump_at(&a, 0, 1024).unwrap()));
    });

    group.finish();
}

criterion_group!(benches, sequential_write_read, composite_traversal, utilities);
criterion_main!(benches);

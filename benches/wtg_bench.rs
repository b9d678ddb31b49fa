use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use wtg::{Document, Trigger, TriggerData};

#[path = "../tests/common/mod.rs"]
mod common;

/// The fixture document with its triggers repeated to the given count
fn document(triggers: usize) -> Document {
    let mut doc = common::document();
    let template: Vec<Trigger> = doc.triggers().to_vec();
    for i in 0..triggers.saturating_sub(template.len()) {
        let mut trigger = template[i % template.len()].clone();
        trigger.name = format!("{} {}", trigger.name, i);
        doc.push_trigger(trigger);
    }
    doc
}

pub fn decode_benchmark(c: &mut Criterion) {
    let resolver = common::trigger_data();
    let mut group = c.benchmark_group("decode");
    for triggers in [2, 32, 512].iter() {
        let data = document(*triggers).to_vec().unwrap();
        group.throughput(Throughput::Bytes(data.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(triggers), triggers, |b, _| {
            b.iter(|| Document::from_slice(black_box(&data), &resolver).unwrap())
        });
    }
    group.finish();
}

pub fn encode_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode");
    for triggers in [2, 32, 512].iter() {
        let doc = document(*triggers);
        let len = doc.to_vec().unwrap().len();
        group.throughput(Throughput::Bytes(len as u64));
        group.bench_with_input(BenchmarkId::from_parameter(triggers), triggers, |b, _| {
            b.iter(|| black_box(&doc).to_vec().unwrap())
        });
    }
    group.finish();
}

pub fn trigger_data_benchmark(c: &mut Criterion) {
    let data = common::TRIGGER_DATA.repeat(64);
    let mut group = c.benchmark_group("trigger-data");
    group.throughput(Throughput::Bytes(data.len() as u64));
    group.bench_function("from_text", |b| {
        b.iter(|| TriggerData::from_text(black_box(data.as_bytes())).unwrap())
    });
    group.finish();
}

criterion_group!(
    benches,
    decode_benchmark,
    encode_benchmark,
    trigger_data_benchmark
);
criterion_main!(benches);

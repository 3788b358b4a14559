//! Encode/decode throughput for representative message shapes.
//!
//! - `fixed`: primitives, flags, and a nested fixed-size message
//! - `growable`: dynamic arrays of primitives and messages, strings, optionals
//! - `dispatch`: tag-table dispatch over several message types

use std::hint::black_box as bb;
use std::sync::Arc;

use codec::{decode, dispatch, encode, Dispatcher, FlagSet, Message, Value, Visitor};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use schema::{Definition, Element, FieldKind, FieldTag, MessageDescriptor};

fn vec3() -> Arc<MessageDescriptor> {
    MessageDescriptor::compile(
        1,
        Definition::new()
            .field("x", FieldTag::Float32)
            .field("y", FieldTag::Float32)
            .field("z", FieldTag::Float32),
    )
    .expect("vec3 schema")
}

fn transform(vec3: &Arc<MessageDescriptor>) -> Arc<MessageDescriptor> {
    MessageDescriptor::compile(
        2,
        Definition::new()
            .field("id", FieldTag::UInt32)
            .field("position", FieldKind::message(vec3))
            .field("velocity", FieldKind::message(vec3))
            .field("state", FieldKind::flags(["active", "grounded", "visible"])),
    )
    .expect("transform schema")
}

fn trail(vec3: &Arc<MessageDescriptor>) -> Arc<MessageDescriptor> {
    MessageDescriptor::compile(
        3,
        Definition::new()
            .field("owner", FieldKind::string())
            .field("points", FieldKind::dynamic_array(Arc::clone(vec3)))
            .field("samples", FieldKind::dynamic_array(FieldTag::Int16))
            .field("tags", FieldKind::dynamic_array(Element::String))
            .field("target", FieldKind::optional(vec3)),
    )
    .expect("trail schema")
}

fn v(x: f32) -> Message {
    Message::new().with("x", x).with("y", x + 1.0).with("z", x + 2.0)
}

fn transform_value(id: u32) -> Message {
    Message::new()
        .with("id", id)
        .with("position", v(1.0))
        .with("velocity", v(-0.5))
        .with(
            "state",
            FlagSet::new().with("active", true).with("visible", true),
        )
}

fn trail_value(points: usize) -> Message {
    Message::new()
        .with("owner", "player-one")
        .with(
            "points",
            Value::Array((0..points).map(|i| v(i as f32).into()).collect()),
        )
        .with("samples", (0..points).map(|i| i as i16).collect::<Vec<_>>())
        .with("tags", vec!["fast", "red"])
        .with("target", v(9.0))
}

fn bench_fixed(c: &mut Criterion) {
    let vec3 = vec3();
    let desc = transform(&vec3);
    let msg = transform_value(42);
    let bytes = encode(&msg, &desc).expect("encode");

    let mut group = c.benchmark_group("fixed");
    group.throughput(Throughput::Bytes(bytes.len() as u64));
    group.bench_function("encode", |b| {
        b.iter(|| encode(bb(&msg), &desc).expect("encode"));
    });
    group.bench_function("decode", |b| {
        b.iter(|| decode(bb(&bytes), &desc).expect("decode"));
    });
    group.finish();
}

fn bench_growable(c: &mut Criterion) {
    let vec3 = vec3();
    let desc = trail(&vec3);

    let mut group = c.benchmark_group("growable");
    for points in [0usize, 8, 64, 255] {
        let msg = trail_value(points);
        let bytes = encode(&msg, &desc).expect("encode");
        group.throughput(Throughput::Bytes(bytes.len() as u64));
        group.bench_with_input(BenchmarkId::new("encode", points), &msg, |b, msg| {
            b.iter(|| encode(bb(msg), &desc).expect("encode"));
        });
        group.bench_with_input(BenchmarkId::new("decode", points), &bytes, |b, bytes| {
            b.iter(|| decode(bb(bytes), &desc).expect("decode"));
        });
    }
    group.finish();
}

fn bench_dispatch(c: &mut Criterion) {
    let vec3 = vec3();
    let transform = transform(&vec3);
    let trail = trail(&vec3);
    let packets = [
        encode(&v(1.0), &vec3).expect("encode"),
        encode(&transform_value(7), &transform).expect("encode"),
        encode(&trail_value(16), &trail).expect("encode"),
    ];

    let mut group = c.benchmark_group("dispatch");
    group.bench_function("visitor_list", |b| {
        let mut visitors = vec![
            Visitor::new(&vec3, |msg: Message| msg.len()),
            Visitor::new(&transform, |msg: Message| msg.len()),
            Visitor::new(&trail, |msg: Message| msg.len()),
        ];
        b.iter(|| {
            for packet in &packets {
                bb(dispatch(bb(packet), &mut visitors).expect("dispatch"));
            }
        });
    });
    group.bench_function("tag_table", |b| {
        let mut dispatcher = Dispatcher::new()
            .with(&vec3, |msg: Message| msg.len())
            .with(&transform, |msg: Message| msg.len())
            .with(&trail, |msg: Message| msg.len());
        b.iter(|| {
            for packet in &packets {
                bb(dispatcher.dispatch(bb(packet)).expect("dispatch"));
            }
        });
    });
    group.finish();
}

criterion_group!(benches, bench_fixed, bench_growable, bench_dispatch);
criterion_main!(benches);

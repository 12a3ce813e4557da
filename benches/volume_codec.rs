//! Benchmark for shorthand decode/encode and platform conversion

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use serde_json::{json, Value};
use volume_shorthand::{Volume, VolumeSet};

fn sample_set() -> Value {
    json!({
        "data": "pvc:data-claim",
        "shared": "nfs:files.local:/exports:ro",
        "disk": "gce_pd:pd-1",
        "scratch": {"vol_type": "empty_dir", "medium": "memory", "max_size": "1Gi"},
        "config": {"vol_type": "config_map", "vol_id": "app", "items": [{"key": "a", "path": "a.conf"}]},
        "plugin": {"vol_type": "flex", "vol_id": "vendor/driver", "options": {"pool": "fast"}, "zone": "b"}
    })
}

fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("volume_codec");
    group.throughput(Throughput::Elements(1));

    let selector = json!("nfs:files.local:/exports:ro");
    group.bench_function("decode_selector", |b| {
        b.iter(|| Volume::from_wire(black_box(&selector)));
    });

    let object = json!({"vol_type": "iscsi", "target_portal": "10.0.0.1:3260", "iqn": "iqn.2024-01.local:disk", "lun": 2});
    group.bench_function("decode_object", |b| {
        b.iter(|| Volume::from_wire(black_box(&object)));
    });

    group.finish();
}

fn bench_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("volume_codec");
    group.throughput(Throughput::Elements(1));

    let selector = Volume::from_wire(&json!("gce_pd:pd-1")).expect("valid shorthand");
    group.bench_function("encode_selector", |b| {
        b.iter(|| black_box(&selector).to_wire());
    });

    let object = Volume::from_wire(&json!({"vol_type": "empty_dir", "medium": "memory"}))
        .expect("valid shorthand");
    group.bench_function("encode_object", |b| {
        b.iter(|| black_box(&object).to_wire());
    });

    group.finish();
}

fn bench_volume_set(c: &mut Criterion) {
    let document = sample_set();
    let set = VolumeSet::decode(&document).expect("valid volume set");

    let mut group = c.benchmark_group("volume_set");
    group.throughput(Throughput::Elements(set.len() as u64));

    group.bench_function("decode", |b| {
        b.iter(|| VolumeSet::decode(black_box(&document)));
    });

    group.bench_function("to_platform", |b| {
        b.iter(|| black_box(&set).to_v1());
    });

    let platform = set.to_v1().expect("exportable set");
    group.bench_function("from_platform", |b| {
        b.iter(|| VolumeSet::from_v1(black_box(&platform)));
    });

    group.finish();
}

criterion_group!(benches, bench_decode, bench_encode, bench_volume_set);
criterion_main!(benches);

use criterion::{criterion_group, criterion_main, Criterion};
use picodec::{netv, ActionData, Emit, MatchKey, MatchKind, P4Id, P4Info};
use std::hint::black_box;

fn registry() -> P4Info {
    let mut p4info = P4Info::new();
    p4info.field_init(3).unwrap();
    p4info.action_init(1).unwrap();
    p4info.table_init(1).unwrap();

    p4info.field_add(P4Id::field(0), "ipv4.dst", 32).unwrap();
    p4info.field_add(P4Id::field(1), "ipv6.dst", 128).unwrap();
    p4info.field_add(P4Id::field(2), "l4.dport", 16).unwrap();

    let a0 = P4Id::action(0);
    p4info.action_add(a0, "set_nhop", 2).unwrap();
    p4info
        .action_add_param(a0, P4Id::action_param(a0, 0), "nhop", 32)
        .unwrap();
    p4info
        .action_add_param(a0, P4Id::action_param(a0, 1), "port", 9)
        .unwrap();

    let t0 = P4Id::table(0);
    p4info.table_add(t0, "route", 3, 1).unwrap();
    for (i, (kind, bw)) in [
        (MatchKind::Lpm, 32),
        (MatchKind::Exact, 128),
        (MatchKind::Range, 16),
    ]
    .into_iter()
    .enumerate()
    {
        p4info
            .table_add_match_field(t0, P4Id::field(i as u32), "", kind, bw)
            .unwrap();
    }
    p4info.table_add_action(t0, a0).unwrap();

    p4info
}

pub fn criterion_benchmark(c: &mut Criterion) {
    let p4info = registry();
    let t0 = P4Id::table(0);
    let a0 = P4Id::action(0);

    c.bench_function("netv-u32", |b| {
        b.iter(|| {
            netv::from_u32(&p4info, black_box(P4Id::field(0)), black_box(7))
                .unwrap()
        })
    });
    c.bench_function("netv-bytes-wide", |b| {
        let bytes = [0xa5u8; 16];
        b.iter(|| {
            netv::from_bytes(&p4info, P4Id::field(1), black_box(&bytes[..]))
                .unwrap()
        })
    });

    let mut key = MatchKey::allocate(&p4info, t0).unwrap();
    c.bench_function("match-key-fill", |b| {
        b.iter(|| {
            key.init();
            key.set_lpm(
                netv::from_u32(&p4info, P4Id::field(0), 0x0a00_0000).unwrap(),
                black_box(8),
            )
            .unwrap();
            key.set_exact(
                netv::from_u128(&p4info, P4Id::field(1), black_box(1)).unwrap(),
            )
            .unwrap();
            key.set_range(
                netv::from_u16(&p4info, P4Id::field(2), 1024).unwrap(),
                netv::from_u16(&p4info, P4Id::field(2), 2048).unwrap(),
            )
            .unwrap();
        })
    });

    let mut buf = vec![0u8; p4info.match_key_size(t0).unwrap()];
    c.bench_function("match-key-emit", |b| {
        b.iter(|| key.emit(black_box(&mut buf[..])).unwrap())
    });

    let mut adata = ActionData::allocate(&p4info, a0).unwrap();
    let nhop = P4Id::action_param(a0, 0);
    let port = P4Id::action_param(a0, 1);
    c.bench_function("action-data-fill-emit", |b| {
        b.iter(|| {
            adata.init();
            adata.set_arg(netv::from_u32(&p4info, nhop, 1).unwrap()).unwrap();
            adata.set_arg(netv::from_u16(&p4info, port, 3).unwrap()).unwrap();
            black_box(adata.emit_vec())
        })
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);

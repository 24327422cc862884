// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use criterion::{criterion_group, criterion_main, Criterion};
use macaddr::MacAddr6;
use picodec::Emit;
use picodec_examples::{entries, programs::l2_l3};
use std::{hint::black_box, net::Ipv4Addr};

pub fn criterion_benchmark(c: &mut Criterion) {
    let p4info = l2_l3().unwrap();

    c.bench_function("entry-ipv4-route", |b| {
        b.iter(|| {
            entries::ipv4_route(
                &p4info,
                black_box(Ipv4Addr::new(10, 0, 0, 0)),
                black_box(8),
                Ipv4Addr::new(192, 168, 0, 1),
                1,
            )
            .unwrap()
            .emit_vec()
        })
    });
    c.bench_function("entry-acl", |b| {
        b.iter(|| {
            entries::acl_drop(&p4info, 17, 0xff, black_box(53..=53), 1)
                .unwrap()
                .emit_vec()
        })
    });
    c.bench_function("entry-dmac", |b| {
        b.iter(|| {
            entries::dmac_rewrite(
                &p4info,
                black_box(MacAddr6::broadcast()),
                MacAddr6::nil(),
            )
            .unwrap()
            .emit_vec()
        })
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);

// SPDX-FileCopyrightText: Copyright (c) 2024 NVIDIA CORPORATION & AFFILIATES. All rights reserved.
// SPDX-License-Identifier: Apache-2.0
//! Benchmarks for full FM partitioning runs.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use fmcut::netlist::Netlist;
use fmcut::partition::Partitioner;

/// Seeded random netlist text: two nets per cell, degree 2..=6.
fn random_netlist_text(num_cells: usize, seed: u64) -> String {
    let mut rng = fastrand::Rng::with_seed(seed);
    let mut out = String::from("0.5\n");
    for net in 0..num_cells * 2 {
        out.push_str(&format!("NET n{}", net));
        let degree = rng.usize(2..=6);
        for _ in 0..degree {
            out.push_str(&format!(" c{}", rng.usize(0..num_cells)));
        }
        out.push_str(" ;\n");
    }
    out
}

fn bench_partition(c: &mut Criterion) {
    let mut group = c.benchmark_group("fm_partition");

    for num_cells in [100, 1000, 5000] {
        let input = random_netlist_text(num_cells, 0xC0FFEE);
        let netlist = Netlist::parse_str(&input).unwrap();

        group.bench_with_input(
            BenchmarkId::new("run", num_cells),
            &netlist,
            |b, netlist| {
                b.iter(|| {
                    let mut part =
                        Partitioner::new(netlist.clone(), netlist.balance_factor);
                    part.run();
                    black_box(part.cut_size)
                });
            },
        );

        group.bench_with_input(
            BenchmarkId::new("parse", num_cells),
            &input,
            |b, input| {
                b.iter(|| black_box(Netlist::parse_str(input).unwrap().num_pins()));
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_partition);
criterion_main!(benches);

// SPDX-FileCopyrightText: Copyright (c) 2024 NVIDIA CORPORATION & AFFILIATES. All rights reserved.
// SPDX-License-Identifier: Apache-2.0
//! CLI for the fmcut netlist partitioner.
//!
//! Usage:
//!   fmcut <input.net> <output> [--format json] [--report-nets] [--report-cells]

use clap::Parser;
use fmcut::netlist::Netlist;
use fmcut::partition::Partitioner;
use fmcut::report::{self, Summary};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "fmcut")]
#[command(about = "Balanced two-way netlist partitioner (Fiduccia–Mattheyses)")]
struct Args {
    /// Input netlist path: a balance factor followed by
    /// `NET <name> <cell> ... ;` declarations.
    input: PathBuf,

    /// Output path for the partition result (Cutsize/G1/G2).
    output: PathBuf,

    /// Summary format: text, json.
    #[clap(long, default_value = "text")]
    format: String,

    /// Dump every net with its member cells before partitioning.
    #[clap(long)]
    report_nets: bool,

    /// Dump every cell with the nets it belongs to before partitioning.
    #[clap(long)]
    report_cells: bool,
}

fn main() {
    clilog::init_stderr_color_debug();
    let args = Args::parse();

    let netlist = match Netlist::from_file(&args.input) {
        Ok(netlist) => netlist,
        Err(e) => {
            clilog::error!("cannot load netlist {}: {}", args.input.display(), e);
            std::process::exit(1);
        }
    };
    clilog::info!("{}", netlist.summary());

    let bfactor = netlist.balance_factor;
    if bfactor <= 0.0 || bfactor > 1.0 {
        clilog::warn!(
            "balance factor {} outside (0, 1]: the balance bound degenerates",
            bfactor
        );
    }

    let mut partitioner = Partitioner::new(netlist, bfactor);

    let stdout = std::io::stdout();
    if args.report_nets {
        report::report_nets(&partitioner, &mut stdout.lock()).expect("cannot write to stdout");
    }
    if args.report_cells {
        report::report_cells(&partitioner, &mut stdout.lock()).expect("cannot write to stdout");
    }

    let timer = clilog::stimer!("fm partition");
    partitioner.run();
    clilog::finish!(timer);

    let summary = Summary::collect(&partitioner);
    match args.format.as_str() {
        "json" => println!(
            "{}",
            serde_json::to_string_pretty(&summary).expect("cannot serialize summary")
        ),
        _ => print!("{}", summary),
    }

    let out = std::fs::File::create(&args.output).expect("cannot create output file");
    let mut out = std::io::BufWriter::new(out);
    report::write_result(&partitioner, &mut out).expect("cannot write result file");
}

// SPDX-FileCopyrightText: Copyright (c) 2024 NVIDIA CORPORATION & AFFILIATES. All rights reserved.
// SPDX-License-Identifier: Apache-2.0
//! Result-file writing and human/machine readable summaries.

use crate::partition::Partitioner;
use serde::Serialize;
use std::fmt;
use std::io::{self, Write};

/// Write the partition result:
///
/// ```text
/// Cutsize = <n>
/// G1 <size of side 0>
/// <side-0 cell names> ;
/// G2 <size of side 1>
/// <side-1 cell names> ;
/// ```
pub fn write_result<W: Write>(part: &Partitioner, out: &mut W) -> io::Result<()> {
    writeln!(out, "Cutsize = {}", part.cut_size)?;
    writeln!(out, "G1 {}", part.part_size[0])?;
    for cell in &part.cells {
        if !cell.side {
            write!(out, "{} ", cell.name)?;
        }
    }
    writeln!(out, ";")?;
    writeln!(out, "G2 {}", part.part_size[1])?;
    for cell in &part.cells {
        if cell.side {
            write!(out, "{} ", cell.name)?;
        }
    }
    writeln!(out, ";")?;
    Ok(())
}

/// Final partitioning statistics.
#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    pub cut_size: usize,
    pub num_cells: usize,
    pub num_nets: usize,
    pub part_size_a: usize,
    pub part_size_b: usize,
    pub num_passes: usize,
}

impl Summary {
    pub fn collect(part: &Partitioner) -> Self {
        Summary {
            cut_size: part.cut_size,
            num_cells: part.cells.len(),
            num_nets: part.nets.len(),
            part_size_a: part.part_size[0],
            part_size_b: part.part_size[1],
            num_passes: part.pass_count,
        }
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f)?;
        writeln!(f, "==================== Summary ====================")?;
        writeln!(f, " Cutsize: {}", self.cut_size)?;
        writeln!(f, " Total cell number: {}", self.num_cells)?;
        writeln!(f, " Total net number:  {}", self.num_nets)?;
        writeln!(f, " Cell Number of partition A: {}", self.part_size_a)?;
        writeln!(f, " Cell Number of partition B: {}", self.part_size_b)?;
        writeln!(f, "=================================================")?;
        writeln!(f)
    }
}

/// Dump every net with its member cells.
pub fn report_nets<W: Write>(part: &Partitioner, out: &mut W) -> io::Result<()> {
    writeln!(out, "Number of nets: {}", part.nets.len())?;
    for net in &part.nets {
        write!(out, "{:>8}: ", net.name)?;
        for &cell in &net.cells {
            write!(out, "{:>8} ", part.cells[cell].name)?;
        }
        writeln!(out)?;
    }
    Ok(())
}

/// Dump every cell with the nets it belongs to.
pub fn report_cells<W: Write>(part: &Partitioner, out: &mut W) -> io::Result<()> {
    writeln!(out, "Number of cells: {}", part.cells.len())?;
    for cell in &part.cells {
        write!(out, "{:>8}: ", cell.name)?;
        for &net in &cell.nets {
            write!(out, "{:>8} ", part.nets[net].name)?;
        }
        writeln!(out)?;
    }
    Ok(())
}

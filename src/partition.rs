// SPDX-FileCopyrightText: Copyright (c) 2024 NVIDIA CORPORATION & AFFILIATES. All rights reserved.
// SPDX-License-Identifier: Apache-2.0
//! Fiduccia–Mattheyses two-way partitioning engine.
//!
//! The engine repeatedly moves the most profitable unlocked cell between
//! the two sides, locking each moved cell for the rest of the pass and
//! incrementally repairing the gains of its net neighbors. At the end of
//! a pass the move sequence is rolled back to its best prefix; passes
//! repeat until a pass produces no positive prefix.
//!
//! All gain maintenance is O(1) amortized per net-cell pair touched, so a
//! full pass is near-linear in the pin count of the netlist.

use crate::bucket::GainBuckets;
use crate::netlist::{Cell, Net, Netlist};

/// The whole partitioning state: entity arrays, gain buckets, and
/// pass/move bookkeeping. Single-threaded by construction; the per-cell
/// `locked` flag is a domain concept (movability within a pass), not a
/// concurrency primitive.
#[derive(Debug, Clone)]
pub struct Partitioner {
    pub cells: Vec<Cell>,
    pub nets: Vec<Net>,
    /// Number of nets with members on both sides.
    pub cut_size: usize,
    /// Cell population of each side.
    pub part_size: [usize; 2],
    /// Completed plus in-flight passes.
    pub pass_count: usize,

    bfactor: f64,
    /// Minimum legal side population: `(1 - bfactor) / 2 * num_cells`.
    bound: f64,
    buckets: GainBuckets,
    unlock_count: [usize; 2],
    /// The candidate for the next move. Written only by pass
    /// initialization and move-step selection.
    cur_candidate: Option<usize>,
    /// Gain accumulated over the moves of the current pass.
    acc_gain: i64,
    /// High-water mark of `acc_gain` this pass. Starts at `i64::MIN` so a
    /// pass with zero moves never counts as an improvement.
    max_acc_gain: i64,
    move_count: usize,
    /// Move count at which `max_acc_gain` was reached: the best prefix.
    best_move_count: usize,
    /// Cells moved this pass, in move order.
    move_history: Vec<usize>,
    max_pins: usize,
}

impl Partitioner {
    /// Take over a parsed netlist. `bfactor` is expected in (0, 1]; out
    /// of range values degenerate the balance bound but are not rejected.
    pub fn new(netlist: Netlist, bfactor: f64) -> Self {
        let num_cells = netlist.cells.len();
        Partitioner {
            cells: netlist.cells,
            nets: netlist.nets,
            cut_size: 0,
            part_size: [0, 0],
            pass_count: 0,
            bfactor,
            bound: 0.0,
            buckets: GainBuckets::new(num_cells),
            unlock_count: [0, 0],
            cur_candidate: None,
            acc_gain: 0,
            max_acc_gain: i64::MIN,
            move_count: 0,
            best_move_count: 0,
            move_history: Vec::new(),
            max_pins: netlist.max_pins,
        }
    }

    /// Run FM passes to completion. Afterwards `cut_size`, `part_size`
    /// and each cell's `side` hold the final partition.
    pub fn run(&mut self) {
        self.bound = (1.0 - self.bfactor) / 2.0 * self.cells.len() as f64;
        if self.pass_count == 0 {
            self.split_initial();
            clilog::debug!(
                "initial split: cut {}, sides {}/{}, bound {}",
                self.cut_size,
                self.part_size[0],
                self.part_size[1],
                self.bound
            );
        }
        self.init_pass();
        loop {
            self.pass_count += 1;
            while let Some(cand) = self.cur_candidate.take() {
                self.move_step(cand);
            }
            if self.max_acc_gain > 0 {
                // Keep the best prefix, roll the rest back.
                self.rollback_to(self.best_move_count);
                debug_assert!(self.max_acc_gain as usize <= self.cut_size);
                self.cut_size -= self.max_acc_gain as usize;
                clilog::debug!(
                    "pass {}: kept {}/{} moves, gain {}, cut {}",
                    self.pass_count,
                    self.best_move_count,
                    self.move_count,
                    self.max_acc_gain,
                    self.cut_size
                );
                self.init_pass();
            } else {
                // No prefix improves the cut: restore the pre-pass state
                // and stop at the local optimum.
                self.rollback_to(0);
                clilog::info!(
                    "converged after {} passes: cut size {}, sides {}/{}",
                    self.pass_count,
                    self.cut_size,
                    self.part_size[0],
                    self.part_size[1]
                );
                return;
            }
        }
    }

    /// Split the load order in half: cells `0..n/2` to side 1, the rest
    /// to side 0. Establishes per-net side counts and the initial cut.
    fn split_initial(&mut self) {
        let half = self.cells.len() / 2;
        for id in 0..self.cells.len() {
            let side = id < half;
            self.cells[id].side = side;
            self.part_size[side as usize] += 1;
            for i in 0..self.cells[id].nets.len() {
                let net = self.cells[id].nets[i];
                self.nets[net].side_count[side as usize] += 1;
            }
        }
        self.cut_size = self.nets.iter().filter(|n| n.is_cut()).count();
    }

    /// Unlock everything, recompute all gains from the net counts, refill
    /// the buckets, and pick the starting candidate for the next pass.
    fn init_pass(&mut self) {
        for cell in &mut self.cells {
            cell.locked = false;
            cell.gain = 0;
        }
        self.unlock_count = self.part_size;
        self.buckets.reset();

        // Gain rule, summed per net-cell incidence: a sole member on its
        // own side gains +1 by leaving; a member whose net has nobody on
        // the far side loses 1 by newly cutting it there.
        for net_id in 0..self.nets.len() {
            for i in 0..self.nets[net_id].cells.len() {
                let cell_id = self.nets[net_id].cells[i];
                let from = self.cells[cell_id].side;
                let from_count = self.nets[net_id].side_count[from as usize];
                let to_count = self.nets[net_id].side_count[!from as usize];
                if from_count == 1 {
                    self.cells[cell_id].gain += 1;
                }
                if to_count == 0 {
                    self.cells[cell_id].gain -= 1;
                }
            }
        }

        // Refill buckets, keeping the last cell in index order whose gain
        // reaches the running maximum (later index wins ties) among cells
        // on sides that may legally source a move.
        let legal = [self.is_legal_source(false), self.is_legal_source(true)];
        let mut best: Option<(i32, usize)> = None;
        for id in 0..self.cells.len() {
            let side = self.cells[id].side;
            let gain = self.cells[id].gain;
            debug_assert!(gain.unsigned_abs() as usize <= self.max_pins);
            self.buckets.insert(id, side, gain);
            if legal[side as usize] && best.map_or(true, |(best_gain, _)| gain >= best_gain) {
                best = Some((gain, id));
            }
        }
        self.cur_candidate = best.map(|(_, id)| id);

        self.acc_gain = 0;
        self.max_acc_gain = i64::MIN;
        self.move_count = 0;
        self.best_move_count = 0;
        self.move_history.clear();
    }

    /// One move: lock the candidate, account its gain, repair neighbor
    /// gains around the move, apply it, and select the next candidate.
    fn move_step(&mut self, cand: usize) {
        let gain = self.cells[cand].gain;
        let from = self.cells[cand].side;

        // Lock first so the repair loops below skip the mover itself.
        self.buckets.remove(cand, from, gain);
        self.cells[cand].locked = true;
        self.unlock_count[from as usize] -= 1;

        self.acc_gain += gain as i64;
        self.move_count += 1;
        if self.acc_gain >= self.max_acc_gain {
            self.max_acc_gain = self.acc_gain;
            self.best_move_count = self.move_count;
        }

        // Pre-move repair: nets the move is about to tip on the far side.
        for i in 0..self.cells[cand].nets.len() {
            let net_id = self.cells[cand].nets[i];
            let to_count = self.nets[net_id].side_count[!from as usize];
            match to_count {
                0 => {
                    // The net is about to become cut: leaving costs
                    // everyone one fewer tipping move.
                    for j in 0..self.nets[net_id].cells.len() {
                        let member = self.nets[net_id].cells[j];
                        if !self.cells[member].locked {
                            self.adjust_gain(member, 1);
                        }
                    }
                }
                1 => {
                    // The far side's sole member is about to get company.
                    for j in 0..self.nets[net_id].cells.len() {
                        let member = self.nets[net_id].cells[j];
                        if !self.cells[member].locked && self.cells[member].side == !from {
                            self.adjust_gain(member, -1);
                        }
                    }
                }
                _ => {}
            }
        }

        self.move_cell(cand);
        self.move_history.push(cand);

        // Post-move repair, symmetric, with the updated counts.
        for i in 0..self.cells[cand].nets.len() {
            let net_id = self.cells[cand].nets[i];
            let from_count = self.nets[net_id].side_count[from as usize];
            match from_count {
                0 => {
                    for j in 0..self.nets[net_id].cells.len() {
                        let member = self.nets[net_id].cells[j];
                        if !self.cells[member].locked {
                            self.adjust_gain(member, -1);
                        }
                    }
                }
                1 => {
                    for j in 0..self.nets[net_id].cells.len() {
                        let member = self.nets[net_id].cells[j];
                        if !self.cells[member].locked && self.cells[member].side == from {
                            self.adjust_gain(member, 1);
                        }
                    }
                }
                _ => {}
            }
        }

        self.cur_candidate = self.select_candidate();
    }

    /// Re-bucket an unlocked cell after a gain delta.
    fn adjust_gain(&mut self, cell: usize, delta: i32) {
        debug_assert!(!self.cells[cell].locked);
        let side = self.cells[cell].side;
        let gain = self.cells[cell].gain;
        self.buckets.remove(cell, side, gain);
        self.cells[cell].gain = gain + delta;
        self.buckets.insert(cell, side, gain + delta);
    }

    /// Flip a cell to the other side, maintaining net counts and side
    /// populations. Self-inverse: applying it twice restores the state,
    /// which is what pass rollback relies on.
    fn move_cell(&mut self, id: usize) {
        let from = self.cells[id].side;
        for i in 0..self.cells[id].nets.len() {
            let net = self.cells[id].nets[i];
            self.nets[net].side_count[from as usize] -= 1;
            self.nets[net].side_count[!from as usize] += 1;
        }
        self.part_size[from as usize] -= 1;
        self.part_size[!from as usize] += 1;
        self.cells[id].side = !from;
    }

    /// Undo moves past the kept prefix, most recent first.
    fn rollback_to(&mut self, keep: usize) {
        while self.move_history.len() > keep {
            let id = self.move_history.pop().unwrap();
            self.move_cell(id);
        }
    }

    /// A side may source a move only if losing one more cell keeps it at
    /// or above the balance bound.
    fn is_legal_source(&self, side: bool) -> bool {
        self.part_size[side as usize] as f64 - 1.0 >= self.bound
    }

    /// Pick the next move candidate from the buckets: the max-gain head
    /// of a legal, non-empty side, ties toward side 0.
    fn select_candidate(&self) -> Option<usize> {
        debug_assert!(self.check_buckets());
        let best0 = if self.is_legal_source(false) {
            self.buckets.max_gain(false)
        } else {
            None
        };
        let best1 = if self.is_legal_source(true) {
            self.buckets.max_gain(true)
        } else {
            None
        };
        match (best0, best1) {
            (Some((g0, c0)), Some((g1, _))) if g0 >= g1 => Some(c0),
            (_, Some((_, c1))) => Some(c1),
            (Some((_, c0)), None) => Some(c0),
            (None, None) => None,
        }
    }

    /// Structural check: every unlocked cell bucketed exactly once under
    /// its current side and gain, locked cells nowhere, and the per-side
    /// unlocked counters in agreement.
    fn check_buckets(&self) -> bool {
        let mut seen = vec![false; self.cells.len()];
        let mut ok = true;
        let mut counts = [0usize; 2];
        self.buckets.for_each(|side, gain, id| {
            if seen[id] {
                ok = false;
            }
            seen[id] = true;
            counts[side as usize] += 1;
            let cell = &self.cells[id];
            if cell.locked || cell.side != side || cell.gain != gain {
                ok = false;
            }
        });
        ok && counts == self.unlock_count
            && self
                .cells
                .iter()
                .enumerate()
                .all(|(id, cell)| cell.locked || seen[id])
    }
}

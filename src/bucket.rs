// SPDX-FileCopyrightText: Copyright (c) 2024 NVIDIA CORPORATION & AFFILIATES. All rights reserved.
// SPDX-License-Identifier: Apache-2.0
//! Gain bucket structure for max-gain candidate retrieval.
//!
//! One ordered map per partition side from gain value to the head of an
//! intrusive doubly-linked chain of cells sharing that gain. Chains live
//! in index arenas (`prev`/`next` slots, one per cell, `usize::MAX` as
//! nil), so insert and remove are index rewrites rather than pointer
//! surgery. Insertion is push-front, so a chain head is always the most
//! recently inserted cell of that gain.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

/// Nil link marker in the chain arenas.
pub const NIL: usize = usize::MAX;

/// Two-sided gain buckets over a fixed cell arena.
///
/// Invariant: every unlocked cell on side `s` appears in exactly one
/// chain of side `s`, keyed by its current gain; locked cells appear in
/// none. The caller is responsible for removing a cell before its gain
/// or side changes and re-inserting it afterwards.
#[derive(Debug, Clone)]
pub struct GainBuckets {
    /// Per side: gain value -> chain head cell index.
    heads: [BTreeMap<i32, usize>; 2],
    prev: Vec<usize>,
    next: Vec<usize>,
}

impl GainBuckets {
    pub fn new(num_cells: usize) -> Self {
        GainBuckets {
            heads: [BTreeMap::new(), BTreeMap::new()],
            prev: vec![NIL; num_cells],
            next: vec![NIL; num_cells],
        }
    }

    /// Drop all chains. Used when a pass rebuilds every gain from scratch.
    pub fn reset(&mut self) {
        self.heads[0].clear();
        self.heads[1].clear();
        self.prev.fill(NIL);
        self.next.fill(NIL);
    }

    /// Push `cell` onto the front of the `(side, gain)` chain.
    pub fn insert(&mut self, cell: usize, side: bool, gain: i32) {
        match self.heads[side as usize].entry(gain) {
            Entry::Occupied(mut e) => {
                let head = *e.get();
                self.next[cell] = head;
                self.prev[head] = cell;
                self.prev[cell] = NIL;
                e.insert(cell);
            }
            Entry::Vacant(v) => {
                self.next[cell] = NIL;
                self.prev[cell] = NIL;
                v.insert(cell);
            }
        }
    }

    /// Unlink `cell` from the `(side, gain)` chain it currently sits in.
    /// Removing the sole member drops the gain entry entirely.
    pub fn remove(&mut self, cell: usize, side: bool, gain: i32) {
        let nxt = self.next[cell];
        let prv = self.prev[cell];
        if prv != NIL {
            self.next[prv] = nxt;
            if nxt != NIL {
                self.prev[nxt] = prv;
            }
        } else if nxt != NIL {
            self.prev[nxt] = NIL;
            self.heads[side as usize].insert(gain, nxt);
        } else {
            self.heads[side as usize].remove(&gain);
        }
        self.next[cell] = NIL;
        self.prev[cell] = NIL;
    }

    /// The highest populated gain on `side` and its chain head, if any.
    pub fn max_gain(&self, side: bool) -> Option<(i32, usize)> {
        self.heads[side as usize]
            .last_key_value()
            .map(|(&gain, &cell)| (gain, cell))
    }

    pub fn is_empty(&self, side: bool) -> bool {
        self.heads[side as usize].is_empty()
    }

    /// Walk every `(side, gain, cell)` triple currently bucketed.
    /// Consistency checks and debug dumps only; not on the hot path.
    pub fn for_each(&self, mut f: impl FnMut(bool, i32, usize)) {
        for side in [false, true] {
            for (&gain, &head) in &self.heads[side as usize] {
                let mut cur = head;
                while cur != NIL {
                    f(side, gain, cur);
                    cur = self.next[cur];
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain(b: &GainBuckets, side: bool, gain: i32) -> Vec<usize> {
        let mut out = Vec::new();
        b.for_each(|s, g, c| {
            if s == side && g == gain {
                out.push(c);
            }
        });
        out
    }

    #[test]
    fn test_insert_is_push_front() {
        let mut b = GainBuckets::new(4);
        b.insert(0, false, 2);
        b.insert(1, false, 2);
        b.insert(2, false, 2);
        // Most recent insert is the head.
        assert_eq!(b.max_gain(false), Some((2, 2)));
        assert_eq!(chain(&b, false, 2), vec![2, 1, 0]);
    }

    #[test]
    fn test_max_gain_orders_numerically() {
        let mut b = GainBuckets::new(4);
        b.insert(0, false, -3);
        b.insert(1, false, 5);
        b.insert(2, false, 0);
        assert_eq!(b.max_gain(false), Some((5, 1)));
        b.remove(1, false, 5);
        assert_eq!(b.max_gain(false), Some((0, 2)));
    }

    #[test]
    fn test_sides_are_independent() {
        let mut b = GainBuckets::new(4);
        b.insert(0, false, 1);
        b.insert(1, true, 7);
        assert_eq!(b.max_gain(false), Some((1, 0)));
        assert_eq!(b.max_gain(true), Some((7, 1)));
        assert!(!b.is_empty(false));
        b.remove(0, false, 1);
        assert!(b.is_empty(false));
        assert!(!b.is_empty(true));
    }

    #[test]
    fn test_remove_head_middle_tail() {
        let mut b = GainBuckets::new(5);
        for cell in 0..4 {
            b.insert(cell, true, 1);
        }
        // chain: 3 2 1 0
        b.remove(2, true, 1); // middle
        assert_eq!(chain(&b, true, 1), vec![3, 1, 0]);
        b.remove(3, true, 1); // head
        assert_eq!(chain(&b, true, 1), vec![1, 0]);
        b.remove(0, true, 1); // tail
        assert_eq!(chain(&b, true, 1), vec![1]);
        b.remove(1, true, 1); // sole member drops the entry
        assert_eq!(b.max_gain(true), None);
    }

    #[test]
    fn test_reinsert_after_gain_change() {
        let mut b = GainBuckets::new(3);
        b.insert(0, false, 0);
        b.insert(1, false, 0);
        b.remove(0, false, 0);
        b.insert(0, false, 1);
        assert_eq!(b.max_gain(false), Some((1, 0)));
        assert_eq!(chain(&b, false, 0), vec![1]);
    }

    #[test]
    fn test_reset() {
        let mut b = GainBuckets::new(3);
        b.insert(0, false, 1);
        b.insert(1, true, 2);
        b.reset();
        assert!(b.is_empty(false));
        assert!(b.is_empty(true));
        b.insert(0, true, -1);
        assert_eq!(b.max_gain(true), Some((-1, 0)));
    }
}

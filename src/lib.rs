// SPDX-FileCopyrightText: Copyright (c) 2024 NVIDIA CORPORATION & AFFILIATES. All rights reserved.
// SPDX-License-Identifier: Apache-2.0

//! fmcut — balanced two-way netlist partitioner.
//!
//! fmcut splits a circuit netlist into two near-equal groups while
//! minimizing the number of nets spanning both, using the
//! Fiduccia–Mattheyses iterative-improvement heuristic.
//!
//! # Pipeline
//!
//! ```text
//! .net file
//!   → Netlist       (netlist — cells, nets, name maps)
//!   → Partitioner   (partition — FM passes over gain buckets)
//!   → result file    (report — Cutsize/G1/G2 output and summaries)
//! ```
//!
//! # Key modules
//!
//! - [`netlist`] — entity model and the `.net` input parser
//! - [`bucket`] — per-side gain buckets with intrusive same-gain chains
//! - [`partition`] — the FM engine: pass initialization, incremental
//!   gain-repaired moves, best-prefix rollback
//! - [`report`] — result-file writer, text/JSON summaries, debug listings

pub mod netlist;

pub mod bucket;

pub mod partition;

pub mod report;

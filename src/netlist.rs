// SPDX-FileCopyrightText: Copyright (c) 2024 NVIDIA CORPORATION & AFFILIATES. All rights reserved.
// SPDX-License-Identifier: Apache-2.0
//! Netlist entity model and `.net` input parser.
//!
//! The input format is a single floating-point balance factor followed by
//! repeated net declarations:
//!
//! ```text
//! <balance factor>
//! NET <name> <cell> <cell> ... ;
//! ```
//!
//! Cell identity is defined by first occurrence order across the whole
//! file; a cell repeated inside one net declaration is recorded only once
//! for that net. Name lookups go through [`IndexMap`], which keeps both
//! amortized O(1) access and the load order that later stages depend on.

use compact_str::CompactString;
use indexmap::IndexMap;
use smallvec::SmallVec;
use std::path::Path;

/// One partitionable unit of the netlist.
///
/// The `side`/`gain`/`locked` fields are engine state: they are owned by
/// the partitioner once it takes the netlist over, and are meaningless
/// before the first pass is initialized. A cell's gain is only defined
/// while the cell is unlocked.
#[derive(Debug, Clone)]
pub struct Cell {
    /// Display name, as first seen in the input.
    pub name: CompactString,
    /// Nets this cell belongs to, in first-seen order, no duplicates.
    pub nets: SmallVec<[usize; 8]>,
    /// Current partition side (false = side 0 / G1, true = side 1 / G2).
    pub side: bool,
    /// Current gain: the cut-size delta of moving this cell.
    pub gain: i32,
    /// Locked cells have already moved this pass and may not move again.
    pub locked: bool,
}

impl Cell {
    fn new(name: CompactString) -> Self {
        Cell {
            name,
            nets: SmallVec::new(),
            side: false,
            gain: 0,
            locked: false,
        }
    }
}

/// A hyperedge grouping cells.
#[derive(Debug, Clone)]
pub struct Net {
    /// Display name.
    pub name: CompactString,
    /// Member cell indices, in first-seen order, no duplicates.
    pub cells: Vec<usize>,
    /// How many members currently sit on each side.
    /// `side_count[0] + side_count[1] == cells.len()` at all times.
    pub side_count: [usize; 2],
}

impl Net {
    fn new(name: CompactString) -> Self {
        Net {
            name,
            cells: Vec::new(),
            side_count: [0, 0],
        }
    }

    /// A net is cut iff it has members on both sides.
    pub fn is_cut(&self) -> bool {
        self.side_count[0] > 0 && self.side_count[1] > 0
    }
}

/// A parsed netlist: the cell and net arrays plus their name maps.
#[derive(Debug, Clone)]
pub struct Netlist {
    /// Balance tolerance from the first input token.
    pub balance_factor: f64,
    pub cells: Vec<Cell>,
    pub nets: Vec<Net>,
    /// Cell name -> index in `cells`.
    pub cell_index: IndexMap<CompactString, usize>,
    /// Net name -> index in `nets`.
    pub net_index: IndexMap<CompactString, usize>,
    /// Largest number of nets on any one cell. Bounds attainable |gain|.
    pub max_pins: usize,
}

#[derive(Debug)]
pub enum NetlistParseError {
    Io(String),
    /// The first token did not parse as a floating-point balance factor.
    BalanceFactor(String),
    /// Unexpected token; the byte offset points at the token start.
    Syntax(String, usize),
    /// A net name was declared twice.
    DuplicateNet(String),
    /// The input ended inside a net declaration (missing `;`).
    UnexpectedEof,
}

impl std::fmt::Display for NetlistParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NetlistParseError::Io(msg) => write!(f, "netlist I/O error: {}", msg),
            NetlistParseError::BalanceFactor(tok) => {
                write!(f, "invalid balance factor '{}'", tok)
            }
            NetlistParseError::Syntax(msg, pos) => {
                write!(f, "netlist syntax error at byte {}: {}", pos, msg)
            }
            NetlistParseError::DuplicateNet(name) => {
                write!(f, "duplicate net name '{}'", name)
            }
            NetlistParseError::UnexpectedEof => {
                write!(f, "netlist unexpected end of file")
            }
        }
    }
}

impl std::error::Error for NetlistParseError {}

/// Whitespace tokenizer tracking byte positions for error reporting.
struct Tokenizer<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Tokenizer<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn next_token(&mut self) -> Option<(&'a str, usize)> {
        let bytes = self.input.as_bytes();
        while self.pos < bytes.len() && bytes[self.pos].is_ascii_whitespace() {
            self.pos += 1;
        }
        if self.pos >= bytes.len() {
            return None;
        }
        let start = self.pos;
        while self.pos < bytes.len() && !bytes[self.pos].is_ascii_whitespace() {
            self.pos += 1;
        }
        Some((&self.input[start..self.pos], start))
    }
}

impl Netlist {
    /// Parse a netlist from a file path.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, NetlistParseError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| NetlistParseError::Io(format!("{}: {}", path.display(), e)))?;
        Self::parse_str(&content)
    }

    /// Parse a netlist from a string.
    pub fn parse_str(input: &str) -> Result<Self, NetlistParseError> {
        let mut tok = Tokenizer::new(input);

        let (factor_tok, _) = tok.next_token().ok_or(NetlistParseError::UnexpectedEof)?;
        let balance_factor: f64 = factor_tok
            .parse()
            .map_err(|_| NetlistParseError::BalanceFactor(factor_tok.to_string()))?;

        let mut cells: Vec<Cell> = Vec::new();
        let mut nets: Vec<Net> = Vec::new();
        let mut cell_index: IndexMap<CompactString, usize> = IndexMap::new();
        let mut net_index: IndexMap<CompactString, usize> = IndexMap::new();

        while let Some((t, pos)) = tok.next_token() {
            if t != "NET" {
                return Err(NetlistParseError::Syntax(
                    format!("expected NET, got '{}'", t),
                    pos,
                ));
            }
            let (net_name, name_pos) = tok.next_token().ok_or(NetlistParseError::UnexpectedEof)?;
            if net_name == ";" {
                return Err(NetlistParseError::Syntax(
                    "net declaration without a name".to_string(),
                    name_pos,
                ));
            }
            if net_index.contains_key(net_name) {
                return Err(NetlistParseError::DuplicateNet(net_name.to_string()));
            }
            let net_id = nets.len();
            nets.push(Net::new(CompactString::from(net_name)));
            net_index.insert(CompactString::from(net_name), net_id);

            loop {
                let (cell_name, _) = tok.next_token().ok_or(NetlistParseError::UnexpectedEof)?;
                if cell_name == ";" {
                    break;
                }
                let cell_id = match cell_index.get(cell_name) {
                    Some(&id) => id,
                    None => {
                        let id = cells.len();
                        cells.push(Cell::new(CompactString::from(cell_name)));
                        cell_index.insert(CompactString::from(cell_name), id);
                        id
                    }
                };
                // Nets are short; a linear membership check suppresses
                // duplicates anywhere in the declaration.
                if !nets[net_id].cells.contains(&cell_id) {
                    nets[net_id].cells.push(cell_id);
                    cells[cell_id].nets.push(net_id);
                }
            }
        }

        let max_pins = cells.iter().map(|c| c.nets.len()).max().unwrap_or(0);

        Ok(Netlist {
            balance_factor,
            cells,
            nets,
            cell_index,
            net_index,
            max_pins,
        })
    }

    pub fn num_cells(&self) -> usize {
        self.cells.len()
    }

    pub fn num_nets(&self) -> usize {
        self.nets.len()
    }

    /// Total pin count (cell-net incidences).
    pub fn num_pins(&self) -> usize {
        self.nets.iter().map(|n| n.cells.len()).sum()
    }

    /// Summary statistics for log output.
    pub fn summary(&self) -> String {
        format!(
            "netlist: {} cells, {} nets, {} pins, balance factor {}",
            self.num_cells(),
            self.num_nets(),
            self.num_pins(),
            self.balance_factor
        )
    }
}

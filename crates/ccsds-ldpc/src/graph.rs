//! Sparse Tanner-graph representation of the parity-check matrices.
//!
//! The parity-check matrix H of a code has n-k+p rows (check nodes) and
//! n+p columns (variable nodes). It is never materialised densely: each
//! check row is expanded from the compact protograph constants into a small
//! stack bitmap, and the set columns are collected into two CSR-style index
//! lists: one walking the graph from check to variable, the other from
//! variable to check. The decoders iterate over both directions heavily.
//!
//! Building a graph allocates; decoding with it does not. One graph can be
//! shared by any number of sequential decode calls, or across threads
//! (shared reference, read-only).
//!
//! ## Example
//!
//! ```rust
//! use ccsds_ldpc::{LdpcCode, SparseGraph};
//!
//! let graph = SparseGraph::new(LdpcCode::N128K64);
//! assert_eq!(graph.edge_count(), 512);
//! // Every check equation of the (128, 64) code involves 8 bits.
//! assert_eq!(graph.check_vars(0).len(), 8);
//! ```

use crate::bits;
use crate::codes::{CodeParams, LdpcCode};
use crate::tables::{self, tc, tm};

/// Widest supported row: (2048 + 512) columns.
const MAX_ROW_WORDS: usize = 2560 / 32;

/// One expanded check row, kept on the stack while building.
struct RowBits {
    words: [u32; MAX_ROW_WORDS],
}

impl RowBits {
    fn new() -> RowBits {
        RowBits { words: [0; MAX_ROW_WORDS] }
    }

    fn reset(&mut self) {
        self.words = [0; MAX_ROW_WORDS];
    }

    /// XOR bit `j` — overlapping protograph contributions cancel.
    fn toggle(&mut self, j: usize) {
        self.words[j / 32] ^= 0x8000_0000 >> (j % 32);
    }

    /// Visit the set bits in ascending column order.
    fn for_each_set(&self, cols: usize, mut f: impl FnMut(usize)) {
        for (wi, &word) in self.words[..cols.div_ceil(32)].iter().enumerate() {
            let mut w = word;
            while w != 0 {
                let lz = w.leading_zeros() as usize;
                f(wi * 32 + lz);
                w &= !(0x8000_0000u32 >> lz);
            }
        }
    }
}

/// Expand one row of a telecommand parity-check matrix.
fn expand_tc_row(proto: &[[tc::Sub; 8]; 4], m: usize, row: usize, out: &mut RowBits) {
    let u = row / m;
    let i = row % m;
    for (v, &sub) in proto[u].iter().enumerate() {
        let base = v * m;
        match sub {
            tc::Sub::Z => {}
            tc::Sub::I => out.toggle(base + i),
            tc::Sub::P(rot) => out.toggle(base + (i + rot as usize) % m),
            tc::Sub::S(rot) => {
                out.toggle(base + (i + rot as usize) % m);
                out.toggle(base + i);
            }
        }
    }
}

/// Expand one row of a telemetry parity-check matrix.
fn expand_tm_row(
    segments: &[(usize, &tm::Design)],
    m: usize,
    row: usize,
    out: &mut RowBits,
) {
    let block_row = row / m;
    let i = row % m;
    for &(col0, design) in segments {
        for layer in design {
            for (w, &sub) in layer[block_row].iter().enumerate() {
                let base = (col0 + w) * m;
                match sub {
                    tm::Sub::Z => {}
                    tm::Sub::I => out.toggle(base + i),
                    tm::Sub::P(k) => out.toggle(base + tm::pi(m, k, i)),
                }
            }
        }
    }
}

/// Doubly-indexed sparse Tanner graph of one code's parity-check matrix.
///
/// `ci`/`cs` list each check node's variable neighbours (ascending), with
/// `cs` holding prefix offsets into `ci`; `vi`/`vs` list each variable
/// node's check neighbours the same way. Both sides describe the same edge
/// set, so `ci` and `vi` have identical length s.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SparseGraph {
    code: LdpcCode,
    params: CodeParams,
    ci: Box<[u16]>,
    cs: Box<[u16]>,
    vi: Box<[u16]>,
    vs: Box<[u16]>,
}

impl SparseGraph {
    /// Build the graph for `code`.
    ///
    /// Deterministic: two graphs built for the same code compare equal.
    /// The sentinel code yields an empty graph.
    pub fn new(code: LdpcCode) -> SparseGraph {
        let params = CodeParams::for_code(code);
        let checks = params.checks();
        let vars = params.vars();

        let mut ci = vec![0u16; params.s].into_boxed_slice();
        let mut cs = vec![0u16; checks + 1].into_boxed_slice();
        let mut vi = vec![0u16; params.s].into_boxed_slice();
        let mut vs = vec![0u16; vars + 1].into_boxed_slice();

        let tc_proto = tables::tc_protograph(code);
        let tm_segments = tables::tm_designs(code);

        let mut row = RowBits::new();
        let mut edge = 0usize;
        for i in 0..checks {
            cs[i] = edge as u16;
            row.reset();
            if let Some(proto) = tc_proto {
                expand_tc_row(proto, params.m, i, &mut row);
            } else if let Some(segments) = tm_segments {
                expand_tm_row(segments, params.m, i, &mut row);
            }
            row.for_each_set(vars, |a| {
                ci[edge] = a as u16;
                edge += 1;
            });
        }
        cs[checks] = edge as u16;
        debug_assert_eq!(edge, params.s, "edge count disagrees with code parameters");

        // Transpose: scatter each check's edges into the per-variable lists.
        // Visiting checks in ascending order keeps every variable's check
        // list sorted.
        let mut degree = vec![0u16; vars];
        for &a in ci.iter() {
            degree[a as usize] += 1;
        }
        for a in 0..vars {
            vs[a + 1] = vs[a] + degree[a];
        }
        let mut next: Vec<u16> = vs[..vars].to_vec();
        for i in 0..checks {
            for e in cs[i] as usize..cs[i + 1] as usize {
                let a = ci[e] as usize;
                vi[next[a] as usize] = i as u16;
                next[a] += 1;
            }
        }

        tracing::debug!(
            ?code,
            edges = params.s,
            checks,
            vars,
            "built sparse parity-check graph"
        );

        SparseGraph { code, params, ci, cs, vi, vs }
    }

    /// The code this graph was built for.
    pub fn code(&self) -> LdpcCode {
        self.code
    }

    /// Parameters of the code this graph was built for.
    pub fn params(&self) -> &CodeParams {
        &self.params
    }

    /// Total number of edges (1-bits of H).
    pub fn edge_count(&self) -> usize {
        self.ci.len()
    }

    /// Number of check nodes, punctured equations included.
    pub fn check_count(&self) -> usize {
        self.cs.len() - 1
    }

    /// Number of variable nodes, punctured bits included.
    pub fn var_count(&self) -> usize {
        self.vs.len() - 1
    }

    /// Variable-node neighbours of check node `i`, ascending.
    #[inline]
    pub fn check_vars(&self, i: usize) -> &[u16] {
        &self.ci[self.cs[i] as usize..self.cs[i + 1] as usize]
    }

    /// Check-node neighbours of variable node `a`, ascending.
    #[inline]
    pub fn var_checks(&self, a: usize) -> &[u16] {
        &self.vi[self.vs[a] as usize..self.vs[a + 1] as usize]
    }

    /// Check-indexed edge list.
    pub fn ci(&self) -> &[u16] {
        &self.ci
    }

    /// Prefix offsets into [`ci`](Self::ci), one per check node plus one.
    pub fn cs(&self) -> &[u16] {
        &self.cs
    }

    /// Variable-indexed edge list.
    pub fn vi(&self) -> &[u16] {
        &self.vi
    }

    /// Prefix offsets into [`vi`](Self::vi), one per variable node plus one.
    pub fn vs(&self) -> &[u16] {
        &self.vs
    }

    /// Whether `codeword` (n+p bits, packed MSB-first) satisfies every
    /// parity-check equation.
    pub fn is_valid_codeword(&self, codeword: &[u8]) -> bool {
        (0..self.check_count()).all(|i| {
            let parity: u32 = self
                .check_vars(i)
                .iter()
                .map(|&a| bits::get(codeword, a as usize) as u32)
                .sum();
            parity % 2 == 0
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edge_counts_match_params() {
        for &code in LdpcCode::all() {
            let graph = SparseGraph::new(code);
            let params = CodeParams::for_code(code);
            assert_eq!(graph.edge_count(), params.s, "{code:?}");
            assert_eq!(graph.check_count(), params.checks(), "{code:?}");
            assert_eq!(graph.var_count(), params.vars(), "{code:?}");
            assert_eq!(*graph.cs().last().unwrap() as usize, params.s);
            assert_eq!(*graph.vs().last().unwrap() as usize, params.s);
        }
    }

    #[test]
    fn test_offsets_monotone() {
        for &code in LdpcCode::all() {
            let graph = SparseGraph::new(code);
            assert!(graph.cs().windows(2).all(|w| w[0] <= w[1]), "{code:?}: cs");
            assert!(graph.vs().windows(2).all(|w| w[0] <= w[1]), "{code:?}: vs");
        }
    }

    #[test]
    fn test_neighbour_lists_sorted() {
        let graph = SparseGraph::new(LdpcCode::N1536K1024);
        for i in 0..graph.check_count() {
            assert!(graph.check_vars(i).windows(2).all(|w| w[0] < w[1]));
        }
        for a in 0..graph.var_count() {
            assert!(graph.var_checks(a).windows(2).all(|w| w[0] < w[1]));
        }
    }

    #[test]
    fn test_dual_index_equivalence() {
        for &code in &[LdpcCode::N256K128, LdpcCode::N1280K1024] {
            let graph = SparseGraph::new(code);
            for i in 0..graph.check_count() {
                for &a in graph.check_vars(i) {
                    assert!(
                        graph.var_checks(a as usize).contains(&(i as u16)),
                        "{code:?}: edge ({i}, {a}) missing from variable side"
                    );
                }
            }
            for a in 0..graph.var_count() {
                for &i in graph.var_checks(a) {
                    assert!(
                        graph.check_vars(i as usize).contains(&(a as u16)),
                        "{code:?}: edge ({i}, {a}) missing from check side"
                    );
                }
            }
        }
    }

    #[test]
    fn test_tc_check_degree_uniform() {
        // Every telecommand check equation touches exactly 8 variables.
        let graph = SparseGraph::new(LdpcCode::N128K64);
        for i in 0..graph.check_count() {
            assert_eq!(graph.check_vars(i).len(), 8);
        }
    }

    #[test]
    fn test_build_idempotent() {
        for &code in LdpcCode::all() {
            assert_eq!(SparseGraph::new(code), SparseGraph::new(code), "{code:?}");
        }
    }

    #[test]
    fn test_sentinel_graph_empty() {
        let graph = SparseGraph::new(LdpcCode::None);
        assert_eq!(graph.edge_count(), 0);
        assert_eq!(graph.check_count(), 0);
        assert_eq!(graph.var_count(), 0);
    }
}

//! Erasure recovery for the punctured parity bits of the telemetry codes.
//!
//! The telemetry codes never transmit their last p parity bits, so a
//! receiver sees them as erasures. The soft-decision decoder handles that
//! naturally (an erased bit is just an LLR of zero), but the bit-flipping
//! decoder works on hard decisions and has no way to say "unknown": the
//! erasures must be filled in first.
//!
//! Each punctured bit is resolved by majority vote over its check
//! equations: a check whose other members are all known demands a definite
//! value for the one erased bit. Votes are tallied per sweep, a resolved
//! bit immediately participates in later votes of the same sweep, and up
//! to 16 sweeps are run. A bit whose votes tie stays erased for the next
//! sweep.
//!
//! Erasures still unresolved after the final sweep keep the value 0 and
//! are handed to bit-flipping as-is; the caller is not notified, since
//! bit-flipping can usually repair a few leftover bits like any other
//! error. The returned sweep count is diagnostic only.

use crate::bits;
use crate::graph::SparseGraph;
use crate::llr::check_len;
use crate::{CodecError, LdpcCode};

/// Sweep cap; erasures left after this many sweeps stay unresolved.
const MAX_SWEEPS: u16 = 16;

/// Resolve the punctured bits of `codeword` in place.
///
/// `codeword` must hold (n+p)/8 bytes with the received hard decisions in
/// its first n/8 bytes; the punctured region is zeroed before voting.
/// `erasures` is an n+p byte scratch area, one flag per variable node.
/// Returns the number of sweeps consumed.
pub fn decode_erasures(
    graph: &SparseGraph,
    codeword: &mut [u8],
    erasures: &mut [u8],
) -> Result<u16, CodecError> {
    if graph.code() == LdpcCode::None {
        return Err(CodecError::NoCode);
    }
    let params = *graph.params();
    let (n, p) = (params.n, params.p);
    check_len(codeword.len(), params.output_len())?;
    check_len(erasures.len(), params.bf_working_len())?;

    erasures[..n].fill(0);
    erasures[n..n + p].fill(1);
    codeword[n / 8..(n + p) / 8].fill(0);

    let mut sweeps = 0;
    while sweeps < MAX_SWEEPS {
        if erasures[n..n + p].iter().all(|&e| e == 0) {
            break;
        }
        sweeps += 1;

        for a in n..n + p {
            if erasures[a] == 0 {
                continue;
            }
            let mut vote = 0i32;
            'checks: for &i in graph.var_checks(a) {
                let mut parity = 0u32;
                for &b in graph.check_vars(i as usize) {
                    let b = b as usize;
                    if b == a {
                        continue;
                    }
                    if erasures[b] == 1 {
                        // Two unknowns in one equation tell us nothing.
                        continue 'checks;
                    }
                    parity += bits::get(codeword, b) as u32;
                }
                vote += if parity % 2 == 1 { 1 } else { -1 };
            }
            if vote > 0 {
                bits::set(codeword, a);
                erasures[a] = 0;
            } else if vote < 0 {
                bits::clear(codeword, a);
                erasures[a] = 0;
            }
        }
    }

    tracing::trace!(
        code = ?graph.code(),
        sweeps,
        unresolved = erasures[n..n + p].iter().filter(|&&e| e == 1).count(),
        "erasure recovery finished"
    );
    Ok(sweeps)
}

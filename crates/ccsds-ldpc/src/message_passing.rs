//! Soft-decision min-sum message-passing decoder.
//!
//! The workhorse decoder: it consumes one LLR per transmitted bit and
//! iteratively exchanges messages along the edges of the Tanner graph.
//! Check-to-variable messages use the min-sum approximation (the product
//! of the signs times the smallest magnitude of the other incoming
//! messages), and variable-to-check messages apply the self-correction
//! rule of Savin 2009 (<http://arxiv.org/abs/0803.1090v2>): a message
//! whose sign flipped since the previous iteration is reset to zero,
//! damping oscillations on short trapping sets.
//!
//! Punctured bits need no special pre-processing here: they simply enter
//! with an intrinsic LLR of zero and firm up as messages flow.
//!
//! All per-edge state lives in the caller's working area, split into the
//! check-to-variable half `u` (indexed like the check-side edge list) and
//! the variable-to-check half `v` (indexed like the variable-side edge
//! list). Locating the twin of an edge on the opposite side is a short
//! linear scan of the neighbouring node's slice; node degrees are small
//! enough that a precomputed inverse permutation is not worth its memory.
//!
//! ## Example
//!
//! ```rust
//! use ccsds_ldpc::{decode_mp, encode_compact, hard_to_llrs, LdpcCode, SparseGraph};
//!
//! let code = LdpcCode::N128K64;
//! let graph = SparseGraph::new(code);
//! let message: Vec<u8> = (0..8).map(|i| !i as u8).collect();
//! let mut codeword = [0u8; 16];
//! encode_compact(code, &message, &mut codeword).unwrap();
//! codeword[0] ^= 0x80; // corrupt the first bit
//!
//! let mut llrs = [0.0f32; 128];
//! hard_to_llrs(code, &codeword, &mut llrs).unwrap();
//!
//! let mut output = [0u8; 16];
//! let mut working = [0.0f32; 1024];
//! let iterations = decode_mp(&graph, &llrs, &mut output, &mut working).unwrap();
//! assert_eq!(&output[..8], &message[..]);
//! assert!(iterations <= 20);
//! ```

use crate::bits;
use crate::graph::SparseGraph;
use crate::llr::check_len;
use crate::{CodecError, LdpcCode};

/// Iteration cap for the message-passing loop.
const MAX_ITERATIONS: u16 = 20;

/// Sign of `x` as +1, 0 or -1. Zero LLRs must propagate neutrally.
#[inline]
fn sign(x: f32) -> f32 {
    ((x > 0.0) as i8 - (x < 0.0) as i8) as f32
}

/// Decode channel LLRs by min-sum message passing with self-correction.
///
/// `llrs` must hold n floats (positive favours 0), `output` (n+p)/8 bytes
/// and `working` 2s floats. On success the full hard-decision codeword
/// (punctured parity included) is left in `output`, with the message in
/// its first k/8 bytes, and the number of iterations consumed is returned
/// (1 when the input already decoded cleanly). On
/// [`NotConverged`](CodecError::NotConverged) the output holds the hard
/// decisions of the final iteration, which typically carry most of the
/// corrections.
pub fn decode_mp(
    graph: &SparseGraph,
    llrs: &[f32],
    output: &mut [u8],
    working: &mut [f32],
) -> Result<u16, CodecError> {
    if graph.code() == LdpcCode::None {
        return Err(CodecError::NoCode);
    }
    let params = *graph.params();
    check_len(llrs.len(), params.llrs_len())?;
    check_len(output.len(), params.output_len())?;
    check_len(working.len(), params.mp_working_len())?;

    let n = params.n;
    let vars = params.vars();
    let out_len = params.output_len();

    // u holds check-to-variable messages, v variable-to-check messages.
    let (u, v) = working[..2 * params.s].split_at_mut(params.s);
    u.fill(0.0);
    v.fill(0.0);

    let (ci, cs) = (graph.ci(), graph.cs());
    let (vi, vs) = (graph.vi(), graph.vs());

    for iteration in 0..MAX_ITERATIONS {
        output[..out_len].fill(0);

        // Variable-to-check update, and hard decisions from the marginals.
        for a in 0..vars {
            let intrinsic = if a < n { llrs[a] } else { 0.0 };
            let mut marginal = intrinsic;

            for e_i in vs[a] as usize..vs[a + 1] as usize {
                let i = vi[e_i] as usize;
                let prev = v[e_i];
                v[e_i] = intrinsic;

                for e_j in vs[a] as usize..vs[a + 1] as usize {
                    let j = vi[e_j] as usize;
                    // The incoming message u(j -> a) is stored at j's edge
                    // position, found by scanning j's neighbours for a.
                    for e in cs[j] as usize..cs[j + 1] as usize {
                        if ci[e] as usize == a {
                            if j != i {
                                // Extrinsic rule: everything but i itself.
                                v[e_i] += u[e];
                            }
                            marginal += u[e];
                            break;
                        }
                    }
                }

                // Self-correction: a sign flip since the last iteration
                // resets the message to zero.
                if prev != 0.0 && sign(v[e_i]) != sign(prev) {
                    v[e_i] = 0.0;
                }
            }

            if marginal <= 0.0 {
                bits::set(output, a);
            }
        }

        // Check-to-variable update, and the global parity test.
        let mut parity_ok = true;
        for i in 0..graph.check_count() {
            let mut parity = 0u32;
            for e_a in cs[i] as usize..cs[i + 1] as usize {
                let a = ci[e_a] as usize;
                let mut sign_product = 1.0f32;
                let mut min_magnitude = f32::MAX;

                for e_b in cs[i] as usize..cs[i + 1] as usize {
                    let b = ci[e_b] as usize;
                    if b == a {
                        continue;
                    }
                    // Twin lookup of v(b -> i) on the variable side.
                    for e in vs[b] as usize..vs[b + 1] as usize {
                        if vi[e] as usize == i {
                            sign_product *= sign(v[e]);
                            min_magnitude = min_magnitude.min(v[e].abs());
                            break;
                        }
                    }
                }

                u[e_a] = sign_product * min_magnitude;
                parity += bits::get(output, a) as u32;
            }
            if parity % 2 == 1 {
                parity_ok = false;
            }
        }

        if parity_ok {
            tracing::debug!(
                code = ?graph.code(),
                iterations = iteration + 1,
                "message-passing decode converged"
            );
            return Ok(iteration + 1);
        }
    }

    tracing::debug!(code = ?graph.code(), "message-passing decode did not converge");
    Err(CodecError::NotConverged { iterations: MAX_ITERATIONS })
}

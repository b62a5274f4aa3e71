//! Hard-decision bit-flipping decoder.
//!
//! The cheapest of the two decoders: it needs only hard decisions, a byte
//! per variable node of scratch, and integer arithmetic. Each round counts,
//! for every bit, how many of its parity checks are unsatisfied, then flips
//! every bit tied for the worst count. A valid codeword (no violations)
//! ends the decode; 20 rounds without one is a failure.
//!
//! Flipping all worst-count bits together, rather than just one, is
//! deliberate: on these short-to-medium codes it converges well, and the
//! all-at-once schedule keeps each round a single pass over the graph.
//!
//! For the punctured telemetry codes the received word has no values for
//! the punctured bits, so [`decode_erasures`] runs first to reconstruct
//! them; see the [`erasure`](crate::erasure) module.
//!
//! ## Example
//!
//! ```rust
//! use ccsds_ldpc::{decode_bf, encode_compact, LdpcCode, SparseGraph};
//!
//! let code = LdpcCode::N128K64;
//! let graph = SparseGraph::new(code);
//! let message: Vec<u8> = (0..8).map(|i| !i as u8).collect();
//! let mut codeword = [0u8; 16];
//! encode_compact(code, &message, &mut codeword).unwrap();
//!
//! // Corrupt the first transmitted bit.
//! codeword[0] ^= 0x80;
//!
//! let mut output = [0u8; 16];
//! let mut working = [0u8; 128];
//! let iterations = decode_bf(&graph, &codeword, &mut output, &mut working).unwrap();
//! assert_eq!(&output[..8], &message[..]);
//! assert!(iterations <= 20);
//! ```

use crate::bits;
use crate::erasure::decode_erasures;
use crate::graph::SparseGraph;
use crate::llr::check_len;
use crate::{CodecError, LdpcCode};

/// Round cap for the flipping loop.
const MAX_ITERATIONS: u16 = 20;

/// Decode hard decisions by iterative bit-flipping.
///
/// `input` must hold the received n/8 bytes, `output` (n+p)/8 bytes and
/// `working` n+p bytes. On success the full codeword (punctured parity
/// included) is left in `output`, with the message in its first k/8
/// bytes, and the number of flipping rounds is returned (0 when the input
/// already satisfied every check). On
/// [`NotConverged`](CodecError::NotConverged) the output holds the last
/// candidate, which may still be useful to a caller that can tolerate
/// residual errors.
pub fn decode_bf(
    graph: &SparseGraph,
    input: &[u8],
    output: &mut [u8],
    working: &mut [u8],
) -> Result<u16, CodecError> {
    if graph.code() == LdpcCode::None {
        return Err(CodecError::NoCode);
    }
    let params = *graph.params();
    check_len(input.len(), params.codeword_len())?;
    check_len(output.len(), params.output_len())?;
    check_len(working.len(), params.bf_working_len())?;

    let vars = params.vars();

    output[..params.codeword_len()].copy_from_slice(&input[..params.codeword_len()]);
    output[params.codeword_len()..params.output_len()].fill(0);

    if params.p > 0 {
        decode_erasures(graph, output, working)?;
    }

    for iteration in 0..MAX_ITERATIONS {
        let violations = &mut working[..vars];
        violations.fill(0);

        for i in 0..graph.check_count() {
            let neighbours = graph.check_vars(i);
            let parity: u32 = neighbours
                .iter()
                .map(|&a| bits::get(output, a as usize) as u32)
                .sum();
            if parity % 2 == 1 {
                for &a in neighbours {
                    violations[a as usize] += 1;
                }
            }
        }

        let max_violations = violations.iter().copied().max().unwrap_or(0);
        if max_violations == 0 {
            tracing::debug!(
                code = ?graph.code(),
                iteration,
                "bit-flipping decode converged"
            );
            return Ok(iteration);
        }

        for a in 0..vars {
            if violations[a] == max_violations {
                bits::flip(output, a);
            }
        }
    }

    tracing::debug!(code = ?graph.code(), "bit-flipping decode did not converge");
    Err(CodecError::NotConverged { iterations: MAX_ITERATIONS })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codes::CodeParams;
    use crate::encode::encode_compact;

    fn encode_message(code: LdpcCode) -> (CodeParams, Vec<u8>, Vec<u8>) {
        let params = CodeParams::for_code(code);
        let data: Vec<u8> = (0..params.data_len()).map(|i| !(i as u8)).collect();
        let mut codeword = vec![0u8; params.codeword_len()];
        encode_compact(code, &data, &mut codeword).unwrap();
        (params, data, codeword)
    }

    #[test]
    fn test_clean_input_converges_immediately() {
        for &code in LdpcCode::all() {
            let (params, data, codeword) = encode_message(code);
            let graph = SparseGraph::new(code);
            let mut output = vec![0u8; params.output_len()];
            let mut working = vec![0u8; params.bf_working_len()];

            let iterations =
                decode_bf(&graph, &codeword, &mut output, &mut working).unwrap();
            assert_eq!(iterations, 0, "{code:?}: flips applied to a clean input");
            assert_eq!(&output[..params.data_len()], &data[..], "{code:?}");
        }
    }

    #[test]
    fn test_recovers_single_bit_flip() {
        for &code in LdpcCode::all() {
            let (params, data, mut codeword) = encode_message(code);
            let graph = SparseGraph::new(code);
            codeword[0] ^= 0x80;

            let mut output = vec![0u8; params.output_len()];
            let mut working = vec![0u8; params.bf_working_len()];
            let iterations =
                decode_bf(&graph, &codeword, &mut output, &mut working).unwrap();
            assert!(iterations >= 1, "{code:?}");
            assert_eq!(&output[..params.data_len()], &data[..], "{code:?}");
        }
    }

    #[test]
    fn test_heavy_corruption_does_not_panic() {
        // Far past the correction capability; the decoder may or may not
        // converge but must stay within its round cap either way.
        let code = LdpcCode::N128K64;
        let (params, _, mut codeword) = encode_message(code);
        let graph = SparseGraph::new(code);
        for byte in codeword.iter_mut().step_by(2) {
            *byte ^= 0x55;
        }
        let mut output = vec![0u8; params.output_len()];
        let mut working = vec![0u8; params.bf_working_len()];
        match decode_bf(&graph, &codeword, &mut output, &mut working) {
            Ok(iterations) => assert!(iterations <= 20),
            Err(CodecError::NotConverged { iterations }) => assert_eq!(iterations, 20),
            Err(other) => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_sentinel_rejected() {
        let graph = SparseGraph::new(LdpcCode::None);
        assert_eq!(
            decode_bf(&graph, &[], &mut [], &mut []),
            Err(CodecError::NoCode)
        );
    }

    #[test]
    fn test_short_working_area_rejected() {
        let code = LdpcCode::N128K64;
        let (params, _, codeword) = encode_message(code);
        let graph = SparseGraph::new(code);
        let mut output = vec![0u8; params.output_len()];
        let mut working = vec![0u8; params.bf_working_len() - 1];
        assert_eq!(
            decode_bf(&graph, &codeword, &mut output, &mut working),
            Err(CodecError::BufferTooShort { expected: 128, actual: 127 })
        );
    }
}

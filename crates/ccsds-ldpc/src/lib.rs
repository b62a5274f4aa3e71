//! # CCSDS LDPC encoding and decoding
//!
//! This crate implements the LDPC (Low-Density Parity-Check) error
//! correcting codes recommended for spacecraft telecommand and telemetry
//! links:
//!
//! - the rate-1/2 **telecommand** codes of CCSDS 231.1-O-1 —
//!   (128, 64), (256, 128) and (512, 256);
//! - the k = 1024 **telemetry** codes of CCSDS 131.0-B-2 —
//!   (1280, 1024), (1536, 1024) and (2048, 1024), which puncture 128, 256
//!   and 512 parity bits respectively.
//!
//! All codes are systematic: the first k bits of a codeword are the user
//! message. Bit buffers are packed MSB-first.
//!
//! ## Encoding
//!
//! [`encode_compact`] works straight from the compact circulant generator
//! constants and needs no working memory; [`Generator`] expands them once
//! for much faster repeated encoding.
//!
//! ## Decoding
//!
//! Build a [`SparseGraph`] once per code (it is read-only and shareable
//! afterwards), then decode each received frame with either:
//!
//! - [`decode_bf`], hard-decision bit-flipping: cheap, integer-only, fine
//!   when the channel is good. Punctured codes are handled by an erasure
//!   recovery pass ([`decode_erasures`]) before flipping starts.
//! - [`decode_mp`], soft-decision min-sum message passing with
//!   self-correction: near-optimal use of channel information. Feed it
//!   real LLRs if the receiver has them, or manufacture LLRs from hard
//!   decisions with [`hard_to_llrs`] / [`hard_to_llrs_ber`].
//!
//! Neither decoder allocates: the caller supplies every buffer, sized via
//! [`CodeParams`]. Iteration caps bound the work per call; a decoder that
//! exhausts them reports [`CodecError::NotConverged`] and leaves its best
//! candidate in the output buffer.
//!
//! ## Example
//!
//! ```rust
//! use ccsds_ldpc::{
//!     decode_mp, encode_compact, hard_to_llrs, CodeParams, LdpcCode, SparseGraph,
//! };
//!
//! let code = LdpcCode::N256K128;
//! let params = CodeParams::for_code(code);
//! let graph = SparseGraph::new(code);
//!
//! let message: Vec<u8> = (0..params.data_len()).map(|i| i as u8).collect();
//! let mut codeword = vec![0u8; params.codeword_len()];
//! encode_compact(code, &message, &mut codeword).unwrap();
//!
//! // The channel flips a bit.
//! codeword[5] ^= 0x10;
//!
//! let mut llrs = vec![0.0f32; params.llrs_len()];
//! hard_to_llrs(code, &codeword, &mut llrs).unwrap();
//!
//! let mut output = vec![0u8; params.output_len()];
//! let mut working = vec![0.0f32; params.mp_working_len()];
//! decode_mp(&graph, &llrs, &mut output, &mut working).unwrap();
//!
//! assert_eq!(&output[..params.data_len()], &message[..]);
//! ```

pub mod bit_flipping;
mod bits;
pub mod codes;
pub mod encode;
pub mod erasure;
pub mod graph;
pub mod llr;
pub mod message_passing;
mod tables;

pub use bit_flipping::decode_bf;
pub use codes::{CodeParams, LdpcCode};
pub use encode::{encode_compact, Generator};
pub use erasure::decode_erasures;
pub use graph::SparseGraph;
pub use llr::{hard_to_llrs, hard_to_llrs_ber, llrs_to_hard};
pub use message_passing::decode_mp;

use thiserror::Error;

/// Errors reported by the encoders and decoders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CodecError {
    /// The [`LdpcCode::None`] sentinel was passed; nothing was done.
    #[error("no code selected")]
    NoCode,

    /// The iterative decoder exhausted its iteration cap without finding
    /// a valid codeword. The output buffer holds the last candidate.
    #[error("decoder did not converge after {iterations} iterations")]
    NotConverged {
        /// Iterations consumed before giving up.
        iterations: u16,
    },

    /// A caller-supplied buffer is smaller than the code requires.
    #[error("buffer too short: expected {expected}, got {actual}")]
    BufferTooShort {
        /// Required length.
        expected: usize,
        /// Provided length.
        actual: usize,
    },
}

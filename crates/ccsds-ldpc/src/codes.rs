//! Code registry — the supported CCSDS LDPC codes and their parameters.
//!
//! Six codes are supported: the three rate-1/2 telecommand codes from CCSDS
//! 231.1-O-1 and the three k = 1024 telemetry codes from CCSDS 131.0-B-2.
//! The telemetry codes are punctured: p parity bits are produced by the
//! check equations but never transmitted, and the decoders reconstruct them.
//!
//! Every operation in the crate is parameterised by [`LdpcCode`]; the
//! [`LdpcCode::None`] sentinel makes all of them fail with
//! [`CodecError::NoCode`](crate::CodecError::NoCode).
//!
//! ## Example
//!
//! ```rust
//! use ccsds_ldpc::{CodeParams, LdpcCode};
//!
//! let params = CodeParams::for_code(LdpcCode::N1280K1024);
//! assert_eq!(params.n, 1280);
//! assert_eq!(params.k, 1024);
//! assert_eq!(params.p, 128);
//! // A decoded frame carries the punctured parity bits too.
//! assert_eq!(params.output_len(), (1280 + 128) / 8);
//! ```

use serde::{Deserialize, Serialize};

/// Identifier for one of the supported LDPC codes.
///
/// The names give the block length n (bits transmitted over the air) and
/// the data length k (user bits per codeword).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LdpcCode {
    /// Sentinel — all operations no-op and report failure.
    None,
    /// (128, 64) telecommand code.
    N128K64,
    /// (256, 128) telecommand code.
    N256K128,
    /// (512, 256) telecommand code.
    N512K256,
    /// (1280, 1024) rate-4/5 telemetry code, 128 punctured bits.
    N1280K1024,
    /// (1536, 1024) rate-2/3 telemetry code, 256 punctured bits.
    N1536K1024,
    /// (2048, 1024) rate-1/2 telemetry code, 512 punctured bits.
    N2048K1024,
}

impl LdpcCode {
    /// All real codes, smallest first. Excludes the [`LdpcCode::None`]
    /// sentinel.
    pub fn all() -> &'static [LdpcCode] {
        &[
            LdpcCode::N128K64,
            LdpcCode::N256K128,
            LdpcCode::N512K256,
            LdpcCode::N1280K1024,
            LdpcCode::N1536K1024,
            LdpcCode::N2048K1024,
        ]
    }
}

/// Parameters of one LDPC code.
///
/// All lengths are in bits unless a method says otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeParams {
    /// Block length — the number of bits transmitted per codeword.
    pub n: usize,
    /// Data length — the number of user bits per codeword, systematically
    /// placed at the start.
    pub k: usize,
    /// Number of punctured parity bits (0 for the telecommand codes).
    pub p: usize,
    /// Protograph sub-matrix size.
    pub m: usize,
    /// Circulant block size of the compact generator.
    pub b: usize,
    /// Number of 1-bits in the parity-check matrix — the edge count of the
    /// Tanner graph.
    pub s: usize,
}

impl CodeParams {
    /// Look up the parameters for `code`.
    ///
    /// The sentinel yields the all-zero parameter set.
    pub fn for_code(code: LdpcCode) -> CodeParams {
        let (n, k, p, m, b, s) = match code {
            LdpcCode::None => (0, 0, 0, 0, 0, 0),
            LdpcCode::N128K64 => (128, 64, 0, 16, 16, 512),
            LdpcCode::N256K128 => (256, 128, 0, 32, 32, 1024),
            LdpcCode::N512K256 => (512, 256, 0, 64, 64, 2048),
            LdpcCode::N1280K1024 => (1280, 1024, 128, 128, 32, 4992),
            LdpcCode::N1536K1024 => (1536, 1024, 256, 256, 64, 5888),
            LdpcCode::N2048K1024 => (2048, 1024, 512, 512, 128, 7680),
        };
        CodeParams { n, k, p, m, b, s }
    }

    /// Number of parity-check equations, punctured ones included.
    pub fn checks(&self) -> usize {
        self.n - self.k + self.p
    }

    /// Number of variable nodes, punctured ones included.
    pub fn vars(&self) -> usize {
        self.n + self.p
    }

    /// Length in bytes of a user message.
    pub fn data_len(&self) -> usize {
        self.k / 8
    }

    /// Length in bytes of a transmitted codeword.
    pub fn codeword_len(&self) -> usize {
        self.n / 8
    }

    /// Length in bytes of a decoder output buffer — the full codeword
    /// including reconstructed punctured bits.
    pub fn output_len(&self) -> usize {
        (self.n + self.p) / 8
    }

    /// Number of LLR entries fed to the message-passing decoder.
    pub fn llrs_len(&self) -> usize {
        self.n
    }

    /// Length in bytes of the bit-flipping decoder's working area.
    pub fn bf_working_len(&self) -> usize {
        self.n + self.p
    }

    /// Length in floats of the message-passing decoder's working area.
    pub fn mp_working_len(&self) -> usize {
        2 * self.s
    }

    /// Length in bytes of the expanded generator's parity block.
    pub fn generator_len(&self) -> usize {
        self.k * (self.n - self.k) / 8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentinel_params_all_zero() {
        let params = CodeParams::for_code(LdpcCode::None);
        assert_eq!(
            params,
            CodeParams { n: 0, k: 0, p: 0, m: 0, b: 0, s: 0 }
        );
    }

    #[test]
    fn test_param_invariants() {
        for &code in LdpcCode::all() {
            let params = CodeParams::for_code(code);
            assert!(params.k <= params.n, "{code:?}: k > n");
            assert_eq!(params.n % 8, 0, "{code:?}: n not byte aligned");
            assert_eq!(params.k % 8, 0, "{code:?}: k not byte aligned");
            assert_eq!(params.p % 8, 0, "{code:?}: p not byte aligned");
            assert!(params.s > 0, "{code:?}: no edges");
        }
    }

    #[test]
    fn test_telecommand_codes_unpunctured() {
        for &code in &[LdpcCode::N128K64, LdpcCode::N256K128, LdpcCode::N512K256] {
            let params = CodeParams::for_code(code);
            assert_eq!(params.p, 0);
            assert_eq!(params.n, 2 * params.k);
            assert_eq!(params.m, params.n / 8);
            assert_eq!(params.b, params.m);
        }
    }

    #[test]
    fn test_telemetry_codes_punctured() {
        for &code in &[
            LdpcCode::N1280K1024,
            LdpcCode::N1536K1024,
            LdpcCode::N2048K1024,
        ] {
            let params = CodeParams::for_code(code);
            assert_eq!(params.k, 1024);
            assert_eq!(params.p, params.m);
            assert_eq!(params.b, params.m / 4);
            // All three telemetry matrices have 3M check equations.
            assert_eq!(params.checks(), 3 * params.m);
        }
    }

    #[test]
    fn test_buffer_sizes() {
        let params = CodeParams::for_code(LdpcCode::N1536K1024);
        assert_eq!(params.data_len(), 128);
        assert_eq!(params.codeword_len(), 192);
        assert_eq!(params.output_len(), 224);
        assert_eq!(params.llrs_len(), 1536);
        assert_eq!(params.bf_working_len(), 1792);
        assert_eq!(params.mp_working_len(), 11776);
        assert_eq!(params.generator_len(), 65536);
    }
}

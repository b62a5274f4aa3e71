//! Conversions between packed hard decisions and log-likelihood ratios.
//!
//! The message-passing decoder wants one `f32` LLR per transmitted bit,
//! with the convention that positive values favour bit 0 and negative
//! values favour bit 1. When a receiver only produces hard decisions these
//! helpers manufacture LLRs of a fixed magnitude from them: |ln(ber)| for
//! an assumed channel bit error rate, 5% if nothing better is known.
//!
//! ## Example
//!
//! ```rust
//! use ccsds_ldpc::{hard_to_llrs, llrs_to_hard, LdpcCode};
//!
//! let code = LdpcCode::N128K64;
//! let hard = [0x5Au8; 16];
//! let mut llrs = [0.0f32; 128];
//! hard_to_llrs(code, &hard, &mut llrs).unwrap();
//! assert!(llrs[0] > 0.0); // bit 0 of 0x5A is 0
//!
//! let mut round_trip = [0u8; 16];
//! llrs_to_hard(code, &llrs, &mut round_trip).unwrap();
//! assert_eq!(round_trip, hard);
//! ```

use crate::bits;
use crate::codes::{CodeParams, LdpcCode};
use crate::CodecError;

/// Bit error rate assumed by [`hard_to_llrs`].
const DEFAULT_BER: f32 = 0.05;

/// Convert packed hard decisions into LLRs for an assumed bit error rate.
///
/// `input` must hold n/8 bytes, `llrs` n floats. Each output is
/// `ln(ber)` for a received 1 and `-ln(ber)` for a received 0, so a
/// received 0 gets a positive LLR.
pub fn hard_to_llrs_ber(
    code: LdpcCode,
    input: &[u8],
    llrs: &mut [f32],
    ber: f32,
) -> Result<(), CodecError> {
    let params = CodeParams::for_code(code);
    if code == LdpcCode::None {
        return Err(CodecError::NoCode);
    }
    check_len(input.len(), params.codeword_len())?;
    check_len(llrs.len(), params.llrs_len())?;

    let log_ber = ber.ln();
    for (i, llr) in llrs.iter_mut().enumerate().take(params.n) {
        *llr = if bits::get(input, i) == 1 { log_ber } else { -log_ber };
    }
    Ok(())
}

/// Convert packed hard decisions into LLRs assuming a 5% bit error rate.
///
/// See [`hard_to_llrs_ber`] for buffer requirements.
pub fn hard_to_llrs(code: LdpcCode, input: &[u8], llrs: &mut [f32]) -> Result<(), CodecError> {
    hard_to_llrs_ber(code, input, llrs, DEFAULT_BER)
}

/// Collapse LLRs into packed hard decisions.
///
/// `llrs` must hold n floats, `output` n/8 bytes. The output is cleared
/// first; a bit is set exactly when its LLR is zero or negative.
pub fn llrs_to_hard(code: LdpcCode, llrs: &[f32], output: &mut [u8]) -> Result<(), CodecError> {
    let params = CodeParams::for_code(code);
    if code == LdpcCode::None {
        return Err(CodecError::NoCode);
    }
    check_len(llrs.len(), params.llrs_len())?;
    check_len(output.len(), params.codeword_len())?;

    output[..params.codeword_len()].fill(0);
    for (i, &llr) in llrs.iter().enumerate().take(params.n) {
        if llr <= 0.0 {
            bits::set(output, i);
        }
    }
    Ok(())
}

pub(crate) fn check_len(actual: usize, expected: usize) -> Result<(), CodecError> {
    if actual < expected {
        Err(CodecError::BufferTooShort { expected, actual })
    } else {
        Ok(())
    }
}
